#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by main.rs binary
use dotenvy as _;
use tokio as _;
use tracing_subscriber as _;

pub mod commands;
pub mod parser;
pub mod serve;

pub use commands::{BackendKind, Commands, ServeArgs};
pub use parser::Cli;
