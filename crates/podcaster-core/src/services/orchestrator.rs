use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::player::{PlayOutcome, TurnPlayer};
use super::until_cancelled;
use super::voices::VoiceAssigner;
use crate::domain::{
    ConversationContext, InterruptionSlot, RunId, Segment, Session, SessionId, Transcript,
    VoicePair,
};
use crate::error::SessionError;
use crate::ports::{
    GeneratedBatch, GenerationPort, RegistryError, SessionRegistry, SpeechSynthesizer,
    StreamTransport,
};

/// Default pause after each delivered segment.
pub const DEFAULT_SEGMENT_PAUSE: Duration = Duration::from_secs(3);
/// Default pause between uninterrupted batches.
pub const DEFAULT_BATCH_PAUSE: Duration = Duration::from_secs(2);

/// Pacing and limits for a session.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Pause after each segment's audio. Ends early on interruption.
    pub segment_pause: Duration,
    /// Pause before requesting the next batch when the previous one played out.
    pub batch_pause: Duration,
    /// Stop after this many generation calls. `None` = until the backend is done.
    pub max_batches: Option<u32>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            segment_pause: DEFAULT_SEGMENT_PAUSE,
            batch_pause: DEFAULT_BATCH_PAUSE,
            max_batches: None,
        }
    }
}

impl OrchestratorConfig {
    #[must_use]
    pub const fn with_segment_pause(mut self, pause: Duration) -> Self {
        self.segment_pause = pause;
        self
    }

    #[must_use]
    pub const fn with_batch_pause(mut self, pause: Duration) -> Self {
        self.batch_pause = pause;
        self
    }

    #[must_use]
    pub const fn with_max_batches(mut self, max: Option<u32>) -> Self {
        self.max_batches = max;
        self
    }
}

/// Lifecycle states of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    AwaitingTopic,
    Generating,
    Playing,
    Resuming,
    Finished,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::AwaitingTopic => "awaiting_topic",
            Self::Generating => "generating",
            Self::Playing => "playing",
            Self::Resuming => "resuming",
            Self::Finished => "finished",
        };
        f.write_str(label)
    }
}

/// What a finished session did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub batches: u32,
    pub interruptions: u32,
    pub segments_played: usize,
}

/// State owned by the session task between steps.
struct Live {
    context: ConversationContext,
    voices: VoicePair,
    slot: InterruptionSlot,
}

enum Step {
    AwaitingTopic,
    Generating(Live),
    Playing(Live, GeneratedBatch),
    Resuming {
        live: Live,
        prefix: Transcript,
        interruption: Segment,
    },
    Finished,
}

impl Step {
    const fn state(&self) -> SessionState {
        match self {
            Self::AwaitingTopic => SessionState::AwaitingTopic,
            Self::Generating(_) => SessionState::Generating,
            Self::Playing(..) => SessionState::Playing,
            Self::Resuming { .. } => SessionState::Resuming,
            Self::Finished => SessionState::Finished,
        }
    }
}

struct RunCtx<'a> {
    id: &'a SessionId,
    run: RunId,
    cancel: &'a CancellationToken,
    summary: SessionSummary,
}

/// Drives one listener stream from topic to finish.
///
/// One orchestrator is shared by all sessions; each call to
/// [`run`](Self::run) is one session task and is the only writer to its
/// transport.
#[derive(Clone)]
pub struct SessionOrchestrator {
    generator: Arc<dyn GenerationPort>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    registry: Arc<dyn SessionRegistry>,
    voices: VoiceAssigner,
    config: OrchestratorConfig,
}

impl SessionOrchestrator {
    pub fn new(
        generator: Arc<dyn GenerationPort>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        registry: Arc<dyn SessionRegistry>,
        voices: VoiceAssigner,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            generator,
            synthesizer,
            registry,
            voices,
            config,
        }
    }

    pub fn registry(&self) -> &Arc<dyn SessionRegistry> {
        &self.registry
    }

    pub const fn voices(&self) -> &VoiceAssigner {
        &self.voices
    }

    pub const fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run a session to completion.
    ///
    /// Whatever the outcome, the transport is closed and the session removed
    /// from the registry before this returns (unless another stream has since
    /// taken over the id). Cancelling `cancel` ends the session at its next
    /// await point.
    pub async fn run<T>(
        &self,
        id: SessionId,
        transport: &mut T,
        cancel: CancellationToken,
    ) -> Result<SessionSummary, SessionError>
    where
        T: StreamTransport + ?Sized,
    {
        let mut ctx = RunCtx {
            id: &id,
            run: RunId::new(),
            cancel: &cancel,
            summary: SessionSummary::default(),
        };

        let result = self.drive(&mut ctx, transport).await;
        let summary = ctx.summary;
        let run = ctx.run;

        self.registry.remove_run(&id, run);
        if let Err(e) = transport.close().await {
            debug!(session_id = %id, error = %e, "Transport close failed");
        }

        match &result {
            Ok(()) => info!(
                session_id = %id,
                batches = summary.batches,
                interruptions = summary.interruptions,
                segments = summary.segments_played,
                "Podcast finished"
            ),
            Err(e) if e.is_disconnect() => info!(
                session_id = %id,
                segments = summary.segments_played,
                "Listener disconnected"
            ),
            Err(e) => warn!(session_id = %id, error = %e, "Session ended with error"),
        }

        result.map(|()| summary)
    }

    async fn drive<T>(&self, ctx: &mut RunCtx<'_>, transport: &mut T) -> Result<(), SessionError>
    where
        T: StreamTransport + ?Sized,
    {
        let mut step = Step::AwaitingTopic;
        loop {
            debug!(session_id = %ctx.id, state = %step.state(), "Session step");
            step = match step {
                Step::AwaitingTopic => self.open(ctx, transport).await?,
                Step::Generating(live) => self.generate(ctx, live).await?,
                Step::Playing(live, batch) => self.play(ctx, transport, live, batch).await?,
                Step::Resuming {
                    live,
                    prefix,
                    interruption,
                } => {
                    self.resume(ctx, transport, live, &prefix, interruption)
                        .await?
                }
                Step::Finished => return Ok(()),
            };
        }
    }

    async fn open<T>(&self, ctx: &RunCtx<'_>, transport: &mut T) -> Result<Step, SessionError>
    where
        T: StreamTransport + ?Sized,
    {
        let Some(topic) = until_cancelled(ctx.cancel, transport.recv_text()).await?? else {
            return Err(SessionError::Protocol("stream closed before a topic was received".into()));
        };
        let context = ConversationContext::from_topic(&topic)
            .map_err(|e| SessionError::Protocol(e.to_string()))?;

        let voices = self.voices.assign();
        let session = Session::new(
            ctx.id.clone(),
            ctx.run,
            context.topic(),
            voices.clone(),
            ctx.cancel.clone(),
        );
        let slot = session.slot.clone();
        self.register(session)?;

        info!(
            session_id = %ctx.id,
            topic = context.topic(),
            host_voice = %voices.host,
            guest_voice = %voices.guest,
            "Podcast session started"
        );
        Ok(Step::Generating(Live {
            context,
            voices,
            slot,
        }))
    }

    /// Register a session, taking over the id from an older stream if needed.
    fn register(&self, session: Session) -> Result<(), SessionError> {
        match self.registry.create(session.clone()) {
            Err(RegistryError::AlreadyExists(id)) => {
                if let Ok(previous) = self.registry.get(&id) {
                    warn!(session_id = %id, "New stream replaces an active session");
                    previous.cancel.cancel();
                    self.registry.remove_run(&id, previous.run);
                }
                self.registry.create(session).map_err(Into::into)
            }
            other => other.map_err(Into::into),
        }
    }

    async fn generate(&self, ctx: &mut RunCtx<'_>, live: Live) -> Result<Step, SessionError> {
        if let Some(max) = self.config.max_batches {
            if ctx.summary.batches >= max {
                info!(session_id = %ctx.id, max, "Batch limit reached");
                return Ok(finish(ctx, &live));
            }
        }

        let batch = until_cancelled(ctx.cancel, self.generator.generate(&live.context)).await??;
        ctx.summary.batches += 1;
        info!(
            session_id = %ctx.id,
            batch = ctx.summary.batches,
            segments = batch.len(),
            has_more = batch.has_more(),
            "Batch generated"
        );

        if batch.is_empty() {
            Ok(finish(ctx, &live))
        } else {
            Ok(Step::Playing(live, batch))
        }
    }

    async fn play<T>(
        &self,
        ctx: &mut RunCtx<'_>,
        transport: &mut T,
        live: Live,
        batch: GeneratedBatch,
    ) -> Result<Step, SessionError>
    where
        T: StreamTransport + ?Sized,
    {
        let player = TurnPlayer::new(
            self.synthesizer.as_ref(),
            &live.voices,
            &live.slot,
            ctx.cancel,
            self.config.segment_pause,
        );
        let outcome = player.play(transport, batch.segments()).await?;

        match outcome {
            PlayOutcome::Interrupted {
                prefix,
                interruption,
            } => {
                ctx.summary.segments_played += prefix.len();
                Ok(Step::Resuming {
                    live,
                    prefix,
                    interruption,
                })
            }
            PlayOutcome::Exhausted { delivered } => {
                ctx.summary.segments_played += delivered.len();
                if !batch.has_more() {
                    return Ok(finish(ctx, &live));
                }

                tokio::select! {
                    () = ctx.cancel.cancelled() => return Err(SessionError::Cancelled),
                    () = tokio::time::sleep(self.config.batch_pause) => {}
                    () = live.slot.pending() => {}
                }
                match live.slot.try_take() {
                    Some(interruption) => Ok(Step::Resuming {
                        live,
                        prefix: delivered,
                        interruption,
                    }),
                    None => Ok(Step::Generating(live)),
                }
            }
        }
    }

    async fn resume<T>(
        &self,
        ctx: &mut RunCtx<'_>,
        transport: &mut T,
        live: Live,
        prefix: &Transcript,
        interruption: Segment,
    ) -> Result<Step, SessionError>
    where
        T: StreamTransport + ?Sized,
    {
        until_cancelled(ctx.cancel, transport.send_text(&interruption.frame_text())).await??;

        let context = live.context.with_interruption(prefix, &interruption);
        let slot = InterruptionSlot::new();
        self.registry.replace(ctx.id, ctx.run, slot.clone())?;
        ctx.summary.interruptions += 1;

        info!(
            session_id = %ctx.id,
            played = prefix.len(),
            context_entries = context.len(),
            interruption = interruption.display_text(),
            "Resuming after interruption"
        );
        Ok(Step::Generating(Live {
            context,
            voices: live.voices,
            slot,
        }))
    }
}

/// Retire the slot so later offers are refused rather than silently dropped.
fn finish(ctx: &RunCtx<'_>, live: &Live) -> Step {
    if let Some(unplayed) = live.slot.retire() {
        warn!(
            session_id = %ctx.id,
            interruption = unplayed.display_text(),
            "Podcast finished before a pending interruption could be played"
        );
    }
    Step::Finished
}
