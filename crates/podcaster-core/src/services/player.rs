use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::until_cancelled;
use crate::domain::{InterruptionSlot, Segment, Transcript, VoicePair};
use crate::error::SessionError;
use crate::ports::{GenerationError, SpeechSynthesizer, StreamTransport};

/// How a batch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Every segment was delivered.
    Exhausted { delivered: Transcript },
    /// An interruption was observed at a segment boundary. `prefix` holds
    /// exactly the segments that reached the listener.
    Interrupted {
        prefix: Transcript,
        interruption: Segment,
    },
}

/// Plays one batch of segments to the listener.
///
/// For each segment: check the slot, send the text frame, synthesize and
/// send the audio, then pause. The pause ends early when an interruption is
/// offered so the boundary check right after it can act on it.
pub struct TurnPlayer<'a> {
    synthesizer: &'a dyn SpeechSynthesizer,
    voices: &'a VoicePair,
    slot: &'a InterruptionSlot,
    cancel: &'a CancellationToken,
    segment_pause: Duration,
}

impl<'a> TurnPlayer<'a> {
    pub const fn new(
        synthesizer: &'a dyn SpeechSynthesizer,
        voices: &'a VoicePair,
        slot: &'a InterruptionSlot,
        cancel: &'a CancellationToken,
        segment_pause: Duration,
    ) -> Self {
        Self {
            synthesizer,
            voices,
            slot,
            cancel,
            segment_pause,
        }
    }

    pub async fn play<T>(
        &self,
        transport: &mut T,
        segments: &[Segment],
    ) -> Result<PlayOutcome, SessionError>
    where
        T: StreamTransport + ?Sized,
    {
        let mut delivered = Transcript::new();

        for (index, segment) in segments.iter().enumerate() {
            if let Some(interruption) = self.slot.try_take() {
                debug!(segment = index, "Interruption observed before segment");
                return Ok(PlayOutcome::Interrupted {
                    prefix: delivered,
                    interruption,
                });
            }

            self.deliver(transport, segment).await?;
            delivered.push(segment.clone());
            debug!(segment = index, speaker = %segment.speaker(), "Segment delivered");

            self.pause().await?;
        }

        if let Some(interruption) = self.slot.try_take() {
            debug!("Interruption observed after final segment");
            return Ok(PlayOutcome::Interrupted {
                prefix: delivered,
                interruption,
            });
        }
        Ok(PlayOutcome::Exhausted { delivered })
    }

    async fn deliver<T>(&self, transport: &mut T, segment: &Segment) -> Result<(), SessionError>
    where
        T: StreamTransport + ?Sized,
    {
        let voice = self.voices.voice_for(segment.speaker()).ok_or_else(|| {
            GenerationError::InvalidResponse(format!("no voice for speaker {}", segment.speaker()))
        })?;

        let frame = segment.frame_text();
        until_cancelled(self.cancel, transport.send_text(&frame)).await??;

        let audio = until_cancelled(
            self.cancel,
            self.synthesizer.synthesize(segment.display_text(), voice),
        )
        .await?
        .map_err(SessionError::Synthesis)?;

        until_cancelled(self.cancel, transport.send_audio(audio)).await??;
        Ok(())
    }

    async fn pause(&self) -> Result<(), SessionError> {
        tokio::select! {
            () = self.cancel.cancelled() => Err(SessionError::Cancelled),
            () = tokio::time::sleep(self.segment_pause) => Ok(()),
            () = self.slot.pending() => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::Speaker;
    use crate::ports::SpeechError;
    use crate::testing::{FakeSynthesizer, FakeTransport, Frame, segments};

    const PAUSE: Duration = Duration::from_secs(3);

    fn voices() -> VoicePair {
        VoicePair {
            host: "alloy".into(),
            guest: "echo".into(),
        }
    }

    fn batch() -> Vec<Segment> {
        segments(&[
            ("Host", "Welcome to the show."),
            ("Guest", "Glad to be here."),
            ("Host", "Let's talk Rust."),
            ("Guest", "Ownership first."),
        ])
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_batch_sends_text_then_audio_in_order() {
        let synth = FakeSynthesizer::new();
        let slot = InterruptionSlot::new();
        let cancel = CancellationToken::new();
        let voices = voices();
        let mut transport = FakeTransport::new();
        let player = TurnPlayer::new(&synth, &voices, &slot, &cancel, PAUSE);

        let outcome = player.play(&mut transport, &batch()).await.unwrap();

        let PlayOutcome::Exhausted { delivered } = outcome else {
            panic!("expected exhausted, got {outcome:?}");
        };
        assert_eq!(delivered.len(), 4);
        assert_eq!(
            transport.frames(),
            vec![
                Frame::Text("Host: Welcome to the show.".into()),
                Frame::Audio(b"alloy|Welcome to the show.".to_vec()),
                Frame::Text("Guest: Glad to be here.".into()),
                Frame::Audio(b"echo|Glad to be here.".to_vec()),
                Frame::Text("Host: Let's talk Rust.".into()),
                Frame::Audio(b"alloy|Let's talk Rust.".to_vec()),
                Frame::Text("Guest: Ownership first.".into()),
                Frame::Audio(b"echo|Ownership first.".to_vec()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn interruption_during_segment_truncates_after_it() {
        let synth = FakeSynthesizer::new();
        let slot = InterruptionSlot::new();
        let cancel = CancellationToken::new();
        let voices = voices();
        let writer = slot.clone();
        let mut transport = FakeTransport::new().on_audio(move |index| {
            if index == 2 {
                writer
                    .offer(Segment::listener_interruption("what about async?").unwrap())
                    .unwrap();
            }
        });
        let player = TurnPlayer::new(&synth, &voices, &slot, &cancel, PAUSE);

        let outcome = player.play(&mut transport, &batch()).await.unwrap();

        let PlayOutcome::Interrupted {
            prefix,
            interruption,
        } = outcome
        else {
            panic!("expected interruption, got {outcome:?}");
        };
        assert_eq!(prefix.segments(), &batch()[..3]);
        assert_eq!(interruption.speaker(), Speaker::Listener);
        assert_eq!(transport.texts().len(), 3);
        assert!(
            !transport
                .texts()
                .iter()
                .any(|t| t.contains("Ownership first."))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn interruption_wakes_pacing_pause() {
        let synth = FakeSynthesizer::new();
        let slot = InterruptionSlot::new();
        let cancel = CancellationToken::new();
        let voices = voices();
        let mut transport = FakeTransport::new();
        let long_pause = Duration::from_secs(3600);
        let player = TurnPlayer::new(&synth, &voices, &slot, &cancel, long_pause);

        let writer = slot.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            writer
                .offer(Segment::listener_interruption("hurry up").unwrap())
                .unwrap();
        });

        let started = tokio::time::Instant::now();
        let outcome = player.play(&mut transport, &batch()).await.unwrap();

        assert!(matches!(
            outcome,
            PlayOutcome::Interrupted { ref prefix, .. } if prefix.len() == 1
        ));
        assert!(started.elapsed() < long_pause);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_interruption_before_first_segment_yields_empty_prefix() {
        let synth = FakeSynthesizer::new();
        let slot = InterruptionSlot::new();
        slot.offer(Segment::listener_interruption("early").unwrap())
            .unwrap();
        let cancel = CancellationToken::new();
        let voices = voices();
        let mut transport = FakeTransport::new();
        let player = TurnPlayer::new(&synth, &voices, &slot, &cancel, PAUSE);

        let outcome = player.play(&mut transport, &batch()).await.unwrap();

        assert!(matches!(
            outcome,
            PlayOutcome::Interrupted { ref prefix, .. } if prefix.is_empty()
        ));
        assert!(transport.frames().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn synthesis_failure_is_fatal() {
        let synth = FakeSynthesizer::failing_on("Let's talk Rust.");
        let slot = InterruptionSlot::new();
        let cancel = CancellationToken::new();
        let voices = voices();
        let mut transport = FakeTransport::new();
        let player = TurnPlayer::new(&synth, &voices, &slot, &cancel, PAUSE);

        let err = player.play(&mut transport, &batch()).await.unwrap_err();

        assert!(matches!(err, SessionError::Synthesis(SpeechError::Unavailable(_))));
        // Text for the failing segment went out; nothing after it did.
        assert_eq!(transport.texts().len(), 3);
        assert_eq!(transport.audio_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_playback() {
        let synth = FakeSynthesizer::new();
        let slot = InterruptionSlot::new();
        let cancel = CancellationToken::new();
        let voices = voices();
        let trigger = cancel.clone();
        let mut transport = FakeTransport::new().on_audio(move |index| {
            if index == 0 {
                trigger.cancel();
            }
        });
        let player = TurnPlayer::new(&synth, &voices, &slot, &cancel, PAUSE);

        let err = player.play(&mut transport, &batch()).await.unwrap_err();

        assert!(matches!(err, SessionError::Cancelled));
        assert_eq!(transport.texts().len(), 1);
    }

    #[tokio::test]
    async fn mocked_synthesizer_receives_speaker_voice() {
        use crate::ports::speech::MockSpeechSynthesizer;

        let mut synth = MockSpeechSynthesizer::new();
        synth
            .expect_synthesize()
            .withf(|text, voice| text == "Hi." && voice.as_str() == "echo")
            .times(1)
            .returning(|_, _| Ok(vec![1, 2, 3]));
        let synth = Arc::new(synth);

        let slot = InterruptionSlot::new();
        let cancel = CancellationToken::new();
        let voices = voices();
        let mut transport = FakeTransport::new();
        let player = TurnPlayer::new(synth.as_ref(), &voices, &slot, &cancel, Duration::ZERO);

        let outcome = player
            .play(&mut transport, &segments(&[("Guest", "Hi.")]))
            .await
            .unwrap();

        assert!(matches!(outcome, PlayOutcome::Exhausted { .. }));
        assert_eq!(transport.audio_count(), 1);
    }
}
