//! Voice-driven chat assistant.
//!
//! One capture session at a time: the assistant asks the recognizer for a
//! session, listens until the first terminal event (a transcript or the end
//! of capture) and then goes back to idle. A transcript produces exactly one
//! reply, shown in the chat and spoken aloud. A session that ends without a
//! transcript produces nothing.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::{Config, error::VoiceError};

pub mod intent;

pub use intent::Intent;

/// Lifecycle events of one capture session, as delivered by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    Started,
    /// Final transcript. Recognition is single-shot, so at most one per session.
    Result(String),
    End,
    Error(String),
}

/// The speech-to-text side of the platform.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Open a capture session. Fails if the microphone is already in use or
    /// no recognizer is available.
    async fn start(&self) -> Result<mpsc::Receiver<RecognitionEvent>, VoiceError>;
}

/// The text-to-speech side of the platform.
pub trait SpeechSynthesizer: Send + Sync {
    fn speak(&self, text: &str, locale: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Buddy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub from: Speaker,
    pub text: String,
}

/// Where the conversation is shown.
pub trait ChatSurface: Send + Sync {
    fn append(&self, message: &ChatMessage);

    /// Reflect the listening state on the talk control.
    fn set_listening(&self, listening: bool);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Idle,
    Listening,
}

/// How one capture session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    Replied { transcript: String, intent: Intent },
    /// Capture ended without a transcript; nothing was said back.
    NoResult,
    /// The recognizer refused to start a session.
    Unavailable(VoiceError),
}

pub struct VoiceAssistant {
    recognizer: Arc<dyn SpeechRecognizer>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    chat: Arc<dyn ChatSurface>,
    locale: String,
    state: Mutex<VoiceState>,
}

impl VoiceAssistant {
    pub fn new(
        recognizer: Arc<dyn SpeechRecognizer>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        chat: Arc<dyn ChatSurface>,
        config: &Config,
    ) -> Self {
        Self {
            recognizer,
            synthesizer,
            chat,
            locale: config.voice.locale.clone(),
            state: Mutex::new(VoiceState::Idle),
        }
    }

    pub fn state(&self) -> VoiceState {
        *self.state.lock()
    }

    /// Run one capture session to completion.
    pub async fn listen_once(&self) -> CaptureOutcome {
        let mut events = match self.recognizer.start().await {
            Ok(events) => events,
            Err(err) => {
                tracing::warn!(error = %err, "could not start speech capture");
                return CaptureOutcome::Unavailable(err);
            }
        };

        self.enter(VoiceState::Listening);

        let outcome = loop {
            match events.recv().await {
                Some(RecognitionEvent::Started) => continue,
                Some(RecognitionEvent::Result(transcript)) => break self.respond(transcript),
                Some(RecognitionEvent::Error(reason)) => {
                    tracing::debug!(%reason, "speech capture failed");
                    break CaptureOutcome::NoResult;
                }
                Some(RecognitionEvent::End) | None => break CaptureOutcome::NoResult,
            }
        };

        self.enter(VoiceState::Idle);
        outcome
    }

    /// Append the transcript, classify it and say exactly one reply.
    pub fn respond(&self, transcript: String) -> CaptureOutcome {
        self.chat.append(&ChatMessage { from: Speaker::User, text: transcript.clone() });

        let intent = Intent::classify(&transcript);
        let reply = intent.reply();
        tracing::info!(?intent, "buddy replying");

        self.chat.append(&ChatMessage { from: Speaker::Buddy, text: reply.to_string() });
        self.synthesizer.speak(reply, &self.locale);

        CaptureOutcome::Replied { transcript, intent }
    }

    fn enter(&self, next: VoiceState) {
        let mut state = self.state.lock();
        tracing::debug!(from = ?*state, to = ?next, "voice state");
        *state = next;
        self.chat.set_listening(next == VoiceState::Listening);
    }
}
