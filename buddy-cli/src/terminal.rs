//! Terminal stand-ins for the dashboard, the chat pane and the speech platform.

use async_trait::async_trait;
use buddy_core::{
    ChatMessage, ChatSurface, Dashboard, Notice, ViewSurface, Visibility, VoiceError,
    voice::{RecognitionEvent, Speaker, SpeechRecognizer, SpeechSynthesizer},
};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin},
    sync::{Mutex, mpsc},
};

/// Prints dashboards to stdout and everything else to stderr.
#[derive(Debug)]
pub struct TerminalView {
    json: bool,
}

impl TerminalView {
    pub fn new(json: bool) -> Self {
        Self { json }
    }
}

impl ViewSurface for TerminalView {
    fn set_visibility(&self, visibility: Visibility) {
        if visibility == Visibility::Loading {
            eprintln!("Loading forecast...");
        }
    }

    // Lines scroll away on their own; the duration has no meaning here.
    fn notice(&self, notice: Notice) {
        eprintln!("» {}", notice.message);
    }

    fn show_dashboard(&self, dashboard: &Dashboard) {
        if self.json {
            match serde_json::to_string_pretty(dashboard) {
                Ok(json) => println!("{json}"),
                Err(err) => tracing::error!(error = %err, "could not serialize dashboard"),
            }
        } else {
            print!("{}", format_dashboard(dashboard));
        }
    }
}

pub fn format_dashboard(dashboard: &Dashboard) -> String {
    let chips: Vec<String> =
        dashboard.chips.iter().map(|c| format!("{}: {}", c.label, c.value)).collect();

    let mut lines = vec![
        format!("[{}] {}", dashboard.badge.text, dashboard.summary),
        String::new(),
        format!("Risks  {}", chips.join("  ")),
        String::new(),
    ];

    lines.extend(dashboard.details.iter().map(|row| format!("{:<14} {}", row.label, row.value)));

    if !dashboard.timeline.is_empty() {
        lines.push(String::new());
        lines.push("Hourly".to_string());
        lines.extend(dashboard.timeline.iter().map(|tile| {
            format!("  {:<6} {:<20} {}", tile.time, tile.headline(), tile.detail())
        }));
    }

    lines.push(String::new());
    lines.join("\n")
}

#[derive(Debug, Default)]
pub struct TerminalChat;

impl ChatSurface for TerminalChat {
    fn append(&self, message: &ChatMessage) {
        let who = match message.from {
            Speaker::User => "you",
            Speaker::Buddy => "buddy",
        };
        println!("{who}: {}", message.text);
    }

    fn set_listening(&self, listening: bool) {
        tracing::debug!(listening, "talk control");
        if listening {
            eprint!("🎙️ Talk to Buddy: ");
        }
    }
}

/// No audio output on a terminal; the reply is already in the chat.
#[derive(Debug, Default)]
pub struct TerminalSpeaker;

impl SpeechSynthesizer for TerminalSpeaker {
    fn speak(&self, text: &str, locale: &str) {
        tracing::debug!(%locale, chars = text.chars().count(), "speaking reply");
    }
}

/// Treats each input line as one capture session. A blank line is a
/// session with no speech; end of input closes the recognizer.
///
/// `start` hands back the event channel at once and reads the line in the
/// background, so the session is live while the user is still typing.
pub struct LineRecognizer<R = BufReader<Stdin>> {
    lines: Arc<Mutex<Lines<R>>>,
    closed: Arc<AtomicBool>,
}

impl<R> LineRecognizer<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    pub fn new(reader: R) -> Self {
        Self { lines: Arc::new(Mutex::new(reader.lines())), closed: Arc::new(AtomicBool::new(false)) }
    }
}

impl Default for LineRecognizer {
    fn default() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

#[async_trait]
impl<R> SpeechRecognizer for LineRecognizer<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    async fn start(&self) -> Result<mpsc::Receiver<RecognitionEvent>, VoiceError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(VoiceError::Unavailable("input closed".to_string()));
        }
        let mut lines = self.lines.clone().try_lock_owned().map_err(|_| VoiceError::CaptureBusy)?;

        // Started, Result, End.
        let (tx, rx) = mpsc::channel(3);
        let closed = self.closed.clone();

        tokio::spawn(async move {
            let _ = tx.send(RecognitionEvent::Started).await;

            let event = match lines.next_line().await {
                Ok(Some(line)) => {
                    let transcript = line.trim();
                    if !transcript.is_empty() {
                        let _ = tx.send(RecognitionEvent::Result(transcript.to_string())).await;
                    }
                    RecognitionEvent::End
                }
                Ok(None) => {
                    closed.store(true, Ordering::SeqCst);
                    RecognitionEvent::End
                }
                Err(err) => RecognitionEvent::Error(err.to_string()),
            };

            // Release the input before the session ends so the next start succeeds.
            drop(lines);
            let _ = tx.send(event).await;
        });

        Ok(rx)
    }
}
