use anyhow::Context;
use buddy_core::{
    CaptureOutcome, Config, QueryForm, QueryOrchestrator, SubmitOutcome, VoiceAssistant,
    VoiceError,
    config::join_url,
    source::{SourceKind, backend::BackendSource},
};
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{Confirm, Text};
use std::{process::ExitCode, sync::Arc};

use crate::terminal::{LineRecognizer, TerminalChat, TerminalSpeaker, TerminalView};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "buddy", version, about = "Weather Buddy: risk forecasts and a chatty assistant")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the forecast service and defaults.
    Configure,

    /// Show the risk dashboard for a location.
    Forecast {
        /// Location name, e.g. "Paris".
        location: String,

        /// Date as YYYY-MM-DD; defaults to today.
        #[arg(long)]
        date: Option<String>,

        /// Time as HH:MM (24h); defaults to now.
        #[arg(long)]
        time: Option<String>,

        /// Where the forecast comes from: "mock" or "network". Defaults to
        /// the configured mock toggle.
        #[arg(long, value_parser = parse_source)]
        source: Option<SourceKind>,

        /// Print the dashboard as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Talk to Buddy. Every line you type is one listening session.
    Chat,

    /// Check that the forecast service is up.
    Health,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let config = Config::load()?;

        match self.command {
            Command::Configure => configure(config)?,
            Command::Forecast { location, date, time, source, json } => {
                let now = Local::now();
                let form = QueryForm::new(
                    location,
                    date.unwrap_or_else(|| now.format("%Y-%m-%d").to_string()),
                    time.unwrap_or_else(|| now.format("%H:%M").to_string()),
                );

                let view = Arc::new(TerminalView::new(json));
                let orchestrator = QueryOrchestrator::from_config(&config, view)?;
                if let Some(kind) = source {
                    orchestrator.set_mock(kind == SourceKind::Mock);
                }

                // The view has already shown the notice for a failure.
                if let SubmitOutcome::Invalid(_) | SubmitOutcome::Failed(_) =
                    orchestrator.submit(&form).await
                {
                    return Ok(ExitCode::FAILURE);
                }
            }
            Command::Chat => chat(&config).await,
            Command::Health => {
                let backend = BackendSource::from_config(&config.backend)?;
                let status = backend.health().await.with_context(|| {
                    format!("Forecast service at {} is not healthy", config.backend.base_url)
                })?;
                println!("{status}");
            }
        }

        Ok(ExitCode::SUCCESS)
    }
}

fn parse_source(value: &str) -> anyhow::Result<SourceKind> {
    SourceKind::try_from(value)
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let base_url = Text::new("Forecast service base URL:")
        .with_default(&config.backend.base_url)
        .prompt()?;
    let endpoint = Text::new("Forecast endpoint:")
        .with_default(&config.backend.endpoint)
        .prompt()?;

    // Reject unusable URLs before they reach the file.
    let url = join_url(&base_url, &endpoint)?;

    let use_mock = Confirm::new("Use mock data by default?")
        .with_default(config.use_mock)
        .prompt()?;

    config.backend.base_url = base_url;
    config.backend.endpoint = endpoint;
    config.use_mock = use_mock;
    config.save()?;

    println!("Forecasts will be requested from {url}");
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn chat(config: &Config) {
    let assistant = VoiceAssistant::new(
        Arc::new(LineRecognizer::default()),
        Arc::new(TerminalSpeaker),
        Arc::new(TerminalChat::default()),
        config,
    );

    loop {
        match assistant.listen_once().await {
            CaptureOutcome::Unavailable(VoiceError::Unavailable(reason)) => {
                tracing::debug!(%reason, "ending chat");
                break;
            }
            CaptureOutcome::Unavailable(err) => eprintln!("{err}"),
            CaptureOutcome::Replied { .. } | CaptureOutcome::NoResult => {}
        }
    }
}
