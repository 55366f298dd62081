//! Core library for Weather Buddy.
//!
//! This crate defines:
//! - Configuration handling
//! - Forecast sources (HTTP service or built-in mock data)
//! - Normalization and rendering of forecast payloads into a dashboard
//! - The query orchestrator driving a view surface
//! - The voice assistant state machine and its keyword classifier
//!
//! Presentation and speech platforms are traits; `buddy-cli` implements them
//! for a terminal.

pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod orchestrator;
pub mod render;
pub mod risk;
pub mod source;
pub mod view;
pub mod voice;

pub use config::{BackendConfig, Config, VoiceConfig};
pub use error::{ForecastError, ValidationError, VoiceError};
pub use model::{Forecast, HourSlice, Metrics, Query, QueryForm, RawForecast, Risks};
pub use normalize::normalize;
pub use orchestrator::{Phase, QueryOrchestrator, SubmitOutcome};
pub use render::Dashboard;
pub use risk::SeverityTier;
pub use source::{ForecastSource, SourceKind, source_from_config};
pub use view::{Notice, ViewSurface, Visibility};
pub use voice::{CaptureOutcome, ChatMessage, ChatSurface, Intent, VoiceAssistant};
