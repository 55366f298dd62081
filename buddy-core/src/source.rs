use crate::{
    Config,
    error::ForecastError,
    model::{Query, RawForecast},
    source::{backend::BackendSource, mock::MockSource},
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug, sync::Arc};

pub mod backend;
pub mod mock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Mock,
    Network,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Mock => "mock",
            SourceKind::Network => "network",
        }
    }

    pub const fn all() -> &'static [SourceKind] {
        &[SourceKind::Mock, SourceKind::Network]
    }

    /// The kind selected by the mock toggle.
    pub fn from_mock_flag(use_mock: bool) -> Self {
        if use_mock { SourceKind::Mock } else { SourceKind::Network }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SourceKind {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.trim().to_lowercase();

        SourceKind::all().iter().copied().find(|kind| kind.as_str() == lower).ok_or_else(|| {
            let supported: Vec<&str> = SourceKind::all().iter().map(SourceKind::as_str).collect();
            anyhow::anyhow!(
                "Unknown forecast source '{value}'. Supported sources: {}.",
                supported.join(", ")
            )
        })
    }
}

/// Something that can produce a forecast payload for a query.
///
/// `Ok(None)` means the source answered with an empty (`null`) payload.
#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    async fn produce(&self, query: &Query) -> Result<Option<RawForecast>, ForecastError>;
}

/// Construct a source of the given kind from config.
pub fn source_from_config(
    kind: SourceKind,
    config: &Config,
) -> anyhow::Result<Arc<dyn ForecastSource>> {
    let source: Arc<dyn ForecastSource> = match kind {
        SourceKind::Mock => Arc::new(MockSource),
        SourceKind::Network => Arc::new(BackendSource::from_config(&config.backend)?),
    };

    Ok(source)
}
