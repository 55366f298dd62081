use async_trait::async_trait;
use chrono::Local;

use crate::{
    error::ForecastError,
    model::{HourSlice, Metrics, Query, RawForecast, Risks},
};

use super::ForecastSource;

/// Offline source with fixed example data. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockSource;

impl MockSource {
    pub fn forecast_for(query: &Query) -> RawForecast {
        let when = query.instant.with_timezone(&Local).format("%Y-%m-%d %H:%M");

        RawForecast {
            overall: Some("Moderate".to_string()),
            summary: Some(format!("Mock forecast for {} at {when}", query.location)),
            risks: Some(Risks {
                heat: Some("Low".into()),
                cold: Some("Low".into()),
                wind: Some("Moderate".into()),
                rain: Some("Moderate".into()),
                comfort: Some("Moderate".into()),
            }),
            metrics: Some(Metrics {
                temperature: Some("28°C".into()),
                humidity: Some("62%".into()),
                wind: Some("12 km/h".into()),
                precipitation: Some("40%".into()),
                uv_index: Some("6".into()),
                visibility: Some("9 km".into()),
            }),
            hours: Some(vec![
                hour("10:00", "28°C", "Clear", 20.0, 8.0),
                hour("11:00", "30°C", "Cloudy", 35.0, 10.0),
                hour("12:00", "31°C", "Rainy", 60.0, 14.0),
            ]),
        }
    }
}

fn hour(time: &str, temp: &str, summary: &str, rain: f64, wind: f64) -> HourSlice {
    HourSlice {
        time: Some(time.into()),
        temp: Some(temp.into()),
        summary: Some(summary.into()),
        rain: Some(rain),
        wind: Some(wind),
    }
}

#[async_trait]
impl ForecastSource for MockSource {
    async fn produce(&self, query: &Query) -> Result<Option<RawForecast>, ForecastError> {
        tracing::debug!(location = %query.location, "serving mock forecast");
        Ok(Some(Self::forecast_for(query)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QueryForm;

    #[tokio::test]
    async fn mock_is_deterministic() {
        let query = QueryForm::new("Paris", "2024-07-01", "14:00").validate().unwrap();

        let a = MockSource.produce(&query).await.unwrap().unwrap();
        let b = MockSource.produce(&query).await.unwrap().unwrap();
        assert_eq!(a, b);

        assert_eq!(a.overall.as_deref(), Some("Moderate"));
        assert_eq!(a.hours.as_ref().map(Vec::len), Some(3));
        assert_eq!(a.summary.as_deref(), Some("Mock forecast for Paris at 2024-07-01 14:00"));
    }
}
