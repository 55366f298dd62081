use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

/// Query fields as entered by the user, before validation.
#[derive(Debug, Clone, Default)]
pub struct QueryForm {
    pub location: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`, seconds optional.
    pub time: String,
}

impl QueryForm {
    pub fn new(
        location: impl Into<String>,
        date: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        Self { location: location.into(), date: date.into(), time: time.into() }
    }

    /// Check that every field is present and combine date and time into one
    /// instant, reading them as local wall-clock time.
    pub fn validate(&self) -> Result<Query, ValidationError> {
        let location = self.location.trim();
        let date = self.date.trim();
        let time = self.time.trim();

        if location.is_empty() {
            return Err(ValidationError::MissingField("location"));
        }
        if date.is_empty() {
            return Err(ValidationError::MissingField("date"));
        }
        if time.is_empty() {
            return Err(ValidationError::MissingField("time"));
        }

        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate(date.to_string()))?;
        let time = NaiveTime::parse_from_str(time, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
            .map_err(|_| ValidationError::InvalidTime(time.to_string()))?;

        let local = date.and_time(time);
        let instant = Local
            .from_local_datetime(&local)
            .earliest()
            .ok_or_else(|| ValidationError::NonexistentLocalTime(local.to_string()))?
            .with_timezone(&Utc);

        Ok(Query { location: location.to_string(), local, instant })
    }
}

/// A validated query, ready to hand to a forecast source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub location: String,
    /// Wall-clock date and time as entered.
    pub local: NaiveDateTime,
    pub instant: DateTime<Utc>,
}

impl Query {
    /// The instant as sent on the wire, e.g. `2024-07-01T12:00:00.000Z`.
    pub fn iso_instant(&self) -> String {
        self.instant.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Forecast payload as received. Every key may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawForecast {
    #[serde(deserialize_with = "text")]
    pub overall: Option<String>,
    #[serde(deserialize_with = "summary_text")]
    pub summary: Option<String>,
    pub risks: Option<Risks>,
    pub metrics: Option<Metrics>,
    pub hours: Option<Vec<HourSlice>>,
}

/// Severity label per risk category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Risks {
    #[serde(deserialize_with = "text")]
    pub heat: Option<String>,
    #[serde(deserialize_with = "text")]
    pub cold: Option<String>,
    #[serde(deserialize_with = "text")]
    pub wind: Option<String>,
    #[serde(deserialize_with = "text")]
    pub rain: Option<String>,
    #[serde(deserialize_with = "text")]
    pub comfort: Option<String>,
}

/// Display strings per metric.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metrics {
    #[serde(deserialize_with = "text")]
    pub temperature: Option<String>,
    #[serde(deserialize_with = "text")]
    pub humidity: Option<String>,
    #[serde(deserialize_with = "text")]
    pub wind: Option<String>,
    #[serde(deserialize_with = "text")]
    pub precipitation: Option<String>,
    #[serde(deserialize_with = "text")]
    pub uv_index: Option<String>,
    #[serde(deserialize_with = "text")]
    pub visibility: Option<String>,
}

/// One hourly entry. Rendered as-is; missing values show as "—".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HourSlice {
    #[serde(deserialize_with = "text")]
    pub time: Option<String>,
    #[serde(deserialize_with = "text")]
    pub temp: Option<String>,
    #[serde(deserialize_with = "text")]
    pub summary: Option<String>,
    /// Chance of rain, percent.
    #[serde(deserialize_with = "number")]
    pub rain: Option<f64>,
    /// Wind speed, km/h.
    #[serde(deserialize_with = "number")]
    pub wind: Option<f64>,
}

/// Canonical forecast: every field present, defaults filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub overall: String,
    pub summary: String,
    pub risks: Risks,
    pub metrics: Metrics,
    pub hours: Vec<HourSlice>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Text(s) => s,
            Scalar::Number(n) => n.to_string(),
            Scalar::Flag(b) => b.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SummaryText {
    Line(String),
    Lines(Vec<String>),
}

/// Leaf values may come as strings or numbers; both are shown as text.
fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_text))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric {
    Number(f64),
    Text(String),
}

/// Numbers may come quoted, e.g. `"rain": "20"`.
fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Numeric>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Numeric::Number(n)) => Ok(Some(n)),
        Some(Numeric::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("expected a number, got \"{s}\""))),
    }
}

/// The forecast service may send its summary as a list of phrases.
fn summary_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<SummaryText>::deserialize(deserializer)?.map(|s| match s {
        SummaryText::Line(line) => line,
        SummaryText::Lines(lines) => lines.join(", "),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn validate_rejects_blank_location() {
        let form = QueryForm::new("   ", "2024-07-01", "14:00");
        assert_eq!(form.validate(), Err(ValidationError::MissingField("location")));
    }

    #[test]
    fn validate_rejects_missing_date_and_time() {
        let form = QueryForm::new("Paris", "", "14:00");
        assert_eq!(form.validate(), Err(ValidationError::MissingField("date")));

        let form = QueryForm::new("Paris", "2024-07-01", "");
        assert_eq!(form.validate(), Err(ValidationError::MissingField("time")));
    }

    #[test]
    fn validate_rejects_malformed_values() {
        let form = QueryForm::new("Paris", "01/07/2024", "14:00");
        assert!(matches!(form.validate(), Err(ValidationError::InvalidDate(_))));

        let form = QueryForm::new("Paris", "2024-07-01", "2pm");
        assert!(matches!(form.validate(), Err(ValidationError::InvalidTime(_))));
    }

    #[test]
    fn validate_combines_date_and_time() {
        let query = QueryForm::new(" Paris ", "2024-07-01", "14:00").validate().unwrap();
        assert_eq!(query.location, "Paris");
        assert_eq!(query.local.hour(), 14);
        assert_eq!(query.instant, Local.from_local_datetime(&query.local).earliest().unwrap());
        assert!(query.iso_instant().ends_with(":00.000Z"));
    }

    #[test]
    fn raw_forecast_accepts_numbers_and_summary_lists() {
        let raw: RawForecast = serde_json::from_value(serde_json::json!({
            "summary": ["Very Hot", "Very Wet"],
            "metrics": { "uv_index": 6, "humidity": "62%" },
            "hours": [{ "time": "10:00", "temp": 28, "rain": 20, "wind": 8.5 }]
        }))
        .unwrap();

        assert_eq!(raw.overall, None);
        assert_eq!(raw.summary.as_deref(), Some("Very Hot, Very Wet"));

        let metrics = raw.metrics.unwrap();
        assert_eq!(metrics.uv_index.as_deref(), Some("6"));
        assert_eq!(metrics.visibility, None);

        let hour = &raw.hours.unwrap()[0];
        assert_eq!(hour.temp.as_deref(), Some("28"));
        assert_eq!(hour.summary, None);
        assert_eq!(hour.wind, Some(8.5));
    }

    #[test]
    fn hour_numbers_may_be_quoted() {
        let raw: RawForecast = serde_json::from_str(
            r#"{"overall":"Low","hours":[{"time":"10:00","rain":"20","wind":" 8.5 "}]}"#,
        )
        .unwrap();

        let hour = &raw.hours.unwrap()[0];
        assert_eq!(hour.rain, Some(20.0));
        assert_eq!(hour.wind, Some(8.5));
    }

    #[test]
    fn non_numeric_hour_value_is_rejected() {
        let err = serde_json::from_str::<RawForecast>(r#"{"hours":[{"rain":"lots"}]}"#).unwrap_err();
        assert!(err.to_string().contains("expected a number"));
    }

    #[test]
    fn raw_forecast_treats_null_leaves_as_absent() {
        let raw: RawForecast =
            serde_json::from_str(r#"{"overall": null, "risks": {"heat": null}}"#).unwrap();
        assert_eq!(raw.overall, None);
        assert_eq!(raw.risks, Some(Risks::default()));
    }
}
