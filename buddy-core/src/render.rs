//! Pure transform from a canonical forecast to displayable fragments.

use serde::Serialize;

use crate::{
    model::{Forecast, HourSlice},
    normalize::PLACEHOLDER,
    risk::SeverityTier,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub tier: SeverityTier,
    pub text: &'static str,
    pub class: Option<&'static str>,
}

/// A `label: value` pair, used for both risk chips and metric rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Labeled {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourTile {
    pub time: String,
    pub temp: String,
    pub summary: String,
    pub rain: String,
    pub wind: String,
}

impl HourTile {
    /// `28°C • Clear`
    pub fn headline(&self) -> String {
        format!("{} • {}", self.temp, self.summary)
    }

    /// `Rain: 20% · Wind: 8 km/h`
    pub fn detail(&self) -> String {
        format!("Rain: {}% · Wind: {} km/h", self.rain, self.wind)
    }
}

/// Everything the results view shows for one forecast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub badge: Badge,
    pub summary: String,
    pub chips: Vec<Labeled>,
    pub details: Vec<Labeled>,
    pub timeline: Vec<HourTile>,
}

impl Dashboard {
    pub fn render(forecast: &Forecast) -> Self {
        let tier = SeverityTier::classify(Some(forecast.overall.as_str()));
        let badge = Badge { tier, text: tier.label(), class: tier.style_class() };

        let summary = if forecast.summary.is_empty() {
            PLACEHOLDER.to_string()
        } else {
            forecast.summary.clone()
        };

        let risks = &forecast.risks;
        let chips = vec![
            labeled("Heat", &risks.heat),
            labeled("Cold", &risks.cold),
            labeled("Wind", &risks.wind),
            labeled("Rain", &risks.rain),
            labeled("Comfort", &risks.comfort),
        ];

        let metrics = &forecast.metrics;
        let details = vec![
            labeled("Temperature", &metrics.temperature),
            labeled("Humidity", &metrics.humidity),
            labeled("Wind", &metrics.wind),
            labeled("Precipitation", &metrics.precipitation),
            labeled("UV Index", &metrics.uv_index),
            labeled("Visibility", &metrics.visibility),
        ];

        let timeline = forecast.hours.iter().map(tile).collect();

        Self { badge, summary, chips, details, timeline }
    }
}

fn or_placeholder(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn labeled(label: &'static str, value: &Option<String>) -> Labeled {
    Labeled { label, value: or_placeholder(value) }
}

fn number(value: Option<f64>) -> String {
    value.map(|n| n.to_string()).unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn tile(hour: &HourSlice) -> HourTile {
    HourTile {
        time: or_placeholder(&hour.time),
        temp: or_placeholder(&hour.temp),
        summary: or_placeholder(&hour.summary),
        rain: number(hour.rain),
        wind: number(hour.wind),
    }
}
