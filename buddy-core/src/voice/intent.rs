use serde::Serialize;

/// What the user seems to be asking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Tip,
    Forecast,
    Rain,
    Heat,
    Cold,
    Farewell,
    Unknown,
}

/// Keywords per intent, in priority order. First containing match wins.
const KEYWORDS: &[(Intent, &[&str])] = &[
    (Intent::Greeting, &["hi", "hello"]),
    (Intent::Tip, &["weather tip", "tip"]),
    (Intent::Forecast, &["how is the weather", "weather today"]),
    (Intent::Rain, &["rain"]),
    (Intent::Heat, &["hot", "heat"]),
    (Intent::Cold, &["cold", "chilly"]),
    (Intent::Farewell, &["bye"]),
];

impl Intent {
    /// Classify by case-insensitive substring containment.
    ///
    /// Matching is on raw substrings, so "hi" also fires inside words such
    /// as "this" or "chilly".
    pub fn classify(transcript: &str) -> Self {
        let lower = transcript.to_lowercase();

        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
            .map(|(intent, _)| *intent)
            .unwrap_or(Intent::Unknown)
    }

    pub fn reply(&self) -> &'static str {
        match self {
            Intent::Greeting => "Hii there! 🌞 Ready for a weather adventure?",
            Intent::Tip => {
                "Sure! 🌦️ Always check the UV index before heading out — sunscreen saves skin!"
            }
            Intent::Forecast => {
                "Let me guess... it's either sunny, rainy, or confusing! 😄 But always good to check your local forecast!"
            }
            Intent::Rain => "Looks like puddle season ☔ — grab your boots and umbrella!",
            Intent::Heat => "Stay cool 😎 and hydrated — wear light clothes and sip water often!",
            Intent::Cold => "Brrr 🧣! Layer up and keep warm with a cozy drink!",
            Intent::Farewell => "Catch you later! 🌈 Stay weather-wise!",
            Intent::Unknown => "Hmm, I didn't catch that 🤔",
        }
    }
}
