//! Display profile of one side of the pairing.

use serde::{Deserialize, Serialize};

/// Maximum number of characters in derived initials.
pub const MAX_INITIALS: usize = 3;

/// Name, initials and optional location of a person.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub initials: String,
    pub city_label: Option<String>,
    pub country: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl Profile {
    /// Creates a profile with a name and initials and no location.
    pub fn new(name: impl Into<String>, initials: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initials: initials.into(),
            ..Self::default()
        }
    }

    /// Profile used for this device's user before anything was entered.
    pub fn default_me() -> Self {
        Self::new("Me", "A")
    }

    /// Profile used for the other person before anything was entered.
    pub fn default_partner() -> Self {
        Self::new("Partner", "B")
    }

    /// Replaces the name and recomputes the initials.
    pub fn set_name(&mut self, name: impl Into<String>, fallback_initials: &str) {
        self.name = name.into();
        self.initials = initials(&self.name, fallback_initials);
    }

    /// Sets or clears the location in one step.
    pub fn set_location(
        &mut self,
        city_label: Option<String>,
        country: Option<String>,
        coordinates: Option<(f64, f64)>,
    ) {
        self.city_label = city_label;
        self.country = country;
        self.lat = coordinates.map(|(lat, _)| lat);
        self.lon = coordinates.map(|(_, lon)| lon);
    }

    /// Removes the location.
    pub fn clear_location(&mut self) {
        self.set_location(None, None, None);
    }

    /// Returns `(lat, lon)` when both are set and a non-empty city label
    /// accompanies them.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let label = self.city_label.as_deref()?;
        if label.trim().is_empty() {
            return None;
        }
        Some((self.lat?, self.lon?))
    }

    /// Returns the profile in the form it is persisted: trimmed label and
    /// country, empty values dropped, coordinates dropped without a label.
    pub fn normalized(&self) -> Self {
        let label = self
            .city_label
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string);
        let country = self
            .country
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        let (lat, lon) = match (self.lat, self.lon) {
            (Some(lat), Some(lon)) if label.is_some() => (Some(lat), Some(lon)),
            _ => (None, None),
        };
        Self {
            name: self.name.clone(),
            initials: self.initials.clone(),
            city_label: label,
            country,
            lat,
            lon,
        }
    }
}

/// Derives up to three uppercase initials from a name.
///
/// Takes the first character of each whitespace-separated word (at most
/// three words), keeps letters and digits only, and returns `fallback`
/// when nothing remains.
pub fn initials(name: &str, fallback: &str) -> String {
    let cleaned = name.trim();

    let mut letters: Vec<char> = cleaned
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(MAX_INITIALS)
        .collect();

    if letters.is_empty() {
        letters.extend(cleaned.chars().next());
    }

    let raw: String = letters.into_iter().collect::<String>().to_uppercase();
    finish(&raw, fallback)
}

/// Cleans user-entered initials: trimmed, uppercased, letters and digits
/// only, at most three characters, `fallback` when empty.
pub fn sanitize_initials(raw: &str, fallback: &str) -> String {
    finish(&raw.trim().to_uppercase(), fallback)
}

fn finish(upper: &str, fallback: &str) -> String {
    let trimmed: String = upper
        .chars()
        .filter(|c| c.is_alphanumeric())
        .take(MAX_INITIALS)
        .collect();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed
    }
}
