//! Reading profiles and their per-role strength tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::model::ElementRole;

/// Named reading-goal preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingProfile {
    /// Strongest emphasis, for fast skimming
    SpeedReading,
    /// Balanced emphasis
    #[default]
    Accessibility,
    /// Moderate emphasis
    Standard,
    /// Conservative emphasis for technical material
    Technical,
    /// Minimal emphasis
    Preservation,
    /// Caller-supplied table
    Custom,
}

impl ReadingProfile {
    /// All profiles.
    pub const ALL: [ReadingProfile; 6] = [
        ReadingProfile::SpeedReading,
        ReadingProfile::Accessibility,
        ReadingProfile::Standard,
        ReadingProfile::Technical,
        ReadingProfile::Preservation,
        ReadingProfile::Custom,
    ];

    /// Stable snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingProfile::SpeedReading => "speed_reading",
            ReadingProfile::Accessibility => "accessibility",
            ReadingProfile::Standard => "standard",
            ReadingProfile::Technical => "technical",
            ReadingProfile::Preservation => "preservation",
            ReadingProfile::Custom => "custom",
        }
    }

    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            ReadingProfile::SpeedReading => "Strong emphasis for fast skimming of prose",
            ReadingProfile::Accessibility => "Balanced emphasis tuned for reading support",
            ReadingProfile::Standard => "Moderate emphasis for general documents",
            ReadingProfile::Technical => "Light emphasis that leaves technical content alone",
            ReadingProfile::Preservation => "Minimal emphasis that keeps the original look",
            ReadingProfile::Custom => "User-defined strength table",
        }
    }

    /// Built-in strength table. `Custom` returns the default custom table.
    pub fn table(&self) -> StrengthTable {
        let (heading, paragraph, list_item, caption, quote, table_cell, reference) = match self {
            ReadingProfile::SpeedReading => (0.7, 0.6, 0.55, 0.4, 0.5, 0.3, 0.3),
            ReadingProfile::Accessibility => (0.6, 0.5, 0.5, 0.4, 0.45, 0.35, 0.3),
            ReadingProfile::Standard => (0.5, 0.4, 0.4, 0.3, 0.35, 0.25, 0.2),
            ReadingProfile::Technical => (0.4, 0.3, 0.3, 0.2, 0.25, 0.2, 0.15),
            ReadingProfile::Preservation => (0.3, 0.2, 0.2, 0.15, 0.15, 0.1, 0.1),
            ReadingProfile::Custom => return StrengthTable::default(),
        };
        StrengthTable::from_entries([
            (ElementRole::Heading, heading),
            (ElementRole::Paragraph, paragraph),
            (ElementRole::ListItem, list_item),
            (ElementRole::Caption, caption),
            (ElementRole::Quote, quote),
            (ElementRole::TableCell, table_cell),
            (ElementRole::Reference, reference),
        ])
    }
}

impl fmt::Display for ReadingProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadingProfile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        if normalized == "speed" {
            return Ok(ReadingProfile::SpeedReading);
        }
        ReadingProfile::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| Error::Config(format!("unknown reading profile: {}", s)))
    }
}

/// Base emphasis strength per role.
///
/// Roles missing from the table have strength 0. Code, technical terms and
/// math are always 0 regardless of the stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthTable {
    strengths: BTreeMap<ElementRole, f32>,
}

impl StrengthTable {
    /// Build a table from `(role, strength)` pairs; values are clamped to `[0, 1]`.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (ElementRole, f32)>,
    {
        let strengths = entries
            .into_iter()
            .map(|(role, value)| (role, value.clamp(0.0, 1.0)))
            .collect();
        Self { strengths }
    }

    /// Strength for a role.
    pub fn get(&self, role: ElementRole) -> f32 {
        if role.is_preserved() {
            return 0.0;
        }
        self.strengths.get(&role).copied().unwrap_or(0.0)
    }

    /// Set the strength for a role.
    pub fn with(mut self, role: ElementRole, strength: f32) -> Self {
        self.strengths.insert(role, strength.clamp(0.0, 1.0));
        self
    }

    /// Iterate over every role with its effective strength.
    pub fn iter(&self) -> impl Iterator<Item = (ElementRole, f32)> + '_ {
        ElementRole::ALL.into_iter().map(move |role| (role, self.get(role)))
    }

    /// Export as JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Import from JSON, validating every value.
    pub fn from_json(json: &str) -> Result<Self> {
        let table: StrengthTable = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("invalid strength table: {}", e)))?;
        if let Some((role, value)) = table
            .strengths
            .iter()
            .find(|(_, v)| !(0.0..=1.0).contains(*v))
        {
            return Err(Error::Config(format!(
                "strength for {} out of range: {}",
                role, value
            )));
        }
        Ok(table)
    }
}

impl Default for StrengthTable {
    fn default() -> Self {
        Self::from_entries([
            (ElementRole::Heading, 0.6),
            (ElementRole::Paragraph, 0.4),
            (ElementRole::ListItem, 0.45),
            (ElementRole::TableCell, 0.3),
            (ElementRole::Caption, 0.3),
            (ElementRole::Quote, 0.35),
            (ElementRole::Reference, 0.2),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables() {
        let standard = ReadingProfile::Standard.table();
        assert_eq!(standard.get(ElementRole::Paragraph), 0.4);
        assert_eq!(standard.get(ElementRole::Heading), 0.5);
        assert_eq!(standard.get(ElementRole::Code), 0.0);

        let speed = ReadingProfile::SpeedReading.table();
        let preserve = ReadingProfile::Preservation.table();
        for role in ElementRole::ALL {
            assert!(speed.get(role) >= preserve.get(role));
        }
    }

    #[test]
    fn test_preserved_roles_always_zero() {
        let table = StrengthTable::default().with(ElementRole::Code, 0.9);
        assert_eq!(table.get(ElementRole::Code), 0.0);
        assert_eq!(table.get(ElementRole::MathContent), 0.0);
    }

    #[test]
    fn test_profile_from_str() {
        assert_eq!(
            "speed-reading".parse::<ReadingProfile>().unwrap(),
            ReadingProfile::SpeedReading
        );
        assert_eq!(
            "Technical".parse::<ReadingProfile>().unwrap(),
            ReadingProfile::Technical
        );
        assert!("bogus".parse::<ReadingProfile>().is_err());
    }

    #[test]
    fn test_table_json_export_import() {
        let table = StrengthTable::default().with(ElementRole::Paragraph, 0.55);
        let json = table.to_json().unwrap();
        let back = StrengthTable::from_json(&json).unwrap();
        assert_eq!(back.get(ElementRole::Paragraph), 0.55);

        let bad = r#"{"strengths":{"paragraph":1.5}}"#;
        assert!(StrengthTable::from_json(bad).is_err());
    }
}
