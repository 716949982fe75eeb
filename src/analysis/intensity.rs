//! Emphasis strength decisions per text unit.

use serde::{Deserialize, Serialize};

use super::classifier::{role_confidence, ElementClassifier};
use super::profile::{ReadingProfile, StrengthTable};
use crate::model::{DocumentPosition, ElementContext, ElementRole};

/// Outcome of the intensity analysis for one text unit.
///
/// Derived, never stored: recomputed for each unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntensityDecision {
    /// Structural role
    pub role: ElementRole,
    /// Emphasis strength in `[0, 1]`
    pub strength: f32,
    /// Whether the unit gets emphasis at all
    pub should_process: bool,
    /// Whether original formatting must be kept
    pub preserve_formatting: bool,
    /// Confidence in the role assignment, in `[0, 1]`
    pub confidence: f32,
}

impl IntensityDecision {
    /// Decision that leaves the text untouched.
    pub fn preserve(role: ElementRole, confidence: f32) -> Self {
        Self {
            role,
            strength: 0.0,
            should_process: false,
            preserve_formatting: role.preserves_formatting(),
            confidence,
        }
    }

    /// Copy with a different strength; `should_process` follows the new value.
    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength.clamp(0.0, 1.0);
        if self.strength <= 0.0 {
            self.should_process = false;
        }
        self
    }
}

/// Thresholds for context adjustments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntensityConfig {
    /// Font size below which strength is scaled down
    pub small_text_threshold: f32,
    /// Text shorter than this (chars) is scaled down
    pub short_text_chars: usize,
    /// Text longer than this (chars) is scaled up
    pub long_text_chars: usize,
    /// Text shorter than this (trimmed chars) is never processed
    pub min_process_chars: usize,
}

impl Default for IntensityConfig {
    fn default() -> Self {
        Self {
            small_text_threshold: 10.0,
            short_text_chars: 10,
            long_text_chars: 200,
            min_process_chars: 3,
        }
    }
}

/// Maps (role, profile, context) to an [`IntensityDecision`].
#[derive(Debug, Clone)]
pub struct IntensityManager {
    classifier: ElementClassifier,
    config: IntensityConfig,
    custom: StrengthTable,
}

impl IntensityManager {
    /// Create a manager with default thresholds and the default custom table.
    pub fn new() -> Self {
        Self::with_classifier(ElementClassifier::new())
    }

    /// Create a manager around an existing classifier.
    pub fn with_classifier(classifier: ElementClassifier) -> Self {
        Self {
            classifier,
            config: IntensityConfig::default(),
            custom: StrengthTable::default(),
        }
    }

    /// Set the table used by [`ReadingProfile::Custom`].
    pub fn with_custom_table(mut self, table: StrengthTable) -> Self {
        self.custom = table;
        self
    }

    /// Set the adjustment thresholds.
    pub fn with_config(mut self, config: IntensityConfig) -> Self {
        self.config = config;
        self
    }

    /// The classifier in use.
    pub fn classifier(&self) -> &ElementClassifier {
        &self.classifier
    }

    /// Strength table for a profile.
    pub fn table_for(&self, profile: ReadingProfile) -> StrengthTable {
        match profile {
            ReadingProfile::Custom => self.custom.clone(),
            other => other.table(),
        }
    }

    /// Classify the text and decide its emphasis.
    pub fn intensity_for(
        &self,
        text: &str,
        context: Option<&ElementContext>,
        profile: ReadingProfile,
    ) -> IntensityDecision {
        let role = self.classifier.classify(text, context);
        self.intensity_for_role(text, role, context, profile, None)
    }

    /// Decide emphasis for a unit whose role is already known.
    ///
    /// `override_strength` replaces the table strength for roles the
    /// profile emphasizes; preserved roles stay at zero.
    pub fn intensity_for_role(
        &self,
        text: &str,
        role: ElementRole,
        context: Option<&ElementContext>,
        profile: ReadingProfile,
        override_strength: Option<f32>,
    ) -> IntensityDecision {
        let confidence = role_confidence(role, context);
        // Structural roles survive so assembly keeps list markers and heading
        // levels, but a lone notation token is still left verbatim.
        if role.is_preserved() || self.classifier.is_notation(text) {
            return IntensityDecision::preserve(role, confidence);
        }

        let base = self.table_for(profile).get(role);
        let base = match override_strength {
            Some(value) if base > 0.0 => value.clamp(0.0, 1.0),
            _ => base,
        };

        let strength = match context {
            Some(ctx) => self.adjust(base, text, ctx),
            None => base,
        };

        let long_enough = text.trim().chars().count() >= self.config.min_process_chars;
        IntensityDecision {
            role,
            strength,
            should_process: strength > 0.0 && long_enough,
            preserve_formatting: role.preserves_formatting(),
            confidence,
        }
    }

    /// Apply context adjustments and clamp to `[0, 1]`.
    fn adjust(&self, base: f32, text: &str, ctx: &ElementContext) -> f32 {
        let mut strength = base;

        if let Some(size) = ctx.font_size {
            if size < self.config.small_text_threshold {
                strength *= 0.8;
            }
        }

        let len = text.trim().chars().count();
        if len < self.config.short_text_chars {
            strength *= 0.9;
        } else if len > self.config.long_text_chars {
            strength *= 1.05;
        }

        match ctx.position {
            Some(DocumentPosition::Beginning) => strength *= 1.05,
            Some(DocumentPosition::End) => strength *= 0.95,
            _ => {}
        }

        strength.clamp(0.0, 1.0)
    }
}

impl Default for IntensityManager {
    fn default() -> Self {
        Self::new()
    }
}
