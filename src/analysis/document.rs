//! Document-level composition analysis and profile recommendation.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::classifier::ElementClassifier;
use super::intensity::IntensityDecision;
use super::profile::ReadingProfile;
use crate::model::{ElementRole, TextUnit};

/// Composition of a document by element role.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    /// Number of elements analyzed
    pub total: usize,
    /// Count per role
    pub distribution: BTreeMap<ElementRole, usize>,
    /// Share of technical terms, math and code
    pub technical_ratio: f32,
    /// Share of headings, list items and table cells
    pub structural_ratio: f32,
    /// Weighted mean complexity in `[0, 1]`
    pub complexity_score: f32,
    pub has_headings: bool,
    pub has_lists: bool,
    pub has_technical: bool,
    pub has_math: bool,
    /// Suggested global intensity
    pub recommended_intensity: f32,
    /// Processing modes worth enabling, e.g. `math_preservation`
    pub recommended_modes: Vec<String>,
}

impl DocumentAnalysis {
    /// Count for a role.
    pub fn count(&self, role: ElementRole) -> usize {
        self.distribution.get(&role).copied().unwrap_or(0)
    }
}

/// Complexity weight of a role.
fn complexity_weight(role: ElementRole) -> f32 {
    match role {
        ElementRole::Heading => 0.1,
        ElementRole::Paragraph => 0.2,
        ElementRole::ListItem => 0.3,
        ElementRole::TableCell => 0.4,
        ElementRole::Caption | ElementRole::Quote | ElementRole::Reference => 0.2,
        ElementRole::TechnicalTerm => 0.8,
        ElementRole::MathContent => 0.9,
        ElementRole::Code => 1.0,
    }
}

/// Suggested intensity for a given technical ratio.
fn recommended_intensity(technical_ratio: f32) -> f32 {
    if technical_ratio > 0.5 {
        0.2
    } else if technical_ratio > 0.3 {
        0.3
    } else if technical_ratio > 0.1 {
        0.4
    } else {
        0.5
    }
}

/// Analyze the roles of a document's elements.
pub fn analyze_document(roles: &[ElementRole]) -> DocumentAnalysis {
    let total = roles.len();
    if total == 0 {
        return DocumentAnalysis {
            recommended_intensity: recommended_intensity(0.0),
            recommended_modes: vec!["standard_processing".to_string()],
            ..Default::default()
        };
    }

    let mut distribution: BTreeMap<ElementRole, usize> = BTreeMap::new();
    for role in roles {
        *distribution.entry(*role).or_insert(0) += 1;
    }
    let count = |role: ElementRole| distribution.get(&role).copied().unwrap_or(0);

    let technical = count(ElementRole::TechnicalTerm)
        + count(ElementRole::MathContent)
        + count(ElementRole::Code);
    let structural =
        count(ElementRole::Heading) + count(ElementRole::ListItem) + count(ElementRole::TableCell);
    let technical_ratio = technical as f32 / total as f32;
    let structural_ratio = structural as f32 / total as f32;

    let weighted: f32 = roles.iter().map(|r| complexity_weight(*r)).sum();
    let complexity_score = (weighted / total as f32).min(1.0);

    let mut recommended_modes = Vec::new();
    if count(ElementRole::MathContent) > 0 {
        recommended_modes.push("math_preservation".to_string());
    }
    if count(ElementRole::Code) > 0 {
        recommended_modes.push("code_preservation".to_string());
    }
    if count(ElementRole::TableCell) > 0 {
        recommended_modes.push("table_aware".to_string());
    }
    if count(ElementRole::Heading) > 0 {
        recommended_modes.push("heading_enhancement".to_string());
    }
    if recommended_modes.is_empty() {
        recommended_modes.push("standard_processing".to_string());
    }

    DocumentAnalysis {
        total,
        has_headings: count(ElementRole::Heading) > 0,
        has_lists: count(ElementRole::ListItem) > 0,
        has_technical: count(ElementRole::TechnicalTerm) > 0,
        has_math: count(ElementRole::MathContent) > 0,
        distribution,
        technical_ratio,
        structural_ratio,
        complexity_score,
        recommended_intensity: recommended_intensity(technical_ratio),
        recommended_modes,
    }
}

/// Classify many units in parallel, keeping input order.
///
/// Units carrying an explicit role keep it.
pub fn classify_units(classifier: &ElementClassifier, units: &[TextUnit]) -> Vec<ElementRole> {
    units
        .par_iter()
        .map(|unit| {
            unit.role
                .unwrap_or_else(|| classifier.classify(&unit.text, unit.context.as_ref()))
        })
        .collect()
}

/// Advisory profile for a document. Never overrides an explicit choice.
pub fn recommend_profile(analysis: &DocumentAnalysis) -> ReadingProfile {
    if analysis.technical_ratio > 0.3 || analysis.complexity_score > 0.6 {
        ReadingProfile::Technical
    } else if analysis.has_headings && analysis.has_lists && analysis.complexity_score < 0.3 {
        ReadingProfile::SpeedReading
    } else {
        ReadingProfile::Accessibility
    }
}

/// Aggregate view over the decisions made for a document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcessingSummary {
    pub total: usize,
    /// Units that receive emphasis
    pub processed: usize,
    /// Units left untouched
    pub preserved: usize,
    /// Mean strength over processed units
    pub average_strength: f32,
    /// Mean confidence over all units
    pub average_confidence: f32,
    /// `1 - variance` of strengths within each role, averaged over roles
    pub consistency: f32,
    /// Share of units processed
    pub coverage: f32,
}

/// Summarize a set of intensity decisions.
pub fn summarize(decisions: &[IntensityDecision]) -> ProcessingSummary {
    let total = decisions.len();
    if total == 0 {
        return ProcessingSummary::default();
    }

    let processed: Vec<&IntensityDecision> =
        decisions.iter().filter(|d| d.should_process).collect();
    let average_strength = if processed.is_empty() {
        0.0
    } else {
        processed.iter().map(|d| d.strength).sum::<f32>() / processed.len() as f32
    };
    let average_confidence = decisions.iter().map(|d| d.confidence).sum::<f32>() / total as f32;

    let mut by_role: BTreeMap<ElementRole, Vec<f32>> = BTreeMap::new();
    for d in &processed {
        by_role.entry(d.role).or_default().push(d.strength);
    }
    let consistency = if by_role.is_empty() {
        1.0
    } else {
        let scores: Vec<f32> = by_role
            .values()
            .map(|values| 1.0 - variance(values).min(1.0))
            .collect();
        scores.iter().sum::<f32>() / scores.len() as f32
    };

    ProcessingSummary {
        total,
        processed: processed.len(),
        preserved: total - processed.len(),
        average_strength,
        average_confidence,
        consistency,
        coverage: processed.len() as f32 / total as f32,
    }
}

fn variance(values: &[f32]) -> f32 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f32>() / values.len() as f32;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / values.len() as f32
}
