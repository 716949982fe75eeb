//! Rendering statistics.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{ElementRole, SegmentKind};
use crate::split::PlannedSegment;

/// Counts collected while rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderStats {
    /// Word segments seen
    pub words: usize,

    /// Word segments that received emphasis
    pub emphasized_words: usize,

    /// Math, unit and scientific-notation tokens kept verbatim
    pub preserved_tokens: usize,

    /// Units rendered per role
    pub units_by_role: BTreeMap<ElementRole, usize>,
}

impl RenderStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the segments of one planned unit.
    pub fn record(&mut self, role: ElementRole, plan: &[PlannedSegment]) {
        for (segment, split) in plan {
            match segment.kind {
                SegmentKind::Word => {
                    self.words += 1;
                    if split.is_some() {
                        self.emphasized_words += 1;
                    }
                }
                SegmentKind::Math => self.preserved_tokens += 1,
                _ => {}
            }
        }
        *self.units_by_role.entry(role).or_insert(0) += 1;
    }

    /// Merge statistics from another render.
    pub fn merge(&mut self, other: &RenderStats) {
        self.words += other.words;
        self.emphasized_words += other.emphasized_words;
        self.preserved_tokens += other.preserved_tokens;
        for (role, count) in &other.units_by_role {
            *self.units_by_role.entry(*role).or_insert(0) += count;
        }
    }

    /// Share of words that were emphasized.
    pub fn emphasis_ratio(&self) -> f32 {
        if self.words == 0 {
            0.0
        } else {
            self.emphasized_words as f32 / self.words as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Segmenter;
    use crate::split::WordSplitter;

    #[test]
    fn test_record_and_merge() {
        let plan = WordSplitter::new().plan(Segmenter::new().segment("a big 25kg box"), 0.4);
        let mut stats = RenderStats::new();
        stats.record(ElementRole::Paragraph, &plan);
        assert_eq!(stats.words, 3);
        assert_eq!(stats.emphasized_words, 2);
        assert_eq!(stats.preserved_tokens, 1);

        let mut total = RenderStats::new();
        total.merge(&stats);
        total.merge(&stats);
        assert_eq!(total.words, 6);
        assert_eq!(total.units_by_role[&ElementRole::Paragraph], 2);
        assert!((total.emphasis_ratio() - 2.0 / 3.0).abs() < 1e-6);
    }
}
