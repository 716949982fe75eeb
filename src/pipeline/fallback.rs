//! Fallback chain for failed or low-quality output.

use crate::render::OutputFormat;

/// Strength used by the minimal fallback.
pub const MINIMAL_STRENGTH: f32 = 0.2;

/// One entry of the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackStep {
    /// Half strength, same format
    HalfStrength,
    /// Original strength, plain text
    PlainText,
    /// Fixed minimal strength, plain text
    Minimal,
    /// Return the input untouched
    Original,
}

/// Steps tried in order after the primary attempt.
pub const FALLBACK_CHAIN: [FallbackStep; 4] = [
    FallbackStep::HalfStrength,
    FallbackStep::PlainText,
    FallbackStep::Minimal,
    FallbackStep::Original,
];

impl FallbackStep {
    /// Strength and format to render with, or `None` for the original text.
    pub fn params(&self, strength: f32, format: OutputFormat) -> Option<(f32, OutputFormat)> {
        match self {
            FallbackStep::HalfStrength => Some((strength / 2.0, format)),
            FallbackStep::PlainText => Some((strength, OutputFormat::PlainText)),
            FallbackStep::Minimal => Some((MINIMAL_STRENGTH, OutputFormat::PlainText)),
            FallbackStep::Original => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackStep::HalfStrength => "half_strength",
            FallbackStep::PlainText => "plain_text",
            FallbackStep::Minimal => "minimal",
            FallbackStep::Original => "original",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_order_and_params() {
        let params: Vec<_> = FALLBACK_CHAIN
            .iter()
            .map(|step| step.params(0.6, OutputFormat::Html))
            .collect();
        assert_eq!(
            params,
            vec![
                Some((0.3, OutputFormat::Html)),
                Some((0.6, OutputFormat::PlainText)),
                Some((0.2, OutputFormat::PlainText)),
                None,
            ]
        );
        assert_eq!(FALLBACK_CHAIN.last(), Some(&FallbackStep::Original));
    }
}
