//! Narration timeline allocation.

use vgen_models::{ContentAnnotation, Script, TimedSegment};

use crate::error::{AnalysisError, AnalysisResult};
use crate::language::detect_script;

/// Approximate speaking rate for CJK narration, characters per second.
pub const CJK_CHARS_PER_SEC: f64 = 4.0;
/// Approximate speaking rate for Latin narration, characters per second.
pub const LATIN_CHARS_PER_SEC: f64 = 15.0;
/// Lower bound for estimated narration length.
pub const MIN_NARRATION_SECS: f64 = 1.0;

/// Allocates each annotation a slice of the narration proportional to its text length.
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationEstimator;

impl DurationEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Contiguous segments in input order covering `[0, total_duration]`.
    ///
    /// Falls back to equal shares when every unit is empty.
    pub fn allocate(
        &self,
        annotations: Vec<ContentAnnotation>,
        total_duration: f64,
    ) -> AnalysisResult<Vec<TimedSegment>> {
        if !total_duration.is_finite() || total_duration < 0.0 {
            return Err(AnalysisError::InvalidDuration(total_duration));
        }
        if annotations.is_empty() {
            return Ok(Vec::new());
        }

        let weights: Vec<f64> = annotations
            .iter()
            .map(|a| a.unit.char_len() as f64)
            .collect();
        let total_weight: f64 = weights.iter().sum();
        let count = annotations.len();

        let mut segments = Vec::with_capacity(count);
        let mut cursor = 0.0;
        for (i, (annotation, weight)) in annotations.into_iter().zip(weights).enumerate() {
            let share = if total_weight > 0.0 {
                weight / total_weight
            } else {
                1.0 / count as f64
            };
            let end = if i + 1 == count {
                total_duration
            } else {
                cursor + share * total_duration
            };
            segments.push(TimedSegment {
                annotation,
                start_sec: cursor,
                end_sec: end,
            });
            cursor = end;
        }

        Ok(segments)
    }
}

/// Rough narration length for text whose audio could not be measured.
pub fn estimate_narration_seconds(text: &str) -> f64 {
    let chars = text.chars().filter(|c| !c.is_whitespace()).count() as f64;
    let rate = match detect_script(text) {
        Script::Cjk => CJK_CHARS_PER_SEC,
        Script::Latin => LATIN_CHARS_PER_SEC,
    };
    (chars / rate).max(MIN_NARRATION_SECS)
}
