//! Narration analysis: script detection, segmentation, keyword/entity extraction and
//! timeline allocation.
//!
//! Everything here is CPU-bound and synchronous. The pipeline for a narration text is
//!
//! ```text
//! TextSegmenter -> ContentAnalyzer -> DurationEstimator
//! ```
//!
//! and yields one [`vgen_models::TimedSegment`] per scene.

pub mod analyzer;
pub mod duration;
pub mod error;
pub mod language;
pub mod lexicon;
pub mod model;
pub mod segmenter;
pub mod sentences;

pub use analyzer::{build_scene_prompt, extract_keywords, preview, ContentAnalyzer};
pub use duration::{estimate_narration_seconds, DurationEstimator};
pub use error::{AnalysisError, AnalysisResult};
pub use language::{default_language_code, detect_script, is_cjk, LanguageDetector};
pub use model::{Entity, EntityCategory, LanguageModel, RuleBasedModel, Token, TokenKind};
pub use segmenter::{SegmentStrategy, Segmentation, SegmenterConfig, TextSegmenter};

use vgen_models::TimedSegment;

/// Segment, annotate and time a narration text in one pass.
pub fn plan_segments(
    segmenter: &TextSegmenter,
    analyzer: &ContentAnalyzer,
    text: &str,
    total_duration: f64,
) -> AnalysisResult<Vec<TimedSegment>> {
    let annotations = analyzer.analyze_all(&segmenter.segment(text));
    DurationEstimator.allocate(annotations, total_duration)
}
