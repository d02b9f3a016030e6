//! Text units, annotations and timed segments.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dominant script of a text span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum Script {
    Cjk,
    #[default]
    Latin,
}

impl Script {
    pub fn as_str(&self) -> &'static str {
        match self {
            Script::Cjk => "cjk",
            Script::Latin => "latin",
        }
    }

    /// Character count of the scene-prompt preview for this script.
    pub fn preview_chars(&self) -> usize {
        match self {
            Script::Cjk => 20,
            Script::Latin => 30,
        }
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One paragraph or sentence group of narration mapped to one scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TextUnit {
    pub text: String,
    /// Position in narration order, starting at 0
    pub order: usize,
}

impl TextUnit {
    pub fn new(text: impl Into<String>, order: usize) -> Self {
        Self {
            text: text.into(),
            order,
        }
    }

    /// Length in characters (not bytes).
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Analysis output for a single unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContentAnnotation {
    pub unit: TextUnit,
    pub script: Script,
    /// At most five, most frequent first
    pub keywords: Vec<String>,
    /// Distinct entity surface forms in first-seen order
    pub entities: Vec<String>,
    pub scene_prompt: String,
}

/// An annotation placed on the narration timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TimedSegment {
    pub annotation: ContentAnnotation,
    pub start_sec: f64,
    pub end_sec: f64,
}

impl TimedSegment {
    pub fn duration(&self) -> f64 {
        self.end_sec - self.start_sec
    }

    pub fn order(&self) -> usize {
        self.annotation.unit.order
    }

    pub fn scene_prompt(&self) -> &str {
        &self.annotation.scene_prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_len_counts_chars() {
        assert_eq!(TextUnit::new("大家好。", 0).char_len(), 4);
        assert_eq!(TextUnit::new("hello", 0).char_len(), 5);
    }

    #[test]
    fn test_segment_duration() {
        let annotation = ContentAnnotation {
            unit: TextUnit::new("hello", 3),
            script: Script::Latin,
            keywords: vec!["hello".into()],
            entities: vec![],
            scene_prompt: "Scene related to hello".into(),
        };
        let seg = TimedSegment {
            annotation,
            start_sec: 1.5,
            end_sec: 4.0,
        };
        assert!((seg.duration() - 2.5).abs() < 1e-9);
        assert_eq!(seg.order(), 3);
    }
}
