//! Splitting narration into scene-sized text units.

use std::str::Lines;

use serde::{Deserialize, Serialize};
use vgen_models::{Script, TextUnit};

use crate::language::LanguageDetector;
use crate::sentences::{cjk_sentences, latin_sentences, CjkSentences, Sentences};

/// Text longer than this is re-split when it has at most one paragraph.
pub const DEFAULT_RESEGMENT_THRESHOLD: usize = 200;
/// Advisory cap on packed Latin units.
pub const DEFAULT_MAX_UNIT_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmenterConfig {
    pub resegment_threshold: usize,
    pub max_unit_chars: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            resegment_threshold: DEFAULT_RESEGMENT_THRESHOLD,
            max_unit_chars: DEFAULT_MAX_UNIT_CHARS,
        }
    }
}

/// How a text gets split. Chosen once per text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStrategy {
    Paragraphs,
    CjkSentences,
    PackedSentences,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextSegmenter {
    config: SegmenterConfig,
    detector: LanguageDetector,
}

impl TextSegmenter {
    pub fn new(config: SegmenterConfig) -> Self {
        Self {
            config,
            detector: LanguageDetector::default(),
        }
    }

    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    /// Lazy segmentation of `text`. Iterate it as many times as needed.
    pub fn segment<'a>(&self, text: &'a str) -> Segmentation<'a> {
        let paragraphs = non_empty_lines(text).take(2).count();
        let strategy = if paragraphs <= 1 && text.chars().count() > self.config.resegment_threshold
        {
            match self.detector.detect(text) {
                Script::Cjk => SegmentStrategy::CjkSentences,
                Script::Latin => SegmentStrategy::PackedSentences,
            }
        } else {
            SegmentStrategy::Paragraphs
        };

        Segmentation {
            text,
            strategy,
            max_unit_chars: self.config.max_unit_chars,
        }
    }
}

fn non_empty_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty())
}

/// Restartable sequence of text units.
#[derive(Debug, Clone, Copy)]
pub struct Segmentation<'a> {
    text: &'a str,
    strategy: SegmentStrategy,
    max_unit_chars: usize,
}

impl<'a> Segmentation<'a> {
    pub fn strategy(&self) -> SegmentStrategy {
        self.strategy
    }

    pub fn iter(&self) -> Units<'a> {
        let source = match self.strategy {
            SegmentStrategy::Paragraphs => UnitSource::Paragraphs(self.text.lines()),
            SegmentStrategy::CjkSentences => UnitSource::Cjk(cjk_sentences(self.text)),
            SegmentStrategy::PackedSentences => UnitSource::Packed(Packed {
                sentences: latin_sentences(self.text),
                pending: None,
                cap: self.max_unit_chars,
            }),
        };
        Units { source, order: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn to_vec(&self) -> Vec<TextUnit> {
        self.iter().collect()
    }
}

impl<'a> IntoIterator for &Segmentation<'a> {
    type Item = TextUnit;
    type IntoIter = Units<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

enum UnitSource<'a> {
    Paragraphs(Lines<'a>),
    Cjk(CjkSentences<'a>),
    Packed(Packed<'a>),
}

/// Iterator over the units of one segmentation pass.
pub struct Units<'a> {
    source: UnitSource<'a>,
    order: usize,
}

impl Iterator for Units<'_> {
    type Item = TextUnit;

    fn next(&mut self) -> Option<TextUnit> {
        let text = match &mut self.source {
            UnitSource::Paragraphs(lines) => lines
                .map(str::trim)
                .find(|l| !l.is_empty())
                .map(str::to_string),
            UnitSource::Cjk(sentences) => sentences.next().map(str::to_string),
            UnitSource::Packed(packed) => packed.next(),
        }?;

        let unit = TextUnit::new(text, self.order);
        self.order += 1;
        Some(unit)
    }
}

/// Greedy sentence packing. Flushes before a unit would exceed `cap`; a single sentence
/// longer than `cap` becomes its own unit untouched.
struct Packed<'a> {
    sentences: Sentences<'a>,
    pending: Option<&'a str>,
    cap: usize,
}

impl Packed<'_> {
    fn next(&mut self) -> Option<String> {
        let first = self.pending.take().or_else(|| self.sentences.next())?;
        let mut unit = first.to_string();
        let mut len = first.chars().count();

        for sentence in self.sentences.by_ref() {
            let extra = sentence.chars().count() + 1;
            if len + extra > self.cap {
                self.pending = Some(sentence);
                break;
            }
            unit.push(' ');
            unit.push_str(sentence);
            len += extra;
        }
        Some(unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn non_ws(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    fn texts(seg: &Segmentation<'_>) -> Vec<String> {
        seg.iter().map(|u| u.text).collect()
    }

    #[test]
    fn test_paragraph_split() {
        let seg = TextSegmenter::default().segment("First paragraph.\n\n  Second one.  \n\nThird.");
        assert_eq!(seg.strategy(), SegmentStrategy::Paragraphs);
        let units = seg.to_vec();
        assert_eq!(units.len(), 3);
        assert_eq!(units[1].text, "Second one.");
        assert_eq!(units.iter().map(|u| u.order).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_whitespace_only_is_empty() {
        let seg = TextSegmenter::default().segment("  \n\t \n ");
        assert!(seg.is_empty());
        assert_eq!(seg.iter().count(), 0);
        assert!(TextSegmenter::default().segment("").is_empty());
    }

    #[test]
    fn test_short_single_paragraph_untouched() {
        let seg = TextSegmenter::default().segment("Hello world. This is a test.");
        assert_eq!(texts(&seg), vec!["Hello world. This is a test."]);
    }

    #[test]
    fn test_latin_resegmentation_when_triggered() {
        let segmenter = TextSegmenter::new(SegmenterConfig {
            resegment_threshold: 20,
            max_unit_chars: 12,
        });
        let seg = segmenter.segment("Hello world. This is a test.");
        assert_eq!(seg.strategy(), SegmentStrategy::PackedSentences);
        assert_eq!(texts(&seg), vec!["Hello world.", "This is a test."]);
    }

    #[test]
    fn test_latin_packing_respects_cap() {
        let sentence = "This sentence has exactly forty chars!!";
        let text = std::iter::repeat(sentence).take(12).collect::<Vec<_>>().join(" ");
        assert!(text.chars().count() > 200);

        let units = TextSegmenter::default().segment(&text).to_vec();
        assert!(units.len() > 1);
        for unit in &units {
            assert!(unit.char_len() <= DEFAULT_MAX_UNIT_CHARS);
        }
        let joined: String = units.iter().map(|u| u.text.as_str()).collect();
        assert_eq!(non_ws(&joined), non_ws(&text));
    }

    #[test]
    fn test_oversized_sentence_kept_whole() {
        let long = format!("Word {}end.", "word ".repeat(60));
        let text = format!("Short one. {long} Tail.");
        let units = TextSegmenter::default().segment(&text).to_vec();
        assert_eq!(
            units.iter().map(|u| u.text.as_str()).collect::<Vec<_>>(),
            vec!["Short one.", long.as_str(), "Tail."]
        );
    }

    #[test]
    fn test_cjk_resegmentation_keeps_marks() {
        let segmenter = TextSegmenter::new(SegmenterConfig {
            resegment_threshold: 5,
            max_unit_chars: 200,
        });
        let seg = segmenter.segment("大家好。這是測試。");
        assert_eq!(seg.strategy(), SegmentStrategy::CjkSentences);
        assert_eq!(texts(&seg), vec!["大家好。", "這是測試。"]);
    }

    #[test]
    fn test_long_cjk_text_uses_sentences() {
        let text = "今天天氣很好，我們去公園散步。".repeat(20);
        let units = TextSegmenter::default().segment(&text).to_vec();
        assert_eq!(units.len(), 20);
        assert!(units.iter().all(|u| u.text.ends_with('。')));
    }

    #[test]
    fn test_restartable_and_preserves_content() {
        let text = "Line one here.\nLine two, longer than the first.\n\n\nLast";
        let seg = TextSegmenter::default().segment(text);
        let first: Vec<_> = seg.iter().collect();
        let second: Vec<_> = (&seg).into_iter().collect();
        assert_eq!(first, second);

        let joined: String = first.iter().map(|u| u.text.as_str()).collect();
        assert_eq!(non_ws(&joined), non_ws(text));
    }
}
