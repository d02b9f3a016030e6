//! Keyword/entity extraction and scene prompt construction.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;
use vgen_models::{ContentAnnotation, Script, TextUnit};

use crate::language::LanguageDetector;
use crate::lexicon::{is_cjk_stop_token, is_en_stopword, lemmatize};
use crate::model::{LanguageModel, RuleBasedModel, Token, TokenKind};

pub const MAX_KEYWORDS: usize = 5;
pub const MAX_PROMPT_TERMS: usize = 3;

/// Turns text units into annotations. Never fails: a missing or failing model degrades to
/// the text-preview prompt.
#[derive(Clone)]
pub struct ContentAnalyzer {
    model: Option<Arc<dyn LanguageModel>>,
    detector: LanguageDetector,
}

impl Default for ContentAnalyzer {
    fn default() -> Self {
        Self::new(Arc::new(RuleBasedModel::new()))
    }
}

impl std::fmt::Debug for ContentAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentAnalyzer")
            .field("model", &self.model.as_ref().map(|m| m.name().to_string()))
            .finish()
    }
}

impl ContentAnalyzer {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model: Some(model),
            detector: LanguageDetector::default(),
        }
    }

    /// Analyzer without a language model; every prompt is a text preview.
    pub fn without_model() -> Self {
        Self {
            model: None,
            detector: LanguageDetector::default(),
        }
    }

    pub fn analyze(&self, unit: TextUnit) -> ContentAnnotation {
        let script = self.detector.detect(&unit.text);

        let (keywords, entities) = match &self.model {
            Some(model) => {
                let keywords = match model.tokenize(&unit.text, script) {
                    Ok(tokens) => extract_keywords(&tokens, script, MAX_KEYWORDS),
                    Err(e) => {
                        warn!(order = unit.order, model = model.name(), "Tokenization failed: {}", e);
                        Vec::new()
                    }
                };
                let entities = match model.entities(&unit.text, script) {
                    Ok(found) => dedup(found.into_iter().map(|e| e.text)),
                    Err(e) => {
                        warn!(order = unit.order, model = model.name(), "Entity recognition failed: {}", e);
                        Vec::new()
                    }
                };
                (keywords, entities)
            }
            None => (Vec::new(), Vec::new()),
        };

        let scene_prompt = build_scene_prompt(&keywords, &entities, &unit.text, script);

        ContentAnnotation {
            unit,
            script,
            keywords,
            entities,
            scene_prompt,
        }
    }

    pub fn analyze_all(&self, units: impl IntoIterator<Item = TextUnit>) -> Vec<ContentAnnotation> {
        units.into_iter().map(|u| self.analyze(u)).collect()
    }
}

fn dedup(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// Frequency-ranked keywords; ties keep first-seen order.
pub fn extract_keywords(tokens: &[Token], script: Script, limit: usize) -> Vec<String> {
    let candidates = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Word)
        .filter_map(|t| match script {
            Script::Latin => {
                if !t.text.chars().all(char::is_alphabetic) {
                    return None;
                }
                let lower = t.text.to_lowercase();
                if is_en_stopword(&lower) {
                    return None;
                }
                let lemma = lemmatize(&lower);
                (!is_en_stopword(&lemma)).then_some(lemma)
            }
            Script::Cjk => {
                let keep = t.text.chars().count() > 1 && !is_cjk_stop_token(&t.text);
                keep.then(|| t.text.clone())
            }
        });

    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for word in candidates {
        match index.get(&word) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(word.clone(), counts.len());
                counts.push((word, 1));
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().take(limit).map(|(w, _)| w).collect()
}

/// First `max_chars` characters, with `...` appended when truncated.
pub fn preview(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Keywords first, then entities, deduplicated; at most three terms. Falls back to a
/// preview of the text when there are no terms.
pub fn build_scene_prompt(
    keywords: &[String],
    entities: &[String],
    text: &str,
    script: Script,
) -> String {
    let terms = dedup(keywords.iter().chain(entities.iter()).cloned());

    if terms.is_empty() {
        let preview = preview(text, script.preview_chars());
        return match script {
            Script::Cjk => format!("展示與「{preview}」相關的場景"),
            Script::Latin => format!("Scene related to \"{preview}\""),
        };
    }

    let joined = terms
        .iter()
        .take(MAX_PROMPT_TERMS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    match script {
        Script::Cjk => format!("展示與{joined}相關的場景"),
        Script::Latin => format!("Scene related to {joined}"),
    }
}
