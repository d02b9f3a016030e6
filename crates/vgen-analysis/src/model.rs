//! Language model seam: tokenization and named-entity recognition.

use regex::Regex;
use std::sync::OnceLock;

use vgen_models::Script;

use crate::error::AnalysisResult;
use crate::language::is_cjk;
use crate::lexicon::{
    is_en_stopword, CJK_ORG_SUFFIXES, CJK_PERSON_TITLES, CJK_PLACES, CJK_STOP_CHARS, HONORIFICS,
    ORG_SUFFIXES, PLACES, PLACE_SUFFIXES,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    Number,
    Punct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
}

impl Token {
    fn new(text: &str, kind: TokenKind) -> Self {
        Self {
            text: text.to_string(),
            kind,
        }
    }
}

/// Entity categories kept for scene prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityCategory {
    Person,
    Organization,
    Place,
    Product,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub text: String,
    pub category: EntityCategory,
}

impl Entity {
    fn new(text: impl Into<String>, category: EntityCategory) -> Self {
        Self {
            text: text.into(),
            category,
        }
    }
}

/// Tokenizer plus entity recognizer for one text span.
pub trait LanguageModel: Send + Sync {
    fn name(&self) -> &str;

    fn tokenize(&self, text: &str, script: Script) -> AnalysisResult<Vec<Token>>;

    fn entities(&self, text: &str, script: Script) -> AnalysisResult<Vec<Entity>>;
}

fn latin_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[\p{L}\p{M}]+(?:['’][\p{L}\p{M}]+)*|\p{N}+(?:[.,]\p{N}+)*|[^\s\p{L}\p{M}\p{N}]")
            .expect("static regex")
    })
}

fn cjk_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\p{Han}+|[\p{L}\p{M}]+(?:['’][\p{L}\p{M}]+)*|\p{N}+(?:[.,]\p{N}+)*|[^\s\p{L}\p{M}\p{N}]")
            .expect("static regex")
    })
}

fn latin_word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[\p{L}\p{N}]+(?:[-'’&][\p{L}\p{N}]+)*").expect("static regex")
    })
}

fn cjk_entity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Name stems exclude function characters so matches do not run into the clause.
        let stem = r"[\p{Han}--[的了和是在我有這个個們们也為为以到說说著着與与從从對对]]";
        let pattern = format!(
            r"(?P<org>{stem}{{2,8}}?(?:{orgs}))|(?P<person>{stem}{{1,3}}?(?:{titles}))|《(?P<work>[^》]+)》",
            orgs = CJK_ORG_SUFFIXES.join("|"),
            titles = CJK_PERSON_TITLES.join("|"),
        );
        Regex::new(&pattern).expect("static regex")
    })
}

/// Deterministic model built from regexes and word lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedModel;

impl RuleBasedModel {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageModel for RuleBasedModel {
    fn name(&self) -> &str {
        "rule-based"
    }

    fn tokenize(&self, text: &str, script: Script) -> AnalysisResult<Vec<Token>> {
        let re = match script {
            Script::Latin => latin_token_re(),
            Script::Cjk => cjk_token_re(),
        };

        let mut tokens = Vec::new();
        for m in re.find_iter(text) {
            let piece = m.as_str();
            let first = piece.chars().next().unwrap_or(' ');
            if is_cjk(first) {
                split_han_run(piece, &mut tokens);
            } else if first.is_alphabetic() {
                tokens.push(Token::new(piece, TokenKind::Word));
            } else if first.is_numeric() {
                tokens.push(Token::new(piece, TokenKind::Number));
            } else {
                tokens.push(Token::new(piece, TokenKind::Punct));
            }
        }
        Ok(tokens)
    }

    fn entities(&self, text: &str, script: Script) -> AnalysisResult<Vec<Entity>> {
        Ok(match script {
            Script::Latin => latin_entities(text),
            Script::Cjk => cjk_entities(text),
        })
    }
}

/// Splits a run of Han characters into word-like tokens: stop characters stand alone, short
/// stretches between them are kept whole and longer ones are cut into bigrams.
fn split_han_run(run: &str, tokens: &mut Vec<Token>) {
    fn flush(stretch: &mut Vec<char>, tokens: &mut Vec<Token>) {
        if stretch.len() <= 4 {
            if !stretch.is_empty() {
                tokens.push(Token {
                    text: stretch.iter().collect(),
                    kind: TokenKind::Word,
                });
            }
        } else {
            for chunk in stretch.chunks(2) {
                tokens.push(Token {
                    text: chunk.iter().collect(),
                    kind: TokenKind::Word,
                });
            }
        }
        stretch.clear();
    }

    let mut stretch: Vec<char> = Vec::new();
    for c in run.chars() {
        if CJK_STOP_CHARS.contains(&c) {
            flush(&mut stretch, tokens);
            tokens.push(Token {
                text: c.to_string(),
                kind: TokenKind::Word,
            });
        } else {
            stretch.push(c);
        }
    }
    flush(&mut stretch, tokens);
}

struct Word<'a> {
    text: &'a str,
    start: usize,
    end: usize,
    sentence_initial: bool,
}

fn is_capitalized(word: &str) -> bool {
    word.chars().next().is_some_and(|c| c.is_uppercase())
}

/// Mixed case after the first letter, or letters combined with digits: `iPhone`, `PlayStation`.
fn is_product_like(word: &str) -> bool {
    let has_digit = word.chars().any(|c| c.is_ascii_digit());
    let has_alpha = word.chars().any(|c| c.is_alphabetic());
    let inner_upper = word.chars().skip(1).any(|c| c.is_uppercase());
    let inner_lower = word.chars().any(|c| c.is_lowercase());
    (has_digit && has_alpha) || (inner_upper && inner_lower)
}

fn is_acronym(word: &str) -> bool {
    let len = word.chars().count();
    (3..=6).contains(&len) && word.chars().all(|c| c.is_ascii_uppercase())
}

fn latin_words(text: &str) -> Vec<Word<'_>> {
    let mut words = Vec::new();
    let mut last_end = 0;
    for m in latin_word_re().find_iter(text) {
        let gap = &text[last_end..m.start()];
        let sentence_initial = words.is_empty() || gap.contains(['.', '!', '?', '\n']);
        words.push(Word {
            text: m.as_str(),
            start: m.start(),
            end: m.end(),
            sentence_initial,
        });
        last_end = m.end();
    }
    words
}

/// Runs of capitalized words separated only by spaces, allowing `of`/`the`/`and` inside.
fn capitalized_spans<'a>(words: &'a [Word<'a>], text: &str) -> Vec<&'a [Word<'a>]> {
    let joins = |a: &Word, b: &Word| {
        let gap = &text[a.end..b.start];
        gap.chars().all(|c| c == ' ')
            || (gap == ". " && HONORIFICS.contains(&a.text.to_lowercase().as_str()))
    };
    let starts_span = |w: &Word| is_capitalized(w.text) || is_product_like(w.text);

    let mut spans = Vec::new();
    let mut i = 0;
    while i < words.len() {
        if !starts_span(&words[i]) {
            i += 1;
            continue;
        }
        let mut j = i + 1;
        while j < words.len() && joins(&words[j - 1], &words[j]) {
            let w = words[j].text;
            if starts_span(&words[j]) || w.chars().all(|c| c.is_ascii_digit()) {
                j += 1;
            } else if matches!(w, "of" | "the" | "and" | "de")
                && j + 1 < words.len()
                && joins(&words[j], &words[j + 1])
                && is_capitalized(words[j + 1].text)
            {
                j += 2;
            } else {
                break;
            }
        }
        spans.push(&words[i..j]);
        i = j;
    }
    spans
}

fn classify_latin_span(span: &[Word<'_>]) -> Option<(usize, EntityCategory)> {
    let lower: Vec<String> = span.iter().map(|w| w.text.to_lowercase()).collect();
    let last = lower.last()?;

    if let Some(k) = lower.iter().position(|w| HONORIFICS.contains(&w.as_str())) {
        if k + 1 < span.len() {
            return Some((k + 1, EntityCategory::Person));
        }
    }
    if ORG_SUFFIXES.contains(&last.as_str()) && span.len() > 1 {
        return Some((0, EntityCategory::Organization));
    }
    let joined = lower.join(" ");
    if PLACES.contains(&joined.as_str())
        || (PLACE_SUFFIXES.contains(&last.as_str()) && span.len() > 1)
    {
        return Some((0, EntityCategory::Place));
    }
    if span.iter().any(|w| is_product_like(w.text)) {
        return Some((0, EntityCategory::Product));
    }
    if span.len() == 1 && is_acronym(span[0].text) {
        return Some((0, EntityCategory::Organization));
    }
    if (2..=3).contains(&span.len()) && span.iter().all(|w| is_capitalized(w.text)) {
        return Some((0, EntityCategory::Person));
    }
    None
}

fn latin_entities(text: &str) -> Vec<Entity> {
    let words = latin_words(text);
    let mut entities = Vec::new();

    for span in capitalized_spans(&words, text) {
        // A capitalized stop word only opens the sentence.
        let span = match span.first() {
            Some(w) if w.sentence_initial && is_en_stopword(&w.text.to_lowercase()) => &span[1..],
            _ => span,
        };
        if span.is_empty() {
            continue;
        }
        if let Some((skip, category)) = classify_latin_span(span) {
            let kept = &span[skip..];
            if let (Some(first), Some(last)) = (kept.first(), kept.last()) {
                entities.push(Entity::new(&text[first.start..last.end], category));
            }
        }
    }
    entities
}

fn cjk_entities(text: &str) -> Vec<Entity> {
    let mut found: Vec<(usize, Entity)> = Vec::new();

    for caps in cjk_entity_re().captures_iter(text) {
        if let Some(m) = caps.name("org") {
            found.push((m.start(), Entity::new(m.as_str(), EntityCategory::Organization)));
        } else if let Some(m) = caps.name("person") {
            found.push((m.start(), Entity::new(m.as_str(), EntityCategory::Person)));
        } else if let Some(m) = caps.name("work") {
            found.push((m.start(), Entity::new(m.as_str(), EntityCategory::Product)));
        }
    }

    for place in CJK_PLACES {
        for (pos, _) in text.match_indices(place) {
            let inside_other = found.iter().any(|(start, e)| {
                pos >= *start && pos < start + e.text.len() && e.category != EntityCategory::Place
            });
            if !inside_other {
                found.push((pos, Entity::new(*place, EntityCategory::Place)));
            }
        }
    }

    // Latin brand names embedded in CJK text.
    for word in latin_words(text) {
        if is_product_like(word.text) {
            found.push((word.start, Entity::new(word.text, EntityCategory::Product)));
        }
    }

    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, e)| e).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(tokens: &[Token]) -> Vec<&str> {
        tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Word)
            .map(|t| t.text.as_str())
            .collect()
    }

    #[test]
    fn test_tokenize_latin() {
        let tokens = RuleBasedModel
            .tokenize("Robots can't dance, 3.5 times!", Script::Latin)
            .unwrap();
        assert_eq!(words(&tokens), vec!["Robots", "can't", "dance", "times"]);
        assert!(tokens
            .iter()
            .any(|t| t.kind == TokenKind::Number && t.text == "3.5"));
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Punct && t.text == "!"));
    }

    #[test]
    fn test_tokenize_cjk_splits_on_stop_chars() {
        let tokens = RuleBasedModel.tokenize("城市的發展是重要的", Script::Cjk).unwrap();
        assert_eq!(words(&tokens), vec!["城市", "的", "發展", "是", "重要", "的"]);
    }

    #[test]
    fn test_tokenize_cjk_long_run_bigrams() {
        let tokens = RuleBasedModel.tokenize("人工智能技術", Script::Cjk).unwrap();
        assert_eq!(words(&tokens), vec!["人工", "智能", "技術"]);
    }

    #[test]
    fn test_latin_entities() {
        let text = "Dr. Jane Goodall visited Acme Corp in New York with her iPhone.";
        let entities = RuleBasedModel.entities(text, Script::Latin).unwrap();
        let found: Vec<_> = entities
            .iter()
            .map(|e| (e.text.as_str(), e.category))
            .collect();
        assert_eq!(
            found,
            vec![
                ("Jane Goodall", EntityCategory::Person),
                ("Acme Corp", EntityCategory::Organization),
                ("New York", EntityCategory::Place),
                ("iPhone", EntityCategory::Product),
            ]
        );
    }

    #[test]
    fn test_sentence_initial_stopword_dropped() {
        let entities = RuleBasedModel
            .entities("The United States is large.", Script::Latin)
            .unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].text, "United States");
        assert_eq!(entities[0].category, EntityCategory::Place);
    }

    #[test]
    fn test_cjk_entities() {
        let text = "陳先生在香港的騰訊公司工作，讀過《三體》。";
        let entities = RuleBasedModel.entities(text, Script::Cjk).unwrap();
        let found: Vec<_> = entities
            .iter()
            .map(|e| (e.text.as_str(), e.category))
            .collect();
        assert_eq!(
            found,
            vec![
                ("陳先生", EntityCategory::Person),
                ("香港", EntityCategory::Place),
                ("騰訊公司", EntityCategory::Organization),
                ("三體", EntityCategory::Product),
            ]
        );
    }
}
