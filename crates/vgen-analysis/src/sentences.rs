//! Rule-based sentence splitting for Latin and CJK text.

/// Sentence-terminal punctuation in CJK text.
pub const CJK_TERMINALS: &[char] = &['。', '！', '？'];

const LATIN_TERMINALS: &[char] = &['.', '!', '?'];

/// Closing quotes and brackets that stay attached to the preceding sentence.
const CLOSERS: &[char] = &['"', '\'', '”', '’', ')', ']', '»'];

/// Lower-cased words that end with a period without ending a sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "mt", "vs", "etc", "e.g", "i.e", "inc",
    "ltd", "co", "corp", "no", "fig", "approx", "dept", "est", "gen", "gov", "sen", "rep", "jan",
    "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec", "u.s", "u.k",
];

/// Iterator over Latin sentences, borrowing from the input.
///
/// Breaks after `.`, `!` or `?` (plus trailing closers) when followed by whitespace. A period
/// does not break after a known abbreviation, after a single capital initial, or when the
/// next word starts in lower case.
#[derive(Debug, Clone)]
pub struct Sentences<'a> {
    rest: &'a str,
}

pub fn latin_sentences(text: &str) -> Sentences<'_> {
    Sentences { rest: text }
}

impl<'a> Iterator for Sentences<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let text = self.rest.trim_start();
        if text.is_empty() {
            self.rest = "";
            return None;
        }

        let mut chars = text.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            if !LATIN_TERMINALS.contains(&c) {
                continue;
            }

            let mut end = i + c.len_utf8();
            let mut run = 1;
            while let Some(&(j, n)) = chars.peek() {
                if LATIN_TERMINALS.contains(&n) {
                    run += 1;
                } else if !CLOSERS.contains(&n) {
                    break;
                }
                end = j + n.len_utf8();
                chars.next();
            }

            let after = &text[end..];
            if after.is_empty() {
                break;
            }
            if !after.starts_with(char::is_whitespace) {
                continue;
            }
            if c == '.' && run == 1 && continues_sentence(&text[..i], after) {
                continue;
            }

            self.rest = after;
            return Some(text[..end].trim_end());
        }

        self.rest = "";
        Some(text.trim_end())
    }
}

fn continues_sentence(before: &str, after: &str) -> bool {
    let word = before
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or("")
        .trim_start_matches(|c: char| !c.is_alphanumeric());
    let lower = word.to_lowercase();
    if ABBREVIATIONS.contains(&lower.as_str()) {
        return true;
    }

    let mut letters = word.chars();
    if let (Some(first), None) = (letters.next(), letters.next()) {
        if first.is_uppercase() {
            return true;
        }
    }

    after
        .trim_start()
        .chars()
        .next()
        .is_some_and(|c| c.is_lowercase())
}

/// Iterator over CJK sentences. Each sentence keeps its own terminal marks; a trailing
/// fragment without a mark is yielded as is.
#[derive(Debug, Clone)]
pub struct CjkSentences<'a> {
    rest: &'a str,
}

pub fn cjk_sentences(text: &str) -> CjkSentences<'_> {
    CjkSentences { rest: text }
}

impl<'a> Iterator for CjkSentences<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let text = self.rest.trim_start();
        if text.is_empty() {
            self.rest = "";
            return None;
        }

        let mut seen_content = false;
        let mut chars = text.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            if !CJK_TERMINALS.contains(&c) {
                seen_content |= !c.is_whitespace();
                continue;
            }
            let ends_run = chars
                .peek()
                .map_or(true, |&(_, n)| !CJK_TERMINALS.contains(&n));
            if seen_content && ends_run {
                let end = i + c.len_utf8();
                self.rest = &text[end..];
                return Some(text[..end].trim_end());
            }
        }

        self.rest = "";
        Some(text.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin_basic_split() {
        let sentences: Vec<_> = latin_sentences("Hello world. This is a test.").collect();
        assert_eq!(sentences, vec!["Hello world.", "This is a test."]);
    }

    #[test]
    fn test_latin_abbreviations_and_initials() {
        let text = "Dr. Smith met J. R. Tolkien at 5 p.m. yesterday. It went well!";
        let sentences: Vec<_> = latin_sentences(text).collect();
        assert_eq!(
            sentences,
            vec![
                "Dr. Smith met J. R. Tolkien at 5 p.m. yesterday.",
                "It went well!"
            ]
        );
    }

    #[test]
    fn test_latin_quotes_and_runs() {
        let text = "He said \"stop!\" Then he left?! Nobody knew";
        let sentences: Vec<_> = latin_sentences(text).collect();
        assert_eq!(
            sentences,
            vec!["He said \"stop!\"", "Then he left?!", "Nobody knew"]
        );
    }

    #[test]
    fn test_latin_no_space_after_period() {
        let sentences: Vec<_> = latin_sentences("Version 2.5 is out. Upgrade now.").collect();
        assert_eq!(sentences, vec!["Version 2.5 is out.", "Upgrade now."]);
    }

    #[test]
    fn test_cjk_split_keeps_marks() {
        let sentences: Vec<_> = cjk_sentences("大家好。這是測試！真的嗎？？最後一句").collect();
        assert_eq!(sentences, vec!["大家好。", "這是測試！", "真的嗎？？", "最後一句"]);
    }

    #[test]
    fn test_cjk_leading_marks_attach_forward() {
        let sentences: Vec<_> = cjk_sentences("。開始了。").collect();
        assert_eq!(sentences, vec!["。開始了。"]);
    }

    #[test]
    fn test_restartable() {
        let iter = latin_sentences("One. Two.");
        assert_eq!(iter.clone().count(), 2);
        assert_eq!(iter.count(), 2);
    }
}
