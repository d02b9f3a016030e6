//! Script detection.

use vgen_models::Script;

/// Share of CJK characters above which a span counts as CJK.
pub const CJK_RATIO_THRESHOLD: f64 = 0.10;

/// CJK unified ideographs, extension A and compatibility ideographs.
pub fn is_cjk(c: char) -> bool {
    matches!(c, '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}' | '\u{F900}'..='\u{FAFF}')
}

/// Classifies text as CJK or Latin dominant.
#[derive(Debug, Clone, Copy)]
pub struct LanguageDetector {
    threshold: f64,
}

impl Default for LanguageDetector {
    fn default() -> Self {
        Self {
            threshold: CJK_RATIO_THRESHOLD,
        }
    }
}

impl LanguageDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }

    /// CJK characters over non-whitespace characters. Zero for blank input.
    pub fn cjk_ratio(text: &str) -> f64 {
        let (cjk, total) = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .fold((0usize, 0usize), |(cjk, total), c| {
                (cjk + usize::from(is_cjk(c)), total + 1)
            });
        if total == 0 {
            return 0.0;
        }
        cjk as f64 / total as f64
    }

    pub fn detect(&self, text: &str) -> Script {
        if Self::cjk_ratio(text) > self.threshold {
            Script::Cjk
        } else {
            Script::Latin
        }
    }
}

/// Detect with the default threshold.
pub fn detect_script(text: &str) -> Script {
    LanguageDetector::default().detect(text)
}

/// Default BCP-47 code for a script when the caller gave none.
pub fn default_language_code(script: Script) -> &'static str {
    match script {
        Script::Cjk => "zh-CN",
        Script::Latin => "en-US",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_cjk() {
        assert_eq!(detect_script("大家好。這是測試。"), Script::Cjk);
        assert_eq!(detect_script("Hello world. This is a test."), Script::Latin);
    }

    #[test]
    fn test_empty_is_latin() {
        assert_eq!(detect_script(""), Script::Latin);
        assert_eq!(detect_script("   \n\t"), Script::Latin);
    }

    #[test]
    fn test_threshold_ignores_whitespace() {
        // 1 CJK char among 9 non-whitespace chars: ratio 0.111
        let text = "a b c d e f g h 中";
        assert!(LanguageDetector::cjk_ratio(text) > 0.11);
        assert_eq!(detect_script(text), Script::Cjk);

        // 1 of 10: exactly at the threshold, not above it
        let text = "abcdefghi中";
        assert!((LanguageDetector::cjk_ratio(text) - 0.1).abs() < 1e-12);
        assert_eq!(detect_script(text), Script::Latin);
    }

    #[test]
    fn test_mixed_text() {
        assert_eq!(detect_script("我們使用 AI 技術"), Script::Cjk);
    }
}
