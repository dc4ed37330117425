use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Chinese,
}

impl Language {
    /// Picks Chinese when the text contains any CJK ideograph, English when it contains
    /// other alphabetic characters, and `fallback` for empty or symbol-only input.
    pub fn detect(text: &str, fallback: Language) -> Language {
        if text.chars().any(is_cjk_ideograph) {
            Language::Chinese
        } else if text.chars().any(char::is_alphabetic) {
            Language::English
        } else {
            fallback
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Chinese => "zh",
        }
    }

    pub fn from_code(code: &str) -> Result<Self, String> {
        match code.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "zh" | "cn" | "chinese" => Ok(Language::Chinese),
            other => Err(format!("Unsupported language: {}", other)),
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::English
    }
}

fn is_cjk_ideograph(c: char) -> bool {
    matches!(c as u32,
        0x4E00..=0x9FFF
        | 0x3400..=0x4DBF
        | 0xF900..=0xFAFF
        | 0x20000..=0x2A6DF
        | 0x2A700..=0x2EBEF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_chinese() {
        assert_eq!(
            Language::detect("查询所有住院患者", Language::English),
            Language::Chinese
        );
        assert_eq!(
            Language::detect("count patients 按科室", Language::English),
            Language::Chinese
        );
    }

    #[test]
    fn test_detects_english() {
        assert_eq!(
            Language::detect("how many patients were admitted", Language::Chinese),
            Language::English
        );
    }

    #[test]
    fn test_ambiguous_input_uses_fallback() {
        assert_eq!(Language::detect("", Language::Chinese), Language::Chinese);
        assert_eq!(Language::detect("  123 ?", Language::English), Language::English);
    }

    #[test]
    fn test_codes() {
        assert_eq!(Language::from_code("zh").unwrap(), Language::Chinese);
        assert_eq!(Language::from_code("EN").unwrap().code(), "en");
        assert!(Language::from_code("fr").is_err());
    }
}
