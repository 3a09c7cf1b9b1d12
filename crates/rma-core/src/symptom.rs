//! 症狀文字判斷
//!
//! 現場人員常把故障現象（如 "chipped"、"marriage failure"）填進更換零件名稱欄位。
//! 判斷規則集中在此，模式清單可由配置覆寫。

use serde::{Deserialize, Serialize};

/// 預設症狀關鍵字
pub const DEFAULT_SYMPTOM_PATTERNS: &[&str] = &[
    "chipped",
    "marriage failure",
    "cracked",
    "broken",
    "burnt",
    "not working",
    "no display",
    "no image",
    "flicker",
    "overheat",
    "noise",
    "dead pixel",
    "discolor",
    "error code",
];

/// 症狀分類器（不分大小寫的子字串比對）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomClassifier {
    patterns: Vec<String>,
}

impl SymptomClassifier {
    /// 以自訂模式清單建立
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| p.as_ref().trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        Self { patterns }
    }

    /// 判斷文字是否為症狀描述
    pub fn is_symptom(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.patterns.iter().any(|p| lowered.contains(p.as_str()))
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl Default for SymptomClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_SYMPTOM_PATTERNS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Chipped", true)]
    #[case("DMD marriage failure", true)]
    #[case("Lens CRACKED on arrival", true)]
    #[case("Integrator Rod", false)]
    #[case("Light Engine Assembly", false)]
    #[case("", false)]
    fn test_default_patterns(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(SymptomClassifier::default().is_symptom(text), expected);
    }

    #[test]
    fn test_custom_patterns() {
        let classifier = SymptomClassifier::new(["  Rattle ", ""]);
        assert_eq!(classifier.patterns(), &["rattle".to_string()]);
        assert!(classifier.is_symptom("Fan rattle"));
        assert!(!classifier.is_symptom("Chipped"));
        assert!(classifier.is_symptom("loud RATTLE"));
    }
}
