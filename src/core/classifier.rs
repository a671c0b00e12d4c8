//! 消息分类：为写入记忆库的对话打标签
//!
//! 纯函数、大小写不敏感的关键词扫描，按固定优先级命中即返回：
//! 电影 > 计算 > 天气 > 回忆 > 含问号 > 普通对话。
//! 该优先级沿用既有行为以保持兼容（如同时含 "movie" 与 "?" 归为 movie_query）。

use std::fmt;

use serde::{Deserialize, Serialize};

/// 消息类型（闭集）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    MovieQuery,
    Calculation,
    WeatherQuery,
    MemorySearch,
    Question,
    GeneralConversation,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::MovieQuery => "movie_query",
            MessageType::Calculation => "calculation",
            MessageType::WeatherQuery => "weather_query",
            MessageType::MemorySearch => "memory_search",
            MessageType::Question => "question",
            MessageType::GeneralConversation => "general_conversation",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const MOVIE_KEYWORDS: &[&str] = &["movie", "film", "cinema", "actor", "director"];
const CALCULATION_KEYWORDS: &[&str] = &["calculate", "math", "+", "-", "*", "/", "equation"];
const WEATHER_KEYWORDS: &[&str] = &["weather", "temperature", "climate"];
const MEMORY_KEYWORDS: &[&str] = &["remember", "recall", "memory", "previous", "earlier"];

/// 按优先级排列的 (关键词集合, 类型)
const RULES: &[(&[&str], MessageType)] = &[
    (MOVIE_KEYWORDS, MessageType::MovieQuery),
    (CALCULATION_KEYWORDS, MessageType::Calculation),
    (WEATHER_KEYWORDS, MessageType::WeatherQuery),
    (MEMORY_KEYWORDS, MessageType::MemorySearch),
];

/// 对原始输入分类（子串匹配，非整词匹配）
pub fn classify(text: &str) -> MessageType {
    let lower = text.to_lowercase();
    for (keywords, kind) in RULES {
        if keywords.iter().any(|k| lower.contains(k)) {
            return *kind;
        }
    }
    if text.contains('?') {
        MessageType::Question
    } else {
        MessageType::GeneralConversation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_beats_question_mark() {
        assert_eq!(
            classify("What's the weather in Paris?"),
            MessageType::WeatherQuery
        );
    }

    #[test]
    fn test_plain_question() {
        assert_eq!(classify("Can you help me?"), MessageType::Question);
    }

    #[test]
    fn test_movie_has_highest_priority() {
        assert_eq!(
            classify("Which movie should I calculate the weather for?"),
            MessageType::MovieQuery
        );
        assert_eq!(classify("Who directed that FILM?"), MessageType::MovieQuery);
    }

    #[test]
    fn test_calculation_keywords_and_operators() {
        assert_eq!(classify("Calculate 25 * 4 + 10"), MessageType::Calculation);
        assert_eq!(classify("12/4"), MessageType::Calculation);
        // 子串匹配：连字符也会命中计算类
        assert_eq!(classify("a well-known fact"), MessageType::Calculation);
    }

    #[test]
    fn test_memory_recall() {
        assert_eq!(
            classify("What did we discuss earlier?"),
            MessageType::MemorySearch
        );
        assert_eq!(classify("Do you REMEMBER me"), MessageType::MemorySearch);
    }

    #[test]
    fn test_general_conversation_fallback() {
        assert_eq!(classify("Hello there"), MessageType::GeneralConversation);
        assert_eq!(classify(""), MessageType::GeneralConversation);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let input = "Tell me about the climate in Oslo";
        assert_eq!(classify(input), classify(input));
        assert_eq!(classify(input), MessageType::WeatherQuery);
    }

    #[test]
    fn test_serialized_labels() {
        assert_eq!(
            serde_json::to_string(&MessageType::GeneralConversation).unwrap(),
            "\"general_conversation\""
        );
        assert_eq!(MessageType::MemorySearch.to_string(), "memory_search");
    }
}
