//! 分词模块
//!
//! 小写化后按非字母数字字符切分，用于本地记忆与知识库的关键词重叠检索。

use std::collections::HashSet;

/// 切分为小写词，丢弃单字符词
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|s| s.trim_matches('\'').to_lowercase())
        .filter(|s| s.chars().count() > 1)
        .collect()
}

/// 分词并返回词集合（用于相似度计算）
pub fn tokenize_to_set(text: &str) -> HashSet<String> {
    tokenize(text).into_iter().collect()
}

/// 计算两个词集合的重叠分数（交集大小）
pub fn overlap_score(set1: &HashSet<String>, set2: &HashSet<String>) -> usize {
    set1.intersection(set2).count()
}
