//! 记忆检索工具：memory_search / memory_summary
//!
//! 委托给 MemoryStore::search；后端错误在这里转为文本，不影响本轮对话。

use std::sync::Arc;

use async_trait::async_trait;

use crate::memory::{MemoryStore, MAX_SEARCH_RESULTS};
use crate::tools::Tool;

const SUMMARY_QUERY: &str = "conversation summary recent topics";

/// 检索历史对话
pub struct MemorySearchTool {
    memory: Arc<dyn MemoryStore>,
}

impl MemorySearchTool {
    pub fn new(memory: Arc<dyn MemoryStore>) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl Tool for MemorySearchTool {
    fn name(&self) -> &str {
        "memory_search"
    }

    fn description(&self) -> &str {
        "Search through conversation history and memory to find relevant past interactions, topics discussed, or information shared"
    }

    fn input_name(&self) -> Option<&str> {
        Some("query")
    }

    async fn invoke(&self, input: &str) -> String {
        if !self.memory.is_durable() {
            return "💭 Memory system not available. For persistent memory across sessions, configure your Mem0 API key.".to_string();
        }
        match self.memory.search(input).await {
            Ok(hits) if hits.is_empty() => format!(
                "🔍 No relevant information found in memory for '{input}'. Try rephrasing your search or ask about recent conversations."
            ),
            Ok(hits) => {
                let lines: Vec<String> = hits
                    .iter()
                    .take(MAX_SEARCH_RESULTS)
                    .enumerate()
                    .map(|(i, hit)| format!("{}. {}", i + 1, hit.content))
                    .collect();
                format!("🧠 **Memory Search Results:**\n{}", lines.join("\n"))
            }
            Err(e) => {
                tracing::error!(error = %e, "memory search error");
                format!("❌ Memory search error: {e}")
            }
        }
    }
}

/// 近期对话摘要（无参数）
pub struct MemorySummaryTool {
    memory: Arc<dyn MemoryStore>,
}

impl MemorySummaryTool {
    pub fn new(memory: Arc<dyn MemoryStore>) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl Tool for MemorySummaryTool {
    fn name(&self) -> &str {
        "memory_summary"
    }

    fn description(&self) -> &str {
        "Get a summary of recent conversations and key topics discussed"
    }

    fn input_name(&self) -> Option<&str> {
        None
    }

    async fn invoke(&self, _input: &str) -> String {
        if !self.memory.is_durable() {
            return "💭 Memory system not available for summaries.".to_string();
        }
        match self.memory.search(SUMMARY_QUERY).await {
            Ok(hits) if hits.is_empty() => {
                "📝 No recent conversation summary available. Start chatting to build memory!"
                    .to_string()
            }
            Ok(hits) => {
                let lines: Vec<String> = hits
                    .iter()
                    .take(MAX_SEARCH_RESULTS)
                    .map(|hit| format!("- {}", hit.content))
                    .collect();
                format!("📋 **Recent Memory Summary:**\n{}", lines.join("\n"))
            }
            Err(e) => format!("❌ Error retrieving memory summary: {e}"),
        }
    }
}
