//! Planner：调用 LLM 与 Tool Call 解析
//!
//! 调用 LLM 得到回复或 JSON Tool Call；parse_llm_output 从文本中提取 JSON 并解析为 ToolCall 或直接回复。

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::AgentError;
use crate::llm::LlmClient;
use crate::memory::Message;

/// LLM 返回的 Tool Call（{"tool": "calculator", "args": {"expression": "..."}}）
///
/// args 可以是对象、字符串或省略（无参数工具）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

/// Planner 输出
#[derive(Debug, Clone)]
pub enum PlannerOutput {
    /// 直接回复用户
    Response(String),
    /// 需要执行工具
    ToolCall(ToolCall),
}

/// 解析 LLM 输出：若含有效 JSON 且 tool 非空则为 ToolCall，否则为 Response
///
/// 文本中出现花括号但没有 "tool" 字段时按普通回复处理；
/// 明显想调用工具（含 "tool"）却不是合法 JSON 时返回 JsonParseError，交给恢复引擎重试。
pub fn parse_llm_output(output: &str) -> Result<PlannerOutput, AgentError> {
    let trimmed = output.trim();

    // 尝试提取 JSON 块（```json ... ``` 或纯 JSON）
    let json_str = if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + 7..];
        rest.find("```")
            .map(|end| rest[..end].trim())
            .unwrap_or(rest.trim())
    } else if let Some(start) = trimmed.find('{') {
        match trimmed.rfind('}') {
            Some(end) if end > start => &trimmed[start..=end],
            _ => &trimmed[start..],
        }
    } else {
        return Ok(PlannerOutput::Response(trimmed.to_string()));
    };

    let parsed: ToolCall = match serde_json::from_str(json_str) {
        Ok(call) => call,
        Err(_) if !json_str.contains("\"tool\"") => {
            return Ok(PlannerOutput::Response(trimmed.to_string()))
        }
        Err(e) => return Err(AgentError::JsonParseError(format!("{}: {}", e, json_str))),
    };

    if parsed.tool.trim().is_empty() {
        Ok(PlannerOutput::Response(trimmed.to_string()))
    } else {
        Ok(PlannerOutput::ToolCall(parsed))
    }
}

/// Planner：持有 LLM 与基础 system prompt，负责拼 system + messages 后调用 LLM
pub struct Planner {
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
}

impl Planner {
    pub fn new(llm: Arc<dyn LlmClient>, system_prompt: impl Into<String>) -> Self {
        Self {
            llm,
            system_prompt: system_prompt.into(),
        }
    }

    pub fn base_system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// 使用动态拼接的 system（含工具列表、记忆检索结果等）
    pub async fn plan_with_system(
        &self,
        messages: &[Message],
        system: &str,
    ) -> Result<String, AgentError> {
        let mut full_messages = Vec::with_capacity(messages.len() + 1);
        full_messages.push(Message::system(system.to_string()));
        full_messages.extend_from_slice(messages);
        Ok(self.llm.complete(&full_messages).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_response() {
        match parse_llm_output("  The answer is 42.  ").unwrap() {
            PlannerOutput::Response(r) => assert_eq!(r, "The answer is 42."),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_tool_call_in_code_fence() {
        let out = "Let me check.\n```json\n{\"tool\": \"weather\", \"args\": {\"location\": \"Paris\"}}\n```";
        match parse_llm_output(out).unwrap() {
            PlannerOutput::ToolCall(tc) => {
                assert_eq!(tc.tool, "weather");
                assert_eq!(tc.args["location"], "Paris");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_string_args_and_missing_args() {
        match parse_llm_output(r#"{"tool": "calculator", "args": "2+2"}"#).unwrap() {
            PlannerOutput::ToolCall(tc) => assert_eq!(tc.args, serde_json::json!("2+2")),
            other => panic!("unexpected {other:?}"),
        }
        match parse_llm_output(r#"{"tool": "memory_summary"}"#).unwrap() {
            PlannerOutput::ToolCall(tc) => assert!(tc.args.is_null()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_braces_without_tool_are_plain_text() {
        assert!(matches!(
            parse_llm_output("The set {1, 2, 3} has three elements."),
            Ok(PlannerOutput::Response(_))
        ));
    }

    #[test]
    fn test_broken_tool_json_is_parse_error() {
        assert!(matches!(
            parse_llm_output(r#"{"tool": "calculator", "args": {"expression": "2+2"}"#),
            Err(AgentError::JsonParseError(_))
        ));
    }
}
