//! 错误恢复引擎
//!
//! 根据 AgentError 类型返回 RecoveryAction，供推理循环决定是重试还是终止本轮。

use crate::core::{AgentError, RecoveryAction};

/// 语义化错误恢复：将错误映射为可执行动作（重试提示 / 终止）
#[derive(Debug, Default)]
pub struct RecoveryEngine;

impl RecoveryEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, err: &AgentError) -> RecoveryAction {
        match err {
            AgentError::JsonParseError(raw) => RecoveryAction::RetryWithPrompt(format!(
                "Your previous output was not valid JSON: {raw}. \
                 When calling a tool you must output exactly one JSON object and nothing else, \
                 in the form {{\"tool\": \"<name>\", \"args\": {{...}}}}. \
                 For example: {{\"tool\": \"calculator\", \"args\": {{\"expression\": \"2 + 2\"}}}}. \
                 If you do not need a tool, answer in plain text without any JSON."
            )),
            _ => RecoveryAction::Abort,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;

    #[test]
    fn test_recovery_json_parse_error() {
        let engine = RecoveryEngine::new();
        let err = AgentError::JsonParseError("invalid json".to_string());
        match engine.handle(&err) {
            RecoveryAction::RetryWithPrompt(msg) => {
                assert!(msg.contains("JSON"));
                assert!(msg.contains("invalid json"));
            }
            _ => panic!("Expected RetryWithPrompt"),
        }
    }

    #[test]
    fn test_recovery_llm_error_aborts() {
        let engine = RecoveryEngine::new();
        let err = AgentError::LlmError(LlmError::ApiError("boom".to_string()));
        assert!(matches!(engine.handle(&err), RecoveryAction::Abort));
    }

    #[test]
    fn test_recovery_step_limit_aborts() {
        let engine = RecoveryEngine::new();
        assert!(matches!(
            engine.handle(&AgentError::StepLimit(10)),
            RecoveryAction::Abort
        ));
    }

    #[test]
    fn test_recovery_registry_misuse_aborts() {
        let engine = RecoveryEngine::new();
        let err = AgentError::UnknownTool("fake_tool".to_string());
        assert!(matches!(engine.handle(&err), RecoveryAction::Abort));
    }
}
