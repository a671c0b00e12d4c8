//! Mock / Scripted LLM 客户端（无需 API）
//!
//! - MockLlmClient：未配置 Key 时的兜底，直接以文本回复用户最后一条消息，便于本地跑通流程。
//! - ScriptedLlmClient：按顺序返回预置输出（含 JSON Tool Call），并记录每次收到的消息，供测试断言。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{LlmClient, LlmError};
use crate::memory::{Message, Role};

/// Mock 客户端：回显用户最后一条消息
#[derive(Debug, Default)]
pub struct MockLlmClient;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("(no input)");

        Ok(format!(
            "Mock reply (no LLM configured). You said: {}",
            last_user
        ))
    }
}

/// 脚本化客户端：依次弹出预置输出；脚本耗尽时返回 ApiError
#[derive(Debug, Default)]
pub struct ScriptedLlmClient {
    outputs: Mutex<VecDeque<Result<String, LlmError>>>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedLlmClient {
    pub fn new<I, S>(outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            outputs: Mutex::new(outputs.into_iter().map(|s| Ok(s.into())).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// 追加一次失败输出
    pub fn push_error(&self, err: LlmError) {
        if let Ok(mut q) = self.outputs.lock() {
            q.push_back(Err(err));
        }
    }

    /// 追加一次成功输出
    pub fn push_output(&self, output: impl Into<String>) {
        if let Ok(mut q) = self.outputs.lock() {
            q.push_back(Ok(output.into()));
        }
    }

    /// 每次 complete 收到的完整消息列表（含 system）
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(messages.to_vec());
        }
        self.outputs
            .lock()
            .map_err(|_| LlmError::ApiError("script lock poisoned".to_string()))?
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::ApiError("script exhausted".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_echoes_last_user_message() {
        let llm = MockLlmClient;
        let out = llm
            .complete(&[Message::system("sys"), Message::user("hello there")])
            .await
            .unwrap();
        assert!(out.contains("hello there"));
    }

    #[tokio::test]
    async fn test_scripted_pops_in_order_then_errors() {
        let llm = ScriptedLlmClient::new(["first", "second"]);
        assert_eq!(llm.complete(&[]).await.unwrap(), "first");
        assert_eq!(llm.complete(&[]).await.unwrap(), "second");
        assert!(llm.complete(&[]).await.is_err());
        assert_eq!(llm.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_scripted_push_error() {
        let llm = ScriptedLlmClient::default();
        llm.push_error(LlmError::Timeout(5));
        llm.push_output("ok");
        assert!(matches!(llm.complete(&[]).await, Err(LlmError::Timeout(5))));
        assert_eq!(llm.complete(&[]).await.unwrap(), "ok");
    }
}
