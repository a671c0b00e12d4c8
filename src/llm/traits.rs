//! LLM 客户端抽象
//!
//! 所有后端（OpenAI 兼容 / Groq / Mock / Scripted）实现 LlmClient：complete（非流式完成）。

use async_trait::async_trait;
use thiserror::Error;

use crate::memory::Message;

/// LLM 调用错误
#[derive(Error, Debug, Clone)]
pub enum LlmError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Empty response from model")]
    EmptyResponse,
}

/// LLM 客户端 trait
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 非流式完成：返回模型输出文本
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError>;
}
