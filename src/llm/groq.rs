//! Groq API 客户端（OpenAI 兼容格式）
//!
//! Groq 提供与 OpenAI 兼容的 API 接口。
//! - Base URL: https://api.groq.com/openai/v1
//! - 默认模型: llama3-70b-8192

use crate::llm::OpenAiClient;

/// Groq API 常量
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const GROQ_LLAMA3_70B: &str = "llama3-70b-8192";

/// 创建 Groq 客户端；base_url 为空时使用官方端点
pub fn create_groq_client(
    api_key: &str,
    model: &str,
    base_url: Option<&str>,
    temperature: f32,
) -> OpenAiClient {
    OpenAiClient::new(Some(base_url.unwrap_or(GROQ_BASE_URL)), model, api_key)
        .with_temperature(temperature)
}
