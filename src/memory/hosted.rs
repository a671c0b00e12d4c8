//! 托管记忆服务（Mem0 兼容 REST API）
//!
//! - add:    POST {base}/v1/memories/        {"messages", "user_id", "app_id", "metadata"}
//! - search: POST {base}/v1/memories/search/ {"query", "user_id", "app_id", "limit"}
//!
//! 鉴权头为 `Authorization: Token <api_key>`。所有调用只向上返回 MemoryError，不在此处吞错。

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::memory::{MemoryError, MemoryHit, MemoryStore, Message, TurnMetadata};

/// 托管服务连接参数（由配置解析后注入）
#[derive(Debug, Clone)]
pub struct HostedMemoryConfig {
    pub api_key: String,
    pub base_url: String,
    pub user_id: String,
    pub app_id: String,
    pub timeout_secs: u64,
    pub search_limit: usize,
}

/// 托管记忆：作用域为单个 user_id（由会话 ID 派生）
#[derive(Debug, Clone)]
pub struct HostedMemory {
    client: reqwest::Client,
    config: HostedMemoryConfig,
}

#[derive(Serialize)]
struct AddRequest<'a> {
    messages: &'a [Message],
    user_id: &'a str,
    app_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a TurnMetadata>,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    user_id: &'a str,
    app_id: &'a str,
    limit: usize,
}

/// 服务端单条记忆：新版字段为 memory，兼容 content
#[derive(Deserialize)]
struct RemoteMemory {
    #[serde(default)]
    memory: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    score: Option<f64>,
}

/// v1 直接返回数组；v2 包一层 {"results": [...]}
#[derive(Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    List(Vec<RemoteMemory>),
    Wrapped { results: Vec<RemoteMemory> },
}

impl SearchResponse {
    fn into_hits(self) -> Vec<MemoryHit> {
        let items = match self {
            SearchResponse::List(items) => items,
            SearchResponse::Wrapped { results } => results,
        };
        items
            .into_iter()
            .filter_map(|m| {
                m.memory
                    .or(m.content)
                    .map(|content| MemoryHit::new(content, m.score))
            })
            .collect()
    }
}

impl HostedMemory {
    /// 构建 HTTP 客户端；Key 为空或客户端构建失败时返回错误（调用方据此降级为 NullMemory）
    pub fn connect(config: HostedMemoryConfig) -> Result<Self, MemoryError> {
        if config.api_key.trim().is_empty() {
            return Err(MemoryError::Unavailable("empty API key".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, MemoryError> {
        let resp = self
            .client
            .post(self.endpoint(path))
            .header("Authorization", format!("Token {}", self.config.api_key))
            .json(body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MemoryError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }
}

#[async_trait]
impl MemoryStore for HostedMemory {
    async fn add(
        &self,
        messages: &[Message],
        metadata: Option<&TurnMetadata>,
    ) -> Result<(), MemoryError> {
        let body = AddRequest {
            messages,
            user_id: &self.config.user_id,
            app_id: &self.config.app_id,
            metadata,
        };
        self.post("v1/memories/", &body).await?;
        tracing::debug!(user_id = %self.config.user_id, count = messages.len(), "memory add ok");
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<MemoryHit>, MemoryError> {
        let body = SearchRequest {
            query,
            user_id: &self.config.user_id,
            app_id: &self.config.app_id,
            limit: self.config.search_limit,
        };
        let resp = self.post("v1/memories/search/", &body).await?;
        let parsed: SearchResponse = resp.json().await?;
        Ok(parsed.into_hits())
    }

    fn backend_name(&self) -> &'static str {
        "hosted"
    }
}
