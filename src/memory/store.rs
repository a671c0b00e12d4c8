//! 会话记忆库：追加写入对话轮次，按查询检索历史
//!
//! MemoryStore 是统一接口；错误在此边界以 Result 显式返回，由调用方决定「记录日志后继续」。
//! - NullMemory：未配置持久化后端时使用，add 为空操作，search 恒为空
//! - LocalMemory：进程内实现，按关键词重叠检索（测试与离线使用）
//! - HostedMemory（见 hosted.rs）：托管记忆服务

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::memory::tokenizer::{overlap_score, tokenize_to_set};
use crate::memory::{Message, Turn, TurnMetadata};

/// 检索结果对外展示前的条数上限
pub const MAX_SEARCH_RESULTS: usize = 5;

/// 记忆后端错误
#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("memory backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("memory backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("memory backend unavailable: {0}")]
    Unavailable(String),
}

/// 一条检索命中：内容与可选相关度分数
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemoryHit {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl MemoryHit {
    pub fn new(content: impl Into<String>, score: Option<f64>) -> Self {
        Self {
            content: content.into(),
            score,
        }
    }
}

/// 记忆库 trait：追加与检索
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// 追加一组消息；metadata 为 None 时表示非对话记录（如会话起始的 system 消息）
    async fn add(
        &self,
        messages: &[Message],
        metadata: Option<&TurnMetadata>,
    ) -> Result<(), MemoryError>;

    /// 按相关度降序返回命中
    async fn search(&self, query: &str) -> Result<Vec<MemoryHit>, MemoryError>;

    /// 是否真正持久化（NullMemory 返回 false）
    fn is_durable(&self) -> bool {
        true
    }

    /// 后端名称（用于日志与启动提示）
    fn backend_name(&self) -> &'static str;
}

/// 空实现：未启用持久化记忆时使用
#[derive(Clone, Debug, Default)]
pub struct NullMemory;

#[async_trait]
impl MemoryStore for NullMemory {
    async fn add(
        &self,
        _messages: &[Message],
        _metadata: Option<&TurnMetadata>,
    ) -> Result<(), MemoryError> {
        Ok(())
    }

    async fn search(&self, _query: &str) -> Result<Vec<MemoryHit>, MemoryError> {
        Ok(Vec::new())
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "null"
    }
}

struct LocalEntry {
    message: Message,
    metadata: Option<TurnMetadata>,
    tokens: HashSet<String>,
}

/// 进程内实现：按关键词重叠检索（无真实向量）
#[derive(Clone)]
pub struct LocalMemory {
    store: Arc<RwLock<Vec<LocalEntry>>>,
    max_entries: usize,
}

impl LocalMemory {
    pub fn new(max_entries: usize) -> Self {
        Self {
            store: Arc::new(RwLock::new(Vec::new())),
            max_entries,
        }
    }

    /// 已写入的对话轮次（不含无元数据的 system 记录），按写入顺序
    pub fn turns(&self) -> Vec<Turn> {
        let Ok(store) = self.store.read() else {
            return Vec::new();
        };
        store
            .iter()
            .filter_map(|e| {
                e.metadata
                    .as_ref()
                    .map(|m| m.to_turns(std::slice::from_ref(&e.message)).remove(0))
            })
            .collect()
    }

    /// 全部条目数（含 system 记录）
    pub fn len(&self) -> usize {
        self.store.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for LocalMemory {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[async_trait]
impl MemoryStore for LocalMemory {
    async fn add(
        &self,
        messages: &[Message],
        metadata: Option<&TurnMetadata>,
    ) -> Result<(), MemoryError> {
        let mut store = self
            .store
            .write()
            .map_err(|_| MemoryError::Unavailable("local store lock poisoned".to_string()))?;
        for message in messages {
            if message.content.trim().is_empty() {
                continue;
            }
            store.push(LocalEntry {
                tokens: tokenize_to_set(&message.content),
                message: message.clone(),
                metadata: metadata.cloned(),
            });
        }
        let n = store.len();
        if n > self.max_entries {
            store.drain(0..n - self.max_entries);
        }
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<MemoryHit>, MemoryError> {
        let query_tokens = tokenize_to_set(query);
        if query_tokens.is_empty() {
            return Ok(Vec::new());
        }
        let store = self
            .store
            .read()
            .map_err(|_| MemoryError::Unavailable("local store lock poisoned".to_string()))?;
        let mut scored: Vec<(usize, &LocalEntry)> = store
            .iter()
            .rev()
            .map(|e| (overlap_score(&query_tokens, &e.tokens), e))
            .filter(|(s, _)| *s > 0)
            .collect();
        // 稳定排序：同分时新写入的优先
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        let total = query_tokens.len() as f64;
        Ok(scored
            .into_iter()
            .map(|(s, e)| MemoryHit::new(e.message.content.clone(), Some(s as f64 / total)))
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}
