//! 短期记忆：对话历史与持久化的对话轮次
//!
//! - Message / ConversationMemory：推理循环内的上下文，保留最近 N 轮，超出时自动剪枝；reset 时清空。
//! - Turn / TurnMetadata：写入记忆库的一轮对话（user + assistant），带分类与会话信息，写入后不可变。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::MessageType;

/// 消息角色（与 LLM API 一致）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// 单条消息
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// 一轮对话的元数据：时间戳、会话 ID、消息分类
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurnMetadata {
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    pub message_type: MessageType,
}

impl TurnMetadata {
    pub fn new(session_id: impl Into<String>, message_type: MessageType) -> Self {
        Self {
            timestamp: Utc::now(),
            session_id: session_id.into(),
            message_type,
        }
    }

    /// 将元数据展开到一组消息上，得到可持久化的 Turn 列表
    pub fn to_turns(&self, messages: &[Message]) -> Vec<Turn> {
        messages
            .iter()
            .map(|m| Turn {
                role: m.role,
                content: m.content.clone(),
                timestamp: self.timestamp,
                session_id: self.session_id.clone(),
                message_type: self.message_type,
            })
            .collect()
    }
}

/// 已持久化的一条对话记录
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    pub message_type: MessageType,
}

/// 短期记忆：最近 N 轮对话（每轮含 user + assistant，故实际保留约 max_turns*2 条消息）
#[derive(Clone, Debug)]
pub struct ConversationMemory {
    messages: Vec<Message>,
    max_turns: usize,
}

impl ConversationMemory {
    pub fn new(max_turns: usize) -> Self {
        Self {
            messages: Vec::new(),
            max_turns,
        }
    }

    pub fn push(&mut self, msg: Message) {
        self.messages.push(msg);
        self.prune();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    fn prune(&mut self) {
        let keep = self.max_turns.max(1) * 2;
        if self.messages.len() > keep {
            self.messages.drain(..self.messages.len() - keep);
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
