//! 记忆层：推理上下文（对话历史）、会话记忆库（Null / Local / Hosted）、文档知识库、分词

pub mod conversation;
pub mod hosted;
pub mod rag;
pub mod store;
pub mod tokenizer;

pub use conversation::{ConversationMemory, Message, Role, Turn, TurnMetadata};
pub use hosted::{HostedMemory, HostedMemoryConfig};
pub use rag::{Chunk, Chunker, ChunkingConfig, KnowledgeBase, KnowledgeError, RetrievalResult};
pub use store::{LocalMemory, MemoryError, MemoryHit, MemoryStore, NullMemory, MAX_SEARCH_RESULTS};
