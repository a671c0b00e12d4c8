//! 核心编排层：消息分类、会话、错误与恢复、轮次编排与组装

pub mod builder;
pub mod classifier;
pub mod error;
pub mod orchestrator;
pub mod recovery;
pub mod session;
pub mod state;

pub use builder::{
    build_tool_registry, create_llm_from_config, create_memory_from_config, load_knowledge_base,
    OrchestratorBuilder,
};
pub use classifier::{classify, MessageType};
pub use error::{AgentError, RecoveryAction};
pub use orchestrator::{Command, TurnOrchestrator, TurnOutcome};
pub use recovery::RecoveryEngine;
pub use session::Session;
pub use state::TurnPhase;
