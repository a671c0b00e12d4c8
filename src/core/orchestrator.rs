//! 轮次编排器
//!
//! 一次处理一条用户输入：交给推理 oracle（期间可多次调用工具）-> 分类 -> 写入会话记忆 -> 返回回复。
//! oracle 失败时返回用户可读的错误文本，本轮不写记忆；记忆写入失败只记日志。

use std::sync::Arc;

use crate::core::{classify, AgentError, MessageType, Session, TurnPhase};
use crate::memory::{MemoryStore, Message, TurnMetadata};
use crate::react::ReasoningOracle;
use crate::tools::ToolExecutor;

/// 未启用会话时写入元数据的会话 ID
const UNKNOWN_SESSION: &str = "unknown";

/// 从 CLI 发往编排器的用户命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 提交用户输入
    Submit(String),
    /// 清空推理上下文（不影响记忆库）
    Reset,
    /// 显示帮助
    Help,
    /// 空输入，忽略
    Empty,
    /// 退出应用
    Quit,
}

/// 成功完成的一轮
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub response: String,
    pub message_type: MessageType,
    /// 是否已写入记忆库
    pub persisted: bool,
}

pub struct TurnOrchestrator {
    oracle: Box<dyn ReasoningOracle>,
    tools: ToolExecutor,
    memory: Arc<dyn MemoryStore>,
    session: Option<Session>,
    phase: TurnPhase,
}

impl TurnOrchestrator {
    pub fn new(
        oracle: Box<dyn ReasoningOracle>,
        tools: ToolExecutor,
        memory: Arc<dyn MemoryStore>,
        session: Option<Session>,
    ) -> Self {
        Self {
            oracle,
            tools,
            memory,
            session,
            phase: TurnPhase::Idle,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn memory(&self) -> &Arc<dyn MemoryStore> {
        &self.memory
    }

    pub fn tools(&self) -> &ToolExecutor {
        &self.tools
    }

    /// 最近一轮所处的阶段
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// 处理一条输入，失败时转为 "Sorry, I encountered an error: ..."
    pub async fn process(&mut self, utterance: &str) -> String {
        match self.try_process(utterance).await {
            Ok(outcome) => outcome.response,
            Err(e) => format!("Sorry, I encountered an error: {e}"),
        }
    }

    pub async fn try_process(&mut self, utterance: &str) -> Result<TurnOutcome, AgentError> {
        self.phase = TurnPhase::Received;
        tracing::debug!(chars = utterance.chars().count(), "turn received");

        self.phase = TurnPhase::Dispatched;
        let response = match self
            .oracle
            .reason(utterance, &self.tools, self.memory.as_ref())
            .await
        {
            Ok(response) => response,
            Err(e) => {
                self.phase = TurnPhase::Failed;
                tracing::error!(error = %e, "turn failed");
                return Err(e);
            }
        };

        let message_type = classify(utterance);
        let persisted = self.persist(utterance, &response, message_type).await;
        self.phase = TurnPhase::Completed;
        tracing::info!(message_type = %message_type, persisted, "turn completed");

        Ok(TurnOutcome {
            response,
            message_type,
            persisted,
        })
    }

    /// 写入 (user, assistant) 一对消息；失败只记日志
    async fn persist(&self, utterance: &str, response: &str, message_type: MessageType) -> bool {
        let session_id = self
            .session
            .as_ref()
            .map(Session::id)
            .unwrap_or(UNKNOWN_SESSION);
        let metadata = TurnMetadata::new(session_id, message_type);
        let messages = [Message::user(utterance), Message::assistant(response)];

        match self.memory.add(&messages, Some(&metadata)).await {
            Ok(()) => self.memory.is_durable(),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    backend = self.memory.backend_name(),
                    session_id,
                    "failed to store turn in memory"
                );
                false
            }
        }
    }

    /// 清空推理上下文；不触碰记忆库，失败只记日志
    pub fn reset(&mut self) {
        match self.oracle.reset() {
            Ok(()) => tracing::info!("conversation context reset"),
            Err(e) => tracing::warn!(error = %e, "failed to reset conversation context"),
        }
        self.phase = TurnPhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::llm::{LlmError, ScriptedLlmClient};
    use crate::memory::{LocalMemory, MemoryError, MemoryHit, NullMemory};
    use crate::react::ReactOracle;
    use crate::tools::{CalculatorTool, ToolRegistry};

    /// 固定回复或固定失败的 oracle
    struct FixedOracle {
        reply: Result<String, String>,
        resets: usize,
    }

    #[async_trait]
    impl ReasoningOracle for FixedOracle {
        async fn reason(
            &mut self,
            _utterance: &str,
            _tools: &ToolExecutor,
            _memory: &dyn MemoryStore,
        ) -> Result<String, AgentError> {
            self.reply
                .clone()
                .map_err(|e| AgentError::LlmError(LlmError::ApiError(e)))
        }

        fn reset(&mut self) -> Result<(), AgentError> {
            self.resets += 1;
            if self.resets > 1 {
                return Err(AgentError::ConfigError("already reset".to_string()));
            }
            Ok(())
        }
    }

    struct BrokenMemory;

    #[async_trait]
    impl MemoryStore for BrokenMemory {
        async fn add(
            &self,
            _messages: &[Message],
            _metadata: Option<&TurnMetadata>,
        ) -> Result<(), MemoryError> {
            Err(MemoryError::Unavailable("offline".to_string()))
        }

        async fn search(&self, _query: &str) -> Result<Vec<MemoryHit>, MemoryError> {
            Err(MemoryError::Unavailable("offline".to_string()))
        }

        fn backend_name(&self) -> &'static str {
            "broken"
        }
    }

    fn orchestrator(
        reply: Result<&str, &str>,
        memory: Arc<dyn MemoryStore>,
        session: Option<Session>,
    ) -> TurnOrchestrator {
        let oracle = FixedOracle {
            reply: reply.map(String::from).map_err(String::from),
            resets: 0,
        };
        TurnOrchestrator::new(
            Box::new(oracle),
            ToolExecutor::new(ToolRegistry::new(), 5),
            memory,
            session,
        )
    }

    #[tokio::test]
    async fn test_completed_turn_is_tagged_and_stored() {
        let memory = Arc::new(LocalMemory::default());
        let mut orch = orchestrator(
            Ok("It's sunny."),
            memory.clone(),
            Some(Session::start(Some("s42"))),
        );
        let outcome = orch.try_process("What's the weather in Paris?").await.unwrap();
        assert_eq!(outcome.message_type, MessageType::WeatherQuery);
        assert!(outcome.persisted);
        assert_eq!(orch.phase(), TurnPhase::Completed);

        let turns = memory.turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].content, "What's the weather in Paris?");
        assert_eq!(turns[1].content, "It's sunny.");
        assert!(turns
            .iter()
            .all(|t| t.session_id == "s42" && t.message_type == MessageType::WeatherQuery));
    }

    #[tokio::test]
    async fn test_missing_session_is_recorded_as_unknown() {
        let memory = Arc::new(LocalMemory::default());
        let mut orch = orchestrator(Ok("hi"), memory.clone(), None);
        orch.process("hello there").await;
        assert_eq!(memory.turns()[0].session_id, "unknown");
    }

    #[tokio::test]
    async fn test_oracle_failure_returns_apology_and_stores_nothing() {
        let memory = Arc::new(LocalMemory::default());
        let mut orch = orchestrator(Err("rate limited"), memory.clone(), None);
        let out = orch.process("Calculate 1+1").await;
        assert!(out.starts_with("Sorry, I encountered an error: "));
        assert!(out.contains("rate limited"));
        assert!(memory.is_empty());
        assert_eq!(orch.phase(), TurnPhase::Failed);
    }

    #[tokio::test]
    async fn test_step_limit_fails_turn_without_storing() {
        let call = r#"{"tool": "calculator", "args": {"expression": "1+1"}}"#;
        let llm = Arc::new(ScriptedLlmClient::new([call, call, call]));
        let mut registry = ToolRegistry::new();
        registry.register(CalculatorTool).unwrap();
        let memory = Arc::new(LocalMemory::default());
        let mut orch = TurnOrchestrator::new(
            Box::new(ReactOracle::new(llm, 20, 3)),
            ToolExecutor::new(registry, 5),
            memory.clone(),
            Some(Session::start(Some("s7"))),
        );

        let out = orch.process("Calculate 1+1 forever").await;
        assert_eq!(
            out,
            "Sorry, I encountered an error: Reached max iterations (3) without a final answer"
        );
        assert_eq!(orch.phase(), TurnPhase::Failed);
        assert!(memory.is_empty());
    }

    #[tokio::test]
    async fn test_memory_failure_does_not_change_response() {
        let mut orch = orchestrator(Ok("fine"), Arc::new(BrokenMemory), None);
        let outcome = orch.try_process("how are you").await.unwrap();
        assert_eq!(outcome.response, "fine");
        assert!(!outcome.persisted);
    }

    #[tokio::test]
    async fn test_null_memory_turn_not_persisted() {
        let mut orch = orchestrator(Ok("ok"), Arc::new(NullMemory), None);
        let outcome = orch.try_process("Can you help me?").await.unwrap();
        assert_eq!(outcome.message_type, MessageType::Question);
        assert!(!outcome.persisted);
    }

    #[tokio::test]
    async fn test_reset_twice_keeps_memory() {
        let memory = Arc::new(LocalMemory::default());
        let mut orch = orchestrator(Ok("noted"), memory.clone(), None);
        orch.process("remember my cat is called Tom").await;
        let before = memory.len();

        // 第二次 reset 的错误只记日志
        orch.reset();
        orch.reset();
        assert_eq!(memory.len(), before);
        assert_eq!(orch.phase(), TurnPhase::Idle);
        assert_eq!(orch.process("still there?").await, "noted");
    }
}
