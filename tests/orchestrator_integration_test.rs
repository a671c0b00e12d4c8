//! 编排器集成测试：脚本化 LLM + 进程内记忆，走完整的 分类 -> 推理 -> 工具 -> 记忆 流程

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use concierge::config::{AppConfig, MemoryBackend};
    use concierge::core::{MessageType, OrchestratorBuilder, TurnOrchestrator, TurnPhase};
    use concierge::llm::{LlmError, ScriptedLlmClient};
    use concierge::memory::LocalMemory;

    fn config() -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.app.session_id = Some("it-session".to_string());
        cfg.memory.backend = MemoryBackend::Null;
        cfg.knowledge.documents_path = None;
        cfg
    }

    async fn orchestrator(
        llm: Arc<ScriptedLlmClient>,
        memory: Arc<LocalMemory>,
        cfg: AppConfig,
    ) -> TurnOrchestrator {
        OrchestratorBuilder::new(cfg)
            .with_llm(llm)
            .with_memory(memory)
            .build()
            .await
            .unwrap()
    }

    /// 最后一次 LLM 调用里的最后一条消息（即上一步的 observation）
    fn last_observation(llm: &ScriptedLlmClient, call: usize) -> String {
        llm.calls()[call].last().unwrap().content.clone()
    }

    #[tokio::test]
    async fn test_calculation_turn_end_to_end() {
        let llm = Arc::new(ScriptedLlmClient::new([
            r#"{"tool": "calculator", "args": {"expression": "25 * 4 + 10"}}"#,
            "25 * 4 + 10 equals 110.",
        ]));
        let memory = Arc::new(LocalMemory::default());
        let mut orch = orchestrator(llm.clone(), memory.clone(), config()).await;

        let outcome = orch.try_process("Calculate 25 * 4 + 10").await.unwrap();
        assert_eq!(outcome.response, "25 * 4 + 10 equals 110.");
        assert_eq!(outcome.message_type, MessageType::Calculation);
        assert!(outcome.persisted);
        assert_eq!(
            last_observation(&llm, 1),
            "Observation from calculator: Result: 110"
        );

        let turns = memory.turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].content, "Calculate 25 * 4 + 10");
        assert!(turns.iter().all(|t| t.message_type == MessageType::Calculation));
        assert!(turns.iter().all(|t| t.session_id == "it-session"));
    }

    #[tokio::test]
    async fn test_oracle_failure_is_reported_and_not_persisted() {
        let llm = Arc::new(ScriptedLlmClient::new(Vec::<String>::new()));
        llm.push_error(LlmError::Timeout(60));
        llm.push_output("Hello again!");
        let memory = Arc::new(LocalMemory::default());
        let mut orch = orchestrator(llm, memory.clone(), config()).await;

        let out = orch.process("Hi there").await;
        assert!(out.starts_with("Sorry, I encountered an error: "));
        assert_eq!(orch.phase(), TurnPhase::Failed);
        assert!(memory.turns().is_empty());

        // 失败后仍可继续对话
        assert_eq!(orch.process("Hi there").await, "Hello again!");
        assert_eq!(memory.turns().len(), 2);
    }

    #[tokio::test]
    async fn test_memory_search_finds_previous_turn() {
        let llm = Arc::new(ScriptedLlmClient::new([
            r#"{"tool": "movie_info", "args": {"movie_title": "the matrix"}}"#,
            "The Matrix is a 1999 sci-fi film.",
            r#"{"tool": "memory_search", "args": {"query": "matrix"}}"#,
            "Earlier we talked about The Matrix.",
        ]));
        let memory = Arc::new(LocalMemory::default());
        let mut orch = orchestrator(llm.clone(), memory, config()).await;

        orch.process("Tell me about the movie The Matrix").await;
        let first_observation = last_observation(&llm, 1);
        assert!(first_observation.contains("**The Matrix** (1999)"));

        let out = orch.process("What did we discuss earlier?").await;
        assert_eq!(out, "Earlier we talked about The Matrix.");
        let observation = last_observation(&llm, 3);
        assert!(observation.starts_with("Observation from memory_search: 🧠 **Memory Search Results:**"));
        assert!(observation.contains("Tell me about the movie The Matrix"));
    }

    #[tokio::test]
    async fn test_knowledge_base_tool_answers_from_documents() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("space.md"),
            "Jupiter is the largest planet in the solar system.",
        )
        .unwrap();
        let mut cfg = config();
        cfg.knowledge.documents_path = Some(dir.path().to_path_buf());

        let llm = Arc::new(ScriptedLlmClient::new([
            r#"{"tool": "knowledge_base", "args": {"query": "largest planet"}}"#,
            "Jupiter.",
            "The largest planet is Jupiter.",
        ]));
        let mut orch = orchestrator(llm.clone(), Arc::new(LocalMemory::default()), cfg).await;

        let out = orch.process("Which is the largest planet?").await;
        assert_eq!(out, "The largest planet is Jupiter.");
        // 第 2 次调用来自知识库工具的归纳
        assert!(llm.calls()[1][1].content.contains("(space.md)"));
        assert_eq!(
            last_observation(&llm, 2),
            "Observation from knowledge_base: Jupiter."
        );
    }

    #[tokio::test]
    async fn test_unknown_tool_becomes_observation() {
        let llm = Arc::new(ScriptedLlmClient::new([
            r#"{"tool": "teleport", "args": {"input": "mars"}}"#,
            "I can't do that.",
        ]));
        let mut orch = orchestrator(llm.clone(), Arc::new(LocalMemory::default()), config()).await;

        assert_eq!(orch.process("Teleport me to Mars").await, "I can't do that.");
        assert!(last_observation(&llm, 1)
            .starts_with("Observation from teleport: Error: Unknown tool: teleport"));
    }

    #[tokio::test]
    async fn test_reset_twice_keeps_memory() {
        let llm = Arc::new(ScriptedLlmClient::new(["Nice to meet you.", "Welcome back."]));
        let memory = Arc::new(LocalMemory::default());
        let mut orch = orchestrator(llm.clone(), memory.clone(), config()).await;

        orch.process("My name is Sam").await;
        let stored = memory.len();
        orch.reset();
        orch.reset();
        assert_eq!(memory.len(), stored);

        orch.process("Hello").await;
        // reset 后历史为空：system + 当前 user
        assert_eq!(llm.calls()[1].len(), 2);
    }
}
