//! 推理层：ReasoningOracle trait 与基于 ReAct 的实现
//!
//! Plan -> Act (Tool) -> Observe -> 下一轮 Plan，直到 LLM 给出纯文本回复；达到最大步数视为本轮失败。
//! JSON 格式错误由 RecoveryEngine 给出重试提示；LLM 调用失败直接向上返回，由编排层转为用户可读的错误。
//! 对话上下文（最近 N 轮）只保存在 oracle 内部，reset 只清这一部分。

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::{AgentError, RecoveryAction, RecoveryEngine};
use crate::llm::LlmClient;
use crate::memory::{ConversationMemory, MemoryStore, Message, MAX_SEARCH_RESULTS};
use crate::react::{parse_llm_output, Planner, PlannerOutput};
use crate::tools::{tool_call_schema_json, ToolExecutor};

const BASE_SYSTEM_PROMPT: &str = "You are a helpful AI assistant that can use tools to answer questions \
about movies, calculations, weather, documents in the knowledge base, and past conversations.";

/// 推理 oracle：决定是否调用工具并给出最终回复
#[async_trait]
pub trait ReasoningOracle: Send {
    /// 处理一条用户输入；工具调用经由 tools 执行，memory 仅用于检索上下文
    async fn reason(
        &mut self,
        utterance: &str,
        tools: &ToolExecutor,
        memory: &dyn MemoryStore,
    ) -> Result<String, AgentError>;

    /// 清空对话上下文
    fn reset(&mut self) -> Result<(), AgentError>;
}

/// ReAct oracle：Planner + RecoveryEngine + 有界对话历史
pub struct ReactOracle {
    planner: Planner,
    recovery: RecoveryEngine,
    conversation: ConversationMemory,
    max_steps: usize,
}

impl ReactOracle {
    pub fn new(llm: Arc<dyn LlmClient>, max_context_turns: usize, max_steps: usize) -> Self {
        Self {
            planner: Planner::new(llm, BASE_SYSTEM_PROMPT),
            recovery: RecoveryEngine::new(),
            conversation: ConversationMemory::new(max_context_turns),
            max_steps: max_steps.max(1),
        }
    }

    /// 已提交的对话历史（不含工具中间步骤）
    pub fn history(&self) -> &[Message] {
        self.conversation.messages()
    }

    /// system = 基础 prompt + 按注册顺序的工具列表 + tool call schema + 相关记忆
    async fn system_prompt(
        &self,
        utterance: &str,
        tools: &ToolExecutor,
        memory: &dyn MemoryStore,
    ) -> String {
        let tool_lines: Vec<String> = tools
            .registry()
            .list()
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let input = t
                    .input_name()
                    .map(|n| format!("args: {{\"{n}\": \"...\"}}"))
                    .unwrap_or_else(|| "args: {}".to_string());
                format!("{}. {}: {} ({})", i + 1, t.name(), t.description(), input)
            })
            .collect();

        let mut system = format!(
            "{}\n\nAvailable tools:\n{}\n\n\
             To use a tool, reply with ONLY a JSON object of the form \
             {{\"tool\": \"<name>\", \"args\": {{...}}}}. Tool call schema:\n{}\n\n\
             After each tool call you will receive an observation. \
             When you can answer the user, reply in plain text without any JSON.",
            self.planner.base_system_prompt(),
            tool_lines.join("\n"),
            tool_call_schema_json()
        );

        let memories = relevant_memories(utterance, memory).await;
        if !memories.is_empty() {
            system.push_str("\n\nRelevant memories from previous conversations:\n");
            system.push_str(&memories.join("\n"));
        }
        system
    }
}

/// 检索与本轮输入相关的历史记忆；失败只记日志
async fn relevant_memories(utterance: &str, memory: &dyn MemoryStore) -> Vec<String> {
    if !memory.is_durable() {
        return Vec::new();
    }
    match memory.search(utterance).await {
        Ok(hits) => hits
            .into_iter()
            .take(MAX_SEARCH_RESULTS)
            .map(|h| format!("- {}", h.content))
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, backend = memory.backend_name(), "memory recall failed");
            Vec::new()
        }
    }
}

#[async_trait]
impl ReasoningOracle for ReactOracle {
    async fn reason(
        &mut self,
        utterance: &str,
        tools: &ToolExecutor,
        memory: &dyn MemoryStore,
    ) -> Result<String, AgentError> {
        let system = self.system_prompt(utterance, tools, memory).await;
        // 本轮草稿：历史 + 用户输入 + 工具往返；成功后只把 (user, assistant) 提交进历史
        let mut scratch = self.conversation.messages().to_vec();
        scratch.push(Message::user(utterance));

        for step in 0..self.max_steps {
            let output = self.planner.plan_with_system(&scratch, &system).await?;

            match parse_llm_output(&output) {
                Ok(PlannerOutput::Response(resp)) => {
                    self.conversation.push(Message::user(utterance));
                    self.conversation.push(Message::assistant(resp.clone()));
                    return Ok(resp);
                }
                Ok(PlannerOutput::ToolCall(tc)) => {
                    tracing::debug!(step, tool = %tc.tool, "tool call");
                    let observation = tools.invoke(&tc.tool, &tc.args).await;
                    scratch.push(Message::assistant(output));
                    scratch.push(Message::user(format!(
                        "Observation from {}: {}",
                        tc.tool, observation
                    )));
                }
                Err(e) => match self.recovery.handle(&e) {
                    RecoveryAction::RetryWithPrompt(prompt) => {
                        tracing::warn!(step, error = %e, "malformed tool call, retrying");
                        scratch.push(Message::assistant(output));
                        scratch.push(Message::user(prompt));
                    }
                    RecoveryAction::Abort => return Err(e),
                },
            }
        }

        tracing::warn!(max_steps = self.max_steps, "step limit reached");
        Err(AgentError::StepLimit(self.max_steps))
    }

    fn reset(&mut self) -> Result<(), AgentError> {
        self.conversation.clear();
        Ok(())
    }
}
