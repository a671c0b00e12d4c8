//! 推理层：Planner（LLM 调用与 Tool Call 解析）与 ReAct oracle

pub mod oracle;
pub mod planner;

pub use oracle::{ReactOracle, ReasoningOracle};
pub use planner::{parse_llm_output, Planner, PlannerOutput, ToolCall};
