//! 编排层错误类型与恢复动作
//!
//! 与 RecoveryEngine 配合：根据 AgentError 决定 RetryWithPrompt / Abort。
//! 工具自身的输入错误不在这里：工具总是返回文本结果，永不向上抛错。

use thiserror::Error;

use crate::llm::LlmError;

/// 编排过程中可能出现的错误（注册表误用、推理失败、输出解析等）
#[derive(Error, Debug)]
pub enum AgentError {
    /// 重复注册同名工具（启动期的编程错误）
    #[error("Duplicate tool: {0}")]
    DuplicateTool(String),

    /// 查找不存在的工具
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    /// 推理（LLM）调用本身失败，当前轮次中止
    #[error("LLM error: {0}")]
    LlmError(#[from] LlmError),

    #[error("Config error: {0}")]
    ConfigError(String),

    /// 达到最大推理步数仍未得到最终回复
    #[error("Reached max iterations ({0}) without a final answer")]
    StepLimit(usize),
}

/// 恢复引擎根据错误类型给出的建议动作
#[derive(Debug, Clone)]
pub enum RecoveryAction {
    /// 将提示注入下一轮，让 LLM 重试（如 JSON 格式错误）
    RetryWithPrompt(String),
    /// 终止当前轮次
    Abort,
}
