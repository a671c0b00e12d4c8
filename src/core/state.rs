//! 单轮处理的阶段
//!
//! Received -> Dispatched -> Completed | Failed；Idle 表示尚未处理任何输入。

use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    #[default]
    Idle,
    /// 已收到用户输入
    Received,
    /// 已交给推理 oracle
    Dispatched,
    /// 得到回复并尝试写入记忆
    Completed,
    /// 推理失败，本轮不写记忆
    Failed,
}
