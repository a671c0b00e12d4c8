//! 工具执行器
//!
//! 持有 ToolRegistry 与全局超时，invoke(tool_name, args) 从 JSON 参数中取出工具的文本输入，
//! 在超时内调用并捕获 panic；任何失败都转成 "Error: ..." 文本交还推理层。
//! 每次调用输出结构化审计日志（JSON）。

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use serde_json::Value;
use tokio::time::timeout;

use crate::tools::{Tool, ToolRegistry};

/// 工具执行器：对每次调用施加超时与 panic 隔离
pub struct ToolExecutor {
    registry: ToolRegistry,
    timeout: Duration,
}

impl ToolExecutor {
    pub fn new(registry: ToolRegistry, timeout_secs: u64) -> Self {
        Self {
            registry,
            timeout: Duration::from_secs(timeout_secs.max(1)),
        }
    }

    /// 执行指定工具；未知工具、超时、panic 均以文本返回，并输出 JSON 审计日志
    pub async fn invoke(&self, tool_name: &str, args: &Value) -> String {
        let start = Instant::now();
        let tool = match self.registry.get(tool_name) {
            Ok(tool) => tool,
            Err(e) => {
                audit(tool_name, false, "unknown", start, args);
                return format!(
                    "Error: {e}. Available tools: {}",
                    self.registry.tool_names().join(", ")
                );
            }
        };

        let input = extract_input(tool.as_ref(), args);
        let result = timeout(
            self.timeout,
            AssertUnwindSafe(tool.invoke(&input)).catch_unwind(),
        )
        .await;

        match result {
            Ok(Ok(output)) => {
                audit(tool_name, true, "ok", start, args);
                output
            }
            Ok(Err(_)) => {
                audit(tool_name, false, "panic", start, args);
                tracing::error!(tool = tool_name, "tool panicked");
                format!("Error: Tool '{tool_name}' failed unexpectedly")
            }
            Err(_) => {
                audit(tool_name, false, "timeout", start, args);
                format!(
                    "Error: Tool '{tool_name}' timed out after {}s",
                    self.timeout.as_secs()
                )
            }
        }
    }

    pub fn get_tool(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.registry.get(name).ok()
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.registry.tool_names()
    }
}

/// 从 LLM 给出的参数中取出文本输入：
/// 字符串直接使用；对象优先取 input_name 字段，其次取唯一字段；数字转字符串
fn extract_input(tool: &dyn Tool, args: &Value) -> String {
    match args {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Object(map) => {
            let named = tool.input_name().and_then(|name| map.get(name));
            let value = match named {
                Some(v) => Some(v),
                None if map.len() == 1 => map.values().next(),
                None => map.get("input"),
            };
            match value {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => String::new(),
            }
        }
        _ => String::new(),
    }
}

fn audit(tool_name: &str, ok: bool, outcome: &str, start: Instant, args: &Value) {
    let audit = serde_json::json!({
        "event": "tool_audit",
        "tool": tool_name,
        "ok": ok,
        "outcome": outcome,
        "duration_ms": start.elapsed().as_millis() as u64,
        "args_preview": args_preview(args),
    });
    tracing::info!(audit = %audit.to_string(), "tool");
}

fn args_preview(args: &Value) -> String {
    let s = args.to_string();
    if s.chars().count() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}
