//! 工具注册表
//!
//! 所有工具实现 Tool trait（name / description / invoke），由 ToolRegistry 按注册顺序保存、按名查找，
//! ToolExecutor 在调用时加超时与 panic 隔离。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::AgentError;

/// 工具 trait：名称、描述（供 LLM 理解）、单个文本输入、异步执行
///
/// 工具永不向上抛错：失败以文本形式写进返回值，由推理层当作观察结果处理。
#[async_trait]
pub trait Tool: Send + Sync {
    /// 工具名称（用于 JSON 中的 "tool" 字段），注册表内唯一
    fn name(&self) -> &str;

    /// 工具描述（供 LLM 理解功能）
    fn description(&self) -> &str;

    /// 输入参数名；None 表示无参数
    fn input_name(&self) -> Option<&str> {
        Some("input")
    }

    /// 执行工具
    async fn invoke(&self, input: &str) -> String;
}

/// 有序工具注册表：列举顺序即注册顺序
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册工具；同名工具已存在时返回 DuplicateTool
    pub fn register(&mut self, tool: impl Tool + 'static) -> Result<(), AgentError> {
        self.register_arc(Arc::new(tool))
    }

    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) -> Result<(), AgentError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(AgentError::DuplicateTool(name));
        }
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Tool>, AgentError> {
        self.index
            .get(name)
            .map(|&i| Arc::clone(&self.tools[i]))
            .ok_or_else(|| AgentError::UnknownTool(name.to_string()))
    }

    pub fn list(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{CalculatorTool, WeatherTool};

    #[test]
    fn test_registration_order_is_preserved() {
        let mut reg = ToolRegistry::new();
        reg.register(WeatherTool).unwrap();
        reg.register(CalculatorTool).unwrap();
        assert_eq!(reg.tool_names(), vec!["weather", "calculator"]);
        assert_eq!(reg.list()[0].name(), "weather");
        assert_eq!(reg.get("calculator").unwrap().input_name(), Some("expression"));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut reg = ToolRegistry::new();
        reg.register(CalculatorTool).unwrap();
        let err = reg.register(CalculatorTool).unwrap_err();
        assert!(matches!(err, AgentError::DuplicateTool(ref n) if n == "calculator"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_unknown_tool_lookup() {
        let reg = ToolRegistry::new();
        assert!(matches!(
            reg.get("teleport"),
            Err(AgentError::UnknownTool(ref n)) if n == "teleport"
        ));
    }
}
