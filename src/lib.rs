//! Concierge - 工具路由的命令行对话助手
//!
//! 模块划分：
//! - **cli**: 交互式命令解析、启动横幅与帮助
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 消息分类、会话、错误与恢复、轮次编排与组装
//! - **llm**: LLM 客户端抽象与实现（Groq / OpenAI 兼容 / Mock）
//! - **memory**: 推理上下文、会话记忆库（Null / Local / Hosted）、文档知识库
//! - **observability**: tracing 日志初始化
//! - **react**: Planner 与 ReAct 推理 oracle
//! - **tools**: 工具注册表、执行器与内置工具

pub mod cli;
pub mod config;
pub mod core;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod react;
pub mod tools;
