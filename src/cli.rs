//! 交互式命令行：命令解析、启动横幅与帮助文本

use crate::core::{Command, TurnOrchestrator};

const SEPARATOR_WIDTH: usize = 70;

pub const HELP_TEXT: &str = "\
📋 Feature Examples:
  🎬 Movies: 'Tell me about The Matrix' or 'What's Inception about?'
  🧮 Math: 'Calculate 15 * 24 + 10' or 'What's 25% of 80?'
  🌤️  Weather: 'What's the weather in London?'
  🤖 AI: 'What is machine learning?' or 'Explain neural networks'
  💻 Programming: 'Tell me about Python' or 'What is JavaScript used for?'
  🔬 Science: 'What are the latest space missions?' or 'Explain quantum physics'
  🧠 Memory: 'What did we discuss earlier?' or 'Search memory for movies'
  📊 Summary: Use the memory_summary tool to see recent conversations";

/// 解析一行输入；命令大小写不敏感
pub fn parse_command(line: &str) -> Command {
    let input = line.trim();
    match input.to_lowercase().as_str() {
        "" => Command::Empty,
        "quit" | "exit" => Command::Quit,
        "reset" => Command::Reset,
        "help" => Command::Help,
        _ => Command::Submit(input.to_string()),
    }
}

/// 启动横幅：功能列表、记忆状态与命令说明
pub fn banner(orchestrator: &TurnOrchestrator) -> String {
    let mut lines = vec![
        "🤖 AI Agent initialized successfully!".to_string(),
        String::new(),
        "📋 Available Features:".to_string(),
        "  • 🎬 Enhanced Movie Database: 15+ classic and modern films".to_string(),
        "  • 🧮 Mathematical Calculator: Perform calculations".to_string(),
        "  • 🌤️  Weather Information: Get weather data (mock)".to_string(),
    ];
    if orchestrator.tools().get_tool("knowledge_base").is_some() {
        lines.push("  • 📚 Knowledge Base: answers from your documents".to_string());
    }
    lines.push("  • 🧠 Persistent Memory: session memory across conversations".to_string());
    lines.push("  • 🔍 Memory Search: Search past conversations and topics".to_string());

    match orchestrator.session() {
        Some(session) if orchestrator.memory().is_durable() => lines.push(format!(
            "  • ✅ Memory: Active ({} backend, Session: {})",
            orchestrator.memory().backend_name(),
            session.id()
        )),
        _ => lines.push(
            "  • ⚠️  Memory: Not configured (add MEM0_API_KEY for persistence)".to_string(),
        ),
    }

    lines.extend([
        String::new(),
        "💬 Commands:".to_string(),
        "  • Type 'quit' or 'exit' to end the conversation".to_string(),
        "  • Type 'reset' to reset the conversation history".to_string(),
        "  • Type 'help' for feature examples".to_string(),
        "  • Ask about movies, calculations, AI, programming, science, or anything!".to_string(),
        "-".repeat(SEPARATOR_WIDTH),
    ]);
    lines.join("\n")
}
