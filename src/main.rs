//! Concierge - 命令行智能助手
//!
//! 入口：加载 .env 与配置、初始化日志、组装编排器，然后运行交互式对话循环。

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use concierge::cli::{banner, parse_command, HELP_TEXT};
use concierge::config::load_config;
use concierge::core::{Command, OrchestratorBuilder};

#[derive(Parser, Debug)]
#[command(name = "concierge", version, about = "Tool-routing conversational assistant")]
struct Args {
    /// 额外的 TOML 配置文件（覆盖 config/default.toml）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 知识库文档目录（覆盖 DOCUMENTS_PATH）
    #[arg(long)]
    documents: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 可选
    let _ = dotenvy::dotenv();
    concierge::observability::init();

    let args = Args::parse();
    let cfg = load_config(args.config).context("Failed to load configuration")?;
    if cfg.llm.usable_api_key().is_none() {
        tracing::warn!("GROQ_API_KEY is not set; get a key at https://console.groq.com/keys");
    }

    let mut builder = OrchestratorBuilder::new(cfg);
    if let Some(path) = args.documents {
        builder = builder.with_documents_path(path);
    }
    let mut orchestrator = builder
        .build()
        .await
        .context("Failed to initialize AI agent")?;

    println!("{}", banner(&orchestrator));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\nYou: ");
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        match parse_command(&line) {
            Command::Quit => break,
            Command::Empty => continue,
            Command::Reset => {
                orchestrator.reset();
                println!("🔄 Conversation reset!");
            }
            Command::Help => println!("\n{HELP_TEXT}"),
            Command::Submit(text) => {
                let response = orchestrator.process(&text).await;
                println!("\n🤖 Agent: {response}");
            }
        }
    }

    println!("Goodbye! 👋");
    Ok(())
}
