//! 应用配置：从 config/default.toml、可选配置文件与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `CONCIERGE__*` 覆盖（双下划线表示嵌套，如 `CONCIERGE__LLM__PROVIDER=mock`），
//! 最后用约定俗成的环境变量（GROQ_API_KEY、MEM0_API_KEY、DOCUMENTS_PATH、USER_SESSION_ID）补齐未设置的项。

use std::path::PathBuf;

use serde::Deserialize;

/// 托管记忆 Key 的占位值（视为未配置）
pub const MEM0_KEY_PLACEHOLDER: &str = "your_mem0_api_key_here";

const DEFAULT_DOCUMENTS_PATH: &str = "./documents";

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub memory: MemorySection,
    pub knowledge: KnowledgeSection,
    pub tools: ToolsSection,
}

/// [app] 段：应用名、会话 ID、对话轮数与推理步数上限
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: Option<String>,
    /// 固定会话 ID；未设置时启动时随机生成
    pub session_id: Option<String>,
    /// 推理上下文保留的对话轮数
    pub max_context_turns: usize,
    /// 单轮内最多的 Plan/Act 步数
    pub max_steps: usize,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: None,
            session_id: None,
            max_context_turns: 20,
            max_steps: 10,
        }
    }
}

/// [llm] 段：后端选择、模型与超时
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// 后端：groq / openai / mock；没有 API Key 时一律退回 mock
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    pub temperature: f32,
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "groq".to_string(),
            model: crate::llm::GROQ_LLAMA3_70B.to_string(),
            base_url: None,
            temperature: 0.1,
            api_key: None,
            request_timeout_secs: 60,
        }
    }
}

impl LlmSection {
    pub fn usable_api_key(&self) -> Option<&str> {
        non_empty(self.api_key.as_deref())
    }
}

/// 会话记忆后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemoryBackend {
    /// 托管记忆服务（需 API Key，否则降级为 null）
    #[default]
    Hosted,
    /// 进程内关键词检索
    Local,
    /// 不保存
    Null,
}

/// [memory] 段：托管记忆服务
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MemorySection {
    pub backend: MemoryBackend,
    pub api_key: Option<String>,
    pub base_url: String,
    pub app_id: String,
    pub timeout_secs: u64,
    pub search_limit: usize,
}

impl Default for MemorySection {
    fn default() -> Self {
        Self {
            backend: MemoryBackend::Hosted,
            api_key: None,
            base_url: "https://api.mem0.ai".to_string(),
            app_id: "ai_agent_app".to_string(),
            timeout_secs: 15,
            search_limit: crate::memory::MAX_SEARCH_RESULTS,
        }
    }
}

impl MemorySection {
    /// 可用的 API Key：空串与占位值都视为未配置
    pub fn usable_api_key(&self) -> Option<&str> {
        non_empty(self.api_key.as_deref()).filter(|k| *k != MEM0_KEY_PLACEHOLDER)
    }
}

/// [knowledge] 段：文档目录与分块参数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KnowledgeSection {
    pub documents_path: Option<PathBuf>,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
}

impl Default for KnowledgeSection {
    fn default() -> Self {
        Self {
            documents_path: None,
            chunk_size: 1024,
            chunk_overlap: 200,
            top_k: 3,
        }
    }
}

/// [tools] 段：工具超时
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    /// 单次工具调用超时（秒）
    pub tool_timeout_secs: u64,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            tool_timeout_secs: 30,
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// 从 config 目录加载配置，环境变量 CONCIERGE__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 叠加环境变量 CONCIERGE__*（双下划线表示嵌套键）
/// 4. 用约定环境变量补齐未设置的凭据与路径
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    for name in ["config/default", "default"] {
        if std::path::Path::new(&format!("{}.toml", name)).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        } else {
            tracing::warn!(path = %path.display(), "config file not found, ignoring");
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("CONCIERGE")
            .separator("__")
            .try_parsing(true),
    );

    let mut cfg: AppConfig = builder.build()?.try_deserialize()?;
    apply_env_fallbacks(&mut cfg, |key| std::env::var(key).ok());
    Ok(cfg)
}

/// 未设置的项用约定环境变量补齐；lookup 便于测试注入
pub fn apply_env_fallbacks<F>(cfg: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if cfg.llm.usable_api_key().is_none() {
        cfg.llm.api_key = lookup("GROQ_API_KEY").or_else(|| lookup("OPENAI_API_KEY"));
    }
    if non_empty(cfg.memory.api_key.as_deref()).is_none() {
        cfg.memory.api_key = lookup("MEM0_API_KEY");
    }
    if cfg.knowledge.documents_path.is_none() {
        cfg.knowledge.documents_path = Some(PathBuf::from(
            lookup("DOCUMENTS_PATH").unwrap_or_else(|| DEFAULT_DOCUMENTS_PATH.to_string()),
        ));
    }
    if non_empty(cfg.app.session_id.as_deref()).is_none() {
        cfg.app.session_id = lookup("USER_SESSION_ID");
    }
}
