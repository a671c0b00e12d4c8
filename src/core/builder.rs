//! 编排器构建：按配置组装 LLM、记忆后端、知识库、工具注册表与推理 oracle
//!
//! CLI 与集成测试共用同一套组装逻辑；测试可通过 with_llm / with_memory 注入替身。

use std::path::Path;
use std::sync::Arc;

use crate::config::{AppConfig, KnowledgeSection, MemoryBackend};
use crate::core::{AgentError, Session, TurnOrchestrator};
use crate::llm::{create_groq_client, LlmClient, MockLlmClient, OpenAiClient};
use crate::memory::{
    ChunkingConfig, HostedMemory, HostedMemoryConfig, KnowledgeBase, LocalMemory, MemoryStore,
    Message, NullMemory,
};
use crate::react::ReactOracle;
use crate::tools::{
    CalculatorTool, KnowledgeBaseTool, MemorySearchTool, MemorySummaryTool, MovieInfoTool,
    ToolExecutor, ToolRegistry, WeatherTool,
};

/// 会话起始记录中列出的能力
const CAPABILITIES: &[&str] = &[
    "movie information",
    "calculations",
    "weather",
    "knowledge base queries",
];

/// 根据配置选择 LLM 后端（Groq / OpenAI 兼容 / Mock）
pub fn create_llm_from_config(cfg: &AppConfig) -> Arc<dyn LlmClient> {
    let provider = cfg.llm.provider.to_lowercase();
    let Some(api_key) = cfg.llm.usable_api_key() else {
        tracing::warn!("No LLM API key set, using Mock LLM");
        return Arc::new(MockLlmClient);
    };

    match provider.as_str() {
        "groq" => {
            tracing::info!(model = %cfg.llm.model, "Using Groq LLM");
            Arc::new(
                create_groq_client(
                    api_key,
                    &cfg.llm.model,
                    cfg.llm.base_url.as_deref(),
                    cfg.llm.temperature,
                )
                .with_request_timeout(cfg.llm.request_timeout_secs),
            )
        }
        "openai" => {
            tracing::info!(model = %cfg.llm.model, "Using OpenAI-compatible LLM");
            Arc::new(
                OpenAiClient::new(cfg.llm.base_url.as_deref(), &cfg.llm.model, api_key)
                    .with_temperature(cfg.llm.temperature)
                    .with_request_timeout(cfg.llm.request_timeout_secs),
            )
        }
        "mock" => Arc::new(MockLlmClient),
        other => {
            tracing::warn!(provider = other, "Unknown LLM provider, using Mock LLM");
            Arc::new(MockLlmClient)
        }
    }
}

/// 根据配置创建会话记忆；持久化后端不可用时降级为 NullMemory（此时没有会话）
pub async fn create_memory_from_config(
    cfg: &AppConfig,
) -> (Arc<dyn MemoryStore>, Option<Session>) {
    match cfg.memory.backend {
        MemoryBackend::Null => (Arc::new(NullMemory), None),
        MemoryBackend::Local => {
            let memory: Arc<dyn MemoryStore> = Arc::new(LocalMemory::default());
            let session = start_session(cfg, memory.as_ref()).await;
            (memory, Some(session))
        }
        MemoryBackend::Hosted => {
            let Some(api_key) = cfg.memory.usable_api_key() else {
                tracing::info!("No memory API key configured, continuing without persistent memory");
                return (Arc::new(NullMemory), None);
            };
            let session = Session::start(cfg.app.session_id.as_deref());
            let hosted = HostedMemory::connect(HostedMemoryConfig {
                api_key: api_key.to_string(),
                base_url: cfg.memory.base_url.clone(),
                user_id: session.user_id(),
                app_id: cfg.memory.app_id.clone(),
                timeout_secs: cfg.memory.timeout_secs,
                search_limit: cfg.memory.search_limit,
            });
            match hosted {
                Ok(memory) => {
                    let memory: Arc<dyn MemoryStore> = Arc::new(memory);
                    record_session_start(memory.as_ref(), &session).await;
                    (memory, Some(session))
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to initialize hosted memory");
                    tracing::info!("Continuing without persistent memory");
                    (Arc::new(NullMemory), None)
                }
            }
        }
    }
}

async fn start_session(cfg: &AppConfig, memory: &dyn MemoryStore) -> Session {
    let session = Session::start(cfg.app.session_id.as_deref());
    record_session_start(memory, &session).await;
    session
}

/// 写入一条会话起始的 system 记录；失败不影响启动
async fn record_session_start(memory: &dyn MemoryStore, session: &Session) {
    let capabilities: Vec<String> = CAPABILITIES.iter().map(|c| c.to_string()).collect();
    let notice = Message::system(session.start_notice(&capabilities));
    match memory.add(&[notice], None).await {
        Ok(()) => tracing::info!(
            session_id = %session.id(),
            backend = memory.backend_name(),
            "memory session started"
        ),
        Err(e) => tracing::warn!(error = %e, "Could not add session context to memory"),
    }
}

/// 从文档目录构建知识库；目录不存在、读取失败或没有内容时返回 None
pub fn load_knowledge_base(cfg: &KnowledgeSection) -> Option<Arc<KnowledgeBase>> {
    let path = cfg.documents_path.as_deref()?;
    if !path.exists() {
        tracing::info!(path = %path.display(), "Documents path not found, knowledge base disabled");
        return None;
    }
    let chunking = ChunkingConfig::new(cfg.chunk_size, cfg.chunk_overlap);
    match KnowledgeBase::load_dir(path, chunking) {
        Ok(kb) if kb.is_empty() => {
            tracing::info!(path = %path.display(), "No documents found, knowledge base disabled");
            None
        }
        Ok(kb) => Some(Arc::new(kb)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to create knowledge base");
            None
        }
    }
}

/// 按固定顺序注册工具：calculator、weather、movie_info、knowledge_base（可选）、memory_search、memory_summary
pub fn build_tool_registry(
    llm: Arc<dyn LlmClient>,
    memory: Arc<dyn MemoryStore>,
    knowledge: Option<Arc<KnowledgeBase>>,
    top_k: usize,
) -> Result<ToolRegistry, AgentError> {
    let mut tools = ToolRegistry::new();
    tools.register(CalculatorTool)?;
    tools.register(WeatherTool)?;
    tools.register(MovieInfoTool)?;
    if let Some(kb) = knowledge {
        tools.register(KnowledgeBaseTool::new(kb, llm, top_k))?;
    }
    tools.register(MemorySearchTool::new(memory.clone()))?;
    tools.register(MemorySummaryTool::new(memory))?;
    Ok(tools)
}

/// 编排器构建器
pub struct OrchestratorBuilder {
    config: AppConfig,
    llm: Option<Arc<dyn LlmClient>>,
    memory: Option<Arc<dyn MemoryStore>>,
}

impl OrchestratorBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            llm: None,
            memory: None,
        }
    }

    /// 使用指定 LLM（忽略 [llm] 配置）
    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// 使用指定记忆后端（忽略 [memory] 配置）；持久化后端会开启会话
    pub fn with_memory(mut self, memory: Arc<dyn MemoryStore>) -> Self {
        self.memory = Some(memory);
        self
    }

    /// 覆盖文档目录（CLI --documents）
    pub fn with_documents_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config.knowledge.documents_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub async fn build(self) -> Result<TurnOrchestrator, AgentError> {
        let cfg = self.config;
        let llm = self.llm.unwrap_or_else(|| create_llm_from_config(&cfg));
        let (memory, session) = match self.memory {
            Some(memory) if memory.is_durable() => {
                let session = start_session(&cfg, memory.as_ref()).await;
                (memory, Some(session))
            }
            Some(memory) => (memory, None),
            None => create_memory_from_config(&cfg).await,
        };

        let knowledge = load_knowledge_base(&cfg.knowledge);
        let registry = build_tool_registry(
            llm.clone(),
            memory.clone(),
            knowledge,
            cfg.knowledge.top_k,
        )?;
        tracing::info!(tools = ?registry.tool_names(), "tools registered");

        let executor = ToolExecutor::new(registry, cfg.tools.tool_timeout_secs);
        let oracle = ReactOracle::new(llm, cfg.app.max_context_turns, cfg.app.max_steps);
        Ok(TurnOrchestrator::new(Box::new(oracle), executor, memory, session))
    }
}
