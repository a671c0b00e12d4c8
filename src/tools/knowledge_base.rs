//! 知识库问答工具：检索相关块，再交给 LLM 归纳答案
//!
//! LLM 调用失败时退回原文摘录，工具本身不报错。

use std::sync::Arc;

use async_trait::async_trait;

use crate::llm::LlmClient;
use crate::memory::rag::{KnowledgeBase, RetrievalResult};
use crate::memory::Message;
use crate::tools::Tool;

const SYNTHESIS_PROMPT: &str = "Answer the question using only the context excerpts provided. \
If the context does not contain the answer, say so briefly.";

pub struct KnowledgeBaseTool {
    kb: Arc<KnowledgeBase>,
    llm: Arc<dyn LlmClient>,
    top_k: usize,
}

impl KnowledgeBaseTool {
    pub fn new(kb: Arc<KnowledgeBase>, llm: Arc<dyn LlmClient>, top_k: usize) -> Self {
        Self {
            kb,
            llm,
            top_k: top_k.max(1),
        }
    }

    fn context(results: &[RetrievalResult]) -> String {
        results
            .iter()
            .enumerate()
            .map(|(i, r)| format!("[{}] ({})\n{}", i + 1, r.chunk.source_id, r.chunk.text))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[async_trait]
impl Tool for KnowledgeBaseTool {
    fn name(&self) -> &str {
        "knowledge_base"
    }

    fn description(&self) -> &str {
        "Query the knowledge base for information from documents"
    }

    fn input_name(&self) -> Option<&str> {
        Some("query")
    }

    async fn invoke(&self, input: &str) -> String {
        let results = self.kb.search(input, self.top_k);
        if results.is_empty() {
            return format!("No relevant information found in the knowledge base for '{input}'.");
        }
        let context = Self::context(&results);
        let messages = [
            Message::system(SYNTHESIS_PROMPT),
            Message::user(format!("Context:\n{context}\n\nQuestion: {input}")),
        ];
        match self.llm.complete(&messages).await {
            Ok(answer) if !answer.trim().is_empty() => answer.trim().to_string(),
            Ok(_) => format!("Relevant excerpts from the knowledge base:\n{context}"),
            Err(e) => {
                tracing::warn!(error = %e, "knowledge base synthesis failed, returning excerpts");
                format!("Relevant excerpts from the knowledge base:\n{context}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmError, ScriptedLlmClient};
    use crate::memory::rag::Chunker;

    fn kb() -> Arc<KnowledgeBase> {
        let mut kb = KnowledgeBase::new();
        let chunker = Chunker::default();
        kb.index_document(&chunker, "space.md", "Mars has two moons named Phobos and Deimos.");
        kb.index_document(&chunker, "ai.md", "Transformers use attention mechanisms.");
        Arc::new(kb)
    }

    #[tokio::test]
    async fn test_answer_is_synthesised_from_context() {
        let llm = Arc::new(ScriptedLlmClient::new(["Phobos and Deimos."]));
        let tool = KnowledgeBaseTool::new(kb(), llm.clone(), 3);
        assert_eq!(tool.invoke("moons of mars").await, "Phobos and Deimos.");
        let calls = llm.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0][1].content.contains("(space.md)"));
        assert!(!calls[0][1].content.contains("Transformers"));
    }

    #[tokio::test]
    async fn test_llm_failure_falls_back_to_excerpts() {
        let llm = Arc::new(ScriptedLlmClient::new(Vec::<String>::new()));
        llm.push_error(LlmError::Timeout(30));
        let tool = KnowledgeBaseTool::new(kb(), llm, 3);
        let out = tool.invoke("attention").await;
        assert!(out.starts_with("Relevant excerpts from the knowledge base:\n[1] (ai.md)"));
    }

    #[tokio::test]
    async fn test_no_match_skips_llm() {
        let llm = Arc::new(ScriptedLlmClient::new(Vec::<String>::new()));
        let tool = KnowledgeBaseTool::new(kb(), llm.clone(), 3);
        let out = tool.invoke("cooking recipes").await;
        assert!(out.starts_with("No relevant information found"));
        assert!(llm.calls().is_empty());
    }
}
