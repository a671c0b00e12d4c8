//! 文档知识库：加载、分块、检索
//!
//! 启动时从 documents 目录读入文本文件，按字符数切成带重叠的块，
//! 检索按查询与块的分词重叠打分（不依赖向量模型）。

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::memory::tokenizer;

/// 可读入的文本文件扩展名
const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "markdown", "rst", "csv", "json", "html"];

#[derive(Error, Debug)]
pub enum KnowledgeError {
    #[error("documents path not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to walk documents: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// 文档块
#[derive(Debug, Clone)]
pub struct Chunk {
    /// 块 ID：{source}_{序号}
    pub id: String,
    pub text: String,
    /// 来源文档（相对 documents 目录的路径）
    pub source_id: String,
    /// 在原文档中的位置（字节偏移）
    pub offset: usize,
}

impl Chunk {
    pub fn new(id: impl Into<String>, text: impl Into<String>, source_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            source_id: source_id.into(),
            offset: 0,
        }
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

/// 分块策略
#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// 目标块大小（字符数）
    pub chunk_size: usize,
    /// 相邻块之间的重叠（字符数）
    pub chunk_overlap: usize,
    /// 断点分隔符，按优先级从高到低
    pub separators: Vec<String>,
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
            ..Default::default()
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1024,
            chunk_overlap: 200,
            separators: ["\n\n", "\n", ". ", "! ", "? ", "; ", " "]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// 文档分块器（UTF-8 安全：按 char 计数）
#[derive(Default)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    pub fn chunk(&self, doc_id: &str, text: &str) -> Vec<Chunk> {
        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < total {
            let end = self.break_point(&chars, start);
            let piece: String = chars[start..end].iter().collect();
            let trimmed = piece.trim();
            if !trimmed.is_empty() {
                let offset: usize = chars[..start].iter().map(|c| c.len_utf8()).sum();
                chunks.push(
                    Chunk::new(format!("{}_{}", doc_id, chunks.len()), trimmed, doc_id)
                        .with_offset(offset),
                );
            }
            if end >= total {
                break;
            }
            let overlap = self.config.chunk_overlap.min(end - start);
            let next = end.saturating_sub(overlap);
            start = if next > start { next } else { end };
        }

        chunks
    }

    /// 在 [start, start+chunk_size) 内找最靠后的分隔符断开；找不到则硬切
    fn break_point(&self, chars: &[char], start: usize) -> usize {
        let target = (start + self.config.chunk_size).min(chars.len());
        if target == chars.len() {
            return target;
        }
        let window: String = chars[start..target].iter().collect();
        for sep in &self.config.separators {
            if let Some(pos) = window.rfind(sep.as_str()) {
                let len = window[..pos].chars().count() + sep.chars().count();
                // 断点太靠前会产生大量碎块
                if len > self.config.chunk_overlap {
                    return start + len;
                }
            }
        }
        target
    }
}

/// 检索结果
#[derive(Debug, Clone)]
pub struct RetrievalResult {
    pub chunk: Chunk,
    /// 重叠词数 / 查询词数
    pub score: f64,
}

struct IndexedChunk {
    chunk: Chunk,
    tokens: HashSet<String>,
}

/// 内存知识库：块 + 预分词集合
#[derive(Default)]
pub struct KnowledgeBase {
    entries: Vec<IndexedChunk>,
    documents: usize,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// 递归读取目录下的文本文件；无法按 UTF-8 解码的文件跳过并记日志
    pub fn load_dir(path: &Path, config: ChunkingConfig) -> Result<Self, KnowledgeError> {
        if !path.exists() {
            return Err(KnowledgeError::NotFound(path.to_path_buf()));
        }
        let chunker = Chunker::new(config);
        let mut kb = Self::new();

        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() || !is_text_file(entry.path()) {
                continue;
            }
            let bytes = std::fs::read(entry.path())?;
            let text = match String::from_utf8(bytes) {
                Ok(t) => t,
                Err(_) => {
                    tracing::warn!(path = %entry.path().display(), "skipping non UTF-8 document");
                    continue;
                }
            };
            let doc_id = entry
                .path()
                .strip_prefix(path)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .replace('\\', "/");
            kb.index_document(&chunker, &doc_id, &text);
        }

        tracing::info!(
            documents = kb.documents,
            chunks = kb.len(),
            path = %path.display(),
            "knowledge base loaded"
        );
        Ok(kb)
    }

    /// 索引单篇文档；空文档不计数
    pub fn index_document(&mut self, chunker: &Chunker, doc_id: &str, text: &str) -> usize {
        let chunks = chunker.chunk(doc_id, text);
        let added = chunks.len();
        if added > 0 {
            self.documents += 1;
        }
        self.entries.extend(chunks.into_iter().map(|chunk| IndexedChunk {
            tokens: tokenizer::tokenize_to_set(&chunk.text),
            chunk,
        }));
        added
    }

    /// 返回与查询重叠词最多的 k 个块；同分保持文档顺序
    pub fn search(&self, query: &str, k: usize) -> Vec<RetrievalResult> {
        let query_tokens = tokenizer::tokenize_to_set(query);
        if query_tokens.is_empty() {
            return Vec::new();
        }
        let mut scored: Vec<(usize, &Chunk)> = self
            .entries
            .iter()
            .map(|e| (tokenizer::overlap_score(&query_tokens, &e.tokens), &e.chunk))
            .filter(|(score, _)| *score > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        scored
            .into_iter()
            .take(k)
            .map(|(score, chunk)| RetrievalResult {
                chunk: chunk.clone(),
                score: score as f64 / query_tokens.len() as f64,
            })
            .collect()
    }

    /// 块数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn document_count(&self) -> usize {
        self.documents
    }
}

fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| TEXT_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunks = Chunker::default().chunk("a.txt", "  Rust is a systems language.  ");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Rust is a systems language.");
        assert_eq!(chunks[0].id, "a.txt_0");
    }

    #[test]
    fn test_chunks_overlap_and_cover_text() {
        let chunker = Chunker::new(ChunkingConfig::new(40, 10));
        let text = "alpha beta gamma delta. epsilon zeta eta theta. iota kappa lambda mu. nu xi omicron pi.";
        let chunks = chunker.chunk("doc", text);
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(c.text.chars().count() <= 40);
            assert_eq!(c.source_id, "doc");
        }
        assert!(chunks.last().unwrap().text.ends_with("pi."));
        // 第二块从第一块末尾往回 10 个字符处开始
        assert_eq!(chunks[1].offset, 14);
    }

    #[test]
    fn test_chunking_is_utf8_safe() {
        let chunker = Chunker::new(ChunkingConfig::new(5, 1));
        let chunks = chunker.chunk("zh", "这是第一段话这是第二句话");
        assert!(chunks.len() > 1);
    }

    #[test]
    fn test_chunking_config_clamps_overlap() {
        let c = ChunkingConfig::new(10, 50);
        assert_eq!(c.chunk_overlap, 9);
        assert_eq!(ChunkingConfig::default().chunk_size, 1024);
    }

    #[test]
    fn test_search_ranks_by_overlap() {
        let mut kb = KnowledgeBase::new();
        let chunker = Chunker::default();
        kb.index_document(&chunker, "space.md", "The Apollo program landed astronauts on the moon.");
        kb.index_document(&chunker, "rust.md", "Rust guarantees memory safety without garbage collection.");
        let results = kb.search("who landed on the moon", 3);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.source_id, "space.md");
        assert!(kb.search("", 3).is_empty());
        assert_eq!(kb.document_count(), 2);
    }

    #[test]
    fn test_load_dir_reads_text_files_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.md"), "Photosynthesis converts light into energy.").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/ai.txt"), "Neural networks learn from data.").unwrap();
        std::fs::write(dir.path().join("image.png"), [0u8, 159, 146, 150]).unwrap();

        let kb = KnowledgeBase::load_dir(dir.path(), ChunkingConfig::default()).unwrap();
        assert_eq!(kb.document_count(), 2);
        assert_eq!(kb.len(), 2);
        let hit = &kb.search("neural networks", 1)[0];
        assert_eq!(hit.chunk.source_id, "sub/ai.txt");
    }

    #[test]
    fn test_load_dir_missing_path() {
        let err = KnowledgeBase::load_dir(Path::new("/definitely/not/here"), ChunkingConfig::default());
        assert!(matches!(err, Err(KnowledgeError::NotFound(_))));
    }
}
