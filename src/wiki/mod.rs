/// 위키 문서 저장소
/// 문서는 저장소 루트 아래에 <제목>.md 파일 하나로 저장된다.
/// 제목이 곧 키이며, 편집은 덮어쓰기이고 삭제는 없다.
// region:    --- Imports
use crate::error::{AppError, Result};
use async_trait::async_trait;
use pulldown_cmark::{html, Parser};
use rand::Rng;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

// endregion: --- Imports

// region:    --- Search Outcome

/// 검색 결과. 제목이 정확히 일치하면 해당 문서로 리다이렉트하고,
/// 아니면 부분 문자열(대소문자 구분)이 포함된 제목 목록을 돌려준다.
#[derive(Debug, PartialEq)]
pub enum SearchOutcome {
    Exact(String),
    Matches(Vec<String>),
}

// endregion: --- Search Outcome

// region:    --- Entry Store Trait

/// 위키 문서 저장소 트레이트
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// 문서 내용 조회. 없으면 None.
    async fn get_entry(&self, title: &str) -> Result<Option<String>>;

    /// 문서 생성 또는 덮어쓰기
    async fn save_entry(&self, title: &str, content: &str) -> Result<()>;

    /// 모든 문서 제목 조회
    async fn list_entries(&self) -> Result<Vec<String>>;

    /// 제목 검색
    async fn search(&self, query: &str) -> Result<SearchOutcome> {
        let entries = self.list_entries().await?;
        if entries.iter().any(|e| e == query) {
            return Ok(SearchOutcome::Exact(query.to_string()));
        }
        let matches = entries
            .into_iter()
            .filter(|e| e.contains(query))
            .collect();
        Ok(SearchOutcome::Matches(matches))
    }

    /// 전체 문서 중 하나를 균등 확률로 선택
    async fn random_entry(&self) -> Result<String> {
        let mut entries = self.list_entries().await?;
        if entries.is_empty() {
            return Err(AppError::EmptyStore);
        }
        let index = rand::thread_rng().gen_range(0..entries.len());
        Ok(entries.swap_remove(index))
    }
}

// endregion: --- Entry Store Trait

// region:    --- Filesystem Store

/// 파일 시스템 기반 저장소 구현체
pub struct FsEntryStore {
    root: PathBuf,
}

impl FsEntryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// WIKI_DIR 환경 변수로 저장소 생성 (기본값 ./entries)
    pub fn from_env() -> Self {
        let root = std::env::var("WIKI_DIR").unwrap_or_else(|_| "entries".to_string());
        Self::new(root)
    }

    fn entry_path(&self, title: &str) -> PathBuf {
        self.root.join(format!("{title}.md"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl EntryStore for FsEntryStore {
    async fn get_entry(&self, title: &str) -> Result<Option<String>> {
        info!("{:<12} --> 문서 조회: {}", "WikiStore", title);
        match tokio::fs::read_to_string(self.entry_path(title)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save_entry(&self, title: &str, content: &str) -> Result<()> {
        info!("{:<12} --> 문서 저장: {}", "WikiStore", title);
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.entry_path(title), content).await?;
        Ok(())
    }

    async fn list_entries(&self) -> Result<Vec<String>> {
        info!("{:<12} --> 문서 목록 조회", "WikiStore");
        let mut titles = Vec::new();
        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            // 저장소 루트가 아직 없으면 빈 목록
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(titles),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                titles.push(stem.to_string());
            }
        }
        titles.sort();
        Ok(titles)
    }
}

// endregion: --- Filesystem Store

// region:    --- Markdown

/// Markdown을 HTML로 변환 (pulldown-cmark에 위임)
pub fn render_markdown(content: &str) -> String {
    let parser = Parser::new(content);
    let mut rendered = String::new();
    html::push_html(&mut rendered, parser);
    rendered
}

// endregion: --- Markdown

// endregion: --- Tests
