//! Implements KnowledgePort from handbook files in the data directory.
//!
//! `data/cached_knowledge.txt` wins when present. Otherwise every `*.pdf`, `*.txt`
//! and `*.md` file is turned into text and concatenated under a per-document header.

use crate::domain::{DomainError, KnowledgeBase};
use crate::ports::KnowledgePort;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// File written by [`TextKnowledgeLoader::rebuild_cache`] and preferred by `load`.
pub const CACHE_FILE_NAME: &str = "cached_knowledge.txt";

const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "txt", "md"];

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Text layer of a PDF. Runs on the blocking pool; a panicking parser is reported
/// as an error like any other malformed file.
async fn extract_pdf_text(path: &Path) -> Result<String, String> {
    let bytes = fs::read(path).await.map_err(|e| e.to_string())?;
    tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| format!("pdf parser aborted: {}", e))?
        .map_err(|e| e.to_string())
}

async fn read_document(path: &Path) -> Result<String, String> {
    if is_pdf(path) {
        extract_pdf_text(path).await
    } else {
        fs::read_to_string(path).await.map_err(|e| e.to_string())
    }
}

pub struct TextKnowledgeLoader {
    data_dir: PathBuf,
}

impl TextKnowledgeLoader {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    fn cache_path(&self) -> PathBuf {
        self.data_dir.join(CACHE_FILE_NAME)
    }

    /// Header inserted before each document so the model can cite its source.
    fn document_header(name: &str) -> String {
        format!("\n\n--- [문서 시작: {}] ---\n", name)
    }

    /// Document files in the data directory, sorted by name. The cache file is excluded.
    async fn document_paths(&self) -> Result<Vec<PathBuf>, DomainError> {
        let mut entries = fs::read_dir(&self.data_dir)
            .await
            .map_err(|e| DomainError::Knowledge(format!("read data dir: {}", e)))?;
        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DomainError::Knowledge(format!("read data dir: {}", e)))?
        {
            let path = entry.path();
            let is_doc = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| DOCUMENT_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            let is_cache = path.file_name().and_then(|n| n.to_str()) == Some(CACHE_FILE_NAME);
            if is_doc && !is_cache {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Concatenate all documents. Unreadable files are logged and skipped.
    async fn concatenate(&self) -> Result<KnowledgeBase, DomainError> {
        let mut kb = KnowledgeBase::default();
        for path in self.document_paths().await? {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            match read_document(&path).await {
                Ok(text) if text.trim().is_empty() => {
                    warn!(path = %path.display(), "document has no extractable text, skipping");
                }
                Ok(text) => {
                    debug!(document = %name, len = text.len(), "loaded document");
                    kb.content.push_str(&Self::document_header(&name));
                    kb.content.push_str(&text);
                    kb.documents.push(name);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable document");
                }
            }
        }
        Ok(kb)
    }

    /// Regenerate `cached_knowledge.txt` from the individual documents.
    ///
    /// Written via temp file + rename so a crash never leaves a half-written cache.
    pub async fn rebuild_cache(&self) -> Result<KnowledgeBase, DomainError> {
        fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|e| DomainError::Knowledge(format!("create data dir: {}", e)))?;
        let kb = self.concatenate().await?;
        if kb.documents.is_empty() {
            return Err(DomainError::KnowledgeEmpty);
        }

        let target = self.cache_path();
        let temp_path = target.with_extension("txt.tmp");
        let mut f = fs::File::create(&temp_path)
            .await
            .map_err(|e| DomainError::Knowledge(format!("create temp file: {}", e)))?;
        f.write_all(kb.content.as_bytes())
            .await
            .map_err(|e| DomainError::Knowledge(format!("write temp file: {}", e)))?;
        f.sync_all()
            .await
            .map_err(|e| DomainError::Knowledge(format!("sync temp file: {}", e)))?;
        drop(f);
        fs::rename(&temp_path, &target)
            .await
            .map_err(|e| DomainError::Knowledge(format!("atomic rename failed: {}", e)))?;

        info!(
            path = %target.display(),
            documents = kb.documents.len(),
            len = kb.content.len(),
            "knowledge cache rebuilt"
        );
        Ok(kb)
    }
}

#[async_trait::async_trait]
impl KnowledgePort for TextKnowledgeLoader {
    async fn load(&self) -> Result<KnowledgeBase, DomainError> {
        if !fs::try_exists(&self.data_dir).await.unwrap_or(false) {
            fs::create_dir_all(&self.data_dir)
                .await
                .map_err(|e| DomainError::Knowledge(format!("create data dir: {}", e)))?;
            info!(path = %self.data_dir.display(), "created empty data directory");
            return Ok(KnowledgeBase::default());
        }

        let cache = self.cache_path();
        if let Ok(content) = fs::read_to_string(&cache).await {
            if !content.trim().is_empty() {
                info!(path = %cache.display(), len = content.len(), "loaded knowledge cache");
                return Ok(KnowledgeBase {
                    content,
                    documents: vec![CACHE_FILE_NAME.to_string()],
                });
            }
        }

        let kb = self.concatenate().await?;
        info!(
            documents = kb.documents.len(),
            len = kb.content.len(),
            "loaded knowledge documents"
        );
        Ok(kb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_dir_is_created_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("data");
        let loader = TextKnowledgeLoader::new(&dir);
        let kb = loader.load().await.unwrap();
        assert!(kb.is_empty());
        assert!(dir.is_dir());
    }

    #[tokio::test]
    async fn test_concatenates_sorted_with_headers() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("b_장학금규정.txt"), "평점 3.5 이상").unwrap();
        std::fs::write(tmp.path().join("a_학칙.md"), "졸업학점 130").unwrap();
        std::fs::write(tmp.path().join("broken.pdf"), "binary").unwrap();

        let kb = TextKnowledgeLoader::new(tmp.path()).load().await.unwrap();
        assert_eq!(kb.documents, vec!["a_학칙.md", "b_장학금규정.txt"]);
        assert!(kb.content.contains("--- [문서 시작: a_학칙.md] ---"));
        let first = kb.content.find("졸업학점").unwrap();
        let second = kb.content.find("평점").unwrap();
        assert!(first < second);
        assert!(!kb.content.contains("binary"));
    }

    #[tokio::test]
    async fn test_cache_preferred_after_rebuild() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("학칙.txt"), "v1").unwrap();
        let loader = TextKnowledgeLoader::new(tmp.path());
        loader.rebuild_cache().await.unwrap();

        std::fs::write(tmp.path().join("학칙.txt"), "v2").unwrap();
        let kb = loader.load().await.unwrap();
        assert_eq!(kb.documents, vec![CACHE_FILE_NAME]);
        assert!(kb.content.contains("v1"));
        assert!(!tmp.path().join("cached_knowledge.txt.tmp").exists());
    }

    /// One-page PDF with a single line of text in a base-14 font.
    fn write_pdf(path: &Path, text: &str) {
        use lopdf::content::{Content, Operation};
        use lopdf::{Document, Object, Stream, dictionary};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[tokio::test]
    async fn test_pdf_text_is_extracted_and_broken_pdf_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        write_pdf(&tmp.path().join("rules.pdf"), "Graduation requires 130 credits");
        std::fs::write(tmp.path().join("scan.pdf"), "%PDF-1.4 not really").unwrap();

        let kb = TextKnowledgeLoader::new(tmp.path()).load().await.unwrap();
        assert_eq!(kb.documents, vec!["rules.pdf"]);
        assert!(kb.content.contains("--- [문서 시작: rules.pdf] ---"));
        assert!(kb.content.contains("Graduation"));
    }

    #[tokio::test]
    async fn test_rebuild_cache_includes_pdf() {
        let tmp = tempfile::tempdir().unwrap();
        write_pdf(&tmp.path().join("scholarship.pdf"), "GPA 3.5 scholarship");
        std::fs::write(tmp.path().join("학칙.txt"), "졸업학점 130").unwrap();
        let loader = TextKnowledgeLoader::new(tmp.path());

        let rebuilt = loader.rebuild_cache().await.unwrap();
        assert_eq!(rebuilt.documents, vec!["scholarship.pdf", "학칙.txt"]);

        let cached = std::fs::read_to_string(tmp.path().join(CACHE_FILE_NAME)).unwrap();
        assert!(cached.contains("scholarship"));
        assert!(cached.contains("졸업학점 130"));
    }

    #[tokio::test]
    async fn test_rebuild_without_documents_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let err = TextKnowledgeLoader::new(tmp.path())
            .rebuild_cache()
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::KnowledgeEmpty));
    }
}
