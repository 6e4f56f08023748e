//! Discovery, parsing and task updates against the real filesystem.

mod util;

use std::sync::Arc;

use repobrief::core::error::IndexError;
use repobrief::core::index::DocumentIndex;
use repobrief::infra::config::IgnoreConfig;
use repobrief::infra::storage::{FsStorage, Storage};

async fn open(root: &std::path::Path) -> DocumentIndex
{
    let root = dunce::canonicalize(root).expect("canonical root");
    let storage: Arc<dyn Storage> = Arc::new(FsStorage::new());
    DocumentIndex::open(root, storage, &IgnoreConfig::default())
        .await
        .expect("open index")
}

fn pats(p: &[&str]) -> Vec<String>
{
    p.iter()
        .map(|s| s.to_string())
        .collect()
}

#[tokio::test]
async fn find_files_skips_ignored_and_dedups()
{
    let tmp = util::make_repo();
    let index = open(tmp.path()).await;

    let mut files = index
        .find_files(&pats(&["**/TODO.md", "TODO.md", "**/*.todo.md"]))
        .await
        .unwrap();
    files.sort();

    assert_eq!(files, vec!["TODO.md", "api/TODO.md"]);
}

#[tokio::test]
async fn discovery_is_stable_across_calls()
{
    let tmp = util::make_repo();
    let index = open(tmp.path()).await;
    let patterns = pats(&["**/*.md"]);

    let mut first = index.find_files(&patterns).await.unwrap();
    let mut second = index.find_files(&patterns).await.unwrap();
    first.sort();
    second.sort();

    assert_eq!(first, second);
    assert!(first.contains(&"docs/guide.md".to_string()));
    assert!(!first.iter().any(|p| p.starts_with("build/")));
}

#[tokio::test]
async fn checklists_parse_sections_and_crlf()
{
    let tmp = util::make_repo();
    let index = open(tmp.path()).await;

    let lists = index
        .read_checklists(&pats(&["**/TODO.md"]))
        .await
        .unwrap();

    let root = &lists["TODO.md"];
    assert_eq!(root.sections, vec!["Setup", "Release"]);
    assert_eq!(root.tasks.len(), 3);
    assert_eq!(root.completed_count(), 1);

    let api = &lists["api/TODO.md"];
    assert_eq!(api.sections, vec!["Uncategorized"]);
    assert_eq!(api.tasks[0].description, "document endpoints");
}

#[tokio::test]
async fn documents_drop_preamble()
{
    let tmp = util::make_repo();
    let index = open(tmp.path()).await;

    let docs = index
        .read_documents(&pats(&["README.md", "docs/**/*.md"]))
        .await
        .unwrap();

    assert_eq!(docs["README.md"].title, "Demo");
    assert_eq!(docs["README.md"].sections.len(), 2);
    assert_eq!(docs["docs/guide.md"].title, "Guide");
    assert_eq!(docs["docs/guide.md"].sections.len(), 1);
}

#[tokio::test]
async fn set_task_completion_touches_only_the_match()
{
    let tmp = util::make_repo();
    let index = open(tmp.path()).await;

    assert!(
        index
            .set_task_completion("api/TODO.md", "auth", true)
            .await
            .unwrap()
    );

    let text = std::fs::read_to_string(tmp.path().join("api/TODO.md")).unwrap();
    assert_eq!(text, "- [ ] document endpoints\r\n- [x] add auth\r\n");

    // Applying the same update again leaves the file unchanged
    assert!(
        index
            .set_task_completion("api/TODO.md", "auth", true)
            .await
            .unwrap()
    );
    let again = std::fs::read_to_string(tmp.path().join("api/TODO.md")).unwrap();
    assert_eq!(again, text);
}

#[tokio::test]
async fn set_task_completion_without_match_does_not_write()
{
    let tmp = util::make_repo();
    let index = open(tmp.path()).await;
    let before = std::fs::read_to_string(tmp.path().join("TODO.md")).unwrap();

    let changed = index
        .set_task_completion("TODO.md", "no such task", true)
        .await
        .unwrap();

    assert!(!changed);
    assert_eq!(std::fs::read_to_string(tmp.path().join("TODO.md")).unwrap(), before);
}

#[tokio::test]
async fn missing_and_ignored_files_are_not_found()
{
    let tmp = util::make_repo();
    let index = open(tmp.path()).await;

    let missing = index
        .set_task_completion("NOPE.md", "x", true)
        .await;
    assert!(matches!(missing, Err(IndexError::NotFound(_))));

    let ignored = index
        .set_task_completion("build/TODO.md", "generated", true)
        .await;
    assert!(matches!(ignored, Err(IndexError::NotFound(_))));
}

#[tokio::test]
async fn required_primary_rules_file_must_exist()
{
    let tmp = assert_fs::TempDir::new().unwrap();
    let storage: Arc<dyn Storage> = Arc::new(FsStorage::new());
    let cfg = IgnoreConfig { require_primary: true, ..IgnoreConfig::default() };

    let err = DocumentIndex::open(tmp.path(), storage, &cfg)
        .await
        .unwrap_err();
    assert!(matches!(err, IndexError::Configuration(_)));
}

#[tokio::test]
async fn unreadable_text_is_a_storage_error()
{
    let tmp = util::make_repo();
    std::fs::write(tmp.path().join("TODO.md"), [0xFF, 0xFE, b'\n']).unwrap();
    let index = open(tmp.path()).await;

    let listed = index
        .read_checklists(&pats(&["**/TODO.md"]))
        .await;
    assert!(matches!(listed, Err(IndexError::Storage { .. })));

    let updated = index
        .set_task_completion("TODO.md", "anything", true)
        .await;
    assert!(matches!(updated, Err(IndexError::Storage { .. })));
}

#[cfg(unix)]
#[tokio::test]
async fn ignored_directories_are_not_traversed()
{
    let tmp = util::make_repo();
    std::fs::create_dir_all(tmp.path().join("node_modules")).unwrap();
    // Symlink cycle that a full traversal with link following reports as an error
    std::os::unix::fs::symlink(tmp.path(), tmp.path().join("node_modules/cycle")).unwrap();

    let root = dunce::canonicalize(tmp.path()).unwrap();
    let storage: Arc<dyn Storage> = Arc::new(FsStorage::new().with_follow_symlinks(true));
    let index = DocumentIndex::open(root, storage, &IgnoreConfig::default())
        .await
        .unwrap();

    let mut files = index
        .find_files(&pats(&["**/TODO.md"]))
        .await
        .unwrap();
    files.sort();
    assert_eq!(files, vec!["TODO.md", "api/TODO.md"]);
}
