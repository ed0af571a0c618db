//! Shared fixtures for the integration suite.

use mdrepo::config::RepositoryConfig;
use mdrepo::provider::ContentProvider;
use std::path::Path;
use tempfile::TempDir;

/// Write a file, creating parent directories as needed.
pub async fn write_file(root: &Path, relative: &str, content: &str) {
    let full = root.join(relative);
    if let Some(parent) = full.parent() {
        tokio::fs::create_dir_all(parent).await.unwrap();
    }
    tokio::fs::write(full, content).await.unwrap();
}

/// A blog-shaped content tree used across scenarios.
///
/// ```text
/// blog/_index.md   (name: Tech Blog, order: 1)
/// blog/a.md        (title A, tags [x])
/// blog/b.md        (title B, tags [y])
/// notes/c.md       (title C, draft)
/// ```
pub async fn blog_fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write_file(root, "blog/_index.md", "---\nname: Tech Blog\norder: 1\n---\n").await;
    write_file(
        root,
        "blog/a.md",
        "---\ntitle: \"A\"\ntags: [x]\ndate: 2024-01-10\n---\nFirst post body.\n",
    )
    .await;
    write_file(
        root,
        "blog/b.md",
        "---\ntitle: \"B\"\ntags: [y]\ndate: 2024-02-20\n---\nSecond post body.\n",
    )
    .await;
    write_file(
        root,
        "notes/c.md",
        "---\ntitle: \"C\"\nstatus: draft\n---\nScratch notes.\n",
    )
    .await;
    dir
}

/// Provider over `root` with test-friendly defaults.
pub fn provider_for(root: &Path) -> ContentProvider {
    ContentProvider::for_filesystem(config_for(root)).unwrap()
}

/// Config over `root` with test-friendly defaults.
pub fn config_for(root: &Path) -> RepositoryConfig {
    RepositoryConfig {
        provider_id: "test".to_string(),
        root: root.to_string_lossy().into_owned(),
        ..Default::default()
    }
}
