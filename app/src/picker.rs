//! Non-interactive image picker for the console shell.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use clip_core::ClipboardKind;
use clip_core::FilePicker;
use clip_core::backend::ImageFilter;

/// Picks the most recently modified matching image in a directory.
///
/// Files whose stem contains the kind name (`copy.png`, `my-clear.gif`)
/// win over other images.
#[derive(Debug, Clone)]
pub struct DirectoryPicker {
    dir: PathBuf,
}

impl DirectoryPicker {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn candidates(&self, filter: ImageFilter) -> std::io::Result<Vec<(PathBuf, SystemTime)>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut found = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !filter.accepts(&path) {
                continue;
            }
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            found.push((path, modified));
        }
        Ok(found)
    }
}

impl FilePicker for DirectoryPicker {
    async fn pick_image(&self, kind: ClipboardKind, filter: ImageFilter) -> Option<PathBuf> {
        let found = match self.candidates(filter).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(dir = %self.dir.display(), "Image directory unreadable: {e}");
                return None;
            }
        };

        let named = |path: &Path| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(|s| s.to_ascii_lowercase().contains(kind.as_str()))
        };

        let picked = found
            .into_iter()
            .max_by_key(|(path, modified)| (named(path), *modified))
            .map(|(path, _)| path);
        match &picked {
            Some(path) => tracing::info!(%kind, path = %path.display(), "Image picked"),
            None => tracing::info!(%kind, filter = filter.name, "No matching image found"),
        }
        picked
    }
}

#[cfg(test)]
mod tests {
    use clip_core::backend::IMAGE_FILTER;

    use super::*;

    #[tokio::test]
    async fn test_prefers_kind_named_image() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::write(dir.path().join("other.png"), b"x").unwrap();
        std::fs::write(dir.path().join("my-clear.gif"), b"x").unwrap();

        let picker = DirectoryPicker::new(dir.path());
        let picked = picker.pick_image(ClipboardKind::Clear, IMAGE_FILTER).await;
        assert_eq!(picked, Some(dir.path().join("my-clear.gif")));

        let picked = picker.pick_image(ClipboardKind::Copy, IMAGE_FILTER).await;
        assert!(picked.is_some_and(|p| IMAGE_FILTER.accepts(&p)));
    }

    #[tokio::test]
    async fn test_empty_or_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("readme.md"), b"x").unwrap();

        let picker = DirectoryPicker::new(dir.path());
        assert_eq!(picker.pick_image(ClipboardKind::Copy, IMAGE_FILTER).await, None);

        let picker = DirectoryPicker::new(dir.path().join("missing"));
        assert_eq!(picker.pick_image(ClipboardKind::Copy, IMAGE_FILTER).await, None);
    }
}
