//! Commit input built from two directory trees instead of source control.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;
use walkdir::WalkDir;

use crate::commit::{CommitInput, FileRevision};
use crate::error::{AnalyzeError, AnalyzeResult};

/// Pair the files of `old_dir` and `new_dir` by relative path into a
/// synthetic commit named `id`. Files with identical bytes are left out.
pub fn snapshot_commit(
    old_dir: impl AsRef<Path>,
    new_dir: impl AsRef<Path>,
    id: &str,
) -> AnalyzeResult<CommitInput> {
    let old_files = collect_files(old_dir.as_ref())?;
    let mut new_files = collect_files(new_dir.as_ref())?;

    let mut commit = CommitInput::new(id, Utc::now()).with_message(format!("snapshot {id}"));
    for (path, old_path) in old_files {
        let previous = read(&old_path)?;
        let revision = match new_files.remove(&path) {
            Some(new_path) => {
                let current = read(&new_path)?;
                if previous == current {
                    continue;
                }
                FileRevision::modified(path, previous, current)
            }
            None => FileRevision::removed(path, previous),
        };
        commit = commit.with_file(revision);
    }
    for (path, new_path) in new_files {
        commit = commit.with_file(FileRevision::added(path, read(&new_path)?));
    }

    debug!(id, files = commit.files.len(), "built snapshot commit");
    Ok(commit)
}

/// Relative `/`-joined path -> absolute path, for every file under `root`.
fn collect_files(root: &Path) -> AnalyzeResult<BTreeMap<String, PathBuf>> {
    let mut files = BTreeMap::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.insert(key, entry.path().to_path_buf());
    }
    Ok(files)
}

fn read(path: &Path) -> AnalyzeResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| AnalyzeError::io(path, e))
}
