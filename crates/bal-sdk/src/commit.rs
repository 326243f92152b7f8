use std::fmt;

use bal_lua::{DecodeWarning, NormalizeWarning};
use bal_types::{Author, BalanceChange};
use chrono::{DateTime, Utc};

use crate::error::{AnalyzeError, Side};

/// How a file changed in a commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Removed,
    Modified,
}

/// Raw content of one file before and after a commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRevision {
    /// Repository-relative path, `/`-separated.
    pub path: String,
    pub status: FileStatus,
    pub previous: Option<Vec<u8>>,
    pub current: Option<Vec<u8>>,
}

impl FileRevision {
    pub fn added(path: impl Into<String>, current: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            status: FileStatus::Added,
            previous: None,
            current: Some(current.into()),
        }
    }

    pub fn removed(path: impl Into<String>, previous: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            status: FileStatus::Removed,
            previous: Some(previous.into()),
            current: None,
        }
    }

    pub fn modified(
        path: impl Into<String>,
        previous: impl Into<Vec<u8>>,
        current: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            path: path.into(),
            status: FileStatus::Modified,
            previous: Some(previous.into()),
            current: Some(current.into()),
        }
    }

    /// The content for `side`, or `MissingRevision`.
    pub fn content(&self, side: Side) -> Result<&[u8], AnalyzeError> {
        let content = match side {
            Side::Previous => self.previous.as_deref(),
            Side::Current => self.current.as_deref(),
        };
        content.ok_or_else(|| AnalyzeError::MissingRevision {
            path: self.path.clone(),
            side,
        })
    }
}

/// One commit as supplied by the source-control layer.
#[derive(Clone, Debug, PartialEq)]
pub struct CommitInput {
    pub sha: String,
    pub date: DateTime<Utc>,
    pub message: String,
    pub url: String,
    pub author: Author,
    pub files: Vec<FileRevision>,
}

impl CommitInput {
    pub fn new(sha: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            sha: sha.into(),
            date,
            message: String::new(),
            url: String::new(),
            author: Author::default(),
            files: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_author(mut self, author: Author) -> Self {
        self.author = author;
        self
    }

    pub fn with_file(mut self, file: FileRevision) -> Self {
        self.files.push(file);
        self
    }
}

/// Which commits of a newest-first list to analyze.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitSelection {
    /// Analyze only this commit, if it is in the list.
    pub sha: Option<String>,
    /// Skip these commits. Skipped commits do not count towards `limit`.
    pub exclude_shas: Vec<String>,
    /// Stop when this commit is reached, without analyzing it.
    pub up_to_sha: Option<String>,
    /// Stop after this many commits were analyzed.
    pub limit: Option<usize>,
}

/// A file that could not be analyzed.
#[derive(Debug)]
pub struct FileFailure {
    pub path: String,
    pub error: AnalyzeError,
}

/// Data left out while loading one revision of a file.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadWarning {
    Decode(DecodeWarning),
    Normalize(NormalizeWarning),
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(w) => w.fmt(f),
            Self::Normalize(w) => w.fmt(f),
        }
    }
}

/// A file that was analyzed, but only after dropping some of its data.
#[derive(Clone, Debug, PartialEq)]
pub struct FileWarning {
    pub path: String,
    pub side: Side,
    pub warning: LoadWarning,
}

/// The outcome of analyzing one commit.
#[derive(Debug)]
pub struct CommitAnalysis {
    pub change: BalanceChange,
    /// Files skipped because of errors; their siblings are unaffected.
    pub failures: Vec<FileFailure>,
    /// Data dropped from files that were still analyzed.
    pub warnings: Vec<FileWarning>,
}

impl CommitAnalysis {
    /// Returns `true` if nothing changed and nothing failed. Warnings alone
    /// do not make a commit worth reporting.
    pub fn is_empty(&self) -> bool {
        self.change.is_empty() && self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn revision_constructors_set_sides() {
        let added = FileRevision::added("units/a.lua", "return {}");
        assert_eq!(added.status, FileStatus::Added);
        assert!(added.content(Side::Current).is_ok());
        assert!(matches!(
            added.content(Side::Previous),
            Err(AnalyzeError::MissingRevision { side: Side::Previous, .. })
        ));

        let removed = FileRevision::removed("units/a.lua", "return {}");
        assert!(removed.content(Side::Current).is_err());
        assert_eq!(removed.content(Side::Previous).ok(), Some(&b"return {}"[..]));
    }

    #[test]
    fn commit_builder() {
        let date = Utc.with_ymd_and_hms(2023, 1, 2, 3, 4, 5).unwrap();
        let commit = CommitInput::new("abc", date)
            .with_message("nerf flea")
            .with_url("https://example.invalid/c/abc")
            .with_file(FileRevision::modified("units/a.lua", "return {}", "return {}"));
        assert_eq!(commit.sha, "abc");
        assert_eq!(commit.message, "nerf flea");
        assert_eq!(commit.files.len(), 1);
        assert_eq!(commit.author, Author::default());
    }

    #[test]
    fn load_warning_displays_inner_message() {
        let warning = LoadWarning::Normalize(NormalizeWarning::UnmatchedWeapons {
            unit: "armpw".into(),
            dropped: 2,
        });
        assert_eq!(
            warning.to_string(),
            "armpw: dropped 2 weapon entries with no matching weapon definition"
        );
    }
}
