//! Recursive download of a remote directory into a local one.
//!
//! The walk is sequential and depth-first: one listing or download request at
//! a time. The first failure aborts the whole clone; files that were already
//! written are left in place. Existing local files are overwritten.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{DirCloneError, Result};
use crate::github::{ContentEntry, ContentsOps, EntryKind, RepoRef};

/// Branch used when none is given.
pub const DEFAULT_BRANCH: &str = "main";

/// What to clone and where to put it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneRequest {
    pub repo: RepoRef,
    /// Directory path inside the repository.
    pub directory: String,
    pub branch: String,
    /// Local destination; `None` means "name it after the remote directory".
    pub output: Option<PathBuf>,
}

impl CloneRequest {
    /// Clone `directory` from the default branch into the default location.
    pub fn new(repo: RepoRef, directory: impl Into<String>) -> Self {
        Self {
            repo,
            directory: directory.into(),
            branch: DEFAULT_BRANCH.into(),
            output: None,
        }
    }

    /// Set the branch (or any git ref).
    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Set an explicit local destination.
    pub fn output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }
}

/// Resolve the local output directory.
///
/// An explicit path is returned unchanged; otherwise the last segment of the
/// remote directory path is used.
pub fn resolve_output_dir(requested: Option<&Path>, remote_dir: &str) -> PathBuf {
    match requested {
        Some(path) => path.to_path_buf(),
        None => {
            let trimmed = remote_dir.trim_end_matches('/');
            PathBuf::from(trimmed.rsplit('/').next().unwrap_or(trimmed))
        }
    }
}

/// Progress notifications emitted while cloning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloneEvent {
    DirectoryStarted { path: String, local: PathBuf },
    FileDownloaded { path: String, local: PathBuf, bytes: u64 },
    Skipped { path: String, kind: EntryKind },
    DirectoryFinished { path: String },
}

/// Totals for a finished clone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloneSummary {
    /// The resolved local output root.
    pub root: PathBuf,
    pub files: usize,
    pub directories: usize,
    pub bytes: u64,
    pub skipped: usize,
}

type Observer<'a> = Box<dyn FnMut(&CloneEvent) + 'a>;

/// Walks a remote directory tree and mirrors it on disk.
pub struct DirectoryCloner<'a, S: ContentsOps + ?Sized> {
    source: &'a S,
    observer: Option<Observer<'a>>,
}

impl<'a, S: ContentsOps + ?Sized> DirectoryCloner<'a, S> {
    /// Create a cloner reading from `source`.
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            observer: None,
        }
    }

    /// Register a callback for progress events.
    pub fn on_event(mut self, observer: impl FnMut(&CloneEvent) + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Clone the requested directory.
    pub fn clone_directory(&mut self, request: &CloneRequest) -> Result<CloneSummary> {
        let directory = request.directory.trim().trim_matches('/');
        if directory.is_empty() {
            return Err(DirCloneError::InvalidRequest(
                "directory path must not be empty".into(),
            ));
        }

        let root = resolve_output_dir(request.output.as_deref(), directory);
        info!(
            repo = %request.repo,
            branch = %request.branch,
            directory,
            root = %root.display(),
            "cloning directory"
        );

        let mut summary = CloneSummary {
            root: root.clone(),
            ..CloneSummary::default()
        };
        self.fetch_directory(request, directory, &root, &mut summary)?;
        Ok(summary)
    }

    fn fetch_directory(
        &mut self,
        request: &CloneRequest,
        remote_dir: &str,
        local_dir: &Path,
        summary: &mut CloneSummary,
    ) -> Result<()> {
        self.emit(CloneEvent::DirectoryStarted {
            path: remote_dir.to_string(),
            local: local_dir.to_path_buf(),
        });

        fs::create_dir_all(local_dir)
            .map_err(|e| DirCloneError::from(e).in_directory(remote_dir))?;
        summary.directories += 1;

        let entries = self
            .source
            .list_directory(&request.repo, remote_dir, &request.branch)
            .map_err(|e| e.in_directory(remote_dir))?;
        debug!(directory = remote_dir, entries = entries.len(), "listed");

        for entry in entries {
            self.fetch_entry(request, remote_dir, entry, local_dir, summary)
                .map_err(|e| e.in_directory(remote_dir))?;
        }

        info!(directory = remote_dir, "directory cloned");
        self.emit(CloneEvent::DirectoryFinished {
            path: remote_dir.to_string(),
        });
        Ok(())
    }

    fn fetch_entry(
        &mut self,
        request: &CloneRequest,
        remote_dir: &str,
        entry: ContentEntry,
        local_dir: &Path,
        summary: &mut CloneSummary,
    ) -> Result<()> {
        // Listings report submodules as files without a download URL
        let kind = match entry.kind {
            EntryKind::File if entry.download_url.is_none() => EntryKind::Submodule,
            kind => kind,
        };

        match kind {
            EntryKind::File => {
                let local = local_dir.join(checked_name(&entry)?);
                let bytes = self.download(&entry, &local)?;
                summary.files += 1;
                summary.bytes += bytes;
                self.emit(CloneEvent::FileDownloaded {
                    path: entry.path,
                    local,
                    bytes,
                });
            }
            EntryKind::Dir => {
                let local = local_dir.join(checked_name(&entry)?);
                if !is_child_path(remote_dir, &entry.path) {
                    return Err(DirCloneError::MalformedEntry {
                        path: entry.path,
                        message: format!("not inside '{}'", remote_dir),
                    });
                }
                self.fetch_directory(request, &entry.path, &local, summary)?;
            }
            kind => {
                debug!(path = %entry.path, ?kind, "skipping entry");
                summary.skipped += 1;
                self.emit(CloneEvent::Skipped {
                    path: entry.path,
                    kind,
                });
            }
        }
        Ok(())
    }

    fn download(&self, entry: &ContentEntry, local: &Path) -> Result<u64> {
        let mut out = BufWriter::new(File::create(local)?);
        let bytes = self.source.download_file(entry, &mut out)?;
        out.flush()?;
        Ok(bytes)
    }

    fn emit(&mut self, event: CloneEvent) {
        if let Some(observer) = self.observer.as_mut() {
            observer(&event);
        }
    }
}

/// The entry's name, if it is safe to use as a single local path component.
fn checked_name(entry: &ContentEntry) -> Result<&str> {
    let name = entry.name.as_str();
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(DirCloneError::MalformedEntry {
            path: entry.path.clone(),
            message: format!("unsafe entry name '{}'", name),
        });
    }
    Ok(name)
}

/// Whether `path` names something strictly below `parent`.
fn is_child_path(parent: &str, path: &str) -> bool {
    path.strip_prefix(parent)
        .and_then(|rest| rest.strip_prefix('/'))
        .is_some_and(|rest| !rest.is_empty())
}
