//! Repository contents: directory listings and raw file downloads.

use std::io::Write;

use serde::Deserialize;

use crate::error::{DirCloneError, Result};
use crate::github::{GitHubClient, RepoRef};

/// The kind of a directory listing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Submodule,
    #[serde(other)]
    Other,
}

/// One item of a directory listing from the contents API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    /// Path relative to the repository root.
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Raw content URL; only files have one.
    pub download_url: Option<String>,
    #[serde(default)]
    pub size: u64,
}

impl ContentEntry {
    /// A file entry.
    pub fn file(path: &str, download_url: impl Into<String>) -> Self {
        Self {
            name: base_name(path).to_string(),
            path: path.to_string(),
            kind: EntryKind::File,
            download_url: Some(download_url.into()),
            size: 0,
        }
    }

    /// A directory entry.
    pub fn dir(path: &str) -> Self {
        Self {
            name: base_name(path).to_string(),
            path: path.to_string(),
            kind: EntryKind::Dir,
            download_url: None,
            size: 0,
        }
    }
}

fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// The contents endpoint answers with an array for directories and a single
/// object for anything else.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing {
    Directory(Vec<ContentEntry>),
    Single(Box<ContentEntry>),
}

/// Listing and downloading repository contents.
pub trait ContentsOps {
    /// List the immediate entries of a directory at the given branch.
    fn list_directory(&self, repo: &RepoRef, path: &str, branch: &str) -> Result<Vec<ContentEntry>>;

    /// Stream a file entry's raw content into `out`, returning the bytes written.
    fn download_file(&self, entry: &ContentEntry, out: &mut dyn Write) -> Result<u64>;
}

impl ContentsOps for GitHubClient {
    fn list_directory(&self, repo: &RepoRef, path: &str, branch: &str) -> Result<Vec<ContentEntry>> {
        let endpoint = contents_endpoint(repo, path, branch);
        let body = self.get_text(&endpoint)?;

        match serde_json::from_str::<Listing>(&body)? {
            Listing::Directory(entries) => Ok(entries),
            Listing::Single(entry) => Err(DirCloneError::NotADirectory { path: entry.path }),
        }
    }

    fn download_file(&self, entry: &ContentEntry, out: &mut dyn Write) -> Result<u64> {
        let url = entry
            .download_url
            .as_deref()
            .ok_or_else(|| DirCloneError::MalformedEntry {
                path: entry.path.clone(),
                message: "file has no download URL".into(),
            })?;

        let mut response = self.send(url)?;
        Ok(response.copy_to(out)?)
    }
}

/// Build `/repos/{owner}/{repo}/contents/{path}?ref={branch}` with each path
/// segment percent-encoded.
pub(crate) fn contents_endpoint(repo: &RepoRef, path: &str, branch: &str) -> String {
    let encoded_path = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");

    format!(
        "/repos/{}/{}/contents/{}?ref={}",
        urlencoding::encode(&repo.owner),
        urlencoding::encode(&repo.name),
        encoded_path,
        urlencoding::encode(branch)
    )
}
