//! GitHub API integration.
//!
//! This module provides a client for the repository contents API:
//! - List the entries of a directory at a branch
//! - Stream raw file contents
//!
//! # Example
//!
//! ```rust,no_run
//! use gitdirclone::github::{ContentsOps, GitHubClient, RepoRef};
//!
//! let client = GitHubClient::from_env();
//! let repo: RepoRef = "octocat/Hello-World".parse()?;
//!
//! for entry in client.list_directory(&repo, "docs", "main")? {
//!     println!("{:?} {}", entry.kind, entry.path);
//! }
//! # Ok::<(), gitdirclone::error::DirCloneError>(())
//! ```

mod client;
mod contents;
mod repo;

pub use client::{DEFAULT_API_URL, GitHubClient};
pub use contents::{ContentEntry, ContentsOps, EntryKind};
pub use repo::RepoRef;
