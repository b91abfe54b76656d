//! # gitdirclone
//!
//! Download a single directory subtree of a GitHub repository without cloning
//! the whole repository.
//!
//! This crate provides:
//! - A blocking client for the GitHub contents API
//! - A depth-first tree walker that mirrors a remote directory on disk
//! - A small persisted settings store for a personal access token
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gitdirclone::prelude::*;
//!
//! let client = GitHubClient::from_env();
//! let request = CloneRequest::new("octocat/Hello-World".parse()?, "docs")
//!     .branch("main")
//!     .output("./docs-copy");
//!
//! let summary = DirectoryCloner::new(&client)
//!     .on_event(|event| {
//!         if let CloneEvent::FileDownloaded { path, .. } = event {
//!             println!("Downloaded {}", path);
//!         }
//!     })
//!     .clone_directory(&request)?;
//!
//! println!("{} files into {}", summary.files, summary.root.display());
//! # Ok::<(), gitdirclone::error::DirCloneError>(())
//! ```
//!
//! ## Authentication
//!
//! Anonymous requests work for public repositories but have a low rate limit.
//! A token stored with [`config::SettingsStore`] is sent as a bearer token on
//! every request, including raw file downloads:
//!
//! ```rust,no_run
//! use gitdirclone::prelude::*;
//!
//! let store = SettingsStore::new()?;
//! store.set_token("ghp_your_token_here")?;
//!
//! let client = GitHubClient::new(store.token()?);
//! assert!(client.is_authenticated());
//! # Ok::<(), gitdirclone::error::DirCloneError>(())
//! ```

pub mod clone;
pub mod config;
pub mod error;
pub mod github;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::clone::{
        CloneEvent, CloneRequest, CloneSummary, DEFAULT_BRANCH, DirectoryCloner,
        resolve_output_dir,
    };
    pub use crate::config::{Settings, SettingsStore};
    pub use crate::error::{DirCloneError, Result};
    pub use crate::github::{ContentEntry, ContentsOps, EntryKind, GitHubClient, RepoRef};
}

pub use prelude::*;
