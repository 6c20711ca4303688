//! Content-ingestion request model.

use serde::{Deserialize, Serialize};

/// One file inside a directory request.
///
/// Traversal happens outside the core: directory requests arrive with their
/// file list already enumerated, each entry sized so the producer can declare
/// per-item workloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryFile {
    /// Path of the file, relative or absolute per the producer's convention.
    pub path: String,
    /// File length in bytes.
    pub size_bytes: u64,
}

/// The five kinds of content an ingestion request can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// A single file on disk.
    File,
    /// A directory tree, pre-traversed into a file list.
    Directory,
    /// A single web page.
    Url,
    /// A sitemap fanning out to many pages.
    Sitemap,
    /// A free-text note.
    Note,
}

/// A content-ingestion request targeted at one knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IngestRequest {
    /// Ingest a single file.
    File {
        /// Path of the file.
        path: String,
        /// File length in bytes, used as the item's declared workload.
        size_bytes: u64,
    },
    /// Ingest every file in a directory; fans out into one item per file.
    Directory {
        /// Root path of the directory.
        path: String,
        /// Pre-traversed file list.
        files: Vec<DirectoryFile>,
    },
    /// Ingest a single web page.
    Url {
        /// Page address.
        url: String,
    },
    /// Ingest a sitemap and the pages it references.
    Sitemap {
        /// Sitemap address.
        url: String,
    },
    /// Ingest a free-text note.
    Note {
        /// Note content.
        content: String,
    },
}

impl IngestRequest {
    /// The request's kind tag.
    pub const fn kind(&self) -> RequestKind {
        match self {
            Self::File { .. } => RequestKind::File,
            Self::Directory { .. } => RequestKind::Directory,
            Self::Url { .. } => RequestKind::Url,
            Self::Sitemap { .. } => RequestKind::Sitemap,
            Self::Note { .. } => RequestKind::Note,
        }
    }

    /// Number of task items this request fans out into.
    pub fn item_count(&self) -> usize {
        match self {
            Self::Directory { files, .. } => files.len(),
            _ => 1,
        }
    }
}
