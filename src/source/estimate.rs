//! Workload-estimation conventions shared by all task sources.
//!
//! Admission control only works if producers declare workloads consistently:
//! file and note items use the content's byte length, while remote content of
//! unknown size uses fixed heuristic constants. Estimates are soft - they
//! bound admission, not actual memory use.

use crate::source::request::IngestRequest;

/// Declared workload for a single-URL item (2 MiB).
pub const URL_WORKLOAD_BYTES: u64 = 2 * 1024 * 1024;
/// Declared workload for a sitemap item (20 MiB), covering its page fan-out.
pub const SITEMAP_WORKLOAD_BYTES: u64 = 20 * 1024 * 1024;

/// Workload for a note item: its content byte length.
pub fn note_workload(content: &str) -> u64 {
    content.len() as u64
}

/// Declared workloads for every item a request fans out into, in the order a
/// conforming source creates them.
pub fn request_workloads(request: &IngestRequest) -> Vec<u64> {
    match request {
        IngestRequest::File { size_bytes, .. } => vec![*size_bytes],
        IngestRequest::Directory { files, .. } => {
            files.iter().map(|f| f.size_bytes).collect()
        }
        IngestRequest::Url { .. } => vec![URL_WORKLOAD_BYTES],
        IngestRequest::Sitemap { .. } => vec![SITEMAP_WORKLOAD_BYTES],
        IngestRequest::Note { content } => vec![note_workload(content)],
    }
}
