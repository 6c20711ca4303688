//! Runtime adapters and request-submission glue.

pub mod api;
#[cfg(feature = "tokio-runtime")]
pub mod tokio_spawner;

pub use api::submit_request;
#[cfg(feature = "tokio-runtime")]
pub use tokio_spawner::TokioSpawner;
