//! # Ingest Admission
//!
//! An admission-control task scheduler for knowledge-base ingestion workloads.
//!
//! This library provides the coordination layer that sits between ingestion
//! request producers (file, directory, URL, sitemap, and note handlers) and
//! the loader backends that actually read, split, and embed content. Producers
//! decompose each request into a [`core::TaskGroup`] of independent
//! [`core::TaskItem`]s, each carrying a declared workload in bytes; the
//! scheduler admits items against two global caps and resolves a per-group
//! completion future once every item in the group has settled.
//!
//! ## Core Problem Solved
//!
//! Ingestion requests are wildly uneven: one request may be a single note,
//! another a directory with thousands of files. Without admission control, a
//! single large request can exhaust memory and starve the embedding backend:
//!
//! - **Two-dimensional capacity**: at most N items *and* M declared bytes in
//!   flight at once, regardless of how many requests arrive concurrently
//! - **Per-request completion**: callers await "all sub-units of this request
//!   are done" without blocking unrelated requests
//! - **Partial failure as data**: one failing file in a 500-file directory
//!   never aborts the other 499 - failures accumulate into the group result
//! - **Backend-agnostic**: the scheduler consumes an opaque async operation
//!   plus a declared cost; what loading actually means is the producer's
//!   business
//!
//! ## Scheduling Model
//!
//! The admission pass (`tick`) is synchronous, lock-bounded, and greedy
//! first-fit by registration order. Admitted operations run concurrently via
//! the [`core::Spawn`] seam; every settlement releases capacity and triggers
//! another pass.
//!
//! ```rust,ignore
//! use ingest_admission::config::SchedulerLimits;
//! use ingest_admission::core::{LoaderScheduler, TaskGroup, TaskItem};
//! use ingest_admission::runtime::TokioSpawner;
//! use ingest_admission::source::IngestSummary;
//!
//! let scheduler = LoaderScheduler::new(
//!     SchedulerLimits::default(),      // 30 items, 80 MiB declared workload
//!     TokioSpawner::new(tokio::runtime::Handle::current()),
//! )?;
//!
//! let mut group = TaskGroup::new(IngestSummary::default(), IngestSummary::apply);
//! group.push(TaskItem::new(file_len, async move { load_one_file(path).await }));
//!
//! let summary = scheduler.submit(group)?.await;
//! println!("{} entries added, {} failed", summary.entries_added, summary.failures.len());
//! ```
//!
//! ## Task Source Protocol
//!
//! The [`source`] module defines the contract producers implement: a
//! [`source::TaskSource`] maps an [`source::IngestRequest`] onto a task group
//! whose items follow the crate's workload-estimation conventions (content
//! byte length for files and notes, fixed heuristics for remote content).
//!
//! For complete examples, see:
//! - `tests/admission_test.rs` - capacity and conservation properties
//! - `tests/source_protocol_test.rs` - an end-to-end sample source

#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Scheduler core: capacity accounting, task groups, and the admission loop.
pub mod core;
/// Configuration models for scheduler limits.
pub mod config;
/// Task Source Protocol: the contract ingestion producers implement.
pub mod source;
/// Runtime adapters and request-submission glue.
pub mod runtime;
/// Shared utilities.
pub mod util;
