// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for Loom crash reporting.
//!
//! This crate provides the payload types shared by the crash client
//! (`loom-crash`) and the state-store middleware (`loom-crash-store`).
//!
//! # Overview
//!
//! - [`CrashEvent`] is the report payload assembled by the client and
//!   mutated by event processors before it reaches a transport
//! - [`Breadcrumb`] is a timestamped narrative entry recorded ahead of a
//!   potential report
//! - [`UserContext`] identifies the user affected by a report
//! - [`estimated_size`] measures the serialized size of a payload so that
//!   oversized reports can be detected before they are sent

pub mod breadcrumb;
pub mod context;
pub mod error;
pub mod event;
pub mod size;

pub use breadcrumb::{Breadcrumb, BreadcrumbLevel};
pub use context::UserContext;
pub use error::{CrashError, Result};
pub use event::{CrashEvent, CrashEventId};
pub use size::{estimated_size, exceeds};
