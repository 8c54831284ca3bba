// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! State-store middleware for Loom crash reporting.
//!
//! [`CrashMiddleware`] sits in a [`Store`]'s dispatch chain and keeps, per
//! store, a bounded ledger of action breadcrumbs and the most recent action.
//! It installs an event processor on the [`CrashClient`](loom_crash::CrashClient)
//! so that every report carries:
//!
//! - `extra.lastAction`: the last dispatched action, `null` before the first
//! - `extra.state`: the store state at the time of the report
//! - the store's action breadcrumbs merged by timestamp with the client's own
//! - optionally a user context and tags derived from the state
//!
//! Transformers run lazily, only when a report is built. The first store
//! attached to a client wins; later stores are not reported.
//!
//! [`OversizeGuard`] wraps capture calls so that a report that is too large
//! (by local estimate, or by an HTTP 413 from the server) is resent once
//! with the state replaced by a diagnostic string and no breadcrumbs. The
//! result is a [`GuardedCapture`]; oversize reports are never errors.
//!
//! # Example
//!
//! ```ignore
//! use loom_crash_store::{CrashMiddleware, CrashMiddlewareOptions, Store};
//!
//! let crash = CrashMiddleware::new(
//!     client.clone(),
//!     CrashMiddlewareOptions::new()
//!         .filter_breadcrumb_actions(|a: &Value| a.action_type() != "TICK"),
//! );
//! let guard = crash.guard();
//! let store = Store::with_middleware(json!({ "value": 0 }), reducer, vec![Arc::new(crash)]);
//!
//! if let Err(e) = store.dispatch(json!({ "type": "THROW" })) {
//!     guard.capture_error(&e).await?;
//! }
//! ```

mod action;
mod error;
mod guard;
mod interceptor;
mod ledger;
mod middleware;
mod options;
pub mod registry;
mod store;
mod tracker;

pub use action::Action;
pub use error::{Result, StoreError};
pub use guard::{
	GuardedCapture, OversizeGuard, OversizeReason, STATE_OMITTED_ESTIMATED,
	STATE_OMITTED_REJECTED,
};
pub use interceptor::report_interceptor;
pub use ledger::{merge_by_timestamp, BreadcrumbLedger};
pub use middleware::{CrashMiddleware, StoreContext};
pub use options::{
	CrashMiddlewareOptions, DEFAULT_BREADCRUMB_CATEGORY, DEFAULT_MAX_BREADCRUMBS,
	DEFAULT_OVERSIZE_THRESHOLD,
};
pub use store::{Dispatch, Middleware, Reducer, StateAccessor, Store};
pub use tracker::{ContextTracker, ReportExtra, LAST_ACTION_KEY, STATE_KEY};
