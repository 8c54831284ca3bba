// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Event processors: hooks that see every report right before transport.

use std::sync::Arc;

use loom_crash_core::CrashEvent;

/// A hook invoked with the assembled event immediately before it is sent.
///
/// Returning `None` drops the event. A client holds a single processor slot;
/// registrations that want to coexist take the previous processor and
/// delegate to it (see [`chained`]).
pub type EventProcessor = Arc<dyn Fn(CrashEvent) -> Option<CrashEvent> + Send + Sync>;

/// Wraps a closure as an [`EventProcessor`].
pub fn processor<F>(f: F) -> EventProcessor
where
	F: Fn(CrashEvent) -> Option<CrashEvent> + Send + Sync + 'static,
{
	Arc::new(f)
}

/// Builds a processor that runs `f` and then hands the result to `previous`.
///
/// Registrations made this way form a decorator chain: the most recently
/// registered processor runs first and every earlier one still runs.
pub fn chained<F>(previous: Option<EventProcessor>, f: F) -> EventProcessor
where
	F: Fn(CrashEvent) -> Option<CrashEvent> + Send + Sync + 'static,
{
	Arc::new(move |event: CrashEvent| -> Option<CrashEvent> {
		let event = f(event)?;
		match &previous {
			Some(previous) => previous(event),
			None => Some(event),
		}
	})
}
