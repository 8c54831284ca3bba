// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The store middleware that feeds crash reports.

use std::sync::Arc;

use loom_crash::CrashClient;
use serde::Serialize;
use tracing::{debug, info};

use crate::action::Action;
use crate::guard::OversizeGuard;
use crate::interceptor::report_interceptor;
use crate::ledger::BreadcrumbLedger;
use crate::options::CrashMiddlewareOptions;
use crate::registry;
use crate::store::{Dispatch, Middleware, StateAccessor};
use crate::tracker::ContextTracker;

/// Per-store bookkeeping: the action ledger and the context tracker.
pub struct StoreContext<S, A> {
	ledger: BreadcrumbLedger,
	tracker: ContextTracker<S, A>,
	options: Arc<CrashMiddlewareOptions<S, A>>,
}

impl<S, A> StoreContext<S, A>
where
	S: Serialize,
	A: Action,
{
	pub fn new(get_state: StateAccessor<S>, options: Arc<CrashMiddlewareOptions<S, A>>) -> Self {
		Self {
			ledger: BreadcrumbLedger::new(options.max_breadcrumbs),
			tracker: ContextTracker::new(get_state),
			options,
		}
	}

	/// Records a dispatched action: always as the last action, and as a
	/// breadcrumb if the filter accepts it.
	pub fn record(&self, action: &A) {
		if self.options.accepts(action) {
			self.ledger.push(self.options.breadcrumb_for(action));
		}
		self.tracker.on_dispatch(action);
	}

	pub fn ledger(&self) -> &BreadcrumbLedger {
		&self.ledger
	}

	pub fn tracker(&self) -> &ContextTracker<S, A> {
		&self.tracker
	}

	pub fn options(&self) -> &CrashMiddlewareOptions<S, A> {
		&self.options
	}
}

/// Middleware that records every dispatched action and attaches the last
/// action, current state and action breadcrumbs to reports sent by `client`.
///
/// Only the first store attached to a given client is reported; later
/// stores keep their own bookkeeping but never reach the client.
///
/// # Example
///
/// ```ignore
/// let crash = CrashMiddleware::new(client.clone(), CrashMiddlewareOptions::new());
/// let guard = crash.guard();
/// let store = Store::with_middleware(CounterState::default(), reducer, vec![Arc::new(crash)]);
///
/// if let Err(e) = store.dispatch(CounterAction::new("INCREMENT")) {
///     guard.capture_error(&e).await?;
/// }
/// ```
pub struct CrashMiddleware<S, A> {
	client: CrashClient,
	options: Arc<CrashMiddlewareOptions<S, A>>,
}

impl<S, A> CrashMiddleware<S, A>
where
	S: Serialize + Send + Sync + 'static,
	A: Action,
{
	pub fn new(client: CrashClient, options: CrashMiddlewareOptions<S, A>) -> Self {
		Self {
			client,
			options: Arc::new(options),
		}
	}

	pub fn with_defaults(client: CrashClient) -> Self {
		Self::new(client, CrashMiddlewareOptions::new())
	}

	/// Creates the bookkeeping for one store and, if this is the first
	/// store seen for the client, installs the report interceptor in front
	/// of whatever processor the client already had.
	pub fn attach(&self, get_state: StateAccessor<S>) -> Arc<StoreContext<S, A>> {
		let context = Arc::new(StoreContext::new(get_state, Arc::clone(&self.options)));

		let client_id = self.client.id();
		if registry::try_attach(client_id) {
			let previous = self.client.event_processor();
			let chained = previous.is_some();
			self.client
				.set_event_processor(Some(report_interceptor(Arc::clone(&context), previous)));
			info!(client_id = %client_id, chained, "Store attached to crash client");
		} else {
			debug!(client_id = %client_id, "Crash client already reports another store");
		}

		context
	}

	/// Oversize guard for this middleware's client and threshold.
	pub fn guard(&self) -> OversizeGuard {
		OversizeGuard::new(self.client.clone(), self.options.oversize_threshold)
	}

	pub fn client(&self) -> &CrashClient {
		&self.client
	}
}

impl<S, A> Middleware<S, A> for CrashMiddleware<S, A>
where
	S: Serialize + Send + Sync + 'static,
	A: Action,
{
	fn wrap(&self, get_state: StateAccessor<S>, next: Dispatch<A>) -> Dispatch<A> {
		let context = self.attach(get_state);
		Arc::new(move |action: A| {
			// Recorded before forwarding so a failing reducer still shows up
			// as the last action.
			context.record(&action);
			next(action)
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::{json, Value};

	fn context(options: CrashMiddlewareOptions<Value, Value>) -> StoreContext<Value, Value> {
		StoreContext::new(Arc::new(|| json!(0)), Arc::new(options))
	}

	#[test]
	fn record_updates_tracker_and_ledger() {
		let ctx = context(CrashMiddlewareOptions::new());
		ctx.record(&json!({ "type": "INCREMENT" }));

		assert_eq!(ctx.ledger().len(), 1);
		assert_eq!(ctx.tracker().last_action(), Some(json!({ "type": "INCREMENT" })));
	}

	#[test]
	fn filtered_action_is_still_last_action() {
		let ctx = context(
			CrashMiddlewareOptions::new()
				.filter_breadcrumb_actions(|a: &Value| a.action_type() != "UNINTERESTING_ACTION"),
		);
		ctx.record(&json!({ "type": "INCREMENT" }));
		ctx.record(&json!({ "type": "UNINTERESTING_ACTION" }));

		assert_eq!(ctx.ledger().len(), 1);
		assert_eq!(
			ctx.tracker().last_action(),
			Some(json!({ "type": "UNINTERESTING_ACTION" }))
		);
	}

	#[test]
	fn ledger_uses_configured_capacity() {
		let ctx = context(CrashMiddlewareOptions::new().max_breadcrumbs(2));
		for _ in 0..5 {
			ctx.record(&json!({ "type": "INCREMENT" }));
		}
		assert_eq!(ctx.ledger().len(), 2);
		assert_eq!(ctx.ledger().capacity(), 2);
	}
}
