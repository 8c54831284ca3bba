// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the crash middleware.

use std::collections::HashMap;
use std::sync::Arc;

use loom_crash_core::{Breadcrumb, BreadcrumbLevel, UserContext};
use serde::Serialize;
use tracing::warn;

use crate::action::Action;

/// Default breadcrumb category for dispatched actions.
pub const DEFAULT_BREADCRUMB_CATEGORY: &str = "redux-action";
/// Default number of action breadcrumbs kept per store.
pub const DEFAULT_MAX_BREADCRUMBS: usize = 100;
/// Default serialized size above which a report is resent without state.
pub const DEFAULT_OVERSIZE_THRESHOLD: usize = 200_000;

type ActionFn<A, T> = Arc<dyn Fn(&A) -> T + Send + Sync>;
type StateFn<S, T> = Arc<dyn Fn(&S) -> T + Send + Sync>;

/// Options for [`CrashMiddleware`](crate::CrashMiddleware).
///
/// Every hook is optional. Unset transformers report the value serialized
/// as-is; unset user/tag derivations leave the client's values alone.
///
/// # Example
///
/// ```ignore
/// let options = CrashMiddlewareOptions::new()
///     .state_transformer(|state: &AppState| json!({ "items": state.items.len() }))
///     .filter_breadcrumb_actions(|action: &AppAction| action.action_type() != "TICK")
///     .get_user_context(|state| UserContext::with_id(state.user_id.clone()));
/// ```
pub struct CrashMiddlewareOptions<S, A> {
	pub(crate) breadcrumb_data_from_action: Option<ActionFn<A, serde_json::Value>>,
	pub(crate) breadcrumb_message_from_action: Option<ActionFn<A, String>>,
	pub(crate) action_transformer: Option<ActionFn<A, serde_json::Value>>,
	pub(crate) state_transformer: Option<StateFn<S, serde_json::Value>>,
	pub(crate) breadcrumb_category: String,
	pub(crate) filter_breadcrumb_actions: Option<ActionFn<A, bool>>,
	pub(crate) get_user_context: Option<StateFn<S, UserContext>>,
	pub(crate) get_tags: Option<StateFn<S, HashMap<String, String>>>,
	pub(crate) max_breadcrumbs: usize,
	pub(crate) oversize_threshold: usize,
}

impl<S, A> Default for CrashMiddlewareOptions<S, A> {
	fn default() -> Self {
		Self {
			breadcrumb_data_from_action: None,
			breadcrumb_message_from_action: None,
			action_transformer: None,
			state_transformer: None,
			breadcrumb_category: DEFAULT_BREADCRUMB_CATEGORY.to_string(),
			filter_breadcrumb_actions: None,
			get_user_context: None,
			get_tags: None,
			max_breadcrumbs: DEFAULT_MAX_BREADCRUMBS,
			oversize_threshold: DEFAULT_OVERSIZE_THRESHOLD,
		}
	}
}

impl<S, A> CrashMiddlewareOptions<S, A> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Attaches structured data to each action breadcrumb.
	pub fn breadcrumb_data_from_action<F>(mut self, f: F) -> Self
	where
		F: Fn(&A) -> serde_json::Value + Send + Sync + 'static,
	{
		self.breadcrumb_data_from_action = Some(Arc::new(f));
		self
	}

	/// Overrides the breadcrumb message (the action type by default).
	pub fn breadcrumb_message_from_action<F>(mut self, f: F) -> Self
	where
		F: Fn(&A) -> String + Send + Sync + 'static,
	{
		self.breadcrumb_message_from_action = Some(Arc::new(f));
		self
	}

	/// Transforms the last action before it is attached to a report.
	pub fn action_transformer<F>(mut self, f: F) -> Self
	where
		F: Fn(&A) -> serde_json::Value + Send + Sync + 'static,
	{
		self.action_transformer = Some(Arc::new(f));
		self
	}

	/// Transforms the current state before it is attached to a report.
	pub fn state_transformer<F>(mut self, f: F) -> Self
	where
		F: Fn(&S) -> serde_json::Value + Send + Sync + 'static,
	{
		self.state_transformer = Some(Arc::new(f));
		self
	}

	pub fn breadcrumb_category(mut self, category: impl Into<String>) -> Self {
		self.breadcrumb_category = category.into();
		self
	}

	/// Only actions for which `f` returns true leave a breadcrumb. Rejected
	/// actions are still tracked as the last action.
	pub fn filter_breadcrumb_actions<F>(mut self, f: F) -> Self
	where
		F: Fn(&A) -> bool + Send + Sync + 'static,
	{
		self.filter_breadcrumb_actions = Some(Arc::new(f));
		self
	}

	/// Derives the report's user from the current state.
	pub fn get_user_context<F>(mut self, f: F) -> Self
	where
		F: Fn(&S) -> UserContext + Send + Sync + 'static,
	{
		self.get_user_context = Some(Arc::new(f));
		self
	}

	/// Derives the report's tags from the current state.
	pub fn get_tags<F>(mut self, f: F) -> Self
	where
		F: Fn(&S) -> HashMap<String, String> + Send + Sync + 'static,
	{
		self.get_tags = Some(Arc::new(f));
		self
	}

	pub fn max_breadcrumbs(mut self, max: usize) -> Self {
		self.max_breadcrumbs = max;
		self
	}

	/// Serialized report size, in bytes, above which the report is resent
	/// without state and breadcrumbs.
	pub fn oversize_threshold(mut self, bytes: usize) -> Self {
		self.oversize_threshold = bytes;
		self
	}
}

impl<S, A> CrashMiddlewareOptions<S, A>
where
	S: Serialize,
	A: Action,
{
	pub(crate) fn accepts(&self, action: &A) -> bool {
		self.filter_breadcrumb_actions
			.as_ref()
			.map_or(true, |filter| filter(action))
	}

	pub(crate) fn breadcrumb_for(&self, action: &A) -> Breadcrumb {
		let message = match &self.breadcrumb_message_from_action {
			Some(f) => f(action),
			None => action.action_type().to_string(),
		};
		let mut crumb = Breadcrumb::new(self.breadcrumb_category.clone())
			.with_message(message)
			.with_level(BreadcrumbLevel::Info);
		if let Some(f) = &self.breadcrumb_data_from_action {
			crumb.data = Some(f(action));
		}
		crumb
	}

	pub(crate) fn transform_action(&self, action: &A) -> serde_json::Value {
		match &self.action_transformer {
			Some(f) => f(action),
			None => to_json(action, "action"),
		}
	}

	pub(crate) fn transform_state(&self, state: &S) -> serde_json::Value {
		match &self.state_transformer {
			Some(f) => f(state),
			None => to_json(state, "state"),
		}
	}
}

fn to_json<T: Serialize>(value: &T, what: &'static str) -> serde_json::Value {
	serde_json::to_value(value).unwrap_or_else(|e| {
		warn!(what, error = %e, "Failed to serialize value for crash report");
		serde_json::Value::Null
	})
}
