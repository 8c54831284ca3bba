// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Last-action and current-state tracking.

use parking_lot::RwLock;
use serde::Serialize;

use crate::action::Action;
use crate::options::CrashMiddlewareOptions;
use crate::store::StateAccessor;

/// Report key holding the transformed last action.
pub const LAST_ACTION_KEY: &str = "lastAction";
/// Report key holding the transformed current state.
pub const STATE_KEY: &str = "state";

/// Store context derived for a single report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportExtra {
	/// Transformed last action, `null` if nothing was dispatched yet.
	pub last_action: serde_json::Value,
	/// Transformed current state.
	pub state: serde_json::Value,
}

impl ReportExtra {
	/// Fills in `lastAction` and `state` unless the caller already set them.
	pub fn merge_into(self, extra: &mut serde_json::Map<String, serde_json::Value>) {
		extra.entry(LAST_ACTION_KEY).or_insert(self.last_action);
		extra.entry(STATE_KEY).or_insert(self.state);
	}
}

/// Remembers the most recent action and knows how to read the current state.
///
/// The raw action is kept; transformers only run when a report is built.
pub struct ContextTracker<S, A> {
	last_action: RwLock<Option<A>>,
	get_state: StateAccessor<S>,
}

impl<S, A> ContextTracker<S, A>
where
	S: Serialize,
	A: Action,
{
	pub fn new(get_state: StateAccessor<S>) -> Self {
		Self {
			last_action: RwLock::new(None),
			get_state,
		}
	}

	/// Records `action` as the last action.
	pub fn on_dispatch(&self, action: &A) {
		*self.last_action.write() = Some(action.clone());
	}

	pub fn last_action(&self) -> Option<A> {
		self.last_action.read().clone()
	}

	/// Pulls the current state from the store.
	pub fn current_state(&self) -> S {
		(self.get_state)()
	}

	/// Derives report context from freshly pulled state.
	pub fn build_extra(&self, options: &CrashMiddlewareOptions<S, A>) -> ReportExtra {
		let state = self.current_state();
		self.build_extra_with_state(&state, options)
	}

	/// Derives report context from an already pulled `state`.
	pub fn build_extra_with_state(
		&self,
		state: &S,
		options: &CrashMiddlewareOptions<S, A>,
	) -> ReportExtra {
		// Clone out so no lock is held while user transformers run.
		let last_action = self.last_action();
		ReportExtra {
			last_action: last_action
				.as_ref()
				.map_or(serde_json::Value::Null, |action| options.transform_action(action)),
			state: options.transform_state(state),
		}
	}
}
