// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the dispatch pipeline.

use thiserror::Error;

/// Result type alias for dispatch operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised while dispatching an action.
///
/// The crash middleware never swallows these: they reach the `dispatch`
/// caller unchanged, after the failing action has been recorded.
#[derive(Debug, Error)]
pub enum StoreError {
	/// The reducer refused to produce a new state.
	#[error("reducer failed on {action_type}: {message}")]
	Reducer {
		/// Type tag of the action being reduced.
		action_type: String,
		/// Reducer-supplied description.
		message: String,
	},
}

impl StoreError {
	pub fn reducer(action_type: impl Into<String>, message: impl Into<String>) -> Self {
		Self::Reducer {
			action_type: action_type.into(),
			message: message.into(),
		}
	}
}
