// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The action contract understood by the crash middleware.

use serde::Serialize;

/// A dispatched action.
///
/// Actions are reported as-is (serialized) unless an action transformer is
/// configured; the type tag becomes the default breadcrumb message.
pub trait Action: Serialize + Clone + Send + Sync + 'static {
	/// Short tag naming what the action does, e.g. `"INCREMENT"`.
	fn action_type(&self) -> &str;
}

/// Untyped actions carry their tag in a `"type"` field.
impl Action for serde_json::Value {
	fn action_type(&self) -> &str {
		self.get("type").and_then(serde_json::Value::as_str).unwrap_or_default()
	}
}
