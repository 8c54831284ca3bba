// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Crash event (report payload) types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::breadcrumb::{Breadcrumb, BreadcrumbLevel};
use crate::context::UserContext;

/// Unique identifier for a crash event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CrashEventId(pub Uuid);

impl CrashEventId {
	pub fn new() -> Self {
		Self(Uuid::now_v7())
	}
}

impl Default for CrashEventId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for CrashEventId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for CrashEventId {
	type Err = uuid::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self(Uuid::parse_str(s)?))
	}
}

/// A single report as it travels from a capture call, through the event
/// processors, to the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrashEvent {
	pub id: CrashEventId,

	/// Error information. Messages use the level name as the type.
	pub exception_type: String,
	pub exception_value: String,
	pub level: BreadcrumbLevel,

	/// Environment context
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub release: Option<String>,
	pub environment: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub server_name: Option<String>,

	/// Custom context
	#[serde(default)]
	pub tags: HashMap<String, String>,
	#[serde(default)]
	pub extra: serde_json::Map<String, serde_json::Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub user_context: Option<UserContext>,

	/// Breadcrumbs (events leading up to the report), oldest first.
	#[serde(default)]
	pub breadcrumbs: Vec<Breadcrumb>,

	pub timestamp: DateTime<Utc>,
}

impl CrashEvent {
	/// Creates an error-level event for an exception.
	pub fn exception(exception_type: impl Into<String>, exception_value: impl Into<String>) -> Self {
		Self {
			exception_type: exception_type.into(),
			exception_value: exception_value.into(),
			..Default::default()
		}
	}

	/// Creates an error-level event from any error, typed by its Rust type name.
	pub fn from_error<E>(error: &E) -> Self
	where
		E: std::error::Error + ?Sized,
	{
		Self::exception(std::any::type_name::<E>(), error.to_string())
	}

	/// Creates an event for a plain message at the given level.
	pub fn message(message: impl Into<String>, level: BreadcrumbLevel) -> Self {
		Self {
			exception_type: level.to_string(),
			exception_value: message.into(),
			level,
			..Default::default()
		}
	}

	/// Attaches an explicit extra value. Explicit extras take precedence
	/// over anything derived by event processors.
	pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
		self.extra.insert(key.into(), value);
		self
	}

	pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.tags.insert(key.into(), value.into());
		self
	}

	pub fn with_user(mut self, user: UserContext) -> Self {
		self.user_context = Some(user);
		self
	}

	/// Key used to detect back-to-back duplicate reports.
	pub fn dedupe_key(&self) -> String {
		format!("{}\u{1f}{}", self.exception_type, self.exception_value)
	}
}

impl Default for CrashEvent {
	fn default() -> Self {
		Self {
			id: CrashEventId::new(),
			exception_type: String::new(),
			exception_value: String::new(),
			level: BreadcrumbLevel::Error,
			release: None,
			environment: "production".to_string(),
			server_name: None,
			tags: HashMap::new(),
			extra: serde_json::Map::new(),
			user_context: None,
			breadcrumbs: Vec::new(),
			timestamp: Utc::now(),
		}
	}
}
