// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the crash client.

use loom_crash_core::CrashError;
use thiserror::Error;

/// Result type alias for crash operations.
pub type Result<T> = std::result::Result<T, CrashSdkError>;

/// Errors that can occur in the crash client.
#[derive(Debug, Error)]
pub enum CrashSdkError {
	/// The client has been shut down.
	#[error("crash client has been shut down")]
	ClientShutdown,

	/// Invalid API key format.
	#[error("invalid API key format")]
	InvalidApiKey,

	/// Invalid base URL.
	#[error("invalid base URL")]
	InvalidBaseUrl,

	/// Missing required project ID.
	#[error("project ID is required")]
	MissingProjectId,

	/// HTTP request failed.
	#[error("HTTP request failed: {0}")]
	RequestFailed(#[from] reqwest::Error),

	/// Server returned an error.
	#[error("server error (status {status}): {message}")]
	ServerError {
		/// HTTP status code.
		status: u16,
		/// Error message from server.
		message: String,
	},

	/// Rate limited by server.
	#[error("rate limited, retry after {retry_after_secs:?} seconds")]
	RateLimited {
		/// Optional retry-after header value.
		retry_after_secs: Option<u64>,
	},

	/// The payload was refused locally before it reached the network.
	#[error("event payload too large: {size} bytes (max: {max})")]
	PayloadTooLarge {
		/// Estimated serialized size.
		size: usize,
		/// Configured limit.
		max: usize,
	},

	/// An event processor discarded the event.
	#[error("event dropped by event processor")]
	EventDropped,

	/// The event repeats the previous report and duplicates are not allowed.
	#[error("duplicate event suppressed")]
	DuplicateEvent,

	/// The payload could not be built.
	#[error("invalid payload: {0}")]
	InvalidPayload(String),

	/// Failed to serialize event.
	#[error("serialization error: {0}")]
	SerializationError(#[from] serde_json::Error),
}

impl From<CrashError> for CrashSdkError {
	fn from(err: CrashError) -> Self {
		match err {
			CrashError::PayloadTooLarge { size, max } => Self::PayloadTooLarge { size, max },
			CrashError::Serialization(e) => Self::SerializationError(e),
			other => Self::InvalidPayload(other.to_string()),
		}
	}
}

impl CrashSdkError {
	/// Returns true if the server refused the payload with HTTP 413.
	pub fn is_rejected_as_too_large(&self) -> bool {
		matches!(self, Self::ServerError { status: 413, .. })
	}
}
