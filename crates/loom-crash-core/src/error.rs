// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for crash payloads.

use thiserror::Error;

/// Errors raised while building or measuring crash payloads.
#[derive(Debug, Error)]
pub enum CrashError {
	#[error("invalid breadcrumb level: {0}")]
	InvalidBreadcrumbLevel(String),

	#[error("event payload too large: {size} bytes (max: {max})")]
	PayloadTooLarge { size: usize, max: usize },

	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

/// Result type for crash payload operations.
pub type Result<T> = std::result::Result<T, CrashError>;
