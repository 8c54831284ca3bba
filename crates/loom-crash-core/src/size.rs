// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Serialized size estimation for report payloads.

use serde::Serialize;

use crate::error::{CrashError, Result};

/// Returns the number of bytes `value` occupies when serialized as JSON.
pub fn estimated_size<T: Serialize + ?Sized>(value: &T) -> Result<usize> {
	Ok(serde_json::to_vec(value)?.len())
}

/// Fails with [`CrashError::PayloadTooLarge`] if `value` serializes to more
/// than `max` bytes, otherwise returns the measured size.
pub fn exceeds<T: Serialize + ?Sized>(value: &T, max: usize) -> Result<usize> {
	let size = estimated_size(value)?;
	if size > max {
		return Err(CrashError::PayloadTooLarge { size, max });
	}
	Ok(size)
}
