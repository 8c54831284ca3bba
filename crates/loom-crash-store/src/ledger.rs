// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bounded, time-ordered log of action breadcrumbs.

use std::collections::VecDeque;

use loom_crash_core::Breadcrumb;
use parking_lot::Mutex;

use crate::options::DEFAULT_MAX_BREADCRUMBS;

/// A capacity-bounded FIFO of breadcrumbs recorded by one store.
///
/// Entries are kept in arrival order with non-decreasing timestamps. When
/// the ledger is full the oldest entry is evicted to make room.
pub struct BreadcrumbLedger {
	entries: Mutex<VecDeque<Breadcrumb>>,
	capacity: usize,
}

impl BreadcrumbLedger {
	/// Create a ledger that keeps at most `capacity` breadcrumbs.
	pub fn new(capacity: usize) -> Self {
		Self {
			entries: Mutex::new(VecDeque::with_capacity(capacity)),
			capacity,
		}
	}

	pub fn with_default_capacity() -> Self {
		Self::new(DEFAULT_MAX_BREADCRUMBS)
	}

	/// Append a breadcrumb, evicting the oldest entry if over capacity.
	///
	/// A timestamp earlier than the newest entry's (wall clock stepped
	/// backwards) is raised to it so the ledger stays sorted.
	pub fn push(&self, mut breadcrumb: Breadcrumb) {
		if self.capacity == 0 {
			return;
		}

		let mut entries = self.entries.lock();
		if let Some(newest) = entries.back() {
			if breadcrumb.timestamp < newest.timestamp {
				breadcrumb.timestamp = newest.timestamp;
			}
		}
		entries.push_back(breadcrumb);
		while entries.len() > self.capacity {
			entries.pop_front();
		}
	}

	/// Current contents, oldest first.
	pub fn snapshot(&self) -> Vec<Breadcrumb> {
		self.entries.lock().iter().cloned().collect()
	}

	/// Merge the current contents with `foreign`, which must already be in
	/// timestamp order. The ledger itself is not modified.
	pub fn merge(&self, foreign: &[Breadcrumb]) -> Vec<Breadcrumb> {
		let ours = self.snapshot();
		merge_by_timestamp(&ours, foreign)
	}

	pub fn len(&self) -> usize {
		self.entries.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.lock().is_empty()
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}
}

/// Stable two-way merge of two timestamp-ordered sequences.
///
/// On equal timestamps the entry from `ours` comes first; each side keeps
/// its own relative order.
pub fn merge_by_timestamp(ours: &[Breadcrumb], foreign: &[Breadcrumb]) -> Vec<Breadcrumb> {
	let mut merged = Vec::with_capacity(ours.len() + foreign.len());
	let (mut i, mut j) = (0, 0);

	while i < ours.len() && j < foreign.len() {
		if ours[i].timestamp <= foreign[j].timestamp {
			merged.push(ours[i].clone());
			i += 1;
		} else {
			merged.push(foreign[j].clone());
			j += 1;
		}
	}
	merged.extend_from_slice(&ours[i..]);
	merged.extend_from_slice(&foreign[j..]);
	merged
}
