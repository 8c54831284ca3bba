// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use loom_crash::{CaptureResponse, CrashClient, CrashEvent, CrashSdkError, Transport};
use loom_crash_store::{Action, StoreError};
use parking_lot::Mutex;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CounterAction {
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub extra: Option<String>,
}

impl CounterAction {
	pub fn new(kind: &str) -> Self {
		Self {
			kind: kind.to_string(),
			extra: None,
		}
	}

	pub fn with_extra(kind: &str, extra: &str) -> Self {
		Self {
			kind: kind.to_string(),
			extra: Some(extra.to_string()),
		}
	}
}

impl Action for CounterAction {
	fn action_type(&self) -> &str {
		&self.kind
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CounterState {
	pub value: i64,
}

/// INCREMENT adds one, DOUBLE doubles, THROW fails, anything else is a no-op.
pub fn reducer(state: &CounterState, action: &CounterAction) -> Result<CounterState, StoreError> {
	match action.kind.as_str() {
		"INCREMENT" => Ok(CounterState {
			value: state.value + 1,
		}),
		"DOUBLE" => Ok(CounterState {
			value: state.value * 2,
		}),
		"THROW" => Err(StoreError::reducer("THROW", "Reducer error")),
		_ => Ok(state.clone()),
	}
}

/// How the scripted transport answers a send.
#[derive(Debug, Clone, Copy)]
pub enum Reply {
	Accept,
	Status(u16),
}

/// Transport that records every event it is handed and answers from a
/// script, accepting once the script runs out.
///
/// A yielding transport also gives the runtime `yields` chances to switch
/// tasks before answering, so joined captures interleave inside `send`.
/// Its `rejections` answer the first send of a matching exception value
/// with the given status, ahead of the script.
#[derive(Default)]
pub struct RecordingTransport {
	events: Mutex<Vec<CrashEvent>>,
	script: Mutex<VecDeque<Reply>>,
	rejections: Mutex<Vec<(String, u16)>>,
	yields: usize,
}

impl RecordingTransport {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn scripted(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
		Arc::new(Self {
			script: Mutex::new(replies.into_iter().collect()),
			..Default::default()
		})
	}

	pub fn yielding(
		yields: usize,
		rejections: impl IntoIterator<Item = (&'static str, u16)>,
	) -> Arc<Self> {
		Arc::new(Self {
			rejections: Mutex::new(
				rejections
					.into_iter()
					.map(|(value, status)| (value.to_string(), status))
					.collect(),
			),
			yields,
			..Default::default()
		})
	}

	pub fn events(&self) -> Vec<CrashEvent> {
		self.events.lock().clone()
	}

	/// Events whose exception value matches, in send order.
	pub fn events_for(&self, exception_value: &str) -> Vec<CrashEvent> {
		self.events
			.lock()
			.iter()
			.filter(|e| e.exception_value == exception_value)
			.cloned()
			.collect()
	}

	pub fn calls(&self) -> usize {
		self.events.lock().len()
	}

	pub fn last(&self) -> CrashEvent {
		self.events
			.lock()
			.last()
			.cloned()
			.expect("transport was never called")
	}

	fn next_reply(&self, event: &CrashEvent) -> Reply {
		let mut rejections = self.rejections.lock();
		if let Some(pos) = rejections
			.iter()
			.position(|(value, _)| *value == event.exception_value)
		{
			let (_, status) = rejections.remove(pos);
			return Reply::Status(status);
		}
		drop(rejections);
		self.script.lock().pop_front().unwrap_or(Reply::Accept)
	}
}

#[async_trait]
impl Transport for RecordingTransport {
	async fn send(&self, event: &CrashEvent) -> loom_crash::Result<CaptureResponse> {
		self.events.lock().push(event.clone());
		let reply = self.next_reply(event);
		for _ in 0..self.yields {
			tokio::task::yield_now().await;
		}
		match reply {
			Reply::Accept => Ok(CaptureResponse {
				event_id: event.id.to_string(),
				issue_id: "issue_1".to_string(),
				short_id: "LOOM-1".to_string(),
				is_new_issue: true,
				is_regression: false,
			}),
			Reply::Status(status) => Err(CrashSdkError::ServerError {
				status,
				message: "scripted failure".to_string(),
			}),
		}
	}
}

pub fn client_with(transport: Arc<RecordingTransport>) -> CrashClient {
	CrashClient::builder()
		.transport(transport)
		.allow_duplicates(true)
		.build()
		.unwrap()
}
