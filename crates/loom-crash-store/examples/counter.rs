// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Example: a counter store whose failures are reported with store context.
//!
//! Run with:
//!   cargo run --example counter -p loom-crash-store
//!
//! Set LOOM_AUTH_TOKEN and LOOM_PROJECT_ID (and optionally LOOM_BASE_URL) to
//! send reports to a Loom server; otherwise reports are printed.

use std::sync::Arc;

use async_trait::async_trait;
use loom_crash::{Breadcrumb, CaptureResponse, CrashClient, CrashEvent, Transport};
use loom_crash_store::{
	Action, CrashMiddleware, CrashMiddlewareOptions, GuardedCapture, Middleware, Store,
	StoreError,
};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Serialize)]
struct CounterAction {
	#[serde(rename = "type")]
	kind: &'static str,
}

impl Action for CounterAction {
	fn action_type(&self) -> &str {
		self.kind
	}
}

#[derive(Debug, Clone, Default, Serialize)]
struct CounterState {
	value: i64,
	history: Vec<i64>,
}

fn reducer(state: &CounterState, action: &CounterAction) -> Result<CounterState, StoreError> {
	let value = match action.kind {
		"INCREMENT" => state.value + 1,
		"DOUBLE" => state.value * 2,
		"THROW" => return Err(StoreError::reducer(action.kind, "counter refused to throw")),
		_ => state.value,
	};
	let mut history = state.history.clone();
	history.push(value);
	Ok(CounterState { value, history })
}

/// Prints reports instead of sending them.
struct StdoutTransport;

#[async_trait]
impl Transport for StdoutTransport {
	async fn send(&self, event: &CrashEvent) -> loom_crash::Result<CaptureResponse> {
		println!("{}", serde_json::to_string_pretty(event)?);
		Ok(CaptureResponse {
			event_id: event.id.to_string(),
			issue_id: "local".to_string(),
			short_id: "LOCAL-1".to_string(),
			is_new_issue: true,
			is_regression: false,
		})
	}
}

fn client() -> loom_crash::Result<CrashClient> {
	let builder = CrashClient::builder()
		.release("0.1.0-example")
		.environment("development");

	match (std::env::var("LOOM_AUTH_TOKEN"), std::env::var("LOOM_PROJECT_ID")) {
		(Ok(token), Ok(project_id)) => {
			let base_url = std::env::var("LOOM_BASE_URL")
				.unwrap_or_else(|_| "https://loom.ghuntley.com".to_string());
			builder
				.auth_token(token)
				.base_url(base_url)
				.project_id(project_id)
				.build()
		}
		_ => builder.transport(Arc::new(StdoutTransport)).build(),
	}
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let client = client()?;
	client
		.add_breadcrumb(Breadcrumb::new("startup").with_message("Counter example started"))
		.await;

	let options = CrashMiddlewareOptions::new()
		.state_transformer(|state: &CounterState| {
			json!({ "value": state.value, "history_len": state.history.len() })
		})
		.filter_breadcrumb_actions(|action: &CounterAction| action.kind != "NOOP");
	let crash = CrashMiddleware::new(client.clone(), options);
	let guard = crash.guard();

	let layers: Vec<Arc<dyn Middleware<CounterState, CounterAction>>> = vec![Arc::new(crash)];
	let store = Store::with_middleware(CounterState::default(), reducer, layers);

	for kind in ["INCREMENT", "NOOP", "DOUBLE", "INCREMENT", "THROW"] {
		if let Err(e) = store.dispatch(CounterAction { kind }) {
			match guard.capture_error(&e).await? {
				GuardedCapture::Sent(response) => {
					println!("Reported {} as {}", e, response.short_id);
				}
				GuardedCapture::Degraded { reason, response } => {
					println!("Reported {} as {} without state ({:?})", e, response.short_id, reason);
				}
				GuardedCapture::Dropped { reason } => {
					println!("Could not report {} ({:?})", e, reason);
				}
			}
		}
	}

	client.shutdown().await?;
	Ok(())
}
