// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Delivery of assembled crash events.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use loom_crash_core::{Breadcrumb, CrashEvent, UserContext};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CrashSdkError, Result};

/// SDK version for identification.
const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");
/// SDK name for identification.
const SDK_NAME: &str = "loom-crash-rust";

/// Sends a fully processed event somewhere.
///
/// The client calls exactly one transport per report, after every event
/// processor has run. Implementations signal an oversized payload either
/// with [`CrashSdkError::PayloadTooLarge`] (refused locally) or with a
/// `ServerError` carrying status 413 (refused by the remote end).
#[async_trait]
pub trait Transport: Send + Sync {
	/// Deliver a single event.
	async fn send(&self, event: &CrashEvent) -> Result<CaptureResponse>;
}

/// Response from capture endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureResponse {
	/// Unique ID of the captured event.
	pub event_id: String,
	/// ID of the issue this event was grouped into.
	pub issue_id: String,
	/// Human-readable short ID (e.g., "PROJ-123").
	pub short_id: String,
	/// Whether this created a new issue.
	pub is_new_issue: bool,
	/// Whether this is a regression of a previously resolved issue.
	pub is_regression: bool,
}

/// Transport that posts events as JSON to a Loom server.
pub struct HttpTransport {
	http_client: Client,
	base_url: String,
	auth_token: String,
	project_id: String,
}

impl HttpTransport {
	/// Creates a transport for `{base_url}/api/crash/capture`.
	pub fn new(
		base_url: impl Into<String>,
		auth_token: impl Into<String>,
		project_id: impl Into<String>,
		request_timeout: Duration,
	) -> Result<Self> {
		let base_url = base_url.into().trim_end_matches('/').to_string();
		let http_client = Client::builder()
			.user_agent(format!("{SDK_NAME}/{SDK_VERSION}"))
			.timeout(request_timeout)
			.build()?;

		info!(base_url = %base_url, "HTTP crash transport initialized");

		Ok(Self {
			http_client,
			base_url,
			auth_token: auth_token.into(),
			project_id: project_id.into(),
		})
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}
}

#[async_trait]
impl Transport for HttpTransport {
	async fn send(&self, event: &CrashEvent) -> Result<CaptureResponse> {
		let url = format!("{}/api/crash/capture", self.base_url);
		let request = CaptureRequest::from_event(&self.project_id, event);

		debug!(url = %url, project_id = %request.project_id, "Sending crash event");

		let response = self
			.http_client
			.post(&url)
			.header("Authorization", format!("Bearer {}", self.auth_token))
			.json(&request)
			.send()
			.await?;

		if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
			let retry_after = response
				.headers()
				.get("Retry-After")
				.and_then(|v| v.to_str().ok())
				.and_then(|s| s.parse().ok());
			return Err(CrashSdkError::RateLimited {
				retry_after_secs: retry_after,
			});
		}

		if !response.status().is_success() {
			let status = response.status().as_u16();
			let message = response.text().await.unwrap_or_default();
			return Err(CrashSdkError::ServerError { status, message });
		}

		let capture_response: CaptureResponse = response.json().await?;

		info!(
			event_id = %capture_response.event_id,
			issue_id = %capture_response.issue_id,
			short_id = %capture_response.short_id,
			is_new_issue = capture_response.is_new_issue,
			"Crash event captured"
		);

		Ok(capture_response)
	}
}

/// Request payload for capturing a crash event.
#[derive(Debug, Serialize, Deserialize)]
struct CaptureRequest {
	project_id: String,
	event_id: String,
	exception_type: String,
	exception_value: String,
	level: String,
	environment: String,
	platform: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	release: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	server_name: Option<String>,
	#[serde(default)]
	tags: HashMap<String, String>,
	#[serde(default)]
	extra: serde_json::Map<String, serde_json::Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	user: Option<UserContext>,
	#[serde(default)]
	breadcrumbs: Vec<CaptureBreadcrumb>,
	timestamp: String,
}

impl CaptureRequest {
	fn from_event(project_id: &str, event: &CrashEvent) -> Self {
		let mut tags = event.tags.clone();
		tags.insert("sdk.name".to_string(), SDK_NAME.to_string());
		tags.insert("sdk.version".to_string(), SDK_VERSION.to_string());

		Self {
			project_id: project_id.to_string(),
			event_id: event.id.to_string(),
			exception_type: event.exception_type.clone(),
			exception_value: event.exception_value.clone(),
			level: event.level.to_string(),
			environment: event.environment.clone(),
			platform: "rust".to_string(),
			release: event.release.clone(),
			server_name: event.server_name.clone(),
			tags,
			extra: event.extra.clone(),
			user: event.user_context.clone(),
			breadcrumbs: event.breadcrumbs.iter().map(CaptureBreadcrumb::from_breadcrumb).collect(),
			timestamp: event.timestamp.to_rfc3339(),
		}
	}
}

/// Breadcrumb in capture request format.
#[derive(Debug, Serialize, Deserialize)]
struct CaptureBreadcrumb {
	timestamp: String,
	category: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	message: Option<String>,
	level: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	data: Option<serde_json::Value>,
}

impl CaptureBreadcrumb {
	fn from_breadcrumb(bc: &Breadcrumb) -> Self {
		Self {
			timestamp: bc.timestamp.to_rfc3339(),
			category: bc.category.clone(),
			message: bc.message.clone(),
			level: bc.level.to_string(),
			data: bc.data.clone(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use wiremock::matchers::{header, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	fn transport(server: &MockServer) -> HttpTransport {
		HttpTransport::new(server.uri(), "token_123", "proj_123", Duration::from_secs(5)).unwrap()
	}

	fn ok_body() -> serde_json::Value {
		serde_json::json!({
			"event_id": "evt_1",
			"issue_id": "iss_1",
			"short_id": "PROJ-1",
			"is_new_issue": true,
			"is_regression": false,
		})
	}

	#[test]
	fn capture_request_adds_sdk_tags() {
		let event = CrashEvent::exception("Error", "boom").with_tag("server", "web-01");
		let request = CaptureRequest::from_event("proj_123", &event);
		assert_eq!(request.tags["sdk.name"], SDK_NAME);
		assert_eq!(request.tags["server"], "web-01");
		assert_eq!(request.platform, "rust");
	}

	#[test]
	fn capture_request_omits_absent_breadcrumb_data() {
		let mut event = CrashEvent::exception("Error", "boom");
		event.breadcrumbs.push(Breadcrumb::new("redux-action").with_message("INCREMENT"));
		let json = serde_json::to_value(CaptureRequest::from_event("proj_123", &event)).unwrap();
		assert!(json["breadcrumbs"][0].get("data").is_none());
	}

	#[tokio::test]
	async fn successful_send_returns_capture_response() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/api/crash/capture"))
			.and(header("Authorization", "Bearer token_123"))
			.respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
			.expect(1)
			.mount(&server)
			.await;

		let response = transport(&server)
			.send(&CrashEvent::exception("Error", "boom"))
			.await
			.unwrap();
		assert_eq!(response.short_id, "PROJ-1");
		assert!(response.is_new_issue);
	}

	#[tokio::test]
	async fn status_413_maps_to_server_error() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/api/crash/capture"))
			.respond_with(ResponseTemplate::new(413).set_body_string("too large"))
			.mount(&server)
			.await;

		let err = transport(&server)
			.send(&CrashEvent::exception("Error", "boom"))
			.await
			.unwrap_err();
		assert!(err.is_rejected_as_too_large());
	}

	#[tokio::test]
	async fn status_429_maps_to_rate_limited() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/api/crash/capture"))
			.respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
			.mount(&server)
			.await;

		let err = transport(&server)
			.send(&CrashEvent::exception("Error", "boom"))
			.await
			.unwrap_err();
		assert!(matches!(
			err,
			CrashSdkError::RateLimited {
				retry_after_secs: Some(30)
			}
		));
	}

	#[test]
	fn base_url_is_normalized() {
		let transport =
			HttpTransport::new("https://example.com/", "t", "p", Duration::from_secs(1)).unwrap();
		assert_eq!(transport.base_url(), "https://example.com");
	}
}
