// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Crash client for capturing and reporting errors.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use loom_crash_core::{Breadcrumb, BreadcrumbLevel, CrashEvent, UserContext};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{CrashSdkError, Result};
use crate::processor::EventProcessor;
use crate::transport::{CaptureResponse, HttpTransport, Transport};

/// Maximum number of breadcrumbs to keep.
const MAX_BREADCRUMBS: usize = 100;

/// Process-unique identity of a client instance.
///
/// Clones of a [`CrashClient`] share the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(Uuid);

impl ClientId {
	fn new() -> Self {
		Self(Uuid::now_v7())
	}
}

impl fmt::Display for ClientId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Configuration for the crash client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
	/// Timeout for HTTP requests.
	pub request_timeout: Duration,
	/// Maximum breadcrumbs to keep, and to send with a single event.
	pub max_breadcrumbs: usize,
	/// Whether a report identical to the previous one is sent again.
	pub allow_duplicates: bool,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			request_timeout: Duration::from_secs(30),
			max_breadcrumbs: MAX_BREADCRUMBS,
			allow_duplicates: false,
		}
	}
}

/// Transport decorator applied to a single capture.
pub type TransportLayer = Arc<dyn Fn(Arc<dyn Transport>) -> Arc<dyn Transport> + Send + Sync>;

/// Adjustments that apply to one capture call only.
///
/// The client's installed processor, transport and duplicate setting are
/// left untouched, so overlapping captures never see each other's overrides.
#[derive(Clone, Default)]
pub struct CaptureOverrides {
	/// Runs after the installed processor, if that one kept the event.
	pub post_processor: Option<EventProcessor>,
	/// Wraps the installed transport for this call.
	pub transport_layer: Option<TransportLayer>,
	/// Replaces the client's duplicate setting for this call.
	pub allow_duplicates: Option<bool>,
}

/// Builder for constructing a CrashClient.
pub struct CrashClientBuilder {
	auth_token: Option<String>,
	base_url: Option<String>,
	project_id: Option<String>,
	release: Option<String>,
	environment: Option<String>,
	server_name: Option<String>,
	config: ClientConfig,
	transport: Option<Arc<dyn Transport>>,
}

impl CrashClientBuilder {
	/// Creates a new builder with default settings.
	pub fn new() -> Self {
		Self {
			auth_token: None,
			base_url: None,
			project_id: None,
			release: None,
			environment: None,
			server_name: None,
			config: ClientConfig::default(),
			transport: None,
		}
	}

	/// Sets the authentication token (user bearer token).
	pub fn auth_token(mut self, token: impl Into<String>) -> Self {
		self.auth_token = Some(token.into());
		self
	}

	/// Sets the base URL for the Loom server.
	///
	/// Example: `https://loom.ghuntley.com`
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = Some(url.into());
		self
	}

	/// Sets the project ID for crash events.
	pub fn project_id(mut self, id: impl Into<String>) -> Self {
		self.project_id = Some(id.into());
		self
	}

	/// Sets the release version.
	///
	/// Example: `1.2.3` or `git commit SHA`
	pub fn release(mut self, release: impl Into<String>) -> Self {
		self.release = Some(release.into());
		self
	}

	/// Sets the environment name.
	///
	/// Example: `production`, `staging`, `development`
	pub fn environment(mut self, env: impl Into<String>) -> Self {
		self.environment = Some(env.into());
		self
	}

	/// Sets the server name for identification.
	pub fn server_name(mut self, name: impl Into<String>) -> Self {
		self.server_name = Some(name.into());
		self
	}

	/// Sets the HTTP request timeout.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.config.request_timeout = timeout;
		self
	}

	/// Sets the maximum number of breadcrumbs to keep.
	pub fn max_breadcrumbs(mut self, max: usize) -> Self {
		self.config.max_breadcrumbs = max;
		self
	}

	/// Sends reports even when they repeat the previous one.
	pub fn allow_duplicates(mut self, allow: bool) -> Self {
		self.config.allow_duplicates = allow;
		self
	}

	/// Replaces the HTTP transport.
	///
	/// When a transport is supplied, the auth token, base URL and project ID
	/// are not required.
	pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
		self.transport = Some(transport);
		self
	}

	/// Builds the CrashClient.
	pub fn build(self) -> Result<CrashClient> {
		let transport: Arc<dyn Transport> = match self.transport {
			Some(transport) => transport,
			None => {
				let auth_token = self.auth_token.ok_or(CrashSdkError::InvalidApiKey)?;
				let base_url = self.base_url.ok_or(CrashSdkError::InvalidBaseUrl)?;
				let project_id = self.project_id.ok_or(CrashSdkError::MissingProjectId)?;
				Arc::new(HttpTransport::new(
					base_url,
					auth_token,
					project_id,
					self.config.request_timeout,
				)?)
			}
		};

		let environment = self.environment.unwrap_or_else(|| "production".to_string());
		let id = ClientId::new();

		let inner = Arc::new(CrashClientInner {
			id,
			release: self.release,
			environment,
			server_name: self.server_name,
			allow_duplicates: AtomicBool::new(self.config.allow_duplicates),
			config: self.config,
			tags: RwLock::new(HashMap::new()),
			extra: RwLock::new(serde_json::Map::new()),
			user_context: RwLock::new(None),
			breadcrumbs: RwLock::new(Vec::new()),
			processor: parking_lot::RwLock::new(None),
			transport: parking_lot::RwLock::new(transport),
			last_dedupe_key: parking_lot::Mutex::new(None),
			closed: AtomicBool::new(false),
		});

		info!(client_id = %id, "Crash client initialized");

		Ok(CrashClient { inner })
	}
}

impl Default for CrashClientBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Internal client state.
struct CrashClientInner {
	id: ClientId,
	release: Option<String>,
	environment: String,
	server_name: Option<String>,
	config: ClientConfig,
	tags: RwLock<HashMap<String, String>>,
	extra: RwLock<serde_json::Map<String, serde_json::Value>>,
	user_context: RwLock<Option<UserContext>>,
	breadcrumbs: RwLock<Vec<Breadcrumb>>,
	// Hook slots are read from synchronous code (middleware attach, drop
	// guards), so they use blocking locks that are never held across an await.
	processor: parking_lot::RwLock<Option<EventProcessor>>,
	transport: parking_lot::RwLock<Arc<dyn Transport>>,
	allow_duplicates: AtomicBool,
	last_dedupe_key: parking_lot::Mutex<Option<String>>,
	closed: AtomicBool,
}

/// Client for capturing crash events and reporting them to Loom.
///
/// # Example
///
/// ```ignore
/// use loom_crash::CrashClient;
///
/// let client = CrashClient::builder()
///     .auth_token("your_auth_token")
///     .base_url("https://loom.ghuntley.com")
///     .project_id("proj_xxx")
///     .release(env!("CARGO_PKG_VERSION"))
///     .environment("production")
///     .build()?;
///
/// client.add_breadcrumb(Breadcrumb::new("http").with_message("GET /api/users")).await;
///
/// if let Err(e) = do_something() {
///     client.capture_error(&e).await?;
/// }
///
/// client.shutdown().await?;
/// ```
#[derive(Clone)]
pub struct CrashClient {
	inner: Arc<CrashClientInner>,
}

impl CrashClient {
	/// Creates a new builder for constructing a CrashClient.
	pub fn builder() -> CrashClientBuilder {
		CrashClientBuilder::new()
	}

	/// Identity shared by all clones of this client.
	pub fn id(&self) -> ClientId {
		self.inner.id
	}

	pub fn config(&self) -> &ClientConfig {
		&self.inner.config
	}

	/// Captures an error and sends it to the crash analytics server.
	pub async fn capture_error<E>(&self, error: &E) -> Result<CaptureResponse>
	where
		E: std::error::Error + ?Sized,
	{
		self.capture_event(CrashEvent::from_error(error)).await
	}

	/// Captures an exception with custom type and message.
	pub async fn capture_exception(
		&self,
		exception_type: &str,
		exception_value: &str,
	) -> Result<CaptureResponse> {
		self.capture_event(CrashEvent::exception(exception_type, exception_value))
			.await
	}

	/// Captures a message (not an error) as a crash event.
	pub async fn capture_message(
		&self,
		message: &str,
		level: BreadcrumbLevel,
	) -> Result<CaptureResponse> {
		self.capture_event(CrashEvent::message(message, level)).await
	}

	/// Captures a caller-built event.
	///
	/// Client-wide tags, extras, user and breadcrumbs are merged in (values
	/// already on the event win), the event processor runs, duplicates are
	/// suppressed, and the result is handed to the transport.
	pub async fn capture_event(&self, event: CrashEvent) -> Result<CaptureResponse> {
		self.capture_event_with(event, CaptureOverrides::default())
			.await
	}

	/// Like [`capture_event`](Self::capture_event), with `overrides` applied
	/// to this call only.
	pub async fn capture_event_with(
		&self,
		event: CrashEvent,
		overrides: CaptureOverrides,
	) -> Result<CaptureResponse> {
		self.check_closed()?;

		let mut event = self.apply_scope(event).await;

		let processor = self.inner.processor.read().clone();
		let processors = processor.iter().chain(overrides.post_processor.iter());
		for processor in processors {
			event = match processor(event) {
				Some(event) => event,
				None => {
					debug!(client_id = %self.inner.id, "Event dropped by processor");
					return Err(CrashSdkError::EventDropped);
				}
			};
		}

		let max = self.inner.config.max_breadcrumbs;
		if event.breadcrumbs.len() > max {
			let excess = event.breadcrumbs.len() - max;
			event.breadcrumbs.drain(..excess);
		}

		let allow_duplicates = overrides
			.allow_duplicates
			.unwrap_or_else(|| self.inner.allow_duplicates.load(Ordering::SeqCst));
		if !allow_duplicates {
			let key = event.dedupe_key();
			let mut last = self.inner.last_dedupe_key.lock();
			if last.as_deref() == Some(key.as_str()) {
				warn!(
					exception_type = %event.exception_type,
					"Suppressed duplicate crash event"
				);
				return Err(CrashSdkError::DuplicateEvent);
			}
			*last = Some(key);
		}

		let mut transport = self.inner.transport.read().clone();
		if let Some(layer) = &overrides.transport_layer {
			transport = layer(transport);
		}
		debug!(event_id = %event.id, breadcrumbs = event.breadcrumbs.len(), "Dispatching crash event");
		transport.send(&event).await
	}

	async fn apply_scope(&self, mut event: CrashEvent) -> CrashEvent {
		event.environment = self.inner.environment.clone();
		if event.release.is_none() {
			event.release = self.inner.release.clone();
		}
		if event.server_name.is_none() {
			event.server_name = self.inner.server_name.clone();
		}

		let mut tags = self.inner.tags.read().await.clone();
		tags.extend(event.tags);
		event.tags = tags;

		let mut extra = self.inner.extra.read().await.clone();
		extra.extend(event.extra);
		event.extra = extra;

		if event.user_context.is_none() {
			event.user_context = self.inner.user_context.read().await.clone();
		}

		let mut breadcrumbs = self.inner.breadcrumbs.read().await.clone();
		breadcrumbs.append(&mut event.breadcrumbs);
		// Stable, so entries with equal timestamps keep client-then-caller order.
		breadcrumbs.sort_by_key(|b| b.timestamp);
		event.breadcrumbs = breadcrumbs;

		event
	}

	/// Installs `processor` in the client's single processor slot and
	/// returns whatever was installed before.
	pub fn set_event_processor(&self, processor: Option<EventProcessor>) -> Option<EventProcessor> {
		std::mem::replace(&mut *self.inner.processor.write(), processor)
	}

	/// Returns the currently installed processor.
	pub fn event_processor(&self) -> Option<EventProcessor> {
		self.inner.processor.read().clone()
	}

	/// Replaces the transport and returns the previous one.
	pub fn set_transport(&self, transport: Arc<dyn Transport>) -> Arc<dyn Transport> {
		std::mem::replace(&mut *self.inner.transport.write(), transport)
	}

	pub fn transport(&self) -> Arc<dyn Transport> {
		self.inner.transport.read().clone()
	}

	/// Enables or disables duplicate suppression, returning the old setting.
	pub fn set_allow_duplicates(&self, allow: bool) -> bool {
		self.inner.allow_duplicates.swap(allow, Ordering::SeqCst)
	}

	pub fn allow_duplicates(&self) -> bool {
		self.inner.allow_duplicates.load(Ordering::SeqCst)
	}

	/// Sets a global tag that will be attached to all crash events.
	pub async fn set_tag(&self, key: impl Into<String>, value: impl Into<String>) {
		self.inner.tags.write().await.insert(key.into(), value.into());
	}

	/// Removes a global tag.
	pub async fn remove_tag(&self, key: &str) {
		self.inner.tags.write().await.remove(key);
	}

	/// Sets global extra data that will be attached to all crash events.
	pub async fn set_extra(&self, key: impl Into<String>, value: serde_json::Value) {
		self.inner.extra.write().await.insert(key.into(), value);
	}

	/// Sets the user context.
	pub async fn set_user(&self, user: UserContext) {
		*self.inner.user_context.write().await = Some(user);
	}

	/// Clears the user context.
	pub async fn clear_user(&self) {
		*self.inner.user_context.write().await = None;
	}

	/// Adds a breadcrumb to the trail.
	pub async fn add_breadcrumb(&self, breadcrumb: Breadcrumb) {
		let mut breadcrumbs = self.inner.breadcrumbs.write().await;
		breadcrumbs.push(breadcrumb);

		// Trim to max size
		while breadcrumbs.len() > self.inner.config.max_breadcrumbs {
			breadcrumbs.remove(0);
		}
	}

	/// Returns a copy of the client-held breadcrumbs.
	pub async fn breadcrumbs(&self) -> Vec<Breadcrumb> {
		self.inner.breadcrumbs.read().await.clone()
	}

	/// Clears all breadcrumbs.
	pub async fn clear_breadcrumbs(&self) {
		self.inner.breadcrumbs.write().await.clear();
	}

	/// Shuts down the client. Further captures fail with
	/// [`CrashSdkError::ClientShutdown`].
	pub async fn shutdown(&self) -> Result<()> {
		if self.inner.closed.swap(true, Ordering::SeqCst) {
			return Ok(());
		}

		info!(client_id = %self.inner.id, "Crash client shutdown");
		Ok(())
	}

	/// Returns true if the client has been shut down.
	pub fn is_closed(&self) -> bool {
		self.inner.closed.load(Ordering::SeqCst)
	}

	fn check_closed(&self) -> Result<()> {
		if self.inner.closed.load(Ordering::SeqCst) {
			return Err(CrashSdkError::ClientShutdown);
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::processor::{chained, processor};
	use async_trait::async_trait;

	#[derive(Default)]
	struct RecordingTransport {
		sent: parking_lot::Mutex<Vec<CrashEvent>>,
	}

	#[async_trait]
	impl Transport for RecordingTransport {
		async fn send(&self, event: &CrashEvent) -> Result<CaptureResponse> {
			self.sent.lock().push(event.clone());
			Ok(CaptureResponse {
				event_id: event.id.to_string(),
				issue_id: "iss_1".to_string(),
				short_id: "PROJ-1".to_string(),
				is_new_issue: true,
				is_regression: false,
			})
		}
	}

	fn recording_client() -> (CrashClient, Arc<RecordingTransport>) {
		let transport = Arc::new(RecordingTransport::default());
		let client = CrashClient::builder()
			.transport(transport.clone())
			.build()
			.unwrap();
		(client, transport)
	}

	#[test]
	fn test_builder_requires_auth_token() {
		let result = CrashClientBuilder::new()
			.base_url("https://example.com")
			.project_id("proj_123")
			.build();

		assert!(matches!(result, Err(CrashSdkError::InvalidApiKey)));
	}

	#[test]
	fn test_builder_requires_base_url() {
		let result = CrashClientBuilder::new()
			.auth_token("token_123")
			.project_id("proj_123")
			.build();

		assert!(matches!(result, Err(CrashSdkError::InvalidBaseUrl)));
	}

	#[test]
	fn test_builder_requires_project_id() {
		let result = CrashClientBuilder::new()
			.auth_token("token_123")
			.base_url("https://example.com")
			.build();

		assert!(matches!(result, Err(CrashSdkError::MissingProjectId)));
	}

	#[test]
	fn test_builder_success() {
		let result = CrashClientBuilder::new()
			.auth_token("token_123")
			.base_url("https://example.com")
			.project_id("proj_123")
			.build();

		assert!(result.is_ok());
	}

	#[test]
	fn test_custom_transport_needs_no_credentials() {
		let (client, _) = recording_client();
		assert!(!client.is_closed());
	}

	#[test]
	fn test_client_config_defaults() {
		let config = ClientConfig::default();
		assert_eq!(config.request_timeout, Duration::from_secs(30));
		assert_eq!(config.max_breadcrumbs, MAX_BREADCRUMBS);
		assert!(!config.allow_duplicates);
	}

	#[test]
	fn test_clones_share_identity() {
		let (client, _) = recording_client();
		let (other, _) = recording_client();
		assert_eq!(client.id(), client.clone().id());
		assert_ne!(client.id(), other.id());
	}

	#[tokio::test]
	async fn test_shutdown_prevents_capture() {
		let (client, _) = recording_client();

		client.shutdown().await.unwrap();

		let result = client
			.capture_message("test", BreadcrumbLevel::Error)
			.await;
		assert!(matches!(result, Err(CrashSdkError::ClientShutdown)));
	}

	#[tokio::test]
	async fn test_double_shutdown_is_ok() {
		let (client, _) = recording_client();

		client.shutdown().await.unwrap();
		client.shutdown().await.unwrap();
	}

	#[tokio::test]
	async fn test_set_and_remove_tag() {
		let (client, _) = recording_client();

		client.set_tag("env", "test").await;
		assert!(client.inner.tags.read().await.contains_key("env"));

		client.remove_tag("env").await;
		assert!(!client.inner.tags.read().await.contains_key("env"));
	}

	#[tokio::test]
	async fn test_breadcrumb_limit() {
		let transport = Arc::new(RecordingTransport::default());
		let client = CrashClient::builder()
			.transport(transport)
			.max_breadcrumbs(5)
			.build()
			.unwrap();

		// Add more than the limit
		for i in 0..10 {
			client
				.add_breadcrumb(Breadcrumb::new(format!("test_{}", i)))
				.await;
		}

		let breadcrumbs = client.breadcrumbs().await;
		assert_eq!(breadcrumbs.len(), 5);
		// Should keep the most recent ones
		assert_eq!(breadcrumbs[0].category, "test_5");
	}

	#[tokio::test]
	async fn test_scope_merges_into_event() {
		let (client, transport) = recording_client();
		client.set_tag("server", "web-01").await;
		client.set_extra("anotherValue", serde_json::json!(10)).await;
		client.set_extra("state", serde_json::json!("global")).await;
		client.set_user(UserContext::with_id("user_1")).await;
		client.add_breadcrumb(Breadcrumb::new("startup")).await;

		client
			.capture_event(CrashEvent::exception("Error", "boom").with_extra("state", "explicit".into()))
			.await
			.unwrap();

		let sent = transport.sent.lock();
		let event = &sent[0];
		assert_eq!(event.tags["server"], "web-01");
		assert_eq!(event.extra["anotherValue"], 10);
		assert_eq!(event.extra["state"], "explicit");
		assert_eq!(event.user_context.as_ref().unwrap().id.as_deref(), Some("user_1"));
		assert_eq!(event.breadcrumbs.len(), 1);
	}

	#[tokio::test]
	async fn test_processor_runs_before_transport() {
		let (client, transport) = recording_client();
		let previous = client.set_event_processor(Some(processor(|event| {
			Some(event.with_tag("processed", "yes"))
		})));
		assert!(previous.is_none());

		client.capture_exception("Error", "boom").await.unwrap();
		assert_eq!(transport.sent.lock()[0].tags["processed"], "yes");
	}

	#[tokio::test]
	async fn test_set_event_processor_returns_previous_for_chaining() {
		let (client, transport) = recording_client();
		client.set_event_processor(Some(processor(|event| Some(event.with_tag("first", "1")))));
		let previous = client.set_event_processor(None);
		client.set_event_processor(Some(chained(previous, |event| {
			Some(event.with_tag("second", "2"))
		})));

		client.capture_exception("Error", "boom").await.unwrap();
		let sent = transport.sent.lock();
		assert_eq!(sent[0].tags["first"], "1");
		assert_eq!(sent[0].tags["second"], "2");
	}

	#[tokio::test]
	async fn test_dropped_event_is_not_sent() {
		let (client, transport) = recording_client();
		client.set_event_processor(Some(processor(|_| None)));

		let result = client.capture_exception("Error", "boom").await;
		assert!(matches!(result, Err(CrashSdkError::EventDropped)));
		assert!(transport.sent.lock().is_empty());
	}

	#[tokio::test]
	async fn test_duplicates_are_suppressed_by_default() {
		let (client, transport) = recording_client();

		client.capture_exception("Error", "boom").await.unwrap();
		let second = client.capture_exception("Error", "boom").await;
		assert!(matches!(second, Err(CrashSdkError::DuplicateEvent)));

		assert!(!client.set_allow_duplicates(true));
		client.capture_exception("Error", "boom").await.unwrap();
		assert_eq!(transport.sent.lock().len(), 2);
	}

	#[tokio::test]
	async fn test_event_breadcrumbs_are_capped() {
		let transport = Arc::new(RecordingTransport::default());
		let client = CrashClient::builder()
			.transport(transport.clone())
			.max_breadcrumbs(3)
			.build()
			.unwrap();
		client.set_event_processor(Some(processor(|mut event| {
			for i in 0..5 {
				event.breadcrumbs.push(Breadcrumb::new(format!("crumb_{i}")));
			}
			Some(event)
		})));

		client.capture_exception("Error", "boom").await.unwrap();
		let sent = transport.sent.lock();
		let categories: Vec<_> = sent[0].breadcrumbs.iter().map(|b| b.category.as_str()).collect();
		assert_eq!(categories, vec!["crumb_2", "crumb_3", "crumb_4"]);
	}

	#[tokio::test]
	async fn test_scope_breadcrumbs_sorted_by_time() {
		let (client, transport) = recording_client();
		let base = chrono::Utc::now();
		client
			.add_breadcrumb(Breadcrumb::new("client").at(base + chrono::Duration::seconds(5)))
			.await;

		let mut event = CrashEvent::exception("Error", "boom");
		event.breadcrumbs.push(Breadcrumb::new("caller").at(base + chrono::Duration::seconds(1)));
		client.capture_event(event).await.unwrap();

		let sent = transport.sent.lock();
		let categories: Vec<_> = sent[0].breadcrumbs.iter().map(|b| b.category.as_str()).collect();
		assert_eq!(categories, vec!["caller", "client"]);
	}

	#[tokio::test]
	async fn test_overrides_apply_to_one_call_only() {
		let (client, first) = recording_client();
		let installed = processor(|event| Some(event.with_tag("installed", "yes")));
		client.set_event_processor(Some(Arc::clone(&installed)));

		let redirect = Arc::new(RecordingTransport::default());
		let layer_target = Arc::clone(&redirect);
		let overrides = CaptureOverrides {
			post_processor: Some(processor(|mut event| {
				assert_eq!(event.tags["installed"], "yes");
				event.breadcrumbs.clear();
				Some(event.with_tag("post", "yes"))
			})),
			transport_layer: Some(Arc::new(move |_: Arc<dyn Transport>| -> Arc<dyn Transport> {
				Arc::clone(&layer_target) as Arc<dyn Transport>
			})),
			allow_duplicates: Some(true),
		};

		client.capture_exception("Error", "boom").await.unwrap();
		client
			.capture_event_with(CrashEvent::exception("Error", "boom"), overrides)
			.await
			.unwrap();

		assert_eq!(first.sent.lock().len(), 1);
		assert_eq!(redirect.sent.lock()[0].tags["post"], "yes");
		assert!(Arc::ptr_eq(&client.event_processor().unwrap(), &installed));
		assert!(!client.allow_duplicates());

		// Back to the installed setup: the repeat is suppressed again.
		let again = client.capture_exception("Error", "boom").await;
		assert!(matches!(again, Err(CrashSdkError::DuplicateEvent)));
		assert!(first.sent.lock()[0].tags.get("post").is_none());
	}

	#[tokio::test]
	async fn test_set_transport_returns_previous() {
		let (client, first) = recording_client();
		let second = Arc::new(RecordingTransport::default());

		let previous = client.set_transport(second.clone());
		client.capture_exception("Error", "boom").await.unwrap();
		client.set_transport(previous);
		client.capture_exception("Error", "bang").await.unwrap();

		assert_eq!(second.sent.lock().len(), 1);
		assert_eq!(first.sent.lock().len(), 1);
	}
}
