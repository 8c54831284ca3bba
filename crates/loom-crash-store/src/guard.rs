// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! One-shot downgrade-and-resend for reports that are too large to send.
//!
//! A guarded capture sends through a size-limiting layer in front of the
//! client's transport. If that layer refuses the payload, or the real
//! transport reports HTTP 413, the capture is run exactly once more with:
//!
//! - `extra.state` replaced by a fixed diagnostic string
//! - the breadcrumb list emptied
//! - duplicate suppression turned off, since the resend repeats the event
//!
//! All of this travels as [`CaptureOverrides`] on the guarded call itself.
//! The client's installed processor, transport and duplicate setting are
//! never touched, so unrelated or overlapping captures are unaffected.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use loom_crash::{
	CaptureOverrides, CaptureResponse, CrashClient, CrashSdkError, EventProcessor, Result,
	Transport, TransportLayer,
};
use loom_crash_core::{BreadcrumbLevel, CrashEvent};
use tracing::{debug, warn};

use crate::tracker::STATE_KEY;

/// State placeholder when the local size estimate exceeded the threshold.
pub const STATE_OMITTED_ESTIMATED: &str =
	"Could not send state because the report would exceed the size limit.";
/// State placeholder when the server refused the report as too large.
pub const STATE_OMITTED_REJECTED: &str =
	"Could not send state because the server rejected the report as too large.";

/// Why a report had to be downgraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OversizeReason {
	/// The local size estimate was over the threshold; nothing was sent.
	Estimated,
	/// The transport was used and the remote end answered 413.
	Rejected,
}

impl OversizeReason {
	/// Maps a capture error to an oversize reason, if it is one.
	pub fn classify(err: &CrashSdkError) -> Option<Self> {
		match err {
			CrashSdkError::PayloadTooLarge { .. } => Some(Self::Estimated),
			err if err.is_rejected_as_too_large() => Some(Self::Rejected),
			_ => None,
		}
	}

	pub fn diagnostic(self) -> &'static str {
		match self {
			Self::Estimated => STATE_OMITTED_ESTIMATED,
			Self::Rejected => STATE_OMITTED_REJECTED,
		}
	}
}

/// Outcome of a guarded capture. Oversize conditions end up here rather
/// than in the error channel.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardedCapture {
	/// The full report was accepted.
	Sent(CaptureResponse),
	/// The full report was too large; the stripped resend was accepted.
	Degraded {
		reason: OversizeReason,
		response: CaptureResponse,
	},
	/// The stripped resend was too large as well and was not retried.
	/// Nothing was delivered. `reason` describes the resend.
	Dropped { reason: OversizeReason },
}

impl GuardedCapture {
	/// Server response for whichever report was delivered.
	pub fn response(&self) -> Option<&CaptureResponse> {
		match self {
			Self::Sent(response) | Self::Degraded { response, .. } => Some(response),
			Self::Dropped { .. } => None,
		}
	}

	pub fn is_delivered(&self) -> bool {
		self.response().is_some()
	}
}

/// Wraps capture calls on a client with the oversize downgrade.
#[derive(Clone)]
pub struct OversizeGuard {
	client: CrashClient,
	threshold: usize,
}

impl OversizeGuard {
	pub fn new(client: CrashClient, threshold: usize) -> Self {
		Self { client, threshold }
	}

	pub fn threshold(&self) -> usize {
		self.threshold
	}

	pub async fn capture_error<E>(&self, error: &E) -> Result<GuardedCapture>
	where
		E: std::error::Error + ?Sized,
	{
		self.capture_event(CrashEvent::from_error(error)).await
	}

	pub async fn capture_exception(
		&self,
		exception_type: &str,
		exception_value: &str,
	) -> Result<GuardedCapture> {
		self.capture_event(CrashEvent::exception(exception_type, exception_value))
			.await
	}

	pub async fn capture_message(
		&self,
		message: &str,
		level: BreadcrumbLevel,
	) -> Result<GuardedCapture> {
		self.capture_event(CrashEvent::message(message, level)).await
	}

	pub async fn capture_event(&self, event: CrashEvent) -> Result<GuardedCapture> {
		let client = &self.client;
		self.capture(move |overrides| client.capture_event_with(event.clone(), overrides))
			.await
	}

	/// Runs `op` with the size limit applied, and once more in degraded
	/// mode if the report was too large.
	///
	/// Errors other than an oversize condition are returned untouched. An
	/// oversize condition on the resend is not retried; it is reported as
	/// [`GuardedCapture::Dropped`].
	pub async fn capture<F, Fut>(&self, op: F) -> Result<GuardedCapture>
	where
		F: Fn(CaptureOverrides) -> Fut,
		Fut: Future<Output = Result<CaptureResponse>>,
	{
		let limit = size_limit(self.threshold);

		let err = match op(CaptureOverrides {
			transport_layer: Some(Arc::clone(&limit)),
			..Default::default()
		})
		.await
		{
			Ok(response) => return Ok(GuardedCapture::Sent(response)),
			Err(err) => err,
		};
		let Some(reason) = OversizeReason::classify(&err) else {
			return Err(err);
		};

		warn!(
			client_id = %self.client.id(),
			?reason,
			threshold = self.threshold,
			error = %err,
			"Crash report too large, resending without state and breadcrumbs"
		);

		let degraded = CaptureOverrides {
			post_processor: Some(strip_processor(reason.diagnostic())),
			transport_layer: Some(limit),
			allow_duplicates: Some(true),
		};
		match op(degraded).await {
			Ok(response) => Ok(GuardedCapture::Degraded { reason, response }),
			Err(err) => match OversizeReason::classify(&err) {
				Some(reason) => {
					warn!(
						client_id = %self.client.id(),
						?reason,
						error = %err,
						"Degraded crash report still too large, dropping it"
					);
					Ok(GuardedCapture::Dropped { reason })
				}
				None => Err(err),
			},
		}
	}
}

/// Transport decorator that refuses payloads over the threshold.
struct SizeLimit {
	inner: Arc<dyn Transport>,
	threshold: usize,
}

#[async_trait]
impl Transport for SizeLimit {
	async fn send(&self, event: &CrashEvent) -> Result<CaptureResponse> {
		let size = loom_crash_core::exceeds(event, self.threshold)?;
		debug!(size, threshold = self.threshold, "Crash report within size limit");
		self.inner.send(event).await
	}
}

fn size_limit(threshold: usize) -> TransportLayer {
	Arc::new(move |inner: Arc<dyn Transport>| -> Arc<dyn Transport> {
		Arc::new(SizeLimit { inner, threshold })
	})
}

/// Runs after the installed processors and strips state and breadcrumbs.
fn strip_processor(diagnostic: &'static str) -> EventProcessor {
	Arc::new(move |mut event: CrashEvent| -> Option<CrashEvent> {
		event
			.extra
			.insert(STATE_KEY.to_string(), serde_json::Value::String(diagnostic.to_string()));
		event.breadcrumbs.clear();
		Some(event)
	})
}
