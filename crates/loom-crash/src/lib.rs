// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Crash reporting client for Rust applications.
//!
//! # Quick Start
//!
//! ```ignore
//! use loom_crash::{Breadcrumb, BreadcrumbLevel, CrashClient, UserContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let crash = CrashClient::builder()
//!         .auth_token("your_auth_token")
//!         .base_url("https://loom.ghuntley.com")
//!         .project_id("proj_xxx")
//!         .release(env!("CARGO_PKG_VERSION"))
//!         .environment("production")
//!         .build()?;
//!
//!     crash.set_user(UserContext::with_id("user_123")).await;
//!     crash.set_tag("server", "web-01").await;
//!     crash.add_breadcrumb(Breadcrumb::new("startup").with_message("Application started")).await;
//!
//!     if let Err(e) = risky_operation() {
//!         crash.capture_error(&e).await?;
//!     }
//!
//!     crash.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Hooks
//!
//! - **Event processor**: a single slot holding a closure that sees every
//!   event right before transport ([`CrashClient::set_event_processor`]).
//!   Registrations chain by taking the previous processor.
//! - **Transport**: pluggable delivery ([`Transport`]), HTTP by default.
//! - **Duplicate suppression**: an event identical to the previous one is
//!   dropped unless duplicates are allowed.
//! - **Per-call overrides**: [`CrashClient::capture_event_with`] takes a
//!   [`CaptureOverrides`] that adds a processor, wraps the transport or
//!   changes duplicate handling for that one call.

mod client;
mod error;
mod processor;
mod transport;

pub use client::{
	CaptureOverrides, ClientConfig, ClientId, CrashClient, CrashClientBuilder, TransportLayer,
};
pub use error::{CrashSdkError, Result};
pub use processor::{chained, processor, EventProcessor};
pub use transport::{CaptureResponse, HttpTransport, Transport};

// Re-export core types for convenience
pub use loom_crash_core::{Breadcrumb, BreadcrumbLevel, CrashEvent, UserContext};
