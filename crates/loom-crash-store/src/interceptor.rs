// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Event processor that decorates reports with store context.

use std::sync::Arc;

use loom_crash::{chained, EventProcessor};
use loom_crash_core::CrashEvent;
use serde::Serialize;

use crate::action::Action;
use crate::middleware::StoreContext;

/// Builds the processor installed on a client for one store.
///
/// For each report it pulls the current state once, fills in `lastAction`
/// and `state` (explicit extras win), overwrites user and tags when
/// derivations are configured, merges the store's breadcrumbs into the
/// report's by timestamp, and finally hands the event to `previous`.
pub fn report_interceptor<S, A>(
	context: Arc<StoreContext<S, A>>,
	previous: Option<EventProcessor>,
) -> EventProcessor
where
	S: Serialize + Send + Sync + 'static,
	A: Action,
{
	chained(previous, move |event| Some(decorate(&context, event)))
}

pub(crate) fn decorate<S, A>(context: &StoreContext<S, A>, mut event: CrashEvent) -> CrashEvent
where
	S: Serialize,
	A: Action,
{
	let options = context.options();
	let state = context.tracker().current_state();

	context
		.tracker()
		.build_extra_with_state(&state, options)
		.merge_into(&mut event.extra);

	if let Some(get_user_context) = &options.get_user_context {
		event.user_context = Some(get_user_context(&state));
	}
	if let Some(get_tags) = &options.get_tags {
		event.tags = get_tags(&state);
	}

	event.breadcrumbs = context.ledger().merge(&event.breadcrumbs);
	event
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::options::CrashMiddlewareOptions;
	use loom_crash::{processor, Breadcrumb, UserContext};
	use serde_json::{json, Value};
	use std::collections::HashMap;

	fn context(options: CrashMiddlewareOptions<Value, Value>) -> Arc<StoreContext<Value, Value>> {
		Arc::new(StoreContext::new(Arc::new(|| json!({ "value": 3 })), Arc::new(options)))
	}

	#[test]
	fn fills_extra_and_keeps_other_keys() {
		let ctx = context(CrashMiddlewareOptions::new());
		ctx.record(&json!({ "type": "INCREMENT" }));

		let event = CrashEvent::exception("Error", "boom").with_extra("anotherValue", json!(10));
		let event = decorate(&ctx, event);

		assert_eq!(event.extra["lastAction"], json!({ "type": "INCREMENT" }));
		assert_eq!(event.extra["state"], json!({ "value": 3 }));
		assert_eq!(event.extra["anotherValue"], 10);
	}

	#[test]
	fn derivations_overwrite_user_and_tags() {
		let ctx = context(
			CrashMiddlewareOptions::new()
				.get_user_context(|s: &Value| UserContext::with_id(format!("user context {}", s["value"])))
				.get_tags(|s: &Value| HashMap::from([("value".to_string(), s["value"].to_string())])),
		);

		let event = CrashEvent::exception("Error", "boom")
			.with_user(UserContext::with_id("captbaritone"))
			.with_tag("existing", "dropped");
		let event = decorate(&ctx, event);

		assert_eq!(
			event.user_context.and_then(|u| u.id).as_deref(),
			Some("user context 3")
		);
		assert_eq!(event.tags, HashMap::from([("value".to_string(), "3".to_string())]));
	}

	#[test]
	fn user_is_preserved_without_derivation() {
		let ctx = context(CrashMiddlewareOptions::new());
		let event = decorate(
			&ctx,
			CrashEvent::default().with_user(UserContext::with_id("captbaritone")),
		);
		assert_eq!(event.user_context.and_then(|u| u.id).as_deref(), Some("captbaritone"));
	}

	#[test]
	fn merges_ledger_with_existing_breadcrumbs() {
		let ctx = context(CrashMiddlewareOptions::new());
		ctx.record(&json!({ "type": "INCREMENT" }));

		let mut event = CrashEvent::default();
		event.breadcrumbs.push(Breadcrumb::new("console").with_message("some message"));
		let event = decorate(&ctx, event);

		let messages: Vec<_> = event.breadcrumbs.iter().filter_map(|b| b.message.as_deref()).collect();
		assert_eq!(messages, vec!["INCREMENT", "some message"]);
	}

	#[test]
	fn delegates_to_previous_processor() {
		let previous = processor(|event| Some(event.with_extra("firstData", json!("first"))));
		let interceptor = report_interceptor(context(CrashMiddlewareOptions::new()), Some(previous));

		let event = interceptor(CrashEvent::default()).unwrap();
		assert_eq!(event.extra["firstData"], "first");
		assert_eq!(event.extra["state"], json!({ "value": 3 }));
	}

	#[test]
	fn previous_processor_may_drop() {
		let interceptor =
			report_interceptor(context(CrashMiddlewareOptions::new()), Some(processor(|_| None)));
		assert!(interceptor(CrashEvent::default()).is_none());
	}
}
