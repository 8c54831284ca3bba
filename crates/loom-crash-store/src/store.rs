// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! A minimal reducer store with a composable middleware chain.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Result;

/// Pull-based access to the current state.
pub type StateAccessor<S> = Arc<dyn Fn() -> S + Send + Sync>;

/// A dispatch function: forwards an action and returns it on success.
pub type Dispatch<A> = Arc<dyn Fn(A) -> Result<A> + Send + Sync>;

/// Computes the next state from the previous one.
pub type Reducer<S, A> = Arc<dyn Fn(&S, &A) -> Result<S> + Send + Sync>;

/// Wraps the next dispatch function in the chain.
///
/// The returned function must call `next(action)` and return its result
/// unchanged; it may observe the action before and after doing so.
pub trait Middleware<S, A>: Send + Sync {
	fn wrap(&self, get_state: StateAccessor<S>, next: Dispatch<A>) -> Dispatch<A>;
}

/// Holds state and routes every action through the middleware chain into
/// the reducer.
pub struct Store<S, A> {
	state: Arc<RwLock<S>>,
	dispatch: Dispatch<A>,
}

impl<S, A> Store<S, A>
where
	S: Clone + Send + Sync + 'static,
	A: Send + 'static,
{
	/// Creates a store without middleware.
	pub fn new<R>(initial: S, reducer: R) -> Self
	where
		R: Fn(&S, &A) -> Result<S> + Send + Sync + 'static,
	{
		Self::with_middleware(initial, reducer, Vec::new())
	}

	/// Creates a store whose dispatch runs through `middleware`, first
	/// element outermost.
	pub fn with_middleware<R>(
		initial: S,
		reducer: R,
		middleware: Vec<Arc<dyn Middleware<S, A>>>,
	) -> Self
	where
		R: Fn(&S, &A) -> Result<S> + Send + Sync + 'static,
	{
		let state = Arc::new(RwLock::new(initial));
		let reducer: Reducer<S, A> = Arc::new(reducer);

		let base: Dispatch<A> = {
			let state = Arc::clone(&state);
			Arc::new(move |action| {
				let next = reducer(&*state.read(), &action)?;
				*state.write() = next;
				Ok(action)
			})
		};

		let accessor = accessor(&state);
		let dispatch = middleware
			.iter()
			.rev()
			.fold(base, |next, layer| layer.wrap(Arc::clone(&accessor), next));

		Self { state, dispatch }
	}

	/// Dispatches an action through the middleware chain.
	///
	/// A reducer failure leaves the state untouched and is returned as-is.
	pub fn dispatch(&self, action: A) -> Result<A> {
		(self.dispatch)(action)
	}

	/// Returns a snapshot of the current state.
	pub fn get_state(&self) -> S {
		self.state.read().clone()
	}

	pub fn state_accessor(&self) -> StateAccessor<S> {
		accessor(&self.state)
	}
}

fn accessor<S>(state: &Arc<RwLock<S>>) -> StateAccessor<S>
where
	S: Clone + Send + Sync + 'static,
{
	let state = Arc::clone(state);
	Arc::new(move || state.read().clone())
}
