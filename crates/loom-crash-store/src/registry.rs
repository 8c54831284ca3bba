// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Process-wide record of clients that already carry a store interceptor.

use std::collections::HashSet;
use std::sync::LazyLock;

use loom_crash::ClientId;
use parking_lot::Mutex;

static ATTACHED: LazyLock<Mutex<HashSet<ClientId>>> = LazyLock::new(|| Mutex::new(HashSet::new()));

/// Claims `client` for the caller. Returns false if another store already
/// attached to it; entries are never released.
pub fn try_attach(client: ClientId) -> bool {
	ATTACHED.lock().insert(client)
}

pub fn is_attached(client: ClientId) -> bool {
	ATTACHED.lock().contains(&client)
}
