// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::AccessGate;
use crate::storage::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub gate: Arc<AccessGate>,
}

impl AppState {
    pub fn new(store: Store, gate: AccessGate) -> Self {
        Self {
            store: Arc::new(store),
            gate: Arc::new(gate),
        }
    }
}
