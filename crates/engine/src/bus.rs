// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The in-memory delegation event bus (§4.E).
//!
//! A bounded ring buffer retains the most recent events for late
//! subscribers to catch up on, and subscribers register by exact event
//! name or the wildcard `"*"`. A subscriber callback that panics is
//! caught and logged rather than allowed to unwind through the publish
//! call and take down every other subscriber with it.

use hubd_core::DelegationEvent;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Maximum number of past events retained for replay to new subscribers.
pub const RING_BUFFER_CAPACITY: usize = 10_000;

type Subscriber = Box<dyn Fn(&DelegationEvent) + Send + Sync>;

struct Registration {
    filter: String,
    callback: Subscriber,
}

pub struct EventBus {
    inner: Mutex<Inner>,
}

struct Inner {
    ring: VecDeque<DelegationEvent>,
    subscribers: Vec<Registration>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self { inner: Mutex::new(Inner { ring: VecDeque::with_capacity(RING_BUFFER_CAPACITY), subscribers: Vec::new() }) }
    }

    /// Subscribes to events whose `name()` equals `filter`, or every event
    /// if `filter` is `"*"`.
    pub fn subscribe(&self, filter: impl Into<String>, callback: impl Fn(&DelegationEvent) + Send + Sync + 'static) {
        let mut inner = self.inner.lock();
        inner.subscribers.push(Registration { filter: filter.into(), callback: Box::new(callback) });
    }

    /// Publishes an event: appends it to the ring buffer (evicting the
    /// oldest entry once at capacity) and notifies every matching
    /// subscriber in registration order.
    pub fn publish(&self, event: DelegationEvent) {
        let mut inner = self.inner.lock();
        if inner.ring.len() == RING_BUFFER_CAPACITY {
            inner.ring.pop_front();
        }
        inner.ring.push_back(event.clone());

        for reg in &inner.subscribers {
            if reg.filter == "*" || reg.filter == event.name() {
                let callback = &reg.callback;
                let result = panic::catch_unwind(AssertUnwindSafe(|| callback(&event)));
                if result.is_err() {
                    tracing::error!(event = event.name(), filter = %reg.filter, "event subscriber panicked");
                }
            }
        }
    }

    /// Returns up to `limit` most recent events, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<DelegationEvent> {
        let inner = self.inner.lock();
        inner.ring.iter().rev().take(limit).rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shared handle to an [`EventBus`], cloned into each connection and
/// scheduler task.
pub type SharedEventBus = Arc<EventBus>;
