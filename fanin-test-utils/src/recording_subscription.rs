// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use fanin_core::{Demand, Subscription};
use parking_lot::Mutex;

/// Subscription that only records what it is asked to do.
#[derive(Debug, Default)]
pub struct RecordingSubscription {
    requests: Mutex<Vec<Demand>>,
    cancels: Mutex<usize>,
}

impl RecordingSubscription {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every demand passed to `request`, in call order.
    pub fn requests(&self) -> Vec<Demand> {
        self.requests.lock().clone()
    }

    /// Sum of every requested demand.
    pub fn total_requested(&self) -> Demand {
        self.requests
            .lock()
            .iter()
            .fold(Demand::NONE, |total, demand| total + *demand)
    }

    pub fn cancel_count(&self) -> usize {
        *self.cancels.lock()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_count() > 0
    }
}

impl Subscription for RecordingSubscription {
    fn request(&self, demand: Demand) {
        self.requests.lock().push(demand);
    }

    fn cancel(&self) {
        *self.cancels.lock() += 1;
    }
}
