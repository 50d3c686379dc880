// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::Merged;
use alloc::sync::Arc;
use fanin_core::{Completion, Demand, Subscriber, SubscriptionHandle};

/// Per-source subscriber that forwards everything into a shared [`Merged`] core.
///
/// Each upstream is subscribed with its own `MergeSide`, tagged with the
/// upstream's position. The side holds no state of its own.
pub struct MergeSide<D: Subscriber> {
    index: usize,
    merged: Arc<Merged<D>>,
}

impl<D> MergeSide<D>
where
    D: Subscriber + 'static,
    D::Input: Send + 'static,
{
    #[must_use]
    pub fn new(index: usize, merged: Arc<Merged<D>>) -> Self {
        Self { index, merged }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }
}

impl<D> Subscriber for MergeSide<D>
where
    D: Subscriber + 'static,
    D::Input: Send + 'static,
{
    type Input = D::Input;
    type Failure = D::Failure;

    fn receive_subscription(&mut self, subscription: SubscriptionHandle) {
        self.merged.receive_subscription(subscription, self.index);
    }

    fn receive(&mut self, input: Self::Input) -> Demand {
        self.merged.receive_value(input, self.index)
    }

    fn receive_completion(&mut self, completion: Completion<Self::Failure>) {
        self.merged.receive_completion(completion, self.index);
    }
}

impl<D: Subscriber> Clone for MergeSide<D> {
    fn clone(&self) -> Self {
        Self {
            index: self.index,
            merged: Arc::clone(&self.merged),
        }
    }
}
