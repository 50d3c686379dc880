// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::Demand;
use alloc::sync::Arc;

/// The subscriber-facing control surface of a publisher.
///
/// Implementations synchronize internally: a subscription may be called from
/// any thread, and from inside the subscriber's own callbacks.
pub trait Subscription: Send + Sync {
    /// Grants additional credit. `Demand::NONE` is ignored.
    fn request(&self, demand: Demand);

    /// Stops delivery. Idempotent.
    fn cancel(&self);
}

/// Shared handle to a subscription, as passed to [`Subscriber::receive_subscription`](crate::Subscriber::receive_subscription).
pub type SubscriptionHandle = Arc<dyn Subscription>;
