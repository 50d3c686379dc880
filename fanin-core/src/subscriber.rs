// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{Completion, Demand, SubscriptionHandle};
use alloc::boxed::Box;

/// Receiving side of the push protocol.
///
/// The publisher calls [`receive_subscription`](Self::receive_subscription)
/// once, then [`receive`](Self::receive) no more often than the granted demand
/// allows, then [`receive_completion`](Self::receive_completion) at most once.
pub trait Subscriber: Send {
    type Input;
    type Failure;

    /// Hands over the control surface for this subscription.
    fn receive_subscription(&mut self, subscription: SubscriptionHandle);

    /// Delivers one value. The returned demand is added to the outstanding credit.
    fn receive(&mut self, input: Self::Input) -> Demand;

    /// Delivers the terminal signal.
    fn receive_completion(&mut self, completion: Completion<Self::Failure>);
}

impl<S> Subscriber for Box<S>
where
    S: Subscriber + ?Sized,
{
    type Input = S::Input;
    type Failure = S::Failure;

    fn receive_subscription(&mut self, subscription: SubscriptionHandle) {
        (**self).receive_subscription(subscription);
    }

    fn receive(&mut self, input: Self::Input) -> Demand {
        (**self).receive(input)
    }

    fn receive_completion(&mut self, completion: Completion<Self::Failure>) {
        (**self).receive_completion(completion);
    }
}
