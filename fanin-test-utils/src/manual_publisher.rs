// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::RecordingSubscription;
use fanin_core::{Completion, Demand, Publisher, Subscriber, SubscriptionHandle};
use fanin_error::FaninError;
use parking_lot::Mutex;
use std::sync::Arc;

type BoxedSubscriber<T, E> = Box<dyn Subscriber<Input = T, Failure = E>>;

struct Shared<T, E> {
    subscriber: Mutex<Option<BoxedSubscriber<T, E>>>,
    subscriptions: Mutex<Vec<Arc<RecordingSubscription>>>,
    ledger: Mutex<Ledger>,
}

#[derive(Default)]
struct Ledger {
    sent: usize,
    replies: Demand,
}

/// Source driven step by step from the test body.
///
/// Every signal is pushed explicitly with [`send`](Self::send),
/// [`finish`](Self::finish) or [`fail`](Self::fail). Requests and cancels
/// from the subscriber are recorded on a [`RecordingSubscription`]. The
/// publisher does not enforce demand; tests check
/// [`outstanding_demand`](Self::outstanding_demand) instead, which makes it
/// possible to model misbehaving sources as well.
pub struct ManualPublisher<T, E = FaninError> {
    shared: Arc<Shared<T, E>>,
}

impl<T, E> ManualPublisher<T, E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                subscriber: Mutex::new(None),
                subscriptions: Mutex::new(Vec::new()),
                ledger: Mutex::new(Ledger::default()),
            }),
        }
    }

    /// Pushes a value, returning the subscriber's additional demand.
    ///
    /// # Panics
    ///
    /// Panics if nothing has subscribed yet.
    pub fn send(&self, value: T) -> Demand {
        let reply = self
            .shared
            .subscriber
            .lock()
            .as_mut()
            .expect("nothing subscribed")
            .receive(value);
        let mut ledger = self.shared.ledger.lock();
        ledger.sent += 1;
        ledger.replies += reply;
        reply
    }

    /// Sends `Completion::Finished`.
    pub fn finish(&self) {
        self.complete(Completion::Finished);
    }

    /// Sends `Completion::Failed(error)`.
    pub fn fail(&self, error: E) {
        self.complete(Completion::Failed(error));
    }

    /// Hands the current subscriber another subscription, as a buggy source would.
    ///
    /// # Panics
    ///
    /// Panics if nothing has subscribed yet.
    pub fn send_subscription(&self) -> Arc<RecordingSubscription> {
        let subscription = Arc::new(RecordingSubscription::new());
        self.shared.subscriptions.lock().push(Arc::clone(&subscription));
        let handle: SubscriptionHandle = subscription.clone();
        self.shared
            .subscriber
            .lock()
            .as_mut()
            .expect("nothing subscribed")
            .receive_subscription(handle);
        subscription
    }

    /// The first subscription handed out.
    ///
    /// # Panics
    ///
    /// Panics if nothing has subscribed yet.
    pub fn subscription(&self) -> Arc<RecordingSubscription> {
        self.shared
            .subscriptions
            .lock()
            .first()
            .cloned()
            .expect("nothing subscribed")
    }

    pub fn is_subscribed(&self) -> bool {
        self.shared.subscriber.lock().is_some()
    }

    /// Credit granted to this source and not yet used: requests plus replies minus values sent.
    pub fn outstanding_demand(&self) -> Demand {
        let granted = self
            .shared
            .subscriptions
            .lock()
            .first()
            .map_or(Demand::NONE, |subscription| subscription.total_requested());
        let ledger = self.shared.ledger.lock();
        (granted + ledger.replies)
            .checked_sub(ledger.sent)
            .unwrap_or(Demand::NONE)
    }

    fn complete(&self, completion: Completion<E>) {
        self.shared
            .subscriber
            .lock()
            .as_mut()
            .expect("nothing subscribed")
            .receive_completion(completion);
    }
}

impl<T, E> Default for ManualPublisher<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Clone for ManualPublisher<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, E> Publisher for ManualPublisher<T, E> {
    type Output = T;
    type Failure = E;

    fn subscribe<S>(&self, subscriber: S)
    where
        S: Subscriber<Input = T, Failure = E> + 'static,
    {
        let subscription = Arc::new(RecordingSubscription::new());
        self.shared.subscriptions.lock().push(Arc::clone(&subscription));

        let mut subscriber: BoxedSubscriber<T, E> = Box::new(subscriber);
        subscriber.receive_subscription(subscription);
        *self.shared.subscriber.lock() = Some(subscriber);
    }
}
