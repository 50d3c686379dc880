// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use fanin_core::{Completion, Demand, Subscriber, SubscriptionHandle};
use fanin_error::FaninError;
use parking_lot::Mutex;
use std::sync::Arc;

/// A signal observed by a [`RecordingSubscriber`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriberEvent<T, E> {
    Value(T),
    Finished,
    Failed(E),
}

type ValueHook = Box<dyn FnMut(&SubscriptionHandle, usize) + Send>;

struct Inner<T, E> {
    events: Vec<SubscriberEvent<T, E>>,
    subscription: Option<SubscriptionHandle>,
    initial_request: Option<Demand>,
    reply: Demand,
    on_value: Option<ValueHook>,
    values_seen: usize,
    in_callback: bool,
    overlapping_callbacks: usize,
}

/// Downstream test double recording every signal it receives.
///
/// Clones share the same record, so a test keeps one clone and moves the other
/// into the publisher under test.
pub struct RecordingSubscriber<T, E = FaninError> {
    inner: Arc<Mutex<Inner<T, E>>>,
}

impl<T, E> RecordingSubscriber<T, E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                events: Vec::new(),
                subscription: None,
                initial_request: None,
                reply: Demand::NONE,
                on_value: None,
                values_seen: 0,
                in_callback: false,
                overlapping_callbacks: 0,
            })),
        }
    }

    /// Requests `demand` as soon as the subscription arrives.
    #[must_use]
    pub fn with_initial_request(self, demand: Demand) -> Self {
        self.inner.lock().initial_request = Some(demand);
        self
    }

    /// Demand returned from every `receive`.
    #[must_use]
    pub fn with_reply(self, demand: Demand) -> Self {
        self.inner.lock().reply = demand;
        self
    }

    /// Runs `hook` inside every `receive`, after the value is recorded.
    ///
    /// The hook gets the subscription and the number of values seen so far, so
    /// it can call back into the publisher from inside the delivery.
    #[must_use]
    pub fn with_on_value<F>(self, hook: F) -> Self
    where
        F: FnMut(&SubscriptionHandle, usize) + Send + 'static,
    {
        self.inner.lock().on_value = Some(Box::new(hook));
        self
    }

    /// Requests more values through the received subscription.
    ///
    /// # Panics
    ///
    /// Panics if no subscription has been received yet.
    pub fn request(&self, demand: Demand) {
        let subscription = self.subscription().expect("no subscription received");
        subscription.request(demand);
    }

    /// Cancels the received subscription.
    ///
    /// # Panics
    ///
    /// Panics if no subscription has been received yet.
    pub fn cancel(&self) {
        let subscription = self.subscription().expect("no subscription received");
        subscription.cancel();
    }

    pub fn subscription(&self) -> Option<SubscriptionHandle> {
        self.inner.lock().subscription.clone()
    }

    pub fn has_subscription(&self) -> bool {
        self.inner.lock().subscription.is_some()
    }

    pub fn value_count(&self) -> usize {
        self.inner.lock().values_seen
    }

    /// Number of terminal signals received. Anything above one is a protocol bug.
    pub fn completion_count(&self) -> usize {
        self.inner
            .lock()
            .events
            .iter()
            .filter(|event| !matches!(event, SubscriberEvent::Value(_)))
            .count()
    }

    pub fn is_finished(&self) -> bool {
        self.inner
            .lock()
            .events
            .iter()
            .any(|event| matches!(event, SubscriberEvent::Finished))
    }

    /// Number of times a signal arrived while another was still being handled.
    pub fn overlapping_callbacks(&self) -> usize {
        self.inner.lock().overlapping_callbacks
    }

    fn enter(&self) {
        let mut inner = self.inner.lock();
        if inner.in_callback {
            inner.overlapping_callbacks += 1;
        }
        inner.in_callback = true;
    }

    fn leave(&self) {
        self.inner.lock().in_callback = false;
    }
}

impl<T: Clone, E: Clone> RecordingSubscriber<T, E> {
    pub fn events(&self) -> Vec<SubscriberEvent<T, E>> {
        self.inner.lock().events.clone()
    }

    pub fn values(&self) -> Vec<T> {
        self.inner
            .lock()
            .events
            .iter()
            .filter_map(|event| match event {
                SubscriberEvent::Value(value) => Some(value.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn failure(&self) -> Option<E> {
        self.inner.lock().events.iter().find_map(|event| match event {
            SubscriberEvent::Failed(error) => Some(error.clone()),
            _ => None,
        })
    }
}

impl<T, E> Default for RecordingSubscriber<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Clone for RecordingSubscriber<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send, E: Send> Subscriber for RecordingSubscriber<T, E> {
    type Input = T;
    type Failure = E;

    fn receive_subscription(&mut self, subscription: SubscriptionHandle) {
        let initial = {
            let mut inner = self.inner.lock();
            inner.subscription = Some(Arc::clone(&subscription));
            inner.initial_request
        };
        if let Some(demand) = initial {
            subscription.request(demand);
        }
    }

    fn receive(&mut self, input: T) -> Demand {
        self.enter();
        let (hook, subscription, seen) = {
            let mut inner = self.inner.lock();
            inner.events.push(SubscriberEvent::Value(input));
            inner.values_seen += 1;
            (
                inner.on_value.take(),
                inner.subscription.clone(),
                inner.values_seen,
            )
        };

        if let Some(mut hook) = hook {
            if let Some(subscription) = subscription {
                hook(&subscription, seen);
            }
            self.inner.lock().on_value = Some(hook);
        }

        self.leave();
        self.inner.lock().reply
    }

    fn receive_completion(&mut self, completion: Completion<E>) {
        self.enter();
        self.inner.lock().events.push(match completion {
            Completion::Finished => SubscriberEvent::Finished,
            Completion::Failed(error) => SubscriberEvent::Failed(error),
        });
        self.leave();
    }
}
