// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use fanin_core::{Completion, Demand, Publisher, Subscriber, Subscription, SubscriptionHandle};
use fanin_error::FaninError;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

type BoxedSubscriber<T, E> = Box<dyn Subscriber<Input = T, Failure = E>>;

/// Source emitting a fixed list of values, never more than requested.
///
/// Emission happens synchronously on whichever thread grants demand. Requests
/// made from inside the subscriber's callbacks are folded into the running
/// emission loop instead of recursing. After the last value the publisher sends
/// `Finished`, or the configured failure.
pub struct SequencePublisher<T, E = FaninError> {
    values: Vec<T>,
    failure: Option<E>,
    subscriptions: Mutex<Vec<Arc<SequenceSubscription<T, E>>>>,
}

impl<T: Clone, E: Clone> SequencePublisher<T, E> {
    #[must_use]
    pub fn new(values: Vec<T>) -> Self {
        Self {
            values,
            failure: None,
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    /// Emits `values`, then fails with `error` instead of finishing.
    #[must_use]
    pub fn failing(values: Vec<T>, error: E) -> Self {
        Self {
            values,
            failure: Some(error),
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    /// Total demand requested across all subscriptions so far.
    pub fn total_requested(&self) -> Demand {
        self.subscriptions
            .lock()
            .iter()
            .fold(Demand::NONE, |total, subscription| {
                total + subscription.state.lock().requested
            })
    }

    /// Number of cancelled subscriptions.
    pub fn cancel_count(&self) -> usize {
        self.subscriptions
            .lock()
            .iter()
            .filter(|subscription| subscription.state.lock().cancelled)
            .count()
    }
}

impl<T, E> Publisher for SequencePublisher<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    type Output = T;
    type Failure = E;

    fn subscribe<S>(&self, subscriber: S)
    where
        S: Subscriber<Input = T, Failure = E> + 'static,
    {
        let subscription = Arc::new(SequenceSubscription {
            state: Mutex::new(SequenceState {
                pending: self.values.iter().cloned().collect(),
                failure: self.failure.clone(),
                demand: Demand::NONE,
                requested: Demand::NONE,
                ready: false,
                emitting: false,
                done: false,
                cancelled: false,
            }),
            subscriber: Mutex::new(None),
        });
        self.subscriptions.lock().push(Arc::clone(&subscription));

        // Requests made during the handoff are held until the subscriber is installed.
        let mut subscriber: BoxedSubscriber<T, E> = Box::new(subscriber);
        let handle: SubscriptionHandle = subscription.clone();
        subscriber.receive_subscription(handle);
        *subscription.subscriber.lock() = Some(subscriber);
        subscription.state.lock().ready = true;
        subscription.emit();
    }
}

struct SequenceState<T, E> {
    pending: VecDeque<T>,
    failure: Option<E>,
    demand: Demand,
    requested: Demand,
    ready: bool,
    emitting: bool,
    done: bool,
    cancelled: bool,
}

struct SequenceSubscription<T, E> {
    state: Mutex<SequenceState<T, E>>,
    subscriber: Mutex<Option<BoxedSubscriber<T, E>>>,
}

enum Step<T, E> {
    Value(T),
    Complete(Completion<E>),
    Idle,
}

impl<T, E> SequenceSubscription<T, E> {
    fn emit(&self) {
        {
            let mut state = self.state.lock();
            if !state.ready || state.emitting {
                return;
            }
            state.emitting = true;
        }

        loop {
            let step = {
                let mut state = self.state.lock();
                let step = if state.cancelled || state.done {
                    Step::Idle
                } else if state.pending.is_empty() {
                    state.done = true;
                    Step::Complete(
                        state
                            .failure
                            .take()
                            .map_or(Completion::Finished, Completion::Failed),
                    )
                } else if state.demand > 0_usize {
                    state.demand -= 1;
                    state.pending.pop_front().map_or(Step::Idle, Step::Value)
                } else {
                    Step::Idle
                };
                // Cleared under the lock that chose to stop: a concurrent
                // request either sees `emitting` or restarts the loop itself.
                if matches!(step, Step::Idle) {
                    state.emitting = false;
                }
                step
            };

            match step {
                Step::Value(value) => {
                    let reply = self
                        .subscriber
                        .lock()
                        .as_mut()
                        .map_or(Demand::NONE, |subscriber| subscriber.receive(value));
                    self.state.lock().demand += reply;
                }
                Step::Complete(completion) => {
                    if let Some(subscriber) = self.subscriber.lock().as_mut() {
                        subscriber.receive_completion(completion);
                    }
                }
                Step::Idle => return,
            }
        }
    }
}

impl<T, E> Subscription for SequenceSubscription<T, E>
where
    T: Send,
    E: Send,
{
    fn request(&self, demand: Demand) {
        {
            let mut state = self.state.lock();
            if demand.is_none() || state.cancelled {
                return;
            }
            state.demand += demand;
            state.requested += demand;
        }
        self.emit();
    }

    fn cancel(&self) {
        self.state.lock().cancelled = true;
    }
}
