// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::StreamItem;
use fanin_core::{Completion, Demand, Publisher, Subscriber, SubscriptionHandle};
use fanin_error::FaninError;
use futures::Stream;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

struct StreamState<T> {
    items: VecDeque<StreamItem<T>>,
    subscription: Option<SubscriptionHandle>,
    waker: Option<Waker>,
    // A request for one item has been issued, or is owed once the subscription arrives.
    requested: bool,
    done: bool,
}

type SharedState<T> = Arc<Mutex<StreamState<T>>>;

/// Pull-based view of a [`Publisher`] as a [`futures::Stream`].
///
/// The stream subscribes when it is created and asks for one value at a time:
/// every poll that finds nothing ready requests `Demand::max(1)`, so the
/// publisher never runs ahead of the consumer. A failure is yielded as
/// [`StreamItem::Error`] and ends the stream. Dropping the stream before the
/// publisher completes cancels the subscription.
pub struct PublisherStream<T> {
    state: SharedState<T>,
}

impl<T: Send + 'static> PublisherStream<T> {
    /// Subscribes to `publisher` and returns the stream of its values.
    pub fn subscribe<P>(publisher: &P) -> Self
    where
        P: Publisher<Output = T> + ?Sized,
        P::Failure: Into<FaninError> + 'static,
    {
        let state = Arc::new(Mutex::new(StreamState {
            items: VecDeque::new(),
            subscription: None,
            waker: None,
            requested: false,
            done: false,
        }));
        publisher.subscribe(StreamSink {
            state: Arc::clone(&state),
            _failure: PhantomData,
        });
        Self { state }
    }
}

impl<T> Stream for PublisherStream<T> {
    type Item = StreamItem<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let subscription = {
            let mut state = self.state.lock();
            if let Some(item) = state.items.pop_front() {
                return Poll::Ready(Some(item));
            }
            if state.done {
                return Poll::Ready(None);
            }
            state.waker = Some(cx.waker().clone());
            if state.requested {
                return Poll::Pending;
            }
            state.requested = true;
            state.subscription.clone()
        };

        let Some(subscription) = subscription else {
            return Poll::Pending;
        };
        subscription.request(Demand::max(1));

        // The publisher may have answered synchronously.
        let mut state = self.state.lock();
        match state.items.pop_front() {
            Some(item) => Poll::Ready(Some(item)),
            None if state.done => Poll::Ready(None),
            None => Poll::Pending,
        }
    }
}

impl<T> Drop for PublisherStream<T> {
    fn drop(&mut self) {
        let subscription = {
            let mut state = self.state.lock();
            if state.done {
                None
            } else {
                state.done = true;
                state.subscription.take()
            }
        };
        if let Some(subscription) = subscription {
            trace!("publisher stream dropped before completion, cancelling");
            subscription.cancel();
        }
    }
}

struct StreamSink<T, E> {
    state: SharedState<T>,
    _failure: PhantomData<fn(E)>,
}

impl<T, E> StreamSink<T, E> {
    fn push(&self, item: Option<StreamItem<T>>) {
        let waker = {
            let mut state = self.state.lock();
            if let Some(item) = item {
                state.items.push_back(item);
                state.requested = false;
            }
            state.waker.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

impl<T, E> Subscriber for StreamSink<T, E>
where
    T: Send,
    E: Into<FaninError>,
{
    type Input = T;
    type Failure = E;

    fn receive_subscription(&mut self, subscription: SubscriptionHandle) {
        let owed = {
            let mut state = self.state.lock();
            if state.done || state.subscription.is_some() {
                None
            } else {
                state.subscription = Some(Arc::clone(&subscription));
                Some(state.requested)
            }
        };

        match owed {
            None => {
                warn!("publisher stream received an unexpected subscription, cancelling it");
                subscription.cancel();
            }
            Some(true) => subscription.request(Demand::max(1)),
            Some(false) => {}
        }
    }

    fn receive(&mut self, input: T) -> Demand {
        if self.state.lock().done {
            return Demand::NONE;
        }
        self.push(Some(StreamItem::Value(input)));
        Demand::NONE
    }

    fn receive_completion(&mut self, completion: Completion<E>) {
        let item = {
            let mut state = self.state.lock();
            if state.done {
                return;
            }
            state.done = true;
            state.subscription = None;
            completion.into_result().err().map(|error| StreamItem::Error(error.into()))
        };
        self.push(item);
    }
}
