// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::mem;
use fanin_core::fanin_mutex::{Mutex, MutexGuard};
use fanin_core::{Completion, Demand, Subscriber, Subscription, SubscriptionHandle};

type StateGuard<'a, T> = MutexGuard<'a, MergeState<T>>;

struct MergeState<T> {
    subscriptions: Vec<Option<SubscriptionHandle>>,
    buffers: Vec<Option<T>>,
    demand: Demand,
    deferred_demand: Demand,
    // Depth counter rather than a flag: windows opened by different threads overlap.
    downstream_calls: usize,
    finished_sources: usize,
    finished: bool,
    terminated: bool,
    cancelled: bool,
}

impl<T> MergeState<T> {
    fn new(source_count: usize) -> Self {
        Self {
            subscriptions: empty_slots(source_count),
            buffers: empty_slots(source_count),
            demand: Demand::NONE,
            deferred_demand: Demand::NONE,
            downstream_calls: 0,
            finished_sources: 0,
            finished: false,
            terminated: false,
            cancelled: false,
        }
    }

    const fn in_downstream_callback(&self) -> bool {
        self.downstream_calls > 0
    }

    const fn is_closed(&self) -> bool {
        self.terminated || self.cancelled
    }

    fn take_subscriptions(&mut self) -> Vec<Option<SubscriptionHandle>> {
        let count = self.subscriptions.len();
        mem::replace(&mut self.subscriptions, empty_slots(count))
    }

    fn live_subscriptions(&self) -> Vec<(usize, SubscriptionHandle)> {
        self.subscriptions
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|handle| (index, Arc::clone(handle))))
            .collect()
    }

    fn take_buffers(&mut self) -> Vec<(usize, T)> {
        self.buffers
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| slot.take().map(|value| (index, value)))
            .collect()
    }

    fn clear_buffers(&mut self) {
        self.buffers.iter_mut().for_each(|slot| *slot = None);
    }

    fn has_buffered(&self) -> bool {
        self.buffers.iter().any(Option::is_some)
    }

    fn should_finish(&self, source_count: usize) -> bool {
        !self.is_closed()
            && self.finished_sources >= source_count
            && self.subscriptions.iter().all(Option::is_none)
            && !self.has_buffered()
    }
}

fn empty_slots<T>(count: usize) -> Vec<Option<T>> {
    (0..count).map(|_| None).collect()
}

/// Shared state machine behind a demand-regulated merge of `N` sources.
///
/// `Merged` is the subscription handed to the downstream subscriber, and the
/// target every [`MergeSide`](crate::MergeSide) forwards into. It keeps one
/// subscription slot and one single-value buffer per source, plus the credit the
/// downstream has granted and not yet consumed.
///
/// Two locks are involved. The state lock guards the bookkeeping; the
/// downstream lock serializes calls into the downstream subscriber. The state
/// lock is always released before the downstream lock is taken, so a downstream
/// that calls [`request`](Subscription::request) or
/// [`cancel`](Subscription::cancel) from inside its own callbacks does not
/// deadlock. Requests that arrive while a downstream call is in progress are
/// deferred and folded in once it returns.
///
/// Sources are credited a window of a single value while downstream demand is
/// bounded, and unlimited credit once the downstream asks for unlimited demand.
pub struct Merged<D: Subscriber> {
    source_count: usize,
    state: Mutex<MergeState<D::Input>>,
    downstream: Mutex<D>,
}

impl<D> Merged<D>
where
    D: Subscriber + 'static,
    D::Input: Send + 'static,
{
    /// Creates the merge core for `source_count` sources feeding `downstream`.
    ///
    /// Nothing is sent to `downstream` until [`attach`](Self::attach) is called.
    pub fn new(downstream: D, source_count: usize) -> Arc<Self> {
        Arc::new(Self {
            source_count,
            state: Mutex::new(MergeState::new(source_count)),
            downstream: Mutex::new(downstream),
        })
    }

    /// Hands this merge to the downstream as its subscription.
    ///
    /// Demand the downstream requests from inside `receive_subscription` is
    /// replayed once the call returns.
    pub fn attach(self: &Arc<Self>) {
        let handle: SubscriptionHandle = Arc::clone(self) as SubscriptionHandle;
        let state = self.state.lock();
        let (mut state, ()) =
            self.call_downstream(state, move |downstream| downstream.receive_subscription(handle));
        let deferred = mem::take(&mut state.deferred_demand);
        drop(state);

        if !deferred.is_none() {
            self.request(deferred);
        }
    }

    /// Registers the subscription of source `index`.
    ///
    /// A second subscription for an occupied slot is cancelled, never stored.
    pub fn receive_subscription(&self, subscription: SubscriptionHandle, index: usize) {
        let mut state = self.state.lock();
        if state.is_closed() {
            drop(state);
            subscription.cancel();
            return;
        }
        if state.subscriptions[index].is_some() {
            drop(state);
            warn!("source {index} subscribed twice, cancelling the duplicate");
            subscription.cancel();
            return;
        }
        state.subscriptions[index] = Some(Arc::clone(&subscription));
        let demand = state.demand;
        drop(state);

        subscription.request(if demand.is_unlimited() {
            Demand::Unlimited
        } else {
            Demand::max(1)
        });
    }

    /// Accepts a value from source `index`, returning the new demand for that source.
    pub fn receive_value(&self, input: D::Input, index: usize) -> Demand {
        let mut state = self.state.lock();
        if state.is_closed() {
            return Demand::NONE;
        }

        if state.demand.is_unlimited() {
            let (_state, reply) = self.call_downstream(state, |downstream| downstream.receive(input));
            return reply;
        }

        if state.demand.is_none() {
            if state.buffers[index].is_some() {
                warn!("source {index} delivered past its window, replacing its buffered value");
            }
            trace!("no downstream demand, buffering value from source {index}");
            state.buffers[index] = Some(input);
            return Demand::NONE;
        }

        state.demand -= 1;
        let (mut state, reply) = self.call_downstream(state, |downstream| downstream.receive(input));
        state.deferred_demand += reply;
        self.settle(state);
        Demand::max(1)
    }

    /// Accepts the terminal signal of source `index`.
    pub fn receive_completion(&self, completion: Completion<D::Failure>, index: usize) {
        let mut state = self.state.lock();
        if state.is_closed() {
            return;
        }

        match completion {
            Completion::Finished => {
                state.subscriptions[index] = None;
                state.finished_sources += 1;
                if state.finished_sources >= self.source_count && state.has_buffered() {
                    trace!("all sources finished, holding completion until buffered values drain");
                }
                self.finish_if_done(state);
            }
            Completion::Failed(error) => {
                state.terminated = true;
                let subscriptions = state.take_subscriptions();
                state.clear_buffers();
                drop(state);

                debug!("source {index} failed, cancelling the remaining sources");
                subscriptions
                    .into_iter()
                    .enumerate()
                    .filter(|(slot, _)| *slot != index)
                    .filter_map(|(_, subscription)| subscription)
                    .for_each(|subscription| subscription.cancel());

                let state = self.state.lock();
                let _ = self.call_downstream(state, move |downstream| {
                    downstream.receive_completion(Completion::Failed(error));
                });
            }
        }
    }

    /// Number of sources this merge was created for.
    pub fn source_count(&self) -> usize {
        self.source_count
    }

    /// Credit granted by the downstream and not yet consumed.
    pub fn demand(&self) -> Demand {
        self.state.lock().demand
    }

    /// Number of sources currently holding a buffered value.
    pub fn buffered_count(&self) -> usize {
        self.state.lock().buffers.iter().filter(|slot| slot.is_some()).count()
    }

    /// Returns `true` once a terminal signal has been sent downstream.
    pub fn is_terminated(&self) -> bool {
        self.state.lock().terminated
    }

    /// Runs `f` against the downstream with the state lock released.
    ///
    /// The reentrancy window stays open from releasing the state lock until it
    /// is re-acquired; requests seen inside it are deferred.
    fn call_downstream<'a, R>(
        &'a self,
        mut state: StateGuard<'a, D::Input>,
        f: impl FnOnce(&mut D) -> R,
    ) -> (StateGuard<'a, D::Input>, R) {
        state.downstream_calls += 1;
        drop(state);

        let result = {
            let mut downstream = self.downstream.lock();
            f(&mut *downstream)
        };

        let mut state = self.state.lock();
        state.downstream_calls -= 1;
        (state, result)
    }

    /// Folds deferred demand back into the live state.
    fn settle(&self, mut state: StateGuard<'_, D::Input>) {
        let deferred = mem::take(&mut state.deferred_demand);
        if deferred.is_none() || state.demand.is_unlimited() || state.is_closed() {
            return;
        }

        if deferred.is_unlimited() || state.has_buffered() {
            // Upgrading or draining needs the full request path.
            drop(state);
            self.request(deferred);
        } else {
            state.demand += deferred;
        }
    }

    fn finish_if_done(&self, mut state: StateGuard<'_, D::Input>) {
        if !state.should_finish(self.source_count) {
            return;
        }
        state.finished = true;
        state.terminated = true;
        debug!("all {} sources finished", self.source_count);
        let _ = self.call_downstream(state, |downstream| {
            downstream.receive_completion(Completion::Finished);
        });
    }

    fn request_unlimited(
        &self,
        state: StateGuard<'_, D::Input>,
        subscriptions: Vec<(usize, SubscriptionHandle)>,
        buffered: Vec<(usize, D::Input)>,
    ) {
        let mut state = if buffered.is_empty() {
            state
        } else {
            let (state, ()) = self.call_downstream(state, |downstream| {
                for (_, value) in buffered {
                    downstream.receive(value);
                }
            });
            state
        };
        state.deferred_demand = Demand::NONE;
        self.finish_if_done(state);

        for (_, subscription) in subscriptions {
            subscription.request(Demand::Unlimited);
        }
    }

    fn request_bounded<'a>(
        &'a self,
        mut state: StateGuard<'a, D::Input>,
        demand: Demand,
        subscriptions: Vec<(usize, SubscriptionHandle)>,
        mut buffered: Vec<(usize, D::Input)>,
    ) {
        let mut remaining = demand;

        // Sources re-requested inside the window may buffer again; keep draining while credit lasts.
        loop {
            let mut undelivered = Vec::new();
            if !buffered.is_empty() {
                let batch = mem::take(&mut buffered);
                let (next, ()) = self.call_downstream(state, |downstream| {
                    for (index, value) in batch {
                        if remaining.is_none() {
                            undelivered.push((index, value));
                            continue;
                        }
                        remaining -= 1;
                        remaining += downstream.receive(value);
                    }
                });
                state = next;
            }

            for (index, value) in undelivered {
                if state.buffers[index].is_none() {
                    state.buffers[index] = Some(value);
                } else {
                    warn!("source {index} delivered past its window, dropping its older buffered value");
                }
            }
            remaining += mem::take(&mut state.deferred_demand);

            if state.is_closed() {
                return;
            }

            if remaining.is_unlimited() {
                drop(state);
                self.request(Demand::Unlimited);
                return;
            }

            if remaining.is_none() || !state.has_buffered() {
                break;
            }
            buffered = state.take_buffers();
        }

        // Sources that finished inside the window are not refilled.
        let subscriptions: Vec<_> = subscriptions
            .into_iter()
            .filter(|(index, _)| state.subscriptions[*index].is_some())
            .collect();
        if subscriptions.is_empty() {
            // No source to refill: bank the credit for late subscribers.
            state.demand += remaining;
            self.finish_if_done(state);
            return;
        }

        if !remaining.is_none() {
            state.demand += remaining;
        }

        let refill: Vec<SubscriptionHandle> = subscriptions
            .into_iter()
            .filter(|(index, _)| state.buffers[*index].is_none())
            .map(|(_, subscription)| subscription)
            .collect();
        drop(state);

        for subscription in refill {
            subscription.request(Demand::max(1));
        }
    }
}

impl<D> Subscription for Merged<D>
where
    D: Subscriber + 'static,
    D::Input: Send + 'static,
{
    fn request(&self, demand: Demand) {
        let mut state = self.state.lock();
        if state.is_closed()
            || state.finished
            || demand.is_none()
            || state.demand.is_unlimited()
        {
            return;
        }

        if state.in_downstream_callback() {
            trace!("deferring request for {demand} until the downstream call returns");
            state.deferred_demand += demand;
            return;
        }

        if demand.is_unlimited() {
            state.demand = Demand::Unlimited;
        }

        if self.source_count == 0 {
            state.finished = true;
            state.terminated = true;
            debug!("merge of zero sources finished on first request");
            let _ = self.call_downstream(state, |downstream| {
                downstream.receive_completion(Completion::Finished);
            });
            return;
        }

        let subscriptions = state.live_subscriptions();
        let buffered = state.take_buffers();

        if demand.is_unlimited() {
            self.request_unlimited(state, subscriptions, buffered);
        } else {
            self.request_bounded(state, demand, subscriptions, buffered);
        }
    }

    fn cancel(&self) {
        let mut state = self.state.lock();
        state.cancelled = true;
        let subscriptions = state.take_subscriptions();
        state.clear_buffers();
        drop(state);

        trace!("merge cancelled by downstream");
        subscriptions
            .into_iter()
            .flatten()
            .for_each(|subscription| subscription.cancel());
    }
}
