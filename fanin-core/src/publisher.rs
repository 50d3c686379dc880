// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::Subscriber;

/// Producing side of the push protocol.
///
/// Each call to [`subscribe`](Self::subscribe) starts an independent
/// subscription. Nothing flows until the subscriber requests demand.
pub trait Publisher {
    type Output;
    type Failure;

    /// Attaches `subscriber` and hands it a subscription.
    fn subscribe<S>(&self, subscriber: S)
    where
        S: Subscriber<Input = Self::Output, Failure = Self::Failure> + 'static;
}
