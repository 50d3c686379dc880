// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::PublisherStream;
use fanin_core::Publisher;
use fanin_error::FaninError;

/// Extension trait turning any publisher into a [`PublisherStream`].
pub trait IntoPublisherStream: Publisher {
    /// Subscribes and returns a stream pulling one value per poll.
    fn into_stream(self) -> PublisherStream<Self::Output>
    where
        Self: Sized,
        Self::Output: Send + 'static,
        Self::Failure: Into<FaninError> + 'static,
    {
        PublisherStream::subscribe(&self)
    }
}

impl<P: Publisher> IntoPublisherStream for P {}
