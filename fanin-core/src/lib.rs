// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Core vocabulary of the demand-regulated push protocol.
//!
//! A [`Publisher`] hands each [`Subscriber`] a [`Subscription`]. The subscriber
//! grants credit through [`Subscription::request`]; the publisher pushes at most
//! that many values through [`Subscriber::receive`], each call answering with
//! any additional [`Demand`]. The stream ends with exactly one [`Completion`],
//! or with none after [`Subscription::cancel`].

#![cfg_attr(not(feature = "std"), no_std)]
#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

extern crate alloc;

pub mod completion;
pub mod demand;
pub mod fanin_mutex;
pub mod publisher;
pub mod subscriber;
pub mod subscription;

pub use self::completion::Completion;
pub use self::demand::Demand;
pub use self::publisher::Publisher;
pub use self::subscriber::Subscriber;
pub use self::subscription::{Subscription, SubscriptionHandle};
