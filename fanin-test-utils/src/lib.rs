// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test doubles for the fanin push protocol.
//!
//! This crate is for development and testing only, not for production code.
//!
//! # Key Types
//!
//! - [`ManualPublisher`] - a source driven step by step from the test body
//! - [`SequencePublisher`] - a source that emits a fixed list of values as demand allows
//! - [`RecordingSubscriber`] - a downstream that records every signal it receives
//! - [`RecordingSubscription`] - a subscription that records requests and cancels
//!
//! # Example
//!
//! ```rust
//! use fanin_core::{Demand, Publisher};
//! use fanin_test_utils::{RecordingSubscriber, SequencePublisher};
//!
//! let source = SequencePublisher::new(vec![1, 2, 3]);
//! let downstream = RecordingSubscriber::<i32>::new().with_initial_request(Demand::max(2));
//!
//! source.subscribe(downstream.clone());
//!
//! assert_eq!(downstream.values(), vec![1, 2]);
//! downstream.request(Demand::Unlimited);
//! assert_eq!(downstream.values(), vec![1, 2, 3]);
//! assert!(downstream.is_finished());
//! ```

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
pub mod manual_publisher;
pub mod recording_subscriber;
pub mod recording_subscription;
pub mod sequence_publisher;

pub use manual_publisher::ManualPublisher;
pub use recording_subscriber::{RecordingSubscriber, SubscriberEvent};
pub use recording_subscription::RecordingSubscription;
pub use sequence_publisher::SequencePublisher;
