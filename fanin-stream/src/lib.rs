// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Bridge from fanin publishers to `futures::Stream`.
//!
//! A [`PublisherStream`] drives a publisher by pulling: each poll that finds
//! nothing ready asks for one more value. This makes a merge built with
//! `fanin-merge` usable from async code.
//!
//! ```
//! use fanin_stream::{IntoPublisherStream, StreamItem};
//! use fanin_test_utils::SequencePublisher;
//! use futures::StreamExt;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let stream = SequencePublisher::<i32>::new(vec![1, 2]).into_stream();
//! let items: Vec<_> = stream.collect().await;
//! assert_eq!(items, vec![StreamItem::Value(1), StreamItem::Value(2)]);
//! # }
//! ```

#![allow(clippy::multiple_crate_versions)]

#[macro_use]
mod logging;
mod into_stream;
mod publisher_stream;
mod stream_item;

pub use self::into_stream::IntoPublisherStream;
pub use self::publisher_stream::PublisherStream;
pub use self::stream_item::StreamItem;
