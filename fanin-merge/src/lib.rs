// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Demand-regulated fan-in merge.
//!
//! [`MergeMany`] merges N publishers into one. Values from all upstreams are
//! delivered to a single subscriber, never more than it requested, and the
//! merged stream ends with exactly one completion:
//!
//! - **Finished** once every upstream has finished.
//! - **Failed** as soon as one upstream fails; the others are cancelled.
//!
//! While downstream demand is bounded each upstream is allowed one value in
//! flight, so the merge never holds more than one buffered value per upstream.
//!
//! The state machine lives in [`Merged`]; [`MergeSide`] is the per-upstream
//! adapter forwarding into it.

#![cfg_attr(not(feature = "std"), no_std)]
#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

extern crate alloc;

#[macro_use]
mod logging;
pub mod merge_many;
pub mod merged;
pub mod side;

pub use self::merge_many::{merge_many, MergeExt, MergeMany};
pub use self::merged::Merged;
pub use self::side::MergeSide;
