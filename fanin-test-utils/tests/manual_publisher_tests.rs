// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use fanin_core::{Demand, Publisher};
use fanin_error::FaninError;
use fanin_test_utils::{ManualPublisher, RecordingSubscriber};

#[test]
fn test_records_requests_and_cancels() {
    // Arrange
    let source = ManualPublisher::<&str>::new();
    let downstream = RecordingSubscriber::<&str>::new().with_initial_request(Demand::max(2));

    // Act
    source.subscribe(downstream.clone());
    downstream.cancel();
    downstream.cancel();

    // Assert
    assert!(source.is_subscribed());
    assert_eq!(source.subscription().requests(), vec![Demand::max(2)]);
    assert_eq!(source.subscription().cancel_count(), 2);
}

#[test]
fn test_outstanding_demand_tracks_sends_and_replies() {
    // Arrange
    let source = ManualPublisher::<&str>::new();
    let downstream = RecordingSubscriber::<&str>::new()
        .with_initial_request(Demand::max(2))
        .with_reply(Demand::max(1));
    source.subscribe(downstream.clone());

    // Act
    let reply = source.send("a");

    // Assert
    assert_eq!(reply, Demand::max(1));
    assert_eq!(source.outstanding_demand(), Demand::max(2));
    assert_eq!(downstream.values(), vec!["a"]);
}

#[test]
fn test_completion_signals() {
    // Arrange
    let source = ManualPublisher::<&str>::new();
    let downstream = RecordingSubscriber::<&str>::new();
    source.subscribe(downstream.clone());

    // Act
    source.fail(FaninError::stream_error("boom"));

    // Assert
    assert_eq!(downstream.completion_count(), 1);
    assert!(downstream.failure().is_some());
}
