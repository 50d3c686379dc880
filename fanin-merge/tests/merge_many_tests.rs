// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use fanin_core::{Demand, Publisher};
use fanin_error::FaninError;
use fanin_merge::{merge_many, MergeExt, MergeMany};
use fanin_test_utils::{ManualPublisher, RecordingSubscriber, SequencePublisher, SubscriberEvent};

#[test]
fn test_merge_many_with_unlimited_demand() -> anyhow::Result<()> {
    // Arrange
    let merge = merge_many([
        SequencePublisher::new(vec![1, 2, 3]),
        SequencePublisher::new(vec![10, 20]),
    ]);
    let downstream = RecordingSubscriber::<i32>::new().with_initial_request(Demand::Unlimited);

    // Act
    merge.subscribe(downstream.clone());

    // Assert
    assert_eq!(downstream.values(), vec![1, 2, 3, 10, 20]);
    assert!(downstream.is_finished());
    assert_eq!(downstream.completion_count(), 1);
    Ok(())
}

#[test]
fn test_merge_many_driven_one_value_at_a_time() -> anyhow::Result<()> {
    // Arrange
    let merge = merge_many([
        SequencePublisher::new(vec![1, 2, 3]),
        SequencePublisher::new(vec![10, 20]),
    ]);
    let downstream = RecordingSubscriber::<i32>::new();
    merge.subscribe(downstream.clone());

    // Act & Assert
    for delivered in 1..=5 {
        downstream.request(Demand::max(1));
        assert_eq!(downstream.value_count(), delivered);
    }

    assert!(downstream.is_finished());
    let values = downstream.values();
    let first: Vec<_> = values.iter().copied().filter(|value| *value < 10).collect();
    let second: Vec<_> = values.iter().copied().filter(|value| *value >= 10).collect();
    assert_eq!(first, vec![1, 2, 3]);
    assert_eq!(second, vec![10, 20]);
    Ok(())
}

#[test]
fn test_merge_many_with_reply_demand() -> anyhow::Result<()> {
    // Arrange
    let merge = merge_many([
        SequencePublisher::new(vec!["a1", "a2"]),
        SequencePublisher::new(vec!["b1", "b2"]),
        SequencePublisher::new(vec!["c1"]),
    ]);
    let downstream = RecordingSubscriber::<&str>::new()
        .with_initial_request(Demand::max(1))
        .with_reply(Demand::max(1));

    // Act
    merge.subscribe(downstream.clone());

    // Assert
    assert_eq!(downstream.values(), vec!["a1", "a2", "b1", "b2", "c1"]);
    assert!(downstream.is_finished());
    assert_eq!(downstream.overlapping_callbacks(), 0);
    Ok(())
}

#[test]
fn test_merge_many_of_nothing_finishes_on_first_request() -> anyhow::Result<()> {
    // Arrange
    let merge = merge_many(Vec::<SequencePublisher<i32>>::new());
    let downstream = RecordingSubscriber::<i32>::new();
    merge.subscribe(downstream.clone());
    assert!(merge.is_empty());
    assert!(downstream.events().is_empty());

    // Act
    downstream.request(Demand::max(1));

    // Assert
    assert!(matches!(downstream.events()[..], [SubscriberEvent::Finished]));
    Ok(())
}

#[test]
fn test_merge_many_propagates_first_failure() -> anyhow::Result<()> {
    // Arrange
    let merge = merge_many([
        SequencePublisher::failing(vec![1], FaninError::upstream_failure(0, "broken pipe")),
        SequencePublisher::new(vec![10, 20, 30]),
    ]);
    let downstream = RecordingSubscriber::<i32>::new().with_initial_request(Demand::Unlimited);

    // Act
    merge.subscribe(downstream.clone());

    // Assert
    assert_eq!(downstream.values(), vec![1]);
    assert_eq!(
        downstream.failure().and_then(|error| error.source_index()),
        Some(0)
    );
    assert_eq!(downstream.completion_count(), 1);
    Ok(())
}

#[test]
fn test_failure_cancels_manual_sources() -> anyhow::Result<()> {
    // Arrange
    let sources: Vec<ManualPublisher<i32>> = (0..3).map(|_| ManualPublisher::new()).collect();
    let downstream = RecordingSubscriber::<i32>::new().with_initial_request(Demand::max(2));
    merge_many(sources.clone()).subscribe(downstream.clone());

    // Act
    sources[0].send(1);
    sources[2].fail(FaninError::stream_error("timeout"));

    // Assert
    assert_eq!(downstream.values(), vec![1]);
    assert_eq!(sources[0].subscription().cancel_count(), 1);
    assert_eq!(sources[1].subscription().cancel_count(), 1);
    assert_eq!(sources[2].subscription().cancel_count(), 0);
    assert!(matches!(
        downstream.failure(),
        Some(FaninError::StreamProcessingError { .. })
    ));
    Ok(())
}

#[test]
fn test_each_subscription_gets_its_own_merge() -> anyhow::Result<()> {
    // Arrange
    let merge = merge_many([
        SequencePublisher::new(vec![1, 2]),
        SequencePublisher::new(vec![3]),
    ]);
    let first = RecordingSubscriber::<i32>::new().with_initial_request(Demand::Unlimited);
    let second = RecordingSubscriber::<i32>::new().with_initial_request(Demand::max(1));

    // Act
    merge.subscribe(first.clone());
    merge.subscribe(second.clone());

    // Assert
    assert_eq!(first.values(), vec![1, 2, 3]);
    assert!(first.is_finished());
    assert_eq!(second.values(), vec![1]);
    assert!(!second.is_finished());
    Ok(())
}

#[test]
fn test_merge_with_places_receiver_first() -> anyhow::Result<()> {
    // Arrange
    let merge = SequencePublisher::new(vec!["left"]).merge_with(SequencePublisher::new(vec!["right"]));
    let downstream = RecordingSubscriber::<&str>::new().with_initial_request(Demand::Unlimited);

    // Act
    merge.subscribe(downstream.clone());

    // Assert
    assert_eq!(merge.len(), 2);
    assert_eq!(downstream.values(), vec!["left", "right"]);
    assert!(downstream.is_finished());
    Ok(())
}

#[test]
fn test_with_appends_a_source() -> anyhow::Result<()> {
    // Arrange
    let merge = MergeMany::new([SequencePublisher::new(vec![1])])
        .with(SequencePublisher::new(vec![2]))
        .with(SequencePublisher::new(vec![3]));
    let downstream = RecordingSubscriber::<i32>::new().with_initial_request(Demand::max(3));

    // Act
    merge.subscribe(downstream.clone());

    // Assert
    assert_eq!(merge.len(), 3);
    assert_eq!(downstream.values(), vec![1, 2, 3]);
    assert!(downstream.is_finished());
    Ok(())
}
