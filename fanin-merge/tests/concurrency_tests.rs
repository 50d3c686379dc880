// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use fanin_core::{Demand, Publisher};
use fanin_merge::merge_many;
use fanin_test_utils::{ManualPublisher, RecordingSubscriber};
use std::thread;

const SOURCES: usize = 4;
const VALUES: usize = 500;
const MAX_ROUNDS: usize = 5_000_000;

type Tagged = (usize, usize);

fn assert_ordered_per_source(values: &[Tagged]) {
    for source in 0..SOURCES {
        let sequence: Vec<usize> = values
            .iter()
            .filter(|(index, _)| *index == source)
            .map(|(_, sequence)| *sequence)
            .collect();
        assert!(
            sequence.windows(2).all(|pair| pair[0] < pair[1]),
            "values of source {source} arrived out of order"
        );
    }
}

#[test]
fn test_concurrent_sources_with_unlimited_demand() -> anyhow::Result<()> {
    // Arrange
    let sources: Vec<ManualPublisher<Tagged>> = (0..SOURCES).map(|_| ManualPublisher::new()).collect();
    let downstream = RecordingSubscriber::<Tagged>::new().with_initial_request(Demand::Unlimited);
    merge_many(sources.clone()).subscribe(downstream.clone());

    // Act
    thread::scope(|scope| {
        for (index, source) in sources.iter().enumerate() {
            scope.spawn(move || {
                for sequence in 0..VALUES {
                    source.send((index, sequence));
                }
                source.finish();
            });
        }
    });

    // Assert
    let values = downstream.values();
    assert_eq!(values.len(), SOURCES * VALUES);
    assert_ordered_per_source(&values);
    assert_eq!(downstream.completion_count(), 1);
    assert!(downstream.is_finished());
    assert_eq!(downstream.overlapping_callbacks(), 0);
    Ok(())
}

#[test]
fn test_concurrent_sources_with_bounded_demand() -> anyhow::Result<()> {
    // Arrange
    let sources: Vec<ManualPublisher<Tagged>> = (0..SOURCES).map(|_| ManualPublisher::new()).collect();
    let downstream = RecordingSubscriber::<Tagged>::new();
    merge_many(sources.clone()).subscribe(downstream.clone());

    // Act
    let granted = thread::scope(|scope| {
        for (index, source) in sources.iter().enumerate() {
            scope.spawn(move || {
                for sequence in 0..VALUES {
                    while source.outstanding_demand().is_none() {
                        thread::yield_now();
                    }
                    source.send((index, sequence));
                }
                source.finish();
            });
        }

        let requester = scope.spawn(|| {
            let mut granted = 0;
            while !downstream.is_finished() && granted < MAX_ROUNDS {
                downstream.request(Demand::max(1));
                granted += 1;
                assert!(downstream.value_count() <= granted);
                thread::yield_now();
            }
            granted
        });
        requester.join()
    });

    // Assert
    let granted = granted.map_err(|_| anyhow::anyhow!("requester thread panicked"))?;
    let values = downstream.values();
    assert!(downstream.is_finished(), "merge stalled after {granted} requests");
    assert!(values.len() <= granted);
    assert_ordered_per_source(&values);
    assert_eq!(downstream.completion_count(), 1);
    assert_eq!(downstream.overlapping_callbacks(), 0);
    Ok(())
}

#[test]
fn test_concurrent_cancel_stops_all_sources() -> anyhow::Result<()> {
    // Arrange
    let sources: Vec<ManualPublisher<Tagged>> = (0..SOURCES).map(|_| ManualPublisher::new()).collect();
    let downstream = RecordingSubscriber::<Tagged>::new().with_initial_request(Demand::Unlimited);
    merge_many(sources.clone()).subscribe(downstream.clone());

    // Act
    thread::scope(|scope| {
        for (index, source) in sources.iter().enumerate() {
            scope.spawn(move || {
                for sequence in 0..VALUES {
                    source.send((index, sequence));
                }
            });
        }
        scope.spawn(|| downstream.cancel());
    });

    // Assert
    for source in &sources {
        assert_eq!(source.subscription().cancel_count(), 1);
    }
    let delivered = downstream.value_count();
    sources[0].send((0, VALUES));
    assert_eq!(downstream.value_count(), delivered);
    assert_eq!(downstream.completion_count(), 0);
    assert_ordered_per_source(&downstream.values());
    Ok(())
}
