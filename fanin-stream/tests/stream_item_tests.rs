// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use fanin_error::FaninError;
use fanin_stream::StreamItem;

#[test]
fn test_value_accessors() {
    // Arrange
    let item = StreamItem::Value(5);

    // Act & Assert
    assert!(!item.is_error());
    assert_eq!(item.clone().err().map(|error| error.to_string()), None);
    assert_eq!(item.ok(), Some(5));
}

#[test]
fn test_errors_are_never_equal() {
    // Arrange
    let first: StreamItem<i32> = StreamItem::Error(FaninError::stream_error("a"));
    let second: StreamItem<i32> = StreamItem::Error(FaninError::stream_error("a"));

    // Act & Assert
    assert!(first.is_error());
    assert_ne!(first, second);
    assert!(first.clone().ok().is_none());
    assert_eq!(first.err().and_then(|error| error.source_index()), None);
}
