#![allow(dead_code)]

use symm_core::Case;

/// Correct predictions covering every prime in both directions.
pub fn padding_cases() -> Vec<Case> {
    [2, 3, 5, 7]
        .into_iter()
        .map(|order| Case::new(order, Some(order)).with_id(format!("pad-c{order}")))
        .collect()
}

/// Mixed benchmark with forward, inverse and unrelated mistakes.
pub fn benchmark_cases() -> Vec<Case> {
    let pairs: [(i64, Option<i64>); 31] = [
        (2, Some(2)),
        (3, Some(3)),
        (5, Some(5)),
        (7, Some(7)),
        (4, Some(4)),
        (6, Some(6)),
        (8, Some(8)),
        (2, Some(2)),
        (3, Some(3)),
        (4, Some(4)),
        (6, Some(6)),
        (8, Some(8)),
        (5, Some(5)),
        (7, Some(7)),
        (4, Some(2)),
        (6, Some(3)),
        (6, Some(2)),
        (8, Some(4)),
        (2, None),
        (3, Some(1)),
        (5, Some(0)),
        (7, Some(1)),
        (8, Some(2)),
        (1, Some(2)),
        (2, Some(4)),
        (3, Some(6)),
        (1, Some(3)),
        (1, Some(5)),
        (1, Some(7)),
        (5, Some(7)),
        (6, Some(4)),
    ];
    pairs
        .into_iter()
        .enumerate()
        .map(|(idx, (known, predicted))| {
            Case::new(known, predicted)
                .with_id(format!("d{idx:03}"))
                .with_score(0.5)
        })
        .collect()
}
