use crate::{client, common, error::StoreError};

use aws_sdk_dynamodb::types;
use indexmap::IndexMap;
use std::{collections, future::Future};

/// Per-table entry of an unprocessed remainder.
pub trait Unprocessed: Clone {
    /// Whether nothing is left to send for this table.
    fn is_exhausted(&self) -> bool;
}

impl Unprocessed for types::KeysAndAttributes {
    fn is_exhausted(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Unprocessed for Vec<types::WriteRequest> {
    fn is_exhausted(&self) -> bool {
        self.is_empty()
    }
}

/// Items, capacity and metrics accumulated over every round of one bucket.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchResponse {
    /// Returned items per table name, in round order.
    pub responses: IndexMap<String, Vec<common::Item>>,
    /// Consumed capacity of every round, in round order.
    pub consumed_capacity: Vec<types::ConsumedCapacity>,
    /// Item collection metrics per table name, in round order.
    pub item_collection_metrics: IndexMap<String, Vec<types::ItemCollectionMetrics>>,
}

impl BatchResponse {
    fn absorb<R>(&mut self, page: &mut client::BatchPage<R>) {
        for (table_name, items) in page.responses.drain() {
            self.responses.entry(table_name).or_default().extend(items);
        }
        self.consumed_capacity.append(&mut page.consumed_capacity);
        for (table_name, metrics) in page.item_collection_metrics.drain() {
            self.item_collection_metrics
                .entry(table_name)
                .or_default()
                .extend(metrics);
        }
    }
}

/// Count one more consecutive retry, or `None` once past `max_retries`.
fn next_retry(retries: u32, max_retries: Option<u32>) -> Option<u32> {
    let retries = retries.saturating_add(1);
    match max_retries {
        Some(max_retries) if retries > max_retries => None,
        _ => Some(retries),
    }
}

enum State<R> {
    Requesting(collections::HashMap<String, R>),
    Done,
}

/// Send `request` through `send` until the store reports nothing unprocessed.
///
/// Retryable errors resend the same request and leave the accumulated items untouched.
/// Any other error is returned as is and the accumulated items are dropped.
/// With `max_retries` set, the retryable error following that many consecutive
/// retries is returned as well.
pub async fn paginate<R, F, Fut>(
    request: collections::HashMap<String, R>,
    mut send: F,
    max_retries: Option<u32>,
) -> Result<BatchResponse, StoreError>
where
    R: Unprocessed,
    F: FnMut(collections::HashMap<String, R>) -> Fut,
    Fut: Future<Output = Result<client::BatchPage<R>, StoreError>>,
{
    let mut response = BatchResponse::default();
    let mut retries = 0;
    let mut state = State::Requesting(request);
    while let State::Requesting(request) = state {
        match send(request.clone()).await {
            Ok(mut page) => {
                retries = 0;
                response.absorb(&mut page);
                let mut remainder = page.unprocessed.unwrap_or_default();
                remainder.retain(|_, entry| !entry.is_exhausted());
                state = if remainder.is_empty() {
                    State::Done
                } else {
                    State::Requesting(remainder)
                };
            }
            Err(error) if error.retryable => {
                let Some(next) = next_retry(retries, max_retries) else {
                    return Err(error);
                };
                retries = next;
                #[cfg(feature = "tracing")]
                tracing::debug!(%error, retries, "retrying batch request");
                state = State::Requesting(request);
            }
            Err(error) => return Err(error),
        }
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use std::future;

    fn item(id: usize) -> common::Item {
        collections::HashMap::from([("id".to_string(), types::AttributeValue::N(id.to_string()))])
    }

    fn request(size: usize) -> collections::HashMap<String, Vec<types::WriteRequest>> {
        let requests = (0..size)
            .map(|id| {
                types::WriteRequest::builder()
                    .set_put_request(Some(
                        types::PutRequest::builder()
                            .set_item(Some(item(id)))
                            .build()
                            .unwrap(),
                    ))
                    .build()
            })
            .collect();
        collections::HashMap::from([("t".to_string(), requests)])
    }

    fn page(
        items: Vec<common::Item>,
        unprocessed: Option<collections::HashMap<String, Vec<types::WriteRequest>>>,
    ) -> client::BatchPage<Vec<types::WriteRequest>> {
        client::BatchPage {
            responses: collections::HashMap::from([("t".to_string(), items)]),
            unprocessed,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_paginate_resends_remainder() {
        let mut sent = Vec::new();
        let response = paginate(
            request(3),
            |request| {
                sent.push(request.clone());
                let round = sent.len();
                let unprocessed = (round < 3).then_some(request);
                future::ready(Ok(page(vec![item(round); round], unprocessed)))
            },
            None,
        )
        .await
        .unwrap();
        assert_eq!(sent.len(), 3);
        assert!(sent.iter().all(|request| request == &sent[0]));
        assert_eq!(
            response.responses["t"],
            vec![item(1), item(2), item(2), item(3), item(3), item(3)]
        );
    }

    #[rstest]
    #[case::absent(None)]
    #[case::empty_entries(Some(collections::HashMap::from([("t".to_string(), vec![])])))]
    #[tokio::test]
    async fn test_paginate_done(
        #[case] unprocessed: Option<collections::HashMap<String, Vec<types::WriteRequest>>>,
    ) {
        let mut calls = 0;
        let response = paginate(
            request(1),
            |_| {
                calls += 1;
                future::ready(Ok(page(vec![item(0)], unprocessed.clone())))
            },
            None,
        )
        .await
        .unwrap();
        assert_eq!(calls, 1);
        assert_eq!(response.responses["t"], vec![item(0)]);
    }

    #[tokio::test]
    async fn test_paginate_accumulates_capacity_and_metrics() {
        let mut round = 0;
        let response = paginate(
            request(3),
            |request| {
                round += 1;
                let unprocessed = (round < 3).then_some(request);
                future::ready(Ok(client::BatchPage {
                    consumed_capacity: vec![
                        types::ConsumedCapacity::builder()
                            .table_name("t")
                            .capacity_units(round as f64)
                            .build(),
                    ],
                    item_collection_metrics: collections::HashMap::from([(
                        "t".to_string(),
                        vec![
                            types::ItemCollectionMetrics::builder()
                                .size_estimate_range_gb(round as f64)
                                .build(),
                        ],
                    )]),
                    ..page(vec![item(round)], unprocessed)
                }))
            },
            None,
        )
        .await
        .unwrap();
        let units: Vec<_> = response
            .consumed_capacity
            .iter()
            .map(|capacity| capacity.capacity_units)
            .collect();
        assert_eq!(units, vec![Some(1.0), Some(2.0), Some(3.0)]);
        let sizes: Vec<_> = response.item_collection_metrics["t"]
            .iter()
            .map(|metrics| metrics.size_estimate_range_gb.clone())
            .collect();
        assert_eq!(sizes, vec![Some(vec![1.0]), Some(vec![2.0]), Some(vec![3.0])]);
    }

    #[rstest]
    #[case::first(0, None, Some(1))]
    #[case::under_ceiling(1, Some(2), Some(2))]
    #[case::past_ceiling(2, Some(2), None)]
    #[case::saturates_without_ceiling(u32::MAX, None, Some(u32::MAX))]
    #[case::saturates_at_ceiling(u32::MAX, Some(u32::MAX), Some(u32::MAX))]
    fn test_next_retry(
        #[case] retries: u32,
        #[case] max_retries: Option<u32>,
        #[case] expected: Option<u32>,
    ) {
        assert_eq!(next_retry(retries, max_retries), expected);
    }

    #[tokio::test]
    async fn test_paginate_retries_same_request() {
        let mut sent = Vec::new();
        let response = paginate(
            request(2),
            |request| {
                sent.push(request);
                let result = if sent.len() < 3 {
                    Err(StoreError::retryable("ThrottlingException", "slow down"))
                } else {
                    Ok(page(vec![item(7)], None))
                };
                future::ready(result)
            },
            None,
        )
        .await
        .unwrap();
        assert_eq!(sent.len(), 3);
        assert!(sent.iter().all(|request| request == &sent[0]));
        assert_eq!(response.responses["t"], vec![item(7)]);
    }

    #[tokio::test]
    async fn test_paginate_fatal_discards_items() {
        let mut calls = 0;
        let error = paginate(
            request(2),
            |request| {
                calls += 1;
                let result = if calls == 1 {
                    Ok(page(vec![item(1)], Some(request)))
                } else {
                    Err(StoreError::fatal("ValidationException", "bad key"))
                };
                future::ready(result)
            },
            None,
        )
        .await
        .unwrap_err();
        assert_eq!(calls, 2);
        assert_eq!(error, StoreError::fatal("ValidationException", "bad key"));
    }

    #[rstest]
    #[case::no_retries(0, 1)]
    #[case::two_retries(2, 3)]
    #[tokio::test]
    async fn test_paginate_retry_ceiling(#[case] max_retries: u32, #[case] expected_calls: usize) {
        let mut calls = 0;
        let error = paginate(
            request(1),
            |_| {
                calls += 1;
                future::ready(Err::<client::BatchPage<Vec<types::WriteRequest>>, _>(
                    StoreError::retryable("ThrottlingException", "slow down"),
                ))
            },
            Some(max_retries),
        )
        .await
        .unwrap_err();
        assert!(error.retryable);
        assert_eq!(calls, expected_calls);
    }

    #[tokio::test]
    async fn test_paginate_ceiling_counts_consecutive_errors() {
        let mut calls = 0;
        let response = paginate(
            request(1),
            |request| {
                calls += 1;
                let result = match calls {
                    1 | 3 => Err(StoreError::retryable("ThrottlingException", "slow down")),
                    2 => Ok(page(vec![item(1)], Some(request))),
                    _ => Ok(page(vec![item(2)], None)),
                };
                future::ready(result)
            },
            Some(1),
        )
        .await
        .unwrap();
        assert_eq!(calls, 4);
        assert_eq!(response.responses["t"], vec![item(1), item(2)]);
    }
}
