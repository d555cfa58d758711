use crate::{connectors::probe::KeyRangeProbe, error::PartitionError};
use model::pagination::partition::Partition;
use std::sync::Arc;
use tracing::info;

/// Splits `[min, max]` into at most `count` contiguous, non-overlapping
/// ranges of `ceil(span / count)` keys each. The last range ends exactly
/// at `max`. When the domain holds fewer keys than `count`, fewer ranges
/// come back rather than empty ones.
pub fn compute_ranges(min: i64, max: i64, count: usize) -> Vec<Partition> {
    if count == 0 || min > max {
        return Vec::new();
    }

    let span = max as i128 - min as i128 + 1;
    let count = count as i128;
    let size = (span + count - 1) / count;

    let mut partitions = Vec::new();
    let mut lo = min as i128;
    while lo <= max as i128 {
        let hi = (lo + size - 1).min(max as i128);
        partitions.push(Partition::new(partitions.len(), lo as i64, hi as i64));
        lo = hi + 1;
    }
    partitions
}

/// Computes a step's partitions from a point-in-time snapshot of the
/// table's key domain.
#[derive(Clone)]
pub struct RangePartitioner {
    probe: Arc<dyn KeyRangeProbe>,
}

impl RangePartitioner {
    pub fn new(probe: Arc<dyn KeyRangeProbe>) -> Self {
        Self { probe }
    }

    pub async fn partition(
        &self,
        table: &str,
        column: &str,
        count: usize,
    ) -> Result<Vec<Partition>, PartitionError> {
        if count == 0 {
            return Err(PartitionError::InvalidCount);
        }

        let Some((min, max)) = self.probe.key_bounds(table, column).await? else {
            info!(table, "Source table is empty, no partitions");
            return Ok(Vec::new());
        };

        let partitions = compute_ranges(min, max, count);
        info!(
            table,
            column,
            min,
            max,
            requested = count,
            partitions = partitions.len(),
            "Computed key ranges"
        );
        Ok(partitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedProbe(Option<(i64, i64)>);

    #[async_trait]
    impl KeyRangeProbe for FixedProbe {
        async fn key_bounds(
            &self,
            _table: &str,
            _column: &str,
        ) -> Result<Option<(i64, i64)>, PartitionError> {
            Ok(self.0)
        }
    }

    struct DownProbe;

    #[async_trait]
    impl KeyRangeProbe for DownProbe {
        async fn key_bounds(
            &self,
            _table: &str,
            _column: &str,
        ) -> Result<Option<(i64, i64)>, PartitionError> {
            Err(PartitionError::Other("connection refused".into()))
        }
    }

    fn bounds(parts: &[Partition]) -> Vec<(i64, i64)> {
        parts.iter().map(|p| (p.min_key, p.max_key)).collect()
    }

    fn assert_exact_cover(parts: &[Partition], min: i64, max: i64) {
        assert_eq!(parts.first().unwrap().min_key, min);
        assert_eq!(parts.last().unwrap().max_key, max);
        for pair in parts.windows(2) {
            assert!(pair[0].min_key <= pair[0].max_key);
            assert_eq!(pair[0].max_key as i128 + 1, pair[1].min_key as i128);
        }
        for (i, p) in parts.iter().enumerate() {
            assert_eq!(p.index, i);
        }
    }

    #[test]
    fn hundred_keys_in_four() {
        let parts = compute_ranges(1, 100, 4);
        assert_eq!(bounds(&parts), vec![(1, 25), (26, 50), (51, 75), (76, 100)]);
    }

    #[test]
    fn uneven_split_clamps_last() {
        let parts = compute_ranges(1, 10, 3);
        assert_eq!(bounds(&parts), vec![(1, 4), (5, 8), (9, 10)]);
    }

    #[test]
    fn single_key_domain() {
        assert_eq!(bounds(&compute_ranges(42, 42, 4)), vec![(42, 42)]);
    }

    #[test]
    fn more_partitions_than_keys() {
        let parts = compute_ranges(1, 3, 8);
        assert_eq!(bounds(&parts), vec![(1, 1), (2, 2), (3, 3)]);
    }

    #[test]
    fn covers_domain_exactly_for_many_shapes() {
        let domains = [
            (1, 100),
            (-50, 50),
            (0, 0),
            (7, 1_000_003),
            (i64::MIN, i64::MAX),
            (i64::MAX - 10, i64::MAX),
        ];
        for (min, max) in domains {
            for count in 1..=17 {
                let parts = compute_ranges(min, max, count);
                assert!(!parts.is_empty());
                assert!(parts.len() <= count);
                assert_exact_cover(&parts, min, max);
            }
        }
    }

    #[tokio::test]
    async fn empty_table_has_no_partitions() {
        let partitioner = RangePartitioner::new(Arc::new(FixedProbe(None)));
        let parts = partitioner.partition("client", "id", 4).await.unwrap();
        assert!(parts.is_empty());
    }

    #[tokio::test]
    async fn probe_failure_is_fatal() {
        let partitioner = RangePartitioner::new(Arc::new(DownProbe));
        assert!(partitioner.partition("client", "id", 4).await.is_err());
    }

    #[tokio::test]
    async fn zero_count_is_rejected() {
        let partitioner = RangePartitioner::new(Arc::new(FixedProbe(Some((1, 10)))));
        assert!(matches!(
            partitioner.partition("client", "id", 0).await,
            Err(PartitionError::InvalidCount)
        ));
    }
}
