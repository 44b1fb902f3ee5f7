/// Splits `items` into exactly `workers` contiguous slices.
///
/// Slice lengths differ by at most one; the first `len % workers` slices carry
/// the extra element. Concatenating the slices in order gives back `items`.
/// When there are fewer items than workers the trailing slices are empty.
/// A worker count of zero is treated as one.
pub fn partition<T>(items: &[T], workers: usize) -> Vec<&[T]> {
    let workers = workers.max(1);
    let base = items.len() / workers;
    let extra = items.len() % workers;

    let mut parts = Vec::with_capacity(workers);
    let mut start = 0;

    for idx in 0..workers {
        let len = base + usize::from(idx < extra);
        parts.push(&items[start..start + len]);
        start += len;
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_covers_input_exactly() {
        for len in 0..40usize {
            let items: Vec<usize> = (0..len).collect();

            for workers in 1..12usize {
                let parts = partition(&items, workers);

                assert_eq!(parts.len(), workers);
                let rebuilt: Vec<usize> = parts.iter().flat_map(|p| p.iter().copied()).collect();
                assert_eq!(rebuilt, items, "len={len} workers={workers}");

                let floor = len / workers;
                for part in &parts {
                    assert!(part.len() == floor || part.len() == floor + 1);
                }
            }
        }
    }

    #[test]
    fn test_partition_front_loads_remainder() {
        let items: Vec<u8> = (0..23).collect();
        let lens: Vec<usize> = partition(&items, 10).iter().map(|p| p.len()).collect();
        assert_eq!(lens, vec![3, 3, 3, 2, 2, 2, 2, 2, 2, 2]);
    }

    #[test]
    fn test_partition_fewer_items_than_workers() {
        let items = ["a", "b", "c"];
        let parts = partition(&items, 10);

        assert_eq!(parts.len(), 10);
        assert_eq!(parts.iter().filter(|p| p.is_empty()).count(), 7);
        assert_eq!(parts[0], &["a"]);
        assert_eq!(parts[2], &["c"]);
    }

    #[test]
    fn test_partition_zero_workers_acts_as_one() {
        let items = [1, 2, 3];
        let parts = partition(&items, 0);
        assert_eq!(parts, vec![&items[..]]);
    }
}
