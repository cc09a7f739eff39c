//! Property tests for progress interpolation and the chunk queue.

use folio::chunks::{ChunkInfo, ChunkQueue};
use folio::interpolate_percentile;
use proptest::prelude::*;

proptest! {
    #[test]
    fn percentile_stays_in_unit_range(
        current in 0u64..=100_000,
        span in 0u64..=100_000,
        fraction in 0.0f64..=1.0,
    ) {
        let file_size = 100_000u64;
        let next = (current + span).min(file_size);
        let p = interpolate_percentile(current, next, file_size, fraction);
        prop_assert!(p >= 0.0);
        prop_assert!(p <= 1.0 + 1e-9);
    }

    #[test]
    fn percentile_non_decreasing_in_offset(
        a in 0u64..=50_000,
        delta in 0u64..=50_000,
        fraction in 0.0f64..=1.0,
    ) {
        let file_size = 100_000u64;
        let next = 100_000u64;
        let lo = interpolate_percentile(a, next, file_size, fraction);
        let hi = interpolate_percentile(a + delta, next, file_size, fraction);
        prop_assert!(hi >= lo - 1e-9);
    }

    #[test]
    fn percentile_grows_with_fraction(
        current in 0u64..=90_000,
        fraction in 0.0f64..1.0,
    ) {
        let file_size = 100_000u64;
        let next = current + 1_000;
        let base = interpolate_percentile(current, next, file_size, fraction);
        let more = interpolate_percentile(current, next, file_size, 1.0);
        prop_assert!(more >= base);
    }

    #[test]
    fn empty_file_always_reads_as_finished(
        current in 0u64..=100_000,
        next in 0u64..=100_000,
        fraction in 0.0f64..=1.0,
    ) {
        prop_assert_eq!(interpolate_percentile(current, next, 0, fraction), 1.0);
    }

    #[test]
    fn queue_preserves_fifo_order(positions in proptest::collection::vec(0u64..1_000_000, 1..32)) {
        let mut queue = ChunkQueue::new();
        for &pos in &positions {
            queue.push(ChunkInfo {
                section_id: None,
                section_title: None,
                byte_position: pos,
            });
        }
        prop_assert_eq!(queue.len(), positions.len());
        prop_assert_eq!(queue.oldest().unwrap().byte_position, positions[0]);

        for &pos in &positions {
            let front = queue.pop_oldest().unwrap();
            prop_assert_eq!(front.byte_position, pos);
        }
        prop_assert!(queue.is_empty());
    }

    #[test]
    fn queue_pop_newest_keeps_front_stable(positions in proptest::collection::vec(0u64..1_000_000, 2..32)) {
        let mut queue = ChunkQueue::new();
        for &pos in &positions {
            queue.push(ChunkInfo {
                section_id: None,
                section_title: None,
                byte_position: pos,
            });
        }
        let popped = queue.pop_newest().unwrap();
        prop_assert_eq!(popped.byte_position, *positions.last().unwrap());
        prop_assert_eq!(queue.oldest().unwrap().byte_position, positions[0]);
        prop_assert_eq!(queue.len(), positions.len() - 1);
    }
}
