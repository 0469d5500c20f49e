use std::sync::Arc;

use blockwatch_monitor::{
	services::blockwatcher::{plan_range, BlockStorage, FileBlockStorage, ProgressTracker},
	utils::tests::NetworkBuilder,
};
use proptest::{prelude::*, test_runner::Config};
use tempfile::TempDir;

proptest! {
	#![proptest_config(Config {
		failure_persistence: None,
		..Config::default()
	})]

	#[test]
	fn prop_range_never_exceeds_window(
		checkpoint in proptest::option::of(0u64..1_000_000),
		latest in 0u64..1_000_000,
		confirmations in 0u64..64,
		max_past_blocks in 0u64..500,
	) {
		if let Some(range) = plan_range(checkpoint, latest, confirmations, max_past_blocks) {
			prop_assert!(range.from <= range.to);
			prop_assert!(range.block_count() <= max_past_blocks.max(1));
			prop_assert!(range.to <= latest - confirmations);
			match checkpoint {
				Some(checkpoint) => prop_assert_eq!(range.from, checkpoint + 1),
				None => prop_assert_eq!(range.from, latest - confirmations),
			}
		}
	}

	#[test]
	fn prop_consecutive_ranges_leave_no_gaps(
		start in 0u64..1000,
		heads in prop::collection::vec(0u64..200, 1..20),
		max_past_blocks in 1u64..50,
	) {
		let mut checkpoint = Some(start);
		let mut latest = start;
		for advance in heads {
			latest += advance;
			if let Some(range) = plan_range(checkpoint, latest, 0, max_past_blocks) {
				prop_assert_eq!(Some(range.from - 1), checkpoint);
				checkpoint = Some(range.to);
			}
		}
	}

	#[test]
	fn prop_checkpoint_is_monotonic(commits in prop::collection::vec(0u64..10_000, 1..15)) {
		let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
		runtime.block_on(async {
			let dir = TempDir::new().unwrap();
			let storage: Arc<dyn BlockStorage> = Arc::new(FileBlockStorage::new(dir.path().to_path_buf()));
			let network = NetworkBuilder::new().build();
			let tracker = ProgressTracker::new(&network, storage);

			let mut highest = None::<u64>;
			for block in commits {
				tracker.commit(block).await.unwrap();
				highest = highest.max(Some(block));
				assert_eq!(tracker.checkpoint().await.unwrap(), highest);
			}
		});
	}
}
