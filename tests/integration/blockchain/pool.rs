use std::time::Duration;

use blockwatch_monitor::services::blockchain::{BlockChainError, EndpointOutcome, EndpointPool};

use crate::integration::mocks::MockClient;

fn pool(weights: &[u32]) -> EndpointPool<MockClient> {
	let endpoints = weights
		.iter()
		.enumerate()
		.map(|(i, weight)| (format!("http://rpc-{}", i), *weight, MockClient::new()))
		.collect();
	EndpointPool::new("ethereum_mainnet", endpoints)
		.with_cooldown(Duration::from_secs(1), Duration::from_secs(60))
}

#[tokio::test]
async fn test_zero_weight_endpoint_is_never_acquired() {
	let pool = pool(&[0, 1]);
	for _ in 0..200 {
		assert_eq!(pool.acquire().await.unwrap().url, "http://rpc-1");
	}
}

#[tokio::test(start_paused = true)]
async fn test_failed_endpoint_is_skipped_until_cooldown_expires() {
	let pool = pool(&[1, 1]);

	let endpoint = loop {
		let endpoint = pool.acquire().await.unwrap();
		if endpoint.url == "http://rpc-0" {
			break endpoint;
		}
	};
	pool.report(&endpoint, EndpointOutcome::Failure).await;

	for _ in 0..50 {
		assert_eq!(pool.acquire().await.unwrap().url, "http://rpc-1");
	}

	tokio::time::advance(Duration::from_millis(1001)).await;
	assert!(!pool.is_cooling_down("http://rpc-0").await);
}

#[tokio::test(start_paused = true)]
async fn test_all_endpoints_cooling_down() {
	let pool = pool(&[3, 1]);

	for _ in 0..2 {
		let endpoint = pool.acquire().await.unwrap();
		pool.report(&endpoint, EndpointOutcome::Failure).await;
	}

	let result = pool.acquire().await;
	assert!(matches!(result, Err(BlockChainError::NoHealthyEndpoint(_))));
}

#[tokio::test(start_paused = true)]
async fn test_success_resets_backoff() {
	let pool = pool(&[1]);
	let endpoint = pool.acquire().await.unwrap();

	for _ in 0..3 {
		pool.report(&endpoint, EndpointOutcome::Failure).await;
	}
	// Three failures: 4s of cool-down
	tokio::time::advance(Duration::from_millis(3500)).await;
	assert!(pool.is_cooling_down("http://rpc-0").await);
	tokio::time::advance(Duration::from_millis(600)).await;
	assert!(!pool.is_cooling_down("http://rpc-0").await);

	pool.report(&endpoint, EndpointOutcome::Success).await;
	pool.report(&endpoint, EndpointOutcome::Failure).await;
	tokio::time::advance(Duration::from_millis(1001)).await;
	assert!(!pool.is_cooling_down("http://rpc-0").await);
}
