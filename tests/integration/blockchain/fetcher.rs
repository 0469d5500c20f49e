use std::{
	sync::{
		atomic::{AtomicU32, Ordering},
		Arc,
	},
	time::Duration,
};

use backon::ExponentialBuilder;
use blockwatch_monitor::{
	models::BlockType,
	services::blockchain::{create_endpoint_pool, BlockChainError, BlockFetcher, EndpointPool},
	utils::tests::NetworkBuilder,
};
use mockito::Matcher;
use serde_json::json;

use crate::integration::mocks::{mint_ledger, MockClient};

fn fast_backoff() -> ExponentialBuilder {
	ExponentialBuilder::default().with_min_delay(Duration::from_millis(1))
}

fn empty_block_body(number: u64) -> String {
	json!({
		"jsonrpc": "2.0",
		"id": 1,
		"result": {
			"number": format!("0x{:x}", number),
			"hash": "0x0000000000000000000000000000000000000000000000000000000000000001",
			"timestamp": "0x5",
			"transactions": []
		}
	})
	.to_string()
}

#[tokio::test]
async fn test_fetch_range_rotates_away_from_rate_limited_endpoint() {
	let mut limited = mockito::Server::new_async().await;
	let rate_limited = limited
		.mock("POST", "/")
		.with_status(429)
		.expect_at_least(0)
		.create_async()
		.await;

	let mut healthy = mockito::Server::new_async().await;
	for number in 5..=7u64 {
		healthy
			.mock("POST", "/")
			.match_body(Matcher::PartialJson(json!({
				"method": "eth_getBlockByNumber",
				"params": [format!("0x{:x}", number), true]
			})))
			.with_status(200)
			.with_body(empty_block_body(number))
			.create_async()
			.await;
	}

	let network = NetworkBuilder::new()
		.rpc_url(&limited.url())
		.add_rpc_url(&healthy.url(), 1)
		.max_fetch_attempts(4)
		.build();
	let pool = Arc::new(create_endpoint_pool(&network).unwrap());
	let fetcher = BlockFetcher::new(&network, pool.clone()).with_backoff(fast_backoff());

	let blocks = fetcher.fetch_range(5, 7).await.unwrap();
	let numbers: Vec<_> = blocks.iter().map(BlockType::number).collect();
	assert_eq!(numbers, vec![Some(5), Some(6), Some(7)]);

	if rate_limited.matched_async().await {
		assert!(pool.is_cooling_down(&limited.url()).await);
	}
}

#[tokio::test(start_paused = true)]
async fn test_range_fails_as_a_whole_after_attempts_are_exhausted() {
	let calls = Arc::new(AtomicU32::new(0));
	let mut client = MockClient::new();
	let counter = calls.clone();
	client.expect_get_block().returning(move |number| {
		if number == 6 {
			counter.fetch_add(1, Ordering::SeqCst);
			return Err(BlockChainError::connection_error("reset", None, None));
		}
		Ok(BlockType::Stellar(Box::new(mint_ledger(number))))
	});

	let network = NetworkBuilder::new()
		.stellar()
		.max_fetch_attempts(3)
		.build();
	let pool = EndpointPool::new(network.slug.clone(), vec![("http://rpc".to_string(), 1, client)])
		.with_cooldown(Duration::from_millis(1), Duration::from_millis(1));
	let fetcher = BlockFetcher::new(&network, Arc::new(pool)).with_backoff(
		ExponentialBuilder::default()
			.with_min_delay(Duration::from_millis(5))
			.with_max_delay(Duration::from_millis(5)),
	);

	let result = fetcher.fetch_range(5, 7).await;
	assert!(matches!(result, Err(BlockChainError::FetchError(_))));
	assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_no_healthy_endpoint_is_not_wrapped() {
	let mut client = MockClient::new();
	client
		.expect_get_latest_block_number()
		.times(1)
		.returning(|| Err(BlockChainError::connection_error("refused", None, None)));

	let network = NetworkBuilder::new().max_fetch_attempts(5).build();
	let pool = EndpointPool::new(network.slug.clone(), vec![("http://rpc".to_string(), 1, client)])
		.with_cooldown(Duration::from_secs(30), Duration::from_secs(30));
	let fetcher = BlockFetcher::new(&network, Arc::new(pool)).with_backoff(fast_backoff());

	let result = fetcher.latest_block_number().await;
	assert!(matches!(result, Err(BlockChainError::NoHealthyEndpoint(_))));
}
