//! Stellar RPC client implementation.
//!
//! A ledger is assembled from three calls: `getLedgers` for the header, then
//! `getTransactions` and `getEvents` paged by cursor until the ledger is exhausted.
//! All XDR is requested in its JSON rendering.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::{
	models::{
		BlockType, StellarBaseBlock, StellarBlock, StellarEvent, StellarLedgerInfo,
		StellarTransaction,
	},
	services::blockchain::{BlockChainClient, BlockChainError, BlockchainTransport},
};

/// Page size for `getTransactions` and `getEvents`
const PAGE_LIMIT: u32 = 200;

/// Upper bound on pages read for one ledger
const MAX_PAGES: usize = 50;

/// Client implementation for the Stellar RPC
#[derive(Clone)]
pub struct StellarClient<T: BlockchainTransport> {
	transport: T,
}

impl<T: BlockchainTransport> StellarClient<T> {
	pub fn new(transport: T) -> Self {
		Self { transport }
	}

	pub fn url(&self) -> &str {
		self.transport.url()
	}

	fn ledger_metadata(&self, sequence: u64) -> Option<HashMap<String, String>> {
		Some(HashMap::from([
			("ledger".to_string(), sequence.to_string()),
			("url".to_string(), self.transport.url().to_string()),
		]))
	}

	fn decode<D: DeserializeOwned>(
		&self,
		value: Value,
		what: &str,
		sequence: u64,
	) -> Result<D, BlockChainError> {
		serde_json::from_value(value).map_err(|e| {
			BlockChainError::request_error(
				format!("Failed to decode {}: {}", what, e),
				Some(Box::new(e)),
				self.ledger_metadata(sequence),
			)
		})
	}

	async fn get_ledger_info(&self, sequence: u64) -> Result<StellarLedgerInfo, BlockChainError> {
		let result = self
			.transport
			.send_raw_request(
				"getLedgers",
				Some(json!({
					"startLedger": sequence,
					"pagination": { "limit": 1 },
					"xdrFormat": "json"
				})),
			)
			.await?;

		let ledgers: Vec<StellarLedgerInfo> = self.decode(
			result.get("ledgers").cloned().unwrap_or(Value::Array(vec![])),
			"ledgers",
			sequence,
		)?;

		ledgers
			.into_iter()
			.find(|ledger| ledger.sequence == sequence)
			.ok_or_else(|| {
				BlockChainError::block_not_found(sequence, None, self.ledger_metadata(sequence))
			})
	}

	/// Reads every item of `field` belonging to `sequence`, following cursors.
	///
	/// Items come back in ledger order, so paging stops at the first item of a later
	/// ledger or when the endpoint returns a short page.
	async fn paged<D: DeserializeOwned>(
		&self,
		method: &str,
		field: &str,
		sequence: u64,
		first_params: Value,
		ledger_of: fn(&D) -> u64,
	) -> Result<Vec<D>, BlockChainError> {
		let mut items = Vec::new();
		let mut params = first_params;

		for _ in 0..MAX_PAGES {
			let result = self.transport.send_raw_request(method, Some(params)).await?;

			let page: Vec<D> = self.decode(
				result.get(field).cloned().unwrap_or(Value::Array(vec![])),
				field,
				sequence,
			)?;
			let page_len = page.len();

			let mut past_ledger = false;
			for item in page {
				match ledger_of(&item) {
					n if n == sequence => items.push(item),
					n if n > sequence => past_ledger = true,
					_ => {}
				}
			}

			let cursor = result.get("cursor").and_then(Value::as_str);
			match cursor {
				Some(cursor) if !past_ledger && page_len as u32 >= PAGE_LIMIT => {
					params = json!({
						"pagination": { "cursor": cursor, "limit": PAGE_LIMIT },
						"xdrFormat": "json"
					});
					if method == "getEvents" {
						params["filters"] = json!([]);
					}
				}
				_ => return Ok(items),
			}
		}

		Err(BlockChainError::request_error(
			format!("{} did not finish within {} pages", method, MAX_PAGES),
			None,
			self.ledger_metadata(sequence),
		))
	}
}

#[async_trait]
impl<T: BlockchainTransport> BlockChainClient for StellarClient<T> {
	async fn get_latest_block_number(&self) -> Result<u64, BlockChainError> {
		let result = self
			.transport
			.send_raw_request("getLatestLedger", None)
			.await?;

		result
			.get("sequence")
			.and_then(Value::as_u64)
			.ok_or_else(|| {
				BlockChainError::request_error(
					format!("Invalid getLatestLedger response: {}", result),
					None,
					None,
				)
			})
	}

	#[tracing::instrument(skip(self), fields(url = %self.transport.url()))]
	async fn get_block(&self, block_number: u64) -> Result<BlockType, BlockChainError> {
		let ledger = self.get_ledger_info(block_number).await?;

		let transactions: Vec<StellarTransaction> = self
			.paged(
				"getTransactions",
				"transactions",
				block_number,
				json!({
					"startLedger": block_number,
					"pagination": { "limit": PAGE_LIMIT },
					"xdrFormat": "json"
				}),
				|tx: &StellarTransaction| tx.ledger,
			)
			.await?;

		let events: Vec<StellarEvent> = self
			.paged(
				"getEvents",
				"events",
				block_number,
				json!({
					"startLedger": block_number,
					"endLedger": block_number + 1,
					"filters": [],
					"pagination": { "limit": PAGE_LIMIT },
					"xdrFormat": "json"
				}),
				|event: &StellarEvent| event.ledger,
			)
			.await?;

		Ok(BlockType::Stellar(Box::new(StellarBlock::from(
			StellarBaseBlock {
				ledger,
				transactions,
				events,
			},
		))))
	}
}
