use std::time::Duration;

use tokio::time::timeout;
use web3::transports::http::Http;
use web3::types::{BlockId, BlockNumber, U64};
use web3::Web3;

use crate::error::CheckError;

pub type Web3Type = Web3<Http>;

/// An established JSON-RPC session plus the per-call timeout every subsequent
/// query is bounded by.
pub struct ChainClient {
    pub web3: Web3Type,
    pub call_timeout: Duration,

    /// Chain id as reported by the endpoint; informational only, `None` when
    /// the endpoint would not tell us.
    pub chain_id: Option<u64>,
}

/// Connect to an RPC endpoint and probe it for liveness.
///
/// The probe is a single `eth_blockNumber` bounded by `timeout_secs`; if it
/// does not come back in time the endpoint is treated as unreachable. The
/// chain id is fetched afterwards on a best-effort basis.
///
/// # Arguments
/// * `rpc_url` - http(s) endpoint URL, already validated
/// * `timeout_secs` - per-call timeout in seconds
pub async fn connect(rpc_url: &str, timeout_secs: u64) -> Result<ChainClient, CheckError> {
    let http = Http::new(rpc_url).map_err(|e| {
        CheckError::Connection(format!(
            "cannot create HTTP transport for {}; err={}",
            rpc_url, e
        ))
    })?;
    let web3 = Web3::new(http);
    let call_timeout = Duration::from_secs(timeout_secs);

    match timeout(call_timeout, web3.eth().block_number()).await {
        Ok(Ok(block_number)) => {
            log::debug!("liveness probe ok, endpoint at block {}", block_number);
        }
        Ok(Err(e)) => {
            return Err(CheckError::Connection(format!(
                "endpoint {} not responding; err={}",
                rpc_url, e
            )));
        }
        Err(_) => {
            return Err(CheckError::Connection(format!(
                "endpoint {} timed out after {}s",
                rpc_url, timeout_secs
            )));
        }
    }

    let chain_id = match timeout(call_timeout, web3.eth().chain_id()).await {
        Ok(Ok(id)) => Some(id.as_u64()),
        Ok(Err(e)) => {
            log::debug!("chain id query failed; err={}", e);
            None
        }
        Err(_) => {
            log::debug!("chain id query timed out");
            None
        }
    };

    Ok(ChainClient {
        web3,
        call_timeout,
        chain_id,
    })
}

/// Parse a user-supplied block tag into a `BlockId` for `eth_call`.
///
/// Accepts the named tags plus decimal and `0x`-hex block numbers.
///
/// # Arguments
/// * `tag` - block tag string, e.g. "latest", "safe", "17000000", "0x103664c"
pub fn parse_block_tag(tag: &str) -> Result<BlockId, CheckError> {
    let block_number = match tag {
        "latest" => BlockNumber::Latest,
        "earliest" => BlockNumber::Earliest,
        "pending" => BlockNumber::Pending,
        "safe" => BlockNumber::Safe,
        "finalized" => BlockNumber::Finalized,
        _ => {
            let parsed = if let Some(hex_digits) = tag.strip_prefix("0x") {
                u64::from_str_radix(hex_digits, 16)
            } else {
                tag.parse::<u64>()
            };
            let number = parsed.map_err(|_| {
                CheckError::InvalidConfig(format!(
                    "unrecognized block tag; tag={} (expected latest/earliest/pending/safe/finalized or a block number)",
                    tag
                ))
            })?;
            BlockNumber::Number(U64::from(number))
        }
    };

    Ok(BlockId::Number(block_number))
}
