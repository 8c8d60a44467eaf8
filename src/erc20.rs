use tokio::time::{error::Elapsed, timeout};
use web3::contract::tokens::Detokenize;
use web3::contract::{Contract, Options};
use web3::transports::http::Http;
use web3::types::{Address, BlockId, U256};

use crate::client::{ChainClient, Web3Type};
use crate::error::CheckError;
use crate::types::TokenMetadata;

// to avoid having to rely on reading an external file
// minimal read-only interface: "name", "symbol", "decimals", "allowance"
static ABI_STR: &'static str = r#"[{"inputs":[],"name":"name","outputs":[{"internalType":"string","name":"","type":"string"}],"stateMutability":"view","type":"function"},{"inputs":[],"name":"symbol","outputs":[{"internalType":"string","name":"","type":"string"}],"stateMutability":"view","type":"function"},{"inputs":[],"name":"decimals","outputs":[{"internalType":"uint8","name":"","type":"uint8"}],"stateMutability":"view","type":"function"},{"name":"allowance","inputs":[{"internalType":"address","name":"owner","type":"address"},{"internalType":"address","name":"spender","type":"address"}],"outputs":[{"internalType":"uint256","name":"","type":"uint256"}],"stateMutability":"view","type":"function"}]"#;

/// Create a contract instance bound to the minimal ERC20 interface.
///
/// # Arguments
/// * `web3` - web3 instance
/// * `token_address` - token contract address, already validated
pub fn create_contract(web3: &Web3Type, token_address: Address) -> Result<Contract<Http>, CheckError> {
    Contract::from_json(web3.eth(), token_address, ABI_STR.as_bytes()).map_err(|e| {
        CheckError::Call(format!(
            "cannot build ERC20 interface for {:?}; err={}",
            token_address, e
        ))
    })
}

/// Utility function to make a no-argument view query at the latest block.
/// Internally this function will use default options with no parameters
/// specified to make a call to the specified function.
///
/// # Arguments
/// * `contract` - `web3::contract::Contract`
/// * `fn_name` - name of function to make a call
fn query_no_params<'a, R>(
    contract: &'a Contract<Http>,
    fn_name: &'a str,
) -> impl core::future::Future<Output = web3::contract::Result<R>> + 'a
where
    R: Detokenize + 'a,
{
    contract.query(fn_name, (), None, Options::default(), None)
}

/// Unwrap a timeout-bounded metadata query, substituting the default on any
/// failure. Metadata is cosmetic; failures are logged and never fatal.
fn metadata_or_default<T>(
    result: Result<web3::contract::Result<T>, Elapsed>,
    field: &str,
    default: T,
) -> T {
    match result {
        Ok(Ok(value)) => value,
        Ok(Err(e)) => {
            log::debug!("{} query failed, using default; err={}", field, e);
            default
        }
        Err(_) => {
            log::debug!("{} query timed out, using default", field);
            default
        }
    }
}

/// Query the token's name, symbol and decimals.
///
/// The three queries are independent and issued concurrently; each one that
/// fails is replaced by its documented default without affecting the others.
///
/// # Arguments
/// * `client` - established chain client
/// * `contract` - ERC20 contract instance
pub async fn fetch_metadata(client: &ChainClient, contract: &Contract<Http>) -> TokenMetadata {
    let name_f = timeout(client.call_timeout, query_no_params::<String>(contract, "name"));
    let symbol_f = timeout(
        client.call_timeout,
        query_no_params::<String>(contract, "symbol"),
    );
    let decimals_f = timeout(
        client.call_timeout,
        query_no_params::<u8>(contract, "decimals"),
    );

    let (name, symbol, decimals) = futures::join!(name_f, symbol_f, decimals_f);

    let defaults = TokenMetadata::default();
    TokenMetadata {
        name: metadata_or_default(name, "name", defaults.name),
        symbol: metadata_or_default(symbol, "symbol", defaults.symbol),
        decimals: metadata_or_default(decimals, "decimals", defaults.decimals),
    }
}

/// Query `allowance(owner, spender)` at the requested block.
///
/// Unlike metadata this is the deliverable of the whole run; any failure
/// (revert, undecodable response, transport error, timeout) is fatal.
///
/// # Arguments
/// * `client` - established chain client
/// * `contract` - ERC20 contract instance
/// * `owner` - owner address granting the allowance
/// * `spender` - spender address receiving the allowance
/// * `block` - block to evaluate the call at
pub async fn fetch_allowance(
    client: &ChainClient,
    contract: &Contract<Http>,
    owner: Address,
    spender: Address,
    block: BlockId,
) -> Result<U256, CheckError> {
    let query = contract.query("allowance", (owner, spender), None, Options::default(), block);

    match timeout(client.call_timeout, query).await {
        Ok(Ok(raw)) => Ok(raw),
        Ok(Err(e)) => Err(CheckError::AllowanceFetch(format!(
            "allowance call failed (is this a valid ERC20?); owner={:?}, spender={:?}, err={}",
            owner, spender, e
        ))),
        Err(_) => Err(CheckError::AllowanceFetch(format!(
            "allowance call timed out after {:?}",
            client.call_timeout
        ))),
    }
}
