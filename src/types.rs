use clap::Parser;
use web3::types::U256;

#[derive(Debug, Parser)]
#[clap(name="allowcheck")]
#[clap(about="cli tool to query an ERC20 allowance for an owner/spender pair, optionally verifying it against an expected amount")]
pub struct CommandlineArgs {
    /// RPC endpoint URL (http/https). Falls back to the RPC_URL environment
    /// variable, then to a public Ethereum mainnet endpoint.
    #[clap(long="rpc")]
    pub rpc: Option<String>,

    /// ERC20 token contract address.
    #[clap(long="token", required=true)]
    pub token: String,

    /// Owner address granting the allowance.
    #[clap(long="owner", required=true)]
    pub owner: String,

    /// Spender address the allowance is granted to.
    #[clap(long="spender", required=true)]
    pub spender: String,

    /// Block tag to evaluate the call at: latest, earliest, pending, safe,
    /// finalized, or a block number (decimal or 0x-hex).
    #[clap(long="block", default_value="latest")]
    pub block: String,

    /// Expected allowance in human units, e.g. 100.5. When given, the tool
    /// compares it against the queried allowance and reports MATCH/MISMATCH.
    #[clap(long="expected")]
    pub expected: Option<String>,

    /// Per-call RPC timeout in seconds.
    #[clap(long="timeout", default_value_t=30)]
    pub timeout: u64,

    /// Also emit a machine-readable JSON report to stdout.
    #[clap(long="json")]
    pub json: bool,
}

/// Token-level meta information, best-effort.
///
/// Each field independently falls back to its default when the corresponding
/// contract call fails; metadata is cosmetic, never authoritative.
#[derive(Debug)]
pub struct TokenMetadata {
    /// Token name
    pub name: String,

    /// Token ticker symbol
    pub symbol: String,

    /// Number of decimals of the token
    pub decimals: u8,
}

impl Default for TokenMetadata {
    fn default() -> Self {
        Self {
            name: "Unknown".to_owned(),
            symbol: "???".to_owned(),
            decimals: 18,
        }
    }
}

/// Queried allowance in both representations.
///
/// `raw` is the ground truth; `human` is a lossy display string scaled by the
/// token's decimals and must never be used for comparisons.
#[derive(Debug)]
pub struct AllowanceResult {
    pub raw: U256,
    pub human: String,
}
