use thiserror::Error;

/// Enum containing all fatal error categories of the tool.
///
/// Metadata-call failures are deliberately not represented here; they are
/// logged and replaced by defaults without aborting the run.
#[derive(Debug, Error)]
pub enum CheckError {
    /// Bad RPC URL shape or unusable configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Malformed token/owner/spender address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Endpoint unreachable or not responding within the timeout.
    #[error("RPC connection failed: {0}")]
    Connection(String),

    /// A view call could not be encoded, sent, or decoded.
    #[error("contract call failed: {0}")]
    Call(String),

    /// The allowance query itself failed; unlike metadata this is fatal.
    #[error("allowance query failed: {0}")]
    AllowanceFetch(String),

    /// A human-units amount string could not be parsed.
    #[error("cannot parse amount: {0}")]
    Parse(String),
}

impl CheckError {
    /// Process exit code for this error: 1 for input/configuration problems,
    /// 2 for failures of the allowance call itself.
    pub fn exit_code(&self) -> i32 {
        match self {
            CheckError::InvalidConfig(_)
            | CheckError::InvalidAddress(_)
            | CheckError::Connection(_)
            | CheckError::Parse(_) => 1,
            CheckError::Call(_) | CheckError::AllowanceFetch(_) => 2,
        }
    }
}
