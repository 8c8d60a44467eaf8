use clap::Parser;
use std::time::Instant;

mod amount;
mod client;
mod erc20;
mod error;
mod report;
mod types;
mod validate;

use error::CheckError;
use report::RunReport;
use types::{AllowanceResult, CommandlineArgs};

/// Fallback RPC endpoint of the Ethereum chain
static DEFAULT_RPC_ENDPOINT: &str = "https://rpc.ankr.com/eth";

/// Resolve the RPC endpoint once at startup: `--rpc` flag, then the `RPC_URL`
/// environment variable, then the hardcoded public endpoint.
fn resolve_rpc(flag: Option<String>) -> String {
    flag.or_else(|| std::env::var("RPC_URL").ok())
        .unwrap_or_else(|| DEFAULT_RPC_ENDPOINT.to_owned())
}

/// Wall-clock seconds since `start`, rounded to two decimals the way the
/// report displays them.
fn elapsed_secs(start: Instant) -> f64 {
    (start.elapsed().as_secs_f64() * 100.0).round() / 100.0
}

fn emit_json(report: &RunReport) {
    match serde_json::to_string_pretty(report) {
        Ok(doc) => println!("{}", doc),
        Err(e) => log::error!("cannot serialize report; err={}", e),
    }
}

/// Run the whole pipeline: validate, connect, read, format, report.
/// Returns the process exit code; fatal errors bubble up as `CheckError`.
async fn run(cmd_args: CommandlineArgs, start_time: Instant) -> Result<i32, CheckError> {
    let rpc = resolve_rpc(cmd_args.rpc);
    validate::validate_rpc_url(&rpc)?;

    let token_display = validate::normalize_address(&cmd_args.token)?;
    let owner_display = validate::normalize_address(&cmd_args.owner)?;
    let spender_display = validate::normalize_address(&cmd_args.spender)?;
    let token = validate::parse_address(&token_display)?;
    let owner = validate::parse_address(&owner_display)?;
    let spender = validate::parse_address(&spender_display)?;
    let block = client::parse_block_tag(&cmd_args.block)?;

    let chain = client::connect(&rpc, cmd_args.timeout).await?;
    let contract = erc20::create_contract(&chain.web3, token)?;
    let meta = erc20::fetch_metadata(&chain, &contract).await;

    let mut run_report = RunReport {
        rpc,
        chain_id: chain.chain_id,
        token: token_display,
        token_name: meta.name.to_owned(),
        token_symbol: meta.symbol.to_owned(),
        decimals: meta.decimals,
        owner: owner_display,
        spender: spender_display,
        block: cmd_args.block.to_owned(),
        allowance_raw: None,
        allowance_human: None,
        expected_human: None,
        expected_raw: None,
        matched: None,
        error: None,
        elapsed_seconds: 0.0,
        expected_skipped: None,
    };

    let raw = match erc20::fetch_allowance(&chain, &contract, owner, spender, block).await {
        Ok(raw) => raw,
        Err(e) => {
            // post-connection failure: still emit the partial JSON document
            // when asked, so the failing runs stay machine readable
            eprintln!("{}", e);
            if cmd_args.json {
                run_report.error = Some(e.to_string());
                run_report.elapsed_seconds = elapsed_secs(start_time);
                emit_json(&run_report);
            }
            return Ok(e.exit_code());
        }
    };

    let allowance = AllowanceResult {
        raw,
        human: amount::to_human(raw, meta.decimals),
    };
    run_report.allowance_raw = Some(allowance.raw.to_string());
    run_report.allowance_human = Some(allowance.human.to_owned());

    if let Some(expected) = &cmd_args.expected {
        // parse failure here degrades to a skipped comparison; the allowance
        // itself has already been obtained
        match amount::to_raw(expected, meta.decimals) {
            Ok(expected_raw) => {
                run_report.expected_human = Some(expected.to_owned());
                run_report.expected_raw = Some(expected_raw.to_string());
                run_report.matched = Some(expected_raw == allowance.raw);
            }
            Err(e) => {
                log::debug!("expected value not usable; err={}", e);
                run_report.expected_skipped = Some(e.to_string());
            }
        }
    }

    run_report.elapsed_seconds = elapsed_secs(start_time);

    for line in report::render_lines(&run_report) {
        println!("{}", line);
    }
    if cmd_args.json {
        emit_json(&run_report);
    }

    Ok(report::exit_code(run_report.matched))
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cmd_args = CommandlineArgs::parse();
    let start_time = Instant::now();

    match run(cmd_args, start_time).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(e.exit_code());
        }
    }
}
