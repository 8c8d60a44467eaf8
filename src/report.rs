use serde::Serialize;

/// Everything one invocation learned, assembled for display and for the
/// optional JSON document. Lives only for the duration of the run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub rpc: String,
    pub chain_id: Option<u64>,
    pub token: String,
    pub token_name: String,
    pub token_symbol: String,
    pub decimals: u8,
    pub owner: String,
    pub spender: String,
    pub block: String,
    pub allowance_raw: Option<String>,
    pub allowance_human: Option<String>,
    pub expected_human: Option<String>,
    pub expected_raw: Option<String>,
    #[serde(rename = "match")]
    pub matched: Option<bool>,
    /// Failure message for runs that died after connecting; null on success.
    pub error: Option<String>,
    pub elapsed_seconds: f64,

    /// Why the expected-value comparison was skipped, if it was. Display
    /// only; the JSON schema reports the skip as null expected fields.
    #[serde(skip)]
    pub expected_skipped: Option<String>,
}

/// Render the ordered human-readable lines of the report.
pub fn render_lines(report: &RunReport) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(format!(
        "{} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(chain_id) = report.chain_id {
        lines.push(format!("Chain ID: {}", chain_id));
    }
    lines.push(format!("RPC: {}", report.rpc));
    lines.push(format!("Block: {}", report.block));
    lines.push(format!(
        "Token: {} ({}) @ {}",
        report.token_name, report.token_symbol, report.token
    ));
    lines.push(format!("Owner:   {}", report.owner));
    lines.push(format!("Spender: {}", report.spender));

    if let (Some(raw), Some(human)) = (&report.allowance_raw, &report.allowance_human) {
        lines.push(format!("Allowance (raw): {}", raw));
        lines.push(format!("Allowance ({}): {}", report.token_symbol, human));
        if raw == "0" {
            lines.push(
                "Warning: allowance is 0 - the spender cannot transfer tokens.".to_owned(),
            );
        }
    }

    if let Some(reason) = &report.expected_skipped {
        lines.push(format!(
            "Warning: skipping expected-value comparison; {}",
            reason
        ));
    } else if let (Some(expected_human), Some(expected_raw)) =
        (&report.expected_human, &report.expected_raw)
    {
        lines.push(format!(
            "Expected: {} {} (raw {})",
            expected_human, report.token_symbol, expected_raw
        ));
        match report.matched {
            Some(true) => lines.push("MATCH".to_owned()),
            Some(false) => lines.push("MISMATCH".to_owned()),
            None => {}
        }
    }

    lines.push(format!("Completed in {:.2}s", report.elapsed_seconds));

    lines
}

/// Process exit code for a run that produced a report: only an explicit
/// MISMATCH verdict makes it non-zero.
pub fn exit_code(matched: Option<bool>) -> i32 {
    match matched {
        Some(false) => 2,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_fixture() -> RunReport {
        RunReport {
            rpc: "https://rpc.ankr.com/eth".to_owned(),
            chain_id: Some(1),
            token: "0xdAC17F958D2ee523a2206206994597C13D831ec7".to_owned(),
            token_name: "Tether USD".to_owned(),
            token_symbol: "USDT".to_owned(),
            decimals: 6,
            owner: "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".to_owned(),
            spender: "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359".to_owned(),
            block: "latest".to_owned(),
            allowance_raw: Some("100500000".to_owned()),
            allowance_human: Some("100.500000".to_owned()),
            expected_human: None,
            expected_raw: None,
            matched: None,
            error: None,
            elapsed_seconds: 0.42,
            expected_skipped: None,
        }
    }

    #[test]
    fn test_lines_contain_identity_and_amounts() {
        let lines = render_lines(&report_fixture());
        assert!(lines.iter().any(|l| l == "Chain ID: 1"));
        assert!(lines
            .iter()
            .any(|l| l == "Token: Tether USD (USDT) @ 0xdAC17F958D2ee523a2206206994597C13D831ec7"));
        assert!(lines.iter().any(|l| l == "Allowance (raw): 100500000"));
        assert!(lines.iter().any(|l| l == "Allowance (USDT): 100.500000"));
        assert!(!lines.iter().any(|l| l.starts_with("Warning:")));
    }

    #[test]
    fn test_zero_allowance_emits_warning() {
        let mut report = report_fixture();
        report.allowance_raw = Some("0".to_owned());
        report.allowance_human = Some("0.000000".to_owned());
        let lines = render_lines(&report);
        assert!(lines
            .iter()
            .any(|l| l == "Warning: allowance is 0 - the spender cannot transfer tokens."));
    }

    #[test]
    fn test_chain_id_line_omitted_when_unknown() {
        let mut report = report_fixture();
        report.chain_id = None;
        let lines = render_lines(&report);
        assert!(!lines.iter().any(|l| l.starts_with("Chain ID:")));
    }

    #[test]
    fn test_match_and_mismatch_verdicts() {
        let mut report = report_fixture();
        report.expected_human = Some("100.5".to_owned());
        report.expected_raw = Some("100500000".to_owned());
        report.matched = Some(true);
        let lines = render_lines(&report);
        assert!(lines
            .iter()
            .any(|l| l == "Expected: 100.5 USDT (raw 100500000)"));
        assert!(lines.iter().any(|l| l == "MATCH"));

        report.matched = Some(false);
        let lines = render_lines(&report);
        assert!(lines.iter().any(|l| l == "MISMATCH"));
    }

    #[test]
    fn test_skipped_expected_prints_warning_instead_of_verdict() {
        let mut report = report_fixture();
        report.expected_skipped = Some("not a decimal numeral; value=abc".to_owned());
        let lines = render_lines(&report);
        assert!(lines
            .iter()
            .any(|l| l.starts_with("Warning: skipping expected-value comparison;")));
        assert!(!lines.iter().any(|l| l == "MATCH" || l == "MISMATCH"));
    }

    #[test]
    fn test_exit_code() {
        assert_eq!(exit_code(None), 0);
        assert_eq!(exit_code(Some(true)), 0);
        assert_eq!(exit_code(Some(false)), 2);
    }

    #[test]
    fn test_json_schema_keys() {
        let mut report = report_fixture();
        report.chain_id = None;
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("chain_id").unwrap().is_null());
        assert_eq!(json.get("allowance_raw").unwrap(), "100500000");
        assert!(json.get("match").unwrap().is_null());
        assert!(json.get("matched").is_none());
        assert!(json.get("expected_skipped").is_none());
    }
}
