use web3::types::U256;

use crate::error::CheckError;

/// Display precision cap; tokens with more decimals are rounded to this many
/// fractional digits for display.
const MAX_DISPLAY_DECIMALS: u8 = 18;

/// Convert a raw token amount into a human-readable decimal string scaled by
/// `decimals`, rendered with exactly `min(decimals, 18)` fractional digits.
///
/// This is a display-only conversion; comparisons must always be done on the
/// raw value.
///
/// # Arguments
/// * `raw` - amount in the token's smallest indivisible units
/// * `decimals` - the token's decimals
pub fn to_human(raw: U256, decimals: u8) -> String {
    if decimals == 0 {
        return raw.to_string();
    }

    let shown = decimals.min(MAX_DISPLAY_DECIMALS);
    let rounded = if decimals > shown {
        // drop the digits beyond the display cap, rounding half-up
        let dropped_base = U256::exp10((decimals - shown) as usize);
        let quotient = raw / dropped_base;
        let remainder = raw % dropped_base;
        if remainder >= dropped_base / 2 {
            quotient + 1
        } else {
            quotient
        }
    } else {
        raw
    };

    let base = U256::exp10(shown as usize);
    let int_part = rounded / base;
    let frac_part = rounded % base;
    format!(
        "{}.{:0>width$}",
        int_part,
        frac_part.to_string(),
        width = shown as usize
    )
}

/// Convert a human-units decimal string into a raw amount scaled by
/// `10^decimals`. Thousands-separator commas are stripped; fractional digits
/// beyond the token's precision are rounded half-up.
///
/// # Arguments
/// * `human` - decimal numeral, e.g. "100.5" or "1,234.56"
/// * `decimals` - the token's decimals
pub fn to_raw(human: &str, decimals: u8) -> Result<U256, CheckError> {
    let cleaned = human.replace(',', "");
    let cleaned = cleaned.trim();

    let (int_str, frac_str) = match cleaned.split_once('.') {
        Some((i, f)) => (i, f),
        None => (cleaned, ""),
    };

    let all_digits =
        |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    let valid = match (int_str.is_empty(), frac_str.is_empty()) {
        // "." or ""
        (true, true) => false,
        // ".5"
        (true, false) => all_digits(frac_str),
        // "5" or "5."
        (false, true) => all_digits(int_str),
        (false, false) => all_digits(int_str) && all_digits(frac_str),
    };
    if !valid {
        return Err(CheckError::Parse(format!(
            "not a decimal numeral; value={}",
            human
        )));
    }

    let overflow =
        |what: &str| CheckError::Parse(format!("amount does not fit in uint256; value={}", what));

    let base = U256::exp10(decimals as usize);
    let int_value = if int_str.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(int_str)
            .map_err(|e| CheckError::Parse(format!("bad integer part; value={}, err={:?}", human, e)))?
    };
    let mut raw = int_value
        .checked_mul(base)
        .ok_or_else(|| overflow(human))?;

    if !frac_str.is_empty() {
        let precision = decimals as usize;
        let (kept, dropped) = if frac_str.len() > precision {
            frac_str.split_at(precision)
        } else {
            (frac_str, "")
        };
        let mut frac_value = if kept.is_empty() {
            U256::zero()
        } else {
            let parsed = U256::from_dec_str(kept).map_err(|e| {
                CheckError::Parse(format!("bad fractional part; value={}, err={:?}", human, e))
            })?;
            parsed * U256::exp10(precision - kept.len())
        };
        // round half-up on the first digit past the token's precision
        if dropped.chars().next().map_or(false, |c| c >= '5') {
            frac_value = frac_value
                .checked_add(U256::one())
                .ok_or_else(|| overflow(human))?;
        }
        raw = raw.checked_add(frac_value).ok_or_else(|| overflow(human))?;
    }

    Ok(raw)
}
