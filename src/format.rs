//! # Receipt Formatting
//!
//! Fixed-locale rendering of money and timestamps. Receipts must print the
//! same bytes regardless of the host locale, so nothing here consults the
//! environment.
//!
//! | Value | Rendering |
//! |-------|-----------|
//! | `30000` | `$30.000` |
//! | `-1500` | `-$1.500` |
//! | `2026-10-16T19:05:00Z` at UTC−05:00 | `16/10/2026 14:05` |

use chrono::{DateTime, FixedOffset, Utc};

/// Render an amount of whole currency units: symbol prefix, `.` thousands
/// separator, no decimals.
///
/// ```
/// use recibo::format::money;
///
/// assert_eq!(money(30000, "$"), "$30.000");
/// assert_eq!(money(-2500, "$"), "-$2.500");
/// ```
pub fn money(amount: i64, symbol: &str) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    format!("{}{}{}", sign, symbol, group_thousands(amount.unsigned_abs()))
}

/// `1234567` → `1.234.567`
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Read back an amount written the way [`money`] writes it.
///
/// Accepts an optional `-`, a symbol prefix such as `$` or `€` and `.`
/// thousands groups. Returns `None` for anything else, including misplaced groups.
///
/// ```
/// use recibo::format::parse_money;
///
/// assert_eq!(parse_money("$20.000"), Some(20000));
/// assert_eq!(parse_money("-$1.500"), Some(-1500));
/// assert_eq!(parse_money("20000"), Some(20000));
/// assert_eq!(parse_money("$20.00"), None);
/// ```
pub fn parse_money(s: &str) -> Option<i64> {
    let s = s.trim();
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let digits = s
        .trim_start_matches(|c: char| !c.is_alphanumeric() && !c.is_whitespace())
        .trim_start();
    if digits.is_empty() {
        return None;
    }

    let groups: Vec<&str> = digits.split('.').collect();
    let (head, tail) = groups.split_first()?;
    let all_digits = groups
        .iter()
        .all(|g| !g.is_empty() && g.bytes().all(|b| b.is_ascii_digit()));
    let grouped = tail.is_empty() || (head.len() <= 3 && tail.iter().all(|g| g.len() == 3));
    if !all_digits || !grouped {
        return None;
    }

    let value: i64 = groups.concat().parse().ok()?;
    Some(if negative { -value } else { value })
}

/// `DD/MM/YYYY HH:MM` at a fixed offset.
pub fn timestamp(at: &DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%d/%m/%Y %H:%M").to_string()
}

/// Render a percentage without a trailing `.0`: `10` → `10`, `12.5` → `12.5`.
pub fn percent(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        let s = format!("{:.2}", value);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
