//! Totals over parsed ledger rows

use crate::ledger::LedgerEntry;

/// Amount text as a number of won. Commas are ignored; anything else that
/// isn't a digit (or an empty amount) gives `None`.
pub fn parse_amount(amount: &str) -> Option<u64> {
    let digits: String = amount.chars().filter(|&c| c != ',').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Sum of every amount that parses; unreadable amounts are skipped
pub fn total_amount(entries: &[LedgerEntry]) -> u64 {
    entries
        .iter()
        .filter_map(|e| parse_amount(&e.amount))
        .fold(0u64, |acc, v| acc.saturating_add(v))
}

/// Thousands separators: 1234567 -> "1,234,567"
pub fn format_amount(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Reading in 억/만 units, as ledgers are usually tallied.
///
/// Below 10,000 the plain number is used. Above it, the part under 만 is
/// dropped: 150,000,000 -> "1억 5000만원", 350,000 -> "35만원".
pub fn korean_reading(amount: u64) -> String {
    if amount < 10_000 {
        return format!("{}원", amount);
    }

    let eok = amount / 100_000_000;
    let man = (amount % 100_000_000) / 10_000;

    if eok > 0 {
        if man > 0 {
            format!("{}억 {}만원", eok, man)
        } else {
            format!("{}억원", eok)
        }
    } else if man > 0 {
        format!("{}만원", man)
    } else {
        String::new()
    }
}
