//! Price formatting
//!
//! Amounts are integers in paise. Output uses Indian digit grouping
//! (`₹1,23,456.78`).

/// Formats minor-unit amounts as a currency string
#[derive(Debug, Clone)]
pub struct PriceFormatter {
    symbol: String,
}

impl PriceFormatter {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }

    pub fn format(&self, amount: i64) -> String {
        let sign = if amount < 0 { "-" } else { "" };
        let minor = amount.unsigned_abs();
        let major = minor / 100;
        let paise = minor % 100;
        format!("{}{}{}.{:02}", sign, self.symbol, group_indian(major), paise)
    }
}

impl Default for PriceFormatter {
    fn default() -> Self {
        Self::new("₹")
    }
}

/// Format with the default rupee symbol
pub fn format_price(amount: i64) -> String {
    PriceFormatter::default().format(amount)
}

/// Last three digits, then groups of two
fn group_indian(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}
