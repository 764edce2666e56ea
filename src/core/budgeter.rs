//! Advisory size-to-token accounting.
//!
//! Estimates use a fixed bytes-per-token divisor rather than a real
//! tokenizer: cheap, monotonic, and good enough for budgeting by eye.

use std::fmt;

/// Bytes per token assumed by every estimate
pub const BYTES_PER_TOKEN: u64 = 4;

/// Estimated token count for a byte span: `ceil(bytes / 4)`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct TokenEstimate(pub u64);

impl TokenEstimate {
    pub fn from_bytes(bytes: u64) -> Self {
        Self(bytes.div_ceil(BYTES_PER_TOKEN))
    }

    pub fn from_text(text: &str) -> Self {
        Self::from_bytes(text.len() as u64)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TokenEstimate {
    /// Plain below 1000, then `1.2k`, then `3.4M`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.0;
        if n < 1_000 {
            write!(f, "{n}")
        } else if n < 1_000_000 {
            write!(f, "{:.1}k", n as f64 / 1_000.0)
        } else {
            write!(f, "{:.1}M", n as f64 / 1_000_000.0)
        }
    }
}

/// Human-readable byte size: `512 B`, `1.5 KB`, `2.3 MB`
pub fn human_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < MB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / MB)
    }
}

/// Kibibytes with two decimals, as shown in database overviews
pub fn human_kib(bytes: u64) -> String {
    format!("{:.2} KB", bytes as f64 / 1024.0)
}

/// Share of `part` in `total` as a percentage; 0 when the total is empty
pub fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

/// `1234567` → `1,234,567`
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn estimate_rounds_up() {
        assert_eq!(TokenEstimate::from_bytes(0).get(), 0);
        assert_eq!(TokenEstimate::from_bytes(1).get(), 1);
        assert_eq!(TokenEstimate::from_bytes(4).get(), 1);
        assert_eq!(TokenEstimate::from_bytes(5).get(), 2);
        assert_eq!(TokenEstimate::from_text("abcdefgh").get(), 2);
    }

    #[test]
    fn display_scales() {
        assert_eq!(TokenEstimate(999).to_string(), "999");
        assert_eq!(TokenEstimate(1_240).to_string(), "1.2k");
        assert_eq!(TokenEstimate(3_400_000).to_string(), "3.4M");
    }

    #[test]
    fn sizes_and_grouping() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(1536), "1.5 KB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(human_kib(8192), "8.00 KB");
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn percent_of_empty_total_is_zero() {
        assert_eq!(percent(10, 0), 0.0);
        assert_eq!(percent(25, 100), 25.0);
    }

    proptest! {
        #[test]
        fn estimate_is_monotonic(a in 0u64..10_000_000, b in 0u64..10_000_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(TokenEstimate::from_bytes(lo) <= TokenEstimate::from_bytes(hi));
        }

        #[test]
        fn estimate_bounds(n in 0u64..10_000_000) {
            let t = TokenEstimate::from_bytes(n).get();
            prop_assert!(t * BYTES_PER_TOKEN >= n);
            prop_assert!(t * BYTES_PER_TOKEN < n + BYTES_PER_TOKEN);
        }
    }
}
