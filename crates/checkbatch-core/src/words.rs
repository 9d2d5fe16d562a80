//! Legal-line spelling of check amounts.

use rust_decimal::{prelude::ToPrimitive, Decimal};

const ONES: [&str; 20] = [
    "Zero",
    "One",
    "Two",
    "Three",
    "Four",
    "Five",
    "Six",
    "Seven",
    "Eight",
    "Nine",
    "Ten",
    "Eleven",
    "Twelve",
    "Thirteen",
    "Fourteen",
    "Fifteen",
    "Sixteen",
    "Seventeen",
    "Eighteen",
    "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const SCALES: [(u64, &str); 4] = [
    (1_000_000_000_000, "Trillion"),
    (1_000_000_000, "Billion"),
    (1_000_000, "Million"),
    (1_000, "Thousand"),
];

/// Spells `amount` the way it appears on the check's legal line,
/// e.g. `1234.5` becomes `"One Thousand Two Hundred Thirty-Four and 50/100"`.
///
/// The sign is ignored; cents are rounded half-even to two places.
pub fn amount_in_words(amount: Decimal) -> String {
    let rounded = amount.abs().round_dp(2);
    let whole = rounded.trunc();
    let dollars = whole.to_u64().unwrap_or(u64::MAX);
    let cents = ((rounded - whole) * Decimal::ONE_HUNDRED)
        .to_u64()
        .unwrap_or(0);
    format!("{} and {:02}/100", spell(dollars), cents)
}

fn spell(value: u64) -> String {
    if value == 0 {
        return ONES[0].to_string();
    }
    let mut parts = Vec::new();
    let mut rest = value;
    for (scale, label) in SCALES {
        if rest >= scale {
            // Counts above the largest scale nest, e.g. "One Thousand Trillion".
            parts.push(format!("{} {}", spell(rest / scale), label));
            rest %= scale;
        }
    }
    if rest > 0 {
        parts.push(spell_below_thousand(rest));
    }
    parts.join(" ")
}

fn spell_below_thousand(value: u64) -> String {
    let mut parts = Vec::new();
    let hundreds = value / 100;
    let rest = value % 100;
    if hundreds > 0 {
        parts.push(format!("{} Hundred", ONES[hundreds as usize]));
    }
    if rest >= 20 {
        let tens = TENS[(rest / 10) as usize];
        match rest % 10 {
            0 => parts.push(tens.to_string()),
            unit => parts.push(format!("{}-{}", tens, ONES[unit as usize])),
        }
    } else if rest > 0 {
        parts.push(ONES[rest as usize].to_string());
    }
    parts.join(" ")
}
