//! Pending payments handed over by the import flow.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{common::non_blank, record::RecordDetails};

/// One row of the print queue, still in the loose textual shape the
/// import flow produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportQueueItem {
    #[serde(default)]
    pub payee: String,
    #[serde(default, deserialize_with = "loose_text")]
    pub amount: String,
    #[serde(default, deserialize_with = "loose_text")]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    #[serde(
        default,
        alias = "externalMemo",
        skip_serializing_if = "Option::is_none"
    )]
    pub external_memo: Option<String>,
    #[serde(
        default,
        alias = "internalMemo",
        skip_serializing_if = "Option::is_none"
    )]
    pub internal_memo: Option<String>,
    #[serde(
        default,
        alias = "ledgerName",
        alias = "ledger",
        skip_serializing_if = "Option::is_none"
    )]
    pub ledger_name: Option<String>,
    #[serde(default, alias = "glCode", skip_serializing_if = "Option::is_none")]
    pub gl_code: Option<String>,
    #[serde(
        default,
        alias = "glDescription",
        skip_serializing_if = "Option::is_none"
    )]
    pub gl_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(
        default,
        alias = "checkNumber",
        deserialize_with = "loose_optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub check_number: Option<String>,
}

impl ImportQueueItem {
    pub fn new(payee: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            payee: payee.into(),
            amount: amount.into(),
            ..Self::default()
        }
    }

    pub fn with_ledger(mut self, name: impl Into<String>) -> Self {
        self.ledger_name = Some(name.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    /// Returns the parsed amount when the item may be printed: a non-blank
    /// payee and a strictly positive amount. Anything else is skipped.
    pub fn payable_amount(&self) -> Option<Decimal> {
        if self.payee.trim().is_empty() {
            return None;
        }
        parse_amount(&self.amount).filter(|amount| *amount > Decimal::ZERO)
    }

    pub fn is_valid(&self) -> bool {
        self.payable_amount().is_some()
    }

    /// Target ledger name, if the row names one.
    pub fn ledger(&self) -> Option<&str> {
        non_blank(self.ledger_name.as_deref())
    }

    /// Check number carried by the row itself, used when auto-numbering is off.
    pub fn declared_check_number(&self) -> Option<u64> {
        self.check_number
            .as_deref()
            .map(str::trim)
            .and_then(|raw| raw.parse::<u64>().ok())
            .filter(|number| *number > 0)
    }

    pub fn details(&self) -> RecordDetails {
        let text = |value: &Option<String>| non_blank(value.as_deref()).map(str::to_string);
        RecordDetails {
            memo: text(&self.memo),
            external_memo: text(&self.external_memo),
            internal_memo: text(&self.internal_memo),
            gl_code: text(&self.gl_code),
            gl_description: text(&self.gl_description),
            address: text(&self.address),
        }
    }
}

/// Largest magnitude any money field may carry: 999,999,999,999.99.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0x107A_3FFF, 0x5AF3, 0, false, 2);

/// Parses a human-entered money string.
///
/// Accepts surrounding whitespace, a `$` symbol, thousands separators and
/// accounting-style parentheses for negatives. Magnitudes above
/// [`MAX_AMOUNT`] are rejected.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let mut text = raw.trim();
    let mut negative = false;
    if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        negative = true;
        text = inner.trim();
    }
    if let Some(rest) = text.strip_prefix('-') {
        negative = !negative;
        text = rest.trim_start();
    }
    let text = text.strip_prefix('$').unwrap_or(text).trim();
    if text.is_empty() {
        return None;
    }
    let cleaned: String = text.chars().filter(|ch| *ch != ',').collect();
    let value = Decimal::from_str(&cleaned).ok()?;
    if value.abs() > MAX_AMOUNT {
        return None;
    }
    Some(if negative { -value } else { value })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseText {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl LooseText {
    fn into_string(self) -> String {
        match self {
            LooseText::Text(text) => text,
            LooseText::Integer(value) => value.to_string(),
            LooseText::Float(value) => value.to_string(),
        }
    }
}

/// Spreadsheet exports hand over amounts, dates and check numbers as bare
/// numbers; keep them as text so parsing happens in one place.
fn loose_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<LooseText>::deserialize(deserializer)?
        .map(LooseText::into_string)
        .unwrap_or_default())
}

fn loose_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<LooseText>::deserialize(deserializer)?.map(LooseText::into_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_common_money_spellings() {
        assert_eq!(parse_amount("100.00"), Some(dec!(100.00)));
        assert_eq!(parse_amount(" $1,250.50 "), Some(dec!(1250.50)));
        assert_eq!(parse_amount("(42.10)"), Some(dec!(-42.10)));
        assert_eq!(parse_amount("-$5"), Some(dec!(-5)));
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn amounts_beyond_the_ceiling_are_rejected() {
        assert_eq!(MAX_AMOUNT, dec!(999999999999.99));
        assert_eq!(parse_amount("999,999,999,999.99"), Some(MAX_AMOUNT));
        assert_eq!(parse_amount("1000000000000"), None);
        assert_eq!(parse_amount("(5000000000000000)"), None);
        assert!(!ImportQueueItem::new("Acme", "5000000000000000").is_valid());
    }

    #[test]
    fn blank_payee_or_non_positive_amount_is_invalid() {
        assert!(ImportQueueItem::new("Acme", "100.00").is_valid());
        assert!(!ImportQueueItem::new("", "50.00").is_valid());
        assert!(!ImportQueueItem::new("   ", "50.00").is_valid());
        assert!(!ImportQueueItem::new("Acme", "0").is_valid());
        assert!(!ImportQueueItem::new("Acme", "-3.00").is_valid());
        assert!(!ImportQueueItem::new("Acme", "n/a").is_valid());
    }

    #[test]
    fn numeric_json_fields_are_accepted() {
        let item: ImportQueueItem = serde_json::from_str(
            r#"{"payee":"Bob","amount":75.5,"date":45356,"ledgerName":"Ops","checkNumber":1001}"#,
        )
        .unwrap();
        assert_eq!(item.amount, "75.5");
        assert_eq!(item.date, "45356");
        assert_eq!(item.ledger(), Some("Ops"));
        assert_eq!(item.declared_check_number(), Some(1001));
        assert_eq!(item.payable_amount(), Some(dec!(75.5)));
    }

    #[test]
    fn details_drop_blank_fields() {
        let mut item = ImportQueueItem::new("Acme", "1.00");
        item.memo = Some("  ".into());
        item.gl_code = Some("6100".into());
        let details = item.details();
        assert_eq!(details.memo, None);
        assert_eq!(details.gl_code.as_deref(), Some("6100"));
    }
}
