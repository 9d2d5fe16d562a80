pub mod batch;
pub mod book;
pub mod config;
pub mod ledger;
pub mod system;

use rust_decimal::Decimal;

use checkbatch_domain::parse_amount;

use crate::errors::{AppError, AppResult};

pub(crate) fn amount_arg(raw: &str) -> AppResult<Decimal> {
    parse_amount(raw).ok_or_else(|| AppError::Input(format!("`{raw}` is not an amount")))
}
