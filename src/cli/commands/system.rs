use checkbatch_core::PrintAdapter;

use crate::{
    cli::{output, printer::ProofPrinter},
    errors::AppResult,
    utils::build_info,
};

pub async fn printers() -> AppResult<()> {
    let printers = ProofPrinter::new().list_printers().await?;
    if printers.is_empty() {
        output::warning("The host reports no printers.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = printers
        .into_iter()
        .map(|info| vec![info.device_name, info.friendly_name])
        .collect();
    output::table(&["Device", "Name"], &rows);
    Ok(())
}

pub fn info() {
    let metadata = build_info::current();
    output::section("checkbatch");
    for (label, value) in metadata.rows() {
        println!("{label:>8}: {value}");
    }
}
