//! `sheetstock summary` command - stock totals per board

use console::style;
use miette::Result;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::helpers::open_engine;
use crate::cli::output::{effective_format, print_rows, print_structured};
use crate::cli::GlobalOpts;

#[derive(clap::Args, Debug)]
pub struct SummaryArgs {
    /// Board code or numeric id
    pub board: String,
}

#[derive(Debug, Tabled, Serialize)]
struct TotalsRow {
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "FULL")]
    full: u32,
    #[tabled(rename = "OFFCUT")]
    offcut: u32,
    #[tabled(rename = "AREA m²")]
    area_m2: String,
}

pub fn run(args: SummaryArgs, global: &GlobalOpts) -> Result<()> {
    let (_, engine) = open_engine(global)?;
    let board = engine.board(&args.board)?;
    let summary = engine.stock_summary(board.id)?;

    let format = effective_format(global.format, true);
    if print_structured(&summary, format)? {
        return Ok(());
    }

    let rows: Vec<TotalsRow> = summary
        .totals
        .iter()
        .map(|t| TotalsRow {
            status: t.status.to_string(),
            full: t.full_qty,
            offcut: t.offcut_qty,
            area_m2: format!("{:.3}", t.area_m2),
        })
        .collect();
    print_rows(&rows, format)?;

    let buckets = &summary.offcut_buckets;
    println!();
    println!(
        "{} available offcuts: {} > 1/2, {} 1/4..1/2, {} < 1/4",
        style(&summary.board.code).cyan(),
        buckets.gt_half,
        buckets.half_to_quarter,
        buckets.lt_quarter
    );
    Ok(())
}
