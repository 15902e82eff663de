//! `sheetstock bucket` command - offcut size bucket

use miette::Result;
use serde::Serialize;

use crate::cli::helpers::open_engine;
use crate::cli::output::print_structured;
use crate::cli::GlobalOpts;
use crate::core::classify::area_ratio;
use crate::core::{classify_offcut_bucket, OffcutBucket};

#[derive(clap::Args, Debug)]
pub struct BucketArgs {
    /// Offcut width in millimetres
    #[arg(long, short = 'W')]
    pub width: u32,

    /// Offcut height in millimetres
    #[arg(long, short = 'H')]
    pub height: u32,

    /// Take the standard size from this board (code or id)
    #[arg(long, short = 'b', conflicts_with_all = ["std_width", "std_height"])]
    pub board: Option<String>,

    /// Standard sheet width in millimetres
    #[arg(long, requires = "std_height")]
    pub std_width: Option<u32>,

    /// Standard sheet height in millimetres
    #[arg(long, requires = "std_width")]
    pub std_height: Option<u32>,
}

#[derive(Debug, Serialize)]
struct BucketReport {
    bucket: OffcutBucket,
    ratio: Option<f64>,
}

pub fn run(args: BucketArgs, global: &GlobalOpts) -> Result<()> {
    let (std_width, std_height) = match (&args.board, args.std_width, args.std_height) {
        (Some(key), _, _) => {
            let (_, engine) = open_engine(global)?;
            let board = engine.board(key)?;
            (board.std_width_mm, board.std_height_mm)
        }
        (None, Some(w), Some(h)) => (w, h),
        _ => {
            return Err(miette::miette!(
                help = "Pass --board, or both --std-width and --std-height",
                "no standard size given"
            ))
        }
    };

    let report = BucketReport {
        bucket: classify_offcut_bucket(args.width, args.height, std_width, std_height),
        ratio: area_ratio(args.width, args.height, std_width, std_height),
    };
    if !print_structured(&report, global.format)? {
        println!("{}", report.bucket.as_str());
    }
    Ok(())
}
