//! `sheetstock reserve` / `sheetstock release` commands

use console::style;
use miette::Result;

use crate::cli::helpers::open_engine;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::ids::ProjectId;

#[derive(clap::Args, Debug)]
pub struct ReserveArgs {
    /// Board code or numeric id
    pub board: String,

    /// Project to reserve for
    #[arg(long, short = 'p')]
    pub project: ProjectId,

    /// Number of full boards
    #[arg(long, short = 'c', default_value_t = 1)]
    pub count: u32,

    /// Note recorded on each reserved row
    #[arg(long, short = 'n', default_value = "")]
    pub note: String,
}

#[derive(clap::Args, Debug)]
pub struct ReleaseArgs {
    /// Project whose reservations are returned
    pub project: ProjectId,

    /// Note recorded on each released row
    #[arg(long, short = 'n')]
    pub note: Option<String>,
}

pub fn run_reserve(args: ReserveArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut engine) = open_engine(global)?;
    let board = engine.board(&args.board)?;
    let ids = engine.reserve_full_boards(board.id, args.project, args.count, &args.note)?;

    if global.format == OutputFormat::Id {
        for id in &ids {
            println!("{}", id);
        }
        return Ok(());
    }
    println!(
        "{} Reserved {} x {} for project {}",
        style("✓").green(),
        ids.len(),
        style(&board.code).cyan(),
        style(args.project).cyan()
    );
    let listed: Vec<String> = ids.iter().map(|id| format!("#{}", id)).collect();
    println!("   {}", style(listed.join(", ")).dim());
    Ok(())
}

pub fn run_release(args: ReleaseArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut engine) = open_engine(global)?;
    let released = engine.release_project(args.project, args.note.as_deref())?;

    if global.format == OutputFormat::Id {
        for id in &released {
            println!("{}", id);
        }
        return Ok(());
    }
    if released.is_empty() {
        println!("Nothing reserved for project {}", style(args.project).cyan());
        return Ok(());
    }
    println!(
        "{} Released {} row(s) from project {}",
        style("✓").green(),
        released.len(),
        style(args.project).cyan()
    );
    Ok(())
}
