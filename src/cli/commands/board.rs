//! `sheetstock board` command - board type catalog

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{format_size, open_engine};
use crate::cli::output::{effective_format, print_rows, print_structured, BoardRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::NewBoard;

#[derive(Subcommand, Debug)]
pub enum BoardCommands {
    /// Register a board type
    Add(AddArgs),

    /// List board types
    List,

    /// Show one board type
    Show(ShowArgs),

    /// Delete a board type that no piece references
    Delete(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Unique board code (e.g. PAL-18-ALB)
    pub code: String,

    /// Manufacturer / brand
    #[arg(long, default_value = "")]
    pub brand: String,

    /// Thickness in millimetres
    #[arg(long, short = 't')]
    pub thickness: f64,

    /// Standard sheet width in millimetres
    #[arg(long, short = 'W')]
    pub width: u32,

    /// Standard sheet height in millimetres
    #[arg(long, short = 'H')]
    pub height: u32,

    /// Sale price per sheet
    #[arg(long)]
    pub price: Option<f64>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Board code or numeric id
    pub board: String,
}

pub fn run(cmd: BoardCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        BoardCommands::Add(args) => run_add(args, global),
        BoardCommands::List => run_list(global),
        BoardCommands::Show(args) => run_show(args, global),
        BoardCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut engine) = open_engine(global)?;
    let board = engine.add_board(NewBoard {
        code: args.code,
        brand: args.brand,
        thickness_mm: args.thickness,
        std_width_mm: args.width,
        std_height_mm: args.height,
        sale_price: args.price,
    })?;

    match global.format {
        OutputFormat::Id => println!("{}", board.id),
        format => {
            if !print_structured(&board, format)? {
                println!(
                    "{} Added board {} (#{}, {} mm)",
                    style("✓").green(),
                    style(&board.code).cyan(),
                    board.id,
                    format_size(board.std_width_mm, board.std_height_mm)
                );
            }
        }
    }
    Ok(())
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let (_, engine) = open_engine(global)?;
    let boards = engine.boards()?;

    let format = effective_format(global.format, true);
    if print_structured(&boards, format)? {
        return Ok(());
    }
    match format {
        OutputFormat::Id => {
            for board in &boards {
                println!("{}", board.id);
            }
        }
        _ => {
            if boards.is_empty() && format == OutputFormat::Table {
                println!("No boards registered. Use {} to add one.", style("sheetstock board add").cyan());
                return Ok(());
            }
            let rows: Vec<BoardRow> = boards.iter().map(BoardRow::from).collect();
            print_rows(&rows, format)?;
        }
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (_, engine) = open_engine(global)?;
    let board = engine.board(&args.board)?;

    let format = effective_format(global.format, false);
    if print_structured(&board, format)? {
        return Ok(());
    }
    match format {
        OutputFormat::Id => println!("{}", board.id),
        _ => print_rows(&[BoardRow::from(&board)], format)?,
    }
    Ok(())
}

fn run_delete(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut engine) = open_engine(global)?;
    let board = engine.board(&args.board)?;
    let deleted = engine.delete_board(board.id)?;
    println!(
        "{} Deleted board {}",
        style("✓").green(),
        style(&deleted.code).cyan()
    );
    Ok(())
}
