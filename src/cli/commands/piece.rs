//! `sheetstock piece` command - stock piece intake, listing and movement

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{board_codes, format_size, open_engine};
use crate::cli::output::{effective_format, print_rows, print_structured, PieceRow};
use crate::cli::{GlobalOpts, OutputFormat, StatusFilter, TypeFilter};
use crate::core::ids::{PieceId, ProjectId};
use crate::core::{ConsumptionMode, MoveOutcome, MoveRequest, PieceFilter, StockEngine};
use crate::entities::{Location, NewPiece, PieceStatus, PieceType};

#[derive(Subcommand, Debug)]
pub enum PieceCommands {
    /// Record pieces entering stock (cumulates into identical rows)
    Add(AddArgs),

    /// List stock pieces (FIFO order)
    List(ListArgs),

    /// Show one piece
    Show(PieceArg),

    /// Append a line to a piece's notes
    Note(NoteArgs),

    /// Delete an AVAILABLE piece row
    Delete(DeleteArgs),

    /// Move pieces to another status, location or project
    Move(MoveArgs),

    /// Consume pieces in production
    Consume(ConsumeArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Board code or numeric id
    #[arg(long, short = 'b')]
    pub board: String,

    /// Width in millimetres
    #[arg(long, short = 'W')]
    pub width: u32,

    /// Height in millimetres
    #[arg(long, short = 'H')]
    pub height: u32,

    /// Number of identical pieces
    #[arg(long, short = 'q', default_value_t = 1)]
    pub qty: u32,

    /// Requested type; the board's standard size decides the stored type
    #[arg(long = "type", short = 't', default_value = "FULL")]
    pub piece_type: PieceType,

    /// Physical location
    #[arg(long, short = 'l', default_value = "Depozit")]
    pub location: Location,

    /// Internal (non-stocked) offcut
    #[arg(long)]
    pub internal: bool,

    /// Project the pieces belong to
    #[arg(long, short = 'p')]
    pub project: Option<ProjectId>,

    /// Note recorded on the row
    #[arg(long, short = 'n')]
    pub note: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Board code or numeric id
    #[arg(long, short = 'b')]
    pub board: Option<String>,

    /// Project binding
    #[arg(long, short = 'p')]
    pub project: Option<ProjectId>,

    /// Status filter
    #[arg(long, short = 's', default_value = "active")]
    pub status: StatusFilter,

    /// Type filter
    #[arg(long = "type", short = 't', default_value = "all")]
    pub piece_type: TypeFilter,

    /// Location filter
    #[arg(long, short = 'l')]
    pub location: Option<Location>,

    /// Only internal (non-stocked) pieces
    #[arg(long, conflicts_with = "accounting")]
    pub internal: bool,

    /// Only stocked (accounting) pieces
    #[arg(long)]
    pub accounting: bool,
}

#[derive(clap::Args, Debug)]
pub struct PieceArg {
    /// Piece id
    pub piece: PieceId,
}

#[derive(clap::Args, Debug)]
pub struct NoteArgs {
    /// Piece id
    pub piece: PieceId,

    /// Text to append
    pub text: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Piece id
    pub piece: PieceId,

    /// Refuse unless the piece is stocked
    #[arg(long, conflicts_with = "expect_internal")]
    pub expect_accounting: bool,

    /// Refuse unless the piece is internal
    #[arg(long)]
    pub expect_internal: bool,
}

#[derive(clap::Args, Debug)]
pub struct MoveArgs {
    /// Piece id
    pub piece: PieceId,

    /// Target status
    #[arg(long, short = 's')]
    pub to: PieceStatus,

    /// Pieces to move (defaults to the whole row)
    #[arg(long, short = 'q')]
    pub qty: Option<u32>,

    /// Target location (defaults to the current one)
    #[arg(long, short = 'l')]
    pub location: Option<Location>,

    /// Project binding for the moved pieces
    #[arg(long, short = 'p')]
    pub project: Option<ProjectId>,

    /// Note (required for SCRAP)
    #[arg(long, short = 'n')]
    pub note: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ConsumeArgs {
    /// Piece id
    pub piece: PieceId,

    /// Pieces to consume
    #[arg(long, short = 'q', default_value_t = 1)]
    pub qty: u32,

    /// Half consumption (coefficient 0.5)
    #[arg(long)]
    pub half: bool,

    /// Note recorded with the consumption
    #[arg(long, short = 'n')]
    pub note: Option<String>,
}

pub fn run(cmd: PieceCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PieceCommands::Add(args) => run_add(args, global),
        PieceCommands::List(args) => run_list(args, global),
        PieceCommands::Show(args) => run_show(args, global),
        PieceCommands::Note(args) => run_note(args, global),
        PieceCommands::Delete(args) => run_delete(args, global),
        PieceCommands::Move(args) => run_move(args, global),
        PieceCommands::Consume(args) => run_consume(args, global),
    }
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut engine) = open_engine(global)?;
    let board = engine.board(&args.board)?;

    let outcome = engine.upsert_piece(NewPiece {
        board_id: board.id,
        width_mm: args.width,
        height_mm: args.height,
        qty: args.qty,
        requested_type: args.piece_type,
        location: args.location,
        is_accounting: !args.internal,
        project_id: args.project,
        note: args.note,
    })?;

    if outcome.reclassified {
        eprintln!(
            "{} {} is not the standard {} sheet; stored as {}",
            style("!").yellow(),
            format_size(args.width, args.height),
            format_size(board.std_width_mm, board.std_height_mm),
            style(outcome.piece_type).yellow()
        );
    }

    if global.format == OutputFormat::Id {
        println!("{}", outcome.id);
        return Ok(());
    }
    if print_structured(&engine.piece(outcome.id)?, global.format)? {
        return Ok(());
    }
    let verb = if outcome.merged { "Cumulated into" } else { "Created" };
    println!(
        "{} {} piece #{} ({} x{} {})",
        style("✓").green(),
        verb,
        style(outcome.id).cyan(),
        format_size(args.width, args.height),
        args.qty,
        outcome.piece_type
    );
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (_, engine) = open_engine(global)?;

    let board = match &args.board {
        Some(key) => Some(engine.board(key)?.id),
        None => None,
    };
    let is_accounting = if args.internal {
        Some(false)
    } else if args.accounting {
        Some(true)
    } else {
        None
    };
    let filter = PieceFilter {
        board,
        project: args.project,
        status: args.status.exact(),
        piece_type: args.piece_type.exact(),
        location: args.location,
        is_accounting,
    };

    let pieces: Vec<_> = engine
        .list_pieces(&filter)?
        .into_iter()
        .filter(|p| args.status.matches(p.status))
        .collect();

    let format = effective_format(global.format, true);
    if print_structured(&pieces, format)? {
        return Ok(());
    }
    match format {
        OutputFormat::Id => {
            for piece in &pieces {
                println!("{}", piece.id);
            }
        }
        _ => {
            let codes = board_codes(&engine)?;
            let rows: Vec<PieceRow> = pieces.iter().map(|p| PieceRow::new(p, &codes)).collect();
            print_rows(&rows, format)?;
            if format == OutputFormat::Table {
                println!();
                println!("{} row(s) found.", style(rows.len()).cyan());
            }
        }
    }
    Ok(())
}

fn run_show(args: PieceArg, global: &GlobalOpts) -> Result<()> {
    let (_, engine) = open_engine(global)?;
    let piece = engine.piece(args.piece)?;

    let format = effective_format(global.format, false);
    if print_structured(&piece, format)? {
        return Ok(());
    }
    match format {
        OutputFormat::Id => println!("{}", piece.id),
        _ => {
            let codes = board_codes(&engine)?;
            print_rows(&[PieceRow::new(&piece, &codes)], format)?;
        }
    }
    Ok(())
}

fn run_note(args: NoteArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut engine) = open_engine(global)?;
    let piece = engine.append_note(args.piece, &args.text)?;
    println!(
        "{} Note added to piece #{}",
        style("✓").green(),
        style(piece.id).cyan()
    );
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let expect_accounting = if args.expect_accounting {
        Some(true)
    } else if args.expect_internal {
        Some(false)
    } else {
        None
    };
    let (_, mut engine) = open_engine(global)?;
    let deleted = engine.delete_piece(args.piece, expect_accounting)?;
    println!(
        "{} Deleted piece #{} ({} x{})",
        style("✓").green(),
        style(deleted.id).cyan(),
        format_size(deleted.width_mm, deleted.height_mm),
        deleted.qty
    );
    Ok(())
}

fn run_move(args: MoveArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut engine) = open_engine(global)?;
    let mut request = match args.qty {
        Some(qty) => MoveRequest::new(args.piece, qty, args.to),
        None => MoveRequest::whole_row(args.piece, args.to),
    };
    if let Some(location) = args.location {
        request = request.to_location(location);
    }
    if let Some(project) = args.project {
        request = request.for_project(project);
    }
    if let Some(note) = args.note {
        request = request.with_note(note);
    }

    let outcome = engine.move_piece(request)?;
    report_move(&engine, outcome, global)
}

fn run_consume(args: ConsumeArgs, global: &GlobalOpts) -> Result<()> {
    let mode = if args.half {
        ConsumptionMode::Half
    } else {
        ConsumptionMode::Full
    };
    let (_, mut engine) = open_engine(global)?;
    let outcome = engine.consume_with_mode(args.piece, args.qty, mode, args.note.as_deref())?;
    report_move(&engine, outcome, global)
}

fn report_move(engine: &StockEngine, outcome: MoveOutcome, global: &GlobalOpts) -> Result<()> {
    if global.format == OutputFormat::Id {
        println!("{}", outcome.dest);
        return Ok(());
    }
    let dest = engine.piece(outcome.dest)?;
    if print_structured(&dest, global.format)? {
        return Ok(());
    }
    println!(
        "{} Moved to #{} [{} @ {}], row now holds {}",
        style("✓").green(),
        style(dest.id).cyan(),
        dest.status,
        dest.location,
        dest.qty
    );
    if let Some(source) = outcome.source {
        println!("   {}", style(format!("#{} keeps the remainder", source)).dim());
    }
    Ok(())
}
