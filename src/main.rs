use clap::Parser;
use miette::Result;
use sheetstock::cli::commands::{board, bucket, completions, init, piece, reserve, summary};
use sheetstock::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    // SHEETSTOCK_LOG overrides the verbosity flag
    let filter = EnvFilter::try_from_env("SHEETSTOCK_LOG").unwrap_or_else(|_| {
        if cli.global.verbose {
            EnvFilter::new("sheetstock=debug")
        } else {
            EnvFilter::new("sheetstock=warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let global = cli.global;
    match cli.command {
        Commands::Init(args) => init::run(args),
        Commands::Board(cmd) => board::run(cmd, &global),
        Commands::Piece(cmd) => piece::run(cmd, &global),
        Commands::Reserve(args) => reserve::run_reserve(args, &global),
        Commands::Release(args) => reserve::run_release(args, &global),
        Commands::Bucket(args) => bucket::run(args, &global),
        Commands::Summary(args) => summary::run(args, &global),
        Commands::Completions(args) => completions::run(args),
    }
}
