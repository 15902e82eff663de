//! `sheetstock init` command - create a workspace

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::core::config::{CONFIG_FILE, WORKSPACE_DIR};
use crate::core::{StockEngine, Workspace};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (defaults to the current directory)
    pub path: Option<PathBuf>,
}

pub fn run(args: InitArgs) -> Result<()> {
    let root = match args.path {
        Some(path) => path,
        None => std::env::current_dir().into_diagnostic()?,
    };

    let workspace = Workspace::init(&root)?;
    // Opening the engine creates the database and applies the schema
    StockEngine::open(&workspace)?;

    println!(
        "{} Initialized sheetstock workspace in {}",
        style("✓").green(),
        style(workspace.root().display()).cyan()
    );
    println!(
        "   {}",
        style(root.join(WORKSPACE_DIR).join(CONFIG_FILE).display()).dim()
    );
    println!("   {}", style(workspace.database_path().display()).dim());
    Ok(())
}
