//! pagecraft: edit block-based landing pages from the terminal.
//!
//! Usage:
//!   # Create an empty page in ./pages and print its id
//!   pagecraft new --title "Spring launch"
//!
//!   # List a page's blocks (full id, a unique prefix, or the short tail)
//!   pagecraft show 0190c6a8
//!
//!   # Apply line commands from stdin, saving when done
//!   printf 'add hero\nadd features\nmv 0 1\n' | pagecraft edit 0190c6a8
//!
//! Logging goes to stderr; set `RUST_LOG=pagecraft_doc=debug` to trace every
//! mutation and history move.

mod command;
mod edit;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use pagecraft_doc::{BlockCatalog, DirStore, EditorConfig, EditorSession, PageId, PageStore};

use crate::edit::Editor;

/// Block-based page editor with undo history.
#[derive(Parser, Debug)]
#[command(name = "pagecraft", version)]
#[command(about = "Edit block-based pages with undo/redo")]
struct Args {
    /// Directory holding one `<page-id>.json` per page
    #[arg(long, global = true, default_value = "pages")]
    store: PathBuf,

    /// Editor config (RON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Block catalog (RON); the built-in block types when omitted
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Create and save an empty page
    New {
        #[arg(long, default_value = "Untitled")]
        title: String,
    },
    /// Print a page's blocks
    Show { page: String },
    /// Read edit commands from stdin, one per line
    Edit { page: String },
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EditorConfig::default(),
    };
    let catalog = match &args.catalog {
        Some(path) => BlockCatalog::load(path)
            .with_context(|| format!("loading block catalog {}", path.display()))?,
        None => BlockCatalog::builtin(),
    };
    let store = DirStore::open(&args.store)
        .with_context(|| format!("opening store {}", args.store.display()))?;

    match args.command {
        Cmd::New { title } => {
            let session = EditorSession::create(title, Arc::new(catalog), &config);
            store.save(session.page())?;
            tracing::info!(page = %session.page().id, "created page");
            println!("{}", session.page().id);
        }
        Cmd::Show { page } => {
            let id = resolve_page(&store, &page)?;
            let page = store.load(&id)?;
            edit::print_page(&mut io::stdout().lock(), &page, None)?;
        }
        Cmd::Edit { page } => {
            let id = resolve_page(&store, &page)?;
            let session = EditorSession::open(store.load(&id)?, Arc::new(catalog), &config)?;
            tracing::info!(page = %id, blocks = session.page().len(), "editing page");
            let mut editor = Editor::new(session, &store, io::stdout().lock());
            editor.run(io::stdin().lock())?;
        }
    }
    Ok(())
}

/// Accept a stored page id as typed, or a prefix or short tail that names
/// exactly one stored page.
fn resolve_page(store: &DirStore, arg: &str) -> Result<PageId> {
    let exact = PageId::from(arg);
    if store.exists(&exact) {
        return Ok(exact);
    }
    let matches: Vec<PageId> = store
        .list()?
        .into_iter()
        .filter(|id| id.matches(arg))
        .collect();
    match matches.as_slice() {
        [id] => Ok(id.clone()),
        [] => bail!("no page matching {arg:?} in {}", store.root().display()),
        _ => bail!("{arg:?} matches {} pages; use more characters", matches.len()),
    }
}
