#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # createx
//!
//! Run from a course root to split every `src/exercises/*/config.js` into
//! `machines.js`, `viewers.js` and `repos.js`, and to scaffold a starter
//! repository under `exercises/<name>/starting.git` for each exercise.

use std::path::PathBuf;

use anyhow::{Result, bail};
use bpaf::*;
use colored::Colorize;
use createx::{Settings, run};
use dotenvy::dotenv;
use itertools::Itertools;
use tabled::{
    Table,
    settings::{Alignment, Modify, Panel, Style, object::Rows},
};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Command line options.
#[derive(Debug, Clone)]
struct Options {
    /// Course root directory
    root:        PathBuf,
    /// Extra identifiers treated as globals
    globals:     Vec<String>,
    /// Fail on unresolved identifiers
    strict:      bool,
    /// Skip output directories and starter repositories
    no_scaffold: bool,
    /// Log per-item detail
    verbose:     bool,
    /// Print the report as JSON
    json:        bool,
}

/// Parse the command line arguments and return the options
fn options() -> Options {
    let root = long("root")
        .short('r')
        .help("Course root directory")
        .argument::<PathBuf>("DIR")
        .fallback(PathBuf::from("."));

    let globals = long("global")
        .short('g')
        .help("Identifier that resolves at load time without a declaration")
        .argument::<String>("NAME")
        .many();

    let strict = long("strict")
        .help("Treat unresolved identifiers as errors")
        .switch();

    let no_scaffold = long("no-scaffold")
        .help("Only write the registries")
        .switch();

    let verbose = short('v')
        .long("verbose")
        .help("Log per-exercise detail")
        .switch();

    let json = long("json")
        .help("Print the run report as JSON on stdout")
        .switch();

    construct!(Options {
        root,
        globals,
        strict,
        no_scaffold,
        verbose,
        json
    })
    .to_options()
    .descr("Builds exercise registries and starter repositories")
    .run()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv().ok();

    let opts = options();

    let fmt = fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_file(false)
        .with_line_number(false);
    let filter_layer = LevelFilter::from_level(if opts.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    });
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    let settings = Settings::from_env(opts.root)
        .with_extra_globals(opts.globals)
        .with_strict(opts.strict)
        .with_scaffold(!opts.no_scaffold);

    let report = run(&settings).await?;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !report.exercises.is_empty() {
        eprintln!(
            "{}",
            Table::new(&report.exercises)
                .with(Panel::header("Exercises"))
                .with(
                    Modify::new(Rows::first())
                        .with(Alignment::center())
                        .with(Alignment::center_vertical()),
                )
                .with(Style::modern())
        );
    }

    let failures = report.scaffold_failures();
    if !failures.is_empty() {
        bail!(
            "Scaffolding failed for {}",
            failures.iter().map(|o| o.exercise()).join(", ")
        );
    }

    eprintln!(
        "{}",
        format!("Built {} exercises", report.exercises.len()).green()
    );
    Ok(())
}
