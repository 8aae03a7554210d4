//! `gradebook` - CLI for gradebook
//!
//! Runs the interactive menu by default, or a single store operation when a
//! command is given.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;

use gradebook::cli::{
    AddCommand, Cli, Command, ConfigCommand, OutputFormat, ShowCommand, UpdateCommand,
};
use gradebook::display::{record_json, records_json, write_record, write_table};
use gradebook::input::parse_assignments;
use gradebook::{init_logging, Config, Error, GradeScheme, Menu, NewStudent, Store};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let mut config = Config::load_from(cli.config.clone()).context("loading configuration")?;
    if let Some(data) = cli.data.clone() {
        config.storage.data_file = Some(data);
    }
    let path = config.data_file();
    let scheme = GradeScheme::new(&config.grading);

    match cli.command.unwrap_or(Command::Menu) {
        Command::Menu => run_menu(&path, scheme),
        Command::List(cmd) => {
            let store = open_store(&path, scheme)?;
            match cmd.format {
                OutputFormat::Table => {
                    write_table(&mut io::stdout(), store.list_all(), store.scheme())?;
                }
                OutputFormat::Json => {
                    let value = records_json(store.list_all(), store.scheme());
                    println!("{}", serde_json::to_string_pretty(&value)?);
                }
            }
            Ok(())
        }
        Command::Show(cmd) => handle_show(&path, scheme, &cmd),
        Command::Add(cmd) => handle_add(&path, scheme, cmd),
        Command::Update(cmd) => handle_update(&path, scheme, &cmd),
        Command::Delete(cmd) => {
            let mut store = open_store(&path, scheme)?;
            let removed = store.delete(&cmd.roll)?;
            println!(
                "Student '{}' (Roll: {}) has been deleted.",
                removed.name(),
                removed.roll()
            );
            Ok(())
        }
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn run_menu(path: &Path, scheme: GradeScheme) -> anyhow::Result<()> {
    let (mut store, problems) = Store::open_or_empty(path, scheme);
    for problem in &problems {
        if problem.is_persistence() {
            println!(
                "\n[ERROR] Could not load data from {}. Data might be corrupted. {problem}",
                path.display()
            );
        }
    }
    let skipped = problems.iter().filter(|p| !p.is_persistence()).count();
    if skipped > 0 {
        println!(
            "\n[WARN] Skipped {skipped} unreadable line(s) in {}",
            path.display()
        );
    }

    let stdin = io::stdin();
    let mut menu = Menu::new(stdin.lock(), io::stdout().lock());
    menu.run(&mut store)?;
    Ok(())
}

/// Open the store for a one-shot command, refusing to continue on read errors.
fn open_store(path: &Path, scheme: GradeScheme) -> anyhow::Result<Store> {
    let (store, _skipped) = Store::open(path, scheme)
        .with_context(|| format!("opening student data at {}", path.display()))?;
    Ok(store)
}

fn handle_show(path: &Path, scheme: GradeScheme, cmd: &ShowCommand) -> anyhow::Result<()> {
    let store = open_store(path, scheme)?;
    let record = store.search(&cmd.roll)?;
    if cmd.json {
        let value = record_json(record, store.scheme());
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        write_record(&mut io::stdout(), record, store.scheme())?;
    }
    Ok(())
}

fn handle_add(path: &Path, scheme: GradeScheme, cmd: AddCommand) -> anyhow::Result<()> {
    let mut store = open_store(path, scheme)?;

    let marks = parse_assignments(store.scheme(), &cmd.marks)?
        .into_iter()
        .zip(store.scheme().subjects())
        .map(|(mark, subject)| {
            mark.ok_or_else(|| {
                Error::invalid_field("mark", format!("missing {subject}=VALUE"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let record = store.add(NewStudent {
        roll: cmd.roll,
        name: cmd.name,
        class: cmd.class,
        marks,
    })?;
    println!(
        "Student '{}' (Roll: {}) added: total {}, average {:.2}, grade {}",
        record.name(),
        record.roll(),
        record.total(),
        record.average(),
        record.grade()
    );
    Ok(())
}

fn handle_update(path: &Path, scheme: GradeScheme, cmd: &UpdateCommand) -> anyhow::Result<()> {
    let mut store = open_store(path, scheme)?;
    let updates = parse_assignments(store.scheme(), &cmd.marks)?;

    let record = store.update_marks(&cmd.roll, &updates)?;
    println!(
        "Marks updated for {}: total {}, average {:.2}, grade {}",
        record.name(),
        record.total(),
        record.average(),
        record.grade()
    );
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Data file:          {}", config.data_file().display());
                println!();
                println!("[Grading]");
                println!("  Subjects:           {}", config.grading.subjects.join(", "));
                println!("  Max marks:          {}", config.grading.max_marks);
                for band in &config.grading.bands {
                    println!("  Grade {}:            >= {}", band.grade, band.min_average);
                }
                println!(
                    "  Grade {}:            otherwise",
                    config.grading.fallback_grade
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path: PathBuf = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
