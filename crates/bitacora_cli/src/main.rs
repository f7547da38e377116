//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open the configured journal store and print a deterministic summary.
//! - Surface index/record drift without repairing it.
//!
//! Without a database path an in-memory store is opened. File logging is
//! enabled only when a log directory is given.

use bitacora_core::{
    check_integrity, default_log_level, init_logging, open_db, open_db_in_memory, JournalService,
    NoteScope, SqliteStore,
};
use clap::Parser;
use log::warn;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "bitacora")]
#[command(version)]
#[command(about = "Summarize a Bitacora journal store")]
struct Cli {
    /// Journal database file
    #[arg(env = "BITACORA_DB")]
    db_path: Option<PathBuf>,

    /// Absolute directory for rolling log files
    #[arg(long, env = "BITACORA_LOG_DIR")]
    log_dir: Option<String>,

    /// trace|debug|info|warn|error
    #[arg(long, env = "BITACORA_LOG_LEVEL")]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    match run(cli.db_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("bitacora: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(db_path: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let conn = match db_path.as_deref() {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let store = SqliteStore::new(&conn);
    let journal = JournalService::over_store(&store);

    let subjects = journal.list_subjects()?;
    let notes = journal.notes_for(NoteScope::All)?;
    let memorable = journal.memorable_notes(NoteScope::All)?;
    let report = check_integrity(&store)?;

    println!("bitacora_core version={}", bitacora_core::core_version());
    match db_path.as_deref() {
        Some(path) => println!("store={}", path.display()),
        None => println!("store=:memory:"),
    }
    println!("subjects={}", subjects.len());
    println!("notes={}", notes.len());
    println!("memorable={}", memorable.len());
    println!("integrity_clean={}", report.is_clean());

    if !report.is_clean() {
        warn!(
            "event=integrity_check module=cli status=drift dangling_subjects={} dangling_notes={} misplaced={} unindexed_subjects={} unindexed_notes={} orphan_notes={}",
            report.dangling_subject_ids.len(),
            report.dangling_note_ids.len(),
            report.misplaced_subject_entries.len(),
            report.unindexed_subject_ids.len(),
            report.unindexed_note_ids.len(),
            report.orphan_note_ids.len()
        );
        println!("dangling_subject_ids={:?}", report.dangling_subject_ids);
        println!("dangling_note_ids={:?}", report.dangling_note_ids);
        println!("orphan_note_ids={:?}", report.orphan_note_ids);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::{CommandFactory, Parser};
    use std::path::Path;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_positional_path_and_log_flags() {
        let cli = Cli::try_parse_from([
            "bitacora",
            "/tmp/journal.db",
            "--log-dir",
            "/tmp/bitacora-logs",
            "--log-level",
            "warn",
        ])
        .unwrap();

        assert_eq!(cli.db_path.as_deref(), Some(Path::new("/tmp/journal.db")));
        assert_eq!(cli.log_dir.as_deref(), Some("/tmp/bitacora-logs"));
        assert_eq!(cli.log_level.as_deref(), Some("warn"));
    }

    #[test]
    fn help_flag_is_not_taken_as_a_path() {
        let err = Cli::try_parse_from(["bitacora", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
