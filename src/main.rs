//! Studioops CLI: runs the follow-up refresh and reads its results.
//!
//! Identity comes from `ownerId` in `~/.studioops/config.json` or the
//! `STUDIOOPS_OWNER` environment variable. External schedulers (cron,
//! launchd) invoke `studioops refresh` on whatever cadence they like; the
//! daily guard makes repeat runs cheap no-ops.

use std::process::ExitCode;

use studioops::automation;
use studioops::config::{load_config, resolve_identity, Config};
use studioops::db::StudioDb;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("help");

    match run(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("studioops: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: &str) -> Result<(), String> {
    match command {
        "refresh" => cmd_refresh(),
        "status" => cmd_status(),
        "tasks" => cmd_tasks(),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            print_usage();
            Err(format!("unknown command: {other}"))
        }
    }
}

fn open_db() -> Result<(StudioDb, Config), String> {
    let config = load_config()?;
    let db = match &config.db_path {
        Some(path) => StudioDb::open_at(path.clone()),
        None => StudioDb::open(),
    }
    .map_err(|e| format!("failed to open database: {e}"))?;
    Ok((db, config))
}

fn cmd_refresh() -> Result<(), String> {
    let (db, config) = open_db()?;
    let identity = resolve_identity(&config);
    let outcome = automation::refresh_management_signals(&db, identity.as_ref())
        .map_err(|e| e.to_string())?;
    print_json(&outcome)
}

fn cmd_status() -> Result<(), String> {
    let (db, config) = open_db()?;
    let identity = resolve_identity(&config).ok_or_else(no_identity)?;
    let owner = &identity.owner_id;

    let settings = db.get_or_create_settings(owner).map_err(|e| e.to_string())?;
    let open_tasks = db.list_open_tasks(owner).map_err(|e| e.to_string())?;
    let unread = db
        .list_unread_notifications(owner)
        .map_err(|e| e.to_string())?;

    print_json(&serde_json::json!({
        "ownerId": owner,
        "settings": settings,
        "openTasks": open_tasks.len(),
        "unreadNotifications": unread.len(),
    }))
}

fn cmd_tasks() -> Result<(), String> {
    let (db, config) = open_db()?;
    let identity = resolve_identity(&config).ok_or_else(no_identity)?;
    let tasks = db
        .list_open_tasks(&identity.owner_id)
        .map_err(|e| e.to_string())?;
    print_json(&tasks)
}

fn no_identity() -> String {
    "no studio owner configured (set ownerId in ~/.studioops/config.json or STUDIOOPS_OWNER)"
        .to_string()
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let rendered = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{rendered}");
    Ok(())
}

fn print_usage() {
    eprintln!("Usage: studioops <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  refresh   run today's follow-up refresh for the configured owner");
    eprintln!("  status    settings, last refresh, and open/unread counts");
    eprintln!("  tasks     open follow-up tasks as JSON");
}
