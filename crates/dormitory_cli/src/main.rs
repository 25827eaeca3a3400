//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open the configured database and verify `dormitory_core` wiring.
//! - Print a deterministic occupancy summary for quick local checks.

use dormitory_core::{
    core_version, init_logging, open_db_with_options, CoreConfig, Dormitory, PageRequest,
    RequestContext,
};
use log::info;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("dormitory: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    let config = CoreConfig::from_env()?;

    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }

    let conn = open_db_with_options(&config.db_path, &config.db_options())?;
    let dormitory = Dormitory::try_new(&conn)?;
    let ctx = config.request_context(RequestContext::anonymous());

    let rooms = dormitory.rooms.list_rooms(&ctx, PageRequest::ALL)?;
    let students = dormitory.students.list_students(&ctx, PageRequest::ALL)?;
    let free_things = dormitory.things.get_free_things(&ctx)?;

    info!(
        "event=cli_summary module=cli status=ok rooms={} students={} free_things={}",
        rooms.len(),
        students.len(),
        free_things.len()
    );
    println!("dormitory_core version={}", core_version());
    println!("db={}", config.db_path.display());
    println!("rooms={}", rooms.len());
    println!("students={}", students.len());
    println!("free_things={}", free_things.len());
    Ok(())
}
