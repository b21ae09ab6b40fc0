use std::io::{self, BufRead, Write};

use anyhow::{bail, Context};
use chrono::Utc;
use engine_logging::{engine_info, engine_warn};
use feed_engine::{EngineHandle, FeedEvent, Operation};

use super::{config, logging, render};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    More,
    Refresh,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "m" | "more" => Some(Command::More),
        "r" | "refresh" => Some(Command::Refresh),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

pub fn run_app() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("resolving working directory")?;
    let app_config = config::load_config(&cwd);
    logging::initialize(app_config.log, app_config.log_level);
    engine_info!(
        "Starting feed against {} (page size {})",
        app_config.engine.api_base_url,
        app_config.engine.page_size
    );

    let handle = EngineHandle::new(app_config.engine).context("starting feed engine")?;
    let mut out = io::stdout().lock();

    run_operation(&handle, Operation::InitialLoad, &mut out)?;
    prompt(&mut out)?;

    for line in io::stdin().lock().lines() {
        let line = line.context("reading command")?;
        match parse_command(&line) {
            Some(Command::More) => run_operation(&handle, Operation::LoadMore, &mut out)?,
            Some(Command::Refresh) => run_operation(&handle, Operation::Refresh, &mut out)?,
            Some(Command::Quit) => break,
            None if line.trim().is_empty() => {}
            None => writeln!(out, "Unknown command {:?}", line.trim())?,
        }
        prompt(&mut out)?;
    }

    engine_info!("Feed closed");
    Ok(())
}

fn prompt(out: &mut impl Write) -> io::Result<()> {
    write!(out, "[m]ore  [r]efresh  [q]uit > ")?;
    out.flush()
}

/// Submits one operation and blocks until it settles, so operations never
/// overlap.
fn run_operation(handle: &EngineHandle, op: Operation, out: &mut impl Write) -> anyhow::Result<()> {
    if handle.is_busy() {
        writeln!(out, "Still loading, try again shortly.")?;
        return Ok(());
    }
    handle.enqueue(op);

    loop {
        match handle.recv() {
            Some(FeedEvent::Started(_)) => {
                writeln!(out, "Loading...")?;
                out.flush()?;
            }
            Some(FeedEvent::Completed {
                op,
                stories,
                status,
                loaded_count,
                ranking_len,
            }) => {
                writeln!(out, "{}", render::render_feed(&stories, Utc::now()))?;
                writeln!(out, "{loaded_count} of {ranking_len} stories shown")?;
                if status.has_error() {
                    engine_warn!("{} finished with error: {}", op, status.message());
                    writeln!(out, "Error: {}", status.message())?;
                }
                return Ok(());
            }
            None => bail!("feed engine stopped unexpectedly"),
        }
    }
}
