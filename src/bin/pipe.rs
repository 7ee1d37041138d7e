// Line protocol driver for embedding the matcher behind another process.
//
//   SEARCH <text>   -> RESULT <json array> | NO_MATCHES | INVALID_INPUT <reason> | ERROR <message>
//   RELOAD <path>   -> RELOADED <generation> | ERROR <message>
//   STATS           -> STATS <json>
//   EXIT
use anagram_core::{AnagramEngine, EngineConfig, QueryError, SearchOutcome};
use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

fn dictionary_path() -> Result<PathBuf> {
    std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os("ANAGRAM_DICTIONARY"))
        .map(PathBuf::from)
        .context("usage: anagram_pipe <dictionary> (or set ANAGRAM_DICTIONARY)")
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let dict_path = dictionary_path()?;
    let engine = AnagramEngine::from_file(EngineConfig::default(), &dict_path)
        .with_context(|| format!("loading dictionary {}", dict_path.display()))?;
    log::info!("Pipe ready on {}", dict_path.display());

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let input = line?;
        log::debug!("<- {:?}", input);
        let Some(reply) = handle_line(&engine, &input)? else {
            break;
        };
        log::debug!("-> {:?}", reply);
        writeln!(stdout, "{reply}")?;
        stdout.flush()?;
    }
    log::info!("Pipe shutting down");
    Ok(())
}

/// Answers one protocol line. `None` means the peer asked to exit.
fn handle_line(engine: &AnagramEngine, input: &str) -> Result<Option<String>> {
    let (command, argument) = input.split_once(' ').unwrap_or((input, ""));
    let reply = match command {
        "SEARCH" => search_reply(engine, argument)?,
        "RELOAD" => reload_reply(engine, Path::new(argument.trim())),
        "STATS" => format!("STATS {}", serde_json::to_string(&engine.stats())?),
        "EXIT" => return Ok(None),
        _ => format!("ERROR unknown command {command:?}"),
    };
    Ok(Some(reply))
}

fn reload_reply(engine: &AnagramEngine, path: &Path) -> String {
    match engine.reload(path) {
        Ok(generation) => format!("RELOADED {generation}"),
        Err(e) => format!("ERROR {e}"),
    }
}

fn search_reply(engine: &AnagramEngine, query: &str) -> Result<String> {
    Ok(match engine.search(query) {
        Ok(SearchOutcome::Matches(phrases)) => format!("RESULT {}", serde_json::to_string(&phrases)?),
        Ok(SearchOutcome::NoMatches) => "NO_MATCHES".to_string(),
        Err(e @ QueryError::BudgetExhausted { .. }) => format!("ERROR {e}"),
        Err(e) => format!("INVALID_INPUT {e}"),
    })
}
