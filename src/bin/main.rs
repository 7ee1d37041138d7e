use anagram_core::{AnagramEngine, EngineConfig, QueryError, SearchOutcome};
use anyhow::{Context, Result};
use clap::Parser;
use crossterm::style::Stylize;
use std::io::{stdin, stdout, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "anagram_matcher")]
#[command(about = "Anagram phrases of dictionary entries containing a substring", long_about = None)]
#[command(version)]
struct Cli {
    /// Newline-delimited word list
    #[arg(short, long, env = "ANAGRAM_DICTIONARY")]
    dictionary: PathBuf,

    /// JSON engine config; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, env = "ANAGRAM_MAX_RESULTS")]
    max_results: Option<usize>,

    /// Disable first-word pruning (results are unchanged, only slower)
    #[arg(long)]
    no_pruning: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[arg(short, long)]
    verbose: bool,

    #[arg(short, long)]
    quiet: bool,

    /// Run a single query and exit instead of starting the prompt
    query: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = load_config(&cli)?;
    let engine = AnagramEngine::from_file(config, &cli.dictionary)
        .with_context(|| format!("loading dictionary {}", cli.dictionary.display()))?;

    if let Some(query) = &cli.query {
        let outcome = engine.search(query);
        print_outcome(query, &outcome, cli.json)?;
        return Ok(());
    }

    run_prompt(&engine, cli.json)
}

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet || cli.json {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(max_results) = cli.max_results {
        config.max_results = max_results;
    }
    if cli.no_pruning {
        config.pruning = false;
    }
    config.validate()?;
    Ok(config)
}

fn run_prompt(engine: &AnagramEngine, json: bool) -> Result<()> {
    println!("{}", "Substring Anagram Matcher".bold());
    println!("---------------------------------------------------------------");
    println!("Type text and press [Enter] to search.");
    println!("':reload <path>' swaps the dictionary, ':stats' shows counts, 'exit' quits.\n");

    loop {
        print!("> ");
        stdout().flush()?;

        let mut input = String::new();
        if stdin().read_line(&mut input)? == 0 {
            break;
        }
        let cmd = input.trim();

        match cmd {
            "exit" => break,
            ":stats" => println!("{}", serde_json::to_string_pretty(&engine.stats())?),
            s if s.starts_with(":reload ") => {
                let path = Path::new(s[":reload ".len()..].trim());
                match engine.reload(path) {
                    Ok(generation) => println!(
                        "{}",
                        format!("Loaded {} as generation {}", path.display(), generation).green()
                    ),
                    Err(e) => eprintln!("{} {}", "[ERROR]".red(), e),
                }
            }
            s => print_outcome(s, &engine.search(s), json)?,
        }
    }
    Ok(())
}

fn print_outcome(query: &str, outcome: &Result<SearchOutcome, QueryError>, json: bool) -> Result<()> {
    if json {
        let value = match outcome {
            Ok(outcome) => serde_json::to_value(outcome)?,
            Err(e) => serde_json::json!({ "status": "invalid_input", "reason": e.to_string() }),
        };
        println!("{value}");
        return Ok(());
    }

    match outcome {
        Ok(SearchOutcome::Matches(phrases)) => {
            println!("\nAnagrams for '{}':", query.bold());
            for (i, phrase) in phrases.iter().enumerate() {
                println!("  {:>2}: {}", i + 1, phrase);
            }
        }
        Ok(SearchOutcome::NoMatches) => println!("\n{}", "No matches found.".yellow()),
        Err(QueryError::EmptyQuery) => println!("\n{}", "Enter some text to search for.".yellow()),
        Err(e) => println!("\n{} {}", "[Rejected]".red(), e),
    }
    println!();
    Ok(())
}
