use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use instant::Duration;

use crossfill::parse::{load_structure, load_word_list};
use crossfill::{find_fill, SearchConfig};

/// Fill a crossword structure with words from a word list.
#[derive(Parser, Debug)]
#[command(name = "crossfill")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Structure file: one row per line, `_` or `.` for fillable cells
    structure: PathBuf,

    /// Word list file: one word per line
    words: PathBuf,

    /// Also write the filled grid to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Give up after this many milliseconds
    #[arg(short, long)]
    timeout_ms: Option<u64>,

    /// Re-run arc consistency after every trial assignment
    #[arg(long)]
    maintain_arc_consistency: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let debug_enabled = cli.debug || std::env::var("CROSSFILL_DEBUG").is_ok();
    crossfill::log::init_logger(debug_enabled);

    match try_main(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn try_main(cli: &Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = load_structure(&cli.structure)?;
    let word_list = load_word_list(&cli.words)?;
    log::debug!("Loaded {} slots and {} words", config.slot_count(), word_list.len());

    let search_config = SearchConfig {
        timeout: cli.timeout_ms.map(Duration::from_millis),
        maintain_arc_consistency: cli.maintain_arc_consistency,
    };

    match find_fill(&config, &word_list, &search_config) {
        Ok(result) => {
            let display_grid = result.letter_grid(&config, &word_list).to_string();
            println!("{}", display_grid);

            if let Some(output) = &cli.output {
                fs::write(output, display_grid + "\n")?;
                log::info!("Wrote {}", output.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) if failure.is_proven_unsolvable() => {
            log::debug!("{failure}");
            println!("No solution.");
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            eprintln!("{failure}");
            Ok(ExitCode::FAILURE)
        }
    }
}
