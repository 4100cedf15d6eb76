use clap::Parser;
use crossfill_core::backtracking_search::{find_fill, FillFailure, FillOptions};
use crossfill_core::grid_config::{render_grid, GridConfig};
use crossfill_core::word_list::{WordList, WordListSourceConfig};
use log::info;
use std::fmt::{Debug, Formatter};
use std::fs;
use std::time::Duration;

/// crossfill: fill a crossword structure with words from a list
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the structure file, with _ marking fillable cells and anything else a block
    structure_path: String,

    /// Path to the word list, one word per line
    words_path: String,

    /// Optional path to write the filled grid to
    output_path: Option<String>,

    /// Propagate each choice with arc consistency during the search
    #[arg(long)]
    inference: bool,

    /// Give up after this many seconds [default: none]
    #[arg(long)]
    timeout: Option<u64>,
}

struct Error(String);

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0) // Print error unquoted
    }
}

fn main() -> Result<(), Error> {
    env_logger::init();

    let args = Args::parse();

    let config = GridConfig::from_file(&args.structure_path).map_err(|e| Error(e.to_string()))?;

    let word_list = WordList::new(WordListSourceConfig::File {
        path: args.words_path.clone().into(),
    })
    .map_err(|e| Error(e.to_string()))?;

    info!(
        "loaded {}x{} grid with {} slots and {} words",
        config.height,
        config.width,
        config.slots.len(),
        word_list.len()
    );

    let options = FillOptions {
        inference: args.inference,
        timeout: args.timeout.map(Duration::from_secs),
    };

    let result = match find_fill(&config, &word_list, &options) {
        Ok(result) => result,
        Err(FillFailure::Timeout) => return Err(Error("Timed out".into())),
        Err(failure) => {
            info!("{failure}");
            println!("No solution.");
            return Ok(());
        }
    };

    info!("{:?}", result.statistics);

    let rendered = render_grid(&config, &result.assignment);
    println!("{rendered}");

    if let Some(output_path) = args.output_path {
        fs::write(&output_path, rendered + "\n")
            .map_err(|_| Error(format!("Couldn't write file '{output_path}'")))?;
    }

    Ok(())
}
