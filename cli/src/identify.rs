use std::path::PathBuf;

use clap::Args;
use keyprobe::{DEFAULT_MAX_INPUT_SIZE, KeyIdentifier, Options};
use tracing::debug;

use crate::error::{Error, Result};
use crate::output::{OutputFormat, Record, render};
use crate::utils::{collect_files, read_stdin};

const STDIN_NAME: &str = "-";

#[derive(Args)]
pub(crate) struct Config {
    /// Key files or directories. If not specified, reads one key from stdin
    paths: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Reject inputs larger than this many bytes
    #[arg(long, default_value_t = DEFAULT_MAX_INPUT_SIZE)]
    max_input_size: usize,
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let identifier = KeyIdentifier::new(Options::default().with_max_input_size(config.max_input_size));

    let mut records = Vec::new();
    let mut failed = 0;
    let total;
    if config.paths.is_empty() {
        total = 1;
        let input = read_stdin(config.max_input_size)?;
        match identifier.identify(&input) {
            Ok(descriptor) => records.push(Record {
                path: STDIN_NAME.to_string(),
                descriptor,
            }),
            Err(err) => {
                report(STDIN_NAME, &err);
                failed += 1;
            }
        }
    } else {
        let files = collect_files(&config.paths)?;
        total = files.len();
        debug!(files = total, "identifying");
        for file in files {
            let path = file.display().to_string();
            match identifier.identify_file(&file) {
                Ok(descriptor) => records.push(Record { path, descriptor }),
                Err(err) => {
                    report(&path, &err);
                    failed += 1;
                }
            }
        }
    }

    print!("{}", render(&records, config.output)?);

    if failed > 0 {
        return Err(Error::Failed { failed, total });
    }
    Ok(())
}

fn report(path: &str, err: &keyprobe::Error) {
    eprintln!("{}: {}: {}", path, err.kind(), err);
}
