use clap::Args;
use keyprobe::KeyIdentifier;
use serde::Serialize;

use crate::error::Result;
use crate::output::OutputFormat;

#[derive(Args)]
pub(crate) struct Config {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

#[derive(Serialize)]
struct FormatInfo {
    format: String,
    markers: Vec<&'static str>,
    public_key_always_recoverable: bool,
    encryption_flag_in_header: bool,
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let formats: Vec<FormatInfo> = KeyIdentifier::default()
        .signatures()
        .map(|signature| FormatInfo {
            format: signature.format.to_string(),
            markers: signature.markers.to_vec(),
            public_key_always_recoverable: signature.public_key_always_recoverable,
            encryption_flag_in_header: signature.encryption_flag_in_header,
        })
        .collect();

    match config.output {
        OutputFormat::Text => {
            for info in &formats {
                println!("{}", info.format);
                for marker in &info.markers {
                    println!("  {}", marker);
                }
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&formats)?),
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&formats)?),
    }
    Ok(())
}
