use keyprobe::KeyDescriptor;
use serde::Serialize;

use crate::error::Result;

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// One line per key
    #[default]
    Text,
    /// JSON array of records
    Json,
    /// YAML sequence of records
    Yaml,
}

/// A descriptor together with where it came from.
#[derive(Debug, Serialize)]
pub(crate) struct Record {
    #[serde(rename = "Path")]
    pub path: String,
    #[serde(flatten)]
    pub descriptor: KeyDescriptor,
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

/// `path: format type bits encrypted md5 sha256`, with `-` for unknowns.
pub(crate) fn text_line(record: &Record) -> String {
    let descriptor = &record.descriptor;
    let bits = descriptor
        .bits()
        .map_or_else(|| "-".to_string(), |bits| bits.to_string());
    format!(
        "{}: {} {} {} {} {} {}",
        record.path,
        descriptor.format(),
        descriptor.key_type(),
        bits,
        if descriptor.encrypted() { "encrypted" } else { "unencrypted" },
        or_dash(descriptor.fingerprint_md5()),
        or_dash(descriptor.fingerprint_sha256()),
    )
}

pub(crate) fn render(records: &[Record], format: OutputFormat) -> Result<String> {
    let rendered: String = match format {
        OutputFormat::Text => records
            .iter()
            .map(|record| text_line(record) + "\n")
            .collect(),
        OutputFormat::Json => serde_json::to_string_pretty(records)? + "\n",
        OutputFormat::Yaml => serde_yml::to_string(records)?,
    };
    Ok(rendered)
}
