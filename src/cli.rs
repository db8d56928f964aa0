//! Command-line front end: reads a JSON request, packs it, renders the result.

use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::api::{PackRequest, PackResponse, RequestValidationError};
use crate::config::{AppConfig, OutputFormat};
use crate::optimizer::{PackError, PackingResult};

/// Errors that abort the command-line run.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Could not read request from {source_name}: {source}")]
    Read {
        source_name: String,
        #[source]
        source: io::Error,
    },
    #[error("Request is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Request rejected: {0}")]
    InvalidRequest(#[from] RequestValidationError),
    #[error("Packing failed: {0}")]
    Pack(#[from] PackError),
}

/// Where the request is read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestSource {
    Stdin,
    File(PathBuf),
}

impl RequestSource {
    /// Picks the source: an explicit argument wins over the configured input,
    /// `-` or nothing at all means stdin.
    pub fn resolve(arg: Option<&str>, configured: Option<&PathBuf>) -> Self {
        match arg {
            Some("-") => RequestSource::Stdin,
            Some(path) => RequestSource::File(PathBuf::from(path)),
            None => match configured {
                Some(path) => RequestSource::File(path.clone()),
                None => RequestSource::Stdin,
            },
        }
    }

    fn describe(&self) -> String {
        match self {
            RequestSource::Stdin => "stdin".to_string(),
            RequestSource::File(path) => path.display().to_string(),
        }
    }

    /// Reads the raw request text.
    pub fn read_to_string(&self) -> Result<String, CliError> {
        let read = match self {
            RequestSource::Stdin => {
                let mut buffer = String::new();
                io::stdin().read_to_string(&mut buffer).map(|_| buffer)
            }
            RequestSource::File(path) => read_file(path),
        };
        read.map_err(|source| CliError::Read {
            source_name: self.describe(),
            source,
        })
    }
}

fn read_file(path: &Path) -> io::Result<String> {
    fs::read_to_string(path)
}

/// Parses a request, packs it with `config` and returns the result.
pub fn pack_request(raw: &str, config: &AppConfig) -> Result<PackingResult, CliError> {
    let request: PackRequest = serde_json::from_str(raw)?;
    let packer = request.into_packer(config.optimizer.packing_config())?;
    info!(
        bins = packer.bins().len(),
        items = packer.items().len(),
        "request loaded"
    );
    Ok(packer.pack()?)
}

/// Renders a result in the requested format.
pub fn render(result: &PackingResult, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Text => Ok(render_text(result)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(
            &PackResponse::from_packing_result(result),
        )?),
    }
}

/// Human-readable listing: every bin with its packed items, then the unfit items.
pub struct TextReport<'a>(pub &'a PackingResult);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for packed in &self.0.bins {
            writeln!(f, "{}", packed)?;
        }
        writeln!(f, "unfit items:")?;
        for unfit in &self.0.unfit {
            writeln!(f, "   {} [{}]", unfit.item, unfit.reason.code())?;
        }
        Ok(())
    }
}

pub fn render_text(result: &PackingResult) -> String {
    TextReport(result).to_string()
}

/// Runs the whole command: read, pack, render.
pub fn run(arg: Option<&str>, config: &AppConfig) -> Result<String, CliError> {
    let source = RequestSource::resolve(arg, config.cli.input());
    let raw = source.read_to_string()?;
    let result = pack_request(&raw, config)?;
    render(&result, config.cli.output_format())
}
