//! Scenario files.
//!
//! A scenario file lists the lines of a network, where trains start and end,
//! and how many there are:
//!
//! ```text
//! #A
//! 1:S1
//! 2:S2
//! 3:S3
//!
//! #B
//! 1:S3
//! 2:S4
//! 3:S5
//!
//! START=A:1
//! END=B:3
//! TRAINS=2
//! ```
//!
//! Indices in `START` and `END` are 1-based. Stations with the same name on
//! different lines are the same station. The numbers in front of station
//! names are not checked; stations keep the order they are listed in.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::network::{Network, NetworkError, Position};

/// Everything needed to start a simulation.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub network: Network,
    pub start: Position,
    pub end: Position,
    pub trains: usize,
}

/// Errors from reading a scenario.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line of the file is malformed
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A required directive never appeared
    #[error("missing {0}")]
    Missing(&'static str),

    /// The described network is invalid
    #[error("line {line}: {source}")]
    Network {
        line: usize,
        #[source]
        source: NetworkError,
    },
}

/// Read and parse a scenario file.
///
/// # Errors
///
/// [`LoadError::Io`] if the file cannot be read, otherwise anything
/// [`parse`] returns.
pub fn load_file(path: impl AsRef<Path>) -> Result<Scenario, LoadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text)
}

/// A `Line:index` reference and the file line it came from.
struct Anchor {
    line: usize,
    name: String,
    index: usize,
}

/// Parse scenario text.
///
/// # Errors
///
/// - [`LoadError::Parse`] for an unrecognised or malformed line
/// - [`LoadError::Missing`] if `START`, `END` or `TRAINS` is absent
/// - [`LoadError::Network`] for an invalid line or an out-of-range anchor
pub fn parse(text: &str) -> Result<Scenario, LoadError> {
    let mut builder = Network::builder();
    let mut start = None;
    let mut end = None;
    let mut trains = None;

    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l.trim())).peekable();
    while let Some((number, content)) = lines.next() {
        if content.is_empty() {
            continue;
        }

        if let Some(name) = content.strip_prefix('#') {
            let mut stations = Vec::new();
            while let Some(station) = lines.peek().and_then(|(_, l)| station_entry(l)) {
                stations.push(station.to_string());
                lines.next();
            }
            builder
                .add_line(name.trim(), &stations)
                .map_err(|source| LoadError::Network {
                    line: number,
                    source,
                })?;
        } else if let Some(value) = content.strip_prefix("START=") {
            start = Some(anchor(number, value)?);
        } else if let Some(value) = content.strip_prefix("END=") {
            end = Some(anchor(number, value)?);
        } else if let Some(value) = content.strip_prefix("TRAINS=") {
            trains = Some(train_count(number, value)?);
        } else {
            return Err(LoadError::Parse {
                line: number,
                message: format!("unexpected `{content}`"),
            });
        }
    }

    let network = builder.build();
    let start = resolve(&network, start.ok_or(LoadError::Missing("START"))?)?;
    let end = resolve(&network, end.ok_or(LoadError::Missing("END"))?)?;
    let trains = trains.ok_or(LoadError::Missing("TRAINS"))?;

    debug!(
        lines = network.lines().len(),
        stations = network.stations().len(),
        trains,
        "loaded scenario"
    );
    Ok(Scenario {
        network,
        start,
        end,
        trains,
    })
}

/// Station name of an `N:Name` entry.
fn station_entry(line: &str) -> Option<&str> {
    let (number, name) = line.split_once(':')?;
    let name = name.trim();
    (!number.is_empty() && number.bytes().all(|b| b.is_ascii_digit()) && !name.is_empty())
        .then_some(name)
}

fn anchor(line: usize, value: &str) -> Result<Anchor, LoadError> {
    let malformed = || LoadError::Parse {
        line,
        message: format!("expected `Line:index`, got `{value}`"),
    };
    let (name, index) = value.rsplit_once(':').ok_or_else(malformed)?;
    let index: usize = index.trim().parse().map_err(|_| malformed())?;
    if index == 0 {
        return Err(LoadError::Parse {
            line,
            message: "station indices start at 1".to_string(),
        });
    }
    Ok(Anchor {
        line,
        name: name.trim().to_string(),
        index: index - 1,
    })
}

fn train_count(line: usize, value: &str) -> Result<usize, LoadError> {
    match value.trim().parse() {
        Ok(0) | Err(_) => Err(LoadError::Parse {
            line,
            message: format!("expected a positive train count, got `{value}`"),
        }),
        Ok(n) => Ok(n),
    }
}

fn resolve(network: &Network, anchor: Anchor) -> Result<Position, LoadError> {
    network
        .position(&anchor.name, anchor.index)
        .map_err(|source| LoadError::Network {
            line: anchor.line,
            source,
        })
}
