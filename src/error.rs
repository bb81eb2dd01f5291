use std::path::PathBuf;

use thiserror::Error;

use crate::query::ParseError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("query error: {0}")]
    Parse(#[from] ParseError),
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid records in {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("cannot render query: {0}")]
    Render(#[source] serde_yaml::Error),
    #[error("no records given; use --dir, --stdin or --records, or set RECQL_DIR")]
    NoRecordSource,
}

pub type Result<T> = std::result::Result<T, Error>;
