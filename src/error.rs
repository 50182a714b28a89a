use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, D8Error>;

#[derive(Error, Debug)]
pub enum D8Error {
    #[error("reading input stream")]
    Read(#[source] std::io::Error),

    #[error("writing output stream")]
    Write(#[source] std::io::Error),

    #[error("{what} requires argument 2, 4 or 6, got {value}")]
    TrackCount { what: &'static str, value: u8 },

    #[error("may only specify one of expand and cut")]
    ExpandAndCut,

    #[error("song number must be >= 1")]
    SongNumber,

    #[error("no song name found in input, cannot derive output file name")]
    NoSongName,

    #[error("no free output file name for {base} after {tries} tries")]
    NameCollision { base: String, tries: usize },

    #[error("checking for existing output file {path}")]
    CheckOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("creating output file {path}")]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("renaming output file to {path}")]
    Rename {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
