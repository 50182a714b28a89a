use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{D8Error, Result};
use crate::markers::NAME_LEN;
use crate::transport::TrackPairs;

/// Number of `-N` variants tried when the plain name is taken.
pub const MAX_VARIANTS: usize = 10;

#[cfg(unix)]
fn os_name(bytes: &[u8]) -> OsString {
    use std::os::unix::ffi::OsStrExt;
    std::ffi::OsStr::from_bytes(bytes).to_os_string()
}

#[cfg(not(unix))]
fn os_name(bytes: &[u8]) -> OsString {
    OsString::from(String::from_utf8_lossy(bytes).into_owned())
}

/// Picks a free `<song>[-<n>tr][-<variant>].raw` name in `dir`. The song
/// name bytes are used as they are, so names outside UTF-8 survive on unix.
pub fn song_filename(dir: &Path, song_name: &[u8], cut: Option<TrackPairs>) -> Result<PathBuf> {
    let mut base = os_name(&song_name[..song_name.len().min(NAME_LEN)]);
    if let Some(cut) = cut {
        base.push(format!("-{}tr", cut.tracks()));
    }

    for variant in 0..=MAX_VARIANTS {
        let mut file_name = base.clone();
        if variant > 0 {
            file_name.push(format!("-{variant}"));
        }
        file_name.push(".raw");

        let candidate = dir.join(file_name);
        match fs::symlink_metadata(&candidate) {
            Ok(_) => continue,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(candidate),
            Err(source) => {
                return Err(D8Error::CheckOutput {
                    path: candidate,
                    source,
                });
            }
        }
    }

    Err(D8Error::NameCollision {
        base: base.to_string_lossy().into_owned(),
        tries: MAX_VARIANTS,
    })
}

/// Creates `path` for writing, refusing to touch an existing file.
pub fn create_exclusive(path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|source| D8Error::CreateOutput {
            path: path.to_path_buf(),
            source,
        })
}

/// Temporary output in `dir`, renamed once the song name is known.
pub fn temp_output(dir: &Path) -> Result<NamedTempFile> {
    tempfile::Builder::new()
        .prefix("d8bup.")
        .suffix(".tmp.raw")
        .tempfile_in(dir)
        .map_err(|source| D8Error::CreateOutput {
            path: dir.to_path_buf(),
            source,
        })
}

pub fn persist_as_song(
    temp: NamedTempFile,
    dir: &Path,
    song_name: Option<&[u8]>,
    cut: Option<TrackPairs>,
) -> Result<PathBuf> {
    let song_name = song_name.ok_or(D8Error::NoSongName)?;
    let path = song_filename(dir, song_name, cut)?;
    temp.persist_noclobber(&path)
        .map_err(|err| D8Error::Rename {
            path: path.clone(),
            source: err.error,
        })?;
    Ok(path)
}
