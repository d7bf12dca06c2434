//! Atomic file output.
//!
//! Files are written to a hidden temporary sibling and renamed into place,
//! so readers never observe a partially written file.

use crate::error::{DataError, Result};
use log::info;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

fn write_err(path: &Path) -> impl Fn(std::io::Error) -> DataError + '_ {
    move |source| DataError::Write {
        path: path.to_path_buf(),
        source,
    }
}

fn to_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|source| DataError::Serialize {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `bytes` to the temporary sibling of `path`, creating parents.
fn stage(path: &Path, bytes: &[u8]) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err(path))?;
    }
    let tmp = temp_path(path);
    let result: std::io::Result<()> = (|| {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()
    })();
    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(write_err(path)(e));
    }
    Ok(tmp)
}

/// Replace `path` with `bytes` in one step.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = stage(path, bytes)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(write_err(path)(e));
    }
    Ok(())
}

/// Serialize `value` as JSON and write it atomically.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let bytes = to_json(path, value)?;
    write_atomically(path, &bytes)?;
    info!("Wrote {}", path.display());
    Ok(())
}

/// Write a set of JSON files together. Every value is serialized and every
/// file staged before the first one is renamed into place, so a failure
/// while serializing or staging leaves all targets untouched.
pub fn write_json_set<T: Serialize>(files: &[(PathBuf, T)]) -> Result<()> {
    let encoded = files
        .iter()
        .map(|(path, value)| Ok((path.as_path(), to_json(path, value)?)))
        .collect::<Result<Vec<_>>>()?;

    let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(encoded.len());
    for (path, bytes) in &encoded {
        match stage(path, bytes) {
            Ok(tmp) => staged.push((tmp, *path)),
            Err(e) => {
                for (tmp, _) in &staged {
                    let _ = fs::remove_file(tmp);
                }
                return Err(e);
            }
        }
    }

    for (tmp, path) in &staged {
        fs::rename(tmp, path).map_err(write_err(path))?;
        info!("Wrote {}", path.display());
    }
    Ok(())
}
