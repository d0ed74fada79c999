//! Crash-safe replacement of the user list file
//! --------------------------------------------
//! Writes the full new content to `<real path>.NXX` in the same directory and
//! renames it over the real file. A crash before the rename leaves the old
//! file intact; readers holding the store lock never see a partial file.
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const TEMP_SUFFIX: &str = ".NXX";

/// Resolve symlinks so the rename lands next to the real file, even when the
/// configured path links into another filesystem. A path that does not exist
/// yet is used as given.
fn resolve_target(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn temp_path_for(target: &Path) -> PathBuf {
    let mut s = target.as_os_str().to_os_string();
    s.push(TEMP_SUFFIX);
    PathBuf::from(s)
}

pub(super) fn replace_contents(path: &Path, contents: &str) -> io::Result<()> {
    let target = resolve_target(path);
    if let Some(dir) = target.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    let tmp = temp_path_for(&target);
    let old_perms = fs::metadata(&target).ok().map(|m| m.permissions());

    let written = write_new(&tmp, contents).and_then(|()| match old_perms {
        Some(perms) => fs::set_permissions(&tmp, perms),
        None => Ok(()),
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    if let Err(e) = fs::rename(&tmp, &target) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    if let Some(dir) = target.parent() {
        let _ = fsync_dir(dir);
    }
    Ok(())
}

fn write_new(tmp: &Path, contents: &str) -> io::Result<()> {
    let mut f = File::create(tmp)?;
    f.write_all(contents.as_bytes())?;
    f.flush()?;
    f.sync_all()
}

fn fsync_dir(dir: &Path) -> io::Result<()> {
    // Not every platform can open a directory for syncing; best effort.
    let f = File::open(dir)?;
    f.sync_all()
}
