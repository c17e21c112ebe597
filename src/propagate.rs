//! Carrying player customization and shared content into a new build
//!
//! Copies are structural: destination entries are overwritten, nothing is merged or deleted.
//! A missing source directory means there is nothing to carry over and is not an error.

use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::ui::Ui;

const VCS_METADATA: &[&str] = &[".git"];

/// Per-player directories copied from the previous build: (directory, what to call an entry)
const PLAYER_DIRS: &[(&str, &str)] = &[("templates", "template"), ("config", "config file")];

/// Extras content: (directory in the extras tree, destination inside the game dir, label)
const OVERLAYS: &[(&str, &[&str], &str)] = &[
    ("gfx", &["gfx"], "tileset"),
    ("mods", &["data", "mods"], "mod"),
    ("soundpacks", &["data", "sound"], "soundpack"),
];

/// Copy templates and config from the previous build's game dir into the new one
pub fn propagate(from_game: &Path, to_game: &Path, ui: &mut impl Ui) -> Result<()> {
    for (dir, what) in PLAYER_DIRS {
        copy_entries(&from_game.join(dir), &to_game.join(dir), what, ui)?;
    }
    Ok(())
}

/// Copy tilesets, mods and soundpacks from the extras tree into a game dir
pub fn overlay_content(extras_dir: &Path, game_dir: &Path, ui: &mut impl Ui) -> Result<()> {
    for (source, dest, what) in OVERLAYS {
        let dest = dest.iter().fold(game_dir.to_path_buf(), |path, part| path.join(part));
        copy_entries(&extras_dir.join(source), &dest, what, ui)?;
    }
    Ok(())
}

/// Copy each top-level entry of `from` into `to`, skipping VCS metadata.
///
/// Returns how many entries were copied; 0 when `from` does not exist.
pub fn copy_entries(from: &Path, to: &Path, what: &str, ui: &mut impl Ui) -> Result<usize> {
    let copy_error = |source: io::Error| Error::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    let entries = match fs::read_dir(from) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("Nothing to copy from {:?}", from);
            return Ok(0);
        }
        Err(e) => return Err(copy_error(e)),
    };

    let mut names = entries
        .map(|entry| entry.map(|e| e.file_name()))
        .collect::<io::Result<Vec<_>>>()
        .map_err(copy_error)?;
    names.retain(|name| !VCS_METADATA.iter().any(|skip| name == skip));
    names.sort();

    for name in &names {
        ui.log(format!("Copying {} {} to game dir", name.to_string_lossy(), what));
        copy_tree(&from.join(name), &to.join(name))?;
    }

    Ok(names.len())
}

/// Recursively copy a file or directory, overwriting files that already exist
pub fn copy_tree(from: &Path, to: &Path) -> Result<()> {
    for entry in WalkDir::new(from) {
        let entry = entry.map_err(|e| Error::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source: e.into(),
        })?;

        let relative = entry.path().strip_prefix(from).unwrap_or(Path::new(""));
        let dest = if relative.as_os_str().is_empty() {
            to.to_path_buf()
        } else {
            to.join(relative)
        };

        let copy_error = |source: io::Error| Error::Copy {
            from: entry.path().to_path_buf(),
            to: dest.clone(),
            source,
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir_all(&dest).map_err(copy_error)?;
        } else {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).map_err(copy_error)?;
            }
            if file_type.is_symlink() {
                copy_symlink(entry.path(), &dest).map_err(copy_error)?;
            } else {
                fs::copy(entry.path(), &dest).map_err(copy_error)?;
            }
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> io::Result<()> {
    let target = fs::read_link(from)?;
    if fs::symlink_metadata(to).is_ok() {
        fs::remove_file(to)?;
    }
    std::os::unix::fs::symlink(target, to)
}

#[cfg(not(unix))]
fn copy_symlink(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to).map(|_| ())
}
