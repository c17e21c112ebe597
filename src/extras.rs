//! Keeping the extras collection (mods, soundpacks, tilesets) checked out

use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::command;
use crate::error::{Error, Result};
use crate::ui::Ui;

/// Clone `repo` into `extras_dir`, or pull if it is already a checkout.
///
/// An empty `repo` leaves whatever is in `extras_dir` alone.
pub fn update(repo: &str, extras_dir: &Path, ui: &mut impl Ui) -> Result<()> {
    if repo.is_empty() {
        debug!("No extras repo configured, not updating {:?}", extras_dir);
        return Ok(());
    }

    let dir = extras_dir.as_os_str();
    if extras_dir.join(".git").exists() {
        ui.log("Updating extras git repo");
        command::run("git", [OsStr::new("-C"), dir, OsStr::new("pull"), OsStr::new("origin")])
    } else {
        fs::create_dir_all(extras_dir).map_err(|e| Error::io(extras_dir, e))?;
        ui.log(format!("Cloning extras from {}", repo));
        command::run("git", [OsStr::new("clone"), OsStr::new(repo), dir])
    }
}
