//! Download, unpack and move a build into place
//!
//! A build only appears under its number once it is completely unpacked: the archive is
//! extracted into a hidden `.unpacking-*` directory next to the final location and renamed
//! on success, so an interrupted run never leaves something that looks like a local build.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::catalog::BuildRecord;
use super::client::BuildsClient;
use super::extract::Extractor;
use crate::error::{Error, Result};
use crate::ui::{Phase, Ui};

/// Download `record` and unpack it into `builds_dir/<build number>`
///
/// The archive lives in a temporary directory that is removed on every exit path.
pub fn install_build(
    client: &BuildsClient,
    record: &BuildRecord,
    builds_dir: &Path,
    extractor: &impl Extractor,
    ui: &mut impl Ui,
) -> Result<PathBuf> {
    ui.set_phase(Phase::Downloading);
    ui.set_info(format!("Build #{} ({})", record.build_number, record.filename));
    ui.log(format!(
        "Downloading build #{} from {}",
        record.build_number, record.uri
    ));

    let staging = tempfile::Builder::new()
        .prefix("catalauncher-")
        .tempdir()
        .map_err(|e| Error::io(std::env::temp_dir(), e))?;
    let archive = staging.path().join(record.filename.as_str());

    client.download(record, &archive, ui)?;
    unpack(&archive, record.build_number, builds_dir, extractor, ui)
}

/// Unpack an archive that is already on disk into `builds_dir/<build_number>`
pub fn unpack(
    archive: &Path,
    build_number: u32,
    builds_dir: &Path,
    extractor: &impl Extractor,
    ui: &mut impl Ui,
) -> Result<PathBuf> {
    ui.set_phase(Phase::Extracting);
    ui.log(format!("Extracting {}", display_name(archive)));

    fs::create_dir_all(builds_dir).map_err(|e| Error::io(builds_dir, e))?;
    let target = builds_dir.join(build_number.to_string());

    let unpacking = tempfile::Builder::new()
        .prefix(".unpacking-")
        .tempdir_in(builds_dir)
        .map_err(|e| Error::io(builds_dir, e))?;
    debug!("Unpacking {:?} into {:?}", archive, unpacking.path());

    extractor.extract(archive, unpacking.path())?;

    // An empty directory left by an earlier attempt is fine to replace.
    if target.is_dir() {
        fs::remove_dir(&target).map_err(|e| Error::Extract {
            archive: archive.to_path_buf(),
            target: target.clone(),
            output: format!("the target already exists and is not empty: {}", e),
        })?;
    }

    fs::rename(unpacking.path(), &target).map_err(|e| Error::Extract {
        archive: archive.to_path_buf(),
        target: target.clone(),
        output: format!("could not move the unpacked build into place: {}", e),
    })?;

    info!("Build #{} installed at {:?}", build_number, target);
    Ok(target)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
