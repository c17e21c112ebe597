use std::ffi::OsString;
use std::path::Path;
use std::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

/// Unpacks a downloaded archive into a directory
pub trait Extractor {
    fn extract(&self, archive: &Path, target: &Path) -> Result<()>;
}

impl<E: Extractor + ?Sized> Extractor for &E {
    fn extract(&self, archive: &Path, target: &Path) -> Result<()> {
        (**self).extract(archive, target)
    }
}

/// Runs the system `tar` to unpack gzip-compressed tarballs
#[derive(Debug, Clone)]
pub struct TarExtractor {
    program: OsString,
}

impl TarExtractor {
    pub fn new() -> Self {
        Self::with_program("tar")
    }

    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for TarExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for TarExtractor {
    fn extract(&self, archive: &Path, target: &Path) -> Result<()> {
        let extract_error = |output: String| Error::Extract {
            archive: archive.to_path_buf(),
            target: target.to_path_buf(),
            output,
        };

        debug!(
            "Running {:?} xzf {:?} -C {:?}",
            self.program, archive, target
        );

        let output = Command::new(&self.program)
            .arg("xzf")
            .arg(archive)
            .arg("-C")
            .arg(target)
            .output()
            .map_err(|e| extract_error(format!("could not run {:?}: {}", self.program, e)))?;

        if !output.status.success() {
            let mut captured = String::from_utf8_lossy(&output.stdout).into_owned();
            captured.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(extract_error(format!(
                "{:?} exited with {}\n{}",
                self.program,
                output.status,
                captured.trim_end()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_tar_round_trip() {
        let scratch = TempDir::new().unwrap();
        let source = scratch.path().join("source");
        fs::create_dir_all(source.join("cataclysmdda-0.E/data")).unwrap();
        fs::write(source.join("cataclysmdda-0.E/data/motd.txt"), b"hello").unwrap();

        let archive = scratch.path().join("cataclysmdda-0.E-12.tar.gz");
        let status = Command::new("tar")
            .arg("czf")
            .arg(&archive)
            .arg("-C")
            .arg(&source)
            .arg("cataclysmdda-0.E")
            .status()
            .unwrap();
        assert!(status.success());

        let target = scratch.path().join("target");
        fs::create_dir(&target).unwrap();
        TarExtractor::new().extract(&archive, &target).unwrap();

        let motd = fs::read_to_string(target.join("cataclysmdda-0.E/data/motd.txt")).unwrap();
        assert_eq!(motd, "hello");
    }

    #[test]
    fn test_corrupt_archive_is_extract_error() {
        let scratch = TempDir::new().unwrap();
        let archive = scratch.path().join("broken.tar.gz");
        fs::write(&archive, b"this is not gzip").unwrap();

        let err = TarExtractor::new()
            .extract(&archive, scratch.path())
            .unwrap_err();
        assert!(matches!(err, Error::Extract { .. }));
    }

    #[test]
    fn test_missing_program_is_extract_error() {
        let scratch = TempDir::new().unwrap();
        let err = TarExtractor::with_program("definitely-not-a-tar-binary")
            .extract(&scratch.path().join("a.tar.gz"), scratch.path())
            .unwrap_err();
        assert!(err.to_string().contains("could not run"));
    }
}
