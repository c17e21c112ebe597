use tracing::debug;

use super::catalog::BuildRecord;
use super::local::LocalBuilds;
use crate::error::{Error, Result};
use crate::ui::Ui;

/// Which build to run and what has to happen before it can run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionOutcome {
    pub build: BuildRecord,
    /// The build is already unpacked, so nothing needs to be downloaded
    pub already_local: bool,
    /// Latest local build before anything was installed by this run
    pub previous_latest: Option<u32>,
}

/// Pick a build from `catalog` (most recent first), or the `requested` one.
///
/// `uri` only serves the "no builds" error message.
pub fn resolve(
    catalog: &[BuildRecord],
    requested: Option<u32>,
    local: &LocalBuilds,
    uri: &str,
    ui: &mut impl Ui,
) -> Result<ResolutionOutcome> {
    let previous_latest = local.latest()?;

    let build = match requested {
        None => latest(catalog, previous_latest, uri, ui)?,
        Some(number) => catalog
            .iter()
            .find(|record| record.build_number == number)
            .ok_or(Error::BuildNotFound { build: number })?,
    };

    let already_local = local.has_build(build.build_number)?;
    debug!(
        "Resolved build #{} (local: {}, previous latest: {:?})",
        build.build_number, already_local, previous_latest
    );

    Ok(ResolutionOutcome {
        build: build.clone(),
        already_local,
        previous_latest,
    })
}

fn latest<'a>(
    catalog: &'a [BuildRecord],
    local_latest: Option<u32>,
    uri: &str,
    ui: &mut impl Ui,
) -> Result<&'a BuildRecord> {
    let newest = catalog.first().ok_or_else(|| Error::NoBuilds {
        uri: uri.to_string(),
    })?;

    ui.log(format!("Found {} builds", catalog.len()));
    match local_latest {
        None => ui.log("No builds have been downloaded yet"),
        Some(local) if local != newest.build_number => {
            ui.log(format!("Latest local build is #{}", local));
            ui.log(format!(
                "The latest build is build #{}, released {}",
                newest.build_number,
                newest.released_label()
            ));
        }
        Some(_) => ui.log(format!(
            "You have the latest build, #{}, released {}",
            newest.build_number,
            newest.released_label()
        )),
    }

    Ok(newest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builds::catalog::ArchiveName;
    use crate::ui::RecordingUi;
    use chrono::NaiveDateTime;
    use std::fs;
    use tempfile::TempDir;

    const URI: &str = "http://example.com/builds/";

    fn record(build_number: u32, released: &str) -> BuildRecord {
        let filename = format!("cataclysmdda-0.E-{}.tar.gz", build_number);
        BuildRecord {
            build_number,
            version: "0.E".to_string(),
            uri: format!("{}{}", URI, filename),
            filename: ArchiveName::new(filename),
            released: NaiveDateTime::parse_from_str(released, "%Y-%m-%d %H:%M").ok(),
        }
    }

    fn catalog() -> Vec<BuildRecord> {
        vec![
            record(12, "2024-03-01 10:00"),
            record(11, "2024-02-01 10:00"),
            record(10, "2024-01-01 10:00"),
        ]
    }

    fn local_with(builds: &[u32]) -> (TempDir, LocalBuilds) {
        let root = TempDir::new().unwrap();
        for build in builds {
            fs::create_dir(root.path().join(build.to_string())).unwrap();
        }
        let local = LocalBuilds::new(root.path());
        (root, local)
    }

    #[test]
    fn test_latest_without_local_builds() {
        let (_root, local) = local_with(&[]);
        let mut ui = RecordingUi::new();

        let outcome = resolve(&catalog(), None, &local, URI, &mut ui).unwrap();
        assert_eq!(outcome.build.build_number, 12);
        assert!(!outcome.already_local);
        assert_eq!(outcome.previous_latest, None);
        assert!(ui.saw("No builds have been downloaded yet"));
    }

    #[test]
    fn test_latest_with_upgrade_available() {
        let (_root, local) = local_with(&[10]);
        let mut ui = RecordingUi::new();

        let outcome = resolve(&catalog(), None, &local, URI, &mut ui).unwrap();
        assert_eq!(outcome.build.build_number, 12);
        assert!(!outcome.already_local);
        assert_eq!(outcome.previous_latest, Some(10));
        assert!(ui.saw("Latest local build is #10"));
        assert!(ui.saw("The latest build is build #12, released 2024-03-01 10:00"));
    }

    #[test]
    fn test_latest_up_to_date() {
        let (_root, local) = local_with(&[11, 12]);
        let mut ui = RecordingUi::new();

        let outcome = resolve(&catalog(), None, &local, URI, &mut ui).unwrap();
        assert!(outcome.already_local);
        assert_eq!(outcome.previous_latest, Some(12));
        assert!(ui.saw("You have the latest build, #12"));
    }

    #[test]
    fn test_empty_catalog_is_not_found() {
        let (_root, local) = local_with(&[]);
        let err = resolve(&[], None, &local, URI, &mut RecordingUi::new()).unwrap_err();
        assert!(matches!(err, Error::NoBuilds { .. }));
    }

    #[test]
    fn test_requested_build_regardless_of_position() {
        let (_root, local) = local_with(&[11]);
        let outcome = resolve(&catalog(), Some(10), &local, URI, &mut RecordingUi::new()).unwrap();
        assert_eq!(outcome.build, catalog()[2]);
        assert!(!outcome.already_local);
        assert_eq!(outcome.previous_latest, Some(11));
    }

    #[test]
    fn test_requested_build_missing() {
        let (_root, local) = local_with(&[]);
        let err = resolve(&catalog(), Some(999), &local, URI, &mut RecordingUi::new()).unwrap_err();
        assert!(matches!(err, Error::BuildNotFound { build: 999 }));
        assert!(err.to_string().contains("#999"));
    }

    #[test]
    fn test_duplicate_build_numbers_first_wins() {
        let (_root, local) = local_with(&[]);
        let mut dupes = catalog();
        let mut shadow = record(11, "2023-01-01 10:00");
        shadow.version = "0.D".to_string();
        dupes.push(shadow);

        let outcome = resolve(&dupes, Some(11), &local, URI, &mut RecordingUi::new()).unwrap();
        assert_eq!(outcome.build.version, "0.E");
    }
}
