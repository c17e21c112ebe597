//! The launch workflow: resolve a build, install it if needed, carry customization forward
//!
//! Resolve -> (catalog, local builds) -> download/unpack when absent -> copy templates from
//! the previous latest build -> update extras and overlay them. The result is a game
//! directory ready to hand to [`crate::launch::run_game`].

use std::path::PathBuf;
use tracing::info;

use crate::builds::{
    install_build, resolve, BuildPattern, BuildsClient, Extractor, LocalBuilds, TarExtractor,
};
use crate::config::{Config, Layout};
use crate::error::Result;
use crate::extras;
use crate::propagate::{overlay_content, propagate};
use crate::ui::{BuildSummary, Phase, Ui};

#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Specific build to run instead of the latest
    pub build: Option<u32>,
    /// Update and overlay extras even when the build was already installed
    pub sync_extras: bool,
}

/// A build ready to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedBuild {
    pub build_number: u32,
    pub game_dir: PathBuf,
    /// Whether this run downloaded and unpacked it
    pub installed: bool,
}

pub struct Launcher<E = TarExtractor> {
    config: Config,
    layout: Layout,
    pattern: BuildPattern,
    client: BuildsClient,
    extractor: E,
}

impl Launcher<TarExtractor> {
    pub fn new(config: Config) -> Result<Self> {
        Self::from_parts(config, BuildsClient::new()?, TarExtractor::new())
    }
}

impl<E: Extractor> Launcher<E> {
    pub fn from_parts(config: Config, client: BuildsClient, extractor: E) -> Result<Self> {
        let layout = config.layout()?;
        let pattern = config.build_pattern()?;
        Ok(Self {
            config,
            layout,
            pattern,
            client,
            extractor,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn prepare(&self, options: &LaunchOptions, ui: &mut impl Ui) -> Result<PreparedBuild> {
        ui.set_phase(Phase::Checking);
        let listing_uri = &self.config.listing_uri;
        let catalog = self.client.fetch_catalog(listing_uri, &self.pattern, ui)?;

        let local = LocalBuilds::new(self.layout.builds_dir());
        let outcome = resolve(&catalog, options.build, &local, listing_uri, ui)?;
        let build_number = outcome.build.build_number;
        ui.show_builds(&BuildSummary {
            selected: build_number,
            installed: outcome.previous_latest,
            available: catalog.first().map(|record| record.build_number),
            released: outcome.build.released_label(),
        });

        if outcome.already_local {
            ui.log(format!("Build #{} is already downloaded", build_number));
        } else {
            install_build(
                &self.client,
                &outcome.build,
                &self.layout.builds_dir(),
                &self.extractor,
                ui,
            )?;

            if let Some(previous) = outcome.previous_latest {
                ui.set_phase(Phase::Propagating);
                propagate(
                    &self.layout.game_dir(previous)?,
                    &self.layout.game_dir(build_number)?,
                    ui,
                )?;
            }
        }

        let game_dir = self.layout.game_dir(build_number)?;

        if !outcome.already_local || options.sync_extras {
            ui.set_phase(Phase::Propagating);
            let extras_dir = self.layout.extras_dir();
            extras::update(&self.config.extras_repo, &extras_dir, ui)?;
            overlay_content(&extras_dir, &game_dir, ui)?;
        }

        info!("Build #{} is ready at {:?}", build_number, game_dir);
        Ok(PreparedBuild {
            build_number,
            game_dir,
            installed: !outcome.already_local,
        })
    }
}
