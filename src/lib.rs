pub mod builds;
pub mod clean;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod extras;
pub mod launch;
pub mod launcher;
pub mod logging;
pub mod propagate;
pub mod setup;
pub mod ui;

pub use cli::{Cli, Commands};
pub use config::{Config, Layout};
pub use error::{Error, Result};
pub use launcher::{LaunchOptions, Launcher, PreparedBuild};
pub use ui::{BuildSummary, ConsoleUi, Phase, RecordingUi, SilentUi, Ui, UiApp};
