//! Interactive first-run setup

use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};

/// Docker runs the game, so it has to be installed
pub fn check_for_docker() -> Result<PathBuf> {
    which::which("docker").map_err(|e| {
        Error::Config(format!(
            "To use catalauncher you must have docker in your $PATH: {}",
            e
        ))
    })
}

/// The root offered at the prompt.
///
/// The configured root wins, then the directory of a config file named with `--config`, then
/// `~/.catalauncher`.
pub fn default_root(
    config: &Config,
    given_config: Option<&Path>,
    home: &Path,
) -> PathBuf {
    if let Some(root) = &config.root {
        return root.clone();
    }
    given_config
        .and_then(Path::parent)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| home.join(".catalauncher"))
}

/// Replace a leading `~` or any `$HOME` with the home directory
pub fn expand_home(input: &str, home: &Path) -> PathBuf {
    let home_str = home.to_string_lossy();
    let expanded = input.replace("$HOME", &home_str);
    match expanded.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => {
            PathBuf::from(format!("{}{}", home_str, rest))
        }
        _ => PathBuf::from(expanded),
    }
}

/// Ask for a value, returning `default` on an empty answer
pub fn prompt_for(
    label: &str,
    default: &str,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<String> {
    let prompt_error = |e: std::io::Error| Error::Config(format!("Could not read your answer: {}", e));

    write!(output, "{} [{}] ", label, default).map_err(prompt_error)?;
    output.flush().map_err(prompt_error)?;

    let mut answer = String::new();
    input.read_line(&mut answer).map_err(prompt_error)?;
    let answer = answer.trim();

    Ok(if answer.is_empty() {
        default.to_string()
    } else {
        answer.to_string()
    })
}

/// Ask for the root directory, create it and write the config file at `config_path`.
///
/// `config_given` says whether `config_path` was chosen on the command line.
pub fn run(
    mut config: Config,
    config_path: &Path,
    config_given: bool,
    home: &Path,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<Config> {
    let default = default_root(&config, config_given.then_some(config_path), home);
    let answer = prompt_for(
        "Catalauncher root dir (stores game, saves, mods, etc.)?",
        &default.to_string_lossy(),
        input,
        output,
    )?;
    let root = expand_home(&answer, home);

    if !root.exists() {
        writeln!(output, "Creating the root directory at {}", root.display())
            .map_err(|e| Error::io(&root, e))?;
        fs::create_dir_all(&root).map_err(|e| Error::io(&root, e))?;
    }

    config.root = Some(root);
    writeln!(output, "Writing your config file at {}", config_path.display())
        .map_err(|e| Error::io(config_path, e))?;
    config.save(config_path)?;
    info!("Saved config to {:?}", config_path);

    Ok(config)
}
