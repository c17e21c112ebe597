use std::ffi::OsStr;
use std::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

/// Run a program to completion, capturing its output for the error message on failure
pub fn run<I, S>(program: &str, args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<_> = args.into_iter().map(|a| a.as_ref().to_os_string()).collect();
    let command_line = std::iter::once(program.to_string())
        .chain(args.iter().map(|a| a.to_string_lossy().into_owned()))
        .collect::<Vec<_>>()
        .join(" ");
    debug!("Running {}", command_line);

    let output = Command::new(program)
        .args(&args)
        .output()
        .map_err(|e| Error::Command {
            command: command_line.clone(),
            output: e.to_string(),
        })?;

    if !output.status.success() {
        let mut captured = format!("{}\n", output.status);
        captured.push_str(&String::from_utf8_lossy(&output.stdout));
        captured.push_str(&String::from_utf8_lossy(&output.stderr));
        return Err(Error::Command {
            command: command_line,
            output: captured.trim_end().to_string(),
        });
    }

    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_success() {
        run("sh", ["-c", "exit 0"]).unwrap();
    }

    #[test]
    fn test_failure_carries_output() {
        let err = run("sh", ["-c", "echo boom >&2; exit 3"]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("sh -c"));
        assert!(message.contains("boom"));
    }
}
