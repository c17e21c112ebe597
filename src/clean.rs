//! Deleting old builds

use std::fs;

use crate::builds::LocalBuilds;
use crate::error::{Error, Result};
use crate::ui::Ui;

/// Default number of builds `clean` keeps
pub const DEFAULT_MAX_BUILDS: usize = 5;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CleanPlan {
    pub delete: Vec<u32>,
    /// Old enough to delete, but pinned
    pub pinned: Vec<u32>,
}

/// Everything except the newest `max` builds goes, unless it is in `keep`
pub fn plan(all: &[u32], max: usize, keep: &[u32]) -> CleanPlan {
    let mut sorted = all.to_vec();
    sorted.sort_unstable();

    let excess = sorted.len().saturating_sub(max);
    let (delete, pinned) = sorted[..excess]
        .iter()
        .copied()
        .partition(|build| !keep.contains(build));
    CleanPlan { delete, pinned }
}

pub fn clean(local: &LocalBuilds, max: usize, keep: &[u32], ui: &mut impl Ui) -> Result<CleanPlan> {
    let all = local.all()?;
    if all.len() <= max {
        ui.log(format!(
            "Keeping all {} builds so there is nothing to clean",
            all.len()
        ));
        return Ok(CleanPlan::default());
    }

    let plan = plan(all, max, keep);
    for build in &plan.pinned {
        ui.log(format!("Keeping build {} as requested", build));
    }
    for build in &plan.delete {
        ui.log(format!("Deleting build {}", build));
        let dir = local.build_dir(*build);
        fs::remove_dir_all(&dir).map_err(|e| Error::io(dir, e))?;
    }
    Ok(plan)
}
