use std::env;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Environment variable that overrides data directory discovery.
pub const DATA_DIR_ENV: &str = "COURIER_DATA_DIR";

static DATA_ROOT: LazyLock<PathBuf> = LazyLock::new(detect_data_root);

/// Construct a data path relative to the resolved data root.
pub fn data_path(relative: impl AsRef<Path>) -> PathBuf {
    DATA_ROOT.join(relative)
}

/// Resolve the runtime data directory: the override if set, else the first existing
/// candidate near the working directory or the executable.
fn detect_data_root() -> PathBuf {
    if let Some(dir) = env::var_os(DATA_DIR_ENV).map(PathBuf::from)
        && dir.is_dir()
    {
        return dir;
    }
    let exe_dir = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    first_existing(data_root_candidates(exe_dir.as_deref()))
}

fn data_root_candidates(exe_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from("courier_engine/data"), PathBuf::from("data")];
    if let Some(dir) = exe_dir {
        candidates.push(dir.join("courier_engine/data"));
        candidates.push(dir.join("data"));
        if let Some(parent) = dir.parent() {
            candidates.push(parent.join("courier_engine/data"));
            candidates.push(parent.join("data"));
        }
    }
    candidates
}

fn first_existing(candidates: Vec<PathBuf>) -> PathBuf {
    candidates
        .into_iter()
        .find(|candidate| candidate.is_dir())
        .unwrap_or_else(|| PathBuf::from("courier_engine/data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn executable_dirs_are_searched_after_workspace_dirs() {
        let candidates = data_root_candidates(Some(Path::new("/opt/courier/bin")));
        assert_eq!(candidates[0], PathBuf::from("courier_engine/data"));
        assert!(candidates.contains(&PathBuf::from("/opt/courier/bin/data")));
        assert!(candidates.contains(&PathBuf::from("/opt/courier/data")));
    }

    #[test]
    fn falls_back_when_nothing_exists() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let missing = dir.path().join("nope");
        assert_eq!(first_existing(vec![missing]), PathBuf::from("courier_engine/data"));
        assert_eq!(first_existing(vec![dir.path().to_path_buf()]), dir.path());
        Ok(())
    }
}
