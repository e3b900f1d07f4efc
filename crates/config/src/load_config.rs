// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::path::{Path, PathBuf};

use path_clean::clean;

pub const DEFAULT_CONFIG_NAME: &str = "patient-dash.config.yaml";

pub type FindInParent = fn(&Path, &str) -> Option<PathBuf>;

/// Walk up from `path` looking for `filename`
pub fn find_in_parent(path: &Path, filename: &str) -> Option<PathBuf> {
    path.ancestors()
        .map(|dir| dir.join(filename))
        .find(|candidate| candidate.exists())
}

/// Pick the configuration file: an explicit `--config` path (relative to cwd), else the closest
/// file named `filename` above cwd, else the OS config dir.
pub fn resolve_config_path(
    find_in_parent: FindInParent,
    cwd: &Path,
    default_config_dir: &Path,
    filename: &str,
    cli_file: Option<&Path>,
) -> PathBuf {
    match cli_file {
        Some(file) if file.is_absolute() => file.to_path_buf(),
        Some(file) => clean(cwd.join(file)),
        None => find_in_parent(cwd, filename)
            .unwrap_or_else(|| clean(default_config_dir.join(filename))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn not_found(_: &Path, _: &str) -> Option<PathBuf> {
        None
    }

    fn found(_: &Path, _: &str) -> Option<PathBuf> {
        Some(PathBuf::from("/project/patient-dash.config.yaml"))
    }

    #[test]
    fn test_falls_back_to_default_dir() {
        let path = resolve_config_path(
            not_found,
            Path::new("/project/app"),
            Path::new("/home/me/.config/patient-dash"),
            DEFAULT_CONFIG_NAME,
            None,
        );
        assert_eq!(
            path,
            PathBuf::from("/home/me/.config/patient-dash/patient-dash.config.yaml")
        );
    }

    #[test]
    fn test_prefers_file_found_in_parent() {
        let path = resolve_config_path(
            found,
            Path::new("/project/app"),
            Path::new("/home/me/.config/patient-dash"),
            DEFAULT_CONFIG_NAME,
            None,
        );
        assert_eq!(path, PathBuf::from("/project/patient-dash.config.yaml"));
    }

    #[test]
    fn test_cli_file_overrides_search() {
        let absolute = resolve_config_path(
            found,
            Path::new("/project/app"),
            Path::new("/home/me/.config/patient-dash"),
            DEFAULT_CONFIG_NAME,
            Some(Path::new("/etc/dash.yaml")),
        );
        assert_eq!(absolute, PathBuf::from("/etc/dash.yaml"));

        let relative = resolve_config_path(
            found,
            Path::new("/project/app"),
            Path::new("/home/me/.config/patient-dash"),
            DEFAULT_CONFIG_NAME,
            Some(Path::new("../conf/dash.yaml")),
        );
        assert_eq!(relative, PathBuf::from("/project/conf/dash.yaml"));
    }

    #[test]
    fn test_find_in_parent_walks_up() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested)?;
        std::fs::write(root.path().join(DEFAULT_CONFIG_NAME), "chains: []")?;

        assert_eq!(
            find_in_parent(&nested, DEFAULT_CONFIG_NAME),
            Some(root.path().join(DEFAULT_CONFIG_NAME))
        );
        assert_eq!(find_in_parent(&nested, "missing.yaml"), None);
        Ok(())
    }
}
