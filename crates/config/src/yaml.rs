// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{anyhow, Result};
use std::{fs, path::Path};

/// Read a yaml file and substitute `${VAR}` references from the environment.
pub fn load_yaml_with_env(path: &Path) -> Result<String> {
    let raw = fs::read_to_string(path)?;
    let expanded = shellexpand::env(&raw)
        .map_err(|e| anyhow!("Could not substitute '{}' in {:?}: {}", e.var_name, path, e.cause))?;
    Ok(expanded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_substitutes_env_vars() -> Result<()> {
        std::env::set_var("PMD_YAML_TEST_PORT", "7545");
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "rpc_url: \"http://localhost:${{PMD_YAML_TEST_PORT}}\"")?;

        let loaded = load_yaml_with_env(file.path())?;
        assert_eq!(loaded.trim(), "rpc_url: \"http://localhost:7545\"");
        Ok(())
    }

    #[test]
    fn test_missing_var_is_an_error() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "rpc_url: \"${{PMD_YAML_TEST_DOES_NOT_EXIST}}\"")?;

        let err = load_yaml_with_env(file.path()).unwrap_err();
        assert!(err.to_string().contains("PMD_YAML_TEST_DOES_NOT_EXIST"));
        Ok(())
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = load_yaml_with_env(Path::new("/nope/nothing.yaml")).unwrap_err();
        let ioe = err.downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(ioe.kind(), std::io::ErrorKind::NotFound);
    }
}
