mod config;

pub use config::{Config, SessionConfig};

use std::path::PathBuf;

use crate::error::Result;

/// Returns the directory holding `config.toml`.
///
/// `FOCUSFOREST_HOME` overrides the location entirely. Otherwise this is
/// `~/.config/focusforest[-dev]/`, with `FOCUSFOREST_ENV=dev` selecting the
/// development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("FOCUSFOREST_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("FOCUSFOREST_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("focusforest-dev")
            } else {
                base_dir.join("focusforest")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::Config;

    // The only test in this crate that touches FOCUSFOREST_HOME.
    #[test]
    fn data_dir_honors_home_and_reports_io_failures() {
        let tmp = tempfile::tempdir().unwrap();
        let home = tmp.path().join("nested").join("forest");
        std::env::set_var("FOCUSFOREST_HOME", &home);

        assert_eq!(data_dir().unwrap(), home);
        assert!(home.is_dir());
        assert_eq!(Config::path().unwrap(), home.join("config.toml"));

        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();
        std::env::set_var("FOCUSFOREST_HOME", blocker.join("sub"));
        let data_err = data_dir();
        let path_err = Config::path();
        std::env::remove_var("FOCUSFOREST_HOME");

        assert!(matches!(data_err, Err(CoreError::Io(_))));
        assert!(matches!(path_err, Err(CoreError::Io(_))));
    }
}
