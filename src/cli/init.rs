use std::path::{Path, PathBuf};

use crate::error::{Result, VizError};
use crate::settings::{save_settings, settings_path, Settings};

pub fn run(config: Option<PathBuf>, force: bool) -> Result<()> {
    let path = config.unwrap_or_else(settings_path);
    write_defaults(&path, force)?;
    println!("Wrote default settings to {}", path.display());
    Ok(())
}

pub fn write_defaults(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(VizError::Settings(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    save_settings(&Settings::default(), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::load_settings;

    #[test]
    fn test_write_defaults_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        write_defaults(&path, false).unwrap();
        assert_eq!(load_settings(Some(&path)).unwrap(), Settings::default());

        let err = write_defaults(&path, false).unwrap_err();
        assert!(matches!(err, VizError::Settings(_)));
        write_defaults(&path, true).unwrap();
    }
}
