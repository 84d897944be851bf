//! Shared helpers for command implementations.

use std::path::{Path, PathBuf};

use trellis_config::{BuildContext, GitRevision, Settings};

use crate::cli::SettingsArgs;
use crate::error::{CliError, Result};

/// Load and validate settings: CLI > environment > file > defaults.
pub fn load_settings(args: &SettingsArgs) -> Result<Settings> {
    let settings = Settings::load(args.config.as_deref(), args)?;
    settings.validate()?;
    Ok(settings)
}

/// Freeze settings and the current revision into the process-wide context.
pub fn load_context(args: &SettingsArgs) -> Result<BuildContext> {
    let settings = load_settings(args)?;
    let source = GitRevision::new().in_dir(get_cwd()?);
    Ok(BuildContext::from_settings(&settings, &source))
}

pub fn get_cwd() -> Result<PathBuf> {
    std::env::current_dir().map_err(CliError::from)
}

/// Absolute paths pass through; relative ones are joined onto `cwd`.
pub fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_relative_and_absolute() {
        let cwd = Path::new("/project");
        assert_eq!(
            resolve_path(Path::new("static/dist"), cwd),
            PathBuf::from("/project/static/dist")
        );
        assert_eq!(
            resolve_path(Path::new("/tmp/staging"), cwd),
            PathBuf::from("/tmp/staging")
        );
    }
}
