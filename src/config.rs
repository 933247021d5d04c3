use cellgrid_core::SheetConfig;
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

/// Layout of `config.toml`:
///
/// ```toml
/// [sheet]
/// initial_rows = 50
/// propagation = "fixed-point"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    sheet: Option<SheetConfig>,
}

/// Load the sheet configuration from `config_file`, or from the user's
/// config directory when none is given. Problems are returned as warnings
/// and the defaults are used instead.
pub fn load_config(config_file: Option<&PathBuf>) -> (SheetConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let config_path = config_file.cloned().or_else(user_config_path);

    let Some(path) = config_path else {
        return (SheetConfig::default(), warnings);
    };
    if !path.exists() {
        if config_file.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (SheetConfig::default(), warnings);
    }

    let config = match read_config(&path) {
        Ok(file) => file.sheet.unwrap_or_default(),
        Err(warning) => {
            warnings.push(warning);
            SheetConfig::default()
        }
    };
    (config.normalized(), warnings)
}

fn read_config(path: &Path) -> Result<ConfigFile, String> {
    let meta = std::fs::metadata(path)
        .map_err(|err| format!("Failed to read metadata for {}: {}", path.display(), err))?;
    if meta.len() > MAX_CONFIG_FILE_BYTES {
        return Err(format!(
            "Refusing to read {}: file too large ({} bytes, max {})",
            path.display(),
            meta.len(),
            MAX_CONFIG_FILE_BYTES
        ));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|err| format!("Failed to read {}: {}", path.display(), err))?;
    toml::from_str::<ConfigFile>(&content)
        .map_err(|err| format!("Failed to parse {}: {}", path.display(), err))
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "cellgrid")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}
