use crate::ViewerResult;
use crate::utils::Contextualize;

use board_chess::render::AssetPaths;

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
  /// The rendered board is written here after every move, as a PNG.
  #[serde(default = "default_output")]
  pub output: PathBuf,
  #[serde(default)]
  pub assets: ConfigAssets
}

impl Config {
  #[inline]
  pub fn create() -> ViewerResult<Config> {
    let config = Self::create_or_default(Path::new("./config.toml"))?;
    trace!("Loaded config.toml");
    Ok(config)
  }

  /// Reads the config at the given path, writing out the default config first if there is none.
  pub fn create_or_default(path: &Path) -> ViewerResult<Config> {
    if !path.exists() {
      let contents = toml::to_string_pretty(&Config::default())
        .context("failed to serialize default config")?;
      fs_err::write(path, contents).context("failed to write default config")?;
      info!("Created default config at {}", path.display());
    };

    let contents = fs_err::read_to_string(path).context("failed to read config")?;
    toml::from_str(&contents).context("failed to parse config")
  }
}

impl Default for Config {
  fn default() -> Self {
    Config {
      output: default_output(),
      assets: ConfigAssets::default()
    }
  }
}

fn default_output() -> PathBuf {
  PathBuf::from("./data/board.png")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigAssets {
  /// Directory holding the board background and the twelve piece sprites.
  pub directory: PathBuf,
  /// File name of the board background inside `directory`.
  pub board: PathBuf,
  /// TrueType font for the rank and file labels.
  /// A small built-in font is used if this is missing or can't be read.
  pub font: Option<PathBuf>
}

impl ConfigAssets {
  pub fn paths(&self) -> AssetPaths {
    AssetPaths {
      directory: self.directory.clone(),
      board: self.board.clone(),
      font: self.font.clone()
    }
  }
}

impl Default for ConfigAssets {
  fn default() -> Self {
    ConfigAssets {
      directory: PathBuf::from("./assets/"),
      board: PathBuf::from("rect-8x8.png"),
      font: Some(PathBuf::from("./assets/arial.ttf"))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_partial_config_uses_defaults() {
    let config: Config = toml::from_str("[assets]\ndirectory = \"./sprites/\"\n").unwrap();
    assert_eq!(config.output, default_output());
    assert_eq!(config.assets.directory, PathBuf::from("./sprites/"));
    assert_eq!(config.assets.board, PathBuf::from("rect-8x8.png"));
    assert_eq!(config.assets.font, Some(PathBuf::from("./assets/arial.ttf")));

    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config, Config::default());
  }

  #[test]
  fn test_asset_paths() {
    let paths = ConfigAssets::default().paths();
    assert_eq!(paths.directory, PathBuf::from("./assets/"));
    assert_eq!(paths.board, PathBuf::from("rect-8x8.png"));
  }

  #[test]
  fn test_create_or_default() {
    let directory = std::env::temp_dir().join(format!("board-viewer-config-{}", std::process::id()));
    fs_err::create_dir_all(&directory).unwrap();
    let path = directory.join("config.toml");

    let config = Config::create_or_default(&path).unwrap();
    assert_eq!(config, Config::default());
    assert!(path.exists());

    fs_err::write(&path, "output = \"./elsewhere.png\"\n").unwrap();
    let config = Config::create_or_default(&path).unwrap();
    assert_eq!(config.output, PathBuf::from("./elsewhere.png"));

    fs_err::write(&path, "output = 5\n").unwrap();
    assert!(Config::create_or_default(&path).is_err());

    fs_err::remove_dir_all(&directory).unwrap();
  }
}
