use std::path::{Path, PathBuf};

use cu::pre::*;

/// Load config from a file
pub fn load(path: impl AsRef<Path>) -> cu::Result<Config> {
    let path = path.as_ref();
    let file_content = cu::fs::read_string(path)?;
    let mut config = toml::parse::<Config>(&file_content)?;

    let base = path.parent_abs()?;
    let base_rel = base.try_to_rel();
    resolve_path(&base_rel, &mut config.paths.context)?;
    resolve_path(&base_rel, &mut config.paths.prepared)?;
    resolve_path(&base_rel, &mut config.paths.ast)?;
    resolve_path(&base_rel, &mut config.paths.dump)?;
    if let Some(map_yaml) = &mut config.paths.map_yaml {
        resolve_path(&base_rel, map_yaml)?;
    }

    Ok(config)
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub paths: CfgPaths,
}

/// Config for project paths
///
/// For all paths, if it's a relative path, it's resolved relative to the
/// directory containing the config file
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CfgPaths {
    /// Path to the C context source
    pub context: PathBuf,
    /// Where `prepare` writes the preprocessed source for the upstream
    /// parser
    pub prepared: PathBuf,
    /// Path to the AST JSON emitted by the upstream parser
    pub ast: PathBuf,
    /// Where `map` writes the text dump of the type map
    pub dump: PathBuf,
    /// Optional path for a YAML rendition of the type map
    #[serde(default)]
    pub map_yaml: Option<PathBuf>,
}

fn resolve_path(base: &Path, path: &mut PathBuf) -> cu::Result<()> {
    if !path.is_absolute() {
        *path = base.join(&path).normalize()?;
    }
    Ok(())
}
