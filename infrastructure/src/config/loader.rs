//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// Project-level file names, checked in order
const PROJECT_FILES: [&str; 2] = ["planner.toml", ".planner.toml"];

/// Prefix of environment overrides, e.g. `PLANNER_LLM__BASE_URL`
const ENV_PREFIX: &str = "PLANNER_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `PLANNER_*` environment variables (`__` separates sections)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./planner.toml` or `./.planner.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/date-planner/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(config_path, Self::global_config_path().as_deref(), Path::new("."))
            .extract()
            .map_err(Box::new)
    }

    fn figment(config_path: Option<&PathBuf>, global: Option<&Path>, project_dir: &Path) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        if let Some(path) = Self::project_config_in(project_dir) {
            figment = figment.merge(Toml::file(path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/date-planner/config.toml if set,
    /// otherwise the platform config directory.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("date-planner").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        Self::project_config_in(Path::new("."))
    }

    fn project_config_in(dir: &Path) -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources() {
        println!("Configuration sources (in priority order):");
        println!("  [ env ] {}* variables", ENV_PREFIX);

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./planner.toml or ./.planner.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.orchestration.min_diversity, 3);
        assert!(config.logging.conversation_log.is_none());
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("date-planner"));
    }

    #[test]
    fn test_explicit_file_overrides_project_and_global() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        fs::write(
            &global,
            "[orchestration]\nmin_diversity = 2\nmax_forced = 1\ndefault_city = \"Montreal\"\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("planner.toml"),
            "[orchestration]\nmax_forced = 2\ndefault_city = \"Toronto\"\n",
        )
        .unwrap();
        let explicit = dir.path().join("explicit.toml");
        fs::write(&explicit, "[orchestration]\ndefault_city = \"Gatineau\"\n").unwrap();

        let config: FileConfig = ConfigLoader::figment(Some(&explicit), Some(&global), dir.path())
            .extract()
            .unwrap();

        assert_eq!(config.orchestration.min_diversity, 2);
        assert_eq!(config.orchestration.max_forced, 2);
        assert_eq!(config.orchestration.default_city, "Gatineau");
        assert_eq!(config.orchestration.turn_budget_seconds, 90);
    }

    #[test]
    fn test_hidden_project_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(".planner.toml"),
            "[llm]\nplanning_model = \"local-model\"\n",
        )
        .unwrap();

        let config: FileConfig = ConfigLoader::figment(None, None, dir.path())
            .extract()
            .unwrap();
        assert_eq!(config.llm.planning_model, "local-model");
    }
}
