//! Shared helpers for CLI commands

use crdform_core::{ConfigValue, ResourceSchema};
use crdform_provider::{FileStore, Provider, ProviderSettings, ResourceCatalog};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{CliError, Result};

/// Global flags shared by every command
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub state_dir: Option<PathBuf>,
    pub schema_dirs: Vec<PathBuf>,
    pub config: Option<PathBuf>,
}

impl GlobalOptions {
    /// Settings file, then environment, then flags
    pub fn settings(&self) -> Result<ProviderSettings> {
        let mut settings = match &self.config {
            Some(path) => ProviderSettings::load_from(path)?
                .with_env_overrides(|key| std::env::var(key).ok()),
            None => ProviderSettings::load()?,
        };

        if let Some(dir) = &self.state_dir {
            settings.state_dir = Some(dir.clone());
        }
        settings.schema_dirs.extend(self.schema_dirs.iter().cloned());

        debug!(?settings, "resolved settings");
        Ok(settings)
    }

    /// Built-in kinds plus configured schema directories
    pub fn catalog(&self) -> Result<ResourceCatalog> {
        Ok(self.settings()?.catalog()?)
    }

    /// Provider backed by the file store in the state directory
    pub fn provider(&self) -> Result<Provider<FileStore>> {
        let settings = self.settings()?;
        let catalog = settings.catalog()?;
        let store = FileStore::new(settings.resolved_state_dir()?)?;
        debug!(state_dir = %store.base_dir().display(), "opened state store");
        Ok(Provider::new(catalog, store, Default::default()))
    }
}

/// Read a YAML or JSON configuration document for `schema`
pub fn read_config(path: &Path, schema: &ResourceSchema) -> Result<ConfigValue> {
    let content = std::fs::read_to_string(path).map_err(|e| CliError::io(path.display(), e))?;
    ConfigValue::from_yaml(&content, schema).map_err(|e| {
        CliError::validation_with_help(
            format!("{}: {}", path.display(), e),
            "Configuration attributes use the names shown by `crdform schema <type>`",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_flags_override_settings_file() {
        let tmp = TempDir::new().unwrap();
        let config = tmp.path().join("crdform.yaml");
        std::fs::write(&config, "stateDir: /from/file\n").unwrap();

        let options = GlobalOptions {
            state_dir: Some(tmp.path().join("state")),
            schema_dirs: vec![],
            config: Some(config),
        };
        let settings = options.settings().unwrap();
        assert_eq!(settings.state_dir, Some(tmp.path().join("state")));
    }

    #[test]
    fn test_read_config_reports_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.yaml");
        std::fs::write(&path, "metadata: [").unwrap();

        let schema = ResourceSchema::new("", "v1", "ConfigMap");
        let err = read_config(&path, &schema).unwrap_err();
        assert!(err.to_string().contains("bad.yaml"));
    }

    #[test]
    fn test_read_missing_config() {
        let schema = ResourceSchema::new("", "v1", "ConfigMap");
        let err = read_config(Path::new("/no/such/file.yaml"), &schema).unwrap_err();
        assert!(matches!(err, CliError::Io { .. }));
    }
}
