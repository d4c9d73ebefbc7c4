//! Persists model switches to a config file.

use std::path::PathBuf;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use switchyard_models::selection::ModelChangeHandler;
use switchyard_models::{AuthType, Error, ResolvedModel};
use toml_edit::{DocumentMut, Item, Table};
use tracing::info;

use super::ConfigLoader;

/// Change handler that records the selected auth type and model in a
/// config file.
///
/// The file is edited in place: only `security.auth.selected_type` and
/// `model.name` are touched, comments and other tables are kept.
pub struct SettingsWriter {
    path: PathBuf,
}

impl SettingsWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Writer targeting the user config file.
    pub fn user() -> Self {
        Self::new(ConfigLoader::user_config_path())
    }

    fn save(&self, auth_type: &AuthType, model_id: &str) -> anyhow::Result<()> {
        let existing = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", self.path.display()));
            }
        };

        let updated = update_selection(&existing, auth_type, model_id)
            .with_context(|| format!("Failed to update {}", self.path.display()))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, updated)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl ModelChangeHandler for SettingsWriter {
    async fn on_model_change(
        &self,
        auth_type: &AuthType,
        model: &ResolvedModel,
    ) -> switchyard_models::Result<()> {
        self.save(auth_type, &model.id)
            .map_err(|e| Error::ChangeHandler(format!("{e:#}")))?;

        info!("Saved model selection to {}", self.path.display());
        Ok(())
    }
}

/// Set the selection keys in a TOML document, leaving everything else as is.
fn update_selection(contents: &str, auth_type: &AuthType, model_id: &str) -> anyhow::Result<String> {
    let mut doc = contents.parse::<DocumentMut>()?;

    let security = child_table(doc.as_table_mut(), "security", true)?;
    let auth = child_table(security, "auth", false)?;
    auth["selected_type"] = toml_edit::value(auth_type.as_str());

    let model = child_table(doc.as_table_mut(), "model", false)?;
    model["name"] = toml_edit::value(model_id);

    Ok(doc.to_string())
}

fn child_table<'a>(parent: &'a mut Table, key: &str, implicit: bool) -> anyhow::Result<&'a mut Table> {
    let mut table = Table::new();
    table.set_implicit(implicit);

    parent
        .entry(key)
        .or_insert(Item::Table(table))
        .as_table_mut()
        .ok_or_else(|| anyhow!("`{key}` must be a table"))
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use super::*;
    use switchyard_models::{
        ModelCatalog, ModelDefinition, SelectionManager, SelectionOptions, SelectionSource,
        SwitchMetadata,
    };
    use tempfile::TempDir;

    fn create_test_manager() -> SelectionManager {
        let mut catalog = ModelCatalog::new();
        catalog.insert(
            AuthType::OPENAI,
            vec![ModelDefinition::new("gpt-4o"), ModelDefinition::new("o3")],
        );
        SelectionManager::from_catalog(
            Some(&catalog),
            SelectionOptions::new()
                .auth_type(AuthType::OPENAI)
                .environment(|_: &AuthType| -> Option<String> { None }),
        )
        .unwrap()
    }

    async fn switch_with_writer(path: &Path, model_id: &str) -> switchyard_models::Result<()> {
        let manager = create_test_manager();
        manager
            .set_change_handler(Arc::new(SettingsWriter::new(path)))
            .await;
        manager
            .switch_model(model_id, SelectionSource::UserManual, SwitchMetadata::default())
            .await
            .map(|_| ())
    }

    #[tokio::test]
    async fn switch_is_written_to_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[[model_providers.openai]]\nid = \"gpt-4o\"\n").unwrap();

        switch_with_writer(&path, "o3").await.unwrap();

        let saved = ConfigLoader::load_from_path(&path).unwrap();
        assert_eq!(saved.model.name.as_deref(), Some("o3"));
        assert_eq!(saved.security.auth.selected_type, AuthType::OPENAI);
        // Existing catalog survives the rewrite
        assert_eq!(saved.model_providers[&AuthType::OPENAI].len(), 1);
    }

    #[tokio::test]
    async fn switch_preserves_comments_and_unknown_tables() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"# my api notes
[ui]
theme = "dark"

[model]
name = "gpt-4o"

[[model_providers.openai]]
id = "gpt-4o"

[[model_providers.openai]]
id = "o3"
"#,
        )
        .unwrap();

        switch_with_writer(&path, "o3").await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("# my api notes"));
        assert!(content.contains("[ui]"));
        assert!(content.contains(r#"theme = "dark""#));
        assert!(content.contains(r#"name = "o3""#));
        assert!(!content.contains(r#"name = "gpt-4o""#));
        assert_eq!(content.matches("[model]").count(), 1);

        let saved = ConfigLoader::load_from_path(&path).unwrap();
        assert_eq!(saved.security.auth.selected_type, AuthType::OPENAI);
        assert_eq!(saved.model_providers[&AuthType::OPENAI].len(), 2);
    }

    #[tokio::test]
    async fn switch_creates_missing_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        switch_with_writer(&path, "o3").await.unwrap();

        let saved = ConfigLoader::load_from_path(&path).unwrap();
        assert_eq!(saved.model.name.as_deref(), Some("o3"));
        assert_eq!(saved.security.auth.selected_type, AuthType::OPENAI);
    }

    #[tokio::test]
    async fn non_table_model_key_rolls_back_switch() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "model = \"gpt-4o\"\n").unwrap();

        let manager = create_test_manager();
        manager
            .set_change_handler(Arc::new(SettingsWriter::new(&path)))
            .await;
        let result = manager
            .switch_model("o3", SelectionSource::UserManual, SwitchMetadata::default())
            .await;

        assert!(matches!(result, Err(Error::ChangeHandler(_))));
        assert_eq!(manager.current_model_id().await, "gpt-4o");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "model = \"gpt-4o\"\n");
    }

    #[tokio::test]
    async fn unwritable_config_rolls_back_switch() {
        let temp_dir = TempDir::new().unwrap();
        // Parent "directory" is a regular file, so the write must fail.
        let blocker = temp_dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let path = blocker.join("config.toml");

        let manager = create_test_manager();
        manager
            .set_change_handler(Arc::new(SettingsWriter::new(&path)))
            .await;

        let result = manager
            .switch_model("o3", SelectionSource::UserManual, SwitchMetadata::default())
            .await;

        assert!(matches!(result, Err(Error::ChangeHandler(_))));
        assert_eq!(manager.current_model_id().await, "gpt-4o");
    }
}
