// IdeDoctor - app/plugins.rs
//
// Boundary with the plugin-management collaborator. The enabled-plugin
// list arrives as a JSON array of plugin records:
//
//   [{"id": "com.example.my", "name": "My Plugin", "version": "1.2.3", "enabled": true}]
//
// `id`, `version` and `enabled` are optional (enabled defaults to true).

use crate::core::model::PluginIdentity;
use crate::platform::fs;
use crate::util::error::PluginListError;
use std::path::Path;

/// Load the plugin list from a JSON file. Array order is preserved.
pub fn load_plugin_list(path: &Path) -> Result<Vec<PluginIdentity>, PluginListError> {
    let reader = fs::open_buffered(path).map_err(|e| PluginListError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let plugins: Vec<PluginIdentity> =
        serde_json::from_reader(reader).map_err(|e| PluginListError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;

    tracing::info!(
        path = %path.display(),
        total = plugins.len(),
        enabled = plugins.iter().filter(|p| p.enabled).count(),
        "Loaded plugin list"
    );
    Ok(plugins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::blame::EnabledPlugins;

    #[test]
    fn test_load_plugin_list_keeps_order_and_filters_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plugins.json");
        std::fs::write(
            &path,
            r#"[
                {"id": "a", "name": "Alpha", "version": "1"},
                {"id": "b", "name": "Beta", "version": "2", "enabled": false},
                {"id": "c", "name": "Gamma", "version": "3"}
            ]"#,
        )
        .unwrap();

        let plugins = load_plugin_list(&path).unwrap();
        assert_eq!(plugins.len(), 3);
        let enabled: Vec<String> = plugins
            .enabled_plugins()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(enabled, vec!["Alpha", "Gamma"]);
    }

    #[test]
    fn test_load_plugin_list_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plugins.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            load_plugin_list(&path),
            Err(PluginListError::Json { .. })
        ));
    }

    #[test]
    fn test_load_plugin_list_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_plugin_list(&dir.path().join("none.json")),
            Err(PluginListError::Io { .. })
        ));
    }
}
