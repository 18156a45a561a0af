//! Configuration management for `ghtasks`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. CLI overrides
//! 2. Environment variables (`GHT_*`)
//! 3. Explicit config file (`--config`)
//! 4. Vault config (`<vault>/.ghtasks/config.yaml`)
//! 5. User config (`~/.config/ghtasks/config.yaml`)
//! 6. Defaults
//!
//! Layers are flat maps of dotted keys. The merged layer is turned into an
//! immutable [`SyncConfig`] once at startup and passed by reference from then
//! on.

use crate::error::{Result, SyncError};
use crate::format::{LineStyle, TaskFormat, scan};
use serde::Serialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable prefix for configuration keys.
const ENV_PREFIX: &str = "GHT_";

/// Every key the configuration understands, in canonical spelling.
pub const KNOWN_KEYS: &[&str] = &[
    "task-tag",
    "task-format",
    "tasks-note",
    "import-labels",
    "repository-description",
    "repository-tags",
    "auto-clear-completed",
    "show-created-at",
    "show-completed-at",
    "per-note-sync",
    "scan-folders",
    "exclude-archived",
    "activity.enabled",
    "activity.days",
    "activity.types.commits",
    "activity.types.merged-prs",
    "activity.types.closed-issues",
    "activity.types.releases",
];

/// A configuration layer of flat `key -> value` strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, String>,
}

impl ConfigLayer {
    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let value: serde_yaml::Value = serde_yaml::from_str(&contents)?;
        Ok(layer_from_yaml_value(&value))
    }

    /// Build a layer from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_vars(env::vars())
    }

    /// Build a layer from `GHT_*` pairs.
    ///
    /// `GHT_ACTIVITY_DAYS` sets `activity.days`, `GHT_TASK_TAG` sets
    /// `task-tag`. Unprefixed variables are ignored.
    #[must_use]
    pub fn from_env_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut layer = Self::default();
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                insert_key_value(&mut layer, stripped, value);
            }
        }
        layer
    }

    /// Value for a canonical key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Set a key, resolving it to its canonical spelling.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        insert_key_value(self, key, value.into());
    }
}

/// CLI overrides for config loading (optional).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub task_tag: Option<String>,
    pub task_format: Option<String>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(tag) = &self.task_tag {
            insert_key_value(&mut layer, "task-tag", tag.clone());
        }
        if let Some(format) = &self.task_format {
            insert_key_value(&mut layer, "task-format", format.clone());
        }

        layer
    }
}

/// Load vault config (`<vault>/.ghtasks/config.yaml`).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_vault_config(vault: &Path) -> Result<ConfigLayer> {
    ConfigLayer::from_yaml(&vault_config_path(vault))
}

/// `<vault>/.ghtasks/config.yaml`.
#[must_use]
pub fn vault_config_path(vault: &Path) -> PathBuf {
    vault.join(".ghtasks").join("config.yaml")
}

/// `~/.config/ghtasks/config.yaml`, if `HOME` is set.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    let home = env::var_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("ghtasks")
            .join("config.yaml"),
    )
}

/// Load user config (`~/.config/ghtasks/config.yaml`).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<ConfigLayer> {
    match user_config_path() {
        Some(path) => ConfigLayer::from_yaml(&path),
        None => Ok(ConfigLayer::default()),
    }
}

/// Default config layer (lowest precedence).
#[must_use]
pub fn default_config_layer() -> ConfigLayer {
    let defaults = SyncConfig::default();
    let mut layer = ConfigLayer::default();
    for (key, value) in defaults.to_pairs() {
        layer.values.insert(key.to_string(), value);
    }
    layer
}

/// Load configuration with the full precedence order.
///
/// # Errors
///
/// Returns an error if a config file cannot be read or parsed, or if the
/// explicit config file does not exist.
pub fn load_config(
    vault: &Path,
    explicit: Option<&Path>,
    cli: &CliOverrides,
) -> Result<ConfigLayer> {
    let defaults = default_config_layer();
    let user = load_user_config()?;
    let vault_layer = load_vault_config(vault)?;
    let explicit_layer = match explicit {
        Some(path) if !path.exists() => {
            return Err(SyncError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        Some(path) => ConfigLayer::from_yaml(path)?,
        None => ConfigLayer::default(),
    };
    let env_layer = ConfigLayer::from_env();
    let cli_layer = cli.as_layer();

    Ok(ConfigLayer::merge_layers(&[
        defaults,
        user,
        vault_layer,
        explicit_layer,
        env_layer,
        cli_layer,
    ]))
}

/// Which activity categories the summary includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ActivityTypes {
    pub commits: bool,
    pub merged_prs: bool,
    pub closed_issues: bool,
    pub releases: bool,
}

impl Default for ActivityTypes {
    fn default() -> Self {
        Self {
            commits: true,
            merged_prs: true,
            closed_issues: true,
            releases: true,
        }
    }
}

/// Longest accepted activity window, about a century.
pub const MAX_ACTIVITY_DAYS: u32 = 36_500;

/// Activity summary settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActivityConfig {
    pub enabled: bool,
    /// Lookback window; between 1 and [`MAX_ACTIVITY_DAYS`].
    pub days: u32,
    pub types: ActivityTypes,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            days: 7,
            types: ActivityTypes::default(),
        }
    }
}

/// Typed, immutable sync configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SyncConfig {
    /// Sanitized tag name without `#`; `None` disables the configured tag.
    pub task_tag: Option<String>,
    pub task_format: TaskFormat,
    /// Aggregated note name without the `.md` extension.
    pub tasks_note: String,
    pub import_labels: bool,
    pub repository_description: bool,
    pub repository_tags: bool,
    pub auto_clear_completed: bool,
    pub show_created_at: bool,
    pub show_completed_at: bool,
    pub per_note_sync: bool,
    /// Folder prefixes to scan; empty scans the whole vault.
    pub scan_folders: Vec<String>,
    pub exclude_archived: bool,
    pub activity: ActivityConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            task_tag: Some("github".to_string()),
            task_format: TaskFormat::Tasks,
            tasks_note: "GitHub Tasks".to_string(),
            import_labels: false,
            repository_description: false,
            repository_tags: false,
            auto_clear_completed: false,
            show_created_at: false,
            show_completed_at: true,
            per_note_sync: false,
            scan_folders: Vec::new(),
            exclude_archived: true,
            activity: ActivityConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Build a typed config from a merged layer. Missing keys keep defaults.
    ///
    /// # Errors
    ///
    /// Returns an error for non-boolean flags, unknown formats, and a
    /// non-positive activity window.
    pub fn from_layer(layer: &ConfigLayer) -> Result<Self> {
        let mut config = Self::default();

        if let Some(tag) = layer.get("task-tag") {
            config.task_tag = scan::sanitize_tag(tag);
        }
        if let Some(format) = layer.get("task-format") {
            config.task_format = format.parse()?;
        }
        if let Some(note) = layer.get("tasks-note") {
            let note = note.trim();
            let note = note.strip_suffix(".md").unwrap_or(note);
            if note.is_empty() {
                return Err(SyncError::validation("tasks-note", "must not be empty"));
            }
            config.tasks_note = note.to_string();
        }

        read_bool(layer, "import-labels", &mut config.import_labels)?;
        read_bool(
            layer,
            "repository-description",
            &mut config.repository_description,
        )?;
        read_bool(layer, "repository-tags", &mut config.repository_tags)?;
        read_bool(
            layer,
            "auto-clear-completed",
            &mut config.auto_clear_completed,
        )?;
        read_bool(layer, "show-created-at", &mut config.show_created_at)?;
        read_bool(layer, "show-completed-at", &mut config.show_completed_at)?;
        read_bool(layer, "per-note-sync", &mut config.per_note_sync)?;
        read_bool(layer, "exclude-archived", &mut config.exclude_archived)?;

        if let Some(folders) = layer.get("scan-folders") {
            config.scan_folders = folders
                .split(',')
                .map(|f| f.trim().trim_matches('/').to_string())
                .filter(|f| !f.is_empty())
                .collect();
        }

        read_bool(layer, "activity.enabled", &mut config.activity.enabled)?;
        if let Some(days) = layer.get("activity.days") {
            config.activity.days = match days.trim().parse::<u32>() {
                Ok(0) => {
                    return Err(SyncError::validation(
                        "activity.days",
                        "must be greater than zero",
                    ));
                }
                Ok(days) if days > MAX_ACTIVITY_DAYS => {
                    return Err(SyncError::validation(
                        "activity.days",
                        format!("must be at most {MAX_ACTIVITY_DAYS}, got {days}"),
                    ));
                }
                Ok(days) => days,
                Err(_) => {
                    return Err(SyncError::validation(
                        "activity.days",
                        format!("expected a positive integer, got '{days}'"),
                    ));
                }
            };
        }
        let types = &mut config.activity.types;
        read_bool(layer, "activity.types.commits", &mut types.commits)?;
        read_bool(layer, "activity.types.merged-prs", &mut types.merged_prs)?;
        read_bool(
            layer,
            "activity.types.closed-issues",
            &mut types.closed_issues,
        )?;
        read_bool(layer, "activity.types.releases", &mut types.releases)?;

        Ok(config)
    }

    /// Rendering options for the line codec.
    #[must_use]
    pub fn line_style(&self) -> LineStyle {
        LineStyle {
            format: self.task_format,
            task_tag: self.task_tag.clone(),
            import_labels: self.import_labels,
            repository_description: self.repository_description,
            repository_tags: self.repository_tags,
            show_created_at: self.show_created_at,
            show_completed_at: self.show_completed_at,
        }
    }

    /// Copy with `auto-clear-completed` forced on.
    #[must_use]
    pub fn with_auto_clear(&self) -> Self {
        Self {
            auto_clear_completed: true,
            ..self.clone()
        }
    }

    /// File name of the aggregated tasks note.
    #[must_use]
    pub fn tasks_note_path(&self) -> String {
        format!("{}.md", self.tasks_note)
    }

    /// Flat `key -> value` view, in [`KNOWN_KEYS`] order.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let types = &self.activity.types;
        vec![
            (
                "task-tag",
                self.task_tag
                    .as_ref()
                    .map(|t| format!("#{t}"))
                    .unwrap_or_default(),
            ),
            ("task-format", self.task_format.to_string()),
            ("tasks-note", self.tasks_note.clone()),
            ("import-labels", self.import_labels.to_string()),
            (
                "repository-description",
                self.repository_description.to_string(),
            ),
            ("repository-tags", self.repository_tags.to_string()),
            (
                "auto-clear-completed",
                self.auto_clear_completed.to_string(),
            ),
            ("show-created-at", self.show_created_at.to_string()),
            ("show-completed-at", self.show_completed_at.to_string()),
            ("per-note-sync", self.per_note_sync.to_string()),
            ("scan-folders", self.scan_folders.join(",")),
            ("exclude-archived", self.exclude_archived.to_string()),
            ("activity.enabled", self.activity.enabled.to_string()),
            ("activity.days", self.activity.days.to_string()),
            ("activity.types.commits", types.commits.to_string()),
            ("activity.types.merged-prs", types.merged_prs.to_string()),
            (
                "activity.types.closed-issues",
                types.closed_issues.to_string(),
            ),
            ("activity.types.releases", types.releases.to_string()),
        ]
    }
}

fn read_bool(layer: &ConfigLayer, key: &str, target: &mut bool) -> Result<()> {
    if let Some(raw) = layer.get(key) {
        *target = parse_bool(raw).ok_or_else(|| {
            SyncError::Config(format!("{key}: expected a boolean, got '{raw}'"))
        })?;
    }
    Ok(())
}

fn insert_key_value(layer: &mut ConfigLayer, key: &str, value: String) {
    layer.values.insert(normalize_key(key), value);
}

/// Resolve a key to its canonical spelling.
///
/// `_`, `-` and `.` are interchangeable and case is ignored, so
/// `ACTIVITY_TYPES_MERGED_PRS` and `activity.types.merged_prs` both resolve to
/// `activity.types.merged-prs`. Unknown keys are kept lowercased.
#[must_use]
pub fn normalize_key(key: &str) -> String {
    let lowered = key.trim().to_lowercase();
    let loose = loose_key(&lowered);
    KNOWN_KEYS
        .iter()
        .find(|known| loose_key(known) == loose)
        .map_or(lowered, |known| (*known).to_string())
}

fn loose_key(key: &str) -> String {
    key.chars()
        .map(|c| if matches!(c, '_' | '.') { '-' } else { c })
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

fn layer_from_yaml_value(value: &serde_yaml::Value) -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    let mut flat = HashMap::new();
    flatten_yaml(value, "", &mut flat);

    for (key, value) in flat {
        insert_key_value(&mut layer, &key, value);
    }

    layer
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut HashMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = key.as_str() else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str.to_string()
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        serde_yaml::Value::Sequence(values) => {
            let joined = values
                .iter()
                .filter_map(yaml_scalar_to_string)
                .collect::<Vec<_>>()
                .join(",");
            out.insert(prefix.to_string(), joined);
        }
        _ => {
            if let Some(value) = yaml_scalar_to_string(value) {
                out.insert(prefix.to_string(), value);
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn layer(pairs: &[(&str, &str)]) -> ConfigLayer {
        let mut layer = ConfigLayer::default();
        for (key, value) in pairs {
            layer.set(key, *value);
        }
        layer
    }

    #[test]
    fn defaults_round_trip_through_layer() {
        let config = SyncConfig::from_layer(&default_config_layer()).unwrap();
        assert_eq!(config, SyncConfig::default());
    }

    #[test]
    fn merge_precedence_order() {
        let defaults = default_config_layer();
        let yaml = layer(&[("task-tag", "#yaml")]);
        let env_layer = layer(&[("task-tag", "#env")]);
        let cli = CliOverrides {
            task_tag: Some("#cli".to_string()),
            task_format: None,
        }
        .as_layer();

        let merged = ConfigLayer::merge_layers(&[defaults.clone(), yaml.clone(), env_layer.clone(), cli]);
        assert_eq!(merged.get("task-tag"), Some("#cli"));

        let merged = ConfigLayer::merge_layers(&[defaults, yaml, env_layer]);
        assert_eq!(merged.get("task-tag"), Some("#env"));
    }

    #[test]
    fn yaml_nested_keys_flatten() {
        let yaml = r"
task-format: dataview
activity:
  days: 14
  types:
    merged_prs: false
scan-folders:
  - Projects
  - Work/Repos/
";
        let value: serde_yaml::Value = serde_yaml::from_str(yaml).expect("parse yaml");
        let layer = layer_from_yaml_value(&value);
        assert_eq!(layer.get("activity.days"), Some("14"));
        assert_eq!(layer.get("activity.types.merged-prs"), Some("false"));
        assert_eq!(layer.get("scan-folders"), Some("Projects,Work/Repos/"));

        let config = SyncConfig::from_layer(&layer).unwrap();
        assert_eq!(config.task_format, TaskFormat::Dataview);
        assert_eq!(config.activity.days, 14);
        assert!(!config.activity.types.merged_prs);
        assert!(config.activity.types.commits);
        assert_eq!(config.scan_folders, vec!["Projects", "Work/Repos"]);
    }

    #[test]
    fn env_vars_map_to_canonical_keys() {
        let layer = ConfigLayer::from_env_vars(vec![
            ("GHT_TASK_TAG".to_string(), "#gh".to_string()),
            ("GHT_ACTIVITY_DAYS".to_string(), "3".to_string()),
            ("GHT_ACTIVITY_TYPES_CLOSED_ISSUES".to_string(), "off".to_string()),
            ("PATH".to_string(), "/usr/bin".to_string()),
        ]);
        assert_eq!(layer.get("task-tag"), Some("#gh"));
        assert_eq!(layer.get("activity.days"), Some("3"));
        assert_eq!(layer.get("activity.types.closed-issues"), Some("off"));
        assert_eq!(layer.values.len(), 3);
    }

    #[test]
    fn task_tag_is_sanitized() {
        let config = SyncConfig::from_layer(&layer(&[("task-tag", "#gh sync")])).unwrap();
        assert_eq!(config.task_tag.as_deref(), Some("gh-sync"));

        let config = SyncConfig::from_layer(&layer(&[("task-tag", "")])).unwrap();
        assert_eq!(config.task_tag, None);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = SyncConfig::from_layer(&layer(&[("import-labels", "maybe")])).unwrap_err();
        assert!(matches!(err, SyncError::Config(_)));

        let err = SyncConfig::from_layer(&layer(&[("task-format", "org")])).unwrap_err();
        assert!(matches!(err, SyncError::InvalidFormat { .. }));

        let err = SyncConfig::from_layer(&layer(&[("activity.days", "0")])).unwrap_err();
        assert!(matches!(err, SyncError::Validation { .. }));

        let err = SyncConfig::from_layer(&layer(&[("activity.days", "-2")])).unwrap_err();
        assert!(matches!(err, SyncError::Validation { .. }));
    }

    #[test]
    fn activity_days_upper_bound() {
        let config = SyncConfig::from_layer(&layer(&[("activity.days", "36500")])).unwrap();
        assert_eq!(config.activity.days, MAX_ACTIVITY_DAYS);

        let err = SyncConfig::from_layer(&layer(&[("activity.days", "36501")])).unwrap_err();
        assert!(matches!(err, SyncError::Validation { .. }));
        assert!(err.to_string().contains("36500"), "{err}");

        let err = SyncConfig::from_layer(&layer(&[("activity.days", "4000000000")])).unwrap_err();
        assert!(matches!(err, SyncError::Validation { .. }));
    }

    #[test]
    fn tasks_note_strips_extension() {
        let config = SyncConfig::from_layer(&layer(&[("tasks-note", "Inbox/GitHub.md")])).unwrap();
        assert_eq!(config.tasks_note, "Inbox/GitHub");
        assert_eq!(config.tasks_note_path(), "Inbox/GitHub.md");
    }

    #[test]
    fn with_auto_clear_leaves_original_untouched() {
        let config = SyncConfig::default();
        let forced = config.with_auto_clear();
        assert!(forced.auto_clear_completed);
        assert!(!config.auto_clear_completed);
    }

    #[test]
    fn vault_config_is_loaded_from_dot_dir() {
        let temp = TempDir::new().expect("tempdir");
        let dir = temp.path().join(".ghtasks");
        fs::create_dir_all(&dir).expect("create config dir");
        fs::write(dir.join("config.yaml"), "import-labels: true\n").expect("write config");

        let layer = load_vault_config(temp.path()).expect("load");
        assert_eq!(layer.get("import-labels"), Some("true"));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let temp = TempDir::new().expect("tempdir");
        let missing = temp.path().join("nope.yaml");
        let err = load_config(temp.path(), Some(&missing), &CliOverrides::default()).unwrap_err();
        assert!(matches!(err, SyncError::Config(_)));
    }
}
