use crate::extensions::{
    compute_extension_filters, parse_categories, Category, ExtensionMode, ExtensionSettings,
};
use crate::ignore::{get_ignore_set, IgnorePreset, DEFAULT_IGNORE_PRESET};
use crate::template::{Template, TemplatePreset};
use crate::ClipError;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

const CONFIG_FILE: &str = "settings.json";
pub const CONFIG_ENV_VAR: &str = "CODE2CLIP_CONFIG";
const EVENT_CAPACITY: usize = 32;

/// Persisted user settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub extensions: ExtensionSettings,
    pub ignore_preset: String,
    pub custom_ignore_list: String,
    pub ssh_host: String,
    pub ssh_username: String,
    pub last_preset: String,
    pub custom_prefix: String,
    pub custom_suffix: String,
    pub interpret_escape_sequences: bool,
    pub show_success_message: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            extensions: ExtensionSettings::default(),
            ignore_preset: DEFAULT_IGNORE_PRESET.name().to_owned(),
            custom_ignore_list: String::new(),
            ssh_host: String::new(),
            ssh_username: String::new(),
            last_preset: TemplatePreset::Markdown.name().to_owned(),
            custom_prefix: String::new(),
            custom_suffix: String::new(),
            interpret_escape_sequences: true,
            show_success_message: true,
        }
    }
}

impl AppSettings {
    pub fn extension_filters(&self) -> Vec<String> {
        compute_extension_filters(&self.extensions)
    }

    pub fn ignore_filters(&self) -> BTreeSet<String> {
        get_ignore_set(&self.ignore_preset, &self.custom_ignore_list)
    }

    /// Last used template preset; unknown names fall back to Markdown.
    pub fn template_preset(&self) -> TemplatePreset {
        TemplatePreset::from_name(&self.last_preset).unwrap_or(TemplatePreset::Markdown)
    }

    pub fn template(&self) -> Template {
        Template::from_preset(
            self.template_preset(),
            &self.custom_prefix,
            &self.custom_suffix,
        )
    }
}

/// Platform-specific configuration directory.
pub fn get_config_directory() -> Option<PathBuf> {
    ProjectDirs::from("io", "code2clip", "code2clip")
        .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
}

/// Settings file location: `CODE2CLIP_CONFIG` if set, else the platform default.
pub fn default_config_path() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_ENV_VAR) {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => get_config_directory().map(|dir| dir.join(CONFIG_FILE)),
    }
}

const LEGACY_KEYS: &[&str] = &["extension_allow_all", "extension_categories", "extension_mode"];

/// Whether `value` uses the older flat layout: legacy extension keys at the top
/// level and no nested `extensions` object.
pub fn is_legacy_settings(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    !obj.get("extensions").is_some_and(Value::is_object)
        && LEGACY_KEYS.iter().any(|key| obj.contains_key(*key))
}

/// Loads settings from `path`, creating a default file when none exists.
///
/// Files in the legacy layout are migrated. Unparsable files are replaced by
/// defaults in memory.
pub fn load_settings(path: &Path) -> Result<AppSettings, ClipError> {
    if !path.exists() {
        info!("Settings file not found, creating defaults at {:?}", path);
        let defaults = AppSettings::default();
        save_settings(&defaults, path)?;
        return Ok(defaults);
    }

    let content = fs::read_to_string(path)?;
    let value: Value = match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            warn!("Failed to parse settings at {:?}: {}. Using defaults.", path, e);
            return Ok(AppSettings::default());
        }
    };

    if is_legacy_settings(&value) {
        info!("Migrating legacy settings at {:?}", path);
        return Ok(migrate_legacy_value(&value).unwrap_or_else(|e| {
            warn!("Legacy migration failed ({}), using defaults", e);
            AppSettings::default()
        }));
    }

    match serde_json::from_value::<AppSettings>(value.clone()) {
        Ok(settings) => {
            debug!("Loaded settings from {:?}", path);
            Ok(settings)
        }
        Err(e) => {
            warn!(
                "Failed to parse settings at {:?}: {}. Trying legacy format.",
                path, e
            );
            Ok(migrate_legacy_value(&value).unwrap_or_else(|e| {
                warn!("Legacy migration failed ({}), using defaults", e);
                AppSettings::default()
            }))
        }
    }
}

/// Reads the older flat layout (`extension_allow_all`, `extension_categories`
/// and friends at the top level) into the current structure.
pub fn migrate_legacy_settings(content: &str) -> Result<AppSettings, ClipError> {
    let value: Value = serde_json::from_str(content)?;
    migrate_legacy_value(&value)
}

fn migrate_legacy_value(value: &Value) -> Result<AppSettings, ClipError> {
    let obj = value
        .as_object()
        .ok_or_else(|| ClipError::ConfigError("settings are not a JSON object".to_owned()))?;

    let mut settings = AppSettings::default();
    let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_owned);
    let flag = |key: &str| obj.get(key).and_then(Value::as_bool);

    if flag("extension_allow_all") == Some(true) {
        settings.extensions.mode = ExtensionMode::AllowAll;
    } else if let Some(categories) = text("extension_categories") {
        let categories = parse_categories(&categories);
        let enabled = |group: &str| categories.iter().any(|c| c == group);
        settings.extensions.include_text = enabled("Text Files");
        settings.extensions.include_data = enabled("Data Files");
        settings.extensions.include_code = enabled("Code Files");
    }
    if let Some(mode) = text("extension_mode").and_then(|m| m.parse::<ExtensionMode>().ok()) {
        settings.extensions.mode = mode;
    }

    let assign = |key: &str, slot: &mut String| {
        if let Some(v) = text(key) {
            *slot = v;
        }
    };
    assign("ignore_preset", &mut settings.ignore_preset);
    assign("custom_ignore_list", &mut settings.custom_ignore_list);
    assign("ssh_host", &mut settings.ssh_host);
    assign("ssh_username", &mut settings.ssh_username);
    assign("last_preset", &mut settings.last_preset);
    assign("custom_prefix", &mut settings.custom_prefix);
    assign("custom_suffix", &mut settings.custom_suffix);
    if let Some(v) = flag("interpret_escape_sequences") {
        settings.interpret_escape_sequences = v;
    }
    if let Some(v) = flag("show_success_message") {
        settings.show_success_message = v;
    }

    info!("Successfully migrated legacy settings");
    Ok(settings)
}

pub fn save_settings(settings: &AppSettings, path: &Path) -> Result<(), ClipError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)?;
            debug!("Created config directory: {:?}", dir);
        }
    }
    fs::write(path, serde_json::to_string_pretty(settings)?)?;
    debug!("Saved settings to {:?}", path);
    Ok(())
}

/// Change notifications published by [`SettingsStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsEvent {
    Changed,
    SshConfigChanged { host: String, username: String },
    ExtensionFiltersChanged(Vec<String>),
    IgnoreFiltersChanged(BTreeSet<String>),
}

/// Owns the settings, persists every effective change and broadcasts events.
pub struct SettingsStore {
    settings: AppSettings,
    path: PathBuf,
    events: broadcast::Sender<SettingsEvent>,
}

impl SettingsStore {
    pub fn open(path: PathBuf) -> Result<Self, ClipError> {
        let settings = load_settings(&path)?;
        Ok(Self::with_settings(settings, path))
    }

    pub fn open_default() -> Result<Self, ClipError> {
        let path = default_config_path()
            .ok_or_else(|| ClipError::ConfigError("Could not determine config directory".into()))?;
        Self::open(path)
    }

    pub fn with_settings(settings: AppSettings, path: PathBuf) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        SettingsStore {
            settings,
            path,
            events,
        }
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SettingsEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: SettingsEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }

    pub fn save(&self) -> Result<(), ClipError> {
        save_settings(&self.settings, &self.path)?;
        self.emit(SettingsEvent::Changed);
        Ok(())
    }

    fn rebuild_extension_filters(&self) -> Result<(), ClipError> {
        self.save()?;
        self.emit(SettingsEvent::ExtensionFiltersChanged(
            self.settings.extension_filters(),
        ));
        Ok(())
    }

    fn rebuild_ignore_filters(&self) -> Result<(), ClipError> {
        self.save()?;
        self.emit(SettingsEvent::IgnoreFiltersChanged(
            self.settings.ignore_filters(),
        ));
        Ok(())
    }

    pub fn set_ssh(&mut self, host: &str, username: &str) -> Result<(), ClipError> {
        if self.settings.ssh_host == host && self.settings.ssh_username == username {
            return Ok(());
        }
        self.settings.ssh_host = host.to_owned();
        self.settings.ssh_username = username.to_owned();
        self.save()?;
        self.emit(SettingsEvent::SshConfigChanged {
            host: host.to_owned(),
            username: username.to_owned(),
        });
        Ok(())
    }

    pub fn set_extension_mode(&mut self, mode: ExtensionMode) -> Result<(), ClipError> {
        if self.settings.extensions.mode == mode {
            return Ok(());
        }
        self.settings.extensions.mode = mode;
        self.rebuild_extension_filters()
    }

    pub fn set_category_enabled(
        &mut self,
        category: Category,
        enabled: bool,
    ) -> Result<(), ClipError> {
        if self
            .settings
            .extensions
            .set_category_enabled(category, enabled)
        {
            self.rebuild_extension_filters()?;
        }
        Ok(())
    }

    pub fn set_subset_excluded(&mut self, subset: &str, excluded: bool) -> Result<(), ClipError> {
        if self.settings.extensions.set_subset_excluded(subset, excluded) {
            self.rebuild_extension_filters()?;
        }
        Ok(())
    }

    pub fn set_included_extensions_text(&mut self, text: &str) -> Result<(), ClipError> {
        if self.settings.extensions.included_extensions_text == text {
            return Ok(());
        }
        self.settings.extensions.included_extensions_text = text.to_owned();
        self.rebuild_extension_filters()
    }

    pub fn set_excluded_extensions_text(&mut self, text: &str) -> Result<(), ClipError> {
        if self.settings.extensions.excluded_extensions_text == text {
            return Ok(());
        }
        self.settings.extensions.excluded_extensions_text = text.to_owned();
        self.rebuild_extension_filters()
    }

    pub fn set_custom_extensions_text(&mut self, text: &str) -> Result<(), ClipError> {
        if self.settings.extensions.custom_extensions_text == text {
            return Ok(());
        }
        self.settings.extensions.custom_extensions_text = text.to_owned();
        self.rebuild_extension_filters()
    }

    pub fn reset_extension_settings(&mut self) -> Result<(), ClipError> {
        self.settings.extensions = ExtensionSettings::default();
        self.rebuild_extension_filters()
    }

    pub fn set_ignore_preset(&mut self, preset_name: &str) -> Result<(), ClipError> {
        if self.settings.ignore_preset == preset_name {
            return Ok(());
        }
        if IgnorePreset::from_name(preset_name).is_none() {
            warn!(
                "Unknown ignore preset '{}', filters fall back to {}",
                preset_name, DEFAULT_IGNORE_PRESET
            );
        }
        self.settings.ignore_preset = preset_name.to_owned();
        self.rebuild_ignore_filters()
    }

    /// The custom list only affects the filters while the preset is `Custom`.
    pub fn set_custom_ignore_list(&mut self, text: &str) -> Result<(), ClipError> {
        if self.settings.custom_ignore_list == text {
            return Ok(());
        }
        self.settings.custom_ignore_list = text.to_owned();
        if IgnorePreset::from_name(&self.settings.ignore_preset) == Some(IgnorePreset::Custom) {
            self.rebuild_ignore_filters()
        } else {
            self.save()
        }
    }

    pub fn reset_ignore_filters(&mut self) -> Result<(), ClipError> {
        self.settings.ignore_preset = DEFAULT_IGNORE_PRESET.name().to_owned();
        self.settings.custom_ignore_list.clear();
        self.rebuild_ignore_filters()
    }

    pub fn set_last_preset(&mut self, preset: TemplatePreset) -> Result<(), ClipError> {
        if self.settings.last_preset == preset.name() {
            return Ok(());
        }
        self.settings.last_preset = preset.name().to_owned();
        self.save()
    }

    pub fn set_custom_template(&mut self, prefix: &str, suffix: &str) -> Result<(), ClipError> {
        if self.settings.custom_prefix == prefix && self.settings.custom_suffix == suffix {
            return Ok(());
        }
        self.settings.custom_prefix = prefix.to_owned();
        self.settings.custom_suffix = suffix.to_owned();
        self.save()
    }

    pub fn set_interpret_escape_sequences(&mut self, value: bool) -> Result<(), ClipError> {
        if self.settings.interpret_escape_sequences == value {
            return Ok(());
        }
        self.settings.interpret_escape_sequences = value;
        self.save()
    }

    pub fn set_show_success_message(&mut self, value: bool) -> Result<(), ClipError> {
        if self.settings.show_success_message == value {
            return Ok(());
        }
        self.settings.show_success_message = value;
        self.save()
    }

    /// Restores every setting to its default.
    pub fn reset_all(&mut self) -> Result<(), ClipError> {
        let ssh_changed = !self.settings.ssh_host.is_empty()
            || !self.settings.ssh_username.is_empty();
        self.settings = AppSettings::default();
        self.rebuild_extension_filters()?;
        self.rebuild_ignore_filters()?;
        if ssh_changed {
            self.emit(SettingsEvent::SshConfigChanged {
                host: String::new(),
                username: String::new(),
            });
        }
        Ok(())
    }
}

