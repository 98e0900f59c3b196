use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use directories::BaseDirs;
use serde::de::Deserializer;
use serde::Deserialize;

use crate::filter::SearchField;
use crate::remote::http::google_export_url;
use crate::remote::{FileSheetSource, HttpSheetSource, SheetSource};
use crate::sheet::mapper::DEFAULT_LIST_NAME;
use crate::sheet::{ColumnNames, Field, MapOptions};

const CONFIG_FILE_NAME: &str = "config.toml";
const LOG_FILE_NAME: &str = "sheetdex.log";
const APP_NAME: &str = "sheetdex";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    /// File the configuration was read from, if any.
    pub config_path: Option<PathBuf>,
    pub source: SourceConfig,
    pub mapping: MapOptions,
    pub search_fields: Vec<SearchField>,
    pub keys: Keys,
    pub ui: UiConfig,
    pub commands: Commands,
    pub log: LogConfig,
    /// Problems found while loading that are worth logging but not fatal.
    pub warnings: Vec<String>,
}

// =============================================================================
// Sheet source
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Url(String),
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub location: Option<SourceLocation>,
    pub timeout: Duration,
}

impl SourceConfig {
    /// Build the fetch collaborator for the configured location.
    pub fn open(&self) -> Result<Arc<dyn SheetSource>> {
        match &self.location {
            Some(SourceLocation::File(path)) => Ok(Arc::new(FileSheetSource::new(path.clone()))),
            Some(SourceLocation::Url(url)) => {
                let source = HttpSheetSource::new(url.clone(), self.timeout)
                    .with_context(|| format!("failed to set up HTTP client for {url}"))?;
                Ok(Arc::new(source))
            }
            None => bail!(
                "no sheet source configured; set `source.url`, `source.sheet_id` or `source.file`, \
                 or pass --url/--file"
            ),
        }
    }
}

/// Expand ~ to home directory in paths
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = home::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

// =============================================================================
// Logging
// =============================================================================

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub file: Option<PathBuf>,
    pub level: String,
}

// =============================================================================
// UI
// =============================================================================

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub colors: UiColors,
    pub default_view: ViewMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Grid,
    List,
}

impl ViewMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grid" => Some(ViewMode::Grid),
            "list" => Some(ViewMode::List),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Grid => ViewMode::List,
            ViewMode::List => ViewMode::Grid,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ViewMode::Grid => "GRID",
            ViewMode::List => "LIST",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiColors {
    pub border: RgbColor,
    pub selection_bg: RgbColor,
    pub selection_fg: RgbColor,
    pub separator: RgbColor,
    pub status_fg: RgbColor,
    pub status_bg: RgbColor,
    pub error_fg: RgbColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone)]
pub struct Commands {
    pub copy: Option<CommandExec>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandExec {
    pub program: String,
    pub args: Vec<String>,
}

// =============================================================================
// Key Bindings - Context-aware with multiple bindings per action
// =============================================================================

/// All key bindings organized by context
#[derive(Debug, Clone)]
pub struct Keys {
    /// Keys that work whenever no modal or text input has focus
    pub global: GlobalKeys,
    /// Keys while typing in the search box
    pub search_input: SearchInputKeys,
    /// Keys for moving around results and toggling filters
    pub results: ResultsKeys,
    /// Keys for the detail and help modals
    pub modal: ModalKeys,
}

#[derive(Debug, Clone)]
pub struct GlobalKeys {
    pub quit: Vec<String>,
    pub search: Vec<String>,
    pub help: Vec<String>,
    pub refresh: Vec<String>,
    pub toggle_view: Vec<String>,
    pub clear_filters: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SearchInputKeys {
    pub cancel: Vec<String>,
    pub confirm: Vec<String>,
    pub next: Vec<String>,
    pub prev: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ResultsKeys {
    pub next: Vec<String>,
    pub prev: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub page_down: Vec<String>,
    pub page_up: Vec<String>,
    pub open: Vec<String>,
    pub house_district: Vec<String>,
    pub senate_district: Vec<String>,
    pub city: Vec<String>,
    pub state: Vec<String>,
    pub list_name: Vec<String>,
    pub linkedin: Vec<String>,
    pub website: Vec<String>,
    pub twitter: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ModalKeys {
    pub cancel: Vec<String>,
    pub next: Vec<String>,
    pub prev: Vec<String>,
    pub copy: Vec<String>,
}

// =============================================================================
// Default implementations
// =============================================================================

fn keys(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for GlobalKeys {
    fn default() -> Self {
        Self {
            quit: keys(&["q"]),
            search: keys(&["/"]),
            help: keys(&["?", "F1"]),
            refresh: keys(&["r", "F5"]),
            toggle_view: keys(&["v"]),
            clear_filters: keys(&["x"]),
        }
    }
}

impl Default for SearchInputKeys {
    fn default() -> Self {
        Self {
            cancel: keys(&["Esc"]),
            confirm: keys(&["Enter"]),
            next: keys(&["Down"]),
            prev: keys(&["Up"]),
        }
    }
}

impl Default for ResultsKeys {
    fn default() -> Self {
        Self {
            next: keys(&["j", "Down"]),
            prev: keys(&["k", "Up"]),
            left: keys(&["Left"]),
            right: keys(&["Right"]),
            page_down: keys(&["PageDown"]),
            page_up: keys(&["PageUp"]),
            open: keys(&["Enter"]),
            house_district: keys(&["H"]),
            senate_district: keys(&["S"]),
            city: keys(&["C"]),
            state: keys(&["T"]),
            list_name: keys(&["L"]),
            linkedin: keys(&["1"]),
            website: keys(&["2"]),
            twitter: keys(&["3"]),
        }
    }
}

impl Default for ModalKeys {
    fn default() -> Self {
        Self {
            cancel: keys(&["Esc", "q"]),
            next: keys(&["j", "Down"]),
            prev: keys(&["k", "Up"]),
            copy: keys(&["y", "Space"]),
        }
    }
}

impl Default for Keys {
    fn default() -> Self {
        Self {
            global: GlobalKeys::default(),
            search_input: SearchInputKeys::default(),
            results: ResultsKeys::default(),
            modal: ModalKeys::default(),
        }
    }
}

// =============================================================================
// Serde deserialization types (support both single string and array)
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum KeyBinding {
    Single(String),
    Multiple(Vec<String>),
}

impl KeyBinding {
    fn into_vec(self) -> Vec<String> {
        match self {
            KeyBinding::Single(s) => vec![s],
            KeyBinding::Multiple(v) => v,
        }
    }
}

/// Override `target` when the file sets the binding.
fn apply_binding(target: &mut Vec<String>, binding: Option<KeyBinding>) {
    if let Some(binding) = binding {
        *target = binding.into_vec();
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct KeysFile {
    global: GlobalKeysFile,
    search_input: SearchInputKeysFile,
    results: ResultsKeysFile,
    modal: ModalKeysFile,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct GlobalKeysFile {
    quit: Option<KeyBinding>,
    search: Option<KeyBinding>,
    help: Option<KeyBinding>,
    refresh: Option<KeyBinding>,
    toggle_view: Option<KeyBinding>,
    clear_filters: Option<KeyBinding>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SearchInputKeysFile {
    cancel: Option<KeyBinding>,
    confirm: Option<KeyBinding>,
    next: Option<KeyBinding>,
    prev: Option<KeyBinding>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ResultsKeysFile {
    next: Option<KeyBinding>,
    prev: Option<KeyBinding>,
    left: Option<KeyBinding>,
    right: Option<KeyBinding>,
    page_down: Option<KeyBinding>,
    page_up: Option<KeyBinding>,
    open: Option<KeyBinding>,
    house_district: Option<KeyBinding>,
    senate_district: Option<KeyBinding>,
    city: Option<KeyBinding>,
    state: Option<KeyBinding>,
    list_name: Option<KeyBinding>,
    linkedin: Option<KeyBinding>,
    website: Option<KeyBinding>,
    twitter: Option<KeyBinding>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ModalKeysFile {
    cancel: Option<KeyBinding>,
    next: Option<KeyBinding>,
    prev: Option<KeyBinding>,
    copy: Option<KeyBinding>,
}

// =============================================================================
// Conversion from file types to runtime types
// =============================================================================

impl From<KeysFile> for Keys {
    fn from(file: KeysFile) -> Self {
        let mut keys = Keys::default();

        let g = file.global;
        apply_binding(&mut keys.global.quit, g.quit);
        apply_binding(&mut keys.global.search, g.search);
        apply_binding(&mut keys.global.help, g.help);
        apply_binding(&mut keys.global.refresh, g.refresh);
        apply_binding(&mut keys.global.toggle_view, g.toggle_view);
        apply_binding(&mut keys.global.clear_filters, g.clear_filters);

        let s = file.search_input;
        apply_binding(&mut keys.search_input.cancel, s.cancel);
        apply_binding(&mut keys.search_input.confirm, s.confirm);
        apply_binding(&mut keys.search_input.next, s.next);
        apply_binding(&mut keys.search_input.prev, s.prev);

        let r = file.results;
        apply_binding(&mut keys.results.next, r.next);
        apply_binding(&mut keys.results.prev, r.prev);
        apply_binding(&mut keys.results.left, r.left);
        apply_binding(&mut keys.results.right, r.right);
        apply_binding(&mut keys.results.page_down, r.page_down);
        apply_binding(&mut keys.results.page_up, r.page_up);
        apply_binding(&mut keys.results.open, r.open);
        apply_binding(&mut keys.results.house_district, r.house_district);
        apply_binding(&mut keys.results.senate_district, r.senate_district);
        apply_binding(&mut keys.results.city, r.city);
        apply_binding(&mut keys.results.state, r.state);
        apply_binding(&mut keys.results.list_name, r.list_name);
        apply_binding(&mut keys.results.linkedin, r.linkedin);
        apply_binding(&mut keys.results.website, r.website);
        apply_binding(&mut keys.results.twitter, r.twitter);

        let m = file.modal;
        apply_binding(&mut keys.modal.cancel, m.cancel);
        apply_binding(&mut keys.modal.next, m.next);
        apply_binding(&mut keys.modal.prev, m.prev);
        apply_binding(&mut keys.modal.copy, m.copy);

        keys
    }
}

/// Normalize a key binding string to a canonical form for collision detection.
/// Single characters preserve case (since 'M' means Shift+m, different from 'm').
/// Multi-character key names are case-insensitive (Enter, ENTER, enter are the same).
fn normalize_binding(binding: &str) -> String {
    let trimmed = binding.trim();
    if trimmed.chars().count() == 1 {
        trimmed.to_string()
    } else {
        trimmed.to_ascii_lowercase()
    }
}

/// Check for collisions within a single context
fn check_context_collisions(bindings: &[(&str, &[String])], context_name: &str) -> Result<()> {
    let mut seen: HashMap<String, &str> = HashMap::new();

    for (action_name, keys) in bindings {
        for key in *keys {
            let normalized = normalize_binding(key);
            if normalized.is_empty() {
                continue;
            }
            if let Some(existing_action) = seen.get(&normalized) {
                bail!(
                    "key binding collision in [keys.{}]: '{}' is bound to both '{}' and '{}'",
                    context_name,
                    key,
                    existing_action,
                    action_name
                );
            }
            seen.insert(normalized, action_name);
        }
    }

    Ok(())
}

/// Validate all key bindings for collisions within each context.
///
/// Global keys are active alongside the results keys, so they are checked
/// together.
fn validate_key_bindings(keys: &Keys) -> Result<()> {
    let g = &keys.global;
    let r = &keys.results;
    check_context_collisions(
        &[
            ("quit", &g.quit),
            ("search", &g.search),
            ("help", &g.help),
            ("refresh", &g.refresh),
            ("toggle_view", &g.toggle_view),
            ("clear_filters", &g.clear_filters),
            ("next", &r.next),
            ("prev", &r.prev),
            ("left", &r.left),
            ("right", &r.right),
            ("page_down", &r.page_down),
            ("page_up", &r.page_up),
            ("open", &r.open),
            ("house_district", &r.house_district),
            ("senate_district", &r.senate_district),
            ("city", &r.city),
            ("state", &r.state),
            ("list_name", &r.list_name),
            ("linkedin", &r.linkedin),
            ("website", &r.website),
            ("twitter", &r.twitter),
        ],
        "global/results",
    )?;

    let s = &keys.search_input;
    check_context_collisions(
        &[
            ("cancel", &s.cancel),
            ("confirm", &s.confirm),
            ("next", &s.next),
            ("prev", &s.prev),
        ],
        "search_input",
    )?;

    let m = &keys.modal;
    check_context_collisions(
        &[
            ("cancel", &m.cancel),
            ("next", &m.next),
            ("prev", &m.prev),
            ("copy", &m.copy),
        ],
        "modal",
    )?;

    Ok(())
}

// =============================================================================
// Config file
// =============================================================================

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    source: SourceFile,
    mapping: MappingFile,
    columns: BTreeMap<String, String>,
    search: SearchFile,
    keys: KeysFile,
    ui: UiFile,
    commands: CommandsFile,
    log: LogFile,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SourceFile {
    url: Option<String>,
    sheet_id: Option<String>,
    gid: Option<String>,
    file: Option<PathBuf>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct MappingFile {
    default_list_name: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SearchFile {
    fields: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct LogFile {
    file: Option<PathBuf>,
    level: Option<String>,
}

impl SourceFile {
    fn into_config(self, warnings: &mut Vec<String>) -> SourceConfig {
        let non_empty = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let url = non_empty(self.url);
        let sheet_id = non_empty(self.sheet_id);

        let configured = [self.file.is_some(), url.is_some(), sheet_id.is_some()]
            .iter()
            .filter(|set| **set)
            .count();
        if configured > 1 {
            warnings.push(
                "more than one of `source.file`, `source.url`, `source.sheet_id` is set; \
                 using the first in that order"
                    .to_string(),
            );
        }

        let location = if let Some(path) = self.file {
            Some(SourceLocation::File(expand_tilde(&path)))
        } else if let Some(url) = url {
            Some(SourceLocation::Url(url))
        } else {
            sheet_id.map(|id| SourceLocation::Url(google_export_url(&id, self.gid.as_deref())))
        };

        let timeout_secs = match self.timeout_secs {
            Some(0) | None => DEFAULT_TIMEOUT_SECS,
            Some(secs) => secs,
        };

        SourceConfig {
            location,
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

fn column_names(table: BTreeMap<String, String>) -> Result<ColumnNames> {
    let mut names = ColumnNames::default();
    for (key, header) in table {
        let field = Field::from_key(&key)
            .ok_or_else(|| anyhow!("unknown field `{}` in [columns]", key))?;
        if header.trim().is_empty() {
            bail!("[columns] header for `{}` must not be empty", key);
        }
        names = names.with_override(field, header);
    }
    Ok(names)
}

fn search_fields(keys: &[String]) -> Result<Vec<SearchField>> {
    if keys.is_empty() {
        return Ok(SearchField::DEFAULT.to_vec());
    }
    let mut fields = Vec::with_capacity(keys.len());
    for key in keys {
        let field = SearchField::from_key(key)
            .ok_or_else(|| anyhow!("unknown field `{}` in search.fields", key))?;
        if !fields.contains(&field) {
            fields.push(field);
        }
    }
    Ok(fields)
}

fn config_root() -> Result<PathBuf> {
    let base = BaseDirs::new().context("unable to determine base directories")?;
    Ok(base.config_dir().join(APP_NAME))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_root()?.join(CONFIG_FILE_NAME))
}

/// Default log location under the user's local data directory.
pub fn default_log_path() -> Option<PathBuf> {
    BaseDirs::new().map(|base| base.data_local_dir().join(APP_NAME).join(LOG_FILE_NAME))
}

/// Load configuration.
///
/// An explicit `path` must exist. Without one, the default location is used
/// when present and built-in defaults otherwise.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) => {
            if !path.exists() {
                bail!("configuration file not found at {}", path.display());
            }
            Some(path.to_path_buf())
        }
        None => {
            let default = config_path()?;
            default.exists().then_some(default)
        }
    };

    let Some(path) = path else {
        return from_toml("", None);
    };

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read configuration file at {}", path.display()))?;
    from_toml(&raw, Some(path))
}

/// Build a config from TOML text.
pub fn from_toml(raw: &str, path: Option<PathBuf>) -> Result<Config> {
    let origin = path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<defaults>".to_string());

    let value: toml::Value =
        toml::from_str(raw).with_context(|| format!("failed to parse {} as TOML", origin))?;

    let mut warnings = unknown_keys(&value);

    let cfg_file: ConfigFile = value
        .try_into()
        .with_context(|| format!("failed to deserialize config from {}", origin))?;

    let keys: Keys = cfg_file.keys.into();
    validate_key_bindings(&keys)?;

    let default_list_name = cfg_file
        .mapping
        .default_list_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_LIST_NAME.to_string());

    let mapping = MapOptions {
        columns: column_names(cfg_file.columns)?,
        default_list_name,
    };

    let ui = cfg_file.ui.into_config(&mut warnings);
    let source = cfg_file.source.into_config(&mut warnings);

    Ok(Config {
        config_path: path,
        source,
        mapping,
        search_fields: search_fields(&cfg_file.search.fields)?,
        keys,
        ui,
        commands: cfg_file.commands.into(),
        log: LogConfig {
            file: cfg_file.log.file.map(|p| expand_tilde(&p)).or_else(default_log_path),
            level: cfg_file.log.level.unwrap_or_else(|| "info".to_string()),
        },
        warnings,
    })
}

// =============================================================================
// Unknown key warnings
// =============================================================================

fn unknown_keys(value: &toml::Value) -> Vec<String> {
    let mut warnings = Vec::new();
    let Some(table) = value.as_table() else {
        return warnings;
    };

    unknown_in_context(
        value,
        "",
        &["source", "mapping", "columns", "search", "keys", "ui", "commands", "log"],
        &mut warnings,
    );

    let sections: [(&str, &[&str]); 6] = [
        ("source", &["url", "sheet_id", "gid", "file", "timeout_secs"]),
        ("mapping", &["default_list_name"]),
        ("search", &["fields"]),
        ("keys", &["global", "search_input", "results", "modal"]),
        ("ui", &["colors", "default_view"]),
        ("log", &["file", "level"]),
    ];
    for (name, known) in sections {
        if let Some(section) = table.get(name) {
            unknown_in_context(section, name, known, &mut warnings);
        }
    }

    if let Some(commands) = table.get("commands") {
        unknown_in_context(commands, "commands", &["copy"], &mut warnings);
    }

    if let Some(colors) = table.get("ui").and_then(|ui| ui.get("colors")) {
        unknown_in_context(
            colors,
            "ui.colors",
            &[
                "border",
                "selection_bg",
                "selection_fg",
                "separator",
                "status_fg",
                "status_bg",
                "error_fg",
            ],
            &mut warnings,
        );
    }

    warnings
}

fn unknown_in_context(value: &toml::Value, context: &str, known: &[&str], out: &mut Vec<String>) {
    let Some(table) = value.as_table() else {
        return;
    };
    let known: HashSet<&str> = known.iter().copied().collect();
    for key in table.keys() {
        if !known.contains(key.as_str()) {
            if context.is_empty() {
                out.push(format!("unknown configuration key `{}`", key));
            } else {
                out.push(format!("unknown configuration key `{}.{}`", context, key));
            }
        }
    }
}

// =============================================================================
// UI config
// =============================================================================

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct UiFile {
    colors: UiColorsFile,
    default_view: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct UiColorsFile {
    border: RgbColor,
    selection_bg: RgbColor,
    selection_fg: RgbColor,
    separator: RgbColor,
    status_fg: RgbColor,
    status_bg: RgbColor,
    error_fg: RgbColor,
}

impl Default for UiColorsFile {
    fn default() -> Self {
        Self {
            border: RgbColor::new(255, 165, 0),
            selection_bg: RgbColor::new(255, 165, 0),
            selection_fg: RgbColor::new(0, 0, 0),
            separator: RgbColor::new(255, 165, 0),
            status_fg: RgbColor::new(255, 165, 0),
            status_bg: RgbColor::new(0, 0, 0),
            error_fg: RgbColor::new(255, 85, 85),
        }
    }
}

impl UiFile {
    fn into_config(self, warnings: &mut Vec<String>) -> UiConfig {
        let default_view = match self.default_view.as_deref() {
            None => ViewMode::Grid,
            Some(raw) => ViewMode::from_str(raw).unwrap_or_else(|| {
                warnings.push(format!(
                    "unknown ui.default_view `{}`; expected \"grid\" or \"list\"",
                    raw
                ));
                ViewMode::Grid
            }),
        };
        let c = self.colors;
        UiConfig {
            colors: UiColors {
                border: c.border,
                selection_bg: c.selection_bg,
                selection_fg: c.selection_fg,
                separator: c.separator,
                status_fg: c.status_fg,
                status_bg: c.status_bg,
                error_fg: c.error_fg,
            },
            default_view,
        }
    }
}

// =============================================================================
// Commands config
// =============================================================================

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct CommandsFile {
    copy: Option<CommandDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum CommandDef {
    Simple(String),
    List(Vec<String>),
}

impl From<CommandsFile> for Commands {
    fn from(file: CommandsFile) -> Self {
        Self {
            copy: file.copy.and_then(CommandExec::from_def),
        }
    }
}

impl CommandExec {
    fn from_def(def: CommandDef) -> Option<Self> {
        match def {
            CommandDef::Simple(cmd) => {
                let trimmed = cmd.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(Self {
                        program: trimmed.to_string(),
                        args: Vec::new(),
                    })
                }
            }
            CommandDef::List(mut parts) => {
                if parts.is_empty() {
                    return None;
                }
                let program = parts.remove(0);
                Some(Self {
                    program,
                    args: parts,
                })
            }
        }
    }
}

impl RgbColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl<'de> serde::Deserialize<'de> for RgbColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Helper {
            Array([u8; 3]),
            Map { r: u8, g: u8, b: u8 },
        }

        let helper = Helper::deserialize(deserializer)?;
        let (r, g, b) = match helper {
            Helper::Array(values) => (values[0], values[1], values[2]),
            Helper::Map { r, g, b } => (r, g, b),
        };
        Ok(RgbColor { r, g, b })
    }
}
