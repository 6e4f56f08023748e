use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs};

/// Config file names probed in the repository root, in priority order
pub const CONFIG_FILES: [&str; 4] =
    ["repobrief.toml", ".repobrief.toml", "repobrief.yaml", "repobrief.json"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig
{
    /// Follow symbolic links while expanding discovery globs
    pub follow_symlinks: bool,

    /// Globs locating task-list files
    pub todo: DiscoveryConfig,

    /// Globs locating documentation files
    pub docs: DiscoveryConfig,

    /// Ignore-rule sources
    pub ignore: IgnoreConfig,

    /// Version-control snapshot settings
    pub git: GitConfig,

    /// Report output settings
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig
{
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig
{
    /// Primary rules file, relative to the root
    pub primary_file: PathBuf,

    /// Fail when the primary rules file is absent
    pub require_primary: bool,

    /// Supplementary rules files; absent ones are skipped
    pub extra_files: Vec<PathBuf>,

    /// Patterns applied after every file
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig
{
    pub enabled: bool,
    pub recent_commits: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat
{
    Markdown,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig
{
    pub format: ReportFormat,

    /// Embed full document text in the report context
    pub include_doc_content: bool,
}

impl Default for AppConfig
{
    fn default() -> Self
    {
        Self {
            follow_symlinks: false,
            todo: DiscoveryConfig {
                patterns: vec![
                    "**/TODO.md".to_string(),
                    "**/todo.md".to_string(),
                    "**/*.todo.md".to_string(),
                ],
            },
            docs: DiscoveryConfig {
                patterns: vec!["README.md".to_string(), "docs/**/*.md".to_string()],
            },
            ignore: IgnoreConfig::default(),
            git: GitConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Default for IgnoreConfig
{
    fn default() -> Self
    {
        Self {
            primary_file: PathBuf::from(".gitignore"),
            require_primary: false,
            extra_files: vec![PathBuf::from(".briefignore")],
            patterns: vec![
                ".git/".to_string(),
                "target/".to_string(),
                "node_modules/".to_string(),
            ],
        }
    }
}

impl Default for GitConfig
{
    fn default() -> Self
    {
        Self { enabled: true, recent_commits: 10 }
    }
}

impl Default for ReportConfig
{
    fn default() -> Self
    {
        Self { format: ReportFormat::Markdown, include_doc_content: false }
    }
}

/// First config file present under `root`
pub fn config_path(root: &Path) -> Option<PathBuf>
{
    CONFIG_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.exists())
}

/// Load configuration: first config file in `root`, then `REPOBRIEF__*` env vars.
/// Missing keys fall back to defaults.
pub fn load_config(root: &Path) -> Result<AppConfig>
{
    // e.g. REPOBRIEF__GIT__ENABLED=false
    let builder = file_source(root).add_source(
        config::Environment::with_prefix("REPOBRIEF")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    deserialize(builder)
}

/// Load only what the config file says (plus defaults), ignoring the
/// environment. This is the value `config set` edits and writes back.
pub fn load_file_config(root: &Path) -> Result<AppConfig>
{
    deserialize(file_source(root))
}

fn file_source(root: &Path) -> config::ConfigBuilder<config::builder::DefaultState>
{
    let mut builder = config::Config::builder();

    if let Some(path) = config_path(root)
    {
        tracing::debug!(path = %path.display(), "loading config file");
        builder = builder.add_source(config::File::from(path.as_path()));
    }

    builder
}

fn deserialize(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<AppConfig>
{
    let cfg = builder
        .build()
        .context("Failed to load configuration")?;
    let parsed: AppConfig = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

pub fn init(
    args: InitArgs,
    root: &Path,
    ctx: &AppContext,
) -> Result<()>
{
    let config_path = root.join(CONFIG_FILES[0]);

    if config_path.exists() && !args.force
    {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    write_config(&config_path, &AppConfig::default())?;

    if !ctx.quiet
    {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}

/// Serialize `cfg` as TOML to `path`
pub fn write_config(
    path: &Path,
    cfg: &AppConfig,
) -> Result<()>
{
    let toml_string = toml::to_string_pretty(cfg).context("Failed to serialize config")?;
    std::fs::write(path, toml_string)
        .with_context(|| format!("Failed to write config file {}", path.display()))
}

/// Read a dotted key (e.g. `git.recent_commits`) from the typed config
pub fn get_value(
    cfg: &AppConfig,
    key: &str,
) -> Result<toml::Value>
{
    let tree = toml::Value::try_from(cfg).context("Failed to serialize config")?;
    let mut node = &tree;

    for part in key.split('.')
    {
        node = node
            .get(part)
            .ok_or_else(|| anyhow::anyhow!("unknown config key `{key}`"))?;
    }

    Ok(node.clone())
}

/// Set a dotted key, parsing `raw` by the type of the current value.
/// The result is re-validated against the typed schema.
pub fn set_value(
    cfg: &AppConfig,
    key: &str,
    raw: &str,
) -> Result<AppConfig>
{
    let mut tree = toml::Value::try_from(cfg).context("Failed to serialize config")?;

    let (parents, leaf) = match key.rsplit_once('.')
    {
        Some((p, l)) => (p.split('.').collect::<Vec<_>>(), l),
        None => (Vec::new(), key),
    };

    let mut node = &mut tree;
    for part in parents
    {
        node = node
            .get_mut(part)
            .ok_or_else(|| anyhow::anyhow!("unknown config key `{key}`"))?;
    }

    let table = node
        .as_table_mut()
        .ok_or_else(|| anyhow::anyhow!("`{key}` does not name a setting"))?;
    let current = table
        .get(leaf)
        .ok_or_else(|| anyhow::anyhow!("unknown config key `{key}`"))?;

    let value = parse_like(current, raw)
        .with_context(|| format!("invalid value for `{key}`: {raw}"))?;
    table.insert(leaf.to_string(), value);

    let updated: AppConfig = tree
        .try_into()
        .with_context(|| format!("invalid value for `{key}`: {raw}"))?;
    Ok(updated)
}

/// Interpret `raw` with the same TOML type as `current`
fn parse_like(
    current: &toml::Value,
    raw: &str,
) -> Result<toml::Value>
{
    use toml::Value;

    Ok(match current
    {
        Value::String(_) => Value::String(raw.to_string()),
        Value::Boolean(_) => Value::Boolean(raw.trim().parse()?),
        Value::Integer(_) => Value::Integer(raw.trim().parse()?),
        Value::Float(_) => Value::Float(raw.trim().parse()?),
        Value::Array(_) => match parse_inline(raw)
        {
            Some(v @ Value::Array(_)) => v,
            // Bare comma-separated list of strings
            _ => Value::Array(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| Value::String(s.to_string()))
                    .collect(),
            ),
        },
        Value::Table(_) => anyhow::bail!("cannot assign a whole table"),
        Value::Datetime(_) => parse_inline(raw).ok_or_else(|| anyhow::anyhow!("not a datetime"))?,
    })
}

fn parse_inline(raw: &str) -> Option<toml::Value>
{
    format!("v = {raw}")
        .parse::<toml::Table>()
        .ok()?
        .remove("v")
}
