//! Optional `config.toml` loading and merge with CLI flags.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use ensdf_sync::config::{default_config_dir, default_data_dir};
use ensdf_sync::{HttpTimeouts, SyncConfig};
use url::Url;

use crate::cli::Cli;

/// Name of the config file inside the config directory.
pub(crate) const CONFIG_FILE_NAME: &str = "config.toml";

/// File configuration; every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FileConfig {
    /// Archive index page URL.
    pub(crate) base_url: Option<Url>,
    /// Directory holding the archive and the install directory.
    pub(crate) data_dir: Option<PathBuf>,
    /// Download write chunk size in KiB.
    pub(crate) chunk_size_kib: Option<u64>,
    /// Index page connect timeout in seconds.
    pub(crate) index_connect_timeout_secs: Option<u64>,
    /// Index page read timeout in seconds.
    pub(crate) index_read_timeout_secs: Option<u64>,
    /// Archive connect timeout in seconds.
    pub(crate) archive_connect_timeout_secs: Option<u64>,
    /// Archive read timeout in seconds.
    pub(crate) archive_read_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Validates value ranges.
    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(kib) = self.chunk_size_kib
            && !(1..=65_536).contains(&kib)
        {
            bail!("Invalid config value for `chunk_size_kib`: {kib}. Expected range: 1..=65536");
        }
        validate_timeout_secs("index_connect_timeout_secs", self.index_connect_timeout_secs)?;
        validate_timeout_secs("index_read_timeout_secs", self.index_read_timeout_secs)?;
        validate_timeout_secs("archive_connect_timeout_secs", self.archive_connect_timeout_secs)?;
        validate_timeout_secs("archive_read_timeout_secs", self.archive_read_timeout_secs)?;
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Builds the run configuration.
///
/// Priority for each setting: CLI flag, then `config.toml`, then the
/// XDG/HOME default.
pub(crate) fn resolve_sync_config(cli: &Cli) -> Result<SyncConfig> {
    let config_dir = match &cli.config_dir {
        Some(dir) => dir.clone(),
        None => default_config_dir()
            .context("Cannot determine config directory: set HOME, XDG_CONFIG_HOME or --config-dir")?,
    };
    let file = load_file_config(&config_dir)?.unwrap_or_default();

    let data_dir = match (&cli.data_dir, &file.data_dir) {
        (Some(dir), _) | (None, Some(dir)) => dir.clone(),
        (None, None) => default_data_dir()
            .context("Cannot determine data directory: set HOME, XDG_DATA_HOME or --data-dir")?,
    };

    let mut config = SyncConfig::new(&data_dir, &config_dir);
    if let Some(base_url) = cli.base_url.clone().or(file.base_url) {
        config.base_url = base_url;
    }
    if let Some(kib) = file.chunk_size_kib {
        config.chunk_size = usize::try_from(kib.saturating_mul(1024))
            .context("chunk_size_kib does not fit this platform")?;
    }
    config.index_timeouts = merge_timeouts(
        config.index_timeouts,
        file.index_connect_timeout_secs,
        file.index_read_timeout_secs,
    );
    config.archive_timeouts = merge_timeouts(
        config.archive_timeouts,
        file.archive_connect_timeout_secs,
        file.archive_read_timeout_secs,
    );
    Ok(config)
}

fn merge_timeouts(defaults: HttpTimeouts, connect: Option<u64>, read: Option<u64>) -> HttpTimeouts {
    HttpTimeouts {
        connect_secs: connect.unwrap_or(defaults.connect_secs),
        read_secs: read.unwrap_or(defaults.read_secs),
    }
}

/// Loads `config.toml` from `config_dir` when it exists.
pub(crate) fn load_file_config(config_dir: &Path) -> Result<Option<FileConfig>> {
    let path = config_dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .map(Some)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        let line_no = line_index + 1;

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };
        let key = raw_key.trim();
        let value = raw_value.trim();

        match key {
            "base_url" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `base_url` value on line {line_no}"))?;
                let url = Url::parse(&parsed)
                    .with_context(|| format!("Invalid `base_url` value on line {line_no}"))?;
                cfg.base_url = Some(url);
            }
            "data_dir" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `data_dir` value on line {line_no}"))?;
                cfg.data_dir = Some(PathBuf::from(parsed));
            }
            "chunk_size_kib" => {
                cfg.chunk_size_kib = Some(parse_integer_u64(value).with_context(|| {
                    format!("Invalid `chunk_size_kib` value on line {line_no}")
                })?);
            }
            "index_connect_timeout_secs" => {
                cfg.index_connect_timeout_secs = Some(parse_integer_u64(value).with_context(|| {
                    format!("Invalid `index_connect_timeout_secs` value on line {line_no}")
                })?);
            }
            "index_read_timeout_secs" => {
                cfg.index_read_timeout_secs = Some(parse_integer_u64(value).with_context(|| {
                    format!("Invalid `index_read_timeout_secs` value on line {line_no}")
                })?);
            }
            "archive_connect_timeout_secs" => {
                cfg.archive_connect_timeout_secs = Some(parse_integer_u64(value).with_context(|| {
                    format!("Invalid `archive_connect_timeout_secs` value on line {line_no}")
                })?);
            }
            "archive_read_timeout_secs" => {
                cfg.archive_read_timeout_secs = Some(parse_integer_u64(value).with_context(|| {
                    format!("Invalid `archive_read_timeout_secs` value on line {line_no}")
                })?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}
