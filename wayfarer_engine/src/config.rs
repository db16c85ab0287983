//! Engine configuration loader.
//!
//! Settings live in a small TOML file in the platform config directory
//! (e.g. `~/.config/wayfarer/config.toml` on Linux). Loading never fails:
//! a missing file is written out with defaults, and a broken file falls
//! back to defaults with a warning.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Top-level engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Log filter passed to the logger at startup (`off`, `error`, `warn`,
    /// `info`, `debug`, `trace`, or any `env_logger` filter expression).
    pub log_level: String,
    /// File log records are written to. Empty means stderr only.
    pub log_file: String,
    /// When logging to a file, also echo records to stderr.
    pub log_echo: bool,
    /// Append to the log file rather than truncating it on startup.
    pub log_append: bool,
    /// Cap on rendered line width; 0 means use the full terminal width.
    pub max_width: usize,
    /// Directory save files are written to, relative to the working directory.
    pub save_dir: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            log_level: "warn".to_string(),
            log_file: String::new(),
            log_echo: true,
            log_append: false,
            max_width: 0,
            save_dir: crate::save::SAVE_DIR.to_string(),
        }
    }
}

/// Where the config file lives for this platform, if a config dir exists.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("wayfarer").join("config.toml"))
}

/// Load settings, writing a default file on first run. Never fails.
pub fn load_config() -> GameConfig {
    let Some(path) = config_file_path() else {
        warn!("no config directory available on this platform, using defaults");
        return GameConfig::default();
    };
    if !path.exists() {
        if let Err(e) = write_default_config(&path) {
            warn!("could not write default config to '{}': {e}", path.display());
        }
        return GameConfig::default();
    }
    match try_load_config(&path) {
        Ok(config) => {
            info!("configuration loaded from '{}'", path.display());
            config
        },
        Err(e) => {
            warn!(
                "could not load config from '{}': {e}. Using defaults.",
                path.display()
            );
            GameConfig::default()
        },
    }
}

/// Initialize the logger from settings, letting `RUST_LOG` override the
/// configured filter. With `log_file` set, records go to that file
/// (truncated unless `log_append`), echoed to stderr when `log_echo`.
pub fn init_logging(config: &GameConfig) {
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(&config.log_level).parse_default_env();

    if !config.log_file.is_empty() {
        match open_log_file(Path::new(&config.log_file), config.log_append) {
            Ok(file) => {
                let sink: Box<dyn io::Write + Send> = if config.log_echo {
                    Box::new(Tee::new(file, io::stderr()))
                } else {
                    Box::new(file)
                };
                builder.target(env_logger::Target::Pipe(sink));
            },
            Err(e) => eprintln!("cannot open log file '{}': {e}. Logging to stderr.", config.log_file),
        }
    }
    builder.init();
}

fn open_log_file(path: &Path, append: bool) -> io::Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.create(true);
    if append {
        options.append(true);
    } else {
        options.write(true).truncate(true);
    }
    options.open(path)
}

/// Writer that copies everything to two sinks, for log-to-file-with-echo.
struct Tee<A, B> {
    first: A,
    second: B,
}

impl<A: io::Write, B: io::Write> Tee<A, B> {
    fn new(first: A, second: B) -> Self {
        Tee { first, second }
    }
}

impl<A: io::Write, B: io::Write> io::Write for Tee<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.first.write_all(buf)?;
        self.second.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.first.flush()?;
        self.second.flush()
    }
}

fn try_load_config(path: &Path) -> Result<GameConfig> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading config from '{}'", path.display()))?;
    let config: GameConfig =
        toml::from_str(&raw).with_context(|| format!("parsing config from '{}'", path.display()))?;
    Ok(config)
}

fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating config dir '{}'", parent.display()))?;
    }
    let rendered = toml::to_string_pretty(&GameConfig::default()).context("serializing default config")?;
    fs::write(path, rendered).with_context(|| format!("writing default config to '{}'", path.display()))?;
    info!("wrote default configuration to '{}'", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn defaults_are_sensible() {
        let config = GameConfig::default();
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_file, "");
        assert!(config.log_echo);
        assert!(!config.log_append);
        assert_eq!(config.max_width, 0);
        assert_eq!(config.save_dir, crate::save::SAVE_DIR);
    }

    #[test]
    fn log_settings_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "log_file = \"game.log\"\nlog_echo = false\nlog_append = true\n",
        )
        .unwrap();

        let config = try_load_config(&path).unwrap();
        assert_eq!(config.log_file, "game.log");
        assert!(!config.log_echo);
        assert!(config.log_append);
    }

    #[test]
    fn log_file_append_mode_preserves_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("game.log");
        fs::write(&path, "old line\n").unwrap();

        let mut appended = open_log_file(&path, true).unwrap();
        appended.write_all(b"new line\n").unwrap();
        drop(appended);
        assert_eq!(fs::read_to_string(&path).unwrap(), "old line\nnew line\n");

        let _truncated = open_log_file(&path, false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn tee_writes_both_sinks() {
        let mut tee = Tee::new(Vec::new(), Vec::new());
        io::Write::write_all(&mut tee, b"record").unwrap();
        io::Write::flush(&mut tee).unwrap();
        assert_eq!(tee.first, b"record");
        assert_eq!(tee.second, b"record");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "log_level = \"debug\"\n").unwrap();

        let config = try_load_config(&path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.save_dir, crate::save::SAVE_DIR);
    }

    #[test]
    fn default_file_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        write_default_config(&path).unwrap();

        let config = try_load_config(&path).unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn garbage_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "log_level = [not toml").unwrap();
        assert!(try_load_config(&path).is_err());
    }
}
