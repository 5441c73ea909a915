//! Command line and environment settings for the host.

use std::path::Path;
use std::time::Duration;

use mazebench::builtin;
use mazebench::maze::{Maze, MazeConfigError};
use mazebench::registry::{RegistryError, StrategyOptions};
use mazebench::strategies::replay::ReplayStep;
use mazebench::strategies::scripted::Command as ScriptCommand;
use thiserror::Error;
use tracing::warn;

pub const ENV_SEED: &str = "MAZEBENCH_SEED";
pub const ENV_TICK_MS: &str = "MAZEBENCH_TICK_MS";

const DEFAULT_TICK_MS: u64 = 100;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("usage: {0}")]
    Usage(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("maze error: {0}")]
    Maze(#[from] MazeConfigError),
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Compare,
    Run { strategy: String },
    Watch { strategy: String },
    Help,
}

#[derive(Debug, Clone)]
pub struct HostConfig {
    pub command: Command,
    /// Builtin maze names or JSON file paths.
    pub mazes: Vec<String>,
    pub options: StrategyOptions,
    pub tick: Duration,
    pub json: bool,
    pub parallel: bool,
    pub flag_exit_from_start: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            command: Command::Help,
            mazes: Vec::new(),
            options: StrategyOptions::default(),
            tick: Duration::from_millis(DEFAULT_TICK_MS),
            json: false,
            parallel: false,
            flag_exit_from_start: false,
        }
    }
}

impl HostConfig {
    /// Parse `args` (without the program name), then apply environment
    /// overrides. Flags given on the command line win over the environment.
    pub fn from_args<I, S>(args: I) -> Result<Self, HostError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cfg = Self::default();
        cfg.apply_env(|k| std::env::var(k).ok());

        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let mut it = args.into_iter();
        cfg.command = match it.next().as_deref() {
            None | Some("help") | Some("--help") | Some("-h") => return Ok(cfg),
            Some("compare") => Command::Compare,
            Some("run") => Command::Run {
                strategy: it
                    .next()
                    .ok_or_else(|| HostError::Usage("run <strategy>".into()))?,
            },
            Some("watch") => Command::Watch {
                strategy: it
                    .next()
                    .ok_or_else(|| HostError::Usage("watch <strategy>".into()))?,
            },
            Some(other) => return Err(HostError::Usage(format!("unknown command {other}"))),
        };

        while let Some(arg) = it.next() {
            let mut value = |flag: &str| {
                it.next()
                    .ok_or_else(|| HostError::Usage(format!("{flag} needs a value")))
            };
            match arg.as_str() {
                "--maze" => cfg.mazes.push(value("--maze")?),
                "--seed" => {
                    let v = value("--seed")?;
                    cfg.options.seed = v
                        .parse()
                        .map_err(|_| HostError::Usage(format!("bad seed {v}")))?;
                }
                "--tick-ms" => {
                    let v = value("--tick-ms")?;
                    let ms: u64 = v
                        .parse()
                        .map_err(|_| HostError::Usage(format!("bad tick {v}")))?;
                    cfg.tick = Duration::from_millis(ms.max(1));
                }
                "--script" => {
                    let raw = value("--script")?;
                    let (commands, dropped) = ScriptCommand::parse_script(&raw);
                    if !dropped.is_empty() {
                        warn!("Ignoring unrecognized script tokens: {:?}", dropped);
                    }
                    cfg.options.script = commands;
                }
                "--replay" => {
                    let path = value("--replay")?;
                    cfg.options.replay = load_replay(Path::new(&path))?;
                }
                "--json" => cfg.json = true,
                "--parallel" => cfg.parallel = true,
                "--flag-exit-from-start" => cfg.flag_exit_from_start = true,
                other => return Err(HostError::Usage(format!("unknown flag {other}"))),
            }
        }
        Ok(cfg)
    }

    /// Apply `MAZEBENCH_SEED` / `MAZEBENCH_TICK_MS`; bad values are ignored
    /// with a warning.
    pub fn apply_env(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = get(ENV_SEED) {
            match raw.trim().parse::<u64>() {
                Ok(seed) => self.options.seed = seed,
                Err(_) => warn!("Ignoring invalid {}={:?}", ENV_SEED, raw),
            }
        }
        if let Some(raw) = get(ENV_TICK_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => self.tick = Duration::from_millis(ms),
                _ => warn!("Ignoring invalid {}={:?}", ENV_TICK_MS, raw),
            }
        }
    }

    /// Resolve the requested mazes; both builtins when none were named.
    pub fn load_mazes(&self) -> Result<Vec<Maze>, HostError> {
        if self.mazes.is_empty() {
            return Ok(builtin::all()?);
        }
        self.mazes.iter().map(|m| load_maze(m)).collect()
    }
}

pub fn load_maze(spec: &str) -> Result<Maze, HostError> {
    if let Some(maze) = builtin::by_name(spec) {
        return Ok(maze?);
    }
    let text = std::fs::read_to_string(spec)?;
    Ok(Maze::from_json(&text)?)
}

fn load_replay(path: &Path) -> Result<Vec<ReplayStep>, HostError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_watch_with_flags() {
        let cfg = HostConfig::from_args([
            "watch",
            "tremaux",
            "--maze",
            "surprise",
            "--tick-ms",
            "5",
            "--script",
            "f,l x",
        ])
        .unwrap();
        assert_eq!(
            cfg.command,
            Command::Watch {
                strategy: "tremaux".into()
            }
        );
        assert_eq!(cfg.mazes, vec!["surprise".to_string()]);
        assert_eq!(cfg.tick, Duration::from_millis(5));
        assert_eq!(cfg.options.script.len(), 2);
        assert_eq!(cfg.load_mazes().unwrap()[0].name(), "surprise");
    }

    #[test]
    fn missing_strategy_is_a_usage_error() {
        assert!(matches!(
            HostConfig::from_args(["run"]),
            Err(HostError::Usage(_))
        ));
        assert!(matches!(
            HostConfig::from_args(["compare", "--bogus"]),
            Err(HostError::Usage(_))
        ));
    }

    #[test]
    fn env_overrides_ignore_bad_values() {
        let mut cfg = HostConfig::default();
        cfg.apply_env(|k| match k {
            ENV_SEED => Some("42".into()),
            ENV_TICK_MS => Some("fast".into()),
            _ => None,
        });
        assert_eq!(cfg.options.seed, 42);
        assert_eq!(cfg.tick, Duration::from_millis(DEFAULT_TICK_MS));
    }
}
