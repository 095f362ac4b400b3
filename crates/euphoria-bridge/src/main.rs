//! Euphoria command-line client — entry point.
//!
//! This binary runs the relay bridge between the local device-control server
//! and the Euphoria backend, and manages the settings and backend session the
//! bridge depends on.
//!
//! # Usage
//!
//! ```text
//! euphoria [--config <PATH>] <COMMAND>
//!
//! Commands:
//!   bridge     Relay messages between the device server and the backend
//!   whoami     Show who is logged in to the backend
//!   login      Exchange a Discord OAuth code for a backend session
//!   logout     Forget the stored backend session
//!   settings   Show or change connection and trigger-word settings
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                  | Description                                 |
//! |---------------------------|---------------------------------------------|
//! | `EUPHORIA_CONFIG`         | Settings file path                          |
//! | `EUPHORIA_DEVICE_HOST`    | Device-control host (bridge)                |
//! | `EUPHORIA_DEVICE_PORT`    | Device-control port (bridge)                |
//! | `EUPHORIA_BACKEND_URL`    | Backend relay WebSocket URL (bridge)        |
//! | `EUPHORIA_CONNECT_TIMEOUT`| Handshake timeout in seconds (bridge)       |
//! | `EUPHORIA_RECONNECT_DELAY`| Seconds between sessions; unset = run once  |
//! | `RUST_LOG`                | Log filter; falls back to `log_level`       |
//!
//! CLI args take precedence over environment variables, which take
//! precedence over the settings file.

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

use euphoria_bridge::application::{log_in, render_settings, resolve_header, ApiError};
use euphoria_bridge::domain::BridgeConfig;
use euphoria_bridge::infrastructure::{run_bridge, HttpSessionApi};
use euphoria_core::storage::{default_settings_path, read_settings_from, save_settings_to};
use euphoria_core::{Settings, TriggerWords};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Euphoria relay and session client.
#[derive(Debug, Parser)]
#[command(
    name = "euphoria",
    about = "Relay between a local device-control server and the Euphoria backend",
    version
)]
struct Cli {
    /// Settings file to use instead of the platform default.
    #[arg(long, global = true, env = "EUPHORIA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Relay messages between the device server and the backend.
    Bridge(BridgeArgs),
    /// Show who is logged in to the backend.
    Whoami,
    /// Exchange a Discord OAuth code for a backend session.
    Login {
        /// The `code` query parameter Discord redirected back with.
        code: String,
    },
    /// Forget the stored backend session.
    Logout,
    /// Show or change settings.
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Debug, clap::Args)]
struct BridgeArgs {
    /// Device-control host (overrides the stored setting).
    #[arg(long, env = "EUPHORIA_DEVICE_HOST")]
    device_host: Option<String>,

    /// Device-control port (overrides the stored setting).
    #[arg(long, env = "EUPHORIA_DEVICE_PORT")]
    device_port: Option<u16>,

    /// Backend relay WebSocket URL (default: derived from the API base URL).
    #[arg(long, env = "EUPHORIA_BACKEND_URL")]
    backend_url: Option<String>,

    /// Handshake timeout per endpoint, in seconds.
    #[arg(long, default_value_t = 10, env = "EUPHORIA_CONNECT_TIMEOUT")]
    connect_timeout: u64,

    /// Reconnect after this many seconds when a session ends or fails.
    /// Without it the bridge runs a single session.
    #[arg(long, env = "EUPHORIA_RECONNECT_DELAY")]
    reconnect_delay: Option<u64>,
}

#[derive(Debug, Subcommand)]
enum SettingsCommand {
    /// Print the current settings.
    Show,
    /// Set the device-control host.
    SetHost { host: String },
    /// Set the device-control port.
    SetPort { port: u16 },
    /// Use a list of trigger words or phrases.
    SetWords {
        #[arg(required = true)]
        words: Vec<String>,
    },
    /// Use a regular expression as the trigger rule.
    SetRegex { pattern: String },
    /// Check whether TEXT contains a trigger.
    TestTrigger { text: String },
}

impl BridgeArgs {
    /// Builds the relay configuration from stored settings plus overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an override is invalid or the resulting URLs are
    /// not WebSocket URLs.
    fn into_bridge_config(self, settings: &Settings) -> anyhow::Result<BridgeConfig> {
        let mut connection = settings.connection.clone();
        if let Some(host) = &self.device_host {
            connection
                .set_host(host)
                .with_context(|| format!("invalid --device-host '{host}'"))?;
        }
        if let Some(port) = self.device_port {
            connection
                .set_port(port)
                .with_context(|| format!("invalid --device-port {port}"))?;
        }
        let device_url = connection.device_url().context("invalid device address")?;

        let backend_url = match &self.backend_url {
            Some(raw) => {
                Url::parse(raw).with_context(|| format!("invalid --backend-url '{raw}'"))?
            }
            None => settings
                .backend
                .relay_url()
                .context("cannot derive backend relay URL from api_base_url")?,
        };

        let mut config = BridgeConfig::new(device_url, backend_url)?;
        config.session_cookie = settings.backend.session_cookie.clone();
        config.connect_timeout = Duration::from_secs(self.connect_timeout);
        config.reconnect_delay = self.reconnect_delay.map(Duration::from_secs);
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings_path = match cli.config {
        Some(path) => path,
        None => default_settings_path()?,
    };
    // Values are checked where they are used, after CLI overrides, so a bad
    // stored value can still be repaired or overridden.
    let mut settings = read_settings_from(&settings_path)
        .with_context(|| format!("failed to load settings from {}", settings_path.display()))?;

    // ── Logging setup ─────────────────────────────────────────────────────────
    //
    // `RUST_LOG` wins when set; otherwise the stored `log_level` applies.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .init();

    match cli.command {
        Command::Bridge(args) => {
            let config = args.into_bridge_config(&settings)?;
            info!(
                "Euphoria bridge starting — device={}, backend={}",
                config.device_url, config.backend_url
            );

            let running = Arc::new(AtomicBool::new(true));
            let running_clone = Arc::clone(&running);
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        info!("received Ctrl+C — initiating graceful shutdown");
                        running_clone.store(false, Ordering::Relaxed);
                    }
                    Err(e) => {
                        tracing::error!("failed to listen for Ctrl+C signal: {e}");
                    }
                }
            });

            run_bridge(config, running).await?;
            info!("Euphoria bridge stopped");
        }

        Command::Whoami => {
            let api = HttpSessionApi::new(settings.backend.clone())?;
            let header = resolve_header(&api, &settings.oauth).await;
            println!("{}", header.render());
        }

        Command::Login { code } => {
            let api = HttpSessionApi::new(settings.backend.clone())?;
            match log_in(&api, &code, &mut settings.backend).await {
                Ok(()) => {}
                Err(ApiError::BadCode) => anyhow::bail!("login failed: the code was rejected"),
                Err(e) => return Err(e).context("login failed"),
            }
            save_settings_to(&settings_path, &settings)?;

            let api = HttpSessionApi::new(settings.backend.clone())?;
            let header = resolve_header(&api, &settings.oauth).await;
            if !header.is_member() {
                warn!("backend issued a session cookie but reports nobody logged in");
            }
            println!("{}", header.render());
        }

        Command::Logout => {
            settings.backend.session_cookie = None;
            save_settings_to(&settings_path, &settings)?;
            println!("Logged out.");
        }

        Command::Settings(cmd) => {
            if apply_settings_command(&mut settings, &cmd)? {
                save_settings_to(&settings_path, &settings)?;
            }
            match cmd {
                SettingsCommand::TestTrigger { text } => {
                    let matcher = settings.trigger_words.compile()?;
                    match matcher.find(&text) {
                        Some(hit) => println!("triggered by '{hit}'"),
                        None => println!("no trigger"),
                    }
                }
                _ => print!("{}", render_settings(&settings)),
            }
        }
    }

    Ok(())
}

/// Applies a settings mutation in memory.
///
/// Returns `true` when something changed and the file should be saved.
fn apply_settings_command(settings: &mut Settings, cmd: &SettingsCommand) -> anyhow::Result<bool> {
    match cmd {
        SettingsCommand::Show | SettingsCommand::TestTrigger { .. } => return Ok(false),
        SettingsCommand::SetHost { host } => settings.connection.set_host(host)?,
        SettingsCommand::SetPort { port } => settings.connection.set_port(*port)?,
        SettingsCommand::SetWords { words } => {
            settings.trigger_words = TriggerWords::List {
                words: words.clone(),
            };
        }
        SettingsCommand::SetRegex { pattern } => {
            let rule = TriggerWords::Regex {
                pattern: pattern.clone(),
            };
            // Reject bad patterns before they reach the settings file.
            rule.compile()?;
            settings.trigger_words = rule;
        }
    }
    Ok(true)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn bridge_args(extra: &[&str]) -> BridgeArgs {
        let mut argv = vec!["euphoria", "bridge"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Command::Bridge(args) => args,
            other => panic!("expected bridge command, got {other:?}"),
        }
    }

    #[test]
    fn test_bridge_defaults() {
        let args = bridge_args(&[]);
        assert_eq!(args.connect_timeout, 10);
        assert!(args.reconnect_delay.is_none());
        assert!(args.device_host.is_none());
    }

    #[test]
    fn test_into_bridge_config_uses_stored_settings() {
        // Arrange
        let mut settings = Settings::default();
        settings.connection.set_port(23456).unwrap();
        settings.backend.session_cookie = Some("id=abc".to_string());

        // Act
        let config = bridge_args(&[]).into_bridge_config(&settings).unwrap();

        // Assert
        assert_eq!(config.device_url.port(), Some(23456));
        assert_eq!(config.backend_url.as_str(), "ws://localhost:4000/api/connect");
        assert_eq!(config.session_cookie.as_deref(), Some("id=abc"));
        assert!(config.reconnect_delay.is_none());
    }

    #[test]
    fn test_into_bridge_config_cli_overrides_settings() {
        let config = bridge_args(&[
            "--device-host",
            "10.0.0.5",
            "--device-port",
            "9000",
            "--backend-url",
            "wss://euphoria.example/api/connect",
            "--reconnect-delay",
            "3",
            "--connect-timeout",
            "4",
        ])
        .into_bridge_config(&Settings::default())
        .unwrap();

        assert_eq!(config.device_url.host_str(), Some("10.0.0.5"));
        assert_eq!(config.device_url.port(), Some(9000));
        assert_eq!(config.backend_url.scheme(), "wss");
        assert_eq!(config.reconnect_delay, Some(Duration::from_secs(3)));
        assert_eq!(config.connect_timeout, Duration::from_secs(4));
    }

    #[test]
    fn test_into_bridge_config_rejects_http_backend_url() {
        let result = bridge_args(&["--backend-url", "http://localhost:4000/api/connect"])
            .into_bridge_config(&Settings::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_into_bridge_config_rejects_bad_host() {
        let result = bridge_args(&["--device-host", "ws://oops"])
            .into_bridge_config(&Settings::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_device_port_zero_is_rejected() {
        let result =
            bridge_args(&["--device-port", "0"]).into_bridge_config(&Settings::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_device_port_flag_overrides_invalid_stored_port() {
        // Arrange: a settings file carrying port 0, read without validation.
        let mut settings = Settings::default();
        settings.connection.port = 0;

        // Act
        let overridden = bridge_args(&["--device-port", "4242"]).into_bridge_config(&settings);
        let stored = bridge_args(&[]).into_bridge_config(&settings);

        // Assert
        assert_eq!(overridden.unwrap().device_url.port(), Some(4242));
        assert!(stored.is_err());
    }

    #[test]
    fn test_set_port_repairs_invalid_stored_port() {
        let mut settings = Settings::default();
        settings.connection.port = 0;

        let changed =
            apply_settings_command(&mut settings, &SettingsCommand::SetPort { port: 4242 }).unwrap();

        assert!(changed);
        assert_eq!(settings.connection.port, 4242);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_set_host_rejects_host_with_port() {
        let mut settings = Settings::default();
        let cmd = SettingsCommand::SetHost {
            host: "localhost:8080".to_string(),
        };

        assert!(apply_settings_command(&mut settings, &cmd).is_err());
        assert_eq!(settings.connection.host, "localhost");
    }

    #[test]
    fn test_global_config_flag_after_subcommand() {
        let cli = Cli::parse_from(["euphoria", "whoami", "--config", "/tmp/e.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/e.toml")));
    }

    #[test]
    fn test_settings_set_words_replaces_rule() {
        let mut settings = Settings::default();
        let cmd = SettingsCommand::SetWords {
            words: vec!["treat".to_string(), "reward".to_string()],
        };

        let changed = apply_settings_command(&mut settings, &cmd).unwrap();

        assert!(changed);
        assert_eq!(
            settings.trigger_words,
            TriggerWords::List {
                words: vec!["treat".to_string(), "reward".to_string()]
            }
        );
    }

    #[test]
    fn test_settings_set_regex_rejects_bad_pattern_and_keeps_old_rule() {
        let mut settings = Settings::default();
        let cmd = SettingsCommand::SetRegex {
            pattern: "(".to_string(),
        };

        assert!(apply_settings_command(&mut settings, &cmd).is_err());
        assert_eq!(settings.trigger_words, TriggerWords::default());
    }

    #[test]
    fn test_settings_show_does_not_modify() {
        let mut settings = Settings::default();
        assert!(!apply_settings_command(&mut settings, &SettingsCommand::Show).unwrap());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_settings_set_port_parses_from_cli() {
        let cli = Cli::parse_from(["euphoria", "settings", "set-port", "4242"]);
        let Command::Settings(cmd) = cli.command else {
            panic!("expected settings command");
        };
        let mut settings = Settings::default();
        apply_settings_command(&mut settings, &cmd).unwrap();
        assert_eq!(settings.connection.port, 4242);
    }
}
