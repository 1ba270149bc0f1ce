//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "treino-timer")]
#[command(about = "A workout session timer service with rest countdowns and set tracking")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// File that completed sets and finished workouts are appended to (JSON lines)
    #[arg(short, long, default_value = "treino-journal.jsonl")]
    pub journal: PathBuf,

    /// JSON file with workout definitions; built-in samples are used when omitted
    #[arg(short, long)]
    pub workouts: Option<PathBuf>,

    /// Command run when a rest interval expires, e.g. "paplay /usr/share/sounds/bell.oga"
    #[arg(long)]
    pub alert_command: Option<String>,

    /// Seconds between wall-clock reconciliations while the tick clock is unavailable
    #[arg(long, default_value = "5")]
    pub reconcile_interval: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn reconcile_every(&self) -> Duration {
        Duration::from_secs(self.reconcile_interval.max(1))
    }

    /// Split the alert command into program and arguments
    pub fn alert_argv(&self) -> Option<Vec<String>> {
        let argv: Vec<String> = self
            .alert_command
            .as_deref()?
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if argv.is_empty() { None } else { Some(argv) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse() {
        let config = Config::try_parse_from(["treino-timer"]).unwrap();
        assert_eq!(config.port, 20554);
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.log_level(), "info");
        assert!(config.alert_argv().is_none());
        assert_eq!(config.reconcile_every(), Duration::from_secs(5));
    }

    #[test]
    fn alert_command_is_split_into_argv() {
        let config = Config::try_parse_from([
            "treino-timer",
            "--alert-command",
            "paplay  /tmp/bell.oga",
            "-v",
        ])
        .unwrap();
        assert_eq!(
            config.alert_argv(),
            Some(vec!["paplay".to_string(), "/tmp/bell.oga".to_string()])
        );
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn blank_alert_command_is_ignored() {
        let config = Config::try_parse_from(["treino-timer", "--alert-command", "   "]).unwrap();
        assert!(config.alert_argv().is_none());
    }
}
