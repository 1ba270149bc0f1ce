//! Rest-expired alerts

use anyhow::Context;
use tokio::{process::Command, runtime::Handle};
use tracing::{debug, error, info};

use super::{Alert, Notifier};
use crate::state::Advisories;

/// Runs a configured command (a sound player, a vibration helper) for each
/// alert, or rings the terminal bell when no command is configured.
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    argv: Option<Vec<String>>,
    advisories: Advisories,
}

impl CommandNotifier {
    pub fn new(argv: Option<Vec<String>>, advisories: Advisories) -> Self {
        Self { argv, advisories }
    }
}

impl Notifier for CommandNotifier {
    fn alert(&self, alert: &Alert) -> anyhow::Result<()> {
        let Alert::RestExpired { exercise_item_id, set_number, .. } = alert;
        info!("Rest over before set {} of {}", set_number + 1, exercise_item_id);

        let Some(argv) = self.argv.clone().filter(|argv| !argv.is_empty()) else {
            eprint!("\x07");
            return Ok(());
        };

        let runtime = Handle::try_current().context("No runtime available to run alert command")?;
        let advisories = self.advisories.clone();
        runtime.spawn(async move {
            debug!("Running alert command {:?}", argv);
            let result = Command::new(&argv[0]).args(&argv[1..]).output().await;
            match result {
                Ok(output) if output.status.success() => {}
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    error!("Alert command failed: {}", stderr);
                    advisories.push("notification", format!("Alert command failed: {}", stderr.trim()));
                }
                Err(e) => {
                    error!("Failed to execute alert command: {}", e);
                    advisories.push("notification", format!("Failed to execute alert command: {}", e));
                }
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn alert() -> Alert {
        Alert::RestExpired {
            workout_id: "treino-a".to_string(),
            exercise_item_id: "supino-reto".to_string(),
            set_number: 1,
        }
    }

    #[test]
    fn bell_without_command() {
        let notifier = CommandNotifier::new(None, Advisories::new());
        assert!(notifier.alert(&alert()).is_ok());
    }

    #[test]
    fn command_needs_a_runtime() {
        let notifier = CommandNotifier::new(Some(vec!["true".to_string()]), Advisories::new());
        assert!(notifier.alert(&alert()).is_err());
    }

    #[tokio::test]
    async fn missing_command_becomes_an_advisory() {
        let advisories = Advisories::new();
        let notifier = CommandNotifier::new(
            Some(vec!["/nonexistent/treino-alert-binary".to_string()]),
            advisories.clone(),
        );
        assert!(notifier.alert(&alert()).is_ok());

        for _ in 0..50 {
            if !advisories.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(advisories.list()[0].component, "notification");
    }
}
