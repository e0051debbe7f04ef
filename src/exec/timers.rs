use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::collaborators::{ActionOutcome, CollabResult, TimerService};

/// In-process timers. `set_timer` acknowledges immediately; a spawned task
/// sleeps out the duration and pushes the reminder text onto the channel the
/// driver listens on. Timers do not survive a restart.
pub struct SleepTimer {
    reminders: mpsc::Sender<String>,
}

impl SleepTimer {
    pub fn new(reminders: mpsc::Sender<String>) -> Self {
        Self { reminders }
    }
}

#[async_trait]
impl TimerService for SleepTimer {
    async fn set_timer(&self, duration: Duration) -> CollabResult {
        let spoken = format!("Timer set for {}.", speak_duration(duration));
        debug!(secs = duration.as_secs(), "timer armed");

        let reminders = self.reminders.clone();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let message = format!("Your {} timer is up.", speak_duration(duration));
            if reminders.send(message).await.is_err() {
                warn!("timer fired but the reminder channel is closed");
            }
        });

        Ok(ActionOutcome::ok(spoken))
    }
}

fn speak_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 && secs % 3600 == 0 {
        let hours = secs / 3600;
        format!("{} hour{}", hours, if hours == 1 { "" } else { "s" })
    } else if secs >= 60 && secs % 60 == 0 {
        let minutes = secs / 60;
        format!("{} minute{}", minutes, if minutes == 1 { "" } else { "s" })
    } else {
        format!("{} second{}", secs, if secs == 1 { "" } else { "s" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_are_spoken_in_natural_units() {
        assert_eq!(speak_duration(Duration::from_secs(45)), "45 seconds");
        assert_eq!(speak_duration(Duration::from_secs(60)), "1 minute");
        assert_eq!(speak_duration(Duration::from_secs(600)), "10 minutes");
        assert_eq!(speak_duration(Duration::from_secs(7200)), "2 hours");
        assert_eq!(speak_duration(Duration::from_secs(90)), "90 seconds");
    }
}
