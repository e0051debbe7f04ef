use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use aria::config::CoreConfig;
use aria::exec::chat::LlamaChat;
use aria::exec::dispatcher::Dispatcher;
use aria::exec::notes::FileNoteStore;
use aria::exec::system::DesktopAutomation;
use aria::exec::tasks::FileTaskStore;
use aria::exec::timers::SleepTimer;
use aria::exec::weather::WttrWeather;
use aria::kernel::types::{PendingAction, Utterance};
use aria::Resolver;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    info!("Aria booting...");

    let config = match std::env::args().nth(1) {
        Some(path) => CoreConfig::load(&PathBuf::from(path))?,
        None => CoreConfig::default(),
    };

    // Timer reminders arrive on this channel whenever a timer elapses.
    let (reminder_tx, mut reminder_rx) = mpsc::channel::<String>(16);

    let dispatcher = Dispatcher::new(
        Arc::new(DesktopAutomation::new()),
        Arc::new(FileTaskStore::load(config.tasks_path())),
        Arc::new(FileNoteStore::load(config.notes_path())),
        Arc::new(SleepTimer::new(reminder_tx)),
        Arc::new(WttrWeather::new(config.default_location.clone())),
        Arc::new(LlamaChat::new(config.chat_endpoint.clone())),
        (&config.timeouts).into(),
    );
    let resolver = Resolver::new(&config, dispatcher);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending: Option<PendingAction> = None;
    let mut voice: Option<Child> = None;

    info!(mode = ?config.security_mode, "ready");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line? {
                    Some(line) => line.trim().to_string(),
                    None => break,
                };
                if line.is_empty() {
                    continue;
                }
                if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
                    break;
                }

                let now = chrono::Local::now().naive_local();
                let result = if let Some(token) = pending.take() {
                    match yes_or_no(&line) {
                        Some(approve) => resolver.confirm(&token, approve).await,
                        None => {
                            // Anything other than yes/no abandons the held
                            // action and is treated as a fresh utterance.
                            resolver
                                .resolve(&Utterance::new(line.as_str()), now, config.security_mode)
                                .await
                        }
                    }
                } else {
                    resolver
                        .resolve(&Utterance::new(line.as_str()), now, config.security_mode)
                        .await
                };

                match result {
                    Ok(result) => {
                        pending = result.pending.clone();
                        speak(&mut voice, &result.spoken_text).await;
                    }
                    Err(e) => {
                        error!("resolution failed: {}", e);
                        speak(&mut voice, "Sorry, something went wrong on my end.").await;
                    }
                }
            }
            Some(reminder) = reminder_rx.recv() => {
                speak(&mut voice, &reminder).await;
            }
        }
    }

    info!("Aria shutting down");
    Ok(())
}

fn yes_or_no(line: &str) -> Option<bool> {
    match line.to_lowercase().as_str() {
        "yes" | "y" | "yes please" | "go ahead" | "do it" => Some(true),
        "no" | "n" | "no thanks" | "stop" | "cancel" => Some(false),
        _ => None,
    }
}

/// Print the reply and speak it through the system voice. A new reply cuts
/// off any speech still in flight.
async fn speak(voice: &mut Option<Child>, text: &str) {
    println!("aria: {}", text);

    if let Some(mut old) = voice.take() {
        let _ = old.kill().await;
    }
    match Command::new("say").arg(text).kill_on_drop(true).spawn() {
        Ok(child) => *voice = Some(child),
        Err(e) => warn!("speech output unavailable: {}", e),
    }
}
