//! Daemon for RestMode.
//!
//! This module wires the scheduler to the real world:
//! - Drives the scheduler on a 1-second tokio interval
//! - Serves schedule commands over the IPC socket
//! - Applies settings changes from the store's watch channel
//! - Cancels timers and notifications on shutdown

pub mod ipc;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::idle::SystemIdleSource;
use crate::notification::{BreakNotifier, LogNotifier};
use crate::scheduler::{RestScheduler, ScheduleEvent, SystemClock};
use crate::settings::SettingsStore;
use crate::sound::{CuePlayer, RodioCuePlayer, SilentCuePlayer};

use self::ipc::{IpcServer, RequestHandler};

/// Runs the daemon until a termination signal arrives.
///
/// # Errors
///
/// Returns an error if the settings cannot be loaded or the IPC socket
/// cannot be bound. Collaborator failures after startup (no audio device,
/// denied notification permission) degrade to log output instead.
pub async fn run() -> Result<()> {
    let store = Arc::new(SettingsStore::open()?);
    let settings = store.current();
    let mut settings_rx = store.subscribe();

    let notifier = build_notifier().await;
    let cues = build_cue_player();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let started = Arc::new(AtomicBool::new(settings.start_timer_on_launch));
    if !settings.start_timer_on_launch {
        info!("スケジュールは最初のコマンドまで待機します");
    }

    let scheduler = Arc::new(Mutex::new(RestScheduler::new(
        settings,
        Arc::new(SystemClock::new()),
        Arc::new(SystemIdleSource::new()),
        notifier,
        cues,
        event_tx,
    )));

    // IPC accept loop
    let socket_path = ipc::default_socket_path()?;
    let server = IpcServer::new(&socket_path)?;
    info!("IPCソケットを待ち受けています: {:?}", socket_path);

    let handler = Arc::new(RequestHandler::new(
        scheduler.clone(),
        store.clone(),
        started.clone(),
    ));
    let ipc_task = tokio::spawn(async move {
        loop {
            match server.accept().await {
                Ok(mut stream) => {
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        match IpcServer::receive_request(&mut stream).await {
                            Ok(request) => {
                                let response = handler.handle(request).await;
                                if let Err(e) =
                                    IpcServer::send_response(&mut stream, &response).await
                                {
                                    warn!("レスポンスを送信できませんでした: {}", e);
                                }
                            }
                            Err(e) => warn!("リクエストの読み取りに失敗しました: {}", e),
                        }
                    });
                }
                Err(e) => warn!("接続の受け付けに失敗しました: {}", e),
            }
        }
    });

    // Event log
    let event_task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            log_event(&event);
        }
    });

    // Tick / settings / shutdown loop
    let mut ticker = interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if started.load(Ordering::SeqCst) {
                    scheduler.lock().await.tick();
                }
            }
            changed = settings_rx.changed() => {
                if changed.is_ok() {
                    let new_settings = settings_rx.borrow_and_update().clone();
                    scheduler.lock().await.apply_settings(new_settings);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("終了シグナルを受信しました");
                break;
            }
        }
    }

    scheduler.lock().await.cleanup();
    ipc_task.abort();
    event_task.abort();

    Ok(())
}

/// Builds the notification dispatcher.
///
/// On macOS this requests authorization from the notification center; a
/// denied or failed request degrades to log-only notifications.
async fn build_notifier() -> Arc<dyn BreakNotifier> {
    #[cfg(target_os = "macos")]
    {
        use crate::notification::UserNotificationCenter;

        match UserNotificationCenter::authorize().await {
            Ok(center) => return Arc::new(center),
            Err(e) => {
                warn!("⚠️  {}", e);
                info!("{}", e.suggestion());
            }
        }
    }
    Arc::new(LogNotifier::new())
}

/// Builds the sound cue player, degrading to silence without audio.
fn build_cue_player() -> Arc<dyn CuePlayer> {
    match RodioCuePlayer::new() {
        Ok(player) => Arc::new(player),
        Err(e) => {
            warn!("⚠️  サウンドを初期化できませんでした: {}", e);
            Arc::new(SilentCuePlayer)
        }
    }
}

/// Writes one log line per scheduler event.
fn log_event(event: &ScheduleEvent) {
    match event {
        // Once a second; keep it out of normal logs
        ScheduleEvent::Tick { .. } => {}
        ScheduleEvent::CountdownStarted { kind, seconds } => {
            debug!("countdown started: {} break in {}s", kind.as_str(), seconds);
        }
        ScheduleEvent::BreakStarted { kind, seconds } => {
            info!("break started: {} ({}s)", kind.as_str(), seconds);
        }
        ScheduleEvent::BreakCompleted { kind } => {
            info!("break completed: {}", kind.as_str());
        }
        ScheduleEvent::BreakPostponed { minutes } => {
            info!("break postponed by {} minutes", minutes);
        }
        ScheduleEvent::BreakSkipped => info!("break skipped"),
        ScheduleEvent::WorkExtended { minutes } => {
            info!("work extended by {} minutes", minutes);
        }
        ScheduleEvent::IdlePaused { idle_seconds } => {
            info!("idle pause ({:.0}s idle)", idle_seconds);
        }
        ScheduleEvent::IdleResumed => info!("idle ended, schedule resumed"),
        ScheduleEvent::IdleReset => info!("long idle, work interval reset"),
        ScheduleEvent::ShutDown => debug!("scheduler shut down"),
    }
}
