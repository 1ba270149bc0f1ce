//! Treino Timer - a workout session timer service
//! 
//! This is the main entry point for the treino-timer application.

use std::sync::Arc;
use tokio::{net::TcpListener, sync::mpsc};
use tracing::info;

use treino_timer::{
    clock::{IntervalClock, SystemWallClock},
    config::Config,
    controller::{Collaborators, SessionController},
    services::{CommandNotifier, Journal, WorkoutLibrary},
    state::{Advisories, AppState},
    api::create_router,
    tasks::{journal_writer_task, tick_pump_task, wall_clock_reconcile_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("treino_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting treino-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, journal={}",
          config.host, config.port, config.journal.display());

    let library = match &config.workouts {
        Some(path) => WorkoutLibrary::load(path)?,
        None => {
            info!("No workouts file given, using built-in workouts");
            WorkoutLibrary::builtin()
        }
    };

    let advisories = Advisories::new();

    // Journal writer persists completed sets and workouts off the command path
    let (journal, journal_rx) = Journal::channel();
    tokio::spawn(journal_writer_task(config.journal.clone(), journal_rx, advisories.clone()));
    let journal = Arc::new(journal);

    let collaborators = Collaborators {
        recorder: journal.clone(),
        finalizer: journal,
        notifier: Arc::new(CommandNotifier::new(config.alert_argv(), advisories.clone())),
    };

    let (tick_tx, tick_rx) = mpsc::unbounded_channel();
    let controller = SessionController::new(
        Box::new(IntervalClock::new()),
        Arc::new(SystemWallClock),
        tick_tx,
        collaborators,
        advisories.clone(),
    );

    // Create application state
    let state = Arc::new(AppState::new(
        controller,
        Arc::new(library),
        advisories,
        config.port,
        config.host.clone(),
    ));

    // Start background tasks
    tokio::spawn(tick_pump_task(Arc::clone(&state), tick_rx));
    tokio::spawn(wall_clock_reconcile_task(Arc::clone(&state), config.reconcile_every()));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;
    
    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /session/begin          - Start a workout session");
    info!("  POST /session/pause|resume   - Pause or resume the workout clock");
    info!("  POST /session/complete-set   - Record a set and start resting");
    info!("  POST /session/extend-rest    - Add time to the rest countdown");
    info!("  POST /session/skip-rest      - End the rest, next set");
    info!("  POST /session/next-exercise  - Next exercise, or finish the workout");
    info!("  POST /session/abandon        - Discard the session");
    info!("  POST /session/foreground     - Reconcile after the app was backgrounded");
    info!("  GET  /session                - Current session");
    info!("  GET  /workouts               - Workout library");
    info!("  GET  /status                 - Service status and advisories");
    info!("  GET  /health                 - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);
    
    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    state.teardown();
    info!("Server shutdown complete");
    Ok(())
}
