//! Logging and graceful-shutdown plumbing shared by every background ticker
//! and the orchestrator binary.

/// Initialize dual logging (terminal + timestamped file under `logs/`).
#[cfg(feature = "server")]
pub fn init_logging() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Global interrupt flag flipped by the Ctrl+C handler. Background tickers
/// poll this between iterations; the HTTP server stops accepting new
/// connections once it is set.
#[cfg(feature = "server")]
static INTERRUPTED: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(false);

#[cfg(feature = "server")]
pub fn interrupted() -> bool {
    INTERRUPTED.load(std::sync::atomic::Ordering::Relaxed)
}

/// Register the Ctrl+C handler. The first signal requests a graceful drain;
/// a second signal (or the deadline set by `shutdown_drain`) exits hard.
#[cfg(feature = "server")]
pub fn register_shutdown(drain: std::time::Duration) {
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        log::warn!("shutdown requested, draining for up to {:?}", drain);
        INTERRUPTED.store(true, std::sync::atomic::Ordering::Relaxed);
        tokio::signal::ctrl_c().await.ok();
        log::warn!("second interrupt received, exiting immediately");
        std::process::exit(130);
    });
}
