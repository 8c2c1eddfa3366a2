use anyhow::Context;
use sensorlab::{
    init_logging, run_display, EventBus, EventFilter, Page, SettingsManager, ShellApp, StatusBar,
    UserIntent, BUILD_DATE, SPLASH_DURATION, VERSION,
};
use sensorlab_core::shared;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const DEFAULT_RUN_SECS: u64 = 5;

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let run_secs = std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<u64>())
        .transpose()
        .context("run length must be a whole number of seconds")?
        .unwrap_or(DEFAULT_RUN_SECS);

    info!("SensorLab {} (built {})", VERSION, BUILD_DATE);

    let store = SettingsManager::open_store().context("failed to open settings")?;
    let bus = Arc::new(EventBus::new());
    bus.subscribe(EventFilter::All, |event| {
        debug!(category = %event.category(), "{}", event.description());
    });

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(ShellApp::new(shared(store), bus), Duration::from_secs(run_secs)))
}

async fn run(mut shell: ShellApp, run_length: Duration) -> anyhow::Result<()> {
    if shell.page() == Page::Splash {
        tokio::time::sleep(SPLASH_DURATION).await;
        shell.handle(UserIntent::SplashFinished)?;
    }
    shell.handle(UserIntent::RequestStart)?;

    let run_length = shell
        .metadata()
        .duration
        .as_duration()
        .map_or(run_length, |limit| limit.min(run_length));
    let logging = shell.metadata().logging;
    let started = Instant::now();
    let mut last_report = 0;

    let ticks = run_display(shell.display(), tokio::time::sleep(run_length), |display| {
        let secs = started.elapsed().as_secs();
        if secs != last_report {
            last_report = secs;
            let status = StatusBar::new("Running", started.elapsed(), display.rate_hz(), logging);
            info!("{}", status);
        }
    })
    .await?;

    info!(ticks, "{}", shell.status_bar());
    Ok(())
}
