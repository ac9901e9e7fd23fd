//! Acceleration Pipeline Daemon - Main Entry Point

use accel_daemon::simulate::SimulatedSensor;
use accel_daemon::{drive, init_logging, run_reader, Settings};
use accel_pipeline::{ConsumerId, Mailboxes, MonotonicClock, Pipeline};
use anyhow::{anyhow, Context};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args().nth(1).map(PathBuf::from);
    let settings = Settings::load(path.as_deref()).context("loading settings")?;
    init_logging(settings.level())?;

    info!("=== Acceleration Pipeline v{} ===", env!("CARGO_PKG_VERSION"));

    let pipeline = Pipeline::from_config(&settings.pipeline)?;
    let mailboxes = Arc::new(Mailboxes::new(settings.pipeline.mailbox_depth));
    let sensor = SimulatedSensor::new(pipeline.clone(), settings.simulation.interrupt_hz);
    let producer = pipeline.producer(
        sensor.control(),
        MonotonicClock::new(),
        Arc::clone(&mailboxes),
    )?;

    let ids: Vec<ConsumerId> = (0..settings.simulation.readers).map(ConsumerId).collect();
    let mut readers = Vec::with_capacity(ids.len());
    for id in &ids {
        pipeline.register_reader(*id)?;
        let inbox = mailboxes.open(*id);
        readers.push((*id, tokio::spawn(run_reader(pipeline.clone(), *id, inbox))));
    }

    let stop = Arc::new(AtomicBool::new(false));
    let period = Duration::from_secs(1) / settings.simulation.interrupt_hz;
    let interrupt_loop = {
        let stop = Arc::clone(&stop);
        std::thread::Builder::new()
            .name("accel-irq".to_string())
            .spawn(move || drive(producer, sensor, period, stop))
            .context("spawning interrupt thread")?
    };

    info!(
        "Running for {} s with {} readers at {} Hz output",
        settings.simulation.duration_secs,
        ids.len(),
        pipeline.sample_rate()
    );
    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(settings.simulation.duration_secs)) => {}
        _ = tokio::signal::ctrl_c() => info!("Interrupted, shutting down"),
    }

    stop.store(true, Ordering::Release);
    let stats = tokio::task::spawn_blocking(move || interrupt_loop.join())
        .await?
        .map_err(|_| anyhow!("interrupt thread panicked"))?;
    info!(
        "Interrupts: {}, stored: {}, dropped: {}, vetoed: {}",
        stats.interrupts, stats.stored, stats.dropped, stats.vetoed
    );

    for id in &ids {
        pipeline.deregister_reader(*id);
        mailboxes.close(*id);
    }
    for (id, reader) in readers {
        let reader_stats = reader.await?;
        info!(
            "{}: {} samples over {} wakeups",
            id, reader_stats.samples, reader_stats.wakeups
        );
    }

    info!(
        "Final mode {:?}, range {}, effective sample ratio {:.1}",
        pipeline.mode(),
        pipeline.range(),
        pipeline.effective_sample_ratio()
    );
    pipeline.teardown();

    Ok(())
}
