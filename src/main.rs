//! Headless walkthrough of the companion core: sign in, pair a device,
//! run a session with live adjustments, then review history and stats.
//! The clock is accelerated so a full run takes a few seconds.

use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use log::info;

use thermaflow::catalog::ProgramCatalog;
use thermaflow::copilot::{Copilot, CopilotContext};
use thermaflow::device::DeviceManager;
use thermaflow::history::{HistoryStore, TimeFilter};
use thermaflow::session::{LiveAdjustment, SessionController, SessionEvent};
use thermaflow::{auth::AuthService, content};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Thermaflow companion core starting up...");

    let auth = AuthService::new();
    let catalog = ProgramCatalog::new();
    let history = HistoryStore::new();
    let device = DeviceManager::new().with_delays(
        Duration::from_millis(600),
        Duration::from_millis(200),
    );
    // 4 ms per ticked second so the 25-minute program finishes quickly
    let session =
        SessionController::new(history.clone()).with_tick_interval(Duration::from_millis(4));

    // Sign in with the demo OTP flow
    let phone = "13800001111";
    let sent = auth.request_code(phone, Utc::now())?;
    info!("verification code sent: {} (demo)", sent.code);
    let login = auth.verify_code(phone, &sent.code, true)?;
    info!(
        "signed in as {} ({})",
        login.user.name,
        if login.new_user { "new account" } else { "welcome back" }
    );

    // Pair a device
    let devices = device.scan().await?;
    let paired = device.connect(&devices[0].id).await?;
    let status = device.status()?;
    info!(
        "{} {} ready: water {}, tank {}°C",
        paired.name,
        paired.serial_number,
        status.water_level.label(),
        status.tank_temp_c
    );

    // Relay completion events while the session runs
    let mut events = session.subscribe();
    let relay = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(SessionEvent::SessionCompleted { record }) => {
                    info!(
                        "summary: {} finished at score {} after {} min",
                        record.name, record.score, record.duration_min
                    );
                    break;
                }
                Ok(_) => {}
                Err(_) => break,
            }
        }
    });

    // Run the contrast program end to end, easing the warm-up down a notch
    let program = catalog
        .find("official-1")
        .expect("built-in catalog always has the contrast program");
    info!(
        "starting '{}' ({}, {} min)",
        program.name, program.segment_label, program.duration_min
    );
    session.start_program(&program).await?;

    tokio::time::sleep(Duration::from_millis(500)).await;
    session.adjust(LiveAdjustment::Temperature(38)).await?;
    session.pause().await?;
    tokio::time::sleep(Duration::from_millis(100)).await;
    session.resume().await?;

    relay.await?;
    history.acknowledge_completed();

    // A short manual session, stopped early
    session
        .start_manual(thermaflow::ManualPlan::default())
        .await?;
    tokio::time::sleep(Duration::from_millis(800)).await;
    let record = session.stop(false).await?;
    info!(
        "manual session ended early: {} min, score {}",
        record.duration_min, record.score
    );

    let stats = history.stats(TimeFilter::All, Utc::now());
    info!(
        "history: {} sessions, {} total minutes ({} cold / {} heat / {} pressure)",
        stats.total_sessions,
        stats.total_minutes,
        stats.cold_minutes,
        stats.heat_minutes,
        stats.pressure_minutes
    );

    // Ask the scripted helper something, the way the chat drawer would
    let mut copilot = Copilot::new();
    let ctx = CopilotContext {
        temperature: Some(10),
        ..CopilotContext::default()
    };
    let reply = copilot.ask(&ctx, "How do I start a session?").await?;
    info!("copilot: {}", reply.content.lines().next().unwrap_or(""));

    for article in content::articles_in(None) {
        info!(
            "learn: {} ({} min read, {})",
            article.title,
            article.read_time_min,
            article.category.label()
        );
    }

    device.disconnect();
    info!("walkthrough complete");
    Ok(())
}
