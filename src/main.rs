//! Headless driver: load a catalog group, tick the scene, print telemetry

use std::sync::Arc;
use std::thread;

use anyhow::{bail, Context, Result};
use clap::Parser;

use orbitview::config::Config;
use orbitview::data::{CatalogCacheManager, HttpCatalogSource};
use orbitview::propagation::SatkitPropagator;
use orbitview::renderer::{Camera, HeadlessScene};
use orbitview::scene::{
    ClockMode, SceneContext, SceneSynchronizer, SelectionController, SelectionMode,
    SimulatedClock,
};
use orbitview::{Session, SessionEvent};

fn report(event: &SessionEvent) -> Result<()> {
    match event {
        SessionEvent::GroupLoaded {
            id,
            objects,
            skipped,
        } => {
            log::info!("Group '{}' ready: {} objects ({} skipped)", id, objects, skipped);
            Ok(())
        }
        SessionEvent::GroupLoadFailed { id, error } => {
            bail!("could not load group '{}': {}", id, error)
        }
        SessionEvent::FetchDiscarded { id } => {
            log::debug!("Ignored late response for '{}'", id);
            Ok(())
        }
    }
}

fn print_status(session: &mut Session<HeadlessScene>) {
    let scene = session.scene();
    let renderer = scene.context().renderer();
    println!(
        "{}  {:?}  {} objects, {} visible, {} trails",
        session.clock().format_time(),
        scene.frame(),
        scene.objects().len(),
        renderer.visible_markers(),
        renderer.polyline_count()
    );
    for telemetry in session.telemetry_for_selected() {
        println!("  {}", telemetry);
    }
}

fn main() -> Result<()> {
    let config = Config::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    log::info!("Starting orbitview...");

    let groups = config.groups().context("loading catalog groups")?;
    let clock = match config.start_instant()? {
        Some(at) => SimulatedClock::scrubbed(at),
        None => SimulatedClock::realtime(),
    };

    let viewport = config.viewport;
    let scene = HeadlessScene::new(Camera::default(), viewport.aspect_ratio());
    let synchronizer = SceneSynchronizer::new(
        Arc::new(SatkitPropagator),
        SceneContext::new(scene, viewport),
        config.frame,
    );
    let source = Arc::new(HttpCatalogSource::new(
        config.relay_url.clone(),
        config.fetch_timeout(),
    ));
    let mut session = Session::new(
        CatalogCacheManager::new(groups),
        source,
        synchronizer,
        SelectionController::new(config.selection),
        clock,
    );

    if let Some(event) = session.select_group(&config.group)? {
        report(&event)?;
    }
    for event in session.wait_for_group(config.fetch_timeout()) {
        report(&event)?;
    }
    if session.active_group().is_none() {
        bail!("group '{}' did not load", config.group);
    }

    if let Some(query) = &config.select {
        let hits = session.search(query);
        if hits.is_empty() {
            log::warn!("No objects match '{}'", query);
        }
        let limit = match session.selection().mode() {
            SelectionMode::Single => 1,
            SelectionMode::Multiple => hits.len(),
        };
        for id in hits.into_iter().take(limit) {
            session.toggle_selection(id);
        }
    }

    for _ in 0..config.ticks {
        for event in session.pump() {
            report(&event)?;
        }
        session.on_timer();
        print_status(&mut session);

        if session.clock().mode() == ClockMode::Scrubbed {
            log::info!("Clock pinned to {}, nothing to advance", session.clock().format_time());
            break;
        }
        thread::sleep(config.tick_interval());
    }

    Ok(())
}
