//! Duel: a two-player arena run through one full lifecycle.
//!
//! There is no real game world here. The host just logs what the engine
//! asks it to do, so `RUST_LOG=debug cargo run -p duel` shows every step:
//! lobby, countdown, a rejected third player, the game, and the reset.

use std::sync::Arc;
use std::time::Duration;

use arenakit::prelude::*;
use arenakit::{ArenaView, Rejection, Value};
use tokio::time::sleep;
use tracing::info;

/// A host that only logs.
struct LoggingHost;

impl Host for LoggingHost {
    fn send_message(&self, participant: &ParticipantId, text: &str) {
        info!(%participant, text, "message");
    }

    fn disconnect(&self, participant: &ParticipantId, reason: &str) {
        info!(%participant, reason, "disconnect");
    }

    fn relocate(&self, participant: &ParticipantId, location: &Location) {
        info!(%participant, %location, "relocate");
    }

    fn set_spectator(&self, participant: &ParticipantId, spectating: bool) {
        info!(%participant, spectating, "spectator");
    }
}

fn duel_data() -> ArenaData {
    let mut data = ArenaData::with_options(
        "Duel",
        ArenaOptions::default().with_limits(2, 2).with_countdown(5),
    );
    data.set_lobby_spawn(Some(Location::new("lobby", 0.5, 70.0, 0.5)));
    data.add_spawn("red", Location::new("duel", 12.5, 64.0, 0.5));
    data.add_spawn("blue", Location::new("duel", -11.5, 64.0, 0.5));
    data.set_variable("best_of", 3);
    data
}

#[tokio::main]
async fn main() -> Result<(), ArenakitError> {
    arenakit::telemetry::init("info")?;

    let store = JsonDirStore::new(std::env::temp_dir().join("arenakit-duel"));
    let registry = ArenaRegistry::new();
    let host: Arc<dyn Host> = Arc::new(LoggingHost);

    let data = match store.load("duel").await? {
        Some(stored) => stored,
        None => duel_data(),
    };
    let duel = registry.spawn(Arena::from_data(data, host))?;

    duel.subscribe(|view: &ArenaView<'_>, event: &ArenaEvent| {
        info!(arena = view.name, phase = %view.phase, ?event, "event");
    })
    .await?;

    duel.register_hook(PhaseId::GAME_PLAYING, |ctx| {
        let moved = ctx.disperse();
        let best_of = match ctx.data().get_variable("best_of", arenakit::ValueKind::Int) {
            Some(Value::Int(n)) => *n,
            _ => 1,
        };
        ctx.broadcast(&format!("Fight! Best of {best_of}."));
        info!(moved, "players sent to spawns");
    })
    .await?;

    registry.participant_connected(&ParticipantId::from("alice")).await;
    registry.participant_connected(&ParticipantId::from("bob")).await;

    match duel.join("carol").await? {
        JoinOutcome::Rejected(Rejection::LobbyFull) => info!("carol was turned away"),
        other => info!(?other, "unexpected join outcome"),
    }

    while duel.phase().await? != PhaseId::GAME_PLAYING {
        sleep(Duration::from_millis(250)).await;
    }

    sleep(Duration::from_secs(2)).await;
    duel.transition(PhaseId::GAME_OVER).await?;

    while duel.phase().await? != PhaseId::LOBBY_WAITING {
        sleep(Duration::from_millis(250)).await;
    }

    store.save(&duel.data().await?).await?;
    info!(dir = %store.dir().display(), "arena saved");

    registry.shutdown_all().await;
    Ok(())
}
