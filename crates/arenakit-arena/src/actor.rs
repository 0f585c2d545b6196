//! Arena actor: an arena running on its own Tokio task.
//!
//! The task owns the [`Arena`] and is the only thing that touches it. Joins,
//! leaves and transitions arrive over an mpsc channel; countdown ticks and
//! the game over delay are futures in the same `select!` loop. Everything an
//! arena does is therefore applied one step at a time, which is what keeps
//! concurrent joins from overfilling a lobby and a cancelled countdown from
//! firing late.

use std::sync::Arc;

use arenakit_types::{Location, ParticipantId, PhaseId, Value, ValueKind, VariableType};
use tokio::sync::{mpsc, oneshot};

use crate::{
    Arena, ArenaData, ArenaError, ArenaEvent, ArenaInfo, ArenaOptions, ArenaView, JoinOutcome,
    LobbyAction, ObserverId, PhaseContext, hook, observer,
};

/// Bounded command channel size per arena.
pub const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Work run against the arena on its task.
type Job = Box<dyn FnOnce(&mut Arena) + Send>;

/// Commands sent to an arena actor through its channel.
pub(crate) enum ArenaCommand {
    Join {
        participant: ParticipantId,
        reply: oneshot::Sender<JoinOutcome>,
    },

    Leave {
        participant: ParticipantId,
        reply: oneshot::Sender<bool>,
    },

    Transition {
        target: PhaseId,
        reply: oneshot::Sender<bool>,
    },

    /// A participant connected to the host. Becomes a join when the arena
    /// auto-triggers on membership.
    Connected(ParticipantId),

    /// A participant disconnected from the host. Becomes a leave when the
    /// arena auto-triggers on membership.
    Disconnected(ParticipantId),

    /// Run arbitrary work on the arena's task.
    Exec(Job),

    Shutdown,
}

/// Handle to a running arena. Cheap to clone.
///
/// Every method fails with [`ArenaError::Unavailable`] once the arena's task
/// has stopped.
#[derive(Clone)]
pub struct ArenaHandle {
    name: Arc<str>,
    sender: mpsc::Sender<ArenaCommand>,
}

impl ArenaHandle {
    /// Spawns `arena` on a new task. Must be called inside a Tokio runtime.
    pub fn spawn(arena: Arena) -> Self {
        spawn_arena(arena, DEFAULT_CHANNEL_SIZE)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the arena's task has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    fn unavailable(&self) -> ArenaError {
        ArenaError::Unavailable(self.name.to_string())
    }

    async fn request<R>(
        &self,
        command: ArenaCommand,
        reply_rx: oneshot::Receiver<R>,
    ) -> Result<R, ArenaError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// See [`Arena::join`].
    pub async fn join(
        &self,
        participant: impl Into<ParticipantId>,
    ) -> Result<JoinOutcome, ArenaError> {
        let (reply, reply_rx) = oneshot::channel();
        let participant = participant.into();
        self.request(ArenaCommand::Join { participant, reply }, reply_rx)
            .await
    }

    /// See [`Arena::leave`].
    pub async fn leave(
        &self,
        participant: impl Into<ParticipantId>,
    ) -> Result<bool, ArenaError> {
        let (reply, reply_rx) = oneshot::channel();
        let participant = participant.into();
        self.request(ArenaCommand::Leave { participant, reply }, reply_rx)
            .await
    }

    /// See [`Arena::transition`].
    pub async fn transition(&self, target: PhaseId) -> Result<bool, ArenaError> {
        let (reply, reply_rx) = oneshot::channel();
        self.request(ArenaCommand::Transition { target, reply }, reply_rx)
            .await
    }

    /// Forwards a host connect event (fire-and-forget).
    pub(crate) async fn connected(&self, participant: ParticipantId) -> Result<(), ArenaError> {
        self.sender
            .send(ArenaCommand::Connected(participant))
            .await
            .map_err(|_| self.unavailable())
    }

    /// Forwards a host disconnect event (fire-and-forget).
    pub(crate) async fn disconnected(&self, participant: ParticipantId) -> Result<(), ArenaError> {
        self.sender
            .send(ArenaCommand::Disconnected(participant))
            .await
            .map_err(|_| self.unavailable())
    }

    /// Runs `f` on the arena's task and returns its result.
    ///
    /// `f` runs between other commands and ticks, so it sees and leaves the
    /// arena in a consistent state. It must not block.
    pub async fn with<R, F>(&self, f: F) -> Result<R, ArenaError>
    where
        F: FnOnce(&mut Arena) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply, reply_rx) = oneshot::channel();
        let job: Job = Box::new(move |arena| {
            let _ = reply.send(f(arena));
        });
        self.request(ArenaCommand::Exec(job), reply_rx).await
    }

    pub async fn phase(&self) -> Result<PhaseId, ArenaError> {
        self.with(|arena| arena.phase().clone()).await
    }

    pub async fn info(&self) -> Result<ArenaInfo, ArenaError> {
        self.with(|arena| arena.info()).await
    }

    pub async fn participants(&self) -> Result<Vec<ParticipantId>, ArenaError> {
        self.with(|arena| arena.roster().to_vec()).await
    }

    pub async fn register_state(&self, id: PhaseId) -> Result<bool, ArenaError> {
        self.with(move |arena| arena.register_state(id)).await
    }

    pub async fn remove_state(&self, id: PhaseId) -> Result<bool, ArenaError> {
        self.with(move |arena| arena.remove_state(&id)).await
    }

    pub async fn has_state(&self, id: PhaseId) -> Result<bool, ArenaError> {
        self.with(move |arena| arena.has_state(&id)).await
    }

    pub async fn states(&self) -> Result<Vec<PhaseId>, ArenaError> {
        self.with(|arena| arena.states()).await
    }

    /// Binds a hook to `id`. See [`Arena::register_hook`].
    pub async fn register_hook<F>(&self, id: PhaseId, f: F) -> Result<bool, ArenaError>
    where
        F: FnMut(&mut PhaseContext<'_>) + Send + 'static,
    {
        let hook = hook(f);
        self.with(move |arena| arena.register_hook(id, hook)).await
    }

    pub async fn remove_hook(&self, id: PhaseId) -> Result<bool, ArenaError> {
        self.with(move |arena| arena.remove_hook(&id)).await
    }

    pub async fn has_hook(&self, id: PhaseId) -> Result<bool, ArenaError> {
        self.with(move |arena| arena.has_hook(&id)).await
    }

    pub async fn subscribe<F>(&self, f: F) -> Result<ObserverId, ArenaError>
    where
        F: Fn(&ArenaView<'_>, &ArenaEvent) + Send + 'static,
    {
        let observer = observer(f);
        self.with(move |arena| arena.subscribe(observer)).await
    }

    pub async fn unsubscribe(&self, id: ObserverId) -> Result<bool, ArenaError> {
        self.with(move |arena| arena.unsubscribe(id)).await
    }

    pub async fn set_variable(
        &self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), ArenaError> {
        let (key, value) = (key.into(), value.into());
        self.with(move |arena| arena.set_variable(key, value)).await
    }

    pub async fn get_variable(
        &self,
        key: impl Into<String>,
        kind: ValueKind,
    ) -> Result<Option<Value>, ArenaError> {
        let key = key.into();
        self.with(move |arena| arena.get_variable(&key, kind).cloned())
            .await
    }

    pub async fn get<T>(&self, key: impl Into<String>) -> Result<Option<T>, ArenaError>
    where
        T: VariableType + Send + 'static,
    {
        let key = key.into();
        self.with(move |arena| arena.get::<T>(&key)).await
    }

    pub async fn set_location(
        &self,
        key: impl Into<String>,
        location: Location,
    ) -> Result<(), ArenaError> {
        let key = key.into();
        self.with(move |arena| arena.set_location(key, location)).await
    }

    pub async fn get_location(
        &self,
        key: impl Into<String>,
    ) -> Result<Option<Location>, ArenaError> {
        let key = key.into();
        self.with(move |arena| arena.get_location(&key).cloned())
            .await
    }

    /// A copy of the arena's persistent data.
    pub async fn data(&self) -> Result<ArenaData, ArenaError> {
        self.with(|arena| arena.data().clone()).await
    }

    /// See [`Arena::override_data`].
    pub async fn override_data(&self, data: ArenaData) -> Result<(), ArenaError> {
        self.with(move |arena| arena.override_data(data)).await
    }

    pub async fn set_options(&self, options: ArenaOptions) -> Result<(), ArenaError> {
        self.with(move |arena| arena.set_options(options)).await
    }

    /// See [`Arena::permits`].
    pub async fn permits(&self, action: LobbyAction) -> Result<bool, ArenaError> {
        self.with(move |arena| arena.permits(action)).await
    }

    /// See [`Arena::disperse`].
    pub async fn disperse(&self) -> Result<usize, ArenaError> {
        self.with(|arena| arena.disperse()).await
    }

    /// Stops the arena's task. A running countdown and any pending cleanup
    /// are dropped; the roster is left as is.
    pub async fn shutdown(&self) -> Result<(), ArenaError> {
        self.sender
            .send(ArenaCommand::Shutdown)
            .await
            .map_err(|_| self.unavailable())
    }
}

impl std::fmt::Debug for ArenaHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArenaHandle")
            .field("name", &self.name)
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

/// The task side of an [`ArenaHandle`].
struct ArenaActor {
    arena: Arena,
    receiver: mpsc::Receiver<ArenaCommand>,
}

impl ArenaActor {
    /// Serves commands and timers until shutdown or until every handle is
    /// dropped.
    async fn run(mut self) {
        tracing::info!(arena = %self.arena.name(), "arena actor started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(ArenaCommand::Shutdown) | None => break,
                    Some(cmd) => self.handle(cmd),
                },
                tick = self.arena.countdown.wait_for_tick() => {
                    self.arena.on_countdown_tick(tick);
                }
                _ = self.arena.cleanup.wait() => {
                    self.arena.on_cleanup_due();
                }
            }
        }

        self.arena.countdown.cancel();
        self.arena.cleanup.disarm();
        let metrics = self.arena.countdown.metrics();
        tracing::info!(
            arena = %self.arena.name(),
            countdowns_started = metrics.started,
            countdowns_finished = metrics.finished,
            countdowns_cancelled = metrics.cancelled,
            stale_ticks = metrics.stale_ticks,
            "arena actor stopped"
        );
    }

    fn handle(&mut self, cmd: ArenaCommand) {
        match cmd {
            ArenaCommand::Join { participant, reply } => {
                let _ = reply.send(self.arena.join(participant));
            }
            ArenaCommand::Leave { participant, reply } => {
                let _ = reply.send(self.arena.leave(&participant));
            }
            ArenaCommand::Transition { target, reply } => {
                let _ = reply.send(self.arena.transition(target));
            }
            ArenaCommand::Connected(participant) => {
                if self.arena.options().auto_trigger_on_membership {
                    self.arena.join(participant);
                }
            }
            ArenaCommand::Disconnected(participant) => {
                if self.arena.options().auto_trigger_on_membership {
                    self.arena.leave(&participant);
                }
            }
            ArenaCommand::Exec(job) => job(&mut self.arena),
            ArenaCommand::Shutdown => {}
        }
    }
}

/// Spawns an arena actor task and returns a handle to it.
///
/// `channel_size` bounds the command queue; senders wait when it is full.
pub fn spawn_arena(arena: Arena, channel_size: usize) -> ArenaHandle {
    let (tx, rx) = mpsc::channel(channel_size.max(1));
    let name: Arc<str> = Arc::from(arena.name());

    tokio::spawn(ArenaActor { arena, receiver: rx }.run());

    ArenaHandle { name, sender: tx }
}
