use crate::chat::{HistoryStore, MessageBus, MessageIds};
use crate::config::HubConfig;
use crate::room::{Reply, Room, RoomCommand};
use crate::signaling::EventSink;
use dashmap::DashMap;
use huddle_core::{HuddleError, RoomId};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

const SEND_ATTEMPTS: usize = 3;

#[derive(Clone)]
struct RoomHandle {
    tx: mpsc::Sender<RoomCommand>,
    /// Distinguishes a respawned actor from the one it replaced.
    epoch: u64,
}

/// Room directory: spawns a room actor on first use and routes commands to it.
/// Actors that stay empty past the idle timeout exit and are dropped here.
#[derive(Clone)]
pub struct RoomManager {
    rooms: Arc<DashMap<RoomId, RoomHandle>>,
    epochs: Arc<AtomicU64>,
    ids: MessageIds,
    sink: Arc<dyn EventSink>,
    history: Arc<dyn HistoryStore>,
    config: Arc<HubConfig>,
}

impl RoomManager {
    pub fn new(
        config: Arc<HubConfig>,
        sink: Arc<dyn EventSink>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            epochs: Arc::new(AtomicU64::new(0)),
            ids: MessageIds::new(),
            sink,
            history,
            config,
        }
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_running(&self, room: &RoomId) -> bool {
        self.rooms.contains_key(room)
    }

    /// Queues `cmd` for `room`, spawning the actor if needed. A handle whose
    /// actor already exited is replaced and the command retried.
    pub async fn send(&self, room: &RoomId, cmd: RoomCommand) -> Result<(), HuddleError> {
        let mut cmd = cmd;

        for _ in 0..SEND_ATTEMPTS {
            let handle = self.handle_for(room);
            match handle.tx.send(cmd).await {
                Ok(()) => return Ok(()),
                Err(mpsc::error::SendError(returned)) => {
                    debug!("[{}] Actor gone, respawning", room);
                    self.rooms.remove_if(room, |_, h| h.epoch == handle.epoch);
                    cmd = returned;
                }
            }
        }

        warn!("[{}] Room unavailable after {} attempts", room, SEND_ATTEMPTS);
        Err(HuddleError::RoomUnavailable(room.clone()))
    }

    /// Sends a command built around a fresh reply slot and awaits the answer.
    pub async fn request<T>(
        &self,
        room: &RoomId,
        build: impl FnOnce(Reply<T>) -> RoomCommand,
    ) -> Result<T, HuddleError> {
        let (tx, rx) = oneshot::channel();
        self.send(room, build(tx)).await?;
        rx.await
            .map_err(|_| HuddleError::RoomUnavailable(room.clone()))?
    }

    /// Like `request`, but never spawns an actor for a room that has none.
    pub async fn request_existing<T>(
        &self,
        room: &RoomId,
        build: impl FnOnce(Reply<T>) -> RoomCommand,
    ) -> Option<Result<T, HuddleError>> {
        let handle = self.rooms.get(room).map(|entry| entry.value().clone())?;
        let (tx, rx) = oneshot::channel();
        handle.tx.send(build(tx)).await.ok()?;
        rx.await.ok()
    }

    fn handle_for(&self, room: &RoomId) -> RoomHandle {
        if let Some(handle) = self.rooms.get(room) {
            return handle.clone();
        }

        self.rooms
            .entry(room.clone())
            .or_insert_with(|| self.spawn_room(room))
            .clone()
    }

    fn spawn_room(&self, room: &RoomId) -> RoomHandle {
        let epoch = self.epochs.fetch_add(1, Ordering::Relaxed);
        info!("Creating new room: {} (epoch {})", room, epoch);

        let (tx, rx) = mpsc::channel(self.config.room_queue);
        let bus = MessageBus::new(room.clone(), self.history.clone(), self.ids.clone());
        let actor = Room::new(
            room.clone(),
            rx,
            self.sink.clone(),
            bus,
            self.config.typing_timeout,
            self.config.room_idle,
        );

        let manager = self.clone();
        let room = room.clone();
        tokio::spawn(async move {
            let rx = actor.run().await;
            manager.retire(room, epoch, rx).await;
        });

        RoomHandle { tx, epoch }
    }

    /// Drops the directory entry of an exited actor and reroutes anything that
    /// was queued behind its shutdown.
    async fn retire(&self, room: RoomId, epoch: u64, mut rx: mpsc::Receiver<RoomCommand>) {
        self.rooms.remove_if(&room, |_, h| h.epoch == epoch);
        rx.close();

        while let Some(cmd) = rx.recv().await {
            debug!("[{}] Rerouting command queued during shutdown", room);
            if let Err(e) = self.send(&room, cmd).await {
                warn!("[{}] Lost command during shutdown: {}", room, e);
            }
        }
    }
}
