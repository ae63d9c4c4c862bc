use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use chronocode_shared::clock::{Clock, SystemClock};
use chronocode_shared::constants::DEFAULT_MAX_USERS;
use chronocode_shared::protocol::{PresenceKind, PresenceMessage};
use chronocode_shared::types::{RoomId, UserId, Vec3};

use crate::avatar::{avatar_label, ColorWheel};
use crate::models::{Room, RoomSummary, User};
use crate::sink::{NullSink, PresenceSink};

struct RoomSlot {
    room: Room,
    /// Set when the room empties. A closed slot never reopens and is unlinked
    /// from the map right after.
    closed: bool,
}

type SharedSlot = Arc<Mutex<RoomSlot>>;

/// All rooms and their members.
///
/// Each room sits behind its own mutex, so mutations of one room are
/// serialized while different rooms proceed in parallel. The map lock is
/// never acquired while a room lock is held.
#[derive(Clone)]
pub struct PresenceRegistry {
    rooms: Arc<RwLock<HashMap<RoomId, SharedSlot>>>,
    colors: Arc<ColorWheel>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn PresenceSink>,
    default_max_users: usize,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            colors: Arc::new(ColorWheel::new()),
            clock: Arc::new(SystemClock),
            sink: Arc::new(NullSink),
            default_max_users: DEFAULT_MAX_USERS,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn PresenceSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Capacity used by [`create_room`](Self::create_room).
    pub fn with_default_max_users(mut self, max_users: usize) -> Self {
        self.default_max_users = max_users;
        self
    }

    async fn slot(&self, room_id: &RoomId) -> Option<SharedSlot> {
        self.rooms.read().await.get(room_id).cloned()
    }

    async fn unlink(&self, room_id: &RoomId, slot: &SharedSlot) {
        let mut rooms = self.rooms.write().await;
        if rooms
            .get(room_id)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
        {
            rooms.remove(room_id);
            info!(room = %room_id, rooms = rooms.len(), "Removed empty room");
        }
    }

    /// Callers hold the room's lock, so each room's messages reach the sink
    /// in the order its mutations were applied.
    fn emit(&self, kind: PresenceKind, user_id: &UserId, room_id: RoomId, data: Value) {
        let message = PresenceMessage::new(
            kind,
            user_id.clone(),
            room_id,
            self.clock.now_millis(),
            data,
        );
        self.sink.publish(&message);
    }

    // -- Rooms --

    pub async fn create_room(
        &self,
        name: impl Into<String>,
        host_id: impl Into<UserId>,
    ) -> Room {
        self.create_room_with_capacity(name, host_id, self.default_max_users)
            .await
    }

    pub async fn create_room_with_capacity(
        &self,
        name: impl Into<String>,
        host_id: impl Into<UserId>,
        max_users: usize,
    ) -> Room {
        let room = Room::new(
            name.into(),
            host_id.into(),
            max_users,
            self.clock.now_millis(),
        );
        let slot = RoomSlot {
            room: room.clone(),
            closed: false,
        };
        self.rooms
            .write()
            .await
            .insert(room.id, Arc::new(Mutex::new(slot)));

        info!(
            room = %room.id,
            name = %room.name,
            host = %room.host_id,
            max_users,
            "Created room"
        );
        room
    }

    pub async fn get_room(&self, room_id: &RoomId) -> Option<Room> {
        let slot = self.slot(room_id).await?;
        let guard = slot.lock().await;
        (!guard.closed).then(|| guard.room.clone())
    }

    pub async fn get_room_users(&self, room_id: &RoomId) -> Vec<User> {
        self.get_room(room_id)
            .await
            .map(|room| room.users.into_values().collect())
            .unwrap_or_default()
    }

    pub async fn get_room_list(&self) -> Vec<RoomSummary> {
        let slots: Vec<SharedSlot> = self.rooms.read().await.values().cloned().collect();

        let mut list = Vec::with_capacity(slots.len());
        for slot in slots {
            let guard = slot.lock().await;
            if !guard.closed {
                list.push(guard.room.summary());
            }
        }
        list
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    // -- Membership --

    /// Add a member. `None` if the room is unknown or full.
    ///
    /// Joining again under a present user id replaces that entry with a
    /// fresh one.
    pub async fn join_room(
        &self,
        room_id: &RoomId,
        user_id: impl Into<UserId>,
        display_name: &str,
    ) -> Option<User> {
        let user_id = user_id.into();
        let slot = self.slot(room_id).await?;

        let user = {
            let mut guard = slot.lock().await;
            if guard.closed {
                return None;
            }
            if guard.room.is_full() {
                warn!(
                    room = %room_id,
                    user = %user_id,
                    max_users = guard.room.max_users,
                    "Room full, rejecting join"
                );
                return None;
            }

            let user = User {
                id: user_id,
                name: display_name.to_string(),
                color: self.colors.next_color().to_string(),
                avatar_label: avatar_label(display_name),
                session_id: Uuid::new_v4(),
                position: Vec3::ZERO,
                look_at: Vec3::ZERO,
                is_active: true,
                last_seen: self.clock.now_millis(),
            };
            guard.room.users.insert(user.id.clone(), user.clone());

            debug!(
                room = %room_id,
                user = %user.id,
                users = guard.room.user_count(),
                "User joined room"
            );
            self.emit(
                PresenceKind::Join,
                &user.id,
                *room_id,
                json!({
                    "name": user.name,
                    "color": user.color,
                    "avatar_label": user.avatar_label,
                }),
            );
            user
        };

        Some(user)
    }

    /// Remove a member. The room is deleted once its last member is gone.
    pub async fn leave_room(&self, room_id: &RoomId, user_id: &UserId) {
        let Some(slot) = self.slot(room_id).await else {
            return;
        };

        let emptied = {
            let mut guard = slot.lock().await;
            if guard.closed || guard.room.users.remove(user_id).is_none() {
                return;
            }
            debug!(
                room = %room_id,
                user = %user_id,
                users = guard.room.user_count(),
                "User left room"
            );
            self.emit(
                PresenceKind::Leave,
                user_id,
                *room_id,
                json!({ "reason": "left" }),
            );
            guard.closed = guard.room.is_empty();
            guard.closed
        };

        if emptied {
            self.unlink(room_id, &slot).await;
        }
    }

    /// Update a member's scene position and refresh its liveness.
    pub async fn update_user_position(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
        position: Vec3,
        look_at: Vec3,
    ) {
        let Some(slot) = self.slot(room_id).await else {
            return;
        };

        let mut guard = slot.lock().await;
        if guard.closed {
            return;
        }
        let now = self.clock.now_millis();
        let Some(user) = guard.room.users.get_mut(user_id) else {
            return;
        };
        user.position = position;
        user.look_at = look_at;
        user.last_seen = now;

        self.emit(
            PresenceKind::Move,
            user_id,
            *room_id,
            json!({ "position": position, "look_at": look_at }),
        );
    }

    /// Relay a room-scoped message (chat, tool call, task assignment) to the
    /// sink. Returns `false` and sends nothing if the room does not exist.
    pub async fn broadcast_to_room(
        &self,
        room_id: &RoomId,
        kind: PresenceKind,
        user_id: &UserId,
        data: Value,
    ) -> bool {
        let slot = match self.slot(room_id).await {
            Some(slot) => slot,
            None => {
                debug!(room = %room_id, kind = ?kind, "Broadcast to unknown room ignored");
                return false;
            }
        };
        let guard = slot.lock().await;
        if guard.closed {
            return false;
        }
        self.emit(kind, user_id, *room_id, data);
        true
    }

    // -- Liveness --

    /// Evict members not seen for more than `timeout_ms`, then delete the
    /// rooms left empty. Returns the evicted users, marked inactive.
    ///
    /// The clock is read once up front, so a member who joins while the sweep
    /// runs is never older than the sweep's reference time. An empty room
    /// that lost no member in this sweep is only deleted once it is itself
    /// older than the timeout, which leaves freshly created rooms alone until
    /// their host joins.
    pub async fn cleanup_inactive_users(&self, timeout_ms: i64) -> Vec<User> {
        let now = self.clock.now_millis();
        let slots: Vec<(RoomId, SharedSlot)> = self
            .rooms
            .read()
            .await
            .iter()
            .map(|(id, slot)| (*id, slot.clone()))
            .collect();

        let mut evicted: Vec<User> = Vec::new();
        let mut emptied: Vec<(RoomId, SharedSlot)> = Vec::new();

        for (room_id, slot) in slots {
            let abandoned = {
                let mut guard = slot.lock().await;
                if guard.closed {
                    continue;
                }

                let stale: Vec<UserId> = guard
                    .room
                    .users
                    .values()
                    .filter(|u| now.saturating_sub(u.last_seen) > timeout_ms)
                    .map(|u| u.id.clone())
                    .collect();

                for user_id in &stale {
                    if let Some(mut user) = guard.room.users.remove(user_id) {
                        user.is_active = false;
                        debug!(
                            room = %room_id,
                            user = %user.id,
                            last_seen = user.last_seen,
                            "Evicted inactive user"
                        );
                        self.emit(
                            PresenceKind::Leave,
                            &user.id,
                            room_id,
                            json!({ "reason": "timeout" }),
                        );
                        evicted.push(user);
                    }
                }

                let idle_room = now.saturating_sub(guard.room.created_at) > timeout_ms;
                guard.closed = guard.room.is_empty() && (!stale.is_empty() || idle_room);
                guard.closed
            };

            if abandoned {
                emptied.push((room_id, slot));
            }
        }

        for (room_id, slot) in &emptied {
            self.unlink(room_id, slot).await;
        }

        if !evicted.is_empty() || !emptied.is_empty() {
            info!(
                evicted = evicted.len(),
                rooms_removed = emptied.len(),
                "Inactivity sweep finished"
            );
        }

        evicted
    }
}

impl Default for PresenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
