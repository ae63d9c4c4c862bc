//! Room and user records.
//!
//! A [`Room`] exclusively owns its [`User`] entries. Member iteration order
//! is unspecified.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chronocode_shared::types::{RoomId, UserId, Vec3};

/// A collaborator's live presence inside one room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Hex colour from the shared palette.
    pub color: String,
    /// Up to two uppercase initials.
    pub avatar_label: String,
    /// Minted per join; a rejoin gets a new one.
    pub session_id: Uuid,
    pub position: Vec3,
    pub look_at: Vec3,
    pub is_active: bool,
    /// Milliseconds since the Unix epoch of the last join or move.
    pub last_seen: i64,
}

/// A bounded collaborative session grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub host_id: UserId,
    pub created_at: i64,
    pub max_users: usize,
    pub users: HashMap<UserId, User>,
}

impl Room {
    pub fn new(name: String, host_id: UserId, max_users: usize, created_at: i64) -> Self {
        Self {
            id: RoomId::new(),
            name,
            host_id,
            created_at,
            max_users,
            users: HashMap::new(),
        }
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn is_full(&self) -> bool {
        self.users.len() >= self.max_users
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.id,
            name: self.name.clone(),
            users: self.users.len(),
            max_users: self.max_users,
        }
    }
}

/// Lobby listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub id: RoomId,
    pub name: String,
    pub users: usize,
    pub max_users: usize,
}
