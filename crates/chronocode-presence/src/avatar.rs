//! Colour and label assignment for new room members.

use std::sync::atomic::{AtomicUsize, Ordering};

use chronocode_shared::constants::{AVATAR_LABEL_LEN, USER_COLORS};

/// Hands out palette colours round-robin. One wheel is shared by every room
/// of a registry, so members of different rooms may share a colour.
#[derive(Debug, Default)]
pub struct ColorWheel {
    next: AtomicUsize,
}

impl ColorWheel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_color(&self) -> &'static str {
        let turn = self.next.fetch_add(1, Ordering::Relaxed);
        USER_COLORS[turn % USER_COLORS.len()]
    }
}

/// Initials of the space-separated words of `name`, uppercased, at most two.
pub fn avatar_label(name: &str) -> String {
    name.split(' ')
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(AVATAR_LABEL_LEN)
        .collect()
}
