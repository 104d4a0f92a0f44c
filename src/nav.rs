//! Navigation — turning a `NavRequest` into a card index.
//!
//! Resolution is separate from moving: `resolve_target` only computes
//! where to go (popping the recent list for `go recent`), and the engine
//! applies the move and its side effects.

use std::collections::VecDeque;

use crate::ast::NavRequest;
use crate::error::{CommandError, CommandResult};
use crate::stack::Stack;

/// Maximum number of remembered cards.
pub const MAX_RECENT: usize = 20;

/// Card ids, most recent first. Revisits are not deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentCards {
    ids: VecDeque<u32>,
}

impl RecentCards {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push to the front, dropping the oldest entry past the cap.
    pub fn push(&mut self, card_id: u32) {
        self.ids.push_front(card_id);
        self.ids.truncate(MAX_RECENT);
    }

    pub fn pop(&mut self) -> Option<u32> {
        self.ids.pop_front()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.ids.iter().copied()
    }
}

/// Compute the card index a request points at.
///
/// `Recent` consumes the head of `recent` even when it fails; a stale id
/// is not retried against the next entry.
pub fn resolve_target(
    request: &NavRequest,
    stack: &Stack,
    current: usize,
    recent: &mut RecentCards,
) -> CommandResult<usize> {
    let count = stack.card_count();
    match request {
        NavRequest::ByNumber(n) => {
            if (1..=count as u64).contains(n) {
                Ok((*n - 1) as usize)
            } else {
                Err(CommandError::CardOutOfRange(*n))
            }
        }
        NavRequest::ByName(name) => stack
            .card_index_by_name(name)
            .ok_or_else(|| CommandError::NoSuchCard(name.clone())),
        NavRequest::Next => Ok((current + 1) % count),
        NavRequest::Previous => Ok((current + count - 1) % count),
        NavRequest::First => Ok(0),
        NavRequest::Last => Ok(count - 1),
        NavRequest::Recent => recent
            .pop()
            .and_then(|id| stack.card_index_by_id(id))
            .ok_or(CommandError::NoRecentCard),
    }
}
