//! Shared utilities for use cases.

use crate::use_cases::run_turn::RunTurnError;
use planner_domain::{Message, Role};
use tokio_util::sync::CancellationToken;

/// Check if cancellation has been requested.
pub(crate) fn check_cancelled(token: &CancellationToken) -> Result<(), RunTurnError> {
    if token.is_cancelled() {
        return Err(RunTurnError::Cancelled);
    }
    Ok(())
}

/// Keep system messages plus the most recent others within `max_chars`.
///
/// Relative order is preserved.
pub(crate) fn trim_history(messages: &[Message], max_chars: usize) -> Vec<Message> {
    let total: usize = messages.iter().map(|m| m.content.len()).sum();
    if total <= max_chars {
        return messages.to_vec();
    }

    let mut budget = max_chars.saturating_sub(
        messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.len())
            .sum(),
    );

    let mut keep: Vec<bool> = messages.iter().map(|m| m.role == Role::System).collect();
    for (index, message) in messages.iter().enumerate().rev() {
        if message.role == Role::System {
            continue;
        }
        if message.content.len() > budget {
            break;
        }
        budget -= message.content.len();
        keep[index] = true;
    }

    messages
        .iter()
        .zip(keep)
        .filter(|(_, kept)| *kept)
        .map(|(m, _)| m.clone())
        .collect()
}
