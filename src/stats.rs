use serde_json::Value;

use crate::envelope::lenient_vec;
use crate::model::{CardEvent, CardKind, GoalEvent};

/// Per-player aggregate derived from the goal and card event collections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerStats {
    pub goals: u32,
    pub own_goals: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
}

impl PlayerStats {
    pub fn is_zero(&self) -> bool {
        *self == PlayerStats::default()
    }
}

/// Compute a player's aggregate from two independently fetched, independently
/// invalidated collections. Pure and total: events without a player id are
/// skipped and empty collections yield the zeroed aggregate.
///
/// `goals_count` is summed, not counted, so a batched increment of several
/// goals in one event is honored. Card kinds are counted independently; a
/// second yellow is not folded into a red (pure counting, as recorded).
pub fn player_stats(
    player_id: &str,
    goal_events: &[GoalEvent],
    card_events: &[CardEvent],
) -> PlayerStats {
    let mut stats = PlayerStats::default();

    for event in goal_events {
        if event.player_id.as_deref() != Some(player_id) {
            continue;
        }
        if event.is_own_goal {
            stats.own_goals += event.goals_count;
        } else {
            stats.goals += event.goals_count;
        }
    }

    for event in card_events {
        if event.player_id.as_deref() != Some(player_id) {
            continue;
        }
        match event.card_type {
            CardKind::Yellow => stats.yellow_cards += 1,
            CardKind::Red => stats.red_cards += 1,
        }
    }

    stats
}

/// Same aggregate straight from cached JSON payloads. An absent or
/// malformed collection contributes nothing rather than failing.
pub fn player_stats_from_values(player_id: &str, goals: &Value, cards: &Value) -> PlayerStats {
    let goal_events: Vec<GoalEvent> = lenient_vec(goals);
    let card_events: Vec<CardEvent> = lenient_vec(cards);
    player_stats(player_id, &goal_events, &card_events)
}
