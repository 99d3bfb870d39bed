//! Progression check
//!
//! Invoked on every bracket read, so "view the bracket" and "advance the
//! bracket" are the same operation. Multiple concurrent requests may
//! observe the same expired round; only the one whose compare-and-set on
//! `current_round_index` succeeds appends the next round, and the losers
//! converge by re-reading the advanced document.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use soundclash_common::models::Tournament;
use soundclash_common::Result;

use crate::bracket::engine::{advance, Progression};
use crate::db;

/// Run the progression check for one tournament and return its current
/// state, or None if no such tournament exists.
pub async fn check_progression(pool: &SqlitePool, id: Uuid) -> Result<Option<Tournament>> {
    let Some(tournament) = db::tournaments::fetch(pool, id).await? else {
        return Ok(None);
    };

    match advance(&tournament, Utc::now()) {
        Progression::Unchanged => Ok(Some(tournament)),

        Progression::Completed { closed_round } => {
            let round_index = tournament.current_round_index;
            db::tournaments::close_round(pool, id, round_index, &closed_round).await?;
            if db::tournaments::complete(pool, id, round_index).await? {
                info!(
                    tournament = %id,
                    round = round_index,
                    "final round closed, tournament completed"
                );
            }
            db::tournaments::fetch(pool, id).await
        }

        Progression::NextRound {
            closed_round,
            next_round,
        } => {
            let round_index = tournament.current_round_index;
            db::tournaments::close_round(pool, id, round_index, &closed_round).await?;
            if db::tournaments::advance_round(pool, id, round_index, &next_round).await? {
                info!(
                    tournament = %id,
                    closed = round_index,
                    opened = next_round.round_index,
                    matches = next_round.matches.len(),
                    "round closed, next round opened"
                );
            } else {
                // Lost the race: another request already advanced this
                // expiry event. Discard our computed round.
                debug!(tournament = %id, round = round_index, "round already advanced elsewhere");
            }
            db::tournaments::fetch(pool, id).await
        }
    }
}
