//! Tournament document operations
//!
//! One row per tournament; the contestant pool and round tree are JSON
//! columns mutated in place with SQLite's JSON functions so every write
//! is a single guarded statement.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::str::FromStr;
use uuid::Uuid;

use soundclash_common::models::{
    Contestant, Round, Tournament, TournamentStatus, TournamentSummary, VoteOption,
};
use soundclash_common::{Error, Result};

#[derive(sqlx::FromRow)]
struct TournamentRow {
    id: String,
    name: String,
    voting_duration_minutes: i64,
    current_round_index: i64,
    status: String,
    contestants: String,
    rounds: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<TournamentRow> for Tournament {
    type Error = Error;

    fn try_from(row: TournamentRow) -> Result<Self> {
        Ok(Tournament {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| Error::Internal(format!("invalid tournament id: {e}")))?,
            name: row.name,
            voting_duration_minutes: row.voting_duration_minutes,
            current_round_index: row.current_round_index,
            status: TournamentStatus::from_str(&row.status)?,
            contestants: serde_json::from_str(&row.contestants)
                .map_err(|e| Error::Internal(format!("corrupt contestant pool: {e}")))?,
            rounds: serde_json::from_str(&row.rounds)
                .map_err(|e| Error::Internal(format!("corrupt round tree: {e}")))?,
            created_at: row.created_at,
        })
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::Internal(format!("serialize failed: {e}")))
}

/// Insert a new tournament document.
pub async fn insert(pool: &SqlitePool, tournament: &Tournament) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO tournaments
            (id, name, voting_duration_minutes, current_round_index, status,
             contestants, rounds, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(tournament.id.to_string())
    .bind(&tournament.name)
    .bind(tournament.voting_duration_minutes)
    .bind(tournament.current_round_index)
    .bind(tournament.status.as_str())
    .bind(to_json(&tournament.contestants)?)
    .bind(to_json(&tournament.rounds)?)
    .bind(tournament.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch one tournament document.
pub async fn fetch(pool: &SqlitePool, id: Uuid) -> Result<Option<Tournament>> {
    let row: Option<TournamentRow> = sqlx::query_as(
        r#"
        SELECT id, name, voting_duration_minutes, current_round_index, status,
               contestants, rounds, created_at
        FROM tournaments
        WHERE id = ?1
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(Tournament::try_from).transpose()
}

/// Public listing projection: active and completed tournaments only.
pub async fn list_public(pool: &SqlitePool) -> Result<Vec<TournamentSummary>> {
    let rows: Vec<(String, String, String)> = sqlx::query_as(
        r#"
        SELECT id, name, status
        FROM tournaments
        WHERE status IN ('active', 'completed')
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|(id, name, status)| {
            Ok(TournamentSummary {
                id: Uuid::parse_str(&id)
                    .map_err(|e| Error::Internal(format!("invalid tournament id: {e}")))?,
                name,
                status: TournamentStatus::from_str(&status)?,
            })
        })
        .collect()
}

/// Delete a tournament and its vote log. Allowed in any status;
/// irreversible.
pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    sqlx::query("DELETE FROM vote_logs WHERE tournament_id = ?1")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    let result = sqlx::query("DELETE FROM tournaments WHERE id = ?1")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Append a contestant to a draft tournament's pool. Returns false when
/// the tournament is missing or no longer a draft. Dedup against the
/// existing pool is the caller's job.
pub async fn push_contestant(pool: &SqlitePool, id: Uuid, contestant: &Contestant) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE tournaments
        SET contestants = json_insert(contestants, '$[#]', json(?2))
        WHERE id = ?1 AND status = 'draft'
        "#,
    )
    .bind(id.to_string())
    .bind(to_json(contestant)?)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Remove a contestant from a draft tournament's pool by its id.
pub async fn pull_contestant(pool: &SqlitePool, id: Uuid, contestant_id: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE tournaments
        SET contestants = (
            SELECT COALESCE(json_group_array(json(value)), '[]')
            FROM json_each(contestants)
            WHERE json_extract(value, '$.id') <> ?2
        )
        WHERE id = ?1 AND status = 'draft'
        "#,
    )
    .bind(id.to_string())
    .bind(contestant_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Activate a draft tournament with its seeded first round. The
/// `status = 'draft'` guard makes a concurrent double-start harmless.
pub async fn start(pool: &SqlitePool, id: Uuid, first_round: &Round) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE tournaments
        SET status = 'active',
            rounds = json_array(json(?2)),
            current_round_index = 0
        WHERE id = ?1 AND status = 'draft'
        "#,
    )
    .bind(id.to_string())
    .bind(to_json(first_round)?)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Overwrite a closed round in place (winner_ids stamped). Guarded on
/// `current_round_index` so a late writer cannot clobber an advanced
/// bracket; winners are recomputed deterministically, so redundant
/// closes write identical bytes.
pub async fn close_round(
    pool: &SqlitePool,
    id: Uuid,
    round_index: i64,
    closed_round: &Round,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE tournaments
        SET rounds = json_set(rounds, '$[' || ?2 || ']', json(?3))
        WHERE id = ?1 AND status = 'active' AND current_round_index = ?2
        "#,
    )
    .bind(id.to_string())
    .bind(round_index)
    .bind(to_json(closed_round)?)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Append the next round and advance `current_round_index`, as one
/// compare-and-set: only the request that observes the expected index
/// (and a round tree that has not yet grown) performs the append.
/// Returns false when another request advanced this expiry event first.
pub async fn advance_round(
    pool: &SqlitePool,
    id: Uuid,
    expected_index: i64,
    next_round: &Round,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE tournaments
        SET rounds = json_insert(rounds, '$[#]', json(?3)),
            current_round_index = current_round_index + 1
        WHERE id = ?1
          AND status = 'active'
          AND current_round_index = ?2
          AND json_array_length(rounds) = ?2 + 1
        "#,
    )
    .bind(id.to_string())
    .bind(expected_index)
    .bind(to_json(next_round)?)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Mark the tournament completed. Compare-and-set on the final round's
/// index; a concurrent completion simply wins the race first.
pub async fn complete(pool: &SqlitePool, id: Uuid, expected_index: i64) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE tournaments
        SET status = 'completed'
        WHERE id = ?1 AND status = 'active' AND current_round_index = ?2
        "#,
    )
    .bind(id.to_string())
    .bind(expected_index)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Atomically bump one match's vote counter, scoped to the current
/// round. `match_id` is the 1-based match position, so the JSON path is
/// derived from it directly. Zero rows affected means the match does not
/// exist in the current round (stale client) or the round moved on.
pub async fn increment_vote(
    pool: &SqlitePool,
    id: Uuid,
    round_index: i64,
    match_id: i64,
    option: VoteOption,
) -> Result<bool> {
    // Match ids are 1-based; anything lower cannot name a match and
    // would produce a malformed JSON path below.
    if match_id < 1 {
        return Ok(false);
    }

    // The counter field is one of two fixed identifiers, never user input.
    let field = option.field();
    let sql = format!(
        r#"
        UPDATE tournaments
        SET rounds = json_set(
            rounds,
            '$[' || current_round_index || '].matches[' || (?3 - 1) || '].{field}',
            json_extract(rounds, '$[' || current_round_index || '].matches[' || (?3 - 1) || '].{field}') + 1
        )
        WHERE id = ?1
          AND status = 'active'
          AND current_round_index = ?2
          AND json_extract(rounds, '$[' || current_round_index || '].matches[' || (?3 - 1) || '].match_id') = ?3
        "#
    );

    let result = sqlx::query(&sql)
        .bind(id.to_string())
        .bind(round_index)
        .bind(match_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
