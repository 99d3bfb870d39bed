//! Append-only vote log
//!
//! The (tournament, round, match, fingerprint) tuple is unique by
//! policy, enforced by the gateway's check-then-append pair rather than
//! a storage constraint. The narrow race window between the two is an
//! accepted limitation.

use sqlx::SqlitePool;

use soundclash_common::models::VoteLog;
use soundclash_common::Result;

/// Whether this voter already voted on this match in this round.
pub async fn exists(
    pool: &SqlitePool,
    tournament_id: &str,
    round_index: i64,
    match_id: i64,
    voter_fingerprint: &str,
) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT 1 FROM vote_logs
        WHERE tournament_id = ?1
          AND round_index = ?2
          AND match_id = ?3
          AND voter_fingerprint = ?4
        LIMIT 1
        "#,
    )
    .bind(tournament_id)
    .bind(round_index)
    .bind(match_id)
    .bind(voter_fingerprint)
    .fetch_optional(pool)
    .await?;

    Ok(found.is_some())
}

/// Append one vote-log entry.
pub async fn append(pool: &SqlitePool, entry: &VoteLog) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO vote_logs
            (tournament_id, round_index, match_id, voter_fingerprint, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(entry.tournament_id.to_string())
    .bind(entry.round_index)
    .bind(entry.match_id)
    .bind(&entry.voter_fingerprint)
    .bind(entry.created_at)
    .execute(pool)
    .await?;

    Ok(())
}
