//! Voting gateway
//!
//! Public reads run the bracket engine's progression check first, so
//! viewing a bracket and advancing it are the same operation. Vote casts
//! enforce at-most-one-vote-per-voter-per-match-per-round against the
//! append-only vote log.

use std::net::SocketAddr;
use std::str::FromStr;

use axum::{
    extract::{ConnectInfo, Path, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use soundclash_common::fingerprint::voter_fingerprint;
use soundclash_common::models::{
    Tournament, TournamentStatus, TournamentSummary, VoteLog, VoteOption,
};
use soundclash_common::Error;

use crate::api::ApiResult;
use crate::bracket;
use crate::db;
use crate::AppState;

/// GET /api/tournaments
///
/// Active and completed tournaments only, projected to id/name/status.
pub async fn list_tournaments(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<TournamentSummary>>> {
    Ok(Json(db::tournaments::list_public(&state.db).await?))
}

/// GET /api/tournaments/:id
///
/// Returns the full tournament state after the progression check has
/// had its chance to close an expired round.
pub async fn get_bracket(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Tournament>> {
    let tournament = bracket::check_progression(&state.db, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("tournament {id}")))?;
    Ok(Json(tournament))
}

/// Caller's network identity: first X-Forwarded-For entry when present
/// (the service normally sits behind a proxy), otherwise the socket
/// address.
fn client_ip(headers: &HeaderMap, connect_info: Option<&ConnectInfo<SocketAddr>>) -> String {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    connect_info
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// POST /api/tournaments/:id/matches/:match_id/vote/:option
pub async fn cast_vote(
    State(state): State<AppState>,
    Path((id, match_id, option)): Path<(Uuid, i64, String)>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let option = VoteOption::from_str(&option)?;
    let fingerprint = voter_fingerprint(&client_ip(&headers, connect_info.as_ref()));

    let tournament = db::tournaments::fetch(&state.db, id)
        .await?
        .filter(|t| t.status == TournamentStatus::Active)
        .ok_or_else(|| Error::NotFound(format!("tournament {id} not found or ended")))?;

    let round_index = tournament.current_round_index;

    if db::vote_logs::exists(&state.db, &id.to_string(), round_index, match_id, &fingerprint)
        .await?
    {
        return Err(Error::AlreadyVoted.into());
    }

    if !db::tournaments::increment_vote(&state.db, id, round_index, match_id, option).await? {
        // Stale client: the match is not in the current round.
        return Err(Error::MatchNotFound.into());
    }

    db::vote_logs::append(
        &state.db,
        &VoteLog {
            tournament_id: id,
            round_index,
            match_id,
            voter_fingerprint: fingerprint,
            created_at: Utc::now(),
        },
    )
    .await?;

    debug!(tournament = %id, round = round_index, match_id, "vote counted");

    Ok(Json(json!({ "message": "vote counted" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn forwarded_header_wins_over_socket_addr() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        let connect_info = ConnectInfo("127.0.0.1:1234".parse().unwrap());
        assert_eq!(client_ip(&headers, Some(&connect_info)), "203.0.113.9");
    }

    #[test]
    fn falls_back_to_socket_addr() {
        let headers = HeaderMap::new();
        let connect_info = ConnectInfo("192.0.2.4:9999".parse().unwrap());
        assert_eq!(client_ip(&headers, Some(&connect_info)), "192.0.2.4");
    }

    #[test]
    fn unknown_when_no_identity_available() {
        let headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, None), "unknown");
    }
}
