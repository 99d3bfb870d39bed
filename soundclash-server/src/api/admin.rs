//! Admin gateway
//!
//! Tournament lifecycle commands, all gated on the tournament's status:
//! drafts can be edited and started, anything can be deleted, and no
//! other command applies to a completed or cancelled tournament.

use std::collections::HashSet;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use soundclash_common::models::{Contestant, Tournament, TournamentStatus};
use soundclash_common::Error;

use crate::api::ApiResult;
use crate::bracket;
use crate::db;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
}

/// POST /api/admin/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let access_token = state.auth.login(&payload.password)?;
    Ok(Json(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct CreateTournamentRequest {
    pub name: String,
    pub voting_duration_minutes: i64,
    #[serde(default)]
    pub urls: Vec<String>,
}

/// POST /api/admin/tournaments
///
/// Creates a draft. Each seed URL is resolved independently; a URL the
/// catalog cannot serve is skipped with a warning, never aborting the
/// batch.
pub async fn create_tournament(
    State(state): State<AppState>,
    Json(payload): Json<CreateTournamentRequest>,
) -> ApiResult<Json<Value>> {
    if payload.name.trim().is_empty() {
        return Err(Error::InvalidInput("tournament name must not be empty".to_string()).into());
    }
    if payload.voting_duration_minutes <= 0 {
        return Err(Error::InvalidInput(
            "voting duration must be a positive number of minutes".to_string(),
        )
        .into());
    }

    let mut pool = Vec::new();
    let mut seen = HashSet::new();
    for url in &payload.urls {
        match state.catalog.lookup(url).await {
            Ok(tracks) => {
                for track in tracks {
                    if seen.insert(track.id.clone()) {
                        pool.push(track);
                    }
                }
            }
            Err(Error::CatalogUnavailable(reason)) => {
                warn!(%url, %reason, "skipping seed URL");
            }
            Err(other) => return Err(other.into()),
        }
    }

    let mut tournament = Tournament::new(payload.name, payload.voting_duration_minutes);
    tournament.contestants = pool;
    db::tournaments::insert(&state.db, &tournament).await?;

    info!(
        tournament = %tournament.id,
        contestants = tournament.contestants.len(),
        "draft tournament created"
    );

    Ok(Json(json!({
        "tournament_id": tournament.id,
        "contestants": tournament.contestants.len(),
    })))
}

/// Load a tournament that must still be in the draft stage.
async fn fetch_draft(state: &AppState, id: Uuid) -> ApiResult<Tournament> {
    let tournament = db::tournaments::fetch(&state.db, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("tournament {id}")))?;

    if tournament.status != TournamentStatus::Draft {
        return Err(Error::InvalidInput(format!(
            "tournament is {}, only drafts can be edited",
            tournament.status
        ))
        .into());
    }

    Ok(tournament)
}

#[derive(Debug, Deserialize)]
pub struct AddSongRequest {
    pub url: String,
}

/// POST /api/admin/tournaments/:id/songs
pub async fn add_song(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddSongRequest>,
) -> ApiResult<Json<Value>> {
    let tournament = fetch_draft(&state, id).await?;

    let tracks = match state.catalog.lookup(&payload.url).await {
        Ok(tracks) if !tracks.is_empty() => tracks,
        Ok(_) => {
            return Err(
                Error::InvalidInput(format!("no tracks found for URL: {}", payload.url)).into(),
            )
        }
        Err(Error::CatalogUnavailable(reason)) => {
            return Err(Error::InvalidInput(format!(
                "no tracks found for URL {}: {reason}",
                payload.url
            ))
            .into())
        }
        Err(other) => return Err(other.into()),
    };

    let existing: HashSet<&str> = tournament
        .contestants
        .iter()
        .map(|contestant| contestant.id.as_str())
        .collect();

    let new_tracks: Vec<Contestant> = tracks
        .into_iter()
        .filter(|track| !existing.contains(track.id.as_str()))
        .collect();

    let mut added = 0usize;
    for track in &new_tracks {
        if db::tournaments::push_contestant(&state.db, id, track).await? {
            added += 1;
        }
    }

    Ok(Json(json!({ "added": added })))
}

#[derive(Debug, Deserialize)]
pub struct RemoveSongRequest {
    pub contestant_id: String,
}

/// DELETE /api/admin/tournaments/:id/songs
pub async fn remove_song(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RemoveSongRequest>,
) -> ApiResult<Json<Value>> {
    fetch_draft(&state, id).await?;
    db::tournaments::pull_contestant(&state.db, id, &payload.contestant_id).await?;
    Ok(Json(json!({ "removed": payload.contestant_id })))
}

/// POST /api/admin/tournaments/:id/start
///
/// Seeds round 1 from the contestant pool (uniform shuffle) and flips
/// the draft to active.
pub async fn start_tournament(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let tournament = fetch_draft(&state, id).await?;

    let first_round = bracket::seed_initial_round(
        tournament.contestants.clone(),
        tournament.voting_duration_minutes,
        chrono::Utc::now(),
        &mut rand::thread_rng(),
    )?;

    if !db::tournaments::start(&state.db, id, &first_round).await? {
        // Lost a concurrent start; the draft guard already flipped.
        return Err(Error::InvalidInput("tournament already started".to_string()).into());
    }

    info!(
        tournament = %id,
        matches = first_round.matches.len(),
        "tournament started"
    );

    Ok(Json(json!({
        "status": "active",
        "matches": first_round.matches.len(),
    })))
}

/// DELETE /api/admin/tournaments/:id
///
/// Allowed in any status; irreversible.
pub async fn delete_tournament(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    if !db::tournaments::delete(&state.db, id).await? {
        return Err(Error::NotFound(format!("tournament {id}")).into());
    }
    info!(tournament = %id, "tournament deleted");
    Ok(Json(json!({ "deleted": id })))
}
