//! Pure bracket decisions
//!
//! Everything here is a pure function of (tournament, now): seeding the
//! first round, resolving winners when a round expires, pairing the next
//! round, and detecting completion. Callers persist the results; the
//! store shim in `progression` is the only place that touches the pool.

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use soundclash_common::models::{Contestant, Match, Round, Tournament, TournamentStatus};
use soundclash_common::{Error, Result};

/// Pair a pool consecutively into a fully formed round.
///
/// Positions (0,1), (2,3), ... become matches 1, 2, ...; an odd trailing
/// contestant gets a bye. Pool order is the bracket order and must
/// already be final (seeded round: shuffled; later rounds: inherited
/// winner order).
pub fn build_round(
    pool: Vec<Contestant>,
    round_index: i64,
    round_name: String,
    end_time: DateTime<Utc>,
) -> Round {
    let mut matches = Vec::with_capacity(pool.len().div_ceil(2));
    let mut slots = pool.into_iter();

    while let Some(contestant_a) = slots.next() {
        matches.push(Match {
            match_id: matches.len() as i64 + 1,
            contestant_a,
            contestant_b: slots.next(),
            votes_a: 0,
            votes_b: 0,
            winner_id: None,
        });
    }

    Round {
        round_index,
        round_name,
        matches,
        end_time,
    }
}

/// Construct round 0 from the contestant pool.
///
/// The uniform shuffle is the tournament's sole seeding mechanism; it
/// also makes the ties-favor-A rule fair. The Rng is injected so tests
/// can assert deterministic bracket shapes.
pub fn seed_initial_round<R: Rng + ?Sized>(
    mut pool: Vec<Contestant>,
    voting_duration_minutes: i64,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<Round> {
    if pool.len() < 2 {
        return Err(Error::InvalidInput(format!(
            "at least 2 contestants required to start a tournament (have {})",
            pool.len()
        )));
    }
    if voting_duration_minutes <= 0 {
        return Err(Error::InvalidInput(
            "voting duration must be a positive number of minutes".to_string(),
        ));
    }

    pool.shuffle(rng);

    Ok(build_round(
        pool,
        0,
        "Round 1".to_string(),
        now + Duration::minutes(voting_duration_minutes),
    ))
}

/// Stamp `winner_id` on every match of an expired round and return the
/// ordered winner list (same order as the matches).
///
/// A bye's winner is its sole contestant. A contested match goes to
/// contestant_a when votes_a >= votes_b: the tie-break leans on the
/// random seeding, not on vote order.
pub fn resolve_winners(round: &mut Round) -> Vec<Contestant> {
    let mut winners = Vec::with_capacity(round.matches.len());

    for m in &mut round.matches {
        let winner = match &m.contestant_b {
            None => m.contestant_a.clone(),
            Some(contestant_b) => {
                if m.votes_a >= m.votes_b {
                    m.contestant_a.clone()
                } else {
                    contestant_b.clone()
                }
            }
        };
        m.winner_id = Some(winner.id.clone());
        winners.push(winner);
    }

    winners
}

/// Outcome of one progression check.
#[derive(Debug, Clone, PartialEq)]
pub enum Progression {
    /// Round still open (or tournament not active): nothing to persist.
    Unchanged,
    /// Current round expired with a single winner: tournament is over.
    Completed { closed_round: Round },
    /// Current round expired with >1 winner: close it and append the
    /// next round.
    NextRound { closed_round: Round, next_round: Round },
}

/// Decide what the tournament's next state is at `now`.
///
/// Pure and idempotent: running it twice against the same document
/// yields the same decision, which is what makes concurrent redundant
/// progression checks safe to retry.
pub fn advance(tournament: &Tournament, now: DateTime<Utc>) -> Progression {
    if tournament.status != TournamentStatus::Active {
        return Progression::Unchanged;
    }
    let Some(current) = tournament.current_round() else {
        return Progression::Unchanged;
    };
    if !current.is_expired(now) {
        // The common case: serve the bracket view without mutation.
        return Progression::Unchanged;
    }

    let mut closed_round = current.clone();
    let winners = resolve_winners(&mut closed_round);

    if winners.len() == 1 {
        return Progression::Completed { closed_round };
    }

    // Winner order is inherited from the previous round's resolution
    // order; no reshuffle.
    let next_index = tournament.current_round_index + 1;
    let next_round = build_round(
        winners,
        next_index,
        format!("Round {}", next_index + 1),
        now + Duration::minutes(tournament.voting_duration_minutes),
    );

    Progression::NextRound {
        closed_round,
        next_round,
    }
}
