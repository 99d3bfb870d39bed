//! Bracket engine tests
//!
//! Pure-function coverage: seeding shape, winner resolution, tie-break,
//! round progression, and completion detection. No database involved.

use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

use soundclash_common::models::{Contestant, Tournament, TournamentStatus};
use soundclash_server::bracket::{
    advance, build_round, resolve_winners, seed_initial_round, Progression,
};

fn contestant(id: &str) -> Contestant {
    Contestant {
        id: format!("https://open.spotify.com/track/{id}"),
        title: format!("Track {id}"),
        artist: "Test Artist".to_string(),
        image_url: None,
        embed_html: None,
        original_url: format!("https://open.spotify.com/track/{id}"),
        preview_url: None,
    }
}

fn pool(n: usize) -> Vec<Contestant> {
    (0..n).map(|i| contestant(&format!("c{i}"))).collect()
}

fn active_tournament(contestants: Vec<Contestant>, duration_minutes: i64, expired: bool) -> Tournament {
    let end_time = if expired {
        Utc::now() - Duration::minutes(5)
    } else {
        Utc::now() + Duration::minutes(30)
    };
    let round = build_round(contestants.clone(), 0, "Round 1".to_string(), end_time);
    Tournament {
        id: uuid::Uuid::new_v4(),
        name: "Test Cup".to_string(),
        voting_duration_minutes: duration_minutes,
        current_round_index: 0,
        status: TournamentStatus::Active,
        contestants,
        rounds: vec![round],
        created_at: Utc::now(),
    }
}

// ---- Initial round construction ----

#[test]
fn seeding_produces_ceil_half_matches_with_every_contestant_once() {
    for n in 2..=9 {
        let mut rng = StdRng::seed_from_u64(42);
        let round = seed_initial_round(pool(n), 60, Utc::now(), &mut rng).unwrap();

        assert_eq!(round.matches.len(), n.div_ceil(2), "pool of {n}");
        assert_eq!(round.round_index, 0);
        assert_eq!(round.round_name, "Round 1");

        let mut seen: Vec<&str> = round
            .matches
            .iter()
            .flat_map(|m| {
                std::iter::once(m.contestant_a.id.as_str())
                    .chain(m.contestant_b.as_ref().map(|c| c.id.as_str()))
            })
            .collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), n, "every contestant appears exactly once");

        let byes = round.matches.iter().filter(|m| m.is_bye()).count();
        assert_eq!(byes, n % 2, "a bye only for odd pools");
        if n % 2 == 1 {
            assert!(round.matches.last().unwrap().is_bye(), "bye is the trailing match");
        }
    }
}

#[test]
fn seeding_rejects_pools_below_two() {
    let mut rng = StdRng::seed_from_u64(1);
    assert!(seed_initial_round(pool(0), 60, Utc::now(), &mut rng).is_err());
    assert!(seed_initial_round(pool(1), 60, Utc::now(), &mut rng).is_err());
}

#[test]
fn seeding_rejects_non_positive_duration() {
    let mut rng = StdRng::seed_from_u64(1);
    assert!(seed_initial_round(pool(4), 0, Utc::now(), &mut rng).is_err());
    assert!(seed_initial_round(pool(4), -10, Utc::now(), &mut rng).is_err());
}

#[test]
fn seeding_sets_end_time_from_duration() {
    let mut rng = StdRng::seed_from_u64(7);
    let now = Utc::now();
    let round = seed_initial_round(pool(4), 45, now, &mut rng).unwrap();
    assert_eq!(round.end_time, now + Duration::minutes(45));
}

#[test]
fn seeding_shuffles_deterministically_per_seed() {
    let mut rng_a = StdRng::seed_from_u64(9);
    let mut rng_b = StdRng::seed_from_u64(9);
    let round_a = seed_initial_round(pool(8), 60, Utc::now(), &mut rng_a).unwrap();
    let round_b = seed_initial_round(pool(8), 60, Utc::now(), &mut rng_b).unwrap();
    assert_eq!(round_a, round_b);
}

#[test]
fn build_round_assigns_one_based_stable_match_ids() {
    let round = build_round(pool(5), 2, "Round 3".to_string(), Utc::now());
    let ids: Vec<i64> = round.matches.iter().map(|m| m.match_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(round.matches[2].is_bye());
}

// ---- Winner resolution ----

#[test]
fn tie_resolves_to_contestant_a() {
    let mut round = build_round(pool(2), 0, "Round 1".to_string(), Utc::now());
    round.matches[0].votes_a = 3;
    round.matches[0].votes_b = 3;

    let winners = resolve_winners(&mut round);
    assert_eq!(winners.len(), 1);
    assert_eq!(winners[0].id, round.matches[0].contestant_a.id);
    assert_eq!(
        round.matches[0].winner_id.as_deref(),
        Some(round.matches[0].contestant_a.id.as_str())
    );
}

#[test]
fn higher_vote_count_wins() {
    let mut round = build_round(pool(4), 0, "Round 1".to_string(), Utc::now());
    round.matches[0].votes_a = 1;
    round.matches[0].votes_b = 5;
    round.matches[1].votes_a = 2;
    round.matches[1].votes_b = 0;

    let winners = resolve_winners(&mut round);
    assert_eq!(winners[0].id, round.matches[0].contestant_b.as_ref().unwrap().id);
    assert_eq!(winners[1].id, round.matches[1].contestant_a.id);
}

#[test]
fn bye_advances_its_sole_contestant() {
    let mut round = build_round(pool(3), 0, "Round 1".to_string(), Utc::now());
    let winners = resolve_winners(&mut round);
    assert_eq!(winners[1].id, round.matches[1].contestant_a.id);
    assert_eq!(
        round.matches[1].winner_id.as_deref(),
        Some(round.matches[1].contestant_a.id.as_str())
    );
}

// ---- Progression decisions ----

#[test]
fn open_round_leaves_tournament_unchanged() {
    let tournament = active_tournament(pool(4), 60, false);
    assert_eq!(advance(&tournament, Utc::now()), Progression::Unchanged);
}

#[test]
fn non_active_statuses_never_progress() {
    for status in [
        TournamentStatus::Draft,
        TournamentStatus::Completed,
        TournamentStatus::Cancelled,
    ] {
        let mut tournament = active_tournament(pool(4), 60, true);
        tournament.status = status;
        assert_eq!(advance(&tournament, Utc::now()), Progression::Unchanged);
    }
}

#[test]
fn expired_round_pairs_winners_in_resolution_order() {
    let mut tournament = active_tournament(pool(4), 60, true);
    // Match 1 goes to B, match 2 goes to A.
    tournament.rounds[0].matches[0].votes_b = 4;
    tournament.rounds[0].matches[1].votes_a = 2;

    let now = Utc::now();
    match advance(&tournament, now) {
        Progression::NextRound {
            closed_round,
            next_round,
        } => {
            assert!(closed_round.matches.iter().all(|m| m.winner_id.is_some()));
            assert_eq!(next_round.round_index, 1);
            assert_eq!(next_round.round_name, "Round 2");
            assert_eq!(next_round.end_time, now + Duration::minutes(60));
            assert_eq!(next_round.matches.len(), 1);

            let pairing = &next_round.matches[0];
            assert_eq!(
                pairing.contestant_a.id,
                closed_round.matches[0].contestant_b.as_ref().unwrap().id
            );
            assert_eq!(
                pairing.contestant_b.as_ref().unwrap().id,
                closed_round.matches[1].contestant_a.id
            );
            assert_eq!(pairing.votes_a, 0);
            assert_eq!(pairing.votes_b, 0);
            assert!(pairing.winner_id.is_none());
        }
        other => panic!("expected NextRound, got {other:?}"),
    }
}

#[test]
fn single_remaining_winner_completes_the_tournament() {
    let mut tournament = active_tournament(pool(2), 60, true);
    tournament.rounds[0].matches[0].votes_b = 1;

    match advance(&tournament, Utc::now()) {
        Progression::Completed { closed_round } => {
            assert_eq!(
                closed_round.matches[0].winner_id.as_deref(),
                Some(closed_round.matches[0].contestant_b.as_ref().unwrap().id.as_str())
            );
        }
        other => panic!("expected Completed, got {other:?}"),
    }
}

#[test]
fn advance_is_idempotent_for_the_same_document() {
    let mut tournament = active_tournament(pool(6), 60, true);
    tournament.rounds[0].matches[0].votes_a = 2;
    tournament.rounds[0].matches[1].votes_b = 1;

    let now = Utc::now();
    assert_eq!(advance(&tournament, now), advance(&tournament, now));
}

#[test]
fn three_contestant_bracket_runs_to_completion() {
    // Deterministic order: (A vs B), (C vs bye).
    let a = contestant("A");
    let b = contestant("B");
    let c = contestant("C");
    let mut tournament = active_tournament(vec![a.clone(), b.clone(), c.clone()], 60, true);

    assert_eq!(tournament.rounds[0].matches.len(), 2);
    assert!(tournament.rounds[0].matches[1].is_bye());

    // A beats B; C advances automatically.
    tournament.rounds[0].matches[0].votes_a = 3;
    tournament.rounds[0].matches[0].votes_b = 1;

    let next_round = match advance(&tournament, Utc::now()) {
        Progression::NextRound {
            closed_round,
            next_round,
        } => {
            tournament.rounds[0] = closed_round;
            next_round
        }
        other => panic!("expected NextRound, got {other:?}"),
    };

    assert_eq!(next_round.matches.len(), 1);
    assert_eq!(next_round.matches[0].contestant_a.id, a.id);
    assert_eq!(next_round.matches[0].contestant_b.as_ref().unwrap().id, c.id);

    // Round 2 closes with C ahead: C is champion.
    let mut final_round = next_round;
    final_round.end_time = Utc::now() - Duration::minutes(1);
    final_round.matches[0].votes_b = 2;
    tournament.rounds.push(final_round);
    tournament.current_round_index = 1;

    match advance(&tournament, Utc::now()) {
        Progression::Completed { closed_round } => {
            assert_eq!(closed_round.matches[0].winner_id.as_deref(), Some(c.id.as_str()));
        }
        other => panic!("expected Completed, got {other:?}"),
    }
}
