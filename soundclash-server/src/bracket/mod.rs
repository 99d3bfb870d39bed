//! Bracket engine
//!
//! Pure decision logic over a tournament's state (seeding, round expiry,
//! winner resolution, next-round construction, completion detection) plus
//! the store shim that applies those decisions with compare-and-set
//! round advancement.

pub mod engine;
pub mod progression;

pub use engine::{advance, build_round, resolve_winners, seed_initial_round, Progression};
pub use progression::check_progression;
