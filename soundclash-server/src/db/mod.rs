//! Store operations for tournament documents and the vote log
//!
//! Two consistency granularities on the tournament row: whole-document
//! (or whole-round) conditional replaces for lifecycle and round
//! transitions, and a single-statement JSON counter increment for votes.
//! Each guarded UPDATE reports via `rows_affected` whether it won, which
//! is what the callers' compare-and-set semantics hang off.

pub mod tournaments;
pub mod vote_logs;
