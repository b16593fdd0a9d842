//! # prode_core - Tournament Prediction Game Core
//!
//! Scoring, group standings and knockout bracket logic for a prediction game
//! played over a group stage followed by single elimination.
//!
//! ## Features
//! - Pure scoring of scoreline predictions (exact / outcome / miss / pending)
//! - Group tables with a configurable tie-break order
//! - Knockout bracket seeded from a data-driven format template
//! - Winner propagation over explicit next-match links, with replay of saved picks
//! - Embedded 48-team edition, overridable format via config
//!
//! Every operation takes its full input and returns new values; nothing in
//! the crate holds global mutable state.

pub mod bracket;
pub mod config;
pub mod data;
pub mod error;
pub mod feed;
pub mod league;
pub mod models;
pub mod profile;
pub mod scoring;
pub mod standings;

pub use bracket::{generate_knockout, record_pick, Advance, Bracket, RestoreReport, StalePick};
pub use config::{FeedConfig, ProdeConfig};
pub use data::{resolve_playoffs, TeamRegistry, Tournament};
pub use error::{ProdeError, Result};
pub use feed::{ManualResults, MockResultsFeed, ResultsFeed};
pub use league::{leaderboard, LeaderboardEntry};
pub use models::{
    BracketSelection, Match, MatchId, NextMatchLink, Outcome, Prediction, PredictionMap, Scoreline, SeedSlot,
    SlotSide, SlotTeam, Stage, Team, TeamId, TieBreaker, TournamentFormat,
};
pub use profile::{generate_profile_code, restore, ProdeState, UserProfile, PROFILE_VERSION};
pub use scoring::{compare, score, score_with, summarize, total_score, ScoreResult, ScoreStatus, ScoringRules};
pub use standings::{
    compute_standings, compute_standings_with, groups_complete, missing_predictions, GroupStat, Qualification,
    Standings,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use sha2::{Digest, Sha256};

    fn sha256_hex(bytes: &[u8]) -> String {
        let digest = Sha256::digest(bytes);
        let mut out = String::with_capacity(digest.len() * 2);
        for b in digest {
            out.push_str(&format!("{:02x}", b));
        }
        out
    }

    /// Seeded profile with every group match predicted and every knockout
    /// match decided for the home side.
    fn seeded_run(seed: u64) -> (UserProfile, ProdeState) {
        let t = Tournament::world_cup_2026();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut profile = UserProfile::new("ARG", 2026, &mut rng);
        profile.resolve_playoff(t, "eur_c", "tur").unwrap();
        profile.fill_random_predictions(&t.fixtures, &mut rng);

        let mut state = restore(&profile, t).unwrap();
        for stage in Stage::KNOCKOUT {
            let picks: Vec<(MatchId, TeamId)> = state
                .bracket
                .matches_in_stage(stage)
                .map(|m| (m.id.clone(), m.home.team_id().unwrap().to_string()))
                .collect();
            for (match_id, team_id) in picks {
                record_pick(&mut state.bracket, &mut profile.bracket, &match_id, &team_id).unwrap();
            }
        }
        (profile, state)
    }

    #[test]
    fn test_full_pipeline() {
        let (profile, state) = seeded_run(11);
        assert!(groups_complete(&state.fixtures, &profile.predictions));
        assert_eq!(state.standings.len(), 12);
        assert_eq!(state.bracket.len(), 31);
        assert!(state.bracket.champion(&profile.bracket).is_some());

        // official results arrive later
        let mut results = state.fixtures.clone();
        MockResultsFeed::new(5).with_probability(1.0).poll(&mut results);
        let summary = summarize(&ScoringRules::default(), &profile.predictions, &results);
        assert_eq!(summary.scored(), 72);
        assert_eq!(summary.total, total_score(&profile.predictions, &results));
    }

    #[test]
    fn test_same_input_same_bracket_hash() {
        let (_, a) = seeded_run(3);
        let (_, b) = seeded_run(3);

        let json_a = serde_json::to_string(&a.bracket).unwrap();
        let json_b = serde_json::to_string(&b.bracket).unwrap();
        assert_eq!(sha256_hex(json_a.as_bytes()), sha256_hex(json_b.as_bytes()));
        assert_eq!(a.bracket.fingerprint(), b.bracket.fingerprint());
    }

    #[test]
    fn test_saved_profile_restores_identical_state() {
        let (profile, state) = seeded_run(21);
        let json = profile.to_json().unwrap();

        let reloaded = UserProfile::from_json(&json).unwrap();
        let restored = restore(&reloaded, Tournament::world_cup_2026()).unwrap();
        assert_eq!(restored.bracket.fingerprint(), state.bracket.fingerprint());
        assert_eq!(restored.standings, state.standings);
    }
}
