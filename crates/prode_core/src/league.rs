use serde::{Deserialize, Serialize};

use crate::models::Match;
use crate::profile::UserProfile;
use crate::scoring::{summarize, ScoreSummary, ScoringRules};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based, sequential; equal points do not share a rank
    pub rank: usize,
    pub user_id: String,
    pub user_name: Option<String>,
    pub points: u32,
    pub summary: ScoreSummary,
}

/// Ranks profiles by total points against `matches`, highest first. Profiles
/// on equal points keep their input order.
pub fn leaderboard(profiles: &[UserProfile], matches: &[Match]) -> Vec<LeaderboardEntry> {
    leaderboard_with(&ScoringRules::default(), profiles, matches)
}

pub fn leaderboard_with(rules: &ScoringRules, profiles: &[UserProfile], matches: &[Match]) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = profiles
        .iter()
        .map(|p| {
            let summary = summarize(rules, &p.predictions, matches);
            LeaderboardEntry {
                rank: 0,
                user_id: p.user_id.clone(),
                user_name: p.user_name.clone(),
                points: summary.total,
                summary,
            }
        })
        .collect();

    entries.sort_by(|a, b| b.points.cmp(&a.points));
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i + 1;
    }
    entries
}
