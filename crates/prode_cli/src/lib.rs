//! Prode CLI Library
//!
//! File handling and text rendering for the `prode` command. The game logic
//! lives in `prode_core`; this crate reads and writes profile and results
//! files and formats tables for the terminal.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use prode_core::{
    Bracket, BracketSelection, Match, MatchId, ManualResults, ResultsFeed, ScoreStatus, Scoreline, ScoringRules,
    SlotTeam, Stage, Standings, TeamRegistry, UserProfile,
};

// ========== Files ==========

pub fn load_profile(path: &Path) -> Result<UserProfile> {
    let json = fs::read_to_string(path).with_context(|| format!("Failed to read profile: {}", path.display()))?;
    UserProfile::from_json(&json).with_context(|| format!("Failed to decode profile: {}", path.display()))
}

pub fn save_profile(path: &Path, profile: &UserProfile) -> Result<()> {
    let json = serde_json::to_string_pretty(profile)?;
    fs::write(path, json).with_context(|| format!("Failed to write profile: {}", path.display()))?;
    Ok(())
}

/// Results file: `{ "a1": { "home": 2, "away": 1 }, ... }`.
pub fn load_results(path: &Path) -> Result<ManualResults> {
    let json = fs::read_to_string(path).with_context(|| format!("Failed to read results: {}", path.display()))?;
    let scores: BTreeMap<MatchId, Scoreline> =
        serde_json::from_str(&json).with_context(|| format!("Failed to parse results: {}", path.display()))?;
    Ok(ManualResults(scores))
}

/// Writes the official scores of every finished match.
pub fn save_results(path: &Path, matches: &[Match]) -> Result<usize> {
    let scores: BTreeMap<&str, Scoreline> =
        matches.iter().filter_map(|m| Some((m.id.as_str(), m.final_score()?))).collect();
    let json = serde_json::to_string_pretty(&scores)?;
    fs::write(path, json).with_context(|| format!("Failed to write results: {}", path.display()))?;
    Ok(scores.len())
}

/// Fixtures with the results file applied.
pub fn apply_results(fixtures: &[Match], results: &mut ManualResults) -> Vec<Match> {
    let mut matches = fixtures.to_vec();
    results.poll(&mut matches);
    matches
}

// ========== Rendering ==========

fn slot_name<'a>(slot: &'a SlotTeam, registry: &'a TeamRegistry) -> &'a str {
    match slot.team_id() {
        Some(id) => registry.name_of(id),
        None => "TBD",
    }
}

pub fn render_standings(standings: &Standings, registry: &TeamRegistry, best_thirds: usize) -> String {
    let qualification = standings.qualification(best_thirds);
    let mut out = String::new();
    for (label, table) in standings.iter() {
        let _ = writeln!(out, "Group {}", label);
        let _ = writeln!(out, "  {:<3} {:<24} {:>2} {:>2} {:>2} {:>2} {:>4} {:>3}", "#", "Team", "P", "W", "D", "L", "GD", "Pts");
        for (i, stat) in table.iter().enumerate() {
            let mark = match qualification.get(&stat.team_id) {
                Some(q) if q.qualifies() => "*",
                _ => " ",
            };
            let _ = writeln!(
                out,
                "  {:<3} {:<24} {:>2} {:>2} {:>2} {:>2} {:>+4} {:>3} {}",
                i + 1,
                registry.name_of(&stat.team_id),
                stat.played,
                stat.won,
                stat.drawn,
                stat.lost,
                stat.goal_difference,
                stat.points,
                mark
            );
        }
        out.push('\n');
    }
    out
}

pub fn render_bracket(bracket: &Bracket, registry: &TeamRegistry, selection: &BracketSelection) -> String {
    let mut out = String::new();
    for stage in Stage::KNOCKOUT {
        let _ = writeln!(out, "{}", stage);
        for m in bracket.matches_in_stage(stage) {
            let pick = selection.winner(&m.id).map(|id| registry.name_of(id)).unwrap_or("-");
            let _ = writeln!(
                out,
                "  {:<4} {:<24} v {:<24} -> {}",
                m.id,
                slot_name(&m.home, registry),
                slot_name(&m.away, registry),
                pick
            );
        }
        out.push('\n');
    }
    if let Some(champion) = bracket.champion(selection) {
        let _ = writeln!(out, "Champion: {}", registry.name_of(champion));
    }
    out
}

pub fn render_scores(profile: &UserProfile, matches: &[Match], rules: &ScoringRules) -> String {
    let mut out = String::new();
    for result in prode_core::scoring::score_all(rules, &profile.predictions, matches) {
        if result.status == ScoreStatus::Pending {
            continue;
        }
        let _ = writeln!(out, "  {:<4} {:<15} {:>2}", result.match_id, format!("{:?}", result.status), result.points);
    }
    let summary = prode_core::summarize(rules, &profile.predictions, matches);
    let _ = writeln!(
        out,
        "Total: {} pts ({} exact, {} outcome, {} miss, {} pending)",
        summary.total, summary.exact, summary.correct_outcome, summary.miss, summary.pending
    );
    out
}
