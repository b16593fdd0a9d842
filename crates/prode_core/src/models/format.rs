//! Knockout format description.
//!
//! The first knockout round is a lookup table of seed descriptors, the rounds
//! above it are templates with unresolved slots. Each template match names the
//! slot of the later match its winner fills, so propagation never has to guess.

use super::fixture::{MatchId, NextMatchLink, SlotSide, Stage};
use crate::error::{ProdeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Ranking criteria, applied in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreaker {
    Points,
    GoalDifference,
    GoalsFor,
}

impl TieBreaker {
    pub const DEFAULT_ORDER: [TieBreaker; 3] =
        [TieBreaker::Points, TieBreaker::GoalDifference, TieBreaker::GoalsFor];
}

/// Where a first-round team comes from.
///
/// String form: `1A` winner of group A, `2A` runner-up of group A, `3#1` best
/// third-placed team (1-based rank among qualifying thirds).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SeedSlot {
    GroupWinner(String),
    RunnerUp(String),
    BestThird(usize),
}

impl FromStr for SeedSlot {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(rank) = s.strip_prefix("3#") {
            return match rank.parse::<usize>() {
                Ok(rank) if rank > 0 => Ok(SeedSlot::BestThird(rank)),
                _ => Err(format!("invalid best-third rank in seed '{}'", s)),
            };
        }
        if let Some(group) = s.strip_prefix('1').filter(|g| !g.is_empty()) {
            return Ok(SeedSlot::GroupWinner(group.to_string()));
        }
        if let Some(group) = s.strip_prefix('2').filter(|g| !g.is_empty()) {
            return Ok(SeedSlot::RunnerUp(group.to_string()));
        }
        Err(format!("unrecognised seed '{}'", s))
    }
}

impl TryFrom<String> for SeedSlot {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SeedSlot> for String {
    fn from(slot: SeedSlot) -> Self {
        slot.to_string()
    }
}

impl fmt::Display for SeedSlot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SeedSlot::GroupWinner(group) => write!(f, "1{}", group),
            SeedSlot::RunnerUp(group) => write!(f, "2{}", group),
            SeedSlot::BestThird(rank) => write!(f, "3#{}", rank),
        }
    }
}

/// First-round pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedTemplate {
    pub id: MatchId,
    #[serde(default)]
    pub kickoff: String,
    pub home: SeedSlot,
    pub away: SeedSlot,
    #[serde(default)]
    pub next: Option<NextMatchLink>,
}

/// Later-round match whose teams arrive through propagation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnockoutTemplate {
    pub id: MatchId,
    pub stage: Stage,
    #[serde(default)]
    pub kickoff: String,
    #[serde(default)]
    pub next: Option<NextMatchLink>,
}

fn default_tie_breakers() -> Vec<TieBreaker> {
    TieBreaker::DEFAULT_ORDER.to_vec()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentFormat {
    pub name: String,
    pub edition: u16,
    /// Size of the cross-group third-place qualification pool
    pub best_third_places: usize,
    #[serde(default = "default_tie_breakers")]
    pub tie_breakers: Vec<TieBreaker>,
    pub round_of_32: Vec<SeedTemplate>,
    pub later_rounds: Vec<KnockoutTemplate>,
}

impl TournamentFormat {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let format: TournamentFormat = serde_yaml::from_str(yaml)?;
        format.validate()?;
        Ok(format)
    }

    /// Total number of knockout matches the format produces.
    pub fn match_count(&self) -> usize {
        self.round_of_32.len() + self.later_rounds.len()
    }

    pub fn stage_of(&self, match_id: &str) -> Option<Stage> {
        if self.round_of_32.iter().any(|t| t.id == match_id) {
            return Some(Stage::RoundOf32);
        }
        self.later_rounds.iter().find(|t| t.id == match_id).map(|t| t.stage)
    }

    /// Seeds used by more than one first-round slot.
    pub fn duplicate_seeds(&self) -> Vec<SeedSlot> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for seed in self.round_of_32.iter().flat_map(|t| [&t.home, &t.away]) {
            if !seen.insert(seed) && !duplicates.contains(seed) {
                duplicates.push(seed.clone());
            }
        }
        duplicates
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| -> Result<()> { Err(ProdeError::InvalidFormat(msg)) };

        if self.round_of_32.is_empty() {
            return invalid("round_of_32 is empty".to_string());
        }
        if self.tie_breakers.is_empty() {
            return invalid("tie_breakers is empty".to_string());
        }

        let mut stages: HashMap<&str, Stage> = HashMap::new();
        for (id, stage) in self
            .round_of_32
            .iter()
            .map(|t| (t.id.as_str(), Stage::RoundOf32))
            .chain(self.later_rounds.iter().map(|t| (t.id.as_str(), t.stage)))
        {
            if !stage.is_knockout() {
                return invalid(format!("{} is a group-stage match", id));
            }
            if stages.insert(id, stage).is_some() {
                return invalid(format!("duplicate match id {}", id));
            }
        }

        for seed in self.round_of_32.iter().flat_map(|t| [&t.home, &t.away]) {
            if let SeedSlot::BestThird(rank) = seed {
                if *rank > self.best_third_places {
                    return invalid(format!(
                        "seed {} exceeds the {} qualifying third places",
                        seed, self.best_third_places
                    ));
                }
            }
        }

        let links = self
            .round_of_32
            .iter()
            .map(|t| (t.id.as_str(), Stage::RoundOf32, t.next.as_ref()))
            .chain(self.later_rounds.iter().map(|t| (t.id.as_str(), t.stage, t.next.as_ref())));

        let mut terminals = Vec::new();
        let mut fed: HashMap<(&str, SlotSide), &str> = HashMap::new();
        for (id, stage, next) in links {
            let Some(link) = next else {
                terminals.push(id);
                continue;
            };
            let Some(target_stage) = stages.get(link.match_id.as_str()) else {
                return invalid(format!("{} links to unknown match {}", id, link.match_id));
            };
            if *target_stage <= stage {
                return invalid(format!("{} links to {} which is not a later stage", id, link.match_id));
            }
            if let Some(other) = fed.insert((link.match_id.as_str(), link.slot), id) {
                return invalid(format!(
                    "{} and {} both feed the {:?} slot of {}",
                    other, id, link.slot, link.match_id
                ));
            }
        }

        if terminals.len() != 1 {
            return invalid(format!("expected exactly one final match, found {:?}", terminals));
        }

        for template in &self.later_rounds {
            for side in [SlotSide::Home, SlotSide::Away] {
                if !fed.contains_key(&(template.id.as_str(), side)) {
                    return invalid(format!("{:?} slot of {} is never filled", side, template.id));
                }
            }
        }

        let duplicates = self.duplicate_seeds();
        if !duplicates.is_empty() {
            tracing::warn!(name = %self.name, ?duplicates, "seeds used by more than one pairing");
        }

        Ok(())
    }
}
