use super::team::TeamId;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type MatchId = String;

/// Tournament phase. Ordering follows play order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Group,
    #[serde(rename = "round_of_32")]
    RoundOf32,
    #[serde(rename = "round_of_16")]
    RoundOf16,
    QuarterFinal,
    SemiFinal,
    Final,
}

impl Stage {
    pub const KNOCKOUT: [Stage; 5] =
        [Stage::RoundOf32, Stage::RoundOf16, Stage::QuarterFinal, Stage::SemiFinal, Stage::Final];

    pub fn is_knockout(self) -> bool {
        self != Stage::Group
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Group => "Group Stage",
            Stage::RoundOf32 => "Round of 32",
            Stage::RoundOf16 => "Round of 16",
            Stage::QuarterFinal => "Quarter-finals",
            Stage::SemiFinal => "Semi-finals",
            Stage::Final => "Final",
        }
    }

    /// Next knockout stage, `None` for the final.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Group => Some(Stage::RoundOf32),
            Stage::RoundOf32 => Some(Stage::RoundOf16),
            Stage::RoundOf16 => Some(Stage::QuarterFinal),
            Stage::QuarterFinal => Some(Stage::SemiFinal),
            Stage::SemiFinal => Some(Stage::Final),
            Stage::Final => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotSide {
    Home,
    Away,
}

/// Occupant of one team slot of a match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "team_id", rename_all = "snake_case")]
pub enum SlotTeam {
    /// Waiting for a qualifier or an earlier winner
    Unresolved,
    Resolved(TeamId),
}

impl SlotTeam {
    pub fn resolved(team_id: &str) -> Self {
        SlotTeam::Resolved(team_id.to_string())
    }

    pub fn team_id(&self) -> Option<&str> {
        match self {
            SlotTeam::Resolved(id) => Some(id.as_str()),
            SlotTeam::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, SlotTeam::Resolved(_))
    }
}

/// "The winner of this match fills `slot` of `match_id`."
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NextMatchLink {
    pub match_id: MatchId,
    pub slot: SlotSide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    HomeWin,
    AwayWin,
    Draw,
}

impl Outcome {
    pub fn from_goals(home: i32, away: i32) -> Self {
        match home.cmp(&away) {
            std::cmp::Ordering::Greater => Outcome::HomeWin,
            std::cmp::Ordering::Less => Outcome::AwayWin,
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scoreline {
    pub home: u8,
    pub away: u8,
}

impl Scoreline {
    pub fn new(home: u8, away: u8) -> Self {
        Self { home, away }
    }

    pub fn outcome(&self) -> Outcome {
        Outcome::from_goals(self.home as i32, self.away as i32)
    }
}

impl fmt::Display for Scoreline {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.home, self.away)
    }
}

/// One fixture, group or knockout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub stage: Stage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub home: SlotTeam,
    pub away: SlotTeam,
    /// Display-only schedule text
    pub kickoff: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default)]
    pub finished: bool,
    /// Present only once `finished` is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub official: Option<Scoreline>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<NextMatchLink>,
}

impl Match {
    pub fn group_fixture(id: &str, group: &str, home: &str, away: &str) -> Self {
        Self {
            id: id.to_string(),
            stage: Stage::Group,
            group: Some(group.to_string()),
            home: SlotTeam::resolved(home),
            away: SlotTeam::resolved(away),
            kickoff: String::new(),
            venue: None,
            finished: false,
            official: None,
            next: None,
        }
    }

    pub fn knockout(id: &str, stage: Stage, kickoff: &str, next: Option<NextMatchLink>) -> Self {
        Self {
            id: id.to_string(),
            stage,
            group: None,
            home: SlotTeam::Unresolved,
            away: SlotTeam::Unresolved,
            kickoff: kickoff.to_string(),
            venue: None,
            finished: false,
            official: None,
            next,
        }
    }

    pub fn participant(&self, side: SlotSide) -> &SlotTeam {
        match side {
            SlotSide::Home => &self.home,
            SlotSide::Away => &self.away,
        }
    }

    pub fn slot_mut(&mut self, side: SlotSide) -> &mut SlotTeam {
        match side {
            SlotSide::Home => &mut self.home,
            SlotSide::Away => &mut self.away,
        }
    }

    pub fn has_participant(&self, team_id: &str) -> bool {
        self.home.team_id() == Some(team_id) || self.away.team_id() == Some(team_id)
    }

    pub fn mark_finished(&mut self, score: Scoreline) {
        self.finished = true;
        self.official = Some(score);
    }

    pub fn reset_result(&mut self) {
        self.finished = false;
        self.official = None;
    }

    /// Official score, only when the match is finished.
    pub fn final_score(&self) -> Option<Scoreline> {
        if self.finished {
            self.official
        } else {
            None
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.finished && self.official.is_some() {
            return Err(format!("Match {} carries an official score but is not finished", self.id));
        }
        if self.finished && self.official.is_none() {
            return Err(format!("Match {} is finished without an official score", self.id));
        }
        if !self.stage.is_knockout() && self.group.is_none() {
            return Err(format!("Group match {} has no group label", self.id));
        }
        if !self.stage.is_knockout() && self.next.is_some() {
            return Err(format!("Group match {} cannot link to a knockout match", self.id));
        }
        Ok(())
    }
}
