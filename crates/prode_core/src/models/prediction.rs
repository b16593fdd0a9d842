use super::fixture::{MatchId, Scoreline};
use super::team::TeamId;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A user's scoreline guess for one match. Either goal value may be unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    /// Older saves left this out and relied on the map key
    #[serde(default)]
    pub match_id: MatchId,
    #[serde(default, deserialize_with = "lenient_goals")]
    pub home_score: Option<u8>,
    #[serde(default, deserialize_with = "lenient_goals")]
    pub away_score: Option<u8>,
}

impl Prediction {
    pub fn new(match_id: &str, home: u8, away: u8) -> Self {
        Self { match_id: match_id.to_string(), home_score: Some(home), away_score: Some(away) }
    }

    pub fn unset(match_id: &str) -> Self {
        Self { match_id: match_id.to_string(), home_score: None, away_score: None }
    }

    pub fn is_complete(&self) -> bool {
        self.scoreline().is_some()
    }

    pub fn scoreline(&self) -> Option<Scoreline> {
        match (self.home_score, self.away_score) {
            (Some(home), Some(away)) => Some(Scoreline::new(home, away)),
            _ => None,
        }
    }
}

/// Predictions keyed by match id.
pub type PredictionMap = BTreeMap<MatchId, Prediction>;

/// Stored goal values come from form inputs: numbers, numeric strings, `""` or
/// garbage. Anything that is not a goal count in `0..=255` reads as unset.
fn lenient_goals<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(goals_from_value))
}

fn goals_from_value(value: &Value) -> Option<u8> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|g| u8::try_from(g).ok()),
        Value::String(s) => s.trim().parse::<u8>().ok(),
        _ => None,
    }
}

/// Knockout picks: match id -> id of the team the user sends through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BracketSelection(BTreeMap<MatchId, TeamId>);

impl BracketSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn winner(&self, match_id: &str) -> Option<&str> {
        self.0.get(match_id).map(String::as_str)
    }

    /// Returns the previous pick for the match, if any.
    pub fn set(&mut self, match_id: &str, team_id: &str) -> Option<TeamId> {
        self.0.insert(match_id.to_string(), team_id.to_string())
    }

    pub fn clear(&mut self, match_id: &str) -> Option<TeamId> {
        self.0.remove(match_id)
    }

    pub fn is_decided(&self, match_id: &str) -> bool {
        self.0.contains_key(match_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MatchId, &TeamId)> {
        self.0.iter()
    }
}

impl FromIterator<(MatchId, TeamId)> for BracketSelection {
    fn from_iter<I: IntoIterator<Item = (MatchId, TeamId)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
