use serde::{Deserialize, Serialize};

pub type TeamId = String;

const FLAG_CDN: &str = "https://flagcdn.com/w80";

/// Immutable reference entry from the team catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    /// Three-letter country code shown next to the name
    pub code: String,
    /// Two-letter (or subdivision) code used to build the flag image reference
    pub flag_code: String,
    /// Stands in for a qualifier that is not yet decided
    #[serde(default)]
    pub placeholder: bool,
}

impl Team {
    pub fn new(id: &str, name: &str, code: &str, flag_code: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            code: code.to_string(),
            flag_code: flag_code.to_string(),
            placeholder: false,
        }
    }

    pub fn flag_url(&self) -> String {
        format!("{}/{}.png", FLAG_CDN, self.flag_code)
    }
}

/// A qualifier path whose winner replaces a placeholder team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoffPath {
    /// Placeholder team id this path resolves
    pub id: TeamId,
    pub name: String,
    pub candidates: Vec<TeamId>,
}

impl PlayoffPath {
    pub fn allows(&self, team_id: &str) -> bool {
        self.candidates.iter().any(|c| c == team_id)
    }
}
