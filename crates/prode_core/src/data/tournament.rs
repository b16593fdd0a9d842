//! Embedded tournament reference data.
//!
//! Team catalog, group fixtures, playoff paths and the knockout format are
//! compiled into the binary with `include_str!` and parsed once on first use.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::OnceLock;

use serde::Deserialize;

use crate::error::{ProdeError, Result};
use crate::models::{Match, PlayoffPath, SlotTeam, Team, TeamId, TournamentFormat};

// =============================================================================
// Embedded YAML Data
// =============================================================================

pub const TEAMS_YAML: &str = include_str!("../../../../data/tournament/teams.yaml");

pub const FIXTURES_YAML: &str = include_str!("../../../../data/tournament/fixtures.yaml");

pub const PLAYOFFS_YAML: &str = include_str!("../../../../data/tournament/playoffs.yaml");

pub const FORMAT_YAML: &str = include_str!("../../../../data/tournament/format.yaml");

static WORLD_CUP_2026: OnceLock<Tournament> = OnceLock::new();

// =============================================================================
// File layouts
// =============================================================================

#[derive(Debug, Deserialize)]
struct TeamCatalog {
    teams: Vec<Team>,
}

#[derive(Debug, Deserialize)]
struct FixtureEntry {
    id: String,
    group: String,
    #[serde(default)]
    kickoff: String,
    #[serde(default)]
    venue: Option<String>,
    home: TeamId,
    away: TeamId,
}

#[derive(Debug, Deserialize)]
struct FixtureList {
    fixtures: Vec<FixtureEntry>,
}

#[derive(Debug, Deserialize)]
struct PlayoffList {
    paths: Vec<PlayoffPath>,
}

// =============================================================================
// Team registry
// =============================================================================

/// Lookup over the team catalog. Iteration keeps catalog order.
#[derive(Debug, Clone, Default)]
pub struct TeamRegistry {
    teams: Vec<Team>,
    index: HashMap<TeamId, usize>,
}

impl TeamRegistry {
    pub fn new(teams: Vec<Team>) -> Result<Self> {
        let mut index = HashMap::with_capacity(teams.len());
        for (i, team) in teams.iter().enumerate() {
            if index.insert(team.id.clone(), i).is_some() {
                return Err(ProdeError::InvalidData(format!("duplicate team id {}", team.id)));
            }
        }
        Ok(Self { teams, index })
    }

    pub fn get(&self, team_id: &str) -> Option<&Team> {
        self.index.get(team_id).map(|&i| &self.teams[i])
    }

    pub fn contains(&self, team_id: &str) -> bool {
        self.index.contains_key(team_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Team> {
        self.teams.iter()
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &Team> {
        self.teams.iter().filter(|t| t.placeholder)
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Display name, falling back to the raw id for unknown teams.
    pub fn name_of<'a>(&'a self, team_id: &'a str) -> &'a str {
        self.get(team_id).map(|t| t.name.as_str()).unwrap_or(team_id)
    }
}

// =============================================================================
// Tournament bundle
// =============================================================================

/// Static reference data for one tournament edition.
#[derive(Debug, Clone)]
pub struct Tournament {
    pub registry: TeamRegistry,
    /// Group fixtures as drawn, placeholders included
    pub fixtures: Vec<Match>,
    pub playoffs: Vec<PlayoffPath>,
    pub format: TournamentFormat,
}

impl Tournament {
    /// Embedded 48-team edition.
    ///
    /// # Panics
    ///
    /// Panics if the embedded YAML fails to parse or validate; the data is
    /// compiled in, so this only happens on a broken build.
    pub fn world_cup_2026() -> &'static Tournament {
        WORLD_CUP_2026.get_or_init(|| {
            Tournament::from_yaml(TEAMS_YAML, FIXTURES_YAML, PLAYOFFS_YAML, FORMAT_YAML)
                .expect("Failed to load embedded tournament data")
        })
    }

    pub fn from_yaml(teams: &str, fixtures: &str, playoffs: &str, format: &str) -> Result<Self> {
        let catalog: TeamCatalog = serde_yaml::from_str(teams)?;
        let fixture_list: FixtureList = serde_yaml::from_str(fixtures)?;
        let playoff_list: PlayoffList = serde_yaml::from_str(playoffs)?;
        let format = TournamentFormat::from_yaml(format)?;

        let registry = TeamRegistry::new(catalog.teams)?;
        let fixtures = fixture_list
            .fixtures
            .into_iter()
            .map(|entry| {
                let mut m = Match::group_fixture(&entry.id, &entry.group, &entry.home, &entry.away);
                m.kickoff = entry.kickoff;
                m.venue = entry.venue;
                m
            })
            .collect();

        let tournament = Self { registry, fixtures, playoffs: playoff_list.paths, format };
        tournament.validate()?;
        Ok(tournament)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| -> Result<()> { Err(ProdeError::InvalidData(msg)) };

        let mut ids = BTreeSet::new();
        for fixture in &self.fixtures {
            fixture.validate().map_err(ProdeError::InvalidData)?;
            if !ids.insert(fixture.id.as_str()) {
                return invalid(format!("duplicate fixture id {}", fixture.id));
            }
            for slot in [&fixture.home, &fixture.away] {
                match slot.team_id() {
                    Some(id) if self.registry.contains(id) => {}
                    Some(id) => return invalid(format!("fixture {} uses unknown team {}", fixture.id, id)),
                    None => return invalid(format!("fixture {} has an unresolved slot", fixture.id)),
                }
            }
        }

        for template_id in self
            .format
            .round_of_32
            .iter()
            .map(|t| t.id.as_str())
            .chain(self.format.later_rounds.iter().map(|t| t.id.as_str()))
        {
            if ids.contains(template_id) {
                return invalid(format!("knockout id {} clashes with a group fixture", template_id));
            }
        }

        let groups = self.group_labels().len();
        if self.format.best_third_places > groups {
            return invalid(format!(
                "{} best third places requested from {} groups",
                self.format.best_third_places, groups
            ));
        }
        let qualifiers = groups * 2 + self.format.best_third_places;
        if qualifiers != self.format.round_of_32.len() * 2 {
            return invalid(format!(
                "{} qualifiers do not fill {} first-round matches",
                qualifiers,
                self.format.round_of_32.len()
            ));
        }

        for path in &self.playoffs {
            match self.registry.get(&path.id) {
                Some(team) if team.placeholder => {}
                _ => return invalid(format!("playoff path {} is not a placeholder team", path.id)),
            }
            if let Some(unknown) = path.candidates.iter().find(|c| !self.registry.contains(c)) {
                return invalid(format!("playoff path {} lists unknown team {}", path.id, unknown));
            }
        }

        Ok(())
    }

    pub fn playoff_path(&self, placeholder_id: &str) -> Option<&PlayoffPath> {
        self.playoffs.iter().find(|p| p.id == placeholder_id)
    }

    /// Group labels in sorted order.
    pub fn group_labels(&self) -> Vec<String> {
        let labels: BTreeSet<&str> = self.fixtures.iter().filter_map(|m| m.group.as_deref()).collect();
        labels.into_iter().map(str::to_string).collect()
    }

    pub fn validate_resolution(&self, placeholder_id: &str, team_id: &str) -> Result<()> {
        match self.playoff_path(placeholder_id) {
            Some(path) if path.allows(team_id) => Ok(()),
            _ => Err(ProdeError::InvalidResolution {
                placeholder_id: placeholder_id.to_string(),
                team_id: team_id.to_string(),
            }),
        }
    }

    /// Group fixtures with every resolved placeholder swapped for its chosen team.
    pub fn resolved_fixtures(&self, resolutions: &BTreeMap<TeamId, TeamId>) -> Result<Vec<Match>> {
        for (placeholder_id, team_id) in resolutions {
            self.validate_resolution(placeholder_id, team_id)?;
        }
        Ok(resolve_playoffs(&self.fixtures, resolutions))
    }
}

/// Replaces placeholder teams in `fixtures` according to `resolutions`
/// (placeholder id -> chosen team id). Unresolved placeholders stay as they are.
pub fn resolve_playoffs(fixtures: &[Match], resolutions: &BTreeMap<TeamId, TeamId>) -> Vec<Match> {
    let swap = |slot: &SlotTeam| match slot {
        SlotTeam::Resolved(id) => match resolutions.get(id) {
            Some(chosen) => SlotTeam::Resolved(chosen.clone()),
            None => slot.clone(),
        },
        SlotTeam::Unresolved => SlotTeam::Unresolved,
    };

    fixtures
        .iter()
        .map(|m| Match { home: swap(&m.home), away: swap(&m.away), ..m.clone() })
        .collect()
}
