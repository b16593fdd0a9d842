//! Saved user profile and state restoration
//!
//! A profile bundles identity, group predictions, playoff resolutions and
//! knockout picks. It is stored by the caller as a JSON blob in camelCase
//! field names; this module decodes, migrates and validates that blob and
//! rebuilds the derived state from it.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

use crate::bracket::{generate_knockout, Bracket, StalePick};
use crate::data::Tournament;
use crate::error::Result;
use crate::models::{BracketSelection, Match, Prediction, PredictionMap, TeamId};
use crate::standings::{compute_standings_with, Standings};

pub const PROFILE_VERSION: u32 = 1;

const CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const CODE_HASH_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_entries"))]
pub struct UserProfile {
    /// Shareable profile code, e.g. `PRODE-ARG-2026-7K2F`
    #[validate(length(min = 1, max = 64))]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 64))]
    pub user_name: Option<String>,
    #[validate(length(min = 1, max = 3))]
    pub country_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 64))]
    pub club: Option<String>,
    #[serde(default)]
    pub predictions: PredictionMap,
    /// Placeholder team id -> chosen team id
    #[serde(default, deserialize_with = "resolutions_from_ids_or_teams")]
    pub playoff_resolutions: BTreeMap<TeamId, TeamId>,
    #[serde(default)]
    pub bracket: BracketSelection,
    #[serde(default, with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub version: u32,
}

fn validate_entries(profile: &UserProfile) -> std::result::Result<(), ValidationError> {
    if profile.predictions.iter().any(|(key, p)| *key != p.match_id) {
        return Err(ValidationError::new("prediction_key_mismatch"));
    }
    if profile.bracket.iter().any(|(_, team)| team.is_empty()) {
        return Err(ValidationError::new("empty_bracket_pick"));
    }
    Ok(())
}

/// Resolutions were first saved as whole team objects, later as bare ids.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredResolution {
    Id(TeamId),
    Team { id: TeamId },
}

fn resolutions_from_ids_or_teams<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<TeamId, TeamId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<TeamId, StoredResolution>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(placeholder, stored)| {
            let team = match stored {
                StoredResolution::Id(id) | StoredResolution::Team { id } => id,
            };
            (placeholder, team)
        })
        .collect())
}

/// `PRODE-{country}-{edition}-{hash}`. The country keeps its first three
/// ASCII letters, upper-cased; the hash is four base-36 characters.
pub fn generate_profile_code<R: Rng + ?Sized>(country: &str, edition: u16, rng: &mut R) -> String {
    let country = clean_country(country);
    let hash: String = (0..CODE_HASH_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect();
    format!("PRODE-{}-{}-{}", country, edition, hash)
}

fn clean_country(country: &str) -> String {
    let cleaned: String =
        country.chars().filter(char::is_ascii_alphabetic).map(|c| c.to_ascii_uppercase()).take(3).collect();
    if cleaned.is_empty() {
        "XXX".to_string()
    } else {
        cleaned
    }
}

impl UserProfile {
    pub fn new<R: Rng + ?Sized>(country: &str, edition: u16, rng: &mut R) -> Self {
        Self {
            user_id: generate_profile_code(country, edition, rng),
            user_name: None,
            country_code: clean_country(country),
            club: None,
            predictions: PredictionMap::new(),
            playoff_resolutions: BTreeMap::new(),
            bracket: BracketSelection::new(),
            created_at: Utc::now(),
            version: PROFILE_VERSION,
        }
    }

    /// Decodes a stored blob, upgrades it to the current version and
    /// validates it.
    pub fn from_json(json: &str) -> Result<Self> {
        let profile: UserProfile = serde_json::from_str(json)?;
        let profile = migrate_profile(profile);
        profile.validate()?;
        Ok(profile)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// A blob that cannot be read is treated as a new user.
    pub fn restore_or_new<R: Rng + ?Sized>(json: &str, country: &str, edition: u16, rng: &mut R) -> Self {
        match Self::from_json(json) {
            Ok(profile) => profile,
            Err(err) => {
                log::warn!("Discarding unreadable profile ({}), starting a new one", err);
                Self::new(country, edition, rng)
            }
        }
    }

    pub fn set_prediction(&mut self, match_id: &str, home: u8, away: u8) {
        self.predictions.insert(match_id.to_string(), Prediction::new(match_id, home, away));
    }

    /// Binds a placeholder team to one of its playoff candidates.
    pub fn resolve_playoff(&mut self, tournament: &Tournament, placeholder_id: &str, team_id: &str) -> Result<()> {
        tournament.validate_resolution(placeholder_id, team_id)?;
        self.playoff_resolutions.insert(placeholder_id.to_string(), team_id.to_string());
        Ok(())
    }

    /// Random group predictions with goals in `0..=2`, for demo opponents.
    pub fn fill_random_predictions<R: Rng + ?Sized>(&mut self, matches: &[Match], rng: &mut R) {
        for m in matches {
            let home = rng.gen_range(0..=2);
            let away = rng.gen_range(0..=2);
            self.set_prediction(&m.id, home, away);
        }
    }
}

/// Upgrades a decoded profile to `PROFILE_VERSION`. Profiles written by a
/// newer release load as they are and keep their version number.
pub fn migrate_profile(profile: UserProfile) -> UserProfile {
    match profile.version {
        0 => {
            let mut profile = migrate_v0_to_v1(profile);
            profile.version = PROFILE_VERSION;
            log::info!("Migrated profile {} from version 0 to {}", profile.user_id, PROFILE_VERSION);
            profile
        }
        v if v > PROFILE_VERSION => {
            log::warn!("Loading profile from future version {} (current: {})", v, PROFILE_VERSION);
            profile
        }
        _ => profile,
    }
}

/// Version 0 blobs predate the version field.
fn migrate_v0_to_v1(mut profile: UserProfile) -> UserProfile {
    log::info!("Migrating profile from version 0 to 1");

    // predictions were keyed by match id, the inner id was sometimes missing
    for (key, prediction) in profile.predictions.iter_mut() {
        if prediction.match_id != *key {
            prediction.match_id = key.clone();
        }
    }

    // country codes were stored as typed
    profile.country_code = clean_country(&profile.country_code);

    let before = profile.bracket.len();
    profile.bracket = profile
        .bracket
        .iter()
        .filter(|(_, team)| !team.is_empty())
        .map(|(match_id, team)| (match_id.clone(), team.clone()))
        .collect();
    if profile.bracket.len() != before {
        log::warn!("Dropped {} empty bracket picks", before - profile.bracket.len());
    }

    profile
}

// =============================================================================
// Restoration
// =============================================================================

/// Everything the display layer needs, rebuilt from a profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProdeState {
    /// Group fixtures with playoff placeholders replaced
    pub fixtures: Vec<Match>,
    pub standings: Standings,
    pub bracket: Bracket,
    pub stale_picks: Vec<StalePick>,
}

impl ProdeState {
    pub fn champion<'a>(&self, profile: &'a UserProfile) -> Option<&'a str> {
        self.bracket.champion(&profile.bracket)
    }
}

/// Rebuilds fixtures, standings and bracket from a profile and replays its
/// knockout picks round by round. Picks whose team no longer plays the
/// picked match are still replayed and are listed in `stale_picks`.
pub fn restore(profile: &UserProfile, tournament: &Tournament) -> Result<ProdeState> {
    let fixtures = tournament.resolved_fixtures(&profile.playoff_resolutions)?;
    let standings = compute_standings_with(&fixtures, &profile.predictions, &tournament.format.tie_breakers);
    let mut bracket = generate_knockout(&standings, &tournament.registry, &tournament.format);
    let report = bracket.restore(&profile.bracket);

    tracing::info!(
        user = %profile.user_id,
        predictions = profile.predictions.len(),
        picks = report.applied,
        stale = report.stale.len(),
        "restored profile state"
    );
    Ok(ProdeState { fixtures, standings, bracket, stale_picks: report.stale })
}
