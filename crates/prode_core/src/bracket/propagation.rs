use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::Bracket;
use crate::error::{ProdeError, Result};
use crate::models::{BracketSelection, MatchId, SlotSide, SlotTeam, Stage, TeamId};

/// Where a picked winner landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advance {
    pub match_id: MatchId,
    pub slot: SlotSide,
    pub team_id: TeamId,
    /// Team that held the slot before, when it was a different one
    pub replaced: Option<TeamId>,
}

/// A saved pick that no longer fits the bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StalePick {
    pub match_id: MatchId,
    pub team_id: TeamId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreReport {
    pub applied: usize,
    pub stale: Vec<StalePick>,
}

impl Bracket {
    /// Sends `team_id` through to the slot named by the match's next link,
    /// overwriting whatever was there. Picking again for the same match
    /// replaces the earlier winner; later picks that depended on it are not
    /// touched (see `stale_picks`).
    ///
    /// Returns `None` for the final, which feeds nothing.
    pub fn apply_winner(&mut self, match_id: &str, team_id: &str) -> Result<Option<Advance>> {
        let m = self.get(match_id).ok_or_else(|| ProdeError::UnknownMatch(match_id.to_string()))?;
        if !m.has_participant(team_id) {
            return Err(ProdeError::NotAParticipant {
                match_id: match_id.to_string(),
                team_id: team_id.to_string(),
            });
        }
        self.advance(match_id, team_id)
    }

    /// Writes the winner into the linked slot without checking who plays.
    fn advance(&mut self, match_id: &str, team_id: &str) -> Result<Option<Advance>> {
        let m = self.get(match_id).ok_or_else(|| ProdeError::UnknownMatch(match_id.to_string()))?;
        let Some(link) = m.next.clone() else {
            return Ok(None);
        };

        let target = self.get_mut(&link.match_id).ok_or_else(|| ProdeError::UnknownMatch(link.match_id.clone()))?;
        let previous = std::mem::replace(target.slot_mut(link.slot), SlotTeam::resolved(team_id));
        let replaced = match previous {
            SlotTeam::Resolved(prev) if prev != team_id => Some(prev),
            _ => None,
        };

        debug!(from = match_id, to = %link.match_id, slot = ?link.slot, team = team_id, ?replaced, "advanced winner");
        Ok(Some(Advance { match_id: link.match_id, slot: link.slot, team_id: team_id.to_string(), replaced }))
    }

    /// Replays a saved selection into a freshly generated bracket, one stage at
    /// a time from the first round up. Every decided match is written through,
    /// so the result equals the bracket the picks produced live, however often
    /// earlier picks were changed. Picks whose team is no longer in the match
    /// are still written and are also reported as stale; picks for matches
    /// outside the bracket are only reported.
    pub fn restore(&mut self, selection: &BracketSelection) -> RestoreReport {
        let mut report = RestoreReport::default();

        for (match_id, team_id) in selection.iter() {
            if self.get(match_id).is_none() {
                warn!(match_id = %match_id, team = %team_id, "pick for a match outside the bracket");
                report.stale.push(StalePick { match_id: match_id.clone(), team_id: team_id.clone() });
            }
        }

        for stage in Stage::KNOCKOUT {
            let ids: Vec<MatchId> = self.matches_in_stage(stage).map(|m| m.id.clone()).collect();
            for match_id in ids {
                let Some(team_id) = selection.winner(&match_id) else { continue };
                if !self.get(&match_id).is_some_and(|m| m.has_participant(team_id)) {
                    warn!(match_id = %match_id, team = team_id, "replaying pick for a team no longer in the match");
                    report.stale.push(StalePick { match_id: match_id.clone(), team_id: team_id.to_string() });
                }
                match self.advance(&match_id, team_id) {
                    Ok(_) => report.applied += 1,
                    Err(err) => warn!(match_id = %match_id, team = team_id, %err, "pick could not be replayed"),
                }
            }
        }

        info!(applied = report.applied, stale = report.stale.len(), "restored bracket selection");
        report
    }

    /// Picks whose team does not currently play in the picked match.
    pub fn stale_picks(&self, selection: &BracketSelection) -> Vec<StalePick> {
        selection
            .iter()
            .filter(|(match_id, team_id)| !self.get(match_id).is_some_and(|m| m.has_participant(team_id)))
            .map(|(match_id, team_id)| StalePick { match_id: match_id.clone(), team_id: team_id.clone() })
            .collect()
    }
}

/// Interactive pick: advances the winner and stores it in the selection.
/// A rejected pick leaves both untouched.
pub fn record_pick(
    bracket: &mut Bracket,
    selection: &mut BracketSelection,
    match_id: &str,
    team_id: &str,
) -> Result<Option<Advance>> {
    let advance = bracket.apply_winner(match_id, team_id)?;
    selection.set(match_id, team_id);
    Ok(advance)
}
