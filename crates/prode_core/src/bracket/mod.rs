//! Knockout bracket
//!
//! `generator` seeds the first round from group standings and lays out the
//! later rounds as empty templates. `propagation` moves picked winners along
//! the explicit next-match links.

pub mod generator;
pub mod propagation;

pub use generator::generate_knockout;
pub use propagation::{record_pick, Advance, RestoreReport, StalePick};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::models::{BracketSelection, Match, Stage};

/// Every knockout match, first round first, in template order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    pub matches: Vec<Match>,
}

impl Bracket {
    pub fn new(matches: Vec<Match>) -> Self {
        Self { matches }
    }

    pub fn get(&self, match_id: &str) -> Option<&Match> {
        self.matches.iter().find(|m| m.id == match_id)
    }

    pub(crate) fn get_mut(&mut self, match_id: &str) -> Option<&mut Match> {
        self.matches.iter_mut().find(|m| m.id == match_id)
    }

    pub fn matches_in_stage(&self, stage: Stage) -> impl Iterator<Item = &Match> {
        self.matches.iter().filter(move |m| m.stage == stage)
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// The match without a next link.
    pub fn final_match(&self) -> Option<&Match> {
        self.matches.iter().find(|m| m.next.is_none())
    }

    /// True when every match of `stage` has a pick.
    pub fn is_stage_complete(&self, stage: Stage, selection: &BracketSelection) -> bool {
        let mut matches = self.matches_in_stage(stage).peekable();
        matches.peek().is_some() && matches.all(|m| selection.is_decided(&m.id))
    }

    /// Picked winner of the final, if that pick is still one of its finalists.
    pub fn champion<'a>(&self, selection: &'a BracketSelection) -> Option<&'a str> {
        let last = self.final_match()?;
        selection.winner(&last.id).filter(|team| last.has_participant(team))
    }

    /// SHA-256 of the JSON rendering, hex encoded. Equal brackets hash equal.
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_vec(&self.matches).unwrap_or_default();
        let digest = Sha256::digest(&json);
        let mut out = String::with_capacity(digest.len() * 2);
        for b in digest {
            out.push_str(&format!("{:02x}", b));
        }
        out
    }
}
