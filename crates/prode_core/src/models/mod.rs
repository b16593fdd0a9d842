pub mod fixture;
pub mod format;
pub mod prediction;
pub mod team;

pub use fixture::{Match, MatchId, NextMatchLink, Outcome, Scoreline, SlotSide, SlotTeam, Stage};
pub use format::{KnockoutTemplate, SeedSlot, SeedTemplate, TieBreaker, TournamentFormat};
pub use prediction::{BracketSelection, Prediction, PredictionMap};
pub use team::{PlayoffPath, Team, TeamId};
