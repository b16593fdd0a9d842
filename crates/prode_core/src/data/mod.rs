//! Tournament reference data
//!
//! Embedded copies of the team catalog, the group fixtures, the open playoff
//! paths and the knockout format.

pub mod tournament;

pub use tournament::{
    resolve_playoffs, TeamRegistry, Tournament, FIXTURES_YAML, FORMAT_YAML, PLAYOFFS_YAML,
    TEAMS_YAML,
};
