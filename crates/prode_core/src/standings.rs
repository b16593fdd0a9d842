//! Group standings
//!
//! Aggregates group-stage predictions into ranked tables. Stats are rebuilt
//! from scratch on every call; nothing here is persisted.
//!
//! Ranking applies the tie-break list in order (points, goal difference,
//! goals for by default) and stops there. Teams still level after the last
//! criterion keep the order in which they first appear in the fixture list;
//! head-to-head and fair-play rules are not modeled.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Match, MatchId, PredictionMap, Scoreline, TeamId, TieBreaker};

pub const POINTS_WIN: u32 = 3;
pub const POINTS_DRAW: u32 = 1;

/// One row of a group table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStat {
    pub team_id: TeamId,
    pub group: String,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub points: u32,
}

impl GroupStat {
    pub fn new(team_id: &str, group: &str) -> Self {
        Self {
            team_id: team_id.to_string(),
            group: group.to_string(),
            played: 0,
            won: 0,
            drawn: 0,
            lost: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            points: 0,
        }
    }

    fn record(&mut self, scored: u8, conceded: u8) {
        self.played += 1;
        self.goals_for += scored as u32;
        self.goals_against += conceded as u32;
        self.goal_difference = self.goals_for as i32 - self.goals_against as i32;
        match scored.cmp(&conceded) {
            Ordering::Greater => {
                self.won += 1;
                self.points += POINTS_WIN;
            }
            Ordering::Equal => {
                self.drawn += 1;
                self.points += POINTS_DRAW;
            }
            Ordering::Less => self.lost += 1,
        }
    }
}

/// Better-ranked first. `Equal` when every criterion ties.
pub fn rank_order(tie_breakers: &[TieBreaker], a: &GroupStat, b: &GroupStat) -> Ordering {
    for criterion in tie_breakers {
        let ord = match criterion {
            TieBreaker::Points => b.points.cmp(&a.points),
            TieBreaker::GoalDifference => b.goal_difference.cmp(&a.goal_difference),
            TieBreaker::GoalsFor => b.goals_for.cmp(&a.goals_for),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// How far a team gets out of the group stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "rank", rename_all = "snake_case")]
pub enum Qualification {
    GroupWinner,
    RunnerUp,
    /// 1-based rank among the qualifying third-placed teams
    BestThird(usize),
    Eliminated,
}

impl Qualification {
    pub fn qualifies(self) -> bool {
        self != Qualification::Eliminated
    }
}

/// Ranked tables keyed by group label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standings {
    pub groups: BTreeMap<String, Vec<GroupStat>>,
    pub tie_breakers: Vec<TieBreaker>,
}

impl Standings {
    pub fn group(&self, label: &str) -> Option<&[GroupStat]> {
        self.groups.get(label).map(Vec::as_slice)
    }

    /// Team at a 1-based place in a group.
    pub fn position(&self, label: &str, place: usize) -> Option<&GroupStat> {
        place.checked_sub(1).and_then(|i| self.group(label)?.get(i))
    }

    pub fn team(&self, team_id: &str) -> Option<&GroupStat> {
        self.groups.values().flatten().find(|s| s.team_id == team_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<GroupStat>)> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Every group's third-placed team, best first. Groups with fewer than
    /// three teams contribute nothing.
    pub fn third_place_ranking(&self) -> Vec<&GroupStat> {
        let mut thirds: Vec<&GroupStat> = self.groups.values().filter_map(|table| table.get(2)).collect();
        thirds.sort_by(|a, b| rank_order(&self.tie_breakers, a, b));
        thirds
    }

    /// Qualifying third-placed teams, at most `best_thirds` of them.
    pub fn best_thirds(&self, best_thirds: usize) -> Vec<&GroupStat> {
        let mut ranking = self.third_place_ranking();
        ranking.truncate(best_thirds);
        ranking
    }

    pub fn qualification(&self, best_thirds: usize) -> BTreeMap<TeamId, Qualification> {
        let mut out = BTreeMap::new();
        for table in self.groups.values() {
            for (i, stat) in table.iter().enumerate() {
                let q = match i {
                    0 => Qualification::GroupWinner,
                    1 => Qualification::RunnerUp,
                    _ => Qualification::Eliminated,
                };
                out.insert(stat.team_id.clone(), q);
            }
        }
        for (i, stat) in self.best_thirds(best_thirds).into_iter().enumerate() {
            out.insert(stat.team_id.clone(), Qualification::BestThird(i + 1));
        }
        out
    }
}

pub fn compute_standings(matches: &[Match], predictions: &PredictionMap) -> Standings {
    compute_standings_with(matches, predictions, &TieBreaker::DEFAULT_ORDER)
}

/// Knockout matches are ignored, as are group matches without a complete
/// prediction. Every team listed in a group fixture gets a row, even with
/// nothing predicted.
pub fn compute_standings_with(
    matches: &[Match],
    predictions: &PredictionMap,
    tie_breakers: &[TieBreaker],
) -> Standings {
    let mut groups: BTreeMap<String, Vec<GroupStat>> = BTreeMap::new();
    let mut rows: HashMap<(String, TeamId), usize> = HashMap::new();
    let mut applied = 0usize;

    for m in matches.iter().filter(|m| !m.stage.is_knockout()) {
        let Some(label) = m.group.as_deref() else { continue };
        let (Some(home), Some(away)) = (m.home.team_id(), m.away.team_id()) else { continue };

        let table = groups.entry(label.to_string()).or_default();
        let mut row_of = |team: &str| {
            *rows.entry((label.to_string(), team.to_string())).or_insert_with(|| {
                table.push(GroupStat::new(team, label));
                table.len() - 1
            })
        };
        let home_row = row_of(home);
        let away_row = row_of(away);

        let Some(Scoreline { home: h, away: a }) = predictions.get(&m.id).and_then(|p| p.scoreline()) else {
            continue;
        };
        table[home_row].record(h, a);
        table[away_row].record(a, h);
        applied += 1;
    }

    for table in groups.values_mut() {
        // stable: full ties stay in encounter order
        table.sort_by(|a, b| rank_order(tie_breakers, a, b));
    }

    debug!(groups = groups.len(), applied, "computed group standings");
    Standings { groups, tie_breakers: tie_breakers.to_vec() }
}

/// Group matches still lacking a complete prediction, in fixture order.
pub fn missing_predictions<'a>(matches: &'a [Match], predictions: &PredictionMap) -> Vec<&'a MatchId> {
    matches
        .iter()
        .filter(|m| !m.stage.is_knockout())
        .filter(|m| !predictions.get(&m.id).is_some_and(|p| p.is_complete()))
        .map(|m| &m.id)
        .collect()
}

/// True once every group match has a complete prediction. Callers should
/// check this before generating the bracket.
pub fn groups_complete(matches: &[Match], predictions: &PredictionMap) -> bool {
    missing_predictions(matches, predictions).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Prediction, Stage};

    fn group(label: &str, teams: [&str; 4]) -> Vec<Match> {
        let [a, b, c, d] = teams;
        let pairs = [(a, b), (c, d), (a, c), (d, b), (d, a), (b, c)];
        pairs
            .iter()
            .enumerate()
            .map(|(i, (h, w))| Match::group_fixture(&format!("{}{}", label.to_lowercase(), i + 1), label, h, w))
            .collect()
    }

    fn predict(entries: &[(&str, u8, u8)]) -> PredictionMap {
        entries.iter().map(|&(id, h, a)| (id.to_string(), Prediction::new(id, h, a))).collect()
    }

    fn order(standings: &Standings, label: &str) -> Vec<String> {
        standings.group(label).unwrap().iter().map(|s| s.team_id.clone()).collect()
    }

    #[test]
    fn test_goal_difference_breaks_points_tie() {
        // A 3 pts GD 0, B 3 pts GD +2, C and D 1 pt each
        let matches = group("A", ["a", "b", "c", "d"]);
        let predictions = predict(&[("a1", 1, 3), ("a2", 1, 1), ("a3", 2, 0)]);
        let standings = compute_standings(&matches, &predictions);

        let table = standings.group("A").unwrap();
        assert_eq!(table[0].team_id, "b");
        assert_eq!((table[0].points, table[0].goal_difference), (3, 2));
        assert_eq!(table[1].team_id, "a");
        assert_eq!((table[1].points, table[1].goal_difference), (3, 0));
        assert!(table[2..].iter().all(|s| s.points == 1));
    }

    #[test]
    fn test_full_ties_keep_encounter_order() {
        let matches = group("A", ["a", "b", "c", "d"]);
        let standings = compute_standings(&matches, &PredictionMap::new());
        assert_eq!(order(&standings, "A"), vec!["a", "b", "c", "d"]);

        let predictions = predict(&[("a2", 1, 1), ("a1", 1, 1)]);
        let standings = compute_standings(&matches, &predictions);
        assert_eq!(order(&standings, "A"), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_every_team_has_a_row_without_predictions() {
        let matches = group("C", ["x", "y", "z", "w"]);
        let standings = compute_standings(&matches, &PredictionMap::new());
        let table = standings.group("C").unwrap();
        assert_eq!(table.len(), 4);
        assert!(table.iter().all(|s| s.played == 0 && s.points == 0 && s.group == "C"));
    }

    #[test]
    fn test_more_points_beats_better_goal_difference() {
        // p: 9 pts GD +3, q: 3 pts GD +7
        let matches = group("B", ["p", "q", "r", "s"]);
        let predictions = predict(&[("b1", 1, 0), ("b3", 1, 0), ("b5", 0, 1), ("b6", 8, 0)]);
        let standings = compute_standings(&matches, &predictions);

        let p = standings.team("p").unwrap();
        let q = standings.team("q").unwrap();
        assert_eq!((p.points, p.goal_difference), (9, 3));
        assert_eq!((q.points, q.goal_difference), (3, 7));
        assert_eq!(order(&standings, "B")[..2], ["p".to_string(), "q".to_string()]);
    }

    #[test]
    fn test_winner_of_every_match_ranks_above_loser_of_every_match() {
        let matches = group("D", ["y", "x", "m", "n"]);
        let predictions =
            predict(&[("d1", 0, 2), ("d2", 1, 1), ("d3", 0, 2), ("d4", 0, 2), ("d5", 2, 0), ("d6", 2, 0)]);
        let standings = compute_standings(&matches, &predictions);

        let x = standings.team("x").unwrap();
        assert_eq!((x.won, x.points, x.goal_difference), (3, 9, 6));
        let y = standings.team("y").unwrap();
        assert_eq!((y.lost, y.points), (3, 0));
        assert_eq!(standings.position("D", 1).unwrap().team_id, "x");
        assert_eq!(standings.position("D", 4).unwrap().team_id, "y");
        assert!(standings.position("D", 0).is_none());
    }

    #[test]
    fn test_knockout_matches_are_ignored() {
        let mut matches = group("A", ["a", "b", "c", "d"]);
        let mut ko = Match::knockout("m73", Stage::RoundOf32, "", None);
        ko.home = crate::models::SlotTeam::resolved("a");
        ko.away = crate::models::SlotTeam::resolved("b");
        matches.push(ko);
        let predictions = predict(&[("m73", 5, 0)]);

        let standings = compute_standings(&matches, &predictions);
        assert_eq!(standings.len(), 1);
        assert!(standings.group("A").unwrap().iter().all(|s| s.played == 0));
    }

    #[test]
    fn test_custom_tie_breaker_order() {
        // a: 1 pt, 3 goals; b: 3 pts, 1 goal
        let matches = group("A", ["a", "b", "c", "d"]);
        let predictions = predict(&[("a3", 3, 3), ("a4", 0, 1)]);

        let standings = compute_standings_with(&matches, &predictions, &[TieBreaker::GoalsFor]);
        assert_eq!(order(&standings, "A")[0], "a");

        let standings = compute_standings(&matches, &predictions);
        assert_eq!(order(&standings, "A")[0], "b");
    }

    #[test]
    fn test_best_thirds_and_qualification() {
        let mut matches = group("A", ["a1", "a2", "a3", "a4"]);
        matches.extend(group("B", ["b1", "b2", "b3", "b4"]));
        matches.extend(group("C", ["c1", "c2", "c3", "c4"]));
        // third places: a3 1 pt, b3 3 pts, c2 0 pts
        let predictions = predict(&[
            ("a1", 2, 0),
            ("a2", 1, 1),
            ("a3", 3, 0),
            ("b1", 2, 0),
            ("b2", 1, 0),
            ("b3", 5, 0),
            ("b5", 1, 0),
            ("c1", 1, 0),
            ("c2", 0, 1),
            ("c5", 3, 0),
        ]);
        let standings = compute_standings(&matches, &predictions);

        let thirds: Vec<&str> = standings.third_place_ranking().iter().map(|s| s.team_id.as_str()).collect();
        assert_eq!(thirds.len(), 3);

        let best = standings.best_thirds(2);
        assert_eq!(best.len(), 2);
        assert!(rank_order(&standings.tie_breakers, best[0], best[1]) != Ordering::Greater);

        let qualification = standings.qualification(2);
        assert_eq!(qualification.len(), 12);
        assert_eq!(qualification.values().filter(|q| q.qualifies()).count(), 8);
        assert_eq!(qualification[&best[0].team_id], Qualification::BestThird(1));
        let winner = &standings.position("B", 1).unwrap().team_id;
        assert_eq!(qualification[winner], Qualification::GroupWinner);
        assert_eq!(qualification[thirds[2]], Qualification::Eliminated);
    }

    #[test]
    fn test_missing_predictions_gate() {
        let matches = group("A", ["a", "b", "c", "d"]);
        let mut predictions = predict(&[("a1", 1, 0), ("a2", 0, 0), ("a3", 2, 2), ("a4", 1, 3), ("a5", 0, 1)]);
        predictions.insert("a6".to_string(), Prediction { home_score: Some(1), ..Prediction::unset("a6") });

        assert_eq!(missing_predictions(&matches, &predictions), vec!["a6"]);
        assert!(!groups_complete(&matches, &predictions));

        predictions.insert("a6".to_string(), Prediction::new("a6", 1, 1));
        assert!(groups_complete(&matches, &predictions));
    }

    #[cfg(all(test, feature = "proptest"))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Tables stay sorted by points and never lose a team.
            #[test]
            fn prop_tables_sorted_by_points(goals in proptest::collection::vec((0u8..5, 0u8..5), 6)) {
                let matches = group("A", ["a", "b", "c", "d"]);
                let predictions: PredictionMap = matches
                    .iter()
                    .zip(&goals)
                    .map(|(m, &(h, a))| (m.id.clone(), Prediction::new(&m.id, h, a)))
                    .collect();
                let standings = compute_standings(&matches, &predictions);
                let table = standings.group("A").unwrap();

                prop_assert_eq!(table.len(), 4);
                prop_assert!(table.windows(2).all(|w| w[0].points >= w[1].points));
                prop_assert_eq!(table.iter().map(|s| s.played).sum::<u32>(), 12);
                prop_assert_eq!(table.iter().map(|s| s.goal_difference).sum::<i32>(), 0);
            }
        }
    }
}
