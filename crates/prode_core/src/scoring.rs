//! Prediction scoring
//!
//! Compares a scoreline prediction with the official result of a finished
//! match. Exact scorelines earn the most, a correct winner-or-draw call earns
//! less, everything else earns nothing. Unfinished matches and incomplete
//! predictions are `Pending` and never fail.

use serde::{Deserialize, Serialize};

use crate::models::{Match, MatchId, Prediction, PredictionMap};

pub const POINTS_EXACT: u32 = 5;
pub const POINTS_OUTCOME: u32 = 3;
pub const POINTS_MISS: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoreStatus {
    Exact,
    CorrectOutcome,
    Miss,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub match_id: MatchId,
    pub points: u32,
    pub status: ScoreStatus,
}

impl ScoreResult {
    fn pending(match_id: &str) -> Self {
        Self { match_id: match_id.to_string(), points: 0, status: ScoreStatus::Pending }
    }
}

/// Point values per outcome class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRules {
    pub exact: u32,
    pub correct_outcome: u32,
    pub miss: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self { exact: POINTS_EXACT, correct_outcome: POINTS_OUTCOME, miss: POINTS_MISS }
    }
}

impl ScoringRules {
    pub fn validate(&self) -> Result<(), String> {
        if self.exact < self.correct_outcome {
            return Err(format!(
                "exact ({}) must be worth at least correct_outcome ({})",
                self.exact, self.correct_outcome
            ));
        }
        if self.correct_outcome < self.miss {
            return Err(format!(
                "correct_outcome ({}) must be worth at least miss ({})",
                self.correct_outcome, self.miss
            ));
        }
        Ok(())
    }

    pub fn points_for(&self, status: ScoreStatus) -> u32 {
        match status {
            ScoreStatus::Exact => self.exact,
            ScoreStatus::CorrectOutcome => self.correct_outcome,
            ScoreStatus::Miss => self.miss,
            ScoreStatus::Pending => 0,
        }
    }
}

/// Scores one prediction with the default 5/3/0 rules.
pub fn score(prediction: Option<&Prediction>, m: &Match) -> ScoreResult {
    score_with(&ScoringRules::default(), prediction, m)
}

pub fn score_with(rules: &ScoringRules, prediction: Option<&Prediction>, m: &Match) -> ScoreResult {
    let Some(actual) = m.final_score() else {
        return ScoreResult::pending(&m.id);
    };
    let Some(predicted) = prediction.and_then(Prediction::scoreline) else {
        return ScoreResult::pending(&m.id);
    };

    let status = if predicted == actual {
        ScoreStatus::Exact
    } else if predicted.outcome() == actual.outcome() {
        ScoreStatus::CorrectOutcome
    } else {
        ScoreStatus::Miss
    };

    ScoreResult { match_id: m.id.clone(), points: rules.points_for(status), status }
}

/// Sum of points over `matches`.
pub fn total_score(predictions: &PredictionMap, matches: &[Match]) -> u32 {
    summarize(&ScoringRules::default(), predictions, matches).total
}

/// Totals plus a count per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub total: u32,
    pub exact: usize,
    pub correct_outcome: usize,
    pub miss: usize,
    pub pending: usize,
}

impl ScoreSummary {
    fn add(&mut self, result: &ScoreResult) {
        self.total += result.points;
        match result.status {
            ScoreStatus::Exact => self.exact += 1,
            ScoreStatus::CorrectOutcome => self.correct_outcome += 1,
            ScoreStatus::Miss => self.miss += 1,
            ScoreStatus::Pending => self.pending += 1,
        }
    }

    pub fn scored(&self) -> usize {
        self.exact + self.correct_outcome + self.miss
    }
}

pub fn score_all(rules: &ScoringRules, predictions: &PredictionMap, matches: &[Match]) -> Vec<ScoreResult> {
    matches.iter().map(|m| score_with(rules, predictions.get(&m.id), m)).collect()
}

pub fn summarize(rules: &ScoringRules, predictions: &PredictionMap, matches: &[Match]) -> ScoreSummary {
    let mut summary = ScoreSummary::default();
    for result in score_all(rules, predictions, matches) {
        summary.add(&result);
    }
    summary
}

// =============================================================================
// Side-by-side comparison
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchComparison {
    pub match_id: MatchId,
    pub left: ScoreResult,
    pub right: ScoreResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub left_total: u32,
    pub right_total: u32,
    pub matches: Vec<MatchComparison>,
}

impl Comparison {
    /// Positive when the left side is ahead.
    pub fn margin(&self) -> i64 {
        self.left_total as i64 - self.right_total as i64
    }
}

/// Scores two prediction sets against the same matches.
pub fn compare(rules: &ScoringRules, left: &PredictionMap, right: &PredictionMap, matches: &[Match]) -> Comparison {
    let mut comparison = Comparison { left_total: 0, right_total: 0, matches: Vec::with_capacity(matches.len()) };
    for m in matches {
        let l = score_with(rules, left.get(&m.id), m);
        let r = score_with(rules, right.get(&m.id), m);
        comparison.left_total += l.points;
        comparison.right_total += r.points;
        comparison.matches.push(MatchComparison { match_id: m.id.clone(), left: l, right: r });
    }
    comparison
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Scoreline;

    fn finished(id: &str, home: u8, away: u8) -> Match {
        let mut m = Match::group_fixture(id, "A", "mex", "rsa");
        m.mark_finished(Scoreline::new(home, away));
        m
    }

    #[test]
    fn test_exact_scoreline() {
        let r = score(Some(&Prediction::new("a1", 2, 1)), &finished("a1", 2, 1));
        assert_eq!(r.status, ScoreStatus::Exact);
        assert_eq!(r.points, 5);
    }

    #[test]
    fn test_correct_outcome() {
        let r = score(Some(&Prediction::new("a1", 2, 1)), &finished("a1", 3, 0));
        assert_eq!(r.status, ScoreStatus::CorrectOutcome);
        assert_eq!(r.points, 3);

        let r = score(Some(&Prediction::new("a1", 0, 0)), &finished("a1", 2, 2));
        assert_eq!(r.status, ScoreStatus::CorrectOutcome);
    }

    #[test]
    fn test_miss() {
        let r = score(Some(&Prediction::new("a1", 1, 1)), &finished("a1", 2, 0));
        assert_eq!(r.status, ScoreStatus::Miss);
        assert_eq!(r.points, 0);
    }

    #[test]
    fn test_unfinished_match_is_pending() {
        let m = Match::group_fixture("a1", "A", "mex", "rsa");
        let r = score(Some(&Prediction::new("a1", 2, 1)), &m);
        assert_eq!(r.status, ScoreStatus::Pending);
        assert_eq!(r.points, 0);
    }

    #[test]
    fn test_finished_without_official_score_is_pending() {
        let mut m = Match::group_fixture("a1", "A", "mex", "rsa");
        m.finished = true;
        assert_eq!(score(Some(&Prediction::new("a1", 2, 1)), &m).status, ScoreStatus::Pending);
    }

    #[test]
    fn test_missing_or_partial_prediction_is_pending() {
        let m = finished("a1", 1, 0);
        assert_eq!(score(None, &m).status, ScoreStatus::Pending);

        let partial = Prediction { home_score: Some(1), ..Prediction::unset("a1") };
        assert_eq!(score(Some(&partial), &m).status, ScoreStatus::Pending);
    }

    #[test]
    fn test_total_is_sum_and_idempotent() {
        let matches = vec![finished("a1", 2, 1), finished("a2", 3, 0), finished("a3", 2, 0)];
        let predictions: PredictionMap = [
            Prediction::new("a1", 2, 1),
            Prediction::new("a2", 1, 0),
            Prediction::new("a3", 1, 1),
        ]
        .into_iter()
        .map(|p| (p.match_id.clone(), p))
        .collect();

        assert_eq!(total_score(&predictions, &matches), 8);
        assert_eq!(total_score(&predictions, &matches), 8);

        let summary = summarize(&ScoringRules::default(), &predictions, &matches);
        assert_eq!(summary, ScoreSummary { total: 8, exact: 1, correct_outcome: 1, miss: 1, pending: 0 });
        assert_eq!(summary.scored(), 3);
    }

    #[test]
    fn test_custom_rules() {
        let rules = ScoringRules { exact: 10, correct_outcome: 4, miss: 1 };
        assert!(rules.validate().is_ok());
        let r = score_with(&rules, Some(&Prediction::new("a1", 0, 1)), &finished("a1", 1, 0));
        assert_eq!(r.points, 1);

        let bad = ScoringRules { exact: 1, correct_outcome: 3, miss: 0 };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_compare_two_prediction_sets() {
        let matches = vec![finished("a1", 2, 1), finished("a2", 0, 0)];
        let left: PredictionMap =
            [("a1".to_string(), Prediction::new("a1", 2, 1))].into_iter().collect();
        let right: PredictionMap = [
            ("a1".to_string(), Prediction::new("a1", 1, 0)),
            ("a2".to_string(), Prediction::new("a2", 1, 1)),
        ]
        .into_iter()
        .collect();

        let c = compare(&ScoringRules::default(), &left, &right, &matches);
        assert_eq!(c.left_total, 5);
        assert_eq!(c.right_total, 6);
        assert_eq!(c.margin(), -1);
        assert_eq!(c.matches[1].left.status, ScoreStatus::Pending);
    }

    #[cfg(all(test, feature = "proptest"))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Unfinished matches never score, whatever the prediction.
            #[test]
            fn prop_unfinished_always_pending(h in 0u8..10, a in 0u8..10) {
                let m = Match::group_fixture("a1", "A", "mex", "rsa");
                let r = score(Some(&Prediction::new("a1", h, a)), &m);
                prop_assert_eq!(r.status, ScoreStatus::Pending);
                prop_assert_eq!(r.points, 0);
            }

            /// Status and points agree with the outcome classification.
            #[test]
            fn prop_status_matches_classification(
                ph in 0u8..8, pa in 0u8..8, rh in 0u8..8, ra in 0u8..8
            ) {
                let r = score(Some(&Prediction::new("a1", ph, pa)), &finished("a1", rh, ra));
                let predicted = Scoreline::new(ph, pa);
                let actual = Scoreline::new(rh, ra);
                if predicted == actual {
                    prop_assert_eq!((r.status, r.points), (ScoreStatus::Exact, 5));
                } else if predicted.outcome() == actual.outcome() {
                    prop_assert_eq!((r.status, r.points), (ScoreStatus::CorrectOutcome, 3));
                } else {
                    prop_assert_eq!((r.status, r.points), (ScoreStatus::Miss, 0));
                }
            }
        }
    }
}
