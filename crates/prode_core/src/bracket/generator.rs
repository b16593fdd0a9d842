use tracing::{debug, warn};

use super::Bracket;
use crate::data::TeamRegistry;
use crate::models::{Match, SeedSlot, SlotTeam, Stage, TournamentFormat};
use crate::standings::{GroupStat, Standings};

/// Builds the whole knockout tree from group standings.
///
/// First-round slots come from the format's seed table. A seed the standings
/// cannot supply (group missing, fewer teams than the place asked for, not
/// enough third-placed teams) or that names a team outside the registry is
/// left `Unresolved` and logged, so the bracket is always complete. Callers
/// should check `standings::groups_complete` first rather than rely on this.
///
/// Later rounds start with both slots unresolved and carry their template's
/// next-match link. The output depends only on the inputs.
pub fn generate_knockout(standings: &Standings, registry: &TeamRegistry, format: &TournamentFormat) -> Bracket {
    let thirds = standings.best_thirds(format.best_third_places);
    let mut matches = Vec::with_capacity(format.match_count());
    let mut unresolved = 0usize;

    for template in &format.round_of_32 {
        let mut m = Match::knockout(&template.id, Stage::RoundOf32, &template.kickoff, template.next.clone());
        m.home = seed_team(&template.home, standings, &thirds, registry);
        m.away = seed_team(&template.away, standings, &thirds, registry);

        for (seed, slot) in [(&template.home, &m.home), (&template.away, &m.away)] {
            if !slot.is_resolved() {
                warn!(match_id = %template.id, %seed, "seed has no qualified team, slot left unresolved");
                unresolved += 1;
            }
        }
        matches.push(m);
    }

    for template in &format.later_rounds {
        matches.push(Match::knockout(&template.id, template.stage, &template.kickoff, template.next.clone()));
    }

    debug!(matches = matches.len(), unresolved, thirds = thirds.len(), "generated knockout bracket");
    Bracket::new(matches)
}

fn seed_team(seed: &SeedSlot, standings: &Standings, thirds: &[&GroupStat], registry: &TeamRegistry) -> SlotTeam {
    let stat = match seed {
        SeedSlot::GroupWinner(group) => standings.position(group, 1),
        SeedSlot::RunnerUp(group) => standings.position(group, 2),
        SeedSlot::BestThird(rank) => rank.checked_sub(1).and_then(|i| thirds.get(i).copied()),
    };
    match stat {
        Some(stat) if registry.contains(&stat.team_id) => SlotTeam::resolved(&stat.team_id),
        _ => SlotTeam::Unresolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Tournament;
    use crate::models::{Prediction, PredictionMap, SlotSide};
    use crate::standings::compute_standings;

    /// Home side wins every group match 1-0.
    fn home_wins(t: &Tournament) -> PredictionMap {
        t.fixtures.iter().map(|m| (m.id.clone(), Prediction::new(&m.id, 1, 0))).collect()
    }

    fn full_bracket() -> Bracket {
        let t = Tournament::world_cup_2026();
        let standings = compute_standings(&t.fixtures, &home_wins(t));
        generate_knockout(&standings, &t.registry, &t.format)
    }

    #[test]
    fn test_stage_sizes() {
        let bracket = full_bracket();
        let counts: Vec<usize> = Stage::KNOCKOUT.iter().map(|&s| bracket.matches_in_stage(s).count()).collect();
        assert_eq!(counts, vec![16, 8, 4, 2, 1]);
        assert_eq!(bracket.len(), 31);
    }

    #[test]
    fn test_first_round_fully_seeded_from_complete_groups() {
        let bracket = full_bracket();
        assert!(bracket
            .matches_in_stage(Stage::RoundOf32)
            .all(|m| m.home.is_resolved() && m.away.is_resolved()));
        assert!(bracket
            .matches
            .iter()
            .filter(|m| m.stage > Stage::RoundOf32)
            .all(|m| !m.home.is_resolved() && !m.away.is_resolved()));
    }

    #[test]
    fn test_seeds_follow_standings() {
        let t = Tournament::world_cup_2026();
        let standings = compute_standings(&t.fixtures, &home_wins(t));
        let bracket = generate_knockout(&standings, &t.registry, &t.format);

        let m33 = bracket.get("m33").unwrap();
        assert_eq!(m33.home.team_id(), Some(standings.position("A", 1).unwrap().team_id.as_str()));
        let best = standings.best_thirds(8);
        assert_eq!(m33.away.team_id(), Some(best[0].team_id.as_str()));

        let m34 = bracket.get("m34").unwrap();
        assert_eq!(m34.home.team_id(), Some(standings.position("B", 2).unwrap().team_id.as_str()));
        assert_eq!(m34.away.team_id(), Some(standings.position("F", 2).unwrap().team_id.as_str()));
    }

    #[test]
    fn test_links_come_from_the_format() {
        let bracket = full_bracket();
        let m33 = bracket.get("m33").unwrap();
        let m34 = bracket.get("m34").unwrap();
        let a = m33.next.as_ref().unwrap();
        let b = m34.next.as_ref().unwrap();
        assert_eq!((a.match_id.as_str(), a.slot), ("m49", SlotSide::Home));
        assert_eq!((b.match_id.as_str(), b.slot), ("m49", SlotSide::Away));
        assert_eq!(bracket.final_match().unwrap().id, "m64");
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = full_bracket();
        let b = full_bracket();
        assert_eq!(a, b);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn test_empty_standings_leave_first_round_unresolved() {
        let t = Tournament::world_cup_2026();
        let bracket = generate_knockout(&Standings::default(), &t.registry, &t.format);
        assert_eq!(bracket.len(), 31);
        assert!(bracket.matches.iter().all(|m| !m.home.is_resolved() && !m.away.is_resolved()));
    }

    #[test]
    fn test_unregistered_team_is_not_seeded() {
        let t = Tournament::world_cup_2026();
        let mut standings = compute_standings(&t.fixtures, &home_wins(t));
        standings.groups.get_mut("A").unwrap()[0].team_id = "nobody".to_string();

        let bracket = generate_knockout(&standings, &t.registry, &t.format);
        assert_eq!(bracket.get("m33").unwrap().home, SlotTeam::Unresolved);
        assert!(bracket.get("m33").unwrap().away.is_resolved());
    }

    #[test]
    fn test_first_round_pairings_snapshot() {
        let bracket = full_bracket();
        let format = &Tournament::world_cup_2026().format;
        let table: Vec<String> = format
            .round_of_32
            .iter()
            .zip(bracket.matches_in_stage(Stage::RoundOf32))
            .map(|(t, m)| {
                let next = t.next.as_ref().map(|l| format!("{}/{:?}", l.match_id, l.slot)).unwrap_or_default();
                format!("{} {} v {} -> {} ({})", t.id, t.home, t.away, next, m.kickoff)
            })
            .collect();

        insta::assert_snapshot!(table.join("\n"), @r###"
        m33 1A v 3#1 -> m49/Home (28 Jun)
        m34 2B v 2F -> m49/Away (28 Jun)
        m35 1E v 2D -> m50/Home (29 Jun)
        m36 1C v 3#2 -> m50/Away (29 Jun)
        m37 1I v 3#3 -> m51/Home (29 Jun)
        m38 2G v 2J -> m51/Away (29 Jun)
        m39 1G v 3#4 -> m52/Home (30 Jun)
        m40 2H v 2K -> m52/Away (30 Jun)
        m41 1B v 3#5 -> m53/Home (30 Jun)
        m42 2A v 2C -> m53/Away (30 Jun)
        m43 1F v 2E -> m54/Home (01 Jul)
        m44 1D v 3#6 -> m54/Away (01 Jul)
        m45 1J v 3#7 -> m55/Home (02 Jul)
        m46 2I v 2L -> m55/Away (02 Jul)
        m47 1K v 3#8 -> m56/Home (02 Jul)
        m48 1H v 2G -> m56/Away (02 Jul)
        "###);
    }
}
