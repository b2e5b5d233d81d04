// Bye-round weighting.
//
// An optional re-ordering layer applied on top of the base strategy order.
// Trade-out mode surfaces the most disposable players first; trade-in mode
// drops unavailable players and surfaces the best bye coverage first.

use crate::model::{PlayerRecord, Strategy};

/// Which end of the trade the weighting serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByeMode {
    TradeOut,
    TradeIn,
}

/// Anything that can be bye-weighted: the candidate pool (player records)
/// and the squad's trade-out candidates both implement this.
pub trait ByeWeighted {
    fn is_injured(&self) -> bool;
    fn non_playing(&self) -> bool;
    fn bye_grade(&self) -> Option<u8>;
    fn diff(&self) -> f64;
    fn projection(&self) -> f64;
}

impl ByeWeighted for PlayerRecord {
    fn is_injured(&self) -> bool {
        self.injured
    }
    fn non_playing(&self) -> bool {
        !self.has_projection()
    }
    fn bye_grade(&self) -> Option<u8> {
        self.bye_grade
    }
    fn diff(&self) -> f64 {
        self.diff
    }
    fn projection(&self) -> f64 {
        self.projection
    }
}

/// Derived sort payload, never persisted.
#[derive(Debug, Clone, Copy)]
struct ByeSortKey {
    injured: bool,
    non_playing: bool,
    grade: u8,
    value: f64,
}

fn sort_key<T: ByeWeighted>(candidate: &T, mode: ByeMode, strategy: Strategy) -> ByeSortKey {
    // Unknown grades get the worst-case sentinel for the mode: 5 sorts after
    // grade 4 ascending (trade-out), 0 sorts after grade 1 descending
    // (trade-in).
    let grade = match mode {
        ByeMode::TradeOut => candidate.bye_grade().unwrap_or(5),
        ByeMode::TradeIn => candidate.bye_grade().unwrap_or(0),
    };
    let value = match strategy {
        Strategy::MaximizeBase => candidate.projection(),
        _ => candidate.diff(),
    };
    ByeSortKey {
        injured: candidate.is_injured(),
        non_playing: candidate.non_playing(),
        grade,
        value,
    }
}

/// Re-order candidates by bye-round coverage. Non-mutating; returns a new
/// list. The sort is stable, so reweighting an already-weighted list leaves
/// it unchanged.
pub fn reweight<T: ByeWeighted + Clone>(
    candidates: &[T],
    mode: ByeMode,
    strategy: Strategy,
) -> Vec<T> {
    let mut weighted: Vec<(T, ByeSortKey)> = candidates
        .iter()
        .map(|c| (c.clone(), sort_key(c, mode, strategy)))
        .collect();

    match mode {
        ByeMode::TradeOut => {
            // Injured first, then non-playing, then worse bye grade, then
            // lower value metric: most disposable first.
            weighted.sort_by(|(_, a), (_, b)| {
                (!a.injured)
                    .cmp(&!b.injured)
                    .then((!a.non_playing).cmp(&!b.non_playing))
                    .then(a.grade.cmp(&b.grade))
                    .then(a.value.total_cmp(&b.value))
            });
        }
        ByeMode::TradeIn => {
            // Unavailable players are not acquisition targets at all.
            weighted.retain(|(_, k)| !k.injured && !k.non_playing);
            weighted.sort_by(|(_, a), (_, b)| {
                b.grade.cmp(&a.grade).then(b.value.total_cmp(&a.value))
            });
        }
    }

    weighted.into_iter().map(|(c, _)| c).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Position;

    fn record(
        name: &str,
        diff: f64,
        projection: f64,
        injured: bool,
        bye_grade: Option<u8>,
    ) -> PlayerRecord {
        PlayerRecord {
            name: name.into(),
            team: "MEL".into(),
            position: Position::Middle,
            secondary_position: None,
            price: 400_000,
            diff,
            projection,
            injured,
            bye_grade,
            round: 1,
        }
    }

    fn names(records: &[PlayerRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn trade_out_surfaces_injured_then_non_playing() {
        let pool = vec![
            record("Healthy", 10.0, 50.0, false, Some(3)),
            record("Benched", 12.0, 0.0, false, Some(3)),
            record("Hurt", 15.0, 55.0, true, Some(3)),
        ];
        let out = reweight(&pool, ByeMode::TradeOut, Strategy::MaximizeValue);
        assert_eq!(names(&out), vec!["Hurt", "Benched", "Healthy"]);
    }

    #[test]
    fn trade_out_orders_by_worse_grade_then_lower_value() {
        let pool = vec![
            record("GoodBye", 10.0, 50.0, false, Some(4)),
            record("BadBye", 10.0, 50.0, false, Some(1)),
            record("BadByeLowVal", 5.0, 50.0, false, Some(1)),
        ];
        let out = reweight(&pool, ByeMode::TradeOut, Strategy::MaximizeValue);
        assert_eq!(names(&out), vec!["BadByeLowVal", "BadBye", "GoodBye"]);
    }

    #[test]
    fn trade_out_unknown_grade_sorts_after_grade_four() {
        let pool = vec![
            record("Unknown", 10.0, 50.0, false, None),
            record("Graded", 10.0, 50.0, false, Some(4)),
        ];
        let out = reweight(&pool, ByeMode::TradeOut, Strategy::MaximizeValue);
        assert_eq!(names(&out), vec!["Graded", "Unknown"]);
    }

    #[test]
    fn trade_in_drops_injured_and_non_playing() {
        let pool = vec![
            record("Hurt", 20.0, 60.0, true, Some(4)),
            record("Benched", 20.0, 0.0, false, Some(4)),
            record("Fine", 10.0, 50.0, false, Some(2)),
        ];
        let out = reweight(&pool, ByeMode::TradeIn, Strategy::MaximizeValue);
        assert_eq!(names(&out), vec!["Fine"]);
    }

    #[test]
    fn trade_in_orders_by_grade_then_value() {
        let pool = vec![
            record("LowGrade", 30.0, 50.0, false, Some(1)),
            record("HighGradeLowVal", 8.0, 50.0, false, Some(4)),
            record("HighGradeHighVal", 12.0, 50.0, false, Some(4)),
        ];
        let out = reweight(&pool, ByeMode::TradeIn, Strategy::MaximizeValue);
        assert_eq!(
            names(&out),
            vec!["HighGradeHighVal", "HighGradeLowVal", "LowGrade"]
        );
    }

    #[test]
    fn trade_in_unknown_grade_sorts_last() {
        let pool = vec![
            record("Unknown", 30.0, 50.0, false, None),
            record("Grade1", 5.0, 50.0, false, Some(1)),
        ];
        let out = reweight(&pool, ByeMode::TradeIn, Strategy::MaximizeValue);
        assert_eq!(names(&out), vec!["Grade1", "Unknown"]);
    }

    #[test]
    fn base_strategy_uses_projection_as_value_metric() {
        let pool = vec![
            record("HighDiff", 30.0, 40.0, false, Some(2)),
            record("HighProj", 5.0, 80.0, false, Some(2)),
        ];
        let out = reweight(&pool, ByeMode::TradeIn, Strategy::MaximizeBase);
        assert_eq!(names(&out), vec!["HighProj", "HighDiff"]);
    }

    #[test]
    fn reweight_is_idempotent() {
        let pool = vec![
            record("A", 10.0, 50.0, false, Some(3)),
            record("B", 12.0, 55.0, false, Some(4)),
            record("C", 8.0, 45.0, false, Some(4)),
            record("D", 9.0, 48.0, false, None),
        ];
        let once = reweight(&pool, ByeMode::TradeIn, Strategy::MaximizeValue);
        let twice = reweight(&once, ByeMode::TradeIn, Strategy::MaximizeValue);
        assert_eq!(names(&once), names(&twice));
    }

    #[test]
    fn reweight_does_not_mutate_input() {
        let pool = vec![
            record("B", 12.0, 55.0, false, Some(4)),
            record("A", 10.0, 50.0, false, Some(1)),
        ];
        let _ = reweight(&pool, ByeMode::TradeIn, Strategy::MaximizeValue);
        assert_eq!(names(&pool), vec!["B", "A"]);
    }
}
