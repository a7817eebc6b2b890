//! lap-aware ranking of transponder passings.
//!
//! passing `k` (0-based) of a transponder, ordered by time, is its crossing of lap `k + 1`.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;

use crate::modules::models::passing::Passing;
use crate::modules::models::race::Race;

/// the lap number a ranking is taken at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LapThreshold {
    Lap(u32),
    Unbounded,
}

impl LapThreshold {
    pub fn for_race(race: &Race) -> LapThreshold {
        match race.target_laps() {
            Some(laps) => LapThreshold::Lap(laps),
            None => LapThreshold::Unbounded,
        }
    }

    /// the lap count of a rider with `pass_count` crossings, capped at this threshold
    fn cap(self, pass_count: usize) -> usize {
        match self {
            LapThreshold::Lap(lap) => pass_count.min(lap.max(1) as usize),
            LapThreshold::Unbounded => pass_count,
        }
    }
}

/// a rider's position at a lap threshold: their latest crossing at or before it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LapStanding {
    pub passing: Passing,
    pub lap_count: u32,
}

impl LapStanding {
    pub fn transponder(&self) -> &str {
        &self.passing.transponder
    }

    pub fn date(&self) -> NaiveDateTime {
        self.passing.date
    }
}

/// more laps first, then the earlier crossing, then the transponder code
fn rank_order(a: &LapStanding, b: &LapStanding) -> Ordering {
    b.lap_count
        .cmp(&a.lap_count)
        .then_with(|| a.passing.date.cmp(&b.passing.date))
        .then_with(|| a.passing.transponder.cmp(&b.passing.transponder))
}

/// the passings of a race grouped per transponder, each group ordered by time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LapHistory {
    by_transponder: BTreeMap<String, Vec<Passing>>,
}

impl LapHistory {
    pub fn from_passings(passings: Vec<Passing>) -> LapHistory {
        let mut by_transponder: BTreeMap<String, Vec<Passing>> = BTreeMap::new();
        for passing in passings {
            by_transponder
                .entry(passing.transponder.clone())
                .or_default()
                .push(passing);
        }

        for crossings in by_transponder.values_mut() {
            crossings.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        }

        LapHistory { by_transponder }
    }

    pub fn is_empty(&self) -> bool {
        self.by_transponder.is_empty()
    }

    pub fn transponder_count(&self) -> usize {
        self.by_transponder.len()
    }

    /// the actual crossing of `lap` (1-based) by a transponder
    pub fn crossing(&self, transponder: &str, lap: u32) -> Option<&Passing> {
        let index = (lap as usize).checked_sub(1)?;
        self.by_transponder.get(transponder)?.get(index)
    }

    /// rank every transponder by what it had completed at `threshold`.
    /// riders short of the threshold are ranked by their latest crossing
    pub fn results_for_lap(&self, threshold: LapThreshold) -> Vec<LapStanding> {
        let mut standings: Vec<LapStanding> = self
            .by_transponder
            .values()
            .filter(|crossings| !crossings.is_empty())
            .map(|crossings| {
                let lap_count = threshold.cap(crossings.len());
                LapStanding {
                    passing: crossings[lap_count - 1].clone(),
                    lap_count: lap_count as u32,
                }
            })
            .collect();

        standings.sort_by(rank_order);
        standings
    }
}

/// [`LapHistory::results_for_lap`] memoized per threshold.
///
/// gap computation ranks the field again at every lap count on the board,
/// and many riders share a lap count.
pub struct Rankings<'a> {
    history: &'a LapHistory,
    cache: HashMap<LapThreshold, Vec<LapStanding>>,
}

impl<'a> Rankings<'a> {
    pub fn new(history: &'a LapHistory) -> Rankings<'a> {
        Rankings {
            history,
            cache: HashMap::new(),
        }
    }

    pub fn at(&mut self, threshold: LapThreshold) -> &[LapStanding] {
        let history = self.history;
        self.cache
            .entry(threshold)
            .or_insert_with(|| history.results_for_lap(threshold))
    }

    /// seconds between this standing's crossing and the crossing of the same lap by
    /// whoever led when that lap was reached.
    ///
    /// `None` for riders on their first lap and for the lap leader itself.
    pub fn seconds_behind_leader(&mut self, standing: &LapStanding) -> Option<i64> {
        if standing.lap_count <= 1 {
            return None;
        }

        let leader = self
            .at(LapThreshold::Lap(standing.lap_count))
            .first()?
            .transponder()
            .to_string();
        if leader == standing.transponder() {
            return None;
        }

        let leader_pass = self.history.crossing(&leader, standing.lap_count)?;
        let seconds = unix_seconds(standing.date()) - unix_seconds(leader_pass.date);

        Some(seconds.max(0))
    }
}

fn unix_seconds(date: NaiveDateTime) -> i64 {
    date.and_utc().timestamp()
}
