use goap_core::{GoalId, GoapModel};

use crate::PlannerConfig;

/// Stable least-significant-digit radix sort over non-negative integer keys, base 10.
///
/// Each pass is a counting sort on one decimal digit, filling buckets from 9 down to 0, so the
/// output is in descending key order and entries with equal keys keep their input order. The
/// scratch buffer is kept between calls.
#[derive(Debug, Clone)]
pub struct PriorityRadixSorter<T> {
    scratch: Vec<(T, u64)>,
}

impl<T> Default for PriorityRadixSorter<T> {
    fn default() -> Self {
        Self {
            scratch: Vec::new(),
        }
    }
}

impl<T: Copy> PriorityRadixSorter<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort_descending(&mut self, items: &mut [(T, u64)]) {
        if items.len() < 2 {
            return;
        }
        let max = items.iter().map(|(_, key)| *key).max().unwrap_or(0);

        let mut exp: u64 = 1;
        loop {
            let mut counts = [0usize; 10];
            for (_, key) in items.iter() {
                counts[digit(*key, exp)] += 1;
            }

            let mut starts = [0usize; 10];
            let mut next = 0;
            for d in (0..10).rev() {
                starts[d] = next;
                next += counts[d];
            }

            self.scratch.clear();
            self.scratch.extend_from_slice(items);
            for entry in &self.scratch {
                let d = digit(entry.1, exp);
                items[starts[d]] = *entry;
                starts[d] += 1;
            }

            if max / exp < 10 {
                break;
            }
            exp *= 10;
        }
    }
}

fn digit(key: u64, exp: u64) -> usize {
    ((key / exp) % 10) as usize
}

/// Ranks candidate goals for one planning call.
///
/// Satisfied goals are dropped. The rest are keyed by `round(priority * scale)` and emitted
/// highest key first. Equal keys keep their input order. The most recently pursued goal's key
/// is lowered by `round(penalty * scale)`, at least one step, so it always ranks below a rival
/// of equal priority.
#[derive(Debug, Clone, Default)]
pub struct GoalOrderer {
    keyed: Vec<(GoalId, i64)>,
    sortable: Vec<(GoalId, u64)>,
    sorter: PriorityRadixSorter<GoalId>,
}

impl GoalOrderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents of `out` with the ranked candidates from `goals`.
    ///
    /// Ids the model does not know and repeated ids are ignored.
    pub fn order<W>(
        &mut self,
        model: &GoapModel<W>,
        world: &W,
        goals: &[GoalId],
        most_recent: Option<GoalId>,
        config: &PlannerConfig,
        out: &mut Vec<GoalId>,
    ) {
        out.clear();
        self.keyed.clear();

        for &id in goals {
            if self.keyed.iter().any(|(seen, _)| *seen == id) {
                continue;
            }
            let Some(goal) = model.goal(id) else {
                continue;
            };
            if model.all_hold(goal.desired_effects(), world) {
                continue;
            }
            let mut key = scaled_key(goal.priority(), config.priority_scale);
            if most_recent == Some(id) {
                key = key.saturating_sub(recency_step(config));
            }
            self.keyed.push((id, key));
        }

        let Some(min) = self.keyed.iter().map(|(_, key)| *key).min() else {
            return;
        };

        self.sortable.clear();
        self.sortable
            .extend(self.keyed.iter().map(|(id, key)| (*id, key.abs_diff(min))));
        self.sorter.sort_descending(&mut self.sortable);

        out.extend(self.sortable.iter().map(|(id, _)| *id));
    }
}

fn scaled_key(value: f32, scale: f32) -> i64 {
    (f64::from(value) * f64::from(scale)).round() as i64
}

fn recency_step(config: &PlannerConfig) -> i64 {
    scaled_key(config.recency_penalty, config.priority_scale).max(1)
}
