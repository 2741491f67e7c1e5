//! Bar and beat boundaries derived from the signature schedule.

use std::ops::ControlFlow;

use super::{Beat, TempoMap, TimeSignature, TimeSignatureChange};

static DEFAULT_SIGNATURE: [TimeSignatureChange; 1] = [TimeSignatureChange {
    beat: Beat::ZERO,
    signature: TimeSignature::COMMON,
}];

/// One beat boundary reported by the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeatBar {
    pub beat: Beat,
    pub is_bar: bool,
    pub signature: TimeSignature,
    /// Zero-based beat number within the current bar.
    pub beat_index_in_bar: i32,
}

/// Lazy walk over every beat boundary, starting at the first signature change.
///
/// The last signature extends forever, so callers bound the walk themselves
/// (`take_while`, or [`TempoMap::for_each_beat_bar`]). Segments whose beat
/// length rounds to zero ticks are skipped.
#[derive(Debug, Clone)]
pub struct BeatBars<'a> {
    changes: &'a [TimeSignatureChange],
    segment: usize,
    beat: Beat,
}

impl<'a> BeatBars<'a> {
    fn new(changes: &'a [TimeSignatureChange]) -> Self {
        let changes = if changes.is_empty() {
            &DEFAULT_SIGNATURE[..]
        } else {
            changes
        };
        Self {
            changes,
            segment: 0,
            beat: changes[0].beat,
        }
    }

    fn segment_end(&self) -> Option<Beat> {
        self.changes.get(self.segment + 1).map(|next| next.beat)
    }

    /// Moves to the next segment; false when there is none.
    fn enter_next_segment(&mut self) -> bool {
        match self.segment_end() {
            Some(next_beat) => {
                self.segment += 1;
                self.beat = next_beat;
                true
            }
            None => false,
        }
    }
}

impl Iterator for BeatBars<'_> {
    type Item = BeatBar;

    fn next(&mut self) -> Option<BeatBar> {
        loop {
            let current = self.changes.get(self.segment)?;
            let signature = current.signature;
            let per_beat = signature.duration_per_beat();
            let per_bar = signature.duration_per_bar();

            if per_beat <= Beat::ZERO || per_bar <= Beat::ZERO {
                if !self.enter_next_segment() {
                    self.segment = self.changes.len();
                    return None;
                }
                continue;
            }

            let within_segment = (self.beat - current.beat).ticks;
            let within_bar = within_segment % per_bar.ticks;
            let item = BeatBar {
                beat: self.beat,
                is_bar: within_bar == 0,
                signature,
                beat_index_in_bar: within_bar / per_beat.ticks,
            };

            match self.beat.ticks.checked_add(per_beat.ticks) {
                Some(next) => {
                    self.beat = Beat::from_ticks(next);
                    if self.segment_end().is_some_and(|end| self.beat >= end) {
                        self.enter_next_segment();
                    }
                }
                None => self.segment = self.changes.len(),
            }

            return Some(item);
        }
    }
}

impl TempoMap {
    pub fn beat_bars(&self) -> BeatBars<'_> {
        BeatBars::new(self.signature().as_slice())
    }

    /// Visits beat boundaries in order until `visit` breaks.
    pub fn for_each_beat_bar<F>(&self, mut visit: F)
    where
        F: FnMut(&BeatBar) -> ControlFlow<()>,
    {
        for beat_bar in self.beat_bars() {
            if visit(&beat_bar).is_break() {
                break;
            }
        }
    }

    /// Beats of every bar start before `end`.
    pub fn bar_starts_before(&self, end: Beat) -> Vec<Beat> {
        self.beat_bars()
            .take_while(|it| it.beat < end)
            .filter(|it| it.is_bar)
            .map(|it| it.beat)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::Tempo;

    fn map_with_signatures(changes: &[(i32, i32, i32)]) -> TempoMap {
        let mut map = TempoMap::with_initial(Tempo::new(120.0), TimeSignature::COMMON);
        for &(ticks, num, den) in changes {
            map.insert_signature(TimeSignatureChange::new(
                Beat::from_ticks(ticks),
                TimeSignature::new(num, den),
            ));
        }
        map.rebuild_acceleration_structure();
        map
    }

    #[test]
    fn test_common_time_bars() {
        let map = map_with_signatures(&[]);
        let items: Vec<BeatBar> = map.beat_bars().take(9).collect();

        assert_eq!(items.len(), 9);
        assert!(items[0].is_bar);
        assert!(!items[1].is_bar);
        assert!(items[4].is_bar);
        assert_eq!(items[4].beat, Beat::from_bars(1));
        assert_eq!(items[6].beat_index_in_bar, 2);
    }

    #[test]
    fn test_signature_change_restarts_bar() {
        // 4/4 for one bar, then 3/4
        let map = map_with_signatures(&[(192, 3, 4)]);
        let bars = map.bar_starts_before(Beat::from_ticks(192 + 144 * 2 + 1));

        assert_eq!(
            bars,
            vec![
                Beat::ZERO,
                Beat::from_ticks(192),
                Beat::from_ticks(336),
                Beat::from_ticks(480),
            ]
        );
    }

    #[test]
    fn test_signature_change_mid_bar_starts_new_bar() {
        let map = map_with_signatures(&[(96, 4, 4)]);
        let bars = map.bar_starts_before(Beat::from_ticks(300));
        assert_eq!(
            bars,
            vec![Beat::ZERO, Beat::from_ticks(96), Beat::from_ticks(288)]
        );
    }

    #[test]
    fn test_for_each_breaks() {
        let map = map_with_signatures(&[]);
        let mut visited = 0;
        map.for_each_beat_bar(|it| {
            visited += 1;
            if it.beat >= Beat::from_bars(2) {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(visited, 9);
    }

    #[test]
    fn test_walk_is_restartable() {
        let map = map_with_signatures(&[(192, 7, 8)]);
        let first: Vec<BeatBar> = map.beat_bars().take(20).collect();
        let second: Vec<BeatBar> = map.beat_bars().take(20).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_length_segment_skipped() {
        let map = map_with_signatures(&[(192, 1, 500), (384, 4, 4)]);
        let bars = map.bar_starts_before(Beat::from_ticks(600));
        assert_eq!(
            bars,
            vec![Beat::ZERO, Beat::from_ticks(384), Beat::from_ticks(576)]
        );
    }

    #[test]
    fn test_trailing_zero_length_segment_ends_walk() {
        let map = map_with_signatures(&[(192, 1, 500)]);
        let count = map.beat_bars().count();
        assert_eq!(count, 4);
    }
}
