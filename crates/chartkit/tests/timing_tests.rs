//! Property tests for the tempo map and bar walk

use chartkit::timing::{Beat, Tempo, TempoChange, TempoMap, TimeSignature, TimeSignatureChange};
use proptest::prelude::*;

fn tempo_map(changes: &[(i32, f32)]) -> TempoMap {
    let mut map = TempoMap::with_initial(Tempo::new(120.0), TimeSignature::COMMON);
    for &(ticks, bpm) in changes {
        map.insert_tempo(TempoChange::new(Beat::from_ticks(ticks), Tempo::new(bpm)));
    }
    map.rebuild_acceleration_structure();
    map
}

fn tempo_changes() -> impl Strategy<Value = Vec<(i32, f32)>> {
    prop::collection::vec((1..20_000i32, 30.0f32..400.0), 0..8)
}

proptest! {
    #[test]
    fn beat_time_round_trip(changes in tempo_changes(), ticks in -2_000..40_000i32) {
        let map = tempo_map(&changes);
        let beat = Beat::from_ticks(ticks);
        prop_assert_eq!(map.time_to_beat(map.beat_to_time(beat)), beat);
    }

    #[test]
    fn beat_to_time_is_monotonic(changes in tempo_changes(), ticks in 0..40_000i32, step in 1..500i32) {
        let map = tempo_map(&changes);
        let earlier = map.beat_to_time(Beat::from_ticks(ticks));
        let later = map.beat_to_time(Beat::from_ticks(ticks + step));
        prop_assert!(later.seconds > earlier.seconds);
    }

    #[test]
    fn bar_starts_follow_signatures(numerator in 1..16i32, denominator in prop::sample::select(vec![1, 2, 4, 8, 16, 32])) {
        let mut map = TempoMap::with_initial(Tempo::new(120.0), TimeSignature::COMMON);
        map.insert_signature(TimeSignatureChange::new(
            Beat::from_bars(1),
            TimeSignature::new(numerator, denominator),
        ));
        map.rebuild_acceleration_structure();

        let per_bar = TimeSignature::new(numerator, denominator).duration_per_bar();
        let bars = map.bar_starts_before(Beat::from_bars(1) + per_bar * 4);
        prop_assert_eq!(bars.len(), 5);
        for pair in bars[1..].windows(2) {
            prop_assert_eq!(pair[1] - pair[0], per_bar);
        }
    }
}

#[test]
fn test_tempo_change_moves_later_beats() {
    let map = tempo_map(&[(192, 240.0)]);
    // One bar at 120 BPM then a bar at 240 BPM
    assert!(map.beat_to_time(Beat::from_bars(1)).approx_eq(chartkit::Time::from_sec(2.0)));
    assert!(map.beat_to_time(Beat::from_bars(2)).approx_eq(chartkit::Time::from_sec(3.0)));
}
