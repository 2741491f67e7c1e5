use serde::{Deserialize, Serialize};

use super::{Beat, FALLBACK_TEMPO, HasBeat, SortedList, Tempo, Time, TimeSignature};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempoChange {
    pub beat: Beat,
    pub tempo: Tempo,
}

impl TempoChange {
    pub fn new(beat: Beat, tempo: Tempo) -> Self {
        Self { beat, tempo }
    }
}

impl HasBeat for TempoChange {
    fn beat(&self) -> Beat {
        self.beat
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignatureChange {
    pub beat: Beat,
    pub signature: TimeSignature,
}

impl TimeSignatureChange {
    pub fn new(beat: Beat, signature: TimeSignature) -> Self {
        Self { beat, signature }
    }
}

impl HasBeat for TimeSignatureChange {
    fn beat(&self) -> Beat {
        self.beat
    }
}

/// Cumulative playback time at a tempo breakpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TempoSegment {
    beat: Beat,
    time: Time,
    sec_per_tick: f64,
}

impl TempoSegment {
    fn new(beat: Beat, time: Time, tempo: Tempo) -> Self {
        Self {
            beat,
            time,
            sec_per_tick: 60.0 / (tempo.bpm as f64 * Beat::TICKS_PER_BEAT as f64),
        }
    }

    fn time_at(&self, beat: Beat) -> Time {
        self.time + Time::from_sec((beat - self.beat).ticks as f64 * self.sec_per_tick)
    }

    fn ticks_at(&self, time: Time) -> f64 {
        self.beat.ticks as f64 + (time - self.time).seconds / self.sec_per_tick
    }
}

/// Tempo and time signature schedule of one course.
///
/// Beat/time queries read a derived table of cumulative times at every tempo
/// breakpoint. Any mutation marks that table stale and
/// [`rebuild_acceleration_structure`](Self::rebuild_acceleration_structure)
/// must run before the next query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "TempoMapData", into = "TempoMapData")]
pub struct TempoMap {
    tempo: SortedList<TempoChange>,
    signature: SortedList<TimeSignatureChange>,
    segments: Vec<TempoSegment>,
    stale: bool,
}

#[derive(Serialize, Deserialize)]
struct TempoMapData {
    tempo: SortedList<TempoChange>,
    signature: SortedList<TimeSignatureChange>,
}

impl From<TempoMapData> for TempoMap {
    fn from(data: TempoMapData) -> Self {
        Self::with_changes(data.tempo, data.signature)
    }
}

impl From<TempoMap> for TempoMapData {
    fn from(map: TempoMap) -> Self {
        Self {
            tempo: map.tempo,
            signature: map.signature,
        }
    }
}

impl Default for TempoMap {
    fn default() -> Self {
        Self::with_changes(SortedList::new(), SortedList::new())
    }
}

impl PartialEq for TempoMap {
    fn eq(&self, other: &Self) -> bool {
        self.tempo == other.tempo && self.signature == other.signature
    }
}

impl TempoMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// A ready-to-query map with one tempo and one signature at beat zero.
    pub fn with_initial(tempo: Tempo, signature: TimeSignature) -> Self {
        let mut map = Self::new();
        map.tempo.insert_or_update(TempoChange::new(Beat::ZERO, tempo));
        map.signature
            .insert_or_update(TimeSignatureChange::new(Beat::ZERO, signature));
        map.rebuild_acceleration_structure();
        map
    }

    pub fn with_changes(
        tempo: SortedList<TempoChange>,
        signature: SortedList<TimeSignatureChange>,
    ) -> Self {
        let mut map = Self {
            tempo,
            signature,
            segments: Vec::new(),
            stale: true,
        };
        map.rebuild_acceleration_structure();
        map
    }

    pub fn tempo(&self) -> &SortedList<TempoChange> {
        &self.tempo
    }

    pub fn signature(&self) -> &SortedList<TimeSignatureChange> {
        &self.signature
    }

    pub fn tempo_mut(&mut self) -> &mut SortedList<TempoChange> {
        self.stale = true;
        &mut self.tempo
    }

    pub fn signature_mut(&mut self) -> &mut SortedList<TimeSignatureChange> {
        self.stale = true;
        &mut self.signature
    }

    pub fn insert_tempo(&mut self, change: TempoChange) {
        self.tempo_mut().insert_or_update(change);
    }

    pub fn insert_signature(&mut self, change: TimeSignatureChange) {
        self.signature_mut().insert_or_update(change);
    }

    pub fn set_tempo(&mut self, tempo: SortedList<TempoChange>) {
        *self.tempo_mut() = tempo;
    }

    pub fn set_signature(&mut self, signature: SortedList<TimeSignatureChange>) {
        *self.signature_mut() = signature;
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn rebuild_acceleration_structure(&mut self) {
        self.segments.clear();
        self.segments.reserve(self.tempo.len().max(1));

        let mut iter = self.tempo.iter().filter(|change| change.tempo.bpm > 0.0);
        let Some(first) = iter.next() else {
            self.segments
                .push(TempoSegment::new(Beat::ZERO, Time::ZERO, FALLBACK_TEMPO));
            self.stale = false;
            return;
        };

        // The first tempo also covers everything before its beat, so beat
        // zero maps to time zero regardless of where it starts.
        let anchor = TempoSegment::new(Beat::ZERO, Time::ZERO, first.tempo);
        let mut previous = TempoSegment::new(first.beat, anchor.time_at(first.beat), first.tempo);
        self.segments.push(previous);

        for change in iter {
            let segment = TempoSegment::new(change.beat, previous.time_at(change.beat), change.tempo);
            self.segments.push(segment);
            previous = segment;
        }
        self.stale = false;
    }

    fn segment_for_beat(&self, beat: Beat) -> &TempoSegment {
        debug_assert!(!self.stale, "tempo map queried before rebuild");
        let index = self.segments.partition_point(|s| s.beat <= beat);
        &self.segments[index.saturating_sub(1)]
    }

    fn segment_for_time(&self, time: Time) -> &TempoSegment {
        debug_assert!(!self.stale, "tempo map queried before rebuild");
        let index = self.segments.partition_point(|s| s.time <= time);
        &self.segments[index.saturating_sub(1)]
    }

    pub fn beat_to_time(&self, beat: Beat) -> Time {
        self.segment_for_beat(beat).time_at(beat)
    }

    /// Nearest tick to `time`.
    pub fn time_to_beat(&self, time: Time) -> Beat {
        Beat::from_ticks(self.time_to_ticks_f64(time).round() as i32)
    }

    /// Fractional quarter-note position of `time`, without tick rounding.
    pub fn time_to_beat_f64(&self, time: Time) -> f64 {
        self.time_to_ticks_f64(time) / Beat::TICKS_PER_BEAT as f64
    }

    fn time_to_ticks_f64(&self, time: Time) -> f64 {
        self.segment_for_time(time).ticks_at(time)
    }

    pub fn tempo_at(&self, beat: Beat) -> Tempo {
        self.tempo
            .try_find_last_at_beat(beat)
            .or_else(|| self.tempo.first())
            .map(|change| change.tempo)
            .unwrap_or(FALLBACK_TEMPO)
    }

    pub fn signature_at(&self, beat: Beat) -> TimeSignature {
        self.signature
            .try_find_last_at_beat(beat)
            .map(|change| change.signature)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_with_changes(changes: &[(i32, f32)]) -> TempoMap {
        let tempo = changes
            .iter()
            .map(|&(ticks, bpm)| TempoChange::new(Beat::from_ticks(ticks), Tempo::new(bpm)))
            .collect();
        let signature = vec![TimeSignatureChange::new(Beat::ZERO, TimeSignature::COMMON)].into();
        TempoMap::with_changes(tempo, signature)
    }

    #[test]
    fn test_constant_tempo() {
        let map = TempoMap::with_initial(Tempo::new(120.0), TimeSignature::COMMON);
        assert!(map.beat_to_time(Beat::from_beats(1)).approx_eq(Time::from_ms(500.0)));
        assert!(map.beat_to_time(Beat::from_bars(1)).approx_eq(Time::from_ms(2000.0)));
        assert_eq!(map.time_to_beat(Time::from_ms(1500.0)), Beat::from_beats(3));
    }

    #[test]
    fn test_tempo_change_integration() {
        // 120 BPM for one bar, then 240 BPM
        let map = map_with_changes(&[(0, 120.0), (192, 240.0)]);

        assert!(map.beat_to_time(Beat::from_bars(1)).approx_eq(Time::from_ms(2000.0)));
        assert!(map.beat_to_time(Beat::from_bars(2)).approx_eq(Time::from_ms(3000.0)));
        assert_eq!(map.time_to_beat(Time::from_ms(2500.0)), Beat::from_ticks(192 + 96));
    }

    #[test]
    fn test_negative_extrapolates_first_tempo() {
        let map = map_with_changes(&[(0, 60.0), (96, 120.0)]);
        assert!(map.beat_to_time(Beat::from_beats(-1)).approx_eq(Time::from_ms(-1000.0)));
        assert_eq!(map.time_to_beat(Time::from_ms(-2000.0)), Beat::from_beats(-2));
    }

    #[test]
    fn test_empty_map_uses_fallback() {
        let mut map = TempoMap::new();
        map.rebuild_acceleration_structure();
        let time = map.beat_to_time(Beat::from_beats(1));
        assert!(time.approx_eq(Time::from_sec(60.0 / FALLBACK_TEMPO.bpm as f64)));
    }

    #[test]
    fn test_mutation_marks_stale() {
        let mut map = TempoMap::with_initial(Tempo::new(120.0), TimeSignature::COMMON);
        assert!(!map.is_stale());

        map.insert_tempo(TempoChange::new(Beat::from_bars(1), Tempo::new(60.0)));
        assert!(map.is_stale());

        map.rebuild_acceleration_structure();
        assert!(!map.is_stale());
        assert!(map.beat_to_time(Beat::from_bars(2)).approx_eq(Time::from_ms(6000.0)));
    }

    #[test]
    fn test_round_trip_on_ticks() {
        let map = map_with_changes(&[(0, 150.0), (200, 97.5), (450, 301.0), (1000, 75.25)]);
        for ticks in (-100..1500).step_by(7) {
            let beat = Beat::from_ticks(ticks);
            assert_eq!(map.time_to_beat(map.beat_to_time(beat)), beat);
        }
    }

    #[test]
    fn test_tempo_and_signature_at() {
        let mut map = map_with_changes(&[(0, 120.0), (192, 180.0)]);
        map.insert_signature(TimeSignatureChange::new(Beat::from_bars(2), TimeSignature::new(3, 4)));
        map.rebuild_acceleration_structure();

        assert_eq!(map.tempo_at(Beat::from_ticks(191)).bpm, 120.0);
        assert_eq!(map.tempo_at(Beat::from_ticks(192)).bpm, 180.0);
        assert_eq!(map.signature_at(Beat::from_bars(1)), TimeSignature::COMMON);
        assert_eq!(map.signature_at(Beat::from_bars(3)), TimeSignature::new(3, 4));
    }

    #[test]
    fn test_serde_round_trip_rebuilds() {
        let map = map_with_changes(&[(0, 120.0), (192, 60.0)]);
        let json = serde_json::to_string(&map).unwrap();
        let restored: TempoMap = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, map);
        assert!(!restored.is_stale());
        assert!(restored.beat_to_time(Beat::from_bars(2)).approx_eq(Time::from_ms(6000.0)));
    }
}
