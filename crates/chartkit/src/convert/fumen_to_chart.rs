//! Fumen to chart conversion.
//!
//! Fumen measures carry a flat millisecond offset and a BPM but no time
//! signature, so every measure length is reconstructed by searching for the
//! signature denominator whose bars tile the measure's duration.

use tracing::{debug, warn};

use super::common::{collapse_repeats, note_type_from_fumen};
use crate::chart::{
    BarLineChange, BranchType, ChartCourse, ChartProject, GoGoRange, Note, ScrollChange,
};
use crate::config::ConvertConfig;
use crate::fumen::{BranchNotes, FumenChart};
use crate::timing::{
    Beat, Complex, FALLBACK_TEMPO, Tempo, TempoChange, TempoMap, Time, TimeSignature,
    TimeSignatureChange, approx_eq_f32,
};

/// Build a single-course chart from a decoded Fumen file.
///
/// Only the normal branch is read unless the header declares divergent
/// paths, in which case the expert and master branches fill their own note
/// lists.
pub fn fumen_to_chart(fumen: &FumenChart, config: &ConvertConfig) -> ChartProject {
    let first = fumen.measures.first();
    let fallback = Tempo::new(config.fallback_bpm);

    let mut current_tempo = first.map_or(fallback, |m| usable_tempo(m.data.bpm, fallback));
    let first_offset = first.map_or(0.0, |m| m.data.offset as f64);
    let mut current_scroll = 1.0f32;
    let mut tempo_offset_accum = 0.0f64;
    let mut previous_start = Time::ZERO;
    let mut gogo_start: Option<Beat> = None;

    let mut course = ChartCourse {
        difficulty: fumen.difficulty().into(),
        tempo_map: TempoMap::with_initial(current_tempo, TimeSignature::COMMON),
        ..Default::default()
    };
    course.bar_line_changes.insert_or_update(BarLineChange {
        beat: Beat::ZERO,
        visible: first.is_none_or(|m| m.data.is_bar_line_visible),
    });

    let branches: &[BranchType] = if fumen.has_divergent_paths() {
        &[BranchType::Normal, BranchType::Expert, BranchType::Master]
    } else {
        &[BranchType::Normal]
    };

    for (index, measure) in fumen.measures.iter().enumerate() {
        let data = &measure.data;
        let measure_tempo = usable_tempo(data.bpm, current_tempo);

        if !approx_eq_f32(measure_tempo.bpm, current_tempo.bpm, config.bpm_epsilon) {
            // Offsets are stored relative to a bar at the measure's own tempo
            tempo_offset_accum -= current_tempo.bar_ms() - measure_tempo.bar_ms();
            let start = measure_start(data.offset, first_offset, tempo_offset_accum);

            infer_signature(&mut course, previous_start, start, current_tempo, config);
            current_tempo = measure_tempo;

            let start_beat = course.tempo_map.time_to_beat(start);
            course
                .tempo_map
                .insert_tempo(TempoChange::new(start_beat, current_tempo));
            course
                .tempo_map
                .insert_signature(TimeSignatureChange::new(start_beat, TimeSignature::COMMON));
            course.tempo_map.rebuild_acceleration_structure();
        } else if index > 0 {
            let start = measure_start(data.offset, first_offset, tempo_offset_accum);
            infer_signature(&mut course, previous_start, start, current_tempo, config);

            let start_beat = course.tempo_map.time_to_beat(start);
            course
                .tempo_map
                .insert_signature(TimeSignatureChange::new(start_beat, TimeSignature::COMMON));
            course.tempo_map.rebuild_acceleration_structure();
        }

        let start = measure_start(data.offset, first_offset, tempo_offset_accum);
        let start_beat = course.tempo_map.time_to_beat(start);
        previous_start = start;

        let scroll = measure.normal().scroll_speed;
        if !approx_eq_f32(scroll, current_scroll, config.bpm_epsilon) {
            current_scroll = scroll;
            course.scroll_changes.insert_or_update(ScrollChange {
                beat: start_beat,
                scroll_speed: Complex::real(scroll),
            });
        }

        course.bar_line_changes.insert_or_update(BarLineChange {
            beat: start_beat,
            visible: data.is_bar_line_visible,
        });

        match (gogo_start, data.is_gogo_time) {
            (Some(range_start), false) => {
                course.gogo_ranges.insert_or_update(GoGoRange {
                    beat: range_start,
                    beat_duration: start_beat - range_start,
                });
                gogo_start = None;
            }
            (None, true) => gogo_start = Some(start_beat),
            _ => {}
        }

        for &branch in branches {
            read_branch_notes(&mut course, branch, measure.branch(branch), start);
        }
    }

    let duration = fumen.measures.last().map_or(Time::ZERO, |last| {
        let last_tempo = usable_tempo(last.data.bpm, current_tempo);
        Time::from_ms(
            measure_start(last.data.offset, first_offset, tempo_offset_accum).to_ms()
                + last_tempo.bar_ms(),
        )
    });

    let mut project = ChartProject {
        duration,
        ..Default::default()
    };

    if let Some(range_start) = gogo_start {
        let end = course
            .tempo_map
            .time_to_beat(project.duration_or_default())
            .max(range_start);
        course.gogo_ranges.insert_or_update(GoGoRange {
            beat: range_start,
            beat_duration: end - range_start,
        });
    }

    simplify(&mut course, config);
    debug!(
        "Converted {} measures: {} tempo changes, {} signature changes, {} notes",
        fumen.measures.len(),
        course.tempo_map.tempo().len(),
        course.tempo_map.signature().len(),
        course.notes_normal.len()
    );

    project.courses.push(course);
    project
}

fn measure_start(offset: f32, first_offset: f64, accum: f64) -> Time {
    Time::from_ms(offset as f64 - first_offset + accum)
}

fn usable_tempo(bpm: f32, fallback: Tempo) -> Tempo {
    if bpm.is_finite() && bpm > 0.0 {
        Tempo::new(bpm)
    } else {
        warn!("Ignoring invalid measure BPM {}", bpm);
        fallback
    }
}

fn read_branch_notes(course: &mut ChartCourse, branch: BranchType, notes: &BranchNotes, start: Time) {
    for record in &notes.notes {
        let Some(kind) = record.kind() else {
            debug!("Skipping unknown Fumen note type {}", record.note_type);
            continue;
        };
        let Some(note_type) = note_type_from_fumen(kind) else {
            continue;
        };

        let begin = start + Time::from_ms(record.offset as f64);
        let beat = course.tempo_map.time_to_beat(begin);
        let mut note = Note::new(beat, note_type);

        if kind.is_balloon() {
            let count = if record.initial_score == 0 {
                record.balloon_hit_count_old
            } else {
                record.initial_score as u32
            };
            note.balloon_pop_count = count.min(i16::MAX as u32) as i16;
        }
        if kind.is_balloon() || kind.is_renda() {
            let end = course
                .tempo_map
                .time_to_beat(begin + Time::from_ms(record.length as f64));
            note.beat_duration = end - beat;
        }

        course.notes_mut(branch).insert_or_update(note);
    }
}

/// Fix the denominator of the signature opened at `segment_start` so its
/// bars tile the time up to `segment_end`, hiding the bar lines this adds
/// inside the measure.
fn infer_signature(
    course: &mut ChartCourse,
    segment_start: Time,
    segment_end: Time,
    tempo: Tempo,
    config: &ConvertConfig,
) {
    let Some(last) = course.tempo_map.signature().last().copied() else {
        return;
    };

    let elapsed_ms = (segment_end - segment_start).to_ms().abs();
    let denominator = best_signature_denominator(
        elapsed_ms,
        tempo,
        config.max_denominator,
        config.denominator_match_ms,
    );
    // Whole 4/4 bars stay 4/4 rather than reducing to 1/1
    let signature = if denominator == 4 {
        TimeSignature::COMMON
    } else {
        TimeSignature::new(4, denominator as i32).simplified()
    };
    course
        .tempo_map
        .insert_signature(TimeSignatureChange::new(last.beat, signature));
    course.tempo_map.rebuild_acceleration_structure();

    let per_bar = signature.duration_per_bar();
    let hidden_bar = last.beat + per_bar;
    if per_bar > Beat::ZERO && hidden_bar < course.tempo_map.time_to_beat(segment_end) {
        course.bar_line_changes.insert_or_update(BarLineChange {
            beat: hidden_bar,
            visible: false,
        });
    }
}

/// Denominator `d` (1 through `max_denominator`) whose 4/d bars at `tempo`
/// tile `elapsed_ms` best.
///
/// The search is ascending and the first denominator leaving a remainder
/// within `match_ms` wins outright; otherwise the smallest remainder wins.
pub fn best_signature_denominator(
    elapsed_ms: f64,
    tempo: Tempo,
    max_denominator: u32,
    match_ms: f64,
) -> u32 {
    let quarter_ms = 60000.0 / tempo.bpm as f64;
    let mut best: Option<(u32, f64)> = None;

    for denominator in 1..=max_denominator.max(1) {
        let bar_ms = quarter_ms * (16.0 / denominator as f64);
        let bars = (elapsed_ms / bar_ms).round();
        let delta = (elapsed_ms - bar_ms * bars).abs();
        if delta <= match_ms {
            return denominator;
        }
        if best.is_none_or(|(_, best_delta)| delta < best_delta) {
            best = Some((denominator, delta));
        }
    }

    best.map_or(4, |(denominator, _)| denominator)
}

/// Collapse runs of equal bar line, signature and tempo values.
fn simplify(course: &mut ChartCourse, config: &ConvertConfig) {
    let seed_visible = course.bar_line_changes.first().is_none_or(|it| it.visible);
    course.bar_line_changes = collapse_repeats(
        &course.bar_line_changes,
        BarLineChange {
            beat: Beat::ZERO,
            visible: seed_visible,
        },
        |a, b| a.visible == b.visible,
    );

    let seed_signature = course
        .tempo_map
        .signature()
        .first()
        .map_or(TimeSignature::COMMON, |it| it.signature);
    let signatures = collapse_repeats(
        course.tempo_map.signature(),
        TimeSignatureChange::new(Beat::ZERO, seed_signature),
        |a, b| a.signature == b.signature,
    );

    let seed_tempo = course
        .tempo_map
        .tempo()
        .first()
        .map_or(FALLBACK_TEMPO, |it| it.tempo);
    let epsilon = config.bpm_epsilon;
    let tempos = collapse_repeats(
        course.tempo_map.tempo(),
        TempoChange::new(Beat::ZERO, seed_tempo),
        |a, b| approx_eq_f32(a.tempo.bpm, b.tempo.bpm, epsilon),
    );

    course.tempo_map.set_signature(signatures);
    course.tempo_map.set_tempo(tempos);
    course.tempo_map.rebuild_acceleration_structure();
}
