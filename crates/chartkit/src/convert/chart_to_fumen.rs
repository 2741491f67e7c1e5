//! Chart to Fumen conversion.

use std::ops::ControlFlow;

use strum::IntoEnumIterator;
use tracing::{debug, warn};

use super::common::{note_type_to_fumen, queryable};
use crate::chart::{BranchType, ChartCourse, ChartProject, Note, find_max_used_beat};
use crate::config::ConvertConfig;
use crate::config::fumen::MAX_MEASURES;
use crate::error::{Error, Result};
use crate::fumen::{FumenChart, FumenDifficulty, FumenNoteType, Header, Measure, MeasureData, NoteData};
use crate::timing::{Beat, TempoMap, Time};

/// Encode one course of `project` as a Fumen chart.
///
/// A measure is emitted for every bar that starts before the later of the
/// last used beat and the chart duration. Divergence fields are always
/// written as "no divergence".
///
/// # Errors
///
/// [`Error::CourseNotFound`] when `course_index` is out of range.
pub fn chart_to_fumen(
    project: &ChartProject,
    course_index: usize,
    config: &ConvertConfig,
) -> Result<FumenChart> {
    let course = project
        .course(course_index)
        .ok_or(Error::CourseNotFound {
            index: course_index,
            count: project.courses.len(),
        })?;
    let map = queryable(&course.tempo_map);
    let map: &TempoMap = &map;

    let max_beat = find_max_used_beat(course).max(map.time_to_beat(project.duration_or_default()));
    let mut starts = Vec::new();
    map.for_each_beat_bar(|it| {
        if it.beat >= max_beat {
            return ControlFlow::Break(());
        }
        if it.is_bar {
            starts.push(it.beat);
        }
        ControlFlow::Continue(())
    });
    if starts.is_empty() {
        starts.push(Beat::ZERO);
    }

    let mut measures: Vec<Measure> = starts
        .iter()
        .map(|&beat| build_measure(course, map, beat, config))
        .collect();

    for branch in BranchType::iter() {
        for note in course.notes(branch) {
            place_note(&mut measures, &starts, map, branch, note);
        }
    }

    if measures.len() > MAX_MEASURES as usize {
        warn!(
            "Chart needs {} measures, above the format limit of {}",
            measures.len(),
            MAX_MEASURES
        );
    }

    let mut header = Header::for_difficulty(FumenDifficulty::from(course.difficulty));
    header.number_of_measures = measures.len() as u32;
    debug!("Built {} measures up to beat {}", measures.len(), max_beat);

    Ok(FumenChart { header, measures })
}

fn build_measure(course: &ChartCourse, map: &TempoMap, beat: Beat, config: &ConvertConfig) -> Measure {
    let tempo = map
        .tempo()
        .try_find_last_at_beat(beat)
        .or_else(|| map.tempo().first())
        .map_or(config.fallback_bpm, |it| it.tempo.bpm);
    let start_ms = map.beat_to_time(beat).to_ms();

    let scroll_speed = course
        .scroll_changes
        .try_find_last_at_beat(beat)
        .map_or(1.0, |it| it.scroll_speed.re);

    let mut measure = Measure {
        data: MeasureData {
            bpm: tempo,
            // Offsets are measured from one bar before the measure at its own tempo
            offset: (start_ms - 240000.0 / tempo as f64) as f32,
            is_gogo_time: course.gogo_ranges.iter().any(|it| it.contains(beat)),
            is_bar_line_visible: course
                .bar_line_changes
                .try_find_last_at_beat(beat)
                .is_none_or(|it| it.visible),
            ..Default::default()
        },
        ..Default::default()
    };
    for branch in &mut measure.branches {
        branch.scroll_speed = scroll_speed;
    }
    measure
}

/// Measure starting at or before `beat`; the last measure is open-ended.
fn measure_index_for(starts: &[Beat], beat: Beat) -> Option<usize> {
    starts.partition_point(|start| *start <= beat).checked_sub(1)
}

fn place_note(
    measures: &mut [Measure],
    starts: &[Beat],
    map: &TempoMap,
    branch: BranchType,
    note: &Note,
) {
    let fumen_type = note_type_to_fumen(note.note_type);
    if fumen_type == FumenNoteType::None {
        debug!("{} at {} has no Fumen equivalent", note.note_type.name(), note.beat);
        return;
    }
    let Some(index) = measure_index_for(starts, note.beat) else {
        warn!("No measure for {} note at beat {}, skipping", branch.name(), note.beat);
        return;
    };

    let measure_time = map.beat_to_time(starts[index]);
    let note_time = map.beat_to_time(note.beat) + note.time_offset;
    let mut record = NoteData::new(fumen_type, (note_time - measure_time).to_ms_f32());

    let length_ms = || -> f32 {
        if note.beat_duration > Beat::ZERO {
            (map.beat_to_time(note.end()) - map.beat_to_time(note.beat)).to_ms_f32()
        } else {
            0.0
        }
    };
    if note.note_type.is_balloon() {
        record.initial_score = note.balloon_pop_count.max(0) as u16;
        record.length = length_ms();
    } else if note.note_type.is_drumroll() {
        record.length = length_ms();
    }

    measures[index].branch_mut(branch).notes.push(record);
}

/// Start time of every measure, from the Fumen offset convention.
pub fn measure_start_times(fumen: &FumenChart) -> Vec<Time> {
    let Some(first) = fumen.measures.first() else {
        return Vec::new();
    };
    let origin = first.data.offset as f64 + 240000.0 / first.data.bpm as f64;
    fumen
        .measures
        .iter()
        .map(|m| Time::from_ms(m.data.offset as f64 + 240000.0 / m.data.bpm as f64 - origin))
        .collect()
}
