//! TJA measure model to chart conversion.

use tracing::debug;

use super::common::note_type_from_tja;
use crate::chart::{
    BarLineChange, ChartCourse, ChartProject, GoGoRange, JposScrollChange, LEVEL_DECIMAL_MAX,
    LEVEL_MAX, LEVEL_MIN, LyricChange, Note, ScrollChange, ScrollType, SongSelectSide,
    TOWER_LIVES_MAX, TOWER_LIVES_MIN,
};
use crate::config::ConvertConfig;
use crate::timing::{
    Beat, HasBeat, SortedCursor, SortedList, Tempo, TempoChange, TempoMap, Time, TimeSignature,
    TimeSignatureChange,
};
use crate::tja::{TjaCourse, TjaDocument, TjaMetadata, TjaNoteType};

/// Absolute `#DELAY` position used to attach offsets to notes.
#[derive(Debug, Clone, Copy)]
struct DelayPoint {
    beat: Beat,
    delay: Time,
}

impl HasBeat for DelayPoint {
    fn beat(&self) -> Beat {
        self.beat
    }
}

/// Build a chart project from a parsed TJA document.
///
/// Metadata-only course sections are skipped. Notes are read into the
/// normal branch.
pub fn tja_to_chart(doc: &TjaDocument, config: &ConvertConfig) -> ChartProject {
    let mut project = project_metadata(&doc.metadata);

    let initial_tempo = if doc.metadata.bpm.bpm.is_finite() && doc.metadata.bpm.bpm > 0.0 {
        doc.metadata.bpm
    } else {
        Tempo::new(config.fallback_bpm)
    };

    for course in doc.courses.iter().filter(|it| it.has_chart()) {
        let converted = convert_course(course, initial_tempo);

        if let Some(last) = course.measures.last() {
            let end = last.start + last.time_signature.duration_per_bar();
            project.duration = project.duration.max(converted.tempo_map.beat_to_time(end));
        }
        project.courses.push(converted);
    }

    debug!(
        "Converted {} of {} TJA courses, duration {}",
        project.courses.len(),
        doc.courses.len(),
        project.duration
    );
    project
}

fn project_metadata(meta: &TjaMetadata) -> ChartProject {
    ChartProject {
        duration: Time::ZERO,
        title: meta.title.clone(),
        title_localized: meta.title_localized.clone(),
        subtitle: meta.subtitle.clone(),
        subtitle_localized: meta.subtitle_localized.clone(),
        creator: meta.maker.clone(),
        genre: meta.genre.clone(),
        lyrics_file_name: meta.lyrics.clone(),
        song_offset: meta.offset,
        song_demo_start: meta.demo_start,
        song_file_name: meta.wave.clone(),
        song_jacket: meta.preimage.clone(),
        song_volume: meta.song_volume,
        sound_effect_volume: meta.se_volume,
        background_image_file_name: meta.bg_image.clone(),
        background_movie_file_name: meta.bg_movie.clone(),
        movie_offset: meta.movie_offset,
        other_metadata: meta.others.clone(),
        courses: Vec::new(),
    }
}

fn convert_course(course: &TjaCourse, initial_tempo: Tempo) -> ChartCourse {
    let meta = &course.metadata;
    let style = meta.style.max(1);
    let mut out = ChartCourse {
        difficulty: meta.course,
        level: meta.level.clamp(LEVEL_MIN, LEVEL_MAX),
        level_decimal: meta.level_decimal_tag.clamp(0, LEVEL_DECIMAL_MAX),
        style,
        player_side: meta.start_player_side.clamp(1, style),
        creator: meta.notes_designer.clone(),
        life: meta.life.clamp(TOWER_LIVES_MIN, TOWER_LIVES_MAX),
        side: SongSelectSide::from_index(meta.side),
        score_init: meta.score_init,
        score_diff: meta.score_diff,
        other_metadata: meta.others.clone(),
        tempo_map: TempoMap::with_changes(
            vec![TempoChange::new(Beat::ZERO, initial_tempo)].into(),
            vec![TimeSignatureChange::new(Beat::ZERO, TimeSignature::COMMON)].into(),
        ),
        ..Default::default()
    };

    let delays: SortedList<DelayPoint> = course
        .measures
        .iter()
        .flat_map(|measure| {
            measure.delay_changes.iter().map(|change| DelayPoint {
                beat: measure.start + change.time,
                delay: change.delay,
            })
        })
        .collect();
    let mut delay_cursor = SortedCursor::new();
    let mut balloon_index = 0usize;
    let mut last_signature = TimeSignature::COMMON;

    for measure in &course.measures {
        for tja_note in &measure.notes {
            let beat = measure.start + tja_note.time;

            if tja_note.note_type == TjaNoteType::EndBalloonOrDrumroll {
                match out.notes_normal.last_mut() {
                    Some(last) if last.note_type.is_long() => last.beat_duration = beat - last.beat,
                    _ => debug!("Roll end at {} without an open roll", beat),
                }
                continue;
            }
            let Some(note_type) = note_type_from_tja(tja_note.note_type) else {
                continue;
            };

            let mut note = Note::new(beat, note_type);
            note.time_offset = delay_cursor
                .next(delays.as_slice(), beat)
                .map_or(Time::ZERO, |it| it.delay);

            if tja_note.note_type.takes_balloon_count() {
                if let Some(&count) = meta.balloon.get(balloon_index) {
                    note.balloon_pop_count = count.clamp(0, i16::MAX as i32) as i16;
                }
                balloon_index += 1;
            }
            out.notes_normal.insert_or_update(note);
        }

        if measure.time_signature != last_signature {
            out.tempo_map.insert_signature(TimeSignatureChange::new(
                measure.start,
                measure.time_signature,
            ));
            last_signature = measure.time_signature;
        }

        for change in &measure.tempo_changes {
            out.tempo_map
                .insert_tempo(TempoChange::new(measure.start + change.time, change.tempo));
        }
        for change in &measure.scroll_changes {
            out.scroll_changes.insert_or_update(ScrollChange {
                beat: measure.start + change.time,
                scroll_speed: change.scroll_speed,
            });
        }
        for change in &measure.scroll_types {
            out.scroll_types.insert_or_update(ScrollType {
                beat: measure.start + change.time,
                method: change.method,
            });
        }
        for change in &measure.jpos_scroll_changes {
            out.jpos_scroll_changes.insert_or_update(JposScrollChange {
                beat: measure.start + change.time,
                movement: change.movement,
                duration_sec: change.duration_sec,
            });
        }
        for change in &measure.bar_line_changes {
            out.bar_line_changes.insert_or_update(BarLineChange {
                beat: measure.start + change.time,
                visible: change.visible,
            });
        }
        for change in &measure.lyric_changes {
            out.lyrics.insert_or_update(LyricChange {
                beat: measure.start + change.time,
                lyric: change.lyric.clone(),
            });
        }
    }

    for range in course.gogo_ranges() {
        out.gogo_ranges.insert_or_update(GoGoRange {
            beat: range.start,
            beat_duration: range.end - range.start,
        });
    }

    out.tempo_map.rebuild_acceleration_structure();
    out
}
