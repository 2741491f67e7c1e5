//! Chart to TJA measure model conversion.

use std::ops::ControlFlow;

use tracing::warn;

use super::common::{note_type_to_tja, queryable};
use crate::chart::{ChartCourse, ChartProject};
use crate::config::ConvertConfig;
use crate::timing::{Beat, Tempo, TempoMap, Time, TimeSignature};
use crate::tja::{
    GeneratorComment, TjaBarLineChange, TjaCourse, TjaCourseMetadata, TjaDelayChange,
    TjaDocument, TjaGoGoChange, TjaJposScroll, TjaLyricChange, TjaMeasure, TjaMetadata, TjaNote,
    TjaNoteType, TjaScrollChange, TjaScrollType, TjaTempoChange,
};

const FALLBACK_TITLE: &str = "Untitled Chart";

/// Lay every course of `project` out as TJA measures.
///
/// Measure boundaries come from the tempo map's bar walk; every event lands
/// in the measure starting at or before it. Only the normal branch is
/// written.
pub fn chart_to_tja(project: &ChartProject, config: &ConvertConfig) -> TjaDocument {
    let bpm = project
        .courses
        .first()
        .and_then(|course| course.tempo_map.tempo().try_find_last_at_beat(Beat::ZERO))
        .map_or(Tempo::new(config.fallback_bpm), |it| it.tempo);

    let metadata = TjaMetadata {
        title: if project.title.is_empty() {
            FALLBACK_TITLE.to_string()
        } else {
            project.title.clone()
        },
        title_localized: project.title_localized.clone(),
        subtitle: project.subtitle.clone(),
        subtitle_localized: project.subtitle_localized.clone(),
        maker: project.creator.clone(),
        genre: project.genre.clone(),
        lyrics: project.lyrics_file_name.clone(),
        bpm,
        offset: project.song_offset,
        demo_start: project.song_demo_start,
        wave: project.song_file_name.clone(),
        preimage: project.song_jacket.clone(),
        song_volume: project.song_volume,
        se_volume: project.sound_effect_volume,
        bg_image: project.background_image_file_name.clone(),
        bg_movie: project.background_movie_file_name.clone(),
        movie_offset: project.movie_offset,
        others: project.other_metadata.clone(),
    };

    let courses = project
        .courses
        .iter()
        .map(|course| TjaCourse {
            metadata: course_metadata(course),
            measures: course_measures(project, course, bpm),
        })
        .collect();

    TjaDocument {
        metadata,
        courses,
        generator_comment: config.tja_generator_comment.then(GeneratorComment::current),
    }
}

fn course_metadata(course: &ChartCourse) -> TjaCourseMetadata {
    TjaCourseMetadata {
        course: course.difficulty,
        level: course.level,
        level_decimal_tag: course.level_decimal,
        style: course.style,
        start_player_side: course.player_side,
        notes_designer: course.creator.clone(),
        balloon: course
            .notes_normal
            .iter()
            .filter(|note| note.note_type.is_balloon())
            .map(|note| note.balloon_pop_count as i32)
            .collect(),
        score_init: course.score_init,
        score_diff: course.score_diff,
        life: course.life,
        side: course.side as i32,
        others: course.other_metadata.clone(),
    }
}

/// Measures covering every event and the chart duration.
struct MeasureLayout {
    measures: Vec<TjaMeasure>,
}

impl MeasureLayout {
    fn new(map: &TempoMap, max_used: Beat, duration: Beat) -> Self {
        let end = max_used.max(duration);
        let mut measures = Vec::new();

        map.for_each_beat_bar(|it| {
            if duration > max_used && it.beat >= duration {
                return ControlFlow::Break(());
            }
            if it.is_bar {
                measures.push(TjaMeasure::new(it.beat, it.signature));
            }
            if it.beat >= end {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        if measures.is_empty() {
            measures.push(TjaMeasure::new(Beat::ZERO, TimeSignature::COMMON));
        }
        Self { measures }
    }

    /// Measure in effect at `beat` and the beat relative to its start.
    fn locate(&mut self, beat: Beat, what: &str) -> Option<(&mut TjaMeasure, Beat)> {
        let index = self
            .measures
            .partition_point(|m| m.start <= beat)
            .checked_sub(1);
        match index {
            Some(index) => {
                let measure = &mut self.measures[index];
                let within = beat - measure.start;
                Some((measure, within))
            }
            None => {
                warn!("No measure for {} at beat {}, skipping", what, beat);
                None
            }
        }
    }
}

fn course_measures(project: &ChartProject, course: &ChartCourse, doc_bpm: Tempo) -> Vec<TjaMeasure> {
    let map = queryable(&course.tempo_map);
    let map: &TempoMap = &map;
    let duration = map.time_to_beat(project.duration_or_default());
    let mut layout = MeasureLayout::new(map, course.max_used_beat(), duration);

    for (index, change) in map.tempo().iter().enumerate() {
        if index == 0 && change.tempo.approx_eq(doc_bpm) {
            continue;
        }
        if let Some((measure, time)) = layout.locate(change.beat, "tempo change") {
            measure.tempo_changes.push(TjaTempoChange {
                time,
                tempo: change.tempo,
            });
        }
    }

    let mut last_offset = Time::ZERO;
    for note in &course.notes_normal {
        let Some((measure, time)) = layout.locate(note.beat, "note") else {
            continue;
        };
        measure.notes.push(TjaNote {
            time,
            note_type: note_type_to_tja(note.note_type),
        });

        let offset = if note.time_offset.approx_eq(Time::ZERO) {
            Time::ZERO
        } else {
            note.time_offset
        };
        if offset != last_offset {
            measure.delay_changes.push(TjaDelayChange {
                time,
                delay: offset,
            });
            last_offset = offset;
        }

        if note.beat_duration > Beat::ZERO {
            if let Some((measure, time)) = layout.locate(note.end(), "roll end") {
                measure.notes.push(TjaNote {
                    time,
                    note_type: TjaNoteType::EndBalloonOrDrumroll,
                });
            }
        }
    }

    for change in &course.scroll_changes {
        if let Some((measure, time)) = layout.locate(change.beat, "scroll change") {
            measure.scroll_changes.push(TjaScrollChange {
                time,
                scroll_speed: change.scroll_speed,
            });
        }
    }
    for change in &course.scroll_types {
        if let Some((measure, time)) = layout.locate(change.beat, "scroll type") {
            measure.scroll_types.push(TjaScrollType {
                time,
                method: change.method,
            });
        }
    }
    for change in &course.jpos_scroll_changes {
        if let Some((measure, time)) = layout.locate(change.beat, "JPOS scroll") {
            measure.jpos_scroll_changes.push(TjaJposScroll {
                time,
                movement: change.movement,
                duration_sec: change.duration_sec,
            });
        }
    }
    for change in &course.bar_line_changes {
        if let Some((measure, time)) = layout.locate(change.beat, "bar line change") {
            measure.bar_line_changes.push(TjaBarLineChange {
                time,
                visible: change.visible,
            });
        }
    }
    for change in &course.lyrics {
        if let Some((measure, time)) = layout.locate(change.beat, "lyric") {
            measure.lyric_changes.push(TjaLyricChange {
                time,
                lyric: change.lyric.clone(),
            });
        }
    }

    for range in &course.gogo_ranges {
        if let Some((measure, time)) = layout.locate(range.beat, "go-go start") {
            measure.gogo_changes.push(TjaGoGoChange { time, is_gogo: true });
        }
        if let Some((measure, time)) = layout.locate(range.end(), "go-go end") {
            measure.gogo_changes.push(TjaGoGoChange {
                time,
                is_gogo: false,
            });
        }
    }

    layout.measures
}
