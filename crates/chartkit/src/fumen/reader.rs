use std::path::Path;

use strum::IntoEnumIterator;
use tracing::{debug, warn};

use super::bytes::ByteReader;
use super::layout;
use super::types::{BranchNotes, FumenChart, Header, JudgeTimingBlock, Measure, MeasureData, NoteData};
use crate::chart::BranchType;
use crate::config::fumen::MAX_MEASURES;
use crate::error::{Error, ParseContext, ParseError, ParseResultExt, Result};

type ReadResult<T> = std::result::Result<T, ParseError>;

/// Read and decode a Fumen file.
///
/// # Errors
///
/// [`Error::FileRead`] when the file cannot be read, [`Error::Parse`] when
/// its contents are truncated.
pub fn read_fumen_file<P: AsRef<Path>>(path: P) -> Result<FumenChart> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read {} bytes from {}", data.len(), path.display());

    read_fumen_bytes(&data).inspect_err(|e| warn!("Failed to parse {}: {}", path.display(), e))
}

/// Decode a Fumen chart from memory.
pub fn read_fumen_bytes(data: &[u8]) -> Result<FumenChart> {
    if data.is_empty() {
        return Err(ParseError::new(0, "Invalid input data: zero size").into());
    }

    let mut buf = ByteReader::new(data);
    let header = read_header(&mut buf).within(ParseContext::Header)?;

    let count = header.number_of_measures;
    if count > MAX_MEASURES {
        warn!(
            "Header declares {} measures, above the format limit of {}",
            count, MAX_MEASURES
        );
    }

    // Cap the reservation so a corrupt count cannot force a huge allocation
    let max_possible = buf.remaining() / layout::measure::SIZE;
    let mut measures = Vec::with_capacity((count as usize).min(max_possible));
    for index in 0..count as usize {
        let measure = read_measure(&mut buf).within(ParseContext::Measure { index })?;
        measures.push(measure);
    }

    if buf.remaining() > 0 {
        debug!("{} trailing bytes after the last measure", buf.remaining());
    }

    Ok(FumenChart { header, measures })
}

fn read_header(buf: &mut ByteReader<'_>) -> ReadResult<Header> {
    if buf.remaining() < layout::header::SIZE {
        return Err(ParseError::new(
            buf.position(),
            format!(
                "Not enough data to read header (expected {} bytes, got {})",
                layout::header::SIZE,
                buf.remaining()
            ),
        ));
    }

    let mut judge_timings = Vec::with_capacity(layout::header::JUDGE_TIMING_BLOCKS);
    for _ in 0..layout::header::JUDGE_TIMING_BLOCKS {
        judge_timings.push(JudgeTimingBlock {
            good: buf.read_f32()?,
            ok: buf.read_f32()?,
            bad: buf.read_f32()?,
        });
    }

    let mut header = Header {
        judge_timings,
        has_divergent_paths: buf.read_u32()?,
        max_hp: buf.read_u32()?,
        clear_hp: buf.read_u32()?,
        hp_per_good: buf.read_i32()?,
        hp_per_ok: buf.read_i32()?,
        hp_per_bad: buf.read_i32()?,
        max_combo: buf.read_u32()?,
        hp_increase_ratio: buf.read_u32()?,
        hp_increase_ratio_master: buf.read_u32()?,
        ..Default::default()
    };

    let mut points = [0u32; layout::header::DIVERGE_POINT_FIELDS];
    for point in &mut points {
        *point = buf.read_u32()?;
    }
    header.set_diverge_points(points);

    header.max_score_value = buf.read_u32()?;
    header.number_of_measures = buf.read_u32()?;
    header.unknown1 = buf.read_u32()?;
    Ok(header)
}

fn read_measure(buf: &mut ByteReader<'_>) -> ReadResult<Measure> {
    let data = read_measure_data(buf)?;

    let mut measure = Measure {
        data,
        ..Default::default()
    };
    for branch in BranchType::iter() {
        *measure.branch_mut(branch) =
            read_branch_notes(buf).within(ParseContext::Branch { branch })?;
    }
    Ok(measure)
}

fn read_measure_data(buf: &mut ByteReader<'_>) -> ReadResult<MeasureData> {
    let bpm = buf.read_f32()?;
    let offset = buf.read_f32()?;
    let is_gogo_time = buf.read_u8()? != 0;
    let is_bar_line_visible = buf.read_u8()? != 0;
    buf.skip(2)?;

    let mut diverge_requirements = [0u32; layout::measure::DIVERGE_REQUIREMENT_FIELDS];
    for requirement in &mut diverge_requirements {
        *requirement = buf.read_u32()?;
    }
    buf.skip(4)?;

    Ok(MeasureData {
        bpm,
        offset,
        is_gogo_time,
        is_bar_line_visible,
        diverge_requirements,
    })
}

fn read_branch_notes(buf: &mut ByteReader<'_>) -> ReadResult<BranchNotes> {
    let count = buf.read_u16()? as usize;
    buf.skip(2)?;
    let scroll_speed = buf.read_f32()?;

    let mut notes = Vec::with_capacity(count.min(buf.remaining() / layout::note::SIZE));
    for index in 0..count {
        let note = read_note(buf).within(ParseContext::Note { index, count })?;
        notes.push(note);
    }
    Ok(BranchNotes {
        scroll_speed,
        notes,
    })
}

fn read_note(buf: &mut ByteReader<'_>) -> ReadResult<NoteData> {
    let note_type = buf.read_u32()?;
    let offset = buf.read_f32()?;
    buf.skip(4)?;
    let note = NoteData {
        note_type,
        offset,
        initial_score: buf.read_u16()?,
        score_diff_x4: buf.read_u16()?,
        balloon_hit_count_old: buf.read_u32()?,
        length: buf.read_f32()?,
    };

    if note.is_renda() {
        buf.skip(layout::note::RENDA_PADDING)?;
    }
    Ok(note)
}
