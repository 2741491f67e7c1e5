use std::path::Path;

use tracing::debug;

use super::bytes::ByteWriter;
use super::layout;
use super::types::{BranchNotes, FumenChart, Header, JudgeTimingBlock, Measure};
use crate::config::fumen as constants;
use crate::error::{Error, Result};

/// Encode a chart to the Fumen V2 byte layout.
///
/// Padding is always zeroed, the header is always written with 36 judge
/// blocks and `NumberOfMeasures` is taken from `chart.measures` rather than
/// from the header field. Branch divergence is not supported, so the
/// divergence flag, diverge points and per-measure requirements are written
/// as fixed "no divergence" values whatever the chart holds.
///
/// # Errors
///
/// [`Error::Conversion`] when a branch holds more notes than its 16-bit
/// count field can describe.
pub fn write_fumen_bytes(chart: &FumenChart) -> Result<Vec<u8>> {
    let mut out = ByteWriter::with_capacity(
        layout::header::SIZE + chart.measures.len() * (layout::measure::SIZE + 3 * layout::branch::SIZE),
    );

    let measure_count = u32::try_from(chart.measures.len())
        .map_err(|_| Error::Conversion(format!("{} measures do not fit the header", chart.measures.len())))?;
    write_header(&mut out, &chart.header, measure_count);

    for (index, measure) in chart.measures.iter().enumerate() {
        write_measure(&mut out, measure)
            .map_err(|reason| Error::Conversion(format!("measure {}: {}", index, reason)))?;
    }

    Ok(out.into_inner())
}

/// Encode `chart` and write it to `path`.
pub fn write_fumen_file<P: AsRef<Path>>(path: P, chart: &FumenChart) -> Result<()> {
    let path = path.as_ref();
    let bytes = write_fumen_bytes(chart)?;

    std::fs::write(path, &bytes).map_err(|source| Error::FileWrite {
        path: path.to_path_buf(),
        reason: "Failed to write data to file".to_string(),
        source,
    })?;
    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

fn write_header(out: &mut ByteWriter, header: &Header, measure_count: u32) {
    let blocks = header
        .judge_timings
        .iter()
        .copied()
        .chain(std::iter::repeat(JudgeTimingBlock::default()))
        .take(layout::header::JUDGE_TIMING_BLOCKS);
    for block in blocks {
        out.write_f32(block.good);
        out.write_f32(block.ok);
        out.write_f32(block.bad);
    }

    out.write_u32(0);
    out.write_u32(header.max_hp);
    out.write_u32(header.clear_hp);
    out.write_i32(header.hp_per_good);
    out.write_i32(header.hp_per_ok);
    out.write_i32(header.hp_per_bad);
    out.write_u32(header.max_combo);
    out.write_u32(header.hp_increase_ratio);
    out.write_u32(header.hp_increase_ratio_master);
    for point in Header::STOCK_DIVERGE_POINTS {
        out.write_u32(point);
    }
    out.write_u32(header.max_score_value);
    out.write_u32(measure_count);
    out.write_u32(header.unknown1);
}

fn write_measure(out: &mut ByteWriter, measure: &Measure) -> std::result::Result<(), String> {
    let data = &measure.data;
    out.write_f32(data.bpm);
    out.write_f32(data.offset);
    out.write_u8(data.is_gogo_time as u8);
    out.write_u8(data.is_bar_line_visible as u8);
    out.pad(2);
    for _ in 0..layout::measure::DIVERGE_REQUIREMENT_FIELDS {
        out.write_u32(constants::NO_DIVERGENCE);
    }
    out.pad(4);

    for branch in &measure.branches {
        write_branch_notes(out, branch)?;
    }
    Ok(())
}

fn write_branch_notes(out: &mut ByteWriter, branch: &BranchNotes) -> std::result::Result<(), String> {
    let count = u16::try_from(branch.notes.len())
        .map_err(|_| format!("{} notes exceed the per-branch limit of {}", branch.notes.len(), u16::MAX))?;
    out.write_u16(count);
    out.pad(2);
    out.write_f32(branch.scroll_speed);

    for note in &branch.notes {
        out.write_u32(note.note_type);
        out.write_f32(note.offset);
        out.pad(4);
        out.write_u16(note.initial_score);
        out.write_u16(note.score_diff_x4);
        out.write_u32(note.balloon_hit_count_old);
        out.write_f32(note.length);
        if note.is_renda() {
            out.pad(layout::note::RENDA_PADDING);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fumen::{FumenDifficulty, FumenNoteType, NoteData, read_fumen_bytes};

    fn measure_with_notes(notes: Vec<NoteData>) -> Measure {
        let mut measure = Measure::default();
        measure.data.bpm = 120.0;
        measure.branches[0].notes = notes;
        measure
    }

    #[test]
    fn test_empty_chart_is_header_only() {
        let chart = FumenChart {
            header: Header::for_difficulty(FumenDifficulty::Oni),
            measures: Vec::new(),
        };
        let bytes = write_fumen_bytes(&chart).unwrap();
        assert_eq!(bytes.len(), layout::header::SIZE);
    }

    #[test]
    fn test_measure_sizes() {
        let chart = FumenChart {
            header: Header::default(),
            measures: vec![measure_with_notes(vec![
                NoteData::new(FumenNoteType::Don, 0.0),
                NoteData::new(FumenNoteType::Renda, 500.0),
            ])],
        };
        let bytes = write_fumen_bytes(&chart).unwrap();

        let expected = layout::header::SIZE
            + layout::measure::SIZE
            + 3 * layout::branch::SIZE
            + 2 * layout::note::SIZE
            + layout::note::RENDA_PADDING;
        assert_eq!(bytes.len(), expected);
    }

    #[test]
    fn test_measure_count_comes_from_measures() {
        let mut chart = FumenChart {
            header: Header::default(),
            measures: vec![Measure::default(), Measure::default()],
        };
        chart.header.number_of_measures = 99;

        let bytes = write_fumen_bytes(&chart).unwrap();
        let at = layout::header::NUMBER_OF_MEASURES;
        assert_eq!(u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap()), 2);
    }

    #[test]
    fn test_short_judge_timings_are_padded() {
        let mut chart = FumenChart::default();
        chart.header.judge_timings.truncate(3);

        let bytes = write_fumen_bytes(&chart).unwrap();
        assert_eq!(bytes.len(), layout::header::SIZE);
        let parsed = read_fumen_bytes(&bytes).unwrap();
        assert_eq!(parsed.header.judge_timings.len(), 36);
    }

    #[test]
    fn test_too_many_notes_rejected() {
        let notes = vec![NoteData::new(FumenNoteType::Don, 0.0); u16::MAX as usize + 1];
        let chart = FumenChart {
            header: Header::default(),
            measures: vec![measure_with_notes(notes)],
        };
        let err = write_fumen_bytes(&chart).unwrap_err();
        assert!(matches!(err, Error::Conversion(msg) if msg.starts_with("measure 0")));
    }

    #[test]
    fn test_write_file_reports_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.fumen");

        let err = write_fumen_file(&path, &FumenChart::default()).unwrap_err();
        assert!(matches!(err, Error::FileWrite { path: p, .. } if p == path));
    }

    #[test]
    fn test_divergence_fields_normalized() {
        let mut measure = measure_with_notes(vec![NoteData::new(FumenNoteType::Don, 0.0)]);
        measure.data.diverge_requirements = [5; layout::measure::DIVERGE_REQUIREMENT_FIELDS];
        let mut header = Header::for_difficulty(FumenDifficulty::Oni);
        header.has_divergent_paths = 1;
        header.good_diverge_points = 7;
        header.bell_diverge_points = 99;
        let chart = FumenChart {
            header,
            measures: vec![measure],
        };

        let decoded = read_fumen_bytes(&write_fumen_bytes(&chart).unwrap()).unwrap();
        assert_eq!(
            decoded.measures[0].data.diverge_requirements,
            [constants::NO_DIVERGENCE; layout::measure::DIVERGE_REQUIREMENT_FIELDS]
        );
        assert!(!decoded.has_divergent_paths());
        assert_eq!(decoded.header.diverge_points(), Header::STOCK_DIVERGE_POINTS);
        assert_eq!(decoded.header.good_diverge_points, 20);
        assert_eq!(decoded.header.bell_diverge_points, 30);
        // Everything else survives
        assert_eq!(decoded.measures[0].data.bpm, 120.0);
        assert_eq!(decoded.header.clear_hp, chart.header.clear_hp);
        assert_eq!(decoded.measures[0].normal().notes, chart.measures[0].normal().notes);
    }
}
