//! Integration tests for the Fumen codec
//!
//! These tests go through the public read/write functions only.

use chartkit::chart::BranchType;
use chartkit::error::{Error, ParseContext};
use chartkit::fumen::{
    FumenChart, FumenDifficulty, FumenNoteType, Header, Measure, NoteData, layout,
    read_fumen_bytes, read_fumen_file, write_fumen_bytes, write_fumen_file,
};

fn sample_chart() -> FumenChart {
    let mut first = Measure::default();
    first.data.bpm = 150.0;
    first.data.offset = -1600.0;
    first.data.is_gogo_time = true;
    first.branches[0].notes = vec![
        NoteData::new(FumenNoteType::Don, 0.0),
        NoteData {
            length: 400.0,
            ..NoteData::new(FumenNoteType::Renda, 200.0)
        },
    ];
    first.branches[2].scroll_speed = 1.25;
    first.branches[2].notes = vec![NoteData {
        initial_score: 12,
        length: 800.0,
        ..NoteData::new(FumenNoteType::Balloon, 800.0)
    }];

    let mut second = Measure::default();
    second.data.bpm = 150.0;
    second.data.is_bar_line_visible = false;

    let mut header = Header::for_difficulty(FumenDifficulty::Hard);
    header.number_of_measures = 2;
    FumenChart {
        header,
        measures: vec![first, second],
    }
}

mod round_trip {
    use super::*;

    #[test]
    fn test_bytes_round_trip() {
        let chart = sample_chart();
        let bytes = write_fumen_bytes(&chart).unwrap();
        let decoded = read_fumen_bytes(&bytes).unwrap();

        assert_eq!(decoded.measures, chart.measures);
        assert_eq!(decoded.header.judge_timings, chart.header.judge_timings);
        assert_eq!(decoded.header.clear_hp, chart.header.clear_hp);
        assert_eq!(decoded.difficulty(), FumenDifficulty::Hard);
        // Writing the decoded chart again is stable
        assert_eq!(write_fumen_bytes(&decoded).unwrap(), bytes);
    }

    #[test]
    fn test_divergence_written_as_absent() {
        let mut chart = sample_chart();
        chart.header.has_divergent_paths = 1;
        chart.header.good_diverge_points = 7;
        chart.measures[1].data.diverge_requirements = [5; 6];

        let decoded = read_fumen_bytes(&write_fumen_bytes(&chart).unwrap()).unwrap();
        assert!(!decoded.has_divergent_paths());
        assert_eq!(decoded.header.good_diverge_points, 20);
        assert_eq!(decoded.measures[1].data.diverge_requirements, [0xFFFF_FFFF; 6]);
        assert_eq!(decoded.measures[1].data.bpm, 150.0);
        assert_eq!(decoded.note_count(), 3);
    }

    #[test]
    fn test_byte_size_matches_layout() {
        let bytes = write_fumen_bytes(&sample_chart()).unwrap();
        let expected = layout::header::SIZE
            + 2 * (layout::measure::SIZE + 3 * layout::branch::SIZE)
            + 3 * layout::note::SIZE
            + layout::note::RENDA_PADDING;
        assert_eq!(bytes.len(), expected);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song_h.bin");
        let chart = sample_chart();

        write_fumen_file(&path, &chart).unwrap();
        let decoded = read_fumen_file(&path).unwrap();

        assert_eq!(decoded, chart);
        assert_eq!(
            FumenDifficulty::from_file_name(path.file_name().unwrap().to_str().unwrap()),
            Some(FumenDifficulty::Hard)
        );
    }
}

mod malformed_input {
    use super::*;

    #[test]
    fn test_empty_input_rejected() {
        let err = read_fumen_bytes(&[]).unwrap_err();
        assert!(matches!(err, Error::Parse(ref e) if e.offset == 0));
    }

    #[test]
    fn test_short_header() {
        let err = read_fumen_bytes(&[0u8; 100]).unwrap_err();
        let Error::Parse(parse) = err else {
            panic!("expected a parse error");
        };
        assert_eq!(parse.context, vec![ParseContext::Header]);
    }

    #[test]
    fn test_truncated_renda_padding() {
        let mut chart = sample_chart();
        chart.measures.truncate(1);
        chart.measures[0].branches[2].notes.clear();
        chart.measures[0].branches[0].notes.remove(0);
        let bytes = write_fumen_bytes(&chart).unwrap();

        // Header, measure data, normal branch header, one renda record and
        // half of its padding
        let note_end = layout::header::SIZE + layout::measure::SIZE + layout::branch::SIZE + layout::note::SIZE;
        let err = read_fumen_bytes(&bytes[..note_end + 4]).unwrap_err();

        let Error::Parse(parse) = err else {
            panic!("expected a parse error");
        };
        assert_eq!(parse.offset, note_end);
        assert_eq!(
            parse.context,
            vec![
                ParseContext::Measure { index: 0 },
                ParseContext::Branch {
                    branch: BranchType::Normal
                },
                ParseContext::Note { index: 0, count: 1 },
            ]
        );
        assert!(parse.to_string().contains("measure 0: normal notes: note 1/1"));
    }

    #[test]
    fn test_missing_branch() {
        let mut chart = sample_chart();
        chart.measures.truncate(1);
        let bytes = write_fumen_bytes(&chart).unwrap();

        let err = read_fumen_bytes(&bytes[..bytes.len() - 4]).unwrap_err();
        let Error::Parse(parse) = err else {
            panic!("expected a parse error");
        };
        assert_eq!(parse.context[0], ParseContext::Measure { index: 0 });
        assert_eq!(
            parse.context[1],
            ParseContext::Branch {
                branch: BranchType::Master
            }
        );
    }

    #[test]
    fn test_unknown_note_type_survives() {
        let mut chart = sample_chart();
        chart.measures[0].branches[0].notes[0].note_type = 11;
        let bytes = write_fumen_bytes(&chart).unwrap();
        let decoded = read_fumen_bytes(&bytes).unwrap();

        assert_eq!(decoded.measures[0].branches[0].notes[0].note_type, 11);
        assert_eq!(decoded.measures[0].branches[0].notes[0].kind(), None);
    }
}
