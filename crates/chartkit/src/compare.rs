//! Field-by-field comparison of two chart projects.
//!
//! Every event list of a course is addressed through [`GenericList`] and
//! every field through [`GenericMember`], so one accessor
//! ([`try_get_member`]) serves all (list, field) pairs. Differences are
//! reported as text through a [`DiffSink`]; nothing here fails.

use strum::{EnumCount, EnumIter, IntoEnumIterator, IntoStaticStr};

use crate::chart::{
    BarLineChange, BranchType, ChartCourse, ChartProject, GoGoRange, JposScrollChange,
    LyricChange, Note, NoteType, ScrollChange, ScrollMethod, ScrollType,
};
use crate::config::epsilon;
use crate::timing::{
    Beat, Complex, Tempo, TempoChange, Time, TimeSignature, TimeSignatureChange, approx_eq_f32,
};

/// Event lists of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount, IntoStaticStr)]
pub enum GenericList {
    TempoChanges,
    SignatureChanges,
    #[strum(serialize = "Notes_Normal")]
    NotesNormal,
    #[strum(serialize = "Notes_Expert")]
    NotesExpert,
    #[strum(serialize = "Notes_Master")]
    NotesMaster,
    ScrollChanges,
    BarLineChanges,
    GoGoRanges,
    Lyrics,
    ScrollTypes,
    JposScrollChanges,
}

impl GenericList {
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Fields an event may carry. Each list supports a subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount, IntoStaticStr)]
pub enum GenericMember {
    #[strum(serialize = "IsVisible")]
    BarLineVisible,
    BalloonPopCount,
    ScrollSpeed,
    BeatStart,
    BeatDuration,
    TimeOffset,
    NoteType,
    Tempo,
    TimeSignature,
    Lyric,
    ScrollType,
    JposMove,
    JposDuration,
}

impl GenericMember {
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Value of one field, borrowed from the event it was read from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MemberValue<'a> {
    Bool(bool),
    I16(i16),
    F32(f32),
    Complex(Complex),
    Beat(Beat),
    Time(Time),
    NoteType(NoteType),
    Tempo(Tempo),
    TimeSignature(TimeSignature),
    Str(&'a str),
    ScrollMethod(ScrollMethod),
}

impl MemberValue<'_> {
    /// Floating point values match within tolerance, everything else exactly.
    pub fn approx_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::F32(a), Self::F32(b)) => approx_eq_f32(*a, *b, epsilon::F32),
            (Self::Complex(a), Self::Complex(b)) => a.approx_eq(*b),
            (Self::Time(a), Self::Time(b)) => a.approx_eq(*b),
            (Self::Tempo(a), Self::Tempo(b)) => a.approx_eq(*b),
            _ => self == other,
        }
    }
}

/// Receiver of comparison messages.
pub trait DiffSink {
    fn report(&mut self, message: &str);
}

impl<F: FnMut(&str)> DiffSink for F {
    fn report(&mut self, message: &str) {
        self(message)
    }
}

trait GenericItem {
    fn member(&self, member: GenericMember) -> Option<MemberValue<'_>>;
}

impl GenericItem for TempoChange {
    fn member(&self, member: GenericMember) -> Option<MemberValue<'_>> {
        match member {
            GenericMember::BeatStart => Some(MemberValue::Beat(self.beat)),
            GenericMember::Tempo => Some(MemberValue::Tempo(self.tempo)),
            _ => None,
        }
    }
}

impl GenericItem for TimeSignatureChange {
    fn member(&self, member: GenericMember) -> Option<MemberValue<'_>> {
        match member {
            GenericMember::BeatStart => Some(MemberValue::Beat(self.beat)),
            GenericMember::TimeSignature => Some(MemberValue::TimeSignature(self.signature)),
            _ => None,
        }
    }
}

impl GenericItem for Note {
    fn member(&self, member: GenericMember) -> Option<MemberValue<'_>> {
        match member {
            GenericMember::BeatStart => Some(MemberValue::Beat(self.beat)),
            GenericMember::BeatDuration => Some(MemberValue::Beat(self.beat_duration)),
            GenericMember::TimeOffset => Some(MemberValue::Time(self.time_offset)),
            GenericMember::NoteType => Some(MemberValue::NoteType(self.note_type)),
            GenericMember::BalloonPopCount => Some(MemberValue::I16(self.balloon_pop_count)),
            _ => None,
        }
    }
}

impl GenericItem for ScrollChange {
    fn member(&self, member: GenericMember) -> Option<MemberValue<'_>> {
        match member {
            GenericMember::BeatStart => Some(MemberValue::Beat(self.beat)),
            GenericMember::ScrollSpeed => Some(MemberValue::Complex(self.scroll_speed)),
            _ => None,
        }
    }
}

impl GenericItem for BarLineChange {
    fn member(&self, member: GenericMember) -> Option<MemberValue<'_>> {
        match member {
            GenericMember::BeatStart => Some(MemberValue::Beat(self.beat)),
            GenericMember::BarLineVisible => Some(MemberValue::Bool(self.visible)),
            _ => None,
        }
    }
}

impl GenericItem for GoGoRange {
    fn member(&self, member: GenericMember) -> Option<MemberValue<'_>> {
        match member {
            GenericMember::BeatStart => Some(MemberValue::Beat(self.beat)),
            GenericMember::BeatDuration => Some(MemberValue::Beat(self.beat_duration)),
            _ => None,
        }
    }
}

impl GenericItem for LyricChange {
    fn member(&self, member: GenericMember) -> Option<MemberValue<'_>> {
        match member {
            GenericMember::BeatStart => Some(MemberValue::Beat(self.beat)),
            GenericMember::Lyric => Some(MemberValue::Str(&self.lyric)),
            _ => None,
        }
    }
}

impl GenericItem for ScrollType {
    fn member(&self, member: GenericMember) -> Option<MemberValue<'_>> {
        match member {
            GenericMember::BeatStart => Some(MemberValue::Beat(self.beat)),
            GenericMember::ScrollType => Some(MemberValue::ScrollMethod(self.method)),
            _ => None,
        }
    }
}

impl GenericItem for JposScrollChange {
    fn member(&self, member: GenericMember) -> Option<MemberValue<'_>> {
        match member {
            GenericMember::BeatStart => Some(MemberValue::Beat(self.beat)),
            GenericMember::JposMove => Some(MemberValue::Complex(self.movement)),
            GenericMember::JposDuration => Some(MemberValue::F32(self.duration_sec)),
            _ => None,
        }
    }
}

fn as_item<T: GenericItem>(item: &T) -> &dyn GenericItem {
    item
}

fn generic_item(course: &ChartCourse, list: GenericList, index: usize) -> Option<&dyn GenericItem> {
    match list {
        GenericList::TempoChanges => course.tempo_map.tempo().get(index).map(as_item),
        GenericList::SignatureChanges => course.tempo_map.signature().get(index).map(as_item),
        GenericList::NotesNormal => course.notes(BranchType::Normal).get(index).map(as_item),
        GenericList::NotesExpert => course.notes(BranchType::Expert).get(index).map(as_item),
        GenericList::NotesMaster => course.notes(BranchType::Master).get(index).map(as_item),
        GenericList::ScrollChanges => course.scroll_changes.get(index).map(as_item),
        GenericList::BarLineChanges => course.bar_line_changes.get(index).map(as_item),
        GenericList::GoGoRanges => course.gogo_ranges.get(index).map(as_item),
        GenericList::Lyrics => course.lyrics.get(index).map(as_item),
        GenericList::ScrollTypes => course.scroll_types.get(index).map(as_item),
        GenericList::JposScrollChanges => course.jpos_scroll_changes.get(index).map(as_item),
    }
}

pub fn generic_list_len(course: &ChartCourse, list: GenericList) -> usize {
    match list {
        GenericList::TempoChanges => course.tempo_map.tempo().len(),
        GenericList::SignatureChanges => course.tempo_map.signature().len(),
        GenericList::NotesNormal => course.notes_normal.len(),
        GenericList::NotesExpert => course.notes_expert.len(),
        GenericList::NotesMaster => course.notes_master.len(),
        GenericList::ScrollChanges => course.scroll_changes.len(),
        GenericList::BarLineChanges => course.bar_line_changes.len(),
        GenericList::GoGoRanges => course.gogo_ranges.len(),
        GenericList::Lyrics => course.lyrics.len(),
        GenericList::ScrollTypes => course.scroll_types.len(),
        GenericList::JposScrollChanges => course.jpos_scroll_changes.len(),
    }
}

/// Read `member` of item `index` in `list`.
///
/// `None` when the index is out of range or the list's events have no such
/// field.
pub fn try_get_member(
    course: &ChartCourse,
    list: GenericList,
    index: usize,
    member: GenericMember,
) -> Option<MemberValue<'_>> {
    generic_item(course, list, index)?.member(member)
}

/// Report every difference between `a` and `b` to `sink`.
///
/// A course count mismatch stops the comparison. A list length mismatch
/// skips the items of that list.
pub fn compare_charts(a: &ChartProject, b: &ChartProject, mut sink: impl DiffSink) {
    if a.courses.len() != b.courses.len() {
        sink.report(&format!(
            "Course count mismatch ({} != {})",
            a.courses.len(),
            b.courses.len()
        ));
        return;
    }

    for (course_a, course_b) in a.courses.iter().zip(&b.courses) {
        for list in GenericList::iter() {
            let len_a = generic_list_len(course_a, list);
            let len_b = generic_list_len(course_b, list);
            if len_a != len_b {
                sink.report(&format!("{} count mismatch ({} != {})", list.name(), len_a, len_b));
                continue;
            }

            for index in 0..len_a {
                for member in GenericMember::iter() {
                    let value_a = try_get_member(course_a, list, index, member);
                    let value_b = try_get_member(course_b, list, index, member);
                    let (Some(value_a), Some(value_b)) = (value_a, value_b) else {
                        continue;
                    };
                    if !value_a.approx_eq(&value_b) {
                        sink.report(&format!(
                            "{}[{}].{} value mismatch",
                            list.name(),
                            index,
                            member.name()
                        ));
                    }
                }
            }
        }
    }
}

/// [`compare_charts`] with the messages gathered into a list.
pub fn collect_differences(a: &ChartProject, b: &ChartProject) -> Vec<String> {
    let mut messages = Vec::new();
    compare_charts(a, b, |message: &str| messages.push(message.to_string()));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::TempoMap;

    fn course_with_notes(ticks: &[i32]) -> ChartCourse {
        let mut course = ChartCourse {
            tempo_map: TempoMap::with_initial(Tempo::new(120.0), TimeSignature::COMMON),
            ..Default::default()
        };
        for &t in ticks {
            course
                .notes_normal
                .insert_or_update(Note::new(Beat::from_ticks(t), NoteType::Don));
        }
        course
    }

    fn project(courses: Vec<ChartCourse>) -> ChartProject {
        ChartProject {
            courses,
            ..Default::default()
        }
    }

    #[test]
    fn test_identical_projects() {
        let a = project(vec![course_with_notes(&[0, 48, 96])]);
        assert!(collect_differences(&a, &a.clone()).is_empty());
    }

    #[test]
    fn test_course_count_mismatch_stops() {
        let a = project(vec![course_with_notes(&[0])]);
        let b = project(vec![course_with_notes(&[0]), course_with_notes(&[48])]);
        assert_eq!(collect_differences(&a, &b), vec!["Course count mismatch (1 != 2)"]);
    }

    #[test]
    fn test_list_count_mismatch() {
        let a = project(vec![course_with_notes(&[0, 48])]);
        let b = project(vec![course_with_notes(&[0])]);
        assert_eq!(collect_differences(&a, &b), vec!["Notes_Normal count mismatch (2 != 1)"]);
    }

    #[test]
    fn test_member_mismatch() {
        let a = project(vec![course_with_notes(&[0, 48])]);
        let mut b = a.clone();
        b.courses[0].notes_normal.iter_mut().nth(1).unwrap().note_type = NoteType::Ka;
        b.courses[0].tempo_map.set_tempo(vec![TempoChange::new(Beat::ZERO, Tempo::new(121.0))].into());

        assert_eq!(
            collect_differences(&a, &b),
            vec!["TempoChanges[0].Tempo value mismatch", "Notes_Normal[1].NoteType value mismatch"]
        );
    }

    #[test]
    fn test_float_members_use_tolerance() {
        let a = project(vec![course_with_notes(&[0])]);
        let mut b = a.clone();
        b.courses[0].notes_normal.iter_mut().next().unwrap().time_offset = Time::from_sec(1e-9);
        assert!(collect_differences(&a, &b).is_empty());
    }

    #[test]
    fn test_member_support_per_list() {
        let mut course = course_with_notes(&[0]);
        course.lyrics.insert_or_update(LyricChange {
            beat: Beat::ZERO,
            lyric: "la".to_string(),
        });

        assert_eq!(
            try_get_member(&course, GenericList::Lyrics, 0, GenericMember::Lyric),
            Some(MemberValue::Str("la"))
        );
        assert_eq!(try_get_member(&course, GenericList::Lyrics, 0, GenericMember::Tempo), None);
        assert_eq!(try_get_member(&course, GenericList::Lyrics, 1, GenericMember::Lyric), None);
        assert_eq!(generic_list_len(&course, GenericList::NotesNormal), 1);
        assert_eq!(GenericList::NotesMaster.name(), "Notes_Master");
        assert_eq!(GenericMember::BarLineVisible.name(), "IsVisible");
    }
}
