//! Note type tables and list helpers shared by the converters.

use std::borrow::Cow;

use crate::chart::NoteType;
use crate::fumen::FumenNoteType;
use crate::timing::{HasBeat, SortedList, TempoMap};
use crate::tja::TjaNoteType;

/// Several Fumen codes collapse onto one chart type. `None` has no chart
/// counterpart.
pub fn note_type_from_fumen(value: FumenNoteType) -> Option<NoteType> {
    let note_type = match value {
        FumenNoteType::None => return None,
        FumenNoteType::Don | FumenNoteType::Do => NoteType::Don,
        FumenNoteType::BigDon => NoteType::DonBig,
        FumenNoteType::Ka | FumenNoteType::Ko | FumenNoteType::Katsu => NoteType::Ka,
        FumenNoteType::BigKatsu => NoteType::KaBig,
        FumenNoteType::Renda => NoteType::Drumroll,
        FumenNoteType::BigRenda => NoteType::DrumrollBig,
        FumenNoteType::Balloon => NoteType::Balloon,
        FumenNoteType::Bell => NoteType::BalloonSpecial,
    };
    Some(note_type)
}

/// Chart types the format cannot store map to `FumenNoteType::None`.
pub fn note_type_to_fumen(value: NoteType) -> FumenNoteType {
    match value {
        NoteType::Don => FumenNoteType::Don,
        NoteType::DonBig => FumenNoteType::BigDon,
        NoteType::Ka => FumenNoteType::Ka,
        NoteType::KaBig => FumenNoteType::BigKatsu,
        NoteType::Drumroll => FumenNoteType::Renda,
        NoteType::DrumrollBig => FumenNoteType::BigRenda,
        NoteType::Balloon => FumenNoteType::Balloon,
        NoteType::BalloonSpecial => FumenNoteType::Bell,
        _ => FumenNoteType::None,
    }
}

/// `None` and roll ends have no chart counterpart.
pub fn note_type_from_tja(value: TjaNoteType) -> Option<NoteType> {
    let note_type = match value {
        TjaNoteType::None | TjaNoteType::EndBalloonOrDrumroll => return None,
        TjaNoteType::Don => NoteType::Don,
        TjaNoteType::Ka => NoteType::Ka,
        TjaNoteType::DonBig => NoteType::DonBig,
        TjaNoteType::KaBig => NoteType::KaBig,
        TjaNoteType::StartDrumroll => NoteType::Drumroll,
        TjaNoteType::StartDrumrollBig => NoteType::DrumrollBig,
        TjaNoteType::StartBalloon => NoteType::Balloon,
        TjaNoteType::StartBalloonSpecial => NoteType::BalloonSpecial,
        TjaNoteType::DonBigBoth => NoteType::DonBigHand,
        TjaNoteType::KaBigBoth => NoteType::KaBigHand,
        TjaNoteType::Hidden => NoteType::Adlib,
        TjaNoteType::Bomb => NoteType::Bomb,
        TjaNoteType::KaDon => NoteType::KaDon,
        TjaNoteType::Fuse => NoteType::Fuse,
    };
    Some(note_type)
}

pub fn note_type_to_tja(value: NoteType) -> TjaNoteType {
    match value {
        NoteType::Don => TjaNoteType::Don,
        NoteType::DonBig => TjaNoteType::DonBig,
        NoteType::Ka => TjaNoteType::Ka,
        NoteType::KaBig => TjaNoteType::KaBig,
        NoteType::Drumroll => TjaNoteType::StartDrumroll,
        NoteType::DrumrollBig => TjaNoteType::StartDrumrollBig,
        NoteType::Balloon => TjaNoteType::StartBalloon,
        NoteType::BalloonSpecial => TjaNoteType::StartBalloonSpecial,
        NoteType::DonBigHand => TjaNoteType::DonBigBoth,
        NoteType::KaBigHand => TjaNoteType::KaBigBoth,
        NoteType::KaDon => TjaNoteType::KaDon,
        NoteType::Adlib => TjaNoteType::Hidden,
        NoteType::Fuse => TjaNoteType::Fuse,
        NoteType::Bomb => TjaNoteType::Bomb,
    }
}

/// Keep only the entries whose value differs from the one before.
///
/// `seed` is always the first entry of the result.
pub(crate) fn collapse_repeats<T, F>(items: &SortedList<T>, seed: T, same: F) -> SortedList<T>
where
    T: HasBeat + Clone,
    F: Fn(&T, &T) -> bool,
{
    let mut kept = vec![seed];
    for item in items {
        if kept.last().is_some_and(|last| !same(last, item)) {
            kept.push(item.clone());
        }
    }
    kept.into()
}

/// The map itself when ready for queries, otherwise a rebuilt copy.
pub(crate) fn queryable(map: &TempoMap) -> Cow<'_, TempoMap> {
    if map.is_stale() {
        let mut fresh = map.clone();
        fresh.rebuild_acceleration_structure();
        Cow::Owned(fresh)
    } else {
        Cow::Borrowed(map)
    }
}
