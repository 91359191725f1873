//! Id-keyed edits on ordered collections.
//!
//! Collections keep server order; every helper here preserves the relative
//! order of untouched items and keeps ids unique.

use std::collections::HashSet;

use subtitler_core::export::SubtitleExport;
use subtitler_core::project::Project;
use subtitler_core::style::SubtitleStyle;
use subtitler_core::subtitle::SubtitleEntry;
use subtitler_core::types::DbId;

/// Anything stored in a store collection.
pub trait Identified {
    fn id(&self) -> DbId;
}

impl Identified for Project {
    fn id(&self) -> DbId {
        self.id
    }
}

impl Identified for SubtitleEntry {
    fn id(&self) -> DbId {
        self.id
    }
}

impl Identified for SubtitleStyle {
    fn id(&self) -> DbId {
        self.id
    }
}

impl Identified for SubtitleExport {
    fn id(&self) -> DbId {
        self.id
    }
}

pub fn position<T: Identified>(items: &[T], id: DbId) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}

/// Replace the item with id `id` in place. Returns its index, or `None`
/// (leaving `items` untouched) if it is absent.
pub fn replace_in_place<T: Identified>(items: &mut Vec<T>, id: DbId, item: T) -> Option<usize> {
    let mut index = position(items, id)?;
    let new_id = item.id();
    items[index] = item;
    if new_id != id {
        let duplicate = items
            .iter()
            .enumerate()
            .find(|(i, other)| *i != index && other.id() == new_id)
            .map(|(i, _)| i);
        if let Some(dup) = duplicate {
            items.remove(dup);
            if dup < index {
                index -= 1;
            }
        }
    }
    Some(index)
}

pub fn remove_by_id<T: Identified>(items: &mut Vec<T>, id: DbId) -> Option<T> {
    position(items, id).map(|index| items.remove(index))
}

/// Insert `item` directly after `index`, removing any existing copy of its
/// id first. Returns the index `item` ended up at.
pub fn insert_after<T: Identified>(items: &mut Vec<T>, index: usize, item: T) -> usize {
    let mut at = index + 1;
    if let Some(dup) = position(items, item.id()) {
        items.remove(dup);
        if dup < at {
            at -= 1;
        }
    }
    let at = at.min(items.len());
    items.insert(at, item);
    at
}

/// Insert `item` at index 0, removing any existing copy of its id first.
pub fn insert_front<T: Identified>(items: &mut Vec<T>, item: T) {
    remove_by_id(items, item.id());
    items.insert(0, item);
}

/// Keep the first occurrence of every id. Returns the deduplicated list and
/// how many items were dropped.
pub fn dedup_by_id<T: Identified>(items: Vec<T>) -> (Vec<T>, usize) {
    let before = items.len();
    let mut seen = HashSet::with_capacity(before);
    let kept: Vec<T> = items.into_iter().filter(|item| seen.insert(item.id())).collect();
    let dropped = before - kept.len();
    (kept, dropped)
}
