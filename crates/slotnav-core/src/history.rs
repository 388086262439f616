//! Back/forward history of a navigable slot.
//!
//! Both lists are most-recent-first: `back[0]` is the location visited just
//! before the current one, `forward[0]` the one just after it. Bookmarks are
//! moved between the lists, never copied, so a location appears in at most
//! one place along the chain `..back[1], back[0], current, forward[0]..`.

use std::collections::VecDeque;

use serde::Serialize;
use slotnav_types::{Location, NavError, Result};

use crate::bookmark::Bookmark;
use crate::request::ChangeType;

/// Which history list to read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Back,
    Forward,
}

impl Direction {
    pub fn change_type(self) -> ChangeType {
        match self {
            Direction::Back => ChangeType::Back,
            Direction::Forward => ChangeType::Forward,
        }
    }
}

/// Back and forward bookmark lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct History {
    back: VecDeque<Bookmark>,
    forward: VecDeque<Bookmark>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn back(&self) -> &VecDeque<Bookmark> {
        &self.back
    }

    pub fn forward(&self) -> &VecDeque<Bookmark> {
        &self.forward
    }

    /// Check if back navigation is possible.
    pub fn can_go_back(&self) -> bool {
        !self.back.is_empty()
    }

    /// Check if forward navigation is possible.
    pub fn can_go_forward(&self) -> bool {
        !self.forward.is_empty()
    }

    fn list(&self, direction: Direction) -> &VecDeque<Bookmark> {
        match direction {
            Direction::Back => &self.back,
            Direction::Forward => &self.forward,
        }
    }

    /// Bookmark `distance` entries away in `direction`, clamping an
    /// out-of-range distance to the end of the list. Returns the effective
    /// distance with the bookmark, or `None` if the list is empty.
    pub fn get(&self, direction: Direction, distance: usize) -> Option<(usize, &Bookmark)> {
        let list = self.list(direction);
        let distance = distance.min(list.len().checked_sub(1)?);
        list.get(distance).map(|bm| (distance, bm))
    }

    /// Update the lists for a committed transition.
    ///
    /// `leaving` is the location being left and `last` its bookmark (with
    /// the scroll position refreshed). The lists are left untouched when an
    /// error is returned.
    pub fn record(
        &mut self,
        change: ChangeType,
        distance: usize,
        leaving: Option<&Location>,
        last: Option<Bookmark>,
        new_location: &Location,
    ) -> Result<()> {
        match change {
            ChangeType::Standard | ChangeType::Fallback => {
                self.go_elsewhere(leaving, last, new_location);
                Ok(())
            },
            ChangeType::Back => self.shift(Direction::Back, distance, leaving, last, new_location),
            ChangeType::Forward => {
                self.shift(Direction::Forward, distance, leaving, last, new_location)
            },
            ChangeType::Reload | ChangeType::Redirect => Ok(()),
        }
    }

    fn go_elsewhere(&mut self, leaving: Option<&Location>, last: Option<Bookmark>, new_location: &Location) {
        self.forward.clear();
        let Some(leaving) = leaving else {
            return;
        };
        // Returning to the same place adds nothing to the back list.
        if leaving == new_location {
            return;
        }
        match last {
            Some(bookmark) => {
                check_bookmark(&bookmark, leaving);
                self.back.push_front(bookmark);
            },
            None => log::warn!("no bookmark for {leaving}, back list not updated"),
        }
    }

    /// Move from `from` to the other list: the bookmark being left goes to
    /// the front of the other list, then `distance` entries follow it one at
    /// a time, and `from[distance]` becomes current.
    fn shift(
        &mut self,
        from: Direction,
        distance: usize,
        leaving: Option<&Location>,
        last: Option<Bookmark>,
        new_location: &Location,
    ) -> Result<()> {
        let (source, target) = match from {
            Direction::Back => (&mut self.back, &mut self.forward),
            Direction::Forward => (&mut self.forward, &mut self.back),
        };
        if source.len() <= distance {
            return Err(NavError::History(format!(
                "{from:?} list has {} entries, cannot move {distance}",
                source.len()
            )));
        }
        let (Some(leaving), Some(last)) = (leaving, last) else {
            return Err(NavError::History(
                "no current location to move into history".to_string(),
            ));
        };
        check_bookmark(&source[distance], new_location);
        check_bookmark(&last, leaving);

        target.push_front(last);
        for _ in 0..distance {
            if let Some(bookmark) = source.pop_front() {
                target.push_front(bookmark);
            }
        }
        // The entry at `distance` becomes the current location.
        source.pop_front();
        Ok(())
    }
}

fn check_bookmark(bookmark: &Bookmark, expected: &Location) {
    if bookmark.location() != expected {
        log::warn!(
            "bookmark location is {}, but expected {expected}",
            bookmark.location()
        );
    }
}
