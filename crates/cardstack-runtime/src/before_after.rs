#![forbid(unsafe_code)]

//! Before/after photo stack.
//!
//! Two cards per photo, the "before" shot in front and the "after" shot
//! behind. Tapping the front card swaps them. Selecting another photo
//! replaces both cards: the old pair exits and the new pair enters with
//! the binding reset to before-in-front.

use std::fmt;
use std::time::Duration;

use cardstack_core::controller::StackUpdate;
use cardstack_core::{ItemId, MotionParams, Result, StackController, StackError};
use serde::{Deserialize, Serialize};

use crate::animator::{Frame, StackAnimator};

/// A project photo pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeforeAfterPhoto {
    pub id: u32,
    pub project_title: String,
    /// Image reference of the "before" shot.
    pub before: String,
    /// Image reference of the "after" shot.
    pub after: String,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub comments: u32,
}

impl BeforeAfterPhoto {
    /// Sample photos used when no configuration is given.
    #[must_use]
    pub fn demo_set() -> Vec<Self> {
        [
            (1, "Kitchen renovation", 24, 5),
            (2, "Garden terrace", 41, 12),
            (3, "Attic conversion", 9, 2),
        ]
        .into_iter()
        .map(|(id, title, likes, comments)| Self {
            id,
            project_title: title.to_string(),
            before: format!("/photos/{id}/before.jpg"),
            after: format!("/photos/{id}/after.jpg"),
            likes,
            comments,
        })
        .collect()
    }
}

/// Which shot of the pair is in front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Before,
    After,
}

impl Side {
    /// Caption shown above the stack.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Before => "Przed",
            Self::After => "Po",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Card ids for the photo at `index`. Distinct per photo so a photo change
/// swaps the card set instead of moving the old cards.
fn card_ids(index: usize) -> (ItemId, ItemId) {
    let base = u32::try_from(index).unwrap_or(u32::MAX / 2).saturating_mul(2);
    (ItemId(base), ItemId(base.saturating_add(1)))
}

/// Session over a list of before/after photos.
#[derive(Debug, Clone)]
pub struct BeforeAfterSession {
    photos: Vec<BeforeAfterPhoto>,
    index: usize,
    params: MotionParams,
    controller: StackController,
    animator: StackAnimator,
}

impl BeforeAfterSession {
    /// Session showing the first photo.
    pub fn new(photos: Vec<BeforeAfterPhoto>, params: MotionParams) -> Result<Self> {
        if photos.is_empty() {
            return Err(StackError::InvalidConfiguration {
                reason: "before/after stack needs at least one photo".into(),
            });
        }
        let (before, after) = card_ids(0);
        let controller = StackController::before_after(before, after, params)?;
        let animator = StackAnimator::at_rest(&controller.poses());
        Ok(Self {
            photos,
            index: 0,
            params,
            controller,
            animator,
        })
    }

    #[must_use]
    pub fn photos(&self) -> &[BeforeAfterPhoto] {
        &self.photos
    }

    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn current(&self) -> &BeforeAfterPhoto {
        &self.photos[self.index]
    }

    #[must_use]
    pub fn controller(&self) -> &StackController {
        &self.controller
    }

    #[must_use]
    pub fn animator(&self) -> &StackAnimator {
        &self.animator
    }

    /// Which shot is in front.
    #[must_use]
    pub fn active_side(&self) -> Side {
        let (before, _) = card_ids(self.index);
        if self.controller.order().front() == before {
            Side::Before
        } else {
            Side::After
        }
    }

    /// Image reference for a card id of the current photo.
    #[must_use]
    pub fn image_for(&self, id: ItemId) -> Option<&str> {
        let (before, after) = card_ids(self.index);
        let photo = self.current();
        if id == before {
            Some(&photo.before)
        } else if id == after {
            Some(&photo.after)
        } else {
            None
        }
    }

    /// Tap on the card in slot `position`.
    pub fn tap(&mut self, position: usize) -> StackUpdate {
        let update = self.controller.tap(position);
        self.animator.apply(&update);
        if update.committed() {
            tracing::debug!(side = %self.active_side(), photo = self.current().id, "side swapped");
        }
        update
    }

    /// Show the photo at `index`, resetting to before-in-front.
    pub fn set_index(&mut self, index: usize) -> Result<()> {
        if index >= self.photos.len() {
            return Err(StackError::InvalidPosition {
                position: index as f64,
                len: self.photos.len(),
            });
        }
        if index == self.index {
            let update = self.controller.reset();
            self.animator.apply(&update);
            return Ok(());
        }
        let (before, after) = card_ids(index);
        self.controller = StackController::before_after(before, after, self.params)?;
        self.animator.replace(&self.controller.poses());
        self.index = index;
        tracing::info!(index, photo = self.current().id, "photo selected");
        Ok(())
    }

    /// Next photo, wrapping around.
    pub fn next(&mut self) -> Result<()> {
        self.set_index((self.index + 1) % self.photos.len())
    }

    /// Previous photo, wrapping around.
    pub fn previous(&mut self) -> Result<()> {
        let len = self.photos.len();
        self.set_index((self.index + len - 1) % len)
    }

    /// Replace the motion parameters for subsequent updates.
    ///
    /// Validated once here, so a rejected set never reaches a later photo
    /// change.
    pub fn set_params(&mut self, params: MotionParams) -> Result<()> {
        self.controller.set_params(params)?;
        self.params = *self.controller.params();
        Ok(())
    }

    pub fn tick(&mut self, dt: Duration) -> Frame {
        self.animator.tick(dt);
        self.animator.frame()
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.animator.is_settled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardstack_core::MotionKnob;

    fn session() -> BeforeAfterSession {
        BeforeAfterSession::new(BeforeAfterPhoto::demo_set(), MotionParams::default()).unwrap()
    }

    #[test]
    fn starts_with_before_in_front() {
        let s = session();
        assert_eq!(s.active_side(), Side::Before);
        assert_eq!(s.active_side().label(), "Przed");
        let front = s.controller().order().front();
        assert_eq!(s.image_for(front), Some("/photos/1/before.jpg"));
    }

    #[test]
    fn tap_swaps_sides() {
        let mut s = session();
        assert!(s.tap(0).committed());
        assert_eq!(s.active_side(), Side::After);
        assert_eq!(s.active_side().to_string(), "Po");
        assert!(s.tap(0).committed());
        assert_eq!(s.active_side(), Side::Before);
    }

    #[test]
    fn tap_on_back_card_is_ignored() {
        let mut s = session();
        assert!(s.tap(1).is_ignored());
        assert_eq!(s.active_side(), Side::Before);
    }

    #[test]
    fn selecting_a_photo_resets_to_before() {
        let mut s = session();
        s.tap(0);
        s.set_index(2).unwrap();
        assert_eq!(s.index(), 2);
        assert_eq!(s.active_side(), Side::Before);
        assert_eq!(s.current().project_title, "Attic conversion");
        // Old pair leaving, new pair entering.
        assert_eq!(s.animator().len(), 4);
        assert!(s.animator().card(ItemId(0)).unwrap().is_leaving());
    }

    #[test]
    fn reselecting_current_photo_resets_binding() {
        let mut s = session();
        s.tap(0);
        s.set_index(0).unwrap();
        assert_eq!(s.active_side(), Side::Before);
    }

    #[test]
    fn navigation_wraps() {
        let mut s = session();
        s.previous().unwrap();
        assert_eq!(s.index(), 2);
        s.next().unwrap();
        assert_eq!(s.index(), 0);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut s = session();
        let err = s.set_index(3).unwrap_err();
        assert_eq!(
            err,
            StackError::InvalidPosition {
                position: 3.0,
                len: 3
            }
        );
        assert_eq!(s.index(), 0);
    }

    #[test]
    fn malformed_params_leave_navigation_working() {
        let mut s = session();
        let nan = MotionParams::default().with(MotionKnob::SpringDuration, f64::NAN);
        assert!(matches!(
            s.set_params(nan),
            Err(StackError::InvalidConfiguration { .. })
        ));
        assert!(s.tap(0).committed());
        s.set_index(1).unwrap();
        assert_eq!(s.index(), 1);
        assert_eq!(s.controller().params(), &MotionParams::default());
    }

    #[test]
    fn accepted_params_carry_over_to_next_photo() {
        let mut s = session();
        let slow = MotionParams::default().with(MotionKnob::SpringDuration, 0.9);
        s.set_params(slow).unwrap();
        s.next().unwrap();
        assert_eq!(s.controller().params().spring_duration, 0.9);
    }

    #[test]
    fn empty_photo_list_is_rejected() {
        assert!(BeforeAfterSession::new(Vec::new(), MotionParams::default()).is_err());
    }
}
