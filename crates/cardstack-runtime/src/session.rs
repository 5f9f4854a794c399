#![forbid(unsafe_code)]

//! Swipe stack session: controller plus animator.

use std::time::Duration;

use cardstack_core::controller::{StackPhase, StackUpdate};
use cardstack_core::{
    GestureSample, Item, ItemId, MotionParams, PointerEvent, PoseTable, StackController,
};

use crate::animator::{Frame, StackAnimator};
use crate::config::{ConfigError, StackConfig};

/// Drives a swipe stack end to end.
///
/// Pointer events go to the [`StackController`]; its updates retarget the
/// [`StackAnimator`]. When a snap-back spring comes to rest the session
/// reports it back through [`StackController::settle`], which is what lets
/// the card be dragged again.
#[derive(Debug, Clone)]
pub struct StackSession {
    items: Vec<Item>,
    controller: StackController,
    animator: StackAnimator,
}

impl StackSession {
    pub fn new(items: Vec<Item>, params: MotionParams) -> cardstack_core::Result<Self> {
        let controller = StackController::primary(&items, params)?;
        let animator = StackAnimator::at_rest(&controller.poses());
        tracing::debug!(cards = items.len(), "stack session created");
        Ok(Self {
            items,
            controller,
            animator,
        })
    }

    /// Session for a primary-variant config. Range problems are logged.
    pub fn from_config(config: &StackConfig) -> Result<Self, ConfigError> {
        for issue in config.validate() {
            tracing::warn!(%issue, "config issue");
        }
        if config.variant != PoseTable::Primary {
            tracing::warn!(
                variant = ?config.variant,
                "swipe session built from non-primary config"
            );
        }
        Ok(Self::new(config.items.clone(), config.motion)?)
    }

    #[must_use]
    pub fn controller(&self) -> &StackController {
        &self.controller
    }

    #[must_use]
    pub fn animator(&self) -> &StackAnimator {
        &self.animator
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Item currently in slot 0.
    #[must_use]
    pub fn front_item(&self) -> Option<&Item> {
        self.item(self.controller.order().front())
    }

    #[must_use]
    pub fn params(&self) -> &MotionParams {
        self.controller.params()
    }

    /// Replace the motion parameters; a malformed set is rejected.
    pub fn set_params(&mut self, params: MotionParams) -> cardstack_core::Result<()> {
        self.controller.set_params(params)
    }

    /// Route a pointer event and animate its outcome.
    pub fn handle(&mut self, event: PointerEvent) -> StackUpdate {
        let update = self.controller.handle(event);
        self.animator.apply(&update);
        update
    }

    /// Replay a whole drag: press, one move per sample, release on the last.
    pub fn swipe(&mut self, samples: &[GestureSample]) -> StackUpdate {
        let mut update = self.handle(PointerEvent::Down { position: 0 });
        if update.is_ignored() {
            return update;
        }
        if let Some((last, moves)) = samples.split_last() {
            for sample in moves {
                self.handle(PointerEvent::Move(*sample));
            }
            update = self.handle(PointerEvent::Up(*last));
        } else {
            update = self.handle(PointerEvent::Cancel);
        }
        update
    }

    /// Advance the animation. Finishes a snap-back once its spring rests.
    pub fn tick(&mut self, dt: Duration) -> Frame {
        self.animator.tick(dt);
        if let StackPhase::Snapping { card } = self.controller.phase() {
            if self.animator.drag_settled(card) {
                let update = self.controller.settle();
                self.animator.apply(&update);
            }
        }
        self.animator.frame()
    }

    /// Tick until everything rests or `max_frames` frames have passed.
    /// Returns every frame produced.
    pub fn run_until_settled(&mut self, dt: Duration, max_frames: usize) -> Vec<Frame> {
        let mut frames = Vec::new();
        while frames.len() < max_frames && !self.is_settled() {
            frames.push(self.tick(dt));
        }
        if !self.is_settled() {
            tracing::warn!(max_frames, "animation still running after frame limit");
        }
        frames
    }

    /// Animation at rest and controller idle.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.animator.is_settled() && self.controller.phase().is_idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardstack_core::controller::UpdateKind;

    const FRAME: Duration = Duration::from_millis(16);

    fn session() -> StackSession {
        StackSession::new(Item::demo_set(), MotionParams::default()).unwrap()
    }

    #[test]
    fn malformed_params_keep_previous_set() {
        let mut s = session();
        let bad = MotionParams {
            swipe_confidence_threshold: f64::INFINITY,
            ..MotionParams::default()
        };
        assert!(s.set_params(bad).is_err());
        assert_eq!(s.params(), &MotionParams::default());
        assert!(s.swipe(&[GestureSample::new(200.0, 60.0)]).committed());
    }

    #[test]
    fn strong_swipe_brings_next_item_forward() {
        let mut s = session();
        let first = s.front_item().unwrap().id;
        let update = s.swipe(&[GestureSample::new(80.0, 30.0), GestureSample::new(200.0, 60.0)]);
        assert!(update.committed());
        assert_ne!(s.front_item().unwrap().id, first);

        let frames = s.run_until_settled(FRAME, 600);
        assert!(s.is_settled());
        let last = frames.last().unwrap();
        assert_eq!(last.top().unwrap().id, s.front_item().unwrap().id);
    }

    #[test]
    fn snap_back_settles_controller() {
        let mut s = session();
        let update = s.swipe(&[GestureSample::new(50.0, 10.0)]);
        assert_eq!(update.kind, UpdateKind::SnappingBack);
        assert!(matches!(s.controller().phase(), StackPhase::Snapping { .. }));

        // Debounced while the card is still travelling back.
        assert!(s.handle(PointerEvent::Down { position: 0 }).is_ignored());

        s.run_until_settled(FRAME, 600);
        assert!(s.controller().phase().is_idle());
        assert_eq!(
            s.handle(PointerEvent::Down { position: 0 }).kind,
            UpdateKind::DragStarted
        );
    }

    #[test]
    fn empty_swipe_cancels() {
        let mut s = session();
        let update = s.swipe(&[]);
        assert_eq!(update.kind, UpdateKind::SnappingBack);
        assert!(update.decision.is_none());
    }

    #[test]
    fn from_config_uses_items_and_motion() {
        let mut config = StackConfig::default();
        config.items.truncate(2);
        config.motion.swipe_confidence_threshold = 1_000.0;
        let mut s = StackSession::from_config(&config).unwrap();
        assert_eq!(s.items().len(), 2);
        assert!(s.swipe(&[GestureSample::new(50.0, 30.0)]).committed());
    }

    #[test]
    fn from_config_rejects_empty_items() {
        let config = StackConfig {
            items: Vec::new(),
            ..StackConfig::default()
        };
        assert!(matches!(
            StackSession::from_config(&config),
            Err(ConfigError::Stack(_))
        ));
    }

    #[test]
    #[tracing_test::traced_test]
    fn frame_limit_is_reported() {
        let mut s = session();
        s.swipe(&[GestureSample::new(300.0, 100.0)]);
        let frames = s.run_until_settled(FRAME, 2);
        assert_eq!(frames.len(), 2);
        assert!(logs_contain("animation still running after frame limit"));
    }
}
