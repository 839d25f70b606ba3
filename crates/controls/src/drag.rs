use foundation::math::{Rotation, Vec2};
use runtime::{Clock, FRAME_INTERVAL_S, Throttle};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::projection::Projection;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Degrees of rotation per pixel of pointer travel.
    pub sensitivity: f64,
    /// Minimum spacing between render callbacks (seconds).
    pub throttle_interval_s: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            sensitivity: 0.25,
            throttle_interval_s: FRAME_INTERVAL_S,
        }
    }
}

/// Reference point of an active drag. Fixed for the whole drag.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DragSession {
    /// Pointer position at drag start (pixels).
    pub v0: Vec2,
    /// Projection rotation at drag start.
    pub r0: Rotation,
}

/// Turns pointer drags into projection rotations.
///
/// Rotation is always computed from the drag's starting point, so dropped or
/// coalesced move events never accumulate error. Rendering goes through a
/// [`Throttle`]; the end of a drag always renders.
pub struct DragHandler<C: Clock, F: FnMut()> {
    sensitivity: f64,
    session: Option<DragSession>,
    render: Throttle<C, F>,
}

impl<C: Clock, F: FnMut()> DragHandler<C, F> {
    pub fn new(clock: C, config: DragConfig, render: F) -> Self {
        Self {
            sensitivity: config.sensitivity,
            session: None,
            render: Throttle::new(clock, config.throttle_interval_s, render),
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn render_count(&self) -> u64 {
        self.render.invocations()
    }

    /// Begin a drag. A drag already in progress is replaced.
    pub fn drag_started<P: Projection + ?Sized>(&mut self, projection: &P, pointer: Vec2) {
        let session = DragSession {
            v0: pointer,
            r0: projection.rotation(),
        };
        trace!(x = pointer.x, y = pointer.y, "drag started");
        self.session = Some(session);
    }

    /// Apply a pointer move. Returns the new rotation, or `None` when idle.
    pub fn dragged<P: Projection + ?Sized>(
        &mut self,
        projection: &mut P,
        pointer: Vec2,
    ) -> Option<Rotation> {
        let DragSession { v0, r0 } = self.session?;
        let delta = (pointer - v0).scale(self.sensitivity);
        let rotation = Rotation::new(r0.yaw + delta.x, r0.pitch - delta.y, r0.roll);

        projection.set_rotation(rotation);
        self.render.schedule();
        Some(rotation)
    }

    /// End the drag and render the final state.
    pub fn drag_ended(&mut self) {
        if self.session.take().is_some() {
            trace!("drag ended");
            self.render.force();
        }
    }

    /// Let the host's frame loop deliver a coalesced render.
    pub fn poll(&mut self) -> bool {
        self.render.poll()
    }

    /// Tear down: drop the session and any pending render.
    pub fn destroy(&mut self) {
        self.session = None;
        self.render.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use foundation::math::{Rotation, Vec2};
    use pretty_assertions::assert_eq;
    use runtime::ManualClock;

    use super::{DragConfig, DragHandler};
    use crate::projection::{Projection, ViewState};

    fn handler(clock: &ManualClock) -> (Rc<Cell<u32>>, DragHandler<ManualClock, impl FnMut()>) {
        let renders = Rc::new(Cell::new(0));
        let r = renders.clone();
        let h = DragHandler::new(clock.clone(), DragConfig::default(), move || {
            r.set(r.get() + 1)
        });
        (renders, h)
    }

    #[test]
    fn drag_moves_rotation_relative_to_start() {
        let clock = ManualClock::new();
        let (_renders, mut h) = handler(&clock);
        let mut view = ViewState::default();

        h.drag_started(&view, Vec2::new(100.0, 100.0));
        let r = h.dragged(&mut view, Vec2::new(120.0, 90.0));
        assert_eq!(r, Some(Rotation::new(5.0, 2.5, 0.0)));
        assert_eq!(view.rotation(), Rotation::new(5.0, 2.5, 0.0));

        // Still measured from the start point, not the previous move.
        clock.advance(0.05);
        h.dragged(&mut view, Vec2::new(80.0, 100.0));
        assert_eq!(view.rotation(), Rotation::new(-5.0, 0.0, 0.0));
    }

    #[test]
    fn moves_while_idle_are_ignored() {
        let clock = ManualClock::new();
        let (renders, mut h) = handler(&clock);
        let mut view = ViewState::default();
        view.set_rotation(Rotation::new(10.0, 20.0, 30.0));

        assert_eq!(h.dragged(&mut view, Vec2::new(50.0, 50.0)), None);
        assert_eq!(view.rotation(), Rotation::new(10.0, 20.0, 30.0));
        assert_eq!(renders.get(), 0);
    }

    #[test]
    fn rapid_moves_are_throttled_and_end_flushes() {
        let clock = ManualClock::new();
        let (renders, mut h) = handler(&clock);
        let mut view = ViewState::default();

        h.drag_started(&view, Vec2::new(0.0, 0.0));
        for i in 1..=10 {
            clock.advance(0.001);
            h.dragged(&mut view, Vec2::new(i as f64, 0.0));
        }
        // Leading edge only; the rest are pending.
        assert_eq!(renders.get(), 1);

        h.drag_ended();
        assert_eq!(renders.get(), 2);
        assert!(!h.is_dragging());
        assert_eq!(view.rotation(), Rotation::new(2.5, 0.0, 0.0));

        // A second end is a no-op.
        h.drag_ended();
        assert_eq!(renders.get(), 2);
    }

    #[test]
    fn poll_delivers_coalesced_frame() {
        let clock = ManualClock::new();
        let (renders, mut h) = handler(&clock);
        let mut view = ViewState::default();

        h.drag_started(&view, Vec2::new(0.0, 0.0));
        h.dragged(&mut view, Vec2::new(4.0, 0.0));
        h.dragged(&mut view, Vec2::new(8.0, 0.0));
        assert!(!h.poll());
        clock.advance(0.02);
        assert!(h.poll());
        assert_eq!(renders.get(), 2);
        assert_eq!(h.render_count(), 2);
    }

    #[test]
    fn restart_replaces_session() {
        let clock = ManualClock::new();
        let (_renders, mut h) = handler(&clock);
        let mut view = ViewState::default();

        h.drag_started(&view, Vec2::new(0.0, 0.0));
        h.dragged(&mut view, Vec2::new(40.0, 0.0));
        h.drag_started(&view, Vec2::new(200.0, 200.0));
        let session = h.session().copied().unwrap();
        assert_eq!(session.v0, Vec2::new(200.0, 200.0));
        assert_eq!(session.r0, Rotation::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn destroy_cancels_pending_render() {
        let clock = ManualClock::new();
        let (renders, mut h) = handler(&clock);
        let mut view = ViewState::default();

        h.drag_started(&view, Vec2::new(0.0, 0.0));
        h.dragged(&mut view, Vec2::new(1.0, 0.0));
        h.dragged(&mut view, Vec2::new(2.0, 0.0));
        h.destroy();
        clock.advance(1.0);
        assert!(!h.poll());
        h.drag_ended();
        assert_eq!(renders.get(), 1);
    }
}
