use foundation::math::Rotation;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::projection::Projection;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardConfig {
    /// Degrees per key press.
    pub step_deg: f64,
    pub zoom_in: f64,
    pub zoom_out: f64,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            step_deg: 5.0,
            zoom_in: 1.1,
            zoom_out: 0.9,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    PitchUp,
    PitchDown,
    YawLeft,
    YawRight,
    RollLeft,
    RollRight,
    Reset,
    ZoomIn,
    ZoomOut,
}

impl Key {
    /// WASD for yaw/pitch, Q/E for roll, R to reset, `+`/`-` to zoom.
    /// Letters are case-insensitive.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'W' => Some(Key::PitchUp),
            'S' => Some(Key::PitchDown),
            'A' => Some(Key::YawLeft),
            'D' => Some(Key::YawRight),
            'Q' => Some(Key::RollLeft),
            'E' => Some(Key::RollRight),
            'R' => Some(Key::Reset),
            '+' => Some(Key::ZoomIn),
            '-' => Some(Key::ZoomOut),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum KeyAction {
    Rotated(Rotation),
    Zoomed(f64),
    Ignored,
}

/// Stepped keyboard rotation and zoom.
///
/// Pitch is clamped to `[-90, 90]`; yaw and roll wrap into `[0, 360)`.
/// Zoom keys never touch the rotation; they hand a multiplicative factor to
/// `on_zoom`.
pub struct KeyboardHandler<F: FnMut(), Z: FnMut(f64)> {
    config: KeyboardConfig,
    on_update: F,
    on_zoom: Z,
}

impl<F: FnMut(), Z: FnMut(f64)> KeyboardHandler<F, Z> {
    pub fn new(config: KeyboardConfig, on_update: F, on_zoom: Z) -> Self {
        Self {
            config,
            on_update,
            on_zoom,
        }
    }

    pub fn handle_char<P: Projection + ?Sized>(
        &mut self,
        projection: &mut P,
        c: char,
    ) -> KeyAction {
        match Key::from_char(c) {
            Some(key) => self.handle(projection, key),
            None => KeyAction::Ignored,
        }
    }

    pub fn handle<P: Projection + ?Sized>(&mut self, projection: &mut P, key: Key) -> KeyAction {
        let step = self.config.step_deg;
        let Rotation {
            mut yaw,
            mut pitch,
            mut roll,
        } = projection.rotation();

        match key {
            Key::PitchUp => pitch = (pitch + step).min(90.0),
            Key::PitchDown => pitch = (pitch - step).max(-90.0),
            Key::YawLeft => yaw = (yaw - step).rem_euclid(360.0),
            Key::YawRight => yaw = (yaw + step).rem_euclid(360.0),
            Key::RollLeft => roll = (roll - step).rem_euclid(360.0),
            Key::RollRight => roll = (roll + step).rem_euclid(360.0),
            Key::Reset => (yaw, pitch, roll) = (0.0, 0.0, 0.0),
            Key::ZoomIn | Key::ZoomOut => {
                let factor = if key == Key::ZoomIn {
                    self.config.zoom_in
                } else {
                    self.config.zoom_out
                };
                trace!(factor, "keyboard zoom");
                (self.on_zoom)(factor);
                return KeyAction::Zoomed(factor);
            }
        }

        let rotation = Rotation::new(yaw, pitch, roll);
        trace!(?key, yaw, pitch, roll, "keyboard rotation");
        projection.set_rotation(rotation);
        (self.on_update)();
        KeyAction::Rotated(rotation)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use foundation::math::Rotation;
    use pretty_assertions::assert_eq;

    use super::{Key, KeyAction, KeyboardConfig, KeyboardHandler};
    use crate::projection::{Projection, ViewState};

    #[test]
    fn keys_parse_case_insensitively() {
        assert_eq!(Key::from_char('w'), Some(Key::PitchUp));
        assert_eq!(Key::from_char('W'), Some(Key::PitchUp));
        assert_eq!(Key::from_char('+'), Some(Key::ZoomIn));
        assert_eq!(Key::from_char('x'), None);
    }

    #[test]
    fn pitch_is_clamped_and_yaw_wraps() {
        let updates = Rc::new(Cell::new(0));
        let u = updates.clone();
        let mut keys =
            KeyboardHandler::new(KeyboardConfig::default(), move || u.set(u.get() + 1), |_| {});
        let mut view = ViewState::default();

        view.set_rotation(Rotation::new(2.0, 88.0, 358.0));
        keys.handle(&mut view, Key::PitchUp);
        assert_eq!(view.rotation().pitch, 90.0);

        keys.handle(&mut view, Key::YawLeft);
        assert_eq!(view.rotation().yaw, 357.0);

        keys.handle(&mut view, Key::RollRight);
        assert_eq!(view.rotation().roll, 3.0);

        view.set_rotation(Rotation::new(0.0, -87.0, 0.0));
        keys.handle_char(&mut view, 's');
        assert_eq!(view.rotation().pitch, -90.0);

        assert_eq!(updates.get(), 4);
    }

    #[test]
    fn reset_returns_to_origin() {
        let mut keys = KeyboardHandler::new(KeyboardConfig::default(), || {}, |_| {});
        let mut view = ViewState::default();
        view.set_rotation(Rotation::new(45.0, 10.0, 5.0));
        let action = keys.handle_char(&mut view, 'r');
        assert_eq!(action, KeyAction::Rotated(Rotation::new(0.0, 0.0, 0.0)));
        assert_eq!(view.rotation(), Rotation::default());
    }

    #[test]
    fn zoom_keys_leave_rotation_alone() {
        let zoom = Rc::new(Cell::new(1.0));
        let updates = Rc::new(Cell::new(0));
        let (z, u) = (zoom.clone(), updates.clone());
        let mut keys = KeyboardHandler::new(
            KeyboardConfig::default(),
            move || u.set(u.get() + 1),
            move |f| z.set(z.get() * f),
        );
        let mut view = ViewState::default();
        view.set_rotation(Rotation::new(12.0, 0.0, 0.0));

        assert_eq!(keys.handle_char(&mut view, '+'), KeyAction::Zoomed(1.1));
        assert_eq!(keys.handle_char(&mut view, '-'), KeyAction::Zoomed(0.9));
        assert!((zoom.get() - 0.99).abs() < 1e-12);
        assert_eq!(view.rotation(), Rotation::new(12.0, 0.0, 0.0));
        assert_eq!(updates.get(), 0);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut keys = KeyboardHandler::new(
            KeyboardConfig::default(),
            || panic!("no update"),
            |_| panic!("no zoom"),
        );
        let mut view = ViewState::default();
        assert_eq!(keys.handle_char(&mut view, 'z'), KeyAction::Ignored);
    }
}
