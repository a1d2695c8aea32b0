//! Pointer gesture recognition for the waveform view.
//!
//! [`transition`] is a pure function from `(mode, event)` to `(mode, effects)`.
//! It never touches the viewport or the marker set; the caller applies the
//! returned [`Effect`]s.

use std::time::Duration;

use crate::config::SplitterConfig;

use super::viewport::Viewport;

/// Zoom factor applied per wheel notch.
pub const WHEEL_ZOOM_IN: f64 = 1.1;
pub const WHEEL_ZOOM_OUT: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    pub long_press: Duration,
    /// Movement (px) that cancels a pending long press.
    pub long_press_slop: f64,
    /// Movement (px) after which a mouse press counts as a drag rather than a click.
    pub drag_threshold: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            long_press: Duration::from_millis(500),
            long_press_slop: 10.0,
            drag_threshold: 3.0,
        }
    }
}

impl GestureConfig {
    pub fn from_config(config: &SplitterConfig) -> Self {
        Self {
            long_press: Duration::from_millis(config.long_press_ms),
            long_press_slop: config.long_press_slop_px,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Desktop "add marker" key (shift).
    pub add_marker: bool,
    /// Desktop "remove marker" key (ctrl / cmd).
    pub remove_marker: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub id: u64,
    pub kind: PointerKind,
    pub x: f64,
    pub y: f64,
}

impl Pointer {
    pub fn mouse(x: f64, y: f64) -> Self {
        Self {
            id: 0,
            kind: PointerKind::Mouse,
            x,
            y,
        }
    }

    pub fn touch(id: u64, x: f64, y: f64) -> Self {
        Self {
            id,
            kind: PointerKind::Touch,
            x,
            y,
        }
    }

    fn distance_to(&self, other: &Pointer) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Input fed to the recognizer. `at` is a monotonic timestamp supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Down {
        pointer: Pointer,
        modifiers: Modifiers,
        at: Duration,
    },
    Move {
        pointer: Pointer,
        at: Duration,
    },
    Up {
        pointer: Pointer,
        at: Duration,
    },
    /// The host lost track of a pointer (focus change, touch cancel).
    Cancel { id: u64 },
    /// Positive `delta_y` scrolls down and zooms out.
    Wheel { x: f64, delta_y: f64 },
    /// Periodic clock used to fire the long-press timer.
    Tick { at: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Set the pan offset (pixels); the viewport clamps it.
    Pan { offset: f64 },
    /// Set the zoom, keeping the time under `x` fixed.
    ZoomAbout { x: f64, zoom: f64 },
    AddMarkerAt { x: f64 },
    RemoveMarkerNear { x: f64 },
    SeekTo { x: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Mode {
    #[default]
    Idle,
    Panning {
        pointer: Pointer,
        origin_x: f64,
        origin_offset: f64,
        dragged: bool,
        remove_marker: bool,
    },
    LongPressArming {
        pointer: Pointer,
        origin: Pointer,
        origin_offset: f64,
        started_at: Duration,
    },
    Pinching {
        first: Pointer,
        second: Pointer,
        initial_distance: f64,
        initial_zoom: f64,
    },
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Idle => "idle",
            Mode::Panning { .. } => "panning",
            Mode::LongPressArming { .. } => "long-press",
            Mode::Pinching { .. } => "pinching",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Mode::Idle)
    }

    /// The pointer currently owning the gesture, if any.
    fn primary(&self) -> Option<Pointer> {
        match *self {
            Mode::Panning { pointer, .. } | Mode::LongPressArming { pointer, .. } => Some(pointer),
            Mode::Idle | Mode::Pinching { .. } => None,
        }
    }
}

/// Advance the recognizer by one event.
pub fn transition(
    mode: &Mode,
    event: &InputEvent,
    viewport: &Viewport,
    config: &GestureConfig,
) -> (Mode, Vec<Effect>) {
    match *event {
        InputEvent::Wheel { x, delta_y } => {
            let effects = wheel_zoom(viewport.zoom(), delta_y)
                .map(|zoom| vec![Effect::ZoomAbout { x, zoom }])
                .unwrap_or_default();
            (*mode, effects)
        }
        InputEvent::Cancel { .. } => (Mode::Idle, Vec::new()),
        InputEvent::Down {
            pointer,
            modifiers,
            at,
        } => on_down(mode, pointer, modifiers, at, viewport),
        InputEvent::Move { pointer, at } => on_move(mode, pointer, at, config),
        InputEvent::Up { pointer, at } => on_up(mode, pointer, at, config),
        InputEvent::Tick { at } => match *mode {
            Mode::LongPressArming {
                origin, started_at, ..
            } if at.saturating_sub(started_at) >= config.long_press => {
                (Mode::Idle, vec![Effect::AddMarkerAt { x: origin.x }])
            }
            _ => (*mode, Vec::new()),
        },
    }
}

fn wheel_zoom(current: f64, delta_y: f64) -> Option<f64> {
    if delta_y > 0.0 {
        Some(current * WHEEL_ZOOM_OUT)
    } else if delta_y < 0.0 {
        Some(current * WHEEL_ZOOM_IN)
    } else {
        None
    }
}

fn on_down(
    mode: &Mode,
    pointer: Pointer,
    modifiers: Modifiers,
    at: Duration,
    viewport: &Viewport,
) -> (Mode, Vec<Effect>) {
    if let Some(first) = mode.primary() {
        if first.id == pointer.id {
            return (*mode, Vec::new());
        }
        return (
            Mode::Pinching {
                first,
                second: pointer,
                initial_distance: first.distance_to(&pointer).max(1.0),
                initial_zoom: viewport.zoom(),
            },
            Vec::new(),
        );
    }
    if !mode.is_idle() {
        // Third finger during a pinch.
        return (*mode, Vec::new());
    }

    match pointer.kind {
        PointerKind::Mouse if modifiers.add_marker => {
            (Mode::Idle, vec![Effect::AddMarkerAt { x: pointer.x }])
        }
        PointerKind::Mouse => (
            Mode::Panning {
                pointer,
                origin_x: pointer.x,
                origin_offset: viewport.offset(),
                dragged: false,
                remove_marker: modifiers.remove_marker,
            },
            Vec::new(),
        ),
        PointerKind::Touch => (
            Mode::LongPressArming {
                pointer,
                origin: pointer,
                origin_offset: viewport.offset(),
                started_at: at,
            },
            Vec::new(),
        ),
    }
}

fn on_move(mode: &Mode, moved: Pointer, at: Duration, config: &GestureConfig) -> (Mode, Vec<Effect>) {
    match *mode {
        Mode::Panning {
            pointer,
            origin_x,
            origin_offset,
            dragged,
            remove_marker,
        } if pointer.id == moved.id => {
            let delta = moved.x - origin_x;
            let dragged = dragged || delta.abs() > config.drag_threshold;
            (
                Mode::Panning {
                    pointer: moved,
                    origin_x,
                    origin_offset,
                    dragged,
                    remove_marker,
                },
                vec![Effect::Pan {
                    offset: origin_offset - delta,
                }],
            )
        }
        Mode::LongPressArming {
            pointer,
            origin,
            origin_offset,
            started_at,
        } if pointer.id == moved.id => {
            if at.saturating_sub(started_at) >= config.long_press {
                return (Mode::Idle, vec![Effect::AddMarkerAt { x: origin.x }]);
            }
            if origin.distance_to(&moved) <= config.long_press_slop {
                return (
                    Mode::LongPressArming {
                        pointer: moved,
                        origin,
                        origin_offset,
                        started_at,
                    },
                    Vec::new(),
                );
            }
            let delta = moved.x - origin.x;
            (
                Mode::Panning {
                    pointer: moved,
                    origin_x: origin.x,
                    origin_offset,
                    dragged: true,
                    remove_marker: false,
                },
                vec![Effect::Pan {
                    offset: origin_offset - delta,
                }],
            )
        }
        Mode::Pinching {
            first,
            second,
            initial_distance,
            initial_zoom,
        } => {
            let (first, second) = if moved.id == first.id {
                (moved, second)
            } else if moved.id == second.id {
                (first, moved)
            } else {
                return (*mode, Vec::new());
            };
            let zoom = initial_zoom * first.distance_to(&second) / initial_distance;
            let midpoint = (first.x + second.x) / 2.0;
            (
                Mode::Pinching {
                    first,
                    second,
                    initial_distance,
                    initial_zoom,
                },
                vec![Effect::ZoomAbout { x: midpoint, zoom }],
            )
        }
        _ => (*mode, Vec::new()),
    }
}

fn on_up(mode: &Mode, lifted: Pointer, at: Duration, config: &GestureConfig) -> (Mode, Vec<Effect>) {
    match *mode {
        Mode::Panning {
            pointer,
            dragged,
            remove_marker,
            ..
        } if pointer.id == lifted.id => {
            let effects = match (dragged, remove_marker) {
                (true, _) => Vec::new(),
                (false, true) => vec![Effect::RemoveMarkerNear { x: lifted.x }],
                (false, false) => vec![Effect::SeekTo { x: lifted.x }],
            };
            (Mode::Idle, effects)
        }
        Mode::LongPressArming {
            pointer,
            origin,
            started_at,
            ..
        } if pointer.id == lifted.id => {
            let effect = if at.saturating_sub(started_at) >= config.long_press {
                Effect::AddMarkerAt { x: origin.x }
            } else {
                Effect::SeekTo { x: origin.x }
            };
            (Mode::Idle, vec![effect])
        }
        Mode::Pinching { first, second, .. } if lifted.id == first.id || lifted.id == second.id => {
            (Mode::Idle, Vec::new())
        }
        _ => (*mode, Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn viewport() -> Viewport {
        let mut viewport = Viewport::new(100.0, 1000.0);
        viewport.zoom_about(0.0, 4.0);
        viewport.set_offset(600.0);
        viewport
    }

    fn step(mode: Mode, event: InputEvent) -> (Mode, Vec<Effect>) {
        transition(&mode, &event, &viewport(), &GestureConfig::default())
    }

    fn down(pointer: Pointer, at: u64) -> InputEvent {
        InputEvent::Down {
            pointer,
            modifiers: Modifiers::default(),
            at: ms(at),
        }
    }

    #[test]
    fn shift_click_adds_marker_and_stays_idle() {
        let event = InputEvent::Down {
            pointer: Pointer::mouse(120.0, 40.0),
            modifiers: Modifiers {
                add_marker: true,
                remove_marker: false,
            },
            at: ms(0),
        };
        let (mode, effects) = step(Mode::Idle, event);
        assert!(mode.is_idle());
        assert_eq!(effects, vec![Effect::AddMarkerAt { x: 120.0 }]);
    }

    #[test]
    fn mouse_drag_pans_from_origin_offset() {
        let (mode, effects) = step(Mode::Idle, down(Pointer::mouse(500.0, 10.0), 0));
        assert_eq!(mode.name(), "panning");
        assert!(effects.is_empty());

        let (mode, effects) = step(
            mode,
            InputEvent::Move {
                pointer: Pointer::mouse(440.0, 10.0),
                at: ms(16),
            },
        );
        assert_eq!(effects, vec![Effect::Pan { offset: 660.0 }]);

        let (mode, effects) = step(
            mode,
            InputEvent::Up {
                pointer: Pointer::mouse(440.0, 10.0),
                at: ms(40),
            },
        );
        assert!(mode.is_idle());
        assert!(effects.is_empty(), "a drag must not seek");
    }

    #[test]
    fn plain_click_seeks() {
        let (mode, _) = step(Mode::Idle, down(Pointer::mouse(250.0, 10.0), 0));
        let (mode, effects) = step(
            mode,
            InputEvent::Up {
                pointer: Pointer::mouse(251.0, 10.0),
                at: ms(80),
            },
        );
        assert!(mode.is_idle());
        assert_eq!(effects, vec![Effect::SeekTo { x: 251.0 }]);
    }

    #[test]
    fn remove_modifier_click_targets_marker() {
        let event = InputEvent::Down {
            pointer: Pointer::mouse(300.0, 10.0),
            modifiers: Modifiers {
                add_marker: false,
                remove_marker: true,
            },
            at: ms(0),
        };
        let (mode, _) = step(Mode::Idle, event);
        let (_, effects) = step(
            mode,
            InputEvent::Up {
                pointer: Pointer::mouse(300.0, 10.0),
                at: ms(50),
            },
        );
        assert_eq!(effects, vec![Effect::RemoveMarkerNear { x: 300.0 }]);
    }

    #[test]
    fn long_press_fires_after_timeout() {
        let (mode, _) = step(Mode::Idle, down(Pointer::touch(7, 333.0, 50.0), 1_000));
        assert_eq!(mode.name(), "long-press");

        let (mode, effects) = step(mode, InputEvent::Tick { at: ms(1_300) });
        assert_eq!(mode.name(), "long-press");
        assert!(effects.is_empty());

        let (mode, effects) = step(mode, InputEvent::Tick { at: ms(1_500) });
        assert!(mode.is_idle());
        assert_eq!(effects, vec![Effect::AddMarkerAt { x: 333.0 }]);
    }

    #[test]
    fn small_jitter_keeps_long_press_armed() {
        let (mode, _) = step(Mode::Idle, down(Pointer::touch(1, 100.0, 100.0), 0));
        let (mode, effects) = step(
            mode,
            InputEvent::Move {
                pointer: Pointer::touch(1, 106.0, 106.0),
                at: ms(200),
            },
        );
        assert_eq!(mode.name(), "long-press");
        assert!(effects.is_empty());
    }

    #[test]
    fn movement_beyond_slop_cancels_long_press_and_pans() {
        let (mode, _) = step(Mode::Idle, down(Pointer::touch(1, 100.0, 100.0), 0));
        let (mode, effects) = step(
            mode,
            InputEvent::Move {
                pointer: Pointer::touch(1, 115.0, 100.0),
                at: ms(100),
            },
        );
        assert_eq!(mode.name(), "panning");
        assert_eq!(effects, vec![Effect::Pan { offset: 585.0 }]);

        let (mode, effects) = step(mode, InputEvent::Tick { at: ms(900) });
        assert_eq!(mode.name(), "panning");
        assert!(effects.is_empty());
    }

    #[test]
    fn quick_tap_seeks() {
        let (mode, _) = step(Mode::Idle, down(Pointer::touch(1, 70.0, 20.0), 0));
        let (mode, effects) = step(
            mode,
            InputEvent::Up {
                pointer: Pointer::touch(1, 70.0, 20.0),
                at: ms(120),
            },
        );
        assert!(mode.is_idle());
        assert_eq!(effects, vec![Effect::SeekTo { x: 70.0 }]);
    }

    #[test]
    fn second_pointer_starts_pinch_and_scales_zoom() {
        let (mode, _) = step(Mode::Idle, down(Pointer::touch(1, 400.0, 50.0), 0));
        let (mode, _) = step(mode, down(Pointer::touch(2, 600.0, 50.0), 30));
        assert_eq!(mode.name(), "pinching");

        let (mode, effects) = step(
            mode,
            InputEvent::Move {
                pointer: Pointer::touch(2, 800.0, 50.0),
                at: ms(60),
            },
        );
        assert_eq!(effects, vec![Effect::ZoomAbout { x: 600.0, zoom: 8.0 }]);

        let (mode, effects) = step(
            mode,
            InputEvent::Up {
                pointer: Pointer::touch(1, 400.0, 50.0),
                at: ms(90),
            },
        );
        assert!(mode.is_idle());
        assert!(effects.is_empty());
    }

    #[test]
    fn wheel_zooms_without_changing_mode() {
        let (mode, effects) = step(Mode::Idle, InputEvent::Wheel { x: 10.0, delta_y: -3.0 });
        assert!(mode.is_idle());
        match effects.as_slice() {
            [Effect::ZoomAbout { x, zoom }] => {
                assert_eq!(*x, 10.0);
                assert!((zoom - 4.4).abs() < 1e-9);
            }
            other => panic!("unexpected effects {other:?}"),
        }

        let (_, effects) = step(Mode::Idle, InputEvent::Wheel { x: 10.0, delta_y: 0.0 });
        assert!(effects.is_empty());
    }

    #[test]
    fn cancel_returns_to_idle() {
        let (mode, _) = step(Mode::Idle, down(Pointer::mouse(1.0, 1.0), 0));
        let (mode, effects) = step(mode, InputEvent::Cancel { id: 0 });
        assert!(mode.is_idle());
        assert!(effects.is_empty());
    }
}
