use std::sync::Arc;
use std::time::Duration;

use approx::assert_abs_diff_eq;
use wavecut::waveform::gesture::{InputEvent, Modifiers, Pointer};
use wavecut::waveform::render::palette;
use wavecut::waveform::viewport::Viewport;
use wavecut::waveform::{ViewEvent, WaveformView};
use wavecut::AudioSampleBuffer;

fn view(seconds: usize) -> WaveformView {
    let samples = (0..seconds * 200).map(|i| ((i % 40) as f32 / 20.0) - 1.0).collect();
    let buffer = AudioSampleBuffer::mono(200, samples).expect("valid buffer");
    WaveformView::new(Arc::new(buffer), 1200.0)
}

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

#[test]
fn zoom_preserves_time_under_anchor() {
    let mut viewport = Viewport::new(600.0, 1200.0);
    let steps = [(300.0, 2.0), (1100.0, 3.5), (40.0, 7.0), (650.0, 19.0), (600.0, 1.3)];
    for (x, zoom) in steps {
        let before = viewport.time_at(x);
        viewport.zoom_about(x, zoom);
        assert_abs_diff_eq!(viewport.time_at(x), before, epsilon = 1e-9);
    }
}

#[test]
fn wheel_zoom_keeps_cursor_time_fixed() {
    let mut view = view(300);
    for x in [200.0, 900.0, 450.0] {
        let before = view.viewport().time_at(x);
        view.handle(&InputEvent::Wheel { x, delta_y: -1.0 });
        assert_abs_diff_eq!(view.viewport().time_at(x), before, epsilon = 1e-9);
    }
    assert_abs_diff_eq!(view.viewport().zoom(), 1.1f64.powi(3), epsilon = 1e-12);
}

#[test]
fn pinch_zoom_holds_midpoint_time() {
    let mut view = view(300);
    view.zoom_about(0.0, 2.0);
    for pointer in [Pointer::touch(1, 500.0, 80.0), Pointer::touch(2, 700.0, 80.0)] {
        let events = view.handle(&InputEvent::Down {
            pointer,
            modifiers: Modifiers::default(),
            at: ms(0),
        });
        assert!(events.is_empty());
    }
    assert_eq!(view.mode().name(), "pinching");

    // (moved pointer, midpoint after the move, expected zoom)
    let moves = [
        (Pointer::touch(1, 400.0, 80.0), 550.0, 3.0),
        (Pointer::touch(2, 800.0, 80.0), 600.0, 4.0),
    ];
    for (pointer, midpoint, zoom) in moves {
        let before = view.viewport().time_at(midpoint);
        assert!(view
            .handle(&InputEvent::Move {
                pointer,
                at: ms(30),
            })
            .is_empty());
        assert_abs_diff_eq!(view.viewport().zoom(), zoom, epsilon = 1e-9);
        assert_abs_diff_eq!(view.viewport().time_at(midpoint), before, epsilon = 1e-9);
    }

    view.handle(&InputEvent::Up {
        pointer: Pointer::touch(2, 800.0, 80.0),
        at: ms(60),
    });
    assert!(view.mode().is_idle());
}

#[test]
fn long_press_places_marker_under_finger() {
    let mut view = view(120);
    let finger = Pointer::touch(4, 300.0, 50.0);
    view.handle(&InputEvent::Down {
        pointer: finger,
        modifiers: Modifiers::default(),
        at: ms(2_000),
    });
    assert!(view.handle(&InputEvent::Tick { at: ms(2_200) }).is_empty());
    let events = view.handle(&InputEvent::Tick { at: ms(2_500) });
    assert_eq!(events, vec![ViewEvent::MarkersChanged(vec![30.0])]);

    // Lifting the finger afterwards must not seek.
    assert!(view
        .handle(&InputEvent::Up {
            pointer: finger,
            at: ms(2_600),
        })
        .is_empty());
}

#[test]
fn drag_pans_and_stays_in_bounds() {
    let mut view = view(100);
    view.zoom_about(0.0, 4.0);
    let events = [
        InputEvent::Down {
            pointer: Pointer::mouse(600.0, 20.0),
            modifiers: Modifiers::default(),
            at: ms(0),
        },
        InputEvent::Move {
            pointer: Pointer::mouse(300.0, 20.0),
            at: ms(16),
        },
    ];
    for event in &events {
        view.handle(event);
    }
    assert_abs_diff_eq!(view.viewport().offset(), 300.0);

    view.handle(&InputEvent::Move {
        pointer: Pointer::mouse(-20_000.0, 20.0),
        at: ms(32),
    });
    assert_abs_diff_eq!(view.viewport().offset(), view.viewport().max_offset());
    assert_abs_diff_eq!(view.viewport().visible_end(), 100.0, epsilon = 1e-9);

    let released = view.handle(&InputEvent::Up {
        pointer: Pointer::mouse(-20_000.0, 20.0),
        at: ms(48),
    });
    assert!(released.is_empty());
}

#[test]
fn rendered_frame_reflects_markers_and_playhead() {
    let mut view = view(60);
    view.set_markers(&[15.0, 45.0, 30.0]);
    view.set_playhead(20.0);
    let frame = view.render();

    assert_eq!(frame.labels(palette::MARKER), vec!["1", "2", "3"]);
    assert_eq!(frame.lines(palette::PLAYHEAD).count(), 1);
    assert_eq!(frame.lines(palette::WAVEFORM).count(), 1200);
}
