use std::time::Duration;

use eframe::egui;

use crate::waveform::gesture::{InputEvent, Modifiers, Pointer};
use crate::waveform::render::{Color, DrawCommand, Frame};
use crate::waveform::{ViewEvent, WaveformView, DEFAULT_HEIGHT};

/// egui host for [`WaveformView`]: forwards raw input and paints its frames.
pub struct WaveformCanvas<'a> {
    pub view: &'a mut WaveformView,
}

impl<'a> WaveformCanvas<'a> {
    pub fn show(self, ui: &mut egui::Ui) -> Vec<ViewEvent> {
        let size = egui::vec2(ui.available_width(), DEFAULT_HEIGHT);
        let (response, painter) = ui.allocate_painter(size, egui::Sense::click_and_drag());
        let rect = response.rect;
        self.view.resize(rect.width() as f64, rect.height());

        let (events, now) = ui.input(|input| {
            let now = Duration::from_secs_f64(input.time);
            let cursor = input.pointer.hover_pos().filter(|pos| rect.contains(*pos));
            let events = translate(&input.events, rect, cursor, input.any_touches(), now);
            (events, now)
        });

        let mut notifications = Vec::new();
        for event in events.iter().chain(std::iter::once(&InputEvent::Tick { at: now })) {
            notifications.extend(self.view.handle(event));
        }
        if !response.hovered() && self.view.mode().is_idle() {
            self.view.hover(None);
        }
        if !self.view.mode().is_idle() {
            ui.ctx().request_repaint();
        }

        paint(&painter, rect, &self.view.render());
        painter.rect_stroke(rect, 0.0, egui::Stroke::new(1.0, egui::Color32::DARK_GRAY));
        notifications
    }
}

fn translate(
    raw: &[egui::Event],
    rect: egui::Rect,
    cursor: Option<egui::Pos2>,
    touching: bool,
    at: Duration,
) -> Vec<InputEvent> {
    let local_x = |pos: egui::Pos2| (pos.x - rect.left()) as f64;
    let local_y = |pos: egui::Pos2| (pos.y - rect.top()) as f64;
    let mut events = Vec::new();
    for event in raw {
        match event {
            // egui also synthesizes pointer events from touches.
            egui::Event::PointerButton { .. } | egui::Event::PointerMoved(_) if touching => {}
            egui::Event::PointerButton {
                pos,
                button: egui::PointerButton::Primary,
                pressed,
                modifiers,
            } => {
                let pointer = Pointer::mouse(local_x(*pos), local_y(*pos));
                if *pressed {
                    if rect.contains(*pos) {
                        events.push(InputEvent::Down {
                            pointer,
                            modifiers: Modifiers {
                                add_marker: modifiers.shift,
                                remove_marker: modifiers.command,
                            },
                            at,
                        });
                    }
                } else {
                    events.push(InputEvent::Up { pointer, at });
                }
            }
            egui::Event::PointerMoved(pos) => {
                events.push(InputEvent::Move {
                    pointer: Pointer::mouse(local_x(*pos), local_y(*pos)),
                    at,
                });
            }
            egui::Event::PointerGone => events.push(InputEvent::Cancel { id: 0 }),
            egui::Event::Touch { id, phase, pos, .. } => {
                let pointer = Pointer::touch(id.0, local_x(*pos), local_y(*pos));
                match phase {
                    egui::TouchPhase::Start if rect.contains(*pos) => events.push(InputEvent::Down {
                        pointer,
                        modifiers: Modifiers::default(),
                        at,
                    }),
                    egui::TouchPhase::Start => {}
                    egui::TouchPhase::Move => events.push(InputEvent::Move { pointer, at }),
                    egui::TouchPhase::End => events.push(InputEvent::Up { pointer, at }),
                    egui::TouchPhase::Cancel => events.push(InputEvent::Cancel { id: id.0 }),
                }
            }
            egui::Event::Scroll(delta) if delta.y != 0.0 => {
                if let Some(pos) = cursor {
                    // egui reports scrolling down as a negative delta.
                    events.push(InputEvent::Wheel {
                        x: local_x(pos),
                        delta_y: -delta.y as f64,
                    });
                }
            }
            _ => {}
        }
    }
    events
}

fn color32(color: Color) -> egui::Color32 {
    egui::Color32::from_rgb(color.r, color.g, color.b)
}

fn paint(painter: &egui::Painter, rect: egui::Rect, frame: &Frame) {
    let at = |[x, y]: [f32; 2]| rect.min + egui::vec2(x, y);
    for command in &frame.commands {
        match command {
            DrawCommand::Fill { min, max, color } => {
                painter.rect_filled(egui::Rect::from_min_max(at(*min), at(*max)), 0.0, color32(*color));
            }
            DrawCommand::Line {
                from,
                to,
                width,
                color,
            } => {
                painter.line_segment([at(*from), at(*to)], egui::Stroke::new(*width, color32(*color)));
            }
            DrawCommand::Triangle { points, color } => {
                painter.add(egui::Shape::convex_polygon(
                    points.iter().map(|point| at(*point)).collect(),
                    color32(*color),
                    egui::Stroke::NONE,
                ));
            }
            DrawCommand::Text {
                pos,
                text,
                size,
                color,
            } => {
                painter.text(
                    at(*pos),
                    egui::Align2::LEFT_BOTTOM,
                    text,
                    egui::FontId::proportional(*size),
                    color32(*color),
                );
            }
        }
    }
}
