use eframe::egui;

use crate::naming::{NamingPattern, PatternName};
use crate::segmenter::request::SplitRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMode {
    Interval,
    Parts,
    Markers,
}

/// Split settings as edited in the panel.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitSettings {
    pub mode: SplitMode,
    pub minutes: f64,
    pub parts: u32,
    pub prefix: String,
    pub pattern: PatternName,
    pub use_template: bool,
    pub template: String,
}

impl SplitSettings {
    pub fn new(pattern: PatternName) -> Self {
        Self {
            mode: SplitMode::Interval,
            minutes: 1.0,
            parts: 2,
            prefix: String::new(),
            pattern,
            use_template: false,
            template: "{prefix}_{num:3d}".to_string(),
        }
    }

    pub fn request(&self, markers: &[f64]) -> SplitRequest {
        match self.mode {
            SplitMode::Interval => SplitRequest::IntervalMinutes(self.minutes),
            SplitMode::Parts => SplitRequest::Parts(self.parts),
            SplitMode::Markers => SplitRequest::Markers(markers.to_vec()),
        }
    }

    pub fn naming(&self) -> NamingPattern {
        if self.use_template {
            NamingPattern::Custom(self.template.clone())
        } else {
            self.pattern.into()
        }
    }

    /// Marker mode needs at least one marker before a split can start.
    pub fn can_split(&self, marker_count: usize) -> bool {
        self.mode != SplitMode::Markers || marker_count > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    Split,
    Cancel,
    Export,
    ClearMarkers,
}

pub struct ControlPanel<'a> {
    pub settings: &'a mut SplitSettings,
    pub marker_count: usize,
    pub max_parts: u32,
    /// Fraction done while a batch runs.
    pub progress: Option<f32>,
    pub result_count: usize,
}

impl<'a> ControlPanel<'a> {
    pub fn show(self, ui: &mut egui::Ui) -> Option<PanelAction> {
        let mut action = None;
        let busy = self.progress.is_some();
        ui.horizontal(|ui| {
            ui.add_enabled_ui(!busy, |ui| {
                ui.selectable_value(&mut self.settings.mode, SplitMode::Interval, "Interval");
                ui.selectable_value(&mut self.settings.mode, SplitMode::Parts, "Equal parts");
                ui.selectable_value(&mut self.settings.mode, SplitMode::Markers, "Markers");
                ui.separator();
                match self.settings.mode {
                    SplitMode::Interval => {
                        ui.label("Minutes");
                        ui.add(
                            egui::DragValue::new(&mut self.settings.minutes)
                                .speed(0.1)
                                .clamp_range(0.1..=600.0),
                        );
                    }
                    SplitMode::Parts => {
                        ui.label("Parts");
                        ui.add(
                            egui::DragValue::new(&mut self.settings.parts)
                                .clamp_range(2..=self.max_parts),
                        );
                    }
                    SplitMode::Markers => {
                        ui.label(format!("{} markers", self.marker_count));
                        if ui.small_button("Clear").clicked() {
                            action = Some(PanelAction::ClearMarkers);
                        }
                    }
                }
            });
        });

        ui.horizontal(|ui| {
            ui.add_enabled_ui(!busy, |ui| {
                ui.label("Prefix");
                ui.add(egui::TextEdit::singleline(&mut self.settings.prefix).desired_width(120.0));
                ui.checkbox(&mut self.settings.use_template, "Template");
                if self.settings.use_template {
                    ui.add(
                        egui::TextEdit::singleline(&mut self.settings.template).desired_width(200.0),
                    );
                } else {
                    egui::ComboBox::from_id_source("naming_pattern")
                        .selected_text(pattern_label(self.settings.pattern))
                        .show_ui(ui, |ui| {
                            for pattern in [PatternName::Simple, PatternName::Timestamp, PatternName::Duration] {
                                ui.selectable_value(&mut self.settings.pattern, pattern, pattern_label(pattern));
                            }
                        });
                }
            });
        });

        ui.horizontal(|ui| match self.progress {
            Some(fraction) => {
                ui.add(egui::ProgressBar::new(fraction).show_percentage().desired_width(240.0));
                if ui.button("Cancel").clicked() {
                    action = Some(PanelAction::Cancel);
                }
            }
            None => {
                let ready = self.settings.can_split(self.marker_count);
                if ui.add_enabled(ready, egui::Button::new("Split")).clicked() {
                    action = Some(PanelAction::Split);
                }
                if ui
                    .add_enabled(self.result_count > 0, egui::Button::new("Export all"))
                    .clicked()
                {
                    action = Some(PanelAction::Export);
                }
                if self.result_count > 0 {
                    ui.label(format!("{} files ready", self.result_count));
                }
            }
        });
        action
    }
}

fn pattern_label(pattern: PatternName) -> &'static str {
    match pattern {
        PatternName::Simple => "name_part01",
        PatternName::Timestamp => "name_date_time_part01",
        PatternName::Duration => "name_0m00s-1m00s",
    }
}
