use std::path::{Path, PathBuf};
use std::sync::Arc;

use eframe::egui;
use tracing::{error, info, warn};

use crate::archive::DirectoryExport;
use crate::audio::decoder::{media_type_for_extension, AudioDecoder, SourceFile, SymphoniaDecoder};
use crate::audio::playback::{PlaybackClip, Player};
use crate::config::SplitterConfig;
use crate::error::SplitError;
use crate::naming::format_minutes_seconds;
use crate::pipeline::{ProgressEvent, SplitPipeline, StepOutcome};
use crate::session::SplitSession;
use crate::types::{AudioSampleBuffer, SplitResult};
use crate::ui::components::control_panel::{ControlPanel, PanelAction, SplitSettings};
use crate::ui::components::waveform::WaveformCanvas;
use crate::waveform::{ViewEvent, WaveformView};

struct Notice {
    text: String,
    is_error: bool,
}

struct SplitJob {
    pipeline: SplitPipeline,
    progress: f32,
    current: String,
}

pub struct EditorApp {
    session: SplitSession,
    view: Option<WaveformView>,
    player: Option<Player>,
    clip: Option<PlaybackClip>,
    /// File name of the result being previewed, if any.
    previewing: Option<String>,
    settings: SplitSettings,
    job: Option<SplitJob>,
    output_dir: PathBuf,
    path_input: String,
    notice: Option<Notice>,
}

impl EditorApp {
    pub fn new(config: SplitterConfig, output_dir: PathBuf) -> Self {
        let player = match Player::new() {
            Ok(player) => Some(player),
            Err(err) => {
                warn!(error = %err, "audio output unavailable; playback disabled");
                None
            }
        };
        Self {
            settings: SplitSettings::new(config.default_pattern),
            session: SplitSession::new(config),
            view: None,
            player,
            clip: None,
            previewing: None,
            job: None,
            output_dir,
            path_input: String::new(),
            notice: None,
        }
    }

    pub fn open_path(&mut self, path: &Path) {
        self.path_input = path.display().to_string();
        match SourceFile::from_path(path, self.session.config()) {
            Ok(source) => self.open(source),
            Err(err) => self.notify_error(format!("Cannot read {}: {}", path.display(), err)),
        }
    }

    fn open(&mut self, source: SourceFile) {
        self.stop_playback();
        self.job = None;
        self.view = None;
        self.clip = None;
        let name = source.name.clone();
        match self.session.load(source) {
            Ok(buffer) => {
                self.clip = match PlaybackClip::new(&buffer) {
                    Ok(clip) => Some(clip),
                    Err(err) => {
                        warn!(error = %err, "playback disabled for this file");
                        None
                    }
                };
                self.view = Some(self.new_view(buffer));
                self.notify(format!("Loaded {}", name));
            }
            Err(err) => self.notify_error(format!("Could not load {}: {}", name, err)),
        }
    }

    fn new_view(&self, buffer: Arc<AudioSampleBuffer>) -> WaveformView {
        WaveformView::with_config(buffer, 800.0, self.session.config())
    }

    fn notify(&mut self, text: String) {
        info!("{}", text);
        self.notice = Some(Notice {
            text,
            is_error: false,
        });
    }

    fn notify_error(&mut self, text: String) {
        error!("{}", text);
        self.notice = Some(Notice {
            text,
            is_error: true,
        });
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|input| input.raw.dropped_files.clone());
        let Some(file) = dropped.into_iter().next() else {
            return;
        };
        if let Some(path) = &file.path {
            self.open_path(path);
        } else if let Some(bytes) = &file.bytes {
            let extension = Path::new(&file.name).extension().and_then(|ext| ext.to_str());
            let media_type = media_type_for_extension(extension);
            self.open(SourceFile::new(file.name.clone(), media_type, bytes.to_vec()));
        }
    }

    fn toggle_playback(&mut self) {
        let (Some(player), Some(clip)) = (self.player.as_mut(), self.clip.as_ref()) else {
            return;
        };
        if player.is_playing() && self.previewing.is_none() {
            player.pause();
            self.session.set_playback_position(player.position());
        } else {
            self.previewing = None;
            if let Err(err) = player.play_from(clip, self.session.playback_position()) {
                self.notify_error(format!("Playback failed: {:#}", err));
            }
        }
    }

    fn stop_playback(&mut self) {
        self.previewing = None;
        if let Some(player) = self.player.as_mut() {
            player.pause();
            player.seek(0.0);
        }
    }

    fn seek(&mut self, time: f64) {
        self.session.set_playback_position(time);
        let position = self.session.playback_position();
        if let Some(view) = self.view.as_mut() {
            view.set_playhead(position);
        }
        if self.previewing.is_some() {
            return;
        }
        let (Some(player), Some(clip)) = (self.player.as_mut(), self.clip.as_ref()) else {
            return;
        };
        if player.is_playing() {
            if let Err(err) = player.play_from(clip, position) {
                self.notify_error(format!("Playback failed: {:#}", err));
            }
        } else {
            player.seek(position);
        }
    }

    fn sync_playhead(&mut self, ctx: &egui::Context) {
        let Some(player) = self.player.as_mut() else {
            return;
        };
        let position = player.poll();
        let playing = player.is_playing();
        if self.previewing.is_some() {
            if playing {
                ctx.request_repaint();
            } else {
                // preview over: resume main playback where it was left
                self.previewing = None;
                player.seek(self.session.playback_position());
            }
            return;
        }
        if let Some(position) = playhead_after_poll(self.session.playback_position(), position) {
            self.session.set_playback_position(position);
            if let Some(view) = self.view.as_mut() {
                view.set_playhead(position);
            }
        }
        if playing {
            ctx.request_repaint();
        }
    }

    /// Play one encoded result, pausing the main playback first.
    fn preview(&mut self, index: usize) {
        let Some(result) = self.session.results().get(index) else {
            return;
        };
        let name = result.file_name();
        let clip = decode_preview(result);
        let Some(player) = self.player.as_mut() else {
            return;
        };
        if player.is_playing() && self.previewing.is_none() {
            player.pause();
            self.session.set_playback_position(player.position());
        }
        match clip.and_then(|clip| player.play_from(&clip, 0.0)) {
            Ok(()) => {
                info!(segment = %name, "previewing segment");
                self.previewing = Some(name);
            }
            Err(err) => self.notify_error(format!("Cannot preview {}: {:#}", name, err)),
        }
    }

    fn start_split(&mut self) {
        let Some(view) = self.view.as_ref() else {
            return;
        };
        let request = self.settings.request(view.markers());
        let namer = self.session.namer(&self.settings.prefix, self.settings.naming());
        match self.session.start_split(&request, &namer) {
            Ok(pipeline) => {
                self.notice = None;
                self.job = Some(SplitJob {
                    pipeline,
                    progress: 0.0,
                    current: String::new(),
                });
            }
            Err(err) => self.notify_error(err.to_string()),
        }
    }

    /// Encode one segment per frame so the window stays responsive.
    fn step_job(&mut self, ctx: &egui::Context) {
        let Some(job) = self.job.as_mut() else {
            return;
        };
        let mut progress = job.progress;
        let mut current = std::mem::take(&mut job.current);
        let outcome = job.pipeline.step(&mut |event: ProgressEvent<'_>| {
            progress = event.fraction();
            if let ProgressEvent::Segment { name, .. } = event {
                current = name.to_string();
            }
        });
        job.progress = progress;
        job.current = current;

        match outcome {
            Ok(StepOutcome::Pending) => ctx.request_repaint(),
            Ok(StepOutcome::Complete) => {
                if let Some(job) = self.job.take() {
                    let count = self.session.finish_split(job.pipeline).len();
                    self.notify(format!("Created {} files", count));
                }
            }
            Err(SplitError::Cancelled) => {
                self.job = None;
                self.notify("Split cancelled".to_string());
            }
            Err(err) => {
                self.job = None;
                self.notify_error(err.to_string());
            }
        }
    }

    fn export(&mut self) {
        let mut export = DirectoryExport::new(&self.output_dir);
        match self.session.export(&mut export, &mut |_, _| {}) {
            Ok(()) => self.notify(format!(
                "Exported {} files to {}",
                self.session.results().len(),
                export.dir().display()
            )),
            Err(err) => self.notify_error(format!("Export failed: {}", err)),
        }
    }

    fn show_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("file").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("File");
                let field = ui.add(egui::TextEdit::singleline(&mut self.path_input).desired_width(320.0));
                let submitted = field.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter));
                if ui.button("Open").clicked() || submitted {
                    let path = PathBuf::from(self.path_input.trim());
                    self.open_path(&path);
                }
                ui.separator();
                let has_audio = self.clip.is_some() && self.player.is_some();
                let playing = self.previewing.is_none()
                    && self.player.as_ref().map_or(false, |player| player.is_playing());
                let label = if playing { "Pause" } else { "Play" };
                if ui.add_enabled(has_audio, egui::Button::new(label)).clicked() {
                    self.toggle_playback();
                }
                if let Some(view) = self.view.as_mut() {
                    if ui.button("Reset zoom").clicked() {
                        view.reset_zoom();
                    }
                    ui.label(format!(
                        "{} / {}  zoom {:.1}x",
                        format_minutes_seconds(self.session.playback_position()),
                        format_minutes_seconds(view.duration()),
                        view.viewport().zoom()
                    ));
                }
            });
            self.show_notice(ui);
        });
    }

    fn show_notice(&mut self, ui: &mut egui::Ui) {
        let Some(notice) = &self.notice else {
            return;
        };
        let color = if notice.is_error {
            egui::Color32::from_rgb(0xdc, 0x26, 0x26)
        } else {
            egui::Color32::from_rgb(0x05, 0x96, 0x69)
        };
        let mut dismissed = false;
        ui.horizontal(|ui| {
            ui.colored_label(color, &notice.text);
            dismissed = ui.small_button("✕").clicked();
        });
        if dismissed {
            self.notice = None;
        }
    }

    fn show_controls(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("controls").show(ctx, |ui| {
            let marker_count = self.view.as_ref().map_or(0, |view| view.markers().len());
            let action = ControlPanel {
                settings: &mut self.settings,
                marker_count,
                max_parts: self.session.config().max_parts,
                progress: self.job.as_ref().map(|job| job.progress),
                result_count: self.session.results().len(),
            }
            .show(ui);
            if let Some(job) = &self.job {
                ui.label(format!("Encoding {}", job.current));
            }
            match action {
                Some(PanelAction::Split) => self.start_split(),
                Some(PanelAction::Cancel) => {
                    if let Some(job) = &self.job {
                        job.pipeline.cancellation().cancel();
                    }
                }
                Some(PanelAction::Export) => self.export(),
                Some(PanelAction::ClearMarkers) => {
                    if let Some(view) = self.view.as_mut() {
                        view.clear_markers();
                    }
                }
                None => {}
            }
        });
    }

    fn show_segments(&mut self, ctx: &egui::Context) {
        let mut preview = None;
        egui::SidePanel::right("segments")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Segments");
                let Some(view) = self.view.as_ref() else {
                    ui.label("No audio loaded");
                    return;
                };
                if !self.session.results().is_empty() {
                    let can_play = self.player.is_some();
                    for (idx, result) in self.session.results().iter().enumerate() {
                        ui.horizontal(|ui| {
                            let playing = self.previewing.as_deref() == Some(result.file_name().as_str());
                            let label = if playing { "⏵ playing" } else { "⏵" };
                            if ui.add_enabled(can_play, egui::Button::new(label).small()).clicked() {
                                preview = Some(idx);
                            }
                            ui.label(format!(
                                "{}  {}  {} KB",
                                result.file_name(),
                                format_minutes_seconds(result.duration_seconds),
                                result.byte_size / 1024
                            ));
                        });
                    }
                    return;
                }
                let request = self.settings.request(view.markers());
                let namer = self.session.namer(&self.settings.prefix, self.settings.naming());
                match self.session.plan(&request, &namer) {
                    Ok(plan) => {
                        for segment in plan {
                            ui.label(format!(
                                "{}  {} - {}",
                                segment.name,
                                format_minutes_seconds(segment.start),
                                format_minutes_seconds(segment.end)
                            ));
                        }
                    }
                    Err(err) => {
                        ui.weak(err.to_string());
                    }
                }
            });
        if let Some(idx) = preview {
            self.preview(idx);
        }
    }

    fn show_waveform(&mut self, ctx: &egui::Context) {
        let mut seek_to = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(view) = self.view.as_mut() else {
                ui.centered_and_justified(|ui| {
                    ui.label("Open or drop an audio file");
                });
                return;
            };
            for event in (WaveformCanvas { view }).show(ui) {
                match event {
                    ViewEvent::Seek(time) => seek_to = Some(time),
                    ViewEvent::MarkersChanged(markers) => {
                        info!(count = markers.len(), "markers changed");
                    }
                }
            }
            ui.weak("Click to seek, drag to pan, scroll or pinch to zoom. Shift+click or long-press adds a marker, Ctrl+click removes one.");
        });
        if let Some(time) = seek_to {
            self.seek(time);
        }
    }
}

/// New session position after polling the player, when it moved.
///
/// A drained source rewinds the player to 0, which must reach the session
/// and the playhead so the next play starts from the beginning.
fn playhead_after_poll(session_position: f64, polled: f64) -> Option<f64> {
    (polled != session_position).then_some(polled)
}

fn decode_preview(result: &SplitResult) -> anyhow::Result<PlaybackClip> {
    let source = SourceFile::new(result.file_name(), "audio/wav", result.encoded_bytes.clone());
    let buffer = SymphoniaDecoder::new().decode(&source)?;
    PlaybackClip::new(&buffer)
}

impl eframe::App for EditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);
        if ctx.input(|input| input.key_pressed(egui::Key::Space)) && !ctx.wants_keyboard_input() {
            self.toggle_playback();
        }
        self.sync_playhead(ctx);
        self.step_job(ctx);

        self.show_top_panel(ctx);
        self.show_controls(ctx);
        self.show_segments(ctx);
        self.show_waveform(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::encoder::encode_wav;

    #[test]
    fn drained_playback_rewinds_the_playhead() {
        // player rewound to 0 while the session still holds the end position
        assert_eq!(playhead_after_poll(42.5, 0.0), Some(0.0));
        assert_eq!(playhead_after_poll(3.25, 3.5), Some(3.5));
        assert_eq!(playhead_after_poll(7.0, 7.0), None);
    }

    #[test]
    fn preview_decodes_the_encoded_segment() {
        let buffer = AudioSampleBuffer::new(8_000, vec![vec![0.25; 4_000], vec![-0.25; 4_000]]).unwrap();
        let result = SplitResult::new("take_part01".into(), encode_wav(&buffer).unwrap(), 0.5);
        let clip = decode_preview(&result).unwrap();
        assert_eq!(clip.frames(), 4_000);
        assert!((clip.duration() - 0.5).abs() < 1e-9);
    }
}
