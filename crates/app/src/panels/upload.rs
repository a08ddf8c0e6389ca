//! Single-file upload widget.
//!
//! idle -> uploading -> (success | failure) -> idle. One upload in flight
//! at a time; the drop target and picker are disabled while uploading.
//! Drops are not type-filtered client-side, the picker is; either way the
//! backend has the final say on type and size.

use crate::fetch::spawn_fetch;
use egui::{Color32, Context, RichText, Sense, Ui, Vec2};
use services::{ApiClient, ApiError};
use shared::model::UploadReceipt;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;

/// Extensions offered by the native file picker.
const PICKER_EXTENSIONS: [&str; 6] = ["pdf", "docx", "txt", "png", "jpg", "jpeg"];

/// Outcome line shown under the drop zone after an attempt finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
enum UploadStatus {
    Succeeded(String),
    Failed(String),
}

pub struct UploadWidget {
    client: ApiClient,
    uploading: bool,
    status: Option<UploadStatus>,
    result_rx: Option<Receiver<Result<UploadReceipt, ApiError>>>,
    hovering: bool,
}

impl UploadWidget {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            uploading: false,
            status: None,
            result_rx: None,
            hovering: false,
        }
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    /// Accept a drop or picker selection. Only the first file is used;
    /// the rest are silently ignored. Returns whether an upload started.
    pub fn offer_files(&mut self, files: Vec<PathBuf>) -> bool {
        if self.uploading {
            return false;
        }
        let Some(first) = files.into_iter().next() else {
            return false;
        };
        self.uploading = true;
        self.status = None;
        let client = self.client.clone();
        self.result_rx = Some(spawn_fetch(async move {
            client.upload_document(&first).await
        }));
        true
    }

    /// Drain a finished upload. Returns true exactly once per successful
    /// upload so the caller can bump the refresh serial.
    pub fn poll(&mut self) -> bool {
        let Some(rx) = &self.result_rx else {
            return false;
        };
        let Ok(result) = rx.try_recv() else {
            return false;
        };
        self.result_rx = None;
        self.apply_result(result)
    }

    fn apply_result(&mut self, result: Result<UploadReceipt, ApiError>) -> bool {
        self.uploading = false;
        match result {
            Ok(receipt) => {
                self.status = Some(UploadStatus::Succeeded(receipt.filename));
                true
            }
            Err(e) => {
                tracing::warn!("upload failed: {}", e);
                self.status = Some(UploadStatus::Failed(e.user_message()));
                false
            }
        }
    }

    /// Capture window-level drag state and dropped files. Call once per
    /// frame before `ui`.
    pub fn handle_drops(&mut self, ctx: &Context) {
        let mut dropped: Vec<PathBuf> = Vec::new();
        ctx.input(|i| {
            self.hovering = !i.raw.hovered_files.is_empty();
            for file in &i.raw.dropped_files {
                if let Some(path) = &file.path {
                    dropped.push(path.clone());
                }
            }
        });
        if !dropped.is_empty() {
            self.offer_files(dropped);
        }
    }

    pub fn ui(&mut self, ui: &mut Ui) {
        let size = Vec2::new(ui.available_width(), 110.0);
        let (rect, _response) = ui.allocate_exact_size(size, Sense::hover());

        let visuals = if self.hovering && !self.uploading {
            ui.visuals().widgets.hovered
        } else {
            ui.visuals().widgets.inactive
        };
        ui.painter().rect(rect, 6.0, visuals.bg_fill, visuals.bg_stroke);
        if self.hovering && !self.uploading {
            let stroke = egui::Stroke::new(2.0, ui.visuals().selection.bg_fill);
            ui.painter().rect_stroke(rect, 6.0, stroke);
        }

        let headline = if self.uploading {
            "Uploading..."
        } else if self.hovering {
            "📥 Drop file to upload"
        } else {
            "📁 Drop a file here or choose one below"
        };
        ui.painter().text(
            rect.center() - Vec2::new(0.0, 12.0),
            egui::Align2::CENTER_CENTER,
            headline,
            egui::FontId::proportional(15.0),
            ui.visuals().strong_text_color(),
        );
        ui.painter().text(
            rect.center() + Vec2::new(0.0, 12.0),
            egui::Align2::CENTER_CENTER,
            "Supports: PDF, DOCX, TXT, PNG, JPG (max 50MB)",
            egui::FontId::proportional(11.0),
            ui.visuals().weak_text_color(),
        );

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!self.uploading, egui::Button::new("Choose File"))
                .clicked()
            {
                if let Some(path) = pick_file() {
                    self.offer_files(vec![path]);
                }
            }
            if self.uploading {
                ui.spinner();
            }
        });

        if let Some(status) = &self.status {
            ui.add_space(4.0);
            match status {
                UploadStatus::Succeeded(filename) => {
                    ui.colored_label(
                        Color32::from_rgb(22, 163, 74),
                        format!("✅ Successfully uploaded: {}", filename),
                    );
                }
                UploadStatus::Failed(message) => {
                    ui.colored_label(
                        Color32::from_rgb(220, 38, 38),
                        RichText::new(format!("❌ Upload failed: {}", message)),
                    );
                }
            }
        }
    }
}

// Native dialog, filtered to the supported extensions.
fn pick_file() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Choose a document")
        .add_filter("Documents", &PICKER_EXTENSIONS)
        .pick_file()
}
