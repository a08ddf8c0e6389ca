//! Uploaded-document list.
//!
//! Fetches the full collection on first frame and again whenever the
//! app-level refresh serial changes (the upload widget bumps it).
//! Deletion asks for confirmation first; a successful delete removes the
//! row locally without a refetch, a failed one leaves the list untouched
//! and shows a notice.

use crate::fetch::{spawn_fetch, FetchSlot};
use crate::panels::LoadState;
use egui::{Align2, Color32, RichText, Ui, Vec2};
use services::{ApiClient, ApiError};
use shared::format::{display_filename, file_icon, format_file_size, format_timestamp};
use shared::model::Document;
use std::sync::mpsc::Receiver;

struct DeleteOutcome {
    document_id: String,
    result: Result<(), ApiError>,
}

/// Confirmation target for a pending delete.
struct PendingDelete {
    document_id: String,
    filename: String,
}

pub struct DocumentsPanel {
    client: ApiClient,
    state: LoadState<Vec<Document>>,
    slot: FetchSlot<Result<Vec<Document>, ApiError>>,
    delete_rx: Option<Receiver<DeleteOutcome>>,
    pending_delete: Option<PendingDelete>,
    notice: Option<String>,
    seen_serial: Option<u64>,
}

impl DocumentsPanel {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: LoadState::NeverLoaded,
            slot: FetchSlot::new(),
            delete_rx: None,
            pending_delete: None,
            notice: None,
            seen_serial: None,
        }
    }

    /// Refetch when the refresh serial changes. The first call (serial
    /// never seen) covers the initial load.
    pub fn sync(&mut self, refresh_serial: u64) {
        if self.seen_serial == Some(refresh_serial) {
            return;
        }
        self.seen_serial = Some(refresh_serial);
        self.state = LoadState::Loading;
        self.notice = None;
        let client = self.client.clone();
        self.slot.start(async move { client.list_documents().await });
    }

    /// Drain completed fetches and delete results. Called every frame.
    pub fn poll(&mut self) {
        if let Some(result) = self.slot.poll() {
            match result {
                Ok(documents) => self.state = LoadState::Loaded(documents),
                Err(e) => {
                    tracing::warn!("failed to fetch documents: {}", e);
                    self.state = LoadState::Failed("Failed to load documents".to_string());
                }
            }
        }
        if let Some(rx) = &self.delete_rx {
            if let Ok(outcome) = rx.try_recv() {
                self.delete_rx = None;
                self.apply_delete(outcome.document_id, outcome.result);
            }
        }
    }

    pub fn any_in_flight(&self) -> bool {
        self.slot.in_flight() || self.delete_rx.is_some()
    }

    /// On 2xx the document disappears from local state; on failure the
    /// list stays byte-for-byte as it was and the user sees a notice.
    fn apply_delete(&mut self, document_id: String, result: Result<(), ApiError>) {
        match result {
            Ok(()) => {
                if let Some(documents) = self.state.loaded_mut() {
                    documents.retain(|d| d.id != document_id);
                }
            }
            Err(e) => {
                tracing::warn!(document = %document_id, "delete failed: {}", e);
                self.notice = Some("Failed to delete document".to_string());
            }
        }
    }

    fn begin_delete(&mut self, document_id: String) {
        if self.delete_rx.is_some() {
            return;
        }
        self.notice = None;
        let client = self.client.clone();
        let id = document_id.clone();
        self.delete_rx = Some(spawn_fetch(async move {
            let result = client.delete_document(&id).await;
            DeleteOutcome {
                document_id: id,
                result,
            }
        }));
    }

    pub fn ui(&mut self, ui: &mut Ui) {
        ui.heading("Uploaded Documents");
        ui.add_space(4.0);

        if let Some(notice) = &self.notice {
            ui.colored_label(Color32::from_rgb(220, 38, 38), notice.as_str());
            ui.add_space(4.0);
        }

        match &self.state {
            LoadState::NeverLoaded => {}
            LoadState::Loading => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading documents...");
                });
            }
            LoadState::Failed(message) => {
                ui.colored_label(Color32::from_rgb(220, 38, 38), message.as_str());
            }
            LoadState::Loaded(documents) if documents.is_empty() => {
                ui.add_space(16.0);
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new("📄").size(28.0));
                    ui.strong("No documents uploaded yet");
                    ui.weak("Upload your first document to get started");
                });
            }
            LoadState::Loaded(documents) => {
                let mut request_delete: Option<PendingDelete> = None;
                let mut follow: Option<String> = None;
                let deleting = self.delete_rx.is_some();

                egui::ScrollArea::vertical().show(ui, |ui| {
                    for doc in documents {
                        egui::Frame::group(ui.style()).show(ui, |ui| {
                            ui.horizontal(|ui| {
                                ui.label(RichText::new(file_icon(&doc.mime_type)).size(20.0));
                                ui.vertical(|ui| {
                                    ui.strong(display_filename(&doc.filename));
                                    ui.small(format!("Size: {}", format_file_size(doc.file_size)));
                                    ui.small(format!(
                                        "Uploaded: {}",
                                        format_timestamp(&doc.created_at)
                                    ));
                                    ui.small(format!("Type: {}", doc.mime_type));
                                });
                                ui.with_layout(
                                    egui::Layout::right_to_left(egui::Align::TOP),
                                    |ui| {
                                        if ui
                                            .add_enabled(
                                                !deleting,
                                                egui::Button::new(
                                                    RichText::new("Delete")
                                                        .color(Color32::from_rgb(185, 28, 28)),
                                                ),
                                            )
                                            .clicked()
                                        {
                                            request_delete = Some(PendingDelete {
                                                document_id: doc.id.clone(),
                                                filename: display_filename(&doc.filename)
                                                    .to_string(),
                                            });
                                        }
                                        if ui.button("Download").clicked() {
                                            follow = Some(doc.download_url.clone());
                                        }
                                    },
                                );
                            });
                        });
                        ui.add_space(6.0);
                    }
                });

                if let Some(pending) = request_delete {
                    self.pending_delete = Some(pending);
                }
                if let Some(url) = follow {
                    let resolved = self.client.resolve_url(&url);
                    if let Err(e) = open::that(resolved) {
                        tracing::warn!("failed to open download link: {}", e);
                    }
                }
            }
        }

        self.confirm_dialog(ui);
    }

    // Destructive action gate: the DELETE request is only sent after an
    // explicit confirmation click.
    fn confirm_dialog(&mut self, ui: &mut Ui) {
        let Some(pending) = &self.pending_delete else {
            return;
        };
        let filename = pending.filename.clone();
        let mut confirmed = false;
        let mut cancelled = false;

        egui::Window::new("Delete document?")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ui.ctx(), |ui| {
                ui.label(format!(
                    "Are you sure you want to delete \"{}\"? This cannot be undone.",
                    filename
                ));
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        cancelled = true;
                    }
                    if ui
                        .button(RichText::new("Delete").color(Color32::from_rgb(185, 28, 28)))
                        .clicked()
                    {
                        confirmed = true;
                    }
                });
            });

        if confirmed {
            if let Some(pending) = self.pending_delete.take() {
                self.begin_delete(pending.document_id);
            }
        } else if cancelled {
            self.pending_delete = None;
        }
    }
}
