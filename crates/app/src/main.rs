//! Compliance Desk - desktop client for the compliance automation backend.
//!
//! Three independent panels (document list, upload widget, control
//! browser), each owning its own fetch lifecycle. The upload widget bumps
//! a refresh serial on success; the document list refetches when the
//! serial changes. That serial is the only cross-panel coupling.

use eframe::egui;
use parking_lot::Mutex;
use services::ApiClient;
use std::sync::Arc;
use std::time::Duration;

mod fetch;
mod panels;

use panels::{ControlsPanel, DocumentsPanel, UploadWidget};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AppScreen {
    Documents,
    Controls,
}

struct AppState {
    screen: AppScreen,
    refresh_serial: u64,
    upload: UploadWidget,
    documents: DocumentsPanel,
    controls: ControlsPanel,
}

impl AppState {
    fn new(client: ApiClient) -> Self {
        Self {
            screen: AppScreen::Documents,
            refresh_serial: 0,
            upload: UploadWidget::new(client.clone()),
            documents: DocumentsPanel::new(client.clone()),
            controls: ControlsPanel::new(client),
        }
    }

    /// Per-frame bookkeeping: drain finished fetches and keep dependent
    /// state in sync. A completed upload bumps the refresh serial, which
    /// makes the document list refetch.
    fn poll(&mut self) {
        if self.upload.poll() {
            self.refresh_serial += 1;
        }
        self.documents.sync(self.refresh_serial);
        self.documents.poll();
        self.controls.ensure_started();
        self.controls.poll();
    }

    fn any_in_flight(&self) -> bool {
        self.upload.is_uploading()
            || self.documents.any_in_flight()
            || self.controls.any_in_flight()
    }
}

struct ComplianceApp {
    state: Arc<Mutex<AppState>>,
}

impl eframe::App for ComplianceApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut s = self.state.lock();
        s.poll();

        // Window-level drops feed the upload widget, but only while the
        // documents screen is showing.
        if s.screen == AppScreen::Documents {
            s.upload.handle_drops(ctx);
        }

        // Keep polling while anything is in flight.
        if s.any_in_flight() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        egui::TopBottomPanel::top("tabs").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("Compliance Desk");
                ui.separator();
                ui.selectable_value(&mut s.screen, AppScreen::Documents, "📁 Documents");
                ui.selectable_value(&mut s.screen, AppScreen::Controls, "⚙ Controls");
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| match s.screen {
            AppScreen::Documents => {
                s.upload.ui(ui);
                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);
                s.documents.ui(ui);
            }
            AppScreen::Controls => {
                s.controls.ui(ui);
            }
        });
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = shared::settings::load_or_default();
    tracing::info!(base_url = %settings.api_base_url, "starting Compliance Desk");
    let client = ApiClient::new(&settings.api_base_url);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([760.0, 560.0]),
        vsync: true,
        ..Default::default()
    };
    eframe::run_native(
        "Compliance Desk",
        options,
        Box::new(|_cc| {
            Box::new(ComplianceApp {
                state: Arc::new(Mutex::new(AppState::new(client))),
            })
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_sync_starts_document_and_framework_fetches() {
        let client = ApiClient::new("http://127.0.0.1:8000");
        let mut state = AppState::new(client);
        assert!(!state.any_in_flight());

        state.documents.sync(state.refresh_serial);
        state.controls.ensure_started();
        assert!(state.any_in_flight());
        assert_eq!(state.refresh_serial, 0);
    }

    #[test]
    fn test_refresh_serial_stable_without_uploads() {
        let client = ApiClient::new("http://127.0.0.1:8000");
        let mut state = AppState::new(client);
        state.poll();
        state.poll();
        state.poll();
        assert_eq!(state.refresh_serial, 0);
    }
}
