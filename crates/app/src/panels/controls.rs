//! Framework/control browser.
//!
//! Loads the framework list once, auto-selects the first framework and
//! fetches its controls. Changing the selector replaces the control set
//! entirely; a stale control response for a previously selected framework
//! is discarded by the fetch slot. Controls with linked evidence mount an
//! [`EvidenceSummary`] scoped to their id.

use crate::fetch::FetchSlot;
use crate::panels::LoadState;
use egui::{Color32, RichText, Ui};
use services::{ApiClient, ApiError};
use shared::format::{display_filename, more_documents_label};
use shared::model::{ConfidenceTier, Control, EvidenceLink, Framework};
use std::collections::HashMap;

/// How many evidence links render inline before collapsing to "+N more".
const INLINE_EVIDENCE_LIMIT: usize = 2;

/// What the browser shows before any control fetch has been issued:
/// still waiting on the framework list, settled on an empty one, or
/// nothing (frameworks arrived and a control fetch is about to follow).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdleHint {
    LoadingFrameworks,
    NoFrameworks,
    None,
}

pub struct ControlsPanel {
    client: ApiClient,
    frameworks: Vec<Framework>,
    selected: Option<String>,
    controls: LoadState<Vec<Control>>,
    frameworks_slot: FetchSlot<Result<Vec<Framework>, ApiError>>,
    controls_slot: FetchSlot<Result<Vec<Control>, ApiError>>,
    evidence: HashMap<String, EvidenceSummary>,
    started: bool,
}

impl ControlsPanel {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            frameworks: Vec::new(),
            selected: None,
            controls: LoadState::NeverLoaded,
            frameworks_slot: FetchSlot::new(),
            controls_slot: FetchSlot::new(),
            evidence: HashMap::new(),
            started: false,
        }
    }

    /// Kick off the framework fetch once, on first frame.
    pub fn ensure_started(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        let client = self.client.clone();
        self.frameworks_slot
            .start(async move { client.list_frameworks().await });
    }

    /// Drain any completed fetches. Called every frame.
    pub fn poll(&mut self) {
        if let Some(result) = self.frameworks_slot.poll() {
            self.apply_frameworks(result);
        }
        if let Some(result) = self.controls_slot.poll() {
            self.apply_controls(result);
        }
        for summary in self.evidence.values_mut() {
            summary.poll();
        }
    }

    pub fn any_in_flight(&self) -> bool {
        self.frameworks_slot.in_flight()
            || self.controls_slot.in_flight()
            || self.evidence.values().any(|s| s.in_flight())
    }

    /// A non-empty framework list selects the first entry and immediately
    /// fetches its controls. Failure or an empty list selects nothing.
    fn apply_frameworks(&mut self, result: Result<Vec<Framework>, ApiError>) {
        match result {
            Ok(frameworks) => {
                self.frameworks = frameworks;
                if let Some(first) = self.frameworks.first() {
                    let id = first.id.clone();
                    self.select_framework(&id);
                }
            }
            Err(e) => {
                tracing::warn!("failed to fetch frameworks: {}", e);
            }
        }
    }

    /// Switch the active framework and fetch its controls, replacing the
    /// previous set. Re-selecting the current framework is a no-op.
    pub fn select_framework(&mut self, framework_id: &str) {
        if self.selected.as_deref() == Some(framework_id) {
            return;
        }
        self.selected = Some(framework_id.to_string());
        self.controls = LoadState::Loading;
        self.evidence.clear();
        let client = self.client.clone();
        let id = framework_id.to_string();
        self.controls_slot
            .start(async move { client.list_controls(&id).await });
    }

    fn apply_controls(&mut self, result: Result<Vec<Control>, ApiError>) {
        match result {
            Ok(controls) => {
                // Drop summaries for controls no longer present.
                self.evidence
                    .retain(|id, _| controls.iter().any(|c| &c.id == id));
                self.controls = LoadState::Loaded(controls);
            }
            Err(e) => {
                tracing::warn!("failed to fetch controls: {}", e);
                self.controls = LoadState::Failed(e.user_message());
            }
        }
    }

    pub fn ui(&mut self, ui: &mut Ui) {
        ui.heading("Compliance Controls");
        ui.label("Browse compliance controls across frameworks.");
        ui.add_space(8.0);

        self.framework_selector(ui);
        ui.add_space(8.0);

        let idle_hint = self.idle_hint();
        let Self {
            client,
            controls,
            evidence,
            ..
        } = self;

        match controls {
            LoadState::NeverLoaded => match idle_hint {
                IdleHint::LoadingFrameworks => {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Loading frameworks...");
                    });
                }
                IdleHint::NoFrameworks => {
                    ui.weak("No frameworks available");
                }
                IdleHint::None => {}
            },
            LoadState::Loading => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading controls...");
                });
            }
            LoadState::Failed(message) => {
                ui.colored_label(Color32::from_rgb(220, 38, 38), message.as_str());
            }
            LoadState::Loaded(controls) if controls.is_empty() => {
                ui.add_space(16.0);
                ui.vertical_centered(|ui| {
                    ui.strong("No controls available");
                    ui.weak("No compliance controls found for the selected framework.");
                });
            }
            LoadState::Loaded(controls) => {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for control in controls.iter() {
                        control_card(ui, client, evidence, control);
                        ui.add_space(6.0);
                    }
                });
            }
        }
    }

    fn framework_selector(&mut self, ui: &mut Ui) {
        let selected_label = self
            .selected
            .as_ref()
            .and_then(|id| self.frameworks.iter().find(|f| &f.id == id))
            .map(|f| f.display_label())
            .unwrap_or_else(|| "Select framework".to_string());

        let mut clicked: Option<String> = None;
        egui::ComboBox::from_label("Framework")
            .selected_text(selected_label)
            .show_ui(ui, |ui| {
                for framework in &self.frameworks {
                    let is_selected = self.selected.as_deref() == Some(framework.id.as_str());
                    if ui
                        .selectable_label(is_selected, framework.display_label())
                        .clicked()
                    {
                        clicked = Some(framework.id.clone());
                    }
                }
            });
        if let Some(id) = clicked {
            self.select_framework(&id);
        }
    }

    // Zero-results wording must never show while the framework fetch is
    // still in flight.
    fn idle_hint(&self) -> IdleHint {
        if self.frameworks_slot.in_flight() {
            IdleHint::LoadingFrameworks
        } else if self.frameworks.is_empty() {
            IdleHint::NoFrameworks
        } else {
            IdleHint::None
        }
    }

    #[cfg(test)]
    fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }
}

fn control_card(
    ui: &mut Ui,
    client: &ApiClient,
    evidence: &mut HashMap<String, EvidenceSummary>,
    control: &Control,
) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.strong(&control.code);
                ui.label(RichText::new(&control.title).color(Color32::from_rgb(37, 99, 235)));
            });
            ui.with_layout(egui::Layout::right_to_left(egui::Align::TOP), |ui| {
                ui.vertical(|ui| {
                    ui.small(format!("{} reqs", control.requirements_count));
                    let badge = control.evidence_badge();
                    if control.has_evidence() {
                        ui.small(RichText::new(badge).color(Color32::from_rgb(22, 163, 74)));
                    } else {
                        ui.small(RichText::new(badge).color(Color32::from_rgb(234, 88, 12)));
                    }
                });
            });
        });
        ui.label(&control.description);

        if control.has_evidence() {
            ui.add_space(4.0);
            ui.small(
                RichText::new("AI-linked evidence:").color(Color32::from_rgb(22, 101, 52)),
            );
            let summary = evidence
                .entry(control.id.clone())
                .or_insert_with(|| EvidenceSummary::new(client.clone(), control.id.clone()));
            summary.ui(ui);
        }

        ui.small(shared::format::format_timestamp(&control.created_at));
    });
}

/// Compact per-control evidence listing: at most two links inline, a
/// "+N more" line for the rest. A failed fetch degrades to the empty
/// list; evidence is supplementary, never an error surface.
pub struct EvidenceSummary {
    client: ApiClient,
    control_id: String,
    links: LoadState<Vec<EvidenceLink>>,
    slot: FetchSlot<Result<Vec<EvidenceLink>, ApiError>>,
}

impl EvidenceSummary {
    pub fn new(client: ApiClient, control_id: String) -> Self {
        let mut summary = Self {
            client,
            control_id,
            links: LoadState::Loading,
            slot: FetchSlot::new(),
        };
        summary.fetch();
        summary
    }

    fn fetch(&mut self) {
        let client = self.client.clone();
        let id = self.control_id.clone();
        self.slot.start(async move { client.list_evidence(&id).await });
    }

    pub fn poll(&mut self) {
        if let Some(result) = self.slot.poll() {
            self.apply(result);
        }
    }

    fn apply(&mut self, result: Result<Vec<EvidenceLink>, ApiError>) {
        match result {
            Ok(links) => self.links = LoadState::Loaded(links),
            Err(e) => {
                tracing::warn!(control = %self.control_id, "evidence fetch failed: {}", e);
                self.links = LoadState::Loaded(Vec::new());
            }
        }
    }

    pub fn in_flight(&self) -> bool {
        self.slot.in_flight()
    }

    fn visible(&self) -> &[EvidenceLink] {
        let links = self.links.loaded().map(Vec::as_slice).unwrap_or(&[]);
        &links[..links.len().min(INLINE_EVIDENCE_LIMIT)]
    }

    fn hidden_count(&self) -> usize {
        self.links
            .loaded()
            .map(|links| links.len().saturating_sub(INLINE_EVIDENCE_LIMIT))
            .unwrap_or(0)
    }

    pub fn ui(&mut self, ui: &mut Ui) {
        if self.links.is_loading() {
            ui.weak("Loading...");
            return;
        }
        if self.visible().is_empty() {
            ui.weak("No documents linked");
            return;
        }

        let mut follow: Option<String> = None;
        for link in self.visible() {
            ui.horizontal(|ui| {
                ui.small(display_filename(&link.filename));
                let color = tier_color(link.tier());
                ui.small(RichText::new("●").color(color))
                    .on_hover_text(format!(
                        "Confidence: {}% ({})",
                        (link.confidence * 100.0).round() as i64,
                        link.tier().label()
                    ));
                if ui.small_button("⬇").on_hover_text("Download").clicked() {
                    follow = Some(link.download_url.clone());
                }
            });
        }
        if self.hidden_count() > 0 {
            ui.small(
                RichText::new(more_documents_label(self.hidden_count()))
                    .color(Color32::from_rgb(22, 163, 74)),
            );
        }

        if let Some(url) = follow {
            let resolved = self.client.resolve_url(&url);
            if let Err(e) = open::that(resolved) {
                tracing::warn!("failed to open download link: {}", e);
            }
        }
    }
}

fn tier_color(tier: ConfidenceTier) -> Color32 {
    match tier {
        ConfidenceTier::High => Color32::from_rgb(34, 197, 94),
        ConfidenceTier::Medium => Color32::from_rgb(234, 179, 8),
        ConfidenceTier::Low => Color32::from_rgb(249, 115, 22),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_client() -> ApiClient {
        ApiClient::new("http://127.0.0.1:8000")
    }

    fn framework(id: &str) -> Framework {
        Framework {
            id: id.to_string(),
            name: "Essential Eight".to_string(),
            version: "v2".to_string(),
            description: String::new(),
            created_at: Utc::now(),
        }
    }

    fn control(id: &str, linked: u32) -> Control {
        Control {
            id: id.to_string(),
            code: format!("E8-{}", id),
            title: "Control".to_string(),
            description: String::new(),
            requirements_count: 1,
            linked_documents_count: linked,
            created_at: Utc::now(),
        }
    }

    fn link(id: &str, confidence: f64) -> EvidenceLink {
        EvidenceLink {
            id: id.to_string(),
            filename: format!("uploads/{}.pdf", id),
            mime_type: "application/pdf".to_string(),
            file_size: 1024,
            created_at: Utc::now(),
            download_url: format!("/documents/{}/download", id),
            confidence,
            reasoning: String::new(),
            link_created_at: Utc::now(),
        }
    }

    #[test]
    fn test_single_framework_auto_selects_and_fetches_controls() {
        let mut panel = ControlsPanel::new(test_client());
        panel.apply_frameworks(Ok(vec![framework("f1")]));

        assert_eq!(panel.selected(), Some("f1"));
        assert!(panel.controls.is_loading());
        assert!(panel.controls_slot.in_flight());
    }

    #[test]
    fn test_first_framework_wins_by_returned_order() {
        let mut panel = ControlsPanel::new(test_client());
        panel.apply_frameworks(Ok(vec![framework("f2"), framework("f1")]));
        assert_eq!(panel.selected(), Some("f2"));
    }

    #[test]
    fn test_in_flight_framework_fetch_shows_loading_not_empty_hint() {
        let mut panel = ControlsPanel::new(test_client());
        panel.ensure_started();

        // Frameworks are empty and no controls are loaded yet, but the
        // fetch has not settled: this is the loading state, not the
        // zero-results state.
        assert!(panel.frameworks.is_empty());
        assert!(matches!(panel.controls, LoadState::NeverLoaded));
        assert_eq!(panel.idle_hint(), IdleHint::LoadingFrameworks);
    }

    #[test]
    fn test_settled_empty_framework_fetch_shows_empty_hint() {
        let mut panel = ControlsPanel::new(test_client());
        panel.apply_frameworks(Ok(vec![]));
        assert_eq!(panel.idle_hint(), IdleHint::NoFrameworks);
    }

    #[test]
    fn test_empty_or_failed_framework_fetch_selects_nothing() {
        let mut panel = ControlsPanel::new(test_client());
        panel.apply_frameworks(Ok(vec![]));
        assert_eq!(panel.selected(), None);
        assert!(matches!(panel.controls, LoadState::NeverLoaded));

        let mut panel = ControlsPanel::new(test_client());
        panel.apply_frameworks(Err(ApiError::Status {
            status: services::StatusCode::INTERNAL_SERVER_ERROR,
            detail: None,
        }));
        assert_eq!(panel.selected(), None);
        assert!(matches!(panel.controls, LoadState::NeverLoaded));
    }

    #[test]
    fn test_changing_framework_replaces_controls_and_evidence() {
        let mut panel = ControlsPanel::new(test_client());
        panel.apply_frameworks(Ok(vec![framework("f1"), framework("f2")]));
        panel.apply_controls(Ok(vec![control("c1", 3)]));
        panel
            .evidence
            .insert("c1".to_string(), EvidenceSummary::new(test_client(), "c1".to_string()));

        panel.select_framework("f2");
        assert_eq!(panel.selected(), Some("f2"));
        assert!(panel.controls.is_loading());
        assert!(panel.evidence.is_empty());
    }

    #[test]
    fn test_reselecting_current_framework_is_a_noop() {
        let mut panel = ControlsPanel::new(test_client());
        panel.apply_frameworks(Ok(vec![framework("f1")]));
        panel.apply_controls(Ok(vec![control("c1", 0)]));

        panel.select_framework("f1");
        assert!(!panel.controls.is_loading(), "no refetch for same id");
    }

    #[test]
    fn test_failed_controls_fetch_shows_message_not_list() {
        let mut panel = ControlsPanel::new(test_client());
        panel.apply_frameworks(Ok(vec![framework("f1")]));
        panel.apply_controls(Err(ApiError::Status {
            status: services::StatusCode::BAD_GATEWAY,
            detail: None,
        }));
        assert!(matches!(panel.controls, LoadState::Failed(_)));
    }

    #[test]
    fn test_evidence_pruned_to_current_control_set() {
        let mut panel = ControlsPanel::new(test_client());
        panel
            .evidence
            .insert("gone".to_string(), EvidenceSummary::new(test_client(), "gone".to_string()));
        panel.apply_controls(Ok(vec![control("c1", 1)]));
        assert!(!panel.evidence.contains_key("gone"));
    }

    #[test]
    fn test_evidence_summary_caps_inline_links_at_two() {
        let mut summary = EvidenceSummary::new(test_client(), "c1".to_string());
        summary.apply(Ok(vec![link("d1", 0.9), link("d2", 0.7), link("d3", 0.5)]));

        assert_eq!(summary.visible().len(), 2);
        assert_eq!(summary.visible()[0].id, "d1");
        assert_eq!(summary.hidden_count(), 1);
        assert_eq!(more_documents_label(summary.hidden_count()), "+1 more document");
    }

    #[test]
    fn test_evidence_remainder_is_total_minus_two() {
        let mut summary = EvidenceSummary::new(test_client(), "c1".to_string());
        let links: Vec<EvidenceLink> = (0..7).map(|i| link(&format!("d{}", i), 0.8)).collect();
        summary.apply(Ok(links));
        assert_eq!(summary.hidden_count(), 5);
        assert_eq!(more_documents_label(summary.hidden_count()), "+5 more documents");
    }

    #[test]
    fn test_evidence_fetch_failure_degrades_to_empty() {
        let mut summary = EvidenceSummary::new(test_client(), "c1".to_string());
        summary.apply(Err(ApiError::Status {
            status: services::StatusCode::NOT_FOUND,
            detail: None,
        }));
        assert!(summary.visible().is_empty());
        assert_eq!(summary.hidden_count(), 0);
        assert!(!summary.links.is_loading());
    }

    #[test]
    fn test_two_links_show_no_remainder() {
        let mut summary = EvidenceSummary::new(test_client(), "c1".to_string());
        summary.apply(Ok(vec![link("d1", 0.9), link("d2", 0.61)]));
        assert_eq!(summary.visible().len(), 2);
        assert_eq!(summary.hidden_count(), 0);
    }
}
