//! View panels. Each panel owns its full fetch lifecycle and local state;
//! no panel talks to another directly. The only cross-panel coupling is
//! the app-level refresh serial the upload widget bumps and the document
//! list watches.

pub mod controls;
pub mod documents;
pub mod upload;

pub use controls::ControlsPanel;
pub use documents::DocumentsPanel;
pub use upload::UploadWidget;

/// Render state for a fetched collection. `NeverLoaded` is distinct from
/// an empty `Loaded` so the UI can tell "nothing fetched yet" from
/// "fetched, zero results".
#[derive(Debug)]
pub enum LoadState<T> {
    NeverLoaded,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn loaded_mut(&mut self) -> Option<&mut T> {
        match self {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }
}
