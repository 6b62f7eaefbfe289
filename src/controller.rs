use tracing::{debug, error, info, warn};

use crate::catalog::{FeatureCatalog, FeatureId, LatLng};
use crate::config::MapConfig;
use crate::detail::{DetailPanelRenderer, ImageRequester, ImageTicket};
use crate::error::LoadError;
use crate::fetch::ImageOutcome;
use crate::history::{HistoryBridge, HistoryEntry, HistoryPayload, NavigationSurface, Traversal};
use crate::map::Viewport;
use crate::marker::MarkerVisualState;
use crate::resolver::{path_to_slug, InitialSelectionResolver};

/// Which side panel is visible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    About,
    Details,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Unselected,
    Selected(FeatureId),
}

/// Owns the selection, the catalog and everything that has to follow the selection:
/// marker styles, viewport, side panel, detail content and navigation history.
pub struct SelectionController<N, R> {
    config: MapConfig,
    catalog: Option<FeatureCatalog>,
    markers: MarkerVisualState,
    viewport: Viewport,
    panel: Panel,
    detail: DetailPanelRenderer,
    history: HistoryBridge<N>,
    images: R,
    /// Navigation that arrived before the catalog finished loading
    deferred: Option<HistoryEntry>,
}

impl<N: NavigationSurface, R: ImageRequester> SelectionController<N, R> {
    pub fn new(config: MapConfig, surface: N, images: R, width: usize, height: usize) -> Self {
        Self {
            viewport: Viewport::from_config(&config, width, height),
            detail: DetailPanelRenderer::new(&config),
            config,
            catalog: None,
            markers: MarkerVisualState::default(),
            panel: Panel::About,
            history: HistoryBridge::new(surface),
            images,
            deferred: None,
        }
    }

    /// Install the catalog once the dataset fetch settles, then resolve the
    /// initial deep link (or replay a navigation that arrived earlier).
    pub fn on_catalog_loaded(&mut self, result: Result<FeatureCatalog, LoadError>) {
        let catalog = match result {
            Ok(catalog) => catalog,
            Err(e) => {
                error!("failed to load dataset: {}", e);
                FeatureCatalog::default()
            }
        };
        info!(features = catalog.len(), "feature catalog loaded");

        // clicks cannot precede this point, so no selection is lost
        self.markers = MarkerVisualState::new(catalog.len());
        self.catalog = Some(catalog);

        match self.deferred.take() {
            Some(entry) => self.apply_entry(entry),
            None => {
                let path = self.history.current_path().to_string();
                self.resolve_initial_selection(&path);
            }
        }
    }

    /// Select the feature named by `current_path` as if it had been clicked,
    /// without pushing a history entry. A miss leaves the current view alone.
    pub fn resolve_initial_selection(&mut self, current_path: &str) {
        let Some(catalog) = self.catalog.as_ref() else {
            debug!("initial selection requested before catalog load");
            return;
        };
        let Some(id) = InitialSelectionResolver::new(current_path).resolve(catalog) else {
            return;
        };
        if self.markers.selected() == Some(id) {
            return;
        }
        let Some(center) = catalog.get(id).map(|f| f.coordinate) else {
            return;
        };
        info!(path = current_path, "deep link resolved");
        self.show_feature(id, center);
    }

    /// User clicked the marker of `id` at `hint`
    pub fn handle_marker_click(&mut self, id: FeatureId, hint: LatLng) {
        let Some(slug) = self.feature_slug(id) else {
            debug!(?id, "click on unknown marker");
            return;
        };

        let zoom = if self.viewport.zoom < self.config.breakout_zoom {
            self.config.breakout_zoom
        } else {
            self.viewport.zoom
        };
        self.viewport.set_view(hint, zoom);

        self.detail.clear();
        self.panel = Panel::Details;
        self.markers.select(id);
        self.render_detail(id);

        debug!(slug = slug.as_str(), "marker clicked");
        self.history.record(HistoryPayload {
            slug,
            center: hint,
            zoom: self.viewport.zoom,
        });
    }

    /// Back/forward reached an entry; `None` is the root page
    pub fn handle_history_navigation(&mut self, entry: Option<&HistoryPayload>) {
        if self.catalog.is_none() {
            let path = match entry {
                Some(payload) => format!("/{}", payload.slug),
                None => self.history.current_path().to_string(),
            };
            debug!(path = path.as_str(), "deferring navigation until catalog load");
            self.deferred = Some(HistoryEntry {
                path,
                payload: entry.cloned(),
            });
            return;
        }

        match entry {
            Some(payload) => match self.find(&payload.slug) {
                Some(id) => self.show_feature(id, payload.center),
                None => {
                    warn!(slug = payload.slug.as_str(), "history entry names an unknown feature");
                    self.show_root();
                }
            },
            None => self.show_root(),
        }
    }

    /// Step through history and apply the reached entry. Returns false at either end.
    pub fn navigate(&mut self, direction: Traversal) -> bool {
        match self.history.traverse(direction) {
            Some(entry) => {
                self.apply_entry(entry);
                true
            }
            None => false,
        }
    }

    /// Route an image response to the detail panel if it still belongs to the selection
    pub fn on_image_loaded(&mut self, ticket: ImageTicket, outcome: ImageOutcome) {
        if self.markers.selected() != Some(ticket.feature) {
            debug!(?ticket, "image response for a feature that is no longer selected");
            return;
        }
        self.detail.accept_image(ticket, outcome, &self.config);
    }

    fn apply_entry(&mut self, entry: HistoryEntry) {
        if self.catalog.is_none() {
            self.deferred = Some(entry);
            return;
        }
        match entry.payload {
            Some(payload) => self.handle_history_navigation(Some(&payload)),
            // the page's initial entry may itself be a deep link
            None => match self.find(&path_to_slug(&entry.path)) {
                Some(id) => {
                    let center = self
                        .catalog
                        .as_ref()
                        .and_then(|c| c.get(id))
                        .map(|f| f.coordinate)
                        .unwrap_or(self.config.center);
                    self.show_feature(id, center);
                }
                None => self.handle_history_navigation(None),
            },
        }
    }

    fn show_feature(&mut self, id: FeatureId, center: LatLng) {
        self.panel = Panel::Details;
        self.viewport.set_view(center, self.config.close_up_zoom);
        self.markers.select(id);
        self.render_detail(id);
    }

    fn show_root(&mut self) {
        self.panel = Panel::About;
        self.viewport.set_view(self.config.center, self.config.default_zoom);
        self.markers.deselect_all();
        self.detail.clear();
        self.detail.reset_meta(&self.config);
    }

    fn render_detail(&mut self, id: FeatureId) {
        let Some(feature) = self.catalog.as_ref().and_then(|c| c.get(id)) else {
            return;
        };
        self.detail.render(id, feature, &mut self.images, &self.config);
    }

    fn find(&self, slug: &str) -> Option<FeatureId> {
        self.catalog.as_ref().and_then(|c| c.find_by_slug(slug))
    }

    fn feature_slug(&self, id: FeatureId) -> Option<String> {
        self.catalog
            .as_ref()
            .and_then(|c| c.get(id))
            .map(|f| f.slug().to_string())
    }

    pub fn selection(&self) -> SelectionState {
        match self.markers.selected() {
            Some(id) => SelectionState::Selected(id),
            None => SelectionState::Unselected,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.catalog.is_some()
    }

    pub fn catalog(&self) -> Option<&FeatureCatalog> {
        self.catalog.as_ref()
    }

    pub fn markers(&self) -> &MarkerVisualState {
        &self.markers
    }

    pub fn panel(&self) -> Panel {
        self.panel
    }

    pub fn detail(&self) -> &DetailPanelRenderer {
        &self.detail
    }

    pub fn detail_mut(&mut self) -> &mut DetailPanelRenderer {
        &mut self.detail
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn history(&self) -> &HistoryBridge<N> {
        &self.history
    }

    pub fn current_path(&self) -> &str {
        self.history.current_path()
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Return to the default view without touching the selection
    pub fn reset_view(&mut self) {
        self.viewport.set_view(self.config.center, self.config.default_zoom);
    }
}
