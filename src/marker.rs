use tracing::debug;

use crate::catalog::FeatureId;

/// Visual style of a venue marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerStyle {
    #[default]
    Default,
    Selected,
}

/// Per-marker styles with a single selected slot.
///
/// Every style change goes through [`MarkerVisualState::apply_style`], and only
/// `select`/`deselect_all` call it with `Selected`, so at most one marker is
/// ever styled as selected.
#[derive(Debug, Default)]
pub struct MarkerVisualState {
    styles: Vec<MarkerStyle>,
    selected: Option<FeatureId>,
}

impl MarkerVisualState {
    pub fn new(marker_count: usize) -> Self {
        Self {
            styles: vec![MarkerStyle::Default; marker_count],
            selected: None,
        }
    }

    /// Mark `id` as selected, reverting the previous selection first
    pub fn select(&mut self, id: FeatureId) {
        if id.0 >= self.styles.len() {
            debug!(?id, "ignoring selection of unknown marker");
            return;
        }
        if self.selected == Some(id) {
            return;
        }
        self.deselect_all();
        self.apply_style(id, MarkerStyle::Selected);
        self.selected = Some(id);
    }

    pub fn deselect_all(&mut self) {
        if let Some(prev) = self.selected.take() {
            self.apply_style(prev, MarkerStyle::Default);
        }
    }

    pub fn selected(&self) -> Option<FeatureId> {
        self.selected
    }

    pub fn style_of(&self, id: FeatureId) -> MarkerStyle {
        self.styles.get(id.0).copied().unwrap_or_default()
    }

    /// Number of markers currently drawn with the selected style
    pub fn selected_count(&self) -> usize {
        self.styles
            .iter()
            .filter(|s| **s == MarkerStyle::Selected)
            .count()
    }

    fn apply_style(&mut self, id: FeatureId, style: MarkerStyle) {
        if let Some(slot) = self.styles.get_mut(id.0) {
            *slot = style;
        }
    }
}
