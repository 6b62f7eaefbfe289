use crate::braille::BrailleCanvas;
use crate::catalog::{FeatureCatalog, FeatureId};
use crate::map::geometry::{clip_segment, draw_line};
use crate::map::projection::Viewport;
use crate::marker::{MarkerStyle, MarkerVisualState};

/// A geographic line (sequence of lon/lat coordinates)
pub type LineString = Vec<(f64, f64)>;

/// Display settings for map layers
#[derive(Clone, Debug)]
pub struct DisplaySettings {
    pub show_boundary: bool,
    pub show_markers: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_boundary: true,
            show_markers: true,
        }
    }
}

/// A marker label placed in character cells
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedMarker {
    pub id: FeatureId,
    pub col: u16,
    pub row: u16,
    pub label: String,
    pub style: MarkerStyle,
}

impl PlacedMarker {
    /// Whether the character cell (col, row) lies on this label, with one cell of slack on the left
    pub fn covers(&self, col: u16, row: u16) -> bool {
        let start = self.col.saturating_sub(1);
        let end = self.col + self.label.chars().count() as u16;
        row == self.row && col >= start && col <= end
    }
}

/// Boundary outlines and venue markers
#[derive(Default)]
pub struct MapRenderer {
    pub boundary: Vec<LineString>,
    pub settings: DisplaySettings,
}

impl MapRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the boundary outline onto the canvas
    pub fn render(&self, canvas: &mut BrailleCanvas, viewport: &Viewport) {
        if !self.settings.show_boundary {
            return;
        }
        for line in &self.boundary {
            self.draw_linestring(canvas, line, viewport);
        }
    }

    /// Draw a linestring with viewport culling
    fn draw_linestring(&self, canvas: &mut BrailleCanvas, line: &LineString, viewport: &Viewport) {
        if line.len() < 2 {
            return;
        }

        let mut prev: Option<(i32, i32)> = None;

        for &(lon, lat) in line {
            let (px, py) = viewport.project(lon, lat);

            if let Some((prev_x, prev_y)) = prev {
                if viewport.line_might_be_visible((prev_x, prev_y), (px, py)) {
                    if let Some(((x0, y0), (x1, y1))) =
                        clip_segment((prev_x, prev_y), (px, py), viewport.width, viewport.height)
                    {
                        draw_line(canvas, x0, y0, x1, y1);
                    }
                }
            }

            prev = Some((px, py));
        }
    }

    /// Place the event-id labels of all visible markers.
    /// The selected marker comes last so it is drawn on top.
    pub fn place_markers(
        &self,
        catalog: &FeatureCatalog,
        markers: &MarkerVisualState,
        viewport: &Viewport,
    ) -> Vec<PlacedMarker> {
        if !self.settings.show_markers {
            return Vec::new();
        }

        let mut placed: Vec<PlacedMarker> = catalog
            .iter()
            .filter_map(|(id, feature)| {
                let (px, py) = viewport.project(feature.coordinate.lon, feature.coordinate.lat);
                if !viewport.is_visible(px, py) {
                    return None;
                }
                let label = feature.event_id().to_string();
                let half = (label.len() / 2) as i32;
                let col = ((px / 2) - half).max(0) as u16;
                let row = (py / 4) as u16;
                Some(PlacedMarker {
                    id,
                    col,
                    row,
                    label,
                    style: markers.style_of(id),
                })
            })
            .collect();

        placed.sort_by_key(|m| m.style == MarkerStyle::Selected);
        placed
    }

    /// Topmost marker under the character cell (col, row)
    pub fn hit_test(placed: &[PlacedMarker], col: u16, row: u16) -> Option<FeatureId> {
        placed.iter().rev().find(|m| m.covers(col, row)).map(|m| m.id)
    }

    /// Add a boundary outline
    pub fn add_boundary(&mut self, line: LineString) {
        self.boundary.push(line);
    }

    /// Toggle boundary outline
    pub fn toggle_boundary(&mut self) {
        self.settings.show_boundary = !self.settings.show_boundary;
    }

    /// Toggle markers
    pub fn toggle_markers(&mut self) {
        self.settings.show_markers = !self.settings.show_markers;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_feature;
    use crate::config::MapConfig;

    fn setup() -> (FeatureCatalog, MarkerVisualState, Viewport) {
        let config = MapConfig::default();
        let catalog = FeatureCatalog::new(vec![
            test_feature("zentrum", 12, config.center.lat, config.center.lon),
            test_feature("weit-weg", 3, 10.0, 10.0),
        ]);
        let markers = MarkerVisualState::new(catalog.len());
        let viewport = Viewport::from_config(&config, 200, 100);
        (catalog, markers, viewport)
    }

    #[test]
    fn test_place_markers_culls_invisible() {
        let (catalog, markers, viewport) = setup();
        let placed = MapRenderer::new().place_markers(&catalog, &markers, &viewport);
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].label, "12");
        // centered label at braille (100, 50) -> cell (50, 12), shifted left by one
        assert_eq!((placed[0].col, placed[0].row), (49, 12));
    }

    #[test]
    fn test_hit_test() {
        let (catalog, markers, viewport) = setup();
        let placed = MapRenderer::new().place_markers(&catalog, &markers, &viewport);
        assert_eq!(MapRenderer::hit_test(&placed, 50, 12), Some(FeatureId(0)));
        assert_eq!(MapRenderer::hit_test(&placed, 48, 12), Some(FeatureId(0)));
        assert_eq!(MapRenderer::hit_test(&placed, 50, 13), None);
        assert_eq!(MapRenderer::hit_test(&placed, 60, 12), None);
    }

    #[test]
    fn test_selected_marker_on_top() {
        let config = MapConfig::default();
        let catalog = FeatureCatalog::new(vec![
            test_feature("a", 1, config.center.lat, config.center.lon),
            test_feature("b", 2, config.center.lat, config.center.lon),
        ]);
        let mut markers = MarkerVisualState::new(2);
        markers.select(FeatureId(0));
        let viewport = Viewport::from_config(&config, 200, 100);

        let placed = MapRenderer::new().place_markers(&catalog, &markers, &viewport);
        assert_eq!(placed.last().map(|m| m.id), Some(FeatureId(0)));
        assert_eq!(MapRenderer::hit_test(&placed, 50, 12), Some(FeatureId(0)));
    }
}
