use ratatui::layout::Rect;
use tracing::debug;

use crate::catalog::FeatureId;
use crate::config::MapConfig;
use crate::controller::{Panel, SelectionController, SelectionState};
use crate::history::{SessionHistory, Traversal};
use crate::map::{MapRenderer, PlacedMarker};
use crate::tasks::{AppEvent, PoolImageRequester};
use crate::ui;

/// Application state
pub struct App {
    pub controller: SelectionController<SessionHistory, PoolImageRequester>,
    pub map_renderer: MapRenderer,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Current mouse position for hover tooltips
    pub mouse_pos: Option<(u16, u16)>,
    /// Marker reached with Tab / Shift-Tab
    pub focus: Option<FeatureId>,
    /// Set once a press turned into a drag, so release does not count as a click
    dragged: bool,
    map_area: Rect,
}

impl App {
    pub fn new(
        config: MapConfig,
        initial_path: &str,
        images: PoolImageRequester,
        width: u16,
        height: u16,
    ) -> Self {
        let map_area = ui::map_inner(Rect::new(0, 0, width, height));
        let controller = SelectionController::new(
            config,
            SessionHistory::new(initial_path),
            images,
            map_area.width as usize * 2,
            map_area.height as usize * 4,
        );

        Self {
            controller,
            map_renderer: MapRenderer::new(),
            should_quit: false,
            last_mouse: None,
            mouse_pos: None,
            focus: None,
            dragged: false,
            map_area,
        }
    }

    /// Update viewport size when terminal resizes
    pub fn resize(&mut self, width: u16, height: u16) {
        self.map_area = ui::map_inner(Rect::new(0, 0, width, height));
        let viewport = self.controller.viewport_mut();
        viewport.width = self.map_area.width as usize * 2;
        viewport.height = self.map_area.height as usize * 4;
    }

    /// Apply the result of background work
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::CatalogLoaded(result) => self.controller.on_catalog_loaded(result),
            AppEvent::ImageLoaded { ticket, outcome } => {
                self.controller.on_image_loaded(ticket, outcome)
            }
        }
    }

    /// Convert a terminal position to a cell inside the map, if it is on the map
    fn map_cell(&self, col: u16, row: u16) -> Option<(u16, u16)> {
        let area = self.map_area;
        if col < area.x
            || row < area.y
            || col >= area.x + area.width
            || row >= area.y + area.height
        {
            return None;
        }
        Some((col - area.x, row - area.y))
    }

    /// Marker labels for the current view
    pub fn placed_markers(&self) -> Vec<PlacedMarker> {
        match self.controller.catalog() {
            Some(catalog) => self.map_renderer.place_markers(
                catalog,
                self.controller.markers(),
                self.controller.viewport(),
            ),
            None => Vec::new(),
        }
    }

    /// Marker under a terminal position
    pub fn marker_at(&self, col: u16, row: u16) -> Option<FeatureId> {
        let (cx, cy) = self.map_cell(col, row)?;
        MapRenderer::hit_test(&self.placed_markers(), cx, cy)
    }

    /// Left click at a terminal position; a hit counts as a marker click
    pub fn click_at(&mut self, col: u16, row: u16) {
        if let Some(id) = self.marker_at(col, row) {
            self.click_marker(id);
        }
    }

    fn click_marker(&mut self, id: FeatureId) {
        let Some(hint) = self
            .controller
            .catalog()
            .and_then(|c| c.get(id))
            .map(|f| f.coordinate)
        else {
            return;
        };
        self.focus = Some(id);
        self.controller.handle_marker_click(id, hint);
    }

    /// Event title of the marker under the mouse
    pub fn hovered_title(&self) -> Option<&str> {
        let (col, row) = self.mouse_pos?;
        let id = self.marker_at(col, row)?;
        self.controller
            .catalog()
            .and_then(|c| c.get(id))
            .map(|f| f.properties.event_title.as_str())
    }

    /// Move keyboard focus to the next marker in event-id order
    pub fn focus_next(&mut self) {
        self.cycle_focus(true);
    }

    /// Move keyboard focus to the previous marker in event-id order
    pub fn focus_prev(&mut self) {
        self.cycle_focus(false);
    }

    fn cycle_focus(&mut self, forward: bool) {
        let Some(catalog) = self.controller.catalog() else {
            return;
        };
        let mut order: Vec<(u32, FeatureId)> =
            catalog.iter().map(|(id, f)| (f.event_id(), id)).collect();
        if order.is_empty() {
            return;
        }
        order.sort();

        let current = self
            .focus
            .and_then(|focus| order.iter().position(|&(_, id)| id == focus));
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => order.len() - 1,
            (Some(i), true) => (i + 1) % order.len(),
            (Some(i), false) => (i + order.len() - 1) % order.len(),
        };
        self.focus = Some(order[next].1);
        debug!(focus = ?self.focus, "marker focus moved");
    }

    /// Enter on the focused marker behaves like clicking it
    pub fn activate_focus(&mut self) {
        if let Some(id) = self.focus {
            self.click_marker(id);
        }
    }

    /// Browser-style back/forward
    pub fn navigate(&mut self, direction: Traversal) {
        if self.controller.navigate(direction) {
            self.focus = match self.controller.selection() {
                SelectionState::Selected(id) => Some(id),
                SelectionState::Unselected => None,
            };
        }
    }

    /// Pan the map
    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.controller.viewport_mut().pan(dx, dy);
    }

    /// Zoom in
    pub fn zoom_in(&mut self) {
        self.controller.viewport_mut().zoom_in();
    }

    /// Zoom out
    pub fn zoom_out(&mut self) {
        self.controller.viewport_mut().zoom_out();
    }

    /// Zoom in towards a screen position (terminal column/row)
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.pixel_pos(col, row) {
            self.controller.viewport_mut().zoom_in_at(px, py);
        }
    }

    /// Zoom out from a screen position (terminal column/row)
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.pixel_pos(col, row) {
            self.controller.viewport_mut().zoom_out_at(px, py);
        }
    }

    /// Braille pixel position of a terminal cell inside the map
    fn pixel_pos(&self, col: u16, row: u16) -> Option<(i32, i32)> {
        self.map_cell(col, row)
            .map(|(cx, cy)| (cx as i32 * 2, cy as i32 * 4))
    }

    /// Scroll the side panel
    pub fn scroll_panel(&mut self, delta: i16) {
        let detail = self.controller.detail_mut();
        detail.scroll = detail.scroll.saturating_add_signed(delta);
    }

    /// Left button pressed
    pub fn press(&mut self, col: u16, row: u16) {
        self.last_mouse = Some((col, row));
        self.dragged = false;
    }

    /// Handle mouse drag
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - x as i32;
            let dy = last_y as i32 - y as i32;
            if dx != 0 || dy != 0 {
                self.dragged = true;
                // one cell is 2x4 braille pixels
                self.pan(dx * 2, dy * 4);
            }
        }
        self.last_mouse = Some((x, y));
    }

    /// Left button released; a press without drag is a click
    pub fn release(&mut self, col: u16, row: u16) {
        if self.last_mouse.is_some() && !self.dragged {
            self.click_at(col, row);
        }
        self.last_mouse = None;
        self.dragged = false;
    }

    /// Update mouse cursor position
    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn panel(&self) -> Panel {
        self.controller.panel()
    }

    /// Get current zoom level as a string
    pub fn zoom_level(&self) -> String {
        format!("z{:.0}", self.controller.viewport().zoom)
    }

    /// Get current center coordinates as a string
    pub fn center_coords(&self) -> String {
        let vp = self.controller.viewport();
        format!(
            "{:.4}°{}, {:.4}°{}",
            vp.center_lat.abs(),
            if vp.center_lat >= 0.0 { "N" } else { "S" },
            vp.center_lon.abs(),
            if vp.center_lon >= 0.0 { "E" } else { "W" }
        )
    }
}
