use glam::DVec2;
use std::f64::consts::PI;

use crate::catalog::LatLng;
use crate::config::{Bounds, MapConfig};

/// Braille pixels spanned by one map tile at integer zoom levels
const TILE_SIZE: f64 = 64.0;

/// Viewport representing the visible map area and zoom level
#[derive(Clone, Debug)]
pub struct Viewport {
    /// Center longitude
    pub center_lon: f64,
    /// Center latitude
    pub center_lat: f64,
    /// Web-map zoom level (each step doubles the scale)
    pub zoom: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
    min_zoom: f64,
    max_zoom: f64,
    bounds: Bounds,
}

impl Viewport {
    /// Default view of the configured map, sized to the given pixel canvas
    pub fn from_config(config: &MapConfig, width: usize, height: usize) -> Self {
        let mut vp = Self {
            center_lon: config.center.lon,
            center_lat: config.center.lat,
            zoom: config.default_zoom,
            width,
            height,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            bounds: config.bounds,
        };
        vp.set_view(config.center, config.default_zoom);
        vp
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(self.center_lat, self.center_lon)
    }

    /// Move to `center` at `zoom`, clamped to the map's bounds and zoom range
    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        let center = self.bounds.clamp(center);
        self.center_lat = center.lat;
        self.center_lon = center.lon;
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Pan the viewport by pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let offset = DVec2::new(dx as f64, dy as f64) / self.world_size();
        let center = mercator(self.center_lon, self.center_lat) + offset;
        let (lon, lat) = inverse_mercator(center);
        self.set_view(LatLng::new(lat, lon), self.zoom);
    }

    /// Zoom in one level
    pub fn zoom_in(&mut self) {
        self.set_view(self.center(), self.zoom + 1.0);
    }

    /// Zoom out one level
    pub fn zoom_out(&mut self) {
        self.set_view(self.center(), self.zoom - 1.0);
    }

    /// Zoom in towards a specific pixel location
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0);
    }

    /// Zoom out from a specific pixel location
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, -1.0);
    }

    /// Zoom by `step` levels keeping the point under (px, py) fixed
    fn zoom_at(&mut self, px: i32, py: i32, step: f64) {
        let (lon, lat) = self.unproject(px, py);

        self.set_view(self.center(), self.zoom + step);

        let (new_px, new_py) = self.project(lon, lat);
        self.pan(new_px - px, new_py - py);
    }

    /// Size of the whole world in pixels at the current zoom
    fn world_size(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.zoom)
    }

    /// Unproject pixel coordinates back to geographic coordinates (lon, lat)
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let offset = DVec2::new(
            px as f64 - self.width as f64 / 2.0,
            py as f64 - self.height as f64 / 2.0,
        );
        let point = mercator(self.center_lon, self.center_lat) + offset / self.world_size();
        inverse_mercator(point)
    }

    /// Project a geographic coordinate (lon, lat) to pixel coordinates
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let delta =
            (mercator(lon, lat) - mercator(self.center_lon, self.center_lat)) * self.world_size();
        let px = (delta.x + self.width as f64 / 2.0).round() as i32;
        let py = (delta.y + self.height as f64 / 2.0).round() as i32;
        (px, py)
    }

    /// Check if a projected point is visible in the viewport
    pub fn is_visible(&self, px: i32, py: i32) -> bool {
        px >= 0 && px < self.width as i32 && py >= 0 && py < self.height as i32
    }

    /// Check if a line segment might be visible (rough bounding box check)
    pub fn line_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        let min_x = p1.0.min(p2.0);
        let max_x = p1.0.max(p2.0);
        let min_y = p1.1.min(p2.1);
        let max_y = p1.1.max(p2.1);

        max_x >= 0
            && min_x < self.width as i32
            && max_y >= 0
            && min_y < self.height as i32
    }
}

/// Web Mercator, normalized to [0, 1] on both axes
fn mercator(lon: f64, lat: f64) -> DVec2 {
    let lat_rad = lat.to_radians();
    DVec2::new(
        (lon + 180.0) / 360.0,
        (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0,
    )
}

fn inverse_mercator(point: DVec2) -> (f64, f64) {
    let lon = point.x * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * point.y)).sinh().atan().to_degrees();
    (lon, lat)
}
