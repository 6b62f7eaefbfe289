use std::path::PathBuf;

use clap::Parser;

use crate::catalog::LatLng;

/// Command line options
#[derive(Debug, Parser)]
#[command(name = "kulturnacht-map", version, about = "Kulturnacht Flensburg venue map")]
pub struct Args {
    /// GeoJSON feature collection of venues (local path or http(s) URL)
    #[arg(long, default_value = "data/kulturnacht-flensburg.geojson")]
    pub dataset: String,

    /// Optional GeoJSON city boundary drawn under the markers
    #[arg(long)]
    pub boundary: Option<PathBuf>,

    /// Initial URL path, e.g. `/altes-gymnasium`, used as a deep link
    #[arg(long, default_value = "/")]
    pub path: String,

    /// Public base URL used for sharable links
    #[arg(long, default_value = "https://kulturnacht.oklabflensburg.de/")]
    pub base_url: String,

    /// Directory for log files (the terminal is reserved for the map)
    #[arg(long, default_value = "logs")]
    pub log_dir: PathBuf,
}

/// Axis-aligned geographic bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Bounds {
    pub fn clamp(&self, point: LatLng) -> LatLng {
        LatLng::new(
            point.lat.clamp(self.south_west.lat, self.north_east.lat),
            point.lon.clamp(self.south_west.lon, self.north_east.lon),
        )
    }
}

/// View and page constants for the map
#[derive(Debug, Clone)]
pub struct MapConfig {
    pub center: LatLng,
    pub bounds: Bounds,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom of the default "about" view
    pub default_zoom: f64,
    /// Below this zoom a marker click zooms in to it
    pub breakout_zoom: f64,
    /// Zoom used when a feature is restored from history or a deep link
    pub close_up_zoom: f64,
    pub site_name: String,
    pub image_caption: String,
    pub base_url: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: LatLng::new(54.792023881765154, 9.435979166343026),
            bounds: Bounds {
                south_west: LatLng::new(54.75187298885215, 9.357220591547652),
                north_east: LatLng::new(54.837075243318516, 9.50671528322748),
            },
            min_zoom: 12.0,
            max_zoom: 18.0,
            default_zoom: 13.0,
            breakout_zoom: 15.0,
            close_up_zoom: 19.0,
            site_name: "Kulturnacht Flensburg".to_string(),
            image_caption: "Foto Kulturnacht Flensburg".to_string(),
            base_url: "https://kulturnacht.oklabflensburg.de/".to_string(),
        }
    }
}

impl MapConfig {
    pub fn from_args(args: &Args) -> Self {
        Self {
            base_url: args.base_url.clone(),
            ..Self::default()
        }
    }
}
