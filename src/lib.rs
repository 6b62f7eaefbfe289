//! Terminal venue map for the Kulturnacht Flensburg.
//!
//! Venues come from a GeoJSON feature collection. Selecting a marker opens its
//! program in the side panel and records a `/{slug}` history entry, so back and
//! forward replay earlier selections and a start path deep-links into a venue.

pub mod app;
pub mod braille;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod data;
pub mod detail;
pub mod error;
pub mod fetch;
pub mod history;
pub mod logging;
pub mod map;
pub mod marker;
pub mod resolver;
pub mod tasks;
pub mod ui;
