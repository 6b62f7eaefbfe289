use std::fs;
use std::path::Path;

use anyhow::Result;
use geojson::{GeoJson, Geometry, Value};
use tracing::info;

use crate::catalog::FeatureCatalog;
use crate::error::LoadError;
use crate::fetch::{fetch_bytes, Source};
use crate::map::MapRenderer;

/// Fetch and parse the venue dataset. Blocking; runs on the worker pool.
pub fn load_catalog(source: &Source) -> Result<FeatureCatalog, LoadError> {
    let mut bytes = fetch_bytes(source)?;
    let catalog = FeatureCatalog::from_geojson_bytes(&mut bytes)?;
    info!(source = %source.location(), features = catalog.len(), "dataset fetched");
    Ok(catalog)
}

/// Load the city boundary outline into the map renderer
pub fn load_boundary(renderer: &mut MapRenderer, path: &Path) -> Result<()> {
    let content = fs::read_to_string(path)?;
    let geojson: GeoJson = content.parse()?;
    process_geojson_lines(&geojson, |line| renderer.add_boundary(line));
    info!(path = %path.display(), rings = renderer.boundary.len(), "boundary loaded");
    Ok(())
}

/// Process GeoJSON and extract line features
fn process_geojson_lines<F>(geojson: &GeoJson, mut add_line: F)
where
    F: FnMut(Vec<(f64, f64)>),
{
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in &fc.features {
                if let Some(ref geometry) = feature.geometry {
                    process_geometry_lines(geometry, &mut add_line);
                }
            }
        }
        GeoJson::Feature(f) => {
            if let Some(ref geometry) = f.geometry {
                process_geometry_lines(geometry, &mut add_line);
            }
        }
        GeoJson::Geometry(geometry) => {
            process_geometry_lines(geometry, &mut add_line);
        }
    }
}

/// Every ring of a polygon is drawn: a city mask is a world polygon whose
/// holes are the actual city outline.
fn process_geometry_lines<F>(geometry: &Geometry, add_line: &mut F)
where
    F: FnMut(Vec<(f64, f64)>),
{
    let to_line = |coords: &Vec<Vec<f64>>| -> Vec<(f64, f64)> {
        coords.iter().filter(|c| c.len() >= 2).map(|c| (c[0], c[1])).collect()
    };

    match &geometry.value {
        Value::LineString(coords) => add_line(to_line(coords)),
        Value::MultiLineString(lines) => lines.iter().for_each(|l| add_line(to_line(l))),
        Value::Polygon(rings) => rings.iter().for_each(|r| add_line(to_line(r))),
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                rings.iter().for_each(|r| add_line(to_line(r)));
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                process_geometry_lines(g, add_line);
            }
        }
        _ => {}
    }
}
