use thiserror::Error;

/// Failure to retrieve bytes from a dataset or image source
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to read {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("request to {location} failed: {source}")]
    Http {
        location: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{location} returned http status code {status}")]
    Status { location: String, status: u16 },
}

/// Failure to turn a fetched dataset into a feature catalog
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("dataset is not valid JSON: {0}")]
    Json(#[from] simd_json::Error),

    #[error("dataset is not valid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),
}
