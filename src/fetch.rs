use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::FetchError;

/// Where a dataset or image is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Remote(String),
    Local(PathBuf),
}

impl Source {
    /// Classify a location string. Relative local paths resolve against `base_dir`.
    pub fn parse(location: &str, base_dir: Option<&Path>) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            return Source::Remote(location.to_string());
        }
        let path = Path::new(location);
        match base_dir {
            Some(base) if path.is_relative() => Source::Local(base.join(path)),
            _ => Source::Local(path.to_path_buf()),
        }
    }

    pub fn location(&self) -> String {
        match self {
            Source::Remote(url) => url.clone(),
            Source::Local(path) => path.display().to_string(),
        }
    }

    /// Directory that relative references inside this source resolve against
    pub fn base_dir(&self) -> Option<&Path> {
        match self {
            Source::Local(path) => path.parent(),
            Source::Remote(_) => None,
        }
    }
}

/// Read all bytes of a source. Blocking; run it off the event loop.
pub fn fetch_bytes(source: &Source) -> Result<Vec<u8>, FetchError> {
    match source {
        Source::Local(path) => fs::read(path).map_err(|e| FetchError::Io {
            location: source.location(),
            source: e,
        }),
        Source::Remote(url) => {
            let http_err = |e| FetchError::Http {
                location: url.clone(),
                source: e,
            };
            let response = reqwest::blocking::get(url).map_err(http_err)?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    location: url.clone(),
                    status: status.as_u16(),
                });
            }
            let bytes = response.bytes().map_err(http_err)?;
            debug!(url = url.as_str(), len = bytes.len(), "fetched remote source");
            Ok(bytes.to_vec())
        }
    }
}

/// Image bytes returned by a successful load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub bytes: Vec<u8>,
    pub alt: String,
}

/// Result of one image request. Neither variant is an error to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    Loaded(ImageData),
    NotOk { location: String, status: u16 },
    Failed(String),
}

/// External image-loading collaborator
pub trait ImageLoader: Send + Sync {
    fn load(&self, url: &str, alt: &str) -> ImageOutcome;
}

/// Loads images from http(s) URLs or from disk next to the dataset
pub struct SourceImageLoader {
    base_dir: Option<PathBuf>,
}

impl SourceImageLoader {
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }
}

impl ImageLoader for SourceImageLoader {
    fn load(&self, url: &str, alt: &str) -> ImageOutcome {
        let source = Source::parse(url, self.base_dir.as_deref());
        match fetch_bytes(&source) {
            Ok(bytes) => ImageOutcome::Loaded(ImageData {
                bytes,
                alt: alt.to_string(),
            }),
            Err(FetchError::Status { location, status }) => {
                ImageOutcome::NotOk { location, status }
            }
            Err(e) => ImageOutcome::Failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_remote() {
        assert_eq!(
            Source::parse("https://example.org/a.webp", Some(Path::new("/data"))),
            Source::Remote("https://example.org/a.webp".to_string())
        );
    }

    #[test]
    fn test_parse_relative_local() {
        assert_eq!(
            Source::parse("images/a.webp", Some(Path::new("/data"))),
            Source::Local(PathBuf::from("/data/images/a.webp"))
        );
        assert_eq!(
            Source::parse("/abs/a.webp", Some(Path::new("/data"))),
            Source::Local(PathBuf::from("/abs/a.webp"))
        );
    }

    #[test]
    fn test_load_local_image() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = fs::File::create(dir.path().join("a.webp")).unwrap();
        file.write_all(b"RIFF").unwrap();

        let loader = SourceImageLoader::new(Some(dir.path().to_path_buf()));
        match loader.load("a.webp", "Chorkonzert") {
            ImageOutcome::Loaded(data) => {
                assert_eq!(data.bytes, b"RIFF");
                assert_eq!(data.alt, "Chorkonzert");
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_missing_image_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let loader = SourceImageLoader::new(Some(dir.path().to_path_buf()));
        assert!(matches!(loader.load("missing.webp", "x"), ImageOutcome::Failed(_)));
    }
}
