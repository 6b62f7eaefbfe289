use tracing::debug;

use crate::catalog::{FeatureCatalog, FeatureId};

/// Matches the page's initial path against the catalog once it has loaded
#[derive(Debug, Clone)]
pub struct InitialSelectionResolver {
    slug: String,
}

impl InitialSelectionResolver {
    /// `path` is the raw URL path, e.g. `/altes-gymnasium` or `/st.-nikolai%20kirche`
    pub fn new(path: &str) -> Self {
        Self {
            slug: path_to_slug(path),
        }
    }

    /// Linear slug match; the first feature carrying the slug wins
    pub fn resolve(&self, catalog: &FeatureCatalog) -> Option<FeatureId> {
        if self.slug.is_empty() {
            return None;
        }
        let found = catalog
            .iter()
            .find(|(_, feature)| feature.slug() == self.slug)
            .map(|(id, _)| id);
        debug!(slug = self.slug.as_str(), ?found, "resolved initial path");
        found
    }
}

/// Percent-decode a URL path and drop its leading separator
pub fn path_to_slug(path: &str) -> String {
    let decoded = match urlencoding::decode(path) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => path.to_string(),
    };
    decoded
        .strip_prefix('/')
        .map(str::to_string)
        .unwrap_or(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_feature;

    fn catalog() -> FeatureCatalog {
        FeatureCatalog::new(vec![
            test_feature("phaenomenta", 1, 54.79, 9.44),
            test_feature("altes-gymnasium", 2, 54.78, 9.43),
            test_feature("altes-gymnasium", 3, 54.77, 9.42),
            test_feature("sankt-jürgen", 4, 54.80, 9.45),
        ])
    }

    #[test]
    fn test_path_to_slug() {
        assert_eq!(path_to_slug("/altes-gymnasium"), "altes-gymnasium");
        assert_eq!(path_to_slug("/sankt-j%C3%BCrgen"), "sankt-jürgen");
        assert_eq!(path_to_slug("/"), "");
        assert_eq!(path_to_slug(""), "");
    }

    #[test]
    fn test_resolve_first_match() {
        let resolver = InitialSelectionResolver::new("/altes-gymnasium");
        assert_eq!(resolver.resolve(&catalog()), Some(FeatureId(1)));
    }

    #[test]
    fn test_resolve_encoded_path() {
        let resolver = InitialSelectionResolver::new("/sankt-j%C3%BCrgen");
        assert_eq!(resolver.resolve(&catalog()), Some(FeatureId(3)));
    }

    #[test]
    fn test_resolve_miss_and_root() {
        assert_eq!(InitialSelectionResolver::new("/unbekannt").resolve(&catalog()), None);
        assert_eq!(InitialSelectionResolver::new("/").resolve(&catalog()), None);
    }
}
