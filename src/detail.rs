//! Detail panel content and page metadata for the selected venue.
//!
//! Rendering is synchronous except for the venue image, which is requested
//! through an [`ImageRequester`] and attached later by [`DetailPanelRenderer::accept_image`].
//! Every request carries an [`ImageTicket`]; a response is only attached while
//! its ticket is still the panel's pending one, so a slow image for a venue the
//! user already left never shows up next to another venue.

use tracing::{debug, error};
use url::Url;

use crate::catalog::{Feature, FeatureId};
use crate::config::MapConfig;
use crate::fetch::{ImageData, ImageOutcome};

/// Document title plus the two link-preview fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMeta {
    pub title: String,
    pub og_title: String,
    pub og_url: String,
}

impl PageMeta {
    /// Metadata of the root "about" page
    pub fn site_default(config: &MapConfig) -> Self {
        Self {
            title: config.site_name.clone(),
            og_title: config.site_name.clone(),
            og_url: config.base_url.clone(),
        }
    }

    pub fn for_feature(feature: &Feature, config: &MapConfig) -> Self {
        let title = format!("{} - {}", capitalize_slug(feature.slug()), config.site_name);
        Self {
            og_title: title.clone(),
            og_url: share_url(&config.base_url, feature.slug()),
            title,
        }
    }
}

/// Language marker for a description block shown next to another language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    German,
    Danish,
}

impl Language {
    pub fn label(self) -> &'static str {
        match self {
            Language::German => "[deutsch]",
            Language::Danish => "[dansk]",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionBlock {
    pub language: Option<Language>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityBlock {
    pub title: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueLink {
    pub label: String,
    pub url: String,
}

/// Everything the detail panel shows for one venue, image excluded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailContent {
    pub feature: FeatureId,
    pub badge: u32,
    pub venue_name: String,
    pub event_title: String,
    pub tags: String,
    pub address: [String; 2],
    pub descriptions: Vec<DescriptionBlock>,
    pub opening_hours: String,
    pub activity: Option<ActivityBlock>,
    pub link: VenueLink,
}

impl DetailContent {
    pub fn build(id: FeatureId, feature: &Feature) -> Self {
        let p = &feature.properties;
        Self {
            feature: id,
            badge: p.event_id,
            venue_name: p.venue_name.clone(),
            event_title: p.event_title.clone(),
            tags: p.event_tags.clone(),
            address: [
                format!("{} {}", p.venue_street, p.venue_housenumber),
                format!("{} {}", p.venue_postal_code, p.venue_city),
            ],
            descriptions: description_blocks(&p.description_de, &p.description_dk),
            opening_hours: format!("{} Uhr bis {} Uhr", p.venue_open, p.venue_close),
            activity: (!p.activity_title.is_empty() && !p.activity_time.is_empty()).then(|| {
                ActivityBlock {
                    title: p.activity_title.clone(),
                    time: format!("{} Uhr", p.activity_time),
                }
            }),
            link: VenueLink {
                label: format!("Website {}", p.venue_name),
                url: p.venue_url.clone(),
            },
        }
    }
}

/// Both languages are labeled when both exist; a lone description stays unlabeled
fn description_blocks(german: &str, danish: &str) -> Vec<DescriptionBlock> {
    let both = !german.is_empty() && !danish.is_empty();
    [(Language::German, german), (Language::Danish, danish)]
        .into_iter()
        .filter(|(_, text)| !text.is_empty())
        .map(|(language, text)| DescriptionBlock {
            language: both.then_some(language),
            text: text.to_string(),
        })
        .collect()
}

/// Image attached below the detail content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailImage {
    pub data: ImageData,
    pub caption: String,
}

/// Identifies one image request; only the newest ticket may attach its image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageTicket {
    pub generation: u64,
    pub feature: FeatureId,
}

/// Issues asynchronous image loads whose results come back tagged with their ticket
pub trait ImageRequester {
    fn request(&mut self, ticket: ImageTicket, url: &str, alt: &str);
}

#[derive(Debug)]
pub struct DetailPanelRenderer {
    content: Option<DetailContent>,
    image: Option<DetailImage>,
    pending: Option<ImageTicket>,
    generation: u64,
    meta: PageMeta,
    /// Scroll offset of the panel in lines
    pub scroll: u16,
}

impl DetailPanelRenderer {
    pub fn new(config: &MapConfig) -> Self {
        Self {
            content: None,
            image: None,
            pending: None,
            generation: 0,
            meta: PageMeta::site_default(config),
            scroll: 0,
        }
    }

    /// Drop content and image; any in-flight image becomes stale
    pub fn clear(&mut self) {
        self.content = None;
        self.image = None;
        self.pending = None;
    }

    /// Rebuild the panel for `feature` and request its image
    pub fn render<R: ImageRequester + ?Sized>(
        &mut self,
        id: FeatureId,
        feature: &Feature,
        requester: &mut R,
        config: &MapConfig,
    ) {
        self.clear();
        self.scroll = 0;
        self.generation += 1;

        let url = &feature.properties.event_image;
        if url.is_empty() {
            debug!(slug = feature.slug(), "feature has no image");
        } else {
            let ticket = ImageTicket {
                generation: self.generation,
                feature: id,
            };
            self.pending = Some(ticket);
            requester.request(ticket, url, &feature.properties.event_title);
        }

        self.content = Some(DetailContent::build(id, feature));
        self.meta = PageMeta::for_feature(feature, config);
        debug!(slug = feature.slug(), generation = self.generation, "rendered detail panel");
    }

    /// Attach an image response. Returns true if it was inserted.
    pub fn accept_image(
        &mut self,
        ticket: ImageTicket,
        outcome: ImageOutcome,
        config: &MapConfig,
    ) -> bool {
        match outcome {
            ImageOutcome::Loaded(data) => {
                if self.pending != Some(ticket) {
                    debug!(?ticket, "discarding stale image response");
                    return false;
                }
                self.pending = None;
                self.image = Some(DetailImage {
                    data,
                    caption: config.image_caption.clone(),
                });
                true
            }
            ImageOutcome::NotOk { location, status } => {
                debug!("{} returned http status code {}", location, status);
                self.settle(ticket);
                false
            }
            ImageOutcome::Failed(reason) => {
                error!("image request failed: {}", reason);
                self.settle(ticket);
                false
            }
        }
    }

    fn settle(&mut self, ticket: ImageTicket) {
        if self.pending == Some(ticket) {
            self.pending = None;
        }
    }

    /// Switch page metadata back to the site defaults
    pub fn reset_meta(&mut self, config: &MapConfig) {
        self.meta = PageMeta::site_default(config);
    }

    pub fn content(&self) -> Option<&DetailContent> {
        self.content.as_ref()
    }

    pub fn image(&self) -> Option<&DetailImage> {
        self.image.as_ref()
    }

    pub fn pending_image(&self) -> Option<ImageTicket> {
        self.pending
    }

    pub fn meta(&self) -> &PageMeta {
        &self.meta
    }
}

/// "altes-gymnasium" -> "Altes Gymnasium"
pub fn capitalize_slug(slug: &str) -> String {
    slug.replace('-', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn share_url(base_url: &str, slug: &str) -> String {
    match Url::parse(base_url).and_then(|base| base.join(slug)) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{}{}", base_url, slug),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_feature;

    #[derive(Default)]
    struct Recorder {
        requests: Vec<(ImageTicket, String, String)>,
    }

    impl ImageRequester for Recorder {
        fn request(&mut self, ticket: ImageTicket, url: &str, alt: &str) {
            self.requests.push((ticket, url.to_string(), alt.to_string()));
        }
    }

    fn loaded() -> ImageOutcome {
        ImageOutcome::Loaded(ImageData {
            bytes: vec![1, 2, 3],
            alt: "alt".to_string(),
        })
    }

    #[test]
    fn test_only_german_is_unlabeled() {
        let mut feature = test_feature("a", 1, 54.0, 9.0);
        feature.properties.description_de = "Nur deutsch".to_string();
        let content = DetailContent::build(FeatureId(0), &feature);
        assert_eq!(
            content.descriptions,
            vec![DescriptionBlock {
                language: None,
                text: "Nur deutsch".to_string()
            }]
        );
    }

    #[test]
    fn test_both_languages_labeled_with_own_text() {
        let mut feature = test_feature("a", 1, 54.0, 9.0);
        feature.properties.description_de = "Hallo".to_string();
        feature.properties.description_dk = "Hej".to_string();
        let content = DetailContent::build(FeatureId(0), &feature);

        assert_eq!(content.descriptions.len(), 2);
        assert_eq!(content.descriptions[0].language, Some(Language::German));
        assert_eq!(content.descriptions[0].text, "Hallo");
        assert_eq!(content.descriptions[1].language, Some(Language::Danish));
        assert_eq!(content.descriptions[1].text, "Hej");
    }

    #[test]
    fn test_only_danish_and_none() {
        let mut feature = test_feature("a", 1, 54.0, 9.0);
        feature.properties.description_dk = "Hej".to_string();
        let content = DetailContent::build(FeatureId(0), &feature);
        assert_eq!(content.descriptions[0].language, None);
        assert_eq!(content.descriptions[0].text, "Hej");

        feature.properties.description_dk.clear();
        assert!(DetailContent::build(FeatureId(0), &feature).descriptions.is_empty());
    }

    #[test]
    fn test_activity_requires_title_and_time() {
        let mut feature = test_feature("a", 1, 54.0, 9.0);
        feature.properties.activity_title = "Führung".to_string();
        assert!(DetailContent::build(FeatureId(0), &feature).activity.is_none());

        feature.properties.activity_time = "20:00".to_string();
        let activity = DetailContent::build(FeatureId(0), &feature).activity.unwrap();
        assert_eq!(activity.title, "Führung");
        assert_eq!(activity.time, "20:00 Uhr");
    }

    #[test]
    fn test_address_and_hours() {
        let mut feature = test_feature("a", 1, 54.0, 9.0);
        let p = &mut feature.properties;
        p.venue_street = "Holm".to_string();
        p.venue_housenumber = "17".to_string();
        p.venue_postal_code = "24937".to_string();
        p.venue_city = "Flensburg".to_string();
        p.venue_open = "18:00".to_string();
        p.venue_close = "23:00".to_string();

        let content = DetailContent::build(FeatureId(0), &feature);
        assert_eq!(content.address, ["Holm 17".to_string(), "24937 Flensburg".to_string()]);
        assert_eq!(content.opening_hours, "18:00 Uhr bis 23:00 Uhr");
        assert_eq!(content.link.label, "Website Venue 1");
    }

    #[test]
    fn test_page_meta() {
        let config = MapConfig::default();
        let feature = test_feature("altes-gymnasium", 1, 54.0, 9.0);
        let meta = PageMeta::for_feature(&feature, &config);
        assert_eq!(meta.title, "Altes Gymnasium - Kulturnacht Flensburg");
        assert_eq!(meta.og_title, meta.title);
        assert_eq!(meta.og_url, "https://kulturnacht.oklabflensburg.de/altes-gymnasium");
    }

    #[test]
    fn test_capitalize_slug() {
        assert_eq!(capitalize_slug("st-NIKOLAI-kirche"), "St Nikolai Kirche");
        assert_eq!(capitalize_slug("ölmühle"), "Ölmühle");
    }

    #[test]
    fn test_render_requests_image() {
        let config = MapConfig::default();
        let mut panel = DetailPanelRenderer::new(&config);
        let mut recorder = Recorder::default();
        let feature = test_feature("a", 3, 54.0, 9.0);

        panel.render(FeatureId(0), &feature, &mut recorder, &config);

        assert_eq!(recorder.requests.len(), 1);
        let (ticket, url, alt) = &recorder.requests[0];
        assert_eq!(url, "https://example.org/a.webp");
        assert_eq!(alt, "Event 3");
        assert_eq!(panel.pending_image(), Some(*ticket));
        assert!(panel.accept_image(*ticket, loaded(), &config));
        assert_eq!(panel.image().unwrap().caption, "Foto Kulturnacht Flensburg");
    }

    #[test]
    fn test_render_without_image_leaves_nothing_pending() {
        let config = MapConfig::default();
        let mut panel = DetailPanelRenderer::new(&config);
        let mut recorder = Recorder::default();
        let mut feature = test_feature("hafen", 4, 54.0, 9.0);
        feature.properties.event_image.clear();

        panel.render(FeatureId(0), &feature, &mut recorder, &config);

        assert!(recorder.requests.is_empty());
        assert!(panel.pending_image().is_none());
        assert!(panel.image().is_none());
        assert_eq!(panel.content().unwrap().badge, 4);
    }

    #[test]
    fn test_stale_image_discarded() {
        let config = MapConfig::default();
        let mut panel = DetailPanelRenderer::new(&config);
        let mut recorder = Recorder::default();

        panel.render(FeatureId(0), &test_feature("a", 1, 54.0, 9.0), &mut recorder, &config);
        panel.render(FeatureId(1), &test_feature("b", 2, 54.0, 9.0), &mut recorder, &config);

        let stale = recorder.requests[0].0;
        assert!(!panel.accept_image(stale, loaded(), &config));
        assert!(panel.image().is_none());
        assert_eq!(panel.content().unwrap().badge, 2);
    }

    #[test]
    fn test_failed_image_keeps_panel() {
        let config = MapConfig::default();
        let mut panel = DetailPanelRenderer::new(&config);
        let mut recorder = Recorder::default();
        panel.render(FeatureId(0), &test_feature("a", 1, 54.0, 9.0), &mut recorder, &config);

        let ticket = recorder.requests[0].0;
        let outcome = ImageOutcome::NotOk {
            location: "https://example.org/a.webp".to_string(),
            status: 404,
        };
        assert!(!panel.accept_image(ticket, outcome, &config));
        assert!(panel.image().is_none());
        assert!(panel.pending_image().is_none());
        assert!(panel.content().is_some());
    }
}
