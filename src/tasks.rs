use std::sync::mpsc::Sender;
use std::sync::Arc;

use crate::catalog::FeatureCatalog;
use crate::data;
use crate::detail::{ImageRequester, ImageTicket};
use crate::error::LoadError;
use crate::fetch::{ImageLoader, ImageOutcome, Source};

/// Results of background work, delivered to the event loop in arrival order
#[derive(Debug)]
pub enum AppEvent {
    CatalogLoaded(Result<FeatureCatalog, LoadError>),
    ImageLoaded {
        ticket: ImageTicket,
        outcome: ImageOutcome,
    },
}

/// Fetch the dataset on the rayon pool
pub fn spawn_catalog_load(source: Source, tx: Sender<AppEvent>) {
    rayon::spawn(move || {
        let result = data::load_catalog(&source);
        // receiver gone means the app is shutting down
        let _ = tx.send(AppEvent::CatalogLoaded(result));
    });
}

/// Image requester that loads on the rayon pool and answers through the event channel
pub struct PoolImageRequester {
    loader: Arc<dyn ImageLoader>,
    tx: Sender<AppEvent>,
}

impl PoolImageRequester {
    pub fn new(loader: Arc<dyn ImageLoader>, tx: Sender<AppEvent>) -> Self {
        Self { loader, tx }
    }
}

impl ImageRequester for PoolImageRequester {
    fn request(&mut self, ticket: ImageTicket, url: &str, alt: &str) {
        let loader = Arc::clone(&self.loader);
        let tx = self.tx.clone();
        let (url, alt) = (url.to_string(), alt.to_string());
        rayon::spawn(move || {
            let outcome = loader.load(&url, &alt);
            let _ = tx.send(AppEvent::ImageLoaded { ticket, outcome });
        });
    }
}
