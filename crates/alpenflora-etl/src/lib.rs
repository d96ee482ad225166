//! Resolution pipeline for alpenflora.
//!
//! Turns a Latin species name into a multilingual [`FlowerRecord`]
//! (Wikidata taxonomy plus Wikipedia summaries) and into a matching
//! *Atlas der Alpenflora* plate on Wikimedia Commons. Also harvests plate
//! names from Commons categories and downloads resolved images.
//!
//! [`FlowerRecord`]: alpenflora_core::model::FlowerRecord

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod batch;
pub mod config;
pub mod error;
mod http;
pub mod plate;
pub mod resilience;
pub mod taxon;

pub use batch::{resolve_batch, resolve_seed_file, BatchFailure, BatchReport};
pub use config::Config;
pub use error::{EnrichError, EnrichResult};
pub use plate::commons::CommonsClient;
pub use plate::download::{download_plates, save_plate, DownloadReport, ImageDownloader, SaveOutcome};
pub use plate::harvest::harvest_plates;
pub use plate::resolver::{PlateResolver, PlateSettings};
pub use plate::MediaRepository;
pub use taxon::resolver::{TaxonResolver, TaxonSettings};
pub use taxon::wikidata::WikidataClient;
pub use taxon::wikipedia::WikipediaClient;
pub use taxon::{SummarySource, TaxonGraph};
