pub mod language;
pub mod media;
pub mod plate;
pub mod record;
pub mod taxon;

pub use language::Language;
pub use media::{url_file_extension, MediaCandidate, RightsMetadata};
pub use plate::{title_basename, PlateEntry};
pub use record::{FlowerRecord, LocalizedEntry};
pub use taxon::{EntityId, TaxonEntity, TaxonMatch, TaxonRank};
