pub mod assets;
pub mod batch;
pub mod config;
pub mod download;
pub mod harvest;
pub mod plate;
pub mod taxon;

pub use assets::run_import;
pub use batch::run_batch;
pub use download::run_download;
pub use harvest::run_harvest;
pub use plate::run_plate;
pub use taxon::run_taxon;
