pub mod csv;
pub mod open_data;
pub mod sqlite;
pub mod traits;

pub use traits::Extractor;

use crate::registry::Registry;

/// Register the built-in extractors under their module paths.
pub fn register(registry: &mut Registry) {
    registry.register_extractor(csv::MODULE, "CsvExtractor", csv::CsvExtractor::from_params);
    registry.register_extractor(sqlite::MODULE, "SqliteExtractor", sqlite::SqliteExtractor::from_params);
    registry.register_extractor(open_data::MODULE, "OpenDataExtractor", open_data::OpenDataExtractor::from_params);
}
