pub mod csv;
pub mod sqlite;
pub mod traits;

pub use traits::Loader;

use crate::registry::Registry;

/// Register the built-in loaders under their module paths.
pub fn register(registry: &mut Registry) {
    registry.register_loader(csv::MODULE, "CsvLoader", csv::CsvLoader::from_params);
    registry.register_loader(sqlite::MODULE, "SqliteLoader", sqlite::SqliteLoader::from_params);
}
