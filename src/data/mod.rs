pub mod catalog;
pub mod equipment;
pub mod import;
pub mod loader;
pub mod normalize;
pub mod query;
pub mod ship;
pub mod validate;

pub use catalog::Catalog;
pub use equipment::{Augment, Auxiliary, EquipmentSelection, Loadout, LoadoutNames, NONE_INDEX, NONE_NAME};
pub use loader::CatalogError;
pub use query::{ShipPage, ShipQuery};
pub use ship::Ship;
