pub mod catalog_item;
pub mod pawn_request;
pub mod profile;

pub use catalog_item::{CatalogItem, CatalogItemError, NewCatalogItem};
pub use pawn_request::{PawnRequest, PawnStatus, UnknownStatus};
pub use profile::Profile;
