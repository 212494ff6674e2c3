pub mod error;
pub mod listing;
pub mod phone;
pub mod property;

pub use error::{AppError, Result};
pub use listing::Listing;
pub use phone::{normalize_phone, PhoneError, PhoneNumber, PhoneRules};
pub use property::{
    OutboundProperty, PropertyBag, PropertyKind, PropertyValue, SchemaMap, SourcePage,
};
