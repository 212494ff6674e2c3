pub mod catalog;
pub mod intake;
pub mod record_encoder;
pub mod record_normalizer;
pub mod schema_resolver;
pub mod value_decoder;
