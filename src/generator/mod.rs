/// `EntitySchema` source rendering.
pub mod entity_schema;
/// Normalized entity model shared by every pass.
pub mod model;
/// Pairing of relation stubs into bidirectional relations.
pub mod resolver;
