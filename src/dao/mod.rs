/// Database model definitions.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;
/// Course, tournament, player and group persistence.
pub mod tournament_store;
