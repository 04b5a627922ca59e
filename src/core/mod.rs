pub mod engine;
pub mod store;
pub mod update;
pub mod voices;
