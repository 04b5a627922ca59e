pub mod api;
pub mod config;
pub mod engines;
pub mod speak;
pub mod update;
pub mod voices;
