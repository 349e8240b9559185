//! HTML parsers for the legacy playlist feed

pub mod playlist;

pub use playlist::parse_playlist;
