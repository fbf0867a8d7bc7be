//! Configuration module for vertiscope.
//!
//! Handles the optional TOML settings file.

mod settings;

pub use settings::{
    ExtractorSettings, LogSettings, Settings, SettingsError, SettingsResult,
};
