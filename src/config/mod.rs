/// Database connection and table creation
pub mod database;

/// SMS provider credentials from environment variables
pub mod provider;

/// Application settings from config.toml
pub mod settings;
