//! Session plumbing for inkpad: configuration, on-disk documents, and a
//! background save thread.

pub mod config;
pub mod file_store;
pub mod saver;

pub use config::{Config, config_path, default_data_dir};
pub use file_store::JsonFileStore;
pub use saver::{SaveEvent, SaveHandle, SaveSender, start_save_thread};
