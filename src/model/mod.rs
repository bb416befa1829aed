pub mod entry;
pub mod request;
pub mod settings;
