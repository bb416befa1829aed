pub mod atomic;
pub mod download;
pub mod download_types;
pub mod emit;
pub mod encoding;
pub mod extract;
pub mod fetch;
pub mod http;
pub mod media;
pub mod pipeline;
pub mod qa;
pub mod settings;
pub mod tabular;
