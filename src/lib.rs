pub mod banner;
pub mod batch;
pub mod config;
pub mod consts;
pub mod insight;
pub mod model;
pub mod prompts;
pub mod server;
pub mod store;
