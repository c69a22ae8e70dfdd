pub mod config;
pub mod logging;

pub mod export;
pub mod fetch;
pub mod html;
pub mod listing;
pub mod normalize;
pub mod pipeline;
pub mod record;
pub mod user_agent;
