//! Small `Copy` types shared by every layer

mod hue;
mod intents;
mod snowflake;

pub use hue::Hue;
pub use intents::GatewayIntents;
pub use snowflake::{Snowflake, SnowflakeParseError};
