/// Campus Directory - canonical room and laboratory lookup
///
/// Core library resolving free-text chat queries to stored campus rooms and
/// laboratories, with SQLite storage and chat card rendering.

pub mod config;
pub mod core;
pub mod database;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
