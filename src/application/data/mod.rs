mod conflict_policy;
mod log_level;

pub use conflict_policy::ConflictPolicy;
pub use log_level::LogLevel;
