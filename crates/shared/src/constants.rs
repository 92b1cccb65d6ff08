pub const APP_NAME: &str = "Mingle";

// Profile limits
pub const MIN_AGE: i64 = 18;
pub const MAX_AGE: i64 = 60;
pub const MAX_USERNAME_LENGTH: usize = 32;

// Messages
pub const MAX_MESSAGE_LENGTH: usize = 2000;

// Presence lifecycle
pub const DEFAULT_REAP_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_INACTIVITY_THRESHOLD_SECS: i64 = 900;
pub const DEFAULT_OFFLINE_RETENTION_SECS: i64 = 900;
pub const SESSION_TTL_HOURS: i64 = 24;

// Gateway
pub const EVENT_QUEUE_CAPACITY: usize = 256;
