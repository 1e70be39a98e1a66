// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display and platform directories)
pub const APP_NAME: &str = "ConferenceCentral";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "conference";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".conference";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "conference.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "CONFERENCE_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "CONFERENCE_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "CONFERENCE_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "CONFERENCE_LOG";

/// Environment variable to disable authentication
pub const ENV_NO_AUTH: &str = "CONFERENCE_NO_AUTH";

/// Environment variable for the token signing secret
pub const ENV_JWT_SECRET: &str = "CONFERENCE_JWT_SECRET";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 8080;

/// Default log filter when neither CONFERENCE_LOG nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = "info,conference=info";

// =============================================================================
// Environment Variables - Storage
// =============================================================================

/// Environment variable to override data directory
pub const ENV_DATA_DIR: &str = "CONFERENCE_DATA_DIR";

// =============================================================================
// SQLite
// =============================================================================

/// SQLite database filename
pub const SQLITE_DB_FILENAME: &str = "conference.db";

/// Maximum connections in the SQLite pool
pub const SQLITE_MAX_CONNECTIONS: u32 = 5;

/// SQLite busy timeout in seconds
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;

/// SQLite page cache size (negative = KiB)
pub const SQLITE_CACHE_SIZE: &str = "-64000";

/// Pages between automatic WAL checkpoints
pub const SQLITE_WAL_AUTOCHECKPOINT: &str = "1000";

/// Interval for the background WAL checkpoint task
pub const SQLITE_CHECKPOINT_INTERVAL_SECS: u64 = 300;

// =============================================================================
// HTTP
// =============================================================================

/// Default request body limit (1 MiB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Maximum filters accepted by a single query request
pub const MAX_QUERY_FILTERS: usize = 32;

// =============================================================================
// Shutdown
// =============================================================================

/// Maximum time to wait for background tasks during shutdown
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Identity
// =============================================================================

/// User the server acts as when authentication is disabled
pub const DEFAULT_USER_ID: &str = "local";

/// Email of the local default user
pub const DEFAULT_USER_EMAIL: &str = "local@localhost";

/// Lifetime of tokens minted by `conference token`
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

// =============================================================================
// Conferences
// =============================================================================

/// Topics assigned to a conference created without any
pub const DEFAULT_CONFERENCE_TOPICS: &[&str] = &["Default", "Topic"];

/// City assigned to a conference created without one
pub const DEFAULT_CONFERENCE_CITY: &str = "Default City";

/// Conferences with this many seats or fewer (but some) are "nearly sold out"
pub const NEARLY_SOLD_OUT_SEATS: i64 = 5;

// =============================================================================
// Background Tasks
// =============================================================================

/// Environment variable for the announcement refresh interval
pub const ENV_ANNOUNCEMENT_INTERVAL: &str = "CONFERENCE_ANNOUNCEMENT_INTERVAL";

/// Default announcement refresh interval
pub const DEFAULT_ANNOUNCEMENT_INTERVAL_SECS: u64 = 60;

/// Capacity of the in-process task queue
pub const TASK_QUEUE_CAPACITY: usize = 1024;

// =============================================================================
// Cache
// =============================================================================

/// Environment variable for cache max entries
pub const ENV_CACHE_MAX_ENTRIES: &str = "CONFERENCE_CACHE_MAX_ENTRIES";

/// Default cache max entries
pub const DEFAULT_CACHE_MAX_ENTRIES: u64 = 10_000;

/// Cache key version (bump on schema changes to invalidate all cached data)
pub const CACHE_KEY_VERSION: &str = "v1";

/// Well-known key of the featured speaker announcement
pub const FEATURED_SPEAKER_CACHE_KEY: &str = "MEMCACHE_FEATURED_SPEAKER_KEY";

/// Well-known key of the nearly-sold-out announcement
pub const ANNOUNCEMENT_CACHE_KEY: &str = "RECENT_ANNOUNCEMENTS";
