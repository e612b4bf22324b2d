// =============================================================================
// Petmeet Backend Constants
// =============================================================================
// Tunables shared by the server, the services and the maintenance binaries.

// =============================================================================
// SERVER CONFIGURATION
// =============================================================================

/// Default server port if not specified in environment
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Default size of the Postgres connection pool
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

// =============================================================================
// SESSIONS
// =============================================================================

/// Minutes of inactivity before a login session expires
pub const DEFAULT_SESSION_INACTIVITY_MINUTES: i64 = 30;

/// Session key holding the logged-in user's id
pub const SESSION_USER_ID_KEY: &str = "user_id";

// =============================================================================
// MATCHING ROOMS
// =============================================================================

/// Capacity pre-filled on a new room form
pub const DEFAULT_MAX_PARTICIPANTS: i64 = 4;

/// A room must at least fit its host
pub const MIN_MAX_PARTICIPANTS: i64 = 1;

/// Separator used when listing the pet types present in a room
pub const PET_TYPE_SEPARATOR: &str = ", ";

// =============================================================================
// KEYWORDS
// =============================================================================

/// Number of keywords returned when the caller does not ask for a count
pub const DEFAULT_KEYWORD_LIMIT: usize = 5;

/// Upper bound on requested keyword counts
pub const MAX_KEYWORD_LIMIT: usize = 50;

/// Words shorter than this (in characters) are never keywords
pub const MIN_KEYWORD_CHARS: usize = 2;

/// Words ignored when ranking keywords
pub const KEYWORD_STOPWORDS: &[&str] = &[
    "the", "and", "is", "at", "which", "on", "a", "an", "을", "를", "에", "의", "는", "이", "가",
];

// =============================================================================
// MAINTENANCE
// =============================================================================

/// Tables cleared by the wipe tool, children first
pub const WIPEABLE_TABLES: &[&str] = &[
    "schedules",
    "room_participants",
    "matching_rooms",
    "pets",
    "users",
];

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Clamps a requested keyword count into the supported range
pub fn keyword_limit(requested: Option<usize>) -> usize {
    requested
        .unwrap_or(DEFAULT_KEYWORD_LIMIT)
        .min(MAX_KEYWORD_LIMIT)
}

/// Checks if a word should be counted as a keyword
pub fn is_keyword_candidate(word: &str) -> bool {
    word.chars().count() >= MIN_KEYWORD_CHARS && !KEYWORD_STOPWORDS.contains(&word)
}
