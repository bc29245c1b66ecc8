//! SQL queries for different databases.
//!
//! PostgreSQL uses `$n` placeholders; MySQL and SQLite use `?`. All numeric
//! columns are `BIGINT` (`INTEGER` on SQLite) so they decode as `i64` through
//! the `Any` driver.

// ============================================================================
// Schema
// ============================================================================

/// Schema (PostgreSQL).
pub const SCHEMA_PG: &str = r#"
CREATE TABLE IF NOT EXISTS daily_quotas (
    user_id VARCHAR(255) NOT NULL,
    quota_date VARCHAR(10) NOT NULL,
    used_count BIGINT NOT NULL DEFAULT 0,
    created_at BIGINT NOT NULL,
    updated_at BIGINT NOT NULL,
    PRIMARY KEY (user_id, quota_date)
);
CREATE TABLE IF NOT EXISTS tarot_interpretations (
    id VARCHAR(36) PRIMARY KEY,
    user_id VARCHAR(255) NOT NULL,
    question TEXT NOT NULL,
    spread_type VARCHAR(50) NOT NULL,
    cards TEXT NOT NULL,
    interpretation TEXT NOT NULL,
    created_at BIGINT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_tarot_interpretations_user
    ON tarot_interpretations (user_id, created_at)
"#;

/// Schema (MySQL). The index is declared inline; MySQL has no
/// `CREATE INDEX IF NOT EXISTS`.
pub const SCHEMA_MYSQL: &str = r#"
CREATE TABLE IF NOT EXISTS daily_quotas (
    user_id VARCHAR(255) NOT NULL,
    quota_date VARCHAR(10) NOT NULL,
    used_count BIGINT NOT NULL DEFAULT 0,
    created_at BIGINT NOT NULL,
    updated_at BIGINT NOT NULL,
    PRIMARY KEY (user_id, quota_date)
);
CREATE TABLE IF NOT EXISTS tarot_interpretations (
    id VARCHAR(36) PRIMARY KEY,
    user_id VARCHAR(255) NOT NULL,
    question TEXT NOT NULL,
    spread_type VARCHAR(50) NOT NULL,
    cards MEDIUMTEXT NOT NULL,
    interpretation MEDIUMTEXT NOT NULL,
    created_at BIGINT NOT NULL,
    INDEX idx_tarot_interpretations_user (user_id, created_at)
)
"#;

/// Schema (SQLite).
pub const SCHEMA_SQLITE: &str = r#"
CREATE TABLE IF NOT EXISTS daily_quotas (
    user_id TEXT NOT NULL,
    quota_date TEXT NOT NULL,
    used_count INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    PRIMARY KEY (user_id, quota_date)
);
CREATE TABLE IF NOT EXISTS tarot_interpretations (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    question TEXT NOT NULL,
    spread_type TEXT NOT NULL,
    cards TEXT NOT NULL,
    interpretation TEXT NOT NULL,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_tarot_interpretations_user
    ON tarot_interpretations (user_id, created_at)
"#;

// ============================================================================
// Quotas
// ============================================================================

/// Insert a zero-count row unless one exists (PostgreSQL).
pub const INSERT_QUOTA_PG: &str = r#"
INSERT INTO daily_quotas (user_id, quota_date, used_count, created_at, updated_at)
VALUES ($1, $2, 0, $3, $3)
ON CONFLICT (user_id, quota_date) DO NOTHING
"#;

/// Insert a zero-count row unless one exists (SQLite).
pub const INSERT_QUOTA_SQLITE: &str = r#"
INSERT INTO daily_quotas (user_id, quota_date, used_count, created_at, updated_at)
VALUES (?, ?, 0, ?, ?)
ON CONFLICT (user_id, quota_date) DO NOTHING
"#;

/// Insert a zero-count row unless one exists (MySQL).
pub const INSERT_QUOTA_MYSQL: &str = r#"
INSERT IGNORE INTO daily_quotas (user_id, quota_date, used_count, created_at, updated_at)
VALUES (?, ?, 0, ?, ?)
"#;

/// Fetch a quota row (PostgreSQL).
pub const FIND_QUOTA_PG: &str = r#"
SELECT user_id, quota_date, used_count, created_at, updated_at
FROM daily_quotas
WHERE user_id = $1 AND quota_date = $2
"#;

/// Fetch a quota row (MySQL/SQLite).
pub const FIND_QUOTA_MYSQL: &str = r#"
SELECT user_id, quota_date, used_count, created_at, updated_at
FROM daily_quotas
WHERE user_id = ? AND quota_date = ?
"#;

/// Conditional increment returning the updated row (PostgreSQL). Matches no
/// row at the ceiling.
pub const INCREMENT_QUOTA_PG: &str = r#"
UPDATE daily_quotas
SET used_count = used_count + 1, updated_at = $1
WHERE user_id = $2 AND quota_date = $3 AND used_count < $4
RETURNING user_id, quota_date, used_count, created_at, updated_at
"#;

/// Conditional increment returning the updated row (SQLite).
pub const INCREMENT_QUOTA_SQLITE: &str = r#"
UPDATE daily_quotas
SET used_count = used_count + 1, updated_at = ?
WHERE user_id = ? AND quota_date = ? AND used_count < ?
RETURNING user_id, quota_date, used_count, created_at, updated_at
"#;

/// Conditional increment (MySQL). No `RETURNING`; the row is re-read.
pub const INCREMENT_QUOTA_MYSQL: &str = r#"
UPDATE daily_quotas
SET used_count = used_count + 1, updated_at = ?
WHERE user_id = ? AND quota_date = ? AND used_count < ?
"#;

/// Reset a day's counter (PostgreSQL).
pub const RESET_QUOTA_PG: &str = r#"
UPDATE daily_quotas
SET used_count = 0, updated_at = $1
WHERE user_id = $2 AND quota_date = $3
"#;

/// Reset a day's counter (MySQL/SQLite).
pub const RESET_QUOTA_MYSQL: &str = r#"
UPDATE daily_quotas
SET used_count = 0, updated_at = ?
WHERE user_id = ? AND quota_date = ?
"#;

// ============================================================================
// Interpretations
// ============================================================================

/// Insert a reading (PostgreSQL).
pub const INSERT_INTERPRETATION_PG: &str = r#"
INSERT INTO tarot_interpretations (id, user_id, question, spread_type, cards, interpretation, created_at)
VALUES ($1, $2, $3, $4, $5, $6, $7)
"#;

/// Insert a reading (MySQL/SQLite).
pub const INSERT_INTERPRETATION_MYSQL: &str = r#"
INSERT INTO tarot_interpretations (id, user_id, question, spread_type, cards, interpretation, created_at)
VALUES (?, ?, ?, ?, ?, ?, ?)
"#;

/// Replace interpretation text (PostgreSQL).
pub const UPDATE_INTERPRETATION_PG: &str = r#"
UPDATE tarot_interpretations SET interpretation = $1 WHERE id = $2
"#;

/// Replace interpretation text (MySQL/SQLite).
pub const UPDATE_INTERPRETATION_MYSQL: &str = r#"
UPDATE tarot_interpretations SET interpretation = ? WHERE id = ?
"#;

/// A user's readings, newest first (PostgreSQL).
pub const LIST_BY_USER_PG: &str = r#"
SELECT id, user_id, question, spread_type, cards, interpretation, created_at
FROM tarot_interpretations
WHERE user_id = $1
ORDER BY created_at DESC, id DESC
LIMIT $2
"#;

/// A user's readings, newest first (MySQL/SQLite).
pub const LIST_BY_USER_MYSQL: &str = r#"
SELECT id, user_id, question, spread_type, cards, interpretation, created_at
FROM tarot_interpretations
WHERE user_id = ?
ORDER BY created_at DESC, id DESC
LIMIT ?
"#;

/// Fetch a reading by id (PostgreSQL).
pub const GET_INTERPRETATION_PG: &str = r#"
SELECT id, user_id, question, spread_type, cards, interpretation, created_at
FROM tarot_interpretations
WHERE id = $1
"#;

/// Fetch a reading by id (MySQL/SQLite).
pub const GET_INTERPRETATION_MYSQL: &str = r#"
SELECT id, user_id, question, spread_type, cards, interpretation, created_at
FROM tarot_interpretations
WHERE id = ?
"#;

/// Readings created in a millisecond range (PostgreSQL).
pub const COUNT_IN_RANGE_PG: &str = r#"
SELECT COUNT(*) AS total
FROM tarot_interpretations
WHERE user_id = $1 AND created_at >= $2 AND created_at < $3
"#;

/// Readings created in a millisecond range (MySQL/SQLite).
pub const COUNT_IN_RANGE_MYSQL: &str = r#"
SELECT COUNT(*) AS total
FROM tarot_interpretations
WHERE user_id = ? AND created_at >= ? AND created_at < ?
"#;
