//! SQLite schema definition.

/// Complete database schema for the patient capture store.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    local_id TEXT PRIMARY KEY,
    patient_number TEXT NOT NULL UNIQUE,         -- clinic-assigned, sent as "unique"
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    date_of_birth TEXT,                          -- YYYY-MM-DD
    gender TEXT,
    registration_date TEXT NOT NULL,             -- YYYY-MM-DD
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_patients_name ON patients(last_name, first_name);

-- ============================================================================
-- Vitals (one row per patient per visit date)
-- ============================================================================

CREATE TABLE IF NOT EXISTS vitals (
    local_id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES patients(local_id) ON DELETE CASCADE,
    visit_date TEXT NOT NULL,                    -- YYYY-MM-DD
    height_cm REAL NOT NULL,
    weight_kg REAL NOT NULL,
    bmi REAL NOT NULL,
    remote_id INTEGER,                           -- NULL until the vitals push succeeds
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE (patient_id, visit_date)
);

CREATE INDEX IF NOT EXISTS idx_vitals_visit_date ON vitals(visit_date);

-- ============================================================================
-- Assessments
-- ============================================================================

CREATE TABLE IF NOT EXISTS general_assessments (
    local_id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES patients(local_id) ON DELETE CASCADE,
    visit_date TEXT NOT NULL,
    general_health TEXT NOT NULL CHECK (general_health IN ('Good', 'Poor')),
    ever_on_diet INTEGER NOT NULL,
    comments TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_general_patient ON general_assessments(patient_id, visit_date);

CREATE TABLE IF NOT EXISTS overweight_assessments (
    local_id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES patients(local_id) ON DELETE CASCADE,
    visit_date TEXT NOT NULL,
    general_health TEXT NOT NULL CHECK (general_health IN ('Good', 'Poor')),
    using_drugs INTEGER NOT NULL,
    comments TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_overweight_patient ON overweight_assessments(patient_id, visit_date);

-- ============================================================================
-- Pending Operation Queue (append-mostly, no foreign keys)
-- ============================================================================

CREATE TABLE IF NOT EXISTS pending_operations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    endpoint TEXT NOT NULL CHECK (endpoint IN ('register_patient', 'add_vitals', 'add_visit')),
    payload TEXT NOT NULL,                       -- JSON request body snapshot
    created_at INTEGER NOT NULL UNIQUE,          -- logical clock value
    attempt_count INTEGER NOT NULL DEFAULT 0,
    last_error TEXT,
    enqueued_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_pending_created ON pending_operations(created_at);

-- Payload columns are immutable once written
CREATE TRIGGER IF NOT EXISTS pending_operations_immutable BEFORE UPDATE ON pending_operations
WHEN new.endpoint IS NOT old.endpoint
  OR new.payload IS NOT old.payload
  OR new.created_at IS NOT old.created_at
BEGIN
    SELECT RAISE(ABORT, 'Pending operation endpoint, payload and created_at are immutable');
END;

-- Logical clock for queue ordering (single row, never reset)
CREATE TABLE IF NOT EXISTS queue_clock (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    value INTEGER NOT NULL
);

INSERT OR IGNORE INTO queue_clock (id, value) VALUES (1, 0);

-- ============================================================================
-- Sync State
-- ============================================================================

CREATE TABLE IF NOT EXISTS sync_state (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

INSERT OR IGNORE INTO sync_state (key, value) VALUES ('last_sync_at', '');
INSERT OR IGNORE INTO sync_state (key, value) VALUES ('last_sync_outcome', '');
"#;
