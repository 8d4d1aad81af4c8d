//! `SQLite` schema definitions for coopkeeper.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the flock records table.
pub const CREATE_RECORDS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS flock_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    poultry_type TEXT NOT NULL,
    recorded_at TEXT NOT NULL,
    flock_id TEXT NOT NULL,
    feed_given_kg REAL NOT NULL,
    water_consumed TEXT NOT NULL,
    dead_birds INTEGER NOT NULL,
    vaccine_given INTEGER NOT NULL,
    vaccine_name TEXT,
    avg_bird_weight_kg REAL,
    bird_age_days INTEGER NOT NULL,
    temp_humidity TEXT NOT NULL,
    remarks TEXT,
    shed_cleaned INTEGER NOT NULL,
    feeders_clean INTEGER NOT NULL,
    litter_condition TEXT NOT NULL,
    sick_birds INTEGER NOT NULL,
    sick_symptoms TEXT,
    bird_behavior TEXT NOT NULL,
    ventilation_ok INTEGER NOT NULL,
    bad_smell INTEGER NOT NULL,
    biosecurity_followed INTEGER NOT NULL,
    footbath_used INTEGER NOT NULL,
    photo_uploaded INTEGER NOT NULL,
    fcr_value REAL,
    dead_bird_reason TEXT,
    growth_rate_normal INTEGER,
    overcrowding INTEGER,
    lameness INTEGER,
    eggs_collected INTEGER,
    egg_production_pct REAL,
    egg_quality TEXT,
    nest_boxes_clean INTEGER,
    cannibalism INTEGER,
    fertile_eggs INTEGER,
    hatchability_pct REAL,
    male_female_ratio_ok INTEGER,
    mating_behavior_seen INTEGER,
    eggs_handled_properly INTEGER,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create an index on `recorded_at` for date-bounded scans.
pub const CREATE_RECORDED_AT_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_flock_records_recorded_at ON flock_records(recorded_at DESC)
";

/// SQL statement to create an index on `flock_id` for filtering.
pub const CREATE_FLOCK_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_flock_records_flock ON flock_records(flock_id)
";

/// SQL statement to create an index on `poultry_type` for filtering.
pub const CREATE_TYPE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_flock_records_type ON flock_records(poultry_type)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_RECORDS_TABLE,
    CREATE_RECORDED_AT_INDEX,
    CREATE_FLOCK_INDEX,
    CREATE_TYPE_INDEX,
    CREATE_METADATA_TABLE,
];

/// Column list shared by every record SELECT, in table order.
pub const RECORD_COLUMNS: &str = "id, poultry_type, recorded_at, flock_id, feed_given_kg, \
    water_consumed, dead_birds, vaccine_given, vaccine_name, avg_bird_weight_kg, \
    bird_age_days, temp_humidity, remarks, shed_cleaned, feeders_clean, litter_condition, \
    sick_birds, sick_symptoms, bird_behavior, ventilation_ok, bad_smell, \
    biosecurity_followed, footbath_used, photo_uploaded, fcr_value, dead_bird_reason, \
    growth_rate_normal, overcrowding, lameness, eggs_collected, egg_production_pct, \
    egg_quality, nest_boxes_clean, cannibalism, fertile_eggs, hatchability_pct, \
    male_female_ratio_ok, mating_behavior_seen, eggs_handled_properly";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.is_empty());
        }
    }

    #[test]
    fn test_create_records_table_contains_required_columns() {
        assert!(CREATE_RECORDS_TABLE.contains("id INTEGER PRIMARY KEY"));
        assert!(CREATE_RECORDS_TABLE.contains("poultry_type TEXT NOT NULL"));
        assert!(CREATE_RECORDS_TABLE.contains("recorded_at TEXT NOT NULL"));
        assert!(CREATE_RECORDS_TABLE.contains("flock_id TEXT NOT NULL"));
        assert!(CREATE_RECORDS_TABLE.contains("feed_given_kg REAL NOT NULL"));
        assert!(CREATE_RECORDS_TABLE.contains("dead_birds INTEGER NOT NULL"));
    }

    #[test]
    fn test_record_columns_match_table_order() {
        // Every selected column must exist in the CREATE statement.
        for column in RECORD_COLUMNS.split(',') {
            let column = column.trim();
            assert!(
                CREATE_RECORDS_TABLE.contains(column),
                "column {column} missing from schema"
            );
        }
    }

    #[test]
    fn test_create_metadata_table_structure() {
        assert!(CREATE_METADATA_TABLE.contains("key TEXT PRIMARY KEY"));
        assert!(CREATE_METADATA_TABLE.contains("value TEXT NOT NULL"));
    }
}
