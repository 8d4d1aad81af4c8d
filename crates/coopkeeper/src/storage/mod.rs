//! Storage layer for coopkeeper.
//!
//! This module provides `SQLite`-based persistent storage for flock
//! records, including filtered history queries, trend scans, and
//! summary statistics.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{named_params, params, Connection, OptionalExtension, ToSql};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::record::{BirdBehavior, EggQuality, FlockRecord, Level, LitterCondition, PoultryType};
use crate::trend::TrendPoint;

use schema::RECORD_COLUMNS;

/// Storage engine for flock records.
///
/// Provides persistent storage using `SQLite` with support for:
/// - Validated record insertion (records are immutable once written)
/// - Filtering by poultry type, flock, and calendar date
/// - Date-bounded trend scans
/// - Summary statistics
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

/// Filter for history and export queries.
///
/// Every field is optional; an empty filter matches all records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    /// Restrict to one poultry type.
    pub poultry_type: Option<PoultryType>,
    /// Restrict to one flock/shed.
    pub flock_id: Option<String>,
    /// Restrict to one calendar date.
    pub day: Option<NaiveDate>,
    /// Maximum number of records to return.
    pub limit: Option<usize>,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // WAL keeps reads cheap while a form submission is writing
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert a record into storage and return its assigned ID.
    ///
    /// The record is validated first; records are immutable once
    /// written, so a bad row would otherwise live forever.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or the database operation fails.
    pub fn insert(&self, record: &FlockRecord) -> Result<i64> {
        record.validate()?;

        let recorded_at = record.recorded_at.to_rfc3339();

        self.conn.execute(
            r"
            INSERT INTO flock_records (
                poultry_type, recorded_at, flock_id, feed_given_kg, water_consumed,
                dead_birds, vaccine_given, vaccine_name, avg_bird_weight_kg,
                bird_age_days, temp_humidity, remarks, shed_cleaned, feeders_clean,
                litter_condition, sick_birds, sick_symptoms, bird_behavior,
                ventilation_ok, bad_smell, biosecurity_followed, footbath_used,
                photo_uploaded, fcr_value, dead_bird_reason, growth_rate_normal,
                overcrowding, lameness, eggs_collected, egg_production_pct,
                egg_quality, nest_boxes_clean, cannibalism, fertile_eggs,
                hatchability_pct, male_female_ratio_ok, mating_behavior_seen,
                eggs_handled_properly
            ) VALUES (
                :poultry_type, :recorded_at, :flock_id, :feed_given_kg, :water_consumed,
                :dead_birds, :vaccine_given, :vaccine_name, :avg_bird_weight_kg,
                :bird_age_days, :temp_humidity, :remarks, :shed_cleaned, :feeders_clean,
                :litter_condition, :sick_birds, :sick_symptoms, :bird_behavior,
                :ventilation_ok, :bad_smell, :biosecurity_followed, :footbath_used,
                :photo_uploaded, :fcr_value, :dead_bird_reason, :growth_rate_normal,
                :overcrowding, :lameness, :eggs_collected, :egg_production_pct,
                :egg_quality, :nest_boxes_clean, :cannibalism, :fertile_eggs,
                :hatchability_pct, :male_female_ratio_ok, :mating_behavior_seen,
                :eggs_handled_properly
            )
            ",
            named_params! {
                ":poultry_type": record.poultry_type.to_string(),
                ":recorded_at": recorded_at,
                ":flock_id": &record.flock_id,
                ":feed_given_kg": record.feed_given_kg,
                ":water_consumed": record.water_consumed.to_string(),
                ":dead_birds": record.dead_birds,
                ":vaccine_given": record.vaccine_given,
                ":vaccine_name": &record.vaccine_name,
                ":avg_bird_weight_kg": record.avg_bird_weight_kg,
                ":bird_age_days": record.bird_age_days,
                ":temp_humidity": record.temp_humidity.to_string(),
                ":remarks": &record.remarks,
                ":shed_cleaned": record.shed_cleaned,
                ":feeders_clean": record.feeders_clean,
                ":litter_condition": record.litter_condition.to_string(),
                ":sick_birds": record.sick_birds,
                ":sick_symptoms": &record.sick_symptoms,
                ":bird_behavior": record.bird_behavior.to_string(),
                ":ventilation_ok": record.ventilation_ok,
                ":bad_smell": record.bad_smell,
                ":biosecurity_followed": record.biosecurity_followed,
                ":footbath_used": record.footbath_used,
                ":photo_uploaded": record.photo_uploaded,
                ":fcr_value": record.fcr_value,
                ":dead_bird_reason": &record.dead_bird_reason,
                ":growth_rate_normal": record.growth_rate_normal,
                ":overcrowding": record.overcrowding,
                ":lameness": record.lameness,
                ":eggs_collected": record.eggs_collected,
                ":egg_production_pct": record.egg_production_pct,
                ":egg_quality": record.egg_quality.map(|q| q.to_string()),
                ":nest_boxes_clean": record.nest_boxes_clean,
                ":cannibalism": record.cannibalism,
                ":fertile_eggs": record.fertile_eggs,
                ":hatchability_pct": record.hatchability_pct,
                ":male_female_ratio_ok": record.male_female_ratio_ok,
                ":mating_behavior_seen": record.mating_behavior_seen,
                ":eggs_handled_properly": record.eggs_handled_properly,
            },
        )?;

        let id = self.conn.last_insert_rowid();
        debug!(flock = %record.flock_id, id, "Inserted flock record");
        Ok(id)
    }

    /// Get a record by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, id: i64) -> Result<Option<FlockRecord>> {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM flock_records WHERE id = ?1");
        let result = self
            .conn
            .query_row(&sql, [id], Self::row_to_record)
            .optional()?;
        Ok(result)
    }

    /// Query records matching a filter, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn query(&self, filter: &RecordFilter) -> Result<Vec<FlockRecord>> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut args: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(poultry_type) = filter.poultry_type {
            clauses.push("poultry_type = ?");
            args.push(Box::new(poultry_type.to_string()));
        }
        if let Some(flock_id) = &filter.flock_id {
            clauses.push("flock_id = ?");
            args.push(Box::new(flock_id.clone()));
        }
        if let Some(day) = filter.day {
            clauses.push("recorded_at LIKE ?");
            args.push(Box::new(format!("{}%", day.format("%Y-%m-%d"))));
        }

        let mut sql = format!("SELECT {RECORD_COLUMNS} FROM flock_records");
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY recorded_at DESC");
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(rusqlite::params_from_iter(args), Self::row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Get all records observed on a calendar date, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn records_on(&self, day: NaiveDate) -> Result<Vec<FlockRecord>> {
        let pattern = format!("{}%", day.format("%Y-%m-%d"));
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM flock_records WHERE recorded_at LIKE ?1 ORDER BY recorded_at ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map([pattern], Self::row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Get all records observed on or after a calendar date, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn records_since(&self, day: NaiveDate) -> Result<Vec<FlockRecord>> {
        let since = day.format("%Y-%m-%d").to_string();
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM flock_records WHERE recorded_at >= ?1 ORDER BY recorded_at ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map([since], Self::row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// List the distinct flock IDs present in storage, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn flock_ids(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT flock_id FROM flock_records ORDER BY flock_id ASC")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(ids)
    }

    /// Count total records in storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM flock_records", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Feed given per observation for a flock since a date, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn feed_trend(&self, flock_id: &str, since: NaiveDate) -> Result<Vec<TrendPoint>> {
        self.scan_trend(
            "SELECT substr(recorded_at, 1, 10), feed_given_kg
             FROM flock_records WHERE flock_id = ?1 AND recorded_at >= ?2
             ORDER BY recorded_at ASC",
            flock_id,
            since,
        )
    }

    /// Mortality rate (percent of flock) per observation for a flock
    /// since a date, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn mortality_trend(
        &self,
        flock_id: &str,
        since: NaiveDate,
        flock_size: u32,
    ) -> Result<Vec<TrendPoint>> {
        let mut points = self.scan_trend(
            "SELECT substr(recorded_at, 1, 10), CAST(dead_birds AS REAL)
             FROM flock_records WHERE flock_id = ?1 AND recorded_at >= ?2
             ORDER BY recorded_at ASC",
            flock_id,
            since,
        )?;
        let size = f64::from(flock_size.max(1));
        for point in &mut points {
            point.value = point.value / size * 100.0;
        }
        Ok(points)
    }

    /// Eggs collected per observation for a layer flock since a date,
    /// oldest first. Non-layer records are excluded.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn egg_production_trend(&self, flock_id: &str, since: NaiveDate) -> Result<Vec<TrendPoint>> {
        let since_str = since.format("%Y-%m-%d").to_string();
        let mut stmt = self.conn.prepare(
            "SELECT substr(recorded_at, 1, 10), CAST(IFNULL(eggs_collected, 0) AS REAL)
             FROM flock_records
             WHERE flock_id = ?1 AND poultry_type = ?2 AND recorded_at >= ?3
             ORDER BY recorded_at ASC",
        )?;
        let rows = stmt
            .query_map(
                params![flock_id, PoultryType::Layer.to_string(), since_str],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)),
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self::rows_to_points(rows))
    }

    fn scan_trend(&self, sql: &str, flock_id: &str, since: NaiveDate) -> Result<Vec<TrendPoint>> {
        let since_str = since.format("%Y-%m-%d").to_string();
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params![flock_id, since_str], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self::rows_to_points(rows))
    }

    fn rows_to_points(rows: Vec<(String, f64)>) -> Vec<TrendPoint> {
        rows.into_iter()
            .filter_map(|(day, value)| match NaiveDate::parse_from_str(&day, "%Y-%m-%d") {
                Ok(date) => Some(TrendPoint { date, value }),
                Err(_) => {
                    warn!("Skipping trend row with malformed date: {day}");
                    None
                }
            })
            .collect()
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let total_records = self.count()?;

        let oldest: Option<String> = self
            .conn
            .query_row(
                "SELECT recorded_at FROM flock_records ORDER BY recorded_at ASC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let newest: Option<String> = self
            .conn
            .query_row(
                "SELECT recorded_at FROM flock_records ORDER BY recorded_at DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let oldest_record = oldest
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));
        let newest_record = newest
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            total_records,
            oldest_record,
            newest_record,
            db_size_bytes,
        })
    }

    /// Convert a database row to a `FlockRecord`.
    #[allow(clippy::too_many_lines)]
    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<FlockRecord> {
        let id: i64 = row.get(0)?;
        let poultry_type_str: String = row.get(1)?;
        let recorded_at_str: String = row.get(2)?;

        let recorded_at = DateTime::parse_from_rfc3339(&recorded_at_str)
            .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

        let poultry_type = PoultryType::parse(&poultry_type_str).unwrap_or_else(|| {
            warn!("Unknown poultry type: {poultry_type_str}, defaulting to Broiler");
            PoultryType::Broiler
        });

        let water_str: String = row.get(5)?;
        let temp_str: String = row.get(11)?;
        let litter_str: String = row.get(15)?;
        let behavior_str: String = row.get(18)?;
        let egg_quality_str: Option<String> = row.get(31)?;

        Ok(FlockRecord {
            id: Some(id),
            poultry_type,
            recorded_at,
            flock_id: row.get(3)?,
            feed_given_kg: row.get(4)?,
            water_consumed: parse_or_default(&water_str, "water_consumed"),
            dead_birds: row.get(6)?,
            vaccine_given: row.get(7)?,
            vaccine_name: row.get(8)?,
            avg_bird_weight_kg: row.get(9)?,
            bird_age_days: row.get(10)?,
            temp_humidity: parse_or_default(&temp_str, "temp_humidity"),
            remarks: row.get(12)?,
            shed_cleaned: row.get(13)?,
            feeders_clean: row.get(14)?,
            litter_condition: parse_or_default(&litter_str, "litter_condition"),
            sick_birds: row.get(16)?,
            sick_symptoms: row.get(17)?,
            bird_behavior: parse_or_default(&behavior_str, "bird_behavior"),
            ventilation_ok: row.get(19)?,
            bad_smell: row.get(20)?,
            biosecurity_followed: row.get(21)?,
            footbath_used: row.get(22)?,
            photo_uploaded: row.get(23)?,
            fcr_value: row.get(24)?,
            dead_bird_reason: row.get(25)?,
            growth_rate_normal: row.get(26)?,
            overcrowding: row.get(27)?,
            lameness: row.get(28)?,
            eggs_collected: row.get(29)?,
            egg_production_pct: row.get(30)?,
            egg_quality: egg_quality_str.as_deref().and_then(EggQuality::parse),
            nest_boxes_clean: row.get(32)?,
            cannibalism: row.get(33)?,
            fertile_eggs: row.get(34)?,
            hatchability_pct: row.get(35)?,
            male_female_ratio_ok: row.get(36)?,
            mating_behavior_seen: row.get(37)?,
            eggs_handled_properly: row.get(38)?,
        })
    }
}

/// Parse a stored enum value, falling back to the default with a warning.
fn parse_or_default<T: Default + ParseStored>(value: &str, field: &str) -> T {
    T::parse_stored(value).unwrap_or_else(|| {
        warn!("Unknown {field} value: {value}, using default");
        T::default()
    })
}

/// Shared parse hook for the categorical field domains.
trait ParseStored: Sized {
    fn parse_stored(s: &str) -> Option<Self>;
}

impl ParseStored for Level {
    fn parse_stored(s: &str) -> Option<Self> {
        Self::parse(s)
    }
}

impl ParseStored for LitterCondition {
    fn parse_stored(s: &str) -> Option<Self> {
        Self::parse(s)
    }
}

impl ParseStored for BirdBehavior {
    fn parse_stored(s: &str) -> Option<Self> {
        Self::parse(s)
    }
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Total number of records stored.
    pub total_records: i64,
    /// Timestamp of the oldest record.
    pub oldest_record: Option<DateTime<Utc>>,
    /// Timestamp of the newest record.
    pub newest_record: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
