//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands and the
//! conversion from entry-form flags to a validated record.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

use crate::config::FarmConfig;
use crate::error::{Error, Result};
use crate::record::{
    BirdBehavior, EggQuality, FlockRecord, Level, LitterCondition, PoultryType,
};
use crate::storage::RecordFilter;
use crate::trend::TrendMetric;

/// Record a day's observation for a flock.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Poultry type of the flock
    #[arg(short = 't', long = "type", value_enum, default_value = "broiler")]
    pub poultry_type: PoultryTypeArg,

    /// Flock / shed identifier (e.g. Shed1)
    #[arg(short, long)]
    pub flock: String,

    /// Feed given today in kilograms
    #[arg(long, value_name = "KG")]
    pub feed_kg: f64,

    /// Birds found dead today
    #[arg(long, value_name = "N")]
    pub dead_birds: u32,

    /// Water intake level
    #[arg(long, value_enum, default_value = "normal")]
    pub water: LevelArg,

    /// Vaccine or medicine administered today
    #[arg(long, value_name = "NAME")]
    pub vaccine: Option<String>,

    /// Average bird weight in kilograms
    #[arg(long, value_name = "KG")]
    pub weight_kg: Option<f64>,

    /// Bird age in days (defaults to farm.default_bird_age_days)
    #[arg(long, value_name = "DAYS")]
    pub age_days: Option<u32>,

    /// Temperature & humidity reading
    #[arg(long, value_enum, default_value = "normal")]
    pub temp_humidity: LevelArg,

    /// Free-text remarks
    #[arg(long)]
    pub remarks: Option<String>,

    /// Shed was cleaned today
    #[arg(long)]
    pub shed_cleaned: bool,

    /// Feeders and drinkers are clean
    #[arg(long)]
    pub feeders_clean: bool,

    /// Litter condition
    #[arg(long, value_enum, default_value = "dry")]
    pub litter: LitterArg,

    /// Sick birds were observed
    #[arg(long)]
    pub sick: bool,

    /// Observed symptoms (implies --sick)
    #[arg(long)]
    pub symptoms: Option<String>,

    /// Flock demeanor
    #[arg(long, value_enum, default_value = "normal")]
    pub behavior: BehaviorArg,

    /// Ventilation is not working
    #[arg(long)]
    pub ventilation_off: bool,

    /// A bad smell was noticed
    #[arg(long)]
    pub bad_smell: bool,

    /// Biosecurity routine was skipped
    #[arg(long)]
    pub no_biosecurity: bool,

    /// Footbath was not used
    #[arg(long)]
    pub no_footbath: bool,

    /// A photo was attached to the observation
    #[arg(long)]
    pub photo: bool,

    /// Feed conversion ratio
    #[arg(long, help_heading = "Broiler")]
    pub fcr: Option<f64>,

    /// Suspected cause of today's deaths
    #[arg(long, help_heading = "Broiler")]
    pub death_reason: Option<String>,

    /// Growth rate looks abnormal
    #[arg(long, help_heading = "Broiler")]
    pub growth_abnormal: bool,

    /// Shed looks overcrowded
    #[arg(long, help_heading = "Broiler")]
    pub overcrowding: bool,

    /// Signs of lameness
    #[arg(long, help_heading = "Broiler")]
    pub lameness: bool,

    /// Eggs collected today
    #[arg(long, help_heading = "Layer")]
    pub eggs: Option<u32>,

    /// Hen-day egg production percentage
    #[arg(long, help_heading = "Layer")]
    pub egg_production_pct: Option<f64>,

    /// Egg shell quality
    #[arg(long, value_enum, help_heading = "Layer")]
    pub egg_quality: Option<EggQualityArg>,

    /// Nest boxes were not cleaned
    #[arg(long, help_heading = "Layer")]
    pub nest_boxes_dirty: bool,

    /// Cannibalism was observed
    #[arg(long, help_heading = "Layer")]
    pub cannibalism: bool,

    /// Fertile eggs collected today
    #[arg(long, help_heading = "Breeder")]
    pub fertile_eggs: Option<u32>,

    /// Hatchability percentage
    #[arg(long, help_heading = "Breeder")]
    pub hatchability_pct: Option<f64>,

    /// Male/female ratio looks off
    #[arg(long, help_heading = "Breeder")]
    pub ratio_off: bool,

    /// No mating behavior seen
    #[arg(long, help_heading = "Breeder")]
    pub no_mating: bool,

    /// Eggs were not handled properly
    #[arg(long, help_heading = "Breeder")]
    pub eggs_mishandled: bool,
}

impl AddCommand {
    /// Build and validate a record from the entry flags.
    ///
    /// Section flags for a poultry type other than `--type` are
    /// rejected; section fields left at their flag defaults take the
    /// entry form's defaults for the matching type.
    ///
    /// # Errors
    ///
    /// Returns an error if section flags don't match the poultry type
    /// or the resulting record fails validation.
    pub fn to_record(&self, farm: &FarmConfig) -> Result<FlockRecord> {
        let poultry_type = PoultryType::from(self.poultry_type);
        self.check_section_flags(poultry_type)?;

        let mut record = FlockRecord::new(
            self.flock.clone(),
            poultry_type,
            self.feed_kg,
            self.dead_birds,
        );
        record.water_consumed = self.water.into();
        if let Some(name) = &self.vaccine {
            record.vaccine_given = true;
            record.vaccine_name = Some(name.clone());
        }
        record.avg_bird_weight_kg = self.weight_kg;
        record.bird_age_days = self.age_days.unwrap_or(farm.default_bird_age_days);
        record.temp_humidity = self.temp_humidity.into();
        record.remarks = self.remarks.clone();
        record.shed_cleaned = self.shed_cleaned;
        record.feeders_clean = self.feeders_clean;
        record.litter_condition = self.litter.into();
        record.sick_birds = self.sick || self.symptoms.is_some();
        record.sick_symptoms = self.symptoms.clone();
        record.bird_behavior = self.behavior.into();
        record.ventilation_ok = !self.ventilation_off;
        record.bad_smell = self.bad_smell;
        record.biosecurity_followed = !self.no_biosecurity;
        record.footbath_used = !self.no_footbath;
        record.photo_uploaded = self.photo;

        match poultry_type {
            PoultryType::Broiler => {
                record.fcr_value = self.fcr;
                record.dead_bird_reason = self.death_reason.clone();
                record.growth_rate_normal = Some(!self.growth_abnormal);
                record.overcrowding = Some(self.overcrowding);
                record.lameness = Some(self.lameness);
            }
            PoultryType::Layer => {
                record.eggs_collected = self.eggs;
                record.egg_production_pct = self.egg_production_pct;
                record.egg_quality =
                    Some(self.egg_quality.map_or(EggQuality::Good, EggQuality::from));
                record.nest_boxes_clean = Some(!self.nest_boxes_dirty);
                record.cannibalism = Some(self.cannibalism);
            }
            PoultryType::Breeder => {
                record.fertile_eggs = self.fertile_eggs;
                record.hatchability_pct = self.hatchability_pct;
                record.male_female_ratio_ok = Some(!self.ratio_off);
                record.mating_behavior_seen = Some(!self.no_mating);
                record.eggs_handled_properly = Some(!self.eggs_mishandled);
            }
        }

        record.validate()?;
        Ok(record)
    }

    fn check_section_flags(&self, poultry_type: PoultryType) -> Result<()> {
        let broiler_flags = self.fcr.is_some()
            || self.death_reason.is_some()
            || self.growth_abnormal
            || self.overcrowding
            || self.lameness;
        if poultry_type != PoultryType::Broiler && broiler_flags {
            return Err(Error::invalid_record(
                "broiler options require --type broiler",
            ));
        }

        let layer_flags = self.eggs.is_some()
            || self.egg_production_pct.is_some()
            || self.egg_quality.is_some()
            || self.nest_boxes_dirty
            || self.cannibalism;
        if poultry_type != PoultryType::Layer && layer_flags {
            return Err(Error::invalid_record("layer options require --type layer"));
        }

        let breeder_flags = self.fertile_eggs.is_some()
            || self.hatchability_pct.is_some()
            || self.ratio_off
            || self.no_mating
            || self.eggs_mishandled;
        if poultry_type != PoultryType::Breeder && breeder_flags {
            return Err(Error::invalid_record(
                "breeder options require --type breeder",
            ));
        }

        Ok(())
    }
}

/// List recorded observations.
#[derive(Debug, Args)]
pub struct HistoryCommand {
    /// Filter by poultry type
    #[arg(short = 't', long = "type", value_enum)]
    pub poultry_type: Option<PoultryTypeArg>,

    /// Filter by flock/shed
    #[arg(short, long)]
    pub flock: Option<String>,

    /// Filter by calendar date (YYYY-MM-DD)
    #[arg(short, long)]
    pub date: Option<NaiveDate>,

    /// Maximum number of records
    #[arg(short, long, default_value = "20")]
    pub limit: usize,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

impl HistoryCommand {
    /// Translate the flags into a storage filter.
    #[must_use]
    pub fn filter(&self) -> RecordFilter {
        RecordFilter {
            poultry_type: self.poultry_type.map(PoultryType::from),
            flock_id: self.flock.clone(),
            day: self.date,
            limit: Some(self.limit),
        }
    }
}

/// Show a trend series for one metric.
#[derive(Debug, Args)]
pub struct TrendCommand {
    /// The metric to chart
    #[arg(value_enum)]
    pub metric: TrendMetricArg,

    /// Flock/shed to chart
    #[arg(short, long)]
    pub flock: String,

    /// Day window (defaults to trends.window_days)
    #[arg(short, long)]
    pub days: Option<u32>,

    /// Output format
    #[arg(long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Evaluate today's alert battery.
#[derive(Debug, Args)]
pub struct AlertsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Export filtered records to a spreadsheet file.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Filter by poultry type
    #[arg(short = 't', long = "type", value_enum)]
    pub poultry_type: Option<PoultryTypeArg>,

    /// Filter by flock/shed
    #[arg(short, long)]
    pub flock: Option<String>,

    /// Filter by calendar date (YYYY-MM-DD)
    #[arg(short, long)]
    pub date: Option<NaiveDate>,

    /// Output file (defaults to flock_records_<timestamp>.csv)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl ExportCommand {
    /// Translate the flags into a storage filter (no limit).
    #[must_use]
    pub fn filter(&self) -> RecordFilter {
        RecordFilter {
            poultry_type: self.poultry_type.map(PoultryType::from),
            flock_id: self.flock.clone(),
            day: self.date,
            limit: None,
        }
    }
}

/// Show storage statistics.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Poultry type argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PoultryTypeArg {
    /// Meat birds
    Broiler,
    /// Egg-laying hens
    Layer,
    /// Breeding stock
    Breeder,
}

impl From<PoultryTypeArg> for PoultryType {
    fn from(arg: PoultryTypeArg) -> Self {
        match arg {
            PoultryTypeArg::Broiler => Self::Broiler,
            PoultryTypeArg::Layer => Self::Layer,
            PoultryTypeArg::Breeder => Self::Breeder,
        }
    }
}

/// Low/normal/high argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LevelArg {
    /// Below the expected range
    Low,
    /// Within the expected range
    #[default]
    Normal,
    /// Above the expected range
    High,
}

impl From<LevelArg> for Level {
    fn from(arg: LevelArg) -> Self {
        match arg {
            LevelArg::Low => Self::Low,
            LevelArg::Normal => Self::Normal,
            LevelArg::High => Self::High,
        }
    }
}

/// Litter condition argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LitterArg {
    /// Dry bedding
    #[default]
    Dry,
    /// Damp patches present
    SlightlyWet,
    /// Saturated bedding
    VeryWet,
}

impl From<LitterArg> for LitterCondition {
    fn from(arg: LitterArg) -> Self {
        match arg {
            LitterArg::Dry => Self::Dry,
            LitterArg::SlightlyWet => Self::SlightlyWet,
            LitterArg::VeryWet => Self::VeryWet,
        }
    }
}

/// Flock demeanor argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BehaviorArg {
    /// Active and feeding as usual
    #[default]
    Normal,
    /// Pecking or fighting beyond the usual
    Aggressive,
    /// Listless, huddled, or unresponsive
    Lethargic,
}

impl From<BehaviorArg> for BirdBehavior {
    fn from(arg: BehaviorArg) -> Self {
        match arg {
            BehaviorArg::Normal => Self::Normal,
            BehaviorArg::Aggressive => Self::Aggressive,
            BehaviorArg::Lethargic => Self::Lethargic,
        }
    }
}

/// Egg quality argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum EggQualityArg {
    /// Sound shells
    #[default]
    Good,
    /// Cracked or broken shells
    Broken,
    /// Undersized eggs
    Small,
}

impl From<EggQualityArg> for EggQuality {
    fn from(arg: EggQualityArg) -> Self {
        match arg {
            EggQualityArg::Good => Self::Good,
            EggQualityArg::Broken => Self::Broken,
            EggQualityArg::Small => Self::Small,
        }
    }
}

/// Trend metric argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TrendMetricArg {
    /// Feed given per observation
    Feed,
    /// Mortality rate per observation
    Mortality,
    /// Eggs collected per observation
    Eggs,
}

impl From<TrendMetricArg> for TrendMetric {
    fn from(arg: TrendMetricArg) -> Self {
        match arg {
            TrendMetricArg::Feed => Self::Feed,
            TrendMetricArg::Mortality => Self::Mortality,
            TrendMetricArg::Eggs => Self::EggProduction,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}
