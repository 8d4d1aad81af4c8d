//! Rule-based husbandry alerts.
//!
//! A fixed battery of ten independent checks runs over today's (or the
//! last two days') records and produces message/severity pairs. Rules
//! do not interact; each fires at most once per evaluation.

mod symptoms;

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::record::{BirdBehavior, FlockRecord, Level, LitterCondition};
use crate::storage::Storage;

pub use symptoms::{default_symptom_patterns, SymptomMatcher};

/// How urgent a fired alert is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Routine was missed or a reading drifted; worth a look.
    Warning,
    /// A husbandry problem is likely; act today.
    Alert,
    /// Birds are at immediate risk; act now.
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "Warning"),
            Self::Alert => write!(f, "Alert"),
            Self::Critical => write!(f, "Critical"),
        }
    }
}

/// A fired alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FarmAlert {
    /// Stable identifier of the rule that fired.
    pub rule: &'static str,
    /// How urgent the alert is.
    pub severity: Severity,
    /// Operator-facing message.
    pub message: String,
}

impl FarmAlert {
    fn new(rule: &'static str, severity: Severity, message: &str) -> Self {
        Self {
            rule,
            severity,
            message: message.to_string(),
        }
    }
}

/// Tunables for the rule battery.
#[derive(Debug, Clone)]
pub struct AlertContext {
    /// Number of birds per flock, for the mortality-rate check.
    pub flock_size: u32,
    /// Deaths above this percentage of the flock are critical.
    pub mortality_threshold_pct: f64,
    /// Symptom patterns that indicate disease onset.
    pub symptoms: SymptomMatcher,
}

impl Default for AlertContext {
    fn default() -> Self {
        Self {
            flock_size: 100,
            mortality_threshold_pct: 5.0,
            symptoms: SymptomMatcher::default(),
        }
    }
}

/// Evaluate the full rule battery for a day.
///
/// Fetches today's records and the two-day lookback window once, then
/// runs every rule over them. The returned alerts are in fixed rule
/// order.
///
/// # Errors
///
/// Returns an error if a storage query fails.
pub fn evaluate(storage: &Storage, today: NaiveDate, ctx: &AlertContext) -> Result<Vec<FarmAlert>> {
    let today_records = storage.records_on(today)?;
    let window = storage.records_since(today - Duration::days(2))?;

    let mut alerts = Vec::new();
    alerts.extend(missing_feed(&today_records));
    alerts.extend(low_water(&window));
    alerts.extend(high_mortality(&today_records, ctx));
    alerts.extend(vaccine_skipped(&today_records));
    alerts.extend(temperature_stress(&today_records));
    alerts.extend(ammonia_risk(&today_records));
    alerts.extend(lethargic_birds(&today_records));
    alerts.extend(disease_symptoms(&today_records, &ctx.symptoms));
    alerts.extend(cleaning_skipped(&window));
    alerts.extend(ventilation_off(&today_records));

    Ok(alerts)
}

/// Rule 1: no feed entry for today, or every entry reports zero feed.
fn missing_feed(today: &[FlockRecord]) -> Option<FarmAlert> {
    let total: f64 = today.iter().map(|r| r.feed_given_kg).sum();
    if today.is_empty() || total <= f64::EPSILON {
        Some(FarmAlert::new(
            "missing-feed",
            Severity::Alert,
            "Feed input missing. Enter or verify data.",
        ))
    } else {
        None
    }
}

/// Rule 2: low water intake on two or more distinct days in the window.
fn low_water(window: &[FlockRecord]) -> Option<FarmAlert> {
    let days = distinct_days(window.iter().filter(|r| r.water_consumed == Level::Low));
    (days >= 2).then(|| {
        FarmAlert::new(
            "low-water",
            Severity::Alert,
            "Possible dehydration. Inspect water lines & supply.",
        )
    })
}

/// Rule 3: deaths today above the mortality threshold for the flock size.
fn high_mortality(today: &[FlockRecord], ctx: &AlertContext) -> Option<FarmAlert> {
    let threshold = ctx.mortality_threshold_pct / 100.0 * f64::from(ctx.flock_size);
    today
        .iter()
        .any(|r| f64::from(r.dead_birds) > threshold)
        .then(|| {
            FarmAlert::new(
                "high-mortality",
                Severity::Critical,
                "Unusual bird death. Immediate vet check.",
            )
        })
}

/// Rule 4: a weekly vaccination day passed without a recorded vaccine.
fn vaccine_skipped(today: &[FlockRecord]) -> Option<FarmAlert> {
    today
        .iter()
        .any(|r| r.bird_age_days % 7 == 0 && !r.vaccine_given)
        .then(|| {
            FarmAlert::new(
                "vaccine-skipped",
                Severity::Warning,
                "Vaccine due but not recorded.",
            )
        })
}

/// Rule 5: temperature/humidity out of the normal band today.
fn temperature_stress(today: &[FlockRecord]) -> Option<FarmAlert> {
    today
        .iter()
        .any(|r| r.temp_humidity != Level::Normal)
        .then(|| {
            FarmAlert::new(
                "temperature-stress",
                Severity::Alert,
                "Environmental stress risk. Adjust ventilation.",
            )
        })
}

/// Rule 6: saturated litter together with a bad smell today.
fn ammonia_risk(today: &[FlockRecord]) -> Option<FarmAlert> {
    today
        .iter()
        .any(|r| r.litter_condition == LitterCondition::VeryWet && r.bad_smell)
        .then(|| {
            FarmAlert::new(
                "ammonia-risk",
                Severity::Alert,
                "Ammonia hazard. Clean urgently.",
            )
        })
}

/// Rule 7: lethargic flock demeanor today.
fn lethargic_birds(today: &[FlockRecord]) -> Option<FarmAlert> {
    today
        .iter()
        .any(|r| r.bird_behavior == BirdBehavior::Lethargic)
        .then(|| {
            FarmAlert::new(
                "lethargic-birds",
                Severity::Alert,
                "Health problem suspected. Observe closely.",
            )
        })
}

/// Rule 8: sick birds whose symptoms match a disease pattern today.
fn disease_symptoms(today: &[FlockRecord], symptoms: &SymptomMatcher) -> Option<FarmAlert> {
    today
        .iter()
        .filter(|r| r.sick_birds)
        .filter_map(|r| r.sick_symptoms.as_deref())
        .any(|s| symptoms.matches(s))
        .then(|| FarmAlert::new("disease-symptoms", Severity::Alert, "Possible disease onset."))
}

/// Rule 9: shed cleaning skipped on two or more distinct days in the window.
fn cleaning_skipped(window: &[FlockRecord]) -> Option<FarmAlert> {
    let days = distinct_days(window.iter().filter(|r| !r.shed_cleaned));
    (days >= 2).then(|| {
        FarmAlert::new(
            "cleaning-skipped",
            Severity::Alert,
            "Hygiene routine skipped. Risk of contamination.",
        )
    })
}

/// Rule 10: ventilation not working today.
fn ventilation_off(today: &[FlockRecord]) -> Option<FarmAlert> {
    today.iter().any(|r| !r.ventilation_ok).then(|| {
        FarmAlert::new(
            "ventilation-off",
            Severity::Warning,
            "Ventilation inactive. Risk of heatstroke/ammonia buildup.",
        )
    })
}

/// Count the distinct calendar days among the given records.
fn distinct_days<'a>(records: impl Iterator<Item = &'a FlockRecord>) -> usize {
    records
        .map(FlockRecord::recorded_date)
        .collect::<BTreeSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PoultryType;
    use chrono::Utc;

    fn record() -> FlockRecord {
        FlockRecord::new("Shed1", PoultryType::Broiler, 12.0, 0)
    }

    fn days_ago(mut r: FlockRecord, days: i64) -> FlockRecord {
        r.recorded_at = Utc::now() - Duration::days(days);
        r
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Warning < Severity::Alert);
        assert!(Severity::Alert < Severity::Critical);
    }

    #[test]
    fn test_missing_feed_fires_on_empty_day() {
        let alert = missing_feed(&[]).expect("should fire");
        assert_eq!(alert.rule, "missing-feed");
        assert_eq!(alert.severity, Severity::Alert);
    }

    #[test]
    fn test_missing_feed_fires_on_zero_feed() {
        let mut r = record();
        r.feed_given_kg = 0.0;
        assert!(missing_feed(&[r]).is_some());
    }

    #[test]
    fn test_missing_feed_silent_when_fed() {
        assert!(missing_feed(&[record()]).is_none());
    }

    #[test]
    fn test_low_water_needs_two_distinct_days() {
        let mut yesterday = days_ago(record(), 1);
        yesterday.water_consumed = Level::Low;
        let mut today = record();
        today.water_consumed = Level::Low;

        assert!(low_water(&[today.clone()]).is_none());
        assert!(low_water(&[yesterday, today]).is_some());
    }

    #[test]
    fn test_low_water_same_day_does_not_count_twice() {
        let mut first = record();
        first.water_consumed = Level::Low;
        let mut second = record();
        second.water_consumed = Level::Low;

        assert!(low_water(&[first, second]).is_none());
    }

    #[test]
    fn test_high_mortality_threshold() {
        let ctx = AlertContext::default();

        let mut r = record();
        r.dead_birds = 5; // exactly 5% of 100, not above
        assert!(high_mortality(&[r], &ctx).is_none());

        let mut r = record();
        r.dead_birds = 6;
        let alert = high_mortality(&[r], &ctx).expect("should fire");
        assert_eq!(alert.severity, Severity::Critical);
    }

    #[test]
    fn test_high_mortality_respects_flock_size() {
        let ctx = AlertContext {
            flock_size: 1000,
            ..Default::default()
        };
        let mut r = record();
        r.dead_birds = 30;
        assert!(high_mortality(&[r], &ctx).is_none());
    }

    #[test]
    fn test_vaccine_skipped_on_weekly_age() {
        let mut r = record();
        r.bird_age_days = 21;
        assert!(vaccine_skipped(&[r.clone()]).is_some());

        r.vaccine_given = true;
        r.vaccine_name = Some("Vaccine A".to_string());
        assert!(vaccine_skipped(&[r.clone()]).is_none());

        r.vaccine_given = false;
        r.bird_age_days = 22;
        assert!(vaccine_skipped(&[r]).is_none());
    }

    #[test]
    fn test_temperature_stress_on_either_extreme() {
        let mut hot = record();
        hot.temp_humidity = Level::High;
        assert!(temperature_stress(&[hot]).is_some());

        let mut cold = record();
        cold.temp_humidity = Level::Low;
        assert!(temperature_stress(&[cold]).is_some());

        assert!(temperature_stress(&[record()]).is_none());
    }

    #[test]
    fn test_ammonia_risk_needs_both_conditions() {
        let mut wet = record();
        wet.litter_condition = LitterCondition::VeryWet;
        assert!(ammonia_risk(&[wet.clone()]).is_none());

        wet.bad_smell = true;
        assert!(ammonia_risk(&[wet]).is_some());

        let mut smelly = record();
        smelly.bad_smell = true;
        assert!(ammonia_risk(&[smelly]).is_none());
    }

    #[test]
    fn test_lethargic_birds() {
        let mut r = record();
        r.bird_behavior = BirdBehavior::Lethargic;
        assert!(lethargic_birds(&[r]).is_some());

        let mut r = record();
        r.bird_behavior = BirdBehavior::Aggressive;
        assert!(lethargic_birds(&[r]).is_none());
    }

    #[test]
    fn test_disease_symptoms_matching() {
        let matcher = SymptomMatcher::default();

        let mut r = record();
        r.sick_birds = true;
        r.sick_symptoms = Some("Diarrhea and coughing".to_string());
        assert!(disease_symptoms(&[r], &matcher).is_some());

        let mut r = record();
        r.sick_birds = true;
        r.sick_symptoms = Some("ruffled feathers".to_string());
        assert!(disease_symptoms(&[r], &matcher).is_some());

        let mut r = record();
        r.sick_birds = true;
        r.sick_symptoms = Some("limping".to_string());
        assert!(disease_symptoms(&[r], &matcher).is_none());
    }

    #[test]
    fn test_disease_symptoms_ignored_without_sick_flag() {
        let matcher = SymptomMatcher::default();
        let mut r = record();
        r.sick_symptoms = Some("diarrhea".to_string());
        assert!(disease_symptoms(&[r], &matcher).is_none());
    }

    #[test]
    fn test_disease_symptoms_fires_once_for_many_rows() {
        let matcher = SymptomMatcher::default();
        let mut rows = Vec::new();
        for _ in 0..3 {
            let mut r = record();
            r.sick_birds = true;
            r.sick_symptoms = Some("diarrhea".to_string());
            rows.push(r);
        }
        assert!(disease_symptoms(&rows, &matcher).is_some());
    }

    #[test]
    fn test_cleaning_skipped_two_days() {
        let mut yesterday = days_ago(record(), 1);
        yesterday.shed_cleaned = false;
        let mut today = record();
        today.shed_cleaned = false;

        assert!(cleaning_skipped(&[today.clone()]).is_none());
        assert!(cleaning_skipped(&[yesterday, today]).is_some());
    }

    #[test]
    fn test_ventilation_off() {
        let mut r = record();
        r.ventilation_ok = false;
        let alert = ventilation_off(&[r]).expect("should fire");
        assert_eq!(alert.severity, Severity::Warning);

        assert!(ventilation_off(&[record()]).is_none());
    }

    #[test]
    fn test_evaluate_quiet_day() {
        let storage = Storage::open_in_memory().unwrap();
        let mut r = record();
        r.shed_cleaned = true;
        r.bird_age_days = 22;
        storage.insert(&r).unwrap();

        let alerts = evaluate(&storage, Utc::now().date_naive(), &AlertContext::default()).unwrap();
        assert!(alerts.is_empty(), "unexpected alerts: {alerts:?}");
    }

    #[test]
    fn test_evaluate_empty_storage_reports_missing_feed() {
        let storage = Storage::open_in_memory().unwrap();
        let alerts = evaluate(&storage, Utc::now().date_naive(), &AlertContext::default()).unwrap();

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].rule, "missing-feed");
    }

    #[test]
    fn test_evaluate_bad_day_fires_many_rules() {
        let storage = Storage::open_in_memory().unwrap();

        let mut yesterday = days_ago(record(), 1);
        yesterday.shed_cleaned = false;
        yesterday.water_consumed = Level::Low;
        storage.insert(&yesterday).unwrap();

        let mut today = record();
        today.shed_cleaned = false;
        today.water_consumed = Level::Low;
        today.dead_birds = 12;
        today.temp_humidity = Level::High;
        today.litter_condition = LitterCondition::VeryWet;
        today.bad_smell = true;
        today.bird_behavior = BirdBehavior::Lethargic;
        today.ventilation_ok = false;
        today.sick_birds = true;
        today.sick_symptoms = Some("severe diarrhea".to_string());
        today.bird_age_days = 28;
        storage.insert(&today).unwrap();

        let alerts = evaluate(&storage, Utc::now().date_naive(), &AlertContext::default()).unwrap();
        let rules: Vec<&str> = alerts.iter().map(|a| a.rule).collect();

        assert_eq!(
            rules,
            vec![
                "low-water",
                "high-mortality",
                "vaccine-skipped",
                "temperature-stress",
                "ammonia-risk",
                "lethargic-birds",
                "disease-symptoms",
                "cleaning-skipped",
                "ventilation-off",
            ]
        );
        assert!(alerts.iter().all(|a| !a.message.is_empty()));
    }

    #[test]
    fn test_evaluate_only_looks_at_requested_day() {
        let storage = Storage::open_in_memory().unwrap();
        let mut old = days_ago(record(), 5);
        old.dead_birds = 50;
        storage.insert(&old).unwrap();

        let alerts = evaluate(&storage, Utc::now().date_naive(), &AlertContext::default()).unwrap();
        assert!(alerts.iter().all(|a| a.rule != "high-mortality"));
    }
}
