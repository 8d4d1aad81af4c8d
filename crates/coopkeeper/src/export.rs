//! Spreadsheet export of flock records.
//!
//! Writes a header row followed by one CSV row per record. Yes/no
//! observations are exported as "Yes"/"No" and absent fields as empty
//! cells, so the sheet reads the way the entry form does.

use std::io::Write;

use crate::error::Result;
use crate::record::FlockRecord;

/// Exported column names, in row order.
pub const CSV_COLUMNS: &[&str] = &[
    "id",
    "poultry_type",
    "recorded_at",
    "flock_id",
    "feed_given_kg",
    "water_consumed",
    "dead_birds",
    "vaccine_given",
    "vaccine_name",
    "avg_bird_weight_kg",
    "bird_age_days",
    "temp_humidity",
    "remarks",
    "shed_cleaned",
    "feeders_clean",
    "litter_condition",
    "sick_birds",
    "sick_symptoms",
    "bird_behavior",
    "ventilation_ok",
    "bad_smell",
    "biosecurity_followed",
    "footbath_used",
    "photo_uploaded",
    "fcr_value",
    "dead_bird_reason",
    "growth_rate_normal",
    "overcrowding",
    "lameness",
    "eggs_collected",
    "egg_production_pct",
    "egg_quality",
    "nest_boxes_clean",
    "cannibalism",
    "fertile_eggs",
    "hatchability_pct",
    "male_female_ratio_ok",
    "mating_behavior_seen",
    "eggs_handled_properly",
];

/// Write records as CSV to the given writer.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_csv<W: Write>(records: &[FlockRecord], mut out: W) -> Result<()> {
    writeln!(out, "{}", CSV_COLUMNS.join(","))?;
    for record in records {
        let row: Vec<String> = row_values(record).iter().map(|v| escape(v)).collect();
        writeln!(out, "{}", row.join(","))?;
    }
    Ok(())
}

/// Render records as a CSV string.
///
/// # Errors
///
/// Returns an error if writing fails (not expected for in-memory output).
pub fn to_csv_string(records: &[FlockRecord]) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(records, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Cell values for one record, in [`CSV_COLUMNS`] order.
fn row_values(record: &FlockRecord) -> Vec<String> {
    vec![
        record.id.map(|id| id.to_string()).unwrap_or_default(),
        record.poultry_type.to_string(),
        record.recorded_at.to_rfc3339(),
        record.flock_id.clone(),
        record.feed_given_kg.to_string(),
        record.water_consumed.to_string(),
        record.dead_birds.to_string(),
        yes_no(record.vaccine_given),
        opt_string(record.vaccine_name.as_deref()),
        opt_number(record.avg_bird_weight_kg),
        record.bird_age_days.to_string(),
        record.temp_humidity.to_string(),
        opt_string(record.remarks.as_deref()),
        yes_no(record.shed_cleaned),
        yes_no(record.feeders_clean),
        record.litter_condition.to_string(),
        yes_no(record.sick_birds),
        opt_string(record.sick_symptoms.as_deref()),
        record.bird_behavior.to_string(),
        yes_no(record.ventilation_ok),
        yes_no(record.bad_smell),
        yes_no(record.biosecurity_followed),
        yes_no(record.footbath_used),
        yes_no(record.photo_uploaded),
        opt_number(record.fcr_value),
        opt_string(record.dead_bird_reason.as_deref()),
        opt_yes_no(record.growth_rate_normal),
        opt_yes_no(record.overcrowding),
        opt_yes_no(record.lameness),
        record.eggs_collected.map(|n| n.to_string()).unwrap_or_default(),
        opt_number(record.egg_production_pct),
        record.egg_quality.map(|q| q.to_string()).unwrap_or_default(),
        opt_yes_no(record.nest_boxes_clean),
        opt_yes_no(record.cannibalism),
        record.fertile_eggs.map(|n| n.to_string()).unwrap_or_default(),
        opt_number(record.hatchability_pct),
        opt_yes_no(record.male_female_ratio_ok),
        opt_yes_no(record.mating_behavior_seen),
        opt_yes_no(record.eggs_handled_properly),
    ]
}

fn yes_no(value: bool) -> String {
    let s = if value { "Yes" } else { "No" };
    s.to_string()
}

fn opt_yes_no(value: Option<bool>) -> String {
    value.map(yes_no).unwrap_or_default()
}

fn opt_string(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

fn opt_number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Quote a cell if it contains a comma, quote, or newline.
fn escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{EggQuality, PoultryType};

    fn sample() -> FlockRecord {
        let mut record = FlockRecord::new("Shed2", PoultryType::Layer, 9.5, 2);
        record.id = Some(7);
        record.eggs_collected = Some(81);
        record.egg_quality = Some(EggQuality::Good);
        record
    }

    #[test]
    fn test_escape_plain_value() {
        assert_eq!(escape("Shed1"), "Shed1");
    }

    #[test]
    fn test_escape_comma_and_quote() {
        assert_eq!(escape("hello, world"), "\"hello, world\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_header_row() {
        let csv = to_csv_string(&[]).unwrap();
        let header = csv.lines().next().unwrap();
        assert!(header.starts_with("id,poultry_type,recorded_at,flock_id"));
        assert_eq!(header.split(',').count(), CSV_COLUMNS.len());
    }

    #[test]
    fn test_row_count_matches_records() {
        let csv = to_csv_string(&[sample(), sample()]).unwrap();
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn test_row_values_width_matches_header() {
        assert_eq!(row_values(&sample()).len(), CSV_COLUMNS.len());
    }

    #[test]
    fn test_yes_no_rendering() {
        let record = sample();
        let csv = to_csv_string(std::slice::from_ref(&record)).unwrap();
        let row = csv.lines().nth(1).unwrap();
        // ventilation_ok defaults to true, bad_smell to false
        assert!(row.contains(",Yes,"));
        assert!(row.contains(",No,"));
    }

    #[test]
    fn test_absent_fields_are_empty_cells() {
        let record = sample();
        let csv = to_csv_string(std::slice::from_ref(&record)).unwrap();
        let row = csv.lines().nth(1).unwrap();
        let cells: Vec<&str> = row.split(',').collect();

        let fcr_index = CSV_COLUMNS.iter().position(|c| *c == "fcr_value").unwrap();
        assert_eq!(cells[fcr_index], "");
    }

    #[test]
    fn test_remarks_with_commas_stay_one_cell() {
        let mut record = sample();
        record.remarks = Some("wet litter, refilled feeders".to_string());
        let csv = to_csv_string(std::slice::from_ref(&record)).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains("\"wet litter, refilled feeders\""));
    }

    #[test]
    fn test_layer_fields_rendered() {
        let csv = to_csv_string(&[sample()]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains("81"));
        assert!(row.contains("Good"));
    }
}
