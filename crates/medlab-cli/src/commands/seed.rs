//! Mock data generation for demos and local development.
//!
//! The dataset mirrors a small diagnostic lab: a fixed catalog of tests
//! across ten categories, gendered reference ranges where they matter, and
//! randomized patients and orders spread over the last month. Orders in the
//! two result-bearing states also get plausible result values drawn around
//! their ANY-bucket range.

use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use chrono::{Duration, Local, NaiveDateTime};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use medlab_core::{
    CatalogRange, Gender, GenderBucket, OrderStatus, Priority, ReferenceRange, ResultFlag,
    resolve_for_snapshot,
};
use medlab_db_mysql::{DbConfig, MySqlPool, SchemaManager, create_pool, ensure_database};

use crate::cli::SeedArgs;
use crate::output::{print_success, print_warning};

const CATEGORIES: [(&str, &str); 10] = [
    ("Hematology", "Blood cell counts and related tests"),
    ("Clinical Chemistry", "Blood chemistry and metabolic tests"),
    ("Lipid Profile", "Cholesterol and lipid tests"),
    ("Diabetes Panel", "Blood sugar and diabetes tests"),
    ("Kidney Function", "Renal function tests"),
    ("Liver Function", "Hepatic function tests"),
    ("Thyroid Function", "Thyroid hormone tests"),
    ("Urine Analysis", "Urine tests"),
    ("Radiology", "Imaging tests"),
    ("Serology", "Antibody and antigen tests"),
];

// (name, category position, sample type, unit, catalog min, catalog max, price)
type TestRow = (
    &'static str,
    usize,
    &'static str,
    Option<&'static str>,
    Option<f64>,
    Option<f64>,
    f64,
);

const TESTS: [TestRow; 46] = [
    // Hematology
    ("Complete Blood Count (CBC)", 1, "Blood", None, None, None, 400.0),
    ("Hemoglobin (Hb)", 1, "Blood", Some("g/dL"), None, None, 250.0),
    ("Total Leukocyte Count (TLC)", 1, "Blood", Some("cells/µL"), Some(4000.0), Some(11000.0), 200.0),
    ("Platelet Count", 1, "Blood", Some("lakh/µL"), Some(1.5), Some(4.5), 220.0),
    ("ESR (Erythrocyte Sedimentation Rate)", 1, "Blood", Some("mm/hr"), Some(0.0), Some(20.0), 180.0),
    // Clinical Chemistry
    ("Blood Urea", 2, "Blood", Some("mg/dL"), Some(15.0), Some(40.0), 220.0),
    ("Serum Creatinine", 2, "Blood", Some("mg/dL"), None, None, 300.0),
    ("Uric Acid", 2, "Blood", Some("mg/dL"), Some(3.5), Some(7.2), 280.0),
    ("Serum Calcium", 2, "Blood", Some("mg/dL"), Some(8.5), Some(10.5), 300.0),
    ("Serum Sodium", 2, "Blood", Some("mEq/L"), Some(135.0), Some(145.0), 250.0),
    ("Serum Potassium", 2, "Blood", Some("mEq/L"), Some(3.5), Some(5.5), 250.0),
    // Lipid Profile
    ("Lipid Profile", 3, "Blood", Some("mg/dL"), None, None, 800.0),
    ("Total Cholesterol", 3, "Blood", Some("mg/dL"), Some(0.0), Some(200.0), 350.0),
    ("HDL Cholesterol", 3, "Blood", Some("mg/dL"), None, None, 350.0),
    ("LDL Cholesterol", 3, "Blood", Some("mg/dL"), Some(0.0), Some(100.0), 350.0),
    ("Triglycerides", 3, "Blood", Some("mg/dL"), Some(0.0), Some(150.0), 350.0),
    ("VLDL Cholesterol", 3, "Blood", Some("mg/dL"), Some(5.0), Some(40.0), 300.0),
    // Diabetes Panel
    ("Fasting Blood Sugar", 4, "Blood", Some("mg/dL"), Some(70.0), Some(100.0), 200.0),
    ("Fasting Blood Glucose (FBS)", 4, "Blood", Some("mg/dL"), Some(70.0), Some(99.0), 180.0),
    ("Postprandial Blood Sugar (PPBS)", 4, "Blood", Some("mg/dL"), Some(80.0), Some(140.0), 200.0),
    ("HbA1c", 4, "Blood", Some("%"), Some(4.0), Some(5.6), 400.0),
    ("Random Blood Sugar (RBS)", 4, "Blood", Some("mg/dL"), Some(70.0), Some(140.0), 150.0),
    // Kidney Function
    ("Blood Urea Nitrogen (BUN)", 5, "Blood", Some("mg/dL"), Some(7.0), Some(20.0), 250.0),
    ("eGFR (Estimated GFR)", 5, "Blood", Some("mL/min"), Some(90.0), Some(120.0), 400.0),
    ("Microalbumin Urine", 5, "Urine", Some("mg/L"), Some(0.0), Some(30.0), 500.0),
    // Liver Function
    ("SGPT / ALT", 6, "Blood", Some("U/L"), Some(7.0), Some(56.0), 280.0),
    ("SGOT / AST", 6, "Blood", Some("U/L"), Some(10.0), Some(40.0), 280.0),
    ("Alkaline Phosphatase", 6, "Blood", Some("U/L"), Some(30.0), Some(120.0), 300.0),
    ("Bilirubin Total", 6, "Blood", Some("mg/dL"), Some(0.3), Some(1.2), 280.0),
    ("Bilirubin Direct", 6, "Blood", Some("mg/dL"), Some(0.0), Some(0.3), 280.0),
    ("Total Protein", 6, "Blood", Some("g/dL"), Some(6.0), Some(8.0), 250.0),
    ("Albumin", 6, "Blood", Some("g/dL"), Some(3.5), Some(5.5), 250.0),
    // Thyroid Function
    ("TSH (Thyroid Stimulating Hormone)", 7, "Blood", Some("µIU/mL"), Some(0.27), Some(4.2), 450.0),
    ("T3 (Triiodothyronine)", 7, "Blood", Some("ng/dL"), Some(80.0), Some(200.0), 400.0),
    ("T4 (Thyroxine)", 7, "Blood", Some("µg/dL"), Some(4.5), Some(12.0), 400.0),
    ("Free T3", 7, "Blood", Some("pg/mL"), Some(2.0), Some(4.4), 500.0),
    ("Free T4", 7, "Blood", Some("ng/dL"), Some(0.8), Some(1.8), 500.0),
    // Urine Analysis
    ("Urine Routine", 8, "Urine", None, None, None, 250.0),
    ("Urine Culture", 8, "Urine", None, None, None, 600.0),
    ("24-Hour Urine Protein", 8, "Urine", Some("mg/24h"), Some(0.0), Some(150.0), 450.0),
    // Radiology
    ("Chest X-Ray", 9, "Imaging", None, None, None, 1000.0),
    ("Ultrasound Abdomen", 9, "Imaging", None, None, None, 1500.0),
    ("ECG", 9, "Cardiac", None, None, None, 300.0),
    // Serology
    ("Vitamin D", 10, "Blood", Some("ng/mL"), Some(30.0), Some(100.0), 1200.0),
    ("Vitamin B12", 10, "Blood", Some("pg/mL"), Some(200.0), Some(900.0), 800.0),
    ("Iron Studies", 10, "Blood", Some("µg/dL"), Some(60.0), Some(170.0), 600.0),
];

// (test name, gender bucket, min, max, unit, notes)
type RangeRow = (&'static str, &'static str, f64, f64, &'static str, &'static str);

const RANGES: [RangeRow; 18] = [
    ("Hemoglobin (Hb)", "M", 13.0, 17.0, "g/dL", "Normal range for adult males"),
    ("Hemoglobin (Hb)", "F", 12.0, 15.0, "g/dL", "Normal range for adult females"),
    ("HDL Cholesterol", "M", 40.0, 999.0, "mg/dL", "Higher is better for males"),
    ("HDL Cholesterol", "F", 50.0, 999.0, "mg/dL", "Higher is better for females"),
    ("Serum Creatinine", "M", 0.7, 1.3, "mg/dL", "Normal range for males"),
    ("Serum Creatinine", "F", 0.6, 1.1, "mg/dL", "Normal range for females"),
    ("ESR (Erythrocyte Sedimentation Rate)", "M", 0.0, 15.0, "mm/hr", "Males"),
    ("ESR (Erythrocyte Sedimentation Rate)", "F", 0.0, 20.0, "mm/hr", "Females"),
    ("Uric Acid", "M", 3.5, 7.2, "mg/dL", "Males"),
    ("Uric Acid", "F", 2.6, 6.0, "mg/dL", "Females"),
    ("Fasting Blood Glucose (FBS)", "ANY", 70.0, 99.0, "mg/dL", "Normal fasting glucose"),
    ("Postprandial Blood Sugar (PPBS)", "ANY", 80.0, 140.0, "mg/dL", "2 hours after meal"),
    ("HbA1c", "ANY", 4.0, 5.6, "%", "Normal glycemic control"),
    ("Total Cholesterol", "ANY", 0.0, 200.0, "mg/dL", "Desirable level"),
    ("Triglycerides", "ANY", 0.0, 150.0, "mg/dL", "Normal level"),
    ("TSH (Thyroid Stimulating Hormone)", "ANY", 0.27, 4.2, "µIU/mL", "Normal thyroid function"),
    ("Total Leukocyte Count (TLC)", "ANY", 4000.0, 11000.0, "cells/µL", "Normal WBC count"),
    ("Platelet Count", "ANY", 1.5, 4.5, "lakh/µL", "Normal platelet count"),
];

const MALE_FIRST_NAMES: [&str; 10] = [
    "Rajesh", "Amit", "Suresh", "Vikram", "Rahul", "Anil", "Deepak", "Manoj", "Kiran", "Sachin",
];

const FEMALE_FIRST_NAMES: [&str; 10] = [
    "Priya", "Anjali", "Sneha", "Kavita", "Pooja", "Rekha", "Neha", "Swati", "Divya", "Meera",
];

const LAST_NAMES: [&str; 12] = [
    "Kumar", "Sharma", "Reddy", "Rao", "Patel", "Singh", "Iyer", "Nair", "Gupta", "Verma",
    "Joshi", "Desai",
];

const AREAS: [&str; 7] = [
    "Jayanagar", "Koramangala", "Indiranagar", "Malleshwaram", "Rajajinagar", "Hebbal",
    "Whitefield",
];

const DOCTORS: [(&str, &str, &str, &str); 10] = [
    ("Dr. Ramesh Kumar", "General Physician", "+91-9845012345", "dr.ramesh@medlab.com"),
    ("Dr. Sunita Sharma", "Cardiologist", "+91-9845012346", "dr.sunita@medlab.com"),
    ("Dr. Arun Reddy", "Endocrinologist", "+91-9845012347", "dr.arun@medlab.com"),
    ("Dr. Kavita Iyer", "Nephrologist", "+91-9845012348", "dr.kavita@medlab.com"),
    ("Dr. Vijay Patel", "Pathologist", "+91-9845012349", "dr.vijay@medlab.com"),
    ("Dr. Anjali Rao", "Radiologist", "+91-9845012350", "dr.anjali@medlab.com"),
    ("Dr. Manoj Singh", "General Surgeon", "+91-9845012351", "dr.manoj@medlab.com"),
    ("Dr. Priya Nair", "Pediatrician", "+91-9845012352", "dr.priya@medlab.com"),
    ("Dr. Suresh Gupta", "Gastroenterologist", "+91-9845012353", "dr.suresh@medlab.com"),
    ("Dr. Lakshmi Desai", "Gynecologist", "+91-9845012354", "dr.lakshmi@medlab.com"),
];

const ORDER_NOTES: [Option<&str>; 6] = [
    Some("Routine checkup"),
    Some("Follow-up tests"),
    Some("Pre-employment medical"),
    Some("Annual health screening"),
    Some("Doctor referral"),
    None,
];

const SETTINGS: [(&str, &str); 7] = [
    ("lab_name", "MedLAB+ Diagnostic Center"),
    ("lab_address", "123 Medical Complex, Mysuru, Karnataka - 570001"),
    ("lab_phone", "+91-821-2345678"),
    ("lab_email", "contact@medlabplus.com"),
    ("lab_license", "KA-MYS-LAB-2024-12345"),
    ("report_header", "Accredited Laboratory - ISO 9001:2015 Certified"),
    ("report_footer", "This report is computer generated and does not require signature"),
];

/// Emptied in foreign-key order: children before the tables they reference.
const CLEAR_ORDER: [&str; 9] = [
    "activity_log",
    "test_order_tests",
    "test_orders",
    "test_reference_ranges",
    "tests",
    "test_categories",
    "doctors",
    "patients",
    "app_settings",
];

/// One catalog row as inserted, kept in memory for order generation.
struct SeededTest {
    id: i64,
    name: &'static str,
    unit: Option<&'static str>,
    catalog_min: Option<f64>,
    catalog_max: Option<f64>,
    price: f64,
}

pub async fn run(config: &DbConfig, args: &SeedArgs) -> Result<()> {
    ensure_database(config).await?;
    let pool = create_pool(config).await?;
    SchemaManager::new(pool.clone()).ensure_schema().await?;
    print_success(&format!("Connected to database: {}", config.database()?));

    if !args.keep_existing {
        clear_existing_data(&pool).await;
    }

    let mut rng = StdRng::from_entropy();

    let category_ids = seed_categories(&pool).await?;
    let tests = seed_tests(&pool, &category_ids).await?;
    let ranges = seed_reference_ranges(&pool, &tests).await?;
    let patient_ids = seed_patients(&pool, &mut rng, args.patients).await?;
    let doctor_ids = seed_doctors(&pool).await?;
    seed_orders(&pool, &mut rng, args.orders, &patient_ids, &doctor_ids, &tests, &ranges).await?;
    seed_settings(&pool).await?;

    print_success("Mock data generation completed");
    Ok(())
}

/// Failures are reported and skipped so a partially created schema does not
/// abort the run.
async fn clear_existing_data(pool: &MySqlPool) {
    for table in CLEAR_ORDER {
        match sqlx_core::query::query(&format!("DELETE FROM {table}"))
            .execute(pool)
            .await
        {
            Ok(_) => print_success(&format!("Cleared {table}")),
            Err(e) => print_warning(&format!("Could not clear {table}: {e}")),
        }
    }
}

async fn seed_categories(pool: &MySqlPool) -> Result<Vec<i64>> {
    let mut ids = Vec::with_capacity(CATEGORIES.len());
    for &(name, description) in &CATEGORIES {
        let result = sqlx_core::query::query(
            "INSERT INTO test_categories (category_name, description) VALUES (?, ?)",
        )
        .bind(name)
        .bind(description)
        .execute(pool)
        .await?;
        ids.push(result.last_insert_id() as i64);
    }
    print_success(&format!("Inserted {} test categories", ids.len()));
    Ok(ids)
}

/// Category ids come from the rows just inserted rather than assumed
/// positions; AUTO_INCREMENT does not restart after a clear.
async fn seed_tests(pool: &MySqlPool, category_ids: &[i64]) -> Result<Vec<SeededTest>> {
    let mut seeded = Vec::with_capacity(TESTS.len());
    for &(name, category, sample_type, unit, min, max, price) in &TESTS {
        let category_id = category_ids
            .get(category - 1)
            .copied()
            .with_context(|| format!("test '{name}' references undefined category {category}"))?;

        let result = sqlx_core::query::query(
            r#"INSERT INTO tests
               (test_name, category_id, sample_type, unit, normal_min, normal_max, price, is_active)
               VALUES (?, ?, ?, ?, ?, ?, ?, 1)"#,
        )
        .bind(name)
        .bind(category_id)
        .bind(sample_type)
        .bind(unit)
        .bind(min)
        .bind(max)
        .bind(price)
        .execute(pool)
        .await?;

        seeded.push(SeededTest {
            id: result.last_insert_id() as i64,
            name,
            unit,
            catalog_min: min,
            catalog_max: max,
            price,
        });
    }
    print_success(&format!("Inserted {} tests", seeded.len()));
    Ok(seeded)
}

/// Inserts the range rows and returns them keyed by test id, in resolver
/// form, so order generation can snapshot without re-querying.
async fn seed_reference_ranges(
    pool: &MySqlPool,
    tests: &[SeededTest],
) -> Result<HashMap<i64, Vec<ReferenceRange>>> {
    let mut by_test: HashMap<i64, Vec<ReferenceRange>> = HashMap::new();
    for &(test_name, gender, min, max, unit, notes) in &RANGES {
        let test = tests
            .iter()
            .find(|t| t.name == test_name)
            .with_context(|| format!("range references unknown test '{test_name}'"))?;

        sqlx_core::query::query(
            r#"INSERT INTO test_reference_ranges
               (test_id, gender, age_min, age_max, normal_min, normal_max, unit, notes)
               VALUES (?, ?, NULL, NULL, ?, ?, ?, ?)"#,
        )
        .bind(test.id)
        .bind(gender)
        .bind(min)
        .bind(max)
        .bind(unit)
        .bind(notes)
        .execute(pool)
        .await?;

        by_test.entry(test.id).or_default().push(ReferenceRange {
            bucket: GenderBucket::from_db(gender)?,
            min: Decimal::try_from(min).ok(),
            max: Decimal::try_from(max).ok(),
            unit: Some(unit.to_owned()),
        });
    }
    print_success(&format!("Inserted {} reference ranges", RANGES.len()));
    Ok(by_test)
}

async fn seed_patients(pool: &MySqlPool, rng: &mut StdRng, count: u32) -> Result<Vec<i64>> {
    let mut ids = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let gender = if rng.gen_bool(0.5) { Gender::Male } else { Gender::Female };
        let first_names = match gender {
            Gender::Male => &MALE_FIRST_NAMES,
            _ => &FEMALE_FIRST_NAMES,
        };
        let first = first_names[rng.gen_range(0..first_names.len())];
        let last = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];

        let age: i64 = rng.gen_range(18..=80);
        let date_of_birth =
            (Local::now() - Duration::days(age * 365 + rng.gen_range(0..=365))).date_naive();
        let phone = format!("+91-{}", rng.gen_range(7_000_000_000i64..=9_999_999_999));
        let email = format!("{}.{}@email.com", first.to_lowercase(), last.to_lowercase());
        let address = format!(
            "{}, {}, Mysuru, Karnataka",
            rng.gen_range(1..=999),
            AREAS[rng.gen_range(0..AREAS.len())]
        );

        let result = sqlx_core::query::query(
            r#"INSERT INTO patients (full_name, date_of_birth, gender, phone, email, address)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(format!("{first} {last}"))
        .bind(date_of_birth)
        .bind(gender.as_db())
        .bind(phone)
        .bind(email)
        .bind(address)
        .execute(pool)
        .await?;
        ids.push(result.last_insert_id() as i64);
    }
    print_success(&format!("Inserted {count} patients"));
    Ok(ids)
}

async fn seed_doctors(pool: &MySqlPool) -> Result<Vec<i64>> {
    let mut ids = Vec::with_capacity(DOCTORS.len());
    for &(name, specialization, phone, email) in &DOCTORS {
        let result = sqlx_core::query::query(
            "INSERT INTO doctors (full_name, specialization, phone, email) VALUES (?, ?, ?, ?)",
        )
        .bind(name)
        .bind(specialization)
        .bind(phone)
        .bind(email)
        .execute(pool)
        .await?;
        ids.push(result.last_insert_id() as i64);
    }
    print_success(&format!("Inserted {} doctors", ids.len()));
    Ok(ids)
}

#[allow(clippy::too_many_arguments)]
async fn seed_orders(
    pool: &MySqlPool,
    rng: &mut StdRng,
    count: u32,
    patient_ids: &[i64],
    doctor_ids: &[i64],
    tests: &[SeededTest],
    ranges: &HashMap<i64, Vec<ReferenceRange>>,
) -> Result<()> {
    if count > 0 && patient_ids.is_empty() {
        bail!("cannot generate orders without patients; raise --patients");
    }

    const STATUSES: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::SampleCollected,
        OrderStatus::ResultsEntered,
        OrderStatus::ReportReady,
    ];
    const PRIORITIES: [Priority; 2] = [Priority::Normal, Priority::Urgent];

    for _ in 0..count {
        let patient_id = patient_ids[rng.gen_range(0..patient_ids.len())];
        // Walk-ins carry no referring doctor.
        let doctor_id = if rng.r#gen::<f64>() > 0.2 {
            Some(doctor_ids[rng.gen_range(0..doctor_ids.len())])
        } else {
            None
        };
        let order_date = Local::now().naive_local() - Duration::days(rng.gen_range(0..=30));
        let priority = PRIORITIES[rng.gen_range(0..PRIORITIES.len())];
        let status = STATUSES[rng.gen_range(0..STATUSES.len())];

        let num_tests: usize = rng.gen_range(1..=5);
        let selected: Vec<&SeededTest> = tests.choose_multiple(&mut *rng, num_tests).collect();
        let total: f64 = selected.iter().map(|t| t.price).sum();
        let notes = ORDER_NOTES[rng.gen_range(0..ORDER_NOTES.len())];

        let result = sqlx_core::query::query(
            r#"INSERT INTO test_orders
               (patient_id, doctor_id, order_date, priority, status, total_amount, notes)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(patient_id)
        .bind(doctor_id)
        .bind(order_date)
        .bind(priority.as_db())
        .bind(status.as_db())
        .bind(total)
        .bind(notes)
        .execute(pool)
        .await?;
        let order_id = result.last_insert_id() as i64;

        for &test in &selected {
            insert_order_line(pool, rng, order_id, test, ranges, status, order_date).await?;
        }

        sqlx_core::query::query(
            r#"INSERT INTO activity_log (action, entity_type, entity_id, description)
               VALUES ('CREATE_ORDER', 'ORDER', ?, 'Order created via mock data')"#,
        )
        .bind(order_id)
        .execute(pool)
        .await?;
    }

    print_success(&format!("Inserted {count} test orders with results"));
    Ok(())
}

async fn insert_order_line(
    pool: &MySqlPool,
    rng: &mut StdRng,
    order_id: i64,
    test: &SeededTest,
    ranges: &HashMap<i64, Vec<ReferenceRange>>,
    status: OrderStatus,
    order_date: NaiveDateTime,
) -> Result<()> {
    let test_ranges = ranges.get(&test.id).map(Vec::as_slice).unwrap_or(&[]);
    let catalog = CatalogRange {
        min: decimal_opt(test.catalog_min),
        max: decimal_opt(test.catalog_max),
        unit: test.unit.map(str::to_owned),
    };
    let range_text =
        resolve_for_snapshot(test_ranges, GenderBucket::Any, &catalog).map(|r| r.display_text());

    // Results are drawn from the ANY range; tests without one stay empty
    // even on completed orders.
    let any_bounds = test_ranges
        .iter()
        .find(|r| r.bucket == GenderBucket::Any)
        .and_then(|r| Some((r.min?.to_f64()?, r.max?.to_f64()?)));

    let mut result_value = None;
    let mut result_flag = None;
    let mut result_entered_at = None;
    if matches!(status, OrderStatus::ResultsEntered | OrderStatus::ReportReady)
        && let Some((min, max)) = any_bounds
    {
        // 70% normal, 15% low, 15% high
        let roll: f64 = rng.r#gen();
        let (value, flag) = if roll < 0.7 {
            (uniform(rng, min, max), ResultFlag::Normal)
        } else if roll < 0.85 {
            (uniform(rng, min * 0.5, min * 0.95), ResultFlag::Low)
        } else {
            (uniform(rng, max * 1.05, max * 1.5), ResultFlag::High)
        };
        result_value = Some((value * 100.0).round() / 100.0);
        result_flag = Some(flag.as_db());
        result_entered_at = Some(order_date + Duration::hours(rng.gen_range(2..=48)));
    }

    sqlx_core::query::query(
        r#"INSERT INTO test_order_tests
           (order_id, test_id, unit, normal_range_text, result_value, result_flag, result_entered_at)
           VALUES (?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(order_id)
    .bind(test.id)
    .bind(test.unit)
    .bind(range_text.as_deref())
    .bind(result_value)
    .bind(result_flag)
    .bind(result_entered_at)
    .execute(pool)
    .await?;

    Ok(())
}

async fn seed_settings(pool: &MySqlPool) -> Result<()> {
    for &(key, value) in &SETTINGS {
        sqlx_core::query::query(
            r#"INSERT INTO app_settings (setting_key, setting_value)
               VALUES (?, ?)
               ON DUPLICATE KEY UPDATE setting_value = VALUES(setting_value)"#,
        )
        .bind(key)
        .bind(value)
        .execute(pool)
        .await?;
    }
    print_success(&format!("Inserted {} lab settings", SETTINGS.len()));
    Ok(())
}

/// `gen_range` panics on an empty range; the low band collapses to a point
/// when a range has a zero minimum, so return the bound itself.
fn uniform(rng: &mut StdRng, low: f64, high: f64) -> f64 {
    if low < high { rng.gen_range(low..high) } else { low }
}

fn decimal_opt(value: Option<f64>) -> Option<Decimal> {
    value.and_then(|v| Decimal::try_from(v).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_counts() {
        assert_eq!(CATEGORIES.len(), 10);
        assert_eq!(TESTS.len(), 46);
        assert_eq!(RANGES.len(), 18);
        assert_eq!(DOCTORS.len(), 10);
        assert_eq!(SETTINGS.len(), 7);
    }

    #[test]
    fn test_every_test_references_a_defined_category() {
        for &(name, category, ..) in &TESTS {
            assert!(
                (1..=CATEGORIES.len()).contains(&category),
                "{name} points at category {category}"
            );
        }
    }

    #[test]
    fn test_every_range_row_is_well_formed() {
        for &(test_name, gender, min, max, ..) in &RANGES {
            assert!(
                TESTS.iter().any(|&(name, ..)| name == test_name),
                "range for unknown test {test_name}"
            );
            assert!(GenderBucket::from_db(gender).is_ok(), "{test_name}: {gender}");
            assert!(min <= max, "{test_name}");
        }
    }

    #[test]
    fn test_uniform_tolerates_collapsed_bands() {
        // Total Cholesterol and Triglycerides have a zero minimum, which
        // collapses the low band to 0.0..0.0.
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(uniform(&mut rng, 0.0, 0.0), 0.0);
        let v = uniform(&mut rng, 1.0, 2.0);
        assert!((1.0..2.0).contains(&v));
    }

    #[test]
    fn test_snapshot_text_prefers_any_row_over_catalog() {
        let ranges = vec![ReferenceRange {
            bucket: GenderBucket::Any,
            min: decimal_opt(Some(70.0)),
            max: decimal_opt(Some(99.0)),
            unit: Some("mg/dL".to_owned()),
        }];
        let catalog = CatalogRange {
            min: decimal_opt(Some(70.0)),
            max: decimal_opt(Some(100.0)),
            unit: Some("mg/dL".to_owned()),
        };
        let text = resolve_for_snapshot(&ranges, GenderBucket::Any, &catalog)
            .map(|r| r.display_text());
        assert_eq!(text.as_deref(), Some("70 - 99 mg/dL"));
    }
}
