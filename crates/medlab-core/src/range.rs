//! Reference-range resolution.
//!
//! Two deliberately separate modes exist. Order creation snapshots a range
//! through [`resolve_for_snapshot`], which prefers a gendered row, then an
//! `ANY` row, then the catalog bounds on the test itself. The test-listing
//! projection uses [`bucket_display_text`], which looks at exactly one bucket
//! and never falls back. Existing consumers depend on that asymmetry.

use rust_decimal::Decimal;

use crate::vocab::GenderBucket;

/// One `test_reference_ranges` row as seen by the resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceRange {
    pub bucket: GenderBucket,
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
    pub unit: Option<String>,
}

/// Catalog-level bounds carried on the test row itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogRange {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
    pub unit: Option<String>,
}

/// A fully resolved range ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRange {
    pub min: Decimal,
    pub max: Decimal,
    pub unit: Option<String>,
}

impl ResolvedRange {
    /// Render as `"<min> - <max>[ <unit>]"`, bounds in minimal-digit form.
    /// The unit and its leading space are omitted when absent.
    #[must_use]
    pub fn display_text(&self) -> String {
        let text = format!("{} - {}", format_bound(self.min), format_bound(self.max));
        match self.unit.as_deref() {
            Some(unit) if !unit.is_empty() => format!("{text} {unit}"),
            _ => text,
        }
    }
}

/// Render a bound without trailing zeros: `70.00` becomes `70`, `0.270`
/// becomes `0.27`.
#[must_use]
pub fn format_bound(value: Decimal) -> String {
    value.normalize().to_string()
}

/// A row participates in resolution only when both bounds are present.
fn usable(range: &ReferenceRange) -> bool {
    range.min.is_some() && range.max.is_some()
}

/// Empty-string units count as absent.
fn pick_unit(row_unit: Option<&str>, fallback: Option<&str>) -> Option<String> {
    row_unit
        .filter(|u| !u.is_empty())
        .or_else(|| fallback.filter(|u| !u.is_empty()))
        .map(str::to_owned)
}

/// Order-snapshot resolution: prefer a row matching `bucket`, then an `ANY`
/// row, then the catalog bounds. Returns `None` only when no source supplies
/// both bounds.
#[must_use]
pub fn resolve_for_snapshot(
    ranges: &[ReferenceRange],
    bucket: GenderBucket,
    catalog: &CatalogRange,
) -> Option<ResolvedRange> {
    let pick = |wanted: GenderBucket| ranges.iter().find(|r| r.bucket == wanted && usable(r));

    let row = match bucket {
        GenderBucket::Any => pick(GenderBucket::Any),
        gendered => pick(gendered).or_else(|| pick(GenderBucket::Any)),
    };

    if let Some(row) = row {
        if let (Some(min), Some(max)) = (row.min, row.max) {
            return Some(ResolvedRange {
                min,
                max,
                unit: pick_unit(row.unit.as_deref(), catalog.unit.as_deref()),
            });
        }
    }

    match (catalog.min, catalog.max) {
        (Some(min), Some(max)) => Some(ResolvedRange {
            min,
            max,
            unit: pick_unit(catalog.unit.as_deref(), None),
        }),
        _ => None,
    }
}

/// Listing resolution: the display text for exactly one bucket, with no
/// fallback to `ANY` rows or catalog bounds. When several rows share the
/// bucket the last usable one wins.
#[must_use]
pub fn bucket_display_text(
    ranges: &[ReferenceRange],
    bucket: GenderBucket,
    default_unit: Option<&str>,
) -> Option<String> {
    let row = ranges.iter().filter(|r| r.bucket == bucket && usable(r)).last()?;
    let (min, max) = (row.min?, row.max?);
    let resolved = ResolvedRange {
        min,
        max,
        unit: pick_unit(row.unit.as_deref(), default_unit),
    };
    Some(resolved.display_text())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn row(bucket: GenderBucket, min: &str, max: &str, unit: Option<&str>) -> ReferenceRange {
        ReferenceRange {
            bucket,
            min: Some(dec(min)),
            max: Some(dec(max)),
            unit: unit.map(str::to_owned),
        }
    }

    #[test]
    fn test_format_bound_drops_trailing_zeros() {
        assert_eq!(format_bound(dec("70.00")), "70");
        assert_eq!(format_bound(dec("0.270")), "0.27");
        assert_eq!(format_bound(dec("4.20")), "4.2");
        assert_eq!(format_bound(dec("11000")), "11000");
        assert_eq!(format_bound(dec("1.50")), "1.5");
    }

    #[test]
    fn test_display_text_with_and_without_unit() {
        let with_unit = ResolvedRange {
            min: dec("70.00"),
            max: dec("99.00"),
            unit: Some("mg/dL".to_owned()),
        };
        assert_eq!(with_unit.display_text(), "70 - 99 mg/dL");

        let without_unit = ResolvedRange {
            min: dec("0.27"),
            max: dec("4.20"),
            unit: None,
        };
        assert_eq!(without_unit.display_text(), "0.27 - 4.2");

        let empty_unit = ResolvedRange {
            min: dec("1"),
            max: dec("2"),
            unit: Some(String::new()),
        };
        assert_eq!(empty_unit.display_text(), "1 - 2");
    }

    #[test]
    fn test_snapshot_prefers_gendered_row() {
        let ranges = vec![
            row(GenderBucket::Male, "13", "17", Some("g/dL")),
            row(GenderBucket::Female, "12", "15", Some("g/dL")),
            row(GenderBucket::Any, "10", "20", Some("g/dL")),
        ];
        let resolved =
            resolve_for_snapshot(&ranges, GenderBucket::Female, &CatalogRange::default()).unwrap();
        assert_eq!(resolved.min, dec("12"));
        assert_eq!(resolved.max, dec("15"));
    }

    #[test]
    fn test_snapshot_falls_back_to_any_bucket() {
        let ranges = vec![row(GenderBucket::Any, "70", "99", Some("mg/dL"))];
        let resolved =
            resolve_for_snapshot(&ranges, GenderBucket::Male, &CatalogRange::default()).unwrap();
        assert_eq!(resolved.display_text(), "70 - 99 mg/dL");
    }

    #[test]
    fn test_snapshot_falls_back_to_catalog_verbatim() {
        let catalog = CatalogRange {
            min: Some(dec("70.00")),
            max: Some(dec("99.00")),
            unit: Some("mg/dL".to_owned()),
        };
        let resolved = resolve_for_snapshot(&[], GenderBucket::Any, &catalog).unwrap();
        assert_eq!(resolved.min, dec("70.00"));
        assert_eq!(resolved.max, dec("99.00"));
        assert_eq!(resolved.display_text(), "70 - 99 mg/dL");
    }

    #[test]
    fn test_snapshot_skips_partial_rows() {
        let partial = ReferenceRange {
            bucket: GenderBucket::Any,
            min: Some(dec("5")),
            max: None,
            unit: None,
        };
        let catalog = CatalogRange {
            min: Some(dec("1")),
            max: Some(dec("9")),
            unit: None,
        };
        let resolved = resolve_for_snapshot(&[partial], GenderBucket::Any, &catalog).unwrap();
        assert_eq!(resolved.display_text(), "1 - 9");
    }

    #[test]
    fn test_snapshot_absent_when_no_source_has_bounds() {
        assert!(resolve_for_snapshot(&[], GenderBucket::Any, &CatalogRange::default()).is_none());
        let catalog_min_only = CatalogRange {
            min: Some(dec("1")),
            max: None,
            unit: None,
        };
        assert!(resolve_for_snapshot(&[], GenderBucket::Any, &catalog_min_only).is_none());
    }

    #[test]
    fn test_snapshot_unit_falls_back_to_catalog_unit() {
        let ranges = vec![row(GenderBucket::Any, "4000", "11000", None)];
        let catalog = CatalogRange {
            min: None,
            max: None,
            unit: Some("cells/cumm".to_owned()),
        };
        let resolved = resolve_for_snapshot(&ranges, GenderBucket::Any, &catalog).unwrap();
        assert_eq!(resolved.display_text(), "4000 - 11000 cells/cumm");

        let empty_unit = vec![row(GenderBucket::Any, "4000", "11000", Some(""))];
        let resolved = resolve_for_snapshot(&empty_unit, GenderBucket::Any, &catalog).unwrap();
        assert_eq!(resolved.display_text(), "4000 - 11000 cells/cumm");
    }

    #[test]
    fn test_listing_never_falls_back() {
        let catalog_only = CatalogRange {
            min: Some(dec("70")),
            max: Some(dec("99")),
            unit: Some("mg/dL".to_owned()),
        };
        // Snapshot mode resolves through the catalog; listing mode must not.
        assert!(resolve_for_snapshot(&[], GenderBucket::Any, &catalog_only).is_some());
        assert!(bucket_display_text(&[], GenderBucket::Any, Some("mg/dL")).is_none());

        let any_only = vec![row(GenderBucket::Any, "70", "99", Some("mg/dL"))];
        assert!(bucket_display_text(&any_only, GenderBucket::Male, Some("mg/dL")).is_none());
    }

    #[test]
    fn test_listing_last_usable_row_wins() {
        let ranges = vec![
            row(GenderBucket::Female, "11", "14", Some("g/dL")),
            row(GenderBucket::Female, "12", "15", Some("g/dL")),
        ];
        assert_eq!(
            bucket_display_text(&ranges, GenderBucket::Female, None).unwrap(),
            "12 - 15 g/dL"
        );
    }

    #[test]
    fn test_listing_uses_default_unit_when_row_has_none() {
        let ranges = vec![row(GenderBucket::Any, "0.27", "4.20", None)];
        assert_eq!(
            bucket_display_text(&ranges, GenderBucket::Any, Some("mIU/L")).unwrap(),
            "0.27 - 4.2 mIU/L"
        );
    }
}
