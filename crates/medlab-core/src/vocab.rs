use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Patient gender as stored in the `patients.gender` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "O")]
    Other,
}

impl Gender {
    /// Storage column value.
    #[must_use]
    pub fn as_db(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
            Gender::Other => "O",
        }
    }

    /// Decode a storage column value.
    pub fn from_db(s: &str) -> Result<Gender, CoreError> {
        match s {
            "M" => Ok(Gender::Male),
            "F" => Ok(Gender::Female),
            "O" => Ok(Gender::Other),
            _ => Err(CoreError::unknown_value("gender", s)),
        }
    }

    /// Map a free-form external value onto the storage vocabulary by its
    /// first letter ("male", "F", "other"). Anything unrecognized maps to
    /// `None` and is stored as NULL.
    #[must_use]
    pub fn from_external(s: &str) -> Option<Gender> {
        let lower = s.trim().to_lowercase();
        if lower.starts_with('m') {
            Some(Gender::Male)
        } else if lower.starts_with('f') {
            Some(Gender::Female)
        } else if lower.starts_with('o') {
            Some(Gender::Other)
        } else {
            None
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db())
    }
}

/// Order priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    #[default]
    #[serde(rename = "NORMAL")]
    Normal,
    #[serde(rename = "URGENT")]
    Urgent,
}

impl Priority {
    /// Storage column value.
    #[must_use]
    pub fn as_db(&self) -> &'static str {
        match self {
            Priority::Normal => "NORMAL",
            Priority::Urgent => "URGENT",
        }
    }

    /// Decode a storage column value.
    pub fn from_db(s: &str) -> Result<Priority, CoreError> {
        match s {
            "NORMAL" => Ok(Priority::Normal),
            "URGENT" => Ok(Priority::Urgent),
            _ => Err(CoreError::unknown_value("priority", s)),
        }
    }

    /// External vocabulary used by the JSON surface.
    #[must_use]
    pub fn as_external(&self) -> &'static str {
        match self {
            Priority::Normal => "normal",
            Priority::Urgent => "urgent",
        }
    }

    /// Total inbound mapping: anything other than "urgent" is normal.
    #[must_use]
    pub fn from_external(s: &str) -> Priority {
        if s.trim().eq_ignore_ascii_case("urgent") {
            Priority::Urgent
        } else {
            Priority::Normal
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db())
    }
}

/// Order lifecycle status, ordered `PENDING` through `REPORT_READY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "SAMPLE_COLLECTED")]
    SampleCollected,
    #[serde(rename = "RESULTS_ENTERED")]
    ResultsEntered,
    #[serde(rename = "REPORT_READY")]
    ReportReady,
}

impl OrderStatus {
    /// All states in lifecycle order.
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::SampleCollected,
        OrderStatus::ResultsEntered,
        OrderStatus::ReportReady,
    ];

    /// Storage column value.
    #[must_use]
    pub fn as_db(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::SampleCollected => "SAMPLE_COLLECTED",
            OrderStatus::ResultsEntered => "RESULTS_ENTERED",
            OrderStatus::ReportReady => "REPORT_READY",
        }
    }

    /// Decode a storage column value.
    pub fn from_db(s: &str) -> Result<OrderStatus, CoreError> {
        match s {
            "PENDING" => Ok(OrderStatus::Pending),
            "SAMPLE_COLLECTED" => Ok(OrderStatus::SampleCollected),
            "RESULTS_ENTERED" => Ok(OrderStatus::ResultsEntered),
            "REPORT_READY" => Ok(OrderStatus::ReportReady),
            _ => Err(CoreError::unknown_value("status", s)),
        }
    }

    /// External vocabulary. `SAMPLE_COLLECTED` and `RESULTS_ENTERED` both
    /// read back as "in-progress".
    #[must_use]
    pub fn as_external(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::SampleCollected | OrderStatus::ResultsEntered => "in-progress",
            OrderStatus::ReportReady => "completed",
        }
    }

    /// Inbound mapping is lossy: "in-progress" writes `RESULTS_ENTERED` and
    /// no external value writes `SAMPLE_COLLECTED`. Unrecognized values fall
    /// through to `REPORT_READY`.
    #[must_use]
    pub fn from_external(s: &str) -> OrderStatus {
        match s.trim().to_lowercase().as_str() {
            "pending" => OrderStatus::Pending,
            "in-progress" => OrderStatus::ResultsEntered,
            _ => OrderStatus::ReportReady,
        }
    }

    fn ordinal(self) -> u8 {
        match self {
            OrderStatus::Pending => 0,
            OrderStatus::SampleCollected => 1,
            OrderStatus::ResultsEntered => 2,
            OrderStatus::ReportReady => 3,
        }
    }

    /// Forward-only progression check. Skipping intermediate states is
    /// allowed (the external vocabulary cannot write `SAMPLE_COLLECTED`),
    /// moving backwards or staying put is not.
    #[must_use]
    pub fn can_advance_to(self, next: OrderStatus) -> bool {
        next.ordinal() > self.ordinal()
    }

    /// The happy-path terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::ReportReady)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db())
    }
}

/// Flag attached to a numeric result relative to its reference range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultFlag {
    #[serde(rename = "LOW")]
    Low,
    #[serde(rename = "NORMAL")]
    Normal,
    #[serde(rename = "HIGH")]
    High,
}

impl ResultFlag {
    /// Storage column value.
    #[must_use]
    pub fn as_db(&self) -> &'static str {
        match self {
            ResultFlag::Low => "LOW",
            ResultFlag::Normal => "NORMAL",
            ResultFlag::High => "HIGH",
        }
    }

    /// Decode a storage column value.
    pub fn from_db(s: &str) -> Result<ResultFlag, CoreError> {
        match s {
            "LOW" => Ok(ResultFlag::Low),
            "NORMAL" => Ok(ResultFlag::Normal),
            "HIGH" => Ok(ResultFlag::High),
            _ => Err(CoreError::unknown_value("result flag", s)),
        }
    }
}

impl fmt::Display for ResultFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db())
    }
}

/// Population segment a reference range applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenderBucket {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "ANY")]
    Any,
}

impl GenderBucket {
    /// Storage column value.
    #[must_use]
    pub fn as_db(&self) -> &'static str {
        match self {
            GenderBucket::Male => "M",
            GenderBucket::Female => "F",
            GenderBucket::Any => "ANY",
        }
    }

    /// Decode a storage column value.
    pub fn from_db(s: &str) -> Result<GenderBucket, CoreError> {
        match s {
            "M" => Ok(GenderBucket::Male),
            "F" => Ok(GenderBucket::Female),
            "ANY" => Ok(GenderBucket::Any),
            _ => Err(CoreError::unknown_value("gender bucket", s)),
        }
    }
}

impl fmt::Display for GenderBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_from_external_first_letter() {
        assert_eq!(Gender::from_external("male"), Some(Gender::Male));
        assert_eq!(Gender::from_external("  F "), Some(Gender::Female));
        assert_eq!(Gender::from_external("Other"), Some(Gender::Other));
        assert_eq!(Gender::from_external("unknown"), None);
        assert_eq!(Gender::from_external(""), None);
    }

    #[test]
    fn test_gender_db_round_trip() {
        for g in [Gender::Male, Gender::Female, Gender::Other] {
            assert_eq!(Gender::from_db(g.as_db()).unwrap(), g);
        }
        assert!(Gender::from_db("X").is_err());
    }

    #[test]
    fn test_priority_inbound_is_total() {
        assert_eq!(Priority::from_external("urgent"), Priority::Urgent);
        assert_eq!(Priority::from_external(" URGENT "), Priority::Urgent);
        assert_eq!(Priority::from_external("normal"), Priority::Normal);
        assert_eq!(Priority::from_external("whatever"), Priority::Normal);
        assert_eq!(Priority::from_external(""), Priority::Normal);
    }

    #[test]
    fn test_priority_external_round_trip() {
        assert_eq!(Priority::from_external(Priority::Urgent.as_external()), Priority::Urgent);
        assert_eq!(Priority::from_external(Priority::Normal.as_external()), Priority::Normal);
    }

    #[test]
    fn test_status_external_mapping() {
        assert_eq!(OrderStatus::Pending.as_external(), "pending");
        assert_eq!(OrderStatus::SampleCollected.as_external(), "in-progress");
        assert_eq!(OrderStatus::ResultsEntered.as_external(), "in-progress");
        assert_eq!(OrderStatus::ReportReady.as_external(), "completed");
    }

    #[test]
    fn test_status_inbound_is_lossy() {
        assert_eq!(OrderStatus::from_external("pending"), OrderStatus::Pending);
        // "in-progress" always writes RESULTS_ENTERED, never SAMPLE_COLLECTED.
        assert_eq!(OrderStatus::from_external("in-progress"), OrderStatus::ResultsEntered);
        assert_eq!(OrderStatus::from_external("completed"), OrderStatus::ReportReady);
        // Unrecognized values fall through to REPORT_READY.
        assert_eq!(OrderStatus::from_external("archived"), OrderStatus::ReportReady);
    }

    #[test]
    fn test_no_external_value_writes_sample_collected() {
        for word in ["pending", "in-progress", "completed", "sample_collected", ""] {
            assert_ne!(OrderStatus::from_external(word), OrderStatus::SampleCollected);
        }
    }

    #[test]
    fn test_status_db_round_trip() {
        for s in OrderStatus::ALL {
            assert_eq!(OrderStatus::from_db(s.as_db()).unwrap(), s);
        }
        assert!(OrderStatus::from_db("pending").is_err());
    }

    #[test]
    fn test_can_advance_to_is_forward_only() {
        assert!(OrderStatus::Pending.can_advance_to(OrderStatus::SampleCollected));
        assert!(OrderStatus::Pending.can_advance_to(OrderStatus::ResultsEntered));
        assert!(OrderStatus::Pending.can_advance_to(OrderStatus::ReportReady));
        assert!(OrderStatus::SampleCollected.can_advance_to(OrderStatus::ReportReady));
        assert!(!OrderStatus::ReportReady.can_advance_to(OrderStatus::Pending));
        assert!(!OrderStatus::ResultsEntered.can_advance_to(OrderStatus::SampleCollected));
        assert!(!OrderStatus::Pending.can_advance_to(OrderStatus::Pending));
    }

    #[test]
    fn test_terminal_state() {
        assert!(OrderStatus::ReportReady.is_terminal());
        assert!(!OrderStatus::ResultsEntered.is_terminal());
    }

    #[test]
    fn test_result_flag_round_trip() {
        for f in [ResultFlag::Low, ResultFlag::Normal, ResultFlag::High] {
            assert_eq!(ResultFlag::from_db(f.as_db()).unwrap(), f);
        }
        assert!(ResultFlag::from_db("low").is_err());
    }

    #[test]
    fn test_bucket_round_trip() {
        for b in [GenderBucket::Male, GenderBucket::Female, GenderBucket::Any] {
            assert_eq!(GenderBucket::from_db(b.as_db()).unwrap(), b);
        }
        assert!(GenderBucket::from_db("any").is_err());
    }
}
