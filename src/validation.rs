//! Field and cross-field checks for the dashboard's data-entry forms.
//!
//! Payloads arrive as camelCase JSON. `validate` reports every failing field
//! rather than stopping at the first one.
use anyhow::{anyhow, Result};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field:   &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("form has {} invalid field(s)", .0.len())]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn fields(&self) -> Vec<&'static str> {
        self.0.iter().map(|e| e.field).collect()
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

#[derive(Default)]
struct Checks(Vec<FieldError>);

impl Checks {
    fn fail(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError { field, message: message.into() });
    }

    /// Records an error for a blank value; true if the value is present.
    fn required(&mut self, field: &'static str, value: &str) -> bool {
        if value.trim().is_empty() {
            self.fail(field, "is required");
            false
        } else {
            true
        }
    }

    fn non_negative(&mut self, field: &'static str, value: f64) {
        if !value.is_finite() || value < 0.0 {
            self.fail(field, "must be a non-negative number");
        }
    }

    fn finish(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() { Ok(()) } else { Err(ValidationErrors(self.0)) }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

// ─── Sites ────────────────────────────────────────────────────────────────────

pub const MAX_SITE_CAPACITY: u32 = 500;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteForm {
    pub name:         String,
    pub address:      String,
    pub postcode:     String,
    pub capacity:     u32,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
}

impl Validate for SiteForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut c = Checks::default();
        c.required("name", &self.name);
        c.required("address", &self.address);
        if c.required("postcode", &self.postcode) {
            let pc = self.postcode.trim();
            if pc.len() > 8 || !pc.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == ' ') {
                c.fail("postcode", "must be at most 8 letters, digits or spaces");
            }
        }
        if !(1..=MAX_SITE_CAPACITY).contains(&self.capacity) {
            c.fail("capacity", format!("must be between 1 and {MAX_SITE_CAPACITY}"));
        }
        if self.opening_time >= self.closing_time {
            c.fail("closingTime", "must be after the opening time");
        }
        c.finish()
    }
}

// ─── Budgets ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetForm {
    pub site_id:      String,
    pub category:     String,
    pub amount:       f64,
    pub period_start: NaiveDate,
    pub period_end:   NaiveDate,
}

impl Validate for BudgetForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut c = Checks::default();
        c.required("siteId", &self.site_id);
        c.required("category", &self.category);
        c.non_negative("amount", self.amount);
        if self.period_start > self.period_end {
            c.fail("periodEnd", "must not be before the period start");
        }
        c.finish()
    }
}

// ─── KPIs ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiUnit {
    Percent,
    Count,
    Currency,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiForm {
    pub name:   String,
    pub target: f64,
    pub actual: Option<f64>,
    pub unit:   KpiUnit,
}

impl Validate for KpiForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut c = Checks::default();
        c.required("name", &self.name);
        c.non_negative("target", self.target);
        if let Some(actual) = self.actual {
            c.non_negative("actual", actual);
        }
        if self.unit == KpiUnit::Percent && self.target > 100.0 {
            c.fail("target", "a percentage target cannot exceed 100");
        }
        c.finish()
    }
}

// ─── Enquiries ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnquirySource {
    Website,
    Referral,
    WalkIn,
    Social,
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryForm {
    pub parent_name:     String,
    pub email:           Option<String>,
    pub phone:           Option<String>,
    pub child_name:      String,
    pub child_dob:       NaiveDate,
    pub preferred_start: NaiveDate,
    pub source:          EnquirySource,
    pub source_detail:   Option<String>,
}

impl Validate for EnquiryForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut c = Checks::default();
        c.required("parentName", &self.parent_name);
        c.required("childName", &self.child_name);

        let email = present(&self.email);
        let phone = present(&self.phone);
        if email.is_none() && phone.is_none() {
            c.fail("email", "an email address or phone number is required");
        }
        if email.is_some_and(|e| !is_email(e)) {
            c.fail("email", "is not a valid email address");
        }
        if phone.is_some_and(|p| !is_phone(p)) {
            c.fail("phone", "must contain 7 to 15 digits");
        }

        if self.child_dob >= self.preferred_start {
            c.fail("preferredStart", "must be after the child's date of birth");
        }
        if self.source == EnquirySource::Other && present(&self.source_detail).is_none() {
            c.fail("sourceDetail", "is required when the source is \"other\"");
        }
        c.finish()
    }
}

fn is_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else { return false };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !s.contains(char::is_whitespace)
}

fn is_phone(s: &str) -> bool {
    let digits: String = s.chars().filter(|c| !matches!(c, ' ' | '+' | '-')).collect();
    (7..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

// ─── Dispatch by form name ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Site,
    Budget,
    Kpi,
    Enquiry,
}

impl FromStr for FormKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "site"    => Ok(FormKind::Site),
            "budget"  => Ok(FormKind::Budget),
            "kpi"     => Ok(FormKind::Kpi),
            "enquiry" => Ok(FormKind::Enquiry),
            other     => Err(anyhow!("unknown form `{other}` (expected site, budget, kpi or enquiry)")),
        }
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FormKind::Site    => "site",
            FormKind::Budget  => "budget",
            FormKind::Kpi     => "kpi",
            FormKind::Enquiry => "enquiry",
        })
    }
}

/// Parses `json` as the given form and validates it. The outer error is a
/// malformed payload; the inner one lists the failing fields.
pub fn validate_json(kind: FormKind, json: &str) -> Result<Result<(), ValidationErrors>> {
    fn check<T: Validate + for<'de> Deserialize<'de>>(json: &str) -> Result<Result<(), ValidationErrors>> {
        let form: T = serde_json::from_str(json)?;
        Ok(form.validate())
    }
    match kind {
        FormKind::Site    => check::<SiteForm>(json),
        FormKind::Budget  => check::<BudgetForm>(json),
        FormKind::Kpi     => check::<KpiForm>(json),
        FormKind::Enquiry => check::<EnquiryForm>(json),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn enquiry() -> serde_json::Value {
        json!({
            "parentName": "Sam Ortiz",
            "email": "sam@example.org",
            "childName": "Robin",
            "childDob": "2023-05-14",
            "preferredStart": "2025-09-01",
            "source": "website"
        })
    }

    fn run(kind: FormKind, v: serde_json::Value) -> Result<(), ValidationErrors> {
        validate_json(kind, &v.to_string()).unwrap()
    }

    #[test]
    fn valid_site_passes() {
        let site = json!({
            "name": "Little Acorns", "address": "1 High St", "postcode": "AB1 2CD",
            "capacity": 60, "openingTime": "07:30:00", "closingTime": "18:00:00"
        });
        assert_eq!(run(FormKind::Site, site), Ok(()));
    }

    #[test]
    fn site_reports_every_bad_field() {
        let site = json!({
            "name": " ", "address": "1 High St", "postcode": "AB1-2CD-99",
            "capacity": 0, "openingTime": "18:00:00", "closingTime": "07:30:00"
        });
        let err = run(FormKind::Site, site).unwrap_err();
        assert_eq!(err.fields(), ["name", "postcode", "capacity", "closingTime"]);
        assert_eq!(err.to_string(), "form has 4 invalid field(s)");
    }

    #[test]
    fn budget_period_must_not_be_inverted() {
        let budget = json!({
            "siteId": "s-1", "category": "Staffing", "amount": -1.0,
            "periodStart": "2025-04-01", "periodEnd": "2025-03-31"
        });
        let err = run(FormKind::Budget, budget).unwrap_err();
        assert_eq!(err.fields(), ["amount", "periodEnd"]);

        let same_day = json!({
            "siteId": "s-1", "category": "Staffing", "amount": 0.0,
            "periodStart": "2025-04-01", "periodEnd": "2025-04-01"
        });
        assert_eq!(run(FormKind::Budget, same_day), Ok(()));
    }

    #[test]
    fn percent_kpi_is_capped_at_100() {
        let kpi = json!({ "name": "Occupancy", "target": 120.0, "unit": "percent" });
        assert_eq!(run(FormKind::Kpi, kpi).unwrap_err().fields(), ["target"]);

        let count = json!({ "name": "Enrolments", "target": 120.0, "actual": 98.0, "unit": "count" });
        assert_eq!(run(FormKind::Kpi, count), Ok(()));
    }

    #[test]
    fn valid_enquiry_passes() {
        assert_eq!(run(FormKind::Enquiry, enquiry()), Ok(()));
    }

    #[test]
    fn enquiry_needs_email_or_phone() {
        let mut v = enquiry();
        v["email"] = json!("   ");
        assert_eq!(run(FormKind::Enquiry, v.clone()).unwrap_err().fields(), ["email"]);

        v["phone"] = json!("+44 7700 900123");
        assert_eq!(run(FormKind::Enquiry, v), Ok(()));
    }

    #[test]
    fn enquiry_contact_formats_are_checked() {
        let mut v = enquiry();
        v["email"] = json!("sam@localhost");
        v["phone"] = json!("12-34");
        assert_eq!(run(FormKind::Enquiry, v).unwrap_err().fields(), ["email", "phone"]);
    }

    #[test]
    fn phone_allows_only_spaces_plus_and_dashes() {
        assert!(is_phone("+44 7700-900123"));
        assert!(!is_phone("(020) 7946 0000"));
        assert!(!is_phone("020 7946 000x"));
    }

    #[test]
    fn enquiry_cross_field_rules() {
        let mut v = enquiry();
        v["preferredStart"] = json!("2023-05-14");
        v["source"] = json!("other");
        let err = run(FormKind::Enquiry, v.clone()).unwrap_err();
        assert_eq!(err.fields(), ["preferredStart", "sourceDetail"]);

        v["preferredStart"] = json!("2024-01-08");
        v["sourceDetail"] = json!("Local newsletter");
        assert_eq!(run(FormKind::Enquiry, v), Ok(()));
    }

    #[test]
    fn malformed_payload_is_an_outer_error() {
        assert!(validate_json(FormKind::Kpi, "{\"name\": 3}").is_err());
        assert!(validate_json(FormKind::Site, "not json").is_err());
    }

    #[test]
    fn form_kind_parses_case_insensitively() {
        assert_eq!("Enquiry".parse::<FormKind>().unwrap(), FormKind::Enquiry);
        assert_eq!(FormKind::Budget.to_string(), "budget");
        assert!("staff".parse::<FormKind>().is_err());
    }
}
