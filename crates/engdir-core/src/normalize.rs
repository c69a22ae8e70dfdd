//! Detail record -> fixed 15-column row.

use serde_json::Value;
use std::collections::HashMap;

use crate::fetch::{FailureKind, FetchError, JsonSource};
use crate::html;
use crate::record::RawDetailRecord;

/// Column headers of the export, in output order.
pub const COLUMNS: [&str; 15] = [
    "Chamber of Engineering Expert",
    "Company",
    "City",
    "Postcode",
    "Address",
    "Telephone",
    "Fax",
    "Website",
    "email",
    "Specialization",
    "Activity",
    "Membership",
    "Construction permit",
    "Consulting Engineer",
    "Company Description",
];

/// One member, normalized. Field order matches `COLUMNS`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedRow {
    pub expert: String,
    pub company: String,
    pub city: String,
    pub postcode: String,
    pub address: String,
    pub telephone: String,
    pub fax: String,
    pub website: String,
    pub email: String,
    pub specialization: String,
    pub activity: String,
    pub membership: String,
    pub construction_permit: String,
    pub consulting_engineer: String,
    pub description: String,
}

impl NormalizedRow {
    pub fn from_record(r: &RawDetailRecord) -> Self {
        Self {
            expert: format!(
                "{} {} {} {}",
                r.text("anrede"),
                r.text("titel"),
                r.text("vorname"),
                r.text("nachname")
            ),
            company: r.joined("firma"),
            city: r.text("ort"),
            postcode: r.text("plz"),
            address: r.text("str"),
            telephone: r.text("fon"),
            fax: r.text("fax"),
            website: r.text("web"),
            email: r.text("email"),
            specialization: r.joined("fachrichtung"),
            activity: r.joined("taetigkeit"),
            membership: r.text("mitgliedsart"),
            construction_permit: r.text("bauvorlageberechtigt"),
            consulting_engineer: r.text("bi"),
            description: html::description_text(&r.text("description")),
        }
    }

    /// Cells in `COLUMNS` order.
    pub fn cells(&self) -> [&str; 15] {
        [
            self.expert.as_str(),
            self.company.as_str(),
            self.city.as_str(),
            self.postcode.as_str(),
            self.address.as_str(),
            self.telephone.as_str(),
            self.fax.as_str(),
            self.website.as_str(),
            self.email.as_str(),
            self.specialization.as_str(),
            self.activity.as_str(),
            self.membership.as_str(),
            self.construction_permit.as_str(),
            self.consulting_engineer.as_str(),
            self.description.as_str(),
        ]
    }
}

/// Why a detail URL produced no row.
#[derive(Debug, thiserror::Error)]
pub enum DetailError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The endpoint answered with an empty array.
    #[error("no record in response")]
    Empty,
    /// The response (or its first element) is not a JSON object.
    #[error("response is not a record")]
    NotARecord,
    /// The worker handling this URL died before reporting.
    #[error("worker exited before reporting")]
    WorkerLost,
}

impl DetailError {
    pub fn kind(&self) -> FailureKind {
        match self {
            DetailError::Fetch(e) => e.kind(),
            DetailError::Empty => FailureKind::Empty,
            DetailError::NotARecord => FailureKind::Decode,
            DetailError::WorkerLost => FailureKind::Other,
        }
    }
}

/// Pick the detail record out of a member-info response: the first element of
/// an array, or the object itself.
pub fn extract_record(value: Value) -> Result<RawDetailRecord, DetailError> {
    match value {
        Value::Array(items) => {
            let first = items.into_iter().next().ok_or(DetailError::Empty)?;
            RawDetailRecord::from_value(first).ok_or(DetailError::NotARecord)
        }
        Value::Object(fields) => Ok(RawDetailRecord::new(fields)),
        _ => Err(DetailError::NotARecord),
    }
}

/// Fetch one member's detail record and normalize it.
pub fn fetch_detail<S: JsonSource + ?Sized>(
    source: &S,
    url: &str,
    headers: &HashMap<String, String>,
) -> Result<NormalizedRow, DetailError> {
    let value = source.fetch_json(url, headers)?;
    let record = extract_record(value).inspect_err(|e| {
        tracing::debug!(url, "detail response without record: {}", e);
    })?;
    Ok(NormalizedRow::from_record(&record))
}
