use serde::{Deserialize, Serialize};

use crate::domain::input::{FormatError, parse_input};
use crate::domain::locator::{IMAGE_EXTENSIONS, ResourceLocator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupMode {
    Single,
    Bulk,
}

/// A parsed lookup with the URLs each record starts from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupPlan {
    pub mode: LookupMode,
    pub records: Vec<PlannedRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedRecord {
    pub ssc: String,
    pub guia: String,
    pub pdf_url: String,
    /// First image candidate; later extensions are only tried on failure.
    pub image_url: String,
}

pub fn plan_lookup(raw: &str, locator: &ResourceLocator) -> Result<LookupPlan, FormatError> {
    let query = parse_input(raw)?;
    let mode = if query.is_bulk() {
        LookupMode::Bulk
    } else {
        LookupMode::Single
    };

    let records = query
        .into_records()
        .into_iter()
        .map(|record| PlannedRecord {
            pdf_url: locator.pdf_url(&record.ssc),
            image_url: locator.image_url(&record.guia, IMAGE_EXTENSIONS[0]),
            ssc: record.ssc,
            guia: record.guia,
        })
        .collect();

    Ok(LookupPlan { mode, records })
}
