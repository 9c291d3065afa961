use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::guia::{is_dashed, normalize};

/// One SSC/guía pair entered by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    pub ssc: String,
    pub guia: String,
    #[serde(default)]
    pub marked: bool,
}

impl InputRecord {
    /// Build a record, normalizing the guía.
    pub fn new(ssc: impl Into<String>, guia: &str) -> Self {
        Self {
            ssc: ssc.into(),
            guia: normalize(guia),
            marked: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Query {
    Single { record: InputRecord },
    Bulk { records: Vec<InputRecord> },
}

impl Query {
    pub fn is_bulk(&self) -> bool {
        matches!(self, Query::Bulk { .. })
    }

    pub fn into_records(self) -> Vec<InputRecord> {
        match self {
            Query::Single { record } => vec![record],
            Query::Bulk { records } => records,
        }
    }
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error(
        "Formato incorrecto. Por favor ingresa: SSC GUIA (separados por espacio). Ejemplo: 3394535 335-17-20-CC-3589"
    )]
    ContinuousGuia,
    #[error(
        "Formato incorrecto. Por favor ingresa el texto con el formato: SSC GUIA (separados por espacio)"
    )]
    MissingSeparator,
    #[error("Formato incorrecto. Debes ingresar exactamente dos valores separados por un espacio")]
    WrongFieldCount,
    #[error(
        "Formato incorrecto. No se encontraron registros válidos; usa una línea por registro con el formato SSC<TAB>GUIA"
    )]
    NoValidRecords,
    #[error(
        "Demasiados registros. La búsqueda masiva admite como máximo {} líneas",
        MAX_BULK_RECORDS
    )]
    TooManyRecords,
}

/// Upper bound on records accepted from one bulk paste.
pub const MAX_BULK_RECORDS: usize = 5_000;

static TAB_RUN: OnceLock<Regex> = OnceLock::new();

#[allow(clippy::expect_used)] // Static pattern: failing to compile is a programming error
fn tab_run() -> &'static Regex {
    TAB_RUN.get_or_init(|| Regex::new(r"\t+").expect("compile TAB_RUN"))
}

/// Parse raw user input into a single query or a bulk list.
///
/// Input containing a newline is bulk input: one `SSC<TAB>GUIA` record per
/// line, with blank and short lines skipped. Anything else must be exactly
/// `SSC GUIA` separated by whitespace.
pub fn parse_input(raw: &str) -> Result<Query, FormatError> {
    if raw.contains('\n') {
        parse_bulk(raw)
    } else {
        parse_single(raw)
    }
}

fn parse_bulk(raw: &str) -> Result<Query, FormatError> {
    let mut records = Vec::new();
    let lines = raw
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .filter_map(parse_bulk_line);

    for record in lines {
        if records.len() == MAX_BULK_RECORDS {
            return Err(FormatError::TooManyRecords);
        }
        records.push(record);
    }

    if records.is_empty() {
        return Err(FormatError::NoValidRecords);
    }

    Ok(Query::Bulk { records })
}

fn parse_bulk_line(line: &str) -> Option<InputRecord> {
    let mut fields = tab_run().split(line);
    let ssc = fields.next()?.trim();
    let guia = fields.next()?.trim();
    Some(InputRecord::new(ssc, guia))
}

fn parse_single(raw: &str) -> Result<Query, FormatError> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let has_separator = collapsed.contains(' ');

    if !has_separator && is_dashed(&normalize(&collapsed)) {
        return Err(FormatError::ContinuousGuia);
    }

    if !has_separator {
        return Err(FormatError::MissingSeparator);
    }

    let parts: Vec<&str> = collapsed.split(' ').collect();
    let [ssc, guia] = parts.as_slice() else {
        return Err(FormatError::WrongFieldCount);
    };

    Ok(Query::Single {
        record: InputRecord::new(*ssc, guia),
    })
}
