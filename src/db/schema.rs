//! Schema descriptors for the three request kinds.
//!
//! A [`ResourceSchema`] is a configuration table: the generic service, the HTTP
//! routes, the report layout and the form controller are all driven from it,
//! so adding a request kind means adding one more static here.

use std::sync::OnceLock;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::{Map, Number, Value};

use crate::db::models::record::Document;
use crate::db::models::requests::ApprovalStatus;
use crate::error::FieldError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Characters a form field will accept while the user types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// `[a-zA-Z0-9]`
    Alphanumeric,
    /// `[a-zA-Z0-9\s]`
    AlphanumericSpace,
    /// `[0-9]`
    Digits,
    /// A non-negative decimal, possibly still being typed (`12.`).
    Decimal,
}

impl CharClass {
    fn regex(self) -> &'static Regex {
        static ALPHANUMERIC: OnceLock<Regex> = OnceLock::new();
        static ALPHANUMERIC_SPACE: OnceLock<Regex> = OnceLock::new();
        static DIGITS: OnceLock<Regex> = OnceLock::new();
        static DECIMAL: OnceLock<Regex> = OnceLock::new();

        let (cell, pattern) = match self {
            CharClass::Alphanumeric => (&ALPHANUMERIC, r"^[a-zA-Z0-9]*$"),
            CharClass::AlphanumericSpace => (&ALPHANUMERIC_SPACE, r"^[a-zA-Z0-9\s]*$"),
            CharClass::Digits => (&DIGITS, r"^[0-9]*$"),
            CharClass::Decimal => (&DECIMAL, r"^\d*\.?\d*$"),
        };
        cell.get_or_init(|| Regex::new(pattern).expect("static pattern compiles"))
    }

    /// Classes the service checks as well as the form. The looser text classes
    /// only guide typing.
    pub fn server_enforced(self) -> bool {
        matches!(self, CharClass::Digits)
    }

    /// Whether `value` may stand in the field (the empty string always may).
    pub fn accepts(self, value: &str) -> bool {
        self.regex().is_match(value)
    }
}

#[derive(Debug)]
pub enum FieldKind {
    /// String field; the class applies to form input only.
    Text(CharClass),
    /// Calendar date, never later than today.
    Date,
    /// Non-negative measurement.
    Number,
    Status,
    /// Nested object whose members are all required.
    Group(&'static [FieldSpec]),
}

#[derive(Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

/// A scalar field reached through at most one group, e.g. `measurements.chest`.
#[derive(Debug, Clone)]
pub struct Leaf {
    pub path: String,
    pub label: &'static str,
    pub kind: &'static FieldKind,
}

#[derive(Debug)]
pub struct ResourceSchema {
    /// Singular display name, e.g. "Material request".
    pub name: &'static str,
    /// Backing collection (table) name.
    pub collection: &'static str,
    /// Path segment under `/api`.
    pub route: &'static str,
    pub title: &'static str,
    pub file_name: &'static str,
    pub fields: &'static [FieldSpec],
    /// Fields the free-text filter looks at.
    pub search_fields: &'static [&'static str],
}

impl ResourceSchema {
    pub fn leaves(&self) -> Vec<Leaf> {
        let mut leaves = Vec::new();
        for spec in self.fields {
            match &spec.kind {
                FieldKind::Group(members) => {
                    for member in *members {
                        leaves.push(Leaf {
                            path: format!("{}.{}", spec.name, member.name),
                            label: member.label,
                            kind: &member.kind,
                        });
                    }
                }
                kind => leaves.push(Leaf {
                    path: spec.name.to_string(),
                    label: spec.label,
                    kind,
                }),
            }
        }
        leaves
    }

    /// Validates a full field set for a new record.
    ///
    /// Unknown fields are dropped, `approvalStatus` defaults to Pending, and
    /// every other declared field must be present.
    pub fn validate_new(&self, input: &Value, today: NaiveDate) -> Result<Document, Vec<FieldError>> {
        let object = as_object(input)?;
        let mut errors = Vec::new();
        let mut document = Map::new();

        for spec in self.fields {
            match present(object, spec.name) {
                Some(value) => {
                    if let Some(clean) = check_field(spec, spec.name, value, today, &mut errors) {
                        document.insert(spec.name.to_string(), clean);
                    }
                }
                None if matches!(spec.kind, FieldKind::Status) => {
                    document.insert(
                        spec.name.to_string(),
                        Value::String(ApprovalStatus::default().to_string()),
                    );
                }
                None => errors.push(FieldError::required(spec.name)),
            }
        }

        if errors.is_empty() {
            Ok(document)
        } else {
            Err(errors)
        }
    }

    /// Validates the fields of a partial overwrite.
    ///
    /// Only declared fields that are present are checked; an explicit `null`
    /// would remove a required field and is rejected.
    pub fn validate_patch(&self, input: &Value, today: NaiveDate) -> Result<Document, Vec<FieldError>> {
        let object = as_object(input)?;
        let mut errors = Vec::new();
        let mut document = Map::new();

        for spec in self.fields {
            match object.get(spec.name) {
                None => {}
                Some(Value::Null) => errors.push(FieldError::required(spec.name)),
                Some(value) => {
                    if let Some(clean) = check_field(spec, spec.name, value, today, &mut errors) {
                        document.insert(spec.name.to_string(), clean);
                    }
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        if document.is_empty() {
            return Err(vec![FieldError::new("body", "No fields provided for update")]);
        }
        Ok(document)
    }
}

fn as_object(input: &Value) -> Result<&Map<String, Value>, Vec<FieldError>> {
    input
        .as_object()
        .ok_or_else(|| vec![FieldError::new("body", "must be a JSON object")])
}

fn present<'a>(object: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    object.get(name).filter(|v| !v.is_null())
}

fn check_field(
    spec: &FieldSpec,
    path: &str,
    value: &Value,
    today: NaiveDate,
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    let checked = match &spec.kind {
        FieldKind::Text(class) => match value {
            Value::String(s) if s.trim().is_empty() => Err("is required"),
            Value::String(s) if class.server_enforced() && !class.accepts(s) => Err("must contain digits only"),
            Value::String(s) => Ok(Value::String(s.clone())),
            Value::Number(n) if class.server_enforced() => match n.as_u64() {
                Some(whole) => Ok(Value::String(whole.to_string())),
                None => Err("must contain digits only"),
            },
            Value::Number(n) => Ok(Value::String(n.to_string())),
            _ => Err("must be a string"),
        },
        FieldKind::Date => match value.as_str().map(parse_date) {
            Some(Some(date)) if date > today => Err("cannot be in the future"),
            Some(Some(date)) => Ok(Value::String(date.format(DATE_FORMAT).to_string())),
            _ => Err("must be a date (YYYY-MM-DD)"),
        },
        FieldKind::Number => {
            // Numbers are stored as sent; only numeric strings are converted.
            let number = match value {
                Value::Number(n) => Some(n.clone()),
                Value::String(s) => s.trim().parse::<f64>().ok().and_then(Number::from_f64),
                _ => None,
            };
            match number.filter(|n| n.as_f64().is_some_and(|f| f.is_finite() && f >= 0.0)) {
                Some(n) => Ok(Value::Number(n)),
                None => Err("must be a non-negative number"),
            }
        }
        FieldKind::Status => match value.as_str().map(str::parse::<ApprovalStatus>) {
            Some(Ok(status)) => Ok(Value::String(status.to_string())),
            _ => Err("must be one of Pending, Approved, Rejected"),
        },
        FieldKind::Group(members) => {
            let Some(object) = value.as_object() else {
                errors.push(FieldError::new(path, "must be an object"));
                return None;
            };
            let before = errors.len();
            let mut group = Map::new();
            for member in *members {
                let member_path = format!("{path}.{}", member.name);
                match present(object, member.name) {
                    Some(v) => {
                        if let Some(clean) = check_field(member, &member_path, v, today, errors) {
                            group.insert(member.name.to_string(), clean);
                        }
                    }
                    None => errors.push(FieldError::required(member_path)),
                }
            }
            return (errors.len() == before).then_some(Value::Object(group));
        }
    };

    match checked {
        Ok(clean) => Some(clean),
        Err(message) => {
            errors.push(FieldError::new(path, message));
            None
        }
    }
}

/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps, and naive `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|d| d.date())
        })
}

/// Today's calendar date on the local clock.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub static DESIGN_REQUESTS: ResourceSchema = ResourceSchema {
    name: "Design request",
    collection: "design_requests",
    route: "designRequests",
    title: "Design Requests Report",
    file_name: "DesignRequests.pdf",
    fields: &[
        FieldSpec { name: "patternId", label: "Pattern ID", kind: FieldKind::Text(CharClass::Alphanumeric) },
        FieldSpec { name: "patternName", label: "Pattern Name", kind: FieldKind::Text(CharClass::AlphanumericSpace) },
        FieldSpec { name: "material", label: "Material", kind: FieldKind::Text(CharClass::AlphanumericSpace) },
        FieldSpec { name: "size", label: "Size", kind: FieldKind::Text(CharClass::AlphanumericSpace) },
        FieldSpec { name: "country", label: "Country", kind: FieldKind::Text(CharClass::AlphanumericSpace) },
        FieldSpec { name: "date", label: "Date", kind: FieldKind::Date },
        FieldSpec { name: "approvalStatus", label: "Approval Status", kind: FieldKind::Status },
    ],
    search_fields: &["patternId", "patternName", "material", "size", "country"],
};

pub static MATERIAL_REQUESTS: ResourceSchema = ResourceSchema {
    name: "Material request",
    collection: "material_requests",
    route: "materialRequests",
    title: "Material Requests Report",
    file_name: "MaterialRequests.pdf",
    fields: &[
        FieldSpec { name: "materialId", label: "Material ID", kind: FieldKind::Text(CharClass::AlphanumericSpace) },
        FieldSpec { name: "materialName", label: "Material Name", kind: FieldKind::Text(CharClass::AlphanumericSpace) },
        FieldSpec { name: "type", label: "Type", kind: FieldKind::Text(CharClass::AlphanumericSpace) },
        FieldSpec { name: "date", label: "Date", kind: FieldKind::Date },
        FieldSpec { name: "quantity", label: "Quantity", kind: FieldKind::Text(CharClass::Digits) },
        FieldSpec { name: "approvalStatus", label: "Approval Status", kind: FieldKind::Status },
    ],
    search_fields: &["materialId", "materialName", "type", "quantity"],
};

pub static SIZE_CHART_REQUESTS: ResourceSchema = ResourceSchema {
    name: "Size chart request",
    collection: "size_chart_requests",
    route: "sizeChartRequests",
    title: "Size Chart Requests Report",
    file_name: "SizeChartRequests.pdf",
    fields: &[
        FieldSpec { name: "country", label: "Country", kind: FieldKind::Text(CharClass::AlphanumericSpace) },
        FieldSpec { name: "size", label: "Size", kind: FieldKind::Text(CharClass::AlphanumericSpace) },
        FieldSpec {
            name: "measurements",
            label: "Measurements",
            kind: FieldKind::Group(&[
                FieldSpec { name: "chest", label: "Chest", kind: FieldKind::Number },
                FieldSpec { name: "waist", label: "Waist", kind: FieldKind::Number },
                FieldSpec { name: "hip", label: "Hip", kind: FieldKind::Number },
                FieldSpec { name: "sleeveLength", label: "Sleeve Length", kind: FieldKind::Number },
            ]),
        },
        FieldSpec { name: "date", label: "Date", kind: FieldKind::Date },
        FieldSpec { name: "approvalStatus", label: "Approval Status", kind: FieldKind::Status },
    ],
    search_fields: &["country", "size"],
};

pub static ALL: [&ResourceSchema; 3] = [&DESIGN_REQUESTS, &MATERIAL_REQUESTS, &SIZE_CHART_REQUESTS];
