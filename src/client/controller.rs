//! Form/table controller for one request kind.
//!
//! Holds the editable form, the loaded record list and the search filter.
//! Input is validated per keystroke; every failure becomes a [`Notice`].

use std::path::PathBuf;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde_json::{Map, Number, Value};
use uuid::Uuid;

use super::ResourceApi;
use crate::db::models::record::Record;
use crate::db::models::requests::ApprovalStatus;
use crate::db::schema::{self, parse_date, CharClass, FieldKind, Leaf, ResourceSchema, DATE_FORMAT};
use crate::report::{FileSink, Report, ReportStyle};

pub const FUTURE_DATE_ALERT: &str = "You cannot select a future date.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
    /// Blocking alert, e.g. a rejected date.
    Alert,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

pub struct FormController<A> {
    schema: &'static ResourceSchema,
    api: A,
    leaves: Vec<Leaf>,
    values: IndexMap<String, String>,
    status: ApprovalStatus,
    editing: Option<Uuid>,
    records: Vec<Record>,
    query: String,
    notices: Vec<Notice>,
    clock: fn() -> NaiveDate,
}

impl<A: ResourceApi> FormController<A> {
    pub fn new(schema: &'static ResourceSchema, api: A) -> Self {
        let leaves: Vec<Leaf> = schema
            .leaves()
            .into_iter()
            .filter(|leaf| !matches!(leaf.kind, FieldKind::Status))
            .collect();
        let values = leaves.iter().map(|leaf| (leaf.path.clone(), String::new())).collect();

        Self {
            schema,
            api,
            leaves,
            values,
            status: ApprovalStatus::default(),
            editing: None,
            records: Vec::new(),
            query: String::new(),
            notices: Vec::new(),
            clock: schema::today,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    pub fn field(&self, path: &str) -> Option<&str> {
        self.values.get(path).map(String::as_str)
    }

    pub fn status(&self) -> ApprovalStatus {
        self.status
    }

    pub fn editing(&self) -> Option<Uuid> {
        self.editing
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            NoticeLevel::Error => tracing::warn!(resource = self.schema.name, %message, "user notice"),
            _ => tracing::debug!(resource = self.schema.name, %message, "user notice"),
        }
        self.notices.push(Notice { level, message });
    }

    /// Applies one keystroke's worth of input. Returns `false` when the value
    /// is refused and the field keeps its previous content.
    pub fn set_field(&mut self, path: &str, value: &str) -> bool {
        let Some(kind) = self.leaves.iter().find(|leaf| leaf.path == path).map(|leaf| leaf.kind) else {
            return false;
        };

        let accepted = match kind {
            FieldKind::Text(class) => class.accepts(value),
            FieldKind::Number => CharClass::Decimal.accepts(value),
            FieldKind::Date if value.is_empty() => true,
            FieldKind::Date => match parse_date(value) {
                Some(date) if date > (self.clock)() => {
                    self.notify(NoticeLevel::Alert, FUTURE_DATE_ALERT);
                    false
                }
                Some(_) => true,
                None => false,
            },
            FieldKind::Status | FieldKind::Group(_) => false,
        };

        if accepted {
            self.values.insert(path.to_string(), value.to_string());
        }
        accepted
    }

    pub fn set_status(&mut self, status: ApprovalStatus) {
        self.status = status;
    }

    /// Labels of required fields that are still empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.leaves
            .iter()
            .filter(|leaf| self.values.get(&leaf.path).is_none_or(|v| v.trim().is_empty()))
            .map(|leaf| leaf.label)
            .collect()
    }

    /// The JSON body sent on submit.
    pub fn payload(&self) -> Value {
        let mut body = Map::new();
        for spec in self.schema.fields {
            let value = match &spec.kind {
                FieldKind::Status => Value::String(self.status.to_string()),
                FieldKind::Group(members) => {
                    let group = members
                        .iter()
                        .map(|member| {
                            let raw = self.input(&format!("{}.{}", spec.name, member.name));
                            (member.name.to_string(), input_to_json(&member.kind, raw))
                        })
                        .collect();
                    Value::Object(group)
                }
                kind => input_to_json(kind, self.input(spec.name)),
            };
            body.insert(spec.name.to_string(), value);
        }
        Value::Object(body)
    }

    fn input(&self, path: &str) -> &str {
        self.values.get(path).map(String::as_str).unwrap_or_default()
    }

    /// Creates or updates depending on the editing flag, then clears the form
    /// and reloads the list from the server.
    pub async fn submit(&mut self) -> bool {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            self.notify(NoticeLevel::Error, format!("Please fill in: {}", missing.join(", ")));
            return false;
        }

        let payload = self.payload();
        let (result, verb) = match self.editing {
            Some(id) => (self.api.update(id, &payload).await, "updated"),
            None => (self.api.create(&payload).await, "created"),
        };

        match result {
            Ok(record) => {
                tracing::info!(resource = self.schema.name, id = %record.id, verb, "form submitted");
                self.clear();
                self.notify(NoticeLevel::Info, format!("{} {verb}", self.schema.name));
                self.refresh().await;
                true
            }
            Err(e) => {
                self.notify(NoticeLevel::Error, format!("Could not save {}: {e}", self.schema.name.to_lowercase()));
                false
            }
        }
    }

    /// Reloads every record; the filter is re-applied locally.
    pub async fn refresh(&mut self) -> bool {
        match self.api.list().await {
            Ok(records) => {
                self.records = records;
                true
            }
            Err(e) => {
                self.notify(NoticeLevel::Error, format!("Could not load {} list: {e}", self.schema.name.to_lowercase()));
                false
            }
        }
    }

    /// Copies a loaded record into the form and marks it as being edited.
    pub fn edit(&mut self, id: Uuid) -> bool {
        let Some(record) = self.records.iter().find(|r| r.id == id).cloned() else {
            self.notify(NoticeLevel::Error, format!("{} not found", self.schema.name));
            return false;
        };

        for leaf in &self.leaves {
            let value = record.get(&leaf.path).map(|v| json_to_input(leaf.kind, v)).unwrap_or_default();
            self.values.insert(leaf.path.clone(), value);
        }
        self.status = record
            .get("approvalStatus")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        self.editing = Some(id);
        true
    }

    /// Resets the form to its defaults without touching the store.
    pub fn clear(&mut self) {
        for value in self.values.values_mut() {
            value.clear();
        }
        self.status = ApprovalStatus::default();
        self.editing = None;
    }

    pub async fn delete(&mut self, id: Uuid) -> bool {
        match self.api.delete(id).await {
            Ok(()) => {
                if self.editing == Some(id) {
                    self.clear();
                }
                self.notify(NoticeLevel::Info, format!("{} deleted", self.schema.name));
                self.refresh().await;
                true
            }
            Err(e) => {
                self.notify(NoticeLevel::Error, format!("Could not delete {}: {e}", self.schema.name.to_lowercase()));
                false
            }
        }
    }

    pub fn set_filter(&mut self, query: &str) {
        self.query = query.to_string();
    }

    pub fn visible(&self) -> Vec<&Record> {
        filter_records(self.schema, &self.records, &self.query)
    }

    /// Saves the currently visible rows as a table-style PDF.
    pub fn export(&mut self, sink: FileSink) -> Option<PathBuf> {
        let rows: Vec<Record> = self.visible().into_iter().cloned().collect();
        match Report::generate(self.schema, &rows, ReportStyle::Table).and_then(|r| r.deliver(sink)) {
            Ok(path) => Some(path),
            Err(e) => {
                self.notify(NoticeLevel::Error, format!("Could not export report: {e}"));
                None
            }
        }
    }
}

/// Records whose search fields contain `query`, case-insensitively.
pub fn filter_records<'a>(schema: &ResourceSchema, records: &'a [Record], query: &str) -> Vec<&'a Record> {
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|record| {
            needle.is_empty()
                || schema.search_fields.iter().any(|field| {
                    record
                        .get(field)
                        .and_then(searchable)
                        .is_some_and(|text| text.to_lowercase().contains(&needle))
                })
        })
        .collect()
}

fn searchable(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn input_to_json(kind: &FieldKind, raw: &str) -> Value {
    match kind {
        FieldKind::Number => match raw.parse::<u64>() {
            Ok(whole) => Value::from(whole),
            Err(_) => raw
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(raw.to_string())),
        },
        _ => Value::String(raw.to_string()),
    }
}

fn json_to_input(kind: &FieldKind, value: &Value) -> String {
    match (kind, value) {
        (FieldKind::Date, Value::String(s)) => parse_date(s)
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default(),
        (_, Value::String(s)) => s.clone(),
        (_, Value::Number(n)) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        _ => String::new(),
    }
}
