use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Field set of a stored record, keyed by wire name.
pub type Document = Map<String, Value>;

/// A persisted record: the store-assigned id plus its flat field set.
///
/// Serializes as `{"_id": "...", <field>: <value>, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: Document,
}

impl Record {
    pub fn new(id: Uuid, mut fields: Document) -> Self {
        fields.remove("_id");
        Self { id, fields }
    }

    /// Looks up a value by dotted path, e.g. `measurements.chest`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.fields.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// Decodes the record into one of the typed request models.
    pub fn decode<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::to_value(self).and_then(serde_json::from_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flattens_fields_next_to_id() {
        let id = Uuid::new_v4();
        let fields = json!({ "country": "LK", "measurements": { "chest": 40.0 } });
        let record = Record::new(id, fields.as_object().cloned().unwrap());

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["_id"], json!(id.to_string()));
        assert_eq!(value["country"], "LK");
        assert_eq!(record.get("measurements.chest"), Some(&json!(40.0)));
        assert_eq!(record.get("measurements.hip"), None);

        let back: Record = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }
}
