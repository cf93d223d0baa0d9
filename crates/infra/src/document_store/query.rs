//! Query, sort and update descriptions shared by every backend.

use core::cmp::Ordering;

use serde_json::Value;

use roombook_core::{Document, DocumentId, ID_FIELD, document};

use super::r#trait::StoreError;

/// Logical collection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Collection {
    Rooms,
    Bookings,
    Reviews,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Rooms, Collection::Bookings, Collection::Reviews];

    /// Collection name; doubles as the Postgres table name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Rooms => "rooms",
            Collection::Bookings => "bookings",
            Collection::Reviews => "reviews",
        }
    }
}

impl core::fmt::Display for Collection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document selector.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Every document.
    All,
    /// Top-level `field` equals `value` (numbers compare by value).
    Eq { field: String, value: Value },
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn by_id(id: DocumentId) -> Self {
        Self::eq(ID_FIELD, id)
    }

    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq { field, value } => doc.get(field).is_some_and(|v| values_equal(v, value)),
        }
    }

    /// Fields an upsert copies into the inserted document.
    fn equality_fields(&self) -> Document {
        let mut doc = Document::new();
        if let Filter::Eq { field, value } = self {
            doc.insert(field.clone(), value.clone());
        }
        doc
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub order: SortOrder,
}

impl Sort {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Descending,
        }
    }

    /// Compare two documents on the sort field.
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        let ord = compare_values(a.get(&self.field), b.get(&self.field));
        match self.order {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FindQuery {
    pub filter: Filter,
    pub sort: Option<Sort>,
}

impl FindQuery {
    pub fn all() -> Self {
        Self::filtered(Filter::All)
    }

    pub fn filtered(filter: Filter) -> Self {
        Self { filter, sort: None }
    }

    pub fn sorted(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }
}

/// Field assignments applied by `update_one`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    /// Assigned on match and on upsert.
    pub set: Document,
    /// Assigned only when an upsert inserts.
    pub set_on_insert: Document,
}

impl Update {
    pub fn set(field: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut update = Self::default();
        update.set.insert(field.into(), value.into());
        update
    }

    pub fn on_insert(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_on_insert.insert(field.into(), value.into());
        self
    }

    pub(crate) fn check(&self) -> Result<(), StoreError> {
        if self.set.contains_key(ID_FIELD) {
            return Err(StoreError::InvalidDocument("_id cannot be updated".to_string()));
        }
        Ok(())
    }

    /// Apply `set` to a matched document; returns whether anything changed.
    pub(crate) fn apply(&self, doc: &mut Document) -> bool {
        let mut modified = false;
        for (field, value) in &self.set {
            if doc.get(field).is_some_and(|current| values_equal(current, value)) {
                continue;
            }
            doc.insert(field.clone(), value.clone());
            modified = true;
        }
        modified
    }

    /// Build the document an upsert inserts when `filter` matched nothing.
    pub(crate) fn upsert_document(&self, filter: &Filter) -> Result<(DocumentId, Document), StoreError> {
        let mut doc = filter.equality_fields();
        for (field, value) in self.set_on_insert.iter().chain(&self.set) {
            doc.insert(field.clone(), value.clone());
        }
        prepare_insert(doc)
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    pub upsert: bool,
}

impl UpdateOptions {
    pub fn upsert() -> Self {
        Self { upsert: true }
    }
}

/// Ensure a document carries a valid `_id`, generating one when missing.
pub(crate) fn prepare_insert(mut doc: Document) -> Result<(DocumentId, Document), StoreError> {
    let id = match document::id_of(&doc) {
        Ok(Some(id)) => id,
        Ok(None) => {
            let id = DocumentId::new();
            doc.insert(ID_FIELD.to_string(), id.into());
            id
        }
        Err(e) => return Err(StoreError::InvalidDocument(e.to_string())),
    };
    Ok((id, doc))
}

/// Equality as the store sees it: numbers compare by value (`1 == 1.0`).
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Total order over JSON values, matching Postgres `jsonb` ordering across
/// types: missing/null < string < number < boolean < array < object.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::String(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::Bool(_)) => 3,
            Some(Value::Array(_)) => 4,
            Some(Value::Object(_)) => 5,
        }
    }

    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(f64::NAN), y.as_f64().unwrap_or(f64::NAN));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x @ (Value::Array(_) | Value::Object(_))), Some(y)) if rank(Some(x)) == rank(Some(y)) => {
            x.to_string().cmp(&y.to_string())
        }
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: Value) -> Document {
        document::to_document(&v).unwrap()
    }

    #[test]
    fn numbers_compare_by_value() {
        assert!(values_equal(&json!(1), &json!(1.0)));
        assert_eq!(compare_values(Some(&json!(2)), Some(&json!(10.5))), Ordering::Less);
    }

    #[test]
    fn missing_sorts_before_everything() {
        assert_eq!(compare_values(None, Some(&json!(""))), Ordering::Less);
        assert_eq!(compare_values(None, Some(&Value::Null)), Ordering::Equal);
        assert_eq!(compare_values(Some(&json!("9")), Some(&json!(1))), Ordering::Less);
    }

    #[test]
    fn descending_sort_reverses() {
        let a = doc(json!({ "time": 1 }));
        let b = doc(json!({ "time": 2 }));
        assert_eq!(Sort::descending("time").compare(&a, &b), Ordering::Greater);
        assert_eq!(Sort::ascending("time").compare(&a, &b), Ordering::Less);
    }

    #[test]
    fn update_reports_modification_only_on_change() {
        let mut d = doc(json!({ "availability": true }));
        assert!(!Update::set("availability", true).apply(&mut d));
        assert!(Update::set("availability", false).apply(&mut d));
        assert_eq!(d["availability"], false);
    }

    #[test]
    fn upsert_document_combines_filter_set_and_insert_fields() {
        let id = DocumentId::new();
        let update = Update::set("date", "2024-06-01").on_insert("email", "a@b.com");
        let (got_id, d) = update.upsert_document(&Filter::by_id(id)).unwrap();
        assert_eq!(got_id, id);
        assert_eq!(d["_id"], json!(id.to_string()));
        assert_eq!(d["date"], "2024-06-01");
        assert_eq!(d["email"], "a@b.com");
    }

    #[test]
    fn updating_id_is_rejected() {
        assert!(Update::set("_id", "x").check().is_err());
    }

    #[test]
    fn prepare_insert_rejects_malformed_ids() {
        assert!(prepare_insert(doc(json!({ "_id": "not-a-uuid" }))).is_err());
        let (id, d) = prepare_insert(doc(json!({ "a": 1 }))).unwrap();
        assert_eq!(d["_id"], json!(id.to_string()));
    }
}
