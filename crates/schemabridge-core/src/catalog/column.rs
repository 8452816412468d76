use crate::filter::Filterable;
use crate::naming::normalize_name;
use serde::Serialize;

/// Type string carried by columns restricted to a finite value set.
pub const ENUM_TYPE: &str = "Enum";

/// A single column of a table or view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    name: String,
    proper_name: String,
    data_type: String,
    is_pk: bool,
    is_fk: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    enum_values: Option<Vec<String>>,
    #[serde(skip)]
    embedding: Option<Vec<f32>>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            proper_name: normalize_name(&name),
            name,
            data_type: data_type.into(),
            is_pk: false,
            is_fk: false,
            enum_values: None,
            embedding: None,
        }
    }

    /// Mark the column as part of the primary key.
    pub fn primary_key(mut self) -> Self {
        self.is_pk = true;
        self
    }

    /// Mark the column as constrained by a foreign key.
    pub fn foreign_key(mut self) -> Self {
        self.is_fk = true;
        self
    }

    /// Restrict the column to a finite value set.
    pub fn with_enum_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_enum_values(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn proper_name(&self) -> &str {
        &self.proper_name
    }

    /// Free-form type string, or [`ENUM_TYPE`] for enum columns.
    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    pub fn is_pk(&self) -> bool {
        self.is_pk
    }

    pub fn is_fk(&self) -> bool {
        self.is_fk
    }

    /// Primary and foreign key columns.
    pub fn is_key(&self) -> bool {
        self.is_pk || self.is_fk
    }

    pub fn enum_values(&self) -> Option<&[String]> {
        self.enum_values.as_deref()
    }

    pub fn embedding(&self) -> Option<&[f32]> {
        self.embedding.as_deref()
    }

    pub fn set_embedding(&mut self, embedding: Vec<f32>) {
        self.embedding = Some(embedding);
    }

    /// Replace the value set; the type becomes [`ENUM_TYPE`].
    pub fn set_enum_values(&mut self, values: Vec<String>) {
        self.data_type = ENUM_TYPE.to_string();
        self.enum_values = Some(values);
    }

    pub(crate) fn mark_pk(&mut self) {
        self.is_pk = true;
    }

    pub(crate) fn mark_fk(&mut self) {
        self.is_fk = true;
    }
}

impl Filterable for Column {
    fn name(&self) -> &str {
        &self.name
    }

    fn embedding(&self) -> Option<&[f32]> {
        self.embedding.as_deref()
    }

    fn is_pinned(&self) -> bool {
        self.is_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proper_name_follows_name() {
        let column = Column::new("Col3.DOT", "INTEGER");
        assert_eq!(column.name(), "Col3.DOT");
        assert_eq!(column.proper_name(), "col3_dot");
        assert!(!column.is_key());
    }

    #[test]
    fn test_enum_values_switch_type() {
        let column = Column::new("status", "VARCHAR(10)").with_enum_values(["open", "closed"]);
        assert_eq!(column.data_type(), ENUM_TYPE);
        assert_eq!(
            column.enum_values(),
            Some(&["open".to_string(), "closed".to_string()][..])
        );
    }

    #[test]
    fn test_key_columns_are_pinned() {
        assert!(Column::new("id", "INTEGER").primary_key().is_pinned());
        assert!(Column::new("owner_id", "INTEGER").foreign_key().is_pinned());
        assert!(!Column::new("label", "TEXT").is_pinned());
    }
}
