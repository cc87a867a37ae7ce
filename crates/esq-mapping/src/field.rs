//! Field metadata types

use std::fmt;

/// Data type of a mapped field.
///
/// Unrecognized type names are preserved in [`FieldType::Other`] rather than
/// rejected, since mappings routinely carry plugin-provided types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Boolean,
    Date,
    Integer,
    Long,
    Short,
    Byte,
    Float,
    Double,
    ScaledFloat,
    Ip,
    GeoPoint,
    Keyword,
    Text,
    Nested,
    Object,
    Other(String),
}

impl FieldType {
    /// Parse a mapping `type` string.
    pub fn parse(name: &str) -> Self {
        match name {
            "boolean" => Self::Boolean,
            "date" => Self::Date,
            "integer" => Self::Integer,
            "long" => Self::Long,
            "short" => Self::Short,
            "byte" => Self::Byte,
            "float" => Self::Float,
            "double" => Self::Double,
            "scaled_float" => Self::ScaledFloat,
            "ip" => Self::Ip,
            "geo_point" => Self::GeoPoint,
            "keyword" => Self::Keyword,
            "text" => Self::Text,
            "nested" => Self::Nested,
            "object" => Self::Object,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Short => "short",
            Self::Byte => "byte",
            Self::Float => "float",
            Self::Double => "double",
            Self::ScaledFloat => "scaled_float",
            Self::Ip => "ip",
            Self::GeoPoint => "geo_point",
            Self::Keyword => "keyword",
            Self::Text => "text",
            Self::Nested => "nested",
            Self::Object => "object",
            Self::Other(name) => name,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Integer
                | Self::Long
                | Self::Short
                | Self::Byte
                | Self::Float
                | Self::Double
                | Self::ScaledFloat
        )
    }

    /// Types a `range` clause is expected to target.
    pub fn is_rangeable(&self) -> bool {
        matches!(
            self,
            Self::Integer | Self::Long | Self::Float | Self::Double | Self::Date | Self::Ip
        )
    }
}

impl Default for FieldType {
    fn default() -> Self {
        Self::Object
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata for one flattened field path.
///
/// A multi-field (e.g. the `keyword` sub-field of a `text` field) gets its
/// own entry at `parent.subname` with `is_multi_field` set and
/// `parent_field` pointing back at the owning path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldInfo {
    pub field_type: FieldType,
    pub analyzer: Option<String>,
    pub search_analyzer: Option<String>,
    pub normalizer: Option<String>,
    /// Date format string, for `date` fields that declare one.
    pub format: Option<String>,
    pub is_nested: bool,
    pub has_sub_properties: bool,
    /// Sub-field names in mapping order.
    pub multi_field_names: Vec<String>,
    pub is_multi_field: bool,
    pub parent_field: Option<String>,
}
