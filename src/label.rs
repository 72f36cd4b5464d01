use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// Closed set of semantic types the classifier assigns to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeLabel {
    Int,
    Float,
    Text,
    CategoryText,
    CategoryInt,
    Date,
    CategoryListInt,
    ListFloat,
    ListMixed,
    Unknown,
}

impl TypeLabel {
    pub const ALL: [TypeLabel; 10] = [
        TypeLabel::Int,
        TypeLabel::Float,
        TypeLabel::Text,
        TypeLabel::CategoryText,
        TypeLabel::CategoryInt,
        TypeLabel::Date,
        TypeLabel::CategoryListInt,
        TypeLabel::ListFloat,
        TypeLabel::ListMixed,
        TypeLabel::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeLabel::Int => "int",
            TypeLabel::Float => "float",
            TypeLabel::Text => "text",
            TypeLabel::CategoryText => "category_text",
            TypeLabel::CategoryInt => "category_int",
            TypeLabel::Date => "date",
            TypeLabel::CategoryListInt => "category_list[int]",
            TypeLabel::ListFloat => "list[float]",
            TypeLabel::ListMixed => "list[mixed]",
            TypeLabel::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TypeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeLabel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        TypeLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == value)
            .ok_or_else(|| {
                let known = TypeLabel::ALL.map(|label| label.as_str()).join(", ");
                format!("Unknown type label '{value}'. Supported labels: {known}")
            })
    }
}

impl Serialize for TypeLabel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TypeLabel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// The `data_type` field of a report row.
///
/// Profiled columns always carry a [`TypeLabel`]. Rows produced from a metric
/// definition sheet keep the declared type verbatim when it is not one of the
/// known labels (`varchar`, `datetime`, `category_string`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    Label(TypeLabel),
    Declared(String),
}

impl DataType {
    pub fn parse(raw: &str) -> Self {
        raw.parse::<TypeLabel>()
            .map_or_else(|_| DataType::Declared(raw.to_string()), DataType::Label)
    }

    pub fn as_str(&self) -> &str {
        match self {
            DataType::Label(label) => label.as_str(),
            DataType::Declared(raw) => raw.as_str(),
        }
    }
}

impl From<TypeLabel> for DataType {
    fn from(label: TypeLabel) -> Self {
        DataType::Label(label)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DataType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DataType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(DataType::parse(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_their_names() {
        for label in TypeLabel::ALL {
            assert_eq!(label.as_str().parse::<TypeLabel>().unwrap(), label);
        }
    }

    #[test]
    fn unknown_label_lists_supported_names() {
        let err = "list[int]".parse::<TypeLabel>().unwrap_err();
        assert!(err.contains("category_list[int]"));
    }

    #[test]
    fn declared_types_are_kept_verbatim() {
        assert_eq!(DataType::parse("category_int"), DataType::Label(TypeLabel::CategoryInt));
        assert_eq!(
            DataType::parse("varchar"),
            DataType::Declared("varchar".to_string())
        );
        let json = serde_json::to_string(&DataType::parse("list[float]")).unwrap();
        assert_eq!(json, "\"list[float]\"");
    }
}
