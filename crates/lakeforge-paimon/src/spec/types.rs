// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::de::Error as _;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const NOT_NULL_SUFFIX: &str = " NOT NULL";

/// Primitive logical types supported by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Boolean,
    Int,
    BigInt,
    Double,
    String,
    /// Days since the Unix epoch.
    Date,
}

impl PrimitiveType {
    pub const fn as_str(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "BOOLEAN",
            PrimitiveType::Int => "INT",
            PrimitiveType::BigInt => "BIGINT",
            PrimitiveType::Double => "DOUBLE",
            PrimitiveType::String => "STRING",
            PrimitiveType::Date => "DATE",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        match name {
            "BOOLEAN" => Some(PrimitiveType::Boolean),
            "INT" | "INTEGER" => Some(PrimitiveType::Int),
            "BIGINT" => Some(PrimitiveType::BigInt),
            "DOUBLE" => Some(PrimitiveType::Double),
            "STRING" => Some(PrimitiveType::String),
            "DATE" => Some(PrimitiveType::Date),
            _ => None,
        }
    }
}

/// A logical column type together with its nullability.
///
/// The JSON form follows the Paimon schema file: primitive types are plain
/// strings (`"INT"`, `"STRING NOT NULL"`), nested types are objects whose
/// `type` member carries the type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    Primitive {
        primitive: PrimitiveType,
        nullable: bool,
    },
    Array {
        element: Box<DataType>,
        nullable: bool,
    },
    Map {
        key: Box<DataType>,
        value: Box<DataType>,
        nullable: bool,
    },
    Row {
        fields: Vec<DataField>,
        nullable: bool,
    },
}

impl DataType {
    pub fn primitive(primitive: PrimitiveType) -> Self {
        DataType::Primitive {
            primitive,
            nullable: true,
        }
    }

    pub fn boolean() -> Self {
        Self::primitive(PrimitiveType::Boolean)
    }

    pub fn int() -> Self {
        Self::primitive(PrimitiveType::Int)
    }

    pub fn bigint() -> Self {
        Self::primitive(PrimitiveType::BigInt)
    }

    pub fn double() -> Self {
        Self::primitive(PrimitiveType::Double)
    }

    pub fn string() -> Self {
        Self::primitive(PrimitiveType::String)
    }

    pub fn date() -> Self {
        Self::primitive(PrimitiveType::Date)
    }

    pub fn array(element: DataType) -> Self {
        DataType::Array {
            element: Box::new(element),
            nullable: true,
        }
    }

    pub fn map(key: DataType, value: DataType) -> Self {
        DataType::Map {
            key: Box::new(key),
            value: Box::new(value),
            nullable: true,
        }
    }

    pub fn row(fields: Vec<DataField>) -> Self {
        DataType::Row {
            fields,
            nullable: true,
        }
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            DataType::Primitive { nullable, .. }
            | DataType::Array { nullable, .. }
            | DataType::Map { nullable, .. }
            | DataType::Row { nullable, .. } => *nullable,
        }
    }

    pub fn with_nullable(mut self, value: bool) -> Self {
        match &mut self {
            DataType::Primitive { nullable, .. }
            | DataType::Array { nullable, .. }
            | DataType::Map { nullable, .. }
            | DataType::Row { nullable, .. } => *nullable = value,
        }
        self
    }

    pub fn not_null(self) -> Self {
        self.with_nullable(false)
    }

    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            DataType::Primitive { primitive, .. } => Some(*primitive),
            _ => None,
        }
    }

    /// The type name as written in the `type` member, including the
    /// nullability suffix.
    pub fn type_name(&self) -> String {
        let base = match self {
            DataType::Primitive { primitive, .. } => primitive.as_str(),
            DataType::Array { .. } => "ARRAY",
            DataType::Map { .. } => "MAP",
            DataType::Row { .. } => "ROW",
        };
        if self.is_nullable() {
            base.to_string()
        } else {
            format!("{base}{NOT_NULL_SUFFIX}")
        }
    }

    /// Visits the ids of all fields nested in this type.
    pub(crate) fn nested_field_ids(&self, ids: &mut Vec<i32>) {
        match self {
            DataType::Primitive { .. } => {}
            DataType::Array { element, .. } => element.nested_field_ids(ids),
            DataType::Map { key, value, .. } => {
                key.nested_field_ids(ids);
                value.nested_field_ids(ids);
            }
            DataType::Row { fields, .. } => {
                for field in fields {
                    ids.push(field.id);
                    field.data_type.nested_field_ids(ids);
                }
            }
        }
    }
}

impl Serialize for DataType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            DataType::Primitive { .. } => serializer.serialize_str(&self.type_name()),
            DataType::Array { element, .. } => {
                let mut s = serializer.serialize_struct("ArrayType", 2)?;
                s.serialize_field("type", &self.type_name())?;
                s.serialize_field("element", element)?;
                s.end()
            }
            DataType::Map { key, value, .. } => {
                let mut s = serializer.serialize_struct("MapType", 3)?;
                s.serialize_field("type", &self.type_name())?;
                s.serialize_field("key", key)?;
                s.serialize_field("value", value)?;
                s.end()
            }
            DataType::Row { fields, .. } => {
                let mut s = serializer.serialize_struct("RowType", 2)?;
                s.serialize_field("type", &self.type_name())?;
                s.serialize_field("fields", fields)?;
                s.end()
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DataTypeRepr {
    Name(String),
    Nested {
        #[serde(rename = "type")]
        type_name: String,
        #[serde(default)]
        element: Option<Box<DataType>>,
        #[serde(default)]
        key: Option<Box<DataType>>,
        #[serde(default)]
        value: Option<Box<DataType>>,
        #[serde(default)]
        fields: Option<Vec<DataField>>,
    },
}

fn split_nullability(name: &str) -> (&str, bool) {
    match name.trim().strip_suffix(NOT_NULL_SUFFIX) {
        Some(base) => (base.trim(), false),
        None => (name.trim(), true),
    }
}

impl<'de> Deserialize<'de> for DataType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match DataTypeRepr::deserialize(deserializer)? {
            DataTypeRepr::Name(name) => {
                let (base, nullable) = split_nullability(&name);
                let primitive = PrimitiveType::parse(base)
                    .ok_or_else(|| D::Error::custom(format!("unsupported type: {name}")))?;
                Ok(DataType::Primitive {
                    primitive,
                    nullable,
                })
            }
            DataTypeRepr::Nested {
                type_name,
                element,
                key,
                value,
                fields,
            } => {
                let (base, nullable) = split_nullability(&type_name);
                match (base, element, key, value, fields) {
                    ("ARRAY", Some(element), None, None, None) => {
                        Ok(DataType::Array { element, nullable })
                    }
                    ("MAP", None, Some(key), Some(value), None) => Ok(DataType::Map {
                        key,
                        value,
                        nullable,
                    }),
                    ("ROW", None, None, None, Some(fields)) => {
                        Ok(DataType::Row { fields, nullable })
                    }
                    _ => Err(D::Error::custom(format!(
                        "malformed nested type: {type_name}"
                    ))),
                }
            }
        }
    }
}

/// A named column with a table-unique field id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataField {
    pub id: i32,
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl DataField {
    pub fn new(id: i32, name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            id,
            name: name.into(),
            data_type,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
