use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Namespace + identifier of the request-scoped context type.
pub const CONTEXT_TYPE: (&str, &str) = ("context", "Context");
/// Namespace + identifier of the raw transport request type.
pub const RAW_REQUEST_TYPE: (&str, &str) = ("http", "Request");
/// Namespace + identifier of the raw response sink type.
pub const RESPONSE_SINK_TYPE: (&str, &str) = ("http", "ResponseWriter");
/// Builtin identifier of the error contract in return position.
pub const ERROR_TYPE: &str = "error";
/// Builtin identifier for array-of-T type references.
pub const ARRAY_TYPE: &str = "[]";

/// Structural identity of a named type: `(namespace, identifier)`.
///
/// Two [`TypeRef`]s with the same key describe the same named type and share
/// one entry in the document's component table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeKey {
    pub namespace: String,
    pub identifier: String,
}

impl TypeKey {
    pub fn new(namespace: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            identifier: identifier.into(),
        }
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.namespace, self.identifier)
    }
}

/// Structural type descriptor as produced by the introspection step.
///
/// Builtin types have an empty namespace (`int`, `string`, `error`, ...).
/// Arrays use the identifier `[]` with the element type as the single
/// nested parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<TypeRef>,
}

impl TypeRef {
    pub fn new(namespace: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            identifier: identifier.into(),
            params: Vec::new(),
        }
    }

    pub fn builtin(identifier: impl Into<String>) -> Self {
        Self::new(String::new(), identifier)
    }

    pub fn array_of(item: TypeRef) -> Self {
        Self {
            namespace: String::new(),
            identifier: ARRAY_TYPE.to_string(),
            params: vec![item],
        }
    }

    #[inline]
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        self.namespace.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn is(&self, (namespace, identifier): (&str, &str)) -> bool {
        self.namespace == namespace && self.identifier == identifier
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        self.is_builtin() && self.identifier == ARRAY_TYPE
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.is_builtin() && self.identifier == ERROR_TYPE
    }

    /// Element type of an array reference.
    #[must_use]
    pub fn item(&self) -> Option<&TypeRef> {
        if self.is_array() {
            self.params.first()
        } else {
            None
        }
    }

    #[must_use]
    pub fn key(&self) -> TypeKey {
        TypeKey::new(self.namespace.clone(), self.identifier.clone())
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(item) = self.item() {
            return write!(f, "[]{item}");
        }
        if self.is_builtin() {
            f.write_str(&self.identifier)
        } else {
            write!(f, "{}#{}", self.namespace, self.identifier)
        }
    }
}

/// A named, attribute-carrying tag on a record or method.
///
/// Attributes keep their declaration order. The distinguished `value`
/// attribute is what most of the vocabulary reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, Value>,
}

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_value(self, value: impl Into<String>) -> Self {
        self.with_attribute("value", value)
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .insert(key.into(), Value::String(value.into()));
        self
    }

    /// Attribute rendered as a string. Scalars are stringified; missing,
    /// null and structured attributes read as `None`.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<String> {
        match self.attributes.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// The distinguished `value` attribute, empty if absent.
    #[must_use]
    pub fn value(&self) -> String {
        self.attribute("value").unwrap_or_default()
    }
}

/// Name, type and doc text of a parameter, return value or record field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub doc: String,
}

pub type ReturnDescriptor = ParamDescriptor;
pub type FieldDescriptor = ParamDescriptor;

impl ParamDescriptor {
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            doc: String::new(),
        }
    }

    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(default)]
    pub params: Vec<ParamDescriptor>,
    #[serde(default)]
    pub returns: Vec<ReturnDescriptor>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub doc: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl MethodDescriptor {
    pub fn find_annotations<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Annotation> {
        self.annotations.iter().filter(move |a| a.name == name)
    }
}

/// A struct-like type: its fields, its methods and its annotations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordDescriptor {
    pub namespace: String,
    pub identifier: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub doc: String,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl RecordDescriptor {
    #[must_use]
    pub fn key(&self) -> TypeKey {
        TypeKey::new(self.namespace.clone(), self.identifier.clone())
    }

    pub fn find_annotations<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Annotation> {
        self.annotations.iter().filter(move |a| a.name == name)
    }

    #[must_use]
    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// A named alias of another type (e.g. `type Celsius float64`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AliasDescriptor {
    pub namespace: String,
    pub identifier: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub doc: String,
    pub underlying: TypeRef,
}

/// What a named [`TypeRef`] resolves to.
#[derive(Debug, Clone, Copy)]
pub enum NamedType<'a> {
    Record(&'a RecordDescriptor),
    Alias(&'a AliasDescriptor),
}

/// The full metadata model handed over by the introspection step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataModel {
    #[serde(default)]
    pub records: Vec<RecordDescriptor>,
    #[serde(default)]
    pub aliases: Vec<AliasDescriptor>,
}

impl MetadataModel {
    #[must_use]
    pub fn find_record(&self, ty: &TypeRef) -> Option<&RecordDescriptor> {
        self.records
            .iter()
            .find(|r| r.namespace == ty.namespace && r.identifier == ty.identifier)
    }

    #[must_use]
    pub fn find_alias(&self, ty: &TypeRef) -> Option<&AliasDescriptor> {
        self.aliases
            .iter()
            .find(|a| a.namespace == ty.namespace && a.identifier == ty.identifier)
    }

    /// Resolve a non-builtin reference to its record or alias.
    #[must_use]
    pub fn resolve(&self, ty: &TypeRef) -> Option<NamedType<'_>> {
        if ty.is_builtin() {
            return None;
        }
        self.find_record(ty)
            .map(NamedType::Record)
            .or_else(|| self.find_alias(ty).map(NamedType::Alias))
    }
}

/// Stable identifier of a controller method, used to look up its adapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId {
    pub record: TypeKey,
    pub method: String,
}

impl MethodId {
    pub fn new(
        namespace: impl Into<String>,
        record: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            record: TypeKey::new(namespace, record),
            method: method.into(),
        }
    }

    #[must_use]
    pub fn of(record: &RecordDescriptor, method: &MethodDescriptor) -> Self {
        Self {
            record: record.key(),
            method: method.name.clone(),
        }
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.record, self.method)
    }
}
