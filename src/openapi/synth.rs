use super::types::{
    Document, Info, MediaType, Operation, Parameter, ParameterLocation, Response, Schema,
    SchemaType,
};
use crate::annotation::is_controller;
use crate::binder::BindingKind;
use crate::compiler::{plan_controller, MethodPlan};
use crate::error::DocumentError;
use crate::model::{MetadataModel, NamedType, ParamDescriptor, RecordDescriptor, TypeKey, TypeRef};
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Namespace of schemas the synthesizer emits on its own behalf.
pub const SYNTHETIC_NAMESPACE: &str = "metaroute";

/// Identifier of the shared error schema.
pub const ERROR_SCHEMA: &str = "Error";

const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Builds an OpenAPI [`Document`] from controller metadata.
///
/// Named types are deduplicated through an explicit table from structural
/// identity (`namespace`, `identifier`) to the short id under which the
/// schema is stored in `components.schemas`. The first occurrence of a type
/// allocates a short id and emits the schema; every later occurrence is a
/// `$ref`. Short ids are the bare identifier, numerically suffixed on
/// collision (`Sms`, `Sms2`, `Sms3`, ...).
#[derive(Debug)]
pub struct SchemaSynthesizer<'m> {
    model: &'m MetadataModel,
    document: Document,
    known: HashMap<TypeKey, String>,
    content_type: String,
}

impl<'m> SchemaSynthesizer<'m> {
    pub fn new(model: &'m MetadataModel, info: Info) -> Self {
        Self::extend(model, Document::new(info))
    }

    /// Continue an existing document. Component schemas carrying an origin
    /// seed the dedup table.
    pub fn extend(model: &'m MetadataModel, document: Document) -> Self {
        let known = document
            .components
            .schemas
            .iter()
            .filter_map(|(short, schema)| Some((schema.origin.clone()?, short.clone())))
            .collect();
        Self {
            model,
            document,
            known,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }

    /// Content type declared for success and error bodies.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    #[must_use]
    pub fn finish(self) -> Document {
        self.document
    }

    /// Document every exposed method of a controller record.
    pub fn add_controller(&mut self, record: &RecordDescriptor) -> Result<(), DocumentError> {
        for plan in plan_controller(record)? {
            self.add_plan(&plan)?;
        }
        Ok(())
    }

    /// Document one planned method under each of its routes.
    pub fn add_plan(&mut self, plan: &MethodPlan<'_>) -> Result<(), DocumentError> {
        let operation = self.operation(plan)?;
        for route in &plan.routes {
            let path = route.oas_path();
            let item = self.document.paths.entry(path.clone()).or_default();
            if item.set_operation(&route.verb, operation.clone()).is_some() {
                warn!(
                    method = %route.verb,
                    path = %path,
                    handler = %plan.id,
                    "Replaced documented operation"
                );
            }
            debug!(method = %route.verb, path = %path, "Documented operation");
        }
        Ok(())
    }

    fn operation(&mut self, plan: &MethodPlan<'_>) -> Result<Operation, DocumentError> {
        let method = plan.descriptor;
        let mut op = Operation {
            tags: plan.routes.first().and_then(|r| r.group_tag.clone()).into_iter().collect(),
            summary: summary(&method.doc),
            description: non_empty(method.doc.trim()),
            operation_id: Some(format!("{}.{}", plan.record.identifier, method.name)),
            ..Default::default()
        };

        for binding in plan.bindings.iter() {
            let (location, required) = match binding.kind {
                BindingKind::Path => (ParameterLocation::Path, true),
                BindingKind::Query => (ParameterLocation::Query, false),
                BindingKind::Header => (ParameterLocation::Header, false),
                _ => continue,
            };
            let Some(param) = method.params.get(binding.index) else {
                continue;
            };
            op.parameters.push(Parameter {
                name: binding.alias.clone(),
                location,
                description: self.param_doc(param),
                required,
                schema: self.schema_for(&param.type_ref)?,
            });
        }

        let success = match method.returns.iter().find(|r| !r.type_ref.is_error()) {
            Some(ret) => {
                let schema = self.schema_for(&ret.type_ref)?;
                Response {
                    description: self.param_doc(ret).unwrap_or_else(|| "OK".to_string()),
                    content: self.content(schema),
                }
            }
            None => Response {
                description: "OK".to_string(),
                content: BTreeMap::new(),
            },
        };
        op.responses.insert("200".to_string(), success);

        let error = self.error_schema();
        op.responses.insert(
            "400".to_string(),
            Response {
                description: "Bad Request".to_string(),
                content: self.content(error.clone()),
            },
        );
        op.responses.insert(
            "500".to_string(),
            Response {
                description: "Internal Server Error".to_string(),
                content: self.content(error),
            },
        );
        Ok(op)
    }

    fn content(&self, schema: Schema) -> BTreeMap<String, MediaType> {
        BTreeMap::from([(self.content_type.clone(), MediaType { schema })])
    }

    /// Doc text of the parameter's record type (or array item record),
    /// otherwise the parameter's own doc text.
    fn param_doc(&self, param: &ParamDescriptor) -> Option<String> {
        let ty = param.type_ref.item().unwrap_or(&param.type_ref);
        let doc = match self.model.find_record(ty) {
            Some(record) if !ty.is_builtin() => record.doc.as_str(),
            _ => param.doc.as_str(),
        };
        non_empty(doc.trim())
    }

    /// Schema for a type reference. Named types come back as `$ref`s.
    pub fn schema_for(&mut self, ty: &TypeRef) -> Result<Schema, DocumentError> {
        if ty.is_builtin() {
            return self.builtin_schema(ty);
        }

        let key = ty.key();
        if let Some(short) = self.known.get(&key) {
            return Ok(Schema::reference(short));
        }

        let model = self.model;
        let named = model
            .resolve(ty)
            .ok_or_else(|| DocumentError::UnresolvableType(ty.to_string()))?;

        // reserve before recursing so self references resolve to this entry
        let short = self.reserve(key.clone());
        let mut schema = match named {
            NamedType::Record(record) => {
                let mut properties = IndexMap::with_capacity(record.fields.len());
                for field in &record.fields {
                    let mut prop = self.schema_for(&field.type_ref)?;
                    if let Some(doc) = non_empty(field.doc.trim()) {
                        prop.description = Some(doc);
                    }
                    properties.insert(field.name.clone(), prop);
                }
                Schema {
                    description: non_empty(record.doc.trim()),
                    properties,
                    ..Schema::typed(SchemaType::Object)
                }
            }
            NamedType::Alias(alias) => {
                let mut schema = self.schema_for(&alias.underlying)?;
                if let Some(doc) = non_empty(alias.doc.trim()) {
                    schema.description = Some(doc);
                }
                schema
            }
        };
        schema.origin = Some(key);
        debug!(short_id = %short, type_ref = %ty, "Emitted component schema");
        self.document.components.schemas.insert(short.clone(), schema);
        Ok(Schema::reference(&short))
    }

    fn builtin_schema(&mut self, ty: &TypeRef) -> Result<Schema, DocumentError> {
        let schema = match ty.identifier.as_str() {
            "int" | "int32" => Schema::formatted(SchemaType::Integer, "int32"),
            "int64" => Schema::formatted(SchemaType::Integer, "int64"),
            "float32" => Schema::formatted(SchemaType::Number, "float"),
            "float64" => Schema::formatted(SchemaType::Number, "double"),
            "string" => Schema::typed(SchemaType::String),
            "byte" => Schema::formatted(SchemaType::String, "byte"),
            "bool" => Schema::typed(SchemaType::Boolean),
            _ if ty.is_array() => {
                let item = ty
                    .item()
                    .ok_or_else(|| DocumentError::UnresolvableType(ty.to_string()))?;
                Schema::array_of(self.schema_for(item)?)
            }
            _ => return Err(DocumentError::UnresolvableType(ty.to_string())),
        };
        Ok(schema)
    }

    /// `$ref` to the shared error schema, emitting it on first use.
    pub fn error_schema(&mut self) -> Schema {
        let key = TypeKey::new(SYNTHETIC_NAMESPACE, ERROR_SCHEMA);
        if let Some(short) = self.known.get(&key) {
            return Schema::reference(short);
        }

        let short = self.reserve(key.clone());
        let string = || Schema::typed(SchemaType::String);
        let properties = IndexMap::from([
            ("id".to_string(), described(string(), "unique error class")),
            ("message".to_string(), described(string(), "technical message")),
            (
                "localizedMessage".to_string(),
                described(string(), "message suitable for end users"),
            ),
            ("type".to_string(), described(string(), "technical error type")),
            (
                "details".to_string(),
                described(Schema::typed(SchemaType::Object), "error specific payload"),
            ),
            (
                "causedBy".to_string(),
                described(Schema::reference(&short), "the wrapped cause"),
            ),
        ]);
        let schema = Schema {
            description: Some("A (nested) server error".to_string()),
            properties,
            required: vec!["id".to_string(), "message".to_string()],
            origin: Some(key),
            ..Schema::typed(SchemaType::Object)
        };
        self.document.components.schemas.insert(short.clone(), schema);
        Schema::reference(&short)
    }

    fn reserve(&mut self, key: TypeKey) -> String {
        let short = self.unique_short_id(&key.identifier);
        self.document
            .components
            .schemas
            .insert(short.clone(), Schema::default());
        self.known.insert(key, short.clone());
        short
    }

    fn unique_short_id(&self, identifier: &str) -> String {
        let schemas = &self.document.components.schemas;
        if !schemas.contains_key(identifier) {
            return identifier.to_string();
        }
        (2..)
            .map(|i| format!("{identifier}{i}"))
            .find(|candidate| !schemas.contains_key(candidate))
            .unwrap_or_else(|| identifier.to_string())
    }
}

fn described(mut schema: Schema, description: &str) -> Schema {
    schema.description = Some(description.to_string());
    schema
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// First sentence of the first line of a doc text.
fn summary(doc: &str) -> Option<String> {
    let line = doc.trim().lines().next()?.trim();
    let end = line
        .char_indices()
        .find(|&(i, c)| c == '.' && line[i + 1..].starts_with(char::is_whitespace))
        .map_or(line.len(), |(i, _)| i + 1);
    non_empty(&line[..end])
}

/// Document every controller (stereotype-annotated record) of `model`.
pub fn build_document(model: &MetadataModel, info: Info) -> Result<Document, DocumentError> {
    let mut synth = SchemaSynthesizer::new(model, info);
    for record in model.records.iter().filter(|r| is_controller(r)) {
        synth.add_controller(record)?;
    }
    Ok(synth.finish())
}
