use super::*;
use crate::annotation::{
    ANNOTATION_HEADER_PARAM, ANNOTATION_METHOD, ANNOTATION_QUERY_PARAM, ANNOTATION_ROUTE,
    ANNOTATION_STEREOTYPE_CONTROLLER,
};
use crate::error::{CompileErrorKind, DocumentError};
use crate::model::{
    AliasDescriptor, Annotation, MetadataModel, MethodDescriptor, ParamDescriptor,
    RecordDescriptor, TypeKey, TypeRef, CONTEXT_TYPE,
};
use http::Method;

fn record(namespace: &str, identifier: &str, fields: Vec<ParamDescriptor>) -> RecordDescriptor {
    RecordDescriptor {
        namespace: namespace.into(),
        identifier: identifier.into(),
        doc: format!("{identifier} record."),
        fields,
        ..Default::default()
    }
}

fn sms_model() -> MetadataModel {
    let sms = record(
        "example.com/sms",
        "Sms",
        vec![
            ParamDescriptor::new("id", TypeRef::builtin("string")).with_doc("unique id"),
            ParamDescriptor::new("text", TypeRef::builtin("string")),
            ParamDescriptor::new("read", TypeRef::builtin("bool")),
        ],
    );
    let controller = RecordDescriptor {
        namespace: "example.com/sms".into(),
        identifier: "SmsController".into(),
        annotations: vec![
            Annotation::new(ANNOTATION_STEREOTYPE_CONTROLLER).with_value("sms"),
            Annotation::new(ANNOTATION_ROUTE).with_value("/api/v1/sms"),
        ],
        methods: vec![
            MethodDescriptor {
                name: "Get".into(),
                doc: "Get loads one sms. Unknown ids fail.".into(),
                params: vec![
                    ParamDescriptor::new("ctx", TypeRef::new(CONTEXT_TYPE.0, CONTEXT_TYPE.1)),
                    ParamDescriptor::new("id", TypeRef::builtin("string")).with_doc("the sms id"),
                    ParamDescriptor::new("lang", TypeRef::builtin("string")),
                ],
                returns: vec![
                    ParamDescriptor::new("", TypeRef::new("example.com/sms", "Sms")),
                    ParamDescriptor::new("", TypeRef::builtin("error")),
                ],
                annotations: vec![
                    Annotation::new(ANNOTATION_METHOD).with_value("GET"),
                    Annotation::new(ANNOTATION_ROUTE).with_value("/:id"),
                    Annotation::new(ANNOTATION_HEADER_PARAM)
                        .with_value("lang")
                        .with_attribute("alias", "accept-language"),
                ],
            },
            MethodDescriptor {
                name: "Delete".into(),
                params: vec![ParamDescriptor::new("id", TypeRef::builtin("string"))],
                returns: vec![ParamDescriptor::new("", TypeRef::builtin("error"))],
                annotations: vec![
                    Annotation::new(ANNOTATION_METHOD).with_value("DELETE"),
                    Annotation::new(ANNOTATION_ROUTE).with_value("/:id"),
                ],
                ..Default::default()
            },
            MethodDescriptor {
                name: "List".into(),
                params: vec![ParamDescriptor::new("limit", TypeRef::builtin("int64"))],
                returns: vec![ParamDescriptor::new(
                    "",
                    TypeRef::array_of(TypeRef::new("example.com/sms", "Sms")),
                )],
                annotations: vec![
                    Annotation::new(ANNOTATION_METHOD).with_value("GET"),
                    Annotation::new(ANNOTATION_QUERY_PARAM).with_value("limit"),
                ],
                ..Default::default()
            },
        ],
        ..Default::default()
    };
    MetadataModel {
        records: vec![controller, sms],
        aliases: vec![],
    }
}

fn build() -> Document {
    build_document(&sms_model(), Info::new("SMS", "1.0.0")).unwrap()
}

#[test]
fn test_operation_shape() {
    let doc = build();
    let get = doc.paths["/api/v1/sms/{id}"].operation(&Method::GET).unwrap();

    assert_eq!(get.tags, vec!["sms"]);
    assert_eq!(get.summary.as_deref(), Some("Get loads one sms."));
    assert_eq!(get.description.as_deref(), Some("Get loads one sms. Unknown ids fail."));

    assert_eq!(get.parameters.len(), 2);
    let id = &get.parameters[0];
    assert_eq!(id.name, "id");
    assert_eq!(id.location, ParameterLocation::Path);
    assert!(id.required);
    assert_eq!(id.description.as_deref(), Some("the sms id"));
    let lang = &get.parameters[1];
    assert_eq!(lang.name, "accept-language");
    assert_eq!(lang.location, ParameterLocation::Header);
    assert!(!lang.required);

    let ok = &get.responses["200"];
    assert_eq!(ok.description, "Sms record.");
    assert_eq!(
        ok.content["application/json"].schema.ref_name(),
        Some("Sms")
    );
    for status in ["400", "500"] {
        assert_eq!(
            get.responses[status].content["application/json"].schema.ref_name(),
            Some(ERROR_SCHEMA)
        );
    }
}

#[test]
fn test_operations_on_one_path_are_merged() {
    let doc = build();
    let item = &doc.paths["/api/v1/sms/{id}"];
    assert!(item.get.is_some());
    assert!(item.delete.is_some());

    let delete = item.delete.as_ref().unwrap();
    assert_eq!(delete.responses["200"].description, "OK");
    assert!(delete.responses["200"].content.is_empty());
}

#[test]
fn test_named_types_are_emitted_once() {
    let doc = build();
    let list = doc.paths["/api/v1/sms"].get.as_ref().unwrap();
    let schema = &list.responses["200"].content["application/json"].schema;
    assert_eq!(schema.schema_type, Some(SchemaType::Array));
    assert_eq!(schema.items.as_ref().unwrap().ref_name(), Some("Sms"));
    assert_eq!(list.parameters[0].schema.format.as_deref(), Some("int64"));

    let names: Vec<&str> = doc.components.schemas.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["Error", "Sms"]);

    let sms = &doc.components.schemas["Sms"];
    assert_eq!(sms.schema_type, Some(SchemaType::Object));
    let fields: Vec<&str> = sms.properties.keys().map(String::as_str).collect();
    assert_eq!(fields, vec!["id", "text", "read"]);
    assert_eq!(sms.properties["id"].description.as_deref(), Some("unique id"));
    assert_eq!(sms.properties["read"].schema_type, Some(SchemaType::Boolean));
}

#[test]
fn test_second_lookup_is_a_reference() {
    let model = sms_model();
    let mut synth = SchemaSynthesizer::new(&model, Info::new("t", "1"));
    let sms = TypeRef::new("example.com/sms", "Sms");

    let first = synth.schema_for(&sms).unwrap();
    let second = synth.schema_for(&sms).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.ref_name(), Some("Sms"));
    assert_eq!(synth.document().components.schemas.len(), 1);
}

#[test]
fn test_name_collision_gets_numeric_suffix() {
    let model = MetadataModel {
        records: vec![
            record("example.com/sms", "Message", vec![]),
            record("example.com/mail", "Message", vec![]),
            record("example.com/chat", "Message", vec![]),
        ],
        aliases: vec![],
    };
    let mut synth = SchemaSynthesizer::new(&model, Info::new("t", "1"));
    let ids: Vec<String> = ["example.com/sms", "example.com/mail", "example.com/chat"]
        .iter()
        .map(|ns| {
            synth
                .schema_for(&TypeRef::new(*ns, "Message"))
                .unwrap()
                .ref_name()
                .unwrap()
                .to_string()
        })
        .collect();
    assert_eq!(ids, vec!["Message", "Message2", "Message3"]);

    let again = synth.schema_for(&TypeRef::new("example.com/mail", "Message")).unwrap();
    assert_eq!(again.ref_name(), Some("Message2"));
    assert_eq!(synth.document().components.schemas.len(), 3);
}

#[test]
fn test_recursive_record_refers_to_itself() {
    let node = record(
        "example.com/tree",
        "Node",
        vec![
            ParamDescriptor::new("value", TypeRef::builtin("int")),
            ParamDescriptor::new(
                "children",
                TypeRef::array_of(TypeRef::new("example.com/tree", "Node")),
            ),
        ],
    );
    let model = MetadataModel {
        records: vec![node],
        aliases: vec![],
    };
    let mut synth = SchemaSynthesizer::new(&model, Info::new("t", "1"));
    synth.schema_for(&TypeRef::new("example.com/tree", "Node")).unwrap();

    let doc = synth.finish();
    let children = &doc.components.schemas["Node"].properties["children"];
    assert_eq!(children.items.as_ref().unwrap().ref_name(), Some("Node"));
    assert_eq!(doc.components.schemas.len(), 1);
}

#[test]
fn test_alias_emits_underlying_schema() {
    let model = MetadataModel {
        records: vec![],
        aliases: vec![AliasDescriptor {
            namespace: "example.com/weather".into(),
            identifier: "Celsius".into(),
            doc: "Temperature in degree Celsius.".into(),
            underlying: TypeRef::builtin("float64"),
        }],
    };
    let mut synth = SchemaSynthesizer::new(&model, Info::new("t", "1"));
    let schema = synth
        .schema_for(&TypeRef::new("example.com/weather", "Celsius"))
        .unwrap();
    let doc = synth.finish();
    let celsius = doc.resolve_ref(schema.reference.as_deref().unwrap()).unwrap();
    assert_eq!(celsius.schema_type, Some(SchemaType::Number));
    assert_eq!(celsius.format.as_deref(), Some("double"));
    assert_eq!(celsius.description.as_deref(), Some("Temperature in degree Celsius."));
}

#[test]
fn test_unresolvable_type_is_fatal() {
    let model = MetadataModel::default();
    let mut synth = SchemaSynthesizer::new(&model, Info::new("t", "1"));
    assert_eq!(
        synth.schema_for(&TypeRef::new("example.com/x", "Missing")).unwrap_err(),
        DocumentError::UnresolvableType("example.com/x#Missing".into())
    );
    assert!(matches!(
        synth.schema_for(&TypeRef::builtin("complex128")),
        Err(DocumentError::UnresolvableType(_))
    ));
}

#[test]
fn test_error_schema_is_shared_and_self_referential() {
    let model = MetadataModel::default();
    let mut synth = SchemaSynthesizer::new(&model, Info::new("t", "1"));
    let a = synth.error_schema();
    let b = synth.error_schema();
    assert_eq!(a, b);

    let doc = synth.finish();
    let error = &doc.components.schemas[ERROR_SCHEMA];
    let fields: Vec<&str> = error.properties.keys().map(String::as_str).collect();
    assert_eq!(
        fields,
        vec!["id", "message", "localizedMessage", "type", "details", "causedBy"]
    );
    assert_eq!(error.properties["causedBy"].ref_name(), Some(ERROR_SCHEMA));
}

#[test]
fn test_user_type_named_error_does_not_clash() {
    let model = MetadataModel {
        records: vec![record("example.com/sms", "Error", vec![])],
        aliases: vec![],
    };
    let mut synth = SchemaSynthesizer::new(&model, Info::new("t", "1"));
    let shared = synth.error_schema();
    let user = synth.schema_for(&TypeRef::new("example.com/sms", "Error")).unwrap();
    assert_eq!(shared.ref_name(), Some("Error"));
    assert_eq!(user.ref_name(), Some("Error2"));
}

#[test]
fn test_extend_reuses_existing_components() {
    let model = sms_model();
    let mut first = SchemaSynthesizer::new(&model, Info::new("t", "1"));
    first.schema_for(&TypeRef::new("example.com/sms", "Sms")).unwrap();

    let mut second = SchemaSynthesizer::extend(&model, first.finish());
    let again = second.schema_for(&TypeRef::new("example.com/sms", "Sms")).unwrap();
    assert_eq!(again.ref_name(), Some("Sms"));
    assert_eq!(second.document().components.schemas.len(), 1);
}

#[test]
fn test_compile_errors_surface() {
    let mut model = sms_model();
    model.records[0].methods[0]
        .annotations
        .push(Annotation::new(ANNOTATION_QUERY_PARAM).with_value("nope"));
    match build_document(&model, Info::new("t", "1")).unwrap_err() {
        DocumentError::Compile(err) => {
            assert_eq!(err.kind, CompileErrorKind::UnknownQueryParam("nope".into()));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_serialized_shape() {
    let doc = build();
    let value: serde_json::Value = serde_json::from_str(&doc.to_json_pretty().unwrap()).unwrap();
    assert_eq!(value["openapi"], OPENAPI_VERSION);
    assert_eq!(
        value["paths"]["/api/v1/sms/{id}"]["get"]["parameters"][0]["in"],
        "path"
    );
    assert_eq!(
        value["components"]["schemas"]["Error"]["properties"]["causedBy"]["$ref"],
        "#/components/schemas/Error"
    );
    assert!(value["components"]["schemas"]["Sms"].get("origin").is_none());
    assert_eq!(value["components"]["schemas"]["Sms"]["x-type"], "example.com/sms#Sms");
    assert_eq!(value["components"]["schemas"]["Error"]["x-type"], "metaroute#Error");
    assert!(value["components"]["schemas"]["Sms"]["properties"]["id"]
        .get("x-type")
        .is_none());
    assert!(doc.to_yaml().unwrap().contains("/api/v1/sms/{id}"));
}

#[test]
fn test_malformed_type_tag_is_rejected() {
    let err = serde_json::from_str::<Schema>(r#"{"type": "object", "x-type": "Sms"}"#).unwrap_err();
    assert!(err.to_string().contains("namespace#Identifier"), "{err}");

    let schema: Schema = serde_json::from_str(r#"{"x-type": "example.com/sms#Sms"}"#).unwrap();
    assert_eq!(schema.origin, Some(TypeKey::new("example.com/sms", "Sms")));
}
