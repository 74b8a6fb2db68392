#![allow(dead_code)]

use metaroute::coerce::FromParam;
use metaroute::invoke::{AdapterRegistry, Outcome};
use metaroute::model::{model_from_yaml, MetadataModel, MethodId, TypeKey};
use metaroute::server::JsonEncoder;
use metaroute::{compile_model, ErrorContract, RequestContext, RouteConfig, Router};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

pub const NAMESPACE: &str = "example.com/sms";
pub const CONTROLLER: &str = "SmsController";

/// A small SMS service as the introspection step would describe it.
pub const SMS_MODEL: &str = r#"
records:
  - namespace: example.com/sms
    identifier: Sms
    doc: A short message.
    fields:
      - { name: id, type: { identifier: string }, doc: unique message id }
      - { name: text, type: { identifier: string } }
      - { name: read, type: { identifier: bool } }

  - namespace: example.com/sms
    identifier: SmsController
    doc: Manages short messages.
    annotations:
      - name: stereotype.Controller
        attributes: { value: sms }
      - name: http.Route
        attributes: { value: /api/v1/sms }
    methods:
      - name: Get
        doc: Get a message by id. Unknown ids fail.
        params:
          - { name: ctx, type: { namespace: context, identifier: Context } }
          - { name: id, type: { identifier: string }, doc: the message id }
        returns:
          - type: { namespace: example.com/sms, identifier: Sms }
          - type: { identifier: error }
        annotations:
          - name: http.Method
            attributes: { value: GET }
          - name: http.Route
            attributes: { value: "/:id" }

      - name: List
        doc: List messages.
        params:
          - { name: ctx, type: { namespace: context, identifier: Context } }
          - { name: page, type: { identifier: int } }
          - { name: lang, type: { identifier: string } }
        returns:
          - type: { identifier: "[]", params: [{ namespace: example.com/sms, identifier: Sms }] }
          - type: { identifier: error }
        annotations:
          - name: http.Method
            attributes: { value: GET }
          - name: http.Route
            attributes: { value: "/" }
          - name: http.QueryParam
            attributes: { value: page, alias: page-size }
          - name: http.HeaderParam
            attributes: { value: lang, alias: accept-language }

      - name: MarkRead
        params:
          - { name: id, type: { namespace: example.com/sms, identifier: SmsId } }
        returns:
          - type: { identifier: error }
        annotations:
          - name: http.Method
            attributes: { value: PUT }
          - name: http.Route
            attributes: { value: "/:id/read" }

      - name: Delete
        params:
          - { name: id, type: { identifier: string } }
        returns:
          - type: { identifier: error }
        annotations:
          - name: http.Method
            attributes: { value: DELETE }
          - name: http.Route
            attributes: { value: "/:id" }

aliases:
  - namespace: example.com/sms
    identifier: SmsId
    doc: Message id of the form sms-<digits>.
    underlying: { identifier: string }
"#;

#[derive(Debug, Clone, Serialize)]
pub struct Sms {
    pub id: String,
    pub text: String,
    pub read: bool,
}

impl Sms {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            text: format!("message {id}"),
            read: false,
        }
    }
}

#[derive(Debug)]
pub struct SmsNotFound(pub String);

impl fmt::Display for SmsNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sms {} not found", self.0)
    }
}

impl std::error::Error for SmsNotFound {}

impl ErrorContract for SmsNotFound {
    fn id(&self) -> Option<String> {
        Some("sms.not.found".to_string())
    }

    fn localized_message(&self) -> Option<String> {
        Some("Nachricht nicht gefunden".to_string())
    }
}

pub struct SmsId(pub u64);

impl FromParam for SmsId {
    fn from_param(raw: &str) -> anyhow::Result<Self> {
        let digits = raw
            .strip_prefix("sms-")
            .ok_or_else(|| anyhow::anyhow!("expected sms-<digits>"))?;
        Ok(SmsId(digits.parse()?))
    }
}

pub fn sms_model() -> MetadataModel {
    model_from_yaml(SMS_MODEL).unwrap()
}

pub fn method(name: &str) -> MethodId {
    MethodId::new(NAMESPACE, CONTROLLER, name)
}

/// Adapters for every exposed method of [`SMS_MODEL`]. The id `404` is
/// never found.
pub fn sms_adapters() -> AdapterRegistry {
    let mut registry = AdapterRegistry::new();
    registry
        .register(method("Get"), |mut args| {
            let _ctx: RequestContext = args.take(0)?;
            let id: String = args.take(1)?;
            if id == "404" {
                return Outcome::from_result::<Sms, _>(Err(SmsNotFound(id)));
            }
            Outcome::from_result::<_, SmsNotFound>(Ok(Sms::new(&id)))
        })
        .register(method("List"), |mut args| {
            let page: i64 = args.take(1)?;
            let lang: String = args.take(2)?;
            let messages: Vec<Sms> = (0..page.max(0))
                .map(|i| Sms {
                    text: format!("{lang}:{i}"),
                    ..Sms::new(&i.to_string())
                })
                .collect();
            Ok(Outcome::new().value(&messages)?.nil())
        })
        .register(method("MarkRead"), |mut args| {
            let SmsId(n) = args.take_custom::<SmsId>(0)?;
            if n == 0 {
                return Ok(Outcome::new().error(SmsNotFound(format!("sms-{n}"))));
            }
            Ok(Outcome::new().nil())
        })
        .register(method("Delete"), |_args| Ok(Outcome::new().nil()))
        .register_decoder::<SmsId>(TypeKey::new(NAMESPACE, "SmsId"));
    registry
}

pub fn sms_router() -> (Router, Vec<RouteConfig>) {
    let model = sms_model();
    let mut router = Router::new();
    let routes = compile_model(&model, &sms_adapters(), Arc::new(JsonEncoder), &mut router).unwrap();
    (router, routes)
}
