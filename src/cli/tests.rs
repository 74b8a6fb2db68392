//! Unit tests for CLI commands

use crate::cli::{run_cli, Cli, Commands, OutputFormat};
use crate::runtime_config::RuntimeConfig;
use clap::{CommandFactory, Parser};
use std::io::Write;

const MODEL: &str = r#"
records:
  - namespace: example.com/sms
    identifier: SmsController
    annotations:
      - name: stereotype.Controller
        attributes: { value: sms }
      - name: http.Route
        attributes: { value: /api/v1/sms }
    methods:
      - name: Get
        params:
          - name: id
            type: { identifier: string }
        returns:
          - type: { identifier: string }
        annotations:
          - name: http.Method
            attributes: { value: GET }
          - name: http.Route
            attributes: { value: "/:id" }
"#;

fn model_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(MODEL.as_bytes()).unwrap();
    file
}

fn run(args: &[&str]) -> String {
    let cli = Cli::try_parse_from(args).unwrap();
    let mut out = Vec::new();
    run_cli(&cli, &RuntimeConfig::default(), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_doc_command_parses() {
    let cli = Cli::try_parse_from(["metaroute-doc", "doc", "--model", "m.yaml", "--format", "json"])
        .unwrap();
    match cli.command {
        Commands::Doc {
            model,
            format,
            title,
            ..
        } => {
            assert_eq!(model.to_string_lossy(), "m.yaml");
            assert_eq!(format, OutputFormat::Json);
            assert!(title.is_none());
        }
        _ => panic!("Expected Doc command"),
    }
}

#[test]
fn test_doc_title_and_version_read_the_environment() {
    let cmd = Cli::command();
    let doc = cmd.find_subcommand("doc").unwrap();
    let env_of = |id: &str| {
        doc.get_arguments()
            .find(|a| a.get_id() == id)
            .and_then(|a| a.get_env())
            .map(|v| v.to_string_lossy().into_owned())
    };
    assert_eq!(env_of("title").as_deref(), Some("METAROUTE_DOC_TITLE"));
    assert_eq!(env_of("version").as_deref(), Some("METAROUTE_DOC_VERSION"));
    assert_eq!(env_of("model"), None);
}

#[test]
fn test_model_is_required() {
    assert!(Cli::try_parse_from(["metaroute-doc", "routes"]).is_err());
}

#[test]
fn test_routes_output() {
    let file = model_file();
    let out = run(&["metaroute-doc", "routes", "--model", file.path().to_str().unwrap()]);
    assert_eq!(
        out,
        "GET /api/v1/sms/:id -> example.com/sms#SmsController.Get\n"
    );
}

#[test]
fn test_doc_output_json() {
    let file = model_file();
    let out = run(&[
        "metaroute-doc",
        "doc",
        "--model",
        file.path().to_str().unwrap(),
        "--format",
        "json",
        "--title",
        "SMS",
    ]);
    let doc: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(doc["info"]["title"], "SMS");
    assert_eq!(doc["info"]["version"], "1.0.0");
    assert!(doc["paths"]["/api/v1/sms/{id}"]["get"].is_object());
}

#[test]
fn test_missing_model_file_fails() {
    let cli = Cli::try_parse_from(["metaroute-doc", "routes", "--model", "/nonexistent/model.yaml"])
        .unwrap();
    let mut out = Vec::new();
    assert!(run_cli(&cli, &RuntimeConfig::default(), &mut out).is_err());
}
