//! End-to-end command tests against a temporary data directory.
//!
//! Every call reopens the workspace, the way separate `galen` invocations do.

use clap::Parser;
use galen_cli::config::OutputFormat;
use galen_cli::{commands, Cli, Config, Formatter, Result, Workspace};
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

const GUIDELINE: &str = "# Type 2 diabetes\n\
    Metformin is commonly used to treat type 2 diabetes mellitus.\n\
    ## Diagnosis\n\
    HbA1c is used to diagnose type 2 diabetes.\n\
    ## Hypertension\n\
    Hypertension is managed with diuretics.\n";

struct Harness {
    dir: TempDir,
    config: Config,
}

impl Harness {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: dir.path().join("data"),
            ..Config::default()
        };
        Self { dir, config }
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        let cli = Cli::parse_from(std::iter::once("galen").chain(args.iter().copied()));
        let workspace = Workspace::open(&self.config)?;
        let formatter = Formatter::new(OutputFormat::Json, false);
        commands::execute(cli.command, &workspace, &formatter)
    }

    fn json(&self, args: &[&str]) -> Value {
        serde_json::from_str(&self.run(args).unwrap()).unwrap()
    }

    fn load_guideline(&self) -> String {
        let path = self.dir.path().join("ada.md");
        fs::write(&path, GUIDELINE).unwrap();
        let document = self.json(&[
            "load",
            path.to_str().unwrap(),
            "--source",
            "ADA",
            "--doc-version",
            "2024",
            "--meta",
            "region=US",
        ]);
        document["id"].as_str().unwrap().to_string()
    }
}

#[test]
fn test_load_is_idempotent() {
    let harness = Harness::new();
    let first = harness.load_guideline();
    let second = harness.load_guideline();
    assert_eq!(first, second);

    let documents = harness.json(&["documents"]);
    assert_eq!(documents.as_array().unwrap().len(), 1);
    assert_eq!(documents[0]["metadata"]["region"], "US");

    let toc = harness.json(&["toc", &first]);
    assert_eq!(toc[0]["title"], "Type 2 diabetes");
    assert_eq!(toc.as_array().unwrap().len(), 3);
}

#[test]
fn test_anchor_and_resolve() {
    let harness = Harness::new();
    let doc_id = harness.load_guideline();

    let anchor = harness.json(&["anchor", &doc_id, "s1", "Metformin"]);
    let anchor_id = anchor["id"].as_str().unwrap().to_string();
    assert_eq!(anchor["anchor_type"], "manual");

    let resolution = harness.json(&["resolve", &anchor_id]);
    assert_eq!(resolution["tombstoned"], false);
    let content = resolution["document_content"].as_str().unwrap();
    let position = resolution["anchor"]["position"].as_u64().unwrap() as usize;
    assert!(content[position..].starts_with("Metformin"));
}

#[test]
fn test_governance_lifecycle() {
    let harness = Harness::new();

    let candidates = harness.json(&["discover", "--text", "HbA1c is used to diagnose type 2 diabetes."]);
    assert_eq!(candidates[0]["id"], "candidate_1");

    let proposal = harness.json(&["propose", "candidate_1"]);
    let proposal_id = proposal["id"].as_str().unwrap().to_string();
    assert_eq!(proposal["proposed_name"], "test_diagnoses_condition");
    assert_eq!(proposal["status"], "pending");

    let approved = harness.json(&["approve", &proposal_id, "--reviewer", "dr_lee"]);
    assert_eq!(approved["status"], "approved");
    assert!(harness
        .run(&["catalog", "show", "test_diagnoses_condition"])
        .is_err());

    let activated = harness.json(&["activate", &proposal_id]);
    assert_eq!(activated["outcome"], "activated");
    let again = harness.json(&["activate", &proposal_id]);
    assert_eq!(again["outcome"], "already_active");

    let definition = harness.json(&["catalog", "show", "test_diagnoses_condition"]);
    assert_eq!(definition["category"], "discovered");

    let candidates = harness.json(&["candidates"]);
    assert_eq!(candidates[0]["reviewed"], true);
    assert_eq!(candidates[0]["approved"], true);
}

#[test]
fn test_activate_with_type_id_override() {
    let harness = Harness::new();
    harness
        .run(&["discover", "--text", "Metformin is used to treat diabetes."])
        .unwrap();
    harness
        .run(&["discover", "--text", "Lisinopril is used to treat hypertension."])
        .unwrap();

    let p1 = harness.json(&["propose", "candidate_1"]);
    let p2 = harness.json(&["propose", "candidate_2"]);
    assert_eq!(p1["proposed_name"], p2["proposed_name"]);
    let (p1, p2) = (p1["id"].as_str().unwrap(), p2["id"].as_str().unwrap());
    harness.run(&["approve", p1, "--reviewer", "dr_lee"]).unwrap();
    harness.run(&["approve", p2, "--reviewer", "dr_lee"]).unwrap();
    harness.run(&["activate", p1]).unwrap();

    assert!(harness.run(&["activate", p2]).is_err());
    let activated = harness.json(&["activate", p2, "--type-id", "antihypertensive_treats_condition"]);
    assert_eq!(activated["outcome"], "activated");
    assert_eq!(activated["type_id"], "antihypertensive_treats_condition");
    assert!(harness
        .run(&["catalog", "show", "antihypertensive_treats_condition"])
        .is_ok());
}

#[test]
fn test_rejected_candidate_cannot_be_reproposed() {
    let harness = Harness::new();
    harness.run(&["discover", "--text", "HbA1c is used to diagnose type 2 diabetes."]).unwrap();
    let proposal = harness.json(&["propose", "candidate_1"]);
    let proposal_id = proposal["id"].as_str().unwrap();

    let rejected = harness.json(&[
        "reject",
        proposal_id,
        "--reviewer",
        "dr_lee",
        "--reason",
        "covered by diagnoses",
    ]);
    assert_eq!(rejected["rejection_reason"], "covered by diagnoses");

    let err = harness.run(&["propose", "candidate_1"]).unwrap_err();
    assert!(err.to_payload()["error"].as_str().unwrap().contains("candidate_1"));
    assert_eq!(harness.json(&["proposals", "--pending"]), serde_json::json!([]));
}

#[test]
fn test_assembly_persists_between_runs() {
    let harness = Harness::new();
    let doc_id = harness.load_guideline();

    let err = harness
        .run(&["assemble", &doc_id, "--layer", "computable-logic"])
        .unwrap_err();
    assert!(err.to_string().contains("has not completed"));

    let reports = harness.json(&["assemble", &doc_id, "--layer", "raw-text"]);
    assert_eq!(reports[0]["nodes"], 3);
    assert_eq!(
        harness.json(&["nodes", &doc_id, "structured-knowledge"]),
        serde_json::json!([])
    );

    harness
        .run(&["assemble", &doc_id, "--layer", "structured-knowledge"])
        .unwrap();
    harness
        .run(&["assemble", &doc_id, "--layer", "computable-logic"])
        .unwrap();

    let rules = harness.json(&["nodes", &doc_id, "computable-logic"]);
    assert_eq!(rules.as_array().unwrap().len(), 3);
    assert!(rules
        .as_array()
        .unwrap()
        .iter()
        .all(|rule| !rule["anchor_ids"].as_array().unwrap().is_empty()));
}

#[test]
fn test_catalog_validate() {
    let harness = Harness::new();
    let valid = harness.json(&["catalog", "validate", "treats", "medication", "condition"]);
    assert_eq!(valid["valid"], true);

    let invalid = harness.json(&["catalog", "validate", "treats", "test", "condition"]);
    assert_eq!(invalid["valid"], false);
    assert!(!invalid["violations"].as_array().unwrap().is_empty());

    let listed = harness.json(&["catalog", "list", "--domain", "medication"]);
    assert!(listed
        .as_array()
        .unwrap()
        .iter()
        .all(|d| d["domain"] == "medication"));
}

#[test]
fn test_errors_render_as_payload() {
    let harness = Harness::new();
    let err = harness.run(&["resolve", "anchor_missing"]).unwrap_err();
    assert_eq!(err.to_payload()["error"], "Anchor not found: anchor_missing");

    let err = harness.run(&["content", "doc_missing"]).unwrap_err();
    assert_eq!(err.to_payload()["error"], "Document not found: doc_missing");
}
