use std::fs;

use assert_cmd::Command;
use serde_json::{Value, json};
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn contract_qa() -> Result<Command, Box<dyn std::error::Error>> {
    let mut command = Command::cargo_bin("contract-qa")?;
    command.env_remove("CONTRACT_QA_CATALOG").env_remove("CONTRACT_QA_LOG");
    Ok(command)
}

#[test]
fn wizard_command_completes_the_last_section() -> TestResult {
    let workspace = TempDir::new()?;
    let out = workspace.path().join("answers.json");
    let stdin = "no\nno\n\n";

    let output = contract_qa()?
        .arg("wizard")
        .arg("--start-section")
        .arg("addenda")
        .arg("--out")
        .arg(&out)
        .write_stdin(stdin)
        .output()?;
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("== 18/18 Addenda =="));
    assert!(stdout.contains("Answers (CBOR hex):"));

    let saved: Value = serde_json::from_str(&fs::read_to_string(&out)?)?;
    assert_eq!(saved["answers"]["hasSaleOfOtherPropertyAddendum"], json!(false));
    assert_eq!(saved["answers"]["hasBackUpContractAddendum"], json!(false));
    Ok(())
}

#[test]
fn validate_command_reports_missing_answers() -> TestResult {
    let workspace = assert_fs::TempDir::new()?;
    let answers = workspace.path().join("answers.json");
    fs::write(
        &answers,
        json!({ "hasHomeownersAssociation": true }).to_string(),
    )?;

    let output = contract_qa()?
        .arg("validate")
        .arg("--answers")
        .arg(&answers)
        .arg("--section")
        .arg("homeownersAssociation")
        .output()?;
    assert!(!output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("Validation result: invalid"));
    assert!(stdout.contains("associationName"));
    Ok(())
}

#[test]
fn questions_command_rejects_unknown_section() -> TestResult {
    let output = contract_qa()?
        .arg("questions")
        .arg("--section")
        .arg("nonexistent")
        .output()?;
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("unknown section 'nonexistent'"));
    Ok(())
}

#[test]
fn check_command_uses_catalog_from_environment() -> TestResult {
    let workspace = TempDir::new()?;
    let catalog_path = workspace.path().join("catalog.json");
    fs::write(
        &catalog_path,
        json!({
            "id": "mini",
            "title": "Mini",
            "version": "0.1.0",
            "sections": [{ "id": "buyers", "title": "Buyers", "questions": [
                { "fieldId": "buyerName", "prompt": "Buyer?", "answerType": "text" }
            ]}]
        })
        .to_string(),
    )?;

    let output = contract_qa()?
        .arg("check")
        .env("CONTRACT_QA_CATALOG", &catalog_path)
        .output()?;
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("Catalog mini v0.1.0 is valid: 1 sections, 1 questions"));
    Ok(())
}

#[test]
fn check_command_reports_cycles() -> TestResult {
    let workspace = TempDir::new()?;
    let catalog_path = workspace.path().join("cyclic.json");
    fs::write(
        &catalog_path,
        json!({
            "id": "cyclic",
            "title": "Cyclic",
            "version": "0.1.0",
            "sections": [{ "id": "s", "title": "S", "questions": [
                { "fieldId": "a", "prompt": "A?", "answerType": "boolean",
                  "dependsOnAll": [{ "fieldId": "b", "value": true }] },
                { "fieldId": "b", "prompt": "B?", "answerType": "boolean",
                  "dependsOnAll": [{ "fieldId": "a", "value": true }] }
            ]}]
        })
        .to_string(),
    )?;

    let output = contract_qa()?
        .arg("--catalog")
        .arg(&catalog_path)
        .arg("check")
        .output()?;
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("dependency cycle: a -> b -> a"));
    Ok(())
}
