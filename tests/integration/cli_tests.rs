/*!
 * Tests for the command line binary
 */

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;

use crate::common;

#[allow(deprecated)]
fn xliffwai() -> Command {
    Command::cargo_bin("xliffwai").unwrap()
}

#[test]
fn test_cli_withEmptyInputFolder_shouldReportAndSucceed() -> Result<()> {
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;

    xliffwai()
        .arg(input.path())
        .arg(output.path().join("out"))
        .arg("fr")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("No .xlf/.xliff files found."));

    assert!(!output.path().join("out").exists());
    Ok(())
}

#[test]
fn test_cli_withMissingInputFolder_shouldExitWithUsageCode() -> Result<()> {
    let root = common::create_temp_dir()?;

    xliffwai()
        .arg(root.path().join("nope"))
        .arg(root.path())
        .arg("fr")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("input folder not found"));
    Ok(())
}

#[test]
fn test_cli_withMissingArguments_shouldExitWithUsageCode() {
    xliffwai()
        .arg("only-input")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_withUnknownFlag_shouldExitWithUsageCode() {
    xliffwai().arg("--definitely-not-a-flag").assert().code(2);
}

#[test]
fn test_cli_withInvalidEndpoint_shouldFail() -> Result<()> {
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;

    xliffwai()
        .arg(input.path())
        .arg(output.path())
        .args(["fr", "not a url"])
        .assert()
        .code(1);
    Ok(())
}

#[test]
fn test_cli_help_shouldDescribeArguments() {
    xliffwai()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("TARGET_LANGUAGE"))
        .stdout(predicate::str::contains("--only-missing"))
        .stdout(predicate::str::contains("--no-cache"));
}

#[test]
fn test_cli_completions_shouldPrintScript() {
    xliffwai()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("xliffwai"));
}
