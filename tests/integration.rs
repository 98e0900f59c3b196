//! Integration tests for the sheetdex list and stats commands

use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::thread;

use assert_cmd::Command as AssertCommand;
use predicates::prelude::*;
use tempfile::TempDir;

// =============================================================================
// Test Helpers
// =============================================================================

const SHEET: &str = "\
Card ID,Card Name,List Name,City,State,TX House District,TX Senate District,LinkedIn,Website,TARSEC List?,NOTES
c1,Acme Corp,Prospects,Austin,TX,\"45, 47\",14,https://linkedin.com/company/acme,https://acme.example,yes,\"Say \"\"hi\"\", please\"
c2,Globex,Members,Dallas,TX,112,16,no,,no,
c3,Initech,Prospects,Austin,TX,49,14,,https://initech.example,yes,
,,Prospects,Houston,TX,1,1,,,,
,Umbrella,,Houston,TX,134,17,,,no,
";

/// Test environment with a sheet export and a config that logs into the temp dir
struct TestEnv {
    temp_dir: TempDir,
    config_path: PathBuf,
    sheet_path: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        Self::with_config("")
    }

    fn with_config(extra: &str) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let sheet_path = temp_dir.path().join("contacts.csv");
        let log_path = temp_dir.path().join("sheetdex.log");

        fs::write(&sheet_path, SHEET).unwrap();
        let config = format!("[log]\nfile = {:?}\n\n{}", log_path.to_str().unwrap(), extra);
        fs::write(&config_path, config).unwrap();

        Self {
            temp_dir,
            config_path,
            sheet_path,
        }
    }

    /// Run sheetdex with this test env's config
    fn sheetdex(&self) -> AssertCommand {
        let mut cmd = sheetdex_cmd();
        cmd.args(["--config", self.config_path.to_str().unwrap()]);
        cmd.env_remove("SHEETDEX_LOG");
        cmd
    }

    /// Run sheetdex against the fixture sheet
    fn sheetdex_with_file(&self) -> AssertCommand {
        let mut cmd = self.sheetdex();
        cmd.args(["--file", self.sheet_path.to_str().unwrap()]);
        cmd
    }
}

/// Get the sheetdex binary command
fn sheetdex_cmd() -> AssertCommand {
    AssertCommand::cargo_bin("sheetdex").unwrap()
}

/// Serve one canned HTTP response and return the URL to hit.
fn serve_once(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });
    format!("http://{}/export?format=csv", addr)
}

fn stdout_lines(output: &std::process::Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

// =============================================================================
// list
// =============================================================================

#[test]
fn test_list_prints_every_named_row() {
    let env = TestEnv::new();
    let output = env.sheetdex_with_file().arg("list").output().unwrap();
    assert!(output.status.success());

    let lines = stdout_lines(&output);
    assert_eq!(
        lines,
        vec![
            "c1\tAcme Corp\tAustin\tTX\t45, 47\t14",
            "c2\tGlobex\tDallas\tTX\t112\t16",
            "c3\tInitech\tAustin\tTX\t49\t14",
            "contact-3\tUmbrella\tHouston\tTX\t134\t17",
        ]
    );
    assert!(String::from_utf8_lossy(&output.stderr).contains("Showing 4 of 4 companies"));
}

#[test]
fn test_list_house_district_matches_multi_district_cell() {
    let env = TestEnv::new();
    env.sheetdex_with_file()
        .args(["list", "--house-district", "47"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Acme Corp"))
        .stdout(predicate::str::contains("Globex").not())
        .stderr(predicate::str::contains("Showing 1 of 4 companies"));
}

#[test]
fn test_list_combines_filters() {
    let env = TestEnv::new();
    let output = env
        .sheetdex_with_file()
        .args(["list", "--city", "Austin", "--website", "yes"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("c1\t"));
    assert!(lines[1].starts_with("c3\t"));
}

#[test]
fn test_list_linkedin_no_treats_no_as_missing() {
    let env = TestEnv::new();
    let output = env
        .sheetdex_with_file()
        .args(["list", "--linkedin", "no"])
        .output()
        .unwrap();
    let names: Vec<String> = stdout_lines(&output)
        .iter()
        .map(|line| line.split('\t').nth(1).unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Globex", "Initech", "Umbrella"]);
}

#[test]
fn test_list_search_is_case_insensitive() {
    let env = TestEnv::new();
    env.sheetdex_with_file()
        .args(["list", "--search", "ACME"])
        .assert()
        .success()
        .stdout(predicate::str::contains("c1\tAcme Corp"))
        .stderr(predicate::str::contains("Showing 1 of 4 companies"));
}

#[test]
fn test_list_search_keeps_surrounding_whitespace() {
    let env = TestEnv::new();
    env.sheetdex_with_file()
        .args(["list", "--search", " ACME"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Showing 0 of 4 companies"));
}

#[test]
fn test_list_blank_list_name_uses_default() {
    let env = TestEnv::new();
    env.sheetdex_with_file()
        .args(["list", "--list-name", "Contacts"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Umbrella"))
        .stderr(predicate::str::contains("Showing 1 of 4 companies"));
}

#[test]
fn test_list_json_carries_full_records() {
    let env = TestEnv::new();
    let output = env
        .sheetdex_with_file()
        .args(["list", "--json", "--state", "TX", "--senate-district", "14"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let records = value.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["company_name"], "Acme Corp");
    assert_eq!(records[0]["notes"], "Say \"hi\", please");
    assert_eq!(records[0]["tarsec_list"], true);
    assert_eq!(records[1]["id"], "c3");
}

#[test]
fn test_list_respects_column_overrides() {
    let env = TestEnv::with_config("[columns]\ncompany_name = \"Company\"\n");
    let sheet = "Company,City\nHooli,Palo Alto\n";
    fs::write(&env.sheet_path, sheet).unwrap();

    env.sheetdex_with_file()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("contact-0\tHooli\tPalo Alto"));
}

#[test]
fn test_list_rejects_bad_presence_value() {
    let env = TestEnv::new();
    env.sheetdex_with_file()
        .args(["list", "--twitter", "maybe"])
        .assert()
        .failure();
}

// =============================================================================
// stats
// =============================================================================

#[test]
fn test_stats_counts() {
    let env = TestEnv::new();
    let output = env.sheetdex_with_file().arg("stats").output().unwrap();
    assert!(output.status.success());

    assert_eq!(
        stdout_lines(&output),
        vec![
            "Companies\t4",
            "House Districts\t5",
            "Senate Districts\t3",
            "Cities\t3",
            "TARSEC List\t2",
        ]
    );
}

#[test]
fn test_stats_json() {
    let env = TestEnv::new();
    let output = env
        .sheetdex_with_file()
        .args(["stats", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["companies"], 4);
    assert_eq!(value["tarsec_list"], 2);
}

#[test]
fn test_stats_from_configured_file_source() {
    let temp = TempDir::new().unwrap();
    let sheet_path = temp.path().join("sheet.csv");
    fs::write(&sheet_path, SHEET).unwrap();
    let env = TestEnv::with_config(&format!(
        "[source]\nfile = {:?}\n",
        sheet_path.to_str().unwrap()
    ));

    env.sheetdex()
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Companies\t4"));
}

// =============================================================================
// HTTP source
// =============================================================================

#[test]
fn test_url_source_lists_contacts() {
    let env = TestEnv::new();
    let url = serve_once("200 OK", "Card Name,City\nAcme,Austin\n");

    env.sheetdex()
        .args(["--url", url.as_str(), "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("contact-0\tAcme\tAustin"));
}

#[test]
fn test_url_server_error_fails_with_status() {
    let env = TestEnv::new();
    let url = serve_once("500 Internal Server Error", "boom");

    env.sheetdex()
        .args(["--url", url.as_str(), "stats"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "failed to fetch sheet: HTTP 500 Internal Server Error",
        ));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_missing_sheet_file_fails() {
    let env = TestEnv::new();
    let missing = env.temp_dir.path().join("nope.csv");

    env.sheetdex()
        .args(["--file", missing.to_str().unwrap(), "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read sheet file"));
}

#[test]
fn test_no_source_configured_fails() {
    let env = TestEnv::new();
    env.sheetdex()
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no sheet source configured"));
}

#[test]
fn test_missing_explicit_config_fails() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("absent.toml");

    sheetdex_cmd()
        .args(["--config", config_path.to_str().unwrap(), "stats"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration file not found"));
}

#[test]
fn test_file_and_url_conflict() {
    let env = TestEnv::new();
    env.sheetdex_with_file()
        .args(["--url", "http://127.0.0.1:1/", "list"])
        .assert()
        .failure();
}

#[test]
fn test_key_collision_is_rejected() {
    let env = TestEnv::with_config("[keys.global]\nquit = \"j\"\n");
    env.sheetdex_with_file()
        .arg("stats")
        .assert()
        .failure();
}

#[test]
fn test_unknown_config_key_warns() {
    let env = TestEnv::with_config("[source]\nurll = \"x\"\n");
    env.sheetdex_with_file()
        .arg("stats")
        .assert()
        .success()
        .stderr(predicate::str::contains("unknown configuration key `source.urll`"));
}

#[test]
fn test_log_file_is_written() {
    let env = TestEnv::new();
    env.sheetdex_with_file().arg("stats").assert().success();

    let log = fs::read_to_string(env.temp_dir.path().join("sheetdex.log")).unwrap();
    assert!(log.contains("contacts loaded"));
    assert!(log.contains("loaded configuration"));
}
