use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(path, content).expect("write test file");
}

/// Run the binary with HOME and config dirs pointed at `home`, so no user
/// config file is picked up.
fn run_locostats(args: &[&str], home: &Path) -> (bool, Vec<u8>, Vec<u8>) {
    let bin = std::env::var("CARGO_BIN_EXE_locostats").unwrap_or_else(|_| {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("target");
        path.push("debug");
        if cfg!(windows) {
            path.push("locostats.exe");
        } else {
            path.push("locostats");
        }
        path.to_string_lossy().into_owned()
    });
    let output = Command::new(bin)
        .args(args)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("LOCOSTATS_LOG")
        .output()
        .expect("run locostats");
    (output.status.success(), output.stdout, output.stderr)
}

/// Temp dir with one snapshot page per entry in `pages`
fn snapshot(pages: &[&str]) -> (TempDir, String) {
    let dir = TempDir::new().expect("temp dir");
    for (i, page) in pages.iter().enumerate() {
        write_file(&dir.path().join(format!("page-{:03}.json", i + 1)), page);
    }
    let pattern = format!("{}/page-*.json", dir.path().display());
    (dir, pattern)
}

const FLEET: &str = r#"{"Data": [
    {"_id": "1", "Loco_Description": "LocoA", "Next_Due_Date": "2024-02-15",
     "WO_Number": "WO-1", "PM_Description": "Wheel reprofiling",
     "Estimated_Labor_Cost": "100,50 EUR", "Estimated_Tool_Cost": "20 EUR"},
    {"_id": "2", "Loco_Description": "LocoA", "Next_Due_Date": "2024-05-01",
     "Estimated_Labor_Cost": "50 EUR"}
]}"#;

const FLEET_PAGE_2: &str = r#"[
    {"_id": "3", "Loco_Description": "LocoB", "Next_Due_Date": "2025-07-10",
     "WO_Number": 4711, "Estimated_Item_Cost": "1.000,00 EUR"},
    {"_id": "4", "Loco_Description": null, "Next_Due_Date": "2024-03-01",
     "Estimated_Labor_Cost": "5 EUR"},
    {"_id": "5", "Loco_Description": "LocoC", "Estimated_Labor_Cost": "999 EUR"}
]"#;

fn json_stdout(stdout: &[u8]) -> Value {
    serde_json::from_slice(stdout).expect("json output")
}

fn close(a: &Value, b: f64) -> bool {
    a.as_f64().is_some_and(|a| (a - b).abs() < 1e-9)
}

#[test]
fn rollup_json_builds_nested_tree() {
    let (dir, pattern) = snapshot(&[FLEET]);
    let (ok, stdout, stderr) = run_locostats(&["rollup", "--json", "--input", &pattern], dir.path());
    assert!(ok, "stderr: {}", String::from_utf8_lossy(&stderr));

    let json = json_stdout(&stdout);
    let labor = &json["groups"][0];
    assert_eq!(labor["label"], "Labor Cost");
    let loco = &labor["details"][0];
    assert_eq!(loco["description"], "LocoA");
    let year = &loco["years"]["2024"];
    assert!(close(&year["total"], 150.5));
    assert!(close(&year["quarters"]["Q1"]["total"], 100.5));
    assert!(close(&year["quarters"]["Q2"]["total"], 50.0));
    assert!(close(&year["quarters"]["Q1"]["months"]["February"], 100.5));

    let groups = json["groups"].as_array().expect("groups");
    assert_eq!(groups.last().expect("total group")["label"], "Total Cost");
    assert!(close(&json["grand_total"], 170.5));
}

#[test]
fn rollup_reads_all_pages_and_skips_undated() {
    let (dir, pattern) = snapshot(&[FLEET, FLEET_PAGE_2]);
    let (ok, stdout, _) = run_locostats(&["--json", "--input", &pattern], dir.path());
    assert!(ok);

    let json = json_stdout(&stdout);
    assert_eq!(json["years"], serde_json::json!(["2024", "2025"]));
    let total = json["groups"].as_array().expect("groups").last().cloned().expect("total");
    let names: Vec<&str> = total["details"]
        .as_array()
        .expect("details")
        .iter()
        .filter_map(|d| d["description"].as_str())
        .collect();
    // LocoC has no due date; the null description becomes "Unknown"
    assert_eq!(names, ["LocoA", "LocoB", "Unknown"]);
    assert!(close(&json["grand_total"], 170.5 + 1000.0 + 5.0));
}

#[test]
fn rollup_table_renders_zero_cells() {
    let (dir, pattern) = snapshot(&[FLEET]);
    let (ok, stdout, _) = run_locostats(
        &["--input", &pattern, "--no-color", "--breakdown", "-e", "2024", "-e", "2024-Q1"],
        dir.path(),
    );
    assert!(ok);
    let text = String::from_utf8_lossy(&stdout);
    assert!(text.contains("Maintenance Cost Rollup"));
    assert!(text.contains("2024-Q1"));
    assert!(text.contains("February 2024"));
    assert!(text.contains(" 0 EUR "));
    assert!(text.contains("100.50 EUR"));
    assert!(text.contains("Grand total 170.50 EUR"));
}

#[test]
fn rollup_csv_has_expanded_columns() {
    let (dir, pattern) = snapshot(&[FLEET]);
    let (ok, stdout, _) =
        run_locostats(&["rollup", "--csv", "--input", &pattern, "-e", "2024"], dir.path());
    assert!(ok);
    let text = String::from_utf8_lossy(&stdout);
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("group,description,2024,2024-Q1,2024-Q2,2024-Q3,2024-Q4,total")
    );
    assert_eq!(
        lines.next(),
        Some("Labor Cost,LocoA,150.50,100.50,50.00,0.00,0.00,150.50")
    );
}

#[test]
fn list_filters_and_sorts() {
    let (dir, pattern) = snapshot(&[FLEET, FLEET_PAGE_2]);
    let (ok, stdout, _) = run_locostats(
        &[
            "list", "--json", "--input", &pattern, "--order", "desc", "--since", "2024-03-01",
        ],
        dir.path(),
    );
    assert!(ok);
    let json = json_stdout(&stdout);
    let ids: Vec<&str> = json
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|r| r["_id"].as_str())
        .collect();
    assert_eq!(ids, ["3", "2", "4"]);
}

#[test]
fn list_csv_download() {
    let (dir, pattern) = snapshot(&[FLEET]);
    let (ok, stdout, _) =
        run_locostats(&["list", "--csv", "--input", &pattern, "-l", "LocoA"], dir.path());
    assert!(ok);
    let text = String::from_utf8_lossy(&stdout);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("_id,Loco_Description,Next_Due_Date"));
    assert!(lines[1].starts_with("1,LocoA,2024-02-15,WO-1,Wheel reprofiling,\"100,50 EUR\""));
}

#[test]
fn list_merges_service_events() {
    let (dir, pattern) = snapshot(&[FLEET]);
    let events = dir.path().join("events.json");
    write_file(
        &events,
        r#"{"Data": [{"Locomotive_Number": {"_id": "L9", "Name": "LocoA"},
                      "Plan_Start": "2024-01-10", "Event_Service": "Main inspection"}]}"#,
    );
    let events_pattern = events.display().to_string();
    let (ok, stdout, _) = run_locostats(
        &["list", "--json", "--input", &pattern, "--service-input", &events_pattern],
        dir.path(),
    );
    assert!(ok);
    let json = json_stdout(&stdout);
    let first = &json[0];
    assert_eq!(first["PM_Description"], "Main inspection");
    assert_eq!(first["service"], true);
    assert_eq!(json.as_array().expect("array").len(), 3);
}

#[test]
fn drill_returns_cell_records_and_totals() {
    let (dir, pattern) = snapshot(&[FLEET, FLEET_PAGE_2]);
    let (ok, stdout, _) = run_locostats(
        &[
            "drill",
            "--json",
            "--input",
            &pattern,
            "--year",
            "2024",
            "--quarter",
            "Q1",
            "--description",
            "locoa",
        ],
        dir.path(),
    );
    assert!(ok);
    let json = json_stdout(&stdout);
    assert_eq!(json["title"], "locoa 2024 Q1");
    let records = json["records"].as_array().expect("records");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["_id"], "1");
    assert!(close(&json["totals"]["Labor Cost"], 100.5));
    assert!(close(&json["total"], 120.5));
}

#[test]
fn drill_search_narrows_results() {
    let (dir, pattern) = snapshot(&[FLEET]);
    let (ok, stdout, _) = run_locostats(
        &["drill", "--json", "--input", &pattern, "--year", "2024", "--search", "WHEEL"],
        dir.path(),
    );
    assert!(ok);
    let json = json_stdout(&stdout);
    assert_eq!(json["records"].as_array().expect("records").len(), 1);
}

#[test]
fn descriptions_first_seen_order() {
    let (dir, pattern) = snapshot(&[FLEET, FLEET_PAGE_2]);
    let (ok, stdout, _) = run_locostats(&["descriptions", "--input", &pattern], dir.path());
    assert!(ok);
    let text = String::from_utf8_lossy(&stdout);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines, ["LocoA", "LocoB", "LocoC"]);
}

#[test]
fn missing_input_degrades_to_empty() {
    let dir = TempDir::new().expect("temp dir");
    let pattern = format!("{}/nothing-*.json", dir.path().display());
    let (ok, stdout, stderr) = run_locostats(&["--input", &pattern], dir.path());
    assert!(ok);
    assert!(String::from_utf8_lossy(&stdout).contains("No maintenance records found."));
    assert!(String::from_utf8_lossy(&stderr).contains("failed to fetch records"));
}

#[test]
fn malformed_page_drops_everything() {
    let (dir, pattern) = snapshot(&[FLEET, "{ not json"]);
    let (ok, stdout, _) = run_locostats(&["--json", "--input", &pattern], dir.path());
    assert!(ok);
    assert!(String::from_utf8_lossy(&stdout).contains("No maintenance records found."));
}

#[test]
fn invalid_date_is_an_error() {
    let (dir, pattern) = snapshot(&[FLEET]);
    let (ok, _, stderr) = run_locostats(&["--input", &pattern, "--since", "soon"], dir.path());
    assert!(!ok);
    assert!(String::from_utf8_lossy(&stderr).contains("Invalid date \"soon\""));
}

#[test]
fn missing_api_settings_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let (ok, _, stderr) = run_locostats(&["rollup"], dir.path());
    assert!(!ok);
    assert!(String::from_utf8_lossy(&stderr).contains("Missing setting `base_url`"));
}

#[test]
fn config_file_sets_currency_and_quarters() {
    let (dir, pattern) = snapshot(&[r#"{"Data": [
        {"Loco_Description": "LocoA", "Next_Due_Date": "2024-02-15",
         "Estimated_Labor_Cost": "100,50 CHF"},
        {"Loco_Description": "LocoA", "Next_Due_Date": "2024-05-01",
         "Estimated_Labor_Cost": "50 CHF"}
    ]}"#]);
    write_file(
        &dir.path().join(".locostats.toml"),
        r#"
currency = "CHF"

[quarters]
H1 = ["January", "February", "March", "April", "May", "June"]
H2 = ["July", "August", "September", "October", "November", "December"]
"#,
    );
    let (ok, stdout, stderr) =
        run_locostats(&["--csv", "--input", &pattern, "-e", "2024"], dir.path());
    assert!(ok, "stderr: {}", String::from_utf8_lossy(&stderr));
    let text = String::from_utf8_lossy(&stdout);
    assert!(text.starts_with("group,description,2024,2024-H1,2024-H2,total\n"));
    assert!(text.contains("Labor Cost,LocoA,150.50,150.50,0.00,150.50"));

    let (ok, stdout, _) = run_locostats(&["--json", "--input", &pattern], dir.path());
    assert!(ok);
    assert_eq!(json_stdout(&stdout)["currency"], "CHF");
}

#[test]
fn incomplete_quarter_mapping_is_an_error() {
    let (dir, pattern) = snapshot(&[FLEET]);
    write_file(
        &dir.path().join(".locostats.toml"),
        "[quarters]\nQ1 = [\"January\"]\n",
    );
    let (ok, _, stderr) = run_locostats(&["--input", &pattern], dir.path());
    assert!(!ok);
    assert!(String::from_utf8_lossy(&stderr).contains("Invalid quarter mapping"));
}

#[test]
fn drill_matches_rollup_row_across_spellings() {
    let (dir, pattern) = snapshot(&[r#"[
        {"_id": "1", "Loco_Description": "LocoA", "Next_Due_Date": "2024-02-15",
         "Estimated_Labor_Cost": "100 EUR"},
        {"_id": "2", "Loco_Description": " locoa ", "Next_Due_Date": "2024-02-20",
         "Estimated_Labor_Cost": "7 EUR (est.)"}
    ]"#]);
    let (ok, stdout, _) = run_locostats(&["--json", "--input", &pattern], dir.path());
    assert!(ok);
    let json = json_stdout(&stdout);
    let details = json["groups"][0]["details"].as_array().expect("details");
    assert_eq!(details.len(), 1);
    assert_eq!(details[0]["description"], "LocoA");
    let cell = &details[0]["years"]["2024"]["quarters"]["Q1"]["months"]["February"];
    assert!(close(cell, 107.0));

    let (ok, stdout, _) = run_locostats(
        &[
            "drill", "--json", "--input", &pattern, "--year", "2024", "--quarter", "Q1",
            "--month", "February", "--description", "LocoA",
        ],
        dir.path(),
    );
    assert!(ok);
    let json = json_stdout(&stdout);
    assert_eq!(json["records"].as_array().expect("records").len(), 2);
    assert!(close(&json["totals"]["Labor Cost"], 107.0));
}

const WHEELSETS: &str = r#"{"Data": [
    {"_id": "W1", "Wheel_Position": "1L", "Flange_Height": 28.5,
     "Locomotive_Number": {"_id": "L1", "Name": "119 001-5", "Locomotive_Number": "119001",
                           "Homologation_Date": "2019-04-01"},
     "Work_Order": {"Name": "Reprofiling", "wonum": "WO-12"}},
    {"_id": "W2", "Wheel_Position": "1R",
     "Locomotive_Number": {"Name": "119 002-3", "Locomotive_Number": "119002"}}
]}"#;

#[test]
fn history_flattens_lookups() {
    let (dir, pattern) = snapshot(&[WHEELSETS]);
    let (ok, stdout, stderr) = run_locostats(&["history", "--json", "--input", &pattern], dir.path());
    assert!(ok, "stderr: {}", String::from_utf8_lossy(&stderr));
    let json = json_stdout(&stdout);
    let rows = json.as_array().expect("array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["Locomotive_Number"], "119001");
    assert_eq!(rows[0]["Homologation_Date"], "2019-04-01");
    assert_eq!(rows[0]["Work_Order_Number"], "WO-12");
    assert_eq!(rows[0]["Work_Order_Name"], "Reprofiling");
    assert!(rows[1]["Work_Order_Number"].is_null());
}

#[test]
fn history_table_filters_by_locomotive() {
    let (dir, pattern) = snapshot(&[WHEELSETS]);
    let (ok, stdout, _) = run_locostats(
        &["history", "--input", &pattern, "--no-color", "-l", "119 002-3"],
        dir.path(),
    );
    assert!(ok);
    let text = String::from_utf8_lossy(&stdout);
    assert!(text.contains("History 119 002-3"));
    assert!(text.contains("Homologation Date"));
    assert!(text.contains("Work Order Number"));
    assert!(text.contains("119002"));
    assert!(!text.contains("119001"));
    assert!(text.contains(" - "));
    assert!(text.contains("1 measurements"));
}

#[test]
fn history_csv_header() {
    let (dir, pattern) = snapshot(&[WHEELSETS]);
    let (ok, stdout, _) = run_locostats(&["history", "--csv", "--input", &pattern], dir.path());
    assert!(ok);
    let text = String::from_utf8_lossy(&stdout);
    let first = text.lines().next().expect("header");
    assert_eq!(
        first,
        "Locomotive_Number,Homologation_Date,Work_Order_Number,Wheel_Position,Flange_Height,Name,Work_Order_Name"
    );
}

#[test]
fn history_without_settings_or_input_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let (ok, _, stderr) = run_locostats(&["history"], dir.path());
    assert!(!ok);
    assert!(String::from_utf8_lossy(&stderr).contains("base_url"));
}
