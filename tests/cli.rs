use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn dataviz(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dataviz").unwrap();
    cmd.env("HOME", home.path())
        .env_remove("RUST_LOG")
        .current_dir(home.path());
    cmd
}

fn with_demo() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    dataviz(&dir)
        .args(["demo", "--dir", "data"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Demo data written"));
    dir
}

#[test]
fn test_expenses_writes_html_dashboard() {
    let dir = with_demo();
    dataviz(&dir)
        .args(["expenses", "data/sample_statement.csv", "-o", "out/expenses.html"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved"));
    let html = std::fs::read_to_string(dir.path().join("out/expenses.html")).unwrap();
    assert!(html.contains("Plotly.newPlot"));
    assert!(html.contains("Expenditure Overview"));
    assert!(html.contains("Monthly Expenditure Breakdown"));
}

#[test]
fn test_expenses_default_output_name() {
    let dir = with_demo();
    dataviz(&dir)
        .args(["expenses", "data/sample_statement.csv"])
        .assert()
        .success();
    assert!(dir.path().join("expenditure_overview.html").exists());
}

#[test]
fn test_expenses_pdf_output() {
    let dir = with_demo();
    dataviz(&dir)
        .args(["expenses", "data/sample_statement.csv", "-o", "board.pdf"])
        .assert()
        .success();
    let bytes = std::fs::read(dir.path().join("board.pdf")).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_summary_prints_tables() {
    let dir = with_demo();
    dataviz(&dir)
        .args(["summary", "data/sample_statement.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("By Month"))
        .stdout(predicate::str::contains("Transfers"))
        .stdout(predicate::str::contains("Peak month"));
}

#[test]
fn test_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    dataviz(&dir)
        .args(["expenses", "nope.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error:"));
}

#[test]
fn test_missing_column_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("bad.csv"), "Date,Description,Amount\n2025-05-01,x,-1\n").unwrap();
    dataviz(&dir)
        .args(["summary", "bad.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing expected column 'Trans. Date'"));
}

#[test]
fn test_unknown_output_extension_fails() {
    let dir = with_demo();
    dataviz(&dir)
        .args(["expenses", "data/sample_statement.csv", "-o", "board.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported output format: png"));
}

#[test]
fn test_business_writes_html() {
    let dir = tempfile::tempdir().unwrap();
    dataviz(&dir)
        .args(["business", "-o", "business.html"])
        .assert()
        .success();
    let html = std::fs::read_to_string(dir.path().join("business.html")).unwrap();
    assert!(html.contains("Sales peaked at $30k in June"));
    assert!(html.contains("Business Dashboard Overview"));
}

#[test]
fn test_business_from_csv() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("metrics.csv"),
        "month,sales,satisfaction,ad_spend\nJan,1000,7.5,200\nFeb,2500,8.1,300\n",
    )
    .unwrap();
    dataviz(&dir)
        .args(["business", "--file", "metrics.csv", "-o", "b.html"])
        .assert()
        .success();
    let html = std::fs::read_to_string(dir.path().join("b.html")).unwrap();
    assert!(html.contains("Sales peaked at $2.5k in February"));
}

#[test]
fn test_insights_report_and_export() {
    let dir = with_demo();
    dataviz(&dir)
        .args([
            "insights",
            "data/sales_data.csv",
            "--vip",
            "data/vip.csv",
            "-o",
            "insights.html",
            "--export",
            "out/report.csv",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sales Insights Summary"))
        .stdout(predicate::str::contains("Best Performing Region: California"));
    let csv = std::fs::read_to_string(dir.path().join("out/report.csv")).unwrap();
    assert!(csv.starts_with("Date,Customer,Category,Region"));
    assert!(dir.path().join("insights.html").exists());
}

#[test]
fn test_categories_lists_rules() {
    let dir = tempfile::tempdir().unwrap();
    dataviz(&dir)
        .arg("categories")
        .assert()
        .success()
        .stdout(predicate::str::contains("Bills & Levies"));
}

#[test]
fn test_categories_check_classifies_description() {
    let dir = tempfile::tempdir().unwrap();
    dataviz(&dir)
        .args(["categories", "--check", "MTN Airtime Purchase"])
        .assert()
        .success()
        .stdout(predicate::str::contains("'MTN Airtime Purchase' -> Airtime"));
}

#[test]
fn test_init_then_config_override() {
    let dir = tempfile::tempdir().unwrap();
    dataviz(&dir).arg("init").assert().success();
    let path = dir.path().join(".config/dataviz/settings.json");
    assert!(path.exists());
    dataviz(&dir).arg("init").assert().failure();

    let custom = dir.path().join("custom.json");
    std::fs::write(&custom, r#"{"statement": {"default_category": "Misc"}}"#).unwrap();
    dataviz(&dir)
        .args(["--config", "custom.json", "categories"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Misc"));
}

#[test]
fn test_missing_explicit_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    dataviz(&dir)
        .args(["--config", "absent.json", "categories"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.json not found"));
}

#[test]
fn test_completions() {
    let dir = tempfile::tempdir().unwrap();
    dataviz(&dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dataviz"));
}
