use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn fintrack_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("fintrack"))
}

fn run_ok(home: &tempfile::TempDir, args: &[&str]) {
    let mut cmd = fintrack_cmd();
    cmd.env("FINTRACK_HOME", home.path());
    cmd.args(args);
    cmd.assert().success();
}

fn run_ok_out(home: &tempfile::TempDir, args: &[&str]) -> String {
    let mut cmd = fintrack_cmd();
    cmd.env("FINTRACK_HOME", home.path());
    cmd.args(args);
    let out = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(out).expect("utf8 stdout")
}

fn expense(home: &tempfile::TempDir, amount: &str, category: &str, date: &str) {
    run_ok(
        home,
        &[
            "tx",
            "add",
            "--amount",
            amount,
            "--category",
            category,
            "--type",
            "expense",
            "--date",
            date,
        ],
    );
}

fn logged_in_home() -> tempfile::TempDir {
    let home = tempfile::tempdir().expect("tempdir");
    run_ok(
        &home,
        &["login", "--name", "Jane", "--email", "jane@example.com"],
    );
    home
}

#[test]
fn budget_tracks_spending_for_its_category_and_month() {
    let home = logged_in_home();

    let out = run_ok_out(
        &home,
        &[
            "budget",
            "set",
            "--category",
            "Groceries",
            "--limit",
            "400",
            "--month",
            "2024-03",
        ],
    );
    assert!(
        out.contains("Created budget for Groceries (2024-03): $400.00"),
        "set output: {out}"
    );

    expense(&home, "150", "Groceries", "2024-03-05");
    expense(&home, "100", "Groceries", "2024-03-20");
    // Other category and other month must not count.
    expense(&home, "60", "Dining", "2024-03-07");
    expense(&home, "90", "Groceries", "2024-04-02");
    run_ok(
        &home,
        &[
            "tx", "add", "--amount", "3000", "--category", "Groceries", "--type", "income",
            "--date", "2024-03-01",
        ],
    );

    let tsv = run_ok_out(
        &home,
        &["budget", "list", "--month", "2024-03", "--format", "tsv"],
    );
    let lines: Vec<&str> = tsv.lines().collect();
    assert_eq!(lines[0], "month\tcategory\tlimit\tspent\tremaining\tstatus");
    assert_eq!(lines[1], "2024-03\tGroceries\t400\t250\t150\tGood");

    let table = run_ok_out(&home, &["budget", "list", "--month", "2024-03"]);
    assert!(table.contains("Category"), "table: {table}");
    assert!(table.contains("$250.00"), "table: {table}");
    assert!(table.contains("62.5%"), "table: {table}");
}

#[test]
fn setting_a_budget_again_replaces_the_limit() {
    let home = logged_in_home();

    run_ok(
        &home,
        &[
            "budget", "set", "--category", "Dining", "--limit", "200", "--month", "2024-03",
        ],
    );
    expense(&home, "250", "Dining", "2024-03-10");

    let out = run_ok_out(
        &home,
        &[
            "budget", "set", "--category", "Dining", "--limit", "100", "--month", "2024-03",
        ],
    );
    assert!(
        out.contains("Updated budget for Dining (2024-03): $100.00"),
        "update output: {out}"
    );

    let tsv = run_ok_out(
        &home,
        &["budget", "list", "--month", "2024-03", "--format", "tsv"],
    );
    let rows: Vec<&str> = tsv.lines().skip(1).collect();
    assert_eq!(rows, vec!["2024-03\tDining\t100\t250\t-150\tOver"]);

    let table = run_ok_out(&home, &["budget", "list", "--month", "2024-03"]);
    assert!(table.contains("250.0%"), "table: {table}");
}

#[test]
fn zero_limit_budget_is_over_with_any_spending() {
    let home = logged_in_home();

    run_ok(
        &home,
        &[
            "budget", "set", "--category", "Coffee", "--limit", "0", "--month", "2024-03",
        ],
    );
    expense(&home, "4.50", "Coffee", "2024-03-02");

    let tsv = run_ok_out(
        &home,
        &["budget", "list", "--month", "2024-03", "--format", "tsv"],
    );
    assert!(
        tsv.contains("2024-03\tCoffee\t0\t4.50\t-4.50\tOver"),
        "tsv: {tsv}"
    );

    let table = run_ok_out(&home, &["budget", "list", "--month", "2024-03"]);
    assert!(table.contains("0.0%"), "table: {table}");
}

#[test]
fn empty_month_prints_placeholder() {
    let home = logged_in_home();
    let out = run_ok_out(&home, &["budget", "list", "--month", "2024-07"]);
    assert_eq!(out.trim(), "(no budgets for 2024-07)");
}

#[test]
fn budget_rejects_negative_limit_and_bad_month() {
    let home = logged_in_home();

    let mut cmd = fintrack_cmd();
    cmd.env("FINTRACK_HOME", home.path()).args([
        "budget",
        "set",
        "--category",
        "Rent",
        "--limit=-5",
    ]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("must not be negative"));

    let mut cmd = fintrack_cmd();
    cmd.env("FINTRACK_HOME", home.path()).args([
        "budget", "list", "--month", "2024-3",
    ]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Expected YYYY-MM"));
}
