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

fn run_fail_err(home: &tempfile::TempDir, args: &[&str]) -> String {
    let mut cmd = fintrack_cmd();
    cmd.env("FINTRACK_HOME", home.path());
    cmd.args(args);
    let out = cmd.assert().failure().get_output().stderr.clone();
    String::from_utf8(out).expect("utf8 stderr")
}

#[test]
fn help_works() {
    let mut cmd = fintrack_cmd();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("personal finance tracker"));
}

#[test]
fn user_scoped_commands_require_login() {
    let home = tempfile::tempdir().expect("tempdir");
    let err = run_fail_err(&home, &["tx", "list"]);
    assert!(err.contains("Not logged in"), "stderr: {err}");

    let err = run_fail_err(&home, &["report"]);
    assert!(err.contains("Not logged in"), "stderr: {err}");
}

#[test]
fn login_creates_once_then_welcomes_back() {
    let home = tempfile::tempdir().expect("tempdir");

    let out = run_ok_out(
        &home,
        &["login", "--name", "Jane", "--email", "Jane@Example.com"],
    );
    assert_eq!(out.trim(), "Created new user: Jane (jane@example.com)");

    let out = run_ok_out(
        &home,
        &["login", "--name", "Jane", "--email", "jane@example.com"],
    );
    assert_eq!(out.trim(), "Welcome back, Jane!");

    let out = run_ok_out(&home, &["logout"]);
    assert_eq!(out.trim(), "Logged out.");
    let err = run_fail_err(&home, &["budget", "list"]);
    assert!(err.contains("Not logged in"), "stderr: {err}");

    let err = run_fail_err(
        &home,
        &["login", "--name", "Jane", "--email", "not-an-email"],
    );
    assert!(err.contains("Invalid email address"), "stderr: {err}");
}

#[test]
fn transactions_list_newest_first_and_validate_input() {
    let home = tempfile::tempdir().expect("tempdir");
    run_ok(
        &home,
        &["login", "--name", "Jane", "--email", "jane@example.com"],
    );

    let out = run_ok_out(&home, &["tx", "list"]);
    assert_eq!(out.trim(), "(no transactions)");

    for (amount, date) in [("10", "2024-03-02"), ("20", "2024-03-09"), ("30", "2024-03-05")] {
        run_ok(
            &home,
            &[
                "tx", "add", "--amount", amount, "--category", "Coffee", "--type", "EXPENSE",
                "--date", date, "-m", "latte",
            ],
        );
    }

    let tsv = run_ok_out(&home, &["tx", "list", "--format", "tsv", "--limit", "2"]);
    let lines: Vec<&str> = tsv.lines().collect();
    assert_eq!(
        lines,
        vec![
            "date\ttype\tcategory\tamount\tdescription\ttags",
            "2024-03-09\texpense\tCoffee\t20\tlatte\t",
            "2024-03-05\texpense\tCoffee\t30\tlatte\t",
        ]
    );

    let table = run_ok_out(&home, &["tx", "list"]);
    assert!(table.contains("-$20.00"), "table: {table}");

    let err = run_fail_err(
        &home,
        &["tx", "add", "--amount=-5", "--category", "Coffee", "--type", "expense"],
    );
    assert!(err.contains("must be greater than zero"), "stderr: {err}");

    let err = run_fail_err(
        &home,
        &["tx", "add", "--amount", "5", "--category", "Coffee", "--type", "transfer"],
    );
    assert!(err.contains("invalid value 'transfer'"), "stderr: {err}");
    assert!(err.contains("income, expense"), "stderr: {err}");

    let err = run_fail_err(
        &home,
        &[
            "tx", "add", "--amount", "5", "--category", "Coffee", "--type", "expense", "--date",
            "2024-02-30",
        ],
    );
    assert!(err.contains("Invalid date"), "stderr: {err}");

    let err = run_fail_err(
        &home,
        &["tx", "add", "--amount", "5.005", "--category", "Coffee", "--type", "expense"],
    );
    assert!(err.contains("two decimal places"), "stderr: {err}");
}

#[test]
fn profile_set_only_changes_given_fields() {
    let home = tempfile::tempdir().expect("tempdir");
    run_ok(
        &home,
        &["login", "--name", "Jane", "--email", "jane@example.com"],
    );

    let out = run_ok_out(&home, &["profile", "show"]);
    assert_eq!(out.trim(), "(no profile)");

    let out = run_ok_out(
        &home,
        &[
            "profile",
            "set",
            "--occupation",
            "Teacher",
            "--risk-tolerance",
            "LOW",
            "--annual-income",
            "45600",
        ],
    );
    assert!(out.contains("Profile created for Jane."), "output: {out}");

    let out = run_ok_out(&home, &["profile", "set", "--dark-mode", "true"]);
    assert!(out.contains("Profile updated for Jane."), "output: {out}");

    let out = run_ok_out(&home, &["profile", "show"]);
    assert!(out.contains("Teacher"), "profile: {out}");
    assert!(out.contains("low"), "profile: {out}");
    assert!(out.contains("$45,600.00"), "profile: {out}");
    let dark = out
        .lines()
        .find(|l| l.contains("Dark mode"))
        .expect("dark mode line");
    assert!(dark.trim_end().ends_with("on"), "profile: {out}");

    let err = run_fail_err(&home, &["profile", "set", "--risk-tolerance", "yolo"]);
    assert!(err.contains("invalid value 'yolo'"), "stderr: {err}");
    assert!(err.contains("low, medium, high"), "stderr: {err}");
}

#[test]
fn user_settings_update_and_show() {
    let home = tempfile::tempdir().expect("tempdir");
    run_ok(
        &home,
        &["login", "--name", "Jane", "--email", "jane@example.com"],
    );

    let out = run_ok_out(
        &home,
        &["user", "set", "--currency", "eur", "--monthly-income", "5000"],
    );
    assert!(
        out.contains("Updated Jane: currency EUR, monthly income $5,000.00"),
        "output: {out}"
    );

    let out = run_ok_out(&home, &["user", "show"]);
    assert!(out.contains("jane@example.com"), "show: {out}");
    assert!(out.contains("EUR"), "show: {out}");
    assert!(out.contains("(no profile)"), "show: {out}");

    let err = run_fail_err(&home, &["user", "set"]);
    assert!(err.contains("Nothing to update"), "stderr: {err}");
}

#[test]
fn deleting_the_user_removes_their_data_and_logs_out() {
    let home = tempfile::tempdir().expect("tempdir");
    run_ok(
        &home,
        &["login", "--name", "Jane", "--email", "jane@example.com"],
    );
    run_ok(
        &home,
        &[
            "tx", "add", "--amount", "1200", "--category", "Rent", "--type", "expense", "--date",
            "2024-03-01",
        ],
    );
    run_ok(
        &home,
        &[
            "budget", "set", "--category", "Rent", "--limit", "1200", "--month", "2024-03",
        ],
    );
    run_ok(
        &home,
        &["goal", "add", "--name", "Vacation", "--target", "3000"],
    );
    run_ok(&home, &["profile", "set", "--occupation", "Teacher"]);

    // Declining the prompt keeps everything.
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("fintrack"));
    cmd.env("FINTRACK_HOME", home.path())
        .args(["user", "delete"])
        .write_stdin("n\n");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Cancelled."));

    let out = run_ok_out(&home, &["user", "delete", "--yes"]);
    assert_eq!(
        out.trim(),
        "Deleted user jane@example.com (1 transactions, 1 budgets, 1 savings goals)."
    );

    let err = run_fail_err(&home, &["tx", "list"]);
    assert!(err.contains("Not logged in"), "stderr: {err}");

    let out = run_ok_out(
        &home,
        &["login", "--name", "Jane", "--email", "jane@example.com"],
    );
    assert!(out.contains("Created new user"), "login: {out}");
    assert_eq!(run_ok_out(&home, &["tx", "list"]).trim(), "(no transactions)");
    assert_eq!(run_ok_out(&home, &["goal", "list"]).trim(), "(no savings goals)");
    assert_eq!(run_ok_out(&home, &["profile", "show"]).trim(), "(no profile)");
}

#[test]
fn seed_is_idempotent_for_reference_data() {
    let home = tempfile::tempdir().expect("tempdir");
    run_ok(
        &home,
        &["login", "--name", "Jane", "--email", "jane@example.com"],
    );

    let out = run_ok_out(&home, &["seed", "--months", "2"]);
    assert_eq!(
        out.trim(),
        "Seeded 12 tags, 14 budgets, 3 savings goals and 18 transactions."
    );

    let out = run_ok_out(&home, &["seed", "--months", "2"]);
    assert_eq!(
        out.trim(),
        "Seeded 0 tags, 0 budgets, 0 savings goals and 18 transactions."
    );

    let budgets = run_ok_out(&home, &["budget", "list", "--format", "tsv"]);
    assert_eq!(budgets.lines().count(), 8, "budgets: {budgets}");

    let report = run_ok_out(&home, &["report"]);
    assert!(report.contains("Financial report for"), "report: {report}");
}

#[test]
fn seed_months_must_be_in_range() {
    let home = tempfile::tempdir().expect("tempdir");
    run_ok(
        &home,
        &["login", "--name", "Jane", "--email", "jane@example.com"],
    );

    let err = run_fail_err(&home, &["seed", "--months", "0"]);
    assert!(err.contains("invalid value '0'"), "stderr: {err}");

    let err = run_fail_err(&home, &["seed", "--months", "4294967295"]);
    assert!(err.contains("invalid value '4294967295'"), "stderr: {err}");

    assert_eq!(run_ok_out(&home, &["tag", "list"]).trim(), "(no tags)");
}
