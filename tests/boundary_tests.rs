use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn simulate(principal: &str, rate: &str, term: &str, start: &str) -> Command {
    let mut cmd = Command::new(cargo_bin!("microloan"));
    cmd.args([
        "simulate",
        "--principal",
        principal,
        "--rate",
        rate,
        "--term",
        term,
        "--start",
        start,
    ]);
    cmd
}

#[test]
fn test_month_end_start_date_clamps() {
    simulate("3000", "10", "3", "2024-01-31")
        .assert()
        .success()
        .stdout(predicate::str::contains("1,2024-02-29,"))
        .stdout(predicate::str::contains("2,2024-03-31,"))
        .stdout(predicate::str::contains("3,2024-04-30,"))
        .stdout(predicate::str::contains("2024-03-02").not());
}

#[test]
fn test_interest_free_schedule() {
    simulate("1000", "0", "3", "2024-05-10")
        .assert()
        .success()
        .stdout(predicate::str::contains("1,2024-06-10,333.33,333.33,0.00,666.67"))
        .stdout(predicate::str::contains("3,2024-08-10,333.33,333.33,0.00,0.00"));
}

#[test]
fn test_long_term_closes_at_zero() {
    simulate("250000", "6.5", "360", "2024-01-01")
        .assert()
        .success()
        .stdout(predicate::str::contains("1,2024-02-01,1580.17,"))
        .stdout(predicate::str::contains("360,2054-01-01,").and(predicate::str::ends_with(",0.00\n")));
}

#[test]
fn test_zero_decimal_currency() {
    let output = simulate("600000", "30", "6", "2024-01-01")
        .args(["--scale", "0"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    for line in stdout.lines().skip(1) {
        assert!(!line.contains('.'), "unexpected minor units in {line}");
    }
    assert!(stdout.lines().last().unwrap().ends_with(",0"));
}

#[test]
fn test_sub_cent_principal_rejected() {
    simulate("100.005", "5", "6", "2024-01-01")
        .assert()
        .failure()
        .stderr(predicate::str::contains("principal"));
}

#[test]
fn test_invalid_start_date_rejected() {
    simulate("1000", "5", "6", "2024-02-30")
        .assert()
        .failure()
        .stderr(predicate::str::contains("start_date"));
}
