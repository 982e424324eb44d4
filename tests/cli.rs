//! `dine` バイナリを実際に起動して確認する

use std::process::{Command as StdCommand, Stdio};
use std::thread;
use std::time::Duration;

use assert_cmd::Command;
use predicates::prelude::*;

fn dine() -> Command {
    let mut cmd = Command::cargo_bin("dine").expect("binary built");
    cmd.env_remove("RUST_LOG").env_remove("DINE_DAWDLE_MS");
    cmd
}

fn border(n: usize) -> String {
    format!("|{}", "=============|".repeat(n))
}

#[test]
fn five_philosophers_one_cycle() {
    let out = dine()
        .args(["1", "--dawdle-ms", "2"])
        .timeout(Duration::from_secs(30))
        .output()
        .unwrap();
    assert!(out.status.success());

    let stdout = String::from_utf8(out.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], border(5));
    assert_eq!(
        lines[1],
        "| A           | B           | C           | D           | E           | "
    );
    assert_eq!(lines[2], border(5));
    assert_eq!(lines[3], format!("| {}", "-----       | ".repeat(5)));
    // 各自 10 行 + footer
    assert_eq!(lines.len(), 4 + 5 * 10 + 1);
    assert_eq!(*lines.last().unwrap(), border(5));
    // 全員何も持たずに終わる
    assert_eq!(lines[lines.len() - 2], format!("| {}", "-----       | ".repeat(5)));

    for id in 0..5 {
        let eats = lines
            .iter()
            .filter(|l| l.split("| ").nth(id + 1).is_some_and(|c| c.contains("Eat")))
            .count();
        assert!(eats >= 1, "philosopher {id} never ate");
    }
}

// 使い方の誤りは終了コード 1、表は出さず、stderr に Usage 行を出す
fn assert_usage_error(args: &[&str]) {
    dine()
        .args(args)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Usage: dine"));
}

#[test]
fn zero_cycles_is_usage_error() {
    assert_usage_error(&["0"]);
    dine()
        .arg("0")
        .assert()
        .stderr(predicate::str::contains("invalid value '0'"));
}

#[test]
fn non_numeric_cycles_is_usage_error() {
    assert_usage_error(&["abc"]);
}

#[test]
fn negative_and_huge_cycles_are_usage_errors() {
    assert_usage_error(&["-1"]);
    assert_usage_error(&["2147483648"]);
}

#[test]
fn ring_size_out_of_range_is_usage_error() {
    assert_usage_error(&["1", "-n", "1"]);
    assert_usage_error(&["1", "-n", "27"]);
}

#[test]
fn usage_line_is_printed_once() {
    // clap 自身が Usage を出すエラーでも重複させない
    let out = dine().arg("-1").output().unwrap();
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert_eq!(stderr.matches("Usage:").count(), 1, "{stderr}");
}

#[test]
fn output_failure_is_reported_once() {
    // /dev/full への書き込みは ENOSPC で失敗する
    let full = std::fs::OpenOptions::new()
        .write(true)
        .open("/dev/full")
        .unwrap();
    let out = StdCommand::new(assert_cmd::cargo::cargo_bin("dine"))
        .args(["1", "--dawdle-ms", "0"])
        .env_remove("RUST_LOG")
        .stdout(Stdio::from(full))
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));

    let stderr = String::from_utf8(out.stderr).unwrap();
    assert_eq!(stderr.matches("status output").count(), 1, "{stderr}");
}

#[test]
fn help_exits_zero() {
    dine()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("philosophers"));
}

#[test]
fn two_philosophers_hundred_cycles() {
    dine()
        .args(["100", "-n", "2", "--dawdle-ms", "1"])
        .timeout(Duration::from_secs(60))
        .assert()
        .success()
        .stdout(predicate::str::ends_with(format!("{}\n", border(2))));
}

#[test]
fn dawdle_from_environment() {
    dine()
        .env("DINE_DAWDLE_MS", "0")
        .args(["3", "-n", "3"])
        .timeout(Duration::from_secs(30))
        .assert()
        .success();
}

#[test]
fn sigusr1_does_not_disturb_the_run() {
    let child = StdCommand::new(assert_cmd::cargo::cargo_bin("dine"))
        .args(["10", "--dawdle-ms", "50", "--seed", "1"])
        .env_remove("RUST_LOG")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    thread::sleep(Duration::from_millis(200));
    for _ in 0..3 {
        let rc = unsafe { libc::kill(child.id() as libc::pid_t, libc::SIGUSR1) };
        assert_eq!(rc, 0);
        thread::sleep(Duration::from_millis(50));
    }

    let out = child.wait_with_output().unwrap();
    assert!(out.status.success());

    let stdout = String::from_utf8(out.stdout).unwrap();
    assert_eq!(stdout.lines().last(), Some(border(5).as_str()));
    assert_eq!(stdout.lines().count(), 4 + 5 * (2 + 10 * 8) + 1);

    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("dine::status"), "{stderr}");
}
