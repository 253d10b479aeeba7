//! End-to-end tests driving the `cb` binary against temp contacts files.

use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cb(file: &Path) -> Command {
    let mut cmd = Command::cargo_bin("cb").unwrap();
    cmd.env_remove("CB_FILE")
        .env_remove("RUST_LOG")
        .arg("--file")
        .arg(file);
    cmd
}

fn json_out(cmd: &mut Command) -> Value {
    let output = cmd.arg("--json").output().unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn json_err(cmd: &mut Command) -> (i32, Value) {
    let output = cmd.arg("--json").output().unwrap();
    let code = output.status.code().unwrap();
    // warnings may precede the error object
    let stderr = String::from_utf8(output.stderr).unwrap();
    let last = stderr.lines().rev().find(|l| !l.trim().is_empty()).unwrap();
    (code, serde_json::from_str(last).unwrap())
}

fn init(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("contacts.txt");
    cb(&path).arg("init").assert().success();
    path
}

fn add(path: &Path, first: &str, phone: &str, birthday: Option<&str>) {
    let mut cmd = cb(path);
    cmd.args(["add", first, "Иванов", phone, "ivan@test.ru"]);
    if let Some(b) = birthday {
        cmd.args(["--birthday", b]);
    }
    cmd.assert().success();
}

#[test]
fn test_init_add_list() {
    let dir = TempDir::new().unwrap();
    let path = init(&dir);

    add(&path, "Иван", "+79991234567", None);
    add(&path, "Анна", "+79161234567", Some("15.06"));

    let list = json_out(cb(&path).arg("list"));
    assert_eq!(list["count"], 2);
    assert_eq!(list["contacts"][0]["id"], 0);
    assert_eq!(list["contacts"][0]["date_of_birth"], "unknown");
    assert_eq!(list["contacts"][1]["first_name"], "Анна");
    assert_eq!(list["contacts"][1]["date_of_birth"], "15.06");

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "[0] [Иван] [Иванов] [+79991234567] [ivan@test.ru]\n\
         [1] [Анна] [Иванов] [+79161234567] [ivan@test.ru]\n"
    );
}

#[test]
fn test_init_refuses_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = init(&dir);

    let (code, err) = json_err(cb(&path).arg("init"));
    assert_eq!(code, 2);
    assert_eq!(err["error"]["code"], "ALREADY_INITIALIZED");

    cb(&path).args(["init", "--force"]).assert().success();
}

#[test]
fn test_missing_file_and_no_file() {
    let dir = TempDir::new().unwrap();

    let (code, err) = json_err(cb(&dir.path().join("absent.txt")).arg("list"));
    assert_eq!(code, 2);
    assert_eq!(err["error"]["code"], "CONTACTS_FILE_NOT_FOUND");

    let output = Command::cargo_bin("cb")
        .unwrap()
        .env_remove("CB_FILE")
        .args(["list", "--json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_invalid_add_does_not_touch_file() {
    let dir = TempDir::new().unwrap();
    let path = init(&dir);
    add(&path, "Иван", "+79991234567", None);
    let before = fs::read_to_string(&path).unwrap();

    let (code, err) = json_err(cb(&path).args(["add", "Иван", "Иванов", "89991234567", "ivan@test.ru"]));
    assert_eq!(code, 4);
    assert_eq!(err["error"]["code"], "VALIDATION_FAILED");
    assert_eq!(err["error"]["retryable"], true);

    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_removed_id_is_reused() {
    let dir = TempDir::new().unwrap();
    let path = init(&dir);
    for phone in ["+70000000000", "+70000000001", "+70000000002"] {
        add(&path, "Иван", phone, None);
    }

    cb(&path).args(["remove", "1"]).assert().success();
    add(&path, "Олег", "+70000000003", None);

    let list = json_out(cb(&path).arg("list"));
    let ids: Vec<u64> = list["contacts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![0, 2, 1]);

    let (code, err) = json_err(cb(&path).args(["remove", "9"]));
    assert_eq!(code, 3);
    assert_eq!(err["error"]["code"], "CONTACT_NOT_FOUND");
}

#[test]
fn test_freed_id_beats_lower_gap_across_runs() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("contacts.txt");
    fs::write(
        &path,
        "[0] [Иван] [Иванов] [+70000000000] [ivan@test.ru]\n\
         [2] [Анна] [Смирнова] [+70000000002] [anna@mail.ru]\n\
         [5] [Петр] [Петров] [+70000000005] [petr@ya.ru]\n",
    )
    .unwrap();

    cb(&path).args(["remove", "5"]).assert().success();

    let added = json_out(cb(&path).args(["add", "Олег", "Олегов", "+70000000009", "o@x.ru"]));
    assert_eq!(added["contact"]["id"], 5);

    let next = json_out(cb(&path).args(["add", "Олег", "Олегов", "+70000000010", "o@x.ru"]));
    assert_eq!(next["contact"]["id"], 1);

    cb(&path).args(["init", "--force"]).assert().success();
    assert!(!dir.path().join("contacts.txt.free.json").exists());
}

#[test]
fn test_edit_with_field_synonym() {
    let dir = TempDir::new().unwrap();
    let path = init(&dir);
    add(&path, "Иван", "+79991234567", None);

    let edited = json_out(cb(&path).args(["edit", "0", "телефон", "+70000000001"]));
    assert_eq!(edited["contact"]["phone"], "+70000000001");

    let (code, err) = json_err(cb(&path).args(["edit", "0", "colour", "red"]));
    assert_eq!(code, 4);
    assert_eq!(err["error"]["code"], "UNKNOWN_FIELD");
}

#[test]
fn test_search_and_filter() {
    let dir = TempDir::new().unwrap();
    let path = init(&dir);

    let empty = json_out(cb(&path).args(["search", "first_name", "ан"]));
    assert_eq!(empty["outcome"], "empty_registry");

    add(&path, "Анна", "+79161234567", None);
    add(&path, "Иван", "+79991234567", None);

    let found = json_out(cb(&path).args(["search", "имя", "АН"]));
    assert_eq!(found["outcome"], "matches");
    assert_eq!(found["count"], 2);

    let none = json_out(cb(&path).args(["search", "phone", "555"]));
    assert_eq!(none["outcome"], "no_matches");

    let (code, err) = json_err(cb(&path).args(["search", "email", "test"]));
    assert_eq!(code, 4);
    assert_eq!(err["error"]["code"], "FIELD_NOT_ALLOWED");

    let filtered = json_out(cb(&path).args(["filter", "email", "TEST.RU"]));
    assert_eq!(filtered["count"], 2);

    let (code, err) = json_err(cb(&path).args(["search", "phone", "  "]));
    assert_eq!(code, 4);
    assert_eq!(err["error"]["code"], "INVALID_ARGUMENT");
}

#[test]
fn test_sort_by_birth_date_puts_unknown_last() {
    let dir = TempDir::new().unwrap();
    let path = init(&dir);
    add(&path, "Иван", "+70000000000", None);
    add(&path, "Анна", "+70000000001", Some("20.12"));
    add(&path, "Петр", "+70000000002", Some("01.03"));

    let output = cb(&path)
        .args(["sort", "Дата рождения", "--format", "csv"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let csv = String::from_utf8(output.stdout).unwrap();
    let firsts: Vec<&str> = csv
        .lines()
        .skip(1)
        .map(|line| line.split(',').nth(1).unwrap())
        .collect();
    assert_eq!(firsts, vec!["Петр", "Анна", "Иван"]);
}

#[test]
fn test_upcoming_week() {
    let dir = TempDir::new().unwrap();
    let path = init(&dir);
    add(&path, "Анна", "+70000000001", Some("15.06"));
    add(&path, "Петр", "+70000000002", Some("20.06"));

    let report = json_out(cb(&path).args(["upcoming", "--today", "2025-06-10"]));
    assert_eq!(report["week_start"], "2025-06-09");
    assert_eq!(report["week_end"], "2025-06-15");
    let upcoming = report["upcoming"].as_array().unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0]["contact"]["first_name"], "Анна");
    assert_eq!(upcoming[0]["date"], "2025-06-15");

    let (code, _) = json_err(cb(&path).args(["upcoming", "--today", "10.06.2025"]));
    assert_eq!(code, 4);
}

#[test]
fn test_breakdown() {
    let dir = TempDir::new().unwrap();
    let path = init(&dir);
    add(&path, "Иван", "+70000000000", None);
    add(&path, "Иван", "+70000000001", None);
    add(&path, "Анна", "+70000000002", None);

    let shares = json_out(cb(&path).arg("breakdown"));
    assert_eq!(shares[0]["name"], "Иван");
    assert_eq!(shares[0]["count"], 2);
    assert_eq!(shares[0]["percentage"], 66.7);
    assert_eq!(shares[1]["percentage"], 33.3);
}

#[test]
fn test_birthday_set_and_clear() {
    let dir = TempDir::new().unwrap();
    let path = init(&dir);
    add(&path, "Иван", "+70000000000", None);

    let set = json_out(cb(&path).args(["birthday", "0", "01.09"]));
    assert_eq!(set["contact"]["date_of_birth"], "01.09");

    let (code, _) = json_err(cb(&path).args(["birthday", "0", "1.9"]));
    assert_eq!(code, 4);

    let cleared = json_out(cb(&path).args(["birthday", "0"]));
    assert_eq!(cleared["contact"]["date_of_birth"], "unknown");
}

#[test]
fn test_version() {
    let output = Command::cargo_bin("cb")
        .unwrap()
        .env_remove("CB_FILE")
        .args(["version", "--json"])
        .output()
        .unwrap();
    let version: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(version["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(version["binary"], "cb");
    assert!(version.get("contacts_file").is_none());

    let dir = TempDir::new().unwrap();
    let path = init(&dir);
    add(&path, "Иван", "+70000000000", Some("01.09"));
    let version = json_out(cb(&path).arg("version"));
    assert_eq!(version["contacts_file"]["exists"], true);
    assert!(version["contacts_file"]["birthdays"].is_string());
    assert!(version["contacts_file"].get("free_ids").is_none());
}
