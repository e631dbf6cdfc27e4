use assert_cmd::cargo::cargo_bin_cmd;

fn fixture(path: &str) -> String {
    format!("{}/tests/fixtures/{path}", env!("CARGO_MANIFEST_DIR"))
}

fn stdout_of(out: &assert_cmd::assert::Assert) -> String {
    String::from_utf8(out.get_output().stdout.clone()).expect("utf8")
}

#[test]
fn help_lists_apps_and_flags() {
    let mut cmd = cargo_bin_cmd!("deskapps");
    cmd.arg("--help");
    let out = cmd.assert().success();
    let stdout = stdout_of(&out);

    for app in ["guess", "words", "students", "atm", "contacts"] {
        assert!(stdout.contains(app), "help should mention {app}");
    }
    assert!(stdout.contains("--data-file"));
    assert!(stdout.contains("--seed"));
}

#[test]
fn students_session_persists_on_exit() {
    let temp = tempfile::tempdir().expect("tempdir");
    std::fs::copy(fixture("data/students.txt"), temp.path().join("students.txt")).expect("seed");

    let mut cmd = cargo_bin_cmd!("deskapps");
    cmd.arg("students")
        .arg("--config")
        .arg(fixture("configs/quiet.toml"))
        .arg("--working-dir")
        .arg(temp.path())
        .write_stdin("add Eve; 5; B\nremove 4\nsearch 1\nquit\n");
    let out = cmd.assert().success();
    let stdout = stdout_of(&out);
    assert!(stdout.contains("Student added: Name: Eve, Roll Number: 5, Grade: B"));
    assert!(stdout.contains("Student removed: Name: Dan, Roll Number: 4, Grade: C"));
    assert!(stdout.contains("Student found: Name: Alice, Roll Number: 1, Grade: A"));

    let saved = std::fs::read_to_string(temp.path().join("students.txt")).expect("read");
    assert_eq!(saved, "Alice,1,A\nEve,5,B\n");
}

#[test]
fn non_utf8_data_line_does_not_wipe_the_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let data_file = temp.path().join("students.txt");
    std::fs::write(&data_file, b"Alice,1,A\nBob,2,B\nJos\xe9,3,C\n").expect("seed");

    let mut cmd = cargo_bin_cmd!("deskapps");
    cmd.arg("students")
        .arg("--config")
        .arg(fixture("configs/quiet.toml"))
        .arg("--data-file")
        .arg(&data_file)
        .write_stdin("display\nadd Eve; 5; B\nquit\n");
    let stdout = stdout_of(&cmd.assert().success());
    assert!(!stdout.contains("warning"));
    assert!(stdout.contains("Name: Bob, Roll Number: 2, Grade: B"));

    let saved = std::fs::read_to_string(&data_file).expect("read");
    assert_eq!(saved, "Alice,1,A\nBob,2,B\nEve,5,B\n");
}

#[test]
fn non_utf8_input_line_is_rejected_and_earlier_edits_persist() {
    let temp = tempfile::tempdir().expect("tempdir");
    let data_file = temp.path().join("students.txt");

    let mut cmd = cargo_bin_cmd!("deskapps");
    cmd.arg("students")
        .arg("--config")
        .arg(fixture("configs/quiet.toml"))
        .arg("--data-file")
        .arg(&data_file)
        .write_stdin(b"add Eve; 5; B\nadd Jos\xe9; 6; C\nquit\n".to_vec());
    let stdout = stdout_of(&cmd.assert().success());
    assert!(stdout.contains("error: Input is not valid UTF-8."));

    let saved = std::fs::read_to_string(&data_file).expect("read");
    assert_eq!(saved, "Eve,5,B\n");
}

#[test]
fn contacts_session_saves_on_end_of_input() {
    let temp = tempfile::tempdir().expect("tempdir");
    let data_file = temp.path().join("book").join("people.txt");

    let mut cmd = cargo_bin_cmd!("deskapps");
    cmd.arg("contacts")
        .arg("--config")
        .arg(fixture("configs/quiet.toml"))
        .arg("--data-file")
        .arg(&data_file)
        .write_stdin("add Ann; 555; ann@example.com\nedit ann; ; ann@work.example\n");
    cmd.assert().success();

    let saved = std::fs::read_to_string(&data_file).expect("read");
    assert_eq!(saved, "Ann,555,ann@work.example\n");
}

#[test]
fn seeded_guess_sessions_replay_identically() {
    let script = "start\nguess abc\nguess 50\nguess 25\nguess 75\nscore\n";
    let run = || {
        let mut cmd = cargo_bin_cmd!("deskapps");
        cmd.arg("guess")
            .arg("--config")
            .arg(fixture("configs/quiet.toml"))
            .arg("--seed")
            .arg("11")
            .write_stdin(script);
        stdout_of(&cmd.assert().success())
    };
    let first = run();
    assert_eq!(first, run());
    assert!(first.contains("Invalid input. Please enter a valid number."));
}

#[test]
fn words_counts_from_stdin() {
    let mut cmd = cargo_bin_cmd!("deskapps");
    cmd.arg("words")
        .arg("--config")
        .arg(fixture("configs/quiet.toml"))
        .write_stdin("count the cat and the hat, the cat\nignore off\ncount the end\n");
    let stdout = stdout_of(&cmd.assert().success());
    assert!(stdout.contains("Word Count: 3"));
    assert!(stdout.contains("Word 'cat': 2 occurrences"));
    assert!(stdout.contains("Word Count: 2"));
}

#[test]
fn atm_writes_event_log_by_default() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut cmd = cargo_bin_cmd!("deskapps");
    cmd.arg("atm")
        .arg("--working-dir")
        .arg(temp.path())
        .write_stdin("deposit 100\nwithdraw 500\nbalance\n");
    let stdout = stdout_of(&cmd.assert().success());
    assert!(stdout.contains("error: Insufficient balance for withdrawal."));
    assert!(stdout.contains("Current Balance: 100"));

    let log = std::fs::read_to_string(temp.path().join(".deskapps/logs/atm.jsonl")).expect("log");
    assert!(log.contains("\"event_type\":\"session_start\""));
    assert!(log.contains("\"event_type\":\"command_rejected\""));
    assert!(log.contains("\"event_type\":\"session_end\""));
}

#[test]
fn data_file_is_rejected_for_apps_without_records() {
    let mut cmd = cargo_bin_cmd!("deskapps");
    cmd.arg("atm").arg("--data-file").arg("ledger.txt");
    cmd.assert().failure();
}

#[test]
fn invalid_config_exits_nonzero() {
    let mut cmd = cargo_bin_cmd!("deskapps");
    cmd.arg("guess")
        .arg("--config")
        .arg(fixture("configs/bad-range.toml"));
    cmd.assert().failure();

    let mut cmd = cargo_bin_cmd!("deskapps");
    cmd.arg("guess")
        .arg("--config")
        .arg(fixture("configs/missing.toml"));
    cmd.assert().failure();
}

#[test]
fn unknown_app_exits_nonzero() {
    let mut cmd = cargo_bin_cmd!("deskapps");
    cmd.arg("calculator");
    cmd.assert().failure();
}
