use std::io::Write;

use assert_cmd::Command;
use predicates as pred;
use tempfile::NamedTempFile;

fn actions_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    write!(file, "{}", contents).unwrap();
    file
}

#[test]
fn end_to_end_outputs_expected_balances() {
    // bob trusts alice for 50 and funds her; the over-draw and the
    // unknown action are rejected without stopping the run
    let file = actions_file(
        "type, user, amount, counterparty\n\
    register, alice, ,\n\
    register, bob, ,\n\
    deposit, bob, 200,\n\
    trust, bob, 50, alice\n\
    borrow, alice, 51, bob\n\
    borrow, alice, 50, bob\n\
    repay, alice, 20, bob\n\
    chah, alice,\n\
    trust, bob, -25, alice\n\
    trust, bob, -10, alice\n",
    );

    let exe = env!("CARGO_BIN_EXE_trust-ledger");
    let mut cmd = Command::new(exe);
    cmd.arg(file.path()).arg("--no-save");

    cmd.assert()
        .success()
        .stdout(pred::str::contains("user,free,available,credit_limit,debt,lent"))
        .stdout(pred::str::contains("alice,0,30,10,30,0"))
        .stdout(pred::str::contains("bob,200,170,0,0,30"))
        .stderr(pred::str::contains("action rejected"));
}

#[test]
fn snapshot_carries_state_between_runs() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("ledger.json");

    let first = actions_file(
        "type,user,amount,counterparty\n\
         register,alice,,\n\
         register,bob,,\n\
         register,carol,,\n\
         deposit,bob,100,\n\
         deposit,carol,100,\n\
         trust,bob,,alice:10\n\
         trust,carol,,alice:20\n\
         borrow,alice,10,\n",
    );
    Command::new(env!("CARGO_BIN_EXE_trust-ledger"))
        .arg(first.path())
        .arg("--snapshot")
        .arg(&snapshot)
        .assert()
        .success();
    assert!(snapshot.exists());

    let second = actions_file(
        "type,user,amount,counterparty\n\
         repay,alice,,bob:3;carol:7\n",
    );
    Command::new(env!("CARGO_BIN_EXE_trust-ledger"))
        .arg(second.path())
        .arg("--snapshot")
        .arg(&snapshot)
        .assert()
        .success()
        .stdout(pred::str::contains("alice,0,0,30,0,0"))
        .stdout(pred::str::contains("bob,100,100,0,0,0"))
        .stdout(pred::str::contains("carol,100,100,0,0,0"));
}
