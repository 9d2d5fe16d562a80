use assert_cmd::Command;
use assert_fs::{prelude::*, TempDir};
use predicates::{prelude::PredicateBooleanExt, str::contains};

const BIN_NAME: &str = "checkbatch_cli";

fn cli(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin(BIN_NAME).expect("binary exists");
    cmd.env("CHECKBATCH_HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn configure_pdf_export(home: &TempDir) {
    let folder = home.child("proofs");
    for (key, value) in [
        ("delivery_mode", "pdf"),
        ("export_folder", folder.path().to_str().expect("utf-8 path")),
        ("settle_delay_ms", "0"),
        ("spool_delay_ms", "0"),
    ] {
        cli(home)
            .args(["config", "set", key, value])
            .assert()
            .success();
    }
}

#[test]
fn info_prints_build_metadata() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .arg("info")
        .assert()
        .success()
        .stdout(contains("version").and(contains("target")));
}

#[test]
fn commands_require_an_initialized_book() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .arg("ledgers")
        .assert()
        .failure()
        .stderr(contains("init"));
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let home = TempDir::new().unwrap();
    cli(&home).arg("init").assert().success();
    cli(&home).arg("init").assert().failure().stderr(contains("--force"));
    cli(&home).args(["init", "--force"]).assert().success();
}

#[test]
fn batch_run_exports_proofs_and_derives_balances() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .args(["init", "--starting-balance", "1000", "--first-check", "1001"])
        .assert()
        .success()
        .stdout(contains("Operating"));
    configure_pdf_export(&home);

    let queue = home.child("queue.json");
    queue
        .write_str(
            r#"[
                { "payee": "Acme", "amount": "100.00", "ledgerName": "Ops", "date": "06/01/2024" },
                { "payee": "", "amount": "50.00", "ledgerName": "Ops" },
                { "payee": "Bob", "amount": 75, "ledgerName": "ops", "memo": "Invoice 9" }
            ]"#,
        )
        .unwrap();
    cli(&home)
        .args(["import"])
        .arg(queue.path())
        .assert()
        .success()
        .stdout(contains("2 printable"));

    cli(&home)
        .arg("run")
        .assert()
        .success()
        .stdout(contains("2 of 3 printed").and(contains("next check number 1003")));

    home.child("proofs/check-1001.txt")
        .assert(predicates::str::contains("Acme"));
    home.child("proofs/check-1002.txt")
        .assert(predicates::str::contains("Seventy-Five and 00/100"));

    cli(&home)
        .arg("ledgers")
        .assert()
        .success()
        .stdout(contains("Ops").and(contains("-175.00")).and(contains("1000.00")));

    cli(&home)
        .args(["history", "--ledger", "OPS"])
        .assert()
        .success()
        .stdout(contains("Acme").and(contains("Bob")).and(contains("1002")));

    cli(&home)
        .arg("queue")
        .assert()
        .success()
        .stdout(contains("empty"));
}

#[test]
fn locked_ledger_rejects_new_starting_balance() {
    let home = TempDir::new().unwrap();
    cli(&home).arg("init").assert().success();
    cli(&home)
        .args(["ledger", "lock", "operating"])
        .assert()
        .success();
    cli(&home)
        .args(["ledger", "set-start", "Operating", "500"])
        .assert()
        .failure()
        .stderr(contains("locked"));
    cli(&home)
        .args(["deposit", "--amount", "$1,250.00"])
        .assert()
        .success();
    cli(&home)
        .arg("ledgers")
        .assert()
        .success()
        .stdout(contains("1250.00"));
}

#[test]
fn unknown_config_keys_are_rejected() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .args(["config", "set", "theme", "dark"])
        .assert()
        .failure()
        .stderr(contains("theme"));
    cli(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(contains("spool_delay_ms").and(contains("1200")));
}
