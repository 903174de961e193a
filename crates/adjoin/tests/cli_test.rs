#![allow(deprecated)] // TODO: cargo_bin → cargo_bin_cmd! へ移行

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// 一時ディレクトリで、グローバル設定の影響を受けずに実行するコマンド
fn adjoin(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("adjoin").unwrap();
    cmd.current_dir(dir)
        .env_remove("ADJOIN_CONFIG_PATH")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .env("XDG_CONFIG_HOME", dir.join("config-home"));
    cmd
}

fn project(kdl: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("adjoin.kdl"), kdl).unwrap();
    dir
}

const TWO_STACKS: &str = r#"
stack "Alpha" {
    domain "alpha.corp"
}
stack "Beta" {
    domain "beta.corp"
    instance-type "m5.large"
}
"#;

/// CLIヘルプが正しく表示されることを確認
#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("adjoin").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("synth"))
        .stdout(predicate::str::contains("diff"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("validate"));
}

/// バージョン表示が正しく動作することを確認
#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("adjoin").unwrap();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("adjoin "));
}

/// synthコマンドのヘルプが正しく表示されることを確認
#[test]
fn test_synth_help() {
    let mut cmd = Command::cargo_bin("adjoin").unwrap();
    cmd.args(["synth", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[STACK]"))
        .stdout(predicate::str::contains("--output"))
        .stdout(predicate::str::contains("--domain"))
        .stdout(predicate::str::contains("--json"));
}

/// 不正なコマンドでエラーになることを確認
#[test]
fn test_invalid_command() {
    let mut cmd = Command::cargo_bin("adjoin").unwrap();
    cmd.arg("invalid-command").assert().failure();
}

/// 設定ファイルがなければデフォルトのスタックを合成する
#[test]
fn test_synth_default_stack() {
    let dir = tempfile::tempdir().unwrap();
    adjoin(dir.path())
        .arg("synth")
        .assert()
        .success()
        .stdout(predicate::str::contains("AWS::DirectoryService::MicrosoftAD"))
        .stdout(predicate::str::contains("example.corp"))
        .stderr(predicate::str::contains("AdFsxStack"));

    let out = dir.path().join("cdk.out");
    assert!(out.join("manifest.json").exists());
    assert!(out.join("AdFsxStack.template.json").exists());
}

/// --json の出力はJSONとして読める
#[test]
fn test_synth_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = adjoin(dir.path())
        .args(["synth", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let template: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(template["Outputs"].as_object().unwrap().len(), 4);
    assert_eq!(
        template["Resources"]["ad"]["Type"],
        "AWS::DirectoryService::MicrosoftAD"
    );
}

/// -q ではテンプレートを表示しない
#[test]
fn test_synth_quiet() {
    let dir = tempfile::tempdir().unwrap();
    adjoin(dir.path())
        .args(["synth", "-q", "-o", "out"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert!(dir.path().join("out/AdFsxStack.template.json").exists());
}

/// 同じ入力からは同じテンプレートが得られる
#[test]
fn test_synth_is_deterministic() {
    let dir = project(TWO_STACKS);
    let first = adjoin(dir.path()).args(["synth", "--json"]).output().unwrap();
    let second = adjoin(dir.path()).args(["synth", "--json"]).output().unwrap();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

/// スタック名を指定するとそのスタックだけを合成する
#[test]
fn test_synth_named_stack() {
    let dir = project(TWO_STACKS);
    adjoin(dir.path())
        .args(["synth", "Beta"])
        .assert()
        .success()
        .stdout(predicate::str::contains("beta.corp"))
        .stdout(predicate::str::contains("m5.large"))
        .stdout(predicate::str::contains("alpha.corp").not());

    let out = dir.path().join("cdk.out");
    assert!(out.join("Beta.template.json").exists());
    assert!(!out.join("Alpha.template.json").exists());
}

/// 一部のスタックだけ合成し直してもマニフェストには全スタックが残る
#[test]
fn test_synth_named_stack_keeps_manifest() {
    let dir = project(TWO_STACKS);
    adjoin(dir.path()).args(["synth", "-q"]).assert().success();
    adjoin(dir.path())
        .args(["synth", "Beta", "-q"])
        .assert()
        .success()
        .stderr(predicate::str::contains("1個のスタック"));

    let manifest = fs::read_to_string(dir.path().join("cdk.out/manifest.json")).unwrap();
    let manifest: serde_json::Value = serde_json::from_str(&manifest).unwrap();
    let artifacts: Vec<&String> = manifest["artifacts"].as_object().unwrap().keys().collect();
    assert_eq!(artifacts, vec!["Alpha", "Beta"]);
}

/// CloudFormationのスタック名として使えない名前は出力先の外に書き出さない
#[test]
fn test_synth_rejects_path_like_stack_name() {
    let dir = project("stack \"../escaped\"\n");
    adjoin(dir.path())
        .args(["synth", "-q"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("../escaped"));

    assert!(!dir.path().join("escaped.template.json").exists());
}

/// 存在しないスタック名はエラー
#[test]
fn test_synth_unknown_stack() {
    let dir = project(TWO_STACKS);
    adjoin(dir.path())
        .args(["synth", "Gamma"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Gamma"));
}

/// --domain でドメイン名を上書きできる
#[test]
fn test_synth_domain_override() {
    let dir = tempfile::tempdir().unwrap();
    adjoin(dir.path())
        .args(["synth", "--domain", "corp.example.net"])
        .assert()
        .success()
        .stdout(predicate::str::contains("corp.example.net"))
        .stdout(predicate::str::contains("example.corp").not());
}

/// -c で設定ファイルを指定できる
#[test]
fn test_synth_with_explicit_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("custom.kdl");
    fs::write(&config, "stack \"Custom\" { domain \"custom.corp\"; }").unwrap();

    adjoin(dir.path())
        .arg("synth")
        .arg("-c")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.corp"));
}

/// ADJOIN_CONFIG_PATH が存在しないファイルを指すとエラー
#[test]
fn test_missing_config_from_env() {
    let dir = tempfile::tempdir().unwrap();
    adjoin(dir.path())
        .env("ADJOIN_CONFIG_PATH", dir.path().join("missing.kdl"))
        .arg("synth")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.kdl"));
}

/// 合成前の diff は全リソースを作成として表示し、合成後は変更なし
#[test]
fn test_diff_before_and_after_synth() {
    let dir = tempfile::tempdir().unwrap();
    adjoin(dir.path())
        .arg("diff")
        .assert()
        .success()
        .stdout(predicate::str::contains("+ ad (AWS::DirectoryService::MicrosoftAD)"))
        .stdout(predicate::str::contains("前回の合成結果なし"));

    adjoin(dir.path()).args(["synth", "-q"]).assert().success();

    adjoin(dir.path())
        .arg("diff")
        .assert()
        .success()
        .stdout(predicate::str::contains("変更はありません"));
}

/// 設定変更は更新として表示される
#[test]
fn test_diff_shows_update() {
    let dir = project("stack \"AdFsxStack\"\n");
    adjoin(dir.path()).args(["synth", "-q"]).assert().success();

    fs::write(
        dir.path().join("adjoin.kdl"),
        "stack \"AdFsxStack\" { document-name \"corp-join\"; }\n",
    )
    .unwrap();
    adjoin(dir.path())
        .arg("diff")
        .assert()
        .success()
        .stdout(predicate::str::contains("~ domainJoinDoc (AWS::SSM::Document)"))
        .stdout(predicate::str::contains("Name"));
}

/// list は設定されたスタック名を宣言順に表示
#[test]
fn test_list_stacks() {
    let dir = project(TWO_STACKS);
    adjoin(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::is_match("(?s)Alpha.*Beta").unwrap());
}

/// 正しい設定は検証に成功する
#[test]
fn test_validate_success() {
    let dir = project(TWO_STACKS);
    adjoin(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("設定ファイルは正常です"))
        .stdout(predicate::str::contains("スタック: 2個"));
}

/// 不正な設定は検証に失敗する
#[test]
fn test_validate_invalid_config() {
    let dir = project("stack \"Bad\" { instance-type \"huge\"; }\n");
    adjoin(dir.path())
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("設定エラー"));
}

/// プライベートサブネットが足りない構成は警告付きで検証に通る
#[test]
fn test_validate_warns_on_single_az() {
    let dir = project("stack \"Narrow\" { vpc { max-azs 1; } }\n");
    adjoin(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("プライベートサブネットが2つ未満"));
}
