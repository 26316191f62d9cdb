use assert_cmd::Command;
use std::io::Write;

const ROUTER: &str = "matrix-smart";

fn settings_file(rooms: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "[server]\nMATRIX_SERVER = https://matrix.example.org\nMATRIX_TOKEN = secret\n\n[rooms]\n{rooms}"
    )
    .unwrap();
    file
}

fn router(settings: &tempfile::NamedTempFile) -> Command {
    let mut cmd = Command::cargo_bin(ROUTER).unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("LOG_LEVEL")
        .arg("--log.format=text")
        .arg("--matrix-config")
        .arg(settings.path());
    cmd
}

#[test]
fn too_few_parameters_is_a_usage_error() {
    let settings = settings_file("default = !general:example.org\n");
    let assert = router(&settings).args(["ops", "subject"]).assert().code(2);

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("usage"), "{stdout}");
}

#[test]
fn unreadable_settings_is_a_configuration_error() {
    let mut cmd = Command::cargo_bin(ROUTER).unwrap();
    cmd.env_remove("RUST_LOG")
        .arg("--matrix-config=/nonexistent/matrix.ini")
        .args(["ops", "route=disk_space", "Disk space is low", "details"])
        .assert()
        .code(2);
}

#[test]
fn dry_run_routes_by_tag() {
    let settings = settings_file(
        "default = !general:example.org\ndisk_space = !disk:example.org\npc_down = !down:example.org\n",
    );
    let assert = router(&settings)
        .arg("--dry-run")
        .args([
            "ops",
            "route:disk_space",
            "Zabbix agent is not available",
            "details",
        ])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("route=!disk:example.org"), "{stdout}");
}

#[test]
fn dry_run_with_legacy_parameters_routes_by_subject() {
    let settings = settings_file(
        "default = !general:example.org\nlogin_failures = !auth:example.org\n",
    );
    let assert = router(&settings)
        .arg("--dry-run")
        .args(["ops", "SSH failed login for user admin", "details"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("route=!auth:example.org"), "{stdout}");
}

#[test]
fn missing_default_room_fails_the_send() {
    let settings = settings_file("disk_space = !disk:example.org\n");
    let assert = router(&settings)
        .arg("--dry-run")
        .args(["ops", "", "Something unexpected", "details"])
        .assert()
        .code(1);

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("missing 'default'"), "{stdout}");
}
