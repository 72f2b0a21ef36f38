use std::fs::File;
use std::io::Write;

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;
use zip::write::FileOptions;

fn jpath(cwd: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("jpath"));
    cmd.current_dir(cwd.path())
        .env_remove("JPATH_CONFIG")
        .env_remove("CLASSPATH")
        .env_remove("RUST_LOG")
        .arg("--no-image");
    cmd
}

/// `classes/` holds `t/T.class` and `t/T$Inner.class`, `src/` holds
/// `t/T.java`, and `lib.jar` holds `com/x/Bar.class`.
fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    temp.child("classes/t/T.class").write_binary(b"\xCA\xFE\xBA\xBE").unwrap();
    temp.child("classes/t/T$Inner.class").write_binary(b"inner").unwrap();
    temp.child("src/t/T.java")
        .write_str("package t; class T { class Inner {} }\n")
        .unwrap();

    let mut jar = zip::ZipWriter::new(File::create(temp.child("lib.jar").path()).unwrap());
    jar.start_file("com/x/Bar.class", FileOptions::<()>::default())
        .unwrap();
    jar.write_all(b"bar").unwrap();
    jar.finish().unwrap();
    temp
}

const CLASS_PATH: &str = if cfg!(windows) {
    "classes;lib.jar"
} else {
    "classes:lib.jar"
};

#[test]
fn help_mentions_core_commands() {
    let temp = TempDir::new().unwrap();
    jpath(&temp).arg("--help").assert().success().stdout(
        predicate::str::contains("find")
            .and(predicate::str::contains("list"))
            .and(predicate::str::contains("class"))
            .and(predicate::str::contains("package"))
            .and(predicate::str::contains("entries")),
    );
}

#[test]
fn find_resolves_from_directory_and_jar() {
    let temp = project();

    jpath(&temp)
        .args(["--classpath", CLASS_PATH, "find", "com/x/Bar.class"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lib.jar(com/x/Bar.class)"));

    let output = jpath(&temp)
        .args(["--classpath", CLASS_PATH, "--json", "find", "t/T.class"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["found"], true);
    assert_eq!(v["resource"]["name"], "T.class");
    assert_eq!(v["resource"]["archived"], false);
    assert_eq!(v["resource"]["length"], 4);
}

#[test]
fn missing_name_exits_with_one() {
    let temp = project();
    jpath(&temp)
        .args(["--classpath", CLASS_PATH, "find", "com/x/Missing.class"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not found: com/x/Missing.class"));
}

#[test]
fn class_reports_binary_and_outer_source() {
    let temp = project();
    let output = jpath(&temp)
        .args([
            "--classpath",
            "classes",
            "--sourcepath",
            "src",
            "--json",
            "class",
            "t.T$Inner",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["class"], "t.T$Inner");
    assert_eq!(v["exists"], true);
    assert_eq!(v["binary"]["name"], "T$Inner.class");
    assert_eq!(v["source"]["name"], "T.java");
}

#[test]
fn package_lists_binary_and_source_files() {
    let temp = project();
    let output = jpath(&temp)
        .args([
            "--classpath",
            "classes",
            "--sourcepath",
            "src",
            "--json",
            "package",
            "t",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["package"], "package t");
    assert_eq!(v["exists"], true);
    assert_eq!(
        v["binary_files"],
        serde_json::json!(["T$Inner.class", "T.class"])
    );
    assert_eq!(v["source_files"], serde_json::json!(["T.java"]));

    jpath(&temp)
        .args(["--classpath", "classes", "package", "nope"])
        .assert()
        .code(1);
}

#[test]
fn list_uses_extension_filter() {
    let temp = project();
    jpath(&temp)
        .args(["--classpath", CLASS_PATH, "list", "com.x"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lib.jar(com/x/Bar.class)"));

    jpath(&temp)
        .args(["--classpath", CLASS_PATH, "list", "com.x", "--ext", ".java"])
        .assert()
        .code(1);
}

#[test]
fn cat_writes_resource_bytes() {
    let temp = project();
    jpath(&temp)
        .args(["--classpath", CLASS_PATH, "cat", "com/x/Bar.class"])
        .assert()
        .success()
        .stdout("bar");
}

#[test]
fn class_path_comes_from_config_file() {
    let temp = project();
    temp.child("jpath.toml")
        .write_str("[classpath]\nclass_path = \"lib.jar\"\n\n[logging]\nlevel = \"off\"\n")
        .unwrap();

    let output = jpath(&temp).args(["--json", "entries"]).output().unwrap();
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v.as_array().unwrap().len(), 1);
    assert_eq!(v[0]["kind"], "archive");
    assert_eq!(v[0]["location"], "lib.jar");
}

#[test]
fn invalid_config_exits_with_two() {
    let temp = TempDir::new().unwrap();
    temp.child("jpath.toml").write_str("[classpath\n").unwrap();

    jpath(&temp)
        .arg("entries")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to parse toml config"));
}

#[test]
fn debug_logging_reports_search_paths() {
    let temp = project();

    jpath(&temp)
        .env("RUST_LOG", "debug")
        .args(["--classpath", CLASS_PATH, "entries"])
        .assert()
        .success()
        .stderr(
            predicate::str::contains("search paths ready")
                .and(predicate::str::contains("entries=2")),
        );
}
