use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use predicates::str::contains;

fn temp_input(contents: &str) -> std::path::PathBuf {
    use std::time::{SystemTime, UNIX_EPOCH};

    let pid = std::process::id();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let path = std::env::temp_dir().join(format!("texblock_render_{pid}_{nanos}.json"));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn cli_render_stdout_golden() {
    let input = temp_input(
        r#"[
            {"type":"p","data":["Hello",{"type":"b","data":["world"]}]},
            {"type":"ul","data":[{"type":"li","data":["one"]},{"type":"li","data":["two"]}]}
        ]"#,
    );

    let mut cmd = cargo_bin_cmd!("texblock");
    cmd.args(["render", input.to_str().unwrap()]);
    cmd.assert()
        .success()
        .stdout("<p>Hello<b>world</b></p><ul><li>one</li><li>two</li></ul>\n");

    let _ = std::fs::remove_file(&input);
}

#[test]
fn cli_render_escapes_markup_in_text() {
    let input = temp_input(r#"[{"type":"p","data":["<script>alert(1)</script>"]}]"#);

    let mut cmd = cargo_bin_cmd!("texblock");
    cmd.args(["render", input.to_str().unwrap()]);
    cmd.assert()
        .success()
        .stdout("<p>&lt;script&gt;alert(1)&lt;/script&gt;</p>\n");

    let _ = std::fs::remove_file(&input);
}

#[test]
fn cli_inspect_lists_surviving_blocks() {
    let input = temp_input(
        r#"[
            {"type":"p","data":["some paragraph text"]},
            {"type":"unknown","data":["dropped"]},
            {"type":"h2","data":["Title"]}
        ]"#,
    );

    let mut cmd = cargo_bin_cmd!("texblock");
    cmd.args(["inspect", input.to_str().unwrap()]);
    cmd.assert()
        .success()
        .stdout(contains("type"))
        .stdout(contains("some paragraph text"))
        .stdout(contains("h2"))
        .stdout(contains("unknown").not());

    let _ = std::fs::remove_file(&input);
}

#[test]
fn cli_inspect_preview_is_bounded() {
    let long_text = "a".repeat(200);
    let input = temp_input(&format!(r#"[{{"type":"p","data":[{long_text:?}]}}]"#));

    let mut cmd = cargo_bin_cmd!("texblock");
    cmd.args(["inspect", input.to_str().unwrap()]);

    let out = cmd.assert().success().get_output().stdout.clone();
    let out = String::from_utf8(out).unwrap();
    let row = out.lines().nth(1).expect("one block row");
    let preview = row.split_whitespace().last().expect("preview column");

    assert!(preview.chars().count() <= 80);
    assert!(preview.ends_with('…'));

    let _ = std::fs::remove_file(&input);
}
