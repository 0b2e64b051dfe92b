use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use similar::{ChangeTag, TextDiff};

fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).to_path_buf()
}

fn fixture_dir() -> PathBuf {
    project_root().join("fixtures")
}

fn golden_dir() -> PathBuf {
    project_root().join("golden")
}

fn update_golden() -> bool {
    std::env::var("UPDATE_GOLDEN").is_ok()
}

fn diff_strings(expected: &str, actual: &str) -> String {
    let diff = TextDiff::from_lines(expected, actual);
    let mut out = String::new();
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        out.push_str(&format!("{sign}{change}"));
    }
    out
}

/// Each fixture is a manifest: `{"args": [...], "resources": [...]}`. The
/// `resources` array is piped to the CLI's stdin (the default `--input -`);
/// `args` is everything before that. Snapshots compare parsed JSON values
/// rather than raw bytes, so pretty-printer whitespace changes don't make
/// an otherwise-correct run look broken.
#[test]
fn golden_evaluate_output() {
    let fixtures = fixture_dir();
    let golden = golden_dir();

    let mut entries: Vec<_> = fs::read_dir(&fixtures)
        .expect("Failed to read fixtures directory")
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
        .collect();
    entries.sort_by_key(|e| e.file_name());

    assert!(
        !entries.is_empty(),
        "No fixture files found in {fixtures:?}"
    );

    for entry in entries {
        let fixture_path = entry.path();
        let stem = fixture_path.file_stem().unwrap().to_str().unwrap();
        let golden_path = golden.join(format!("{stem}.json"));

        let manifest: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&fixture_path).unwrap())
                .unwrap_or_else(|e| panic!("invalid fixture {stem}: {e}"));
        let args: Vec<String> = manifest["args"]
            .as_array()
            .unwrap_or_else(|| panic!("fixture {stem} missing args array"))
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect();
        let resources = serde_json::to_string(&manifest["resources"]).unwrap();

        let mut child = Command::new(env!("CARGO_BIN_EXE_tagsched"))
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to spawn tagsched CLI");

        child
            .stdin
            .as_mut()
            .unwrap()
            .write_all(resources.as_bytes())
            .expect("Failed to write resources to stdin");

        let output = child
            .wait_with_output()
            .expect("Failed to wait for tagsched CLI");

        assert!(
            output.status.success(),
            "tagsched evaluate failed for {}: {}",
            stem,
            String::from_utf8_lossy(&output.stderr)
        );

        let actual = String::from_utf8(output.stdout).expect("Output is not valid UTF-8");

        if update_golden() {
            fs::create_dir_all(&golden).ok();
            fs::write(&golden_path, &actual)
                .unwrap_or_else(|e| panic!("Failed to write golden file {golden_path:?}: {e}"));
            eprintln!("Updated golden file: {golden_path:?}");
            continue;
        }

        let expected = fs::read_to_string(&golden_path).unwrap_or_else(|e| {
            panic!(
                "Golden file {golden_path:?} not found: {e}\n\
                 Hint: Run with UPDATE_GOLDEN=1 to generate golden files"
            )
        });

        let actual_value: serde_json::Value =
            serde_json::from_str(&actual).unwrap_or_else(|e| {
                panic!("Actual output for {stem} is not valid JSON: {e}\n{actual}")
            });
        let expected_value: serde_json::Value =
            serde_json::from_str(&expected).unwrap_or_else(|e| {
                panic!("Golden file {golden_path:?} is not valid JSON: {e}")
            });

        if actual_value != expected_value {
            let diff = diff_strings(&expected, &actual);
            panic!(
                "Golden test mismatch for {stem}:\n\n\
                 {diff}\n\n\
                 Run with UPDATE_GOLDEN=1 to refresh snapshots"
            );
        }
    }
}
