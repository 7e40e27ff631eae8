mod common;

use pretty_assertions::assert_eq;

use std::fs;
use std::path::{Path, PathBuf};

const EXPECT_COMMENT: &str = "// expect: ";

/// Every line after an `// expect: ` marker, in order.  Diagnostics are
/// expected in their rendered form, one line per output line.
fn expected_output(source: &str) -> String {
    let mut expected = String::new();

    for line in source.lines() {
        if let Some(idx) = line.find(EXPECT_COMMENT) {
            expected += &line[idx + EXPECT_COMMENT.len()..];
            expected += "\n";
        }
    }

    expected
}

fn run_fixture(path: &Path) {
    let source = fs::read_to_string(path)
        .unwrap_or_else(|_| panic!("could not read test file: {}", path.display()));

    let (mut got_output, errors) = common::run(&source);
    for e in &errors {
        got_output += &e.to_string();
        got_output += "\n";
    }

    assert_eq!(
        expected_output(&source),
        got_output,
        "fixture {}",
        path.display()
    );
}

#[test]
fn lox_programs() {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("lox");

    let mut fixtures: Vec<PathBuf> = fs::read_dir(&dir)
        .expect("missing tests/lox directory")
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "lox"))
        .collect();
    fixtures.sort();

    assert!(!fixtures.is_empty(), "no fixtures in {}", dir.display());

    for path in &fixtures {
        run_fixture(path);
    }
}
