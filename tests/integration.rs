//! Integration tests using TOML fixtures.
//!
//! This test harness loads test cases from TOML files in the `fixtures/` directory
//! and runs them against the refkit library.

use std::fs;
use std::path::Path;

use refkit::{format_references, CitationStyle, InputFormat, Reference, Session};
use serde::Deserialize;

/// A test fixture loaded from a TOML file.
#[derive(Debug, Deserialize)]
struct Fixture {
    /// Name of the test case
    name: String,
    /// Test type: "format", "import" or "error"
    #[serde(default = "default_test_type")]
    test_type: String,
    /// Citation style name (format tests)
    #[serde(default)]
    style: Option<String>,
    /// Extension of the input document: "bib", "ris" or "csv"
    #[serde(default)]
    input_format: Option<String>,
    /// Input document text
    #[serde(default)]
    document: Option<String>,
    /// References placed in the store before the document is imported
    /// (format tests), or the references the document must produce
    /// (import tests)
    #[serde(default)]
    references: Vec<FixtureReference>,
    /// Expected formatted citations
    #[serde(default)]
    expected: Vec<String>,
    /// Expected error message fragment (error tests)
    #[serde(default)]
    expected_error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FixtureReference {
    title: String,
    author: String,
    #[serde(default)]
    year: Option<String>,
}

impl From<&FixtureReference> for Reference {
    fn from(r: &FixtureReference) -> Self {
        Reference::new(r.title.as_str(), r.author.as_str(), r.year.as_deref())
    }
}

fn default_test_type() -> String {
    "format".to_string()
}

/// Load all fixtures from a directory.
fn load_fixtures(dir: &Path) -> Vec<(String, Fixture)> {
    let mut fixtures = Vec::new();

    if !dir.exists() {
        return fixtures;
    }

    for entry in fs::read_dir(dir).unwrap() {
        let entry = entry.unwrap();
        let path = entry.path();

        if path.extension().map_or(false, |e| e == "toml") {
            let content = fs::read_to_string(&path).unwrap();
            let fixture: Fixture = toml::from_str(&content).unwrap();
            let name = path.file_stem().unwrap().to_string_lossy().to_string();
            fixtures.push((name, fixture));
        }
    }

    fixtures.sort_by(|a, b| a.0.cmp(&b.0));
    fixtures
}

fn input_format(name: &str, fixture: &Fixture) -> InputFormat {
    let extension = fixture
        .input_format
        .as_deref()
        .unwrap_or_else(|| panic!("Test '{}' needs input_format", name));
    InputFormat::from_path(Path::new(&format!("fixture.{}", extension))).unwrap()
}

/// Run formatting tests - build a store and compare formatted output.
fn run_format_test(name: &str, fixture: &Fixture) {
    let style_name = fixture.style.as_deref().unwrap_or("apa");
    let style = CitationStyle::from_name(style_name)
        .unwrap_or_else(|| panic!("Test '{}' uses unknown style '{}'", name, style_name));

    let mut session = Session::new(style);
    session.apply_table_edits(fixture.references.iter().map(Reference::from).collect());
    if let Some(document) = &fixture.document {
        session
            .import_document(input_format(name, fixture), document)
            .unwrap_or_else(|e| panic!("Test '{}' failed to import: {}", name, e));
    }

    let formatted = session.format().to_vec();
    assert_eq!(formatted, fixture.expected, "Test '{}' output mismatch", name);

    // Formatting is a pure function of style and store
    assert_eq!(
        format_references(style, session.store().snapshot()),
        formatted,
        "Test '{}' is not repeatable",
        name
    );
}

/// Run import tests - parse a document and compare the references.
fn run_import_test(name: &str, fixture: &Fixture) {
    let document = fixture
        .document
        .as_deref()
        .unwrap_or_else(|| panic!("Test '{}' needs a document", name));

    let references = input_format(name, fixture)
        .parse(document)
        .unwrap_or_else(|e| panic!("Test '{}' failed with unexpected error: {}", name, e));

    let expected: Vec<Reference> = fixture.references.iter().map(Reference::from).collect();
    assert_eq!(references, expected, "Test '{}' references mismatch", name);
}

/// Run error tests - verify a document is rejected and nothing is committed.
fn run_error_test(name: &str, fixture: &Fixture) {
    let document = fixture.document.as_deref().unwrap_or_default();
    let mut session = Session::default();

    match session.import_document(input_format(name, fixture), document) {
        Ok(count) => panic!("Test '{}' expected an error but imported {}", name, count),
        Err(e) => {
            if let Some(expected_error) = &fixture.expected_error {
                let error_msg = e.to_string();
                assert!(
                    error_msg.contains(expected_error),
                    "Test '{}' error mismatch: expected '{}', got '{}'",
                    name,
                    expected_error,
                    error_msg
                );
            }
        }
    }

    assert!(
        session.store().is_empty(),
        "Test '{}' committed references from a failed import",
        name
    );
}

fn run_fixture(name: &str, fixture: &Fixture) {
    match fixture.test_type.as_str() {
        "format" => run_format_test(name, fixture),
        "import" => run_import_test(name, fixture),
        "error" => run_error_test(name, fixture),
        other => panic!("Test '{}' has unknown test_type '{}'", name, other),
    }
}

fn run_fixture_dir(subdir: &str) {
    let fixtures_dir = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(subdir);
    let fixtures = load_fixtures(&fixtures_dir);
    assert!(!fixtures.is_empty(), "no fixtures found in {}", subdir);

    for (name, fixture) in fixtures {
        println!("Running {} test: {}", subdir, fixture.name);
        run_fixture(&name, &fixture);
    }
}

#[test]
fn test_format_fixtures() {
    run_fixture_dir("format");
}

#[test]
fn test_import_fixtures() {
    run_fixture_dir("import");
}

#[test]
fn test_error_fixtures() {
    run_fixture_dir("errors");
}
