//! Cross-checks `t!` call sites in `src/` against the shipped Fluent files.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

const LOCALES: [&str; 2] = ["en-US", "es-ES"];

fn crate_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn ftl_keys(locale: &str) -> BTreeSet<String> {
    let path = crate_dir().join("i18n").join(locale).join("pulseboard-ui.ftl");
    let source = fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("cannot read {}: {err}", path.display()));
    source
        .lines()
        .filter(|line| !line.starts_with([' ', '\t', '#', '.', '-']))
        .filter_map(|line| line.split_once('='))
        .map(|(key, _)| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .collect()
}

fn rust_sources(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for path in entries.flatten().map(|entry| entry.path()) {
        if path.is_dir() {
            rust_sources(&path, out);
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            out.push(path);
        }
    }
}

/// First literal argument of every `t!(` in `source`, whitespace after the paren allowed.
fn keys_in(source: &str) -> Vec<String> {
    source
        .match_indices("t!(")
        .filter(|(at, _)| {
            // skip identifiers that merely end in `t`, e.g. `assert!(`
            !source[..*at]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        })
        .filter_map(|(at, needle)| {
            let rest = source[at + needle.len()..].trim_start();
            let literal = rest.strip_prefix('"')?;
            let end = literal.find('"')?;
            Some(literal[..end].to_string())
        })
        .collect()
}

fn used_keys() -> BTreeSet<String> {
    let mut files = Vec::new();
    rust_sources(&crate_dir().join("src"), &mut files);
    assert!(!files.is_empty(), "no sources found under src/");
    files
        .iter()
        .filter_map(|path| fs::read_to_string(path).ok())
        .flat_map(|source| keys_in(&source))
        .collect()
}

#[test]
fn key_scanner_reads_literal_first_arguments() {
    let sample = r#"
        let a = t!("nav-home");
        let b = t!(
            "settings-title",
            widget = name
        );
        assert!(flag);
        let c = fmt!("not-a-key");
    "#;
    assert_eq!(keys_in(sample), vec!["nav-home", "settings-title"]);
}

#[test]
fn every_used_key_is_defined_in_every_locale() {
    let used = used_keys();
    assert!(used.contains("nav-home"), "scanner found no navbar keys");

    for locale in LOCALES {
        let defined = ftl_keys(locale);
        let missing: Vec<_> = used.difference(&defined).cloned().collect();
        assert!(
            missing.is_empty(),
            "{locale} is missing keys used in src/: {}",
            missing.join(", ")
        );
    }
}

#[test]
fn fallback_defines_no_unused_keys() {
    let used = used_keys();
    let unused: Vec<_> = ftl_keys("en-US").difference(&used).cloned().collect();
    assert!(
        unused.is_empty(),
        "en-US defines keys no t! call uses: {}",
        unused.join(", ")
    );
}
