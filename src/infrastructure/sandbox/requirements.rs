#[cfg(test)]
#[path = "requirements_test.rs"]
mod tests;

use std::collections::HashSet;

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

static FROM_IMPORT: Lazy<Regex> = Lazy::new(|| {
    return Regex::new(r"(?m)^\s*from\s+([A-Za-z_][A-Za-z0-9_.]*)\s+import\s").unwrap();
});

static PLAIN_IMPORT: Lazy<Regex> = Lazy::new(|| {
    return Regex::new(r"(?m)^\s*import\s+(.+)$").unwrap();
});

// Standard library modules generated scripts commonly reach for. Anything
// here never lands in the manifest.
static STDLIB: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    return HashSet::from([
        "abc",
        "argparse",
        "array",
        "asyncio",
        "base64",
        "bisect",
        "cmath",
        "collections",
        "colorsys",
        "contextlib",
        "copy",
        "csv",
        "dataclasses",
        "datetime",
        "decimal",
        "enum",
        "fractions",
        "functools",
        "glob",
        "hashlib",
        "heapq",
        "io",
        "itertools",
        "json",
        "logging",
        "math",
        "operator",
        "os",
        "pathlib",
        "pickle",
        "platform",
        "pprint",
        "queue",
        "random",
        "re",
        "secrets",
        "shutil",
        "signal",
        "socket",
        "sqlite3",
        "statistics",
        "string",
        "struct",
        "subprocess",
        "sys",
        "tempfile",
        "textwrap",
        "threading",
        "time",
        "tkinter",
        "traceback",
        "turtle",
        "types",
        "typing",
        "unittest",
        "uuid",
        "warnings",
        "weakref",
    ]);
});

/// Maps an import name to the pip package that provides it when the two
/// differ.
fn package_name(import_name: &str) -> String {
    let package = match import_name {
        "bs4" => "beautifulsoup4",
        "Box2D" => "box2d-py",
        "cv2" => "opencv-python",
        "OpenGL" => "PyOpenGL",
        "PIL" => "Pillow",
        "sklearn" => "scikit-learn",
        "yaml" => "PyYAML",
        other => other,
    };

    return package.to_string();
}

fn top_level_module(clause: &str) -> Option<String> {
    let name = clause
        .trim()
        .split(" as ")
        .next()?
        .trim()
        .split('.')
        .next()?
        .to_string();

    let first = name.chars().next()?;
    if !first.is_alphabetic() && first != '_' {
        return None;
    }
    if !name.chars().all(|c| return c.is_alphanumeric() || c == '_') {
        return None;
    }

    return Some(name);
}

/// Statically scans a Python script for third-party imports and returns
/// the pip packages to install, in first-appearance order. Best-effort:
/// stdlib, relative, and unparseable imports are omitted rather than
/// failing. Purely textual, so scanning twice always yields the same
/// manifest.
pub fn scan_imports(source_code: &str) -> Vec<String> {
    let mut modules: Vec<String> = vec![];

    for line in source_code.split('\n') {
        if let Some(captures) = FROM_IMPORT.captures(line) {
            if let Some(name) = top_level_module(&captures[1]) {
                modules.push(name);
            }
            continue;
        }

        if let Some(captures) = PLAIN_IMPORT.captures(line) {
            for clause in captures[1].split(',') {
                if let Some(name) = top_level_module(clause) {
                    modules.push(name);
                }
            }
        }
    }

    return modules
        .into_iter()
        .filter(|name| return !STDLIB.contains(name.as_str()))
        .map(|name| return package_name(&name))
        .unique()
        .collect();
}
