use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::{ARGS, INDENTED_PATH, SUITE_PATH};

/// A single test file.
#[derive(Debug)]
pub struct Test {
    /// The path relative to the suite, e.g. `markup/page.html`.
    pub name: String,
    pub path: PathBuf,
    /// The content type the file's mode is resolved from.
    pub content_type: &'static str,
    pub text: String,
    /// Whether the file is expected to be indented already.
    pub indented: bool,
}

impl Display for Test {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.content_type)
    }
}

/// Collects all selected tests and the number of skipped ones.
pub fn collect() -> Result<(Vec<Test>, usize), Vec<String>> {
    let mut tests = vec![];
    let mut errors = vec![];
    let mut skipped = 0;

    for entry in WalkDir::new(SUITE_PATH).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                errors.push(err.to_string());
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(content_type) = content_type(path) else {
            errors.push(format!("{}: unknown file extension", path.display()));
            continue;
        };

        let name = path
            .strip_prefix(SUITE_PATH)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");
        if !selected(&name) {
            skipped += 1;
            continue;
        }

        match std::fs::read_to_string(path) {
            Ok(text) => tests.push(Test {
                name,
                path: path.to_path_buf(),
                content_type,
                text,
                indented: path.starts_with(INDENTED_PATH),
            }),
            Err(err) => errors.push(format!("{}: {err}", path.display())),
        }
    }

    if errors.is_empty() { Ok((tests, skipped)) } else { Err(errors) }
}

/// Whether the test name matches the command line patterns.
fn selected(name: &str) -> bool {
    if ARGS.pattern.is_empty() {
        return true;
    }
    ARGS.pattern.iter().any(|pattern| {
        if ARGS.exact {
            pattern.as_str() == name
        } else {
            pattern.is_match(name)
        }
    })
}

fn content_type(path: &Path) -> Option<&'static str> {
    Some(match path.extension()?.to_str()? {
        "html" | "htm" => "text/html",
        "xml" | "svg" => "application/xml",
        "css" => "text/css",
        "js" => "text/javascript",
        "json" => "application/json",
        _ => return None,
    })
}
