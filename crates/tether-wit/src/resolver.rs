//! Discovery and ordering of WIT package files.
//!
//! The resolver never runs the parser: it reads each file as text, pulls
//! the package identifier and the packages referenced by `use`/`import`
//! statements with regular expressions, and orders the files so that every
//! referenced package comes before its dependents. Per the WIT layout
//! convention, `deps/` holds either `.wit` files directly or one level of
//! subdirectories containing `.wit` files; `deps/` trees are never nested.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static PACKAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*package\s+([a-z][a-z0-9-]*:[a-z][a-z0-9-]*(?:@[0-9]+\.[0-9]+\.[0-9]+(?:[-+.][0-9A-Za-z-]+)*)?)",
    )
    .expect("package regex should compile")
});

static REFERENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:use|import)\s+([a-z][a-z0-9-]*:[a-z][a-z0-9-]*(?:@[0-9]+\.[0-9]+\.[0-9]+(?:[-+.][0-9A-Za-z-]+)*)?)",
    )
    .expect("reference regex should compile")
});

/// Discovers the dependency files reachable from `root`, which may be a
/// WIT file or a package directory. Only the conventional `deps/` layout
/// is scanned: direct `.wit` files plus one level of subdirectories.
pub fn discover_dependencies(root: &Path) -> Result<Vec<PathBuf>> {
    let base = if root.is_dir() {
        root
    } else {
        root.parent().unwrap_or_else(|| Path::new("."))
    };

    let deps_dir = base.join("deps");
    if !deps_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut dependencies = Vec::new();
    for entry in sorted_entries(&deps_dir)? {
        if entry.is_file() && entry.extension().is_some_and(|ext| ext == "wit") {
            dependencies.push(entry);
        } else if entry.is_dir() {
            // Flat scan: deps/ subdirectories hold .wit files directly.
            for sub in sorted_entries(&entry)? {
                if sub.is_file() && sub.extension().is_some_and(|ext| ext == "wit") {
                    dependencies.push(sub);
                }
            }
        }
    }
    Ok(dependencies)
}

/// Picks the root WIT file of a package directory: the first `.wit` file
/// declaring a package, or failing that the first `.wit` file at all.
pub fn find_root_wit_file(dir: &Path) -> Result<Option<PathBuf>> {
    let mut wit_files = Vec::new();
    for entry in sorted_entries(dir)? {
        if entry.is_file() && entry.extension().is_some_and(|ext| ext == "wit") {
            wit_files.push(entry);
        }
    }
    for file in &wit_files {
        if extract_package_id(file)?.is_some() {
            return Ok(Some(file.clone()));
        }
    }
    Ok(wit_files.into_iter().next())
}

/// Extracts the package identifier from the first line matching a
/// `package ns:name[@version]` declaration.
pub fn extract_package_id(path: &Path) -> Result<Option<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    for line in content.lines() {
        if let Some(captures) = PACKAGE_RE.captures(line) {
            return Ok(Some(captures[1].to_string()));
        }
    }
    Ok(None)
}

/// Extracts every package identifier referenced by a `use` or `import`
/// statement, leading package portion only.
pub fn extract_references(path: &Path) -> Result<BTreeSet<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut references = BTreeSet::new();
    for captures in REFERENCE_RE.captures_iter(&content) {
        references.insert(captures[1].to_string());
    }
    Ok(references)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    Unvisited,
    Visiting,
    Visited,
}

/// Orders `files` so every package appears after the packages it
/// references. Cycles are reported as warnings and the back edge is
/// dropped; files without a package declaration are appended at the end
/// in lexicographic path order.
pub fn sort_by_dependencies(files: &[PathBuf]) -> Result<(Vec<PathBuf>, Vec<String>)> {
    let mut package_to_file: BTreeMap<String, PathBuf> = BTreeMap::new();
    for file in files {
        if let Some(package) = extract_package_id(file)? {
            package_to_file.insert(package, file.clone());
        }
    }

    let mut edges: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (package, file) in &package_to_file {
        let references = extract_references(file)?
            .into_iter()
            .filter(|dep| package_to_file.contains_key(dep))
            .collect();
        edges.insert(package.clone(), references);
    }

    let mut color: BTreeMap<&str, Color> = package_to_file
        .keys()
        .map(|package| (package.as_str(), Color::Unvisited))
        .collect();
    let mut sorted = Vec::new();
    let mut warnings = Vec::new();

    for start in package_to_file.keys() {
        if color[start.as_str()] != Color::Unvisited {
            continue;
        }
        // Iterative depth-first visit; each frame holds the package and the
        // index of the next outgoing edge to follow.
        color.insert(start.as_str(), Color::Visiting);
        let mut stack: Vec<(&str, usize)> = vec![(start.as_str(), 0)];
        while !stack.is_empty() {
            let frame = stack.len() - 1;
            let (package, next_edge) = stack[frame];
            let deps = &edges[package];
            if next_edge < deps.len() {
                stack[frame].1 += 1;
                let dep = deps[next_edge].as_str();
                match color[dep] {
                    Color::Unvisited => {
                        color.insert(dep, Color::Visiting);
                        stack.push((dep, 0));
                    }
                    Color::Visiting => {
                        warnings.push(format!(
                            "dependency cycle detected: `{package}` references `{dep}`; edge ignored"
                        ));
                    }
                    Color::Visited => {}
                }
            } else {
                color.insert(package, Color::Visited);
                sorted.push(package_to_file[package].clone());
                stack.pop();
            }
        }
    }

    // Files without a package declaration go last, in lexicographic order.
    let mut rest: Vec<PathBuf> = files
        .iter()
        .filter(|file| !sorted.contains(*file))
        .map(|file| file.to_path_buf())
        .collect();
    rest.sort();
    sorted.extend(rest);

    Ok((sorted, warnings))
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?
    {
        let entry = entry.with_context(|| format!("failed to read {}", dir.display()))?;
        entries.push(entry.path());
    }
    entries.sort();
    Ok(entries)
}
