use grep::regex::RegexMatcher;
use grep::searcher::{Searcher, Sink, SinkMatch};
use std::error::Error;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// Only the crate's own sources are policed; vendored reference material is not.
const SOURCE_DIRS: [&str; 5] = ["engine", "shared", "cli", "tests", "benches"];

/// One source policy: a line regex, a filter that rejects false positives among
/// the matching lines, and the explanation printed when a file violates it.
struct Rule {
    pattern: &'static str,
    violation: &'static str,
    advice: &'static [&'static str],
    applies: fn(&str) -> bool,
}

const RULES: [Rule; 5] = [
    Rule {
        // Catches underscore-prefixed bindings, including in match arms and destructuring.
        pattern: r"\b(_[a-zA-Z0-9_]+)\b",
        violation: "underscore-prefixed variables",
        advice: &[
            "Underscore-prefixed variable names are not allowed in this project.",
            "Either use the variable (removing the underscore) or remove it completely.",
        ],
        applies: is_code_outside_strings,
    },
    Rule {
        // Only text after // or /* is considered, so identifiers in code are never flagged.
        pattern: r"(//|/\*|///).*(?:FIXED|CORRECTED|FIX|FIXES|NEW|CHANGED|CHANGES|CHANGE|MODIFIED|MODIFIES|MODIFY|UPDATED|UPDATES|UPDATE)",
        violation: "forbidden comment patterns",
        advice: &[
            "Comments containing 'FIXED', 'CORRECTED', 'FIX', 'FIXES', 'NEW', 'CHANGED', 'CHANGES', 'CHANGE', 'MODIFIED', 'MODIFIES', 'MODIFY', 'UPDATED', 'UPDATES', or 'UPDATE' are STRICTLY FORBIDDEN in this project.",
            "Remove them completely rather than commenting them out.",
        ],
        applies: always,
    },
    Rule {
        pattern: r"(//|/\*).*\*\*",
        violation: "'**' patterns in regular comments",
        advice: &["The '**' pattern is not allowed in regular comments (but is allowed in doc comments)."],
        applies: is_not_doc_comment,
    },
    Rule {
        pattern: r"(//|/\*|///).*",
        violation: "comments with all uppercase alphabetic characters",
        advice: &[
            "Comments where all alphabetic characters are uppercase are STRICTLY FORBIDDEN in this project.",
            "STRONGLY CONSIDER deleting the comment completely.",
        ],
        applies: is_all_caps_comment,
    },
    Rule {
        pattern: r"#\s*\[\s*allow\s*\(\s*dead_code\s*\)\s*\]",
        violation: "#[allow(dead_code)] attributes",
        advice: &[
            "#[allow(dead_code)] attributes are STRICTLY FORBIDDEN in this project.",
            "Either use the code (removing the attribute) or remove it completely.",
        ],
        applies: always,
    },
];

// A custom "Sink" for the grep searcher. It collects every matching line of a
// single file that the rule's filter accepts.
struct ViolationCollector {
    applies: fn(&str) -> bool,
    violations: Vec<String>,
}

impl Sink for ViolationCollector {
    type Error = std::io::Error;

    fn matched(&mut self, _: &Searcher, mat: &SinkMatch) -> Result<bool, Self::Error> {
        let line_number = mat.line_number().unwrap_or(0);
        let line_text = std::str::from_utf8(mat.bytes()).unwrap_or("").trim_end();
        if (self.applies)(line_text) {
            // Formatted exactly as `rg -n` would print it.
            self.violations.push(format!("{line_number}:{line_text}"));
        }
        // Keep searching the same file.
        Ok(true)
    }
}

fn report(rule: &Rule, path: &Path, violations: &[String]) -> String {
    let mut error_msg = format!(
        "\n❌ ERROR: Found {} {} in {}:\n",
        violations.len(),
        rule.violation,
        path.to_str().unwrap_or("?")
    );
    for violation in violations {
        error_msg.push_str(&format!("   {violation}\n"));
    }
    error_msg.push('\n');
    for (i, line) in rule.advice.iter().enumerate() {
        let marker = if i == 0 { "⚠️ " } else { "   " };
        error_msg.push_str(&format!("{marker}{line}\n"));
    }
    error_msg
}

fn always(_: &str) -> bool {
    true
}

fn is_doc_comment(line: &str) -> bool {
    line.trim_start().starts_with("///")
}

fn is_not_doc_comment(line: &str) -> bool {
    !is_doc_comment(line)
}

fn is_code_outside_strings(line: &str) -> bool {
    let is_pure_comment = line.trim_start().starts_with("//")
        || (line.contains("/*") && !line.contains("*/match") && !line.contains("*/let"));
    // Odd segments between double quotes are string contents.
    let is_in_string = line
        .split('"')
        .enumerate()
        .any(|(i, part)| i % 2 == 1 && part.contains('_'));
    !is_pure_comment && !is_in_string
}

fn is_all_caps_comment(line: &str) -> bool {
    let trimmed = line.trim_start();
    let comment_text = if let Some(rest) = trimmed.strip_prefix("///") {
        rest.trim()
    } else if let Some(rest) = trimmed.strip_prefix("//") {
        rest.trim()
    } else if let Some(idx) = line.find("/*") {
        let rest = &line[idx + 2..];
        match rest.find("*/") {
            Some(end) => rest[..end].trim(),
            None => rest.trim(),
        }
    } else {
        return false;
    };
    let mut letters = comment_text.chars().filter(|c| c.is_alphabetic()).peekable();
    letters.peek().is_some() && letters.all(char::is_uppercase)
}

fn rust_sources() -> Vec<PathBuf> {
    SOURCE_DIRS
        .iter()
        .flat_map(|dir| WalkDir::new(dir).into_iter().filter_map(|e| e.ok()))
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "rs"))
        .map(|e| e.into_path())
        .collect()
}

fn check(rule: &Rule, sources: &[PathBuf]) -> Result<(), Box<dyn Error>> {
    let matcher = RegexMatcher::new_line_matcher(rule.pattern)?;
    let mut searcher = Searcher::new();
    for path in sources {
        let mut collector = ViolationCollector {
            applies: rule.applies,
            violations: Vec::new(),
        };
        searcher.search_path(&matcher, path, &mut collector)?;
        if !collector.violations.is_empty() {
            return Err(report(rule, path, &collector.violations).into());
        }
    }
    Ok(())
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    for dir in SOURCE_DIRS {
        println!("cargo:rerun-if-changed={dir}");
    }

    let sources = rust_sources();
    for rule in &RULES {
        if let Err(e) = check(rule, &sources) {
            // `eprintln!` is what surfaces the message in cargo's output.
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
