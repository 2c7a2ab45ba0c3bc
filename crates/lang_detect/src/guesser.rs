use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// The guesser could not classify the text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no language matched the given text")]
pub struct NoMatch;

/// Text-only language guess. Implementations return a display name such as
/// `"Python"` or `"C++"`; callers normalize it.
pub trait LanguageGuesser: Send + Sync {
    fn guess(&self, text: &str) -> Result<String, NoMatch>;
}

const MIN_SCORE: u32 = 3;

struct Marker {
    pattern: Regex,
    weight: u32,
}

struct Candidate {
    name: &'static str,
    markers: Vec<Marker>,
}

/// Scores each candidate by the weighted markers found in the text.
///
/// Every marker counts at most once. The highest total wins and ties go to
/// the candidate listed first, so more specific languages are listed ahead
/// of the ones they overlap with (C++ before C, TypeScript before
/// JavaScript).
pub struct KeywordGuesser {
    candidates: Vec<Candidate>,
}

impl KeywordGuesser {
    pub fn new() -> Self {
        let candidates = CANDIDATES
            .iter()
            .map(|(name, markers)| Candidate {
                name,
                markers: markers
                    .iter()
                    .map(|(pattern, weight)| Marker {
                        pattern: RegexBuilder::new(pattern)
                            .multi_line(true)
                            .build()
                            .expect("built-in marker pattern must compile"),
                        weight: *weight,
                    })
                    .collect(),
            })
            .collect();
        Self { candidates }
    }

    fn score(candidate: &Candidate, text: &str) -> u32 {
        candidate
            .markers
            .iter()
            .filter(|marker| marker.pattern.is_match(text))
            .map(|marker| marker.weight)
            .sum()
    }
}

impl Default for KeywordGuesser {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageGuesser for KeywordGuesser {
    fn guess(&self, text: &str) -> Result<String, NoMatch> {
        if text.trim().is_empty() {
            return Err(NoMatch);
        }

        let mut best: Option<(&'static str, u32)> = None;
        for candidate in &self.candidates {
            let score = Self::score(candidate, text);
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((candidate.name, score));
            }
        }

        match best {
            Some((name, score)) if score >= MIN_SCORE => Ok(name.to_string()),
            _ => Err(NoMatch),
        }
    }
}

type MarkerSpec = (&'static str, u32);

const CANDIDATES: &[(&str, &[MarkerSpec])] = &[
    ("XML", &[(r"\A\s*<\?xml", 8), (r"<(\w+:)?\w+(\s+[\w:]+=\x22[^\x22]*\x22)*\s*/>", 1)]),
    (
        "HTML",
        &[
            (r"(?i)<!DOCTYPE\s+html", 6),
            (r"(?i)<html[\s>]", 4),
            (r"(?i)<(div|span|body|head|p|a|ul|li|script)[\s>]", 3),
            (r"</\w+>", 1),
        ],
    ),
    ("PHP", &[(r"<\?php", 10), (r"\$\w+\s*=", 2), (r"\becho\b", 2), (r"->\w+\(", 1)]),
    (
        "C++",
        &[
            (r"^\s*#include\s*<(iostream|vector|string|map|memory|algorithm)>", 5),
            (r"std::", 4),
            (r"\bcout\s*<<|\bcin\s*>>", 4),
            (r"\btemplate\s*<", 3),
            (r"\bnamespace\s+\w+", 2),
            (r"::", 1),
        ],
    ),
    (
        "C#",
        &[
            (r"^\s*using\s+System(\.\w+)*;", 5),
            (r"Console\.Write(Line)?\(", 5),
            (r"\{\s*get;\s*set;\s*\}", 4),
            (r"\bnamespace\s+[\w.]+", 1),
        ],
    ),
    (
        "C",
        &[
            (r"^\s*#include\s*<\w+\.h>", 3),
            (r"\bprintf\s*\(", 2),
            (r"\bint\s+main\s*\(", 2),
            (r"\bmalloc\s*\(|\bfree\s*\(", 2),
        ],
    ),
    (
        "Java",
        &[
            (r"public\s+static\s+void\s+main\s*\(\s*String", 5),
            (r"System\.out\.print", 4),
            (r"^\s*import\s+java\.", 4),
            (r"\bpublic\s+(static\s+)?(final\s+)?class\s+\w+", 3),
            (r"^\s*package\s+[\w.]+;", 3),
        ],
    ),
    (
        "Kotlin",
        &[
            (r"\bfun\s+\w+\s*\(", 4),
            (r"\bdata\s+class\b", 4),
            (r"\bval\s+\w+", 2),
            (r"\bprintln\(", 1),
        ],
    ),
    (
        "Scala",
        &[
            (r"\bdef\s+\w+\s*\([^)\n]*\)\s*:\s*\w+\s*=", 4),
            (r"\bcase\s+class\b", 4),
            (r"\bobject\s+\w+(\s+extends\s+App)?\s*\{", 3),
            (r"\bval\s+\w+\s*=", 1),
        ],
    ),
    (
        "Swift",
        &[
            (r"^\s*import\s+(Foundation|UIKit|SwiftUI)\b", 6),
            (r"\bguard\s+let\b|\bif\s+let\b", 4),
            (r"\bvar\s+\w+\s*:\s*[A-Z]\w*", 2),
            (r"\bfunc\s+\w+\([^)\n]*\)\s*->", 2),
        ],
    ),
    (
        "Go",
        &[
            (r"\bfunc\s+(\(\w+\s+\*?\w+\)\s*)?\w+\s*\(", 4),
            (r"\bfmt\.\w+\(", 4),
            (r"^\s*package\s+\w+\s*$", 3),
            (r":=", 2),
            (r"^\s*import\s*\(", 2),
        ],
    ),
    (
        "Rust",
        &[
            (r"\blet\s+mut\b", 4),
            (r"println!\(|macro_rules!|vec!\[", 4),
            (r"\bfn\s+\w+\s*(<[^>]*>)?\s*\(", 3),
            (r"^\s*use\s+\w+(::\w+)+", 3),
            (r"\bpub\s+(fn|struct|enum|mod)\b", 3),
            (r"\bimpl\b", 2),
        ],
    ),
    (
        "TypeScript",
        &[
            (r":\s*(string|number|boolean|any|void)\b", 3),
            (r"\bexport\s+(type|interface)\b", 3),
            (r"\binterface\s+\w+\s*\{", 2),
            (r"\bimport\s+.*\bfrom\s+['\x22]", 1),
        ],
    ),
    (
        "JavaScript",
        &[
            (r"^#!.*\bnode\b", 5),
            (r"console\.(log|error|warn)\(", 3),
            (r"\bfunction\s*\w*\s*\(", 2),
            (r"\b(const|let|var)\s+\w+\s*=", 2),
            (r"\bdocument\.|\bwindow\.", 2),
            (r"require\(['\x22]", 2),
            (r"=>", 1),
            (r"===|!==", 1),
        ],
    ),
    (
        "Python",
        &[
            (r"^#!.*\bpython", 5),
            (r"^\s*def \w+\(.*\):\s*$", 3),
            (r"^\s*(if|elif|for|while|with|class|try|except)\b.*:\s*$", 2),
            (r"^\s*elif\b", 2),
            (r"^\s*(from \w[\w.]* )?import \w", 1),
            (r"\bprint\(", 1),
            (r"\bself\b", 1),
            (r"\b(None|True|False)\b", 1),
        ],
    ),
    (
        "Ruby",
        &[
            (r"\battr_(accessor|reader|writer)\b", 4),
            (r"\.each\s+do\s*\|", 4),
            (r"^\s*end\s*$", 3),
            (r"^\s*def\s+\w+[?!]?(\(.*\))?\s*$", 2),
            (r"\bputs\b", 2),
            (r"^\s*require\s+['\x22]", 2),
        ],
    ),
    (
        "Perl",
        &[
            (r"^#!.*\bperl", 6),
            (r"\buse\s+strict;", 5),
            (r"\bmy\s+[$@%]\w+", 4),
            (r"\$_\b", 1),
        ],
    ),
    (
        "R",
        &[
            (r"\blibrary\(\w+\)", 4),
            (r"\bdata\.frame\(|\bc\(", 3),
            (r"\w\s*<-\s*", 2),
        ],
    ),
    (
        "Bash",
        &[
            (r"^#!.*\b(ba)?sh\b", 6),
            (r"^\s*(if|while)\s+\[\[?\s", 3),
            (r"^\s*(fi|done|esac)\s*$", 3),
            (r"\becho\s+[\x22$]", 1),
        ],
    ),
    (
        "SQL",
        &[
            (r"(?is)\bSELECT\b.+\bFROM\b", 5),
            (r"(?i)\b(INSERT\s+INTO|CREATE\s+TABLE|UPDATE\s+\w+\s+SET|DELETE\s+FROM)\b", 5),
            (r"(?i)\bWHERE\b", 1),
        ],
    ),
    (
        "CSS",
        &[
            (r"\b(color|margin|padding|display|font-size|background)\s*:\s*[^;\n]+;", 4),
            (r"@media\b", 3),
            (r"^\s*[.#]?[\w-]+(\s*[,>+~]?\s*[.#]?[\w-]+)*\s*\{\s*$", 1),
        ],
    ),
    (
        "JSON",
        &[
            (r"\A\s*[\{\[]", 1),
            (r"\x22[^\x22\n]+\x22\s*:\s*", 2),
            (r"[\}\]]\s*\z", 1),
        ],
    ),
    (
        "YAML",
        &[
            (r"^---\s*$", 3),
            (r"^\s*-\s+[\w-]+:\s", 2),
            (r"^\s*[\w-]+:\s+[^{;\n]*$", 1),
        ],
    ),
    (
        "Markdown",
        &[
            (r"^```", 3),
            (r"\[[^\]\n]+\]\([^)\n]+\)", 3),
            (r"^#{2,6}\s+\S", 2),
            (r"^\s*[-*]\s+\S", 1),
        ],
    ),
];

#[cfg(test)]
#[path = "tests/guesser_tests.rs"]
mod tests;
