//! Best-effort extraction of response components.
//!
//! Responses are free text, so every pattern here is a heuristic: code
//! fences and inline code, Python-looking definitions and imports, comment
//! and docstring blocks, and prose introduced by labels such as
//! `explanation:` or `security:`. A pattern that finds nothing contributes
//! an empty list, never an error.
//!
//! A labeled section runs from the end of `label[:\s]+` to the first blank
//! line, the first newline followed by a letter, or the end of the response.

use regex::Regex;
use std::sync::LazyLock;

use crate::domain::errors::ScoringError;
use crate::domain::models::ResponseComponents;

/// A code pattern and whether its first capture group holds the code.
struct CodePattern {
    regex: Regex,
    captured: bool,
}

struct ExtractionPatterns {
    code: Vec<CodePattern>,
    documentation: Vec<Regex>,
    explanation_labels: Vec<Regex>,
    test_labels: Vec<Regex>,
    optimization_labels: Vec<Regex>,
    security_labels: Vec<Regex>,
    performance_labels: Vec<Regex>,
    section_end: Regex,
}

impl ExtractionPatterns {
    fn compile() -> Result<Self, regex::Error> {
        let code = [
            (r"(?is)```\w*\n(.*?)\n```", true),
            (r"(?i)`([^`]+)`", true),
            (r"(?i)def\s+\w+\s*\([^)]*\):", false),
            (r"(?i)class\s+\w+", false),
            (r"(?i)import\s+[\w\s,]+", false),
            (r"(?i)from\s+[\w.]+\s+import\s+[\w\s,]+", false),
        ]
        .into_iter()
        .map(|(pattern, captured)| {
            Regex::new(pattern).map(|regex| CodePattern { regex, captured })
        })
        .collect::<Result<Vec<_>, _>>()?;

        let documentation = [
            r"#\s+([^\n]*)",
            r#""""([^"]*)""""#,
            r"'''([^']*)'''",
            r"#\s+([^\n]+)",
        ]
        .into_iter()
        .map(Regex::new)
        .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            code,
            documentation,
            explanation_labels: labels(&["explanation", "reasoning", "approach", "strategy"])?,
            test_labels: labels(&["test", "assert", "validation"])?,
            optimization_labels: labels(&["optimization", "efficiency", "performance"])?,
            security_labels: labels(&["security", "authentication", "authorization", "validation"])?,
            performance_labels: labels(&["performance", "scalability", "throughput", "latency"])?,
            section_end: Regex::new(r"\n\n|\n[A-Za-z]|\n\z")?,
        })
    }

    fn labeled(&self, text: &str, labels: &[Regex]) -> Vec<String> {
        labels
            .iter()
            .flat_map(|label| self.labeled_sections(text, label))
            .collect()
    }

    fn labeled_sections(&self, text: &str, label: &Regex) -> Vec<String> {
        let mut sections = Vec::new();
        let mut pos = 0;
        while pos <= text.len() {
            let Some(found) = label.find_at(text, pos) else {
                break;
            };
            let body_start = found.end();
            let body_end = self
                .section_end
                .find_at(text, body_start)
                .map_or(text.len(), |end| end.start());
            sections.push(text[body_start..body_end].to_string());
            pos = body_end;
        }
        sections
    }
}

fn labels(names: &[&str]) -> Result<Vec<Regex>, regex::Error> {
    names
        .iter()
        .map(|name| Regex::new(&format!(r"(?i){name}[:\s]+")))
        .collect()
}

static PATTERNS: LazyLock<Result<ExtractionPatterns, regex::Error>> =
    LazyLock::new(ExtractionPatterns::compile);

/// Split a response into the components the dimension scorers read.
pub fn extract_components(response: &str) -> Result<ResponseComponents, ScoringError> {
    let patterns = PATTERNS
        .as_ref()
        .map_err(|e| ScoringError::Extraction(e.to_string()))?;

    let mut components = ResponseComponents::default();

    for pattern in &patterns.code {
        if pattern.captured {
            components.code_sections.extend(
                pattern
                    .regex
                    .captures_iter(response)
                    .filter_map(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string()),
            );
        } else {
            components.code_sections.extend(
                pattern
                    .regex
                    .find_iter(response)
                    .map(|m| m.as_str().to_string()),
            );
        }
    }

    let explanations = patterns.labeled(response, &patterns.explanation_labels);
    components.reasoning.clone_from(&explanations);
    components.explanations = explanations;

    for doc in &patterns.documentation {
        components.documentation.extend(
            doc.captures_iter(response)
                .filter_map(|caps| caps.get(1))
                .map(|m| m.as_str().to_string()),
        );
    }

    components.testing_approach = patterns.labeled(response, &patterns.test_labels);
    components.optimization_notes = patterns.labeled(response, &patterns.optimization_labels);
    components.security_considerations = patterns.labeled(response, &patterns.security_labels);
    components.performance_notes = patterns.labeled(response, &patterns.performance_labels);

    Ok(components)
}
