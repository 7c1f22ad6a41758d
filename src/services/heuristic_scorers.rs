//! Keyword heuristics for each scoring dimension.
//!
//! Every rule counts how many keywords from a list appear at least once in
//! the relevant components (presence, not occurrences), scales the count by a
//! per-keyword step and caps the contribution. Final values are clamped to
//! `[0, 1]`.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::errors::ScoringError;
use crate::domain::models::{Complexity, ResponseComponents, ScoringDimension};
use crate::domain::ports::DimensionScorer;

type ScoreFn = fn(&ResponseComponents, Complexity) -> f64;

/// A [`DimensionScorer`] backed by a pure keyword rule.
#[derive(Clone, Copy)]
pub struct HeuristicScorer {
    dimension: ScoringDimension,
    rule: ScoreFn,
}

impl HeuristicScorer {
    pub fn for_dimension(dimension: ScoringDimension) -> Self {
        let rule: ScoreFn = match dimension {
            ScoringDimension::CodeQuality => code_quality,
            ScoringDimension::ProblemSolving => problem_solving,
            ScoringDimension::Innovation => innovation,
            ScoringDimension::Efficiency => efficiency,
            ScoringDimension::Security => security,
            ScoringDimension::Performance => performance,
            ScoringDimension::Maintainability => maintainability,
        };
        Self { dimension, rule }
    }
}

impl std::fmt::Debug for HeuristicScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeuristicScorer")
            .field("dimension", &self.dimension)
            .finish()
    }
}

#[async_trait]
impl DimensionScorer for HeuristicScorer {
    fn dimension(&self) -> ScoringDimension {
        self.dimension
    }

    async fn score(
        &self,
        components: &ResponseComponents,
        difficulty: Complexity,
    ) -> Result<f64, ScoringError> {
        let score = (self.rule)(components, difficulty);
        if !score.is_finite() {
            return Err(ScoringError::NonFiniteScore(self.dimension.to_string()));
        }
        Ok(score.clamp(0.0, 1.0))
    }
}

/// One heuristic scorer per dimension.
pub fn default_scorers() -> Vec<Arc<dyn DimensionScorer>> {
    ScoringDimension::ALL
        .into_iter()
        .map(|dimension| Arc::new(HeuristicScorer::for_dimension(dimension)) as Arc<dyn DimensionScorer>)
        .collect()
}

fn joined<'a>(parts: impl IntoIterator<Item = &'a Vec<String>>) -> String {
    parts
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Number of distinct keywords present in `text`.
fn present(text: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|k| text.contains(*k)).count()
}

fn capped(count: usize, step: f64, cap: f64) -> f64 {
    (count as f64 * step).min(cap)
}

fn code_quality(c: &ResponseComponents, difficulty: Complexity) -> f64 {
    if c.code_sections.is_empty() {
        return 0.3;
    }
    let code = joined([&c.code_sections]);
    let mut score: f64 = 0.5;

    if code.contains("def ") && code.contains("class ") {
        score += 0.1;
    }
    if code.contains("import ") || code.contains("from ") {
        score += 0.05;
    }
    if code.contains('#') || code.contains("\"\"\"") || code.contains("'''") {
        score += 0.1;
    }
    if code.contains("try:") && code.contains("except:") {
        score += 0.1;
    }
    if code.contains("async def") || code.contains("await") {
        score += 0.05;
    }
    if code.contains("global ") {
        score -= 0.05;
    }
    if code.matches("print(").count() > 3 {
        score -= 0.05;
    }
    if difficulty.is_advanced_tier() {
        if code.contains("type hints") || code.contains("->") {
            score += 0.1;
        }
        if code.contains("dataclass") {
            score += 0.05;
        }
    }
    score.clamp(0.0, 1.0)
}

fn problem_solving(c: &ResponseComponents, difficulty: Complexity) -> f64 {
    let text = joined([&c.reasoning, &c.explanations]);
    let lower = text.to_lowercase();
    let length = text.chars().count();
    let mut score: f64 = 0.5;

    if length > 100 {
        score += 0.1;
    }
    if length > 300 {
        score += 0.1;
    }
    score += capped(
        present(&lower, &["because", "therefore", "however", "although", "while", "if", "then"]),
        0.05,
        0.2,
    );
    score += capped(
        present(&lower, &["approach", "strategy", "method", "algorithm", "solution"]),
        0.05,
        0.15,
    );
    if difficulty.is_advanced_tier() {
        if lower.contains("complexity") || lower.contains("optimization") {
            score += 0.1;
        }
        if lower.contains("trade-off") || lower.contains("tradeoff") {
            score += 0.05;
        }
    }
    score.clamp(0.0, 1.0)
}

fn innovation(c: &ResponseComponents, difficulty: Complexity) -> f64 {
    let text = joined([&c.code_sections, &c.explanations]);
    let lower = text.to_lowercase();
    let mut score: f64 = 0.3;

    score += capped(
        present(
            &text,
            &[
                "generator",
                "yield",
                "decorator",
                "@",
                "lambda",
                "comprehension",
                "context manager",
                "with ",
                "async",
                "await",
                "dataclass",
                "type hints",
                "->",
                "Optional",
                "Union",
                "List",
                "Dict",
            ],
        ),
        0.05,
        0.3,
    );
    score += capped(
        present(&lower, &["creative", "novel", "unique", "innovative", "elegant", "clever"]),
        0.05,
        0.2,
    );
    if difficulty.is_advanced_tier() {
        if lower.contains("pattern") {
            score += 0.1;
        }
        if lower.contains("algorithm") || lower.contains("complexity") {
            score += 0.1;
        }
    }
    score.clamp(0.0, 1.0)
}

fn efficiency(c: &ResponseComponents, _difficulty: Complexity) -> f64 {
    let text = joined([&c.code_sections, &c.optimization_notes]);
    let lower = text.to_lowercase();
    let mut score: f64 = 0.5;

    score += capped(
        present(
            &text,
            &[
                "list comprehension",
                "generator",
                "yield",
                "map(",
                "filter(",
                "set(",
                "dict(",
                "enumerate(",
                "zip(",
                "any(",
                "all(",
            ],
        ),
        0.05,
        0.25,
    );
    score += capped(
        present(
            &lower,
            &["optimize", "efficient", "performance", "complexity", "time", "space"],
        ),
        0.03,
        0.2,
    );
    score -= capped(
        present(&text, &["for i in range(len(", "global ", "eval(", "exec("]),
        0.05,
        0.2,
    );
    score.clamp(0.0, 1.0)
}

fn security(c: &ResponseComponents, _difficulty: Complexity) -> f64 {
    let text = joined([&c.code_sections, &c.security_considerations]);
    let lower = text.to_lowercase();
    let mut score: f64 = 0.4;

    score += capped(
        present(
            &lower,
            &[
                "input validation",
                "sanitize",
                "escape",
                "quote",
                "authentication",
                "authorization",
                "encrypt",
                "hash",
                "salt",
                "csrf",
                "xss",
                "sql injection",
            ],
        ),
        0.08,
        0.4,
    );
    score += capped(
        present(&lower, &["security", "secure", "safe", "protected", "validate", "verify"]),
        0.03,
        0.2,
    );
    score -= capped(
        present(&text, &["eval(", "exec(", "pickle.loads(", "subprocess.call("]),
        0.1,
        0.3,
    );
    score.clamp(0.0, 1.0)
}

fn performance(c: &ResponseComponents, _difficulty: Complexity) -> f64 {
    let lower = joined([&c.code_sections, &c.performance_notes]).to_lowercase();
    let mut score: f64 = 0.5;

    score += capped(
        present(
            &lower,
            &[
                "caching",
                "cache",
                "index",
                "optimize",
                "performance",
                "scalability",
                "throughput",
                "latency",
                "memory",
                "cpu",
                "gpu",
                "parallel",
                "async",
            ],
        ),
        0.05,
        0.3,
    );
    score += capped(
        present(&lower, &["fast", "efficient", "speed", "quick", "optimized"]),
        0.03,
        0.15,
    );
    score.clamp(0.0, 1.0)
}

fn maintainability(c: &ResponseComponents, _difficulty: Complexity) -> f64 {
    let text = joined([&c.code_sections, &c.documentation, &c.testing_approach]);
    let lower = text.to_lowercase();
    let mut score: f64 = 0.5;

    if !c.documentation.is_empty() {
        score += 0.1;
        if joined([&c.documentation]).chars().count() > 100 {
            score += 0.05;
        }
    }
    if !c.testing_approach.is_empty() {
        score += 0.1;
    }
    score += capped(
        present(&lower, &["test", "assert", "validate", "verify", "check"]),
        0.03,
        0.15,
    );
    score += capped(
        present(&text, &["def ", "class ", "module", "function", "method"]),
        0.02,
        0.1,
    );
    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn with_code(code: &str) -> ResponseComponents {
        ResponseComponents {
            code_sections: vec![code.to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_code_quality_without_code() {
        assert!(approx(code_quality(&ResponseComponents::default(), Complexity::Basic), 0.3));
    }

    #[test]
    fn test_code_quality_structure_and_comments() {
        let c = with_code("class Sorter:\n    # sort in place\n    def run(self): pass");
        assert!(approx(code_quality(&c, Complexity::Basic), 0.7));
    }

    #[test]
    fn test_code_quality_advanced_tier_bonuses() {
        let c = with_code("def total(xs) -> int: return sum(xs)");
        assert!(approx(code_quality(&c, Complexity::Basic), 0.5));
        assert!(approx(code_quality(&c, Complexity::Master), 0.6));
    }

    #[test]
    fn test_code_quality_penalties() {
        let c = with_code("global x\nprint(1)\nprint(2)\nprint(3)\nprint(4)");
        assert!(approx(code_quality(&c, Complexity::Basic), 0.4));
    }

    #[test]
    fn test_problem_solving_counts_presence_not_occurrences() {
        let c = ResponseComponents {
            reasoning: vec!["because because because".to_string()],
            ..Default::default()
        };
        assert!(approx(problem_solving(&c, Complexity::Basic), 0.55));
    }

    #[test]
    fn test_problem_solving_caps_logical_keywords() {
        let c = ResponseComponents {
            reasoning: vec![
                "because therefore however although while if then".to_string(),
            ],
            ..Default::default()
        };
        assert!(approx(problem_solving(&c, Complexity::Basic), 0.7));
    }

    #[test]
    fn test_innovation_base_and_patterns() {
        assert!(approx(innovation(&ResponseComponents::default(), Complexity::Basic), 0.3));

        let c = with_code("squares = [x * x for x in xs]\nf = lambda x: x");
        assert!(approx(innovation(&c, Complexity::Basic), 0.35));
    }

    #[test]
    fn test_efficiency_penalises_index_loops() {
        let c = with_code("for i in range(len(items)): total += items[i]");
        assert!(approx(efficiency(&c, Complexity::Basic), 0.45));
    }

    #[test]
    fn test_security_rewards_practices_and_penalises_eval() {
        let c = ResponseComponents {
            security_considerations: vec!["sanitize inputs and hash passwords".to_string()],
            ..Default::default()
        };
        assert!(approx(security(&c, Complexity::Basic), 0.56));

        let risky = with_code("eval(user_input)");
        assert!(approx(security(&risky, Complexity::Basic), 0.3));
    }

    #[test]
    fn test_performance_keywords() {
        let c = ResponseComponents {
            performance_notes: vec!["cache hot keys for speed".to_string()],
            ..Default::default()
        };
        assert!(approx(performance(&c, Complexity::Basic), 0.58));
    }

    #[test]
    fn test_maintainability_docs_and_tests() {
        let c = ResponseComponents {
            documentation: vec!["Sorts the list".to_string()],
            testing_approach: vec!["assert sorted output".to_string()],
            ..Default::default()
        };
        assert!(approx(maintainability(&c, Complexity::Basic), 0.73));
    }

    #[tokio::test]
    async fn test_default_scorers_cover_every_dimension() {
        let scorers = default_scorers();
        let dimensions: Vec<_> = scorers.iter().map(|s| s.dimension()).collect();
        assert_eq!(dimensions, ScoringDimension::ALL.to_vec());

        for scorer in &scorers {
            let score = scorer
                .score(&ResponseComponents::default(), Complexity::Expert)
                .await
                .unwrap();
            assert!((0.0..=1.0).contains(&score));
        }
    }
}
