//! Static threshold ranges.
//!
//! Every (test type, complexity) pair maps to a `[minimum, maximum]` band on
//! the 0-100 score scale. The table is built once and read-only afterwards;
//! adaptation happens on top of it in
//! [`AdaptiveThresholdService`](crate::services::AdaptiveThresholdService).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::test_record::{Complexity, TestType};

/// Lowest threshold any range may express.
pub const RANGE_FLOOR: f64 = 30.0;
/// Highest threshold any range may express.
pub const RANGE_CEILING: f64 = 95.0;

/// Inclusive passing band for one (test type, complexity) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRange {
    pub minimum: f64,
    pub maximum: f64,
}

impl ThresholdRange {
    pub const fn new(minimum: f64, maximum: f64) -> Self {
        Self { minimum, maximum }
    }

    fn shifted(self, offset: f64) -> Self {
        Self {
            minimum: (self.minimum + offset).clamp(RANGE_FLOOR, RANGE_CEILING),
            maximum: (self.maximum + offset).clamp(RANGE_FLOOR, RANGE_CEILING),
        }
    }
}

/// A single configured replacement for one table cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeOverride {
    pub test_type: TestType,
    pub complexity: Complexity,
    pub minimum: f64,
    pub maximum: f64,
}

const fn complexity_band(complexity: Complexity) -> ThresholdRange {
    match complexity {
        Complexity::Basic => ThresholdRange::new(40.0, 60.0),
        Complexity::Intermediate => ThresholdRange::new(50.0, 70.0),
        Complexity::Advanced => ThresholdRange::new(60.0, 80.0),
        Complexity::Expert => ThresholdRange::new(65.0, 85.0),
        Complexity::Master => ThresholdRange::new(70.0, 90.0),
    }
}

const fn test_type_offset(test_type: TestType) -> f64 {
    match test_type {
        TestType::SecurityAwareness => 5.0,
        TestType::KnowledgeVerification
        | TestType::InnovationCapability
        | TestType::ExperimentalValidation => -5.0,
        TestType::CodeQuality
        | TestType::PerformanceOptimization
        | TestType::SelfImprovement
        | TestType::CrossAiCollaboration => 0.0,
    }
}

/// Lookup table from (test type, complexity) to [`ThresholdRange`].
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    ranges: BTreeMap<(TestType, Complexity), ThresholdRange>,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        let ranges = TestType::ALL
            .into_iter()
            .flat_map(|test_type| {
                Complexity::ALL.into_iter().map(move |complexity| {
                    (
                        (test_type, complexity),
                        complexity_band(complexity).shifted(test_type_offset(test_type)),
                    )
                })
            })
            .collect();
        Self { ranges }
    }
}

impl ThresholdTable {
    /// Default table with the given cells replaced.
    pub fn with_overrides(overrides: &[RangeOverride]) -> Self {
        let mut table = Self::default();
        for o in overrides {
            table
                .ranges
                .insert((o.test_type, o.complexity), ThresholdRange::new(o.minimum, o.maximum));
        }
        table
    }

    pub fn range(&self, test_type: TestType, complexity: Complexity) -> ThresholdRange {
        self.ranges
            .get(&(test_type, complexity))
            .copied()
            .unwrap_or_else(|| complexity_band(complexity))
    }

    /// Iterate every cell of the table.
    pub fn iter(&self) -> impl Iterator<Item = (TestType, Complexity, ThresholdRange)> + '_ {
        self.ranges
            .iter()
            .map(|(&(test_type, complexity), &range)| (test_type, complexity, range))
    }
}
