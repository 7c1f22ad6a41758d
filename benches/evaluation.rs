use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use tokio::runtime::Runtime;

use custodes::adapters::memory::InMemoryMetricsStore;
use custodes::domain::models::{AgentMetrics, Complexity, ScoringConfig, TestRecord, TestType};
use custodes::domain::ports::NoJitter;
use custodes::services::{extract_components, AdaptiveThresholdService, IntelligentScoringSystem};

fn synthetic_response(sections: usize) -> String {
    let mut response = String::new();
    for i in 0..sections {
        response.push_str(&format!(
            "Explanation: step {i} caches results because lookups repeat, therefore latency drops.\n\n\
             ```python\nimport functools\nclass Step{i}:\n    def run(self, items):\n        # memoised\n        return [x * 2 for x in items]\n```\n\n\
             Security: validate and sanitize every input.\n\n\
             Performance: throughput scales with the cache hit rate.\n\n"
        ));
    }
    response
}

fn synthetic_store(agents: usize) -> Arc<InMemoryMetricsStore> {
    let metrics = (0..agents).map(|a| {
        let ai = format!("agent-{a}");
        let mut metrics = AgentMetrics::new(ai.clone());
        for i in 0..50 {
            let score = f64::from((a * 7 + i * 13) as u32 % 100);
            metrics.push_record(TestRecord::new(
                ai.clone(),
                TestType::ALL[i % TestType::ALL.len()],
                Complexity::Advanced,
                score,
                score >= 60.0,
            ));
        }
        metrics
    });
    Arc::new(InMemoryMetricsStore::with_metrics(metrics))
}

fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_components");
    for sections in [1, 10, 50] {
        let response = synthetic_response(sections);
        group.bench_with_input(BenchmarkId::from_parameter(sections), &response, |b, r| {
            b.iter(|| extract_components(black_box(r)));
        });
    }
    group.finish();
}

fn bench_evaluation(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let system = IntelligentScoringSystem::new(&ScoringConfig::default(), Arc::new(NoJitter));
    let response = synthetic_response(10);

    c.bench_function("evaluate_ai_response", |b| {
        b.to_async(&rt).iter(|| async {
            system
                .evaluate_ai_response(black_box(&response), Complexity::Expert, "imperium")
                .await
        });
    });
}

fn bench_thresholds(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let service = AdaptiveThresholdService::new(synthetic_store(100));

    c.bench_function("pooled_threshold_100_agents", |b| {
        b.to_async(&rt).iter(|| async {
            service
                .get_adaptive_threshold(TestType::CodeQuality, Complexity::Advanced, None)
                .await
        });
    });
    c.bench_function("ai_specific_threshold", |b| {
        b.to_async(&rt).iter(|| async {
            service
                .get_ai_specific_threshold(TestType::CodeQuality, Complexity::Advanced, "agent-42")
                .await
        });
    });
}

criterion_group!(benches, bench_extraction, bench_evaluation, bench_thresholds);
criterion_main!(benches);
