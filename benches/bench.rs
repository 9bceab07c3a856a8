// Criterion benchmarks for the therapy matching core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use therapy_match::core::normalize::{normalize_field, TagField};
use therapy_match::core::{calculate_match_score, MatchSettings, Matcher};
use therapy_match::models::{AvailabilityStatus, ClientProfile, IntakeAnswers, ProviderProfile};
use uuid::Uuid;

const STYLES: [&str; 4] = ["empathetic and gentle", "direct", "collaborative", "analytical"];
const TYPES: [&str; 5] = ["CBT", "DBT", "EMDR", "Mindfulness", "Person-Centered"];

fn create_candidate(id: usize) -> ProviderProfile {
    ProviderProfile {
        id: Uuid::from_u128(id as u128),
        name: format!("Therapist {}", id),
        title: "Licensed Counselor".to_string(),
        communication_style: STYLES[id % STYLES.len()].to_string(),
        approach_style: String::new(),
        specializations: vec!["Anxiety".to_string(), "Depression".to_string()],
        therapy_types: vec![TYPES[id % TYPES.len()].to_string(), TYPES[(id + 2) % TYPES.len()].to_string()],
        languages: vec!["English".to_string()],
        hourly_rate: Some(60.0 + (id % 15) as f64 * 10.0),
        years_experience: Some((id % 12) as u32),
        availability_status: if id % 7 == 0 {
            AvailabilityStatus::Unavailable
        } else {
            AvailabilityStatus::Available
        },
    }
}

fn create_client() -> ClientProfile {
    ClientProfile::from_answers(&IntakeAnswers {
        communication_style_preference: Some("gentle".to_string()),
        therapy_type_preference: Some(TagField::One("CBT, Mindfulness".to_string())),
        specific_concerns: Some(TagField::One("Anxiety | Sleep & Work stress".to_string())),
        budget_range: Some("$100-$150".to_string()),
        ..Default::default()
    })
}

fn bench_heuristic_score(c: &mut Criterion) {
    let client = create_client();
    let provider = create_candidate(3);

    c.bench_function("heuristic_score", |b| {
        b.iter(|| calculate_match_score(black_box(&client), black_box(&provider)));
    });
}

fn bench_normalize(c: &mut Criterion) {
    let field = TagField::One("CBT, DBT | Mindfulness & Person-Centered, cbt".to_string());

    c.bench_function("normalize_tag_field", |b| {
        b.iter(|| normalize_field(black_box(Some(&field))));
    });
}

fn bench_matching(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
    let client = create_client();

    let mut group = c.benchmark_group("matching");

    for candidate_count in [10, 50, 100, 500].iter() {
        let candidates: Vec<ProviderProfile> = (0..*candidate_count).map(create_candidate).collect();
        let matcher = Matcher::new(
            None,
            MatchSettings {
                limit: 20,
                candidate_cap: *candidate_count,
            },
        );

        group.bench_with_input(
            BenchmarkId::new("generate_matches", candidate_count),
            candidate_count,
            |b, _| {
                b.to_async(&runtime).iter(|| {
                    matcher.generate_matches(black_box(&client), black_box(candidates.clone()))
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_heuristic_score, bench_normalize, bench_matching);

criterion_main!(benches);
