use uuid::Uuid;

use crate::models::{AvailabilityStatus, ProviderProfile};

struct SampleProvider {
    id: u128,
    name: &'static str,
    title: &'static str,
    communication_style: &'static str,
    approach_style: &'static str,
    specializations: &'static [&'static str],
    therapy_types: &'static [&'static str],
    languages: &'static [&'static str],
    hourly_rate: f64,
    years_experience: u32,
}

const SAMPLES: &[SampleProvider] = &[
    SampleProvider {
        id: 0x5a3d_0001,
        name: "Dr. Priya Sharma",
        title: "Clinical Psychologist",
        communication_style: "empathetic and gentle",
        approach_style: "Cognitive behavioral therapy with mindfulness techniques",
        specializations: &["Anxiety", "Depression", "Relationship Issues", "Mindfulness"],
        therapy_types: &["CBT", "Mindfulness"],
        languages: &["English", "Hindi"],
        hourly_rate: 120.0,
        years_experience: 9,
    },
    SampleProvider {
        id: 0x5a3d_0002,
        name: "Dr. Arjun Patel",
        title: "Counseling Psychologist",
        communication_style: "direct and challenging",
        approach_style: "Goal-oriented, solution-focused sessions",
        specializations: &["Career Stress", "Work-Life Balance", "Men's Mental Health"],
        therapy_types: &["CBT", "Solution-Focused"],
        languages: &["English", "Gujarati", "Hindi"],
        hourly_rate: 90.0,
        years_experience: 7,
    },
    SampleProvider {
        id: 0x5a3d_0003,
        name: "Ms. Kavya Reddy",
        title: "Licensed Counselor",
        communication_style: "collaborative",
        approach_style: "Person-centered with family systems work",
        specializations: &["Family Conflict", "Self-Esteem", "Grief"],
        therapy_types: &["Person-Centered", "Family Systems"],
        languages: &["English", "Telugu"],
        hourly_rate: 70.0,
        years_experience: 4,
    },
    SampleProvider {
        id: 0x5a3d_0004,
        name: "Dr. Rohan Mehta",
        title: "Psychiatrist",
        communication_style: "analytical",
        approach_style: "Integrative, evidence-based treatment planning",
        specializations: &["Trauma", "PTSD", "Sleep"],
        therapy_types: &["EMDR", "DBT", "CBT"],
        languages: &["English", "Marathi"],
        hourly_rate: 180.0,
        years_experience: 15,
    },
];

/// Fixed sample catalog for demos
///
/// Only used when a caller explicitly asks for demo data and the server
/// allows it; never substituted for real results.
pub fn sample_providers() -> Vec<ProviderProfile> {
    SAMPLES
        .iter()
        .map(|s| ProviderProfile {
            id: Uuid::from_u128(s.id),
            name: s.name.to_string(),
            title: s.title.to_string(),
            communication_style: s.communication_style.to_string(),
            approach_style: s.approach_style.to_string(),
            specializations: to_strings(s.specializations),
            therapy_types: to_strings(s.therapy_types),
            languages: to_strings(s.languages),
            hourly_rate: Some(s.hourly_rate),
            years_experience: Some(s.years_experience),
            availability_status: AvailabilityStatus::Available,
        })
        .collect()
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sample_ids_are_unique_and_stable() {
        let first = sample_providers();
        let ids: HashSet<Uuid> = first.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), first.len());
        assert_eq!(first[0].id, sample_providers()[0].id);
        assert!(first.iter().all(|p| p.availability_status.is_available()));
    }
}
