use async_trait::async_trait;
use std::sync::Arc;

use oncopanel_core::error::SubsystemError;
use oncopanel_core::orchestrator::traits::PredictionSubsystem;
use oncopanel_core::prediction::{CombinationCandidate, DiscoveryReport, PredictionValue, TaskName};
use oncopanel_core::snapshot::ClinicalContextSnapshot;

use super::{pick, unit_score};

/// Partner agents proposed when the selection holds a single drug.
const PARTNER_LIBRARY: &[&str] = &[
    "bevacizumab",
    "capecitabine",
    "trametinib",
    "olaparib",
];

const MECHANISMS: &[&str] = &[
    "complementary pathway inhibition",
    "immune priming",
    "synthetic lethality",
    "resistance-mutation coverage",
];

const SYNERGY_FLOOR: f64 = 0.35;

pub struct SyntheticDiscoveryModel;

impl SyntheticDiscoveryModel {
    fn candidate(a: &str, b: &str) -> Option<CombinationCandidate> {
        // Order-insensitive seed so (a, b) and (b, a) score identically.
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        let seed = format!("{first}+{second}");
        let synergy_score = unit_score(&seed);
        if synergy_score < SYNERGY_FLOOR {
            return None;
        }
        Some(CombinationCandidate {
            drugs: vec![first.to_string(), second.to_string()],
            synergy_score,
            mechanism: pick(&seed, MECHANISMS).to_string(),
        })
    }
}

#[async_trait]
impl PredictionSubsystem for SyntheticDiscoveryModel {
    fn name(&self) -> TaskName {
        TaskName::CombinatorialDiscovery
    }

    async fn predict(
        &self,
        snapshot: Arc<ClinicalContextSnapshot>,
    ) -> Result<PredictionValue, SubsystemError> {
        let mut candidates = Vec::new();

        // Pairs within the selection itself.
        for (i, a) in snapshot.drugs.iter().enumerate() {
            for b in &snapshot.drugs[i + 1..] {
                candidates.extend(Self::candidate(a, b));
            }
        }
        // Library partners for each selected drug.
        for drug in &snapshot.drugs {
            for partner in PARTNER_LIBRARY {
                if snapshot.drugs.iter().any(|d| d == partner) {
                    continue;
                }
                candidates.extend(Self::candidate(drug, partner));
            }
        }

        candidates.sort_by(|a, b| {
            b.synergy_score
                .partial_cmp(&a.synergy_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates.truncate(5);

        tracing::debug!(
            target: "oncopanel.synthetic",
            stage = "discovery.out",
            candidates = candidates.len()
        );
        Ok(PredictionValue::Discovery(DiscoveryReport { candidates }))
    }
}
