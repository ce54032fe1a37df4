use anyhow::{Result, ensure};
use serde::Serialize;

/// Mean absolute deviation between predicted and observed counts, split by
/// observation stratum. A subset with no scorable pairs reports None rather
/// than 0; pairs with a missing value on either side are skipped and
/// counted.
#[derive(Debug, Clone, Serialize)]
pub struct MadScores {
    pub all: Option<f64>,
    pub zero_observed: Option<f64>,
    pub nonzero_observed: Option<f64>,
    pub scored_pairs: usize,
    pub skipped_pairs: usize,
}

/// Score one prediction vector against held-out observations.
pub fn mad_scores(observed: &[Option<f64>], predicted: &[Option<f64>]) -> Result<MadScores> {
    ensure!(
        observed.len() == predicted.len(),
        "observed ({}) and predicted ({}) lengths differ",
        observed.len(), predicted.len()
    );

    let mut all = (0.0, 0usize);
    let mut zero = (0.0, 0usize);
    let mut nonzero = (0.0, 0usize);
    let mut skipped = 0usize;

    for (obs, pred) in observed.iter().zip(predicted.iter()) {
        let (Some(obs), Some(pred)) = (obs, pred) else {
            skipped += 1;
            continue;
        };
        let deviation = (obs - pred).abs();
        all.0 += deviation;
        all.1 += 1;
        let stratum = if *obs == 0.0 { &mut zero } else { &mut nonzero };
        stratum.0 += deviation;
        stratum.1 += 1;
    }

    let mean = |(sum, count): (f64, usize)| (count > 0).then(|| sum / count as f64);
    Ok(MadScores {
        all: mean(all),
        zero_observed: mean(zero),
        nonzero_observed: mean(nonzero),
        scored_pairs: all.1,
        skipped_pairs: skipped,
    })
}

/// One model variant's scores on the shared held-out set.
#[derive(Debug, Clone, Serialize)]
pub struct VariantScore {
    pub model: String,
    pub scores: MadScores,
}

/// Score several model variants against the same observations, for
/// like-for-like comparison (e.g. an additive model against its
/// hierarchical counterpart).
pub fn score_variants(
    observed: &[Option<f64>],
    variants: &[(String, Vec<Option<f64>>)],
) -> Result<Vec<VariantScore>> {
    variants.iter()
        .map(|(model, predicted)| {
            Ok(VariantScore {
                model: model.clone(),
                scores: mad_scores(observed, predicted)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_prediction_scores_as_expected() {
        // Counts [0, 2, 5] against a constant mean prediction of 2.33.
        let observed = vec![Some(0.0), Some(2.0), Some(5.0)];
        let predicted = vec![Some(2.33); 3];
        let scores = mad_scores(&observed, &predicted).unwrap();

        let expected = (2.33 + 0.33 + 2.67) / 3.0;
        assert!((scores.all.unwrap() - expected).abs() < 1e-9);
        assert!((scores.zero_observed.unwrap() - 2.33).abs() < 1e-9);
        assert!((scores.nonzero_observed.unwrap() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn perfect_predictions_score_zero() {
        let observed = vec![Some(0.0), Some(3.0), Some(7.0)];
        let scores = mad_scores(&observed, &observed).unwrap();
        assert_eq!(scores.all, Some(0.0));
        assert_eq!(scores.zero_observed, Some(0.0));
        assert_eq!(scores.nonzero_observed, Some(0.0));
    }

    #[test]
    fn deviations_are_never_negative() {
        let observed = vec![Some(5.0), Some(0.0), Some(2.0)];
        let predicted = vec![Some(-3.0), Some(10.0), Some(2.5)];
        let scores = mad_scores(&observed, &predicted).unwrap();
        assert!(scores.all.unwrap() >= 0.0);
        assert!(scores.zero_observed.unwrap() >= 0.0);
        assert!(scores.nonzero_observed.unwrap() >= 0.0);
    }

    #[test]
    fn missing_pairs_are_skipped_and_counted() {
        let observed = vec![Some(1.0), None, Some(2.0), Some(3.0)];
        let predicted = vec![Some(1.0), Some(5.0), None, Some(3.0)];
        let scores = mad_scores(&observed, &predicted).unwrap();
        assert_eq!(scores.scored_pairs, 2);
        assert_eq!(scores.skipped_pairs, 2);
    }

    #[test]
    fn empty_strata_report_none_not_zero() {
        let observed = vec![Some(1.0), Some(2.0)];
        let predicted = vec![Some(1.5), Some(2.5)];
        let scores = mad_scores(&observed, &predicted).unwrap();
        assert_eq!(scores.zero_observed, None);
        assert!(scores.nonzero_observed.is_some());
    }

    #[test]
    fn length_mismatch_is_an_error() {
        assert!(mad_scores(&[Some(1.0)], &[Some(1.0), Some(2.0)]).is_err());
    }

    #[test]
    fn variants_share_the_observation_vector() {
        let observed = vec![Some(0.0), Some(2.0), Some(4.0)];
        let scored = score_variants(&observed, &[
            ("gam".to_string(), vec![Some(1.0), Some(1.0), Some(1.0)]),
            ("hgam".to_string(), vec![Some(0.0), Some(2.0), Some(4.0)]),
        ]).unwrap();

        assert_eq!(scored.len(), 2);
        assert!(scored[0].scores.all.unwrap() > scored[1].scores.all.unwrap());
        assert_eq!(scored[1].scores.all, Some(0.0));
    }
}
