//! Ranking and specificity selection over mean label scores.
//!
//! Everything here is a pure function of its arguments.

use crate::taxonomy::{GeneralLabels, Label, Taxonomy};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct RankedLabel {
    pub index: usize,
    pub label: Label,
    pub score: f32,
}

/// Returns the `top_n` labels by descending mean score.
///
/// Equal scores keep taxonomy order, so the lower index ranks first.
pub fn select_top_labels(
    mean_scores: &[f32],
    taxonomy: &Taxonomy,
    top_n: usize,
) -> Result<Vec<RankedLabel>> {
    if top_n == 0 {
        return Err(Error::InvalidParameter("top_n must be at least 1".into()));
    }
    if mean_scores.len() != taxonomy.len() {
        return Err(Error::InvalidParameter(format!(
            "{} mean scores for {} labels",
            mean_scores.len(),
            taxonomy.len()
        )));
    }

    let mut order: Vec<usize> = (0..mean_scores.len()).collect();
    // sort_by is stable
    order.sort_by(|&a, &b| mean_scores[b].total_cmp(&mean_scores[a]));

    Ok(order
        .into_iter()
        .take(top_n)
        .map(|index| RankedLabel {
            index,
            label: taxonomy.labels()[index].clone(),
            score: mean_scores[index],
        })
        .collect())
}

/// Picks the leaf segment of the best scoring non general label.
///
/// When every candidate is general the full path of the top label is
/// returned instead of its leaf.
pub fn select_most_specific(top_labels: &[RankedLabel], general: &GeneralLabels) -> Result<String> {
    let top = top_labels.first().ok_or(Error::NoCandidates)?;

    let mut best: Option<(&str, f32)> = None;
    for ranked in top_labels.iter().filter(|r| !general.contains(&r.label)) {
        match best {
            Some((_, score)) if ranked.score <= score => {}
            _ => best = Some((ranked.label.leaf(), ranked.score)),
        }
    }

    Ok(match best {
        Some((leaf, _)) => leaf.to_string(),
        None => top.label.path().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn general() -> GeneralLabels {
        GeneralLabels::new(["Speech", "Music"])
    }

    #[test]
    fn test_specific_label_wins_over_general() {
        let taxonomy = Taxonomy::from_paths(["Animal, Dog, Bark", "Speech", "Music"]);
        let top = select_top_labels(&[0.9, 0.8, 0.2], &taxonomy, 3).unwrap();
        let paths: Vec<_> = top.iter().map(|r| r.label.path()).collect();
        assert_eq!(paths, vec!["Animal, Dog, Bark", "Speech", "Music"]);
        assert_eq!(select_most_specific(&top, &general()).unwrap(), "Bark");
    }

    #[test]
    fn test_all_general_falls_back_to_full_path() {
        let taxonomy = Taxonomy::from_paths(["Speech", "Music"]);
        let top = select_top_labels(&[0.9, 0.5], &taxonomy, 2).unwrap();
        assert_eq!(select_most_specific(&top, &general()).unwrap(), "Speech");
    }

    #[test]
    fn test_fallback_keeps_commas() {
        let taxonomy = Taxonomy::from_paths(["Domestic animals, pets", "Animal"]);
        let top = select_top_labels(&[0.7, 0.6], &taxonomy, 2).unwrap();
        let result = select_most_specific(&top, &GeneralLabels::default()).unwrap();
        assert_eq!(result, "Domestic animals, pets");
    }

    #[test]
    fn test_leaf_extraction() {
        let taxonomy = Taxonomy::from_paths(["Animal, Wild animals, Roaring cats, Lion, Growl"]);
        let top = select_top_labels(&[0.4], &taxonomy, 1).unwrap();
        assert_eq!(select_most_specific(&top, &general()).unwrap(), "Growl");
    }

    #[test]
    fn test_label_without_comma() {
        let taxonomy = Taxonomy::from_paths(["Noise"]);
        let top = select_top_labels(&[0.4], &taxonomy, 1).unwrap();
        assert_eq!(select_most_specific(&top, &general()).unwrap(), "Noise");
    }

    #[test]
    fn test_best_survivor_not_best_overall() {
        let taxonomy = Taxonomy::from_paths(["Speech", "Vehicle, Car", "Vehicle, Truck"]);
        let top = select_top_labels(&[0.9, 0.3, 0.6], &taxonomy, 3).unwrap();
        assert_eq!(select_most_specific(&top, &general()).unwrap(), "Truck");
    }

    #[test]
    fn test_ties_keep_first_survivor() {
        let taxonomy = Taxonomy::from_paths(["Vehicle, Car", "Vehicle, Truck"]);
        let top = select_top_labels(&[0.5, 0.5], &taxonomy, 2).unwrap();
        assert_eq!(top[0].index, 0);
        assert_eq!(select_most_specific(&top, &general()).unwrap(), "Car");
    }

    #[test]
    fn test_ranking_is_sorted_with_index_tie_break() {
        let taxonomy = Taxonomy::from_paths(["a", "b", "c", "d", "e"]);
        let top = select_top_labels(&[0.1, 0.7, 0.3, 0.7, 0.3], &taxonomy, 5).unwrap();
        let indices: Vec<_> = top.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 3, 2, 4, 0]);
        assert!(top.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_top_n_is_clamped() {
        let taxonomy = Taxonomy::from_paths(["a", "b", "c"]);
        let top = select_top_labels(&[0.1, 0.2, 0.3], &taxonomy, 10).unwrap();
        assert_eq!(top.len(), 3);
        let top = select_top_labels(&[0.1, 0.2, 0.3], &taxonomy, 3).unwrap();
        assert_eq!(top.len(), 3);
        let top = select_top_labels(&[0.1, 0.2, 0.3], &taxonomy, 2).unwrap();
        assert_eq!(top.len(), 2);
    }

    #[test]
    fn test_zero_top_n_fails() {
        let taxonomy = Taxonomy::from_paths(["a"]);
        assert!(matches!(
            select_top_labels(&[0.1], &taxonomy, 0),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_length_mismatch_fails() {
        let taxonomy = Taxonomy::from_paths(["a", "b"]);
        assert!(matches!(
            select_top_labels(&[0.1], &taxonomy, 1),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_empty_candidates_fail() {
        let top = select_top_labels(&[], &Taxonomy::default(), 5).unwrap();
        assert!(top.is_empty());
        assert!(matches!(
            select_most_specific(&top, &general()),
            Err(Error::NoCandidates)
        ));
    }

    #[test]
    fn test_selection_is_idempotent() {
        let taxonomy = Taxonomy::from_paths(["Animal, Dog, Bark", "Speech", "Music"]);
        let top = select_top_labels(&[0.9, 0.8, 0.2], &taxonomy, 3).unwrap();
        let first = select_most_specific(&top, &general()).unwrap();
        let second = select_most_specific(&top, &general()).unwrap();
        assert_eq!(first, second);
    }
}
