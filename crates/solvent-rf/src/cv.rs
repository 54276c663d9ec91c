//! Stratified fold assignment for cross-validation.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::error::RfError;

/// Create stratified fold assignments.
///
/// Groups samples by class, shuffles within each class, then round-robins
/// across folds so each fold gets approximately equal representation of
/// each class. Returns `fold_assignments[sample_index] = fold`.
pub(crate) fn stratified_folds(
    labels: &[usize],
    n_folds: usize,
    seed: u64,
) -> Result<Vec<usize>, RfError> {
    if n_folds < 2 {
        return Err(RfError::InvalidFoldCount { n_folds });
    }
    if labels.is_empty() {
        return Err(RfError::EmptyDataset);
    }

    let n_classes = labels.iter().max().copied().unwrap_or(0) + 1;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    // Group indices by class.
    let mut class_indices: Vec<Vec<usize>> = vec![vec![]; n_classes];
    for (i, &label) in labels.iter().enumerate() {
        class_indices[label].push(i);
    }

    // Validate: each present class needs at least n_folds samples.
    for (class, indices) in class_indices.iter().enumerate() {
        if !indices.is_empty() && indices.len() < n_folds {
            return Err(RfError::TooFewSamplesForFolds {
                class,
                count: indices.len(),
                n_folds,
            });
        }
    }

    // Shuffle within each class and assign folds round-robin.
    let mut fold_assignments = vec![0usize; labels.len()];
    for indices in &mut class_indices {
        indices.shuffle(&mut rng);
        for (j, &idx) in indices.iter().enumerate() {
            fold_assignments[idx] = j % n_folds;
        }
    }

    Ok(fold_assignments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_fold_receives_each_class() {
        let labels: Vec<usize> = (0..40).map(|i| i % 2).collect();
        let folds = stratified_folds(&labels, 5, 42).unwrap();
        assert_eq!(folds.len(), 40);

        for fold in 0..5 {
            for class in 0..2 {
                let count = labels
                    .iter()
                    .zip(&folds)
                    .filter(|&(&l, &f)| l == class && f == fold)
                    .count();
                assert!(count > 0, "fold {fold} is missing class {class}");
            }
        }
    }

    #[test]
    fn fold_sizes_are_balanced() {
        let labels: Vec<usize> = (0..100).map(|i| usize::from(i % 4 == 0)).collect();
        let folds = stratified_folds(&labels, 5, 7).unwrap();
        let mut sizes = vec![0usize; 5];
        for &f in &folds {
            sizes[f] += 1;
        }
        let min = sizes.iter().min().unwrap();
        let max = sizes.iter().max().unwrap();
        assert!(max - min <= 2, "sizes = {sizes:?}");
    }

    #[test]
    fn deterministic_with_same_seed() {
        let labels: Vec<usize> = (0..30).map(|i| i % 2).collect();
        let a = stratified_folds(&labels, 3, 99).unwrap();
        let b = stratified_folds(&labels, 3, 99).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_fold_count() {
        let labels = vec![0, 1, 0, 1];
        assert!(matches!(
            stratified_folds(&labels, 1, 42),
            Err(RfError::InvalidFoldCount { n_folds: 1 })
        ));
    }

    #[test]
    fn empty_labels_error() {
        assert!(matches!(
            stratified_folds(&[], 2, 42),
            Err(RfError::EmptyDataset)
        ));
    }

    #[test]
    fn too_few_samples_for_folds() {
        // Class 1 has 2 samples, 5 folds requested.
        let labels = vec![0, 0, 0, 0, 0, 1, 1];
        let err = stratified_folds(&labels, 5, 42).unwrap_err();
        assert!(matches!(
            err,
            RfError::TooFewSamplesForFolds {
                class: 1,
                count: 2,
                n_folds: 5
            }
        ));
    }
}
