//! Top-k selection over raw score vectors.

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::errors::ClassifierError;
use crate::core::predictions::{ClassScore, Prediction};

/// Selects the top-k classes from classification score vectors.
///
/// Selection is a partial sort: the top k entries are separated from the
/// remainder without fully sorting it. Ties between equal scores resolve
/// deterministically to the lower class index. An optional mapping from
/// class IDs to names attaches labels to the results.
#[derive(Debug, Default)]
pub struct Topk {
    /// Optional mapping from class IDs to class names.
    class_id_map: Option<HashMap<usize, Arc<str>>>,
}

impl Topk {
    /// Creates a new Topk selector with an optional class-name mapping.
    pub fn new(class_id_map: Option<HashMap<usize, Arc<str>>>) -> Self {
        Self { class_id_map }
    }

    /// Creates a Topk selector without class names.
    pub fn without_class_names() -> Self {
        Self::new(None)
    }

    /// Creates a Topk selector with class names from a vector, where the
    /// vector index is the class ID.
    pub fn from_class_names(class_names: Vec<String>) -> Self {
        let class_id_map = class_names
            .into_iter()
            .enumerate()
            .map(|(id, name)| (id, Arc::from(name.as_str())))
            .collect();
        Self::new(Some(class_id_map))
    }

    /// Gets the class name for a class ID, if a mapping is configured.
    pub fn get_class_name(&self, class_id: usize) -> Option<&Arc<str>> {
        self.class_id_map.as_ref()?.get(&class_id)
    }

    /// Extracts the top `n` classes from each score vector.
    ///
    /// Each input row must have the same length C (the class count); the
    /// output preserves row order, with each prediction holding exactly `n`
    /// entries sorted by descending score.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::InvalidInput`] unless `1 <= n <= C`. The
    /// check runs before any selection work, so no partial results are
    /// produced.
    pub fn process(&self, rows: &[Vec<f32>], n: usize) -> Result<Vec<Prediction>, ClassifierError> {
        if n == 0 {
            return Err(ClassifierError::invalid_input(
                "top-N must be at least 1".to_string(),
            ));
        }
        for row in rows {
            if n > row.len() {
                return Err(ClassifierError::invalid_input(format!(
                    "top-N {} exceeds the {} available classes",
                    n,
                    row.len()
                )));
            }
        }

        Ok(rows.iter().map(|row| self.select(row, n)).collect())
    }

    /// Selects the top `n` entries of one score vector, descending, ties
    /// broken by lower class index. Caller guarantees `1 <= n <= len`.
    fn select(&self, scores: &[f32], n: usize) -> Prediction {
        let cmp = |a: &(usize, f32), b: &(usize, f32)| {
            b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
        };

        let mut indexed: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
        if n < indexed.len() {
            indexed.select_nth_unstable_by(n - 1, cmp);
            indexed.truncate(n);
        }
        indexed.sort_unstable_by(cmp);

        indexed
            .into_iter()
            .map(|(class_id, score)| ClassScore {
                class_id,
                score,
                label: self.get_class_name(class_id).cloned(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(prediction: &Prediction) -> Vec<usize> {
        prediction.iter().map(|entry| entry.class_id).collect()
    }

    #[test]
    fn test_top_two_of_five() {
        let topk = Topk::without_class_names();
        let rows = vec![vec![0.20, 0.90, 0.05, 0.30, 0.10]];

        let result = topk.process(&rows, 2).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].len(), 2);
        assert_eq!(result[0][0].class_id, 1);
        assert_eq!(result[0][0].score, 0.90);
        assert_eq!(result[0][1].class_id, 3);
        assert_eq!(result[0][1].score, 0.30);
    }

    #[test]
    fn test_n_equal_to_class_count_ranks_all() {
        let topk = Topk::without_class_names();
        let rows = vec![vec![0.20, 0.90, 0.05, 0.30, 0.10]];

        let result = topk.process(&rows, 5).unwrap();
        assert_eq!(ids(&result[0]), vec![1, 3, 0, 4, 2]);
    }

    #[test]
    fn test_n_out_of_range_is_rejected() {
        let topk = Topk::without_class_names();
        let rows = vec![vec![0.1, 0.8, 0.1]];

        assert!(matches!(
            topk.process(&rows, 0).unwrap_err(),
            ClassifierError::InvalidInput { .. }
        ));
        assert!(matches!(
            topk.process(&rows, 4).unwrap_err(),
            ClassifierError::InvalidInput { .. }
        ));
    }

    #[test]
    fn test_ties_resolve_to_lower_index() {
        let topk = Topk::without_class_names();
        let rows = vec![vec![0.5, 0.9, 0.5, 0.1]];

        let result = topk.process(&rows, 3).unwrap();
        assert_eq!(ids(&result[0]), vec![1, 0, 2]);
    }

    #[test]
    fn test_row_order_is_preserved() {
        let topk = Topk::without_class_names();
        let rows = vec![vec![0.1, 0.9, 0.0], vec![0.8, 0.05, 0.0]];

        let result = topk.process(&rows, 1).unwrap();
        assert_eq!(result[0][0].class_id, 1);
        assert_eq!(result[0][0].score, 0.9);
        assert_eq!(result[1][0].class_id, 0);
        assert_eq!(result[1][0].score, 0.8);
    }

    #[test]
    fn test_class_names_are_attached() {
        let topk = Topk::from_class_names(vec![
            "cat".to_string(),
            "dog".to_string(),
            "bird".to_string(),
        ]);
        let rows = vec![vec![0.1, 0.8, 0.1]];

        let result = topk.process(&rows, 2).unwrap();
        assert_eq!(result[0][0].label.as_deref(), Some("dog"));
        assert_eq!(result[0][1].label.as_deref(), Some("cat"));
    }

    #[test]
    fn test_empty_rows_yield_empty_result() {
        let topk = Topk::without_class_names();
        let result = topk.process(&[], 2).unwrap();
        assert!(result.is_empty());
    }
}
