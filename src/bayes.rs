use crate::error::{Error, Result};

/// Bernoulli Naive Bayes over two classes, `false` (spam) and `true` (good).
///
/// Features are binarized at `> 0`, per-feature probabilities use Laplace
/// smoothing and class priors follow the label frequencies of the training
/// set.
#[derive(Debug, Clone)]
pub struct BernoulliNb {
    /// Log prior per class, indexed by `label as usize`.
    class_log_prior: [f64; 2],
    /// `ln P(x_j = 1 | class)` per class and feature.
    log_prob: [Vec<f64>; 2],
    /// `ln P(x_j = 0 | class)` per class and feature.
    neg_log_prob: [Vec<f64>; 2],
}

const ALPHA: f64 = 1.0;

impl BernoulliNb {
    pub fn fit<V: AsRef<[u32]>>(features: &[V], labels: &[bool]) -> Result<Self> {
        if features.len() != labels.len() {
            return Err(Error::LabelCountMismatch {
                features: features.len(),
                labels: labels.len(),
            });
        }
        let width = match features.first() {
            Some(first) => first.as_ref().len(),
            None => return Err(Error::EmptyTrainingSet),
        };

        let mut class_count = [0usize; 2];
        let mut feature_count = [vec![0usize; width], vec![0usize; width]];
        for (index, (row, &label)) in features.iter().zip(labels).enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(Error::RaggedFeatures {
                    index,
                    expected: width,
                    found: row.len(),
                });
            }
            let class = label as usize;
            class_count[class] += 1;
            for (count, &value) in feature_count[class].iter_mut().zip(row) {
                if value > 0 {
                    *count += 1;
                }
            }
        }

        let total = features.len() as f64;
        let mut model = BernoulliNb {
            class_log_prior: [0.0; 2],
            log_prob: [vec![], vec![]],
            neg_log_prob: [vec![], vec![]],
        };
        for class in 0..2 {
            let n = class_count[class] as f64;
            // An unseen class gets ln(0) = -inf and is never predicted.
            model.class_log_prior[class] = (n / total).ln();
            let probs: Vec<f64> = feature_count[class]
                .iter()
                .map(|&count| (count as f64 + ALPHA) / (n + 2.0 * ALPHA))
                .collect();
            model.log_prob[class] = probs.iter().map(|p| p.ln()).collect();
            model.neg_log_prob[class] = probs.iter().map(|p| (1.0 - p).ln()).collect();
        }
        Ok(model)
    }

    pub fn width(&self) -> usize {
        self.log_prob[0].len()
    }

    /// Joint log likelihood of `features` under each class.
    pub fn log_likelihood(&self, features: &[u32]) -> Result<[f64; 2]> {
        if features.len() != self.width() {
            return Err(Error::DimensionMismatch {
                expected: self.width(),
                found: features.len(),
            });
        }
        let mut jll = self.class_log_prior;
        for (class, score) in jll.iter_mut().enumerate() {
            for (j, &value) in features.iter().enumerate() {
                *score += if value > 0 {
                    self.log_prob[class][j]
                } else {
                    self.neg_log_prob[class][j]
                };
            }
        }
        Ok(jll)
    }

    /// Ties go to `false`.
    pub fn predict(&self, features: &[u32]) -> Result<bool> {
        let [spam, good] = self.log_likelihood(features)?;
        Ok(good > spam)
    }
}
