use crate::bayes::BernoulliNb;
use crate::cache::FeatureCache;
use crate::error::Result;
use std::path::Path;

/// Fits a fresh model on every cached record and predicts whether
/// `features` belongs to a good message.
pub fn train_and_predict(cache: &FeatureCache, features: &[u32]) -> Result<bool> {
    let (vectors, labels): (Vec<&[u32]>, Vec<bool>) = cache
        .records()
        .values()
        .map(|record| (record.features(), record.good()))
        .unzip();
    let model = BernoulliNb::fit(&vectors, &labels)?;
    model.predict(features)
}

/// Loads the cache from `path` and runs [`train_and_predict`].
pub fn predict_from_cache(path: &Path, features: &[u32]) -> Result<bool> {
    let cache = FeatureCache::load(path)?;
    train_and_predict(&cache, features)
}
