pub mod discovery;
mod functions;
mod method;
mod score;
mod statistics;

pub use discovery::{DiscoveryScope, discover};
pub use functions::{
    normalize_min_max, normalize_over_all, normalize_over_all_self, normalize_per_feature,
    normalize_z_score,
};
pub use method::{
    FeatureNormalization, Granularity, NormMethod, NormParams, NormalizationPlan,
    PerFeatureParams,
};
pub use score::{find_score_params, normalize_class_score_to_similarity, normalize_scores};
pub use statistics::RunningStats;
