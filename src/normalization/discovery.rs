use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumMessage, EnumString, IntoStaticStr};

use crate::core::{FeatureVector, Ragged};
use crate::error::{EsvmError, Result};
use crate::normalization::{
    FeatureNormalization, Granularity, NormMethod, NormParams, NormalizationPlan,
    PerFeatureParams, RunningStats,
};

/// How a [`NormalizationPlan`] pools its reference population.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
    Display,
    EnumIter,
    EnumString,
    EnumMessage,
    IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DiscoveryScope {
    #[strum(
        message = "Per patch",
        detailed_message = "One over-all pair per patch, from that patch's samples."
    )]
    PerPatch,
    #[strum(
        message = "Per patch, per feature",
        detailed_message = "One pair per feature index per patch."
    )]
    PerPatchPerFeature,
    #[default]
    #[strum(
        message = "Across patches",
        detailed_message = "A single pair pooled over every value of every patch."
    )]
    AcrossPatches,
    #[strum(
        message = "Across patches, per feature",
        detailed_message = "One pair per feature index pooled over every sample of every patch."
    )]
    AcrossPatchesPerFeature,
}

/// Over-all parameters for a flat list of values (a vector or a score list).
pub fn find_for_values(values: &[f64], method: NormMethod) -> Result<NormParams> {
    let mut stats = RunningStats::new();
    stats.extend(values.iter().copied());
    stats.params(method)
}

fn per_feature_stats<'a, I>(vectors: I) -> Result<Vec<RunningStats>>
where
    I: IntoIterator<Item = &'a FeatureVector>,
{
    let mut stats: Option<Vec<RunningStats>> = None;
    for v in vectors {
        let per_feature = stats.get_or_insert_with(|| vec![RunningStats::new(); v.len()]);
        if per_feature.len() != v.len() {
            return Err(EsvmError::DimensionMismatch {
                expected: per_feature.len(),
                actual: v.len(),
            });
        }
        for (s, &x) in per_feature.iter_mut().zip(v) {
            s.add(x);
        }
    }
    stats.ok_or_else(|| EsvmError::EmptyPopulation("no feature vectors".into()))
}

fn per_feature_params(stats: &[RunningStats], method: NormMethod) -> Result<FeatureNormalization> {
    let mut first = Vec::with_capacity(stats.len());
    let mut second = Vec::with_capacity(stats.len());
    for s in stats {
        let p = s.params(method)?;
        first.push(p.first);
        second.push(p.second);
    }
    Ok(FeatureNormalization::PerFeature(PerFeatureParams {
        method,
        first,
        second,
    }))
}

/// Parameters for one sample set, independently of any other set.
pub fn find_per_sample_set(
    set: &[FeatureVector],
    granularity: Granularity,
    method: NormMethod,
) -> Result<FeatureNormalization> {
    match granularity {
        Granularity::OverAll => {
            let mut stats = RunningStats::new();
            for v in set {
                stats.extend(v.iter().copied());
            }
            Ok(FeatureNormalization::OverAll(stats.params(method)?))
        }
        Granularity::PerFeature => per_feature_params(&per_feature_stats(set)?, method),
    }
}

/// A single over-all pair pooled over every value of every patch.
pub fn find_across_patches(
    patches: &Ragged<Ragged<FeatureVector>>,
    method: NormMethod,
) -> Result<NormParams> {
    let mut stats = RunningStats::new();
    for v in patches.iter().flat_map(Ragged::iter) {
        stats.extend(v.iter().copied());
    }
    stats.params(method)
}

/// One pair per feature index, pooled over every sample of every patch.
pub fn find_across_patches_per_feature(
    patches: &Ragged<Ragged<FeatureVector>>,
    method: NormMethod,
) -> Result<FeatureNormalization> {
    let stats = per_feature_stats(patches.iter().flat_map(Ragged::iter))?;
    per_feature_params(&stats, method)
}

/// Builds the plan for a reference population indexed `[patch][sample]`.
pub fn discover(
    patches: &Ragged<Ragged<FeatureVector>>,
    scope: DiscoveryScope,
    method: NormMethod,
) -> Result<NormalizationPlan> {
    let plan = match scope {
        DiscoveryScope::PerPatch | DiscoveryScope::PerPatchPerFeature => {
            let granularity = if scope == DiscoveryScope::PerPatch {
                Granularity::OverAll
            } else {
                Granularity::PerFeature
            };
            let per_patch = patches
                .iter()
                .map(|patch| find_per_sample_set(patch.as_slice(), granularity, method))
                .collect::<Result<Vec<_>>>()?;
            NormalizationPlan::PerPatch(per_patch)
        }
        DiscoveryScope::AcrossPatches => NormalizationPlan::Shared(FeatureNormalization::OverAll(
            find_across_patches(patches, method)?,
        )),
        DiscoveryScope::AcrossPatchesPerFeature => {
            NormalizationPlan::Shared(find_across_patches_per_feature(patches, method)?)
        }
    };
    tracing::debug!(%scope, %method, patches = patches.len(), "discovered normalization plan");
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    const EPS: f64 = 1e-12;

    fn population() -> Ragged<Ragged<FeatureVector>> {
        let mut p: Ragged<Ragged<FeatureVector>> = Ragged::new();
        p.push(vec![vec![0.0, 10.0], vec![2.0, 20.0]].into());
        p.push(vec![vec![-4.0, 5.0], vec![1.0, 15.0], vec![3.0, 30.0]].into());
        p
    }

    #[test]
    fn per_sample_set_over_all_pools_every_value() {
        let set = vec![vec![1.0, 5.0], vec![-3.0, 2.0]];
        let n = find_per_sample_set(&set, Granularity::OverAll, NormMethod::MinMax).unwrap();
        assert_eq!(n, FeatureNormalization::OverAll(NormParams::min_max(-3.0, 5.0)));
    }

    #[test]
    fn per_sample_set_per_feature_keeps_indices_apart() {
        let set = vec![vec![1.0, 5.0], vec![-3.0, 2.0]];
        let n = find_per_sample_set(&set, Granularity::PerFeature, NormMethod::MinMax).unwrap();
        let FeatureNormalization::PerFeature(p) = n else {
            panic!("expected per-feature params");
        };
        assert_eq!(p.first, vec![-3.0, 2.0]);
        assert_eq!(p.second, vec![1.0, 5.0]);
    }

    #[test]
    fn per_feature_rejects_ragged_dimensions() {
        let set = vec![vec![1.0, 5.0], vec![-3.0]];
        assert!(matches!(
            find_per_sample_set(&set, Granularity::PerFeature, NormMethod::ZScore),
            Err(EsvmError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn empty_population_is_reported() {
        let empty: Vec<FeatureVector> = vec![];
        assert!(matches!(
            find_per_sample_set(&empty, Granularity::PerFeature, NormMethod::MinMax),
            Err(EsvmError::EmptyPopulation(_))
        ));
        assert!(matches!(
            find_across_patches(&Ragged::new(), NormMethod::MinMax),
            Err(EsvmError::EmptyPopulation(_))
        ));
    }

    #[test]
    fn across_patches_yields_one_global_pair() {
        let p = find_across_patches(&population(), NormMethod::MinMax).unwrap();
        assert_eq!(p, NormParams::min_max(-4.0, 30.0));
    }

    #[test]
    fn across_patches_per_feature_pools_samples_of_all_patches() {
        let n = find_across_patches_per_feature(&population(), NormMethod::ZScore).unwrap();
        let FeatureNormalization::PerFeature(p) = n else {
            panic!("expected per-feature params");
        };
        // feature 0 values: 0, 2, -4, 1, 3 -> mean 0.4
        assert!((p.first[0] - 0.4).abs() < EPS);
        // feature 1 values: 10, 20, 5, 15, 30 -> mean 16
        assert!((p.first[1] - 16.0).abs() < EPS);
        assert!(p.second.iter().all(|s| *s > 0.0));
    }

    #[test]
    fn discover_per_patch_builds_one_entry_per_patch() {
        let plan = discover(&population(), DiscoveryScope::PerPatch, NormMethod::MinMax).unwrap();
        assert_eq!(plan.patch_count(), Some(2));
        assert_eq!(
            plan.for_patch(0).unwrap(),
            &FeatureNormalization::OverAll(NormParams::min_max(0.0, 20.0))
        );
        assert_eq!(
            plan.for_patch(1).unwrap(),
            &FeatureNormalization::OverAll(NormParams::min_max(-4.0, 30.0))
        );
    }

    #[test]
    fn discover_shared_scopes() {
        let plan =
            discover(&population(), DiscoveryScope::AcrossPatches, NormMethod::MinMax).unwrap();
        assert_eq!(plan.patch_count(), None);
        let n = plan.apply(7, &[-4.0, 30.0], false).unwrap();
        assert_eq!(n, vec![0.0, 1.0]);

        let plan = discover(
            &population(),
            DiscoveryScope::AcrossPatchesPerFeature,
            NormMethod::MinMax,
        )
        .unwrap();
        let n = plan.apply(0, &[-4.0, 30.0], false).unwrap();
        assert_eq!(n, vec![0.0, 1.0]);
    }

    #[test]
    fn discovered_params_are_reused_not_refit_on_probes() {
        let plan =
            discover(&population(), DiscoveryScope::AcrossPatches, NormMethod::MinMax).unwrap();
        // a probe outside the reference range is not rescaled to [0, 1]
        let n = plan.apply(0, &[64.0], false).unwrap();
        assert!(n[0] > 1.0);
    }
}
