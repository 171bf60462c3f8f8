//! Multi-output tree ensemble evaluated natively
//!
//! The artifact stores one estimator per target, each a forest of
//! regression trees in flat array form: node `n` splits on
//! `feature[n] <= threshold[n]` and descends to `children_left[n]` or
//! `children_right[n]`; a node whose left child is `-1` is a leaf holding
//! `value[n]`. An estimator predicts the mean of its trees' leaves.

use super::PointModel;
use crate::error::{ForecastError, Result};
use crate::schema::{check_columns, check_feature_names, FEATURE_COUNT, POINT_TARGETS};
use serde::{Deserialize, Serialize};

/// Marker for "no child" in the flat node arrays
const LEAF: i64 = -1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeArtifact {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorArtifact {
    pub trees: Vec<TreeArtifact>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestArtifact {
    /// Input columns, must equal the feature schema
    pub features: Vec<String>,
    /// Output columns, one estimator each, must be `[temperatura, lluvia]`
    pub targets: Vec<String>,
    pub estimators: Vec<EstimatorArtifact>,
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn from_artifact(tree: &TreeArtifact) -> std::result::Result<Self, String> {
        let n = tree.children_left.len();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }
        let lengths = [
            tree.children_right.len(),
            tree.feature.len(),
            tree.threshold.len(),
            tree.value.len(),
        ];
        if lengths.iter().any(|&len| len != n) {
            return Err(format!("node arrays differ in length ({} vs {:?})", n, lengths));
        }

        let nodes = (0..n)
            .map(|i| {
                let (left, right) = (tree.children_left[i], tree.children_right[i]);
                if left == LEAF {
                    let value = tree.value[i];
                    if !value.is_finite() {
                        return Err(format!("leaf {} holds a non-finite value", i));
                    }
                    return Ok(Node::Leaf(value));
                }
                // Children always come after their parent, which rules out cycles
                let child = |c: i64| -> std::result::Result<usize, String> {
                    usize::try_from(c)
                        .ok()
                        .filter(|&c| c > i && c < n)
                        .ok_or_else(|| format!("node {} has out-of-order child {}", i, c))
                };
                let feature = usize::try_from(tree.feature[i])
                    .ok()
                    .filter(|&f| f < FEATURE_COUNT)
                    .ok_or_else(|| {
                        format!("node {} splits on unknown feature {}", i, tree.feature[i])
                    })?;
                Ok(Node::Split {
                    feature,
                    threshold: tree.threshold[i],
                    left: child(left)?,
                    right: child(right)?,
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { nodes })
    }

    fn predict(&self, features: &[f32; FEATURE_COUNT]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf(value) => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if f64::from(features[feature]) <= threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

/// Native multi-output forest: one list of trees per target
#[derive(Debug, Clone)]
pub struct ForestModel {
    estimators: Vec<Vec<Tree>>,
}

impl ForestModel {
    pub fn from_artifact(artifact: &ForestArtifact) -> Result<Self> {
        check_feature_names(&artifact.features)?;
        check_columns(&POINT_TARGETS, &artifact.targets)?;
        if artifact.estimators.len() != POINT_TARGETS.len() {
            return Err(ForecastError::ShapeMismatch {
                what: "forest estimators",
                expected: POINT_TARGETS.len(),
                actual: artifact.estimators.len(),
            });
        }

        let estimators = artifact
            .estimators
            .iter()
            .zip(POINT_TARGETS)
            .map(|(estimator, target)| {
                if estimator.trees.is_empty() {
                    return Err(ForecastError::invalid_artifact(
                        "<forest>",
                        format!("estimator for `{}` has no trees", target),
                    ));
                }
                estimator
                    .trees
                    .iter()
                    .enumerate()
                    .map(|(t, tree)| {
                        Tree::from_artifact(tree).map_err(|reason| {
                            ForecastError::invalid_artifact(
                                "<forest>",
                                format!("`{}` tree {}: {}", target, t, reason),
                            )
                        })
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { estimators })
    }

    pub fn tree_count(&self) -> usize {
        self.estimators.iter().map(Vec::len).sum()
    }
}

impl PointModel for ForestModel {
    fn predict(&self, features: &[f32; FEATURE_COUNT]) -> Result<[f64; 2]> {
        let mut out = [0.0; 2];
        for (slot, trees) in out.iter_mut().zip(&self.estimators) {
            let sum: f64 = trees.iter().map(|tree| tree.predict(features)).sum();
            *slot = sum / trees.len() as f64;
        }
        Ok(out)
    }

    fn family(&self) -> &'static str {
        "forest"
    }
}
