//! Additive tree ensembles (gradient boosted trees).
//!
//! ```text
//! raw(x) = base_score + Σ_t leaf_t(x)
//! ```
//!
//! Each tree is a flat node array rooted at index 0. A split sends `x` left when
//! `x[feature] <= threshold`. Every node records its training cover (the
//! number, or total hessian weight, of training rows that reached it); the
//! TreeSHAP explainer uses covers as the background distribution.

use serde::{Deserialize, Serialize};

/// Relative tolerance for `cover(parent) == cover(left) + cover(right)`.
const COVER_TOL: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        cover: f64,
    },
    Leaf {
        value: f64,
        cover: f64,
    },
}

impl TreeNode {
    pub fn cover(&self) -> f64 {
        match self {
            TreeNode::Split { cover, .. } | TreeNode::Leaf { cover, .. } => *cover,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    /// Value of the leaf that `x` falls into.
    pub fn predict(&self, x: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value, .. } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    /// Cover-weighted mean leaf value: the tree's output with no feature known.
    pub fn expected_value(&self) -> f64 {
        let root_cover = self.nodes[0].cover();
        self.nodes
            .iter()
            .map(|node| match node {
                TreeNode::Leaf { value, cover } => value * cover / root_cover,
                TreeNode::Split { .. } => 0.0,
            })
            .sum()
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn max_depth(&self) -> usize {
        let mut depth = vec![0usize; self.nodes.len()];
        let mut max = 0;
        for (idx, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split { left, right, .. } = node {
                depth[*left] = depth[idx] + 1;
                depth[*right] = depth[idx] + 1;
                max = max.max(depth[idx] + 1);
            }
        }
        max
    }

    /// Structural checks run once when a model is loaded.
    ///
    /// Children must have larger indices than their parent (no cycles), every
    /// non-root node must have exactly one parent, covers must be positive and
    /// a split's cover must equal the sum of its children's.
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        let mut parents = vec![0usize; self.nodes.len()];
        for (idx, node) in self.nodes.iter().enumerate() {
            let cover = node.cover();
            if !(cover.is_finite() && cover > 0.0) {
                return Err(format!("node {idx} has non-positive cover {cover}"));
            }
            match node {
                TreeNode::Leaf { value, .. } => {
                    if !value.is_finite() {
                        return Err(format!("leaf {idx} has non-finite value"));
                    }
                }
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    cover,
                } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "node {idx} splits on feature {feature} but the schema has {n_features} columns"
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {idx} has non-finite threshold"));
                    }
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(format!("node {idx} has invalid child index {child}"));
                        }
                        parents[child] += 1;
                    }
                    let child_cover = self.nodes[*left].cover() + self.nodes[*right].cover();
                    if (child_cover - cover).abs() > COVER_TOL * cover {
                        return Err(format!(
                            "node {idx} cover {cover} != children cover {child_cover}"
                        ));
                    }
                }
            }
        }

        if let Some(idx) = parents.iter().skip(1).position(|p| *p != 1) {
            return Err(format!("node {} is not reached exactly once", idx + 1));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub base_score: f64,
    pub trees: Vec<Tree>,
}

impl TreeEnsemble {
    pub fn raw_output(&self, x: &[f64]) -> f64 {
        self.base_score + self.trees.iter().map(|t| t.predict(x)).sum::<f64>()
    }

    pub fn expected_value(&self) -> f64 {
        self.base_score + self.trees.iter().map(Tree::expected_value).sum::<f64>()
    }

    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(Tree::max_depth).max().unwrap_or(0)
    }

    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        if !self.base_score.is_finite() {
            return Err("non-finite base_score".to_string());
        }
        if self.trees.is_empty() {
            return Err("ensemble has no trees".to_string());
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(n_features)
                .map_err(|e| format!("tree {idx}: {e}"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Stump on feature 0: left (x0 <= 0) = 2.0 with cover 6, right = -3.0 with cover 4.
    pub(crate) fn stump() -> Tree {
        Tree {
            nodes: vec![
                TreeNode::Split {
                    feature: 0,
                    threshold: 0.0,
                    left: 1,
                    right: 2,
                    cover: 10.0,
                },
                TreeNode::Leaf { value: 2.0, cover: 6.0 },
                TreeNode::Leaf {
                    value: -3.0,
                    cover: 4.0,
                },
            ],
        }
    }

    #[test]
    fn predict_follows_split_rule() {
        let tree = stump();
        assert_eq!(tree.predict(&[0.0]), 2.0);
        assert_eq!(tree.predict(&[-1.0]), 2.0);
        assert_eq!(tree.predict(&[0.01]), -3.0);
    }

    #[test]
    fn expected_value_is_cover_weighted() {
        assert!((stump().expected_value() - 0.0).abs() < 1e-12);
    }

    #[test]
    fn ensemble_adds_base_score() {
        let ensemble = TreeEnsemble {
            base_score: 10.0,
            trees: vec![stump(), stump()],
        };
        assert_eq!(ensemble.raw_output(&[-1.0]), 14.0);
        assert_eq!(ensemble.max_depth(), 1);
        assert!(ensemble.validate(1).is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_feature() {
        let err = stump().validate(0).unwrap_err();
        assert!(err.contains("feature 0"), "{err}");
    }

    #[test]
    fn validate_rejects_inconsistent_cover() {
        let mut tree = stump();
        tree.nodes[1] = TreeNode::Leaf { value: 2.0, cover: 7.0 };
        assert!(tree.validate(1).unwrap_err().contains("cover"));
    }

    #[test]
    fn validate_rejects_backward_child() {
        let mut tree = stump();
        tree.nodes[0] = TreeNode::Split {
            feature: 0,
            threshold: 0.0,
            left: 0,
            right: 2,
            cover: 10.0,
        };
        assert!(tree.validate(1).is_err());
    }

    #[test]
    fn nodes_deserialize_from_tagged_json() {
        let tree: Tree = serde_json::from_str(
            r#"{"nodes": [
                {"type": "split", "feature": 0, "threshold": 0.0, "left": 1, "right": 2, "cover": 10},
                {"type": "leaf", "value": 2.0, "cover": 6},
                {"type": "leaf", "value": -3.0, "cover": 4}
            ]}"#,
        )
        .unwrap();
        assert_eq!(tree, stump());
    }
}
