use crate::error::OutlineError;
use crate::features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
use crate::models::{HeadingLevel, ModelPaths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub trait HeadingClassifier {
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<bool>, OutlineError>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForestModel {
    pub feature_names: Vec<String>,
    pub classes: Vec<i64>,
    pub trees: Vec<DecisionTree>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

/// Split nodes send a row left when `row[feature] <= threshold`. Leaves hold
/// per-class sample counts or probabilities, in `classes` order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForestClassifier {
    model: ForestModel,
}

impl ForestClassifier {
    pub fn load(path: &Path) -> Result<Self, OutlineError> {
        let raw = std::fs::read_to_string(path)?;
        let model: ForestModel =
            serde_json::from_str(&raw).map_err(|error| OutlineError::InvalidModel {
                path: path.display().to_string(),
                details: error.to_string(),
            })?;
        let classifier = Self::from_model(model).map_err(|details| OutlineError::InvalidModel {
            path: path.display().to_string(),
            details,
        })?;

        debug!(
            path = %path.display(),
            trees = classifier.model.trees.len(),
            classes = classifier.model.classes.len(),
            "loaded forest model"
        );
        Ok(classifier)
    }

    pub fn from_model(model: ForestModel) -> Result<Self, String> {
        if model.feature_names.len() != FEATURE_COUNT
            || model
                .feature_names
                .iter()
                .zip(FEATURE_NAMES)
                .any(|(actual, expected)| actual != expected)
        {
            return Err(format!(
                "feature names {:?} do not match {:?}",
                model.feature_names, FEATURE_NAMES
            ));
        }
        if model.classes.is_empty() {
            return Err("model has no classes".to_string());
        }
        if model.trees.is_empty() {
            return Err("model has no trees".to_string());
        }

        for (tree_index, tree) in model.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(format!("tree {tree_index} has no nodes"));
            }
            for (node_index, node) in tree.nodes.iter().enumerate() {
                match node {
                    TreeNode::Split {
                        feature,
                        left,
                        right,
                        ..
                    } => {
                        if *feature >= FEATURE_COUNT {
                            return Err(format!(
                                "tree {tree_index} node {node_index} splits on unknown feature {feature}"
                            ));
                        }
                        let in_bounds = |child: usize| child > node_index && child < tree.nodes.len();
                        if !in_bounds(*left) || !in_bounds(*right) {
                            return Err(format!(
                                "tree {tree_index} node {node_index} has invalid children {left}/{right}"
                            ));
                        }
                    }
                    TreeNode::Leaf { value } => {
                        if value.len() != model.classes.len() {
                            return Err(format!(
                                "tree {tree_index} node {node_index} has {} values for {} classes",
                                value.len(),
                                model.classes.len()
                            ));
                        }
                    }
                }
            }
        }

        Ok(Self { model })
    }

    pub fn classes(&self) -> &[i64] {
        &self.model.classes
    }

    pub fn predict_proba(&self, row: &FeatureVector) -> Vec<f64> {
        let mut totals = vec![0.0; self.model.classes.len()];

        for tree in &self.model.trees {
            let leaf = tree.leaf_for(row);
            let sum = leaf.iter().sum::<f64>();
            if sum > 0.0 {
                for (total, value) in totals.iter_mut().zip(leaf) {
                    *total += value / sum;
                }
            }
        }

        let tree_count = self.model.trees.len() as f64;
        totals.iter().map(|total| total / tree_count).collect()
    }

    pub fn predict_class(&self, row: &FeatureVector) -> i64 {
        let probabilities = self.predict_proba(row);
        let mut best = 0;
        for (index, probability) in probabilities.iter().enumerate() {
            if *probability > probabilities[best] {
                best = index;
            }
        }
        self.model.classes[best]
    }
}

impl DecisionTree {
    fn leaf_for(&self, row: &FeatureVector) -> &[f64] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { value } => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

impl HeadingClassifier for ForestClassifier {
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<bool>, OutlineError> {
        Ok(rows.iter().map(|row| self.predict_class(row) != 0).collect())
    }
}

#[derive(Debug, Clone)]
pub struct ModelBundle {
    pub heading: ForestClassifier,
    pub level: ForestClassifier,
}

impl ModelBundle {
    pub fn load(paths: &ModelPaths) -> Result<Self, OutlineError> {
        Ok(Self {
            heading: ForestClassifier::load(&paths.heading)?,
            level: ForestClassifier::load(&paths.level)?,
        })
    }

    pub fn level_label(&self, row: &FeatureVector) -> Option<HeadingLevel> {
        match self.level.predict_class(row) {
            1 => Some(HeadingLevel::H1),
            2 => Some(HeadingLevel::H2),
            3 => Some(HeadingLevel::H3),
            _ => None,
        }
    }
}

impl HeadingClassifier for ModelBundle {
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<bool>, OutlineError> {
        self.heading.predict(rows)
    }
}
