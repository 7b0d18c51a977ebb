//! Gradient boosted tree ensembles saved by XGBoost as JSON
//! (`Booster.save_model("model.json")` or `XGBClassifier.save_model`).
//!
//! Only what a binary classifier needs is read: the `gbtree` booster, the
//! logistic objective, the base score and the numeric split arrays of every
//! tree. Everything else in the document is ignored.

use crate::error::{ArtifactLoadError, PredictionError};
use crate::inference::Classifier;
use crate::types::{FeatureColumn, ModelInput, FEATURE_COUNT};
use serde::{Deserialize, Deserializer};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;

const SUPPORTED_OBJECTIVES: [&str; 2] = ["binary:logistic", "reg:logistic"];

#[derive(Debug, Error)]
pub enum XgbModelError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Malformed(String),
}

#[derive(Deserialize)]
struct ModelFile {
    learner: Learner,
}

#[derive(Deserialize)]
struct Learner {
    #[serde(default)]
    feature_names: Vec<String>,
    gradient_booster: GradientBooster,
    learner_model_param: LearnerModelParam,
    objective: Objective,
}

#[derive(Deserialize)]
struct GradientBooster {
    name: String,
    #[serde(default)]
    model: Option<TreeEnsemble>,
}

#[derive(Deserialize)]
struct TreeEnsemble {
    trees: Vec<RawTree>,
}

#[derive(Deserialize)]
struct RawTree {
    left_children: Vec<i64>,
    right_children: Vec<i64>,
    split_indices: Vec<i64>,
    split_conditions: Vec<f32>,
    #[serde(deserialize_with = "flags")]
    default_left: Vec<bool>,
    #[serde(default)]
    split_type: Vec<u8>,
}

#[derive(Deserialize)]
struct LearnerModelParam {
    base_score: String,
    #[serde(default)]
    num_class: Option<String>,
    num_feature: String,
}

#[derive(Deserialize)]
struct Objective {
    name: String,
}

/// Older releases write `default_left` as booleans, newer ones as 0/1.
#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

fn flags<'de, D>(deserializer: D) -> Result<Vec<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<Flag>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|flag| match flag {
            Flag::Bool(value) => value,
            Flag::Int(value) => value != 0,
        })
        .collect())
}

/// Learner parameters are stored as strings, sometimes wrapped as a
/// one-element vector (`"[5E-1]"`).
fn parse_param(name: &str, raw: &str) -> Result<f64, XgbModelError> {
    let trimmed = raw.trim().trim_start_matches('[').trim_end_matches(']');
    let first = trimmed.split(',').next().unwrap_or_default().trim();
    first
        .parse::<f64>()
        .map_err(|_| XgbModelError::Malformed(format!("{name} is not a number: {raw:?}")))
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
        default_left: bool,
    },
    Leaf(f32),
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Checks the parallel node arrays and turns them into nodes.
    ///
    /// Children must point forward, so walking a validated tree always ends
    /// on a leaf.
    fn from_raw(position: usize, raw: RawTree) -> Result<Self, XgbModelError> {
        let malformed = |reason: String| XgbModelError::Malformed(format!("tree {position}: {reason}"));

        let len = raw.left_children.len();
        if len == 0 {
            return Err(malformed("has no nodes".to_string()));
        }
        let lengths = [
            raw.right_children.len(),
            raw.split_indices.len(),
            raw.split_conditions.len(),
            raw.default_left.len(),
        ];
        if lengths.iter().any(|&other| other != len) {
            return Err(malformed("node arrays have different lengths".to_string()));
        }
        if raw.split_type.iter().any(|&kind| kind != 0) {
            return Err(malformed("categorical splits are not supported".to_string()));
        }

        let child = |node: usize, value: i64| -> Result<usize, XgbModelError> {
            match usize::try_from(value) {
                Ok(index) if index > node && index < len => Ok(index),
                _ => Err(malformed(format!("node {node} has invalid child {value}"))),
            }
        };

        let mut nodes = Vec::with_capacity(len);
        for node in 0..len {
            let (left, right) = (raw.left_children[node], raw.right_children[node]);
            if left == -1 && right == -1 {
                nodes.push(Node::Leaf(raw.split_conditions[node]));
                continue;
            }
            let feature = usize::try_from(raw.split_indices[node])
                .ok()
                .filter(|&feature| feature < FEATURE_COUNT)
                .ok_or_else(|| {
                    malformed(format!(
                        "node {node} splits on unknown feature {}",
                        raw.split_indices[node]
                    ))
                })?;
            nodes.push(Node::Split {
                feature,
                threshold: raw.split_conditions[node],
                left: child(node, left)?,
                right: child(node, right)?,
                default_left: raw.default_left[node],
            });
        }
        Ok(Self { nodes })
    }

    fn leaf_value(&self, features: &[f32]) -> f32 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                Node::Leaf(value) => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    let value = features[feature];
                    index = if value.is_nan() {
                        if default_left {
                            left
                        } else {
                            right
                        }
                    } else if value < threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

/// Binary logistic tree ensemble evaluated in-process.
#[derive(Debug, Clone)]
pub struct XgbClassifier {
    trees: Vec<Tree>,
    base_margin: f64,
    objective: String,
}

impl XgbClassifier {
    pub fn load(path: &Path) -> Result<Self, ArtifactLoadError> {
        let file = File::open(path).map_err(|source| ArtifactLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file)).map_err(|err| match err {
            XgbModelError::Json(source) => ArtifactLoadError::Json {
                path: path.to_path_buf(),
                source,
            },
            XgbModelError::Malformed(reason) => ArtifactLoadError::Malformed {
                path: path.to_path_buf(),
                reason,
            },
        })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, XgbModelError> {
        let file: ModelFile = serde_json::from_reader(reader)?;
        Self::from_learner(file.learner)
    }

    fn from_learner(learner: Learner) -> Result<Self, XgbModelError> {
        if learner.gradient_booster.name != "gbtree" {
            return Err(XgbModelError::Malformed(format!(
                "booster {:?} is not supported, expected \"gbtree\"",
                learner.gradient_booster.name
            )));
        }
        let objective = learner.objective.name;
        if !SUPPORTED_OBJECTIVES.contains(&objective.as_str()) {
            return Err(XgbModelError::Malformed(format!(
                "objective {objective:?} is not a binary logistic objective"
            )));
        }

        let params = learner.learner_model_param;
        if let Some(num_class) = &params.num_class {
            if parse_param("num_class", num_class)? > 1.0 {
                return Err(XgbModelError::Malformed(format!(
                    "multi-class model with {num_class} classes"
                )));
            }
        }
        let num_feature = parse_param("num_feature", &params.num_feature)?;
        if num_feature != FEATURE_COUNT as f64 {
            return Err(XgbModelError::Malformed(format!(
                "model expects {num_feature} features, not {FEATURE_COUNT}"
            )));
        }
        if !learner.feature_names.is_empty() && learner.feature_names != FeatureColumn::names() {
            return Err(XgbModelError::Malformed(format!(
                "feature names {:?} do not match the expected column order {:?}",
                learner.feature_names,
                FeatureColumn::names()
            )));
        }

        let base_score = parse_param("base_score", &params.base_score)?;
        if !(base_score > 0.0 && base_score < 1.0) {
            return Err(XgbModelError::Malformed(format!(
                "base_score {base_score} is not a probability"
            )));
        }

        let ensemble = learner
            .gradient_booster
            .model
            .ok_or_else(|| XgbModelError::Malformed("gbtree booster has no model".to_string()))?;
        let trees = ensemble
            .trees
            .into_iter()
            .enumerate()
            .map(|(position, raw)| Tree::from_raw(position, raw))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            trees,
            base_margin: (base_score / (1.0 - base_score)).ln(),
            objective,
        })
    }

    /// Raw additive score before the sigmoid.
    pub fn margin(&self, input: &ModelInput) -> f64 {
        let features = input.as_slice();
        self.trees
            .iter()
            .map(|tree| f64::from(tree.leaf_value(features)))
            .sum::<f64>()
            + self.base_margin
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for XgbClassifier {
    fn predict_proba(&self, input: &ModelInput) -> Result<[f64; 2], PredictionError> {
        let positive = 1.0 / (1.0 + (-self.margin(input)).exp());
        Ok([1.0 - positive, positive])
    }

    fn detail(&self) -> String {
        format!(
            "XGBoost gbtree ({} trees, objective {})",
            self.trees.len(),
            self.objective
        )
    }
}
