//! Decision tree node implementation
//!
//! Trees are stored as flat node arrays with children referenced by index,
//! which keeps them trivially serializable and cache friendly on the phone.

use metsense_core::MetClass;
use serde::{Deserialize, Serialize};

use crate::{MlError, MlResult};

/// Class probabilities indexed by `MetClass::index`
pub type ClassProbabilities = [f32; MetClass::COUNT];

/// Node type in the decision tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeType {
    /// Internal node with split condition
    Internal {
        /// Feature index to split on
        feature: usize,
        /// Values `<= threshold` go left
        threshold: f32,
        /// Left child index
        left: usize,
        /// Right child index
        right: usize,
    },
    /// Leaf node
    Leaf {
        /// Class distribution of the training samples that reached it
        probabilities: ClassProbabilities,
        /// Number of training samples that reached it
        samples: usize,
    },
}

/// Node with its depth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node type and data
    pub node_type: NodeType,
    /// Distance from the root
    pub depth: u8,
}

impl Node {
    /// Create an internal node
    pub fn internal(feature: usize, threshold: f32, left: usize, right: usize, depth: u8) -> Self {
        Self {
            node_type: NodeType::Internal {
                feature,
                threshold,
                left,
                right,
            },
            depth,
        }
    }

    /// Create a leaf from class counts
    pub fn leaf(counts: &[usize; MetClass::COUNT], depth: u8) -> Self {
        let samples: usize = counts.iter().sum();
        let mut probabilities = [0.0; MetClass::COUNT];
        if samples > 0 {
            for (p, &count) in probabilities.iter_mut().zip(counts) {
                *p = count as f32 / samples as f32;
            }
        }
        Self {
            node_type: NodeType::Leaf {
                probabilities,
                samples,
            },
            depth,
        }
    }

    /// Check if node is a leaf
    pub fn is_leaf(&self) -> bool {
        matches!(self.node_type, NodeType::Leaf { .. })
    }

    /// Child index to visit next for a feature row
    pub fn traverse(&self, features: &[f32]) -> MlResult<usize> {
        match self.node_type {
            NodeType::Internal {
                feature,
                threshold,
                left,
                right,
            } => {
                let value = features.get(feature).copied().ok_or(
                    MlError::FeatureLengthMismatch {
                        expected: feature + 1,
                        actual: features.len(),
                    },
                )?;
                if value <= threshold {
                    Ok(left)
                } else {
                    Ok(right)
                }
            }
            NodeType::Leaf { .. } => Err(MlError::InvalidMetadata(
                "cannot traverse from a leaf node".into(),
            )),
        }
    }
}
