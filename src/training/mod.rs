//! Model training module
//!
//! Provides the classifiers the playground can train:
//! - Logistic regression (multinomial)
//! - Support Vector Machines (SMO, One-vs-Rest)
//! - K-Nearest Neighbors
//! - Decision trees
//!
//! plus the registry that maps identifiers and JSON hyperparameters onto
//! them, and the seeded split/fit/score pipeline.

mod models;
mod scaler;
pub mod decision_tree;
pub mod knn;
pub mod linear_models;
pub mod pipeline;
pub mod registry;
pub mod split;
pub mod svm;

pub use decision_tree::{Criterion, DecisionTree, TreeNode};
pub use knn::{KNNClassifier, WeightScheme};
pub use linear_models::LogisticRegression;
pub use models::{accuracy, Classifier};
pub use pipeline::{train, TrainingRequest, TrainingResult, DEFAULT_DATASET};
pub use registry::{
    DecisionTreeParams, KnnParams, LogisticRegressionParams, ModelKind, ModelSpec, SvmParams,
};
pub use scaler::StandardScaler;
pub use split::{split_indices, train_test_split, SplitIndices, TrainTestSplit, SPLIT_SEED, TEST_FRACTION};
pub use svm::{KernelType, SVMClassifier};
