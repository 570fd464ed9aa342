//! Built-in reference datasets
//!
//! Each dataset is synthesised from per-class feature statistics with a fixed
//! seed, so every call yields the same rows. Shapes and class balance follow
//! the classic iris, wine and breast cancer datasets.

use super::{Dataset, Label};
use crate::error::Result;
use ndarray::Array2;
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Bundled datasets, in listing order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinDataset {
    Iris,
    Wine,
    BreastCancer,
}

/// Per-class statistics for one feature: (name, mean per class, spread per class)
type FeatureStats<'a> = (&'a str, &'a [f64], &'a [f64]);

const IRIS_CLASS_SIZES: [usize; 3] = [50, 50, 50];

const IRIS_FEATURES: [FeatureStats<'static>; 4] = [
    ("sepal length (cm)", &[5.006, 5.936, 6.588], &[0.352, 0.516, 0.636]),
    ("sepal width (cm)", &[3.428, 2.770, 2.974], &[0.379, 0.314, 0.322]),
    ("petal length (cm)", &[1.462, 4.260, 5.552], &[0.174, 0.470, 0.552]),
    ("petal width (cm)", &[0.246, 1.326, 2.026], &[0.105, 0.198, 0.275]),
];

const WINE_CLASS_SIZES: [usize; 3] = [59, 71, 48];

const WINE_FEATURES: [FeatureStats<'static>; 13] = [
    ("alcohol", &[13.74, 12.28, 13.15], &[0.46, 0.54, 0.53]),
    ("malic_acid", &[2.01, 1.93, 3.33], &[0.69, 1.02, 1.09]),
    ("ash", &[2.46, 2.24, 2.44], &[0.23, 0.32, 0.18]),
    ("alcalinity_of_ash", &[17.04, 20.24, 21.42], &[2.55, 3.35, 2.26]),
    ("magnesium", &[106.3, 94.5, 99.3], &[10.5, 16.8, 10.9]),
    ("total_phenols", &[2.84, 2.26, 1.68], &[0.34, 0.55, 0.36]),
    ("flavanoids", &[2.98, 2.08, 0.78], &[0.40, 0.71, 0.29]),
    ("nonflavanoid_phenols", &[0.29, 0.36, 0.45], &[0.07, 0.12, 0.12]),
    ("proanthocyanins", &[1.90, 1.63, 1.15], &[0.41, 0.60, 0.41]),
    ("color_intensity", &[5.53, 3.09, 7.40], &[1.24, 0.92, 2.31]),
    ("hue", &[1.06, 1.06, 0.68], &[0.12, 0.20, 0.11]),
    ("od280/od315_of_diluted_wines", &[3.16, 2.79, 1.68], &[0.36, 0.50, 0.27]),
    ("proline", &[1116.0, 520.0, 630.0], &[221.0, 158.0, 115.0]),
];

/// Malignant (0) then benign (1)
const BREAST_CANCER_CLASS_SIZES: [usize; 2] = [212, 357];

/// Base measurements: (name, mean per class, spread per class) for the "mean" variant.
/// The "error" and "worst" variants are derived from these.
const BREAST_CANCER_BASE: [FeatureStats<'static>; 10] = [
    ("radius", &[17.46, 12.15], &[3.20, 1.78]),
    ("texture", &[21.60, 17.91], &[3.78, 4.00]),
    ("perimeter", &[115.4, 78.08], &[21.9, 11.8]),
    ("area", &[978.0, 463.0], &[368.0, 134.0]),
    ("smoothness", &[0.1029, 0.0925], &[0.0126, 0.0134]),
    ("compactness", &[0.145, 0.080], &[0.054, 0.034]),
    ("concavity", &[0.161, 0.046], &[0.075, 0.043]),
    ("concave points", &[0.088, 0.0257], &[0.034, 0.0159]),
    ("symmetry", &[0.193, 0.174], &[0.0276, 0.0248]),
    ("fractal dimension", &[0.0627, 0.0629], &[0.0075, 0.0067]),
];

/// Ratio of the "error" variant mean to the "mean" variant, per class
const ERROR_RATIO: [f64; 2] = [0.10, 0.07];
/// Ratio of the "worst" variant mean to the "mean" variant, per class
const WORST_RATIO: [f64; 2] = [1.25, 1.12];

impl BuiltinDataset {
    /// All built-ins in their fixed listing order
    pub const ALL: [BuiltinDataset; 3] = [
        BuiltinDataset::Iris,
        BuiltinDataset::Wine,
        BuiltinDataset::BreastCancer,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BuiltinDataset::Iris => "iris",
            BuiltinDataset::Wine => "wine",
            BuiltinDataset::BreastCancer => "breast_cancer",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|b| b.name()).collect()
    }

    fn seed(&self) -> u64 {
        match self {
            BuiltinDataset::Iris => 0x1815,
            BuiltinDataset::Wine => 0x3715,
            BuiltinDataset::BreastCancer => 0x5690,
        }
    }

    /// Generate the dataset. Deterministic: identical on every call.
    pub fn load(&self) -> Result<Dataset> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.seed());
        match self {
            BuiltinDataset::Iris => generate(self.name(), &IRIS_FEATURES, &IRIS_CLASS_SIZES, &mut rng),
            BuiltinDataset::Wine => generate(self.name(), &WINE_FEATURES, &WINE_CLASS_SIZES, &mut rng),
            BuiltinDataset::BreastCancer => generate_breast_cancer(&mut rng),
        }
    }
}

/// Approximately standard-normal draw (Irwin-Hall sum of four uniforms).
fn standard_draw(rng: &mut Xoshiro256PlusPlus) -> f64 {
    let sum: f64 = (0..4).map(|_| rng.gen::<f64>()).sum();
    (sum - 2.0) * 3f64.sqrt()
}

fn generate(
    name: &str,
    features: &[FeatureStats<'_>],
    class_sizes: &[usize],
    rng: &mut Xoshiro256PlusPlus,
) -> Result<Dataset> {
    let n_samples: usize = class_sizes.iter().sum();
    let n_features = features.len();

    let mut values = Vec::with_capacity(n_samples * n_features);
    let mut target = Vec::with_capacity(n_samples);

    for (class, &size) in class_sizes.iter().enumerate() {
        for _ in 0..size {
            for (_, means, spreads) in features {
                let v = means[class] + spreads[class] * standard_draw(rng);
                // all reference measurements are non-negative
                values.push(round4(v.abs()));
            }
            target.push(Label::Integer(class as i64));
        }
    }

    let feature_names = features.iter().map(|(n, _, _)| n.to_string()).collect();
    let matrix = Array2::from_shape_vec((n_samples, n_features), values)?;
    Dataset::new(name, feature_names, matrix, target)
}

fn generate_breast_cancer(rng: &mut Xoshiro256PlusPlus) -> Result<Dataset> {
    let mut names: Vec<String> = Vec::with_capacity(30);
    let mut means: Vec<[f64; 2]> = Vec::with_capacity(30);
    let mut spreads: Vec<[f64; 2]> = Vec::with_capacity(30);

    for (base, m, s) in BREAST_CANCER_BASE.iter() {
        names.push(format!("mean {}", base));
        means.push([m[0], m[1]]);
        spreads.push([s[0], s[1]]);
    }
    for (base, m, _) in BREAST_CANCER_BASE.iter() {
        names.push(format!("{} error", base));
        let mean = [m[0] * ERROR_RATIO[0], m[1] * ERROR_RATIO[1]];
        means.push(mean);
        spreads.push([mean[0] * 0.5, mean[1] * 0.5]);
    }
    for (base, m, s) in BREAST_CANCER_BASE.iter() {
        names.push(format!("worst {}", base));
        means.push([m[0] * WORST_RATIO[0], m[1] * WORST_RATIO[1]]);
        spreads.push([s[0] * WORST_RATIO[0], s[1] * WORST_RATIO[1]]);
    }

    let stats: Vec<FeatureStats<'_>> = names
        .iter()
        .zip(means.iter())
        .zip(spreads.iter())
        .map(|((n, m), s)| (n.as_str(), &m[..], &s[..]))
        .collect();

    generate(
        BuiltinDataset::BreastCancer.name(),
        &stats,
        &BREAST_CANCER_CLASS_SIZES,
        rng,
    )
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}
