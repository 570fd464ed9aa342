//! Integration test: Dataset store, validation and previews

use classifier_playground::data::{BuiltinDataset, DatasetStore};
use classifier_playground::prelude::*;

fn csv(rows: &[&str]) -> Vec<u8> {
    rows.join("\n").into_bytes()
}

#[test]
fn test_builtins_resolve_with_expected_shapes() {
    let store = DatasetStore::in_memory();
    for (name, rows, features, classes) in [
        ("iris", 150, 4, 3),
        ("wine", 178, 13, 3),
        ("breast_cancer", 569, 30, 2),
    ] {
        let ds = store.resolve(name).unwrap();
        assert_eq!(ds.n_samples(), rows, "{}", name);
        assert_eq!(ds.n_features(), features, "{}", name);
        assert_eq!(ds.n_classes(), classes, "{}", name);
        assert_eq!(ds.feature_names.len(), features);
    }
    assert_eq!(BuiltinDataset::ALL.len(), 3);
}

#[test]
fn test_filesystem_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = DatasetStore::filesystem(dir.path().join("datasets"));

    let summary = store
        .upload("flowers", &csv(&["petal,stem,target", "1.0,3,red", "2.5,4,blue", "0.5,2,red"]))
        .unwrap();
    assert_eq!((summary.rows, summary.features), (3, 2));

    // a fresh store over the same directory sees the upload
    let reopened = DatasetStore::filesystem(dir.path().join("datasets"));
    let ds = reopened.resolve("flowers").unwrap();
    assert_eq!(ds.feature_names, vec!["petal".to_string(), "stem".to_string()]);
    assert_eq!(
        ds.classes(),
        vec![Label::Text("blue".to_string()), Label::Text("red".to_string())]
    );
    assert_eq!(reopened.list().unwrap().last().map(String::as_str), Some("flowers"));
}

#[test]
fn test_reupload_overwrites() {
    let store = DatasetStore::in_memory();
    store.upload("d", &csv(&["a,target", "1,0", "2,1"])).unwrap();
    store.upload("d", &csv(&["a,target", "1,0", "2,1", "3,1", "4,0"])).unwrap();
    assert_eq!(store.resolve("d").unwrap().n_samples(), 4);
    assert_eq!(store.list().unwrap().iter().filter(|n| n.as_str() == "d").count(), 1);
}

#[test]
fn test_validation_order_and_messages() {
    let store = DatasetStore::in_memory();
    let cases: [(&[&str], &str); 5] = [
        // missing target wins even with missing feature values
        (&["a,b", "1,", "2,3"], "Dataset must include 'target' column."),
        (&["a,target", "1,x", "2,x"], "Target must have at least 2 distinct classes."),
        (&["target", "0", "1"], "Dataset must include at least one feature column."),
        (&["a,target", "1,0", ",1", "3,0"], "Feature data contains missing values."),
        (&["a,target", "1,0", "2,1", "3,"], "Target column contains missing values."),
    ];

    for (rows, message) in cases {
        let err = store.upload("t", &csv(rows)).unwrap_err();
        assert!(matches!(err, PlaygroundError::Schema(_)), "{:?}", rows);
        assert_eq!(err.to_string(), message);
    }
    assert_eq!(store.list().unwrap().len(), 3);
}

#[test]
fn test_non_numeric_feature_rejected() {
    let store = DatasetStore::in_memory();
    let err = store
        .upload("t", &csv(&["a,colour,target", "1,red,0", "2,blue,1"]))
        .unwrap_err();
    assert_eq!(err.to_string(), "Feature column 'colour' must be numeric.");
}

#[test]
fn test_preview_properties() {
    let store = DatasetStore::in_memory();

    let a = store.preview("wine", 10).unwrap();
    let b = store.preview("wine", 10).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.samples.len(), 10);
    assert_eq!(a.n_samples, 178);

    let keys: Vec<&String> = a.samples[0].keys().collect();
    assert_eq!(keys.first().map(|k| k.as_str()), Some("alcohol"));
    assert_eq!(keys.last().map(|k| k.as_str()), Some("target"));

    let all = store.preview("iris", 150).unwrap();
    assert_eq!(all.samples.len(), 150);

    assert!(matches!(store.preview("iris", 151), Err(PlaygroundError::Sampling(_))));
    assert!(matches!(store.preview("nope", 1), Err(PlaygroundError::NotFound(_))));
}

#[test]
fn test_upload_with_late_float_in_integer_column() {
    let store = DatasetStore::in_memory();
    let mut rows = vec!["a,target".to_string()];
    rows.extend((0..150).map(|i| format!("{},{}", i, i % 2)));
    rows.push("2.5,1".to_string());

    let summary = store.upload("late_float", rows.join("\n").as_bytes()).unwrap();
    assert_eq!((summary.rows, summary.features), (151, 1));
    let ds = store.resolve("late_float").unwrap();
    assert_eq!(ds.features[[150, 0]], 2.5);
}

#[test]
fn test_preview_keeps_integer_features() {
    let store = DatasetStore::in_memory();
    store
        .upload("counts", &csv(&["n,w,target", "1,0.5,a", "2,1.5,b", "3,2.5,a"]))
        .unwrap();

    let result = store.preview("counts", 3).unwrap();
    for row in &result.samples {
        assert!(row["n"].is_i64(), "{:?}", row);
        assert!(row["w"].is_f64(), "{:?}", row);
    }
}

#[test]
fn test_names_outside_dataset_dir_are_not_found() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("secret.csv"), "a,target\n1,0\n2,1\n3,0\n4,1\n5,0\n").unwrap();
    let store = DatasetStore::filesystem(dir.path().join("datasets"));

    assert!(matches!(store.resolve("../secret"), Err(PlaygroundError::NotFound(_))));
    assert!(matches!(store.preview("../secret", 1), Err(PlaygroundError::NotFound(_))));
    assert!(matches!(
        train(&store, "knn", &serde_json::json!({"n_neighbors": 1}), "../secret"),
        Err(PlaygroundError::UnsupportedDataset(_))
    ));
}
