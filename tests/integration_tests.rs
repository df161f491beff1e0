//! Integration tests for the oncoforest library
//!
//! These tests verify end-to-end functionality across multiple modules
//! and validate real-world usage scenarios.

use approx::assert_relative_eq;
use oncoforest::api::{quick, RandomForest};
use oncoforest::core::{Label, OncoError, Sample, N_FEATURES};
use oncoforest::data::{train_test_split, TabularDataset};
use oncoforest::persistence::{load_model, save_model};
use oncoforest::predict::predict;
use oncoforest::Dataset;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

const HEADER: &str =
    "Age,Gender,BMI,Smoking,GeneticRisk,PhysicalActivity,AlcoholIntake,CancerHistory,Diagnosis";

/// Deterministic patient record; the diagnosis follows a fixed risk score
fn patient(i: usize) -> ([f64; N_FEATURES], u8) {
    let age = 20.0 + ((i * 37) % 60) as f64;
    let gender = (i % 2) as f64;
    let bmi = 18.5 + ((i * 13) % 20) as f64;
    let smoking = ((i / 3) % 2) as f64;
    let genetic = ((i * 7) % 3) as f64;
    let activity = 1.0 + ((i * 11) % 90) as f64 / 10.0;
    let alcohol = 1.0 + ((i * 5) % 40) as f64 / 10.0;
    let history = ((i / 5) % 2) as f64;

    let score = (age - 20.0) / 30.0 + genetic + smoking + history + (bmi - 18.5) / 20.0
        - activity / 10.0;
    let label = u8::from(score > 2.8);

    (
        [age, gender, bmi, smoking, genetic, activity, alcohol, history],
        label,
    )
}

fn write_dataset(n: usize) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".csv").expect("Failed to create temp file");
    writeln!(file, "{HEADER}").expect("Failed to write");
    for i in 0..n {
        let (f, label) = patient(i);
        writeln!(
            file,
            "{},{},{},{},{},{},{},{},{}",
            f[0], f[1], f[2], f[3], f[4], f[5], f[6], f[7], label
        )
        .expect("Failed to write");
    }
    file.flush().expect("Failed to flush");
    file
}

/// Test complete workflow: data loading -> split -> training -> evaluation
#[test]
fn test_complete_workflow() {
    let file = write_dataset(200);
    let dataset = TabularDataset::from_file(file.path()).expect("Loading should succeed");
    assert_eq!(dataset.len(), 200);

    let partition = train_test_split(&dataset, 0.2, 42).expect("Split should succeed");
    assert_eq!(partition.test.len(), 40);
    assert_eq!(partition.train.len(), 160);

    let model = RandomForest::new()
        .with_n_trees(30)
        .with_seed(42)
        .train(&partition.train)
        .expect("Training should succeed");

    let report = model
        .evaluate_detailed(&partition.test)
        .expect("Evaluation should succeed");

    let cm = report.confusion;
    assert_eq!(
        cm.true_negatives() + cm.false_positives() + cm.false_negatives() + cm.true_positives(),
        partition.test.len()
    );
    assert_relative_eq!(
        report.accuracy(),
        (cm.true_positives() + cm.true_negatives()) as f64 / 40.0
    );
    assert_relative_eq!(report.accuracy(), model.evaluate(&partition.test));
    assert!(
        report.accuracy() >= 0.65,
        "Expected a learnable rule to reach 65% accuracy, got {:.2}",
        report.accuracy()
    );

    assert_eq!(report.importances.len(), N_FEATURES);
    let total: f64 = report.importances.iter().map(|f| f.importance).sum();
    assert_relative_eq!(total, 1.0, epsilon = 1e-9);
    for pair in report.importances.windows(2) {
        assert!(pair[0].importance >= pair[1].importance);
    }

    if let Some(auc) = report.roc.auc {
        assert!((0.0..=1.0).contains(&auc));
        let first = report.roc.points[0];
        assert_eq!((first.fpr, first.tpr), (0.0, 0.0));
    }
}

/// Same seed and data must give the same model and predictions
#[test]
fn test_training_is_reproducible() {
    let file = write_dataset(120);
    let dataset = TabularDataset::from_file(file.path()).unwrap();

    let train = |seed| {
        let partition = train_test_split(&dataset, 0.25, seed).unwrap();
        let model = RandomForest::new()
            .with_n_trees(20)
            .with_seed(seed)
            .train(&partition.train)
            .unwrap();
        (model, partition)
    };

    let (a, pa) = train(7);
    let (b, pb) = train(7);
    assert_eq!(pa.test_indices, pb.test_indices);
    assert_eq!(a, b);

    let preds_a: Vec<_> = a.predict_dataset(&pa.test);
    let preds_b: Vec<_> = b.predict_dataset(&pb.test);
    assert_eq!(preds_a, preds_b);
}

/// A reloaded model predicts exactly like the model it was saved from across the feature domain
#[test]
fn test_save_load_predictions_identical() {
    let file = write_dataset(150);
    let model = RandomForest::new()
        .with_n_trees(25)
        .train_from_csv(file.path())
        .unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cancer_detection.bin");
    save_model(&model, &path).unwrap();
    let loaded = load_model(&path).unwrap();

    for age in [0.0, 25.0, 45.5, 70.0, 90.0] {
        for genetic in [0.0, 1.0, 2.0] {
            for history in [0.0, 1.0] {
                for activity in [1.0, 5.5, 10.0] {
                    let sample =
                        Sample::unlabeled([age, 1.0, 27.0, 1.0, genetic, activity, 3.0, history]);
                    assert_eq!(
                        predict(&model, &sample).unwrap(),
                        predict(&loaded, &sample).unwrap()
                    );
                    assert_eq!(
                        model.predict(&sample).probability,
                        loaded.predict(&sample).probability
                    );
                }
            }
        }
    }
}

#[test]
fn test_cross_validation_five_folds() {
    let file = write_dataset(100);
    let dataset = TabularDataset::from_file(file.path()).unwrap();

    let scores = RandomForest::new()
        .with_n_trees(15)
        .cross_validate(&dataset, 5)
        .expect("Cross-validation should succeed");

    assert_eq!(scores.len(), 5);
    assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));
}

#[test]
fn test_cross_validation_rejects_bad_folds() {
    let file = write_dataset(10);
    let dataset = TabularDataset::from_file(file.path()).unwrap();
    let rf = RandomForest::new().with_n_trees(3);

    assert!(matches!(
        rf.cross_validate(&dataset, 1),
        Err(OncoError::InvalidParameter(_))
    ));
    assert!(matches!(
        rf.cross_validate(&dataset, 11),
        Err(OncoError::InsufficientData(_))
    ));
}

#[test]
fn test_quick_functions() {
    let file = write_dataset(80);
    let model = quick::train_csv(file.path()).expect("Quick training should succeed");
    assert_eq!(model.info().n_trees, 100);

    let dataset = TabularDataset::from_file(file.path()).unwrap();
    let accuracy = quick::simple_validation(&dataset, 0.2, 42).unwrap();
    assert!((0.0..=1.0).contains(&accuracy));
}

#[test]
fn test_imputation_through_pipeline() {
    let mut file = NamedTempFile::with_suffix(".csv").unwrap();
    writeln!(file, "{HEADER}").unwrap();
    writeln!(file, "1,0,22,0,0,5,2,0,0").unwrap();
    writeln!(file, ",1,24,1,1,6,3,1,1").unwrap();
    writeln!(file, "3,0,26,0,2,7,4,0,1").unwrap();
    file.flush().unwrap();

    let dataset = TabularDataset::from_file(file.path()).unwrap();
    assert_eq!(dataset.get_sample(1).features[0], 2.0);
    assert_eq!(dataset.get_sample(1).label, Some(Label::Positive));
}

#[test]
fn test_pipeline_errors() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        TabularDataset::from_file(dir.path().join("missing.csv")),
        Err(OncoError::NotFound(_))
    ));

    let file = write_dataset(10);
    let dataset = TabularDataset::from_file(file.path()).unwrap();
    assert!(matches!(
        train_test_split(&dataset, 1.0, 42),
        Err(OncoError::InvalidRatio(_))
    ));
}
