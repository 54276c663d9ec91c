//! End-to-end integration tests: zip CSV -> clean -> feature split -> JSON lines.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use solvent_io::{
    ConfusionRecord, DatasetReader, MetricsRecord, MetricsReport, MetricsWriter, Split, clean,
};
use tempfile::TempDir;

/// Write a zip archive holding a single CSV member and return its path.
fn write_zip_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    let file = fs::File::create(&path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    zip.start_file("data.csv", options).unwrap();
    zip.write_all(content.as_bytes()).unwrap();
    zip.finish().unwrap();
    path
}

/// A 10-row client table: rows 8 and 9 carry the MARRIAGE=0 sentinel.
fn toy_csv() -> String {
    let mut csv = String::from(
        "ID,LIMIT_BAL,SEX,EDUCATION,MARRIAGE,AGE,default payment next month\n",
    );
    for i in 0..8 {
        let education = if i == 3 { 6 } else { 1 + i % 4 };
        csv.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            i + 1,
            20_000 + i * 10_000,
            1 + i % 2,
            education,
            1 + i % 3,
            24 + i,
            i % 2,
        ));
    }
    csv.push_str("9,50000,1,2,0,30,0\n");
    csv.push_str("10,60000,2,3,0,41,1\n");
    csv
}

#[test]
fn zip_to_clean_table_round_trip() {
    let dir = TempDir::new().unwrap();
    let archive = write_zip_csv(&dir, "train_data.csv.zip", &toy_csv());

    // 1. Read the archived CSV.
    let raw = DatasetReader::new(&archive).read().expect("fixture should parse");
    assert_eq!(raw.n_rows(), 10);
    assert_eq!(raw.columns().len(), 7);

    // 2. Clean: the two MARRIAGE=0 rows drop out.
    let table = clean(raw).unwrap();
    assert_eq!(table.n_rows(), 8);

    // 3. Cleaned-table invariants.
    assert!(!table.columns().iter().any(|c| c == "ID"));
    assert!(table.columns().iter().any(|c| c == "default"));
    let education = table
        .columns()
        .iter()
        .position(|c| c == "EDUCATION")
        .unwrap();
    let marriage = table
        .columns()
        .iter()
        .position(|c| c == "MARRIAGE")
        .unwrap();
    for row in table.rows() {
        assert!(row[education] >= 1.0 && row[education] <= 4.0);
        assert!(row[marriage] != 0.0);
    }

    // 4. Feature split: 5 feature columns, binary labels.
    let features = table.features();
    let labels = table.labels();
    assert_eq!(features.len(), 8);
    assert_eq!(features[0].len(), 5);
    assert_eq!(labels.len(), 8);
    assert!(labels.iter().all(|&l| l <= 1));
}

#[test]
fn report_file_has_four_parsable_lines() {
    let dir = TempDir::new().unwrap();
    let writer = MetricsWriter::new(&dir.path().join("output")).unwrap();

    let report = MetricsReport {
        train_metrics: MetricsRecord::new(Split::Train, 2.0 / 3.0, 0.75, 1.0, 0.8),
        test_metrics: MetricsRecord::new(Split::Test, 0.5, 0.5, 0.5, 0.5),
        train_confusion: ConfusionRecord::new(Split::Train, [[1, 1], [0, 2]]),
        test_confusion: ConfusionRecord::new(Split::Test, [[2, 0], [1, 1]]),
    };
    writer.write_report(&report).unwrap();

    let content = fs::read_to_string(writer.metrics_path()).unwrap();
    let parsed: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).expect("each line is standalone JSON"))
        .collect();
    assert_eq!(parsed.len(), 4);

    assert_eq!(parsed[0]["dataset"], "train");
    assert!((parsed[0]["precision"].as_f64().unwrap() - 2.0 / 3.0).abs() < 1e-12);
    assert_eq!(parsed[2]["true_1"]["predicted_1"], 2);

    // Confusion counts sum to the split's row count.
    let cm = &parsed[2];
    let total = cm["true_0"]["predicted_0"].as_u64().unwrap()
        + cm["true_0"]["predicted_1"].as_u64().unwrap()
        + cm["true_1"]["predicted_0"].as_u64().unwrap()
        + cm["true_1"]["predicted_1"].as_u64().unwrap();
    assert_eq!(total, 4);
}

#[test]
fn reader_rejects_corrupt_archive() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.csv.zip");
    fs::write(&path, b"PK\x03\x04 not actually a zip").unwrap();
    let result = DatasetReader::new(&path).read();
    assert!(matches!(result, Err(solvent_io::IoError::ZipArchive { .. })));
}
