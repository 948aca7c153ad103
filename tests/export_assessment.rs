//! Export a synthetic session assessment to JSON for offline plotting.
//!
//! Run with: cargo test --test export_assessment -- --ignored --nocapture

use fatigue_drift::{
    downsample, run, AnalysisConfig, PipelineConfig, TimeGrouping, TimeSeries, VERSION,
};
use serde::Serialize;
use std::fs::File;
use std::io::Write;

#[derive(Serialize)]
struct MinuteExport {
    minute: i64,
    fii: f64,
    mahalanobis: f64,
    lean_x_zscore: Option<f64>,
}

#[derive(Serialize)]
struct CurveExport {
    grouping: String,
    buckets: Vec<i64>,
    mahalanobis: Vec<f64>,
}

#[derive(Serialize)]
struct ExportData {
    version: String,
    fps: f64,
    onset_minute: Option<i64>,
    integrity: String,
    minutes: Vec<MinuteExport>,
    slopes: Vec<(String, f64)>,
    curves: Vec<CurveExport>,
}

/// Ten minutes of one tracked hip plus a trunk-lean metric that drifts
/// forward after minute six.
fn generate_session(fps: f64) -> TimeSeries {
    let n = (10.0 * 60.0 * fps) as usize;
    let ts: Vec<f64> = (0..n).map(|i| i as f64 / fps).collect();

    let hip_x: Vec<f64> = ts.iter().map(|t| 0.1 + (t * 1.8).sin() * 0.03).collect();
    let hip_y: Vec<f64> = ts.iter().map(|t| 0.9 + (t * 3.6).sin().abs() * 0.02).collect();
    let hip_z: Vec<f64> = ts.iter().map(|t| 2.4 + (t * 0.2).cos() * 0.05).collect();
    let lean: Vec<f64> = ts
        .iter()
        .map(|&t| {
            let drift = if t > 360.0 { (t - 360.0) / 20.0 } else { 0.0 };
            (t * 1.8).sin() * 1.5 + drift
        })
        .collect();

    TimeSeries::new(ts, Some((0..n as i64).collect()))
        .unwrap()
        .with_values("j23_x", &hip_x)
        .unwrap()
        .with_values("j23_y", &hip_y)
        .unwrap()
        .with_values("j23_z", &hip_z)
        .unwrap()
        .with_values("lean_x", &lean)
        .unwrap()
}

#[test]
#[ignore] // Run manually with: cargo test --test export_assessment -- --ignored --nocapture
fn export_assessment_to_json() {
    let fps = 15.0;
    let series = generate_session(fps);
    let config = PipelineConfig::realsense()
        .with_analysis(AnalysisConfig::default().with_summary_metrics(["lean_x"]));

    let assessment = run(&series, &config).expect("Failed to assess session");
    let cleaning = assessment.cleaning.as_ref().expect("Cleaning outcome missing");

    let minutes = assessment
        .summary
        .minutes
        .iter()
        .map(|m| MinuteExport {
            minute: m.minute,
            fii: m.fii,
            mahalanobis: m.mahalanobis,
            lean_x_zscore: m.extras.get("lean_x_zscore").copied(),
        })
        .collect();

    let timestamps = cleaning.series.timestamps();
    let curves = [
        ("frames", TimeGrouping::Frames),
        ("seconds", TimeGrouping::Seconds),
        ("minutes", TimeGrouping::Minutes),
    ]
    .into_iter()
    .map(|(label, grouping)| {
        let d = downsample(timestamps, &assessment.drift.distances, grouping)
            .expect("Failed to downsample");
        CurveExport {
            grouping: label.to_string(),
            buckets: d.buckets,
            mahalanobis: d.values,
        }
    })
    .collect();

    let export_data = ExportData {
        version: VERSION.to_string(),
        fps,
        onset_minute: assessment.onset_minute(),
        integrity: cleaning.integrity.to_string(),
        minutes,
        slopes: assessment
            .slopes()
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect(),
        curves,
    };

    println!("{}", assessment.metrics_table());
    println!("Onset minute: {:?}", assessment.onset_minute());

    let json = serde_json::to_string_pretty(&export_data).expect("Failed to serialize");

    let output_path = std::env::temp_dir().join("fatigue_assessment.json");
    let mut file = File::create(&output_path).expect("Failed to create file");
    file.write_all(json.as_bytes()).expect("Failed to write file");

    println!("\nExported assessment to {}", output_path.display());
    assert!(assessment.onset_minute().is_some());
}
