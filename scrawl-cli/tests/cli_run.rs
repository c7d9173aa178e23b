//! Job runs against real files in a temporary directory.

use std::path::{Path, PathBuf};

use scrawl_cli::{build_rasterizer, load_answers, run, ExportJobConfig, RunOutcome};
use scrawl_core::Layout;
use scrawl_export::ExportOptions;

fn write_answers(dir: &Path, json: &str) -> PathBuf {
    let path = dir.join("answers.json");
    std::fs::write(&path, json).expect("write answers");
    path
}

fn sample_answers() -> String {
    let long = "Mitochondria release energy from glucose during respiration ".repeat(60);
    serde_json::json!([
        { "questionNumber": 2, "content": long },
        { "questionNumber": 1, "content": "This is line 1", "wordCount": 4 }
    ])
    .to_string()
}

fn job(dir: &Path) -> ExportJobConfig {
    let answers = write_answers(dir, &sample_answers());
    let mut config = ExportJobConfig::new(answers, dir.join("out.pdf"));
    config.system_fonts = false;
    config.options = ExportOptions::with_quality(72);
    config
}

#[tokio::test]
async fn test_load_answers_fills_word_counts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_answers(dir.path(), &sample_answers());
    let answers = load_answers(&path).await.expect("load");
    assert_eq!(answers.len(), 2);
    assert_eq!(answers[0].word_count, 420);
    assert_eq!(answers[1].word_count, 4);
}

#[tokio::test]
async fn test_load_answers_rejects_non_array() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_answers(dir.path(), r#"{"questionNumber": 1}"#);
    let err = load_answers(&path).await.expect_err("not an array");
    assert!(format!("{err:#}").contains("JSON array of answers"));
}

#[tokio::test]
async fn test_missing_answers_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = load_answers(&dir.path().join("nope.json"))
        .await
        .expect_err("missing");
    assert!(err.to_string().contains("failed to read answers"));
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = job(dir.path());
    config.dry_run = true;
    config.options = ExportOptions::with_quality(300);

    let outcome = run(&config).await.expect("run");
    let RunOutcome::DryRun(report) = outcome else {
        panic!("expected a dry run, got {outcome:?}");
    };
    assert!(report.pages >= 1);
    assert_eq!(report.quality, 300);
    assert!(report.batch_size >= 1);
    assert!(!config.output_path.exists());
}

#[tokio::test]
async fn test_layout_json_written() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = job(dir.path());
    config.dry_run = true;
    config.layout_json = Some(dir.path().join("layout.json"));

    run(&config).await.expect("run");

    let json = std::fs::read_to_string(dir.path().join("layout.json")).expect("layout file");
    let layout = Layout::from_json(&json).expect("layout json");
    assert_eq!(layout.pages[0].page_number, 1);
    assert_eq!(layout.pages[0].lines[0].text, "This is line 1");
    assert!(json.contains("totalLines"));
}

#[tokio::test]
async fn test_export_writes_pdf() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = job(dir.path());

    let outcome = run(&config).await.expect("run");
    let RunOutcome::Exported { path, pages, bytes } = outcome else {
        panic!("expected an export, got {outcome:?}");
    };
    assert_eq!(path, config.output_path);
    assert!(pages >= 1);

    let written = std::fs::read(&path).expect("pdf");
    assert_eq!(written.len(), bytes);
    assert!(written.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn test_invalid_options_reported_together() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = job(dir.path());
    config.options = ExportOptions {
        quality: Some(9000),
        format: Some("scroll".into()),
        orientation: Some("diagonal".into()),
        batch_size: None,
    };

    let err = run(&config).await.expect_err("invalid options");
    let message = format!("{err:#}");
    assert!(message.contains("9000"), "{message}");
    assert!(message.contains("scroll"), "{message}");
    assert!(message.contains("diagonal"), "{message}");
    assert!(!config.output_path.exists());
}

#[tokio::test]
async fn test_missing_font_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = job(dir.path());
    config.font_file = Some(dir.path().join("missing.ttf"));

    let err = run(&config).await.expect_err("missing font");
    assert!(format!("{err:#}").contains("missing.ttf"));
}

#[tokio::test(flavor = "current_thread")]
async fn test_build_rasterizer_on_current_thread_runtime() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = job(dir.path());
    let font_path = dir.path().join("broken.ttf");
    std::fs::write(&font_path, b"not a font").expect("write font");
    config.font_file = Some(font_path);

    // Unparseable font data is skipped, not fatal.
    let rasterizer = build_rasterizer(&config).await.expect("rasterizer");
    assert_eq!(rasterizer.font_faces(), 0);
}
