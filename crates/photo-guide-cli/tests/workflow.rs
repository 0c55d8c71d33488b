//! End-to-end tests of the analyze, generate and guide flows against a
//! stub backend.

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use photo_guide_core::Genre;
use photo_guide_test_support::{
    AnalysisBuilder, GenerationBuilder, StubBackend, StubReply, SyntheticUpload, ANALYZE_PATH,
    GENERATE_PATH,
};
use predicates::prelude::*;
use tempfile::TempDir;

fn photo_guide(dir: &Path, stub: &StubBackend) -> Command {
    let mut cmd = Command::cargo_bin("photo-guide").unwrap();
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join("xdg"))
        .env("PHOTO_GUIDE_SERVER", stub.url())
        .env_remove("VISUAL")
        .env_remove("EDITOR");
    cmd
}

fn write_photo(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, SyntheticUpload::png(name, 12, 8).bytes).unwrap();
    path
}

// === analyze ===

#[test]
fn test_analyze_renders_report() {
    let stub = StubBackend::start().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(&dir, "portrait.png");

    photo_guide(dir.path(), &stub)
        .arg("analyze")
        .arg(&photo)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("portrait.png (12x8)")
                .and(predicate::str::contains("Composition score: 72.5 / 100"))
                .and(predicate::str::contains("Rule of thirds"))
                .and(predicate::str::contains("run with --guide"))
                .and(predicate::str::contains("Brighten the face slightly")),
        );

    let requests = stub.requests_to(ANALYZE_PATH);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].field_text("genre").as_deref(), Some("portrait"));
    assert!(stub.requests_to(GENERATE_PATH).is_empty());
}

#[test]
fn test_analyze_sends_genre_and_expands_guide() {
    let stub = StubBackend::start().unwrap();
    stub.set_analyze_reply(StubReply::json(
        200,
        &AnalysisBuilder::new()
            .genre(Genre::Landscape)
            .coach_guide("Lower the horizon.")
            .to_json(),
    ));
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(&dir, "hills.png");

    photo_guide(dir.path(), &stub)
        .arg("analyze")
        .arg(&photo)
        .args(["--genre", "landscape", "--guide"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Coach guide\n  Lower the horizon.")
                .and(predicate::str::contains("Landscape")),
        );

    let requests = stub.requests_to(ANALYZE_PATH);
    assert_eq!(requests[0].field_text("genre").as_deref(), Some("landscape"));
}

#[test]
fn test_analyze_fail_under() {
    let stub = StubBackend::start().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(&dir, "a.png");

    photo_guide(dir.path(), &stub)
        .arg("analyze")
        .arg(&photo)
        .args(["--fail-under", "80"])
        .assert()
        .code(1);

    photo_guide(dir.path(), &stub)
        .arg("analyze")
        .arg(&photo)
        .args(["--fail-under", "70"])
        .assert()
        .code(0);
}

#[test]
fn test_analyze_writes_prompt_file() {
    let stub = StubBackend::start().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(&dir, "a.png");
    let prompt_out = dir.path().join("prompt.txt");

    photo_guide(dir.path(), &stub)
        .arg("analyze")
        .arg(&photo)
        .arg("--prompt-out")
        .arg(&prompt_out)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&prompt_out).unwrap(),
        "Brighten the face slightly and keep natural skin tones"
    );
}

#[test]
fn test_analyze_server_detail_is_shown() {
    let stub = StubBackend::start().unwrap();
    stub.set_analyze_reply(StubReply::detail(400, "Image could not be decoded"));
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(&dir, "a.png");

    photo_guide(dir.path(), &stub)
        .arg("analyze")
        .arg(&photo)
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "error: Image could not be decoded: server returned 400\n",
        ));
}

#[test]
fn test_analyze_without_detail_uses_fallback() {
    let stub = StubBackend::start().unwrap();
    stub.set_analyze_reply(StubReply::text(502, "Bad Gateway"));
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(&dir, "a.png");

    photo_guide(dir.path(), &stub)
        .arg("analyze")
        .arg(&photo)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error: Analysis failed."));
}

#[test]
fn test_oversized_upload_never_reaches_server() {
    let stub = StubBackend::start().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let big = dir.path().join("huge.jpg");
    fs::write(&big, vec![0u8; 1024 * 1024 + 1]).unwrap();
    fs::write(dir.path().join(".photo-guide.toml"), "[upload]\nmax_size_mb = 1\n").unwrap();

    photo_guide(dir.path(), &stub)
        .arg("analyze")
        .arg(&big)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("file is too large"));

    assert!(stub.requests().is_empty());
}

// === generate ===

#[test]
fn test_generate_posts_prompt_style_strength() {
    let stub = StubBackend::start().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(&dir, "a.png");

    photo_guide(dir.path(), &stub)
        .arg("generate")
        .arg(&photo)
        .args(["--prompt", "Warmer light", "--style", "vivid", "--strength", "0.4"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Before: a.png")
                .and(predicate::str::contains(format!(
                    "After:  {}/outputs/stub_output.png",
                    stub.url()
                ))),
        );

    let requests = stub.requests_to(GENERATE_PATH);
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.field_text("prompt").as_deref(), Some("Warmer light"));
    assert_eq!(request.field_text("style").as_deref(), Some("vivid"));
    assert_eq!(request.field_text("strength").as_deref(), Some("0.4"));
    assert!(request.fields.contains_key("file"));
}

#[test]
fn test_generate_defaults_style_and_strength() {
    let stub = StubBackend::start().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(&dir, "a.png");

    photo_guide(dir.path(), &stub)
        .arg("generate")
        .arg(&photo)
        .args(["--prompt", "Crop tighter"])
        .assert()
        .success();

    let request = &stub.requests_to(GENERATE_PATH)[0];
    assert_eq!(request.field_text("style").as_deref(), Some("natural"));
    assert_eq!(request.field_text("strength").as_deref(), Some("0.7"));
}

#[test]
fn test_generate_reads_prompt_file() {
    let stub = StubBackend::start().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(&dir, "a.png");
    let prompt_file = dir.path().join("prompt.txt");
    fs::write(&prompt_file, "Soften the shadows\n").unwrap();

    photo_guide(dir.path(), &stub)
        .arg("generate")
        .arg(&photo)
        .arg("--prompt-file")
        .arg(&prompt_file)
        .assert()
        .success();

    let request = &stub.requests_to(GENERATE_PATH)[0];
    assert_eq!(request.field_text("prompt").as_deref(), Some("Soften the shadows"));
}

#[test]
fn test_generate_downloads_image() {
    let stub = StubBackend::start().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(&dir, "a.png");
    let target = dir.path().join("out/improved.png");

    photo_guide(dir.path(), &stub)
        .arg("generate")
        .arg(&photo)
        .args(["--prompt", "Warmer light", "-o"])
        .arg(&target)
        .assert()
        .success()
        .stderr(predicate::str::contains("Saved"));

    assert_eq!(fs::read(&target).unwrap(), stub.image());
    assert_eq!(stub.requests_to("/outputs/stub_output.png").len(), 1);
}

#[test]
fn test_generate_download_failure_keeps_comparison() {
    let stub = StubBackend::start().unwrap();
    stub.set_generate_reply(StubReply::json(
        200,
        &GenerationBuilder::image("http://127.0.0.1:9/gone.png").to_json(),
    ));
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(&dir, "a.png");
    let target = dir.path().join("improved.png");

    photo_guide(dir.path(), &stub)
        .arg("generate")
        .arg(&photo)
        .args(["--prompt", "Warmer light", "--timeout", "2", "-o"])
        .arg(&target)
        .assert()
        .code(2)
        .stdout(
            predicate::str::contains("Before: a.png")
                .and(predicate::str::contains("After:  http://127.0.0.1:9/gone.png")),
        )
        .stderr(predicate::str::contains("error: Failed to download"));

    assert!(!target.exists());
}

#[test]
fn test_generate_reported_failure_exits_one() {
    let stub = StubBackend::start().unwrap();
    stub.set_generate_reply(StubReply::json(
        200,
        &GenerationBuilder::failed(Some("Quota exceeded")).to_json(),
    ));
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(&dir, "a.png");
    let target = dir.path().join("improved.png");

    photo_guide(dir.path(), &stub)
        .arg("generate")
        .arg(&photo)
        .args(["--prompt", "Warmer light", "-o"])
        .arg(&target)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Generation failed: Quota exceeded"));

    assert!(!target.exists());
}

#[test]
fn test_generate_suggestions_outcome() {
    let stub = StubBackend::start().unwrap();
    stub.set_generate_reply(StubReply::json(
        200,
        &GenerationBuilder::suggestions("Try a lower angle.")
            .note("Editing is not available for this image.")
            .to_json(),
    ));
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(&dir, "a.png");

    photo_guide(dir.path(), &stub)
        .arg("generate")
        .arg(&photo)
        .args(["--prompt", "Warmer light"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("No image was generated")
                .and(predicate::str::contains("Try a lower angle."))
                .and(predicate::str::contains("Note: Editing is not available")),
        );
}

#[test]
fn test_generate_server_error_detail() {
    let stub = StubBackend::start().unwrap();
    stub.set_generate_reply(StubReply::detail(500, "Generator offline"));
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(&dir, "a.png");

    photo_guide(dir.path(), &stub)
        .arg("generate")
        .arg(&photo)
        .args(["--prompt", "Warmer light"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error: Generator offline"));
}

// === guide ===

#[test]
fn test_guide_is_default_command() {
    let stub = StubBackend::start().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(&dir, "a.png");

    photo_guide(dir.path(), &stub)
        .arg(&photo)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Composition score")
                .and(predicate::str::contains("After:  ")),
        );

    // The expert prompt from the analysis is sent unchanged.
    let request = &stub.requests_to(GENERATE_PATH)[0];
    assert_eq!(
        request.field_text("prompt").as_deref(),
        Some("Brighten the face slightly and keep natural skin tones")
    );
}

#[test]
fn test_guide_prompt_override() {
    let stub = StubBackend::start().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(&dir, "a.png");

    photo_guide(dir.path(), &stub)
        .arg("guide")
        .arg(&photo)
        .args(["--prompt", "Make it black and white", "--style", "dramatic"])
        .assert()
        .success();

    let request = &stub.requests_to(GENERATE_PATH)[0];
    assert_eq!(request.field_text("prompt").as_deref(), Some("Make it black and white"));
    assert_eq!(request.field_text("style").as_deref(), Some("dramatic"));
}

#[test]
fn test_guide_edit_uses_editor() {
    let stub = StubBackend::start().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(&dir, "a.png");

    photo_guide(dir.path(), &stub)
        .env("EDITOR", "sed -i s/Brighten/Darken/")
        .arg("guide")
        .arg(&photo)
        .arg("--edit")
        .assert()
        .success();

    let request = &stub.requests_to(GENERATE_PATH)[0];
    assert_eq!(
        request.field_text("prompt").as_deref(),
        Some("Darken the face slightly and keep natural skin tones")
    );
}

#[test]
fn test_guide_no_generate_stops_after_analysis() {
    let stub = StubBackend::start().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(&dir, "a.png");

    photo_guide(dir.path(), &stub)
        .arg("guide")
        .arg(&photo)
        .arg("--no-generate")
        .assert()
        .success()
        .stdout(predicate::str::contains("After:").not());

    assert_eq!(stub.requests_to(ANALYZE_PATH).len(), 1);
    assert!(stub.requests_to(GENERATE_PATH).is_empty());
}

#[test]
fn test_guide_uses_same_upload_for_both_steps() {
    let stub = StubBackend::start().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(&dir, "a.png");

    photo_guide(dir.path(), &stub)
        .arg("guide")
        .arg(&photo)
        .assert()
        .success();

    let analyzed = &stub.requests_to(ANALYZE_PATH)[0].fields["file"];
    let generated = &stub.requests_to(GENERATE_PATH)[0].fields["file"];
    assert_eq!(analyzed.data, generated.data);
    assert_eq!(analyzed.file_name, generated.file_name);
}

#[test]
fn test_guide_exit_code_combines_steps() {
    let stub = StubBackend::start().unwrap();
    stub.set_generate_reply(StubReply::json(200, &GenerationBuilder::failed(None).to_json()));
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(&dir, "a.png");

    photo_guide(dir.path(), &stub)
        .arg("guide")
        .arg(&photo)
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "Something went wrong while generating the image.",
        ));
}

#[test]
fn test_guide_analysis_failure_skips_generation() {
    let stub = StubBackend::start().unwrap();
    stub.set_analyze_reply(StubReply::detail(422, "Unsupported genre"));
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(&dir, "a.png");

    photo_guide(dir.path(), &stub)
        .arg("guide")
        .arg(&photo)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unsupported genre"));

    assert!(stub.requests_to(GENERATE_PATH).is_empty());
}

// === health ===

#[test]
fn test_health_reports_service() {
    let stub = StubBackend::start().unwrap();
    let dir = tempfile::tempdir().unwrap();

    photo_guide(dir.path(), &stub)
        .arg("health")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Photo Guide API").and(predicate::str::contains("healthy")),
        );
}
