use std::path::PathBuf;

use shutterline_capture_model::{JobFile, RenderOutputKind};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("rs-job.json")
}

#[test]
fn rolling_shutter_fixture_loads_all_blocks() {
    let file = JobFile::load(fixture_path()).expect("fixture job should load");

    assert_eq!(file.job.frame_last, 2);
    assert_eq!(file.job.log_step, 10);

    let capture = file.capture.as_ref().expect("fixture has a capture block");
    assert_eq!(capture.require_fps().unwrap(), 30.0);
    assert_eq!(capture.readouts_per_render, 4);
    let exposure = capture.require_exposure().unwrap();
    assert_eq!(exposure.readout_line_pattern, vec![0, 2]);

    assert_eq!(file.camera.require_line_count().unwrap(), 240);
    assert_eq!(file.camera.sensor().unwrap()["sName"], "demo-sensor");

    assert_eq!(file.outputs.len(), 1);
    assert_eq!(file.outputs[0].kind().unwrap(), RenderOutputKind::Image);
    assert_eq!(file.outputs[0].folder.as_deref(), Some("Image"));

    let scene = file.scene.as_ref().expect("fixture has a scene block");
    assert_eq!(scene.res_y, 240);
}

#[test]
fn job_file_save_and_reload_keeps_wire_keys() {
    let file = JobFile::load(fixture_path()).unwrap();

    let dir = std::env::temp_dir().join("shutterline_test_job_file");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("job.json");

    file.save(&path).unwrap();
    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["mCapture"]["mExp"]["dExpPerLine"], 0.0005);
    assert_eq!(raw["mJob"]["iSubFrameStep"], 1);

    let reloaded = JobFile::load(&path).unwrap();
    assert_eq!(reloaded, file);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn job_file_with_unknown_output_is_rejected() {
    let dir = std::env::temp_dir().join("shutterline_test_job_file_invalid");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("job.json");
    std::fs::write(
        &path,
        r#"{"mJob": {"sPathTrgMain": "out"}, "lOutputs": [{"sDTI": "render/output/video:1"}]}"#,
    )
    .unwrap();

    let err = JobFile::load(&path).unwrap_err();
    assert!(err.to_string().contains("not supported"));

    std::fs::remove_dir_all(&dir).ok();
}
