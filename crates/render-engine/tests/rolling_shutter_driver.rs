use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use shutterline_capture_model::{
    CameraConfig, CaptureConfig, ExposureModel, JobConfig, JobFile, RenderOutput, SceneConfig,
};
use shutterline_common::ShutterlineError;
use shutterline_render_engine::{
    DriverKind, DriverPhase, DryRunHost, RenderDriver, RenderProgress, RenderStage, RenderSummary,
};

const STEPS_PER_FRAME: u64 = 24;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("shutterline-rs-{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

/// 24 sensor rows, one row per readout, 4 scene frames per readout.
fn rs_job(dir: &Path) -> JobFile {
    JobFile {
        job: JobConfig::new(dir).with_frames(0, 2, 1),
        capture: Some(CaptureConfig {
            fps: Some(30.0),
            frame_time_s: Some(1.0 / 30.0),
            readouts_per_render: 1,
            exposure: Some(ExposureModel::single_line(1e-3)),
        }),
        camera: CameraConfig {
            sensor_res_y: Some(24),
            extension: Some(serde_json::json!({ "mSensor": { "sName": "test" } })),
        },
        outputs: vec![RenderOutput::new("/shutterline/render/output/image:1").with_folder("Image")],
        scene: Some(SceneConfig::new(3000.0, 32, 24)),
    }
}

fn scene() -> SceneConfig {
    SceneConfig::new(3000.0, 32, 24)
}

fn run(job: JobFile, host: &mut DryRunHost) -> Result<RenderSummary, ShutterlineError> {
    let mut driver = RenderDriver::new(DriverKind::RollingShutter, job);
    driver.init(host)?;
    let summary = driver.process(host, None);
    driver.finalize(host)?;
    summary
}

#[test]
fn renders_every_step_and_writes_side_files() {
    let dir = temp_dir("full");
    let mut host = DryRunHost::new(scene());

    let summary = run(rs_job(&dir), &mut host).unwrap();
    assert_eq!(summary.target_frames, 3);
    assert_eq!(summary.renders, 3 * STEPS_PER_FRAME);
    assert_eq!(summary.skipped, 0);
    assert_eq!(host.calls().prepare_scene, 1);
    assert_eq!(host.calls().scene_restores, 1);

    // Target frame 1 starts at scene frame 100, steps are 4 scene frames apart.
    assert_eq!(host.rendered_frames()[24], 100);
    assert_eq!(host.rendered_frames()[25], 104);
    assert!(dir.join("Frame_0001/Image/Exp_0000104.png").is_file());

    let cfg: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.join("RsCfg.json")).unwrap()).unwrap();
    assert_eq!(cfg["sDTI"], "rs-config:1.1");
    assert_eq!(cfg["iBorderMaxY"], 24);
    assert_eq!(cfg["mRsExp"]["iScnRenderDeltaFrames"], 4);
    assert_eq!(cfg["mSensor"]["sName"], "test");

    let log = std::fs::read_to_string(dir.join("Frame_0002/_log/log_frame-02_offset-00.txt"))
        .unwrap();
    assert!(log.contains("Status: stopped"));
    assert!(log.contains("Renders: 24 of 24"));
    assert!(log.contains("Rolling shutter exposure data"));
    assert!(log.contains("Total processing time:"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn rerun_over_complete_output_renders_nothing() {
    let dir = temp_dir("idempotent");
    run(rs_job(&dir), &mut DryRunHost::new(scene())).unwrap();

    let mut host = DryRunHost::new(scene());
    let summary = run(rs_job(&dir), &mut host).unwrap();
    assert_eq!(summary.renders, 0);
    assert_eq!(summary.skipped, 3 * STEPS_PER_FRAME);
    assert_eq!(host.calls().renders, 0);
    assert!(host.borders().is_empty());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn overwrite_renders_every_step_again() {
    let dir = temp_dir("overwrite");
    run(rs_job(&dir), &mut DryRunHost::new(scene())).unwrap();

    let mut job = rs_job(&dir);
    job.job.overwrite = true;
    let mut host = DryRunHost::new(scene());
    let summary = run(job, &mut host).unwrap();
    assert_eq!(summary.renders, 3 * STEPS_PER_FRAME);
    assert_eq!(summary.skipped, 0);
    assert_eq!(host.calls().renders, 3 * STEPS_PER_FRAME);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn failed_run_resumes_where_it_stopped() {
    let dir = temp_dir("resume");

    let mut failing = DryRunHost::new(scene()).failing_after(30);
    let err = run(rs_job(&dir), &mut failing).unwrap_err();
    assert!(matches!(err, ShutterlineError::Render { .. }));

    let mut host = DryRunHost::new(scene());
    let summary = run(rs_job(&dir), &mut host).unwrap();
    assert_eq!(summary.skipped, 30);
    assert_eq!(summary.renders, 3 * STEPS_PER_FRAME - 30);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn label_steps_export_data_inside_camera_frame() {
    let dir = temp_dir("label-camera-frame");
    let mut job = rs_job(&dir);
    job.job.frame_last = 1;
    job.job.transform_scene_to_camera_frame = true;
    job.outputs = vec![RenderOutput::new("/shutterline/render/output/anytruth/label:1")];

    let mut host = DryRunHost::new(scene());
    let summary = run(job, &mut host).unwrap();
    assert_eq!(summary.renders, 2 * STEPS_PER_FRAME);
    assert_eq!(host.calls().camera_frame_transforms, summary.renders);
    assert_eq!(host.calls().label_exports, summary.renders);

    let labels = dir.join("Frame_0000/anytruth-label");
    assert!(labels.join("Exp_0000000.png").is_file());
    assert!(labels.join("Exp_0000000.json").is_file());
    assert!(labels.join("Exp_0000092.json").is_file());
    assert!(dir.join("Frame_0001/anytruth-label/Exp_0000100.json").is_file());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn border_follows_the_exposed_band() {
    let dir = temp_dir("border");
    let mut job = rs_job(&dir);
    job.job.frame_last = 0;
    let mut host = DryRunHost::new(scene());
    run(job, &mut host).unwrap();

    let borders = host.borders();
    assert_eq!(borders.len(), STEPS_PER_FRAME as usize);
    // The top sensor row is the top pixel row of the image.
    assert_eq!(borders[0], ((24.0 - 0.75) / 24.0, (24.0 + 0.25) / 24.0));
    // Row 23 is the bottom pixel row.
    assert_eq!(borders[23], ((1.0 - 0.75) / 24.0, (1.0 + 0.25) / 24.0));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn partitioned_workers_cover_every_step_once() {
    let dir = temp_dir("partition");
    let mut frames = Vec::new();

    for offset in 0..2 {
        let mut job = rs_job(&dir);
        job.job.sub_frame_offset = offset;
        job.job.sub_frame_step = 2;
        let mut host = DryRunHost::new(scene());
        let summary = run(job, &mut host).unwrap();
        assert_eq!(summary.renders, 3 * STEPS_PER_FRAME / 2);
        let log = std::fs::read_to_string(
            dir.join(format!("Frame_0000/_log/log_frame-00_offset-{offset:02}.txt")),
        )
        .unwrap();
        assert!(log.contains("RO step: 2\n"), "{log}");
        frames.extend_from_slice(host.rendered_frames());
    }

    let mut single = DryRunHost::new(scene());
    run(rs_job(&temp_dir("partition-single")), &mut single).unwrap();

    frames.sort_unstable();
    assert_eq!(frames, single.rendered_frames());

    let _ = std::fs::remove_dir_all(&dir);
    let _ = std::fs::remove_dir_all(temp_dir("partition-single"));
}

#[test]
fn progress_reports_end_complete() {
    let dir = temp_dir("progress");
    let reports: Arc<Mutex<Vec<RenderProgress>>> = Arc::default();
    let sink = Arc::clone(&reports);

    let mut host = DryRunHost::new(scene());
    let mut driver = RenderDriver::new(DriverKind::RollingShutter, rs_job(&dir));
    driver.init(&host).unwrap();
    driver
        .process(
            &mut host,
            Some(Box::new(move |p| sink.lock().unwrap().push(p))),
        )
        .unwrap();

    let reports = reports.lock().unwrap();
    assert_eq!(reports.first().unwrap().stage, RenderStage::Preparing);
    let last = reports.last().unwrap();
    assert_eq!(last.stage, RenderStage::Complete);
    assert_eq!(last.progress, 1.0);
    assert_eq!(last.total_steps, 3 * STEPS_PER_FRAME);
    let rendering = reports
        .iter()
        .filter(|p| p.stage == RenderStage::Rendering)
        .count();
    assert_eq!(rendering as u64, 3 * STEPS_PER_FRAME);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn configuration_errors_fire_at_init() {
    let dir = temp_dir("config");
    let host = DryRunHost::new(scene());

    let mut two_outputs = rs_job(&dir);
    two_outputs
        .outputs
        .push(RenderOutput::new("/shutterline/render/output/anytruth/label:1"));
    let err = RenderDriver::new(DriverKind::RollingShutter, two_outputs)
        .init(&host)
        .unwrap_err();
    assert!(err.is_config(), "{err}");

    let mut no_exposure = rs_job(&dir);
    if let Some(capture) = no_exposure.capture.as_mut() {
        capture.exposure = None;
    }
    let err = RenderDriver::new(DriverKind::RollingShutter, no_exposure)
        .init(&host)
        .unwrap_err();
    assert!(err.to_string().contains("mExp"), "{err}");

    let coarse = DryRunHost::new(SceneConfig::new(30.0, 32, 24));
    let err = RenderDriver::new(DriverKind::RollingShutter, rs_job(&dir))
        .init(&coarse)
        .unwrap_err();
    assert!(err.is_config());
    assert!(err.to_string().contains("Scene FPS needs to be at least"), "{err}");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn finalize_without_init_leaves_the_scene_alone() {
    let dir = temp_dir("finalize-uninit");
    let mut host = DryRunHost::new(scene());
    let mut driver = RenderDriver::new(DriverKind::RollingShutter, rs_job(&dir));

    driver.finalize(&mut host).unwrap();
    assert_eq!(driver.phase(), DriverPhase::Finalized);
    assert_eq!(host.calls().scene_restores, 0);

    driver.finalize(&mut host).unwrap();
    assert_eq!(host.calls().scene_restores, 0);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn process_requires_init() {
    let dir = temp_dir("uninit");
    let mut host = DryRunHost::new(scene());
    let mut driver = RenderDriver::new(DriverKind::RollingShutter, rs_job(&dir));
    assert_eq!(driver.phase(), DriverPhase::Uninitialized);
    assert!(matches!(
        driver.process(&mut host, None),
        Err(ShutterlineError::NotInitialized)
    ));

    driver.init(&host).unwrap();
    driver.finalize(&mut host).unwrap();
    assert_eq!(driver.phase(), DriverPhase::Finalized);
    assert_eq!(host.calls().scene_restores, 1);
    assert!(matches!(
        driver.process(&mut host, None),
        Err(ShutterlineError::NotInitialized)
    ));

    let _ = std::fs::remove_dir_all(&dir);
}
