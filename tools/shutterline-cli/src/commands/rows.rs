//! List the exposure steps of one target frame.

use std::path::PathBuf;

use shutterline_exposure::LoopPartition;
use shutterline_render_engine::{RenderBorder, RenderHost, SceneBorder};

pub fn run(path: PathBuf, frame: i64, offset: u32, step: u32, rows: bool) -> anyhow::Result<()> {
    let job = super::load_job(&path)?;
    let host = super::scene_host(&job)?;
    let mut exp = super::plan::exposure(&job, host.scene_fps())?;
    let scene = SceneBorder::new(host.resolution(), host.border_y());

    exp.set_target_frame(frame);
    let partition = LoopPartition::new(offset, step)?;

    println!(
        "Target frame {frame}, worker {offset} of {step}: {} step(s)",
        exp.readout_loop_count(partition)
    );
    println!("{:>8}  {:>11}  {:>13}  {:>13}", "loop", "scene frame", "rows", "border");

    if exp.start_readout_loop(partition) {
        loop {
            let s = exp.current_step();
            let border = RenderBorder::from_band(&scene, s.row_top, s.row_bottom);
            println!(
                "{:>8}  {:>11}  {:>13}  {:>13}",
                exp.loop_index(),
                s.scene_frame,
                format!("{}..{}", s.row_top, s.row_bottom),
                format!("{}..={}", border.min, border.max),
            );
            if rows {
                let list: Vec<String> = exp.exp_row_list().iter().map(u32::to_string).collect();
                println!("          exposed: [{}]", list.join(", "));
            }
            if !exp.step_readout_loop() {
                break;
            }
        }
    }
    Ok(())
}
