use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use kitbash::Scene;
use kitbash::pipeline::merge_files;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: kitbash-merge <base.glb> <output.glb> <additional1.glb> [additional2.glb] ...");
        return ExitCode::FAILURE;
    }

    let base = PathBuf::from(&args[1]);
    let output = PathBuf::from(&args[2]);
    let additional: Vec<PathBuf> = args[3..].iter().map(PathBuf::from).collect();

    let mut scene = Scene::new();
    match merge_files(&mut scene, &base, &additional, &output) {
        Ok(report) => {
            log::info!(
                "Merge complete: {} meshes bound, {} skipped, {} armature(s) removed",
                report.bound_meshes,
                report.skipped_meshes,
                report.removed_armatures
            );
            println!("SUCCESS");
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("ERROR: {e}");
            ExitCode::FAILURE
        }
    }
}
