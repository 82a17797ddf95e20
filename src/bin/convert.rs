use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use kitbash::Scene;
use kitbash::pipeline::convert_file;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: kitbash-convert <input.glb> <output.vrm>");
        return ExitCode::FAILURE;
    }

    let input = PathBuf::from(&args[1]);
    let output = PathBuf::from(&args[2]);

    let mut scene = Scene::new();
    match convert_file(&mut scene, &input, &output) {
        Ok(report) => {
            log::info!(
                "Conversion complete: {} meshes, {} bones, {} humanoid bone(s) assigned",
                report.meshes,
                report.bones,
                report.humanoid_assigned
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
