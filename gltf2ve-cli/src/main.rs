use anyhow::{Context, Result};
use gltf2ve_core::{ConvertError, convert, load_file, write_document};
use std::env;
use std::process::ExitCode;

const USAGE_EXIT: u8 = 2;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let [input_path] = args.as_slice() else {
        eprintln!(
            "error: expected exactly one argument (the asset path), got {}",
            args.len()
        );
        eprintln!("Usage: gltf2ve <asset.gltf|asset.glb>");
        return ExitCode::from(USAGE_EXIT);
    };

    match run(input_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            let code = err
                .downcast_ref::<ConvertError>()
                .map_or(1, ConvertError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn run(input_path: &str) -> Result<()> {
    let start_total = std::time::Instant::now();
    let scene = load_file(input_path).with_context(|| format!("could not read {input_path}"))?;
    log::info!(
        "Loaded {input_path} in {:.2}s",
        start_total.elapsed().as_secs_f32()
    );

    let flat = convert(&scene).with_context(|| format!("could not convert {input_path}"))?;
    log::info!(
        "Flattened to {} vertices in {:.2}s",
        flat.vertex_count(),
        start_total.elapsed().as_secs_f32()
    );

    write_document(&flat, std::io::stdout().lock())?;
    Ok(())
}
