mod app;

use std::env;

use anyhow::{bail, Context};

use soft_rasterizer::logging::{init_logging, LoggingConfig};
use soft_rasterizer::ShaderKind;

const WIDTH: u32  = 1024;
const HEIGHT: u32 = 768;

/// Value following a flag, e.g. the path after `-p`.
fn flag_value(args: &[String], i: usize) -> anyhow::Result<String> {
    return match args.get(i + 1) {
        Some(value) => Ok(value.clone()),
        None => bail!("{} expects a value", args[i]),
    };
}

#[show_image::main]
fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    // Default values.
    let mut asset_path = String::from("assets/african_head");
    let mut shader_name = String::from("gouraud");
    let mut output = None;
    let mut print_fps = false;
    let mut wireframe = false;

    let args: Vec<String> = env::args().collect();
    for i in 1..args.len() {
        match args[i].as_str() {
            "-p" => { asset_path = flag_value(&args, i)?; }
            "-s" => { shader_name = flag_value(&args, i)?; }
            "-o" => { output = Some(flag_value(&args, i)?); }
            "-f" => { print_fps = true; }
            "-w" => { wireframe = true; }
            _ => ()
        }
    }

    let shader = shader_name
        .parse::<ShaderKind>()
        .with_context(|| format!("expected one of {:?}", ShaderKind::ALL.map(ShaderKind::name)))?;

    let params = app::Params {
        width: WIDTH,
        height: HEIGHT,
        print_fps,
        wireframe,
        asset_path,
        shader,
        output,
    };

    app::run(params)?;

    return Ok(());
}
