use std::time;

use anyhow::{anyhow, Context};
use show_image::{create_window, event, ImageInfo, ImageView, WindowOptions};

use soft_rasterizer::color::{BLACK, WHITE};
use soft_rasterizer::{Mesh, Rasterizer, ShaderKind, TextureKind};
use soft_rasterizer::util::{normalized, Vector3f};

/// Execution parameters of the viewer.
pub struct Params {
    pub width: u32,
    pub height: u32,
    pub print_fps: bool,
    pub wireframe: bool,
    pub asset_path: String,     // Prefix, `.obj` and texture suffixes get appended.
    pub shader: ShaderKind,
    pub output: Option<String>, // Render a single frame into this png instead of opening a window.
}

/// Texture files that are looked up next to the geometry.
const TEXTURE_SUFFIXES: [(TextureKind, &str); 3] = [
    (TextureKind::Diffuse, "_diffuse.tga"),
    (TextureKind::NormalMap, "_nm_tangent.tga"),
    (TextureKind::Specular, "_spec.tga"),
];

/// Radians per second of the camera orbit.
const ORBIT_SPEED: f32 = 0.5;

fn load_mesh(asset_path: &str) -> anyhow::Result<Mesh> {
    let geometry_path = format!("{}.obj", asset_path);
    let mut mesh = Mesh::load_geometry(&geometry_path)
        .with_context(|| format!("failed to load geometry from {}", geometry_path))?;

    // Missing textures are not fatal, shaders that need them refuse to activate instead.
    for (kind, suffix) in TEXTURE_SUFFIXES {
        let texture_path = format!("{}{}", asset_path, suffix);
        if let Err(err) = mesh.load_texture(kind, &texture_path) {
            log::warn!("{}: {}", texture_path, err);
        }
    }
    return Ok(mesh);
}

/// Puts the camera on a circle of radius 3 around the origin, with the light coming from the eye.
fn orbit(rasterizer: &mut Rasterizer, seconds: f32) {
    let angle = seconds * ORBIT_SPEED;
    let camera = rasterizer.camera_mut();
    camera.eye = Vector3f::new(3.0 * angle.sin(), 0.0, 3.0 * angle.cos());
    let light = normalized(&(camera.eye - camera.center));
    rasterizer.set_light_direction(light);
}

/// Picks the shader bound to a number key.
fn shader_for_key(key: event::VirtualKeyCode) -> Option<ShaderKind> {
    let index = match key {
        event::VirtualKeyCode::Key1 => 0,
        event::VirtualKeyCode::Key2 => 1,
        event::VirtualKeyCode::Key3 => 2,
        event::VirtualKeyCode::Key4 => 3,
        event::VirtualKeyCode::Key5 => 4,
        event::VirtualKeyCode::Key6 => 5,
        _ => return None,
    };
    return Some(ShaderKind::ALL[index]);
}

/// Renders one frame and writes it to `output`.
fn render_to_file(params: &Params, mesh: &Mesh, output: &str) -> anyhow::Result<()> {
    let mut rasterizer = Rasterizer::new(params.width, params.height);
    orbit(&mut rasterizer, 0.0);
    let stats = rasterizer.draw(mesh, params.shader)?;
    if params.wireframe {
        rasterizer.draw_wireframe(mesh, WHITE);
    }
    log::info!("rendered {} faces, {} fragments", stats.faces, stats.fragments);

    image::save_buffer(
        output,
        rasterizer.as_render_data(),
        params.width,
        params.height,
        image::ColorType::Rgba8,
    )
    .with_context(|| format!("failed to save {}", output))?;
    log::info!("frame saved to {}", output);
    return Ok(());
}

/// Actually launches the window, showing frames until Escape is released.
pub fn run(params: Params) -> anyhow::Result<()> {
    let mesh = load_mesh(&params.asset_path)?;

    if let Some(output) = &params.output {
        return render_to_file(&params, &mesh, output);
    }

    let mut rasterizer = Rasterizer::new(params.width, params.height).with_background(BLACK);
    let mut shader = params.shader;

    let window_options = WindowOptions {
        size: Some([params.width, params.height]),
        ..Default::default()
    };
    let window = create_window("soft_rasterizer", window_options)
        .map_err(|err| anyhow!("failed to create window: {}", err))?;
    let event_channel = window
        .event_channel()
        .map_err(|err| anyhow!("failed to subscribe to window events: {}", err))?;

    let time_begin = time::Instant::now();
    let mut frame_counter_time_begin = time::Instant::now();
    let mut frame_counter: u32 = 0;
    let mut exit = false;
    while !exit {
        rasterizer.clear();
        orbit(&mut rasterizer, time_begin.elapsed().as_secs_f32());

        if let Err(err) = rasterizer.draw(&mesh, shader) {
            // Depth view needs nothing but positions.
            log::error!("{}, switching to {}", err, ShaderKind::ZBuffer);
            shader = ShaderKind::ZBuffer;
            continue;
        }
        if params.wireframe {
            rasterizer.draw_wireframe(&mesh, WHITE);
        }

        let image_data = ImageView::new(
            ImageInfo::rgba8(params.width, params.height),
            rasterizer.as_render_data(),
        );
        window
            .set_image("frame", image_data)
            .map_err(|err| anyhow!("failed to present frame: {}", err))?;

        // Draining everything that piled up in the event channel since the last frame.
        for window_event in event_channel.try_iter() {
            if let event::WindowEvent::KeyboardInput(event) = window_event {
                if !event.input.state.is_released() {
                    continue;
                }
                match event.input.key_code {
                    Some(event::VirtualKeyCode::Escape) => exit = true,
                    Some(key) => {
                        if let Some(kind) = shader_for_key(key) {
                            log::info!("switching shader to {}", kind);
                            shader = kind;
                        }
                    }
                    None => (),
                }
            }
        }

        if params.print_fps {
            // Counting frames to print out stats every second.
            frame_counter += 1;
            if frame_counter_time_begin.elapsed().as_secs_f32() > 1.0 {
                log::info!("FPS --- {}", frame_counter);
                frame_counter_time_begin = time::Instant::now();
                frame_counter = 0;
            }
        }
    }

    return Ok(());
}
