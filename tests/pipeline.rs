use soft_rasterizer::color::{BLACK, WHITE};
use soft_rasterizer::mesh::FaceVertex;
use soft_rasterizer::util::Vector3f;
use soft_rasterizer::{Camera, Color, Mesh, Rasterizer, ShaderError, ShaderKind, Texture, TextureKind};

const QUAD: &str = "# two triangles sharing an edge\n\
                    v -1 -1 0\nv 1 -1 0\nv 1 1 0\nv -1 1 0\n\
                    vt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\n\
                    vn 0 0 1\n\
                    f 1/1/1 2/2/1 3/3/1\n\
                    f 1/1/1 3/3/1 4/4/1\n";

fn approx_eq(a: f32, b: f32) -> bool {
    return (a - b).abs() < 1e-3;
}

fn textured_quad() -> Mesh {
    let mut mesh = Mesh::from_text(QUAD).unwrap();
    // Left column red, right column green.
    mesh.set_texture(
        TextureKind::Diffuse,
        Texture::new(2, 1, 4, vec![255, 0, 0, 255, 0, 255, 0, 255]),
    );
    mesh.set_texture(TextureKind::NormalMap, Texture::new(1, 1, 4, vec![128, 128, 255, 255]));
    mesh.set_texture(TextureKind::Specular, Texture::new(1, 1, 1, vec![10]));
    return mesh;
}

fn lit_pixels(rasterizer: &Rasterizer) -> usize {
    return rasterizer
        .as_render_data()
        .chunks_exact(4)
        .filter(|p| p[..3] != [0, 0, 0])
        .count();
}

#[test]
fn single_face_geometry_keeps_index_triples() {
    let mesh = Mesh::from_text("v -1 -1 0\nv 1 -1 0\nv 0 1 0\nf 1/1/1 2/2/2 3/3/3\n").unwrap();
    assert_eq!(mesh.face_count(), 1);
    assert_eq!(mesh.vertex_count(), 3);
    let expected: Vec<FaceVertex> = (0..3)
        .map(|i| FaceVertex { position: i, uv: Some(i), normal: Some(i) })
        .collect();
    assert_eq!(mesh.face(0).to_vec(), expected);
}

#[test]
fn every_shader_fills_the_quad() {
    let mesh = textured_quad();
    for kind in ShaderKind::ALL {
        let mut rasterizer = Rasterizer::new(80, 80);
        let stats = rasterizer.draw(&mesh, kind).unwrap();
        assert_eq!(stats.faces, 2, "{}", kind);
        assert_eq!(stats.culled, 0, "{}", kind);
        // Viewport covers 60x60 pixels, shared edge pixels are only counted once.
        assert!(stats.fragments >= 60 * 60 && stats.fragments <= 61 * 61, "{}: {:?}", kind, stats);
        assert_eq!(lit_pixels(&rasterizer), stats.fragments, "{}", kind);
    }
}

#[test]
fn texture_halves_land_on_screen_halves() {
    let mesh = textured_quad();
    let mut rasterizer = Rasterizer::new(80, 80);
    rasterizer.draw(&mesh, ShaderKind::Gouraud).unwrap();
    // Blended intensity can land a hair under 1.
    let left = rasterizer.pixel(20, 40);
    let right = rasterizer.pixel(60, 40);
    assert!(left.r >= 254 && left.g == 0 && left.b == 0, "{:?}", left);
    assert!(right.r == 0 && right.g >= 254 && right.b == 0, "{:?}", right);
    assert_eq!(rasterizer.pixel(2, 2), BLACK);
}

#[test]
fn tangent_view_shows_the_normal_map() {
    let mut mesh = Mesh::from_text(QUAD).unwrap();
    // Left column tilted toward -u, right column straight up. No diffuse texture needed.
    mesh.set_texture(
        TextureKind::NormalMap,
        Texture::new(2, 1, 4, vec![30, 128, 200, 255, 128, 128, 255, 255]),
    );
    let mut rasterizer = Rasterizer::new(80, 80);
    rasterizer.draw(&mesh, ShaderKind::TangentNormal).unwrap();
    assert_eq!(rasterizer.pixel(20, 40), Color::new(30, 128, 200, 255));
    assert_eq!(rasterizer.pixel(60, 40), Color::new(128, 128, 255, 255));
    assert_eq!(rasterizer.pixel(2, 2), BLACK);
}

#[test]
fn render_data_is_stored_top_row_first() {
    let mesh = Mesh::from_text("v -1 -1 0\nv 1 -1 0\nv -1 1 0\nf 1 2 3\n").unwrap();
    let mut rasterizer = Rasterizer::new(8, 8);
    rasterizer.draw(&mesh, ShaderKind::ZBuffer).unwrap();
    let data = rasterizer.as_render_data();
    // Bottom left corner of the viewport (1, 1) is lit, top right (6, 6) is not.
    let bottom_left = 4 * (1 + (8 - 1 - 1) * 8);
    let top_right = 4 * (6 + (8 - 1 - 6) * 8);
    assert_ne!(&data[bottom_left..bottom_left + 3], &[0, 0, 0]);
    assert_eq!(&data[top_right..top_right + 3], &[0, 0, 0]);
}

#[test]
fn quad_seen_from_behind_is_culled() {
    let mesh = textured_quad();
    let mut rasterizer = Rasterizer::new(80, 80);
    rasterizer.set_camera(Camera::new(Vector3f::new(0.0, 0.0, -3.0), Vector3f::zeros(), Vector3f::y()));
    rasterizer.set_light_direction(Vector3f::new(0.0, 0.0, 1.0));
    let stats = rasterizer.draw(&mesh, ShaderKind::ZBuffer).unwrap();
    assert_eq!(stats.culled, 2);
    assert_eq!(lit_pixels(&rasterizer), 0);
}

#[test]
fn frames_accumulate_until_cleared() {
    let mut mesh = textured_quad();
    let mut rasterizer = Rasterizer::new(80, 80).with_background(Color::new(0, 0, 0, 255));
    let first = rasterizer.draw(&mesh, ShaderKind::FaceIllumination).unwrap();
    assert_eq!(rasterizer.draw(&mesh, ShaderKind::FaceIllumination).unwrap().fragments, 0);

    // Moving the quad toward the camera puts it in front of what was drawn.
    mesh.translate(Vector3f::new(0.0, 0.0, 0.5));
    let closer = rasterizer.draw(&mesh, ShaderKind::FaceIllumination).unwrap();
    assert!(closer.fragments >= first.fragments);

    rasterizer.clear();
    assert_eq!(lit_pixels(&rasterizer), 0);
    assert_eq!(rasterizer.depth(40, 40), f32::NEG_INFINITY);
}

#[test]
fn rotated_model_dims_gouraud_lighting() {
    let mut mesh = textured_quad();
    mesh.set_texture(TextureKind::Diffuse, Texture::new(1, 1, 4, vec![200, 200, 200, 255]));
    mesh.rotate_yaw(std::f32::consts::FRAC_PI_3);
    let mut rasterizer = Rasterizer::new(80, 80);
    rasterizer.draw(&mesh, ShaderKind::Gouraud).unwrap();
    // cos(60 degrees) of 200.
    let center = rasterizer.pixel(40, 40);
    assert!((99..=100).contains(&center.r), "{:?}", center);
}

#[test]
fn depth_grows_toward_the_camera() {
    let mesh = Mesh::from_text("v -1 -1 -0.5\nv 1 -1 -0.5\nv 0 1 0.5\nf 1 2 3\n").unwrap();
    let mut rasterizer = Rasterizer::new(64, 64);
    rasterizer.draw(&mesh, ShaderKind::ZBuffer).unwrap();
    let low = rasterizer.depth(32, 12);
    let high = rasterizer.depth(32, 40);
    assert!(high > low, "{} should be above {}", high, low);
    assert!(approx_eq(rasterizer.pixel(32, 40).r as f32, (255.0 * (high / 320.0)).floor()));
}

#[test]
fn wireframe_can_overlay_a_shaded_frame() {
    let mesh = textured_quad();
    let mut rasterizer = Rasterizer::new(80, 80);
    rasterizer.draw(&mesh, ShaderKind::ZBuffer).unwrap();
    rasterizer.draw_wireframe(&mesh, WHITE);
    // Diagonal shared by both faces.
    assert_eq!(rasterizer.pixel(40, 40), WHITE);
}

#[test]
fn configuration_errors_name_the_problem() {
    let mut mesh = Mesh::from_text(QUAD).unwrap();
    let mut rasterizer = Rasterizer::new(16, 16);
    let err = rasterizer.draw(&mesh, ShaderKind::Phong).unwrap_err();
    assert_eq!(err.to_string(), "phong shader needs a diffuse texture, none is loaded");

    mesh.set_texture(TextureKind::Diffuse, Texture::new(1, 1, 4, vec![1, 1, 1, 255]));
    mesh.scale(0.0, 1.0, 1.0);
    let err = rasterizer.draw(&mesh, ShaderKind::Gouraud).unwrap_err();
    assert!(matches!(err, ShaderError::SingularTransform { shader: ShaderKind::Gouraud, .. }));
    assert_eq!("sepia".parse::<ShaderKind>().unwrap_err().to_string(), "unknown shader 'sepia'");
}
