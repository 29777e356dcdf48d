use std::io::{self, BufRead};

use super::{FaceVertex, Mesh};
use crate::util::Vector3f;

/// Reads geometry text line by line into a new mesh.
///
/// Recognized records: `v x y z`, `vt u v`, `vn x y z`, `f a b c` with each corner written
/// as `p`, `p/t`, `p/t/n` or `p//n` (1-based). Comments, blank lines and unknown records
/// are ignored, records that fail to parse are skipped and remembered on the mesh.
pub(super) fn parse_geometry<R: BufRead>(reader: R) -> io::Result<Mesh> {
    let mut mesh = Mesh::new();

    for (line_index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut tokens = trimmed.split_whitespace();
        let result = match tokens.next() {
            Some("v") => parse_coordinates(tokens, 3).map(|c| mesh.push_vertex(Vector3f::new(c[0], c[1], c[2]))),
            Some("vt") => parse_coordinates(tokens, 2).map(|c| mesh.push_uv(c[0], c[1])),
            Some("vn") => parse_coordinates(tokens, 3).map(|c| mesh.push_normal(Vector3f::new(c[0], c[1], c[2]))),
            Some("f") => parse_face(tokens).map(|face| mesh.push_face(face)),
            _ => Ok(()),
        };

        if let Err(reason) = result {
            mesh.push_skipped_line(line_index + 1, reason);
        }
    }

    return Ok(mesh);
}

/// Parses the first `count` tokens as floats, anything after them is ignored.
fn parse_coordinates<'a, I: Iterator<Item = &'a str>>(tokens: I, count: usize) -> Result<[f32; 3], String> {
    let mut coordinates = [0.0; 3];
    let mut found = 0;
    for token in tokens.take(count) {
        coordinates[found] = token
            .parse::<f32>()
            .map_err(|_| format!("'{}' is not a number", token))?;
        found += 1;
    }
    if found < count {
        return Err(format!("expected {} coordinates, found {}", count, found));
    }
    return Ok(coordinates);
}

fn parse_face<'a, I: Iterator<Item = &'a str>>(tokens: I) -> Result<[FaceVertex; 3], String> {
    let corners = tokens.map(parse_face_vertex).collect::<Result<Vec<_>, _>>()?;
    if corners.len() != 3 {
        return Err(format!("expected 3 vertices per face, found {}", corners.len()));
    }
    return Ok([corners[0], corners[1], corners[2]]);
}

/// One `p/t/n` corner. Empty or absent components stay None.
fn parse_face_vertex(record: &str) -> Result<FaceVertex, String> {
    let components: Vec<&str> = record.split('/').collect();
    if components.len() > 3 {
        return Err(format!("face corner '{}' has more than 3 components", record));
    }
    let index_at = |i: usize| -> Result<Option<usize>, String> {
        return match components.get(i) {
            Some(component) => parse_index(component),
            None => Ok(None),
        };
    };
    let position = match index_at(0)? {
        Some(position) => position,
        None => return Err(format!("face corner '{}' has no position index", record)),
    };
    return Ok(FaceVertex { position, uv: index_at(1)?, normal: index_at(2)? });
}

/// 1-based index to 0-based.
fn parse_index(component: &str) -> Result<Option<usize>, String> {
    if component.is_empty() {
        return Ok(None);
    }
    let index = component
        .parse::<usize>()
        .map_err(|_| format!("'{}' is not a valid index", component))?;
    if index == 0 {
        return Err(String::from("indices are 1-based, found 0"));
    }
    return Ok(Some(index - 1));
}
