use crate::error::MeshLoadError;
use crate::mesh::MeshBuilder;

/// Minimal ASCII PLY (`format ascii 1.0`) reader feeding a [`MeshBuilder`].
/// Only the `x y z` vertex properties and triangular
/// `vertex_indices` face lists are consumed; any other declared properties
/// are read and discarded in header order.
pub fn load_ascii_ply(text: &str) -> Result<MeshBuilder, MeshLoadError> {
    let mut lines = text.lines().enumerate();

    let (_, first) = lines.next().ok_or(MeshLoadError::UnexpectedEof { what: "header" })?;
    if first.trim() != "ply" {
        return Err(MeshLoadError::MalformedHeader("missing \"ply\" magic".into()));
    }

    let mut vertex_count = None;
    let mut face_count = None;
    let mut vertex_property_count = 0usize;
    let mut in_vertex_element = false;

    loop {
        let (line_no, raw) = lines
            .next()
            .ok_or(MeshLoadError::UnexpectedEof { what: "header" })?;
        let line = raw.trim();
        if line.is_empty() || line.starts_with("comment") {
            continue;
        }
        if line == "end_header" {
            break;
        }
        let mut fields = line.split_whitespace();
        match fields.next() {
            Some("format") => {
                let encoding = fields.collect::<Vec<_>>().join(" ");
                if encoding != "ascii 1.0" {
                    return Err(MeshLoadError::UnsupportedEncoding(encoding));
                }
            }
            Some("element") => {
                let kind = fields.next().unwrap_or("");
                let count: usize = fields
                    .next()
                    .and_then(|s| s.parse().ok())
                    .ok_or_else(|| MeshLoadError::MalformedHeader(format!("line {line_no}: bad element count")))?;
                match kind {
                    "vertex" => {
                        vertex_count = Some(count);
                        in_vertex_element = true;
                    }
                    "face" => {
                        face_count = Some(count);
                        in_vertex_element = false;
                    }
                    _ => in_vertex_element = false,
                }
            }
            Some("property") => {
                if in_vertex_element {
                    vertex_property_count += 1;
                }
            }
            _ => {}
        }
    }

    let vertex_count = vertex_count.ok_or_else(|| MeshLoadError::MalformedHeader("no vertex element".into()))?;
    let face_count = face_count.ok_or_else(|| MeshLoadError::MalformedHeader("no face element".into()))?;

    let mut builder = MeshBuilder::with_capacity(vertex_count, face_count);

    for _ in 0..vertex_count {
        let (line_no, raw) = lines
            .next()
            .ok_or(MeshLoadError::UnexpectedEof { what: "vertex data" })?;
        let fields: Vec<&str> = raw.trim().split_whitespace().collect();
        if fields.len() < 3 || fields.len() < vertex_property_count.max(3) {
            return Err(MeshLoadError::MalformedVertex {
                line: line_no + 1,
                expected: vertex_property_count.max(3),
                got: fields.len(),
            });
        }
        let parse = |s: &str| -> Result<f64, MeshLoadError> {
            s.parse().map_err(|_| MeshLoadError::MalformedVertex {
                line: line_no + 1,
                expected: 3,
                got: fields.len(),
            })
        };
        let x = parse(fields[0])?;
        let y = parse(fields[1])?;
        let z = parse(fields[2])?;
        builder.push_vertex(crate::math::Point3::new(x, y, z));
    }

    for _ in 0..face_count {
        let (line_no, raw) = lines
            .next()
            .ok_or(MeshLoadError::UnexpectedEof { what: "face data" })?;
        let fields: Vec<&str> = raw.trim().split_whitespace().collect();
        let n: usize = fields
            .first()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| MeshLoadError::MalformedHeader(format!("line {}: bad face list count", line_no + 1)))?;
        if n != 3 {
            return Err(MeshLoadError::NonTriangularFace {
                line: line_no + 1,
                vertex_count: n,
            });
        }
        let mut indices = [0usize; 3];
        for (slot, field) in indices.iter_mut().zip(&fields[1..=3]) {
            *slot = field.parse().map_err(|_| MeshLoadError::MalformedHeader(format!(
                "line {}: bad vertex index",
                line_no + 1
            )))?;
        }
        if indices.iter().any(|&i| i >= vertex_count) {
            return Err(MeshLoadError::VertexIndexOutOfRange {
                line: line_no + 1,
                index: *indices.iter().find(|&&i| i >= vertex_count).unwrap(),
            });
        }
        builder.push_face(indices[0], indices[1], indices[2]);
    }

    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "ply\n\
format ascii 1.0\n\
comment exported\n\
element vertex 3\n\
property float x\n\
property float y\n\
property float z\n\
element face 1\n\
property list uchar int vertex_indices\n\
end_header\n\
0 0 0\n\
1 0 0\n\
0 1 0\n\
3 0 1 2\n";

    #[test]
    fn parses_a_single_triangle() {
        let builder = load_ascii_ply(SAMPLE).unwrap();
        let mesh = builder.finalize(&crate::mesh::MeshTransform::default()).unwrap();
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.triangle_indices.len(), 1);
    }

    #[test]
    fn rejects_binary_encoding() {
        let text = SAMPLE.replacen("ascii 1.0", "binary_little_endian 1.0", 1);
        let err = load_ascii_ply(&text).unwrap_err();
        assert!(matches!(err, MeshLoadError::UnsupportedEncoding(_)));
    }

    #[test]
    fn rejects_non_triangular_face() {
        let text = SAMPLE.replace("3 0 1 2", "4 0 1 2 0");
        let err = load_ascii_ply(&text).unwrap_err();
        assert!(matches!(err, MeshLoadError::NonTriangularFace { .. }));
    }
}
