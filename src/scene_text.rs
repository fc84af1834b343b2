//! Parser for the line-oriented scene-description grammar: whitespace
//! delimited tokens, blank lines ignored, quoted filenames, reserved
//! keywords `Mesh`, `OctreeMesh`, `Light`, `Lambertian`, `Camera`, `Default`.
//! This module only validates and structures the text — it never touches the
//! filesystem; [`crate::scene_loader`] resolves literals into real textures,
//! meshes and materials.

use crate::error::SceneParseError;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LiteralKind {
    Texture,
    MeshData,
    Material,
}

impl LiteralKind {
    fn name(self) -> &'static str {
        match self {
            LiteralKind::Texture => "texture literal",
            LiteralKind::MeshData => "mesh-data literal",
            LiteralKind::Material => "material literal",
        }
    }

    fn of(def: &LiteralDef) -> Self {
        match def {
            LiteralDef::ImageTexture { .. } | LiteralDef::ConstantTexture { .. } => LiteralKind::Texture,
            LiteralDef::MeshData { .. } => LiteralKind::MeshData,
            LiteralDef::Material { .. } => LiteralKind::Material,
        }
    }
}

#[derive(Debug, Clone)]
pub enum LiteralDef {
    ImageTexture {
        path: String,
        intensity: (f64, f64, f64),
    },
    ConstantTexture {
        rgb: (f64, f64, f64),
    },
    MeshData {
        path: String,
        transform: MeshTransformSpec,
    },
    Material {
        texture_literal: String,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct MeshTransformSpec {
    pub position: (f64, f64, f64),
    pub rotation_euler_degrees: (f64, f64, f64),
    pub scale: (f64, f64, f64),
}

#[derive(Debug, Clone)]
pub enum ObjectStmt {
    Mesh {
        meshdata_literal: String,
        material_literal: String,
    },
    OctreeMesh {
        meshdata_literal: String,
        material_literal: String,
    },
    Light {
        center: (f64, f64, f64),
        radius: f64,
        texture_literal: String,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct CameraSpec {
    pub look_from: (f64, f64, f64),
    pub look_at: (f64, f64, f64),
    pub up: (f64, f64, f64),
}

#[derive(Debug, Clone)]
pub enum BackgroundSpec {
    Solid((f64, f64, f64)),
    Gradient {
        horizon: (f64, f64, f64),
        zenith: (f64, f64, f64),
    },
}

#[derive(Debug, Clone, Default)]
pub struct ParsedScene {
    pub literals: Vec<(String, LiteralDef)>,
    pub objects: Vec<ObjectStmt>,
    pub camera: Option<CameraSpec>,
    pub background: Option<BackgroundSpec>,
}

const KEYWORDS: &[&str] = &["Mesh", "OctreeMesh", "Light", "Lambertian", "Camera", "Default"];

pub fn parse(text: &str) -> Result<ParsedScene, SceneParseError> {
    let mut scene = ParsedScene::default();
    let mut defined: HashMap<String, LiteralKind> = HashMap::new();

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw_line);
        if line.trim().is_empty() {
            continue;
        }
        let tokens = tokenize(line);

        match tokens[0].as_str() {
            "Mesh" | "OctreeMesh" => {
                if tokens.len() != 3 {
                    return Err(malformed(line_no, "Mesh/OctreeMesh statement", 3, tokens.len()));
                }
                require_defined(&defined, &tokens[1], line_no, LiteralKind::MeshData)?;
                require_defined(&defined, &tokens[2], line_no, LiteralKind::Material)?;
                let stmt = if tokens[0] == "Mesh" {
                    ObjectStmt::Mesh {
                        meshdata_literal: tokens[1].clone(),
                        material_literal: tokens[2].clone(),
                    }
                } else {
                    ObjectStmt::OctreeMesh {
                        meshdata_literal: tokens[1].clone(),
                        material_literal: tokens[2].clone(),
                    }
                };
                scene.objects.push(stmt);
            }
            "Light" => {
                if tokens.len() != 6 {
                    return Err(malformed(line_no, "Light statement", 6, tokens.len()));
                }
                let x = number(&tokens[1], line_no)?;
                let y = number(&tokens[2], line_no)?;
                let z = number(&tokens[3], line_no)?;
                let radius = number(&tokens[4], line_no)?;
                require_defined(&defined, &tokens[5], line_no, LiteralKind::Texture)?;
                scene.objects.push(ObjectStmt::Light {
                    center: (x, y, z),
                    radius,
                    texture_literal: tokens[5].clone(),
                });
            }
            "Camera" => {
                if tokens.len() != 10 {
                    return Err(malformed(line_no, "Camera statement", 10, tokens.len()));
                }
                let n = numbers(&tokens[1..10], line_no)?;
                scene.camera = Some(CameraSpec {
                    look_from: (n[0], n[1], n[2]),
                    look_at: (n[3], n[4], n[5]),
                    up: (n[6], n[7], n[8]),
                });
            }
            "Default" => match tokens.len() {
                4 => {
                    let n = numbers(&tokens[1..4], line_no)?;
                    scene.background = Some(BackgroundSpec::Solid((n[0], n[1], n[2])));
                }
                7 => {
                    let n = numbers(&tokens[1..7], line_no)?;
                    scene.background = Some(BackgroundSpec::Gradient {
                        horizon: (n[0], n[1], n[2]),
                        zenith: (n[3], n[4], n[5]),
                    });
                }
                got => return Err(malformed(line_no, "Default statement", 4, got)),
            },
            first if KEYWORDS.contains(&first) => {
                return Err(SceneParseError::UnknownKeyword {
                    line: line_no,
                    keyword: first.to_string(),
                });
            }
            literal => {
                if defined.contains_key(literal) {
                    return Err(SceneParseError::DuplicateLiteral {
                        line: line_no,
                        literal: literal.to_string(),
                    });
                }
                let def = parse_literal_def(&tokens, line_no)?;
                if let LiteralDef::Material { texture_literal } = &def {
                    require_defined(&defined, texture_literal, line_no, LiteralKind::Texture)?;
                }
                defined.insert(literal.to_string(), LiteralKind::of(&def));
                scene.literals.push((literal.to_string(), def));
            }
        }
    }

    if scene.camera.is_none() {
        return Err(SceneParseError::MissingCamera);
    }

    Ok(scene)
}

fn parse_literal_def(tokens: &[String], line_no: usize) -> Result<LiteralDef, SceneParseError> {
    match tokens.len() {
        3 if tokens[1] == "Lambertian" => Ok(LiteralDef::Material {
            texture_literal: tokens[2].clone(),
        }),
        4 => {
            let n = numbers(&tokens[1..4], line_no)?;
            Ok(LiteralDef::ConstantTexture { rgb: (n[0], n[1], n[2]) })
        }
        5 if tokens[1].ends_with(".png") => {
            let n = numbers(&tokens[2..5], line_no)?;
            Ok(LiteralDef::ImageTexture {
                path: tokens[1].clone(),
                intensity: (n[0], n[1], n[2]),
            })
        }
        11 if tokens[1].ends_with(".ply") => {
            let n = numbers(&tokens[2..11], line_no)?;
            Ok(LiteralDef::MeshData {
                path: tokens[1].clone(),
                transform: MeshTransformSpec {
                    position: (n[0], n[1], n[2]),
                    rotation_euler_degrees: (n[3], n[4], n[5]),
                    scale: (n[6], n[7], n[8]),
                },
            })
        }
        got => Err(malformed(line_no, "literal definition", 4, got)),
    }
}

fn require_defined(
    defined: &HashMap<String, LiteralKind>,
    literal: &str,
    line: usize,
    expected: LiteralKind,
) -> Result<(), SceneParseError> {
    match defined.get(literal) {
        None => Err(SceneParseError::UndefinedLiteral {
            line,
            literal: literal.to_string(),
        }),
        Some(&found) if found == expected => Ok(()),
        Some(&found) => Err(SceneParseError::WrongLiteralKind {
            line,
            literal: literal.to_string(),
            expected: expected.name(),
            found: found.name(),
        }),
    }
}

fn number(token: &str, line: usize) -> Result<f64, SceneParseError> {
    token.parse().map_err(|_| SceneParseError::InvalidNumber {
        line,
        value: token.to_string(),
    })
}

fn numbers(tokens: &[String], line: usize) -> Result<Vec<f64>, SceneParseError> {
    tokens.iter().map(|t| number(t, line)).collect()
}

fn malformed(line: usize, what: &'static str, expected: usize, got: usize) -> SceneParseError {
    SceneParseError::MalformedStatement { line, what, expected, got }
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '"' {
            chars.next();
            let mut s = String::new();
            for ch in chars.by_ref() {
                if ch == '"' {
                    break;
                }
                s.push(ch);
            }
            tokens.push(s);
        } else {
            let mut s = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() {
                    break;
                }
                s.push(ch);
                chars.next();
            }
            tokens.push(s);
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_scene() {
        let text = "\
white 0.8 0.8 0.8
whiteMat Lambertian white
Light 0 5 0 1 white
Camera 0 0 -5 0 0 0 0 1 0
";
        let scene = parse(text).unwrap();
        assert_eq!(scene.literals.len(), 2);
        assert_eq!(scene.objects.len(), 1);
        assert!(scene.camera.is_some());
    }

    #[test]
    fn reports_undefined_literal_with_line_number() {
        let text = "\
Camera 0 0 -5 0 0 0 0 1 0
Mesh undefined_literal mat
";
        let err = parse(text).unwrap_err();
        match err {
            SceneParseError::UndefinedLiteral { line, literal } => {
                assert_eq!(line, 2);
                assert_eq!(literal, "undefined_literal");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicate_literal_names() {
        let text = "\
white 0.8 0.8 0.8
white 0.1 0.1 0.1
Camera 0 0 -5 0 0 0 0 1 0
";
        let err = parse(text).unwrap_err();
        assert!(matches!(err, SceneParseError::DuplicateLiteral { .. }));
    }

    #[test]
    fn missing_camera_is_an_error() {
        let text = "white 0.8 0.8 0.8\n";
        let err = parse(text).unwrap_err();
        assert!(matches!(err, SceneParseError::MissingCamera));
    }
}
