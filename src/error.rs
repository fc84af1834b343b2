use thiserror::Error;

/// A single diagnostic from the scene-description grammar, always carrying
/// the 1-based source line it came from.
#[derive(Debug, Error)]
pub enum SceneParseError {
    #[error("line {line}: unknown keyword {keyword:?}")]
    UnknownKeyword { line: usize, keyword: String },

    #[error("line {line}: malformed {what} (expected {expected} fields, got {got})")]
    MalformedStatement {
        line: usize,
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("line {line}: literal {literal:?} is already defined")]
    DuplicateLiteral { line: usize, literal: String },

    #[error("line {line}: undefined literal {literal:?}")]
    UndefinedLiteral { line: usize, literal: String },

    #[error("line {line}: literal {literal:?} is a {found}, expected a {expected}")]
    WrongLiteralKind {
        line: usize,
        literal: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("line {line}: invalid number {value:?}")]
    InvalidNumber { line: usize, value: String },

    #[error("no Camera statement in scene file")]
    MissingCamera,
}

#[derive(Debug, Error)]
pub enum AssetLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image {path}: {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("mesh {path}: {source}")]
    Mesh {
        path: String,
        #[source]
        source: MeshLoadError,
    },
}

#[derive(Debug, Error)]
pub enum MeshLoadError {
    #[error("unsupported PLY encoding {0:?} (only \"format ascii 1.0\" is supported)")]
    UnsupportedEncoding(String),

    #[error("malformed PLY header: {0}")]
    MalformedHeader(String),

    #[error("expected {expected} vertex fields on line {line}, got {got}")]
    MalformedVertex {
        line: usize,
        expected: usize,
        got: usize,
    },

    #[error("expected a triangular face on line {line}, got {vertex_count} vertices")]
    NonTriangularFace { line: usize, vertex_count: usize },

    #[error("face on line {line} references out-of-range vertex index {index}")]
    VertexIndexOutOfRange { line: usize, index: usize },

    #[error("unexpected end of file while reading {what}")]
    UnexpectedEof { what: &'static str },
}
