//! Error types produced while loading meshes, extracting projects and submitting them.

use std::path::PathBuf;

use thiserror::Error;

/// Error returned when a mesh file cannot be turned into a [`Mesh`](crate::Mesh).
#[derive(Debug, Error)]
pub enum MeshError {
    /// Returned when the OBJ reader rejects the file.
    #[error("failed to read mesh {path}: {message}")]
    Parse {
        /// File that was being read.
        path: PathBuf,
        /// Reader diagnostic.
        message: String,
    },
    /// Returned when the file contains no faces or lines.
    #[error("mesh {0} contains no faces or lines")]
    EmptyMesh(PathBuf),
}

/// Error returned when a mesh cannot be converted into a [`Project`](crate::Project).
///
/// Indices carried by the variants are zero-based positions in the input mesh.
///
/// # Examples
///
/// ```
/// use structmesh::{extract_project, ExtractError, ExtractOptions, Mesh};
///
/// let error = extract_project(&Mesh::default(), &ExtractOptions::default())
///     .expect_err("empty mesh is rejected");
/// assert_eq!(error, ExtractError::EmptyMesh);
/// ```
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ExtractError {
    /// Returned when the mesh has no vertices at all.
    #[error("mesh has no vertices")]
    EmptyMesh,
    /// Returned when a face lists fewer than three vertices.
    #[error("face {face} has {count} vertices; at least 3 are required")]
    FaceTooSmall {
        /// Offending face.
        face: usize,
        /// Number of vertices it lists.
        count: usize,
    },
    /// Returned when a face or edge references a vertex that does not exist.
    #[error("vertex {vertex} referenced by {element} is out of range ({vertex_count} vertices)")]
    VertexOutOfRange {
        /// Description of the referencing element, e.g. `face 3`.
        element: String,
        /// Referenced vertex index.
        vertex: usize,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },
    /// Returned when an explicit edge joins a vertex to itself.
    #[error("edge {edge} joins vertex {vertex} to itself")]
    DegenerateEdge {
        /// Offending edge.
        edge: usize,
        /// Repeated vertex.
        vertex: usize,
    },
    /// Returned when a face has no load classification and no default is configured.
    #[error("face {0} has no load classification and no default load is configured")]
    UnassignedLoad(usize),
    /// Returned when a wind-loaded face has no well defined normal.
    #[error("face {0} is degenerate; its first three vertices are collinear")]
    DegenerateFace(usize),
}

/// Error returned when reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Returned when the configuration file cannot be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Configuration file path.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// Returned when the configuration file is not valid JSON for [`Config`](crate::Config).
    #[error("invalid config {path}: {source}")]
    Invalid {
        /// Configuration file path.
        path: PathBuf,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },
    /// Returned when a load classification name is not recognised.
    #[error("unknown load kind `{0}`; expected `wind` or `live`")]
    UnknownLoadKind(String),
    /// Returned when submission is requested without credentials.
    #[error("missing API credentials; set {0}")]
    MissingCredentials(&'static str),
}

/// Error returned when a project cannot be delivered to the solver service.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Returned when the HTTP exchange fails.
    #[error("request to {url} failed: {message}")]
    Transport {
        /// Endpoint that was called.
        url: String,
        /// Transport diagnostic.
        message: String,
    },
    /// Returned when the project cannot be encoded.
    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
    /// Returned when the service answers without a status.
    #[error("service response carries no status: {0}")]
    MissingStatus(String),
    /// Returned when the service answers with a failure status.
    #[error("service rejected the request (status {status}): {message}")]
    Rejected {
        /// Status code reported in the response body.
        status: i64,
        /// Message reported by the service.
        message: String,
    },
}
