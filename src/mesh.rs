//! Explicit surface mesh handed to the extractor.

use std::fmt;
use std::str::FromStr;

use petgraph::graphmap::UnGraphMap;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::geometry::Point;

/// Load classification assigned to a face by the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadKind {
    /// Lateral pressure acting along the face's horizontal heading.
    Wind,
    /// Occupancy load acting along the vertical axis.
    Live,
}

impl fmt::Display for LoadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wind => f.write_str("wind"),
            Self::Live => f.write_str("live"),
        }
    }
}

impl FromStr for LoadKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wind" => Ok(Self::Wind),
            "live" => Ok(Self::Live),
            _ => Err(ConfigError::UnknownLoadKind(s.to_string())),
        }
    }
}

/// A polygon of the mesh.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Face {
    /// Zero-based vertex indices in winding order.
    pub vertices: Vec<usize>,
    /// Load classification tagged by the user, if any.
    #[serde(default)]
    pub load: Option<LoadKind>,
}

impl Face {
    /// Create a face from its vertex loop.
    #[must_use]
    pub fn new(vertices: Vec<usize>, load: Option<LoadKind>) -> Self {
        Self { vertices, load }
    }

    /// Consecutive vertex pairs around the face boundary, closing the loop.
    pub fn boundary(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let count = self.vertices.len();
        (0..count).map(move |idx| (self.vertices[idx], self.vertices[(idx + 1) % count]))
    }
}

/// Vertices, faces and edges of a surface mesh in the modelling frame.
///
/// # Examples
/// ```
/// use structmesh::{point, LoadKind, Mesh};
///
/// let mut mesh = Mesh::new();
/// let a = mesh.add_vertex(point(0.0, 0.0, 0.0));
/// let b = mesh.add_vertex(point(1.0, 0.0, 0.0));
/// let c = mesh.add_vertex(point(0.0, 1.0, 0.0));
/// mesh.add_face(vec![a, b, c], Some(LoadKind::Live));
/// assert_eq!(mesh.unique_edges().len(), 3);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// Vertex positions.
    pub vertices: Vec<Point>,
    /// Polygons referencing [`Mesh::vertices`].
    #[serde(default)]
    pub faces: Vec<Face>,
    /// Loose edges in addition to the face boundaries.
    #[serde(default)]
    pub edges: Vec<[usize; 2]>,
}

impl Mesh {
    /// Create an empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a vertex and return its index.
    pub fn add_vertex(&mut self, position: Point) -> usize {
        self.vertices.push(position);
        self.vertices.len() - 1
    }

    /// Append a face and return its index.
    pub fn add_face(&mut self, vertices: Vec<usize>, load: Option<LoadKind>) -> usize {
        self.faces.push(Face::new(vertices, load));
        self.faces.len() - 1
    }

    /// Append a loose edge and return its index.
    pub fn add_edge(&mut self, a: usize, b: usize) -> usize {
        self.edges.push([a, b]);
        self.edges.len() - 1
    }

    /// Return the number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Return the number of faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Tag every face in `faces` with `load`, replacing any previous tag.
    ///
    /// Indices past the end of the face list are ignored.
    pub fn tag_faces(&mut self, faces: impl IntoIterator<Item = usize>, load: LoadKind) {
        for idx in faces {
            if let Some(face) = self.faces.get_mut(idx) {
                face.load = Some(load);
            }
        }
    }

    /// Every distinct undirected edge, in first-seen order.
    ///
    /// Loose edges come first, followed by face boundaries. Each pair is reported with
    /// the lower index first. Reversed duplicates and edges shared by neighbouring
    /// faces appear once, and a face boundary segment that repeats a vertex is skipped.
    #[must_use]
    pub fn unique_edges(&self) -> Vec<(usize, usize)> {
        let mut graph = UnGraphMap::<usize, ()>::new();
        for &[a, b] in &self.edges {
            graph.add_edge(a, b, ());
        }
        for face in &self.faces {
            for (a, b) in face.boundary().filter(|(a, b)| a != b) {
                graph.add_edge(a, b, ());
            }
        }
        graph.all_edges().map(|(a, b, _)| (a, b)).collect()
    }
}
