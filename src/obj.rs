//! Wavefront OBJ loading.
//!
//! OBJ is what modelling tools export, so this is how a mesh normally reaches the
//! extractor. Faces are kept as polygons and the user's load tagging is read from
//! object and group names.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::MeshError;
use crate::geometry::{point, Point};
use crate::mesh::{LoadKind, Mesh};

/// Vertical axis convention of a mesh file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpAxis {
    /// Elevation is the file's Y coordinate.
    Y,
    /// Elevation is the file's Z coordinate, like the modelling frame.
    #[default]
    Z,
}

impl UpAxis {
    /// Convert a file position into the Z-up modelling frame.
    fn to_modelling_frame(self, x: f64, y: f64, z: f64) -> Point {
        match self {
            Self::Z => point(x, y, z),
            Self::Y => point(x, -z, y),
        }
    }
}

/// Load classification implied by an OBJ object or group name.
///
/// Names starting with `wind` or `live`, in any case, tag their faces.
///
/// # Examples
/// ```
/// use structmesh::{obj::load_tag, LoadKind};
///
/// assert_eq!(load_tag("Wind_North"), Some(LoadKind::Wind));
/// assert_eq!(load_tag("live.001"), Some(LoadKind::Live));
/// assert_eq!(load_tag("Cube"), None);
/// ```
#[must_use]
pub fn load_tag(name: &str) -> Option<LoadKind> {
    let name = name.trim().to_ascii_lowercase();
    if name.starts_with("wind") {
        Some(LoadKind::Wind)
    } else if name.starts_with("live") {
        Some(LoadKind::Live)
    } else {
        None
    }
}

/// Load an OBJ file into a [`Mesh`].
///
/// Positions repeated across objects are merged so shared corners become a single
/// vertex. Line elements become loose edges, so columns and braces drawn without
/// faces survive. Positions no face or line references are not part of the mesh.
/// Coordinates are read at full double precision.
///
/// # Errors
///
/// Returns [`MeshError::Parse`] when the file cannot be read and
/// [`MeshError::EmptyMesh`] when it holds no faces or lines.
pub fn load_obj(path: impl AsRef<Path>, up: UpAxis) -> Result<Mesh, MeshError> {
    let path = path.as_ref();
    let parse_error = |message: String| MeshError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            single_index: false,
            triangulate: false,
            ignore_points: false,
            ignore_lines: false,
            ..Default::default()
        },
    )
    .map_err(|e| parse_error(e.to_string()))?;

    let mut mesh = Mesh::new();
    let mut merged: HashMap<[u64; 3], usize> = HashMap::new();

    for model in &models {
        let tag = load_tag(&model.name);
        let positions: Vec<usize> = model
            .mesh
            .positions
            .chunks_exact(3)
            .map(|c| {
                // Adding zero folds -0.0 into 0.0 so both merge.
                let key = [
                    (c[0] + 0.0).to_bits(),
                    (c[1] + 0.0).to_bits(),
                    (c[2] + 0.0).to_bits(),
                ];
                *merged
                    .entry(key)
                    .or_insert_with(|| mesh.add_vertex(up.to_modelling_frame(c[0], c[1], c[2])))
            })
            .collect();

        let indices = &model.mesh.indices;
        let arities: Vec<usize> = if model.mesh.face_arities.is_empty() {
            vec![3; indices.len() / 3]
        } else {
            model
                .mesh
                .face_arities
                .iter()
                .map(|&arity| arity as usize)
                .collect()
        };

        let mut cursor = 0;
        for arity in arities {
            let corners = indices
                .get(cursor..cursor + arity)
                .ok_or_else(|| parse_error(format!("object `{}` has a truncated element", model.name)))?;
            cursor += arity;
            let vertices = corners
                .iter()
                .map(|&idx| positions.get(idx as usize).copied())
                .collect::<Option<Vec<usize>>>()
                .ok_or_else(|| {
                    parse_error(format!("object `{}` references a missing position", model.name))
                })?;
            match vertices.len() {
                0 | 1 => {}
                2 if vertices[0] == vertices[1] => {
                    debug!(object = %model.name, vertex = vertices[0], "skipped zero length line");
                }
                2 => {
                    mesh.add_edge(vertices[0], vertices[1]);
                }
                _ => {
                    mesh.add_face(vertices, tag);
                }
            }
        }
        debug!(object = %model.name, ?tag, "loaded OBJ object");
    }

    if mesh.vertex_count() == 0 {
        return Err(MeshError::EmptyMesh(path.to_path_buf()));
    }
    info!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        edges = mesh.edges.len(),
        "loaded mesh"
    );
    Ok(mesh)
}
