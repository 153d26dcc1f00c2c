//! Classification of mesh elements and assembly of the solver project.
//!
//! Extraction happens in two passes. [`classify`] validates the mesh and makes every
//! structural decision: which vertices are anchors, which edges become members and
//! what load each face carries. [`assemble`] then lays those decisions out in the
//! service's project format. [`extract_project`] runs both.

use tracing::{debug, info, warn};

use crate::config::ExtractOptions;
use crate::errors::ExtractError;
use crate::geometry::{face_normal, horizontal_load_axis, Axis, Point};
use crate::mesh::{LoadKind, Mesh};
use crate::project::{AreaLoad, Member, Node, Plate, Project, Support};

/// Normal component above which a face counts as mostly horizontal.
const HORIZONTAL_NORMAL_THRESHOLD: f64 = 0.5;

/// Whether a vertex at `position` is anchored to the ground.
///
/// Exactly zero elevation anchors; any other value, however small, does not.
///
/// # Examples
/// ```
/// use structmesh::{is_anchor, point};
///
/// assert!(is_anchor(point(2.0, 5.0, 0.0)));
/// assert!(!is_anchor(point(2.0, 5.0, 0.001)));
/// ```
#[must_use]
pub fn is_anchor(position: Point) -> bool {
    position.is_at_ground()
}

/// Load resolved for one face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceLoad {
    /// Classification the face carries.
    pub kind: LoadKind,
    /// Solver axis the pressure acts along.
    pub direction: Axis,
    /// Pressure magnitude in ksf.
    pub magnitude: f64,
}

/// Structural decisions taken for a mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Classification {
    /// Indices of anchored vertices, ascending.
    pub anchors: Vec<usize>,
    /// Unique edges that become members.
    pub edges: Vec<(usize, usize)>,
    /// Load of each face, parallel to the mesh's face list.
    pub face_loads: Vec<FaceLoad>,
}

impl Classification {
    /// Number of faces carrying `kind`.
    #[must_use]
    pub fn load_count(&self, kind: LoadKind) -> usize {
        self.face_loads
            .iter()
            .filter(|load| load.kind == kind)
            .count()
    }
}

/// Validate `mesh` and classify its elements.
///
/// # Errors
///
/// Returns [`ExtractError`] when the mesh is empty, references missing vertices,
/// has faces with fewer than three vertices or self-joining edges, leaves a face
/// without a load classification, or tags a degenerate face with wind.
pub fn classify(mesh: &Mesh, options: &ExtractOptions) -> Result<Classification, ExtractError> {
    validate(mesh)?;

    let anchors: Vec<usize> = mesh
        .vertices
        .iter()
        .enumerate()
        .filter(|(_, position)| is_anchor(**position))
        .map(|(idx, _)| idx)
        .collect();
    debug!(count = anchors.len(), "anchored vertices at zero elevation");

    let face_loads = mesh
        .faces
        .iter()
        .enumerate()
        .map(|(idx, face)| -> Result<FaceLoad, ExtractError> {
            let kind = face
                .load
                .or(options.default_load)
                .ok_or(ExtractError::UnassignedLoad(idx))?;
            let load = match kind {
                LoadKind::Live => FaceLoad {
                    kind,
                    direction: Axis::Y,
                    magnitude: options.loads.live_magnitude,
                },
                LoadKind::Wind => {
                    let points: Vec<Point> =
                        face.vertices.iter().map(|&v| mesh.vertices[v]).collect();
                    let normal = face_normal(&points).ok_or(ExtractError::DegenerateFace(idx))?;
                    if normal.z.abs() > HORIZONTAL_NORMAL_THRESHOLD {
                        warn!(face = idx, "wind load tagged on a mostly horizontal face");
                    }
                    FaceLoad {
                        kind,
                        direction: horizontal_load_axis(normal),
                        magnitude: options.loads.wind_magnitude,
                    }
                }
            };
            debug!(face = idx, kind = %load.kind, direction = load.direction.code(), "classified face");
            Ok(load)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Classification {
        anchors,
        edges: mesh.unique_edges(),
        face_loads,
    })
}

/// Lay out a classified mesh in the solver's project format.
///
/// Vertex, edge and face `i` become node, member and plate `i + 1`. Supports are
/// keyed by the node they hold and area load ids match their plate. Coordinates move from the Z-up modelling frame to the
/// solver's Y-up frame by swapping Y and Z.
///
/// `classification` must come from [`classify`] on the same `mesh`.
#[must_use]
pub fn assemble(mesh: &Mesh, classification: &Classification, options: &ExtractOptions) -> Project {
    let mut project = Project::new();

    for (id, position) in (1..).zip(&mesh.vertices) {
        project.nodes.insert(
            id,
            Node {
                x: position.x,
                y: position.z,
                z: position.y,
            },
        );
    }

    for &vertex in &classification.anchors {
        let node = node_id(vertex);
        project.supports.insert(node, Support::fixed(node));
    }

    for (id, &(a, b)) in (1..).zip(&classification.edges) {
        project
            .members
            .insert(id, Member::continuous(node_id(a), node_id(b)));
    }

    for (id, (face, load)) in (1..).zip(mesh.faces.iter().zip(&classification.face_loads)) {
        let nodes: Vec<u32> = face.vertices.iter().map(|&v| node_id(v)).collect();
        project.plates.insert(
            id,
            Plate::new(&nodes, options.plate.thickness, options.plate.material_id),
        );
        project.area_loads.insert(
            id,
            AreaLoad::one_way(
                &nodes,
                load.magnitude,
                load.direction,
                &options.loads.load_group,
            ),
        );
    }

    project
}

/// Build the solver project for `mesh`.
///
/// # Errors
///
/// See [`classify`].
///
/// # Examples
/// ```
/// use structmesh::{extract_project, point, ExtractOptions, LoadKind, Mesh};
///
/// let mut mesh = Mesh::new();
/// for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
///     mesh.add_vertex(point(x, y, 0.0));
/// }
/// mesh.add_face(vec![0, 1, 2, 3], Some(LoadKind::Live));
///
/// let project = extract_project(&mesh, &ExtractOptions::default()).unwrap();
/// assert_eq!(project.supports.len(), 4);
/// assert_eq!(project.members.len(), 4);
/// ```
pub fn extract_project(mesh: &Mesh, options: &ExtractOptions) -> Result<Project, ExtractError> {
    let classification = classify(mesh, options)?;
    let project = assemble(mesh, &classification, options);
    info!(
        nodes = project.nodes.len(),
        members = project.members.len(),
        supports = project.supports.len(),
        plates = project.plates.len(),
        "extracted project"
    );
    Ok(project)
}

/// Node id of the vertex at `index`.
fn node_id(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}

/// Reject meshes that cannot be laid out as a project.
fn validate(mesh: &Mesh) -> Result<(), ExtractError> {
    let vertex_count = mesh.vertex_count();
    if vertex_count == 0 {
        return Err(ExtractError::EmptyMesh);
    }
    let check = |element: String, vertex: usize| {
        if vertex < vertex_count {
            Ok(())
        } else {
            Err(ExtractError::VertexOutOfRange {
                element,
                vertex,
                vertex_count,
            })
        }
    };
    for (idx, &[a, b]) in mesh.edges.iter().enumerate() {
        check(format!("edge {idx}"), a)?;
        check(format!("edge {idx}"), b)?;
        if a == b {
            return Err(ExtractError::DegenerateEdge { edge: idx, vertex: a });
        }
    }
    for (idx, face) in mesh.faces.iter().enumerate() {
        if face.vertices.len() < 3 {
            return Err(ExtractError::FaceTooSmall {
                face: idx,
                count: face.vertices.len(),
            });
        }
        for &vertex in &face.vertices {
            check(format!("face {idx}"), vertex)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::point;

    /// Unit cube with its bottom face on the ground, faces wound outwards.
    fn cube(load: Option<LoadKind>) -> Mesh {
        let mut mesh = Mesh::new();
        for z in [0.0, 1.0] {
            for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
                mesh.add_vertex(point(x, y, z));
            }
        }
        for face in [
            vec![0, 3, 2, 1],
            vec![4, 5, 6, 7],
            vec![0, 1, 5, 4],
            vec![1, 2, 6, 5],
            vec![2, 3, 7, 6],
            vec![3, 0, 4, 7],
        ] {
            mesh.add_face(face, load);
        }
        mesh
    }

    #[test]
    fn cube_bottom_vertices_are_anchors() {
        let mesh = cube(Some(LoadKind::Live));
        let classification = classify(&mesh, &ExtractOptions::default()).expect("valid cube");
        assert_eq!(classification.anchors, vec![0, 1, 2, 3]);
        assert_eq!(classification.edges.len(), 12);
        assert_eq!(classification.load_count(LoadKind::Live), 6);
        assert_eq!(classification.load_count(LoadKind::Wind), 0);
    }

    #[test]
    fn flat_quad_on_ground_is_fully_anchored() {
        let mut mesh = Mesh::new();
        for (x, y) in [(0.0, 0.0), (2.0, 0.0), (2.0, 3.0), (0.0, 3.0)] {
            mesh.add_vertex(point(x, y, 0.0));
        }
        mesh.add_face(vec![0, 1, 2, 3], Some(LoadKind::Live));
        let classification = classify(&mesh, &ExtractOptions::default()).expect("valid quad");
        assert_eq!(classification.anchors, vec![0, 1, 2, 3]);
    }

    #[test]
    fn near_zero_elevation_is_not_an_anchor() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(point(0.0, 0.0, 1.0e-9));
        mesh.add_vertex(point(1.0, 0.0, -0.0));
        mesh.add_vertex(point(0.0, 1.0, -1.0e-9));
        mesh.add_face(vec![0, 1, 2], Some(LoadKind::Live));
        let classification = classify(&mesh, &ExtractOptions::default()).expect("valid mesh");
        assert_eq!(classification.anchors, vec![1]);
    }

    #[test]
    fn wind_direction_follows_wall_heading() {
        let mesh = cube(Some(LoadKind::Wind));
        let classification = classify(&mesh, &ExtractOptions::default()).expect("valid cube");
        let directions: Vec<Axis> = classification
            .face_loads
            .iter()
            .map(|load| load.direction)
            .collect();
        // Floor and roof have vertical normals, which head along X.
        assert_eq!(
            directions,
            vec![Axis::X, Axis::X, Axis::Z, Axis::X, Axis::Z, Axis::X]
        );
        for load in &classification.face_loads {
            assert_relative_eq!(load.magnitude, 0.08);
        }
    }

    #[test]
    fn tags_override_the_default_load() {
        let mut mesh = cube(None);
        mesh.tag_faces([2, 3, 4, 5], LoadKind::Wind);
        let options = ExtractOptions {
            default_load: Some(LoadKind::Live),
            ..ExtractOptions::default()
        };
        let classification = classify(&mesh, &options).expect("valid cube");
        assert_eq!(classification.load_count(LoadKind::Live), 2);
        assert_eq!(classification.load_count(LoadKind::Wind), 4);
        assert_eq!(classification.face_loads[0].direction, Axis::Y);
        assert_relative_eq!(classification.face_loads[1].magnitude, 0.15);
    }

    #[test]
    fn untagged_face_without_default_is_rejected() {
        let mut mesh = cube(Some(LoadKind::Live));
        mesh.faces[4].load = None;
        let error = classify(&mesh, &ExtractOptions::default()).expect_err("face 4 untagged");
        assert_eq!(error, ExtractError::UnassignedLoad(4));
    }

    #[test]
    fn degenerate_wind_face_is_rejected() {
        let mut mesh = Mesh::new();
        for x in [0.0, 1.0, 2.0] {
            mesh.add_vertex(point(x, 0.0, 1.0));
        }
        mesh.add_face(vec![0, 1, 2], Some(LoadKind::Wind));
        let error = classify(&mesh, &ExtractOptions::default()).expect_err("collinear face");
        assert_eq!(error, ExtractError::DegenerateFace(0));

        // The same face is fine when it only carries a live load.
        mesh.faces[0].load = Some(LoadKind::Live);
        assert!(classify(&mesh, &ExtractOptions::default()).is_ok());
    }

    #[test]
    fn malformed_meshes_are_rejected() {
        let options = ExtractOptions {
            default_load: Some(LoadKind::Live),
            ..ExtractOptions::default()
        };
        assert_eq!(
            classify(&Mesh::new(), &options).expect_err("empty"),
            ExtractError::EmptyMesh
        );

        let mut mesh = cube(None);
        mesh.add_face(vec![0, 1], None);
        assert_eq!(
            classify(&mesh, &options).expect_err("two vertex face"),
            ExtractError::FaceTooSmall { face: 6, count: 2 }
        );

        let mut mesh = cube(None);
        mesh.add_face(vec![0, 1, 8], None);
        assert_eq!(
            classify(&mesh, &options).expect_err("missing vertex"),
            ExtractError::VertexOutOfRange {
                element: "face 6".to_string(),
                vertex: 8,
                vertex_count: 8,
            }
        );

        let mut mesh = cube(None);
        mesh.add_edge(5, 5);
        assert_eq!(
            classify(&mesh, &options).expect_err("self edge"),
            ExtractError::DegenerateEdge { edge: 0, vertex: 5 }
        );
    }

    #[test]
    fn vertices_without_faces_still_become_nodes() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(point(0.0, 0.0, 0.0));
        mesh.add_vertex(point(0.0, 0.0, 3.0));
        mesh.add_edge(0, 1);
        let project = extract_project(&mesh, &ExtractOptions::default()).expect("column");
        assert_eq!(project.nodes.len(), 2);
        assert_eq!(project.members.len(), 1);
        assert_eq!(project.supports.len(), 1);
        assert!(project.plates.is_empty());
        assert!(project.area_loads.is_empty());
    }

    #[test]
    fn support_ids_follow_their_node() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(point(0.0, 0.0, 3.0));
        mesh.add_vertex(point(0.0, 0.0, 0.0));
        mesh.add_vertex(point(2.0, 0.0, 3.0));
        mesh.add_vertex(point(2.0, 0.0, 0.0));
        mesh.add_edge(0, 1);
        mesh.add_edge(2, 3);
        let project = extract_project(&mesh, &ExtractOptions::default()).expect("two columns");
        let supports: Vec<(u32, u32)> = project
            .supports
            .iter()
            .map(|(&id, support)| (id, support.node))
            .collect();
        assert_eq!(supports, vec![(2, 2), (4, 4)]);
    }

    #[test]
    fn assembly_swaps_to_vertical_y_and_numbers_from_one() {
        let mut mesh = cube(Some(LoadKind::Live));
        mesh.vertices[6] = point(1.0, 2.0, 3.0);
        let project = extract_project(&mesh, &ExtractOptions::default()).expect("valid cube");

        let node = project.nodes[&7];
        assert_relative_eq!(node.x, 1.0);
        assert_relative_eq!(node.y, 3.0);
        assert_relative_eq!(node.z, 2.0);

        let supported: Vec<u32> = project.supports.values().map(|s| s.node).collect();
        assert_eq!(supported, vec![1, 2, 3, 4]);
        assert_eq!(project.supports.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4]);

        assert_eq!(project.plates[&1].nodes, "1,4,3,2");
        assert_eq!(project.plates[&1].material_id, 3);
        assert_eq!(project.area_loads[&2].nodes, "5,6,7,8");
        assert_eq!(project.area_loads[&2].column_direction, "5,6");
        assert_eq!(project.area_loads[&2].direction, "Y");
        assert_eq!(project.area_loads.len(), project.plates.len());

        let member = &project.members[&1];
        assert_eq!((member.node_A, member.node_B), (1, 4));
    }
}
