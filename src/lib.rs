#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
//! Turn surface meshes into structural models for a cloud solver.
//!
//! A [`Mesh`] exported from a modelling tool is classified for structural
//! analysis: every vertex at exactly zero elevation becomes a fixed support, every
//! edge a frame member and every face a plate carrying the wind or live load the
//! user tagged it with. The result is a [`Project`] in the solver service's data
//! format, ready to be written to disk or handed to a [`SolverClient`].
//!
//! # Examples
//! ```
//! use structmesh::{extract_project, point, ExtractOptions, LoadKind, Mesh};
//!
//! let mut mesh = Mesh::new();
//! let a = mesh.add_vertex(point(0.0, 0.0, 0.0));
//! let b = mesh.add_vertex(point(4.0, 0.0, 0.0));
//! let c = mesh.add_vertex(point(4.0, 0.0, 3.0));
//! let d = mesh.add_vertex(point(0.0, 0.0, 3.0));
//! mesh.add_face(vec![a, b, c, d], Some(LoadKind::Wind));
//!
//! let project = extract_project(&mesh, &ExtractOptions::default())?;
//! assert_eq!(project.supports.len(), 2);
//! assert_eq!(project.area_loads[&1].direction, "Z");
//! # Ok::<(), structmesh::ExtractError>(())
//! ```

pub mod config;
mod errors;
pub mod extract;
pub mod geometry;
pub mod mesh;
pub mod obj;
pub mod project;
pub mod report;
pub mod submit;

pub use config::{Config, Credentials, ExtractOptions, LoadSettings, PlateSettings, ServiceConfig};
pub use errors::{ConfigError, ExtractError, MeshError, SubmitError};
pub use extract::{assemble, classify, extract_project, is_anchor, Classification, FaceLoad};
pub use geometry::{face_normal, horizontal_load_axis, point, Axis, Point};
pub use mesh::{Face, LoadKind, Mesh};
pub use obj::{load_obj, UpAxis};
pub use project::Project;
pub use report::render_summary;
pub use submit::{SolverClient, SubmissionReceipt, Transport, UreqTransport};
