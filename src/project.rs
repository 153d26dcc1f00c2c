//! Serde model of the solver service's project data format.
//!
//! Field names follow the service's JSON schema, which mixes snake case with a few
//! upper case suffixes (`node_A`, `Iy`, `LG`). Element maps are keyed by 1-based ids
//! and serialise with string keys.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::geometry::Axis;

/// Version of the project schema this crate writes.
pub const DATA_VERSION: u32 = 42;

/// Restraint code fixing all six degrees of freedom.
pub const FIXED: &str = "FFFFFF";

/// Complete structural model accepted by the solver service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Schema version.
    #[serde(rename = "dataVersion")]
    pub data_version: u32,
    /// Units, solver and display settings.
    pub settings: Settings,
    /// Free-form project details.
    #[serde(default)]
    pub details: Map<String, Value>,
    /// Nodes keyed by id.
    pub nodes: BTreeMap<u32, Node>,
    /// Members keyed by id.
    pub members: BTreeMap<u32, Member>,
    /// Supports keyed by id.
    pub supports: BTreeMap<u32, Support>,
    /// Materials keyed by id.
    pub materials: BTreeMap<u32, Material>,
    /// Plates keyed by id.
    pub plates: BTreeMap<u32, Plate>,
    /// Member sections keyed by id.
    pub sections: BTreeMap<u32, Section>,
    /// Area loads keyed by id.
    pub area_loads: BTreeMap<u32, AreaLoad>,
}

impl Project {
    /// Create a project with default settings, the stock materials and a single
    /// section, but no geometry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data_version: DATA_VERSION,
            settings: Settings::default(),
            details: Map::new(),
            nodes: BTreeMap::new(),
            members: BTreeMap::new(),
            supports: BTreeMap::new(),
            materials: default_materials(),
            plates: BTreeMap::new(),
            sections: BTreeMap::from([(1, Section::default())]),
            area_loads: BTreeMap::new(),
        }
    }

    /// Encode the project as indented JSON.
    ///
    /// # Errors
    ///
    /// Returns the encoder error; this only happens for non-finite coordinates.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Encode the project as a JSON value for embedding in API requests.
    ///
    /// # Errors
    ///
    /// Returns the encoder error; this only happens for non-finite coordinates.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

/// Node position in the solver's Y-up frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Horizontal X coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
    /// Horizontal Z coordinate.
    pub z: f64,
}

/// Frame member connecting two nodes.
#[allow(non_snake_case)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Member behaviour, e.g. `normal_continuous`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Unstressed length for cable members.
    pub cable_length: Option<f64>,
    /// Start node id.
    pub node_A: u32,
    /// End node id.
    pub node_B: u32,
    /// Section id.
    pub section_id: u32,
    /// Rotation about the member axis in degrees.
    pub rotation_angle: f64,
    /// Start fixity code.
    pub fixity_A: String,
    /// End fixity code.
    pub fixity_B: String,
    /// Start offset along X.
    pub offset_Ax: String,
    /// Start offset along Y.
    pub offset_Ay: String,
    /// Start offset along Z.
    pub offset_Az: String,
    /// End offset along X.
    pub offset_Bx: String,
    /// End offset along Y.
    pub offset_By: String,
    /// End offset along Z.
    pub offset_Bz: String,
    /// Start rotational spring about local y.
    pub stiffness_A_Ry: f64,
    /// Start rotational spring about local z.
    pub stiffness_A_Rz: f64,
    /// End rotational spring about local y.
    pub stiffness_B_Ry: f64,
    /// End rotational spring about local z.
    pub stiffness_B_Rz: f64,
    /// Mirror flag, `yes` or `no`.
    pub mirror: String,
    /// Non-linear opt out flag, `yes` or `no`.
    pub disable_non_linear_effects: String,
}

impl Member {
    /// Continuous member with rigid ends using section 1.
    #[must_use]
    pub fn continuous(node_a: u32, node_b: u32) -> Self {
        Self {
            kind: "normal_continuous".to_string(),
            cable_length: None,
            node_A: node_a,
            node_B: node_b,
            section_id: 1,
            rotation_angle: 0.0,
            fixity_A: FIXED.to_string(),
            fixity_B: FIXED.to_string(),
            offset_Ax: "0".to_string(),
            offset_Ay: "0".to_string(),
            offset_Az: "0".to_string(),
            offset_Bx: "0".to_string(),
            offset_By: "0".to_string(),
            offset_Bz: "0".to_string(),
            stiffness_A_Ry: 0.0,
            stiffness_A_Rz: 0.0,
            stiffness_B_Ry: 0.0,
            stiffness_B_Rz: 0.0,
            mirror: "no".to_string(),
            disable_non_linear_effects: "no".to_string(),
        }
    }
}

/// Nodal support condition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Support {
    /// Support target, always `node` here.
    #[serde(rename = "type")]
    pub kind: String,
    /// Per-axis restraint behaviour code.
    pub direction_code: String,
    /// Prescribed translation along X.
    pub tx: f64,
    /// Prescribed translation along Y.
    pub ty: f64,
    /// Prescribed translation along Z.
    pub tz: f64,
    /// Prescribed rotation about X.
    pub rx: f64,
    /// Prescribed rotation about Y.
    pub ry: f64,
    /// Prescribed rotation about Z.
    pub rz: f64,
    /// Supported node id.
    pub node: u32,
    /// Fixed (`F`) or released (`R`) flag per degree of freedom.
    pub restraint_code: String,
}

impl Support {
    /// Fully fixed support at `node`.
    #[must_use]
    pub fn fixed(node: u32) -> Self {
        Self {
            kind: "node".to_string(),
            direction_code: "BBBBBB".to_string(),
            tx: 0.0,
            ty: 0.0,
            tz: 0.0,
            rx: 0.0,
            ry: 0.0,
            rz: 0.0,
            node,
            restraint_code: FIXED.to_string(),
        }
    }
}

/// Isotropic material in the project's unit system.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Display name.
    pub name: String,
    /// Young's modulus in ksi.
    pub elasticity_modulus: f64,
    /// Density in lb/ft³.
    pub density: f64,
    /// Ultimate strength in ksi.
    pub ultimate_strength: f64,
    /// Yield strength in ksi.
    pub yield_strength: f64,
    /// Thermal expansion coefficient per °F.
    pub thermal_expansion_coefficient: f64,
    /// Poisson's ratio.
    pub poissons_ratio: f64,
}

impl Material {
    /// Material with the given properties, in the order the service lists them.
    fn new(
        name: &str,
        elasticity_modulus: f64,
        density: f64,
        ultimate_strength: f64,
        yield_strength: f64,
        thermal_expansion_coefficient: f64,
        poissons_ratio: f64,
    ) -> Self {
        Self {
            name: name.to_string(),
            elasticity_modulus,
            density,
            ultimate_strength,
            yield_strength,
            thermal_expansion_coefficient,
            poissons_ratio,
        }
    }
}

/// Structural steel, concrete and wood, with ids 1, 2 and 3.
#[must_use]
pub fn default_materials() -> BTreeMap<u32, Material> {
    BTreeMap::from([
        (1, Material::new("Structural Steel", 29000.0, 490.0, 58.0, 36.0, 6.5, 0.3)),
        (2, Material::new("Concrete", 4000.0, 150.0, 5.0, 3.0, 5.5, 0.2)),
        (3, Material::new("Wood", 1.0, 16.0, 4.0, 2.0, 1.0, 0.33)),
    ])
}

/// Shell element spanning a mesh face.
#[allow(non_snake_case)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plate {
    /// Comma separated node ids in winding order.
    pub nodes: String,
    /// Thickness in inches.
    pub thickness: f64,
    /// Material id.
    pub material_id: u32,
    /// Rotation of the local axes about the plate normal.
    pub rotZ: f64,
    /// Element formulation.
    #[serde(rename = "type")]
    pub kind: String,
    /// Diaphragm behaviour, `yes` or `no`.
    pub diaphragm: String,
    /// Offset from the mid-plane.
    pub offset: f64,
    /// Analysis state, e.g. `stress`.
    pub state: String,
    /// Drilling stiffness multiplier.
    pub drilling_stiffness_factor: f64,
    /// Openings in the plate.
    pub holes: Vec<Value>,
    /// Nodes tied into the diaphragm.
    pub diaphragm_internal_nodes: Option<String>,
    /// Diaphragm fixity mode.
    pub diaphragm_fixity: String,
    /// Membrane thickness override.
    pub membrane_thickness: String,
    /// Bending thickness override.
    pub bending_thickness: String,
    /// Shear thickness override.
    pub shear_thickness: String,
    /// Whether the service has already meshed the plate.
    pub isMeshed: bool,
}

impl Plate {
    /// Plate over `nodes` with the service's default formulation.
    #[must_use]
    pub fn new(nodes: &[u32], thickness: f64, material_id: u32) -> Self {
        Self {
            nodes: join_ids(nodes),
            thickness,
            material_id,
            rotZ: 0.0,
            kind: "auto".to_string(),
            diaphragm: "no".to_string(),
            offset: 0.0,
            state: "stress".to_string(),
            drilling_stiffness_factor: 1.0,
            holes: Vec::new(),
            diaphragm_internal_nodes: None,
            diaphragm_fixity: "auto".to_string(),
            membrane_thickness: String::new(),
            bending_thickness: String::new(),
            shear_thickness: String::new(),
            isMeshed: false,
        }
    }
}

/// Cross-section assigned to members.
#[allow(non_snake_case)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Display name.
    pub name: String,
    /// Material id.
    pub material_id: u32,
    /// Area in in².
    pub area: f64,
    /// Second moment of area about local y in in⁴.
    pub Iy: f64,
    /// Second moment of area about local z in in⁴.
    pub Iz: f64,
    /// Torsion constant in in⁴.
    pub J: f64,
}

impl Default for Section {
    fn default() -> Self {
        Self {
            name: String::new(),
            material_id: 1,
            area: 0.379,
            Iy: 2.08,
            Iz: 0.209,
            J: 0.000151,
        }
    }
}

/// Pressure applied over a plate's footprint.
#[allow(non_snake_case)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AreaLoad {
    /// Distribution, e.g. `one_way`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Comma separated node ids bounding the loaded area.
    pub nodes: String,
    /// Members receiving the load, 0 for automatic.
    pub members: u32,
    /// Pressure magnitude in ksf.
    pub mag: f64,
    /// Global axis the pressure acts along.
    pub direction: String,
    /// Elevations for varying loads.
    pub elevations: u32,
    /// Magnitudes for varying loads.
    pub mags: u32,
    /// Two node ids defining the span direction of a one-way load.
    pub column_direction: String,
    /// Elevation direction for varying loads.
    pub elevation_direction: String,
    /// Local axis filter of receiving members.
    pub loaded_members_axis: String,
    /// Load group name.
    pub LG: String,
}

impl AreaLoad {
    /// One-way pressure over the polygon `nodes`, spanning from its first to its
    /// second node.
    #[must_use]
    pub fn one_way(nodes: &[u32], mag: f64, direction: Axis, load_group: &str) -> Self {
        Self {
            kind: "one_way".to_string(),
            nodes: join_ids(nodes),
            members: 0,
            mag,
            direction: direction.code().to_string(),
            elevations: 0,
            mags: 0,
            column_direction: join_ids(&nodes[..nodes.len().min(2)]),
            elevation_direction: String::new(),
            loaded_members_axis: "all".to_string(),
            LG: load_group.to_string(),
        }
    }
}

/// Units, precision, solver and display configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Unit system.
    pub units: Units,
    /// Number formatting mode.
    pub precision: String,
    /// Digits shown.
    pub precision_values: u32,
    /// Result stations along members.
    pub evaluation_points: u32,
    /// Whether stations apply per span of continuous members.
    pub apply_evaluation_points_to_continuous_member_spans: bool,
    /// Node detection tolerance for continuous members.
    pub continuous_member_node_detection_tolerance: String,
    /// Vertical axis of the project frame.
    pub vertical_axis: String,
    /// Frame member offsets are given in.
    pub member_offsets_axis: String,
    /// Viewport projection.
    pub projection_system: String,
    /// Solver timeout in seconds.
    pub solver_timeout: u32,
    /// Linear solver backend.
    pub linear_equation_solver: String,
    /// Smooth plate results across nodes.
    pub smooth_plate_nodal_results: bool,
    /// Extrapolate plate results from Gauss points.
    pub extrapolate_plate_results_from_gauss_points: bool,
    /// Compute shear properties of wood and concrete sections.
    pub calculate_shear_properties_of_wood_concrete_sections: bool,
    /// Use the Johnson parabola for buckling.
    pub buckling_johnson: bool,
    /// Convergence tolerance for non-linear analysis.
    pub non_linear_tolerance: String,
    /// Non-linear theory.
    pub non_linear_theory: String,
    /// Add springs to stabilise mechanisms.
    pub auto_stabilize_model: bool,
    /// Skip automatic load combinations.
    pub only_solve_user_defined_load_combinations: bool,
    /// Add rigid links for area loads.
    pub include_rigid_links_for_area_loads: bool,
    /// Number of dynamic modes.
    pub dynamic_modes: String,
    /// Area reduction factor for dynamic frequency analysis.
    pub dynamic_frequency_area_reduction_factor: String,
    /// Use the alternate envelope method.
    pub envelope_alternate_method: bool,
    /// Thumbnail rendering options.
    pub thumbnail: Thumbnail,
    /// Enabled analysis types.
    pub analysis_types: AnalysisTypes,
    /// Viewport visibility options.
    pub visibility: Visibility,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            units: Units::default(),
            precision: "fixed".to_string(),
            precision_values: 3,
            evaluation_points: 5,
            apply_evaluation_points_to_continuous_member_spans: false,
            continuous_member_node_detection_tolerance: "0".to_string(),
            vertical_axis: Axis::Y.code().to_string(),
            member_offsets_axis: "local".to_string(),
            projection_system: "orthographic".to_string(),
            solver_timeout: 90,
            linear_equation_solver: "direct_1".to_string(),
            smooth_plate_nodal_results: true,
            extrapolate_plate_results_from_gauss_points: false,
            calculate_shear_properties_of_wood_concrete_sections: true,
            buckling_johnson: false,
            non_linear_tolerance: "1".to_string(),
            non_linear_theory: "small".to_string(),
            auto_stabilize_model: false,
            only_solve_user_defined_load_combinations: false,
            include_rigid_links_for_area_loads: false,
            dynamic_modes: "5".to_string(),
            dynamic_frequency_area_reduction_factor: "1".to_string(),
            envelope_alternate_method: true,
            thumbnail: Thumbnail::default(),
            analysis_types: AnalysisTypes::default(),
            visibility: Visibility::default(),
        }
    }
}

/// Unit system of every quantity in the project.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Units {
    /// Coordinates and member lengths.
    pub length: String,
    /// Section dimensions.
    pub section_length: String,
    /// Material strengths.
    pub material_strength: String,
    /// Material density.
    pub density: String,
    /// Forces.
    pub force: String,
    /// Moments.
    pub moment: String,
    /// Pressures.
    pub pressure: String,
    /// Masses.
    pub mass: String,
    /// Temperatures.
    pub temperature: String,
    /// Displacements.
    pub translation: String,
    /// Stresses.
    pub stress: String,
}

impl Default for Units {
    fn default() -> Self {
        Self {
            length: "ft".to_string(),
            section_length: "in".to_string(),
            material_strength: "ksi".to_string(),
            density: "lb/ft3".to_string(),
            force: "kip".to_string(),
            moment: "kip-ft".to_string(),
            pressure: "ksf".to_string(),
            mass: "kip".to_string(),
            temperature: "degf".to_string(),
            translation: "in".to_string(),
            stress: "ksi".to_string(),
        }
    }
}

/// Thumbnail rendering options.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    /// Elements drawn in the thumbnail.
    pub visibility: ThumbnailVisibility,
}

/// Elements drawn in the project thumbnail.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThumbnailVisibility {
    /// Draw nodes.
    pub nodes: bool,
    /// Draw node labels.
    pub node_labels: bool,
    /// Draw member labels.
    pub member_labels: bool,
    /// Draw supports.
    pub supports: bool,
    /// Draw loads.
    pub loads: bool,
    /// Draw load labels.
    pub load_labels: bool,
}

impl Default for ThumbnailVisibility {
    fn default() -> Self {
        Self {
            nodes: true,
            node_labels: true,
            member_labels: true,
            supports: true,
            loads: true,
            load_labels: true,
        }
    }
}

/// Analyses the service runs when solving.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisTypes {
    /// First order static analysis.
    pub linear_static: bool,
    /// Eigen buckling analysis.
    pub linear_buckling: bool,
    /// Second order static analysis.
    pub non_linear_static: bool,
    /// Modal analysis.
    pub dynamic_frequency: bool,
    /// Response spectrum analysis.
    pub response_spectrum: bool,
}

impl Default for AnalysisTypes {
    fn default() -> Self {
        Self {
            linear_static: true,
            linear_buckling: false,
            non_linear_static: false,
            dynamic_frequency: false,
            response_spectrum: false,
        }
    }
}

/// Viewport visibility options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Visibility {
    /// Draw nodes.
    pub nodes: bool,
    /// Draw node labels.
    pub node_labels: bool,
    /// Draw members.
    pub members: bool,
    /// Draw member labels.
    pub member_labels: bool,
    /// Draw member end fixities.
    pub member_end_fixities: bool,
    /// Draw rigid links.
    pub rigid_links: bool,
    /// Draw plates.
    pub plates: bool,
    /// Draw plate labels.
    pub plate_labels: bool,
    /// Draw the plate mesh.
    pub mesh: bool,
    /// Draw plate mesh nodes.
    pub mesh_nodes: bool,
    /// Draw supports.
    pub supports: bool,
    /// Draw loads.
    pub loads: bool,
    /// Draw load labels.
    pub load_labels: bool,
    /// Draw local member axes.
    pub local_axis: bool,
    /// Label font size.
    pub graphics_font_size: String,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            nodes: true,
            node_labels: true,
            members: true,
            member_labels: true,
            member_end_fixities: true,
            rigid_links: true,
            plates: true,
            plate_labels: true,
            mesh: true,
            mesh_nodes: true,
            supports: true,
            loads: true,
            load_labels: true,
            local_axis: false,
            graphics_font_size: "3".to_string(),
        }
    }
}

/// Join node ids the way the service lists them, e.g. `1,2,3`.
fn join_ids(ids: &[u32]) -> String {
    ids.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
