//! Plain text summary of an extraction.

use std::fmt::Write;

use crate::extract::Classification;
use crate::mesh::LoadKind;
use crate::project::Project;

/// Render a textual summary of an extracted project.
///
/// The report lists element counts and how the faces were loaded, so the user can
/// check the tagging before anything is sent to the service.
#[must_use]
pub fn render_summary(classification: &Classification, project: &Project) -> String {
    let mut output = String::new();

    writeln!(
        &mut output,
        "Structural model: {}, {}, {}",
        counted(project.nodes.len(), "node"),
        counted(project.members.len(), "member"),
        counted(project.plates.len(), "plate")
    )
    .expect("writing to string cannot fail");

    // Supports come from zero elevation only, so a count of zero usually means the
    // model is floating above the ground plane.
    if classification.anchors.is_empty() {
        output.push_str("Supports: none (no vertex sits at zero elevation)\n");
    } else {
        writeln!(
            &mut output,
            "Supports: {} at zero elevation",
            counted(classification.anchors.len(), "fixed node")
        )
        .expect("writing to string cannot fail");
    }

    for kind in [LoadKind::Wind, LoadKind::Live] {
        let faces: Vec<_> = classification
            .face_loads
            .iter()
            .filter(|load| load.kind == kind)
            .collect();
        if let Some(first) = faces.first() {
            writeln!(
                &mut output,
                "{kind} load: {} at {:.3} {}",
                counted(faces.len(), "face"),
                first.magnitude,
                project.settings.units.pressure
            )
            .expect("writing to string cannot fail");
        }
    }

    output
}

/// `count` followed by `noun`, pluralised unless there is exactly one.
fn counted(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractOptions;
    use crate::extract::{assemble, classify};
    use crate::geometry::point;
    use crate::mesh::Mesh;

    #[test]
    fn formats_human_readable_report() {
        let mut mesh = Mesh::new();
        for (x, z) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            mesh.add_vertex(point(x, 0.0, z));
        }
        mesh.add_face(vec![0, 1, 2, 3], Some(LoadKind::Wind));
        let options = ExtractOptions::default();
        let classification = classify(&mesh, &options).expect("valid wall");
        let project = assemble(&mesh, &classification, &options);

        let report = render_summary(&classification, &project);
        assert!(report.contains("4 nodes, 4 members, 1 plate"));
        assert!(report.contains("Supports: 2 fixed nodes"));
        assert!(report.contains("wind load: 1 face at 0.080 ksf"));
        assert!(!report.contains("live load"));
    }

    #[test]
    fn floating_model_is_called_out() {
        let mut mesh = Mesh::new();
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)] {
            mesh.add_vertex(point(x, y, 2.0));
        }
        mesh.add_face(vec![0, 1, 2], Some(LoadKind::Live));
        let options = ExtractOptions::default();
        let classification = classify(&mesh, &options).expect("valid triangle");
        let project = assemble(&mesh, &classification, &options);

        let report = render_summary(&classification, &project);
        assert!(report.contains("3 nodes, 3 members, 1 plate\n"));
        assert!(report.contains("Supports: none"));
        assert!(report.contains("live load: 1 face at 0.150 ksf"));
    }
}
