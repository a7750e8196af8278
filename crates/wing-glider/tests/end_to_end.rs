//! A small symmetric canopy with a Y bridle down to one riser: build the
//! geometry, hang the lines, solve, and check the result is symmetric.

use approx::assert_relative_eq;
use wing_airfoil::{Airfoil, AirfoilLibrary};
use wing_canopy::ShapeParameters;
use wing_curve::{Curve, CurveKind};
use wing_glider::{CurveSlot, GliderProject, LoadAssignment};
use wing_lines::{LineMaterial, NodeKind};
use wing_math::{Point2, Point3};

const STIFFNESS: f64 = 25_000.0;

fn library() -> AirfoilLibrary {
    let mut lib = AirfoilLibrary::new();
    lib.insert(Airfoil::elliptic("base", 0.15, 21).unwrap());
    lib.insert(Airfoil::elliptic("tip", 0.10, 21).unwrap());
    lib
}

fn params() -> ShapeParameters {
    ShapeParameters {
        cell_count: 3,
        flat_span: 6.0,
        chord: Curve::from_control_points(
            vec![
                Point2::new(-1.0, 1.2),
                Point2::new(0.0, 2.0),
                Point2::new(1.0, 1.2),
            ],
            CurveKind::MonotoneCubic,
        )
        .unwrap(),
        twist: Curve::constant(0.0, -1.0, 1.0).unwrap(),
        sweep: Curve::constant(0.0, -1.0, 1.0).unwrap(),
        arc: Curve::constant(0.0, -1.0, 1.0).unwrap(),
        blend: Curve::constant(0.0, -1.0, 1.0).unwrap(),
        ballooning: Curve::constant(0.08, -1.0, 1.0).unwrap(),
        airfoil_a: "base".into(),
        airfoil_b: "tip".into(),
        profile_points: 15,
    }
}

/// Rig a Y bridle: riser below the center, one free branch node, lines up
/// to attachments on the two inner ribs. Returns what the assertions need.
struct Rig {
    project: GliderProject,
    branch: wing_lines::NodeId,
    left_att: wing_lines::NodeId,
    right_att: wing_lines::NodeId,
    main: wing_lines::SegmentId,
    left_line: wing_lines::SegmentId,
    right_line: wing_lines::SegmentId,
}

fn rig() -> Rig {
    let mut project = GliderProject::new(params(), library()).unwrap();

    // Ribs of a 3-cell canopy sit at y = -3, -1, 1, 3; ribs 1 and 2 are the
    // symmetric inner pair.
    let left_att = project.attach(1, 0.25).unwrap();
    let right_att = project.attach(2, 0.25).unwrap();

    let gallery = LineMaterial::by_name("ltc120").unwrap();

    let lines = project.lines_mut();
    let riser = lines.add_node(Point3::new(0.5, 0.0, -6.0), NodeKind::Fixed);
    let branch = lines.add_node(Point3::new(0.5, 0.0, -3.0), NodeKind::Free);
    let main = lines.add_segment(riser, branch, 2.9, STIFFNESS, None).unwrap();
    let left_line = lines
        .add_segment_of(branch, left_att, 3.1, &gallery)
        .unwrap();
    let right_line = lines
        .add_segment_of(branch, right_att, 3.1, &gallery)
        .unwrap();

    Rig {
        project,
        branch,
        left_att,
        right_att,
        main,
        left_line,
        right_line,
    }
}

#[test]
fn symmetric_canopy_gives_symmetric_lines() {
    let mut r = rig();

    // Loads on the pinned attachments are accepted but do not move them;
    // the symmetry below comes from the canopy geometry alone.
    let mut loads = LoadAssignment::new();
    loads.set(r.left_att, Point3::new(0.0, 0.0, 120.0));
    loads.set(r.right_att, Point3::new(0.0, 0.0, 120.0));
    r.project.apply_loads(loads);

    let solution = r.project.solve_lines().unwrap();
    assert!(solution.converged);

    // The branch node stays on the symmetry plane
    assert_relative_eq!(solution.positions[r.branch].y, 0.0, epsilon = 1e-6);

    // Equal tensions and equal stretched lengths in the two upper lines
    let tree = r.project.lines();
    assert_relative_eq!(
        solution.tensions[r.left_line],
        solution.tensions[r.right_line],
        epsilon = 1e-4
    );
    assert_relative_eq!(
        solution.segment_length(tree, r.left_line).unwrap(),
        solution.segment_length(tree, r.right_line).unwrap(),
        epsilon = 1e-8
    );

    // Everything is taut and the main line carries more than either branch
    assert!(solution.slack.is_empty());
    assert!(solution.tensions[r.main] > solution.tensions[r.left_line]);
}

#[test]
fn loads_on_free_leaves_reach_the_riser() {
    // A cascade with free loaded leaves: the applied forces must propagate
    // down the bridle, so the main line carries the full vertical load.
    let mut project = GliderProject::new(params(), library()).unwrap();

    let lines = project.lines_mut();
    let riser = lines.add_node(Point3::new(0.0, 0.0, -6.0), NodeKind::Fixed);
    let branch = lines.add_node(Point3::new(0.0, 0.0, -3.0), NodeKind::Free);
    let left = lines.add_node(Point3::new(0.0, -1.0, 0.0), NodeKind::Free);
    let right = lines.add_node(Point3::new(0.0, 1.0, 0.0), NodeKind::Free);
    let main = lines.add_segment(riser, branch, 2.9, STIFFNESS, None).unwrap();
    let left_line = lines.add_segment(branch, left, 3.1, STIFFNESS, None).unwrap();
    let right_line = lines
        .add_segment(branch, right, 3.1, STIFFNESS, None)
        .unwrap();

    let mut loads = LoadAssignment::new();
    loads.set(left, Point3::new(0.0, -30.0, 200.0));
    loads.set(right, Point3::new(0.0, 30.0, 200.0));
    project.apply_loads(loads);

    let solution = project.solve_lines().unwrap();
    assert!(solution.converged);

    // By symmetry the main line is vertical; it carries both leaf loads.
    assert_relative_eq!(solution.tensions[main], 400.0, epsilon = 1e-2);
    assert_relative_eq!(
        solution.tensions[left_line],
        solution.tensions[right_line],
        epsilon = 1e-4
    );
    assert!(solution.tensions[left_line] > 0.0);
}

#[test]
fn canopy_metrics_are_sane() {
    let r = rig();
    let mesh = r.project.canopy();

    assert_eq!(mesh.ribs().len(), 4);
    assert_eq!(mesh.cells().len(), 3);
    assert!(mesh.flat_area() > 0.0);
    assert!(mesh.projected_area() <= mesh.flat_area() + 1e-9);
    assert_relative_eq!(mesh.flat_span(), 6.0, epsilon = 1e-9);
    assert_relative_eq!(
        mesh.aspect_ratio(),
        mesh.flat_span().powi(2) / mesh.flat_area(),
        epsilon = 1e-12
    );
}

#[test]
fn set_flat_area_repins_attachments() {
    let mut r = rig();
    let target = 14.0;
    r.project.set_flat_area(target).unwrap();

    let area = r.project.canopy().flat_area();
    assert!((area - target).abs() / target < 1e-6);

    // Attachment nodes must sit exactly on the rescaled ribs
    for attachment in r.project.attachments().to_vec() {
        let expected = r.project.canopy().ribs()[attachment.rib]
            .chord_point(attachment.chord_fraction);
        let actual = r.project.lines().nodes[attachment.node].position;
        assert_relative_eq!((expected - actual).length(), 0.0, epsilon = 1e-12);
    }
}

#[test]
fn rebuild_keeps_line_topology_and_resolves() {
    let mut r = rig();
    let mut loads = LoadAssignment::new();
    loads.set(r.left_att, Point3::new(0.0, 0.0, 100.0));
    loads.set(r.right_att, Point3::new(0.0, 0.0, 100.0));
    r.project.apply_loads(loads);
    r.project.solve_lines().unwrap();

    // Grow the canopy, then solve again: topology unchanged, the solve
    // warm-starts and the branch stays on the symmetry plane.
    r.project.set_flat_area(16.0).unwrap();
    assert_eq!(r.project.lines().segments.len(), 3);

    let solution = r.project.solve_lines().unwrap();
    assert!(solution.converged);
    assert_relative_eq!(solution.positions[r.branch].y, 0.0, epsilon = 1e-6);
}

#[test]
fn failed_curve_edit_leaves_project_intact() {
    let mut r = rig();
    let area_before = r.project.canopy().flat_area();

    // A chord of zero collapses the geometry; the rebuild must fail and
    // leave the previous state untouched.
    let bad = Curve::constant(0.0, -1.0, 1.0).unwrap();
    assert!(r.project.set_curve(CurveSlot::Chord, bad).is_err());
    assert_relative_eq!(r.project.canopy().flat_area(), area_before, epsilon = 1e-12);
}

#[test]
fn attach_rejects_bad_anchor() {
    let mut r = rig();
    assert!(r.project.attach(99, 0.25).is_err());
    assert!(r.project.attach(1, 1.5).is_err());
}
