// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Solid round trips through the portable B-Rep tables.

use approx::assert_relative_eq;
use georelay_geometry::{ErrorKind, GeometryConverter, HostShape, UnitScale};
use georelay_kernel::{
    make_box, Arc, BRepBuilder, BRepType, BoundingBoxUV, BuilderEdgeId, BuilderOutcome, Curve, EdgeGeometry,
    FaceSurface, NurbsSurfaceData, Plane, Point2, Point3, Solid, Vector3,
};
use georelay_schema::{
    Brep, BrepEdge, BrepFace, BrepLoop, BrepLoopType, BrepOrientation, BrepTrim, BrepTrimType, Units,
};
use rustc_hash::FxHashMap;

fn unit_cube() -> Solid {
    make_box(Point3::origin(), Point3::new(1.0, 1.0, 1.0)).unwrap()
}

/// A box whose planes all face inward, with every face marked reversed.
fn box_with_reversed_faces(size: f64) -> Solid {
    const FACES: [[usize; 4]; 6] = [
        [0, 2, 3, 1],
        [4, 5, 7, 6],
        [0, 1, 5, 4],
        [2, 6, 7, 3],
        [0, 4, 6, 2],
        [1, 3, 7, 5],
    ];
    let corner = |i: usize| {
        Point3::new(
            if i & 1 != 0 { size } else { 0.0 },
            if i & 2 != 0 { size } else { 0.0 },
            if i & 4 != 0 { size } else { 0.0 },
        )
    };
    let mut builder = BRepBuilder::new(BRepType::Solid);
    let mut edges: FxHashMap<(usize, usize), BuilderEdgeId> = FxHashMap::default();
    for quad in FACES {
        let p0 = corner(quad[0]);
        let x_dir = corner(quad[1]) - p0;
        let outward = x_dir.cross(&(corner(quad[3]) - p0));
        let plane = Plane::from_normal(p0, -outward, x_dir).unwrap();
        let face = builder.add_face(FaceSurface::Plane(plane), true).unwrap();
        let lp = builder.add_loop(face).unwrap();
        for i in 0..4 {
            let (a, b) = (quad[i], quad[(i + 1) % 4]);
            let key = (a.min(b), a.max(b));
            let edge = *edges.entry(key).or_insert_with(|| {
                let curve = Curve::line(corner(key.0), corner(key.1)).unwrap();
                builder.add_edge(EdgeGeometry::new(curve).unwrap()).unwrap()
            });
            builder.add_co_edge(lp, edge, a > b).unwrap();
        }
        builder.finish_loop(lp).unwrap();
        builder.finish_face(face).unwrap();
    }
    assert_eq!(builder.finish(), BuilderOutcome::Success);
    builder.get_result().unwrap()
}

fn assert_closed_shell(brep: &Brep) {
    for edge in &brep.edges {
        assert_eq!(edge.trim_indices.len(), 2);
        let [a, b] = [edge.trim_indices[0], edge.trim_indices[1]].map(|t| &brep.trims[t]);
        let sense_a = a.is_reversed != brep.faces[a.face_index].orientation_reversed;
        let sense_b = b.is_reversed != brep.faces[b.face_index].orientation_reversed;
        assert_ne!(sense_a, sense_b, "an edge is used twice in the same direction");
    }
}

fn bounding_box(solid: &Solid) -> (Point3<f64>, Point3<f64>) {
    let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
    let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);
    for (_, edge) in solid.edges() {
        for i in 0..2 {
            let p = edge.curve().end_point(i);
            min = min.inf(&p);
            max = max.sup(&p);
        }
    }
    (min, max)
}

#[test]
fn test_cube_round_trip_is_stable() {
    let scale = UnitScale::identity(Units::Meters);
    let c = GeometryConverter::without_materials(&scale);

    let first = c.solid_to_portable(&unit_cube()).unwrap();
    assert_closed_shell(&first);
    let rebuilt = c.solid_from_portable(&first).unwrap();
    assert_eq!(rebuilt.face_count(), 6);
    assert_eq!(rebuilt.edge_count(), 12);

    let second = c.solid_to_portable(&rebuilt).unwrap();
    assert_eq!(second.faces.len(), first.faces.len());
    assert_eq!(second.edges.len(), first.edges.len());
    assert_eq!(second.trims.len(), first.trims.len());
    assert_closed_shell(&second);

    let again = c.solid_from_portable(&second).unwrap();
    let (min, max) = bounding_box(&again);
    assert_relative_eq!((min - Point3::origin()).norm(), 0.0, epsilon = 1e-9);
    assert_relative_eq!((max - Point3::new(1.0, 1.0, 1.0)).norm(), 0.0, epsilon = 1e-9);
}

#[test]
fn test_reversed_faces_round_trip() {
    let scale = UnitScale::identity(Units::Meters);
    let c = GeometryConverter::without_materials(&scale);
    let solid = box_with_reversed_faces(2.0);

    let brep = c.solid_to_portable(&solid).unwrap();
    assert!(brep.faces.iter().all(|f| f.orientation_reversed));
    assert_closed_shell(&brep);

    let rebuilt = c.solid_from_portable(&brep).unwrap();
    assert_eq!(rebuilt.face_count(), 6);
    for (_, face) in rebuilt.faces() {
        assert!(!face.orientation_matches_surface());
    }
}

#[test]
fn test_round_trip_through_other_units() {
    let scale = UnitScale::new(Units::Feet, Units::Meters);
    let c = GeometryConverter::without_materials(&scale);
    let brep = c.solid_to_portable(&unit_cube()).unwrap();
    assert_eq!(brep.units, Units::Meters);
    assert_relative_eq!(brep.curve_3d[0].length(), 0.3048, epsilon = 1e-12);

    let rebuilt = c.solid_from_portable(&brep).unwrap();
    let (_, max) = bounding_box(&rebuilt);
    assert_relative_eq!((max - Point3::new(1.0, 1.0, 1.0)).norm(), 0.0, epsilon = 1e-9);

    // A host working in millimetres reads the same document
    let mm = UnitScale::identity(Units::Millimeters);
    let rebuilt_mm = GeometryConverter::without_materials(&mm).solid_from_portable(&brep).unwrap();
    let (_, max) = bounding_box(&rebuilt_mm);
    assert_relative_eq!(max.x, 304.8, epsilon = 1e-6);
}

#[test]
fn test_face_order_does_not_matter() {
    let scale = UnitScale::identity(Units::Meters);
    let c = GeometryConverter::without_materials(&scale);
    let mut brep = c.solid_to_portable(&unit_cube()).unwrap();
    brep.faces.reverse();
    brep.faces.swap(1, 4);
    let rebuilt = c.solid_from_portable(&brep).unwrap();
    assert_eq!(rebuilt.face_count(), 6);
    assert_eq!(rebuilt.edge_count(), 12);
}

#[test]
fn test_json_document_round_trip() {
    let scale = UnitScale::identity(Units::Meters);
    let c = GeometryConverter::without_materials(&scale);
    let brep = c.solid_to_portable(&unit_cube()).unwrap();

    let json = serde_json::to_string(&brep).unwrap();
    assert!(json.contains("\"curve3D\""));
    let parsed: Brep = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.trims.len(), brep.trims.len());
    assert_eq!(parsed.edges, brep.edges);
    assert_eq!(c.solid_from_portable(&parsed).unwrap().face_count(), 6);
}

#[test]
fn test_broken_brep_falls_back_to_display_meshes() {
    let scale = UnitScale::identity(Units::Meters);
    let c = GeometryConverter::without_materials(&scale);
    let mut brep = c.solid_to_portable(&unit_cube()).unwrap();
    brep.faces.pop();

    let shape = c.brep_to_host_shape(&brep).unwrap();
    let HostShape::Meshes(meshes) = shape else {
        panic!("expected the display meshes");
    };
    assert_eq!(meshes.len(), 1);
    assert_eq!(meshes[0].triangle_count(), 12);
    assert_relative_eq!(meshes[0].area(), 6.0, epsilon = 1e-9);

    brep.display_value.clear();
    let err = c.brep_to_host_shape(&brep).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TopologyReconstruction);
}

#[test]
fn test_intact_brep_builds_a_solid() {
    let scale = UnitScale::identity(Units::Meters);
    let c = GeometryConverter::without_materials(&scale);
    let brep = c.solid_to_portable(&unit_cube()).unwrap();
    let shape = c.brep_to_host_shape(&brep).unwrap();
    assert!(shape.is_solid());
    assert_eq!(shape.as_solid().map(Solid::face_count), Some(6));
}

#[test]
fn test_strict_builder_rejects_open_loop() {
    let scale = UnitScale::identity(Units::Meters);
    let settings = georelay_geometry::ConverterSettings {
        allow_face_removal: false,
        ..Default::default()
    };
    let c = GeometryConverter::with_settings(settings, &scale, &georelay_geometry::NoMaterials);
    let mut brep = c.solid_to_portable(&unit_cube()).unwrap();
    // Drop one trim so the first loop no longer closes
    brep.loops[0].trim_indices.pop();
    let err = c.solid_from_portable(&brep).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TopologyReconstruction);
}

/// A one-face open shell: a planar patch bounded by a full circle.
fn disc(c: &GeometryConverter<'_>, flipped: bool, reversed: bool) -> Brep {
    let plane = Plane::new(Point3::origin(), Vector3::x(), Vector3::y()).unwrap();
    let bounds = BoundingBoxUV {
        min: Point2::new(-1.5, -1.5),
        max: Point2::new(1.5, 1.5),
    };
    let patch = NurbsSurfaceData::bilinear(&plane, &bounds).unwrap();
    let circle = Curve::Arc(Arc::circle(Point3::origin(), Vector3::x(), Vector3::y(), 1.0).unwrap());
    let portable = c.curve_to_portable(&circle).unwrap();
    let domain = portable.domain();

    let mut brep = Brep::new(Units::Meters);
    brep.orientation = BrepOrientation::None;
    brep.surfaces.push(c.surface_to_portable(&patch));
    brep.curve_3d.push(portable.clone());
    brep.curve_2d.push(portable);
    brep.edges.push(BrepEdge {
        curve_index: 0,
        trim_indices: vec![0],
        flipped,
        domain: Some(domain),
    });
    brep.trims.push(BrepTrim {
        edge_index: Some(0),
        face_index: 0,
        loop_index: 0,
        curve_index: 0,
        trim_type: BrepTrimType::Boundary,
        is_reversed: false,
        domain: Some(domain),
    });
    brep.loops.push(BrepLoop {
        face_index: 0,
        trim_indices: vec![0],
        loop_type: BrepLoopType::Outer,
    });
    brep.faces.push(BrepFace {
        surface_index: 0,
        outer_loop_index: 0,
        loop_indices: vec![0],
        orientation_reversed: reversed,
    });
    brep
}

#[test]
fn test_closed_edge_rebuilds_as_two_halves() {
    let scale = UnitScale::identity(Units::Meters);
    let c = GeometryConverter::without_materials(&scale);
    for (flipped, reversed) in [(false, false), (true, false), (false, true), (true, true)] {
        let solid = c.solid_from_portable(&disc(&c, flipped, reversed)).unwrap();
        assert_eq!(solid.shell_type(), BRepType::OpenShell);
        assert_eq!(solid.face_count(), 1, "flipped={flipped} reversed={reversed}");
        assert_eq!(solid.edge_count(), 2, "flipped={flipped} reversed={reversed}");
    }
}
