//! Geometric normal prediction against analytically known fan normals.

mod common;

use common::*;
use mesh_prediction::geometric_normal::{GeometricNormalDecoder, GeometricNormalEncoder};
use mesh_prediction::octahedron::OctahedronToolBox;
use mesh_prediction::{
    CornerIndex, CornerTable, DecoderBuffer, EncoderBuffer, Error, MeshData, QuantizedPositions,
    VertexIndex,
};

/// Octahedral coordinates of an integer direction vector.
fn project(toolbox: &OctahedronToolBox, direction: [i64; 3]) -> (i32, i32) {
    let mut v = direction;
    toolbox.canonicalize_integer_vector(&mut v);
    toolbox.integer_vector_to_quantized_octahedral_coords(&v)
}

#[test]
fn test_right_triangle_predicts_exact_plus_z_normal() {
    // Triangle in the z = 0 plane with counter-clockwise winding seen from
    // +z; every vertex fan is the single face, so the predicted normal is
    // the face normal.
    let fixture = MeshFixture::new(&[[0, 1, 2]]);
    let positions = QuantizedPositions::new(vec![[0, 0, 0], [4, 0, 0], [0, 4, 0]]);
    let toolbox = OctahedronToolBox::new(4).unwrap();
    let (s, t) = project(&toolbox, [0, 0, 1]);

    // Values equal to the prediction leave zero corrections and no flips.
    let mut data = vec![s, t, s, t, s, t];
    let mut encoder = GeometricNormalEncoder::new(fixture.mesh_data(), &positions, 4).unwrap();
    encoder.compute_corrections(&mut data, 2).unwrap();
    assert_eq!(data, vec![0; 6]);

    let mut buffer = EncoderBuffer::new();
    encoder.encode_prediction_data(&mut buffer).unwrap();
    let mut decoder = GeometricNormalDecoder::new(fixture.mesh_data(), &positions).unwrap();
    let mut reader = DecoderBuffer::new(buffer.data());
    decoder.decode_prediction_data(&mut reader).unwrap();
    decoder.recover_values(&mut data, 2).unwrap();
    assert_eq!(data, vec![s, t, s, t, s, t]);
}

#[test]
fn test_flipped_normals_cost_nothing_extra() {
    // Stored normals pointing against the predicted direction must encode
    // as zero corrections through the flip bit, not as large residuals.
    let fixture = MeshFixture::new(&[[0, 1, 2]]);
    let positions = QuantizedPositions::new(vec![[0, 0, 0], [4, 0, 0], [0, 4, 0]]);
    let toolbox = OctahedronToolBox::new(4).unwrap();
    let (s, t) = project(&toolbox, [0, 0, -1]);

    let original = vec![s, t, s, t, s, t];
    let mut data = original.clone();
    let mut encoder = GeometricNormalEncoder::new(fixture.mesh_data(), &positions, 4).unwrap();
    encoder.compute_corrections(&mut data, 2).unwrap();
    assert_eq!(data, vec![0; 6]);

    let mut buffer = EncoderBuffer::new();
    encoder.encode_prediction_data(&mut buffer).unwrap();
    let mut decoder = GeometricNormalDecoder::new(fixture.mesh_data(), &positions).unwrap();
    let mut reader = DecoderBuffer::new(buffer.data());
    decoder.decode_prediction_data(&mut reader).unwrap();
    decoder.recover_values(&mut data, 2).unwrap();
    assert_eq!(data, original);
}

#[test]
fn test_prediction_covers_the_whole_boundary_fan() {
    // Two non-planar triangles around vertex 0. Whichever of its two
    // fan-end corners represents the vertex, the accumulated normal must
    // include both faces, so the corrections cannot depend on the choice.
    let corner_table = CornerTable::from_faces(&[[0, 1, 2], [0, 2, 3]]).unwrap();
    let positions =
        QuantizedPositions::new(vec![[0, 0, 0], [4, 0, 0], [4, 4, 2], [0, 4, 0]]);
    let vertex_to_data: Vec<i32> = (0..4).collect();
    let original = vec![9, 3, 1, 7, 2, 11, 5, 4];

    let mut per_corner_corrections = Vec::new();
    for vertex_zero_corner in [CornerIndex(0), CornerIndex(3)] {
        let mut data_to_corner: Vec<CornerIndex> = (0..4)
            .map(|v| corner_table.left_most_corner(VertexIndex(v)))
            .collect();
        data_to_corner[0] = vertex_zero_corner;
        let mesh = MeshData::new(&corner_table, &data_to_corner, &vertex_to_data);

        let mut data = original.clone();
        let mut encoder = GeometricNormalEncoder::new(mesh, &positions, 4).unwrap();
        encoder.compute_corrections(&mut data, 2).unwrap();
        let mut buffer = EncoderBuffer::new();
        encoder.encode_prediction_data(&mut buffer).unwrap();

        let mut decoder = GeometricNormalDecoder::new(mesh, &positions).unwrap();
        let mut reader = DecoderBuffer::new(buffer.data());
        decoder.decode_prediction_data(&mut reader).unwrap();
        let mut recovered = data.clone();
        decoder.recover_values(&mut recovered, 2).unwrap();
        assert_eq!(recovered, original);

        per_corner_corrections.push(data);
    }
    assert_eq!(per_corner_corrections[0], per_corner_corrections[1]);
}

#[test]
fn test_huge_coordinates_still_round_trip() {
    // Cross products near 2^40 exercise the accumulator rescaling.
    let scale = 1 << 20;
    let fixture = MeshFixture::new(&octahedron_faces());
    let positions = QuantizedPositions::new(
        octahedron_positions()
            .into_iter()
            .map(|p| [p[0] * scale, p[1] * scale, p[2] * scale])
            .collect(),
    );
    let original: Vec<i32> = pseudo_random_values(fixture.num_entries() * 2, 43)
        .iter()
        .map(|v| v.rem_euclid(1 << 10))
        .collect();

    let mut data = original.clone();
    let mut encoder = GeometricNormalEncoder::new(fixture.mesh_data(), &positions, 11).unwrap();
    encoder.compute_corrections(&mut data, 2).unwrap();
    let mut buffer = EncoderBuffer::new();
    encoder.encode_prediction_data(&mut buffer).unwrap();

    let mut decoder = GeometricNormalDecoder::new(fixture.mesh_data(), &positions).unwrap();
    let mut reader = DecoderBuffer::new(buffer.data());
    decoder.decode_prediction_data(&mut reader).unwrap();
    decoder.recover_values(&mut data, 2).unwrap();
    assert_eq!(data, original);
}

#[test]
fn test_missing_flip_bits_are_fatal() {
    let fixture = MeshFixture::new(&[[0, 1, 2]]);
    let positions = QuantizedPositions::new(vec![[0, 0, 0], [4, 0, 0], [0, 4, 0]]);

    // Transform data (4 quantization bits), zero flips, empty bit payload.
    let mut buffer = EncoderBuffer::new();
    buffer.encode_u8(4);
    buffer.encode_varint(0);
    buffer.encode_varint(0);

    let mut decoder = GeometricNormalDecoder::new(fixture.mesh_data(), &positions).unwrap();
    let mut reader = DecoderBuffer::new(buffer.data());
    decoder.decode_prediction_data(&mut reader).unwrap();

    let mut data = vec![0i32; 6];
    assert!(matches!(
        decoder.recover_values(&mut data, 2),
        Err(Error::FlipStreamExhausted)
    ));
}

#[test]
fn test_short_position_parent_is_rejected_at_construction() {
    let fixture = MeshFixture::new(&[[0, 1, 2]]);
    // One position missing for the three entries.
    let positions = QuantizedPositions::new(vec![[0, 0, 0], [4, 0, 0]]);
    assert!(matches!(
        GeometricNormalEncoder::new(fixture.mesh_data(), &positions, 4),
        Err(Error::ParentEntryCountMismatch { want: 3, got: 2 })
    ));
    assert!(matches!(
        GeometricNormalDecoder::new(fixture.mesh_data(), &positions),
        Err(Error::ParentEntryCountMismatch { want: 3, got: 2 })
    ));
}

#[test]
fn test_wrong_component_count_is_rejected() {
    let fixture = MeshFixture::new(&[[0, 1, 2]]);
    let positions = QuantizedPositions::new(vec![[0, 0, 0], [4, 0, 0], [0, 4, 0]]);
    let mut encoder = GeometricNormalEncoder::new(fixture.mesh_data(), &positions, 4).unwrap();
    let mut data = vec![0i32; 9];
    assert!(matches!(
        encoder.compute_corrections(&mut data, 3),
        Err(Error::InvalidComponentCount { want: 2, got: 3 })
    ));
}
