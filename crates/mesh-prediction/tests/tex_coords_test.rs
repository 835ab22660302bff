//! Portable texture coordinate prediction: projection accuracy, the
//! degenerate-geometry fallbacks, and orientation stream validation.

mod common;

use common::*;
use mesh_prediction::tex_coords::{TexCoordsPortableDecoder, TexCoordsPortableEncoder};
use mesh_prediction::{DecoderBuffer, EncoderBuffer, Error, QuantizedPositions, Transform};

fn round_trip(
    fixture: &MeshFixture,
    positions: &QuantizedPositions,
    original: &[i32],
) -> Vec<i32> {
    let mut data = original.to_vec();
    let mut encoder =
        TexCoordsPortableEncoder::new(fixture.mesh_data(), positions, Transform::delta()).unwrap();
    encoder.compute_corrections(&mut data, 2).unwrap();
    let mut buffer = EncoderBuffer::new();
    encoder.encode_prediction_data(&mut buffer).unwrap();

    let mut decoder =
        TexCoordsPortableDecoder::new(fixture.mesh_data(), positions, Transform::delta()).unwrap();
    let mut reader = DecoderBuffer::new(buffer.data());
    decoder.decode_prediction_data(&mut reader).unwrap();
    assert_eq!(reader.remaining(), 0);
    decoder.recover_values(&mut data, 2).unwrap();
    data
}

#[test]
fn test_affine_uvs_predict_with_small_corrections() {
    // UVs proportional to x/y over a planar quad: the projected prediction
    // of the tip should land close to the true UV, and in all cases the
    // round trip must be exact.
    let fixture = MeshFixture::new(&quad_faces());
    let positions =
        QuantizedPositions::new(vec![[0, 0, 0], [10, 0, 0], [0, 10, 0], [10, 10, 0]]);
    let original = vec![0, 0, 100, 0, 0, 100, 100, 100];

    let mut corrections = original.clone();
    let mut encoder =
        TexCoordsPortableEncoder::new(fixture.mesh_data(), &positions, Transform::delta()).unwrap();
    encoder.compute_corrections(&mut corrections, 2).unwrap();
    // The projected entry (vertex 3) should be nearly exact.
    let tip = &corrections[6..8];
    assert!(
        tip[0].abs() <= 1 && tip[1].abs() <= 1,
        "projection residual too large: {tip:?}"
    );

    assert_eq!(round_trip(&fixture, &positions, &original), original);
}

#[test]
fn test_mirrored_uvs_use_the_other_orientation() {
    // Same geometry, UVs mirrored: the perpendicular component points the
    // other way, exercising the second candidate. Round trip stays exact.
    let fixture = MeshFixture::new(&quad_faces());
    let positions =
        QuantizedPositions::new(vec![[0, 0, 0], [10, 0, 0], [0, 10, 0], [10, 10, 0]]);
    let original = vec![0, 0, 100, 0, 0, 100, -97, -101];
    assert_eq!(round_trip(&fixture, &positions, &original), original);
}

#[test]
fn test_degenerate_uv_edge_falls_back_to_shared_value() {
    let fixture = MeshFixture::new(&quad_faces());
    let positions =
        QuantizedPositions::new(vec![[0, 0, 0], [10, 0, 0], [0, 10, 0], [10, 10, 0]]);
    // Entries 1 and 2 share one UV, so the tip prediction is that UV and
    // no orientation bit is spent.
    let original = vec![5, 7, 42, 43, 42, 43, 50, 50];

    let mut data = original.clone();
    let mut encoder =
        TexCoordsPortableEncoder::new(fixture.mesh_data(), &positions, Transform::delta()).unwrap();
    encoder.compute_corrections(&mut data, 2).unwrap();
    assert_eq!(&data[6..8], &[50 - 42, 50 - 43]);

    assert_eq!(round_trip(&fixture, &positions, &original), original);
}

#[test]
fn test_zero_length_position_edge_falls_back() {
    // Vertices 1 and 2 sit on the same point, so the edge has zero length
    // and the projection is impossible.
    let fixture = MeshFixture::new(&quad_faces());
    let positions =
        QuantizedPositions::new(vec![[0, 0, 0], [5, 5, 0], [5, 5, 0], [10, 10, 0]]);
    let original = vec![3, 4, 100, 0, 0, 100, 60, 60];
    assert_eq!(round_trip(&fixture, &positions, &original), original);
}

#[test]
fn test_strip_round_trips_many_orientations() {
    // A longer strip produces one orientation bit per interior vertex,
    // exercising the delta coding of the orientation stream.
    let fixture = MeshFixture::new(&strip_faces(10));
    let positions = QuantizedPositions::new(
        (0..fixture.num_entries() as i32)
            .map(|i| [i * 4, (i % 2) * 4, 0])
            .collect(),
    );
    let original = pseudo_random_values(fixture.num_entries() * 2, 47);
    assert_eq!(round_trip(&fixture, &positions, &original), original);
}

#[test]
fn test_missing_orientation_bits_are_fatal() {
    let fixture = MeshFixture::new(&quad_faces());
    let positions =
        QuantizedPositions::new(vec![[0, 0, 0], [10, 0, 0], [0, 10, 0], [10, 10, 0]]);

    // Zero orientations, empty bit payload, no transform data.
    let mut buffer = EncoderBuffer::new();
    buffer.encode_varint(0);
    buffer.encode_varint(0);

    let mut decoder =
        TexCoordsPortableDecoder::new(fixture.mesh_data(), &positions, Transform::delta()).unwrap();
    let mut reader = DecoderBuffer::new(buffer.data());
    decoder.decode_prediction_data(&mut reader).unwrap();

    let mut data = vec![1i32; 8];
    assert!(matches!(
        decoder.recover_values(&mut data, 2),
        Err(Error::OrientationStreamExhausted)
    ));
}

#[test]
fn test_short_position_parent_is_rejected_at_construction() {
    let fixture = MeshFixture::new(&quad_faces());
    let positions = QuantizedPositions::new(vec![[0, 0, 0], [10, 0, 0], [0, 10, 0]]);
    assert!(matches!(
        TexCoordsPortableEncoder::new(fixture.mesh_data(), &positions, Transform::delta()),
        Err(Error::ParentEntryCountMismatch { want: 4, got: 3 })
    ));
    assert!(matches!(
        TexCoordsPortableDecoder::new(fixture.mesh_data(), &positions, Transform::delta()),
        Err(Error::ParentEntryCountMismatch { want: 4, got: 3 })
    ));
}

#[test]
fn test_oversized_orientation_count_is_rejected() {
    let fixture = MeshFixture::new(&quad_faces());
    let positions =
        QuantizedPositions::new(vec![[0, 0, 0], [10, 0, 0], [0, 10, 0], [10, 10, 0]]);
    let mut buffer = EncoderBuffer::new();
    buffer.encode_varint(1000);

    let mut decoder =
        TexCoordsPortableDecoder::new(fixture.mesh_data(), &positions, Transform::delta()).unwrap();
    let mut reader = DecoderBuffer::new(buffer.data());
    assert!(matches!(
        decoder.decode_prediction_data(&mut reader),
        Err(Error::InvalidFlagCount { .. })
    ));
}
