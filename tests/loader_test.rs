use cgmath::{Matrix4, SquareMatrix};
use futures::FutureExt;
use orbit_viewer::{
    LoadError, ViewerConfig,
    data_structures::{environment::EnvironmentMapping, scene_graph::world_bounds},
    loader::{LoadEvent, run_load_pipeline},
    resources::{
        environment::{decode_hdr, load_environment},
        model::load_model,
        resolve_uri,
    },
};

use crate::common::test_utils::{
    GlbMesh, MemorySource, assert_close, block_on, box_mesh, glb, radiance_hdr,
};

mod common;

const ENVIRONMENT: &str = "https://example.com/sky.hdr";
const MODEL: &str = "models/hall.glb";

fn config() -> ViewerConfig {
    ViewerConfig {
        environment_uri: ENVIRONMENT.to_string(),
        model_uri: MODEL.to_string(),
        ..Default::default()
    }
}

fn sky() -> Vec<u8> {
    radiance_hdr(2, 1, &[[128, 128, 128, 129], [128, 64, 32, 130]])
}

fn hall() -> Vec<u8> {
    let (positions, indices) = box_mesh([-1.0, 0.0, -0.5], [1.0, 1.0, 0.5]);
    glb(
        &[GlbMesh {
            positions: &positions,
            indices: &indices,
            material: Some(0),
            translation: [10.0, 0.0, 0.0],
        }],
        &[([1.0, 1.0, 1.0, 1.0], 0.9, 0.1)],
    )
}

#[test]
fn should_decode_radiance_texels_to_linear_floats() {
    let environment = decode_hdr("sky", &sky()).expect("valid hdr");

    assert_eq!((environment.width, environment.height), (2, 1));
    assert_eq!(environment.mapping, EnvironmentMapping::EquirectangularReflection);
    let first = environment.texel(0, 0).expect("texel in range");
    let second = environment.texel(1, 0).expect("texel in range");
    for (actual, expected) in first.iter().zip([1.0, 1.0, 1.0, 1.0]) {
        assert_close(*actual, expected, 1e-6);
    }
    for (actual, expected) in second.iter().zip([2.0, 1.0, 0.5, 1.0]) {
        assert_close(*actual, expected, 1e-6);
    }
    assert_eq!(environment.texel(2, 0), None);
}

#[test]
fn should_report_undecodable_environments() {
    let source = MemorySource::new().with_file(ENVIRONMENT, b"not an image".to_vec());

    let err = block_on(load_environment(&source, ENVIRONMENT)).expect_err("garbage must not decode");

    assert!(matches!(err, LoadError::Environment { .. }));
    assert_eq!(err.uri(), ENVIRONMENT);
}

#[test]
fn should_parse_geometry_and_materials_from_glb() {
    let source = MemorySource::new().with_file(MODEL, hall());

    let model = block_on(load_model(&source, MODEL)).expect("valid glb");

    assert_eq!(model.mesh_count(), 1);
    assert_eq!(model.materials.len(), 1);
    assert_eq!(model.materials[0].base_color, Some([1.0, 1.0, 1.0, 1.0]));
    assert_eq!(model.materials[0].metalness, Some(0.9));
    assert_eq!(model.materials[0].roughness, Some(0.1));

    let bounds = world_bounds(model.root.as_ref(), &Matrix4::identity());
    assert_close(bounds.min.x, 9.0, 1e-6);
    assert_close(bounds.max.x, 11.0, 1e-6);
    assert_close(bounds.min.y, 0.0, 1e-6);
    assert_close(bounds.max.y, 1.0, 1e-6);
    assert_close(bounds.min.z, -0.5, 1e-6);
    assert_close(bounds.max.z, 0.5, 1e-6);
}

#[test]
fn should_give_unassigned_primitives_the_default_material() {
    let (positions, indices) = box_mesh([0.0; 3], [1.0; 3]);
    let bytes = glb(
        &[GlbMesh {
            positions: &positions,
            indices: &indices,
            material: None,
            translation: [0.0; 3],
        }],
        &[],
    );
    let source = MemorySource::new().with_file(MODEL, bytes);

    let model = block_on(load_model(&source, MODEL)).expect("valid glb");

    assert_eq!(model.materials.len(), 1);
    assert_eq!(model.materials[0].metalness, Some(1.0));
    assert_eq!(model.materials[0].roughness, Some(1.0));
}

#[test]
fn should_resolve_references_next_to_the_document() {
    assert_eq!(resolve_uri("models/hall.gltf", "hall.bin"), "models/hall.bin");
    assert_eq!(resolve_uri("hall.gltf", "hall.bin"), "hall.bin");
    assert_eq!(
        resolve_uri("https://example.com/a/hall.gltf", "tex/wood.png"),
        "https://example.com/a/tex/wood.png"
    );
    assert_eq!(
        resolve_uri("models/hall.gltf", "https://cdn.example.com/hall.bin"),
        "https://cdn.example.com/hall.bin"
    );
}

#[test]
fn should_not_request_the_model_while_the_environment_is_pending() {
    let source = MemorySource::new()
        .with_pending(ENVIRONMENT)
        .with_file(MODEL, hall());
    let config = config();
    let mut events = Vec::new();

    let outcome = {
        let mut sink = |event: LoadEvent| events.push(event);
        run_load_pipeline(&source, &config, &mut sink).now_or_never()
    };

    assert!(outcome.is_none(), "the pipeline must still be waiting");
    assert_eq!(source.requests_for(ENVIRONMENT), 1);
    assert_eq!(source.requests_for(MODEL), 0);
    assert!(events.is_empty());
}

#[test]
fn should_not_request_the_model_when_the_environment_fails() {
    let source = MemorySource::new().with_file(MODEL, hall());
    let config = config();
    let mut events = Vec::new();

    let outcome = {
        let mut sink = |event: LoadEvent| events.push(event);
        block_on(run_load_pipeline(&source, &config, &mut sink))
    };

    assert!(matches!(outcome, Err(LoadError::Environment { .. })));
    assert_eq!(source.requests_for(MODEL), 0);
    assert!(events.is_empty());
}

#[test]
fn should_report_a_missing_model_after_installing_the_environment() {
    let source = MemorySource::new().with_file(ENVIRONMENT, sky());
    let config = config();
    let mut events = Vec::new();

    let outcome = {
        let mut sink = |event: LoadEvent| events.push(event);
        block_on(run_load_pipeline(&source, &config, &mut sink))
    };

    match outcome {
        Err(LoadError::Model { uri, .. }) => assert_eq!(uri, MODEL),
        other => panic!("expected a model error, got {other:?}"),
    }
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], LoadEvent::EnvironmentReady(_)));
}

#[test]
fn should_deliver_a_normalized_and_framed_model_after_the_environment() {
    let source = MemorySource::new()
        .with_file(ENVIRONMENT, sky())
        .with_file(MODEL, hall());
    let config = config();
    let mut events = Vec::new();

    let outcome = {
        let mut sink = |event: LoadEvent| events.push(event);
        block_on(run_load_pipeline(&source, &config, &mut sink))
    };

    assert!(outcome.is_ok());
    assert_eq!(*source.requests.borrow(), vec![ENVIRONMENT.to_string(), MODEL.to_string()]);
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], LoadEvent::EnvironmentReady(_)));
    let LoadEvent::ModelReady(prepared) = &events[1] else {
        panic!("the second event must carry the model");
    };

    let material = &prepared.model.materials[0];
    assert_eq!(material.metalness, Some(0.1));
    assert_eq!(material.roughness, Some(0.9));

    let bounds = world_bounds(prepared.model.root.as_ref(), &Matrix4::identity());
    assert_close(bounds.center().x, 0.0, 1e-5);
    assert_close(bounds.center().y, 0.0, 1e-5);
    assert_close(bounds.center().z, 0.0, 1e-5);
    assert_close(prepared.framing.max_dim, 2.0, 1e-6);
    assert_close(prepared.framing.camera_z, 2.598, 1e-3);
}
