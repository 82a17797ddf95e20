//! Export Tests
//!
//! Tests for:
//! - GLB round-trip of scene structure (objects, bones, skins, materials)
//! - VRM output: container layout, extension block, humanoid table
//! - Conversion pipeline behavior with and without an armature

use std::path::{Path, PathBuf};

use glam::{Vec3, Vec4};
use kitbash::pipeline::convert_file;
use kitbash::resources::{Material, Mesh, Primitive};
use kitbash::scene::{Armature, Bone, Node, ParentKind, Scene};
use kitbash::{GlbExporter, GlbImporter};

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("kitbash_export_{}_{tag}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Armature whose bone names cover every required humanoid slot.
fn humanoid_armature() -> Armature {
    let names = [
        "Hips",
        "Spine",
        "Chest",
        "Neck",
        "Head",
        "LeftUpperArm",
        "LeftLowerArm",
        "LeftHand",
        "RightUpperArm",
        "RightLowerArm",
        "RightHand",
        "LeftUpperLeg",
        "LeftLowerLeg",
        "LeftFoot",
        "RightUpperLeg",
        "RightLowerLeg",
        "RightFoot",
    ];
    let mut armature = Armature::new("Armature");
    for (i, name) in names.iter().enumerate() {
        let mut bone = Bone::new(name);
        bone.parent = if i == 0 { None } else { Some(0) };
        bone.position = Vec3::new(0.0, 0.05 * i as f32, 0.0);
        armature.bones.push(bone);
    }
    armature
}

fn skinned_body(armature_bones: &[&str]) -> Mesh {
    let mut mesh = Mesh::new("Body");
    let mut prim = Primitive {
        positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        indices: Some(vec![0, 1, 2]),
        ..Primitive::default()
    };
    prim.joints = Some(vec![[0, 0, 0, 0]; 3]);
    prim.weights = Some(vec![[1.0, 0.0, 0.0, 0.0]; 3]);
    prim.material = Some(Material {
        name: Some("Skin".to_string()),
        base_color: Vec4::new(0.8, 0.6, 0.5, 1.0),
        ..Material::default()
    });
    mesh.primitives.push(prim);
    mesh.vertex_groups = armature_bones.iter().map(ToString::to_string).collect();
    mesh
}

fn write_avatar(path: &Path) {
    let mut scene = Scene::new();
    let armature = scene.add_armature_object(humanoid_armature());
    let body = scene.add_mesh_object(skinned_body(&["Hips", "Spine", "Head"]));
    scene
        .node_mesh_mut(body)
        .unwrap()
        .add_armature_modifier(armature);
    scene.attach(body, armature, ParentKind::Armature);
    scene.add_node(Node::new("LookTarget"));
    GlbExporter::export(&scene, path).unwrap();
}

/// Extracts the JSON chunk of a GLB container.
fn glb_json(path: &Path) -> serde_json::Value {
    let data = std::fs::read(path).unwrap();
    assert_eq!(&data[0..4], b"glTF");
    let json_len = u32::from_le_bytes(data[12..16].try_into().unwrap()) as usize;
    assert_eq!(&data[16..20], b"JSON");
    serde_json::from_slice(&data[20..20 + json_len]).unwrap()
}

// ============================================================================
// GLB round-trip
// ============================================================================

#[test]
fn glb_roundtrip_preserves_scene_structure() {
    let dir = temp_dir("roundtrip");
    let path = dir.join("avatar.glb");
    write_avatar(&path);

    let mut scene = Scene::new();
    let report = GlbImporter::import(&path, &mut scene).unwrap();
    assert_eq!(report.armatures.len(), 1);
    assert_eq!(report.meshes.len(), 1);

    assert_eq!(scene.armature_count(), 1);
    assert_eq!(scene.mesh_count(), 1);

    let armature = scene.node_armature(report.armatures[0]).unwrap();
    assert_eq!(armature.bone_count(), 17);
    assert_eq!(armature.bones[0].name, "Hips");

    let mesh = scene.node_mesh(report.meshes[0]).unwrap();
    assert_eq!(mesh.name, "Body");
    assert!(mesh.has_vertex_groups());
    assert_eq!(mesh.armature_target(), Some(report.armatures[0]));
    assert_eq!(mesh.primitives.len(), 1);
    assert_eq!(mesh.primitives[0].vertex_count(), 3);

    let material = mesh.primitives[0].material.as_ref().unwrap();
    assert_eq!(material.name.as_deref(), Some("Skin"));

    // The plain empty survives as an Other object.
    let names: Vec<&str> = scene
        .traverse()
        .into_iter()
        .filter_map(|h| scene.name(h))
        .collect();
    assert!(names.contains(&"LookTarget"));
}

#[test]
fn glb_export_emits_one_skin_per_armature() {
    let dir = temp_dir("skins");
    let path = dir.join("avatar.glb");
    write_avatar(&path);

    let json = glb_json(&path);
    let skins = json["skins"].as_array().unwrap();
    assert_eq!(skins.len(), 1);
    assert_eq!(skins[0]["joints"].as_array().unwrap().len(), 17);
    assert!(skins[0]["inverseBindMatrices"].is_number());

    // Exactly one scene, containing every root node.
    assert_eq!(json["scene"], 0);
    assert_eq!(json["scenes"].as_array().unwrap().len(), 1);
}

// ============================================================================
// VRM conversion
// ============================================================================

#[test]
fn vrm_output_carries_extension_and_humanoid_table() {
    let dir = temp_dir("vrm");
    let input = dir.join("avatar.glb");
    let output = dir.join("avatar.vrm");
    write_avatar(&input);

    let mut scene = Scene::new();
    let report = convert_file(&mut scene, &input, &output).unwrap();
    assert_eq!(report.meshes, 1);
    assert_eq!(report.bones, 17);
    assert!(report.humanoid_complete);

    let json = glb_json(&output);
    assert!(
        json["extensionsUsed"]
            .as_array()
            .unwrap()
            .iter()
            .any(|v| v == "VRM")
    );

    let vrm = &json["extensions"]["VRM"];
    assert_eq!(vrm["specVersion"], "0.0");

    let human_bones = vrm["humanoid"]["humanBones"].as_array().unwrap();
    assert_eq!(human_bones.len(), 17);
    assert!(human_bones.iter().any(|b| b["bone"] == "hips"));

    // The head assignment doubles as the first-person reference bone.
    assert_ne!(vrm["firstPerson"]["firstPersonBone"], -1);

    // One material property per exported material, on the glTF fallback
    // shader.
    let materials = json["materials"].as_array().unwrap();
    let props = vrm["materialProperties"].as_array().unwrap();
    assert_eq!(props.len(), materials.len());
    assert_eq!(props[0]["shader"], "VRM_USE_GLTFSHADER");
}

#[test]
fn vrm_conversion_without_armature_is_best_effort() {
    let dir = temp_dir("vrm_plain");
    let input = dir.join("statue.glb");
    let output = dir.join("statue.vrm");

    let mut scene = Scene::new();
    let mut mesh = Mesh::new("Statue");
    mesh.primitives.push(Primitive {
        positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        indices: Some(vec![0, 1, 2]),
        ..Primitive::default()
    });
    scene.add_mesh_object(mesh);
    GlbExporter::export(&scene, &input).unwrap();

    let mut convert_scene = Scene::new();
    let report = convert_file(&mut convert_scene, &input, &output).unwrap();
    assert_eq!(report.bones, 0);
    assert_eq!(report.humanoid_assigned, 0);

    let json = glb_json(&output);
    let human_bones = json["extensions"]["VRM"]["humanoid"]["humanBones"]
        .as_array()
        .unwrap();
    assert!(human_bones.is_empty());
}
