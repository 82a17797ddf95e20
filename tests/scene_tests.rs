//! Scene Integration Tests
//!
//! Tests for:
//! - Scene: create/remove objects, attach/detach hierarchy
//! - Object kinds and component pools (mesh, armature)
//! - Removal semantics: children are detached, never deleted
//! - Traversal order and armature queries

use kitbash::resources::Mesh;
use kitbash::scene::{Armature, Bone, Node, ObjectKind, ParentKind, Scene};

fn armature_with_bones(names: &[&str]) -> Armature {
    let mut armature = Armature::new("Armature");
    for (i, name) in names.iter().enumerate() {
        let mut bone = Bone::new(name);
        bone.parent = if i == 0 { None } else { Some(i - 1) };
        armature.bones.push(bone);
    }
    armature
}

// ============================================================================
// Object Creation & Removal
// ============================================================================

#[test]
fn scene_add_node_to_root() {
    let mut scene = Scene::new();
    let handle = scene.add_node(Node::new("Empty"));
    assert!(scene.root_nodes.contains(&handle));
    assert_eq!(scene.name(handle), Some("Empty"));
}

#[test]
fn scene_add_mesh_object_populates_pool() {
    let mut scene = Scene::new();
    let handle = scene.add_mesh_object(Mesh::new("Body"));
    assert!(matches!(
        scene.get_node(handle).unwrap().kind,
        ObjectKind::Mesh(_)
    ));
    assert_eq!(scene.mesh_count(), 1);
    assert_eq!(scene.node_mesh(handle).unwrap().name, "Body");
}

#[test]
fn scene_remove_node_drops_component_data() {
    let mut scene = Scene::new();
    let handle = scene.add_armature_object(armature_with_bones(&["Hips"]));
    assert_eq!(scene.armature_count(), 1);

    scene.remove_node(handle);
    assert!(scene.get_node(handle).is_none());
    assert_eq!(scene.armature_count(), 0);
}

#[test]
fn scene_clear_resets_everything() {
    let mut scene = Scene::new();
    scene.add_mesh_object(Mesh::new("A"));
    scene.add_armature_object(armature_with_bones(&["Hips"]));
    scene.clear();
    assert!(scene.is_empty());
    assert_eq!(scene.mesh_count(), 0);
    assert_eq!(scene.armature_count(), 0);
    assert!(scene.root_nodes.is_empty());
}

// ============================================================================
// Hierarchy
// ============================================================================

#[test]
fn attach_sets_both_sides_of_the_link() {
    let mut scene = Scene::new();
    let parent = scene.add_armature_object(armature_with_bones(&["Hips"]));
    let child = scene.add_mesh_object(Mesh::new("Body"));

    scene.attach(child, parent, ParentKind::Armature);

    let link = scene.get_node(child).unwrap().parent().unwrap();
    assert_eq!(link.node, parent);
    assert_eq!(link.kind, ParentKind::Armature);
    assert!(scene.get_node(parent).unwrap().children().contains(&child));
    assert!(!scene.root_nodes.contains(&child));
}

#[test]
fn detach_returns_object_to_root() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new("Empty"));
    let child = scene.add_mesh_object(Mesh::new("Body"));
    scene.attach(child, parent, ParentKind::Object);

    scene.detach(child);

    assert!(scene.get_node(child).unwrap().parent().is_none());
    assert!(scene.root_nodes.contains(&child));
    assert!(scene.get_node(parent).unwrap().children().is_empty());
}

#[test]
fn attach_to_self_is_rejected() {
    let mut scene = Scene::new();
    let handle = scene.add_node(Node::new("Empty"));
    scene.attach(handle, handle, ParentKind::Object);
    assert!(scene.get_node(handle).unwrap().parent().is_none());
}

// ============================================================================
// Removal never cascades
// ============================================================================

#[test]
fn removing_a_parent_detaches_children() {
    let mut scene = Scene::new();
    let armature = scene.add_armature_object(armature_with_bones(&["Hips"]));
    let mesh = scene.add_mesh_object(Mesh::new("Body"));
    scene.attach(mesh, armature, ParentKind::Armature);

    scene.remove_node(armature);

    // The mesh survives its former parent and is back at the root.
    let node = scene.get_node(mesh).expect("mesh must survive");
    assert!(node.parent().is_none());
    assert!(scene.root_nodes.contains(&mesh));
    assert_eq!(scene.mesh_count(), 1);
    assert_eq!(scene.armature_count(), 0);
}

#[test]
fn removing_a_parent_keeps_grandchildren_subtree() {
    let mut scene = Scene::new();
    let top = scene.add_node(Node::new("Top"));
    let mid = scene.add_node(Node::new("Mid"));
    let leaf = scene.add_mesh_object(Mesh::new("Leaf"));
    scene.attach(mid, top, ParentKind::Object);
    scene.attach(leaf, mid, ParentKind::Object);

    scene.remove_node(top);

    // `mid` is detached to the root but keeps its own child.
    assert!(scene.get_node(mid).unwrap().parent().is_none());
    assert_eq!(
        scene.get_node(leaf).unwrap().parent().unwrap().node,
        mid
    );
}

// ============================================================================
// Traversal & queries
// ============================================================================

#[test]
fn traversal_is_depth_first_in_insertion_order() {
    let mut scene = Scene::new();
    let a = scene.add_node(Node::new("A"));
    let b = scene.add_node(Node::new("B"));
    let a_child = scene.add_node(Node::new("AChild"));
    scene.attach(a_child, a, ParentKind::Object);

    let order: Vec<&str> = scene
        .traverse()
        .into_iter()
        .map(|h| scene.name(h).unwrap())
        .collect();
    assert_eq!(order, vec!["A", "AChild", "B"]);
    let _ = b;
}

#[test]
fn first_armature_follows_traversal_order() {
    let mut scene = Scene::new();
    scene.add_mesh_object(Mesh::new("Body"));
    let first = scene.add_armature_object(armature_with_bones(&["Hips"]));
    let second = scene.add_armature_object(armature_with_bones(&["Hips"]));

    assert_eq!(scene.first_armature(), Some(first));
    assert_eq!(scene.armature_objects(), vec![first, second]);
}

#[test]
fn parent_inverse_reset_restores_plain_trs() {
    let mut scene = Scene::new();
    let handle = scene.add_mesh_object(Mesh::new("Body"));
    let node = scene.get_node_mut(handle).unwrap();
    node.transform.position = glam::Vec3::new(1.0, 2.0, 3.0);
    node.transform
        .set_parent_inverse(glam::Mat4::from_translation(glam::Vec3::new(0.0, -2.0, 0.0)));

    assert_ne!(
        node.transform.effective_local_matrix(),
        node.transform.local_matrix()
    );

    node.transform.reset_parent_inverse();
    assert_eq!(
        node.transform.effective_local_matrix(),
        node.transform.local_matrix()
    );
}

#[test]
fn armature_bone_lookup_and_mismatch() {
    let base = armature_with_bones(&["Hips", "Spine", "Head"]);
    let incoming = armature_with_bones(&["Hips", "Spine", "Tail"]);

    assert_eq!(base.bone_index("Spine"), Some(1));
    assert_eq!(base.bone_index("Tail"), None);
    assert_eq!(incoming.bones_missing_from(&base), vec!["Tail"]);
    assert!(base.bones_missing_from(&base).is_empty());
}
