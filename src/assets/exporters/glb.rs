//! Whole-scene GLB writer.
//!
//! The glTF JSON document is assembled by hand with `serde_json` and packed
//! with its binary payload into a GLB container. Vertex-group resolution
//! against the target armature's bone names happens here: this is the point
//! where a mesh's armature modifier turns into an actual glTF skin.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use glam::Mat4;
use serde_json::{Map, Value, json};

use crate::errors::{KitbashError, Result};
use crate::resources::{Material, Mesh, Primitive};
use crate::scene::{Armature, NodeHandle, ObjectKind, Scene};

const GLB_MAGIC: u32 = 0x4654_6C67; // "glTF"
const CHUNK_JSON: u32 = 0x4E4F_534A; // "JSON"
const CHUNK_BIN: u32 = 0x004E_4942; // "BIN\0"

const COMPONENT_F32: u32 = 5126;
const COMPONENT_U16: u32 = 5123;
const COMPONENT_U32: u32 = 5125;
const TARGET_ARRAY_BUFFER: u32 = 34962;
const TARGET_ELEMENT_ARRAY_BUFFER: u32 = 34963;

/// GLB exporter: serializes the whole scene, no selection subset.
pub struct GlbExporter;

impl GlbExporter {
    pub fn export(scene: &Scene, path: &Path) -> Result<()> {
        let document = DocumentBuilder::build(scene);
        write_glb(path, &document.json, &document.bin)
    }
}

/// A fully assembled glTF document plus lookups the VRM layer needs.
pub struct BuiltDocument {
    pub json: Value,
    pub bin: Vec<u8>,
    /// (armature object, bone index) -> glTF node index
    pub bone_nodes: HashMap<(NodeHandle, usize), usize>,
    /// Names of the emitted materials, in material-array order.
    pub material_names: Vec<String>,
}

pub(crate) struct DocumentBuilder<'a> {
    scene: &'a Scene,
    bin: Vec<u8>,
    buffer_views: Vec<Value>,
    accessors: Vec<Value>,
    nodes: Vec<Value>,
    scene_roots: Vec<usize>,
    meshes: Vec<Value>,
    skins: Vec<Value>,
    materials: Vec<Material>,

    object_nodes: HashMap<NodeHandle, usize>,
    bone_nodes: HashMap<(NodeHandle, usize), usize>,
    skin_for_armature: HashMap<NodeHandle, usize>,
}

impl<'a> DocumentBuilder<'a> {
    pub(crate) fn build(scene: &'a Scene) -> BuiltDocument {
        let mut builder = Self {
            scene,
            bin: Vec::new(),
            buffer_views: Vec::new(),
            accessors: Vec::new(),
            nodes: Vec::new(),
            scene_roots: Vec::new(),
            meshes: Vec::new(),
            skins: Vec::new(),
            materials: Vec::new(),
            object_nodes: HashMap::new(),
            bone_nodes: HashMap::new(),
            skin_for_armature: HashMap::new(),
        };

        // Pass 1: the node tree (objects and bones, names and transforms).
        for &root in &scene.root_nodes {
            let index = builder.emit_object(root);
            builder.scene_roots.push(index);
        }

        // Pass 2: mesh data and skins, now that every bone node exists.
        for handle in scene.mesh_objects() {
            builder.emit_mesh_data(handle);
        }

        let json = builder.assemble();
        BuiltDocument {
            json,
            bin: builder.bin,
            bone_nodes: builder.bone_nodes,
            material_names: builder
                .materials
                .iter()
                .enumerate()
                .map(|(i, m)| m.name.clone().unwrap_or_else(|| format!("Material_{i}")))
                .collect(),
        }
    }

    // ========================================================================
    // Node tree
    // ========================================================================

    fn emit_object(&mut self, handle: NodeHandle) -> usize {
        let node = self
            .scene
            .get_node(handle)
            .expect("traversal yields live handles");

        let mut json_node = Map::new();
        json_node.insert("name".to_string(), json!(node.name));
        insert_transform(&mut json_node, &node.transform.effective_local_matrix());

        let index = self.nodes.len();
        self.nodes.push(Value::Object(json_node));
        self.object_nodes.insert(handle, index);

        let mut children = Vec::new();

        if let ObjectKind::Armature(key) = node.kind
            && let Some(armature) = self.scene.armature(key)
        {
            children.extend(self.emit_bones(handle, armature));
        }

        for &child in node.children() {
            children.push(self.emit_object(child));
        }

        if !children.is_empty() {
            self.nodes[index]
                .as_object_mut()
                .expect("node is an object")
                .insert("children".to_string(), json!(children));
        }
        index
    }

    /// Emits the bone subtree of one armature; returns the root bone node
    /// indices. Bones keep armature order among siblings.
    fn emit_bones(&mut self, armature_handle: NodeHandle, armature: &Armature) -> Vec<usize> {
        let mut children_of: Vec<Vec<usize>> = vec![Vec::new(); armature.bones.len()];
        let mut roots = Vec::new();
        for (i, bone) in armature.bones.iter().enumerate() {
            match bone.parent {
                Some(p) => children_of[p].push(i),
                None => roots.push(i),
            }
        }

        let mut root_nodes = Vec::new();
        for &root in &roots {
            root_nodes.push(self.emit_bone(armature_handle, armature, &children_of, root));
        }
        root_nodes
    }

    fn emit_bone(
        &mut self,
        armature_handle: NodeHandle,
        armature: &Armature,
        children_of: &[Vec<usize>],
        bone_index: usize,
    ) -> usize {
        let bone = &armature.bones[bone_index];

        let mut json_node = Map::new();
        json_node.insert("name".to_string(), json!(bone.name));
        insert_transform(&mut json_node, &bone.local_matrix());

        let index = self.nodes.len();
        self.nodes.push(Value::Object(json_node));
        self.bone_nodes.insert((armature_handle, bone_index), index);

        let children: Vec<usize> = children_of[bone_index]
            .iter()
            .map(|&child| self.emit_bone(armature_handle, armature, children_of, child))
            .collect();
        if !children.is_empty() {
            self.nodes[index]
                .as_object_mut()
                .expect("node is an object")
                .insert("children".to_string(), json!(children));
        }
        index
    }

    // ========================================================================
    // Meshes & skins
    // ========================================================================

    fn emit_mesh_data(&mut self, handle: NodeHandle) {
        let Some(mesh) = self.scene.node_mesh(handle) else {
            return;
        };

        // An armature modifier only produces a skin when its target still
        // resolves to a live armature object.
        let target = mesh.armature_target().filter(|&t| {
            let live = self.scene.node_armature(t).is_some();
            if !live {
                log::warn!(
                    "Mesh '{}' has an armature modifier with no target; exporting unskinned",
                    mesh.name
                );
            }
            live
        });

        let skin_index = target.map(|t| self.get_or_emit_skin(t));
        let joint_remap = target.map(|t| self.group_to_bone_map(mesh, t));

        let primitives: Vec<Value> = mesh
            .primitives
            .iter()
            .map(|prim| self.emit_primitive(prim, joint_remap.as_deref()))
            .collect();

        let mesh_index = self.meshes.len();
        self.meshes.push(json!({
            "name": mesh.name,
            "primitives": primitives,
        }));

        let node_index = self.object_nodes[&handle];
        let node = self.nodes[node_index]
            .as_object_mut()
            .expect("node is an object");
        node.insert("mesh".to_string(), json!(mesh_index));
        if let Some(skin) = skin_index {
            node.insert("skin".to_string(), json!(skin));
        }
    }

    /// Maps the mesh's vertex-group indices onto bone indices of the target
    /// armature, by name. Groups naming no bone map to `None`; their weights
    /// are dropped at primitive emission.
    fn group_to_bone_map(&self, mesh: &Mesh, target: NodeHandle) -> Vec<Option<u16>> {
        let armature = self
            .scene
            .node_armature(target)
            .expect("target checked live");
        let map: Vec<Option<u16>> = mesh
            .vertex_groups
            .iter()
            .map(|name| armature.bone_index(name).map(|i| i as u16))
            .collect();

        let dropped: Vec<&str> = mesh
            .vertex_groups
            .iter()
            .zip(&map)
            .filter(|(_, m)| m.is_none())
            .map(|(name, _)| name.as_str())
            .collect();
        if !dropped.is_empty() {
            log::warn!(
                "Mesh '{}': {} vertex group(s) name no bone of '{}' and are dropped: {}",
                mesh.name,
                dropped.len(),
                armature.name,
                dropped.join(", ")
            );
        }
        map
    }

    fn emit_primitive(&mut self, prim: &Primitive, joint_remap: Option<&[Option<u16>]>) -> Value {
        let mut attributes = Map::new();

        let (min, max) = position_bounds(&prim.positions);
        let pos_accessor = self.push_accessor_vec3(&prim.positions, Some((min, max)));
        attributes.insert("POSITION".to_string(), json!(pos_accessor));

        if let Some(normals) = &prim.normals {
            let accessor = self.push_accessor_vec3(normals, None);
            attributes.insert("NORMAL".to_string(), json!(accessor));
        }
        if let Some(tex_coords) = &prim.tex_coords {
            let accessor = self.push_accessor_vec2(tex_coords);
            attributes.insert("TEXCOORD_0".to_string(), json!(accessor));
        }

        // Skin attributes go out only when the mesh ends up with a skin.
        if let (Some(remap), Some(joints), Some(weights)) =
            (joint_remap, &prim.joints, &prim.weights)
        {
            let (joints, weights) = remap_influences(joints, weights, remap);
            let j_accessor = self.push_accessor_u16x4(&joints);
            let w_accessor = self.push_accessor_vec4(&weights);
            attributes.insert("JOINTS_0".to_string(), json!(j_accessor));
            attributes.insert("WEIGHTS_0".to_string(), json!(w_accessor));
        }

        let mut out = Map::new();
        out.insert("attributes".to_string(), Value::Object(attributes));
        if let Some(indices) = &prim.indices {
            let accessor = self.push_accessor_indices(indices);
            out.insert("indices".to_string(), json!(accessor));
        }
        if let Some(material) = &prim.material {
            let index = self.push_material(material);
            out.insert("material".to_string(), json!(index));
        }
        Value::Object(out)
    }

    fn get_or_emit_skin(&mut self, armature_handle: NodeHandle) -> usize {
        if let Some(&index) = self.skin_for_armature.get(&armature_handle) {
            return index;
        }
        let armature = self
            .scene
            .node_armature(armature_handle)
            .expect("target checked live");

        let joints: Vec<usize> = (0..armature.bones.len())
            .map(|i| self.bone_nodes[&(armature_handle, i)])
            .collect();
        let ibms: Vec<Mat4> = armature
            .bones
            .iter()
            .map(|b| b.inverse_bind_matrix)
            .collect();
        let ibm_accessor = self.push_accessor_mat4(&ibms);

        let mut skin = Map::new();
        skin.insert("name".to_string(), json!(armature.name));
        skin.insert("joints".to_string(), json!(joints));
        skin.insert("inverseBindMatrices".to_string(), json!(ibm_accessor));
        if let Some(&root) = joints.first() {
            skin.insert("skeleton".to_string(), json!(root));
        }

        let index = self.skins.len();
        self.skins.push(Value::Object(skin));
        self.skin_for_armature.insert(armature_handle, index);
        index
    }

    fn push_material(&mut self, material: &Material) -> usize {
        if let Some(index) = self.materials.iter().position(|m| m == material) {
            return index;
        }
        self.materials.push(material.clone());
        self.materials.len() - 1
    }

    // ========================================================================
    // Buffer plumbing
    // ========================================================================

    fn push_view(&mut self, data: &[u8], target: Option<u32>) -> usize {
        // Accessor offsets must be 4-byte aligned within the buffer.
        while self.bin.len() % 4 != 0 {
            self.bin.push(0);
        }
        let offset = self.bin.len();
        self.bin.extend_from_slice(data);

        let mut view = Map::new();
        view.insert("buffer".to_string(), json!(0));
        view.insert("byteOffset".to_string(), json!(offset));
        view.insert("byteLength".to_string(), json!(data.len()));
        if let Some(target) = target {
            view.insert("target".to_string(), json!(target));
        }
        self.buffer_views.push(Value::Object(view));
        self.buffer_views.len() - 1
    }

    fn push_accessor(
        &mut self,
        view: usize,
        component_type: u32,
        type_name: &str,
        count: usize,
        bounds: Option<(Value, Value)>,
    ) -> usize {
        let mut accessor = Map::new();
        accessor.insert("bufferView".to_string(), json!(view));
        accessor.insert("componentType".to_string(), json!(component_type));
        accessor.insert("count".to_string(), json!(count));
        accessor.insert("type".to_string(), json!(type_name));
        if let Some((min, max)) = bounds {
            accessor.insert("min".to_string(), min);
            accessor.insert("max".to_string(), max);
        }
        self.accessors.push(Value::Object(accessor));
        self.accessors.len() - 1
    }

    fn push_accessor_vec3(
        &mut self,
        data: &[[f32; 3]],
        bounds: Option<([f32; 3], [f32; 3])>,
    ) -> usize {
        let bytes = f32_bytes(data.iter().flatten().copied());
        let view = self.push_view(&bytes, Some(TARGET_ARRAY_BUFFER));
        let bounds = bounds.map(|(min, max)| (json!(min), json!(max)));
        self.push_accessor(view, COMPONENT_F32, "VEC3", data.len(), bounds)
    }

    fn push_accessor_vec2(&mut self, data: &[[f32; 2]]) -> usize {
        let bytes = f32_bytes(data.iter().flatten().copied());
        let view = self.push_view(&bytes, Some(TARGET_ARRAY_BUFFER));
        self.push_accessor(view, COMPONENT_F32, "VEC2", data.len(), None)
    }

    fn push_accessor_vec4(&mut self, data: &[[f32; 4]]) -> usize {
        let bytes = f32_bytes(data.iter().flatten().copied());
        let view = self.push_view(&bytes, Some(TARGET_ARRAY_BUFFER));
        self.push_accessor(view, COMPONENT_F32, "VEC4", data.len(), None)
    }

    fn push_accessor_u16x4(&mut self, data: &[[u16; 4]]) -> usize {
        let mut bytes = Vec::with_capacity(data.len() * 8);
        for v in data.iter().flatten() {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let view = self.push_view(&bytes, Some(TARGET_ARRAY_BUFFER));
        self.push_accessor(view, COMPONENT_U16, "VEC4", data.len(), None)
    }

    fn push_accessor_indices(&mut self, data: &[u32]) -> usize {
        let mut bytes = Vec::with_capacity(data.len() * 4);
        for v in data {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let view = self.push_view(&bytes, Some(TARGET_ELEMENT_ARRAY_BUFFER));
        self.push_accessor(view, COMPONENT_U32, "SCALAR", data.len(), None)
    }

    fn push_accessor_mat4(&mut self, data: &[Mat4]) -> usize {
        let bytes = f32_bytes(data.iter().flat_map(|m| m.to_cols_array()));
        let view = self.push_view(&bytes, None);
        self.push_accessor(view, COMPONENT_F32, "MAT4", data.len(), None)
    }

    // ========================================================================
    // Assembly
    // ========================================================================

    fn assemble(&mut self) -> Value {
        let mut root = Map::new();
        root.insert(
            "asset".to_string(),
            json!({
                "version": "2.0",
                "generator": format!("kitbash {}", env!("CARGO_PKG_VERSION")),
            }),
        );
        root.insert("scene".to_string(), json!(0));
        let mut scene_obj = Map::new();
        scene_obj.insert("name".to_string(), json!("Scene"));
        if !self.scene_roots.is_empty() {
            scene_obj.insert("nodes".to_string(), json!(self.scene_roots));
        }
        root.insert("scenes".to_string(), json!([scene_obj]));
        if !self.nodes.is_empty() {
            root.insert("nodes".to_string(), json!(self.nodes));
        }
        if !self.meshes.is_empty() {
            root.insert("meshes".to_string(), json!(self.meshes));
        }
        if !self.skins.is_empty() {
            root.insert("skins".to_string(), json!(self.skins));
        }
        if !self.materials.is_empty() {
            let materials: Vec<Value> = self.materials.iter().map(material_json).collect();
            root.insert("materials".to_string(), json!(materials));
        }
        if !self.accessors.is_empty() {
            root.insert("accessors".to_string(), json!(self.accessors));
            root.insert("bufferViews".to_string(), json!(self.buffer_views));
            root.insert("buffers".to_string(), json!([{ "byteLength": self.bin.len() }]));
        }
        Value::Object(root)
    }
}

/// Writes `translation`/`rotation`/`scale` from a local matrix, omitting
/// identity components. Shear (possible only through a degenerate
/// parent-inverse) does not survive the TRS decomposition.
fn insert_transform(node: &mut Map<String, Value>, matrix: &Mat4) {
    let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
    if translation != glam::Vec3::ZERO {
        node.insert("translation".to_string(), json!(translation.to_array()));
    }
    if rotation != glam::Quat::IDENTITY {
        node.insert("rotation".to_string(), json!(rotation.to_array()));
    }
    if scale != glam::Vec3::ONE {
        node.insert("scale".to_string(), json!(scale.to_array()));
    }
}

fn material_json(material: &Material) -> Value {
    let mut out = Map::new();
    if let Some(name) = &material.name {
        out.insert("name".to_string(), json!(name));
    }
    out.insert(
        "pbrMetallicRoughness".to_string(),
        json!({
            "baseColorFactor": material.base_color.to_array(),
            "metallicFactor": material.metallic,
            "roughnessFactor": material.roughness,
        }),
    );
    if material.emissive != glam::Vec3::ZERO {
        out.insert("emissiveFactor".to_string(), json!(material.emissive.to_array()));
    }
    if material.double_sided {
        out.insert("doubleSided".to_string(), json!(true));
    }
    Value::Object(out)
}

fn position_bounds(positions: &[[f32; 3]]) -> ([f32; 3], [f32; 3]) {
    if positions.is_empty() {
        return ([0.0; 3], [0.0; 3]);
    }
    let mut min = [f32::INFINITY; 3];
    let mut max = [f32::NEG_INFINITY; 3];
    for p in positions {
        for axis in 0..3 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
    }
    (min, max)
}

/// Rewrites per-vertex influences from vertex-group indices to bone indices.
/// Influences on unmapped groups lose their weight; the remainder is
/// renormalized when anything survives.
fn remap_influences(
    joints: &[[u16; 4]],
    weights: &[[f32; 4]],
    remap: &[Option<u16>],
) -> (Vec<[u16; 4]>, Vec<[f32; 4]>) {
    let mut out_joints = Vec::with_capacity(joints.len());
    let mut out_weights = Vec::with_capacity(weights.len());

    for (j, w) in joints.iter().zip(weights) {
        let mut oj = [0u16; 4];
        let mut ow = [0f32; 4];
        for i in 0..4 {
            if w[i] <= 0.0 {
                continue;
            }
            match remap.get(j[i] as usize).copied().flatten() {
                Some(bone) => {
                    oj[i] = bone;
                    ow[i] = w[i];
                }
                None => {
                    // Group has no bone in the target armature.
                }
            }
        }
        let total: f32 = ow.iter().sum();
        if total > 0.0 {
            for v in &mut ow {
                *v /= total;
            }
        }
        out_joints.push(oj);
        out_weights.push(ow);
    }
    (out_joints, out_weights)
}

/// Packs the JSON document and binary payload into a GLB container.
pub(crate) fn write_glb(path: &Path, json: &Value, bin: &[u8]) -> Result<()> {
    let mut json_text = serde_json::to_vec(json)?;
    while json_text.len() % 4 != 0 {
        json_text.push(b' ');
    }
    let mut bin_chunk = bin.to_vec();
    while bin_chunk.len() % 4 != 0 {
        bin_chunk.push(0);
    }

    let has_bin = !bin_chunk.is_empty();
    let mut total = 12 + 8 + json_text.len();
    if has_bin {
        total += 8 + bin_chunk.len();
    }

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());

    out.extend_from_slice(&(json_text.len() as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    out.extend_from_slice(&json_text);

    if has_bin {
        out.extend_from_slice(&(bin_chunk.len() as u32).to_le_bytes());
        out.extend_from_slice(&CHUNK_BIN.to_le_bytes());
        out.extend_from_slice(&bin_chunk);
    }

    fs::write(path, out).map_err(|e| KitbashError::Export {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn f32_bytes(values: impl Iterator<Item = f32>) -> Vec<u8> {
    let mut bytes = Vec::new();
    for v in values {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remap_drops_and_renormalizes() {
        let joints = vec![[0u16, 1, 0, 0]];
        let weights = vec![[0.5f32, 0.5, 0.0, 0.0]];
        // Group 1 has no bone in the target.
        let remap = vec![Some(3), None];
        let (j, w) = remap_influences(&joints, &weights, &remap);
        assert_eq!(j, vec![[3, 0, 0, 0]]);
        assert!((w[0][0] - 1.0).abs() < 1e-6);
        assert_eq!(w[0][1], 0.0);
    }

    #[test]
    fn glb_chunks_are_aligned() {
        let dir = std::env::temp_dir().join("kitbash_glb_align_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("empty.glb");
        write_glb(&path, &json!({"asset": {"version": "2.0"}}), &[]).unwrap();
        let data = std::fs::read(&path).unwrap();
        assert_eq!(&data[0..4], b"glTF");
        assert_eq!(data.len() % 4, 0);
        let total = u32::from_le_bytes(data[8..12].try_into().unwrap()) as usize;
        assert_eq!(total, data.len());
    }
}
