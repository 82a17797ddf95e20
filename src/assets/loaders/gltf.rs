use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use glam::{Mat4, Quat, Vec3, Vec4};

use crate::errors::{KitbashError, Result};
use crate::resources::{Material, Mesh, Primitive};
use crate::scene::{Armature, Bone, NodeHandle, ParentKind, Scene};

/// What one import call created.
///
/// The orchestrators work from these lists directly; novelty is never
/// inferred by diffing scene snapshots.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Every object created by this import, in creation order.
    pub nodes: Vec<NodeHandle>,
    /// The mesh objects among them.
    pub meshes: Vec<NodeHandle>,
    /// The armature objects among them.
    pub armatures: Vec<NodeHandle>,
}

/// GLB (binary glTF 2.0) importer.
///
/// Joint nodes are consumed into armature bone tables and do not appear as
/// scene objects; a node carrying a skin yields a mesh object with vertex
/// groups named after the skin's joints, an armature modifier, and a deform
/// parent link to the armature object. Everything else becomes a plain
/// object preserving name, TRS and hierarchy.
pub struct GlbImporter<'a> {
    scene: &'a mut Scene,
    path: PathBuf,

    // glTF node index -> created object (non-joint nodes only)
    node_mapping: HashMap<usize, NodeHandle>,
    // glTF skin index -> armature object
    skin_armatures: Vec<NodeHandle>,
    // glTF node indices consumed as bones
    joint_nodes: HashSet<usize>,
    // joint node index -> armature object that owns it (first skin wins)
    joint_armatures: HashMap<usize, NodeHandle>,
    // glTF node index -> parent glTF node index
    parent_of: HashMap<usize, usize>,

    report: ImportReport,
}

impl<'a> GlbImporter<'a> {
    /// Imports `path` into `scene`, returning the created objects.
    pub fn import(path: &Path, scene: &'a mut Scene) -> Result<ImportReport> {
        let wrap = |reason: String| KitbashError::Import {
            path: path.to_path_buf(),
            reason,
        };

        let file = fs::File::open(path).map_err(|e| wrap(e.to_string()))?;
        let gltf = gltf::Gltf::from_reader_without_validation(BufReader::new(file))
            .map_err(|e| wrap(e.to_string()))?;

        let base_path = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        let buffers = Self::load_buffers(path, &gltf, &base_path)?;

        let mut importer = Self {
            scene,
            path: path.to_path_buf(),
            node_mapping: HashMap::new(),
            skin_armatures: Vec::with_capacity(gltf.skins().count()),
            joint_nodes: HashSet::new(),
            joint_armatures: HashMap::new(),
            parent_of: HashMap::new(),
            report: ImportReport::default(),
        };

        for node in gltf.nodes() {
            for child in node.children() {
                importer.parent_of.insert(child.index(), node.index());
            }
        }

        // Skins first: joint nodes must be known before objects are created.
        importer.load_armatures(&gltf, &buffers)?;
        importer.create_objects(&gltf, &buffers)?;
        importer.build_hierarchy(&gltf);
        importer.bind_skins(&gltf);

        log::debug!(
            "Imported {}: {} objects ({} meshes, {} armatures)",
            path.display(),
            importer.report.nodes.len(),
            importer.report.meshes.len(),
            importer.report.armatures.len(),
        );

        Ok(importer.report)
    }

    fn load_buffers(path: &Path, gltf: &gltf::Gltf, base_path: &Path) -> Result<Vec<Vec<u8>>> {
        let mut buffer_data = Vec::new();
        for buffer in gltf.buffers() {
            match buffer.source() {
                gltf::buffer::Source::Bin => {
                    if let Some(blob) = gltf.blob.as_deref() {
                        buffer_data.push(blob.to_vec());
                    } else {
                        return Err(KitbashError::Import {
                            path: path.to_path_buf(),
                            reason: "missing GLB binary chunk".to_string(),
                        });
                    }
                }
                gltf::buffer::Source::Uri(uri) => {
                    if uri.starts_with("data:") {
                        return Err(KitbashError::Unsupported {
                            path: path.to_path_buf(),
                            reason: "data-URI buffers are not carried; repack as GLB".to_string(),
                        });
                    }
                    let buffer_path = base_path.join(uri);
                    let data = fs::read(&buffer_path).map_err(|e| KitbashError::Import {
                        path: path.to_path_buf(),
                        reason: format!("failed to read buffer {}: {e}", buffer_path.display()),
                    })?;
                    buffer_data.push(data);
                }
            }
        }
        Ok(buffer_data)
    }

    // ========================================================================
    // Armatures
    // ========================================================================

    /// Builds one armature object per glTF skin. Bone order is the skin's
    /// joint order; a joint's parent is the nearest joint of the same skin
    /// above it in the node hierarchy.
    fn load_armatures(&mut self, gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Result<()> {
        for skin in gltf.skins() {
            let name = skin.name().unwrap_or("Armature");

            let joints: Vec<gltf::Node> = skin.joints().collect();
            let joint_positions: HashMap<usize, usize> = joints
                .iter()
                .enumerate()
                .map(|(i, n)| (n.index(), i))
                .collect();

            let reader = skin.reader(|buffer| Some(&buffers[buffer.index()]));
            let ibms: Vec<Mat4> = if let Some(iter) = reader.read_inverse_bind_matrices() {
                iter.map(|m| Mat4::from_cols_array_2d(&m)).collect()
            } else {
                vec![Mat4::IDENTITY; joints.len()]
            };
            if ibms.len() < joints.len() {
                return Err(KitbashError::Unsupported {
                    path: self.path.clone(),
                    reason: format!(
                        "skin '{name}' declares {} joints but {} inverse bind matrices",
                        joints.len(),
                        ibms.len()
                    ),
                });
            }

            let mut armature = Armature::new(name);
            for (i, joint) in joints.iter().enumerate() {
                let bone_name = joint
                    .name()
                    .map_or_else(|| format!("Bone_{}", joint.index()), str::to_string);

                let (t, r, s) = joint.transform().decomposed();
                let mut bone = Bone::new(&bone_name);
                bone.position = Vec3::from_array(t);
                bone.rotation = Quat::from_array(r);
                bone.scale = Vec3::from_array(s);
                bone.inverse_bind_matrix = ibms[i];
                bone.parent = self
                    .parent_of
                    .get(&joint.index())
                    .and_then(|p| joint_positions.get(p))
                    .copied();
                armature.bones.push(bone);

                self.joint_nodes.insert(joint.index());
            }

            let handle = self.scene.add_armature_object(armature);
            for joint in &joints {
                self.joint_armatures.entry(joint.index()).or_insert(handle);
            }
            self.skin_armatures.push(handle);
            self.report.nodes.push(handle);
            self.report.armatures.push(handle);
        }
        Ok(())
    }

    // ========================================================================
    // Objects
    // ========================================================================

    fn create_objects(&mut self, gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Result<()> {
        for node in gltf.nodes() {
            if self.joint_nodes.contains(&node.index()) {
                if node.mesh().is_some() {
                    log::warn!(
                        "Node '{}' is both a joint and a mesh carrier; the mesh is dropped",
                        node.name().unwrap_or("<unnamed>")
                    );
                }
                continue;
            }

            let node_name = node
                .name()
                .map_or_else(|| format!("Node_{}", node.index()), str::to_string);

            let handle = if let Some(gltf_mesh) = node.mesh() {
                let mesh = self.build_mesh(&node_name, &gltf_mesh, node.skin().as_ref(), buffers)?;
                let h = self.scene.add_mesh_object(mesh);
                self.report.meshes.push(h);
                h
            } else {
                self.scene.add_node(crate::scene::Node::new(&node_name))
            };

            if let Some(object) = self.scene.get_node_mut(handle) {
                let (t, r, s) = node.transform().decomposed();
                object.transform.position = Vec3::from_array(t);
                object.transform.rotation = Quat::from_array(r);
                object.transform.scale = Vec3::from_array(s);
            }

            self.node_mapping.insert(node.index(), handle);
            self.report.nodes.push(handle);
        }
        Ok(())
    }

    fn build_mesh(
        &self,
        node_name: &str,
        gltf_mesh: &gltf::Mesh,
        skin: Option<&gltf::Skin>,
        buffers: &[Vec<u8>],
    ) -> Result<Mesh> {
        let mut mesh = Mesh::new(gltf_mesh.name().unwrap_or(node_name));

        for primitive in gltf_mesh.primitives() {
            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

            let Some(positions) = reader.read_positions() else {
                return Err(KitbashError::Unsupported {
                    path: self.path.clone(),
                    reason: format!("mesh '{}' has a primitive without positions", mesh.name),
                });
            };

            let mut prim = Primitive {
                positions: positions.collect(),
                ..Primitive::default()
            };
            prim.normals = reader.read_normals().map(Iterator::collect);
            prim.tex_coords = reader.read_tex_coords(0).map(|tc| tc.into_f32().collect());
            prim.indices = reader.read_indices().map(|i| i.into_u32().collect());
            prim.joints = reader.read_joints(0).map(|j| j.into_u16().collect());
            prim.weights = reader.read_weights(0).map(|w| w.into_f32().collect());
            prim.material = Self::build_material(&primitive.material());

            mesh.primitives.push(prim);
        }

        // The skin's joint names become the vertex-group list, in joint
        // order, so per-vertex joint indices stay valid group indices.
        if let Some(skin) = skin {
            mesh.vertex_groups = skin
                .joints()
                .map(|j| {
                    j.name()
                        .map_or_else(|| format!("Bone_{}", j.index()), str::to_string)
                })
                .collect();
        }

        Ok(mesh)
    }

    fn build_material(material: &gltf::Material) -> Option<Material> {
        // The default material carries no index; nothing to record.
        material.index()?;

        let pbr = material.pbr_metallic_roughness();
        Some(Material {
            name: material.name().map(str::to_string),
            base_color: Vec4::from_array(pbr.base_color_factor()),
            metallic: pbr.metallic_factor(),
            roughness: pbr.roughness_factor(),
            emissive: Vec3::from_array(material.emissive_factor()),
            double_sided: material.double_sided(),
        })
    }

    // ========================================================================
    // Hierarchy & skin binding
    // ========================================================================

    fn build_hierarchy(&mut self, gltf: &gltf::Gltf) {
        for node in gltf.nodes() {
            let Some(&parent_handle) = self.node_mapping.get(&node.index()) else {
                continue;
            };
            for child in node.children() {
                if let Some(&child_handle) = self.node_mapping.get(&child.index()) {
                    self.scene
                        .attach(child_handle, parent_handle, ParentKind::Object);
                }
            }
        }

        // Objects whose glTF parent was consumed as a joint hang from the
        // armature that owns the joint.
        for node in gltf.nodes() {
            let Some(&handle) = self.node_mapping.get(&node.index()) else {
                continue;
            };
            let Some(&parent_index) = self.parent_of.get(&node.index()) else {
                continue;
            };
            if !self.joint_nodes.contains(&parent_index) {
                continue;
            }
            if let Some(&armature) = self.joint_armatures.get(&parent_index) {
                log::debug!(
                    "Object '{}' was parented to a joint; attaching to its armature",
                    self.scene.name(handle).unwrap_or("<unnamed>")
                );
                self.scene.attach(handle, armature, ParentKind::Object);
            }
        }
    }

    fn bind_skins(&mut self, gltf: &gltf::Gltf) {
        for node in gltf.nodes() {
            let Some(skin) = node.skin() else {
                continue;
            };
            let Some(&mesh_handle) = self.node_mapping.get(&node.index()) else {
                continue;
            };
            let armature_handle = self.skin_armatures[skin.index()];

            if let Some(mesh) = self.scene.node_mesh_mut(mesh_handle) {
                mesh.add_armature_modifier(armature_handle);
            }
            self.scene
                .attach(mesh_handle, armature_handle, ParentKind::Armature);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::ObjectKind;

    #[test]
    fn import_report_default_is_empty() {
        let report = ImportReport::default();
        assert!(report.nodes.is_empty());
        assert!(report.meshes.is_empty());
        assert!(report.armatures.is_empty());
    }

    #[test]
    fn kind_tags_round_trip() {
        let mut scene = Scene::new();
        let mesh = scene.add_mesh_object(Mesh::new("M"));
        let arm = scene.add_armature_object(Armature::new("A"));
        assert!(matches!(
            scene.get_node(mesh).unwrap().kind,
            ObjectKind::Mesh(_)
        ));
        assert!(matches!(
            scene.get_node(arm).unwrap().kind,
            ObjectKind::Armature(_)
        ));
    }
}
