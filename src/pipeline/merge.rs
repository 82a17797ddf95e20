//! Merge orchestrator.
//!
//! Loads a base scene, imports additional files one by one, migrates their
//! meshes onto the base skeleton and discards the now-redundant skeletons,
//! then writes one combined file.

use std::path::{Path, PathBuf};

use crate::assets::{GlbExporter, GlbImporter};
use crate::errors::{KitbashError, Result};
use crate::scene::{NodeHandle, ParentKind, Scene};

/// Counts from one completed merge.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeReport {
    /// Meshes that came from the base file.
    pub base_meshes: usize,
    /// Meshes contributed by the additional files.
    pub added_meshes: usize,
    /// Added meshes that were bound to the base armature.
    pub bound_meshes: usize,
    /// Added meshes without vertex groups, left unbound.
    pub skipped_meshes: usize,
    /// Armatures removed from additional files.
    pub removed_armatures: usize,
}

/// Merges `additional` onto the skeleton of `base` and writes `output`.
///
/// Additional files are processed strictly in the given order; later files
/// never affect earlier bindings. Any failure aborts the whole run.
pub fn merge_files(
    scene: &mut Scene,
    base: &Path,
    additional: &[PathBuf],
    output: &Path,
) -> Result<MergeReport> {
    scene.clear();

    log::info!("Importing base file: {}", base.display());
    let base_report = GlbImporter::import(base, scene)?;

    // Without a skeleton to bind onto, the rest of the procedure has no
    // meaning; abort before any additional file is touched.
    let base_armature = base_report
        .armatures
        .first()
        .copied()
        .ok_or_else(|| KitbashError::MissingArmature {
            path: base.to_path_buf(),
        })?;
    log::info!(
        "Base armature: {}",
        scene.name(base_armature).unwrap_or("<unnamed>")
    );

    let mut report = MergeReport {
        base_meshes: base_report.meshes.len(),
        ..MergeReport::default()
    };
    log::info!("Base has {} meshes", report.base_meshes);

    for (i, path) in additional.iter().enumerate() {
        log::info!(
            "Importing additional file {}/{}: {}",
            i + 1,
            additional.len(),
            path.display()
        );
        let imported = GlbImporter::import(path, scene)?;
        log::info!(
            "  Found {} new meshes, {} new armatures",
            imported.meshes.len(),
            imported.armatures.len()
        );

        // The deletion below assumes bone-name compatibility with the base
        // skeleton; surface the bones that would mis-bind instead of staying
        // silent about them.
        for &armature_handle in &imported.armatures {
            warn_on_bone_mismatch(scene, base_armature, armature_handle);
        }

        for &mesh_handle in &imported.meshes {
            let name = scene.name(mesh_handle).unwrap_or("<unnamed>").to_string();
            log::info!("  Processing mesh: {name}");

            scene.detach(mesh_handle);
            if let Some(node) = scene.get_node_mut(mesh_handle) {
                node.transform.reset_parent_inverse();
            }

            let Some(mesh) = scene.node_mesh_mut(mesh_handle) else {
                continue;
            };
            let removed = mesh.remove_armature_modifiers();
            if removed > 0 {
                log::debug!("    Removed {removed} old armature modifier(s)");
            }

            if mesh.has_vertex_groups() {
                log::debug!(
                    "    Binding to base armature ({} vertex groups)",
                    mesh.vertex_groups.len()
                );
                mesh.add_armature_modifier(base_armature);
                scene.attach(mesh_handle, base_armature, ParentKind::Armature);
                report.bound_meshes += 1;
            } else {
                log::warn!("    Mesh '{name}' has no vertex groups, skipping armature binding");
                report.skipped_meshes += 1;
            }
            report.added_meshes += 1;
        }

        // Reparent-then-delete: every mesh above is already off this
        // skeleton by the time it goes away.
        for &armature_handle in &imported.armatures {
            log::info!(
                "  Removing redundant armature: {}",
                scene.name(armature_handle).unwrap_or("<unnamed>")
            );
            scene.remove_node(armature_handle);
            report.removed_armatures += 1;
        }
    }

    let final_meshes = scene.mesh_count();
    log::info!(
        "Final scene has {} meshes (base: {}, added: {})",
        final_meshes,
        report.base_meshes,
        final_meshes - report.base_meshes
    );
    log_final_meshes(scene);

    log::info!("Exporting merged file to: {}", output.display());
    GlbExporter::export(scene, output)?;

    Ok(report)
}

/// Logs bones of `other` that the base armature does not have.
fn warn_on_bone_mismatch(scene: &Scene, base_armature: NodeHandle, other: NodeHandle) {
    let (Some(base), Some(incoming)) = (
        scene.node_armature(base_armature),
        scene.node_armature(other),
    ) else {
        return;
    };
    let missing = incoming.bones_missing_from(base);
    if !missing.is_empty() {
        log::warn!(
            "  Armature '{}' has {} bone(s) with no counterpart in '{}': {} \
             (meshes weighted to them will not deform)",
            incoming.name,
            missing.len(),
            base.name,
            missing.join(", ")
        );
    }
}

fn log_final_meshes(scene: &Scene) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    log::debug!("Final mesh list:");
    for handle in scene.mesh_objects() {
        let Some(node) = scene.get_node(handle) else {
            continue;
        };
        let Some(mesh) = scene.node_mesh(handle) else {
            continue;
        };
        let parent = node
            .parent()
            .and_then(|link| scene.name(link.node))
            .map_or_else(|| "no parent".to_string(), |n| format!("parent: {n}"));
        log::debug!(
            "  - {} ({}, mods: {}, vgroups: {})",
            node.name,
            parent,
            mesh.modifiers.len(),
            mesh.vertex_groups.len()
        );
    }
}
