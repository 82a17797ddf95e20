//! Convert orchestrator.
//!
//! Imports one avatar file, tags the VRM spec version on its armature, runs
//! humanoid auto-assignment, and writes a VRM file. Everything past the
//! import is best-effort: a rig the assigner cannot fully resolve is logged
//! and exported with a partial humanoid table.

use std::path::Path;

use crate::assets::{GlbImporter, VrmExporter};
use crate::errors::Result;
use crate::scene::Scene;
use crate::vrm::{self, HumanoidMap, SpecVersion};

/// Counts from one completed conversion.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertReport {
    pub meshes: usize,
    pub bones: usize,
    pub humanoid_assigned: usize,
    pub humanoid_complete: bool,
}

/// Converts `input` to VRM at `output`.
pub fn convert_file(scene: &mut Scene, input: &Path, output: &Path) -> Result<ConvertReport> {
    scene.clear();

    log::info!("Importing file: {}", input.display());
    let imported = GlbImporter::import(input, scene)?;

    let mut report = ConvertReport {
        meshes: imported.meshes.len(),
        ..ConvertReport::default()
    };
    let mut humanoid = HumanoidMap::new();

    if let Some(armature_handle) = imported.armatures.first().copied() {
        log::info!(
            "Found armature: {}",
            scene.name(armature_handle).unwrap_or("<unnamed>")
        );

        if let Some(armature) = scene.node_armature_mut(armature_handle) {
            armature.vrm_spec_version = Some(SpecVersion::V0);
            log::info!("Set VRM spec version to {}", SpecVersion::V0.as_str());
        }

        if let Some(armature) = scene.node_armature(armature_handle) {
            report.bones = armature.bone_count();
            humanoid = vrm::auto_assign(armature);
            report.humanoid_assigned = humanoid.len();
            report.humanoid_complete = humanoid.is_complete();

            if report.humanoid_complete {
                log::info!("Assigned {} humanoid bones", humanoid.len());
            } else {
                let missing: Vec<&str> = humanoid
                    .missing_required()
                    .into_iter()
                    .map(vrm::HumanBone::vrm_name)
                    .collect();
                log::warn!(
                    "Could not assign all required humanoid bones (missing: {}); \
                     exporting anyway",
                    missing.join(", ")
                );
            }
        }
    } else {
        log::warn!("No armature found in the scene; exporting without humanoid data");
    }

    log::info!("Exporting VRM to: {}", output.display());
    VrmExporter::export(scene, output, &humanoid)?;

    Ok(report)
}
