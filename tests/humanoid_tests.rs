//! Humanoid Auto-Assignment Tests
//!
//! Tests for:
//! - Name normalization across rig conventions (Mixamo, Blender suffixes)
//! - Required bone coverage and partial results
//! - First-match-wins on ambiguous rigs

use kitbash::scene::{Armature, Bone};
use kitbash::vrm::{HumanBone, auto_assign};

fn armature_named(names: &[&str]) -> Armature {
    let mut armature = Armature::new("Armature");
    for name in names {
        armature.bones.push(Bone::new(name));
    }
    armature
}

const MIXAMO_REQUIRED: &[&str] = &[
    "mixamorig:Hips",
    "mixamorig:Spine",
    "mixamorig:Spine1",
    "mixamorig:Neck",
    "mixamorig:Head",
    "mixamorig:LeftArm",
    "mixamorig:LeftForeArm",
    "mixamorig:LeftHand",
    "mixamorig:RightArm",
    "mixamorig:RightForeArm",
    "mixamorig:RightHand",
    "mixamorig:LeftUpLeg",
    "mixamorig:LeftLeg",
    "mixamorig:LeftFoot",
    "mixamorig:RightUpLeg",
    "mixamorig:RightLeg",
    "mixamorig:RightFoot",
];

// ============================================================================
// Convention coverage
// ============================================================================

#[test]
fn mixamo_rig_assigns_all_required_bones() {
    let armature = armature_named(MIXAMO_REQUIRED);
    let map = auto_assign(&armature);
    assert!(
        map.is_complete(),
        "missing: {:?}",
        map.missing_required()
    );
    assert_eq!(map.get(HumanBone::Hips), Some("mixamorig:Hips"));
    assert_eq!(map.get(HumanBone::Chest), Some("mixamorig:Spine1"));
    assert_eq!(map.get(HumanBone::LeftLowerLeg), Some("mixamorig:LeftLeg"));
}

#[test]
fn blender_style_suffixes_are_recognized() {
    let armature = armature_named(&[
        "hips",
        "spine",
        "chest",
        "neck",
        "head",
        "upper_arm.L",
        "forearm.L",
        "hand.L",
        "upper_arm.R",
        "forearm.R",
        "hand.R",
        "thigh.L",
        "shin.L",
        "foot.L",
        "thigh.R",
        "shin.R",
        "foot.R",
    ]);
    let map = auto_assign(&armature);
    assert!(
        map.is_complete(),
        "missing: {:?}",
        map.missing_required()
    );
    assert_eq!(map.get(HumanBone::RightUpperLeg), Some("thigh.R"));
    assert_eq!(map.get(HumanBone::LeftLowerArm), Some("forearm.L"));
}

#[test]
fn optional_bones_are_assigned_when_present() {
    let armature = armature_named(&[
        "mixamorig:LeftShoulder",
        "mixamorig:LeftToeBase",
        "mixamorig:RightHandIndex2",
        "mixamorig:Spine2",
    ]);
    let map = auto_assign(&armature);
    assert_eq!(
        map.get(HumanBone::LeftShoulder),
        Some("mixamorig:LeftShoulder")
    );
    assert_eq!(map.get(HumanBone::LeftToes), Some("mixamorig:LeftToeBase"));
    assert_eq!(
        map.get(HumanBone::RightIndexIntermediate),
        Some("mixamorig:RightHandIndex2")
    );
    assert_eq!(map.get(HumanBone::UpperChest), Some("mixamorig:Spine2"));
}

// ============================================================================
// Partial & ambiguous rigs
// ============================================================================

#[test]
fn unmatchable_rig_yields_partial_map() {
    let armature = armature_named(&["Root", "IK_target", "ctrl_spine_01"]);
    let map = auto_assign(&armature);
    assert!(!map.is_complete());
    assert!(map.is_empty());
    assert_eq!(map.missing_required().len(), 17);
}

#[test]
fn first_matching_bone_wins() {
    let armature = armature_named(&["Hips", "pelvis"]);
    let map = auto_assign(&armature);
    assert_eq!(map.get(HumanBone::Hips), Some("Hips"));
}

#[test]
fn sided_bone_without_marker_stays_unassigned() {
    let armature = armature_named(&["hand", "foot"]);
    let map = auto_assign(&armature);
    assert!(map.get(HumanBone::LeftHand).is_none());
    assert!(map.get(HumanBone::RightFoot).is_none());
}
