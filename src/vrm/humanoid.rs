//! Humanoid bone set and automatic assignment.
//!
//! VRM requires a mapping from the avatar's armature to a standardized
//! humanoid bone naming scheme. Rigs in the wild follow a handful of naming
//! conventions (`mixamorig:LeftUpLeg`, `upper_arm.L`, `Thigh_R`, ...); the
//! assigner normalizes bone names and matches them against synonym tables.
//! A partial result is reported to the caller, never raised as an error.

use crate::scene::Armature;

/// The VRM 0.x humanoid bone set.
///
/// Variants carry no data; [`HumanBone::vrm_name`] yields the exact JSON
/// name used in the `VRM` extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HumanBone {
    Hips,
    Spine,
    Chest,
    UpperChest,
    Neck,
    Head,
    Jaw,
    LeftEye,
    RightEye,
    LeftShoulder,
    RightShoulder,
    LeftUpperArm,
    RightUpperArm,
    LeftLowerArm,
    RightLowerArm,
    LeftHand,
    RightHand,
    LeftUpperLeg,
    RightUpperLeg,
    LeftLowerLeg,
    RightLowerLeg,
    LeftFoot,
    RightFoot,
    LeftToes,
    RightToes,
    LeftThumbProximal,
    LeftThumbIntermediate,
    LeftThumbDistal,
    LeftIndexProximal,
    LeftIndexIntermediate,
    LeftIndexDistal,
    LeftMiddleProximal,
    LeftMiddleIntermediate,
    LeftMiddleDistal,
    LeftRingProximal,
    LeftRingIntermediate,
    LeftRingDistal,
    LeftLittleProximal,
    LeftLittleIntermediate,
    LeftLittleDistal,
    RightThumbProximal,
    RightThumbIntermediate,
    RightThumbDistal,
    RightIndexProximal,
    RightIndexIntermediate,
    RightIndexDistal,
    RightMiddleProximal,
    RightMiddleIntermediate,
    RightMiddleDistal,
    RightRingProximal,
    RightRingIntermediate,
    RightRingDistal,
    RightLittleProximal,
    RightLittleIntermediate,
    RightLittleDistal,
}

/// Bones the VRM 0.x specification marks as required.
pub const REQUIRED_BONES: &[HumanBone] = &[
    HumanBone::Hips,
    HumanBone::Spine,
    HumanBone::Chest,
    HumanBone::Neck,
    HumanBone::Head,
    HumanBone::LeftUpperArm,
    HumanBone::LeftLowerArm,
    HumanBone::LeftHand,
    HumanBone::RightUpperArm,
    HumanBone::RightLowerArm,
    HumanBone::RightHand,
    HumanBone::LeftUpperLeg,
    HumanBone::LeftLowerLeg,
    HumanBone::LeftFoot,
    HumanBone::RightUpperLeg,
    HumanBone::RightLowerLeg,
    HumanBone::RightFoot,
];

impl HumanBone {
    /// The JSON bone name of the `VRM` extension.
    #[must_use]
    pub fn vrm_name(self) -> &'static str {
        match self {
            HumanBone::Hips => "hips",
            HumanBone::Spine => "spine",
            HumanBone::Chest => "chest",
            HumanBone::UpperChest => "upperChest",
            HumanBone::Neck => "neck",
            HumanBone::Head => "head",
            HumanBone::Jaw => "jaw",
            HumanBone::LeftEye => "leftEye",
            HumanBone::RightEye => "rightEye",
            HumanBone::LeftShoulder => "leftShoulder",
            HumanBone::RightShoulder => "rightShoulder",
            HumanBone::LeftUpperArm => "leftUpperArm",
            HumanBone::RightUpperArm => "rightUpperArm",
            HumanBone::LeftLowerArm => "leftLowerArm",
            HumanBone::RightLowerArm => "rightLowerArm",
            HumanBone::LeftHand => "leftHand",
            HumanBone::RightHand => "rightHand",
            HumanBone::LeftUpperLeg => "leftUpperLeg",
            HumanBone::RightUpperLeg => "rightUpperLeg",
            HumanBone::LeftLowerLeg => "leftLowerLeg",
            HumanBone::RightLowerLeg => "rightLowerLeg",
            HumanBone::LeftFoot => "leftFoot",
            HumanBone::RightFoot => "rightFoot",
            HumanBone::LeftToes => "leftToes",
            HumanBone::RightToes => "rightToes",
            HumanBone::LeftThumbProximal => "leftThumbProximal",
            HumanBone::LeftThumbIntermediate => "leftThumbIntermediate",
            HumanBone::LeftThumbDistal => "leftThumbDistal",
            HumanBone::LeftIndexProximal => "leftIndexProximal",
            HumanBone::LeftIndexIntermediate => "leftIndexIntermediate",
            HumanBone::LeftIndexDistal => "leftIndexDistal",
            HumanBone::LeftMiddleProximal => "leftMiddleProximal",
            HumanBone::LeftMiddleIntermediate => "leftMiddleIntermediate",
            HumanBone::LeftMiddleDistal => "leftMiddleDistal",
            HumanBone::LeftRingProximal => "leftRingProximal",
            HumanBone::LeftRingIntermediate => "leftRingIntermediate",
            HumanBone::LeftRingDistal => "leftRingDistal",
            HumanBone::LeftLittleProximal => "leftLittleProximal",
            HumanBone::LeftLittleIntermediate => "leftLittleIntermediate",
            HumanBone::LeftLittleDistal => "leftLittleDistal",
            HumanBone::RightThumbProximal => "rightThumbProximal",
            HumanBone::RightThumbIntermediate => "rightThumbIntermediate",
            HumanBone::RightThumbDistal => "rightThumbDistal",
            HumanBone::RightIndexProximal => "rightIndexProximal",
            HumanBone::RightIndexIntermediate => "rightIndexIntermediate",
            HumanBone::RightIndexDistal => "rightIndexDistal",
            HumanBone::RightMiddleProximal => "rightMiddleProximal",
            HumanBone::RightMiddleIntermediate => "rightMiddleIntermediate",
            HumanBone::RightMiddleDistal => "rightMiddleDistal",
            HumanBone::RightRingProximal => "rightRingProximal",
            HumanBone::RightRingIntermediate => "rightRingIntermediate",
            HumanBone::RightRingDistal => "rightRingDistal",
            HumanBone::RightLittleProximal => "rightLittleProximal",
            HumanBone::RightLittleIntermediate => "rightLittleIntermediate",
            HumanBone::RightLittleDistal => "rightLittleDistal",
        }
    }

    /// Whether the VRM specification requires this bone.
    #[must_use]
    pub fn is_required(self) -> bool {
        REQUIRED_BONES.contains(&self)
    }
}

/// Assignment from humanoid bone slots to named bones of one armature.
#[derive(Debug, Clone, Default)]
pub struct HumanoidMap {
    entries: Vec<(HumanBone, String)>,
}

impl HumanoidMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an assignment. The first assignment for a slot wins.
    pub fn assign(&mut self, slot: HumanBone, bone_name: &str) {
        if self.get(slot).is_none() {
            self.entries.push((slot, bone_name.to_string()));
        }
    }

    #[must_use]
    pub fn get(&self, slot: HumanBone) -> Option<&str> {
        self.entries
            .iter()
            .find(|(b, _)| *b == slot)
            .map(|(_, name)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (HumanBone, &str)> {
        self.entries.iter().map(|(b, n)| (*b, n.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Required bones with no assignment.
    #[must_use]
    pub fn missing_required(&self) -> Vec<HumanBone> {
        REQUIRED_BONES
            .iter()
            .copied()
            .filter(|&b| self.get(b).is_none())
            .collect()
    }

    /// Whether every required bone is assigned.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_required().is_empty()
    }
}

/// Which side of the body a bone name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Assigns humanoid bone slots to the armature's bones by name heuristics.
///
/// Bone order follows the armature, so when two bones both match a slot
/// (duplicated names after a merge, mirrored rigs without side markers) the
/// first one wins.
#[must_use]
pub fn auto_assign(armature: &Armature) -> HumanoidMap {
    let mut map = HumanoidMap::new();
    for bone in &armature.bones {
        let (core, side) = normalize(&bone.name);
        if let Some(slot) = match_core(&core, side) {
            map.assign(slot, &bone.name);
        }
    }
    map
}

/// Strips rig namespaces and separators and extracts the side marker.
///
/// `mixamorig:LeftUpLeg` becomes `("upleg", Some(Left))`;
/// `upper_arm.R` becomes `("upperarm", Some(Right))`.
fn normalize(name: &str) -> (String, Option<Side>) {
    // Namespace prefixes end with ':' (Mixamo, Maya rigs).
    let name = name.rsplit(':').next().unwrap_or(name);
    let lower = name.to_ascii_lowercase();

    let mut side = None;
    let mut core = lower.as_str();

    // Suffix markers first: ".l", "_l", "-l", ".left", "_left", ...
    for (marker, s) in [
        (".left", Side::Left),
        ("_left", Side::Left),
        ("-left", Side::Left),
        (".right", Side::Right),
        ("_right", Side::Right),
        ("-right", Side::Right),
        (".l", Side::Left),
        ("_l", Side::Left),
        ("-l", Side::Left),
        (".r", Side::Right),
        ("_r", Side::Right),
        ("-r", Side::Right),
    ] {
        if let Some(stripped) = core.strip_suffix(marker) {
            core = stripped;
            side = Some(s);
            break;
        }
    }

    // Prefix markers: "left", "right", "l_", "r_".
    if side.is_none() {
        for (marker, s) in [
            ("left", Side::Left),
            ("right", Side::Right),
            ("l_", Side::Left),
            ("r_", Side::Right),
        ] {
            if let Some(stripped) = core.strip_prefix(marker) {
                core = stripped;
                side = Some(s);
                break;
            }
        }
    }

    let core: String = core
        .chars()
        .filter(|c| !matches!(c, '.' | '_' | '-' | ' '))
        .collect();
    (core, side)
}

/// Picks a side-specific variant.
fn sided(side: Option<Side>, left: HumanBone, right: HumanBone) -> Option<HumanBone> {
    match side? {
        Side::Left => Some(left),
        Side::Right => Some(right),
    }
}

/// Matches a normalized core name against the synonym tables.
fn match_core(core: &str, side: Option<Side>) -> Option<HumanBone> {
    use HumanBone as H;

    if let Some(slot) = match_finger(core, side) {
        return Some(slot);
    }

    match core {
        "hips" | "hip" | "pelvis" => Some(H::Hips),
        // Mixamo counts Spine, Spine1, Spine2 upward from the hips.
        "spine" => Some(H::Spine),
        "spine1" | "chest" => Some(H::Chest),
        "spine2" | "upperchest" => Some(H::UpperChest),
        "neck" => Some(H::Neck),
        "head" => Some(H::Head),
        "jaw" => Some(H::Jaw),
        "eye" => sided(side, H::LeftEye, H::RightEye),
        "shoulder" | "clavicle" => sided(side, H::LeftShoulder, H::RightShoulder),
        "upperarm" | "uparm" | "arm" => sided(side, H::LeftUpperArm, H::RightUpperArm),
        "lowerarm" | "forearm" | "elbow" => sided(side, H::LeftLowerArm, H::RightLowerArm),
        "hand" | "wrist" => sided(side, H::LeftHand, H::RightHand),
        "upperleg" | "upleg" | "thigh" => sided(side, H::LeftUpperLeg, H::RightUpperLeg),
        "lowerleg" | "leg" | "shin" | "calf" | "knee" => {
            sided(side, H::LeftLowerLeg, H::RightLowerLeg)
        }
        "foot" | "ankle" => sided(side, H::LeftFoot, H::RightFoot),
        "toes" | "toe" | "toebase" => sided(side, H::LeftToes, H::RightToes),
        _ => None,
    }
}

/// Matches finger chains: `handthumb1`, `indexintermediate`, `pinky3`, ...
fn match_finger(core: &str, side: Option<Side>) -> Option<HumanBone> {
    use HumanBone as H;

    // Mixamo finger bones are "HandThumb1" etc.; the hand prefix is noise.
    let core = core.strip_prefix("hand").unwrap_or(core);

    let (finger, rest) = ["thumb", "index", "middle", "ring", "little", "pinky"]
        .iter()
        .find_map(|f| core.strip_prefix(f).map(|rest| (*f, rest)))?;

    // Chain position: an explicit word or a 1-based digit.
    let position = match rest {
        "proximal" | "1" => 0,
        "intermediate" | "2" => 1,
        "distal" | "3" => 2,
        _ => return None,
    };

    let chain: [[H; 3]; 2] = match finger {
        "thumb" => [
            [H::LeftThumbProximal, H::LeftThumbIntermediate, H::LeftThumbDistal],
            [H::RightThumbProximal, H::RightThumbIntermediate, H::RightThumbDistal],
        ],
        "index" => [
            [H::LeftIndexProximal, H::LeftIndexIntermediate, H::LeftIndexDistal],
            [H::RightIndexProximal, H::RightIndexIntermediate, H::RightIndexDistal],
        ],
        "middle" => [
            [H::LeftMiddleProximal, H::LeftMiddleIntermediate, H::LeftMiddleDistal],
            [H::RightMiddleProximal, H::RightMiddleIntermediate, H::RightMiddleDistal],
        ],
        "ring" => [
            [H::LeftRingProximal, H::LeftRingIntermediate, H::LeftRingDistal],
            [H::RightRingProximal, H::RightRingIntermediate, H::RightRingDistal],
        ],
        "little" | "pinky" => [
            [H::LeftLittleProximal, H::LeftLittleIntermediate, H::LeftLittleDistal],
            [H::RightLittleProximal, H::RightLittleIntermediate, H::RightLittleDistal],
        ],
        _ => return None,
    };

    match side? {
        Side::Left => Some(chain[0][position]),
        Side::Right => Some(chain[1][position]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_mixamo_namespace() {
        let (core, side) = normalize("mixamorig:LeftUpLeg");
        assert_eq!(core, "upleg");
        assert_eq!(side, Some(Side::Left));
    }

    #[test]
    fn normalize_handles_blender_suffixes() {
        let (core, side) = normalize("upper_arm.R");
        assert_eq!(core, "upperarm");
        assert_eq!(side, Some(Side::Right));
    }

    #[test]
    fn match_spine_chain() {
        assert_eq!(match_core("spine", None), Some(HumanBone::Spine));
        assert_eq!(match_core("spine1", None), Some(HumanBone::Chest));
        assert_eq!(match_core("spine2", None), Some(HumanBone::UpperChest));
    }

    #[test]
    fn match_fingers_by_digit_and_word() {
        let (core, side) = normalize("mixamorig:RightHandThumb1");
        assert_eq!(
            match_core(&core, side),
            Some(HumanBone::RightThumbProximal)
        );
        let (core, side) = normalize("index_distal.L");
        assert_eq!(match_core(&core, side), Some(HumanBone::LeftIndexDistal));
    }

    #[test]
    fn sided_bone_without_marker_is_unmatched() {
        assert_eq!(match_core("hand", None), None);
    }
}
