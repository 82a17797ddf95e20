#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod assets;
pub mod errors;
pub mod pipeline;
pub mod resources;
pub mod scene;
pub mod vrm;

pub use assets::{GlbExporter, GlbImporter, ImportReport, VrmExporter};
pub use errors::{KitbashError, Result};
pub use pipeline::{ConvertReport, MergeReport, convert_file, merge_files};
pub use resources::{Material, Mesh, Modifier, Primitive};
pub use scene::{Armature, Bone, Node, ObjectKind, ParentKind, Scene, Transform};
pub use vrm::{HumanBone, HumanoidMap, SpecVersion, VrmExtension};
