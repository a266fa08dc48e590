//! Domain value objects.

mod attached_asset;
mod frame_refs;
mod model;
mod reference_image;
mod reference_mode;

pub use attached_asset::{AssetRole, AttachedAsset};
pub use frame_refs::{FrameRef, FrameRefs};
pub use model::{ModelId, VendorFamily};
pub use reference_image::{ImageData, ReferenceImage, ReferenceSource, ResolvedReferences};
pub use reference_mode::ReferenceMode;
