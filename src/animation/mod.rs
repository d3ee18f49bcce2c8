pub mod anim_instance;
pub mod montage;

pub use anim_instance::{AnimInstance, AnimPose};
pub use montage::{
    MontageAsset, MontageEndReason, MontageLibrary, MontageNotify, MontagePlayable, MontagePlayback,
    PlaybackState, TagWindow, TimelineEvent, PRIMARY_STEP_MONTAGES, SECONDARY_MONTAGE,
};
