pub mod angle;
pub mod keypoint;

pub use angle::joint_angle;
pub use keypoint::{Keypoint, Landmark, Pose, PoseModel, DEFAULT_SCORE_THRESHOLD};
