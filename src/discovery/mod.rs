pub mod camera;
pub mod locator;

pub use camera::{CameraSearch, CameraSearchCompleted, CameraSearchOutcome, OverrideCamera};
pub use locator::{Located, LocateStrategy, locate};
