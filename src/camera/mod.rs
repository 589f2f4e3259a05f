pub mod probe;
pub mod rig;

pub use probe::{CollisionProbe, NoCollision, PhysicsProbe};
pub use rig::{CameraPose, OrbitRig};
