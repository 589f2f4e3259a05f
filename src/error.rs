use bevy::prelude::Entity;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OverrideError {
    #[error("no player-controlled entity found in the scene")]
    TargetNotFound,
    #[error("host has no active primary camera")]
    PrimaryCameraNotFound,
    #[error("no render camera available to take over")]
    CameraNotFound,
    #[error("entity {0} disappeared while the override was active")]
    Invalidated(Entity),
    #[error("key state resource `{0}` is missing, input override disabled")]
    InputUnavailable(&'static str),
}
