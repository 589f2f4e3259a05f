use avian3d::prelude::SpatialQueryPipeline;
use bevy::prelude::*;

use crate::camera::{CameraPose, NoCollision, OrbitRig, PhysicsProbe};
use crate::config::{OverrideConfig, OwnershipStrategy};
use crate::discovery::camera::{self as cameras, CameraSearch, CameraSearchOutcome};
use crate::discovery::locate;
use crate::error::OverrideError;
use crate::input::LookInput;
use crate::ownership::behaviors::HostBehaviorRegistry;
use crate::ownership::strategy::OwnershipSnapshot;
use crate::scene::{describe, heading_degrees, world_position, world_transform, write_world_pose};

/// What a toggle edge did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Inside the cooldown window.
    Rejected,
    Activated,
    ActivationFailed(OverrideError),
    Deactivated,
}

#[derive(Debug)]
struct ActiveSession {
    target: Entity,
    camera: Entity,
    snapshot: OwnershipSnapshot,
}

enum CameraChoice {
    Existing(Entity),
    SpawnFallback,
}

/// The override's whole state. Inactive while `session` is `None`.
#[derive(Resource, Debug)]
pub struct ViewOwnership {
    config: OverrideConfig,
    rig: OrbitRig,
    last_toggle: Option<f32>,
    session: Option<ActiveSession>,
    fallback_camera: Option<Entity>,
    latched_camera: Option<Entity>,
    search: Option<CameraSearch>,
}

impl ViewOwnership {
    pub fn new(config: OverrideConfig) -> Self {
        Self {
            rig: OrbitRig::from_config(&config),
            config,
            last_toggle: None,
            session: None,
            fallback_camera: None,
            latched_camera: None,
            search: None,
        }
    }

    pub fn config(&self) -> &OverrideConfig {
        &self.config
    }

    pub fn rig(&self) -> &OrbitRig {
        &self.rig
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn target(&self) -> Option<Entity> {
        self.session.as_ref().map(|session| session.target)
    }

    /// The camera currently driven by the rig.
    pub fn camera(&self) -> Option<Entity> {
        self.session.as_ref().map(|session| session.camera)
    }

    pub fn strategy(&self) -> OwnershipStrategy {
        self.config.strategy
    }

    pub fn fallback_camera(&self) -> Option<Entity> {
        self.fallback_camera
    }

    pub fn latched_camera(&self) -> Option<Entity> {
        self.latched_camera
    }

    pub fn is_searching(&self) -> bool {
        self.search.is_some()
    }

    /// Handles a rising edge of the toggle key at time `now` (seconds).
    pub fn toggle(&mut self, world: &mut World, now: f32) -> ToggleOutcome {
        if let Some(last) = self.last_toggle
            && now - last < self.config.toggle_cooldown_secs
        {
            return ToggleOutcome::Rejected;
        }
        self.last_toggle = Some(now);

        if self.deactivate(world) {
            return ToggleOutcome::Deactivated;
        }
        match self.activate(world) {
            Ok(()) => ToggleOutcome::Activated,
            Err(error) => ToggleOutcome::ActivationFailed(error),
        }
    }

    /// Takes over the view. Nothing in the world changes unless every lookup succeeds.
    pub fn activate(&mut self, world: &mut World) -> Result<(), OverrideError> {
        if self.is_active() {
            return Ok(());
        }

        let discovery = &self.config.discovery;
        let target = locate(world, discovery)?.entity;
        let primary = cameras::primary_camera(world, discovery).ok_or(OverrideError::PrimaryCameraNotFound)?;
        let choice = match self.config.strategy {
            OwnershipStrategy::Overlay => self.overlay_camera(world, primary)?,
            OwnershipStrategy::Reparent | OwnershipStrategy::ScriptSuspend => CameraChoice::Existing(primary),
        };
        let heading = world_transform(world, target).map(|transform| heading_degrees(transform.rotation()));

        let secondary = match choice {
            CameraChoice::Existing(entity) => entity,
            CameraChoice::SpawnFallback => {
                let entity = cameras::create_fallback(world, primary);
                self.fallback_camera = Some(entity);
                entity
            }
        };
        let hooks = world
            .get_resource::<HostBehaviorRegistry>()
            .map(|registry| registry.hooks().to_vec())
            .unwrap_or_default();

        let snapshot = OwnershipSnapshot::take(world, self.config.strategy, primary, secondary, &hooks);
        if let Some(heading) = heading {
            self.rig.face(heading);
        }
        let camera = snapshot.driven_camera();
        info!(
            "Third person view on: {} follows {} ({})",
            describe(world, camera),
            describe(world, target),
            snapshot.strategy()
        );
        self.session = Some(ActiveSession {
            target,
            camera,
            snapshot,
        });
        Ok(())
    }

    fn usable_camera(world: &World, entity: Option<Entity>, primary: Entity) -> Option<Entity> {
        entity.filter(|entity| *entity != primary && world.get::<Camera>(*entity).is_some())
    }

    fn overlay_camera(&self, world: &World, primary: Entity) -> Result<CameraChoice, OverrideError> {
        if let Some(latched) = Self::usable_camera(world, self.latched_camera, primary) {
            return Ok(CameraChoice::Existing(latched));
        }
        if let Some(fallback) = Self::usable_camera(world, self.fallback_camera, primary) {
            return Ok(CameraChoice::Existing(fallback));
        }
        match cameras::resolve(world, primary, &self.config.discovery) {
            Ok(entity) => Ok(CameraChoice::Existing(entity)),
            Err(OverrideError::CameraNotFound) if self.config.create_fallback_camera => Ok(CameraChoice::SpawnFallback),
            Err(error) => Err(error),
        }
    }

    /// Hands the view back to the host. Returns false if there was nothing to hand back.
    pub fn deactivate(&mut self, world: &mut World) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        session.snapshot.restore(world);
        info!("Third person view off");
        true
    }

    fn invalidate(&mut self, world: &mut World, entity: Entity) -> OverrideError {
        warn!("{} is gone, giving the view back to the host", describe(world, entity));
        self.deactivate(world);
        OverrideError::Invalidated(entity)
    }

    /// Late-frame update: turns the rig by `look` and writes the resulting pose.
    pub fn drive(&mut self, world: &mut World, look: LookInput) -> Result<Option<CameraPose>, OverrideError> {
        let Some(session) = &self.session else {
            return Ok(None);
        };
        let (target, camera) = (session.target, session.camera);

        let Some(target_position) = world_position(world, target) else {
            return Err(self.invalidate(world, target));
        };
        if world.get::<Camera>(camera).is_none() {
            return Err(self.invalidate(world, camera));
        }
        session.snapshot.reassert(world);

        self.rig.update_look(look.delta.x, look.delta.y, look.free_look);
        let pose = match world.get_resource::<SpatialQueryPipeline>() {
            Some(pipeline) => self
                .rig
                .compute_pose(target_position, &PhysicsProbe::new(pipeline, [target, camera])),
            None => self.rig.compute_pose(target_position, &NoCollision),
        };

        if !write_world_pose(world, camera, pose.position, pose.rotation) {
            return Err(self.invalidate(world, camera));
        }
        Ok(Some(pose))
    }

    /// Starts a manual camera search, or cancels the one in progress.
    pub fn toggle_search(&mut self, world: &World) -> Option<CameraSearchOutcome> {
        if self.search.take().is_some() {
            info!("Camera search cancelled");
            return Some(CameraSearchOutcome::Cancelled);
        }
        let frames = self.config.camera_search_frames;
        info!("Searching for a camera for {frames} frames, reveal it in the host now");
        self.search = Some(CameraSearch::start(world, &self.config.discovery, frames));
        None
    }

    /// Advances the manual search by one frame.
    pub fn poll_search(&mut self, world: &World) -> Option<CameraSearchOutcome> {
        let outcome = self.search.as_mut()?.poll(world)?;
        self.search = None;
        match outcome {
            CameraSearchOutcome::Found(entity) => {
                info!("Camera search latched onto {}", describe(world, entity));
                self.latched_camera = Some(entity);
            }
            CameraSearchOutcome::TimedOut => warn!("Camera search timed out"),
            CameraSearchOutcome::Cancelled => {}
        }
        Some(outcome)
    }
}

impl Default for ViewOwnership {
    fn default() -> Self {
        Self::new(OverrideConfig::default())
    }
}
