//! Simulation context and the per-frame step loop.
//!
//! Everything the frame loop touches lives in [`Simulation`]; there is no global state.
//! Each frame drains input once, runs physics steps with a controller tick after
//! each, then moves the character mesh, the camera and the water clock.

use crate::camera_rig::CameraRig;
use crate::character::{CharacterController, MotionState};
use crate::config::{GameConfig, StepMode};
use crate::environment::{self, Environment};
use crate::error::SimulationError;
use crate::water::Water;
use engine_core::{Quat, Time, Transform, Vec3};
use input::InputState;
use physics::PhysicsWorld;
use scene::{
    AssetEvent, AssetLoader, AssetSource, CameraUniform, LoadedAsset, Material, MeshData, NodeDesc, NodeId,
    Scene, ShaderPair, Shadows, StandardMaterial,
};
use std::f32::consts::FRAC_PI_2;
use std::time::Duration;

const CHARACTER_COLOR: u32 = 0x8B4513;

/// Which background load a completion belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKey {
    CharacterModel,
    EnvironmentModel,
    WaterShaders,
}

/// The mesh node drawn for the character and the model-space correction applied to it.
#[derive(Debug, Clone, Copy)]
pub struct CharacterVisual {
    pub node: NodeId,
    pub base: Transform,
    /// Still showing the capsule placeholder.
    pub placeholder: bool,
}

/// Summary of one rendered frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Physics steps (and controller ticks) run this frame.
    pub steps: u32,
    pub motion_state: MotionState,
    /// Interpolation factor used for the character mesh.
    pub alpha: f32,
}

pub struct Simulation {
    pub config: GameConfig,
    pub time: Time,
    pub input: InputState,
    pub physics: PhysicsWorld,
    pub scene: Scene,
    pub character: CharacterController,
    pub character_visual: CharacterVisual,
    pub rig: CameraRig,
    pub environment: Environment,
    pub water: Water,
    assets: AssetLoader<AssetKey>,
}

impl Simulation {
    /// Build the world, the character and the camera. Asset loads are not started
    /// here; call [`Simulation::request_assets`].
    pub fn new(config: GameConfig, resolution: (u32, u32)) -> Result<Self, SimulationError> {
        config.validate()?;

        let mut physics = PhysicsWorld::with_gravity(Vec3::from(config.simulation.gravity));
        let time = match config.simulation.step_mode {
            StepMode::Fixed { hz, .. } => {
                physics.set_timestep((1.0 / hz) as f32);
                Time::with_fixed_rate(hz)
            }
            StepMode::PerFrame => Time::new(),
        };

        let mut scene = Scene::new();
        let environment = Environment::build(&mut scene, &mut physics);
        environment::add_lights(&mut scene);
        let water = Water::spawn(&mut scene, &config.water, ShaderPair::fallback(), resolution)?;

        let character = CharacterController::spawn(&mut physics, &config.controller, &config.water);
        let character_visual = spawn_placeholder(&mut scene, &config);
        physics.update_query_pipeline();

        let mut rig = CameraRig::new(&config.camera);
        rig.set_aspect(resolution.0, resolution.1);

        log::info!(
            "Simulation ready ({:?}, water level {})",
            config.simulation.step_mode,
            config.water.level
        );

        Ok(Self {
            input: InputState::with_drag_button(config.input.drag_button.into()),
            config,
            time,
            physics,
            scene,
            character,
            character_visual,
            rig,
            environment,
            water,
            assets: AssetLoader::new(),
        })
    }

    /// Start the background loads for the character, environment and water shaders.
    pub fn request_assets(&mut self) {
        let paths = &self.config.assets;
        self.assets
            .request(AssetKey::CharacterModel, AssetSource::Model(paths.character_model.clone()));
        self.assets
            .request(AssetKey::EnvironmentModel, AssetSource::Model(paths.environment_model.clone()));
        self.assets.request(
            AssetKey::WaterShaders,
            AssetSource::Shaders {
                vertex: paths.water_vertex_shader.clone(),
                fragment: paths.water_fragment_shader.clone(),
            },
        );
    }

    /// Loads still in flight.
    pub fn pending_assets(&self) -> usize {
        self.assets.pending()
    }

    /// Run a frame using the wall clock.
    pub fn update(&mut self) -> FrameReport {
        self.time.update();
        self.run_frame()
    }

    /// Run a frame of explicit length.
    pub fn advance(&mut self, delta: Duration) -> FrameReport {
        self.time.advance(delta);
        self.run_frame()
    }

    fn run_frame(&mut self) -> FrameReport {
        let frame = self.input.take_frame();
        self.rig.apply_input(&frame, self.input.drain_wheel());

        let (steps, alpha) = match self.config.simulation.step_mode {
            StepMode::PerFrame => {
                self.step_once(frame.movement);
                (1, 1.0)
            }
            StepMode::Fixed { max_steps, .. } => {
                let mut steps = 0;
                while steps < max_steps && self.time.should_fixed_update() {
                    self.step_once(frame.movement);
                    steps += 1;
                }
                if steps == max_steps {
                    self.time.discard_backlog();
                }
                (steps, self.time.alpha())
            }
        };

        let target = self.sync_character_mesh(alpha);
        self.rig.update(target);

        let water = self
            .water
            .advance(&mut self.scene)
            .and_then(|()| self.water.sync_matrices(&mut self.scene, &self.rig.camera));
        if let Err(e) = water {
            log::warn!("Water uniforms not updated: {}", e);
        }
        self.poll_assets();

        FrameReport {
            steps,
            motion_state: self.character.motion_state,
            alpha,
        }
    }

    fn step_once(&mut self, movement: input::MovementFlags) {
        self.physics.step();
        self.character.tick(&mut self.physics, movement, self.rig.view_yaw());
    }

    /// Move the character mesh to the interpolated body pose. Returns the camera target,
    /// or `None` while the body does not exist.
    fn sync_character_mesh(&mut self, alpha: f32) -> Option<Vec3> {
        self.physics.body_translation(self.character.body.rigid_body)?;
        let visual = self.character_visual;
        let transform = self.character.mesh_transform(alpha, &visual.base);
        if let Err(e) = self.scene.set_transform(visual.node, transform) {
            log::warn!("Character mesh not updated: {}", e);
        }
        Some(self.character.interpolated_position(alpha))
    }

    /// Swap finished background loads into the scene. Failures keep the placeholders.
    pub fn poll_assets(&mut self) {
        while let Some(AssetEvent { key, result }) = self.assets.try_recv() {
            match (key, result) {
                (AssetKey::CharacterModel, Ok(LoadedAsset::Model(mesh))) => self.install_character_model(mesh),
                (AssetKey::EnvironmentModel, Ok(LoadedAsset::Model(mesh))) => {
                    self.environment.install_model(&mut self.scene, &mut self.physics, mesh);
                    self.physics.update_query_pipeline();
                }
                (AssetKey::WaterShaders, Ok(LoadedAsset::Shaders(pair))) => {
                    match self.water.replace_shaders(&mut self.scene, pair) {
                        Ok(()) => log::info!("Water shaders loaded"),
                        Err(e) => log::warn!("Failed to apply water shaders: {}", e),
                    }
                }
                (key, Ok(_)) => log::warn!("Unexpected asset kind for {:?}", key),
                (AssetKey::CharacterModel, Err(e)) => {
                    log::error!("Failed to load character model: {}; keeping the capsule", e)
                }
                (AssetKey::EnvironmentModel, Err(e)) => {
                    log::warn!("Failed to load environment model, using basic environment instead: {}", e)
                }
                (AssetKey::WaterShaders, Err(e)) => {
                    log::warn!("Failed to load water shaders, using embedded fallback: {}", e)
                }
            }
        }
    }

    fn install_character_model(&mut self, mesh: MeshData) {
        let base = Transform {
            position: Vec3::ZERO,
            rotation: Quat::from_rotation_x(-FRAC_PI_2),
            scale: Vec3::splat(0.1),
        };
        let mesh = self.scene.add_mesh(mesh);
        let mut desc = NodeDesc::new(mesh, character_material())
            .named("character")
            .shadows(Shadows::CAST);
        desc.transform = self.character.mesh_transform(1.0, &base);

        let previous = self.character_visual.node;
        self.character_visual = CharacterVisual {
            node: self.scene.spawn(desc),
            base,
            placeholder: false,
        };
        self.scene.remove(previous);
        log::info!("Character model loaded");
    }

    /// Window resized: camera aspect and the water's `iResolution`.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.rig.set_aspect(width, height);
        if let Err(e) = self.water.set_resolution(&mut self.scene, width, height) {
            log::warn!("Water resolution not updated: {}", e);
        }
    }

    /// Camera matrices for the renderer.
    pub fn camera_uniform(&self) -> CameraUniform {
        CameraUniform::from(&self.rig.camera)
    }
}

fn character_material() -> Material {
    Material::Standard(StandardMaterial::from_hex(CHARACTER_COLOR))
}

fn spawn_placeholder(scene: &mut Scene, config: &GameConfig) -> CharacterVisual {
    let ctl = &config.controller;
    let mesh = scene.add_mesh(MeshData::capsule(ctl.capsule_radius, ctl.capsule_half_height * 2.0, 4, 8));
    let node = scene.spawn(
        NodeDesc::new(mesh, character_material())
            .named("character")
            .at(ctl.spawn())
            .shadows(Shadows::CAST),
    );
    CharacterVisual {
        node,
        base: Transform::default(),
        placeholder: true,
    }
}
