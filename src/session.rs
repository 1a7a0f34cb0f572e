//! Headless play session
//!
//! Builds a small level, spawns the character and plays a scripted sequence
//! of key events through the same scheduler a windowed game loop would use:
//! one input tick per rendered frame, as many physics ticks as the fixed-step
//! accumulator owes.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Context;
use glam::Vec3;
use platformer_core::GameTime;
use platformer_game::{
    ContactEnter, ContactHandler, InputHandler, LocomotionContext, MovementController,
    MovementEvent, RapierCharacter, SharedPhysics,
};
use platformer_physics::{CharacterBodyConfig, PhysicsConfig, PhysicsWorld};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};
use winit::event::ElementState;
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::settings::GameSettings;

/// Owner label of the pickup that grants an extra foot
pub const FOOT_ITEM: &str = "Foot";

/// Feet and items collected so far
#[derive(Debug, Default)]
struct Progress {
    feet: u32,
    items: Vec<String>,
}

/// Shared view of the character's progress.
///
/// Reports jump capacity to the controller and handles the pickups the
/// controller forwards.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    inner: Rc<RefCell<Progress>>,
}

impl ProgressTracker {
    pub fn new(feet: u32) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Progress {
                feet,
                items: Vec::new(),
            })),
        }
    }

    pub fn items(&self) -> Vec<String> {
        self.inner.borrow().items.clone()
    }
}

impl LocomotionContext for ProgressTracker {
    fn extra_jump_capacity(&self) -> u32 {
        self.inner.borrow().feet
    }
}

impl ContactHandler for ProgressTracker {
    fn on_contact_enter(&mut self, contact: &ContactEnter) {
        let Some(owner) = contact.owner.as_deref() else {
            return;
        };
        let mut progress = self.inner.borrow_mut();
        if owner == FOOT_ITEM {
            progress.feet += 1;
        }
        progress.items.push(owner.to_string());
        info!(item = owner, collider = %contact.collider, feet = progress.feet, "Picked up item");
    }
}

/// A key event at a point in session time
#[derive(Debug, Clone, Copy)]
pub struct ScriptedKey {
    pub at: f64,
    pub key: KeyCode,
    pub state: ElementState,
}

impl ScriptedKey {
    const fn down(at: f64, key: KeyCode) -> Self {
        Self {
            at,
            key,
            state: ElementState::Pressed,
        }
    }

    const fn up(at: f64, key: KeyCode) -> Self {
        Self {
            at,
            key,
            state: ElementState::Released,
        }
    }
}

/// Run right through the foot pickup, short jump, air jump, then run back
pub fn default_script() -> Vec<ScriptedKey> {
    vec![
        ScriptedKey::down(0.3, KeyCode::KeyD),
        ScriptedKey::down(1.5, KeyCode::Space),
        ScriptedKey::up(1.75, KeyCode::Space),
        ScriptedKey::down(1.9, KeyCode::KeyW),
        ScriptedKey::up(2.0, KeyCode::KeyW),
        ScriptedKey::up(2.6, KeyCode::KeyD),
        ScriptedKey::down(5.5, KeyCode::ArrowLeft),
        ScriptedKey::up(7.0, KeyCode::ArrowLeft),
    ]
}

/// What happened during a session
#[derive(Debug, Clone, Default)]
pub struct SessionReport {
    pub frames: u64,
    pub fixed_steps: u64,
    pub jumps: u32,
    pub max_jump_count: u32,
    pub jump_cuts: u32,
    pub landings: u32,
    pub turns: u32,
    pub items: Vec<String>,
    pub final_position: Vec3,
}

impl SessionReport {
    fn record(&mut self, event: &MovementEvent) {
        match *event {
            MovementEvent::Jumped { count, .. } => {
                self.jumps += 1;
                self.max_jump_count = self.max_jump_count.max(count);
            }
            MovementEvent::JumpCut { .. } => self.jump_cuts += 1,
            MovementEvent::Landed => self.landings += 1,
            MovementEvent::Turned { .. } => self.turns += 1,
        }
    }
}

type Controller = MovementController<RapierCharacter, RapierCharacter, ProgressTracker>;

/// Level, character and scheduler state for one headless run
pub struct Session {
    physics: SharedPhysics,
    character: RapierCharacter,
    controller: Controller,
    progress: ProgressTracker,
    input: InputHandler,
    time: GameTime,
    script: Vec<ScriptedKey>,
    next_key: usize,
    duration: f64,
    frame_time: f32,
    frame_jitter: f32,
    rng: StdRng,
    report: SessionReport,
}

impl Session {
    /// Build the level and the controller. Invalid settings are fatal.
    pub fn new(settings: &GameSettings, script: Vec<ScriptedKey>) -> anyhow::Result<Self> {
        settings.validate().context("Invalid settings")?;

        let ground_group = settings.physics.ground_groups()?;
        let physics = Rc::new(RefCell::new(PhysicsWorld::with_config(PhysicsConfig {
            gravity: settings.physics.gravity,
            timestep: settings.time.fixed_timestep,
            ground_group,
        })));

        let body = {
            let mut world = physics.borrow_mut();
            world.create_ground(0.0);
            world.create_trigger(FOOT_ITEM, Vec3::new(0.5, 1.0, 0.5), Vec3::new(3.0, 1.0, 0.0));
            world.create_trigger("Coin", Vec3::new(0.5, 2.0, 0.5), Vec3::new(20.0, 2.0, 0.0));

            let body_config = CharacterBodyConfig {
                height: settings.physics.character_height,
                radius: settings.physics.character_radius,
                mass: settings.physics.character_mass,
            };
            world.spawn_character(&body_config, Vec3::ZERO).0
        };

        let probe_radius = settings.physics.ground_probe_radius;
        let character = RapierCharacter::new(Rc::clone(&physics), body, probe_radius)
            .context("Failed to resolve the character body")?
            .with_ground_groups(ground_group);
        let progress = ProgressTracker::new(1);

        let mut controller = MovementController::try_new(
            settings.movement.clone(),
            character.clone(),
            character.clone(),
            progress.clone(),
        )?;
        controller.subscribe_contacts(progress.clone());

        let mut spawner = character.clone();
        controller.start(&mut spawner);

        let mut script = script;
        script.sort_by(|a, b| a.at.total_cmp(&b.at));

        Ok(Self {
            physics,
            character,
            controller,
            progress,
            input: InputHandler::new(),
            time: GameTime::new(settings.time.clone()),
            script,
            next_key: 0,
            duration: settings.session.duration as f64,
            frame_time: 1.0 / settings.session.frame_rate,
            frame_jitter: settings.session.frame_jitter,
            rng: StdRng::seed_from_u64(settings.session.seed),
            report: SessionReport::default(),
        })
    }

    /// Play until the configured duration has elapsed
    pub fn run(mut self) -> SessionReport {
        info!(duration = self.duration, "Session started");

        while self.time.total_time < self.duration {
            let jitter = if self.frame_jitter > 0.0 {
                self.rng.gen_range(-self.frame_jitter..self.frame_jitter)
            } else {
                0.0
            };
            self.frame(self.frame_time * (1.0 + jitter));
        }

        self.report.frames = self.time.frame_count;
        self.report.fixed_steps = self.time.fixed_step_count;
        self.report.items = self.progress.items();
        self.report.final_position = self.character.position();
        info!(report = ?self.report, "Session finished");
        self.report
    }

    fn frame(&mut self, raw_delta: f32) {
        self.time.update(raw_delta);

        while let Some(key) = self.script.get(self.next_key) {
            if key.at > self.time.total_time {
                break;
            }
            self.input.handle_keyboard(PhysicalKey::Code(key.key), key.state);
            self.next_key += 1;
        }

        self.input.apply_to(&mut self.controller);
        self.controller.tick_input(self.time.delta_time);

        let fixed_dt = self.time.fixed_delta();
        for _ in 0..self.time.fixed_steps() {
            self.controller.tick_physics(fixed_dt);
            self.physics.borrow_mut().step();

            let entries = self.physics.borrow_mut().drain_sensor_entries();
            for entry in entries {
                if let Some(contact) = self.character.contact_from(&entry) {
                    self.controller.on_contact_enter(contact);
                }
            }
        }

        for event in self.controller.drain_events() {
            let phase = self.controller.phase();
            debug!(t = self.time.total_time, ?event, ?phase, "Movement event");
            self.report.record(&event);
        }

        self.input.end_frame();
    }
}
