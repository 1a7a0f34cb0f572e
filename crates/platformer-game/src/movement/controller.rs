//! Platformer movement controller
//!
//! Driven by an external scheduler through two entry points:
//! - [`MovementController::tick_input`] once per rendered frame: timers,
//!   ground sensing, jump execution and jump cut.
//! - [`MovementController::tick_physics`] once per fixed step: run force,
//!   friction and facing.

use glam::Vec3;
use platformer_core::Transform;
use tracing::{debug, info, trace};

use super::collaborators::{
    Body, ContactEnter, ContactHandler, ForceMode, GroundSensor, LocomotionContext, SpawnHandler,
};
use super::locomotion::{compute_friction, compute_run_force, needs_turn, INPUT_DEAD_ZONE};
use super::{ConfigError, JumpPhase, MovementConfig, MovementEvent, MovementState};

/// Drives one character's body from player intent
pub struct MovementController<B, G, L> {
    /// Movement configuration
    config: MovementConfig,
    /// Mutable movement state
    state: MovementState,
    /// Body receiving forces
    body: B,
    /// Ground contact query
    ground: G,
    /// Jump capacity source
    context: L,
    /// Presentation transform, mirrored on turns
    presentation: Transform,
    /// Jump pressed since the last input tick
    pending_press: bool,
    /// Jump released since the last input tick
    pending_release: bool,
    /// Subscribers for non-ground contact entries
    contact_handlers: Vec<Box<dyn ContactHandler>>,
    /// Events not yet drained
    events: Vec<MovementEvent>,
}

impl<B, G, L> MovementController<B, G, L>
where
    B: Body,
    G: GroundSensor,
    L: LocomotionContext,
{
    /// Create a controller from an already validated config
    pub fn new(config: MovementConfig, body: B, ground: G, context: L) -> Self {
        Self {
            config,
            state: MovementState::default(),
            body,
            ground,
            context,
            presentation: Transform::default(),
            pending_press: false,
            pending_release: false,
            contact_handlers: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Validate the config, then create the controller
    pub fn try_new(
        config: MovementConfig,
        body: B,
        ground: G,
        context: L,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config, body, ground, context))
    }

    /// Ask the host to place the character at the configured spawn point
    pub fn start<S: SpawnHandler + ?Sized>(&mut self, spawner: &mut S) {
        let spawn = self.config.spawn_point;
        spawner.reset_position(spawn);
        self.presentation.position = spawn;
        info!(?spawn, "Movement controller started");
    }

    /// Set the horizontal axis, clamped to [-1, 1]
    pub fn set_horizontal_input(&mut self, axis: f32) {
        self.state.horizontal_input = axis.clamp(-1.0, 1.0);
    }

    /// Jump pressed. Buffered on the next input tick.
    pub fn press_jump(&mut self) {
        self.pending_press = true;
    }

    /// Jump released. Cuts the jump on the next input tick if still rising.
    pub fn release_jump(&mut self) {
        self.pending_release = true;
    }

    /// Per-frame update.
    ///
    /// The press is buffered first and the timers decay after it, so the
    /// press frame counts against the buffer. Ground and fall state are
    /// sensed before a buffered jump is evaluated, so a landing in this frame
    /// can serve a press from an earlier frame.
    pub fn tick_input(&mut self, dt: f32) {
        if std::mem::take(&mut self.pending_press) {
            self.state.jump_buffer_timer = self.config.jump_buffer_time;
        }

        self.state.decay_timers(dt);

        let velocity = self.body.velocity();
        self.sense_ground();

        if self.state.is_jumping && velocity.y < 0.0 {
            self.state.is_jumping = false;
        }

        if self.state.jump_buffered() && (self.can_jump() || self.can_extra_jump()) {
            self.jump(velocity.y);
        }

        if std::mem::take(&mut self.pending_release) && self.can_jump_cut() {
            self.jump_cut();
        }
    }

    /// Per-physics-step update: run force, facing and friction
    pub fn tick_physics(&mut self, dt: f32) {
        let input = self.state.horizontal_input;
        let vel_x = self.body.velocity().x;

        let run = compute_run_force(input, vel_x, &self.config);
        self.body.apply_force(Vec3::X * run, ForceMode::Continuous);
        trace!(dt, input, vel_x, run, "Run force");

        if needs_turn(input, self.state.facing_right) {
            self.turn();
        }

        if input.abs() < INPUT_DEAD_ZONE {
            let friction = compute_friction(vel_x, self.config.friction);
            if friction != 0.0 {
                self.body.apply_force(Vec3::X * friction, ForceMode::Impulse);
            }
        }
    }

    /// Forward a non-ground contact entry to every subscriber, untouched
    pub fn on_contact_enter(&mut self, contact: ContactEnter) {
        debug!(collider = %contact.collider, owner = ?contact.owner, "Contact entered");
        for handler in &mut self.contact_handlers {
            handler.on_contact_enter(&contact);
        }
    }

    /// Register a handler for contact entries
    pub fn subscribe_contacts(&mut self, handler: impl ContactHandler + 'static) {
        self.contact_handlers.push(Box::new(handler));
    }

    /// Take the events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<MovementEvent> {
        std::mem::take(&mut self.events)
    }

    /// Current jump phase
    pub fn phase(&self) -> JumpPhase {
        self.state.phase(self.body.velocity().y)
    }

    /// Whether a ground (or coyote) jump is allowed
    pub fn can_jump(&self) -> bool {
        self.context.extra_jump_capacity() > 0 && self.state.in_coyote_window()
    }

    /// Whether an air jump is allowed.
    ///
    /// Needs more than one supporting contact, and the count stays below both
    /// `max_jumps` and the reported capacity.
    pub fn can_extra_jump(&self) -> bool {
        let capacity = self.context.extra_jump_capacity();
        capacity > 1 && self.state.jump_count < self.config.max_jumps.min(capacity)
    }

    /// Whether releasing jump would trim the jump now
    pub fn can_jump_cut(&self) -> bool {
        self.state.is_jumping && self.body.velocity().y > 0.0
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    pub fn state(&self) -> &MovementState {
        &self.state
    }

    /// Presentation transform (position at spawn, X scale mirrored by facing)
    pub fn presentation(&self) -> &Transform {
        &self.presentation
    }

    pub fn body(&self) -> &B {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut B {
        &mut self.body
    }

    pub fn ground_sensor_mut(&mut self) -> &mut G {
        &mut self.ground
    }

    fn sense_ground(&mut self) {
        let grounded = self.ground.is_grounded();
        self.state.on_ground = grounded;

        let supported = grounded && !self.state.is_jumping;
        if supported {
            self.state.grounded_timer = self.config.coyote_time;
            self.state.jump_count = 0;
            if !self.state.supported {
                debug!("Landed");
                self.events.push(MovementEvent::Landed);
            }
        }
        self.state.supported = supported;
    }

    fn jump(&mut self, vel_y: f32) {
        self.state.jump_buffer_timer = 0.0;
        self.state.grounded_timer = 0.0;
        self.state.jump_count += 1;
        self.state.is_jumping = true;

        // Compensate only while falling; a jump during a rise stacks on it
        let mut impulse = self.config.jump_force;
        if vel_y < 0.0 {
            impulse -= vel_y;
        }

        self.body.apply_force(Vec3::Y * impulse, ForceMode::Impulse);
        debug!(count = self.state.jump_count, impulse, "Jump");
        self.events.push(MovementEvent::Jumped {
            count: self.state.jump_count,
            impulse,
        });
    }

    fn jump_cut(&mut self) {
        let vel_y = self.body.velocity().y;
        let impulse = -vel_y * (1.0 - self.config.jump_cut_multiplier);
        self.body.apply_force(Vec3::Y * impulse, ForceMode::Impulse);
        debug!(vel_y, impulse, "Jump cut");
        self.events.push(MovementEvent::JumpCut { impulse });
    }

    fn turn(&mut self) {
        self.state.facing_right = !self.state.facing_right;
        self.presentation.mirror_x();
        debug!(facing_right = self.state.facing_right, "Turn");
        self.events.push(MovementEvent::Turned {
            facing_right: self.state.facing_right,
        });
    }
}
