use std::f64::consts::{PI, TAU};

use rapier3d_f64::prelude::{ColliderHandle, RigidBodyHandle};
use skid_core::{ControlCommand, Rotator, Team, Vector3, VehicleState};

use crate::SimulationConfig;

/// Forward speed below which steering has reduced authority, in uu/s.
const FULL_STEER_SPEED: f64 = 100.0;
/// Height above the resting height that still counts as wheel contact.
const GROUND_TOLERANCE: f64 = 2.0;

/// A car body driven by a simple arcade model: it moves along its heading, with no
/// drift or air rotation. Collisions are resolved by the physics world.
#[derive(Debug, Clone)]
pub(crate) struct SimCar {
    pub team: Team,
    pub body: RigidBodyHandle,
    pub collider: ColliderHandle,
    pub location: Vector3,
    pub velocity: Vector3,
    pub yaw: f64,
    pub forward_speed: f64,
    pub boost: f64,
    pub on_ground: bool,
    /// Whether the car was in contact with the ball after the last step
    pub touching_ball: bool,
    pub cmd: ControlCommand,
    jump_held: bool,
    has_flipped: bool,
}

impl SimCar {
    pub fn new(team: Team, body: RigidBodyHandle, collider: ColliderHandle) -> Self {
        Self {
            team,
            body,
            collider,
            location: Vector3::zeros(),
            velocity: Vector3::zeros(),
            yaw: 0.0,
            forward_speed: 0.0,
            boost: 0.0,
            on_ground: true,
            touching_ball: false,
            cmd: ControlCommand::neutral(),
            jump_held: false,
            has_flipped: false,
        }
    }

    /// Put the car at rest on the ground. Returns the resting location.
    pub fn place(&mut self, location: Vector3, yaw: f64, config: &SimulationConfig) -> Vector3 {
        self.location = Vector3::new(location.x, location.y, config.car_half_extents.z);
        self.velocity = Vector3::zeros();
        self.yaw = wrap_angle(yaw);
        self.forward_speed = 0.0;
        self.on_ground = true;
        self.touching_ball = false;
        self.jump_held = false;
        self.has_flipped = false;
        self.location
    }

    pub fn forward(&self) -> Vector3 {
        Vector3::new(self.yaw.cos(), self.yaw.sin(), 0.0)
    }

    pub fn state(&self) -> VehicleState {
        VehicleState {
            location: self.location,
            velocity: self.velocity,
            rotation: Rotator::new(0.0, self.yaw, 0.0),
            boost: self.boost,
            has_wheel_contact: self.on_ground,
            team: self.team,
        }
    }

    /// Apply the current command for `dt`: heading, forward speed, boost and jumps.
    ///
    /// Returns the velocity the body should move with during the next physics step.
    /// Vertical motion is left to the physics world apart from the jump impulse.
    pub fn update(&mut self, dt: f64, config: &SimulationConfig) -> Vector3 {
        let cmd = self.cmd;
        let speed = self.forward_speed;
        let throttle = cmd.throttle.clamp(-1.0, 1.0);
        let coasting = throttle.abs() < 0.01;

        let mut accel = 0.0;
        if self.on_ground {
            let mut turn_rate =
                config.max_turn_rate * (1.0 - 0.5 * (speed.abs() / config.car_max_speed).min(1.0));
            if cmd.handbrake {
                turn_rate *= config.handbrake_turn_factor;
            }
            let authority = (speed / FULL_STEER_SPEED).clamp(-1.0, 1.0);
            self.yaw = wrap_angle(self.yaw + cmd.steer.clamp(-1.0, 1.0) * turn_rate * authority * dt);

            accel = if coasting {
                if speed == 0.0 {
                    0.0
                } else {
                    -config.coast_decel * speed.signum()
                }
            } else if throttle * speed < 0.0 {
                config.brake_accel * throttle.signum()
            } else if speed.abs() < config.max_throttle_speed {
                config.throttle_accel * throttle
            } else {
                0.0
            };
        }

        let boosting = cmd.boost && self.boost > 0.0;
        if boosting {
            accel += config.boost_accel;
            self.boost = (self.boost - config.boost_consumption * dt).max(0.0);
        }

        let mut new_speed = speed + accel * dt;
        if coasting && !boosting && new_speed * speed < 0.0 {
            new_speed = 0.0;
        }

        let mut vertical_speed = self.velocity.z;
        self.update_jump(cmd, config, &mut new_speed, &mut vertical_speed);
        self.forward_speed = new_speed.clamp(-config.max_throttle_speed, config.car_max_speed);

        self.forward() * self.forward_speed + Vector3::z() * vertical_speed
    }

    /// Read back the body after a physics step. Contacts may have slowed the car.
    pub fn sync(&mut self, location: Vector3, velocity: Vector3, config: &SimulationConfig) {
        self.location = location;
        self.velocity = velocity;
        self.forward_speed = velocity.dot(&self.forward());
        self.on_ground = location.z <= config.car_half_extents.z + GROUND_TOLERANCE
            && velocity.z <= GROUND_TOLERANCE;
    }

    /// Jump on the rising edge of the jump input; a second press in the air with pitch
    /// input flips the car along its heading.
    fn update_jump(
        &mut self,
        cmd: ControlCommand,
        config: &SimulationConfig,
        speed: &mut f64,
        vertical_speed: &mut f64,
    ) {
        let pressed = cmd.jump && !self.jump_held;
        self.jump_held = cmd.jump;
        if !pressed {
            return;
        }

        if self.on_ground {
            self.on_ground = false;
            self.has_flipped = false;
            *vertical_speed = config.jump_speed;
        } else if !self.has_flipped && cmd.pitch.abs() > 0.1 {
            self.has_flipped = true;
            *speed -= cmd.pitch.signum() * config.flip_impulse;
        }
    }
}

fn wrap_angle(angle: f64) -> f64 {
    (angle + PI).rem_euclid(TAU) - PI
}
