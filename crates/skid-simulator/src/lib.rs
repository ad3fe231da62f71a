//! An arena used to drive the agent without a game client.
//!
//! Ball, cars and arena are rapier bodies. Cars follow a simple arcade drive model
//! and hit the ball through regular contacts. It produces the same snapshots and
//! trajectories a real runtime would.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use rapier3d_f64::prelude::{ColliderHandle, RigidBodyHandle};
use skid_core::{
    flat_dist, rescale, BallState, BallTrajectory, BoostPadState, ControlCommand, FieldInfo,
    GameInfo, Team, Vector3, WorldSnapshot,
};

mod car;
mod physics;

use car::SimCar;
use physics::{predict_ball, scoring_team, PhysicsWorld};

/// Kickoff spawn points of the blue team as (x, y, yaw). Orange spawns are mirrored.
const KICKOFF_SPAWNS: [(f64, f64, f64); 5] = [
    (-2048.0, -2560.0, FRAC_PI_4),
    (2048.0, -2560.0, 3.0 * FRAC_PI_4),
    (-256.0, -3840.0, FRAC_PI_2),
    (256.0, -3840.0, FRAC_PI_2),
    (0.0, -4608.0, FRAC_PI_2),
];

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    // PHYSICAL CONSTANTS
    /// Gravity in uu/s^2, acting along -z
    pub gravity: f64,
    pub ball_radius: f64,
    pub ball_mass: f64,
    /// Fraction of the normal speed kept on a bounce
    pub ball_restitution: f64,
    /// Linear damping of the ball
    pub ball_damping: f64,
    pub ball_max_speed: f64,

    // CAR MODEL PARAMETERS
    /// Half size of the car hitbox. The car rests at the height of its z extent.
    pub car_half_extents: Vector3,
    pub car_mass: f64,
    /// Highest speed reachable with throttle alone, in uu/s
    pub max_throttle_speed: f64,
    pub car_max_speed: f64,
    pub throttle_accel: f64,
    pub brake_accel: f64,
    pub coast_decel: f64,
    pub boost_accel: f64,
    /// Boost used per second while boosting
    pub boost_consumption: f64,
    /// Turn rate at full steer and low speed, in rad/s
    pub max_turn_rate: f64,
    pub handbrake_turn_factor: f64,
    pub jump_speed: f64,
    pub flip_impulse: f64,

    // ARENA
    pub field_half_width: f64,
    pub ceiling_height: f64,
    pub goal_half_width: f64,
    pub goal_height: f64,
    pub boost_pickup_radius: f64,
    pub boost_respawn_time: f64,
    pub kickoff_boost: f64,
    /// Seconds the cars are frozen before a kickoff
    pub kickoff_countdown: f64,

    // PREDICTION
    /// Samples per second of the ball trajectory
    pub prediction_rate: f64,
    /// Length of the ball trajectory in seconds
    pub prediction_horizon: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            // PHYSICAL CONSTANTS
            gravity: 650.0,
            ball_radius: 92.75,
            ball_mass: 30.0,
            ball_restitution: 0.6,
            ball_damping: 0.2,
            ball_max_speed: 6000.0,

            // CAR MODEL PARAMETERS
            car_half_extents: Vector3::new(59.0, 42.0, 18.0),
            car_mass: 180.0,
            max_throttle_speed: 1410.0,
            car_max_speed: 2300.0,
            throttle_accel: 1600.0,
            brake_accel: 3500.0,
            coast_decel: 525.0,
            boost_accel: 991.666,
            boost_consumption: 33.3,
            max_turn_rate: 3.0,
            handbrake_turn_factor: 1.5,
            jump_speed: 450.0,
            flip_impulse: 500.0,

            // ARENA
            field_half_width: 4096.0,
            ceiling_height: 2044.0,
            goal_half_width: 892.755,
            goal_height: 642.775,
            boost_pickup_radius: 160.0,
            boost_respawn_time: 10.0,
            kickoff_boost: 33.3,
            kickoff_countdown: 3.0,

            // PREDICTION
            prediction_rate: 120.0,
            prediction_horizon: 6.0,
        }
    }
}

/// Something notable that happened during a step.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationEvent {
    /// Cars and ball were reset for a kickoff.
    Kickoff,
    Goal { team: Team, last_touch: Option<usize> },
    Touch { car: usize },
    BoostPickup { car: usize, pad: usize },
}

pub struct Simulation {
    config: SimulationConfig,
    rng: StdRng,
    field: FieldInfo,
    world: PhysicsWorld,
    ball_body: RigidBodyHandle,
    ball_collider: ColliderHandle,
    cars: Vec<SimCar>,
    pads: Vec<BoostPadState>,
    current_time: f64,
    countdown: f64,
    kickoff_pending: bool,
    last_touch: Option<usize>,
    score: [u32; 2],
    events: Vec<SimulationEvent>,
}

impl Simulation {
    /// Create an arena with one car per entry of `teams` and start with a kickoff.
    ///
    /// `seed` drives the choice of kickoff spawns.
    pub fn new(config: SimulationConfig, teams: &[Team], seed: u64) -> Simulation {
        let field = FieldInfo::standard_full_boosts();
        let pads = vec![
            BoostPadState {
                is_active: true,
                timer: 0.0,
            };
            field.boost_pads.len()
        ];
        let mut world = PhysicsWorld::arena(&config);
        let (ball_body, ball_collider) = world.add_ball(
            &config,
            Vector3::new(0.0, 0.0, config.ball_radius),
            Vector3::zeros(),
        );
        let cars = teams
            .iter()
            .map(|team| {
                let (body, collider) = world.add_car(&config);
                SimCar::new(*team, body, collider)
            })
            .collect();
        let mut simulation = Simulation {
            world,
            ball_body,
            ball_collider,
            cars,
            rng: StdRng::seed_from_u64(seed),
            field,
            pads,
            current_time: 0.0,
            countdown: 0.0,
            kickoff_pending: false,
            last_touch: None,
            score: [0, 0],
            events: Vec::new(),
            config,
        };
        simulation.reset_kickoff();
        simulation
    }

    pub fn time(&self) -> f64 {
        self.current_time
    }

    pub fn field(&self) -> &FieldInfo {
        &self.field
    }

    pub fn score(&self, team: Team) -> u32 {
        match team {
            Team::Blue => self.score[0],
            Team::Orange => self.score[1],
        }
    }

    /// Set the command a car follows until the next command is pushed.
    pub fn push_cmd(&mut self, index: usize, cmd: ControlCommand) {
        match self.cars.get_mut(index) {
            Some(car) => car.cmd = cmd,
            None => log::warn!("Command for unknown car {}", index),
        }
    }

    pub fn teleport_car(&mut self, index: usize, location: Vector3, yaw: f64) {
        if let Some(car) = self.cars.get_mut(index) {
            let location = car.place(location, yaw, &self.config);
            self.world
                .teleport(car.body, location, car.yaw, Vector3::zeros());
        } else {
            log::warn!("Cannot teleport unknown car {}", index);
        }
    }

    pub fn set_ball(&mut self, location: Vector3, velocity: Vector3) {
        self.world.teleport(self.ball_body, location, 0.0, velocity);
        self.kickoff_pending = false;
    }

    /// Take the events recorded since the last call.
    pub fn events(&mut self) -> Vec<SimulationEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            cars: self.cars.iter().map(SimCar::state).collect(),
            ball: self.ball_state(),
            game_info: GameInfo {
                seconds_elapsed: self.current_time,
                is_round_active: self.countdown <= 0.0,
                is_kickoff_pause: self.kickoff_pending,
            },
            boost_pad_states: self.pads.clone(),
        }
    }

    /// Predicted ball path from the current state, ignoring cars.
    pub fn prediction(&self) -> BallTrajectory {
        let ball = self.ball_state();
        predict_ball(&self.config, ball.location, ball.velocity, self.current_time)
    }

    fn ball_state(&self) -> BallState {
        BallState {
            location: self.world.location(self.ball_body),
            velocity: self.world.velocity(self.ball_body),
        }
    }

    pub fn step(&mut self, dt: f64) {
        self.current_time += dt;

        if self.countdown > 0.0 {
            self.countdown -= dt;
            if self.countdown <= 0.0 {
                log::debug!("Kickoff countdown over");
            }
            return;
        }

        for car in self.cars.iter_mut() {
            let velocity = car.update(dt, &self.config);
            self.world.drive(car.body, car.yaw, velocity);
        }

        self.world.step(dt);

        for car in self.cars.iter_mut() {
            car.sync(
                self.world.location(car.body),
                self.world.velocity(car.body),
                &self.config,
            );
        }
        let ball_velocity = self.world.velocity(self.ball_body);
        if ball_velocity.norm() > self.config.ball_max_speed {
            self.world
                .set_velocity(self.ball_body, rescale(ball_velocity, self.config.ball_max_speed));
        }

        self.update_touches();
        self.update_pads(dt);

        if let Some(team) = scoring_team(self.world.location(self.ball_body), &self.config) {
            match team {
                Team::Blue => self.score[0] += 1,
                Team::Orange => self.score[1] += 1,
            }
            log::info!(
                "Goal for {} (blue {} - orange {})",
                team,
                self.score[0],
                self.score[1]
            );
            self.events.push(SimulationEvent::Goal {
                team,
                last_touch: self.last_touch,
            });
            self.reset_kickoff();
        }
    }

    /// Record a touch when a car starts a contact with the ball.
    fn update_touches(&mut self) {
        for (index, car) in self.cars.iter_mut().enumerate() {
            let touching = self.world.in_contact(car.collider, self.ball_collider);
            if touching && !car.touching_ball {
                log::trace!("Car {} touched the ball", index);
                self.last_touch = Some(index);
                self.kickoff_pending = false;
                self.events.push(SimulationEvent::Touch { car: index });
            }
            car.touching_ball = touching;
        }
    }

    fn update_pads(&mut self, dt: f64) {
        for pad in self.pads.iter_mut().filter(|pad| !pad.is_active) {
            pad.timer -= dt;
            if pad.timer <= 0.0 {
                pad.is_active = true;
                pad.timer = 0.0;
            }
        }

        for (car_index, car) in self.cars.iter_mut().enumerate() {
            if car.boost >= 100.0 {
                continue;
            }
            for (pad_index, (info, state)) in
                self.field.boost_pads.iter().zip(self.pads.iter_mut()).enumerate()
            {
                if state.is_active
                    && flat_dist(car.location, info.location) < self.config.boost_pickup_radius
                {
                    car.boost = if info.is_full_boost {
                        100.0
                    } else {
                        (car.boost + 12.0).min(100.0)
                    };
                    state.is_active = false;
                    state.timer = self.config.boost_respawn_time;
                    self.events.push(SimulationEvent::BoostPickup {
                        car: car_index,
                        pad: pad_index,
                    });
                    break;
                }
            }
        }
    }

    fn reset_kickoff(&mut self) {
        self.world.teleport(
            self.ball_body,
            Vector3::new(0.0, 0.0, self.config.ball_radius),
            0.0,
            Vector3::zeros(),
        );

        for team in [Team::Blue, Team::Orange] {
            let mut spawns = KICKOFF_SPAWNS;
            spawns.shuffle(&mut self.rng);
            let cars = self.cars.iter_mut().filter(|car| car.team == team);
            for (car, (x, y, yaw)) in cars.zip(spawns.iter().cycle()) {
                let (location, yaw) = match team {
                    Team::Blue => (Vector3::new(*x, *y, 0.0), *yaw),
                    Team::Orange => (Vector3::new(-x, -y, 0.0), yaw + PI),
                };
                let location = car.place(location, yaw, &self.config);
                self.world
                    .teleport(car.body, location, car.yaw, Vector3::zeros());
                car.boost = self.config.kickoff_boost;
                car.cmd = ControlCommand::neutral();
            }
        }

        self.countdown = self.config.kickoff_countdown;
        self.kickoff_pending = true;
        self.last_touch = None;
        log::debug!("Kickoff reset at t={:.2}", self.current_time);
        self.events.push(SimulationEvent::Kickoff);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DT: f64 = 1.0 / 120.0;

    fn no_countdown() -> SimulationConfig {
        SimulationConfig {
            kickoff_countdown: 0.0,
            ..Default::default()
        }
    }

    fn run(sim: &mut Simulation, seconds: f64) {
        let steps = (seconds / DT).round() as usize;
        for _ in 0..steps {
            sim.step(DT);
        }
    }

    #[test]
    fn test_kickoff_spawns_face_the_ball() {
        let mut sim = Simulation::new(SimulationConfig::default(), &[Team::Blue, Team::Orange], 3);
        assert_eq!(sim.events(), vec![SimulationEvent::Kickoff]);

        let snapshot = sim.snapshot();
        assert!(!snapshot.game_info.is_round_active);
        assert!(snapshot.game_info.is_kickoff_pause);
        assert_eq!(snapshot.ball.location, Vector3::new(0.0, 0.0, 92.75));

        for car in &snapshot.cars {
            let to_ball = (snapshot.ball.location - car.location).normalize();
            let forward = car.orientation().forward;
            assert!(forward.dot(&to_ball) > 0.6, "{:?}", car.location);
            assert_eq!(car.location.y.signum(), car.team.own_goal_sign());
            assert_relative_eq!(car.boost, 33.3);
        }
    }

    #[test]
    fn test_spawns_depend_on_seed() {
        let teams = [Team::Blue; 3];
        let a = Simulation::new(SimulationConfig::default(), &teams, 11).snapshot();
        let b = Simulation::new(SimulationConfig::default(), &teams, 11).snapshot();
        for (a, b) in a.cars.iter().zip(b.cars.iter()) {
            assert_eq!(a.location, b.location);
        }
        // Cars of one team never share a spawn.
        assert_ne!(a.cars[0].location, a.cars[1].location);
        assert_ne!(a.cars[1].location, a.cars[2].location);
    }

    #[test_log::test]
    fn test_countdown_freezes_cars() {
        let mut sim = Simulation::new(SimulationConfig::default(), &[Team::Blue], 0);
        let start = sim.snapshot().cars[0].location;
        sim.push_cmd(0, ControlCommand::neutral().with_throttle(1.0));

        run(&mut sim, 2.0);
        assert_eq!(sim.snapshot().cars[0].location, start);

        run(&mut sim, 2.0);
        let snapshot = sim.snapshot();
        assert!(snapshot.game_info.is_round_active);
        assert_ne!(snapshot.cars[0].location, start);
    }

    #[test]
    fn test_boost_speeds_past_throttle_limit() {
        let mut sim = Simulation::new(no_countdown(), &[Team::Blue], 0);
        sim.teleport_car(0, Vector3::new(3000.0, -3000.0, 0.0), FRAC_PI_2);
        sim.push_cmd(
            0,
            ControlCommand {
                throttle: 1.0,
                boost: true,
                ..Default::default()
            },
        );
        run(&mut sim, 1.5);

        let car = &sim.snapshot().cars[0];
        assert!(car.forward_speed() > 1410.0);
        assert!(car.forward_speed() <= 2300.0);
        assert_eq!(car.boost, 0.0);
    }

    #[test_log::test]
    fn test_pad_pickup_and_respawn() {
        let mut sim = Simulation::new(no_countdown(), &[Team::Blue], 0);
        sim.events();
        sim.teleport_car(0, Vector3::new(3072.0, -4096.0, 0.0), 0.0);
        sim.step(DT);

        let pad = sim
            .field()
            .boost_pads
            .iter()
            .position(|p| p.location.x == 3072.0 && p.location.y == -4096.0)
            .unwrap();
        let snapshot = sim.snapshot();
        assert_eq!(snapshot.cars[0].boost, 100.0);
        assert!(!snapshot.boost_pad_states[pad].is_active);
        assert_eq!(
            sim.events(),
            vec![SimulationEvent::BoostPickup { car: 0, pad }]
        );

        sim.teleport_car(0, Vector3::new(-3000.0, -1000.0, 0.0), 0.0);
        run(&mut sim, 9.0);
        assert!(!sim.snapshot().boost_pad_states[pad].is_active);
        run(&mut sim, 1.5);
        assert!(sim.snapshot().boost_pad_states[pad].is_active);
    }

    #[test_log::test]
    fn test_goal_scores_and_resets() {
        let mut sim = Simulation::new(no_countdown(), &[Team::Blue], 0);
        sim.events();
        sim.set_ball(Vector3::new(0.0, 4800.0, 92.75), Vector3::new(0.0, 2500.0, 0.0));
        run(&mut sim, 1.0);

        assert_eq!(sim.score(Team::Blue), 1);
        assert_eq!(sim.score(Team::Orange), 0);
        let events = sim.events();
        assert!(events.contains(&SimulationEvent::Goal {
            team: Team::Blue,
            last_touch: None
        }));
        assert!(events.contains(&SimulationEvent::Kickoff));
        let snapshot = sim.snapshot();
        assert!(snapshot.game_info.is_kickoff_pause);
        assert!(flat_dist(snapshot.ball.location, Vector3::zeros()) < 1.0);
        assert_relative_eq!(snapshot.ball.location.z, 92.75, epsilon = 1.0);
    }

    #[test]
    fn test_driving_into_ball_pushes_it() {
        let mut sim = Simulation::new(no_countdown(), &[Team::Blue], 0);
        sim.events();
        sim.teleport_car(0, Vector3::new(0.0, -800.0, 0.0), FRAC_PI_2);
        sim.push_cmd(0, ControlCommand::neutral().with_throttle(1.0));
        run(&mut sim, 1.2);

        let snapshot = sim.snapshot();
        assert!(snapshot.ball.velocity.y > 0.0);
        assert!(!snapshot.game_info.is_kickoff_pause);
        assert!(sim.events().contains(&SimulationEvent::Touch { car: 0 }));
    }

    #[test]
    fn test_prediction_starts_after_now() {
        let mut sim = Simulation::new(no_countdown(), &[Team::Blue], 0);
        sim.set_ball(Vector3::new(0.0, 0.0, 500.0), Vector3::new(300.0, 0.0, 0.0));
        run(&mut sim, 0.5);

        let prediction = sim.prediction();
        assert_eq!(prediction.len(), 720);
        assert!(prediction.samples[0].time > sim.time());
        assert!(prediction.samples[0].location.x > sim.snapshot().ball.location.x);
    }

    #[test]
    fn test_jump_and_land() {
        let mut sim = Simulation::new(no_countdown(), &[Team::Blue], 0);
        sim.teleport_car(0, Vector3::new(-2000.0, 1000.0, 0.0), 0.0);
        sim.push_cmd(0, ControlCommand::neutral().with_jump(true));
        sim.step(DT);
        let car = &sim.snapshot().cars[0];
        assert!(!car.has_wheel_contact);
        assert!(car.location.z > 18.0);

        // Holding jump does not jump again.
        run(&mut sim, 2.0);
        let car = &sim.snapshot().cars[0];
        assert!(car.has_wheel_contact);
        assert_relative_eq!(car.location.z, 18.0, epsilon = 2.0);
    }

    #[test]
    fn test_side_wall_stops_the_car() {
        let config = no_countdown();
        let mut sim = Simulation::new(config.clone(), &[Team::Blue], 0);
        sim.teleport_car(0, Vector3::new(3800.0, 0.0, 0.0), 0.0);
        sim.push_cmd(0, ControlCommand::neutral().with_throttle(1.0));
        run(&mut sim, 1.0);

        let car = &sim.snapshot().cars[0];
        assert!(car.location.x + config.car_half_extents.x <= config.field_half_width + 1.0);
        assert!(car.forward_speed() < 100.0);
    }

    #[test]
    fn test_ball_speed_is_capped() {
        let mut sim = Simulation::new(no_countdown(), &[Team::Blue], 0);
        sim.set_ball(Vector3::new(0.0, 0.0, 1000.0), Vector3::new(9000.0, 0.0, 0.0));
        sim.step(DT);
        assert!(sim.snapshot().ball.velocity.norm() <= 6000.0 + 1e-6);
    }
}
