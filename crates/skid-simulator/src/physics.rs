use rapier3d_f64::prelude::*;
use skid_core::{BallTrajectory, Team, TrajectorySample, Vector3, GOAL_LINE_Y};

use crate::SimulationConfig;

/// Half thickness of the arena walls, floor and ceiling.
const WALL_THICKNESS: f64 = 50.0;
/// How far the goal extends behind the goal line.
const GOAL_DEPTH: f64 = 880.0;

/// The rapier world holding the arena, the ball and the cars.
pub(crate) struct PhysicsWorld {
    gravity: Vector<f64>,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
}

impl PhysicsWorld {
    /// An empty arena: floor, ceiling and walls, with both goals cut out of the back
    /// walls and closed off by a net.
    pub fn arena(config: &SimulationConfig) -> Self {
        let mut world = PhysicsWorld {
            gravity: Vector::new(0.0, 0.0, -config.gravity),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        };

        let t = WALL_THICKNESS;
        let half_width = config.field_half_width;
        let half_length = GOAL_LINE_Y + GOAL_DEPTH;
        let ceiling = config.ceiling_height;
        let goal_width = config.goal_half_width;
        let goal_height = config.goal_height;

        // Floor and ceiling
        world.add_block(
            Vector::new(0.0, 0.0, -t),
            Vector::new(half_width, half_length, t),
        );
        world.add_block(
            Vector::new(0.0, 0.0, ceiling + t),
            Vector::new(half_width, half_length, t),
        );

        // Side walls
        for sign in [-1.0, 1.0] {
            world.add_block(
                Vector::new(sign * (half_width + t), 0.0, ceiling / 2.0),
                Vector::new(t, half_length, ceiling / 2.0),
            );
        }

        for sign in [-1.0, 1.0] {
            let wall_y = sign * (GOAL_LINE_Y + t);
            let net_y = sign * (GOAL_LINE_Y + GOAL_DEPTH / 2.0);

            // Back wall on both sides of the goal mouth
            let segment = (half_width - goal_width) / 2.0;
            for side in [-1.0, 1.0] {
                world.add_block(
                    Vector::new(side * (goal_width + segment), wall_y, ceiling / 2.0),
                    Vector::new(segment, t, ceiling / 2.0),
                );
            }
            // Above the crossbar
            world.add_block(
                Vector::new(0.0, wall_y, (goal_height + ceiling) / 2.0),
                Vector::new(goal_width, t, (ceiling - goal_height) / 2.0),
            );

            // Net: back, sides and roof
            world.add_block(
                Vector::new(0.0, sign * (GOAL_LINE_Y + GOAL_DEPTH + t), goal_height / 2.0),
                Vector::new(goal_width, t, goal_height / 2.0),
            );
            for side in [-1.0, 1.0] {
                world.add_block(
                    Vector::new(side * (goal_width + t), net_y, goal_height / 2.0),
                    Vector::new(t, GOAL_DEPTH / 2.0, goal_height / 2.0),
                );
            }
            world.add_block(
                Vector::new(0.0, net_y, goal_height + t),
                Vector::new(goal_width, GOAL_DEPTH / 2.0, t),
            );
        }

        world
    }

    fn add_block(&mut self, center: Vector<f64>, half_extents: Vector<f64>) {
        let body = RigidBodyBuilder::fixed().translation(center).build();
        let handle = self.rigid_body_set.insert(body);
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .restitution(0.0)
            .restitution_combine_rule(CoefficientCombineRule::Min)
            .build();
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);
    }

    pub fn add_ball(
        &mut self,
        config: &SimulationConfig,
        location: Vector3,
        velocity: Vector3,
    ) -> (RigidBodyHandle, ColliderHandle) {
        let body = RigidBodyBuilder::dynamic()
            .can_sleep(false)
            .ccd_enabled(true)
            .translation(location)
            .linvel(velocity)
            .linear_damping(config.ball_damping)
            .build();
        let collider = ColliderBuilder::ball(config.ball_radius)
            .mass(config.ball_mass)
            .restitution(config.ball_restitution)
            .restitution_combine_rule(CoefficientCombineRule::Max)
            .build();
        let handle = self.rigid_body_set.insert(body);
        let collider_handle =
            self.collider_set
                .insert_with_parent(collider, handle, &mut self.rigid_body_set);
        (handle, collider_handle)
    }

    /// Add a car body. Its rotation is locked and only set from the drive model.
    pub fn add_car(&mut self, config: &SimulationConfig) -> (RigidBodyHandle, ColliderHandle) {
        let half = config.car_half_extents;
        let body = RigidBodyBuilder::dynamic()
            .can_sleep(false)
            .translation(Vector::new(0.0, 0.0, half.z))
            .locked_axes(LockedAxes::ROTATION_LOCKED)
            .build();
        let collider = ColliderBuilder::cuboid(half.x, half.y, half.z)
            .mass(config.car_mass)
            .friction(0.0)
            .friction_combine_rule(CoefficientCombineRule::Min)
            .restitution(0.0)
            .build();
        let handle = self.rigid_body_set.insert(body);
        let collider_handle =
            self.collider_set
                .insert_with_parent(collider, handle, &mut self.rigid_body_set);
        (handle, collider_handle)
    }

    pub fn location(&self, handle: RigidBodyHandle) -> Vector3 {
        self.rigid_body_set
            .get(handle)
            .map_or(Vector3::zeros(), |body| *body.translation())
    }

    pub fn velocity(&self, handle: RigidBodyHandle) -> Vector3 {
        self.rigid_body_set
            .get(handle)
            .map_or(Vector3::zeros(), |body| *body.linvel())
    }

    /// Move a body, replacing its velocity and clearing any spin.
    pub fn teleport(&mut self, handle: RigidBodyHandle, location: Vector3, yaw: f64, velocity: Vector3) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_position(
                Isometry::translation(location.x, location.y, location.z)
                    * Isometry::rotation(Vector::z() * yaw),
                true,
            );
            body.set_linvel(velocity, true);
            body.set_angvel(Vector::zeros(), true);
        }
    }

    /// Point a car along `yaw` and give it the velocity its drive model wants.
    pub fn drive(&mut self, handle: RigidBodyHandle, yaw: f64, velocity: Vector3) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_rotation(Rotation::from_euler_angles(0.0, 0.0, yaw), true);
            body.set_linvel(velocity, true);
        }
    }

    pub fn set_velocity(&mut self, handle: RigidBodyHandle, velocity: Vector3) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_linvel(velocity, true);
        }
    }

    /// Whether the two colliders touched during the last step.
    pub fn in_contact(&self, a: ColliderHandle, b: ColliderHandle) -> bool {
        self.narrow_phase
            .contact_pair(a, b)
            .map_or(false, |pair| pair.has_any_active_contact)
    }

    pub fn step(&mut self, dt: f64) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }
}

/// The team credited with a goal if the ball has fully crossed a goal line.
pub(crate) fn scoring_team(location: Vector3, config: &SimulationConfig) -> Option<Team> {
    if location.y.abs() <= GOAL_LINE_Y + config.ball_radius {
        None
    } else if location.y > 0.0 {
        // Orange defends +y
        Some(Team::Blue)
    } else {
        Some(Team::Orange)
    }
}

/// Predict the free flight of the ball by stepping a ball-only copy of the arena.
///
/// Samples start one step after `now` and stop early once the ball is in a goal.
pub(crate) fn predict_ball(
    config: &SimulationConfig,
    location: Vector3,
    velocity: Vector3,
    now: f64,
) -> BallTrajectory {
    let mut world = PhysicsWorld::arena(config);
    let (ball, _) = world.add_ball(config, location, velocity);

    let dt = 1.0 / config.prediction_rate;
    let count = (config.prediction_horizon * config.prediction_rate).round() as usize;
    let mut samples = Vec::with_capacity(count);
    for i in 1..=count {
        world.step(dt);
        let location = world.location(ball);
        samples.push(TrajectorySample {
            time: now + i as f64 * dt,
            location,
        });
        if scoring_team(location, config).is_some() {
            break;
        }
    }
    BallTrajectory::new(samples)
}
