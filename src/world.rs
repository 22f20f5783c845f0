use lib_math::{Vec2, vec2, vec4};
use lib_renderer::{DrawCommand, QuadFrame, RED, WHITE, with_alpha};
use rand::{Rng, rngs::StdRng};

use crate::{
    assets::Textures,
    entity::{Entity, EntityFlags, EntityPool, MAX_ENTITIES},
    input::Controls,
};

/// Half of the visible world height. The camera never moves.
pub const VIEW_HALF_HEIGHT: f32 = 100.0;

const PLAYER_SIZE: f32 = 12.0;
const PLAYER_SPEED: f32 = 100.0;
pub const MAX_HITS: u32 = 3;

const PROJECTILE_SIZE: f32 = 3.0;
const PROJECTILE_SPEED: f32 = 250.0;
const PROJECTILE_LIFETIME: f32 = 1.5;
const FIRE_COOLDOWN: f32 = 0.15;

const ASTEROID_SPAWN_INTERVAL: f32 = 1.2;
const ASTEROID_LIFETIME: f32 = 20.0;
const ASTEROID_SIZE: (f32, f32) = (10.0, 28.0);
const ASTEROID_SPEED: (f32, f32) = (15.0, 45.0);
const ASTEROID_SPIN: f32 = 90.0;

/// Live projectiles and asteroids are capped so the pool never overflows.
const MAX_PROJECTILES: usize = 32;
const MAX_ASTEROIDS: usize = 48;
const _: () = assert!(1 + MAX_PROJECTILES + MAX_ASTEROIDS <= MAX_ENTITIES);

/// Game state advanced once per frame by [`World::update`].
#[derive(Debug)]
pub struct World {
    entities: EntityPool,
    score: u32,
    hits: u32,
    spawn_timer: f32,
    fire_cooldown: f32,
    aim: Option<Vec2>,
    rng: StdRng,
}

impl World {
    pub fn new(rng: StdRng) -> Self {
        let mut world = Self {
            entities: EntityPool::default(),
            score: 0,
            hits: 0,
            spawn_timer: ASTEROID_SPAWN_INTERVAL,
            fire_cooldown: 0.0,
            aim: None,
            rng,
        };

        world.spawn_player();

        world
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_over(&self) -> bool {
        self.hits >= MAX_HITS
    }

    /// Clears the board and starts again with a fresh player.
    pub fn restart(&mut self) {
        tracing::debug!(score = self.score, "restarting");

        self.entities = EntityPool::default();
        self.score = 0;
        self.hits = 0;
        self.spawn_timer = ASTEROID_SPAWN_INTERVAL;
        self.fire_cooldown = 0.0;

        self.spawn_player();
    }

    /// Runs one step: input, spawning, physics, collisions, then the deletion pass.
    ///
    /// `half_extents` is the visible half size of the world; entities leaving it
    /// wrap around to the opposite edge.
    pub fn update(&mut self, delta_time: f32, controls: &Controls, half_extents: Vec2) {
        self.aim = controls.aim;

        self.apply_controls(delta_time, controls);
        self.spawn_asteroids(delta_time, half_extents);
        self.step_physics(delta_time, half_extents);
        self.resolve_collisions();

        let removed = self.entities.remove_pending();
        if removed > 0 {
            tracing::trace!(removed, remaining = self.entities.len(), "deletion pass");
        }
    }

    pub fn draw(&self, frame: &mut QuadFrame<'_>, textures: &Textures) {
        let player_position = self
            .entities
            .with_flags(EntityFlags::PLAYER)
            .next()
            .map(|player| player.position);

        if let (Some(start), Some(end)) = (player_position, self.aim) {
            frame.submit(DrawCommand::Line {
                start,
                end,
                thickness: 0.5,
                color: with_alpha(WHITE, 0.25),
            });
        }

        for entity in self.entities.iter() {
            let position = entity.position.extend(0.0);

            if entity.flags.contains(EntityFlags::PROJECTILE) {
                frame.draw_circle(position, entity.radius(), entity.color);
            } else if entity.flags.contains(EntityFlags::ASTEROID) {
                frame.draw_texture(
                    textures.asteroid,
                    position,
                    entity.size,
                    entity.rotation,
                    entity.color,
                );
            } else if entity.flags.contains(EntityFlags::PLAYER) {
                frame.draw_texture(
                    textures.ship,
                    position,
                    entity.size,
                    entity.rotation,
                    entity.color,
                );
            }
        }
    }

    /// One pip per hit the player can still take, along the top edge.
    pub fn draw_health(&self, frame: &mut QuadFrame<'_>, half_extents: Vec2) {
        for pip in 0..MAX_HITS {
            let color = if pip < MAX_HITS - self.hits.min(MAX_HITS) {
                RED
            } else {
                with_alpha(RED, 0.2)
            };

            let position = vec2(half_extents.x - 8.0 - pip as f32 * 8.0, half_extents.y - 8.0);
            frame.draw_rectangle(position.extend(0.0), Vec2::splat(6.0), 45.0, color);
        }
    }

    fn spawn_player(&mut self) {
        self.entities.spawn(Entity {
            size: Vec2::splat(PLAYER_SIZE),
            flags: EntityFlags::PLAYER,
            ..Entity::default()
        });
    }

    fn count(&self, flags: EntityFlags) -> usize {
        self.entities.with_flags(flags).count()
    }

    fn apply_controls(&mut self, delta_time: f32, controls: &Controls) {
        self.fire_cooldown = (self.fire_cooldown - delta_time).max(0.0);
        let can_fire = self.fire_cooldown <= 0.0
            && self.count(EntityFlags::PROJECTILE) < MAX_PROJECTILES;

        let Some(player) = self.entities.player_mut() else {
            return;
        };

        player.velocity = controls.movement.clamp_length_max(1.0) * PLAYER_SPEED;

        if let Some(aim) = controls.aim {
            let to_aim = aim - player.position;

            // The ship sprite points up, so zero rotation faces +Y.
            if to_aim.length_squared() > f32::EPSILON {
                player.rotation = to_aim.to_angle().to_degrees() - 90.0;
            }
        }

        if !controls.fire || !can_fire {
            return;
        }

        let facing = Vec2::from_angle((player.rotation + 90.0).to_radians());
        let projectile = Entity {
            position: player.position + facing * player.radius(),
            size: Vec2::splat(PROJECTILE_SIZE),
            color: vec4(1.0, 0.9, 0.3, 1.0),
            velocity: facing * PROJECTILE_SPEED,
            lifetime: Some(PROJECTILE_LIFETIME),
            flags: EntityFlags::PROJECTILE,
            ..Entity::default()
        };

        self.entities.spawn(projectile);
        self.fire_cooldown = FIRE_COOLDOWN;
    }

    fn spawn_asteroids(&mut self, delta_time: f32, half_extents: Vec2) {
        self.spawn_timer -= delta_time;

        if self.spawn_timer > 0.0 {
            return;
        }
        self.spawn_timer += ASTEROID_SPAWN_INTERVAL;

        if self.count(EntityFlags::ASTEROID) >= MAX_ASTEROIDS {
            return;
        }

        let asteroid = self.random_asteroid(half_extents);
        self.entities.spawn(asteroid);
    }

    /// An asteroid on a random edge, drifting toward the inner half of the view.
    fn random_asteroid(&mut self, half_extents: Vec2) -> Entity {
        let rng = &mut self.rng;

        let size = rng.gen_range(ASTEROID_SIZE.0..ASTEROID_SIZE.1);
        let along = rng.gen_range(-1.0..1.0);
        let position = match rng.gen_range(0..4) {
            0 => vec2(-half_extents.x, along * half_extents.y),
            1 => vec2(half_extents.x, along * half_extents.y),
            2 => vec2(along * half_extents.x, -half_extents.y),
            _ => vec2(along * half_extents.x, half_extents.y),
        };

        let target = vec2(
            rng.gen_range(-0.5..0.5) * half_extents.x,
            rng.gen_range(-0.5..0.5) * half_extents.y,
        );
        let speed = rng.gen_range(ASTEROID_SPEED.0..ASTEROID_SPEED.1);

        let shade = rng.gen_range(0.7..1.0);

        Entity {
            position,
            size: Vec2::splat(size),
            rotation: rng.gen_range(0.0..360.0),
            spin: rng.gen_range(-ASTEROID_SPIN..ASTEROID_SPIN),
            color: vec4(shade, shade, shade, 1.0),
            velocity: (target - position).normalize_or_zero() * speed,
            lifetime: Some(ASTEROID_LIFETIME),
            flags: EntityFlags::ASTEROID,
        }
    }

    fn step_physics(&mut self, delta_time: f32, half_extents: Vec2) {
        for entity in self.entities.iter_mut() {
            entity.position += entity.velocity * delta_time;
            entity.rotation = (entity.rotation + entity.spin * delta_time) % 360.0;

            if let Some(lifetime) = &mut entity.lifetime {
                *lifetime -= delta_time;

                if *lifetime <= 0.0 {
                    entity.mark_for_deletion();
                }
            }

            let reach = half_extents + entity.radius();
            entity.position = wrap(entity.position, reach);
        }
    }

    fn resolve_collisions(&mut self) {
        let entities = self.entities.as_mut_slice();

        for asteroid in 0..entities.len() {
            if !entities[asteroid].flags.contains(EntityFlags::ASTEROID) {
                continue;
            }

            for other in 0..entities.len() {
                if !entities[asteroid].is_alive() {
                    break;
                }

                let candidate = entities[other];
                if !candidate.is_alive() || !entities[asteroid].overlaps(&candidate) {
                    continue;
                }

                if candidate.flags.contains(EntityFlags::PROJECTILE) {
                    entities[asteroid].mark_for_deletion();
                    entities[other].mark_for_deletion();
                    self.score += 1;
                } else if candidate.flags.contains(EntityFlags::PLAYER) {
                    entities[asteroid].mark_for_deletion();
                    self.hits += 1;
                    tracing::debug!(hits = self.hits, "player hit");
                }
            }
        }
    }
}

fn wrap(position: Vec2, reach: Vec2) -> Vec2 {
    let axis = |value: f32, reach: f32| {
        if value > reach {
            value - 2.0 * reach
        } else if value < -reach {
            value + 2.0 * reach
        } else {
            value
        }
    };

    vec2(axis(position.x, reach.x), axis(position.y, reach.y))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;

    use super::*;

    const HALF_EXTENTS: Vec2 = vec2(100.0, 100.0);

    fn world() -> World {
        let mut world = World::new(StdRng::seed_from_u64(7));
        // Keep asteroids from spawning unless a test asks for them.
        world.spawn_timer = f32::INFINITY;
        world
    }

    fn player(world: &World) -> Entity {
        *world.entities.with_flags(EntityFlags::PLAYER).next().unwrap()
    }

    fn asteroid_at(position: Vec2) -> Entity {
        Entity {
            position,
            size: Vec2::splat(10.0),
            flags: EntityFlags::ASTEROID,
            ..Entity::default()
        }
    }

    #[test]
    fn player_moves_with_controls() {
        let mut world = world();
        let controls = Controls {
            movement: vec2(1.0, 0.0),
            ..Controls::default()
        };

        world.update(0.5, &controls, HALF_EXTENTS);

        assert_abs_diff_eq!(player(&world).position.x, PLAYER_SPEED * 0.5, epsilon = 1e-4);
        assert_abs_diff_eq!(player(&world).position.y, 0.0);
    }

    #[test]
    fn diagonal_movement_is_not_faster() {
        let mut world = world();
        let controls = Controls {
            movement: vec2(1.0, 1.0),
            ..Controls::default()
        };

        world.update(0.1, &controls, HALF_EXTENTS);

        assert_abs_diff_eq!(player(&world).velocity.length(), PLAYER_SPEED, epsilon = 1e-3);
    }

    #[test]
    fn player_faces_the_aim_point() {
        let mut world = world();
        let controls = Controls {
            aim: Some(vec2(-50.0, 0.0)),
            ..Controls::default()
        };

        world.update(0.01, &controls, HALF_EXTENTS);

        assert_abs_diff_eq!(player(&world).rotation, 90.0, epsilon = 1e-3);
    }

    #[test]
    fn projectiles_fire_along_the_facing_and_expire() {
        let mut world = world();
        let fire = Controls {
            fire: true,
            ..Controls::default()
        };

        world.update(0.01, &fire, HALF_EXTENTS);

        let projectile = *world
            .entities
            .with_flags(EntityFlags::PROJECTILE)
            .next()
            .unwrap();
        assert_abs_diff_eq!(projectile.velocity.x, 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(projectile.velocity.y, PROJECTILE_SPEED, epsilon = 1e-3);

        world.update(PROJECTILE_LIFETIME, &Controls::default(), HALF_EXTENTS);
        assert_eq!(world.entities.with_flags(EntityFlags::PROJECTILE).count(), 0);
    }

    #[test]
    fn fire_cooldown_limits_the_rate() {
        let mut world = world();
        let fire = Controls {
            fire: true,
            ..Controls::default()
        };

        world.update(0.01, &fire, HALF_EXTENTS);
        world.update(0.01, &fire, HALF_EXTENTS);

        assert_eq!(world.entities.with_flags(EntityFlags::PROJECTILE).count(), 1);
    }

    #[test]
    fn projectile_destroys_asteroid() {
        let mut world = world();
        world.entities.spawn(asteroid_at(vec2(0.0, 40.0)));
        world.entities.spawn(Entity {
            position: vec2(0.0, 38.0),
            size: Vec2::splat(PROJECTILE_SIZE),
            flags: EntityFlags::PROJECTILE,
            ..Entity::default()
        });

        world.update(0.0, &Controls::default(), HALF_EXTENTS);

        assert_eq!(world.score(), 1);
        assert_eq!(world.entities.len(), 1);
        assert_eq!(world.entities.with_flags(EntityFlags::PLAYER).count(), 1);
    }

    #[test]
    fn asteroid_hitting_the_player_costs_a_hit() {
        let mut world = world();
        world.entities.spawn(asteroid_at(vec2(3.0, 0.0)));

        world.update(0.0, &Controls::default(), HALF_EXTENTS);

        assert_eq!(world.hits, 1);
        assert_eq!(world.score(), 0);
        assert_eq!(world.entities.with_flags(EntityFlags::ASTEROID).count(), 0);
        assert!(!world.is_over());
    }

    #[test]
    fn asteroids_spawn_on_the_edge() {
        let mut world = world();
        world.spawn_timer = 0.0;

        world.update(0.0, &Controls::default(), HALF_EXTENTS);

        let asteroid = *world
            .entities
            .with_flags(EntityFlags::ASTEROID)
            .next()
            .unwrap();
        let on_edge = asteroid.position.x.abs() == HALF_EXTENTS.x
            || asteroid.position.y.abs() == HALF_EXTENTS.y;
        assert!(on_edge, "spawned at {}", asteroid.position);
        assert!(asteroid.velocity.length() >= ASTEROID_SPEED.0);
    }

    #[test]
    fn asteroid_spawns_stop_at_their_cap() {
        let mut world = world();
        for _ in 0..MAX_ASTEROIDS {
            world.entities.spawn(asteroid_at(vec2(-90.0, -90.0)));
        }
        world.spawn_timer = 0.0;

        world.update(0.0, &Controls::default(), HALF_EXTENTS);

        assert_eq!(world.count(EntityFlags::ASTEROID), MAX_ASTEROIDS);
        assert!(world.spawn_timer > 0.0);
    }

    #[test]
    fn firing_stops_at_the_projectile_cap() {
        let mut world = world();
        for _ in 0..MAX_PROJECTILES {
            world.entities.spawn(Entity {
                position: vec2(90.0, 90.0),
                flags: EntityFlags::PROJECTILE,
                ..Entity::default()
            });
        }
        let fire = Controls {
            fire: true,
            ..Controls::default()
        };

        world.update(0.0, &fire, HALF_EXTENTS);

        assert_eq!(world.count(EntityFlags::PROJECTILE), MAX_PROJECTILES);
        assert_eq!(world.fire_cooldown, 0.0);
    }

    #[test]
    fn capped_spawners_never_fill_the_pool() {
        let mut world = world();
        world.spawn_timer = 0.0;
        let fire = Controls {
            fire: true,
            movement: vec2(0.3, 0.1),
            aim: Some(vec2(10.0, 40.0)),
            ..Controls::default()
        };

        for _ in 0..2000 {
            world.update(0.05, &fire, HALF_EXTENTS);
            world.spawn_timer = world.spawn_timer.min(0.0);

            assert!(world.entities.len() < MAX_ENTITIES);
        }
    }

    #[test]
    fn entities_wrap_around_the_view() {
        let reach = HALF_EXTENTS + 5.0;

        assert_eq!(wrap(vec2(106.0, 0.0), reach), vec2(-104.0, 0.0));
        assert_eq!(wrap(vec2(0.0, -110.0), reach), vec2(0.0, 100.0));
        assert_eq!(wrap(vec2(20.0, 30.0), reach), vec2(20.0, 30.0));
    }

    #[test]
    fn restart_resets_counters() {
        let mut world = world();
        world.hits = MAX_HITS;
        assert!(world.is_over());

        world.restart();

        assert_eq!(world.hits, 0);
        assert_eq!(world.entities.len(), 1);
    }
}
