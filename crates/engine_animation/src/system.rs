//! The animation system.
//!
//! Runs after movement: reads each avatar's [`Velocity`] and
//! [`AvatarController`], ticks its graph and advances its mixer.

use anyhow::Context;
use engine_component::{Entity, QueryDescriptor};
use engine_math::Velocity;
use engine_world::{SystemContext, SystemUpdate, World};
use tracing::{debug, info};

use crate::components::{AvatarAnimation, AvatarController};
use crate::rule::Motion;

/// Registered system name.
pub const ANIMATION_SYSTEM: &str = "animation";

/// Setup for the animation system: defines its query and returns the
/// per-tick update.
pub fn animation_system(world: &mut World) -> anyhow::Result<SystemUpdate> {
    let avatars = world.define_query(
        QueryDescriptor::new()
            .with::<Velocity>()
            .with::<AvatarController>()
            .with::<AvatarAnimation>(),
    )?;

    Ok(Box::new(
        move |world: &mut World, ctx: &SystemContext| -> anyhow::Result<()> {
            let query = world.query(avatars)?;
            for entity in query.enter() {
                info!(tick_id = ctx.tick_id, %entity, "avatar animation started");
            }
            for entity in query.exit() {
                info!(tick_id = ctx.tick_id, %entity, "avatar animation stopped");
            }

            let matching: Vec<Entity> = query.matching().collect();
            for entity in matching {
                let velocity = world.get::<Velocity>(entity)?.linear;
                let grounded = world.get::<AvatarController>(entity)?.is_grounded;
                let animation = world.get_mut::<AvatarAnimation>(entity)?;

                let switched = animation
                    .tick(Motion::new(velocity, grounded), ctx.dt)
                    .with_context(|| format!("animating {entity}"))?;
                if switched {
                    debug!(
                        tick_id = ctx.tick_id,
                        %entity,
                        state = animation.current_state(),
                        "avatar changed animation state"
                    );
                }
            }
            Ok(())
        },
    ))
}

#[cfg(test)]
mod tests {
    use engine_math::Vec3;
    use engine_world::{TickConfig, TickLoop, TickError};

    use super::*;
    use crate::avatar::{clips, states, synthetic_clip_set};
    use crate::settings::AvatarSettings;

    fn spawn_avatar(world: &mut World) -> Entity {
        let settings = AvatarSettings::default();
        let library = synthetic_clip_set(&settings).unwrap();
        let entity = world.create();
        world.add(entity, Velocity::ZERO).unwrap();
        world.add(entity, AvatarController::default()).unwrap();
        world
            .add(entity, AvatarAnimation::new(&library, &settings).unwrap())
            .unwrap();
        entity
    }

    #[test]
    fn test_animation_follows_movement_system() {
        let mut tick_loop = TickLoop::new(TickConfig::default());
        // Movement: walk forward from tick 3, jump on tick 6.
        tick_loop
            .add_system("movement", |world| {
                let query = world.define_query(QueryDescriptor::new().with::<AvatarController>())?;
                Ok(move |world: &mut World, ctx: &SystemContext| -> anyhow::Result<()> {
                    let avatars: Vec<Entity> = world.query(query)?.matching().collect();
                    for entity in avatars {
                        let walk = if ctx.tick_id >= 3 { 1.6 } else { 0.0 };
                        world.get_mut::<Velocity>(entity)?.linear = Vec3::new(0.0, 0.0, walk);
                        world.get_mut::<AvatarController>(entity)?.is_grounded = ctx.tick_id != 6;
                    }
                    Ok(())
                })
            })
            .unwrap();
        tick_loop
            .add_system(ANIMATION_SYSTEM, animation_system)
            .unwrap();

        let avatar = spawn_avatar(tick_loop.world_mut());
        let state = |tick_loop: &TickLoop| {
            let animation = tick_loop.world().get::<AvatarAnimation>(avatar).unwrap();
            (
                animation.current_state().to_string(),
                animation.mixer.clip_weight(clips::WALK_FORWARD),
            )
        };

        tick_loop.tick(0.1).unwrap();
        assert_eq!(state(&tick_loop), (states::LOCOMOTION.to_string(), 0.0));
        tick_loop.tick(0.1).unwrap();
        tick_loop.tick(0.1).unwrap();
        assert_eq!(state(&tick_loop), (states::LOCOMOTION.to_string(), 1.0));
        tick_loop.tick(0.1).unwrap();
        tick_loop.tick(0.1).unwrap();
        tick_loop.tick(0.1).unwrap();
        assert_eq!(state(&tick_loop).0, states::JUMP);
    }

    #[test]
    fn test_incomplete_avatars_are_ignored() {
        let mut world = World::new();
        let mut update = animation_system(&mut world).unwrap();

        let avatar = spawn_avatar(&mut world);
        world.remove::<Velocity>(avatar).unwrap();
        world.maintain();
        update(&mut world, &SystemContext::new(1, 0.1)).unwrap();

        let animation = world.get::<AvatarAnimation>(avatar).unwrap();
        assert_eq!(animation.mixer.time(), 0.0);
    }

    #[test]
    fn test_failure_names_the_system() {
        let mut tick_loop = TickLoop::new(TickConfig::default());
        tick_loop
            .add_system(ANIMATION_SYSTEM, animation_system)
            .unwrap();
        let avatar = spawn_avatar(tick_loop.world_mut());
        tick_loop.tick(0.1).unwrap();

        // An empty mixer leaves every action id in the graph dangling.
        let world = tick_loop.world_mut();
        world.get_mut::<AvatarAnimation>(avatar).unwrap().mixer = Default::default();

        match tick_loop.tick(0.1) {
            Err(TickError::System { system, tick_id, .. }) => {
                assert_eq!(system, ANIMATION_SYSTEM);
                assert_eq!(tick_id, 2);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
