//! Scripted movement.
//!
//! Stands in for the character controller: a timeline of segments, each
//! holding a velocity and grounded flag for a number of seconds and
//! optionally forcing an animation state (emote, dance) as it starts.

use std::path::Path;

use anyhow::Context;
use engine_animation::avatar::states;
use engine_animation::{AvatarAnimation, AvatarController, AvatarSettings};
use engine_component::{Entity, QueryDescriptor};
use engine_math::{Vec3, Velocity};
use engine_world::{SystemContext, SystemUpdate, World};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Registered system name.
pub const MOVEMENT_SYSTEM: &str = "movement";

fn grounded() -> bool {
    true
}

/// One step of the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Seconds this segment lasts.
    pub duration: f32,
    #[serde(default)]
    pub velocity: Vec3,
    #[serde(default = "grounded")]
    pub grounded: bool,
    /// Animation state forced when the segment starts.
    #[serde(default)]
    pub play: Option<String>,
}

impl Segment {
    fn moving(duration: f32, velocity: Vec3) -> Self {
        Self {
            duration,
            velocity,
            grounded: true,
            play: None,
        }
    }

    fn standing(duration: f32) -> Self {
        Self::moving(duration, Vec3::ZERO)
    }

    fn playing(duration: f32, state: &str) -> Self {
        Self {
            play: Some(state.to_string()),
            ..Self::standing(duration)
        }
    }
}

/// A movement timeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub segments: Vec<Segment>,
    /// Start over after the last segment instead of holding it.
    #[serde(default)]
    pub looping: bool,
}

impl Script {
    /// A tour of every kind of transition the avatar graph has.
    #[must_use]
    pub fn demo(settings: &AvatarSettings) -> Self {
        let walk = settings.walk_speed;
        let run = settings.run_speed;
        let diagonal = run * std::f32::consts::FRAC_1_SQRT_2;
        Self {
            segments: vec![
                Segment::standing(1.0),
                Segment::moving(2.0, Vec3::new(0.0, 0.0, walk)),
                Segment::moving(2.0, Vec3::new(0.0, 0.0, run)),
                Segment::moving(1.0, Vec3::new(0.0, 0.0, -walk)),
                Segment::moving(1.0, Vec3::new(walk, 0.0, 0.0)),
                Segment {
                    grounded: false,
                    ..Segment::moving(0.5, Vec3::new(0.0, 0.0, walk))
                },
                Segment::standing(1.0),
                // Runs to completion.
                Segment::playing(2.5, states::WAVE),
                // Interrupted by the walk that follows.
                Segment::playing(0.5, states::CLAP),
                Segment::moving(1.0, Vec3::new(0.0, 0.0, walk)),
                Segment::playing(3.0, states::DANCE1),
                Segment::moving(1.5, Vec3::new(diagonal, 0.0, diagonal)),
                Segment::standing(1.0),
            ],
            looping: true,
        }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script `{}`", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("failed to parse script `{}`", path.display()))
    }

    /// Total length in seconds.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.segments.iter().map(|segment| segment.duration).sum()
    }

    /// Index of the segment active at `time` seconds. Past the end this is
    /// the last segment, or wraps when looping.
    #[must_use]
    pub fn segment_at(&self, time: f32) -> Option<usize> {
        let total = self.duration();
        let time = if self.looping && total > 0.0 {
            time.rem_euclid(total)
        } else {
            time
        };

        let mut end = 0.0;
        for (index, segment) in self.segments.iter().enumerate() {
            end += segment.duration;
            if time < end {
                return Some(index);
            }
        }
        self.segments.len().checked_sub(1)
    }
}

/// Setup for the movement system. Must be registered before the animation
/// system.
pub fn movement_system(world: &mut World, script: Script) -> anyhow::Result<SystemUpdate> {
    anyhow::ensure!(!script.segments.is_empty(), "movement script has no segments");
    let movers = world.define_query(
        QueryDescriptor::new()
            .with::<Velocity>()
            .with::<AvatarController>(),
    )?;

    let mut elapsed = 0.0_f32;
    let mut active = None;
    Ok(Box::new(
        move |world: &mut World, ctx: &SystemContext| -> anyhow::Result<()> {
            let Some(index) = script.segment_at(elapsed) else {
                return Ok(());
            };
            let segment = &script.segments[index];
            let started = active != Some(index);
            if started {
                info!(
                    tick_id = ctx.tick_id,
                    segment = index,
                    velocity = ?segment.velocity,
                    grounded = segment.grounded,
                    play = segment.play.as_deref().unwrap_or("-"),
                    "movement segment"
                );
                active = Some(index);
            }

            let entities: Vec<Entity> = world.query(movers)?.matching().collect();
            for entity in entities {
                world.get_mut::<Velocity>(entity)?.linear = segment.velocity;
                world.get_mut::<AvatarController>(entity)?.is_grounded = segment.grounded;

                if let Some(state) = segment.play.as_deref() {
                    if started && world.has::<AvatarAnimation>(entity) {
                        world
                            .get_mut::<AvatarAnimation>(entity)?
                            .force_state(state)
                            .with_context(|| format!("playing {state} on {entity}"))?;
                    }
                }
            }

            elapsed += ctx.dt;
            Ok(())
        },
    ))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::rc::Rc;

    use engine_animation::{ANIMATION_SYSTEM, animation_system, synthetic_clip_set};
    use engine_world::{TickConfig, TickLoop};

    use super::*;

    fn script(looping: bool) -> Script {
        Script {
            segments: vec![Segment::standing(1.0), Segment::playing(2.0, states::WAVE)],
            looping,
        }
    }

    #[test]
    fn test_segment_at() {
        let once = script(false);
        assert_eq!(once.segment_at(0.0), Some(0));
        assert_eq!(once.segment_at(1.0), Some(1));
        assert_eq!(once.segment_at(99.0), Some(1));
        assert_eq!(script(true).segment_at(3.5), Some(0));
        assert_eq!(Script::default().segment_at(0.0), None);
    }

    #[test]
    fn test_segment_defaults() {
        let json = r#"{ "segments": [ { "duration": 1.5, "play": "WAVE" } ] }"#;
        let script: Script = serde_json::from_str(json).unwrap();
        assert!(script.segments[0].grounded);
        assert_eq!(script.segments[0].velocity, Vec3::ZERO);
        assert!(!script.looping);
    }

    #[test]
    fn test_empty_script_rejected() {
        let mut world = World::new();
        assert!(movement_system(&mut world, Script::default()).is_err());
    }

    #[test]
    fn test_demo_visits_every_kind_of_state() {
        let settings = AvatarSettings::default();
        let library = synthetic_clip_set(&settings).unwrap();
        let mut tick_loop = TickLoop::new(TickConfig::default());
        let demo = Script::demo(&settings);
        let ticks = (demo.duration() * 60.0) as u64 + 10;

        tick_loop
            .add_system(MOVEMENT_SYSTEM, move |world| movement_system(world, demo))
            .unwrap();
        tick_loop
            .add_system(ANIMATION_SYSTEM, animation_system)
            .unwrap();

        let visited: Rc<RefCell<BTreeSet<String>>> = Rc::default();
        let log = Rc::clone(&visited);
        tick_loop
            .add_system("observer", move |_| {
                Ok(move |world: &mut World, _: &SystemContext| -> anyhow::Result<()> {
                    for (_, animation) in world.components::<AvatarAnimation>() {
                        log.borrow_mut().insert(animation.current_state().to_string());
                    }
                    Ok(())
                })
            })
            .unwrap();

        let world = tick_loop.world_mut();
        let avatar = world.create();
        world.add(avatar, Velocity::ZERO).unwrap();
        world.add(avatar, AvatarController::default()).unwrap();
        world
            .add(avatar, AvatarAnimation::new(&library, &settings).unwrap())
            .unwrap();

        for _ in 0..ticks {
            tick_loop.tick(1.0 / 60.0).unwrap();
        }

        let visited = visited.borrow();
        for state in [
            states::LOCOMOTION,
            states::JUMP,
            states::WAVE,
            states::CLAP,
            states::DANCE1,
        ] {
            assert!(visited.contains(state), "never reached {state}");
        }
    }
}
