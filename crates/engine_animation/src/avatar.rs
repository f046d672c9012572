//! The avatar animation graph.
//!
//! ```text
//!              not grounded
//!  LOCOMOTION ─────────────► JUMP
//!      ▲  ▲ ◄──────────────── (grounded AND jump ≥ 0.9)
//!      │  │
//!      │  └── emotes  (moving OR clip ≥ 0.9)    CLAP CRY KISS WAVE LAUGH DEFEAT
//!      └───── dances  (moving)                  DANCE1..DANCE4
//! ```
//!
//! Emotes and dances are only ever entered through
//! [`AnimationGraph::force_state`].

use engine_math::DistanceCurve;

use crate::blend_space::BlendSpace1D;
use crate::clip::{AnimationClip, ClipLibrary, ClipSet};
use crate::distance::DistanceMatchingAction;
use crate::error::AnimationError;
use crate::graph::AnimationGraph;
use crate::mixer::{ActionId, AnimationMixer};
use crate::rule::{Transition, TransitionRule};
use crate::settings::AvatarSettings;
use crate::state::{AnimationState, LocomotionState, SingleAnimationState};

/// Normalized clip time after which jumps and emotes may hand back to
/// locomotion.
pub const CLIP_END_THRESHOLD: f32 = 0.9;

/// State names.
pub mod states {
    pub const LOCOMOTION: &str = "LOCOMOTION";
    pub const JUMP: &str = "JUMP";
    pub const CLAP: &str = "CLAP";
    pub const CRY: &str = "CRY";
    pub const KISS: &str = "KISS";
    pub const WAVE: &str = "WAVE";
    pub const LAUGH: &str = "LAUGH";
    pub const DEFEAT: &str = "DEFEAT";
    pub const DANCE1: &str = "DANCE1";
    pub const DANCE2: &str = "DANCE2";
    pub const DANCE3: &str = "DANCE3";
    pub const DANCE4: &str = "DANCE4";

    pub const EMOTES: [&str; 6] = [CLAP, CRY, KISS, WAVE, LAUGH, DEFEAT];
    pub const DANCES: [&str; 4] = [DANCE1, DANCE2, DANCE3, DANCE4];
}

/// Clip names the graph looks up in the clip library.
pub mod clips {
    pub const IDLE: &str = "Idle";
    pub const JUMP: &str = "Jump";
    pub const WALK_FORWARD: &str = "Walk_Forward";
    pub const RUN_FORWARD: &str = "Run_Forward";
    pub const WALK_BACKWARD: &str = "Walk_Backward";
    pub const RUN_BACKWARD: &str = "Run_Backward";
    pub const WALK_STRAFE_LEFT: &str = "Walk_Strafe_Left";
    pub const RUN_STRAFE_LEFT: &str = "Run_Strafe_Left";
    pub const WALK_STRAFE_RIGHT: &str = "Walk_Strafe_Right";
    pub const RUN_STRAFE_RIGHT: &str = "Run_Strafe_Right";
    pub const CLAP: &str = "Clap";
    pub const CRY: &str = "Cry";
    pub const KISS: &str = "Kiss";
    pub const WAVE: &str = "Wave";
    pub const LAUGH: &str = "Laugh";
    pub const DEFEAT: &str = "Defeat";
    pub const DANCE_1: &str = "Dance_1";
    pub const DANCE_2: &str = "Dance_2";
    pub const DANCE_3: &str = "Dance_3";
    pub const DANCE_4: &str = "Dance_4";

    /// Root-motion clips; each needs a distance curve.
    pub const WALKS: [&str; 4] = [WALK_FORWARD, WALK_BACKWARD, WALK_STRAFE_LEFT, WALK_STRAFE_RIGHT];
    pub const RUNS: [&str; 4] = [RUN_FORWARD, RUN_BACKWARD, RUN_STRAFE_LEFT, RUN_STRAFE_RIGHT];
}

const EMOTE_CLIPS: [(&str, &str); 6] = [
    (states::CLAP, clips::CLAP),
    (states::CRY, clips::CRY),
    (states::KISS, clips::KISS),
    (states::WAVE, clips::WAVE),
    (states::LAUGH, clips::LAUGH),
    (states::DEFEAT, clips::DEFEAT),
];

const DANCE_CLIPS: [(&str, &str); 4] = [
    (states::DANCE1, clips::DANCE_1),
    (states::DANCE2, clips::DANCE_2),
    (states::DANCE3, clips::DANCE_3),
    (states::DANCE4, clips::DANCE_4),
];

/// Build the avatar graph over `mixer` and enter `LOCOMOTION`.
///
/// Fails with [`AnimationError::ClipLookup`] if any clip, or the distance
/// curve of any movement clip, is missing from `library`.
pub fn initialize_avatar_graph<L: ClipLibrary + ?Sized>(
    mixer: &mut AnimationMixer,
    library: &L,
    settings: &AvatarSettings,
) -> Result<AnimationGraph, AnimationError> {
    settings.validate()?;
    let walk = settings.walk_speed;
    let run = settings.run_speed;

    let idle = mixer.clip_action(library.clip(clips::IDLE)?);

    let mut z_axis = BlendSpace1D::new();
    z_axis.add_node(idle, 0.0, None)?;
    for (clip, value) in [
        (clips::WALK_FORWARD, walk),
        (clips::RUN_FORWARD, run),
        (clips::WALK_BACKWARD, -walk),
        (clips::RUN_BACKWARD, -run),
    ] {
        let (action, matcher) = distance_action(mixer, library, clip)?;
        z_axis.add_node(action, value, Some(matcher))?;
    }

    let mut x_axis = BlendSpace1D::new();
    x_axis.add_node(idle, 0.0, None)?;
    for (clip, value) in [
        (clips::RUN_STRAFE_LEFT, -run),
        (clips::WALK_STRAFE_LEFT, -walk),
        (clips::WALK_STRAFE_RIGHT, walk),
        (clips::RUN_STRAFE_RIGHT, run),
    ] {
        let (action, matcher) = distance_action(mixer, library, clip)?;
        x_axis.add_node(action, value, Some(matcher))?;
    }

    let jump = mixer.clip_action(library.clip(clips::JUMP)?);

    let mut builder = AnimationGraph::builder()
        .state(AnimationState::locomotion(
            states::LOCOMOTION,
            LocomotionState {
                idle,
                z_axis,
                x_axis,
            },
        ))
        .state(AnimationState::single(states::JUMP, play_once(jump)))
        .transition(
            states::LOCOMOTION,
            Transition::new(states::JUMP, TransitionRule::grounded(false)),
        )
        .transition(
            states::JUMP,
            Transition::new(
                states::LOCOMOTION,
                TransitionRule::and(
                    TransitionRule::grounded(true),
                    TransitionRule::animation_time(jump, CLIP_END_THRESHOLD),
                ),
            ),
        );

    for (state, clip) in EMOTE_CLIPS {
        let action = mixer.clip_action(library.clip(clip)?);
        builder = builder
            .state(AnimationState::single(state, play_once(action)))
            .transition(
                state,
                Transition::new(
                    states::LOCOMOTION,
                    TransitionRule::or(
                        TransitionRule::moving(),
                        TransitionRule::animation_time(action, CLIP_END_THRESHOLD),
                    ),
                ),
            );
    }

    for (state, clip) in DANCE_CLIPS {
        let action = mixer.clip_action(library.clip(clip)?);
        builder = builder
            .state(AnimationState::single(
                state,
                SingleAnimationState {
                    action,
                    looping: true,
                    clamp_when_finished: false,
                },
            ))
            .transition(
                state,
                Transition::new(states::LOCOMOTION, TransitionRule::moving()),
            );
    }

    builder.build(states::LOCOMOTION, mixer)
}

fn play_once(action: ActionId) -> SingleAnimationState {
    SingleAnimationState {
        action,
        looping: false,
        clamp_when_finished: true,
    }
}

fn distance_action<L: ClipLibrary + ?Sized>(
    mixer: &mut AnimationMixer,
    library: &L,
    name: &str,
) -> Result<(ActionId, DistanceMatchingAction), AnimationError> {
    let action = mixer.clip_action(library.clip(name)?);
    let curve = library.curve(name)?.clone();
    let matcher = DistanceMatchingAction::new(mixer, action, curve)?;
    Ok((action, matcher))
}

/// A complete clip library whose movement clips have constant-speed root
/// motion: one-second cycles covering the walk or run speed.
pub fn synthetic_clip_set(settings: &AvatarSettings) -> Result<ClipSet, AnimationError> {
    let mut set = ClipSet::new()
        .with_clip(clips::IDLE, 2.0)
        .with_clip(clips::JUMP, 1.0);
    for (cycles, speed) in [(clips::WALKS, settings.walk_speed), (clips::RUNS, settings.run_speed)] {
        for clip in cycles {
            set.insert_clip(AnimationClip::new(clip, 1.0));
            set.insert_curve(clip, DistanceCurve::linear(1.0, speed)?);
        }
    }
    for (_, clip) in EMOTE_CLIPS {
        set.insert_clip(AnimationClip::new(clip, 2.0));
    }
    for (_, clip) in DANCE_CLIPS {
        set.insert_clip(AnimationClip::new(clip, 4.0));
    }
    Ok(set)
}
