//! Bevy glue: a shared animation clock advanced from `Time`

use crate::AnimationClock;
use bevy::prelude::*;

/// Global clock used for synchronized tile animations
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SharedAnimationClock(pub AnimationClock);

/// Plugin that advances [`SharedAnimationClock`] once per frame
pub struct TileAnimationPlugin;

impl Plugin for TileAnimationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SharedAnimationClock>()
            .add_systems(Update, advance_shared_clock);
    }
}

fn advance_shared_clock(time: Res<Time>, mut clock: ResMut<SharedAnimationClock>) {
    clock.0.advance(time.delta());
}
