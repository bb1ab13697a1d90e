use avian2d::prelude::*;

/// Collision layers for the platformer world
#[derive(PhysicsLayer, Default, Clone, Copy, Debug)]
pub enum GameLayer {
    #[default]
    Default,
    /// Player characters and anything else a platform can carry
    Player,
    /// Static level geometry
    World,
    /// Moving platforms (solid to players, scan the `Player` layer for passengers)
    Platform,
    /// Triggers and sensors
    Trigger,
}

impl GameLayer {
    /// Mask used by players when sweeping against level geometry.
    pub fn solid_mask() -> LayerMask {
        LayerMask::from([GameLayer::World, GameLayer::Platform])
    }

    /// Mask used by platforms when scanning for passengers.
    pub fn passenger_mask() -> LayerMask {
        LayerMask::from(GameLayer::Player)
    }
}
