//! Collision layer system for filtering body interactions
//!
//! Bodies carry a layer (what they are) and a mask (what they interact
//! with); two bodies interact only when each one's layer is present in
//! the other's mask.

/// Collision layer definitions for filtering
pub struct CollisionLayers;

impl CollisionLayers {
    /// No collision layer
    pub const NONE: u32 = 0;

    /// All collision layers
    pub const ALL: u32 = 0xFFFF_FFFF;

    /// Default layer for bodies with no explicit assignment
    pub const DEFAULT: u32 = 1 << 0;

    /// Static environment geometry
    pub const STATIC_GEOMETRY: u32 = 1 << 1;

    /// Dynamic simulated bodies
    pub const DYNAMIC_BODY: u32 = 1 << 2;

    /// Character controllers
    pub const CHARACTER: u32 = 1 << 3;

    /// Trigger volumes (no physical response)
    pub const TRIGGER: u32 = 1 << 4;

    /// Debris and small physics objects
    pub const DEBRIS: u32 = 1 << 5;

    /// Check if two bodies should interact based on their layers and masks.
    ///
    /// A's layer must be in B's mask AND B's layer must be in A's mask.
    pub fn should_collide(layer_a: u32, mask_a: u32, layer_b: u32, mask_b: u32) -> bool {
        (layer_a & mask_b) != 0 && (layer_b & mask_a) != 0
    }

    /// Helper to create a mask from multiple layers
    pub fn mask(layers: &[u32]) -> u32 {
        layers.iter().fold(0, |acc, &layer| acc | layer)
    }
}
