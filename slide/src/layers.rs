use rapier3d::prelude::{Group, InteractionGroups};

use crate::constants::MAX_LAYER;

/// A collision layer index in `0..=31`.
///
/// Every collider in a [`CollisionWorld`](crate::CollisionWorld) belongs to exactly one layer,
/// stored as the single membership bit of its rapier [`InteractionGroups`]. Sweep masks are
/// plain rapier [`Group`]s.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Layer(u8);

impl Layer {
    pub const DEFAULT: Layer = Layer(0);

    /// Build a layer, clamping out-of-range indices to the highest layer.
    pub fn new(index: u8) -> Self {
        if index > MAX_LAYER {
            log::warn!("Layer index {index} out of range, clamping to {MAX_LAYER}");
        }
        Self(index.min(MAX_LAYER))
    }

    /// Single-bit group for this layer.
    #[inline]
    pub fn group(self) -> Group {
        Group::from_bits_truncate(1u32 << self.0)
    }

    /// Collision groups for a collider on this layer: member of this layer only, and
    /// visible to any query whose mask includes it.
    #[inline]
    pub fn interaction_groups(self) -> InteractionGroups {
        InteractionGroups::all().with_memberships(self.group())
    }
}

/// Query-side groups for a sweep restricted to `mask`.
#[inline]
pub fn query_groups(mask: Group) -> InteractionGroups {
    InteractionGroups::all().with_filter(mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_group_is_a_single_bit() {
        assert_eq!(Layer::new(0).group().bits(), 1);
        assert_eq!(Layer::new(7).group().bits(), 1 << 7);
        assert_eq!(Layer::new(31).group().bits(), 1 << 31);
    }

    #[test]
    fn query_mask_selects_collider_layers() {
        let collider = Layer::new(4).interaction_groups();

        assert!(query_groups(Group::ALL).test(collider));
        assert!(query_groups(Layer::new(4).group()).test(collider));
        assert!(!query_groups(Group::ALL - Layer::new(4).group()).test(collider));
        assert!(!query_groups(Group::NONE).test(collider));
    }

    #[test]
    fn out_of_range_layer_clamps_to_last() {
        assert_eq!(Layer::new(200), Layer::new(MAX_LAYER));
        assert_eq!(Layer::new(200).group().bits(), 1 << MAX_LAYER);
    }
}
