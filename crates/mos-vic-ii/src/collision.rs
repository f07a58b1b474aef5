//! Sprite collision detection for one 8-pixel block.
//!
//! Masks use bit 7 for the leftmost pixel. Callers remove border pixels
//! from every mask first: only drawn pixels collide.

/// Sprites (as a $1F bit set) whose opaque pixels overlap foreground
/// graphics.
#[must_use]
pub fn sprite_data_collisions(graphics_mask: u8, sprite_masks: &[u8; 8]) -> u8 {
    sprite_masks
        .iter()
        .enumerate()
        .filter(|(_, mask)| *mask & graphics_mask != 0)
        .fold(0, |acc, (n, _)| acc | 1 << n)
}

/// Sprites (as a $1E bit set) that overlap at least one other sprite.
#[must_use]
pub fn sprite_sprite_collisions(sprite_masks: &[u8; 8]) -> u8 {
    let mut seen = 0u8;
    let mut overlap = 0u8;
    for &mask in sprite_masks {
        overlap |= seen & mask;
        seen |= mask;
    }
    if overlap == 0 {
        return 0;
    }
    sprite_masks
        .iter()
        .enumerate()
        .filter(|(_, mask)| *mask & overlap != 0)
        .fold(0, |acc, (n, _)| acc | 1 << n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_collision_needs_shared_pixel() {
        let mut masks = [0u8; 8];
        masks[2] = 0b0000_1111;
        masks[5] = 0b1000_0000;
        assert_eq!(sprite_data_collisions(0b0000_0001, &masks), 0b0000_0100);
        assert_eq!(sprite_data_collisions(0b1000_0001, &masks), 0b0010_0100);
        assert_eq!(sprite_data_collisions(0b0111_0000, &masks), 0);
    }

    #[test]
    fn both_sprites_of_a_pair_are_flagged() {
        let mut masks = [0u8; 8];
        masks[0] = 0b1100_0000;
        masks[7] = 0b0100_0000;
        assert_eq!(sprite_sprite_collisions(&masks), 0b1000_0001);
    }

    #[test]
    fn adjacent_sprites_do_not_collide() {
        let mut masks = [0u8; 8];
        masks[1] = 0b1111_0000;
        masks[3] = 0b0000_1111;
        assert_eq!(sprite_sprite_collisions(&masks), 0);
    }

    #[test]
    fn every_overlapping_sprite_is_reported_once() {
        let mut masks = [0u8; 8];
        masks[1] = 0b0001_0000;
        masks[2] = 0b0001_0000;
        masks[4] = 0b0001_0001;
        masks[6] = 0b0000_0010;
        assert_eq!(sprite_sprite_collisions(&masks), 0b0001_0110);
    }
}
