//! Indexed 320x240 framebuffer and the hardware sprite blitter.
//!
//! The grid stores one 4-bit color index per pixel. Index 0 is transparent
//! when blitting sprites; the background color index is substituted for it
//! at composite time and is always opaque.

use retrochip_common::Color;

use crate::memory::Memory;
use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};

pub const PALETTE_SIZE: usize = 16;

/// Power-on palette.
pub const DEFAULT_PALETTE: [Color; PALETTE_SIZE] = [
    Color::new_rgb(0x00, 0x00, 0x00), // transparent in the foreground
    Color::new_rgb(0x00, 0x00, 0x00), // black
    Color::new_rgb(0x88, 0x88, 0x88), // gray
    Color::new_rgb(0xBF, 0x39, 0x32), // red
    Color::new_rgb(0xDE, 0x7A, 0xAE), // pink
    Color::new_rgb(0x4C, 0x3D, 0x21), // dark brown
    Color::new_rgb(0x90, 0x5F, 0x25), // brown
    Color::new_rgb(0xE4, 0x94, 0x52), // orange
    Color::new_rgb(0xEA, 0xD9, 0x79), // yellow
    Color::new_rgb(0x53, 0x7A, 0x3B), // green
    Color::new_rgb(0xAB, 0xD5, 0x4A), // light green
    Color::new_rgb(0x25, 0x2E, 0x38), // dark blue
    Color::new_rgb(0x00, 0x46, 0x7F), // blue
    Color::new_rgb(0x68, 0xAB, 0xCC), // light blue
    Color::new_rgb(0xBC, 0xDE, 0xE4), // sky blue
    Color::new_rgb(0xFF, 0xFF, 0xFF), // white
];

pub struct Graphics {
    pixels: [u8; SCREEN_WIDTH * SCREEN_HEIGHT],
    palette: [Color; PALETTE_SIZE],
    bg: u8,
    sprite_width: u8,
    sprite_height: u8,
    hflip: bool,
    vflip: bool,
    /// Raised when a frame is requested, cleared by the host once consumed.
    vblank: bool,
}

impl Default for Graphics {
    fn default() -> Self {
        Graphics {
            pixels: [0; SCREEN_WIDTH * SCREEN_HEIGHT],
            palette: DEFAULT_PALETTE,
            bg: 0,
            sprite_width: 0,
            sprite_height: 0,
            hflip: false,
            vflip: false,
            vblank: false,
        }
    }
}

impl Graphics {
    pub fn reset(&mut self) {
        *self = Graphics::default();
    }

    /// Zeroes the whole grid and resets the background index.
    pub fn clear(&mut self) {
        self.bg = 0;
        self.pixels = [0; SCREEN_WIDTH * SCREEN_HEIGHT];
    }

    pub fn set_bg(&mut self, index: u8) {
        self.bg = index & 0x0F;
    }

    #[inline]
    pub fn bg(&self) -> u8 {
        self.bg
    }

    /// Sprite dimensions for subsequent draws: `width` is in source bytes
    /// (two pixels each), `height` in rows.
    pub fn set_sprite_size(&mut self, width: u8, height: u8) {
        self.sprite_width = width;
        self.sprite_height = height;
    }

    pub fn set_flip(&mut self, horizontal: bool, vertical: bool) {
        self.hflip = horizontal;
        self.vflip = vertical;
    }

    #[inline]
    pub fn sprite_size(&self) -> (u8, u8) {
        (self.sprite_width, self.sprite_height)
    }

    #[inline]
    pub fn flip(&self) -> (bool, bool) {
        (self.hflip, self.vflip)
    }

    #[inline]
    pub fn vblank(&self) -> bool {
        self.vblank
    }

    pub fn set_vblank(&mut self, raised: bool) {
        self.vblank = raised;
    }

    /// Hands the index grid to the host and raises the frame flag.
    pub fn request_frame(&mut self) -> &[u8] {
        self.vblank = true;
        &self.pixels
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn palette(&self) -> &[Color; PALETTE_SIZE] {
        &self.palette
    }

    /// Replaces all 16 palette entries with R,G,B byte triplets read from
    /// memory starting at `address`.
    pub fn load_palette(&mut self, memory: &Memory, address: u16) {
        let mut cursor = address;
        for entry in self.palette.iter_mut() {
            let r = memory.read_byte(cursor);
            let g = memory.read_byte(cursor.wrapping_add(1));
            let b = memory.read_byte(cursor.wrapping_add(2));
            *entry = Color::new_rgb(r, g, b);
            cursor = cursor.wrapping_add(3);
        }
        log::debug!("palette loaded from {:#06x}", address);
    }

    /// Blits `sprite_height` rows of `sprite_width` source bytes from
    /// `address` onto the grid at (`origin_x`, `origin_y`). Each source byte
    /// packs two pixels, high nibble on the left before flipping. Flips
    /// mirror positions within the sprite's own extent. Pixel value 0 is
    /// transparent and never written. Returns true if any written pixel
    /// overwrote an already non-transparent one.
    pub fn draw_sprite(
        &mut self,
        memory: &Memory,
        address: u16,
        origin_x: i32,
        origin_y: i32,
    ) -> bool {
        let width = i32::from(self.sprite_width);
        let height = i32::from(self.sprite_height);
        let mut cursor = address;
        let mut hit = false;

        for row in 0..height {
            for byte_col in 0..width {
                let packed = memory.read_byte(cursor);
                cursor = cursor.wrapping_add(1);

                for (offset, index) in [packed >> 4, packed & 0x0F].into_iter().enumerate() {
                    let sprite_x = byte_col * 2 + offset as i32;
                    let x = if self.hflip {
                        width * 2 - 1 - sprite_x
                    } else {
                        sprite_x
                    };
                    let y = if self.vflip { height - 1 - row } else { row };
                    hit |= self.plot(origin_x + x, origin_y + y, index);
                }
            }
        }
        hit
    }

    /// Writes a single sprite pixel, reporting whether it hit an existing
    /// non-transparent pixel. Off-grid and transparent pixels are skipped.
    fn plot(&mut self, x: i32, y: i32, index: u8) -> bool {
        if index == 0 {
            return false;
        }
        if x < 0 || y < 0 || x >= SCREEN_WIDTH as i32 || y >= SCREEN_HEIGHT as i32 {
            return false;
        }
        let cell = &mut self.pixels[y as usize * SCREEN_WIDTH + x as usize];
        let hit = *cell != 0;
        *cell = index;
        hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(graphics: &Graphics, x: usize, y: usize) -> u8 {
        graphics.pixels()[y * SCREEN_WIDTH + x]
    }

    /// 2x2-pixel sprite (one source byte per row).
    fn sprite_2x2(memory: &mut Memory, address: u16, rows: [u8; 2]) {
        memory.write_byte(address, rows[0]);
        memory.write_byte(address.wrapping_add(1), rows[1]);
    }

    #[test]
    fn clear_resets_grid_and_background() {
        let mut graphics = Graphics::default();
        graphics.set_bg(0x7);
        graphics.pixels[42] = 0xF;
        graphics.clear();
        assert_eq!(graphics.bg(), 0);
        assert!(graphics.pixels().iter().all(|&p| p == 0));
    }

    #[test]
    fn opaque_pixel_on_empty_grid_reports_no_collision() {
        let mut memory = Memory::default();
        memory.write_byte(0x1000, 0xF0);
        let mut graphics = Graphics::default();
        graphics.set_sprite_size(1, 1);
        assert!(!graphics.draw_sprite(&memory, 0x1000, 10, 10));
        assert_eq!(pixel(&graphics, 10, 10), 0xF);
    }

    #[test]
    fn opaque_pixel_on_opaque_pixel_reports_collision() {
        let mut memory = Memory::default();
        memory.write_byte(0x1000, 0xF0);
        let mut graphics = Graphics::default();
        graphics.set_sprite_size(1, 1);
        graphics.draw_sprite(&memory, 0x1000, 10, 10);
        assert!(graphics.draw_sprite(&memory, 0x1000, 10, 10));
    }

    #[test]
    fn transparent_pixels_preserve_destination_and_never_collide() {
        let mut memory = Memory::default();
        memory.write_byte(0x1000, 0xF0); // left opaque, right transparent
        let mut graphics = Graphics::default();
        graphics.set_sprite_size(1, 1);
        graphics.pixels[10 * SCREEN_WIDTH + 11] = 0x3;
        assert!(!graphics.draw_sprite(&memory, 0x1000, 10, 10));
        assert_eq!(pixel(&graphics, 11, 10), 0x3);
    }

    #[test]
    fn horizontal_flip_mirrors_columns() {
        let mut memory = Memory::default();
        sprite_2x2(&mut memory, 0x1000, [0x12, 0x34]);
        let mut graphics = Graphics::default();
        graphics.set_sprite_size(1, 2);
        graphics.draw_sprite(&memory, 0x1000, 0, 0);
        let plain = [
            pixel(&graphics, 0, 0),
            pixel(&graphics, 1, 0),
            pixel(&graphics, 0, 1),
            pixel(&graphics, 1, 1),
        ];
        assert_eq!(plain, [0x1, 0x2, 0x3, 0x4]);

        graphics.clear();
        graphics.set_flip(true, false);
        graphics.draw_sprite(&memory, 0x1000, 0, 0);
        let flipped = [
            pixel(&graphics, 0, 0),
            pixel(&graphics, 1, 0),
            pixel(&graphics, 0, 1),
            pixel(&graphics, 1, 1),
        ];
        assert_eq!(flipped, [0x2, 0x1, 0x4, 0x3]);
    }

    #[test]
    fn vertical_flip_mirrors_rows() {
        let mut memory = Memory::default();
        sprite_2x2(&mut memory, 0x1000, [0x12, 0x34]);
        let mut graphics = Graphics::default();
        graphics.set_sprite_size(1, 2);
        graphics.set_flip(false, true);
        graphics.draw_sprite(&memory, 0x1000, 0, 0);
        assert_eq!(pixel(&graphics, 0, 0), 0x3);
        assert_eq!(pixel(&graphics, 1, 0), 0x4);
        assert_eq!(pixel(&graphics, 0, 1), 0x1);
        assert_eq!(pixel(&graphics, 1, 1), 0x2);
    }

    #[test]
    fn off_grid_pixels_are_skipped_silently() {
        let mut memory = Memory::default();
        sprite_2x2(&mut memory, 0x1000, [0xFF, 0xFF]);
        let mut graphics = Graphics::default();
        graphics.set_sprite_size(1, 2);
        // Straddles the top-left corner: only (0, 0) lands on the grid.
        assert!(!graphics.draw_sprite(&memory, 0x1000, -1, -1));
        assert_eq!(pixel(&graphics, 0, 0), 0xF);
        assert_eq!(pixel(&graphics, 1, 0), 0);
        assert_eq!(pixel(&graphics, 0, 1), 0);

        // Entirely past the bottom-right corner: nothing written anywhere.
        graphics.clear();
        graphics.draw_sprite(&memory, 0x1000, SCREEN_WIDTH as i32, SCREEN_HEIGHT as i32);
        assert!(graphics.pixels().iter().all(|&p| p == 0));
    }

    #[test]
    fn request_frame_raises_the_frame_flag() {
        let mut graphics = Graphics::default();
        assert!(!graphics.vblank());
        graphics.request_frame();
        assert!(graphics.vblank());
        graphics.set_vblank(false);
        assert!(!graphics.vblank());
    }

    #[test]
    fn load_palette_reads_rgb_triplets() {
        let mut memory = Memory::default();
        for (offset, byte) in (0u8..48).enumerate() {
            memory.write_byte(0x3000 + offset as u16, byte);
        }
        let mut graphics = Graphics::default();
        graphics.load_palette(&memory, 0x3000);
        assert_eq!(graphics.palette()[0], Color::new_rgb(0, 1, 2));
        assert_eq!(graphics.palette()[15], Color::new_rgb(45, 46, 47));
    }
}
