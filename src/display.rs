use std::error::Error;
use sdl2::pixels::Color;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::rect;
use log;

use crate::raster::Raster;

// icons are tiny, blow them up to at least this many pixels on the short side
const MIN_WINDOW_SIDE: usize = 256;

fn scale_for(width: usize, height: usize) -> usize {
    let short = usize::max(1, usize::min(width, height));
    usize::max(1, MIN_WINDOW_SIDE / short)
}

pub fn display_raster(raster: &Raster, title: &str) -> Result<(), Box<dyn Error>> {
    let scale = scale_for(raster.width, raster.height);
    log::debug!("display {}x{} raster at scale {scale}", raster.width, raster.height);
    let sdl_context = sdl2::init()?;
    let video_subsystem = sdl_context.video()?;

    let window = video_subsystem.window(title, (raster.width * scale) as u32, (raster.height * scale) as u32)
        .position_centered()
        .build()?;

    let mut canvas = window.into_canvas().build()?;
    canvas.set_draw_color(Color::RGB(64, 64, 64));
    canvas.clear();

    for y in 0..raster.height {
        for x in 0..raster.width {
            let Some(pixel) = raster.pixel(x, y) else { continue };
            if pixel.is_transparent() {
                continue;
            }
            canvas.set_draw_color(Color::RGB(pixel.r, pixel.g, pixel.b));
            let cell = rect::Rect::new((x * scale) as i32, (y * scale) as i32, scale as u32, scale as u32);
            canvas.fill_rect(cell)?;
        }
    }
    canvas.present();
    let mut event_pump = sdl_context.event_pump()?;
    'showing: loop {
        let event = event_pump.wait_event();
        match event {
            Event::Quit { .. } |
            Event::KeyDown { keycode: Some(Keycode::Escape), .. } => {
                break 'showing;
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_images_are_scaled_up() {
        assert_eq!(scale_for(16, 16), 16);
        assert_eq!(scale_for(16, 300), 16);
        assert_eq!(scale_for(512, 512), 1);
        assert_eq!(scale_for(0, 0), 256);
    }
}
