//! End-to-end tests for the rendering context.
//!
//! These tests drive a [`Context`] the way an application would: draw
//! pixels, render, overlay text, and flush to an in-memory sink.

use aa_render::ascii::*;
use aa_render::{AaError, MemoryCapture};

fn context(width: usize, height: usize) -> Context {
    Context::open(HardwareParams {
        width,
        height,
        ..HardwareParams::default()
    })
    .unwrap()
}

#[test]
fn test_open_rejects_bad_geometry() {
    for hw in [
        HardwareParams {
            width: 0,
            ..HardwareParams::default()
        },
        HardwareParams {
            mulx: 0,
            ..HardwareParams::default()
        },
        HardwareParams {
            supported: AttrMask::ALL,
            ..HardwareParams::default()
        },
    ] {
        assert!(matches!(Context::open(hw), Err(AaError::Config(_))));
    }
}

#[test]
fn test_default_geometry() {
    let ctx = Context::open(HardwareParams::default()).unwrap();
    assert_eq!((ctx.scrwidth(), ctx.scrheight()), (80, 25));
    assert_eq!((ctx.imgwidth(), ctx.imgheight()), (160, 50));
    assert_eq!((ctx.mulx(), ctx.muly()), (2, 2));
}

#[test]
fn test_pixel_writes_are_clipped() {
    let mut ctx = context(4, 2);
    assert!(ctx.putpixel(7, 3, 10));
    assert!(!ctx.putpixel(8, 0, 10));
    assert!(!ctx.putpixel(0, 4, 10));

    // Span starting near the end of the buffer is truncated.
    let written = ctx.putpixels(6, 3, &[1, 2, 3, 4]);
    assert_eq!(written, 2);
    assert_eq!(ctx.pixels(6, 3, 10), &[1, 2]);

    // Span runs on across row ends.
    ctx.putpixels(7, 0, &[9, 9]);
    assert_eq!(ctx.image().get(7, 0), Some(9));
    assert_eq!(ctx.image().get(0, 1), Some(9));

    // Reads past the end are empty.
    assert!(ctx.pixels(0, 100, 5).is_empty());
}

#[test]
fn test_puts_clips_at_row_end() {
    let mut ctx = context(6, 2);
    let written = ctx.puts(3, 0, Attr::Reverse, "abcdef");
    assert_eq!(written, 3);
    assert_eq!(ctx.text().row(0).0, b"   abc");
    assert_eq!(ctx.text().row(1).0, b"      ");
    assert_eq!(ctx.puts(0, 5, Attr::Normal, "x"), 0);
}

#[test]
fn test_render_region_leaves_other_cells() {
    let mut ctx = context(10, 4);
    ctx.image_mut().fill_with(|_, _| 255);
    ctx.puts(0, 0, Attr::Dim, "##########");
    ctx.render(&RenderParams::default(), Region::new(0, 1, 10, 4))
        .unwrap();

    assert_eq!(ctx.text().row(0).0, b"##########");
    let table = ctx.table().unwrap();
    let bright = table.bucket(255);
    assert_eq!(ctx.text().get(3, 2), Some((bright.glyph, bright.attr)));
}

#[test]
fn test_render_clips_oversized_region() {
    let mut ctx = context(10, 4);
    ctx.render(&RenderParams::default(), Region::new(5, 2, 100, 100))
        .unwrap();
    assert_eq!(ctx.text().get(9, 3), Some((b' ', Attr::Normal)));
}

#[test]
fn test_state_error_before_first_render() {
    let mut ctx = context(10, 4);
    assert!(matches!(
        ctx.backconvert(Region::full(10, 4)),
        Err(AaError::State(_))
    ));
    ctx.render_all(&RenderParams::default()).unwrap();
    assert!(ctx.backconvert(Region::full(10, 4)).is_ok());
}

#[test]
fn test_params_change_rebuilds_table() {
    let mut ctx = context(10, 4);
    ctx.render_all(&RenderParams::default()).unwrap();
    let before = ctx.table().unwrap();
    ctx.render_all(&RenderParams {
        gamma: 2.0,
        ..RenderParams::default()
    })
    .unwrap();
    let after = ctx.table().unwrap();
    assert_ne!(before.key(), after.key());
    assert_eq!(after.params().gamma, 2.0);
}

#[test]
fn test_fastrender_without_table_uses_defaults() {
    let mut ctx = context(10, 4);
    ctx.fastrender(Region::full(10, 4)).unwrap();
    let table = ctx.table().unwrap();
    assert_eq!(table.params().contrast, NORMAL_CONTRAST);
}

#[test]
fn test_pixels_from_text() {
    let mut ctx = context(4, 2);
    ctx.image_mut().fill_with(|x, _| if x < 4 { 0 } else { 255 });
    ctx.render_all(&RenderParams {
        dither: Dither::None,
        ..RenderParams::default()
    })
    .unwrap();

    let (top, bottom) = ctx.pixels_from_text(0, 0, 4).unwrap();
    assert_eq!(top.len(), 8);
    assert_eq!(bottom.len(), 8);
    assert!(top[..4].iter().all(|&v| v == 0));
    let right: u32 = top[4..].iter().chain(&bottom[4..]).map(|&v| v as u32).sum();
    assert!(right > 0);
}

#[test]
fn test_backconvert_fills_cell_blocks() {
    let mut ctx = Context::open(HardwareParams {
        width: 2,
        height: 1,
        mulx: 4,
        muly: 2,
        ..HardwareParams::default()
    })
    .unwrap();
    ctx.render_all(&RenderParams::default()).unwrap();
    ctx.puts(0, 0, Attr::Normal, "_");
    ctx.backconvert(Region::new(0, 0, 1, 1)).unwrap();

    let [tl, tr, bl, br] = ctx.table().unwrap().subpixels(b'_', Attr::Normal);
    // Each sub-pixel covers a 2x1 block.
    assert_eq!(ctx.pixels(0, 0, 4), &[tl, tl, tr, tr]);
    assert_eq!(ctx.pixels(0, 1, 4), &[bl, bl, br, br]);
}

#[test]
fn test_resize_then_render() {
    let mut ctx = context(10, 4);
    ctx.render_all(&RenderParams::default()).unwrap();
    ctx.resize(30, 12).unwrap();
    assert_eq!((ctx.imgwidth(), ctx.imgheight()), (60, 24));
    ctx.image_mut().fill_with(|_, _| 255);
    ctx.render_all(&RenderParams::default()).unwrap();

    let bright = ctx.table().unwrap().bucket(255);
    assert_eq!(ctx.text().get(29, 11), Some((bright.glyph, bright.attr)));
}

#[test]
fn test_copy_image_between_contexts() {
    let mut src = context(10, 4);
    src.image_mut().fill_with(|x, y| (x + y) as u8);
    let mut dst = context(5, 2);
    dst.copy_image_from(&src);
    assert_eq!(dst.pixels(0, 1, 10), src.pixels(0, 1, 10));
}

#[test]
fn test_flush_to_memory_capture() {
    let mut ctx = context(12, 3);
    ctx.render_all(&RenderParams::default()).unwrap();
    ctx.puts(1, 1, Attr::Bold, "hello");

    let mut sink = MemoryCapture::new();
    ctx.flush(&mut sink).unwrap();
    let captured = sink.last().unwrap();
    assert_eq!(captured, ctx.text());
    assert_eq!(&captured.row(1).0[1..6], b"hello");
    assert_eq!(captured.row(1).1[1], Attr::Bold);
}

#[test]
fn test_custom_font() {
    // Every glyph solid except space.
    let mut data = vec![0xffu8; GLYPHS * 8];
    data[b' ' as usize * 8..(b' ' as usize + 1) * 8].fill(0);
    let font = Font::new("solid", 8, data).unwrap();

    let mut ctx = context(4, 1);
    ctx.set_font(font);
    assert_eq!(ctx.font_metrics().name(), "solid");
    ctx.image_mut().fill_with(|_, _| 255);
    ctx.render_all(&RenderParams::default()).unwrap();
    let (ch, _) = ctx.text().get(0, 0).unwrap();
    assert_ne!(ch, b' ');
}
