//! Browser texture loading. Run with `wasm-pack test --headless --chrome -- --features web`.

#![cfg(all(target_arch = "wasm32", feature = "web"))]

use fudge::core::{GlCommand, GraphicsContext, RecordingContext};
use fudge::material::{read_status, SharedTextureStatus, TextureLoader, TextureSource, TextureStatus};
use std::io::Cursor;
use std::sync::Arc;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn png_bytes(width: u32, height: u32) -> Arc<[u8]> {
    let image = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes.into()
}

async fn next_macrotask() {
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, 0)
            .unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

async fn poll_until_idle(loader: &mut TextureLoader, gl: &mut RecordingContext) {
    for _ in 0..200 {
        loader.poll(gl).unwrap();
        if loader.in_flight() == 0 {
            return;
        }
        next_macrotask().await;
    }
}

#[wasm_bindgen_test]
async fn test_load_returns_before_decoding() {
    let mut gl = RecordingContext::new(1, 1);
    let mut loader = TextureLoader::new();
    let texture = gl.create_texture();
    let status = SharedTextureStatus::default();

    loader
        .load(&mut gl, texture, TextureSource::Bytes(png_bytes(4, 2)), Arc::clone(&status))
        .unwrap();
    assert_eq!(read_status(&status), TextureStatus::Pending);
    assert_eq!(loader.poll(&mut gl).unwrap(), 0);

    poll_until_idle(&mut loader, &mut gl).await;
    assert_eq!(read_status(&status), TextureStatus::Ready { width: 4, height: 2 });
    assert_eq!(
        gl.commands().last(),
        Some(&GlCommand::TextureImage { texture, width: 4, height: 2 })
    );
}

#[wasm_bindgen_test]
async fn test_missing_url_fails() {
    let mut gl = RecordingContext::new(1, 1);
    let mut loader = TextureLoader::new();
    let texture = gl.create_texture();
    let status = SharedTextureStatus::default();

    let source = TextureSource::Path("/definitely/not/here.png".into());
    loader.load(&mut gl, texture, source, Arc::clone(&status)).unwrap();
    assert_eq!(read_status(&status), TextureStatus::Pending);

    poll_until_idle(&mut loader, &mut gl).await;
    assert!(matches!(read_status(&status), TextureStatus::Failed(_)));
}
