//! Non-blocking texture loading.
//!
//! Images decode off the render thread: on a worker thread natively, and in a
//! browser task that fetches the image on wasm32. Until a decoded image is
//! uploaded by [`TextureLoader::poll`], the texture shows a 1x1 placeholder and
//! its status stays [`TextureStatus::Pending`].

use crate::core::{ContextError, GraphicsContext, TextureHandle};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, RwLock};

/// Placeholder texel shown while an image loads (or after it failed).
pub const PLACEHOLDER_PIXEL: [u8; 4] = [170, 170, 255, 255];

/// Load state of a material texture.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TextureStatus {
    /// Decoding; the placeholder is bound.
    #[default]
    Pending,
    /// The decoded image is uploaded.
    Ready {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },
    /// Decoding failed; the placeholder stays bound.
    Failed(String),
}

/// Shared, inspectable texture status.
pub type SharedTextureStatus = Arc<RwLock<TextureStatus>>;

/// Where image bytes come from.
#[derive(Debug, Clone)]
pub enum TextureSource {
    /// A file on disk, or a URL fetched by the browser on wasm32.
    Path(PathBuf),
    /// An encoded image already in memory.
    Bytes(Arc<[u8]>),
}

#[derive(Debug)]
struct DecodedImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

#[derive(Debug)]
struct Completed {
    texture: TextureHandle,
    status: SharedTextureStatus,
    result: Result<DecodedImage, String>,
}

fn decode(source: &TextureSource) -> Result<DecodedImage, String> {
    let image = match source {
        TextureSource::Path(path) => image::open(path).map_err(|e| format!("{}: {e}", path.display()))?,
        TextureSource::Bytes(bytes) => image::load_from_memory(bytes).map_err(|e| format!("Failed to decode image: {e}"))?,
    };
    let rgba = image.to_rgba8();
    Ok(DecodedImage {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

#[cfg(all(target_arch = "wasm32", feature = "web"))]
async fn fetch_bytes(source: TextureSource) -> Result<Arc<[u8]>, String> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let path = match source {
        TextureSource::Bytes(bytes) => return Ok(bytes),
        TextureSource::Path(path) => path,
    };
    let url = path.to_string_lossy().into_owned();
    let window = web_sys::window().ok_or("No window to fetch textures with")?;

    let response = JsFuture::from(window.fetch_with_str(&url))
        .await
        .map_err(|e| format!("{url}: {e:?}"))?;
    let response: web_sys::Response = response
        .dyn_into()
        .map_err(|_| format!("{url}: fetch did not return a response"))?;
    if !response.ok() {
        return Err(format!("{url}: HTTP {}", response.status()));
    }
    let buffer = response.array_buffer().map_err(|e| format!("{url}: {e:?}"))?;
    let buffer = JsFuture::from(buffer).await.map_err(|e| format!("{url}: {e:?}"))?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec().into())
}

pub(crate) fn set_status(status: &RwLock<TextureStatus>, value: TextureStatus) {
    match status.write() {
        Ok(mut guard) => *guard = value,
        Err(poisoned) => *poisoned.into_inner() = value,
    }
}

/// Read a shared status, tolerating a poisoned lock.
pub fn read_status(status: &RwLock<TextureStatus>) -> TextureStatus {
    match status.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Decodes images in the background and uploads them when polled.
#[derive(Debug)]
pub struct TextureLoader {
    sender: Sender<Completed>,
    receiver: Receiver<Completed>,
    in_flight: usize,
}

impl Default for TextureLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureLoader {
    /// Create an idle loader.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            in_flight: 0,
        }
    }

    /// Upload the placeholder into `texture` and start decoding `source` for it.
    pub fn load(
        &mut self,
        gl: &mut dyn GraphicsContext,
        texture: TextureHandle,
        source: TextureSource,
        status: SharedTextureStatus,
    ) -> Result<(), ContextError> {
        gl.texture_image(texture, 1, 1, &PLACEHOLDER_PIXEL)?;
        set_status(&status, TextureStatus::Pending);

        // Sends fail only when the loader was dropped.
        let sender = self.sender.clone();

        #[cfg(not(target_arch = "wasm32"))]
        std::thread::spawn(move || {
            let result = decode(&source);
            let _ = sender.send(Completed { texture, status, result });
        });

        #[cfg(all(target_arch = "wasm32", feature = "web"))]
        wasm_bindgen_futures::spawn_local(async move {
            let result = match fetch_bytes(source).await {
                Ok(bytes) => decode(&TextureSource::Bytes(bytes)),
                Err(message) => Err(message),
            };
            let _ = sender.send(Completed { texture, status, result });
        });

        // Without a browser there is no task queue to defer to.
        #[cfg(all(target_arch = "wasm32", not(feature = "web")))]
        {
            let result = decode(&source);
            let _ = sender.send(Completed { texture, status, result });
        }

        self.in_flight += 1;
        Ok(())
    }

    /// Number of loads not yet uploaded.
    #[inline]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Upload every image decoded so far. Returns how many loads finished.
    pub fn poll(&mut self, gl: &mut dyn GraphicsContext) -> Result<usize, ContextError> {
        let mut finished = 0;
        while let Ok(done) = self.receiver.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            finished += 1;
            match done.result {
                Ok(image) => {
                    gl.texture_image(done.texture, image.width, image.height, &image.rgba)?;
                    set_status(
                        &done.status,
                        TextureStatus::Ready {
                            width: image.width,
                            height: image.height,
                        },
                    );
                }
                Err(message) => {
                    log::warn!("Texture load failed: {message}");
                    set_status(&done.status, TextureStatus::Failed(message));
                }
            }
        }
        Ok(finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GlCommand, RecordingContext};
    use std::io::Cursor;
    use std::time::{Duration, Instant};

    fn png_bytes(width: u32, height: u32) -> Arc<[u8]> {
        let image = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes.into()
    }

    fn poll_until_idle(loader: &mut TextureLoader, gl: &mut RecordingContext) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while loader.in_flight() > 0 && Instant::now() < deadline {
            loader.poll(gl).unwrap();
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_placeholder_then_image() {
        let mut gl = RecordingContext::new(1, 1);
        let mut loader = TextureLoader::new();
        let texture = gl.create_texture();
        let status = SharedTextureStatus::default();

        loader
            .load(&mut gl, texture, TextureSource::Bytes(png_bytes(4, 2)), Arc::clone(&status))
            .unwrap();
        assert_eq!(
            gl.commands().last(),
            Some(&GlCommand::TextureImage { texture, width: 1, height: 1 })
        );
        assert_eq!(read_status(&status), TextureStatus::Pending);

        poll_until_idle(&mut loader, &mut gl);
        assert_eq!(read_status(&status), TextureStatus::Ready { width: 4, height: 2 });
        assert_eq!(
            gl.commands().last(),
            Some(&GlCommand::TextureImage { texture, width: 4, height: 2 })
        );
    }

    #[test]
    fn test_missing_file_fails_and_keeps_placeholder() {
        let mut gl = RecordingContext::new(1, 1);
        let mut loader = TextureLoader::new();
        let texture = gl.create_texture();
        let status = SharedTextureStatus::default();

        let source = TextureSource::Path(PathBuf::from("/definitely/not/here.png"));
        loader.load(&mut gl, texture, source, Arc::clone(&status)).unwrap();
        poll_until_idle(&mut loader, &mut gl);

        assert!(matches!(read_status(&status), TextureStatus::Failed(_)));
        let uploads = gl
            .commands()
            .iter()
            .filter(|c| matches!(c, GlCommand::TextureImage { .. }))
            .count();
        assert_eq!(uploads, 1);
    }
}
