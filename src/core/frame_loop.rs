//! Host-driven frame loop.
//!
//! The engine never owns the animation callback. The host calls
//! [`FrameLoop::tick`] once per animation frame (or timer tick) and every
//! registered listener receives a [`FrameEvent`].

#[cfg(all(feature = "web", target_arch = "wasm32"))]
use web_sys::window;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Data passed to frame listeners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameEvent {
    /// Frames dispatched since the loop started, starting at 1.
    pub frame: u64,
    /// Host timestamp in milliseconds.
    pub timestamp: f64,
    /// Milliseconds since the previous frame (0 for the first).
    pub delta: f64,
}

/// Identifies a registered listener for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&FrameEvent)>;

/// Dispatches frame events to listeners and tracks frame timing.
pub struct FrameLoop {
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
    running: bool,
    frame: u64,
    last_timestamp: Option<f64>,
    average_delta: f64,
    frames_to_average: u32,

    #[cfg(not(target_arch = "wasm32"))]
    origin: Instant,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameLoop {
    /// Create a stopped loop averaging over 60 frames.
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_listener: 0,
            running: false,
            frame: 0,
            last_timestamp: None,
            average_delta: 0.0,
            frames_to_average: 60,
            #[cfg(not(target_arch = "wasm32"))]
            origin: Instant::now(),
        }
    }

    /// Register a listener; it is called on every dispatched frame.
    pub fn add_listener(&mut self, listener: impl FnMut(&FrameEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener, _)| *listener != id);
        self.listeners.len() != before
    }

    /// Start dispatching. Restarting resets frame count and timing.
    pub fn start(&mut self) {
        self.running = true;
        self.frame = 0;
        self.last_timestamp = None;
        self.average_delta = 0.0;
        log::debug!("Frame loop started");
    }

    /// Stop dispatching; ticks are ignored until the next start.
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            log::debug!("Frame loop stopped after {} frames", self.frame);
        }
    }

    /// Whether the loop is running.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Set how many frames the fps average spans.
    pub fn set_frames_to_average(&mut self, frames: u32) {
        self.frames_to_average = frames.max(1);
    }

    /// Smoothed frames per second, 0 before two frames have been seen.
    pub fn fps_average(&self) -> f64 {
        if self.average_delta > 0.0 {
            1000.0 / self.average_delta
        } else {
            0.0
        }
    }

    /// Dispatch one frame at the host `timestamp` (milliseconds).
    pub fn tick(&mut self, timestamp: f64) -> Option<FrameEvent> {
        if !self.running {
            return None;
        }

        let delta = self.last_timestamp.map_or(0.0, |last| (timestamp - last).max(0.0));
        if self.last_timestamp.is_some() {
            let n = f64::from(self.frames_to_average);
            self.average_delta = if self.average_delta == 0.0 {
                delta
            } else {
                (self.average_delta * (n - 1.0) + delta) / n
            };
        }
        self.last_timestamp = Some(timestamp);
        self.frame += 1;

        let event = FrameEvent {
            frame: self.frame,
            timestamp,
            delta,
        };
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
        Some(event)
    }

    /// Dispatch one frame stamped with the loop's own clock.
    pub fn tick_now(&mut self) -> Option<FrameEvent> {
        let now = self.now();
        self.tick(now)
    }

    /// Without a browser clock on wasm32 the last timestamp is repeated.
    fn now(&self) -> f64 {
        #[cfg(all(feature = "web", target_arch = "wasm32"))]
        {
            window()
                .and_then(|w| w.performance())
                .map(|p| p.now())
                .unwrap_or(0.0)
        }

        #[cfg(all(not(feature = "web"), target_arch = "wasm32"))]
        {
            self.last_timestamp.unwrap_or(0.0)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            self.origin.elapsed().as_secs_f64() * 1000.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_loop_starts_stopped() {
        let mut frame_loop = FrameLoop::new();
        assert!(!frame_loop.is_running());
        assert_eq!(frame_loop.tick(16.0), None);
    }

    #[test]
    fn test_listeners_receive_events() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut frame_loop = FrameLoop::new();
        let sink = Rc::clone(&seen);
        let id = frame_loop.add_listener(move |e| sink.borrow_mut().push(*e));

        frame_loop.start();
        frame_loop.tick(100.0);
        frame_loop.tick(116.0);
        assert!(frame_loop.remove_listener(id));
        frame_loop.tick(132.0);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], FrameEvent { frame: 1, timestamp: 100.0, delta: 0.0 });
        assert_eq!(seen[1], FrameEvent { frame: 2, timestamp: 116.0, delta: 16.0 });
    }

    #[test]
    fn test_fps_average() {
        let mut frame_loop = FrameLoop::new();
        frame_loop.start();
        for i in 0..10 {
            frame_loop.tick(f64::from(i) * 20.0);
        }
        assert!((frame_loop.fps_average() - 50.0).abs() < 1e-9);
        frame_loop.stop();
        assert!(!frame_loop.is_running());
    }

    #[test]
    fn test_tick_now_uses_native_clock() {
        let mut frame_loop = FrameLoop::new();
        frame_loop.start();
        let first = frame_loop.tick_now().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = frame_loop.tick_now().unwrap();
        assert!(first.timestamp >= 0.0);
        assert!(second.timestamp > first.timestamp);
        assert!(second.delta > 0.0);
    }
}
