//! Display-refresh scheduling.
//!
//! The host's "run this before the next repaint" primitive is abstracted as
//! [`FrameScheduler`]. [`FrameQueue`] is the in-process implementation: the
//! host (or a test) calls [`FrameQueue::run_frame`] with a timestamp once per
//! refresh and every callback queued before that call runs exactly once.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// Callback invoked with the frame timestamp in milliseconds.
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Identifies a pending frame callback for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(pub u64);

/// Schedules one-shot callbacks for the next display refresh.
///
/// Implementations must never run a callback synchronously from inside
/// `request_frame`; callers may hold internal borrows while scheduling.
pub trait FrameScheduler {
    /// Queue `callback` for the next frame.
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle;

    /// Drop a pending callback. Unknown or already-run handles are ignored.
    fn cancel_frame(&self, handle: FrameHandle);
}

#[derive(Default)]
struct QueueInner {
    next_handle: u64,
    pending: VecDeque<(FrameHandle, FrameCallback)>,
    last_frame_ms: Option<f64>,
}

/// Single-threaded frame queue with an externally supplied clock.
///
/// Cloning shares the queue.
#[derive(Clone, Default)]
pub struct FrameQueue {
    inner: Rc<RefCell<QueueInner>>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callbacks waiting for the next frame.
    pub fn pending(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.inner.borrow().pending.is_empty()
    }

    /// Timestamp passed to the most recent [`run_frame`](Self::run_frame).
    pub fn last_frame_ms(&self) -> Option<f64> {
        self.inner.borrow().last_frame_ms
    }

    /// Run every callback that was pending when this frame began, in the
    /// order they were requested. Returns how many ran.
    ///
    /// Callbacks requested during the frame wait for the next one. A
    /// callback cancelled by an earlier callback of the same frame is
    /// skipped.
    pub fn run_frame(&self, now_ms: f64) -> usize {
        let batch: Vec<FrameHandle> = {
            let mut inner = self.inner.borrow_mut();
            inner.last_frame_ms = Some(now_ms);
            inner.pending.iter().map(|(handle, _)| *handle).collect()
        };

        let mut ran = 0;
        for handle in batch {
            let callback = {
                let mut inner = self.inner.borrow_mut();
                inner
                    .pending
                    .iter()
                    .position(|(h, _)| *h == handle)
                    .and_then(|index| inner.pending.remove(index))
                    .map(|(_, callback)| callback)
            };
            if let Some(callback) = callback {
                callback(now_ms);
                ran += 1;
            }
        }
        ran
    }

    /// Drive frames every `interval_ms` starting at `start_ms` until the
    /// queue drains or `max_frames` have run. Returns the last timestamp used.
    pub fn run_until_idle(&self, start_ms: f64, interval_ms: f64, max_frames: usize) -> f64 {
        let mut now = start_ms;
        for frame in 0..max_frames {
            if self.is_idle() {
                break;
            }
            now = start_ms + frame as f64 * interval_ms;
            self.run_frame(now);
        }
        now
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle {
        let mut inner = self.inner.borrow_mut();
        inner.next_handle += 1;
        let handle = FrameHandle(inner.next_handle);
        inner.pending.push_back((handle, callback));
        handle
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        self.inner
            .borrow_mut()
            .pending
            .retain(|(h, _)| *h != handle);
    }
}

impl fmt::Debug for FrameQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("FrameQueue")
            .field("pending", &inner.pending.len())
            .field("last_frame_ms", &inner.last_frame_ms)
            .finish()
    }
}
