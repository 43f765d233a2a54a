//! Container size observation.
//!
//! A [`ResizeSource`] is whatever the host uses to learn about layout
//! changes; it hands out a [`Subscription`] that stops observation when
//! dropped. [`SizeTracker`] sits on top and keeps the latest content-box
//! size of one element, restarting the subscription when the element changes.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Content-box size of an observed element, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SizeSample {
    pub width: f64,
    pub height: f64,
}

impl SizeSample {
    /// Not yet measured.
    pub const ZERO: SizeSample = SizeSample {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A zero or non-finite width means layout has not produced a usable size.
    pub fn is_measured(&self) -> bool {
        self.width.is_finite() && self.width > 0.0
    }
}

pub type ResizeListener = Box<dyn FnMut(SizeSample)>;

/// Handle for an active observation. Dropping it stops the observation.
#[must_use = "dropping a Subscription stops the observation"]
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(dispose: impl FnOnce() + 'static) -> Self {
        Self {
            dispose: Some(Box::new(dispose)),
        }
    }

    /// A subscription with nothing to release.
    pub fn empty() -> Self {
        Self { dispose: None }
    }

    /// Stop observing now.
    pub fn dispose(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.dispose.is_some())
            .finish()
    }
}

/// Host-side resize notifications, callback- or poll-driven.
pub trait ResizeSource {
    type Element: Clone + PartialEq + fmt::Debug;

    /// Start delivering content-box sizes of `element` to `listener`.
    ///
    /// The listener may be called immediately if a measurement is already
    /// available, but never while the source holds internal borrows.
    fn observe(&self, element: &Self::Element, listener: ResizeListener) -> Subscription;
}

type SizeListeners = Rc<RefCell<Vec<ResizeListener>>>;

/// Latest size of one observed element.
pub struct SizeTracker<S: ResizeSource> {
    source: S,
    element: Option<S::Element>,
    latest: Rc<Cell<SizeSample>>,
    listeners: SizeListeners,
    subscription: Option<Subscription>,
}

impl<S: ResizeSource> SizeTracker<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            element: None,
            latest: Rc::new(Cell::new(SizeSample::ZERO)),
            listeners: Rc::new(RefCell::new(Vec::new())),
            subscription: None,
        }
    }

    /// Observe `element`, replacing any previous observation.
    ///
    /// Passing the element already observed is a no-op. Switching elements
    /// resets the size to [`SizeSample::ZERO`] until the new element is
    /// measured. `None` stops observing.
    pub fn observe(&mut self, element: Option<S::Element>) {
        if element == self.element {
            return;
        }

        // Release the old subscription before the new one can deliver.
        self.subscription = None;
        self.latest.set(SizeSample::ZERO);
        self.element = element.clone();
        debug!(element = ?element, "size tracker retargeted");

        let Some(element) = element else {
            return;
        };

        let latest = self.latest.clone();
        let listeners = self.listeners.clone();
        self.subscription = Some(self.source.observe(
            &element,
            Box::new(move |size| {
                if latest.get() == size {
                    return;
                }
                latest.set(size);
                notify(&listeners, size);
            }),
        ));
    }

    /// Stop observing and release the host subscription.
    pub fn unobserve(&mut self) {
        self.observe(None);
    }

    /// Latest measured size, `ZERO` until the first measurement.
    pub fn size(&self) -> SizeSample {
        self.latest.get()
    }

    pub fn element(&self) -> Option<&S::Element> {
        self.element.as_ref()
    }

    pub fn is_observing(&self) -> bool {
        self.subscription.is_some()
    }

    /// Called with every size change of the observed element.
    pub fn on_resize(&self, listener: impl FnMut(SizeSample) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: ResizeSource> fmt::Debug for SizeTracker<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SizeTracker")
            .field("element", &self.element)
            .field("size", &self.latest.get())
            .field("observing", &self.subscription.is_some())
            .finish()
    }
}

fn notify(listeners: &SizeListeners, size: SizeSample) {
    let mut current = std::mem::take(&mut *listeners.borrow_mut());
    for listener in current.iter_mut() {
        listener(size);
    }
    let mut slot = listeners.borrow_mut();
    current.append(&mut slot);
    *slot = current;
}
