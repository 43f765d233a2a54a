//! Taffy-backed layout host.
//!
//! [`LayoutHost`] owns a Taffy tree for the panel a gauge lives in. Each
//! [`LayoutHost::resize_viewport`] recomputes layout and notifies observers
//! whose content box changed, which makes it a [`ResizeSource`] for
//! [`SizeTracker`](super::SizeTracker).
//!
//! Listeners may relayout from inside a notification. Nested notifications
//! are queued and delivered after the current one returns, in order.

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::rc::{Rc, Weak};

use taffy::prelude::{AvailableSpace, Size, Style, TaffyTree};
use taffy::{Layout, NodeId};
use thiserror::Error;
use tracing::{debug, trace, warn};

use super::size_tracker::{ResizeListener, ResizeSource, SizeSample, Subscription};

/// Errors from the layout host.
#[derive(Error, Debug)]
pub enum LayoutError {
    /// Taffy rejected a node operation.
    #[error("layout engine error: {0}")]
    Taffy(#[from] taffy::TaffyError),

    /// `resize_viewport` was called before a root node was set.
    #[error("layout root not set")]
    NoRoot,

    /// The node was not created by this host.
    #[error("node {0:?} does not belong to this layout host")]
    UnknownNode(NodeId),
}

pub type Result<T> = std::result::Result<T, LayoutError>;

struct Observer {
    id: u64,
    node: NodeId,
    last: Option<SizeSample>,
    listener: Rc<RefCell<ResizeListener>>,
}

type Delivery = (u64, Rc<RefCell<ResizeListener>>, SizeSample);

struct HostInner {
    tree: TaffyTree<()>,
    /// Nodes created through this host; taffy panics on any other id.
    nodes: HashSet<NodeId>,
    root: Option<NodeId>,
    viewport: Option<SizeSample>,
    observers: Vec<Observer>,
    next_observer: u64,
    queued: VecDeque<Delivery>,
    delivering: bool,
}

impl HostInner {
    fn check(&self, node: NodeId) -> Result<()> {
        if self.nodes.contains(&node) {
            Ok(())
        } else {
            Err(LayoutError::UnknownNode(node))
        }
    }
}

/// Shared handle to a layout tree. Cloning shares the tree.
#[derive(Clone)]
pub struct LayoutHost {
    inner: Rc<RefCell<HostInner>>,
}

impl Default for LayoutHost {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutHost {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(HostInner {
                tree: TaffyTree::new(),
                nodes: HashSet::new(),
                root: None,
                viewport: None,
                observers: Vec::new(),
                next_observer: 0,
                queued: VecDeque::new(),
                delivering: false,
            })),
        }
    }

    pub fn new_leaf(&self, style: Style) -> Result<NodeId> {
        let mut inner = self.inner.borrow_mut();
        let node = inner.tree.new_leaf(style)?;
        inner.nodes.insert(node);
        Ok(node)
    }

    pub fn new_with_children(&self, style: Style, children: &[NodeId]) -> Result<NodeId> {
        let mut inner = self.inner.borrow_mut();
        for child in children {
            inner.check(*child)?;
        }
        let node = inner.tree.new_with_children(style, children)?;
        inner.nodes.insert(node);
        Ok(node)
    }

    pub fn set_root(&self, node: NodeId) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        inner.check(node)?;
        inner.root = Some(node);
        Ok(())
    }

    /// Replace a node's style. Takes effect on the next layout pass.
    pub fn set_style(&self, node: NodeId, style: Style) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        inner.check(node)?;
        Ok(inner.tree.set_style(node, style)?)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.inner.borrow().nodes.contains(&node)
    }

    /// Last viewport passed to [`resize_viewport`](Self::resize_viewport).
    pub fn viewport(&self) -> Option<SizeSample> {
        self.inner.borrow().viewport
    }

    pub fn observer_count(&self) -> usize {
        self.inner.borrow().observers.len()
    }

    /// Content-box size of `node` from the last layout pass.
    pub fn content_size(&self, node: NodeId) -> Result<SizeSample> {
        let inner = self.inner.borrow();
        inner.check(node)?;
        Ok(content_box(inner.tree.layout(node)?))
    }

    /// Recompute layout for a viewport and notify observers whose content
    /// box changed. Returns the number of notifications delivered.
    ///
    /// Called from inside a resize listener, the notifications are queued
    /// behind the one being delivered and this returns 0.
    pub fn resize_viewport(&self, width: f64, height: f64) -> Result<usize> {
        let deliveries = {
            let mut inner = self.inner.borrow_mut();
            let root = inner.root.ok_or(LayoutError::NoRoot)?;
            let available = Size {
                width: AvailableSpace::Definite(width.max(0.0) as f32),
                height: AvailableSpace::Definite(height.max(0.0) as f32),
            };
            inner.tree.compute_layout(root, available)?;
            inner.viewport = Some(SizeSample::new(width, height));
            debug!(width, height, "panel layout computed");
            collect_changed(&mut inner)?
        };
        Ok(self.deliver(deliveries))
    }

    /// Queue `deliveries` and, unless a delivery loop is already running
    /// further up the stack, call listeners with no host borrow held.
    /// Observers disposed by an earlier listener are skipped.
    fn deliver(&self, deliveries: Vec<Delivery>) -> usize {
        {
            let mut inner = self.inner.borrow_mut();
            inner.queued.extend(deliveries);
            if inner.delivering {
                trace!(queued = inner.queued.len(), "nested resize deferred");
                return 0;
            }
            inner.delivering = true;
        }

        let mut delivered = 0;
        loop {
            let (id, listener, size) = {
                let mut inner = self.inner.borrow_mut();
                let Some(next) = inner.queued.pop_front() else {
                    inner.delivering = false;
                    break;
                };
                if !inner.observers.iter().any(|o| o.id == next.0) {
                    continue;
                }
                next
            };
            trace!(observer = id, width = size.width, height = size.height, "resize delivered");
            (&mut *listener.borrow_mut())(size);
            delivered += 1;
        }
        delivered
    }
}

fn collect_changed(inner: &mut HostInner) -> Result<Vec<Delivery>> {
    let HostInner {
        tree, observers, ..
    } = inner;
    let mut deliveries = Vec::new();
    for observer in observers.iter_mut() {
        let size = content_box(tree.layout(observer.node)?);
        if observer.last != Some(size) {
            observer.last = Some(size);
            deliveries.push((observer.id, observer.listener.clone(), size));
        }
    }
    Ok(deliveries)
}

/// Border box minus padding and border.
fn content_box(layout: &Layout) -> SizeSample {
    let horizontal = layout.padding.left
        + layout.padding.right
        + layout.border.left
        + layout.border.right;
    let vertical =
        layout.padding.top + layout.padding.bottom + layout.border.top + layout.border.bottom;
    SizeSample::new(
        f64::from((layout.size.width - horizontal).max(0.0)),
        f64::from((layout.size.height - vertical).max(0.0)),
    )
}

impl ResizeSource for LayoutHost {
    type Element = NodeId;

    /// Delivers the current content box right away when layout has already
    /// been computed, like a freshly attached resize observer.
    ///
    /// Nodes from another host are refused with an inert subscription.
    fn observe(&self, element: &NodeId, listener: ResizeListener) -> Subscription {
        let listener = Rc::new(RefCell::new(listener));
        let (id, initial) = {
            let mut inner = self.inner.borrow_mut();
            if inner.check(*element).is_err() {
                warn!(node = ?element, "refusing to observe a node this host did not create");
                return Subscription::empty();
            }
            inner.next_observer += 1;
            let id = inner.next_observer;
            let initial = match inner.viewport {
                Some(_) => inner.tree.layout(*element).ok().map(content_box),
                None => None,
            };
            inner.observers.push(Observer {
                id,
                node: *element,
                last: initial,
                listener: listener.clone(),
            });
            (id, initial)
        };

        if let Some(size) = initial {
            self.deliver(vec![(id, listener, size)]);
        }

        let weak: Weak<RefCell<HostInner>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().observers.retain(|o| o.id != id);
            }
        })
    }
}

impl fmt::Debug for LayoutHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("LayoutHost")
            .field("root", &inner.root)
            .field("viewport", &inner.viewport)
            .field("observers", &inner.observers.len())
            .finish()
    }
}
