//! GPUI integration.
//!
//! [`OutputHandle`] is a render target shared with a GPUI view: the view
//! reads the installed output while painting. [`spawn_render_loop`] drains a
//! [`RenderTargetAdapter`] on the window's foreground executor and notifies
//! the view whenever a repaint is due.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use gpui::{App, AsyncWindowContext, Entity, Timer, Window};

use crate::render::{RenderTarget, RenderTargetAdapter};

/// Shared handle to the output displayed by a GPUI view.
#[derive(Debug)]
pub struct OutputHandle<O> {
    output: Arc<RwLock<Option<O>>>,
    dirty: Arc<AtomicBool>,
}

impl<O> Clone for OutputHandle<O> {
    fn clone(&self) -> Self {
        Self {
            output: Arc::clone(&self.output),
            dirty: Arc::clone(&self.dirty),
        }
    }
}

impl<O> Default for OutputHandle<O> {
    fn default() -> Self {
        Self {
            output: Arc::new(RwLock::new(None)),
            dirty: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl<O> OutputHandle<O> {
    /// Create an empty handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the installed output.
    ///
    /// The output is locked for the duration of the callback.
    pub fn read<R>(&self, f: impl FnOnce(Option<&O>) -> R) -> R {
        let output = self.output.read().unwrap_or_else(PoisonError::into_inner);
        f(output.as_ref())
    }

    /// Clear the repaint flag, returning whether it was set.
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }
}

impl<O> RenderTarget<O> for OutputHandle<O> {
    fn install(&mut self, output: O) {
        let mut slot = self.output.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(output);
    }

    fn repaint(&mut self) {
        self.dirty.store(true, Ordering::Release);
    }
}

/// Poll `adapter` every `frame` and notify `view` when it asks for a repaint.
///
/// The loop stops once the window is gone.
pub fn spawn_render_loop<V, O>(
    window: &mut Window,
    cx: &mut App,
    view: Entity<V>,
    mut adapter: RenderTargetAdapter<OutputHandle<O>, O>,
    frame: Duration,
) where
    V: 'static,
    O: 'static,
{
    window
        .spawn(cx, move |cx: &mut AsyncWindowContext| {
            let mut cx = cx.clone();
            async move {
                loop {
                    Timer::after(frame).await;
                    adapter.poll(Instant::now());
                    if !adapter.target().take_dirty() {
                        continue;
                    }
                    let notified = cx.update(|_, cx| {
                        view.update(cx, |_view, view_cx| view_cx.notify());
                    });
                    if notified.is_err() {
                        tracing::debug!("window closed, stopping render loop");
                        break;
                    }
                }
            }
        })
        .detach();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_replaces_output_and_marks_dirty() {
        let handle = OutputHandle::<Vec<u8>>::new();
        let mut target = handle.clone();
        assert!(handle.read(|output| output.is_none()));
        target.install(vec![1, 2]);
        target.install(vec![3]);
        target.repaint();
        assert_eq!(handle.read(|output| output.cloned()), Some(vec![3]));
        assert!(handle.take_dirty());
        assert!(!handle.take_dirty());
    }
}
