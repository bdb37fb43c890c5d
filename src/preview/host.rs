//! Host side of an embedded preview
//!
//! The host reserves space for the embedded document at a default 16:9 ratio
//! and switches to the ratio the content reports once its first size message
//! arrives. Messages travel over a channel owned by the host: dropping the
//! host closes the channel, so nothing posted afterwards is ever delivered.

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::layout::ContainerSize;

use super::message::PreviewMessage;

/// Ratio reserved before the content reports its size
pub const DEFAULT_ASPECT_RATIO: f64 = 16.0 / 9.0;

/// Sending half handed to the embedded content
#[derive(Debug, Clone)]
pub struct MessagePort {
    sender: UnboundedSender<PreviewMessage>,
}

impl MessagePort {
    /// Post a decoded message. Returns false once the host is gone.
    pub fn post(&self, message: PreviewMessage) -> bool {
        self.sender.send(message).is_ok()
    }

    /// Post a raw message as received from the content. Unrecognized
    /// envelopes are dropped here and never reach the host.
    pub fn post_raw(&self, raw: &str) -> bool {
        match PreviewMessage::from_json(raw) {
            Ok(message) => self.post(message),
            Err(err) => {
                debug!(error = %err, "dropping preview message");
                false
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// The view embedding a rendered document
#[derive(Debug)]
pub struct PreviewHost {
    receiver: UnboundedReceiver<PreviewMessage>,
    aspect_ratio: f64,
    reported: bool,
    content_size: Option<(f64, f64)>,
    container: ContainerSize,
}

impl PreviewHost {
    /// Mount a host in `container` and return the port for its content
    pub fn mount(container: ContainerSize) -> (Self, MessagePort) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let host = Self {
            receiver,
            aspect_ratio: DEFAULT_ASPECT_RATIO,
            reported: false,
            content_size: None,
            container,
        };
        (host, MessagePort { sender })
    }

    /// Apply every pending message; returns how many were applied
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(message) => {
                    self.dispatch(message);
                    applied += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        applied
    }

    fn dispatch(&mut self, message: PreviewMessage) {
        if let Some(ratio) = message.aspect_ratio() {
            let PreviewMessage::ContentSize { width, height } = message;
            debug!(width, height, ratio, "content reported its size");
            self.aspect_ratio = ratio;
            self.content_size = Some((width, height));
            self.reported = true;
        }
    }

    /// Current width over height of the reserved area
    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    /// Whether the content has reported its size yet
    pub fn has_report(&self) -> bool {
        self.reported
    }

    pub fn resize(&mut self, container: ContainerSize) {
        self.container = container;
    }

    /// Height to reserve for the given width
    pub fn reserved_height(&self, width: f64) -> f64 {
        width / self.aspect_ratio
    }

    /// Uniform scale that fits the reported content inside the container,
    /// or `None` until both are known
    pub fn content_scale(&self) -> Option<f64> {
        let (width, height) = self.content_size?;
        if !self.container.is_measured() {
            return None;
        }
        Some((self.container.width / width).min(self.container.height / height))
    }

    /// Unmount the host, closing its channel
    pub fn teardown(self) {}
}
