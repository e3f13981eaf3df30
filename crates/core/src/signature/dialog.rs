use tracing::warn;

use super::{SignatureError, SignatureImage, SignaturePad, StrokePoint};

/// Receives the outcome of a signature dialog.
///
/// Exactly one of the two methods is called per dialog.
pub trait SignatureConsumer {
    fn on_save(&mut self, image: SignatureImage);
    fn on_cancel(&mut self);
}

/// Adapts a pair of closures to [`SignatureConsumer`].
pub struct Callbacks<S, C> {
    pub on_save: S,
    pub on_cancel: C,
}

impl<S, C> SignatureConsumer for Callbacks<S, C>
where
    S: FnMut(SignatureImage),
    C: FnMut(),
{
    fn on_save(&mut self, image: SignatureImage) {
        (self.on_save)(image);
    }

    fn on_cancel(&mut self) {
        (self.on_cancel)();
    }
}

/// A signature pad bound to the consumer that asked for a signature.
pub struct SignatureDialog<C> {
    pad: SignaturePad,
    consumer: C,
    finished: bool,
    error: Option<String>,
}

impl<C: SignatureConsumer> SignatureDialog<C> {
    pub fn new(pad: SignaturePad, consumer: C) -> Self {
        Self {
            pad,
            consumer,
            finished: false,
            error: None,
        }
    }

    pub fn pad(&self) -> &SignaturePad {
        &self.pad
    }

    pub fn pad_mut(&mut self) -> &mut SignaturePad {
        &mut self.pad
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The user-facing message from the last rejected confirmation.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn begin_stroke(&mut self, point: StrokePoint) {
        if self.finished {
            return;
        }
        self.error = None;
        self.pad.begin_stroke(point);
    }

    pub fn extend_stroke(&mut self, point: StrokePoint) {
        if !self.finished {
            self.pad.extend_stroke(point);
        }
    }

    pub fn end_stroke(&mut self) {
        self.pad.end_stroke();
    }

    pub fn clear(&mut self) {
        if !self.finished {
            self.pad.clear();
            self.error = None;
        }
    }

    /// Export and hand the image to the consumer.
    ///
    /// A rejected signature keeps the dialog open so the user can redo it.
    pub fn confirm(&mut self) -> Result<(), SignatureError> {
        if self.finished {
            return Ok(());
        }
        match self.pad.export_or_reject() {
            Ok(image) => {
                self.finished = true;
                self.error = None;
                self.consumer.on_save(image);
                Ok(())
            }
            Err(err) => {
                warn!(%err, "signature confirmation rejected");
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Abandon the dialog.
    pub fn cancel(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.consumer.on_cancel();
    }

    pub fn into_consumer(self) -> C {
        self.consumer
    }
}
