//! Drop consecutive repeats of the same frame

use futures::{Stream, ready};
use pin_project_lite::pin_project;
use std::ops::Deref;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::layout::SharedFrame;

/// Extension trait to skip frames the writer has not changed
pub trait DistinctExt: Stream {
    /// Emit a frame only when its bytes differ from the previously emitted one
    ///
    /// Polling a region yields the same frame until the writer publishes again;
    /// this keeps only the frames that carry an update.
    fn distinct(self) -> Distinct<Self>
    where
        Self: Sized,
    {
        Distinct::new(self)
    }
}

impl<T> DistinctExt for T
where
    T: Stream,
    T::Item: Deref<Target = SharedFrame>,
{
}

pin_project! {
    /// A stream combinator that drops byte-identical consecutive frames
    pub struct Distinct<S: Stream> {
        #[pin]
        stream: S,
        last: Option<Box<SharedFrame>>,
    }
}

impl<S: Stream> Distinct<S> {
    pub fn new(stream: S) -> Self {
        Self { stream, last: None }
    }
}

impl<S> Stream for Distinct<S>
where
    S: Stream,
    S::Item: Deref<Target = SharedFrame>,
{
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            let Some(frame) = ready!(this.stream.as_mut().poll_next(cx)) else {
                return Poll::Ready(None);
            };

            let unchanged =
                this.last.as_ref().is_some_and(|last| last.as_bytes() == frame.as_bytes());
            if unchanged {
                continue;
            }

            if let Some(last) = this.last.as_mut() {
                **last = *frame;
            } else {
                *this.last = Some(Box::new(*frame));
            }
            return Poll::Ready(Some(frame));
        }
    }
}
