//! Per-request context shared between the transport and an action.
//!
//! [`S3RequestContext`] owns the request body buffer and the response
//! slot. The transport appends body chunks as they arrive; the action
//! registers a listener to be notified of them. Body delivery starts
//! paused and is resumed by the action once it is ready to read, so no
//! chunk is buffered before the pipeline asks for it.
//!
//! Exactly one response leaves a request. The first call to
//! [`S3RequestContext::send_response`] wins; later calls are logged and
//! dropped.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::error;
use uuid::Uuid;

use crate::response::OutboundResponse;

/// Callback invoked after each appended body chunk.
pub type BodyListener = Box<dyn Fn() + Send + Sync>;

/// Chunk size advertised before the action states a preference.
const DEFAULT_CHUNK_HINT: usize = 4096;

struct BodyBuffer {
    received: Vec<u8>,
    complete: bool,
}

/// State shared between the transport and one action.
pub struct S3RequestContext {
    request_id: String,
    bucket_name: String,
    content_length: usize,
    body: Mutex<BodyBuffer>,
    listener: Mutex<Option<BodyListener>>,
    chunk_hint: AtomicUsize,
    body_paused: AtomicBool,
    response: Mutex<Option<OutboundResponse>>,
}

impl std::fmt::Debug for S3RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3RequestContext")
            .field("request_id", &self.request_id)
            .field("bucket_name", &self.bucket_name)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

impl S3RequestContext {
    /// Create a context for a request with the given declared body length.
    ///
    /// A zero-length body counts as already complete.
    #[must_use]
    pub fn new(bucket_name: impl Into<String>, content_length: usize) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            bucket_name: bucket_name.into(),
            content_length,
            body: Mutex::new(BodyBuffer {
                received: Vec::new(),
                complete: content_length == 0,
            }),
            listener: Mutex::new(None),
            chunk_hint: AtomicUsize::new(DEFAULT_CHUNK_HINT),
            body_paused: AtomicBool::new(true),
            response: Mutex::new(None),
        }
    }

    /// Identifier assigned to this request.
    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Bucket named by the request path.
    #[must_use]
    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    /// Declared `Content-Length` of the request body.
    #[must_use]
    pub fn content_length(&self) -> usize {
        self.content_length
    }

    /// Whether the full declared body has been received.
    #[must_use]
    pub fn has_all_body_content(&self) -> bool {
        self.body.lock().complete
    }

    /// A copy of the body received so far.
    #[must_use]
    pub fn full_body(&self) -> Bytes {
        Bytes::from(self.body.lock().received.clone())
    }

    /// Append a chunk delivered by the transport.
    ///
    /// Bytes past the declared length are dropped. The registered
    /// listener, if any, is invoked after the buffer is updated.
    pub fn append_body_chunk(&self, chunk: &[u8]) {
        {
            let mut body = self.body.lock();
            if body.complete {
                return;
            }
            body.received.extend_from_slice(chunk);
            if body.received.len() >= self.content_length {
                body.received.truncate(self.content_length);
                body.complete = true;
            }
        }
        if let Some(listener) = self.listener.lock().as_ref() {
            listener();
        }
    }

    /// Register a body listener and a preferred chunk size.
    ///
    /// If the body is already complete the listener fires immediately,
    /// so a registration that races the last chunk still produces a
    /// notification.
    pub fn listen_for_body(&self, chunk_hint: usize, listener: BodyListener) {
        self.chunk_hint.store(chunk_hint, Ordering::Relaxed);
        *self.listener.lock() = Some(listener);
        if self.has_all_body_content() {
            if let Some(listener) = self.listener.lock().as_ref() {
                listener();
            }
        }
    }

    /// Preferred chunk size for body delivery.
    #[must_use]
    pub fn body_chunk_hint(&self) -> usize {
        self.chunk_hint.load(Ordering::Relaxed)
    }

    /// Allow the transport to start delivering body chunks.
    pub fn resume_body(&self) {
        self.body_paused.store(false, Ordering::Release);
    }

    /// Whether body delivery is still paused.
    #[must_use]
    pub fn is_body_paused(&self) -> bool {
        self.body_paused.load(Ordering::Acquire)
    }

    /// Record the response for this request.
    ///
    /// Only the first response is kept; duplicates are logged and
    /// dropped.
    pub fn send_response(&self, response: OutboundResponse) {
        let mut slot = self.response.lock();
        if slot.is_some() {
            error!(
                request_id = %self.request_id,
                status = %response.status,
                "duplicate response suppressed"
            );
            return;
        }
        *slot = Some(response);
    }

    /// The recorded response, if one was sent.
    #[must_use]
    pub fn response(&self) -> Option<OutboundResponse> {
        self.response.lock().clone()
    }

    /// Whether a response has been recorded.
    #[must_use]
    pub fn response_sent(&self) -> bool {
        self.response.lock().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_should_complete_zero_length_body_immediately() {
        let ctx = S3RequestContext::new("photos", 0);
        assert!(ctx.has_all_body_content());
        assert!(ctx.full_body().is_empty());
    }

    #[test]
    fn test_should_assemble_body_from_chunks() {
        let ctx = S3RequestContext::new("photos", 10);
        ctx.append_body_chunk(b"hello");
        assert!(!ctx.has_all_body_content());

        ctx.append_body_chunk(b"world");
        assert!(ctx.has_all_body_content());
        assert_eq!(&ctx.full_body()[..], b"helloworld");
    }

    #[test]
    fn test_should_drop_bytes_past_declared_length() {
        let ctx = S3RequestContext::new("photos", 4);
        ctx.append_body_chunk(b"abcdef");
        assert!(ctx.has_all_body_content());
        assert_eq!(&ctx.full_body()[..], b"abcd");

        ctx.append_body_chunk(b"ignored");
        assert_eq!(&ctx.full_body()[..], b"abcd");
    }

    #[test]
    fn test_should_notify_listener_per_chunk() {
        let ctx = S3RequestContext::new("photos", 6);
        let notifications = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&notifications);
        ctx.listen_for_body(
            1024,
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        assert_eq!(ctx.body_chunk_hint(), 1024);

        ctx.append_body_chunk(b"abc");
        ctx.append_body_chunk(b"def");
        assert_eq!(notifications.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_should_fire_listener_registered_after_completion() {
        let ctx = S3RequestContext::new("photos", 3);
        ctx.append_body_chunk(b"abc");

        let notifications = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&notifications);
        ctx.listen_for_body(
            1024,
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        assert_eq!(notifications.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_should_start_with_body_delivery_paused() {
        let ctx = S3RequestContext::new("photos", 5);
        assert!(ctx.is_body_paused());
        ctx.resume_body();
        assert!(!ctx.is_body_paused());
    }

    #[test]
    fn test_should_keep_first_response_only() {
        let ctx = S3RequestContext::new("photos", 0);
        assert!(!ctx.response_sent());

        ctx.send_response(OutboundResponse::ok());
        ctx.send_response(OutboundResponse::created("/photos"));

        let response = ctx.response().unwrap_or_else(|| panic!("missing response"));
        assert!(response.headers.is_empty());
    }
}
