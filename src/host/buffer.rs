//! Byte buffers whose ownership passes to the host.
//!
//! Native code hands its bytes over when the buffer is created. The finalizer
//! runs exactly once, when the last host reference goes away, and receives the
//! bytes back so it can release them however they were obtained.

use std::fmt;
use std::rc::Rc;

type Finalizer = Box<dyn FnOnce(Box<[u8]>)>;

/// Host `Uint8Array` backed by natively owned bytes.
#[derive(Clone)]
pub struct ArrayBuffer {
    inner: Rc<External>,
}

struct External {
    bytes: Box<[u8]>,
    finalizer: Option<Finalizer>,
}

impl ArrayBuffer {
    /// Transfers `bytes` to the host; `finalizer` runs once the buffer is unreachable.
    pub fn external<F>(bytes: impl Into<Box<[u8]>>, finalizer: F) -> Self
    where
        F: FnOnce(Box<[u8]>) + 'static,
    {
        Self {
            inner: Rc::new(External {
                bytes: bytes.into(),
                finalizer: Some(Box::new(finalizer)),
            }),
        }
    }

    /// Transfers a vector whose storage is simply dropped when unreachable.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self {
            inner: Rc::new(External {
                bytes: bytes.into_boxed_slice(),
                finalizer: None,
            }),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.inner.bytes
    }

    pub fn len(&self) -> usize {
        self.inner.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.bytes.is_empty()
    }
}

impl fmt::Debug for ArrayBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayBuffer")
            .field("len", &self.len())
            .finish()
    }
}

impl Drop for External {
    fn drop(&mut self) {
        if let Some(finalizer) = self.finalizer.take() {
            finalizer(std::mem::take(&mut self.bytes));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::Cell;

    #[test]
    fn finalizer_runs_once_after_last_reference() {
        let released = Rc::new(Cell::new(0));
        let seen = Rc::new(Cell::new(0));

        let counter = released.clone();
        let length = seen.clone();
        let buffer = ArrayBuffer::external(vec![1, 2, 3], move |bytes| {
            counter.set(counter.get() + 1);
            length.set(bytes.len());
        });
        let alias = buffer.clone();

        assert_eq!(alias.as_bytes(), &[1, 2, 3]);
        drop(buffer);
        assert_eq!(released.get(), 0);

        drop(alias);
        assert_eq!(released.get(), 1);
        assert_eq!(seen.get(), 3);
    }

    #[test]
    fn vector_backed_buffer() {
        let buffer = ArrayBuffer::from_vec(Vec::new());
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);
    }
}
