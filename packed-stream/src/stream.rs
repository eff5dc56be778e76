//! Streaming primitives carrying one word at a time.
//!
//! [`Fifo`] is an in-memory stream for single-threaded use; [`channel`]
//! gives a bounded, blocking stream whose ends live on different threads.

use std::collections::VecDeque;
use std::sync::mpsc;

use crate::error::{Result, StreamError};

/// Write end of a word stream.
pub trait StreamSink<T> {
    /// Push one item, blocking while the stream is full.
    fn push(&mut self, item: T) -> Result<()>;
}

/// Read end of a word stream.
pub trait StreamSource<T> {
    /// Pop one item, blocking until one is available.
    fn pop(&mut self) -> Result<T>;
}

impl<T, S: StreamSink<T> + ?Sized> StreamSink<T> for &mut S {
    fn push(&mut self, item: T) -> Result<()> {
        (**self).push(item)
    }
}

impl<T, S: StreamSource<T> + ?Sized> StreamSource<T> for &mut S {
    fn pop(&mut self) -> Result<T> {
        (**self).pop()
    }
}

/// Unbounded in-memory FIFO.
///
/// Nothing else can fill it while the owning thread waits, so popping an
/// empty FIFO fails with [`StreamError::StreamFault`] instead of blocking.
#[derive(Debug, Clone)]
pub struct Fifo<T> {
    items: VecDeque<T>,
}

impl<T> Fifo<T> {
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Remove and return every queued item in order.
    pub fn drain(&mut self) -> Vec<T> {
        self.items.drain(..).collect()
    }
}

impl<T> Default for Fifo<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for Fifo<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> StreamSink<T> for Fifo<T> {
    fn push(&mut self, item: T) -> Result<()> {
        self.items.push_back(item);
        Ok(())
    }
}

impl<T> StreamSource<T> for Fifo<T> {
    fn pop(&mut self) -> Result<T> {
        self.items
            .pop_front()
            .ok_or_else(|| StreamError::StreamFault("read from empty stream".into()))
    }
}

/// Sending half of a bounded blocking stream.
#[derive(Debug, Clone)]
pub struct ChannelSink<T> {
    tx: mpsc::SyncSender<T>,
}

/// Receiving half of a bounded blocking stream.
#[derive(Debug)]
pub struct ChannelSource<T> {
    rx: mpsc::Receiver<T>,
}

/// Create a blocking stream holding at most `capacity` in-flight items.
///
/// A capacity of 0 makes every push rendezvous with a pop.
pub fn channel<T>(capacity: usize) -> (ChannelSink<T>, ChannelSource<T>) {
    let (tx, rx) = mpsc::sync_channel(capacity);
    (ChannelSink { tx }, ChannelSource { rx })
}

impl<T> StreamSink<T> for ChannelSink<T> {
    fn push(&mut self, item: T) -> Result<()> {
        self.tx
            .send(item)
            .map_err(|_| StreamError::StreamFault("stream reader disconnected".into()))
    }
}

impl<T> StreamSource<T> for ChannelSource<T> {
    fn pop(&mut self) -> Result<T> {
        self.rx
            .recv()
            .map_err(|_| StreamError::StreamFault("stream writer disconnected".into()))
    }
}
