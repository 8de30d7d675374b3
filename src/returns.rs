//! Three ways of handing a buffer back to the caller, compared by the
//! `return_strategies` bench.

use std::hint::black_box;

pub const PAYLOAD_SIZE: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Payload {
    pub data: [u8; PAYLOAD_SIZE],
}

impl Default for Payload {
    fn default() -> Self {
        Self {
            data: [0; PAYLOAD_SIZE],
        }
    }
}

/// Inline buffer, returned by copy.
pub fn return_by_value() -> Payload {
    Payload::default()
}

/// Same buffer behind an owning pointer that outlives the call.
pub fn return_by_reference() -> Box<Payload> {
    Box::new(Payload::default())
}

/// Heap buffer of `len` bytes.
pub fn return_slice(len: usize) -> Vec<u8> {
    vec![0; len]
}

/// Absorbs one byte of every result so the optimizer cannot drop the work
/// that produced it. Owned by a single benchmark run.
#[derive(Debug, Default)]
pub struct Sink {
    last: u8,
    absorbed: u64,
}

impl Sink {
    pub fn absorb(&mut self, byte: u8) {
        self.last = black_box(byte);
        self.absorbed += 1;
    }

    pub fn last(&self) -> u8 {
        self.last
    }

    pub fn absorbed(&self) -> u64 {
        self.absorbed
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReturnStrategy {
    Value,
    Reference,
    Slice,
}

impl ReturnStrategy {
    pub const ALL: [ReturnStrategy; 3] = [
        ReturnStrategy::Value,
        ReturnStrategy::Reference,
        ReturnStrategy::Slice,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ReturnStrategy::Value => "return_by_value",
            ReturnStrategy::Reference => "return_by_reference",
            ReturnStrategy::Slice => "return_slice",
        }
    }

    /// One benchmark iteration: produce the buffer, keep its first byte.
    pub fn run(self, sink: &mut Sink) {
        match self {
            ReturnStrategy::Value => {
                let result = black_box(return_by_value());
                sink.absorb(result.data[0]);
            }
            ReturnStrategy::Reference => {
                let result = black_box(return_by_reference());
                sink.absorb(result.data[0]);
            }
            ReturnStrategy::Slice => {
                let result = black_box(return_slice(black_box(PAYLOAD_SIZE)));
                sink.absorb(result.first().copied().unwrap_or_default());
            }
        }
    }
}
