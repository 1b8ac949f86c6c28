use crossbeam_queue::ArrayQueue;
use std::sync::Arc;

use crate::audio::constants::SAMPLE_FIFO_CAPACITY;

/// Blocks shared between the audio thread and the editor
struct SharedBlocks {
    /// Complete blocks waiting for the analyzer, oldest first
    ready: ArrayQueue<Vec<f32>>,
    /// Empty blocks the producer can fill. Holds every block not in flight.
    free: ArrayQueue<Vec<f32>>,
}

/// Audio thread end of a per-channel sample FIFO.
///
/// Host blocks of any size are accumulated into fixed size mono blocks. A complete block goes to
/// the ready queue; when that queue is full the oldest block is evicted and reused, so pushing
/// never blocks and never allocates. All blocks are allocated up front in [`prepare`](Self::prepare).
pub struct ChannelSampleFifo {
    shared: Arc<SharedBlocks>,
    /// Block currently being filled
    filling: Option<Vec<f32>>,
    fill_index: usize,
    capacity: usize,
}

/// Editor end of a [`ChannelSampleFifo`]. Pulled blocks are handed back to the producer.
#[derive(Clone)]
pub struct SampleFifoConsumer {
    shared: Arc<SharedBlocks>,
}

impl ChannelSampleFifo {
    /// Create a FIFO with the default capacity.
    /// Returns (producer for the audio thread, consumer for the editor)
    pub fn new() -> (Self, SampleFifoConsumer) {
        Self::with_capacity(SAMPLE_FIFO_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> (Self, SampleFifoConsumer) {
        let capacity = capacity.max(1);
        let shared = Arc::new(SharedBlocks {
            ready: ArrayQueue::new(capacity),
            // One block being filled plus one held by the consumer
            free: ArrayQueue::new(capacity + 2),
        });

        (
            Self {
                shared: shared.clone(),
                filling: None,
                fill_index: 0,
                capacity,
            },
            SampleFifoConsumer { shared },
        )
    }

    /// Discard everything and allocate fresh blocks of `block_size` samples.
    /// Not real-time safe, call this from `initialize()`.
    pub fn prepare(&mut self, block_size: usize) {
        while self.shared.ready.pop().is_some() {}
        while self.shared.free.pop().is_some() {}
        self.filling = None;
        self.fill_index = 0;

        // Zero sized blocks would never complete, pushes are dropped instead
        if block_size == 0 {
            return;
        }

        for _ in 0..self.capacity + 2 {
            let _ = self.shared.free.push(vec![0.0; block_size]);
        }
    }

    /// Copy `samples` into the FIFO (called from the audio thread)
    pub fn push(&mut self, samples: &[f32]) {
        let mut remaining = samples;

        while !remaining.is_empty() {
            if self.filling.is_none() {
                match self.shared.free.pop() {
                    Some(block) if !block.is_empty() => {
                        self.filling = Some(block);
                        self.fill_index = 0;
                    }
                    // Consumer is holding on to every spare block, drop these samples
                    _ => return,
                }
            }

            let Some(block) = self.filling.as_mut() else {
                return;
            };

            let count = (block.len() - self.fill_index).min(remaining.len());
            block[self.fill_index..self.fill_index + count].copy_from_slice(&remaining[..count]);
            self.fill_index += count;
            remaining = &remaining[count..];

            if self.fill_index == block.len() {
                self.fill_index = 0;
                if let Some(full) = self.filling.take() {
                    // Drop-oldest: the evicted block becomes the next one to fill
                    self.filling = self.shared.ready.force_push(full);
                }
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl SampleFifoConsumer {
    /// Complete blocks waiting right now. The producer may add more at any moment, so this is only
    /// a lower bound.
    pub fn num_complete_blocks_available(&self) -> usize {
        self.shared.ready.len()
    }

    /// Hand the oldest ready block to `f`. Returns `false` when nothing was ready.
    pub fn pull_with<F: FnOnce(&[f32])>(&self, f: F) -> bool {
        match self.shared.ready.pop() {
            Some(block) => {
                f(&block);
                self.recycle(block);
                true
            }
            None => false,
        }
    }

    /// Hand every block that was ready when called to `f`, oldest first.
    /// Returns the number of blocks pulled.
    pub fn pull_all<F: FnMut(&[f32])>(&self, mut f: F) -> usize {
        let available = self.num_complete_blocks_available();
        let mut pulled = 0;
        while pulled < available && self.pull_with(&mut f) {
            pulled += 1;
        }

        pulled
    }

    /// Drain the FIFO and only hand the most recent block to `f`
    pub fn pull_newest<F: FnOnce(&[f32])>(&self, f: F) -> bool {
        let mut newest: Option<Vec<f32>> = None;
        while let Some(block) = self.shared.ready.pop() {
            if let Some(older) = newest.replace(block) {
                self.recycle(older);
            }
        }

        match newest {
            Some(block) => {
                f(&block);
                self.recycle(block);
                true
            }
            None => false,
        }
    }

    fn recycle(&self, block: Vec<f32>) {
        // Only fails for a block from before the last `prepare()`, that one is simply dropped
        let _ = self.shared.free.push(block);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(start: usize, len: usize) -> Vec<f32> {
        (start..start + len).map(|n| n as f32).collect()
    }

    #[test]
    fn accumulates_across_host_blocks() {
        let (mut producer, consumer) = ChannelSampleFifo::with_capacity(4);
        producer.prepare(8);

        producer.push(&ramp(0, 5));
        assert_eq!(consumer.num_complete_blocks_available(), 0);
        producer.push(&ramp(5, 5));
        assert_eq!(consumer.num_complete_blocks_available(), 1);

        assert!(consumer.pull_with(|block| assert_eq!(block, ramp(0, 8).as_slice())));
        assert!(!consumer.pull_with(|_| panic!("nothing should be ready")));

        producer.push(&ramp(10, 6));
        assert!(consumer.pull_with(|block| assert_eq!(block, ramp(8, 8).as_slice())));
    }

    #[test]
    fn overflow_drops_the_oldest_blocks() {
        let (mut producer, consumer) = ChannelSampleFifo::with_capacity(4);
        producer.prepare(2);

        // Ten complete blocks into a queue of four
        producer.push(&ramp(0, 20));
        assert_eq!(consumer.num_complete_blocks_available(), 4);

        let mut firsts = Vec::new();
        assert_eq!(consumer.pull_all(|block| firsts.push(block[0])), 4);
        assert_eq!(firsts, vec![12.0, 14.0, 16.0, 18.0]);
    }

    #[test]
    fn pull_newest_skips_stale_blocks() {
        let (mut producer, consumer) = ChannelSampleFifo::with_capacity(8);
        producer.prepare(4);
        producer.push(&ramp(0, 16));

        assert!(consumer.pull_newest(|block| assert_eq!(block, ramp(12, 4).as_slice())));
        assert_eq!(consumer.num_complete_blocks_available(), 0);

        // Every block made it back to the producer
        producer.push(&ramp(16, 4 * 8));
        assert_eq!(consumer.num_complete_blocks_available(), 8);
    }

    #[test]
    fn prepare_resets_and_resizes() {
        let (mut producer, consumer) = ChannelSampleFifo::with_capacity(4);
        producer.prepare(4);
        producer.push(&ramp(0, 10));
        assert_eq!(consumer.num_complete_blocks_available(), 2);

        producer.prepare(3);
        assert_eq!(consumer.num_complete_blocks_available(), 0);
        producer.push(&ramp(0, 3));
        assert!(consumer.pull_with(|block| assert_eq!(block.len(), 3)));
    }

    #[test]
    fn unprepared_or_zero_sized_fifo_drops_samples() {
        let (mut producer, consumer) = ChannelSampleFifo::with_capacity(4);
        producer.push(&ramp(0, 100));
        assert_eq!(consumer.num_complete_blocks_available(), 0);

        producer.prepare(0);
        producer.push(&ramp(0, 100));
        assert_eq!(consumer.num_complete_blocks_available(), 0);
    }
}
