/*!
A fixed-size fork-join worker pool.

Work is always some count of independent tasks, and each call to the pool blocks until every task is complete.
So, a call is a sweep, and the state shared between tasks may be freely read and written between calls.

Two primitives are provided:
- [count](Parallel::count), which calls a worker on each index below some count, and
- [blocks_mut](Parallel::blocks_mut), which calls a worker on each contiguous block of a mutable slice and collects whatever the worker returns, in block order.

Workers are scoped [crossbeam] threads, and take the next index (or block) from a shared counter (or queue) until none remain.
So, a slow block does not hold up the other workers.

When the pool has a single thread, or there is a single task, work is done on the calling thread.

```rust
# use otter_psl::generic::parallel::Parallel;
let pool = Parallel::new(4);

let mut data = vec![1_u32; 100];
let sums = pool.blocks_mut(&mut data, 25, |offset, block| {
    for (index, value) in block.iter_mut().enumerate() {
        *value += (offset + index) as u32;
    }
    block.iter().sum::<u32>()
});

assert_eq!(sums.len(), 4);
assert_eq!(sums.iter().sum::<u32>(), 100 + (0..100).sum::<u32>());
```
*/

use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam::queue::SegQueue;

use crate::misc::log::targets::{self};

/// A pool of some fixed number of threads.
#[derive(Clone, Copy, Debug)]
pub struct Parallel {
    threads: usize,
}

impl Default for Parallel {
    fn default() -> Self {
        Parallel::new(Parallel::available_threads())
    }
}

impl Parallel {
    /// A pool of the given number of threads, with a minimum of one.
    pub fn new(threads: usize) -> Self {
        Parallel {
            threads: threads.max(1),
        }
    }

    /// The parallelism available to the process, falling back to a single thread.
    pub fn available_threads() -> usize {
        std::thread::available_parallelism()
            .map(|count| count.get())
            .unwrap_or(1)
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// A block size which splits `count` items into roughly `ratio` blocks per thread.
    pub fn block_size(&self, count: usize, ratio: usize) -> usize {
        count / (self.threads * ratio.max(1)) + 1
    }

    /// Calls `worker` on each index in `0..n`, returning once all calls have returned.
    pub fn count<F>(&self, n: usize, worker: F)
    where
        F: Fn(usize) + Sync,
    {
        if self.threads == 1 || n <= 1 {
            (0..n).for_each(worker);
            return;
        }

        let next = AtomicUsize::new(0);
        let next = &next;
        let worker = &worker;

        log::trace!(target: targets::PARALLEL, "Count of {n} over {} threads", self.threads.min(n));

        let scope = crossbeam::scope(|s| {
            for _ in 0..self.threads.min(n) {
                s.spawn(move |_| loop {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    if index >= n {
                        break;
                    }
                    worker(index);
                });
            }
        });

        if let Err(panic) = scope {
            std::panic::resume_unwind(panic);
        }
    }

    /// Calls `worker` on each contiguous block of `data` of length `block_size` (the last block may be shorter), together with the offset of the block in `data`.
    ///
    /// The results of each call are returned in order of the blocks.
    pub fn blocks_mut<T, R, F>(&self, data: &mut [T], block_size: usize, worker: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(usize, &mut [T]) -> R + Sync,
    {
        let block_size = block_size.max(1);
        let block_count = data.len().div_ceil(block_size);

        if self.threads == 1 || block_count <= 1 {
            return data
                .chunks_mut(block_size)
                .enumerate()
                .map(|(index, block)| worker(index * block_size, block))
                .collect();
        }

        let queue = SegQueue::new();
        for (index, block) in data.chunks_mut(block_size).enumerate() {
            queue.push((index, block));
        }
        let queue = &queue;
        let worker = &worker;

        let scope = crossbeam::scope(|s| {
            let handles = (0..self.threads.min(block_count))
                .map(|_| {
                    s.spawn(move |_| {
                        let mut results = Vec::new();
                        while let Some((index, block)) = queue.pop() {
                            results.push((index, worker(index * block_size, block)));
                        }
                        results
                    })
                })
                .collect::<Vec<_>>();

            let mut results = Vec::with_capacity(block_count);
            for handle in handles {
                match handle.join() {
                    Ok(mut partial) => results.append(&mut partial),
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
            results
        });

        match scope {
            Ok(mut results) => {
                results.sort_unstable_by_key(|(index, _)| *index);
                results.into_iter().map(|(_, result)| result).collect()
            }
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    /// Calls `worker` on each index in `0..n`, and returns the results in order of the indices.
    pub fn map<R, F>(&self, n: usize, worker: F) -> Vec<R>
    where
        R: Send,
        F: Fn(usize) -> R + Sync,
    {
        let mut slots: Vec<Option<R>> = (0..n).map(|_| None).collect();
        self.blocks_mut(&mut slots, 1, |index, slot| {
            slot[0] = Some(worker(index));
        });
        slots.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod parallel_tests {
    use super::*;

    #[test]
    fn count_visits_each_index_once() {
        let pool = Parallel::new(4);
        let visits = (0..1000).map(|_| AtomicUsize::new(0)).collect::<Vec<_>>();

        pool.count(visits.len(), |index| {
            visits[index].fetch_add(1, Ordering::Relaxed);
        });

        assert!(visits.iter().all(|v| v.load(Ordering::Relaxed) == 1));
    }

    #[test]
    fn blocks_are_disjoint_and_ordered() {
        let pool = Parallel::new(3);
        let mut data = (0..10).collect::<Vec<usize>>();

        let offsets = pool.blocks_mut(&mut data, 3, |offset, block| {
            for value in block.iter_mut() {
                *value *= 2;
            }
            offset
        });

        assert_eq!(offsets, vec![0, 3, 6, 9]);
        assert_eq!(data, (0..10).map(|v| v * 2).collect::<Vec<_>>());
    }

    #[test]
    fn single_thread_map() {
        let pool = Parallel::new(1);
        assert_eq!(pool.map(4, |i| i * i), vec![0, 1, 4, 9]);
    }

    #[test]
    fn empty_work() {
        let pool = Parallel::new(2);
        let mut data: Vec<u8> = Vec::new();
        assert!(pool.blocks_mut(&mut data, 4, |_, _| ()).is_empty());
        pool.count(0, |_| panic!("No work"));
    }
}
