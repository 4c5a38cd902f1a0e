// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Fire-and-forget jobs on worker threads.
//!
//! Each job runs on its own thread and reports back through a channel that
//! the UI thread drains once per frame. Failed jobs are logged and dropped:
//! nothing is retried and nothing already applied locally is rolled back.

use anyhow::Result;
use std::sync::mpsc::{channel, Receiver, Sender};

struct Finished<T> {
    ticket: u64,
    what: String,
    result: Result<T>,
}

/// Jobs producing `T`, spawned in the background and polled later.
pub struct Background<T> {
    sender: Sender<Finished<T>>,
    receiver: Receiver<Finished<T>>,
    in_flight: usize,
    next_ticket: u64,
}

impl<T: Send + 'static> Default for Background<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Background<T> {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self {
            sender,
            receiver,
            in_flight: 0,
            next_ticket: 0,
        }
    }

    /// Run `job` on a new thread. `what` names it in log messages.
    ///
    /// Returns the job's ticket; later jobs get larger tickets.
    pub fn spawn<F>(&mut self, what: impl Into<String>, job: F) -> u64
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let what = what.into();
        let sender = self.sender.clone();
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.in_flight += 1;
        log::debug!("Started {}", what);

        std::thread::spawn(move || {
            let result = job();
            // The receiver only goes away when the owner is dropped.
            let _ = sender.send(Finished {
                ticket,
                what,
                result,
            });
        });
        ticket
    }

    /// Number of jobs spawned and not yet collected.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight == 0
    }

    /// Collect the jobs that finished since the last call, without blocking.
    pub fn poll(&mut self) -> Vec<T> {
        let mut done = Vec::new();
        while let Ok(finished) = self.receiver.try_recv() {
            done.extend(self.collect(finished));
        }
        done
    }

    /// Like [`poll`](Self::poll), but only the most recently spawned job
    /// counts. Results of jobs it superseded are discarded.
    pub fn poll_latest(&mut self) -> Option<T> {
        let latest = self.next_ticket.checked_sub(1)?;
        let mut value = None;
        while let Ok(finished) = self.receiver.try_recv() {
            let ticket = finished.ticket;
            let what = finished.what.clone();
            match self.collect(finished) {
                Some(result) if ticket == latest => value = Some(result),
                Some(_) => log::debug!("Discarding superseded result of {}", what),
                None => {}
            }
        }
        value
    }

    /// Block until every spawned job has finished.
    pub fn wait_all(&mut self) -> Vec<T> {
        let mut done = Vec::new();
        while self.in_flight > 0 {
            match self.receiver.recv() {
                Ok(finished) => done.extend(self.collect(finished)),
                Err(_) => break,
            }
        }
        done
    }

    fn collect(&mut self, finished: Finished<T>) -> Option<T> {
        self.in_flight = self.in_flight.saturating_sub(1);
        match finished.result {
            Ok(value) => {
                log::debug!("Finished {}", finished.what);
                Some(value)
            }
            Err(e) => {
                log::error!("Failed to {}: {:#}", finished.what, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::time::Duration;

    #[test]
    fn test_wait_all_collects_successes_only() {
        let mut jobs = Background::new();
        jobs.spawn("compute one", || Ok(1));
        jobs.spawn("fail", || bail!("backend unreachable"));
        jobs.spawn("compute three", || Ok(3));
        assert_eq!(jobs.in_flight(), 3);

        let mut done = jobs.wait_all();
        done.sort();
        assert_eq!(done, vec![1, 3]);
        assert!(jobs.is_idle());
    }

    #[test]
    fn test_poll_does_not_block() {
        let mut jobs: Background<u32> = Background::new();
        let (release, gate) = channel::<()>();
        jobs.spawn("wait for gate", move || {
            gate.recv_timeout(Duration::from_secs(5))?;
            Ok(7)
        });

        assert!(jobs.poll().is_empty());
        assert_eq!(jobs.in_flight(), 1);

        release.send(()).unwrap();
        assert_eq!(jobs.wait_all(), vec![7]);
    }

    /// Poll until nothing is in flight, keeping what `poll_latest` yields.
    fn drain_latest(jobs: &mut Background<u32>) -> Vec<u32> {
        let mut seen = Vec::new();
        for _ in 0..500 {
            seen.extend(jobs.poll_latest());
            if jobs.is_idle() {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        seen
    }

    #[test]
    fn test_poll_latest_drops_superseded_results() {
        let mut jobs: Background<u32> = Background::new();
        let (release, gate) = channel::<()>();
        let first = jobs.spawn("slow open", move || {
            gate.recv_timeout(Duration::from_secs(5))?;
            Ok(1)
        });
        let second = jobs.spawn("fast open", || Ok(2));
        assert!(second > first);

        // The later job finishes first and is applied
        let mut seen = Vec::new();
        for _ in 0..500 {
            seen.extend(jobs.poll_latest());
            if !seen.is_empty() {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(seen, vec![2]);

        // The earlier one arrives afterwards and is ignored
        release.send(()).unwrap();
        assert!(drain_latest(&mut jobs).is_empty());
        assert!(jobs.is_idle());
    }

    #[test]
    fn test_poll_latest_skips_failed_latest() {
        let mut jobs: Background<u32> = Background::new();
        assert_eq!(jobs.poll_latest(), None);
        jobs.spawn("compute", || Ok(1));
        jobs.spawn("fail", || bail!("backend unreachable"));
        assert!(drain_latest(&mut jobs).is_empty());
    }

    #[test]
    fn test_wait_all_on_idle_returns_immediately() {
        let mut jobs: Background<()> = Background::default();
        assert!(jobs.wait_all().is_empty());
    }
}
