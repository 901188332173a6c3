//! Debounced value: a setter that only publishes after the input has been
//! stable for a fixed delay.

use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Value whose settled copy trails the raw input by `delay` of quiet time.
///
/// Every [`set`](Debounced::set) restarts the timer; intermediate values are
/// never published. The timer task is aborted on drop, so a pending value is
/// discarded once its owner goes away.
pub struct Debounced<T> {
    input: mpsc::UnboundedSender<T>,
    settled: watch::Receiver<T>,
    task: JoinHandle<()>,
}

impl<T> Debounced<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Start with `initial` already settled. Must be called inside a tokio runtime.
    pub fn new(initial: T, delay: Duration) -> Self {
        let (input, mut rx) = mpsc::unbounded_channel::<T>();
        let (tx, settled) = watch::channel(initial);

        let task = tokio::spawn(async move {
            while let Some(mut pending) = rx.recv().await {
                loop {
                    tokio::select! {
                        next = rx.recv() => match next {
                            Some(value) => pending = value,
                            None => return,
                        },
                        _ = tokio::time::sleep(delay) => break,
                    }
                }

                tx.send_if_modified(|current| {
                    if *current == pending {
                        false
                    } else {
                        *current = pending;
                        true
                    }
                });
            }
        });

        Self {
            input,
            settled,
            task,
        }
    }

    /// Replace the raw value and restart the timer
    pub fn set(&self, value: T) {
        // Receiver only goes away with the task, which lives as long as self
        let _ = self.input.send(value);
    }

    /// Last settled value
    pub fn get(&self) -> T {
        self.settled.borrow().clone()
    }

    /// Wait until a new value settles; `false` if the timer task is gone
    pub async fn changed(&mut self) -> bool {
        self.settled.changed().await.is_ok()
    }

    /// Independent receiver of settled values
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.settled.clone()
    }
}

impl<T> Drop for Debounced<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}
