//! The lifecycle shared by hosts and routers.

use crate::{signal::Signal, Error};
use netsim_codec::Address;
use prometheus_client::metrics::counter::Counter;
use std::future::Future;
use tracing::{debug, error, warn};

/// A simulated host or router.
///
/// A node is driven by [run]: it is polled for work until it has none, then parked until one
/// of its inbound queues becomes readable.
pub trait Node: Send + 'static {
    /// Address of the node (used in logs).
    fn address(&self) -> Address;

    /// Called once before the first poll.
    fn on_startup(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// Process at most one unit per inbound interface, in interface order.
    ///
    /// Returns whether any unit was processed. An error is fatal to the node.
    fn poll_once(&mut self) -> Result<bool, Error>;

    /// Resolves when an inbound queue may hold a unit.
    fn readable(&self) -> impl Future<Output = ()> + Send + '_;
}

/// Drive `node` until `stop` resolves or it encounters a fatal error.
///
/// The stop signal is checked once per iteration, so at most one more pass runs after it
/// resolves. The node is returned so its state can be inspected.
pub async fn run<N: Node>(mut node: N, mut stop: Signal) -> Result<N, Error> {
    let address = node.address();
    debug!(node = %address, "starting");
    if let Err(err) = node.on_startup() {
        error!(node = %address, ?err, "startup failed");
        return Err(err);
    }
    let reason = loop {
        if let Some(reason) = stop.reason() {
            break reason;
        }
        match node.poll_once() {
            Ok(true) => {
                // Let links and other nodes sharing the runtime make progress
                tokio::task::yield_now().await;
                continue;
            }
            Ok(false) => {}
            Err(err) => {
                error!(node = %address, ?err, "stopping on fatal error");
                return Err(err);
            }
        }
        tokio::select! {
            reason = stop.wait() => break reason,
            _ = node.readable() => {},
        }
    };
    debug!(node = %address, ?reason, "stopped");
    Ok(node)
}

/// Swallow errors that only concern the current unit, counting them in `malformed`.
pub(crate) fn discard_malformed(
    result: Result<(), Error>,
    node: Address,
    interface: usize,
    malformed: &Counter,
) -> Result<(), Error> {
    match result {
        Err(err) if err.is_malformed() => {
            malformed.inc();
            warn!(node = %node, interface, ?err, "discarding malformed unit");
            Ok(())
        }
        result => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{interface::Queue, signal::Stopper};
    use bytes::Bytes;
    use std::sync::Arc;

    struct Echo {
        queue: Arc<Queue>,
        seen: Vec<Bytes>,
        started: bool,
    }

    impl Node for Echo {
        fn address(&self) -> Address {
            Address::new("E").unwrap()
        }

        fn on_startup(&mut self) -> Result<(), Error> {
            self.started = true;
            Ok(())
        }

        fn poll_once(&mut self) -> Result<bool, Error> {
            let Some(item) = self.queue.get() else {
                return Ok(false);
            };
            if item.is_empty() {
                return Err(Error::NoInterfaces);
            }
            self.seen.push(item);
            Ok(true)
        }

        fn readable(&self) -> impl Future<Output = ()> + Send + '_ {
            self.queue.readable()
        }
    }

    fn echo() -> (Echo, Arc<Queue>) {
        let queue = Arc::new(Queue::new(0));
        let node = Echo {
            queue: queue.clone(),
            seen: Vec::new(),
            started: false,
        };
        (node, queue)
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_stopped() {
        let (node, queue) = echo();
        let stopper = Stopper::new();
        let handle = tokio::spawn(run(node, stopper.stopped()));

        queue.try_put(Bytes::from_static(b"a")).unwrap();
        queue.try_put(Bytes::from_static(b"b")).unwrap();
        while !queue.is_empty() {
            tokio::task::yield_now().await;
        }

        stopper.stop().await;
        let node = handle.await.unwrap().unwrap();
        assert!(node.started);
        assert_eq!(node.seen, [Bytes::from_static(b"a"), Bytes::from_static(b"b")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_error_ends_node() {
        let (node, queue) = echo();
        let stopper = Stopper::new();
        queue.try_put(Bytes::new()).unwrap();
        let result = run(node, stopper.stopped()).await;
        assert!(matches!(result, Err(Error::NoInterfaces)));
    }

    #[tokio::test]
    async fn test_stopped_before_start() {
        let (node, queue) = echo();
        queue.try_put(Bytes::from_static(b"late")).unwrap();
        let node = run(node, Signal::resolved()).await.unwrap();
        assert!(node.seen.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_stopper_ends_node() {
        let (node, queue) = echo();
        let stopper = Stopper::new();
        let handle = tokio::spawn(run(node, stopper.stopped()));
        queue.try_put(Bytes::from_static(b"a")).unwrap();
        while !queue.is_empty() {
            tokio::task::yield_now().await;
        }

        drop(stopper);
        let node = handle.await.unwrap().unwrap();
        assert_eq!(node.seen, [Bytes::from_static(b"a")]);
    }
}
