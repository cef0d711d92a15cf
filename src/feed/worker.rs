use std::sync::mpsc::{self, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::feed::noise::distort;
use crate::feed::samples::{group_by_participant, Sample};
use crate::session::PositionSink;
use crate::tracking::ParticipantId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedSettings {
    /// Delay between two samples of one participant when paced.
    pub tick: Duration,
    pub paced: bool,
    /// Radius in metres of the simulated position error.
    pub error_range: f64,
}

struct Worker {
    id: ParticipantId,
    stop_tx: mpsc::Sender<()>,
    join: JoinHandle<usize>,
}

/// One thread per participant, each pushing that participant's samples into
/// the sink in file order.
pub struct FeedRunner {
    workers: Vec<Worker>,
}

impl FeedRunner {
    pub fn start(sink: Arc<dyn PositionSink>, samples: &[Sample], settings: FeedSettings) -> Self {
        let workers = group_by_participant(samples)
            .into_iter()
            .map(|(id, track)| {
                let (stop_tx, stop_rx) = mpsc::channel();
                let sink = sink.clone();
                let join = thread::spawn(move || run_feed(id, track, sink, settings, stop_rx));
                log::info!("Feed for participant {} started", id);
                Worker { id, stop_tx, join }
            })
            .collect();
        Self { workers }
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// Blocks until every feed has delivered all of its samples. Returns the
    /// number of samples delivered.
    pub fn wait(self) -> usize {
        self.join_all(false)
    }

    /// Signals every feed to stop after its current sample and joins them.
    pub fn stop(self) -> usize {
        self.join_all(true)
    }

    fn join_all(self, signal: bool) -> usize {
        if signal {
            for worker in &self.workers {
                let _ = worker.stop_tx.send(());
            }
        }
        let mut delivered = 0;
        for Worker { id, stop_tx, join } in self.workers {
            match join.join() {
                Ok(count) => delivered += count,
                Err(_) => log::error!("Feed for participant {} panicked", id),
            }
            drop(stop_tx);
        }
        delivered
    }
}

fn run_feed(
    id: ParticipantId,
    track: Vec<Sample>,
    sink: Arc<dyn PositionSink>,
    settings: FeedSettings,
    stop_rx: mpsc::Receiver<()>,
) -> usize {
    let mut rng = rand::thread_rng();
    let mut delivered = 0;

    for sample in track {
        let should_stop = if settings.paced && delivered > 0 {
            !matches!(stop_rx.recv_timeout(settings.tick), Err(RecvTimeoutError::Timeout))
        } else {
            !matches!(stop_rx.try_recv(), Err(TryRecvError::Empty))
        };
        if should_stop {
            log::info!("Feed for participant {} stopped after {} samples", id, delivered);
            return delivered;
        }

        let position = distort(&mut rng, sample.position(), settings.error_range);
        sink.on_position(id, sample.timestamp, position);
        delivered += 1;
    }

    log::info!("Feed for participant {} finished ({} samples)", id, delivered);
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::Coordinate;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collect(Mutex<Vec<(ParticipantId, f64, Coordinate)>>);

    impl PositionSink for Collect {
        fn on_position(&self, id: ParticipantId, timestamp: f64, position: Coordinate) {
            self.0.lock().unwrap().push((id, timestamp, position));
        }
    }

    fn samples() -> Vec<Sample> {
        (0..20)
            .map(|i| Sample {
                id: (i % 2) as ParticipantId,
                timestamp: i as f64,
                x: i as f64,
                y: 0.0,
                z: 0.0,
            })
            .collect()
    }

    #[test]
    fn delivers_every_sample_in_order_per_participant() {
        let sink = Arc::new(Collect::default());
        let settings = FeedSettings {
            tick: Duration::ZERO,
            paced: false,
            error_range: 0.0,
        };
        let runner = FeedRunner::start(sink.clone(), &samples(), settings);
        assert_eq!(runner.len(), 2);
        assert_eq!(runner.wait(), 20);

        let seen = sink.0.lock().unwrap();
        for id in [0, 1] {
            let times: Vec<_> = seen.iter().filter(|s| s.0 == id).map(|s| s.1).collect();
            let mut sorted = times.clone();
            sorted.sort_by(f64::total_cmp);
            assert_eq!(times, sorted);
            assert_eq!(times.len(), 10);
        }
    }

    #[test]
    fn stop_interrupts_paced_feeds() {
        let sink = Arc::new(Collect::default());
        let settings = FeedSettings {
            tick: Duration::from_secs(60),
            paced: true,
            error_range: 0.0,
        };
        let runner = FeedRunner::start(sink.clone(), &samples(), settings);
        // each feed delivers its first sample, then waits a full tick
        let delivered = runner.stop();
        assert!(delivered <= 2);
    }
}
