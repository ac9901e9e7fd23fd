//! End-to-end behaviour of the sample pipeline

use accel_pipeline::{
    Clock, ConsumerId, Mailboxes, Mode, Outcome, Pipeline, PipelineConfig, PipelineError,
    Producer, RangeSetting, Sample, SensorControl, Transport,
};
use proptest::prelude::*;
use std::sync::Arc;

#[derive(Default)]
struct NullControl {
    ranges: Vec<RangeSetting>,
}

impl SensorControl for NullControl {
    fn apply_range(&mut self, range: RangeSetting) {
        self.ranges.push(range);
    }

    fn apply_motion_limit(&mut self, _enabled: bool) {}

    fn apply_new_data_interrupt(&mut self, _enabled: bool) {}
}

struct FixedClock;

impl Clock for FixedClock {
    fn now_us(&self) -> u64 {
        0
    }
}

type TestProducer = Producer<NullControl, FixedClock, Arc<Mailboxes>>;

fn pipeline_with(config: PipelineConfig) -> (Pipeline, TestProducer, Arc<Mailboxes>) {
    let pipeline = Pipeline::from_config(&config).unwrap();
    let mailboxes = Arc::new(Mailboxes::new(config.mailbox_depth));
    let producer = pipeline
        .producer(NullControl::default(), FixedClock, Arc::clone(&mailboxes))
        .unwrap();
    (pipeline, producer, mailboxes)
}

/// Samples that never look still, so the mode stays out of Threshold
fn moving(i: usize) -> Sample {
    let x = if i % 2 == 0 { 500 } else { -500 };
    Sample::new(x, (i % 1000) as i16, 0, 21)
}

fn drain(pipeline: &Pipeline, id: ConsumerId) -> Vec<Sample> {
    std::iter::from_fn(|| pipeline.read_next(id).unwrap()).collect()
}

proptest! {
    #[test]
    fn early_reader_drains_everything_in_order(capacity in 2usize..128, count in 0usize..128) {
        let writes = count % capacity;
        let (pipeline, mut producer, _) = pipeline_with(PipelineConfig {
            capacity,
            ..Default::default()
        });
        let id = ConsumerId(0);
        pipeline.register_reader(id).unwrap();

        let expected: Vec<Sample> = (0..writes).map(moving).collect();
        for sample in &expected {
            prop_assert_eq!(producer.push(*sample), Outcome::Stored);
        }

        prop_assert_eq!(drain(&pipeline, id), expected);
    }

    #[test]
    fn late_reader_has_no_backlog(backlog in 0usize..300, fresh in 0usize..60) {
        let (pipeline, mut producer, _) = pipeline_with(PipelineConfig {
            capacity: 64,
            ..Default::default()
        });
        for i in 0..backlog {
            producer.push(moving(i));
        }

        let id = ConsumerId(3);
        pipeline.register_reader(id).unwrap();
        let expected: Vec<Sample> = (backlog..backlog + fresh).map(moving).collect();
        for sample in &expected {
            producer.push(*sample);
        }

        prop_assert_eq!(drain(&pipeline, id), expected);
    }

    #[test]
    fn decimation_keeps_one_in_ratio(ratio in 1u16..20, rounds in 1usize..20) {
        let (pipeline, mut producer, _) = pipeline_with(PipelineConfig {
            capacity: 1024,
            ..Default::default()
        });
        pipeline.configure_rate(3000 / ratio);
        let ratio = pipeline.decimation_ratio() as usize;

        let stored = (0..ratio * rounds)
            .filter(|i| producer.push(moving(*i)) == Outcome::Stored)
            .count();

        prop_assert_eq!(stored, rounds);
    }
}

#[test]
fn registry_overflow_keeps_prior_readers() {
    let (pipeline, mut producer, _) = pipeline_with(PipelineConfig {
        max_readers: 10,
        ..Default::default()
    });
    for id in 0..10 {
        pipeline.register_reader(ConsumerId(id)).unwrap();
    }

    assert_eq!(
        pipeline.register_reader(ConsumerId(10)),
        Err(PipelineError::ReaderRegistryFull { max_readers: 10 })
    );

    producer.push(moving(1));
    for id in 0..10 {
        assert_eq!(pipeline.read_next(ConsumerId(id)), Ok(Some(moving(1))));
    }
}

#[test]
fn reader_registered_after_write_reads_empty() {
    let (pipeline, mut producer, _) = pipeline_with(PipelineConfig::default());
    producer.push(Sample::new(7, 7, 7, 7));

    // Registration lands on the cursor after the write
    assert_eq!(pipeline.read_next(ConsumerId(1)), Ok(None));
}

#[test]
fn full_revolution_masks_lost_samples() {
    let (pipeline, mut producer, _) = pipeline_with(PipelineConfig {
        capacity: 8,
        ..Default::default()
    });
    let id = ConsumerId(0);
    pipeline.register_reader(id).unwrap();

    for i in 0..8 {
        producer.push(moving(i));
    }

    assert_eq!(pipeline.read_next(id), Ok(None));
}

#[test]
fn mode_walks_poll_threshold_continuous() {
    let (pipeline, mut producer, _) = pipeline_with(PipelineConfig::default());
    let still = Sample::new(3, -2, 5, 20);

    for _ in 0..99 {
        producer.push(still);
    }
    assert_eq!(pipeline.mode(), Mode::Poll);

    producer.push(still);
    assert_eq!(pipeline.mode(), Mode::Threshold);

    producer.push(Sample::new(-1200, 40, 900, 20));
    assert_eq!(pipeline.mode(), Mode::Continuous);
}

#[test]
fn range_rises_and_falls_with_hysteresis() {
    let (pipeline, mut producer, _) = pipeline_with(PipelineConfig::adaptive());

    producer.push(Sample::new(1801, 0, 0, 0));
    assert_eq!(pipeline.range(), RangeSetting::G4);
    assert_eq!(producer.decrease_streak(), 0);

    let quiet = |i: usize| Sample::new(if i % 2 == 0 { 100 } else { -100 }, 0, 0, 0);
    for i in 0..9 {
        producer.push(quiet(i));
    }
    producer.push(Sample::new(2500, 0, 0, 0));
    for i in 0..9 {
        producer.push(quiet(i));
    }
    assert_eq!(pipeline.range(), RangeSetting::G4);

    producer.push(quiet(9));
    assert_eq!(pipeline.range(), RangeSetting::G2);
    assert_eq!(
        producer.control().ranges,
        vec![RangeSetting::G2, RangeSetting::G4, RangeSetting::G2]
    );
}

#[test]
fn clamped_rate_accepts_everything() {
    let (pipeline, mut producer, _) = pipeline_with(PipelineConfig {
        target_rate_hz: 0,
        ..Default::default()
    });
    assert_eq!(pipeline.decimation_ratio(), 1);
    assert!((0..50).all(|i| producer.push(moving(i)) == Outcome::Stored));
}

struct Script(std::vec::IntoIter<Sample>);

impl Transport for Script {
    fn acquire_sample(&mut self) -> Sample {
        self.0.next().unwrap_or_default()
    }
}

#[tokio::test]
async fn reader_woken_after_interrupt() {
    let (pipeline, mut producer, mailboxes) = pipeline_with(PipelineConfig::default());
    let id = ConsumerId(0);
    pipeline.register_reader(id).unwrap();
    let mut inbox = mailboxes.open(id);

    let mut transport = Script(vec![moving(0), moving(1), moving(2)].into_iter());
    for _ in 0..3 {
        producer.on_interrupt(&mut transport);
    }

    // Depth-one inbox: three writes, one pending wakeup
    assert!(inbox.recv().await.is_some());
    assert!(inbox.try_recv().is_err());
    assert_eq!(drain(&pipeline, id), vec![moving(0), moving(1), moving(2)]);

    mailboxes.close(id);
    pipeline.deregister_reader(id);
    assert_eq!(inbox.recv().await, None);
}

#[test]
fn consumer_threads_see_acquisition_order() {
    let (pipeline, mut producer, _) = pipeline_with(PipelineConfig {
        capacity: 4096,
        max_readers: 4,
        ..Default::default()
    });
    for id in 0..4 {
        pipeline.register_reader(ConsumerId(id)).unwrap();
    }

    let readers: Vec<_> = (0..4)
        .map(|id| {
            let pipeline = pipeline.clone();
            std::thread::spawn(move || {
                let mut seen = Vec::new();
                while seen.len() < 3000 {
                    match pipeline.read_next(ConsumerId(id)) {
                        Ok(Some(sample)) => seen.push(sample),
                        _ => std::thread::yield_now(),
                    }
                }
                seen
            })
        })
        .collect();

    let expected: Vec<Sample> = (0..3000).map(moving).collect();
    for sample in &expected {
        producer.push(*sample);
    }

    for reader in readers {
        assert_eq!(reader.join().unwrap(), expected);
    }
}

#[test]
fn registry_churn_during_writes_stays_bounded() {
    let (pipeline, mut producer, _) = pipeline_with(PipelineConfig {
        capacity: 64,
        max_readers: 4,
        ..Default::default()
    });

    let churners: Vec<_> = (0..8)
        .map(|id| {
            let pipeline = pipeline.clone();
            std::thread::spawn(move || {
                let id = ConsumerId(id);
                for _ in 0..2000 {
                    match pipeline.register_reader(id) {
                        Ok(()) | Err(PipelineError::ReaderRegistryFull { max_readers: 4 }) => {}
                        Err(err) => panic!("unexpected register error: {err}"),
                    }
                    match pipeline.read_next(id) {
                        Ok(_) | Err(PipelineError::NotRegistered) => {}
                        Err(err) => panic!("unexpected read error: {err}"),
                    }
                    assert!(pipeline.reader_count() <= 4);
                    pipeline.deregister_reader(id);
                }
            })
        })
        .collect();

    for i in 0..20_000 {
        producer.push(moving(i));
    }

    for churner in churners {
        churner.join().unwrap();
    }
    assert_eq!(pipeline.reader_count(), 0);
    assert_eq!(pipeline.total_written(), 20_000);
}
