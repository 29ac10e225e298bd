use crate::{
    CUSTOM_EPOCH, ConfigError, Error, Fields, Generator, IdGenerator, Identifier, Layout,
    RangeError, TimeSource,
};
use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::thread::scope;

struct MockTime {
    millis: u64,
}

impl TimeSource<u64> for MockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

/// A clock the test moves by hand.
#[derive(Clone, Default)]
struct SharedMockTime {
    millis: Rc<Cell<u64>>,
}

impl SharedMockTime {
    fn at(millis: u64) -> Self {
        let time = Self::default();
        time.millis.set(millis);
        time
    }
}

impl TimeSource<u64> for SharedMockTime {
    fn current_millis(&self) -> u64 {
        self.millis.get()
    }
}

/// Reports `before` for the first `reads_before` reads, then `after`.
struct MockStepTime {
    reads: Rc<Cell<u64>>,
    reads_before: u64,
    before: u64,
    after: u64,
}

impl TimeSource<u64> for MockStepTime {
    fn current_millis(&self) -> u64 {
        let reads = self.reads.get() + 1;
        self.reads.set(reads);
        if reads <= self.reads_before {
            self.before
        } else {
            self.after
        }
    }
}

fn tiny_step_layout() -> Layout {
    // Four identifiers per millisecond.
    Layout::new(40, 40, 16, 2).unwrap()
}

fn run_id_sequence_increments_within_same_tick<G>(generator: &G)
where
    G: IdGenerator,
{
    let id1 = generator.generate(7).unwrap();
    let id2 = generator.generate(7).unwrap();
    let id3 = generator.generate(7).unwrap();

    let f1 = generator.parse(id1.as_str()).unwrap();
    let f2 = generator.parse(id2.as_str()).unwrap();
    let f3 = generator.parse(id3.as_str()).unwrap();

    assert_eq!(f1, Fields::new(7, 42, 1, 0));
    assert_eq!(f2, Fields::new(7, 42, 1, 1));
    assert_eq!(f3, Fields::new(7, 42, 1, 2));
    assert!(id1 < id2 && id2 < id3);
}

fn run_round_trip<G>(generator: &G, node: u64)
where
    G: IdGenerator,
{
    for pre in [0, 1, 1234, 8_888_888, 1_099_511_627_775] {
        let id = generator.generate(pre).unwrap();
        let fields = generator.parse(id.as_str()).unwrap();
        assert_eq!(fields.pre, pre);
        assert_eq!(fields.node, node);
        assert!(fields.time > 0);
        assert!(fields.step <= Layout::DEFAULT.max_step());
    }
}

fn run_generator_monotonic<G>(generator: &G)
where
    G: IdGenerator,
{
    const TOTAL_IDS: usize = 1 << 18;

    let mut last: Option<Identifier> = None;
    for _ in 0..TOTAL_IDS {
        let id = generator.generate(99).unwrap();
        if let Some(prev) = last {
            assert!(id > prev, "{id:?} <= {prev:?}");
            assert!(id.as_str() > prev.as_str());
        }
        last = Some(id);
    }
}

fn run_generator_unique_threaded<G>(generator: &G)
where
    G: IdGenerator + Sync,
{
    let threads = num_cpus::get().clamp(2, 8);
    const IDS_PER_THREAD: usize = 1 << 15;

    let seen_ids = Mutex::new(HashSet::with_capacity(threads * IDS_PER_THREAD));

    scope(|s| {
        for t in 0..threads {
            let seen_ids = &seen_ids;
            s.spawn(move || {
                let mut local = Vec::with_capacity(IDS_PER_THREAD);
                for _ in 0..IDS_PER_THREAD {
                    local.push(generator.generate(t as u64).unwrap());
                }
                // Per-thread issue order is preserved for a fixed pre value.
                assert!(local.windows(2).all(|w| w[0] < w[1]));

                let mut seen = seen_ids.lock().unwrap();
                for id in local {
                    assert!(seen.insert(id), "duplicate id {id}");
                }
            });
        }
    });

    assert_eq!(seen_ids.lock().unwrap().len(), threads * IDS_PER_THREAD);
}

#[test]
fn id_sequence_increments_within_same_tick() {
    let generator =
        Generator::with_time_source(1, Layout::DEFAULT, MockTime { millis: 42 }).unwrap();
    run_id_sequence_increments_within_same_tick(&generator);
}

#[test]
fn step_resets_when_clock_advances() {
    let time = SharedMockTime::at(42);
    let generator = Generator::with_time_source(3, Layout::DEFAULT, time.clone()).unwrap();

    assert_eq!(generator.generate_fields(1).unwrap(), Fields::new(1, 42, 3, 0));
    assert_eq!(generator.generate_fields(1).unwrap(), Fields::new(1, 42, 3, 1));

    time.millis.set(43);
    assert_eq!(generator.generate_fields(1).unwrap(), Fields::new(1, 43, 3, 0));
}

#[test]
fn step_resets_when_clock_goes_backward() {
    let time = SharedMockTime::at(42);
    let generator = Generator::with_time_source(3, Layout::DEFAULT, time.clone()).unwrap();
    generator.generate_fields(1).unwrap();
    generator.generate_fields(1).unwrap();

    time.millis.set(40);
    assert_eq!(generator.generate_fields(1).unwrap(), Fields::new(1, 40, 3, 0));
}

#[test]
fn exhausted_step_space_waits_for_next_millisecond() {
    let reads = Rc::new(Cell::new(0));
    let time = MockStepTime {
        reads: Rc::clone(&reads),
        // One read at construction, four for the steps of millisecond 42, one
        // that finds the millisecond exhausted, one spin.
        reads_before: 7,
        before: 42,
        after: 43,
    };
    let generator = Generator::with_time_source(1, tiny_step_layout(), time).unwrap();

    for step in 0..=3 {
        assert_eq!(
            generator.generate_fields(5).unwrap(),
            Fields::new(5, 42, 1, step)
        );
    }

    let fields = generator.generate_fields(5).unwrap();
    assert_eq!(fields, Fields::new(5, 43, 1, 0));
    assert!(reads.get() >= 8);
}

#[test]
fn exhausted_step_space_never_repeats_with_real_clock() {
    let generator = Generator::new(1, CUSTOM_EPOCH, tiny_step_layout()).unwrap();
    let mut seen = HashSet::new();
    let mut last = None;
    for _ in 0..64 {
        let fields = generator.generate_fields(0).unwrap();
        assert!(fields.step <= 3);
        assert!(seen.insert(fields));
        if let Some(prev) = last {
            assert!(fields > prev);
        }
        last = Some(fields);
    }
}

#[test]
fn out_of_range_pre_is_rejected_without_touching_state() {
    let generator =
        Generator::with_time_source(1, Layout::DEFAULT, MockTime { millis: 42 }).unwrap();
    let max = Layout::DEFAULT.max_pre();

    assert_eq!(generator.generate_fields(max).unwrap().step, 0);
    assert_eq!(
        generator.generate(max + 1).unwrap_err(),
        Error::Range(RangeError::PreOutOfRange { pre: max + 1, max })
    );
    assert_eq!(
        generator.generate_fields(u64::MAX).unwrap_err(),
        Error::Range(RangeError::PreOutOfRange { pre: u64::MAX, max })
    );
    assert_eq!(generator.generate_fields(0).unwrap().step, 1);
}

#[test]
fn node_boundaries() {
    let layout = Layout::DEFAULT;
    let max = layout.max_node();

    assert_eq!(Generator::new(0, CUSTOM_EPOCH, layout).unwrap().node(), 0);
    assert_eq!(Generator::new(max, CUSTOM_EPOCH, layout).unwrap().node(), max);
    assert_eq!(
        Generator::new(max + 1, CUSTOM_EPOCH, layout).unwrap_err(),
        ConfigError::NodeOutOfRange { node: max + 1, max }
    );
}

#[test]
fn clock_past_time_horizon_fails_construction() {
    let layout = Layout::DEFAULT;
    let now = layout.max_time() + 1;
    assert_eq!(
        Generator::with_time_source(1, layout, MockTime { millis: now }).unwrap_err(),
        ConfigError::TimeOutOfRange {
            now,
            max: layout.max_time()
        }
    );
}

#[test]
fn time_wraps_past_horizon() {
    let layout = Layout::new(40, 8, 16, 16).unwrap();
    let time = SharedMockTime::at(200);
    let generator = Generator::with_time_source(1, layout, time.clone()).unwrap();
    assert_eq!(generator.generate_fields(0).unwrap().time, 200);

    time.millis.set(300);
    assert_eq!(generator.generate_fields(0).unwrap().time, 300 & 0xff);
}

#[test]
fn wrapped_readings_that_collide_keep_counting_steps() {
    let layout = Layout::new(40, 8, 16, 16).unwrap();
    let time = SharedMockTime::at(200);
    let generator = Generator::with_time_source(1, layout, time.clone()).unwrap();
    let first = generator.generate(0).unwrap();

    // 456 & 0xff == 200
    time.millis.set(456);
    let second = generator.generate(0).unwrap();
    assert_ne!(first, second);
    assert_eq!(
        generator.parse(second.as_str()).unwrap(),
        Fields::new(0, 200, 1, 1)
    );
}

#[test]
fn exhaustion_at_time_horizon_wraps_to_zero() {
    let reads = Rc::new(Cell::new(0));
    let time = MockStepTime {
        reads: Rc::clone(&reads),
        reads_before: 7,
        before: 255,
        after: 256,
    };
    let layout = Layout::new(40, 8, 16, 2).unwrap();
    let generator = Generator::with_time_source(1, layout, time).unwrap();

    for step in 0..=3 {
        assert_eq!(
            generator.generate_fields(5).unwrap(),
            Fields::new(5, 255, 1, step)
        );
    }
    assert_eq!(generator.generate_fields(5).unwrap(), Fields::new(5, 0, 1, 0));
    assert!(reads.get() >= 8);
}

#[test]
fn round_trip_with_monotonic_clock() {
    let generator = Generator::new(1, CUSTOM_EPOCH, Layout::DEFAULT).unwrap();
    run_round_trip(&generator, 1);

    let id = generator.generate(1234).unwrap();
    let fields = crate::parse(id.as_str()).unwrap();
    assert_eq!(fields.pre, 1234);
    assert_eq!(fields.node, 1);
}

#[test]
fn output_is_fixed_width() {
    let generator = Generator::new(0, CUSTOM_EPOCH, Layout::DEFAULT).unwrap();
    for pre in [0, 1, 0xff, 0xffff_ffff, Layout::DEFAULT.max_pre()] {
        assert_eq!(generator.generate(pre).unwrap().len(), 28);
    }

    let layout = Layout::new(24, 41, 10, 12).unwrap();
    let generator = Generator::new(3, CUSTOM_EPOCH, layout).unwrap();
    assert_eq!(generator.generate(0).unwrap().len(), layout.text_len());
}

#[test]
fn ids_are_unique_and_monotonic() {
    let generator = Generator::new(1, CUSTOM_EPOCH, Layout::DEFAULT).unwrap();
    run_generator_monotonic(&generator);
}

#[test]
fn time_and_step_increase_across_pre_values() {
    let generator = Generator::new(1, CUSTOM_EPOCH, Layout::DEFAULT).unwrap();
    let mut last = (0, 0);
    for i in 0..100_000_u64 {
        let fields = generator.generate_fields(i % 3).unwrap();
        let current = (fields.time, fields.step);
        assert!(current > last, "{current:?} <= {last:?}");
        last = current;
    }
}

#[test]
fn numeric_order_follows_pre_before_issue_order() {
    let generator =
        Generator::with_time_source(1, Layout::DEFAULT, MockTime { millis: 42 }).unwrap();

    let high = generator.generate(5).unwrap();
    let low = generator.generate(3).unwrap();
    let high_again = generator.generate(5).unwrap();

    // Issued later, but the smaller pre sorts first.
    assert!(low < high);
    assert!(low.to_raw() < high.to_raw());
    assert!(low.as_str() < high.as_str());
    // Within one pre value, issue order holds.
    assert!(high_again > high);

    let fields: Vec<_> = [high, low, high_again]
        .iter()
        .map(|id| generator.parse(id.as_str()).unwrap())
        .collect();
    let steps: Vec<_> = fields.iter().map(|f| (f.time, f.step)).collect();
    assert_eq!(steps, [(42, 0), (42, 1), (42, 2)]);
}

#[test]
fn ids_are_unique_across_threads() {
    let generator = Generator::new(1, CUSTOM_EPOCH, Layout::DEFAULT).unwrap();
    run_generator_unique_threaded(&generator);
}

#[test]
fn ids_are_unique_across_threads_with_tiny_step() {
    // Forces frequent exhaustion under contention.
    let generator = Generator::new(1, CUSTOM_EPOCH, Layout::new(40, 40, 16, 4).unwrap()).unwrap();
    let threads = 4;
    let seen = Mutex::new(HashSet::new());
    scope(|s| {
        for _ in 0..threads {
            s.spawn(|| {
                for _ in 0..256 {
                    let id = generator.generate(0).unwrap();
                    assert!(seen.lock().unwrap().insert(id));
                }
            });
        }
    });
    assert_eq!(seen.lock().unwrap().len(), threads * 256);
}

#[test]
fn trait_is_usable_through_arc() {
    let generator = Arc::new(
        Generator::with_time_source(1, Layout::DEFAULT, MockTime { millis: 42 }).unwrap(),
    );
    run_id_sequence_increments_within_same_tick(&generator);
}

#[test]
fn parse_rejects_malformed_text() {
    let generator = Generator::new(1, CUSTOM_EPOCH, Layout::DEFAULT).unwrap();
    let id = generator.generate(1).unwrap();
    let text = id.as_str();

    assert!(generator.parse(&text[..27]).is_err());
    assert!(generator.parse(&format!("{text}0")).is_err());
    assert!(generator.parse(&text.replace('0', "g")).is_err());

    // Decoding never disturbs the sequence.
    let next = generator.generate(1).unwrap();
    assert!(next > id);
}
