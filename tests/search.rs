use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender};
use num_bigint::BigUint;
use rand::Rng;

use btc_puzzle::crypto::DeriveError;
use btc_puzzle::{
    AddressDeriver, Fingerprint, Hash160Deriver, KeyRange, MatchSet, Outcome, RangeLimit,
    SearchError, SearchOptions, WorkerPool,
};

fn big(n: u64) -> BigUint {
    BigUint::from(n)
}

fn options(workers: usize) -> SearchOptions {
    SearchOptions {
        workers,
        report_interval: Duration::from_millis(20),
        limit: RangeLimit::Enforced,
    }
}

/// Fingerprint is the candidate's big-endian bytes, right-aligned.
fn embed(candidate: &BigUint) -> Fingerprint {
    let raw = candidate.to_bytes_be();
    let mut bytes = [0u8; 20];
    bytes[20 - raw.len()..].copy_from_slice(&raw);
    Fingerprint::from_bytes(bytes)
}

/// Injective stand-in for the curve derivation; accepts zero.
struct Embed;

impl AddressDeriver for Embed {
    fn derive(&self, candidate: &BigUint) -> Result<Fingerprint, DeriveError> {
        Ok(embed(candidate))
    }
}

/// Records every candidate it is asked about.
struct Recording(Arc<Mutex<Vec<BigUint>>>);

impl AddressDeriver for Recording {
    fn derive(&self, candidate: &BigUint) -> Result<Fingerprint, DeriveError> {
        self.0.lock().unwrap().push(candidate.clone());
        Ok(embed(candidate))
    }
}

/// Every even candidate maps to the same fingerprint.
struct EvenCollide;

const EVEN: Fingerprint = Fingerprint::from_bytes([0xee; 20]);

impl AddressDeriver for EvenCollide {
    fn derive(&self, candidate: &BigUint) -> Result<Fingerprint, DeriveError> {
        if candidate.bit(0) {
            Ok(embed(candidate))
        } else {
            Ok(EVEN)
        }
    }
}

/// Blocks until the gate is dropped, then matches everything.
struct Gated(Receiver<()>);

impl AddressDeriver for Gated {
    fn derive(&self, _candidate: &BigUint) -> Result<Fingerprint, DeriveError> {
        let _ = self.0.recv();
        Ok(EVEN)
    }
}

#[test]
fn test_coverage_single_worker() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let range = KeyRange::with_len(big(1_000), 500).unwrap();

    let pool = WorkerPool::start(
        &range,
        MatchSet::empty(),
        Recording(seen.clone()),
        &options(1),
        |_| {},
    )
    .unwrap();
    let report = pool.wait().unwrap();

    assert_eq!(report.outcome, Outcome::Exhausted);
    assert_eq!(report.dispatched, 500);
    assert_eq!(report.checked, 500);

    let seen = seen.lock().unwrap();
    let expected: Vec<BigUint> = (1_000..1_500).map(big).collect();
    assert_eq!(*seen, expected);
}

#[test]
fn test_coverage_many_workers_no_duplicates() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let range = KeyRange::with_len(big(0), 2_000).unwrap();

    let pool = WorkerPool::start(
        &range,
        MatchSet::empty(),
        Recording(seen.clone()),
        &options(8),
        |_| {},
    )
    .unwrap();
    let report = pool.wait().unwrap();

    assert_eq!(report.outcome, Outcome::Exhausted);
    assert_eq!(report.dispatched, 2_000);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2_000);
    let unique: HashSet<&BigUint> = seen.iter().collect();
    assert_eq!(unique.len(), 2_000);
    assert!(seen.iter().all(|c| range.contains(c)));
}

#[test]
fn test_empty_targets_exhaust_range() {
    let range = KeyRange::with_len(big(0), 1_000).unwrap();
    let pool = WorkerPool::start(&range, MatchSet::empty(), Embed, &options(4), |_| {}).unwrap();
    let report = pool.wait().unwrap();

    assert_eq!(report.outcome, Outcome::Exhausted);
    assert_eq!(report.dispatched, 1_000);
}

#[test]
fn test_finds_key_eleven_with_real_derivation() {
    let deriver = Hash160Deriver::new();
    let target = deriver.derive(&big(11)).unwrap();
    let range = KeyRange::with_len(big(5), 10).unwrap();

    let pool = WorkerPool::start(&range, MatchSet::new([target]), deriver, &options(2), |_| {})
        .unwrap();
    let report = pool.wait().unwrap();

    match &report.outcome {
        Outcome::Found(result) => assert_eq!(result.candidate, big(11)),
        other => panic!("expected a match, got {:?}", other),
    }
    assert!(report.dispatched >= 7, "dispatched {}", report.dispatched);
    assert!(report.dispatched <= 10, "dispatched {}", report.dispatched);
}

#[test]
fn test_finds_puzzle_three_address() {
    let target = Fingerprint::from_address("19ZewH8Kk1PDbSNdJ97FP4EiCjTRaZMZQA").unwrap();
    let range = KeyRange::new(big(4), big(7)).unwrap();

    let pool = WorkerPool::start(
        &range,
        MatchSet::new([target]),
        Hash160Deriver::new(),
        &options(3),
        |_| {},
    )
    .unwrap();
    let report = pool.wait().unwrap();

    let result = report.outcome.result().expect("key 7 is in range");
    assert_eq!(result.candidate, big(7));
    let wif = result.wif().unwrap();
    assert_eq!(wif.len(), 52);
    assert!(wif.starts_with('K') || wif.starts_with('L'));
}

#[test]
fn test_single_winner_among_many_matches() {
    let range = KeyRange::with_len(big(1), 10_000).unwrap();

    for _ in 0..20 {
        let pool =
            WorkerPool::start(&range, MatchSet::new([EVEN]), EvenCollide, &options(4), |_| {})
                .unwrap();
        let report = pool.wait().unwrap();

        let result = report.outcome.result().expect("many even keys match");
        assert!(!result.candidate.bit(0));
        // Nothing queued after the win gets processed.
        assert!(report.dispatched < 10_000);
        assert!(report.checked <= report.dispatched);
    }
}

#[test]
fn test_no_false_positive() {
    let mut rng = rand::thread_rng();
    let start: u64 = rng.gen_range(1..u64::MAX / 2);
    let range = KeyRange::with_len(big(start), 300).unwrap();
    // Just outside the range on both sides.
    let targets = MatchSet::new([embed(&big(start - 1)), embed(&big(start + 300))]);

    let pool = WorkerPool::start(&range, targets, Embed, &options(3), |_| {}).unwrap();
    let report = pool.wait().unwrap();

    assert_eq!(report.outcome, Outcome::Exhausted);
    assert_eq!(report.dispatched, 300);
}

#[test]
fn test_cancellation_is_prompt() {
    let workers = 2;
    let (gate_tx, gate_rx): (Sender<()>, Receiver<()>) = bounded(0);
    let range = KeyRange::with_len(big(1), 1_000_000).unwrap();

    let pool = WorkerPool::start(
        &range,
        MatchSet::new([EVEN]),
        Gated(gate_rx),
        &options(workers),
        |_| {},
    )
    .unwrap();

    // Each worker holds one candidate and the queue is full behind them.
    let deadline = Instant::now() + Duration::from_secs(10);
    while pool.dispatched() < (2 * workers) as u64 {
        assert!(Instant::now() < deadline, "queue never filled");
        thread::sleep(Duration::from_millis(1));
    }
    let at_cancel = pool.dispatched();

    assert!(pool.cancel());
    drop(gate_tx);

    let report = pool.wait().unwrap();
    assert_eq!(report.outcome, Outcome::Cancelled);
    assert!(report.dispatched <= at_cancel + workers as u64);
}

#[test]
fn test_cancel_handle_from_another_thread() {
    let range = KeyRange::with_len(big(1), 1).unwrap();
    let pool = WorkerPool::start(
        &range,
        MatchSet::empty(),
        Embed,
        &SearchOptions {
            limit: RangeLimit::Advisory,
            ..options(2)
        },
        |_| {},
    )
    .unwrap();

    let handle = pool.cancel_handle();
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        handle.cancel();
    });

    let report = pool.wait().unwrap();
    assert_eq!(report.outcome, Outcome::Cancelled);
    // Ran past the single-key range.
    assert!(report.dispatched > 1);
}

#[test]
fn test_advisory_limit_searches_past_max() {
    let range = KeyRange::new(big(1), big(3)).unwrap();
    let pool = WorkerPool::start(
        &range,
        MatchSet::new([embed(&big(40))]),
        Embed,
        &SearchOptions {
            limit: RangeLimit::Advisory,
            ..options(2)
        },
        |_| {},
    )
    .unwrap();
    let report = pool.wait().unwrap();

    assert_eq!(report.outcome.result().map(|r| &r.candidate), Some(&big(40)));
}

#[test]
fn test_enforced_limit_stops_at_max() {
    let range = KeyRange::new(big(1), big(3)).unwrap();
    let pool = WorkerPool::start(
        &range,
        MatchSet::new([embed(&big(4))]),
        Embed,
        &options(2),
        |_| {},
    )
    .unwrap();
    let report = pool.wait().unwrap();

    assert_eq!(report.outcome, Outcome::Exhausted);
    assert_eq!(report.dispatched, 3);
}

#[test]
fn test_derivation_failure_aborts_run() {
    // Zero is not a valid secret key.
    let range = KeyRange::with_len(big(0), 100).unwrap();
    let pool = WorkerPool::start(
        &range,
        MatchSet::empty(),
        Hash160Deriver::new(),
        &options(2),
        |_| {},
    )
    .unwrap();

    match pool.wait() {
        Err(SearchError::Derivation(err)) => assert_eq!(err.candidate(), &big(0)),
        other => panic!("expected derivation failure, got {:?}", other),
    }
}

#[test]
fn test_progress_is_reported() {
    let ticks = Arc::new(Mutex::new(Vec::new()));
    let sink = ticks.clone();
    let (gate_tx, gate_rx) = bounded::<()>(0);
    let range = KeyRange::with_len(big(1), 100).unwrap();

    let pool = WorkerPool::start(
        &range,
        MatchSet::new([EVEN]),
        Gated(gate_rx),
        &options(1),
        move |snap| sink.lock().unwrap().push(snap.dispatched),
    )
    .unwrap();

    thread::sleep(Duration::from_millis(100));
    drop(gate_tx);
    let report = pool.wait().unwrap();

    assert!(report.outcome.result().is_some());
    let ticks = ticks.lock().unwrap();
    assert!(!ticks.is_empty());
    assert!(ticks.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_zero_workers_rejected() {
    let range = KeyRange::with_len(big(1), 10).unwrap();
    let err = WorkerPool::start(&range, MatchSet::empty(), Embed, &options(0), |_| {})
        .err()
        .expect("zero workers must be rejected");
    assert!(matches!(err, SearchError::NoWorkers));
}
