//! Polling cycle and merge.
//!
//! The [`Aggregator`] groups tracked symbols by provider once, then on every
//! cycle asks all providers concurrently and merges their answers into the
//! position-indexed [`ResultTable`].
//!
//! # Merge policy
//!
//! | Provider outcome                | Effect on the group's entries              |
//! |---------------------------------|--------------------------------------------|
//! | `Err(_)` (whole batch failed)   | untouched, last known values stay          |
//! | `Ok`, ticker → `Some(quote)`    | overwritten with the new quote             |
//! | `Ok`, ticker → `None` / missing | cleared to absent                          |
//!
//! An outage keeps stale data on screen; a provider that answers but has no
//! data for a symbol blanks it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use futures_util::{Stream, StreamExt, stream};
use tb_core::config::TickerSpec;
use tb_core::{ResultTable, TbError, TrackedSymbol};
use tracing::{debug, warn};

use crate::QuoteProvider;
use crate::clock::Clock;
use crate::output::FrameSink;
use crate::registry::ProviderRegistry;
use crate::render::{self, Frame};

/// All tracked symbols served by one provider.
struct ProviderGroup {
    provider_id: String,
    provider: Arc<dyn QuoteProvider>,
    /// Unique source tickers in configuration order; this is the request.
    tickers: Vec<String>,
    /// Source ticker → every table position tracking it.
    positions: HashMap<String, Vec<usize>>,
}

/// Outcome counters for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Provider groups whose fetch succeeded.
    pub groups_ok: usize,
    /// Provider groups whose fetch failed as a whole.
    pub groups_failed: usize,
    /// Table entries holding a quote after the merge.
    pub populated: usize,
}

/// Owns the result table and drives polling cycles.
pub struct Aggregator {
    groups: Vec<ProviderGroup>,
    table: ResultTable,
}

impl Aggregator {
    /// Group `symbols` by provider, resolving each id through `registry`.
    ///
    /// Groups are ordered by first appearance of their provider id. Fails if a
    /// symbol names a provider the registry does not know, or if the positions
    /// are not exactly `0..N-1`.
    pub fn new(symbols: Vec<TrackedSymbol>, registry: &ProviderRegistry) -> Result<Self, TbError> {
        let mut seen = vec![false; symbols.len()];
        for sym in &symbols {
            match seen.get_mut(sym.position) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(TbError::Config(format!(
                        "symbol '{}' has out-of-range or duplicate position {} ({} symbols)",
                        sym.display_symbol,
                        sym.position,
                        symbols.len()
                    )));
                }
            }
        }

        let mut groups: Vec<ProviderGroup> = Vec::new();
        let mut group_index: HashMap<String, usize> = HashMap::new();

        for sym in &symbols {
            let idx = match group_index.get(&sym.provider_id) {
                Some(&idx) => idx,
                None => {
                    let provider = registry.get(&sym.provider_id).ok_or_else(|| {
                        TbError::Config(format!("unknown provider '{}'", sym.provider_id))
                    })?;
                    groups.push(ProviderGroup {
                        provider_id: sym.provider_id.clone(),
                        provider,
                        tickers: Vec::new(),
                        positions: HashMap::new(),
                    });
                    group_index.insert(sym.provider_id.clone(), groups.len() - 1);
                    groups.len() - 1
                }
            };

            let group = &mut groups[idx];
            let positions = group.positions.entry(sym.source_ticker.clone()).or_default();
            if positions.is_empty() {
                group.tickers.push(sym.source_ticker.clone());
            }
            positions.push(sym.position);
        }

        Ok(Self {
            groups,
            table: ResultTable::new(symbols),
        })
    }

    /// Build from ticker specs, assigning positions in the order given.
    pub fn from_specs(specs: &[TickerSpec], registry: &ProviderRegistry) -> Result<Self, TbError> {
        Self::new(TrackedSymbol::from_specs(specs), registry)
    }

    pub fn table(&self) -> &ResultTable {
        &self.table
    }

    /// Render the current table.
    pub fn frame(&self) -> Frame {
        render::render_frame(&self.table)
    }

    /// Fetch from every provider group concurrently and merge the results.
    pub async fn poll_cycle(&mut self) -> CycleReport {
        let results = join_all(
            self.groups
                .iter()
                .map(|group| group.provider.fetch(&group.tickers)),
        )
        .await;

        let mut report = CycleReport::default();
        for (group, result) in self.groups.iter().zip(results) {
            match result {
                Ok(batch) => {
                    report.groups_ok += 1;
                    for &pos in group.positions.values().flatten() {
                        self.table.set(pos, None);
                    }
                    for (ticker, quote) in batch {
                        match group.positions.get(&ticker) {
                            Some(positions) => {
                                for &pos in positions {
                                    self.table.set(pos, quote);
                                }
                            }
                            None => warn!(
                                "[{}] returned unrequested ticker '{ticker}', ignored",
                                group.provider_id
                            ),
                        }
                    }
                }
                Err(e) => {
                    report.groups_failed += 1;
                    warn!(
                        "[{}] fetch failed, keeping last values for {} ticker(s): {e}",
                        group.provider_id,
                        group.tickers.len()
                    );
                }
            }
        }
        report.populated = self.table.populated();
        report
    }

    /// Infinite stream of frames, one per cycle.
    ///
    /// The first cycle runs as soon as the stream is polled; every later
    /// cycle is preceded by `clock.sleep(interval)`, i.e. the sleep happens
    /// after the previous frame has been handed out.
    pub fn frames(self, interval: Duration, clock: Arc<dyn Clock>) -> impl Stream<Item = Frame> {
        stream::unfold((self, clock, 0u64), move |(mut agg, clock, cycle)| async move {
            if cycle > 0 {
                clock.sleep(interval).await;
            }
            let report = agg.poll_cycle().await;
            debug!(
                "cycle {cycle}: {} group(s) ok, {} failed, {}/{} priced",
                report.groups_ok,
                report.groups_failed,
                report.populated,
                agg.table.len()
            );
            let frame = agg.frame();
            Some((frame, (agg, clock, cycle + 1)))
        })
    }
}

/// Poll, render and emit until the sink fails or `max_cycles` frames have
/// been written. `None` runs forever.
pub async fn run(
    aggregator: Aggregator,
    interval: Duration,
    clock: Arc<dyn Clock>,
    sink: &mut dyn FrameSink,
    max_cycles: Option<u64>,
) -> Result<(), TbError> {
    let frames = aggregator.frames(interval, clock.clone());
    futures_util::pin_mut!(frames);

    let mut emitted = 0u64;
    while let Some(frame) = frames.next().await {
        sink.emit(&frame, clock.now())?;
        emitted += 1;
        if max_cycles.is_some_and(|max| emitted >= max) {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{DateTime, Local, TimeZone};
    use tb_core::Quote;

    use super::*;
    use crate::QuoteBatch;
    use crate::render::render_fragment;

    /// Replays one scripted outcome per call and records each request.
    struct Scripted {
        name: String,
        script: Mutex<VecDeque<Result<QuoteBatch, TbError>>>,
        requests: Mutex<Vec<Vec<String>>>,
    }

    impl Scripted {
        fn new(name: &str, script: Vec<Result<QuoteBatch, TbError>>) -> Arc<Self> {
            Arc::new(Self {
                name: name.into(),
                script: Mutex::new(script.into()),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl QuoteProvider for Scripted {
        fn name(&self) -> &str {
            &self.name
        }

        async fn fetch(&self, tickers: &[String]) -> Result<QuoteBatch, TbError> {
            self.requests.lock().unwrap().push(tickers.to_vec());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TbError::Transport("script exhausted".into())))
        }
    }

    /// Records sleeps, never actually waits.
    #[derive(Default)]
    struct FakeClock {
        sleeps: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Clock for FakeClock {
        fn now(&self) -> DateTime<Local> {
            Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
        }

        async fn sleep(&self, duration: Duration) {
            self.sleeps.lock().unwrap().push(duration);
        }
    }

    #[derive(Default)]
    struct CollectSink {
        frames: Vec<Frame>,
    }

    impl FrameSink for CollectSink {
        fn emit(&mut self, frame: &Frame, _at: DateTime<Local>) -> Result<(), TbError> {
            self.frames.push(frame.clone());
            Ok(())
        }
    }

    fn q(last: f64, change: f64) -> Quote {
        Quote::new(last, last, last, last, change)
    }

    fn ok(entries: &[(&str, Option<Quote>)]) -> Result<QuoteBatch, TbError> {
        Ok(entries.iter().map(|(t, q)| (t.to_string(), *q)).collect())
    }

    fn specs(list: &[&str]) -> Vec<TickerSpec> {
        list.iter().map(|s| s.parse().unwrap()).collect()
    }

    fn registry(providers: &[(&str, Arc<Scripted>)]) -> ProviderRegistry {
        let mut r = ProviderRegistry::new();
        for (id, p) in providers {
            r.register(*id, p.clone() as Arc<dyn QuoteProvider>);
        }
        r
    }

    fn quote_at(agg: &Aggregator, pos: usize) -> Option<Quote> {
        agg.table().get(pos).unwrap().quote
    }

    #[test]
    fn unknown_provider_is_config_error() {
        let err = Aggregator::from_specs(&specs(&["nyse:IBM:IBM"]), &ProviderRegistry::new())
            .err()
            .unwrap();
        assert!(matches!(err, TbError::Config(_)));
    }

    fn tracked(position: usize, ticker: &str) -> TrackedSymbol {
        TrackedSymbol {
            provider_id: "pa".into(),
            source_ticker: ticker.into(),
            display_symbol: ticker.into(),
            position,
        }
    }

    #[test]
    fn rejects_duplicate_or_out_of_range_positions() {
        let a = Scripted::new("a", vec![]);
        let reg = registry(&[("pa", a)]);

        let dup = Aggregator::new(vec![tracked(1, "A1"), tracked(1, "A2")], &reg).err().unwrap();
        assert!(matches!(dup, TbError::Config(msg) if msg.contains("position 1")));

        let gap = Aggregator::new(vec![tracked(0, "A1"), tracked(2, "A2")], &reg).err().unwrap();
        assert!(matches!(gap, TbError::Config(_)));

        let shuffled = Aggregator::new(vec![tracked(1, "A2"), tracked(0, "A1")], &reg).unwrap();
        assert_eq!(shuffled.table().get(0).unwrap().symbol.source_ticker, "A1");
    }

    /// Waits until its partner has been called; only finishes if both
    /// fetches are in flight at the same time.
    struct Rendezvous {
        name: String,
        signal: Arc<tokio::sync::Notify>,
        waits: bool,
    }

    #[async_trait]
    impl QuoteProvider for Rendezvous {
        fn name(&self) -> &str {
            &self.name
        }

        async fn fetch(&self, tickers: &[String]) -> Result<QuoteBatch, TbError> {
            if self.waits {
                self.signal.notified().await;
            } else {
                self.signal.notify_one();
            }
            Ok(tickers.iter().map(|t| (t.clone(), Some(q(1.0, 1.0)))).collect())
        }
    }

    #[tokio::test]
    async fn provider_groups_fetch_concurrently() {
        let signal = Arc::new(tokio::sync::Notify::new());
        let mut reg = ProviderRegistry::new();
        reg.register(
            "pw",
            Arc::new(Rendezvous { name: "pw".into(), signal: signal.clone(), waits: true }),
        );
        reg.register(
            "ps",
            Arc::new(Rendezvous { name: "ps".into(), signal, waits: false }),
        );
        // The waiting group comes first, so a one-at-a-time cycle never
        // reaches the signalling group.
        let mut agg = Aggregator::from_specs(&specs(&["pw:W1:w", "ps:S1:s"]), &reg).unwrap();

        let report = tokio::time::timeout(Duration::from_secs(2), agg.poll_cycle())
            .await
            .expect("provider groups were fetched one after another");

        assert_eq!(report, CycleReport { groups_ok: 2, groups_failed: 0, populated: 2 });
    }

    #[tokio::test]
    async fn groups_requests_and_keeps_config_order() {
        let a = Scripted::new("a", vec![ok(&[("A1", Some(q(1.0, 1.0))), ("A2", Some(q(2.0, 1.0)))])]);
        let b = Scripted::new("b", vec![ok(&[("B1", Some(q(3.0, -1.0)))])]);
        let reg = registry(&[("pa", a.clone()), ("pb", b.clone())]);
        let mut agg =
            Aggregator::from_specs(&specs(&["pa:A1:x", "pb:B1:y", "pa:A2:z"]), &reg).unwrap();

        let report = agg.poll_cycle().await;

        assert_eq!(report, CycleReport { groups_ok: 2, groups_failed: 0, populated: 3 });
        assert_eq!(*a.requests.lock().unwrap(), [vec!["A1".to_string(), "A2".to_string()]]);
        assert_eq!(*b.requests.lock().unwrap(), [vec!["B1".to_string()]]);
        assert_eq!(agg.table().len(), 3);
        let order: Vec<_> = agg.table().iter().map(|e| e.symbol.display_symbol.as_str()).collect();
        assert_eq!(order, ["x", "y", "z"]);
        assert_eq!(quote_at(&agg, 1).unwrap().last_price(), 3.0);
        assert_eq!(quote_at(&agg, 2).unwrap().last_price(), 2.0);
    }

    #[tokio::test]
    async fn provider_order_does_not_matter() {
        // Provider answers in reverse order; positions still line up.
        let a = Scripted::new("a", vec![ok(&[("A2", Some(q(2.0, 1.0))), ("A1", Some(q(1.0, 1.0)))])]);
        let reg = registry(&[("pa", a)]);
        let mut agg = Aggregator::from_specs(&specs(&["pa:A1:x", "pa:A2:z"]), &reg).unwrap();

        agg.poll_cycle().await;

        assert_eq!(quote_at(&agg, 0).unwrap().last_price(), 1.0);
        assert_eq!(quote_at(&agg, 1).unwrap().last_price(), 2.0);
    }

    #[tokio::test]
    async fn group_failure_keeps_previous_values() {
        let a = Scripted::new(
            "a",
            vec![
                ok(&[("A1", Some(q(1.0, 1.0))), ("A2", Some(q(2.0, -1.0)))]),
                Err(TbError::Timeout("a".into())),
            ],
        );
        let reg = registry(&[("pa", a)]);
        let mut agg = Aggregator::from_specs(&specs(&["pa:A1:x", "pa:A2:z"]), &reg).unwrap();

        agg.poll_cycle().await;
        let before = agg.frame();
        let report = agg.poll_cycle().await;

        assert_eq!(report.groups_failed, 1);
        assert_eq!(report.populated, 2);
        assert_eq!(agg.frame(), before);
    }

    #[tokio::test]
    async fn successful_absent_clears_entry() {
        let a = Scripted::new(
            "a",
            vec![
                ok(&[("A1", Some(q(1.0, 1.0))), ("A2", Some(q(2.0, 1.0)))]),
                ok(&[("A1", None), ("A2", Some(q(2.5, 2.0)))]),
            ],
        );
        let reg = registry(&[("pa", a)]);
        let mut agg = Aggregator::from_specs(&specs(&["pa:A1:x", "pa:A2:z"]), &reg).unwrap();

        agg.poll_cycle().await;
        agg.poll_cycle().await;

        assert_eq!(quote_at(&agg, 0), None);
        assert_eq!(quote_at(&agg, 1).unwrap().last_price(), 2.5);
        assert!(agg.frame().line.starts_with("x ?"));
    }

    #[tokio::test]
    async fn short_batch_clears_unmatched_and_ignores_strays() {
        let a = Scripted::new(
            "a",
            vec![
                ok(&[("A1", Some(q(1.0, 1.0))), ("A2", Some(q(2.0, 1.0)))]),
                ok(&[("A1", Some(q(1.5, 1.0))), ("ZZZ", Some(q(9.0, 9.0)))]),
            ],
        );
        let reg = registry(&[("pa", a)]);
        let mut agg = Aggregator::from_specs(&specs(&["pa:A1:x", "pa:A2:z"]), &reg).unwrap();

        agg.poll_cycle().await;
        let report = agg.poll_cycle().await;

        assert_eq!(report.populated, 1);
        assert_eq!(agg.table().len(), 2);
        assert_eq!(quote_at(&agg, 0).unwrap().last_price(), 1.5);
        assert_eq!(quote_at(&agg, 1), None);
    }

    #[tokio::test]
    async fn outage_in_one_group_leaves_other_group_fresh() {
        let a = Scripted::new(
            "a",
            vec![ok(&[("A1", Some(q(1.0, 1.0)))]), Err(TbError::Transport("down".into()))],
        );
        let b = Scripted::new(
            "b",
            vec![ok(&[("B1", Some(q(3.0, 1.0)))]), ok(&[("B1", Some(q(4.0, 1.0)))])],
        );
        let reg = registry(&[("pa", a), ("pb", b)]);
        let mut agg = Aggregator::from_specs(&specs(&["pa:A1:x", "pb:B1:y"]), &reg).unwrap();

        agg.poll_cycle().await;
        let report = agg.poll_cycle().await;

        assert_eq!(report, CycleReport { groups_ok: 1, groups_failed: 1, populated: 2 });
        assert_eq!(quote_at(&agg, 0).unwrap().last_price(), 1.0);
        assert_eq!(quote_at(&agg, 1).unwrap().last_price(), 4.0);
    }

    #[tokio::test]
    async fn duplicate_ticker_fetched_once_filled_twice() {
        let a = Scripted::new("a", vec![ok(&[("A1", Some(q(7.0, 1.0)))])]);
        let reg = registry(&[("pa", a.clone())]);
        let mut agg = Aggregator::from_specs(&specs(&["pa:A1:x", "pa:A1:x2"]), &reg).unwrap();

        agg.poll_cycle().await;

        assert_eq!(*a.requests.lock().unwrap(), [vec!["A1".to_string()]]);
        assert_eq!(quote_at(&agg, 0).unwrap().last_price(), 7.0);
        assert_eq!(quote_at(&agg, 1).unwrap().last_price(), 7.0);
    }

    #[tokio::test]
    async fn first_cycle_failure_renders_absent() {
        let a = Scripted::new("a", vec![Err(TbError::Transport("down".into()))]);
        let reg = registry(&[("pa", a)]);
        let mut agg = Aggregator::from_specs(&specs(&["pa:A1:x", "pa:A2:z"]), &reg).unwrap();

        agg.poll_cycle().await;

        assert_eq!(agg.frame().line, format!("x ?{}z ?", render::SEPARATOR));
    }

    #[tokio::test]
    async fn run_emits_bounded_frames_and_sleeps_between() {
        let a = Scripted::new(
            "a",
            vec![
                ok(&[("A1", Some(q(1.0, 1.0)))]),
                Err(TbError::Transport("down".into())),
                ok(&[("A1", Some(q(2.0, -1.0)))]),
            ],
        );
        let reg = registry(&[("pa", a)]);
        let agg = Aggregator::from_specs(&specs(&["pa:A1:x"]), &reg).unwrap();
        let clock = Arc::new(FakeClock::default());
        let mut sink = CollectSink::default();

        run(agg, Duration::from_secs(60), clock.clone(), &mut sink, Some(3))
            .await
            .unwrap();

        assert_eq!(sink.frames.len(), 3);
        assert_eq!(*clock.sleeps.lock().unwrap(), [Duration::from_secs(60); 2]);
        let expected_first = render_fragment("x", Some(&q(1.0, 1.0)));
        assert_eq!(sink.frames[0].line, expected_first);
        assert_eq!(sink.frames[1].line, expected_first);
        assert_eq!(sink.frames[2].line, render_fragment("x", Some(&q(2.0, -1.0))));
    }

    #[tokio::test]
    async fn run_stops_on_sink_error() {
        struct Broken;
        impl FrameSink for Broken {
            fn emit(&mut self, _: &Frame, _: DateTime<Local>) -> Result<(), TbError> {
                Err(TbError::Output("broken pipe".into()))
            }
        }

        let a = Scripted::new("a", vec![ok(&[("A1", None)])]);
        let reg = registry(&[("pa", a)]);
        let agg = Aggregator::from_specs(&specs(&["pa:A1:x"]), &reg).unwrap();

        let err = run(agg, Duration::from_secs(1), Arc::new(FakeClock::default()), &mut Broken, None)
            .await
            .unwrap_err();
        assert_eq!(err, TbError::Output("broken pipe".into()));
    }
}
