//! Suggester tests: fault containment, serialization, empty input and
//! cache lifetime across requests.

mod common;

use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use common::{MapBuildContext, ProbeFactory, ScriptEngine};
use gosuggest::{BuildContext, CandidateKind, StrategyKind, SuggestOptions, Suggester};

fn setup(options: SuggestOptions) -> (Suggester, Arc<common::Probe>, Arc<ScriptEngine>) {
    let factory = ProbeFactory::new(true);
    let probe = Arc::clone(&factory.probe);
    let engine = Arc::new(ScriptEngine::default());
    let suggester = Suggester::new(options, Arc::new(factory), engine.clone());
    (suggester, probe, engine)
}

fn build() -> Arc<dyn BuildContext> {
    Arc::new(
        MapBuildContext::new()
            .root("fmt")
            .root("strings")
            .external("github.com/acme/widgets"),
    )
}

const MAIN: &str = "/work/app/main.go";

#[test]
fn candidates_come_from_imported_packages() {
    let (suggester, _, _) = setup(SuggestOptions {
        propose_builtins: true,
        ..SuggestOptions::default()
    });

    let out = suggester.suggest(build(), Path::new(MAIN), b"import fmt\n", 10);

    let names: Vec<_> = out.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["fmtFunc", "fmtVar", "len"]);
    assert_eq!(out[2].kind, CandidateKind::Builtin);
}

#[test]
fn builtins_are_left_out_unless_requested() {
    let (suggester, _, _) = setup(SuggestOptions::default());

    let out = suggester.suggest(build(), Path::new(MAIN), b"import strings\n", 0);
    assert!(out.iter().all(|c| c.kind != CandidateKind::Builtin));
}

#[test]
fn unresolvable_import_still_yields_partial_results() {
    let (suggester, _, _) = setup(SuggestOptions::default());

    let src = b"import example.com/missing\nimport fmt\n";
    let out = suggester.suggest(build(), Path::new(MAIN), src, 0);
    assert_eq!(out.len(), 2);
}

// ============================================================================
// Caching across requests
// ============================================================================

#[test]
fn root_packages_survive_across_requests() {
    let (suggester, probe, _) = setup(SuggestOptions::default());
    let src = b"import fmt\nimport github.com/acme/widgets\n";

    suggester.suggest(build(), Path::new(MAIN), src, 0);
    suggester.suggest(build(), Path::new(MAIN), src, 0);

    assert_eq!(probe.calls(StrategyKind::ExportData, true), 1);
    assert_eq!(probe.calls(StrategyKind::ExportData, false), 2);
    assert_eq!(suggester.cached_packages(), 1);
}

#[test]
fn each_request_gets_a_fresh_strategy_but_shares_the_root_one() {
    let (suggester, probe, _) = setup(SuggestOptions::default());

    for _ in 0..3 {
        suggester.suggest(build(), Path::new(MAIN), b"import fmt\n", 0);
    }

    let created = probe.created();
    assert_eq!(created.iter().filter(|(_, shared)| *shared).count(), 1);
    assert_eq!(created.iter().filter(|(_, shared)| !*shared).count(), 3);
}

#[test]
fn reconfigure_drops_cache_and_switches_strategy() {
    let (suggester, probe, _) = setup(SuggestOptions::default());
    suggester.suggest(build(), Path::new(MAIN), b"import fmt\n", 0);
    assert_eq!(suggester.cached_packages(), 1);
    assert_eq!(suggester.strategy_kind(), StrategyKind::ExportData);

    suggester.reconfigure(SuggestOptions {
        source: true,
        ..SuggestOptions::default()
    });
    assert_eq!(suggester.cached_packages(), 0);
    assert_eq!(suggester.strategy_kind(), StrategyKind::Source);
    assert!(suggester.options().source);

    suggester.suggest(build(), Path::new(MAIN), b"import fmt\n", 0);
    assert_eq!(probe.calls(StrategyKind::Source, true), 1);
}

#[test]
fn reset_keeps_options() {
    let options = SuggestOptions {
        propose_builtins: true,
        debug: true,
        source: false,
    };
    let (suggester, _, _) = setup(options);
    suggester.suggest(build(), Path::new(MAIN), b"import fmt\n", 0);

    suggester.reset();

    assert_eq!(suggester.options(), options);
    assert_eq!(suggester.cached_packages(), 0);
}

#[test]
fn reset_racing_reconfigure_keeps_the_new_options() {
    for _ in 0..50 {
        let (suggester, _, _) = setup(SuggestOptions::default());
        let suggester = Arc::new(suggester);
        let start = Arc::new(Barrier::new(2));

        let s = Arc::clone(&suggester);
        let b = Arc::clone(&start);
        let resetter = thread::spawn(move || {
            b.wait();
            s.reset();
        });
        start.wait();
        suggester.reconfigure(SuggestOptions {
            source: true,
            ..SuggestOptions::default()
        });
        resetter.join().unwrap();

        // Whichever ran first, a reset only ever reapplies the live options
        assert!(suggester.options().source);
        assert_eq!(suggester.strategy_kind(), StrategyKind::Source);
    }
}

// ============================================================================
// Empty input
// ============================================================================

#[test]
fn empty_source_short_circuits() {
    let (suggester, probe, engine) = setup(SuggestOptions::default());

    let out = suggester.suggest(build(), Path::new(MAIN), b"", 42);

    assert!(out.is_empty());
    assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    assert_eq!(probe.total_calls(), 0);
    // Only the shared root strategy exists
    assert_eq!(probe.created().len(), 1);
}

// ============================================================================
// Fault containment
// ============================================================================

#[test]
fn engine_panic_yields_empty_result_and_releases_lock() {
    let (suggester, _, engine) = setup(SuggestOptions::default());

    let out = suggester.suggest(build(), Path::new(MAIN), b"import fmt\npanic\n", 0);
    assert!(out.is_empty());

    let out = suggester.suggest(build(), Path::new(MAIN), b"import strings\n", 0);
    assert_eq!(out.len(), 2);
    assert_eq!(engine.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn engine_error_yields_empty_result() {
    let (suggester, _, _) = setup(SuggestOptions::default());

    let out = suggester.suggest(build(), Path::new(MAIN), b"import fmt\nfail\n", 0);
    assert!(out.is_empty());

    // Packages resolved before the failure stay cached
    assert_eq!(suggester.cached_packages(), 1);
}

#[test]
fn panic_from_another_thread_does_not_poison_the_suggester() {
    let (suggester, _, _) = setup(SuggestOptions::default());
    let suggester = Arc::new(suggester);

    let s = Arc::clone(&suggester);
    let handle = thread::spawn(move || s.suggest(build(), Path::new(MAIN), b"panic\n", 0));
    assert!(handle.join().unwrap().is_empty());

    let out = suggester.suggest(build(), Path::new(MAIN), b"import fmt\n", 0);
    assert_eq!(out.len(), 2);
}

// ============================================================================
// Debug logging
// ============================================================================

#[test]
fn debug_logger_is_passed_only_in_debug_mode() {
    let (quiet, _, engine) = setup(SuggestOptions::default());
    quiet.suggest(build(), Path::new(MAIN), b"import fmt\n", 0);
    assert!(!engine.saw_debug_logger.load(Ordering::SeqCst));

    let (loud, _, engine) = setup(SuggestOptions {
        debug: true,
        ..SuggestOptions::default()
    });
    loud.suggest(build(), Path::new(MAIN), b"import fmt\n", 0);
    assert!(engine.saw_debug_logger.load(Ordering::SeqCst));
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn concurrent_requests_never_overlap() {
    let (suggester, probe, _) = setup(SuggestOptions::default());
    *probe.hold.lock() = Some(Duration::from_millis(5));
    let suggester = Arc::new(suggester);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let s = Arc::clone(&suggester);
            thread::spawn(move || {
                s.suggest(
                    build(),
                    Path::new(MAIN),
                    b"import github.com/acme/widgets\nimport fmt\n",
                    0,
                )
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().len(), 4);
    }
    assert!(
        !probe.overlap.load(Ordering::SeqCst),
        "two requests ran resolution at the same time"
    );
    assert_eq!(probe.calls(StrategyKind::ExportData, false), 8);
    assert_eq!(probe.calls(StrategyKind::ExportData, true), 1);
}
