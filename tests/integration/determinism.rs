use std::num::NonZeroUsize;

use inspekt::rules::FormattingProvider;
use inspekt::{Detektion, Parallelism, RuleDefinition, RuleSet, Settings};

use crate::helpers::*;

fn exploding() -> RuleSet {
    RuleSet::new("fragile")
        .with_rule(RuleDefinition::inspecting("Explode", |_| Ok(Explode("file_007"))).active_by_default())
        .with_rule(RuleDefinition::inspecting("EveryLine", |_| Ok(EveryLine)).active_by_default())
}

fn run(parallelism: Parallelism) -> Detektion {
    analyzer("")
        .with_provider(FormattingProvider)
        .with_provider(FnProvider { id: "fragile", build: exploding })
        .with_settings(Settings::default().with_parallelism(parallelism).with_auto_correct(true))
        .run_sources(sources(40, 12))
        .unwrap()
}

fn snapshot(detektion: &Detektion) -> (Vec<String>, Vec<String>, Vec<String>) {
    let corrected = detektion
        .corrected_files()
        .iter()
        .map(|tree| format!("{}\n{}", tree.path().display(), tree.render()))
        .collect();
    (
        rendered(&detektion.findings()),
        rendered_notifications(&detektion.notifications()),
        corrected,
    )
}

#[test]
fn test_results_do_not_depend_on_thread_count() {
    let sequential = snapshot(&run(Parallelism::Sequential));
    assert!(!sequential.0.is_empty());
    assert!(!sequential.2.is_empty());

    for threads in [1, 4, 16] {
        let threads = NonZeroUsize::new(threads).unwrap();
        assert_eq!(snapshot(&run(Parallelism::Threads(threads))), sequential, "{threads} thread(s)");
    }
    assert_eq!(snapshot(&run(Parallelism::Auto)), sequential);
}

#[test]
fn test_repeated_runs_are_identical() {
    let first = snapshot(&run(Parallelism::threads(8)));
    for _ in 0..3 {
        assert_eq!(snapshot(&run(Parallelism::threads(8))), first);
    }
}
