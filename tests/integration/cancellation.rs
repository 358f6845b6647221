use std::path::Path;

use inspekt::extension::Extension;
use inspekt::rules::FormattingProvider;
use inspekt::{CancellationToken, Detektion, Finding, Notification, Parallelism, Settings};

use crate::helpers::*;

/// Cancels the run as soon as the first file is done.
struct CancelAfterFirst(CancellationToken);

impl Extension for CancelAfterFirst {
    fn id(&self) -> &str {
        "cancel"
    }

    fn on_file(&self, _path: &Path, _findings: &mut Vec<Finding>, _detektion: &Detektion) -> anyhow::Result<()> {
        self.0.cancel();
        Ok(())
    }
}

#[test]
fn test_cancelled_before_start() {
    let token = CancellationToken::new();
    token.cancel();

    let detektion = analyzer("")
        .with_provider(FormattingProvider)
        .with_settings(
            Settings::default()
                .with_parallelism(Parallelism::threads(4))
                .with_cancellation(token),
        )
        .run_sources(sources(20, 3))
        .unwrap();

    assert!(detektion.was_cancelled());
    assert!(detektion.findings().is_empty());
    assert!(detektion.analyzed_files().is_empty());
    assert_eq!(detektion.notifications(), vec![Notification::Cancelled { completed: 0, skipped: 20 }]);
}

#[test]
fn test_cancelled_while_running() {
    let token = CancellationToken::new();

    let detektion = analyzer("")
        .with_provider(FormattingProvider)
        .with_extension(CancelAfterFirst(token.clone()))
        .with_settings(
            Settings::default()
                .with_parallelism(Parallelism::Sequential)
                .with_cancellation(token),
        )
        .run_sources(sources(10, 3))
        .unwrap();

    // The file that was running when the token fired is complete.
    assert_eq!(detektion.analyzed_files().len(), 1);
    assert!(!detektion.findings().is_empty());
    assert_eq!(
        rendered_notifications(&detektion.notifications()),
        vec!["Run cancelled after 1 file(s), 9 file(s) skipped"]
    );
}

#[test]
fn test_uncancelled_run_has_no_cancellation_notice() {
    let detektion = analyzer("")
        .with_provider(FormattingProvider)
        .run_sources(sources(5, 3))
        .unwrap();
    assert!(!detektion.was_cancelled());
    assert_eq!(detektion.analyzed_files().len(), 5);
}
