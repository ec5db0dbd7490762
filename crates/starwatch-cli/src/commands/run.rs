use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;

use starwatch_core::{LogNotifier, NotifyError, Notifier, Scheduler, SchedulerSettings};

use super::{CliResult, Context};

/// Prints each notification to stdout.
struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        use std::io::Write;
        let mut out = std::io::stdout().lock();
        writeln!(out, "[{title}]")?;
        writeln!(out, "{body}")?;
        writeln!(out)?;
        out.flush()?;
        Ok(())
    }
}

pub fn run(catalog: Option<&Path>) -> CliResult {
    let ctx = Context::load(catalog)?;
    let prefs = ctx.preferences()?;
    // Detached runs report through the log instead of stdout.
    let notifier: Arc<dyn Notifier> = if std::io::stdout().is_terminal() {
        Arc::new(StdoutNotifier)
    } else {
        Arc::new(LogNotifier)
    };
    let scheduler = Scheduler::new(
        ctx.catalog.clone(),
        prefs,
        Arc::new(ctx.clock()),
        notifier,
        SchedulerSettings::from_config(&ctx.config),
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(scheduler.run(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    }));
    Ok(())
}
