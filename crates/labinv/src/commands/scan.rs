//! Barcode scanning from a keyboard-wedge scanner.
//!
//! Drives the core scan loop with [`WedgeCamera`]: each scanned line is
//! looked up, matches are printed, and scanning resumes until input ends,
//! Ctrl-C, or `--once` after the first match.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;

use labinv_core::{BarcodeDetector, ChannelNotifier, Lab, Notification, ScanPhase};

use crate::cli::{GlobalOpts, ScanArgs};
use crate::error::CliError;
use crate::output;
use crate::wedge::{WedgeCamera, WedgeDetector};

use super::items;

fn show_notification(notification: &Notification, color: bool) {
    eprintln!("{}", output::format_notification(notification, color));
}

pub async fn handle(lab: &Lab, args: ScanArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let notifier = Arc::new(ChannelNotifier::default());
    let mut notifications = notifier.subscribe();
    let camera = Arc::new(WedgeCamera::stdin());

    let detector: Arc<dyn BarcodeDetector> = Arc::new(WedgeDetector);
    let scan = lab.scan_loop(camera.clone(), Some(detector), notifier);
    let mut session = scan.observe();

    if let Err(e) = scan.start().await {
        while let Ok(n) = notifications.try_recv() {
            show_notification(&n, color);
        }
        return Err(e.into());
    }
    if !global.quiet {
        eprintln!("Scanning. Scan a barcode or type one and press Enter (Ctrl-D to finish).");
    }

    let mut matched = 0usize;
    loop {
        tokio::select! {
            changed = session.changed() => {
                if changed.is_err() {
                    break;
                }
                let phase = session.borrow_and_update().phase.clone();
                match phase {
                    ScanPhase::Matched(item) => {
                        matched += 1;
                        let out = output::render_single(
                            &global.output,
                            item.as_ref(),
                            |i| items::detail(i, Some(lab)),
                            |i| i.id.to_string(),
                        )?;
                        output::print_output(&out, global.quiet);
                        if args.once {
                            break;
                        }
                        scan.dismiss();
                    }
                    // Detector failure released the camera.
                    ScanPhase::Idle => break,
                    ScanPhase::Scanning | ScanPhase::Resolving { .. } => {}
                }
            }
            received = notifications.recv() => match received {
                Ok(n) => show_notification(&n, color),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "notifications dropped");
                }
                Err(RecvError::Closed) => {}
            },
            () = camera.closed() => break,
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    scan.shutdown().await;
    while let Ok(n) = notifications.try_recv() {
        show_notification(&n, color);
    }
    if !global.quiet {
        eprintln!("{matched} item(s) matched");
    }
    Ok(())
}
