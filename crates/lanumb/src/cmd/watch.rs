use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use lanumb_client::{ClientError, Reading, Value};
use tracing::{info, warn};

use crate::cmd::{connect, parse_duration, validate_channels, WatchArgs};
use crate::exit::{client_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_readings, OutputFormat};
use crate::DeviceArgs;

const SLEEP_SLICE: Duration = Duration::from_millis(50);

pub fn run(args: WatchArgs, device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    validate_channels(&args.channels)?;
    let interval = parse_duration(&args.interval)?;
    let mut client = connect(device)?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut last: Option<Vec<Option<Value>>> = None;
    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let started = Instant::now();

        match client.query_channels_chunked(&args.channels, device.receiver) {
            Ok(Some(readings)) => {
                let values = values_of(&readings);
                if last.as_ref() != Some(&values) {
                    print_readings(&readings, format);
                    last = Some(values);
                    printed = printed.saturating_add(1);

                    if let Some(count) = args.count {
                        if printed >= count {
                            break;
                        }
                    }
                }
            }
            Ok(None) => warn!("no reply, retrying next interval"),
            // A damaged reply costs one poll, a broken connection ends the watch.
            Err(ClientError::Frame(err)) => warn!(error = %err, "discarding reply"),
            Err(err) => return Err(client_error("watch failed", err)),
        }

        sleep_while_running(&running, interval.saturating_sub(started.elapsed()));
    }

    info!(printed, "watch finished");
    client
        .close()
        .map_err(|err| client_error("close failed", err))?;
    Ok(SUCCESS)
}

fn values_of(readings: &[Reading]) -> Vec<Option<Value>> {
    readings.iter().map(|r| r.value).collect()
}

fn sleep_while_running(running: &AtomicBool, total: Duration) {
    let deadline = Instant::now() + total;
    while running.load(Ordering::SeqCst) {
        let left = deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            return;
        }
        thread::sleep(left.min(SLEEP_SLICE));
    }
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
