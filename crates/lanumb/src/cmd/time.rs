use crate::cmd::{connect, TimeArgs};
use crate::exit::{client_error, CliError, CliResult, SUCCESS};
use crate::output::{print_elapsed_time, OutputFormat};
use crate::DeviceArgs;

pub fn run(_args: TimeArgs, device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = connect(device)?;

    let seconds = client
        .query_elapsed_time(device.receiver)
        .map_err(|err| client_error("time query failed", err))?
        .ok_or_else(|| CliError::no_reply("time query failed"))?;
    print_elapsed_time(device.receiver, seconds, format);

    client
        .close()
        .map_err(|err| client_error("close failed", err))?;
    Ok(SUCCESS)
}
