use crate::cmd::{connect, StatusArgs};
use crate::exit::{client_error, CliError, CliResult, SUCCESS};
use crate::output::{print_status, OutputFormat};
use crate::DeviceArgs;

pub fn run(_args: StatusArgs, device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = connect(device)?;

    let status = client
        .query_status(device.receiver)
        .map_err(|err| client_error("status query failed", err))?
        .ok_or_else(|| CliError::no_reply("status query failed"))?;
    print_status(device.receiver, status, format);

    client
        .close()
        .map_err(|err| client_error("close failed", err))?;
    Ok(SUCCESS)
}
