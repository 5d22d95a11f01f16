use lanumb_client::{Reading, UmbClient};
use lanumb_transport::Transport;

use crate::cmd::{connect, validate_channels, ReadArgs};
use crate::exit::{client_error, CliError, CliResult, SUCCESS};
use crate::output::{print_readings, OutputFormat};
use crate::DeviceArgs;

pub fn run(args: ReadArgs, device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    validate_channels(&args.channels)?;
    let mut client = connect(device)?;

    let readings = read_channels(&mut client, &args.channels, device.receiver, args.single)?;
    print_readings(&readings, format);

    client
        .close()
        .map_err(|err| client_error("close failed", err))?;
    Ok(SUCCESS)
}

/// Query `channels` and fail if the device stays silent.
pub fn read_channels<T: Transport>(
    client: &mut UmbClient<T>,
    channels: &[u16],
    receiver: u8,
    single: bool,
) -> CliResult<Vec<Reading>> {
    if !single {
        return client
            .query_channels_chunked(channels, receiver)
            .map_err(|err| client_error("read failed", err))?
            .ok_or_else(|| CliError::no_reply("read failed"));
    }

    let mut readings = Vec::with_capacity(channels.len());
    for &channel in channels {
        let reading = client
            .query_channel(channel, receiver)
            .map_err(|err| client_error(&format!("read of channel {channel} failed"), err))?
            .ok_or_else(|| CliError::no_reply(&format!("read of channel {channel} failed")))?;
        readings.push(reading);
    }
    Ok(readings)
}
