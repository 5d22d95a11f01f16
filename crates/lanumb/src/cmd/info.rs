use lanumb_client::InfoSelector;

use crate::cmd::{connect, InfoArgs};
use crate::exit::{client_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_device_info, OutputFormat};
use crate::DeviceArgs;

pub fn run(args: InfoArgs, device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let selector = parse_selector(&args.selector)?;
    let mut client = connect(device)?;

    let info = client
        .query_device_info(selector, device.receiver)
        .map_err(|err| client_error("info query failed", err))?
        .ok_or_else(|| CliError::no_reply("info query failed"))?;
    print_device_info(device.receiver, selector.code(), &info, format);

    client
        .close()
        .map_err(|err| client_error("close failed", err))?;
    Ok(SUCCESS)
}

fn parse_selector(input: &str) -> CliResult<InfoSelector> {
    let input = input.trim();
    let selector = match input.to_ascii_lowercase().as_str() {
        "identification" | "id" => InfoSelector::Identification,
        "description" => InfoSelector::Description,
        "versions" => InfoSelector::Versions,
        "channels" => InfoSelector::ChannelCount,
        _ => {
            let code = match input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
                Some(hex) => u8::from_str_radix(hex, 16),
                None => input.parse(),
            };
            let code = code.map_err(|_| {
                CliError::new(USAGE, format!("invalid info selector: {input}"))
            })?;
            InfoSelector::Raw(code)
        }
    };
    Ok(selector)
}
