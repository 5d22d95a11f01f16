use lanumb_client::StatusCode;

use crate::cmd::DescribeArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_description, OutputFormat};

pub fn run(args: DescribeArgs, format: OutputFormat) -> CliResult<i32> {
    print_description(StatusCode::from(args.code), format);
    Ok(SUCCESS)
}
