pub mod capture;
pub mod pump;

use argh::FromArgs;
#[derive(Debug, FromArgs, Clone)]
/// Capture lock cycles from an SPLL debug proxy, reading the socket on a
/// background thread, and print them as tab-separated values
pub struct CliArgs {
    /// print version information
    #[argh(switch, short = 'v')]
    pub version: bool,
    /// capture declaration (JSON); defaults apply to missing fields
    #[argh(option, short = 'c')]
    pub config: Option<String>,
    /// proxy address, overriding the capture declaration
    #[argh(option)]
    pub addr: Option<String>,
    /// number of events, overriding the capture declaration
    #[argh(option, short = 'n')]
    pub count: Option<usize>,
    /// batches the reader thread may run ahead of the decoder
    #[argh(option, default = "4")]
    pub depth: usize,
    /// write a header row before the events
    #[argh(switch)]
    pub header: bool,
}
