use crate::history::HISTORY_SIZE;
use argh::FromArgs;

#[derive(FromArgs, Debug, Clone, PartialEq, Eq)]
/// Interactive command interpreter with built-in commands, a bounded history
/// and single-pipe execution of external programs.
pub struct Options {
    #[argh(switch)]
    /// print prompts and messages without ANSI colors.
    pub no_color: bool,

    #[argh(option, default = "0")]
    /// seconds past midnight the `time` command assumes at boot.
    pub start_time: i64,

    #[argh(option, default = "HISTORY_SIZE")]
    /// number of input lines kept by the `history` command. Must be positive.
    pub history_size: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            no_color: false,
            start_time: 0,
            history_size: HISTORY_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_fixed_behavior() {
        let options = Options::from_args(&["pipesh"], &[]).unwrap();
        assert_eq!(options, Options::default());
    }

    #[test]
    fn test_parse_all_flags() {
        let options = Options::from_args(
            &["pipesh"],
            &["--no-color", "--start-time", "3600", "--history-size", "3"],
        )
        .unwrap();
        assert!(options.no_color);
        assert_eq!(options.start_time, 3600);
        assert_eq!(options.history_size, 3);
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(Options::from_args(&["pipesh"], &["--bogus"]).is_err());
    }
}
