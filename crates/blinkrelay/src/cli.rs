//! Command-line mode selection.
//!
//! Arguments are inspected rather than strictly parsed: anything that is not
//! `--setup` or `--once` runs the daemon.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// First-time authentication, optionally completing 2FA with a pin
    Setup { pin: Option<String> },
    /// One poll cycle, then exit
    Once,
    /// Poll forever
    Daemon,
}

impl Mode {
    /// Select a mode from the arguments after the program name
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();

        if args.iter().any(|a| a == "--setup") {
            let pin = args
                .iter()
                .position(|a| a == "--pin")
                .and_then(|i| args.get(i + 1))
                .filter(|p| !p.starts_with("--"))
                .cloned();
            Mode::Setup { pin }
        } else if args.iter().any(|a| a == "--once") {
            Mode::Once
        } else {
            Mode::Daemon
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_daemon() {
        assert_eq!(Mode::from_args(Vec::<String>::new()), Mode::Daemon);
        assert_eq!(Mode::from_args(["--verbose"]), Mode::Daemon);
        assert_eq!(Mode::from_args(["setup"]), Mode::Daemon);
    }

    #[test]
    fn test_setup() {
        assert_eq!(Mode::from_args(["--setup"]), Mode::Setup { pin: None });
        assert_eq!(
            Mode::from_args(["--setup", "--pin", "123456"]),
            Mode::Setup { pin: Some("123456".to_string()) }
        );
        assert_eq!(
            Mode::from_args(["--pin", "123456", "--setup"]),
            Mode::Setup { pin: Some("123456".to_string()) }
        );
    }

    #[test]
    fn test_pin_without_value_is_ignored() {
        assert_eq!(Mode::from_args(["--setup", "--pin"]), Mode::Setup { pin: None });
        assert_eq!(Mode::from_args(["--setup", "--pin", "--once"]), Mode::Setup { pin: None });
    }

    #[test]
    fn test_once() {
        assert_eq!(Mode::from_args(["--once"]), Mode::Once);
        // setup takes precedence
        assert_eq!(Mode::from_args(["--once", "--setup"]), Mode::Setup { pin: None });
    }
}
