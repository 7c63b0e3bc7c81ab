// ABOUTME: Signal names and numbers used in configuration and on the command line.
// ABOUTME: Parses `SIGTERM`, `TERM` or `15` into a signal number.

pub const SIGINT: u32 = 2;
pub const SIGKILL: u32 = 9;
pub const SIGTERM: u32 = 15;

const NAMES: &[(&str, u32)] = &[
    ("HUP", 1),
    ("INT", SIGINT),
    ("QUIT", 3),
    ("ABRT", 6),
    ("KILL", SIGKILL),
    ("USR1", 10),
    ("USR2", 12),
    ("PIPE", 13),
    ("ALRM", 14),
    ("TERM", SIGTERM),
    ("CONT", 18),
    ("STOP", 19),
    ("TSTP", 20),
    ("WINCH", 28),
];

/// Parse a signal given by number or by name, with or without the `SIG` prefix.
pub fn parse_signal(value: &str) -> Option<u32> {
    let value = value.trim();
    if let Ok(number) = value.parse::<u32>() {
        return Some(number);
    }

    let upper = value.to_ascii_uppercase();
    let name = upper.strip_prefix("SIG").unwrap_or(&upper);
    NAMES
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, number)| *number)
}
