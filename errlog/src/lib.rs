use anyhow::Error;
use log::error;

/// Log an `anyhow::Error` and each of its causes as `log::error`s,
/// followed by the backtrace when `RUST_BACKTRACE=1`
pub fn print_chain(e: &Error) {
    error!("{}", e);
    for cause in e.chain().skip(1) {
        error!("caused by: {}", cause);
    }
    if backtrace_requested() {
        error!("Backtrace:\n{}", e.backtrace());
    }
}

/// The causes of `e`, outermost first, joined into a single line
pub fn one_line(e: &Error) -> String {
    e.chain()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(": ")
}

fn backtrace_requested() -> bool {
    match ::std::env::var("RUST_BACKTRACE").as_ref().map(|s| s.as_str()) {
        Ok("1") => true,
        _ => false,
    }
}
