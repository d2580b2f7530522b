//! User-facing console lines with a colored prefix.
//! Colors are enabled only when the stream is a TTY.

use owo_colors::OwoColorize;

use crate::organize::PassSummary;

pub(crate) fn is_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

fn is_err_tty() -> bool {
    atty::is(atty::Stream::Stderr)
}

pub fn print_info(msg: &str) {
    if is_tty() {
        println!("{} {msg}", "info:".cyan().bold());
    } else {
        println!("info: {msg}");
    }
}

pub fn print_warn(msg: &str) {
    if is_err_tty() {
        eprintln!("{} {msg}", "warn:".yellow().bold());
    } else {
        eprintln!("warn: {msg}");
    }
}

pub fn print_error(msg: &str) {
    if is_err_tty() {
        eprintln!("{} {msg}", "error:".red().bold());
    } else {
        eprintln!("error: {msg}");
    }
}

pub fn print_success(msg: &str) {
    if is_tty() {
        println!("{} {msg}", "ok:".green().bold());
    } else {
        println!("ok: {msg}");
    }
}

/// Print the one-line pass summary, then one line per failed file.
pub fn print_summary(label: &str, summary: &PassSummary) {
    let line = format!("{label}: {summary}");
    if summary.is_clean() {
        print_success(&line);
    } else {
        print_warn(&line);
        for (path, err) in &summary.failed {
            print_error(&format!("{}: {err}", path.display()));
        }
    }
}
