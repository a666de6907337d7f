//! Subprocess execution with line-buffered output capture.
//!
//! Each captured stream gets one dedicated worker thread that drains it
//! line by line into an owned buffer. There is no locking: the buffer is
//! appended to only by the worker and read only after [`StreamCapture::close`]
//! has joined that worker, so the join is the happens-before edge.

use colored::*;
use std::io::{BufRead, BufReader, Read};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};

/// Per-line callback, invoked synchronously on the capture worker.
pub type LineCallback = Box<dyn FnMut(&str) + Send>;

/// How a child standard stream is wired.
pub enum OutputMode {
    /// Drain into a buffer, echoing each line to stdout.
    Capture,
    /// Drain into a buffer, handing each line to the callback instead.
    CaptureWith(LineCallback),
    /// Leave the stream attached to the parent.
    Inherit,
}

/// Options merged with the defaults by [`exec_command`].
pub struct ExecOptions {
    pub stdout: OutputMode,
    pub stderr: OutputMode,
    /// Replacement `PATH` for the child, used to put toolchain package
    /// binaries in front.
    pub path: Option<std::ffi::OsString>,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            stdout: OutputMode::Capture,
            stderr: OutputMode::Capture,
            path: None,
        }
    }
}

/// Result of one process invocation. `returncode` is present whenever
/// the child spawned; `out`/`err` only for streams that were captured.
#[derive(Debug, Default)]
pub struct ExecResult {
    pub out: Option<String>,
    pub err: Option<String>,
    pub returncode: Option<i32>,
}

/// One worker draining a line-oriented stream into an owned buffer.
///
/// End-of-input is signalled by stream EOF (the child exiting closes the
/// pipe's write end). `close` consumes the capture, so the
/// signal-then-join shutdown handshake happens exactly once.
pub struct StreamCapture {
    worker: JoinHandle<Vec<String>>,
}

impl StreamCapture {
    /// Start the worker. Lines are buffered in arrival order with their
    /// end-of-line markers stripped. The stream is read as raw bytes:
    /// invalid UTF-8 becomes replacement characters, it never cuts the
    /// capture short.
    pub fn spawn<R>(stream: R, mut callback: Option<LineCallback>) -> Self
    where
        R: Read + Send + 'static,
    {
        let worker = thread::spawn(move || {
            let mut reader = BufReader::new(stream);
            let mut buffer = Vec::new();
            let mut raw = Vec::new();
            loop {
                raw.clear();
                match reader.read_until(b'\n', &mut raw) {
                    Ok(0) => break,
                    Ok(_) => {
                        let line = decode_line(&raw);
                        match callback.as_mut() {
                            Some(callback) => callback(&line),
                            None => println!("{line}"),
                        }
                        buffer.push(line);
                    }
                    Err(e) => {
                        eprintln!("{} Output capture stopped: {}", "!".yellow(), e);
                        break;
                    }
                }
            }
            buffer
        });
        Self { worker }
    }

    /// Wait for the worker to observe EOF and return everything it
    /// buffered. Only after this returns is the buffer complete.
    pub fn close(self) -> Vec<String> {
        match self.worker.join() {
            Ok(buffer) => buffer,
            Err(_) => {
                eprintln!(
                    "{} Output capture worker panicked; captured output was lost",
                    "!".yellow()
                );
                Vec::new()
            }
        }
    }
}

/// Launch an external process and wait for it to exit.
///
/// Captured streams are wired through [`StreamCapture`] workers and are
/// always closed exactly once, whether or not the wait succeeds. On
/// Windows the command runs through the shell (`cmd /C`). A spawn or
/// wait failure is reported and terminates the whole process with exit
/// code 1; there is no recovery path for a broken launch.
pub fn exec_command(argv: &[String], options: ExecOptions) -> ExecResult {
    let Some((program, args)) = argv.split_first() else {
        eprintln!("{}", "Error: empty command".red());
        std::process::exit(1);
    };

    let mut command = if cfg!(windows) {
        let mut shell = Command::new("cmd");
        shell.arg("/C").arg(program).args(args);
        shell
    } else {
        let mut direct = Command::new(program);
        direct.args(args);
        direct
    };

    if let Some(path) = &options.path {
        command.env("PATH", path);
    }
    if !matches!(options.stdout, OutputMode::Inherit) {
        command.stdout(Stdio::piped());
    }
    if !matches!(options.stderr, OutputMode::Inherit) {
        command.stderr(Stdio::piped());
    }

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            eprintln!("{}", e.to_string().red());
            std::process::exit(1);
        }
    };

    let out_capture = wire(child.stdout.take(), options.stdout);
    let err_capture = wire(child.stderr.take(), options.stderr);

    // Workers drain the pipes concurrently, so this wait cannot deadlock
    // on a full pipe. It blocks indefinitely; manual interrupt is the
    // only way out and is handled as process termination.
    let status = child.wait();

    // Close-then-join before looking at any buffer.
    let out_lines = out_capture.map(StreamCapture::close);
    let err_lines = err_capture.map(StreamCapture::close);

    let status = match status {
        Ok(status) => status,
        Err(e) => {
            eprintln!("{}", e.to_string().red());
            std::process::exit(1);
        }
    };

    ExecResult {
        out: out_lines.map(join_lines),
        err: err_lines.map(join_lines),
        returncode: Some(status.code().unwrap_or(1)),
    }
}

fn wire<R>(stream: Option<R>, mode: OutputMode) -> Option<StreamCapture>
where
    R: Read + Send + 'static,
{
    match mode {
        OutputMode::Inherit => None,
        OutputMode::Capture => stream.map(|s| StreamCapture::spawn(s, None)),
        OutputMode::CaptureWith(callback) => stream.map(|s| StreamCapture::spawn(s, Some(callback))),
    }
}

fn join_lines(lines: Vec<String>) -> String {
    lines.join("\n").trim_end().to_string()
}

/// Decode one raw line, stripping a trailing `\n` or `\r\n`.
fn decode_line(raw: &[u8]) -> String {
    let mut line = String::from_utf8_lossy(raw).into_owned();
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::mpsc;

    #[test]
    fn buffers_lines_in_arrival_order() {
        let capture = StreamCapture::spawn(Cursor::new("first\nsecond\nthird\n"), None);
        assert_eq!(capture.close(), vec!["first", "second", "third"]);
    }

    #[test]
    fn strips_end_of_line_markers() {
        let capture = StreamCapture::spawn(Cursor::new("a\r\nb\nlast without newline"), None);
        assert_eq!(capture.close(), vec!["a", "b", "last without newline"]);
    }

    #[test]
    fn close_returns_only_after_full_drain() {
        // Large enough to outlive any internal pipe buffering. Every line
        // written before EOF must be visible right after close().
        let input: String = (0..10_000).map(|i| format!("line {i}\n")).collect();
        let capture = StreamCapture::spawn(Cursor::new(input), None);
        let buffer = capture.close();
        assert_eq!(buffer.len(), 10_000);
        assert_eq!(buffer[0], "line 0");
        assert_eq!(buffer[9_999], "line 9999");
    }

    #[test]
    fn callback_sees_every_line_before_close_returns() {
        let (tx, rx) = mpsc::channel();
        let callback: LineCallback = Box::new(move |line: &str| {
            tx.send(line.to_string()).unwrap();
        });
        let capture = StreamCapture::spawn(Cursor::new("one\ntwo\n"), Some(callback));
        let buffer = capture.close();
        let seen: Vec<String> = rx.try_iter().collect();
        assert_eq!(seen, buffer);
        assert_eq!(buffer, vec!["one", "two"]);
    }

    #[test]
    fn invalid_utf8_is_replaced_not_truncated() {
        // Lines after a non-UTF-8 sequence must still be captured.
        let capture = StreamCapture::spawn(Cursor::new(b"ok\n\xff\xfe bad\nafter\n".to_vec()), None);
        let buffer = capture.close();
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer[0], "ok");
        assert!(buffer[1].contains('\u{FFFD}'));
        assert_eq!(buffer[2], "after");
    }

    #[test]
    fn panicking_callback_is_reported_not_propagated() {
        let callback: LineCallback = Box::new(|line: &str| {
            if line == "boom" {
                panic!("callback failure");
            }
        });
        let capture = StreamCapture::spawn(Cursor::new("ok\nboom\nnever\n"), Some(callback));
        // The worker died mid-stream; close() must still return instead
        // of propagating the panic, and report the loss.
        assert!(capture.close().is_empty());
    }

    #[test]
    fn empty_stream_yields_empty_buffer() {
        let capture = StreamCapture::spawn(Cursor::new(""), None);
        assert!(capture.close().is_empty());
    }

    #[test]
    fn join_lines_trims_trailing_whitespace() {
        assert_eq!(join_lines(vec!["hello".into(), "".into()]), "hello");
        assert_eq!(join_lines(vec![]), "");
    }
}
