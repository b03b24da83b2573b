#![forbid(unsafe_code)]

//! `tracing` output for environments without a terminal.
//!
//! [`LineSinkWriter`] buffers whatever the `fmt` layer writes for one event
//! and hands complete lines to a sink function when flushed or dropped. In the
//! browser the sink forwards to `console.log`.

use std::io;

use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

/// Receives one formatted log line, without the trailing newline.
pub type LineSink = fn(&str);

#[derive(Debug)]
pub struct LineSinkWriter {
    sink: LineSink,
    buf: Vec<u8>,
}

impl LineSinkWriter {
    #[must_use]
    pub fn new(sink: LineSink) -> Self {
        Self {
            sink,
            buf: Vec::with_capacity(128),
        }
    }

    fn emit(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let text = String::from_utf8_lossy(&self.buf);
        for line in text.lines().filter(|l| !l.is_empty()) {
            (self.sink)(line);
        }
        self.buf.clear();
    }
}

impl io::Write for LineSinkWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit();
        Ok(())
    }
}

impl Drop for LineSinkWriter {
    fn drop(&mut self) {
        self.emit();
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LineSinkMakeWriter {
    sink: LineSink,
}

impl LineSinkMakeWriter {
    #[must_use]
    pub const fn new(sink: LineSink) -> Self {
        Self { sink }
    }
}

impl<'a> MakeWriter<'a> for LineSinkMakeWriter {
    type Writer = LineSinkWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LineSinkWriter::new(self.sink)
    }
}

/// Install a global `fmt` subscriber writing to `sink`. Returns `false` if a
/// global subscriber was already set.
pub fn init(sink: LineSink, max_level: Level) -> bool {
    tracing_subscriber::fmt()
        .with_writer(LineSinkMakeWriter::new(sink))
        .with_max_level(max_level)
        .with_target(false)
        .without_time()
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write as _;
    use std::sync::Mutex;

    static LINES: Mutex<Vec<String>> = Mutex::new(Vec::new());

    fn capture(line: &str) {
        LINES.lock().unwrap().push(line.to_owned());
    }

    #[test]
    fn writer_emits_complete_lines_on_drop() {
        LINES.lock().unwrap().clear();
        {
            let mut w = LineSinkMakeWriter::new(capture).make_writer();
            w.write_all(b" WARN font manifest unavailable").unwrap();
            w.write_all(b": HTTP 404\n\nsecond\n").unwrap();
            assert!(LINES.lock().unwrap().is_empty());
        }
        assert_eq!(
            *LINES.lock().unwrap(),
            vec![
                " WARN font manifest unavailable: HTTP 404".to_owned(),
                "second".to_owned()
            ]
        );
    }

    #[test]
    fn flush_drains_buffer_once() {
        static FLUSHED: Mutex<Vec<String>> = Mutex::new(Vec::new());
        fn sink(line: &str) {
            FLUSHED.lock().unwrap().push(line.to_owned());
        }
        let mut w = LineSinkWriter::new(sink);
        w.write_all(b"one\n").unwrap();
        w.flush().unwrap();
        w.flush().unwrap();
        drop(w);
        assert_eq!(*FLUSHED.lock().unwrap(), vec!["one".to_owned()]);
    }
}
