//! line_reader.rs - Presents a byte stream as a lazy sequence of lines.
//!
//! Lines are the unit every streaming redactor works on. The terminator is
//! split off into [`LineEnding`] so patterns never see it, and is written back
//! byte for byte when the stream is drained.

use std::io::{self, BufRead, Read};

/// How a line was terminated in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    /// Final line of a stream that does not end in a newline.
    None,
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            LineEnding::None => b"",
            LineEnding::Lf => b"\n",
            LineEnding::CrLf => b"\r\n",
        }
    }
}

/// One logical line without its terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub content: Vec<u8>,
    pub ending: LineEnding,
}

impl Line {
    pub fn new(content: impl Into<Vec<u8>>, ending: LineEnding) -> Self {
        Self {
            content: content.into(),
            ending,
        }
    }

    /// Appends the line and its original terminator to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.content);
        out.extend_from_slice(self.ending.as_bytes());
    }

    fn from_raw(mut raw: Vec<u8>) -> Self {
        let ending = if raw.ends_with(b"\r\n") {
            raw.truncate(raw.len() - 2);
            LineEnding::CrLf
        } else if raw.ends_with(b"\n") {
            raw.truncate(raw.len() - 1);
            LineEnding::Lf
        } else {
            LineEnding::None
        };
        Self {
            content: raw,
            ending,
        }
    }
}

/// A lazily evaluated stream of lines, the currency passed between redactors.
pub type LineStream<'a> = Box<dyn Iterator<Item = io::Result<Line>> + Send + 'a>;

/// Iterator over the logical lines of a [`BufRead`].
///
/// A line that spans several buffer fills is reassembled before it is
/// yielded. Iteration ends at end of stream or right after the first error.
#[derive(Debug)]
pub struct LineReader<R> {
    reader: R,
    finished: bool,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            finished: false,
        }
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = io::Result<Line>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let mut raw = Vec::new();
        loop {
            match self.reader.read_until(b'\n', &mut raw) {
                Ok(0) if raw.is_empty() => {
                    self.finished = true;
                    return None;
                }
                Ok(_) => return Some(Ok(Line::from_raw(raw))),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl<R: BufRead> std::iter::FusedIterator for LineReader<R> {}

/// Wraps any reader into a boxed [`LineStream`].
pub fn line_stream<'a, R: BufRead + Send + 'a>(reader: R) -> LineStream<'a> {
    Box::new(LineReader::new(reader))
}

/// Concatenates a stream back into bytes, stopping at the first error.
pub fn collect_lines(stream: LineStream<'_>) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    for line in stream {
        line?.write_to(&mut out);
    }
    Ok(out)
}

/// Exposes a [`LineStream`] as a [`Read`], holding at most one line at a time.
pub struct LineStreamReader<'a> {
    stream: LineStream<'a>,
    pending: Vec<u8>,
    offset: usize,
}

impl<'a> LineStreamReader<'a> {
    pub fn new(stream: LineStream<'a>) -> Self {
        Self {
            stream,
            pending: Vec::new(),
            offset: 0,
        }
    }
}

impl Read for LineStreamReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.offset >= self.pending.len() {
            match self.stream.next() {
                None => return Ok(0),
                Some(line) => {
                    let line = line?;
                    self.pending.clear();
                    self.offset = 0;
                    line.write_to(&mut self.pending);
                }
            }
        }
        let available = &self.pending[self.offset..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.offset += n;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor};

    fn lines(input: &[u8]) -> Vec<Line> {
        LineReader::new(Cursor::new(input.to_vec()))
            .collect::<io::Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_splits_on_newlines_and_keeps_endings() {
        let got = lines(b"one\ntwo\r\nthree");
        assert_eq!(
            got,
            vec![
                Line::new("one", LineEnding::Lf),
                Line::new("two", LineEnding::CrLf),
                Line::new("three", LineEnding::None),
            ]
        );
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(lines(b"").is_empty());
    }

    #[test]
    fn test_blank_lines_are_preserved() {
        let got = lines(b"\n\n");
        assert_eq!(got.len(), 2);
        assert!(got.iter().all(|l| l.content.is_empty() && l.ending == LineEnding::Lf));
    }

    #[test]
    fn test_long_line_reassembled_across_buffer_fills() {
        let long = "x".repeat(10_000);
        let input = format!("{}\nshort\n", long);
        let reader = BufReader::with_capacity(16, Cursor::new(input.into_bytes()));
        let got: Vec<Line> = LineReader::new(reader).collect::<io::Result<_>>().unwrap();
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].content.len(), 10_000);
        assert_eq!(got[1].content, b"short");
    }

    struct FailingReader {
        served: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
            }
            self.served = true;
            let data = b"first\nsecond-partial";
            buf[..data.len()].copy_from_slice(data);
            Ok(data.len())
        }
    }

    #[test]
    fn test_stops_after_first_error() {
        let mut reader = LineReader::new(BufReader::new(FailingReader { served: false }));
        assert_eq!(reader.next().unwrap().unwrap().content, b"first");
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_stream_reader_round_trips_bytes() {
        let input = b"a\r\nb\n\nc".to_vec();
        let mut out = Vec::new();
        LineStreamReader::new(line_stream(Cursor::new(input.clone())))
            .read_to_end(&mut out)
            .unwrap();
        assert_eq!(out, input);
    }
}
