//! The JSON outputter.

use super::{abs::Outputter, err};
use crate::model;
use std::io::Write;

/// An outputter that dumps reports as JSON.
pub struct Json<W: Write> {
    /// The writer.
    writer: W,
}

impl<W: Write> Outputter for Json<W> {
    fn output(mut self: Box<Self>, report: model::Report) -> err::Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, &report)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> Json<W> {
    /// Constructs a new JSON writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{report, Identity, Location, Report, Verdict};

    #[test]
    /// JSON output carries the tally and each test's verdict.
    fn test_json_output() {
        let mut r = Report::default();
        let mut t = report::Test::new(Identity::new("emptyTest", Location::new("sample.t.c", 3)));
        t.verdict = Verdict::Pass;
        r.insert(t);

        let mut buf = vec![];
        Box::new(Json::new(&mut buf)).output(r).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(v["tally"]["passed"], 1);
        assert_eq!(v["tests"][0]["name"], "emptyTest");
        assert_eq!(v["tests"][0]["verdict"], "pass");
    }
}
