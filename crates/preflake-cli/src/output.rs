use std::io::Write;

use anyhow::Context;
use preflake::{Fields, Generator, Identifier, Layout, TimeSource};
use serde::Serialize;

use crate::config::OutputFormat;

/// One identifier with its decoded fields, as written to stdout.
#[derive(Debug, Serialize)]
struct Record {
    id: Identifier,
    #[serde(flatten)]
    fields: Fields,
    /// `time` translated back to milliseconds since the UNIX epoch.
    unix_ms: u64,
}

impl Record {
    fn new(id: Identifier, fields: Fields, epoch_ms: u64) -> Self {
        Self {
            id,
            fields,
            unix_ms: epoch_ms.saturating_add(fields.time),
        }
    }
}

fn write_record<W>(out: &mut W, format: OutputFormat, record: &Record) -> anyhow::Result<()>
where
    W: Write,
{
    match format {
        OutputFormat::Text => writeln!(
            out,
            "{} pre={} time={} node={} step={} unix_ms={}",
            record.id,
            record.fields.pre,
            record.fields.time,
            record.fields.node,
            record.fields.step,
            record.unix_ms
        )?,
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, record)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Writes `count` fresh identifiers carrying `pre`.
///
/// Text output is the bare identifier per line so it pipes cleanly; JSON
/// output carries the decoded fields too.
pub fn generate<T, W>(
    generator: &Generator<T>,
    pre: u64,
    count: usize,
    epoch_ms: u64,
    format: OutputFormat,
    out: &mut W,
) -> anyhow::Result<()>
where
    T: TimeSource<u64>,
    W: Write,
{
    for _ in 0..count {
        let id = generator.generate(pre)?;
        match format {
            OutputFormat::Text => writeln!(out, "{id}")?,
            OutputFormat::Json => {
                let fields = generator.parse(id.as_str())?;
                write_record(out, format, &Record::new(id, fields, epoch_ms))?;
            }
        }
    }
    tracing::debug!(pre, count, "generated identifiers");
    Ok(())
}

/// Decodes each identifier, stopping at the first malformed one.
pub fn parse<W, S>(
    layout: &Layout,
    ids: &[S],
    epoch_ms: u64,
    format: OutputFormat,
    out: &mut W,
) -> anyhow::Result<()>
where
    W: Write,
    S: AsRef<str>,
{
    for text in ids {
        let text = text.as_ref();
        let fields = layout
            .parse(text)
            .with_context(|| format!("invalid identifier `{text}`"))?;
        let id = layout.encode(&fields);
        write_record(out, format, &Record::new(id, fields, epoch_ms))?;
    }
    Ok(())
}
