//! Conversion orchestration: documents in, one CSV out.
//!
//! The orchestrator compiles the mapping, writes the header once, then
//! streams each input document's rows through the projector into the
//! writer, preserving document order and row order. The first error from
//! any component stops the run; bytes already flushed stay in the sink.

use std::io::{BufReader, Write};

use crate::error::{ConvertError, ConvertResult};
use crate::mapping::Mapping;
use crate::source;
use crate::writer::RecordWriter;
use crate::xml::stream::RowStream;

use super::project_record;

/// Counters reported after a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertSummary {
    /// Documents processed.
    pub documents: usize,
    /// Data rows written (header excluded).
    pub rows: usize,
}

/// Convert every document in `sources` (paths or URLs, in order) into
/// one CSV written to `sink`.
pub fn convert<W: Write>(
    sources: &[String],
    mapping: &Mapping,
    sink: W,
    with_bom: bool,
) -> ConvertResult<ConvertSummary> {
    // Compile everything up front: a malformed expression aborts before
    // any byte is written.
    let compiled = mapping.compile()?;

    let mut writer = RecordWriter::new(sink, with_bom)?;
    writer.write_header(mapping.headers())?;

    let mut summary = ConvertSummary {
        documents: 0,
        rows: 0,
    };

    for input in sources {
        let reader = source::open(input)?;
        let stream = RowStream::new(BufReader::new(reader), compiled.rows.clone(), input.as_str());
        for row in stream {
            let row = row?;
            let record = project_record(&row, &compiled.columns).map_err(|source| {
                ConvertError::Projection {
                    input: input.clone(),
                    source,
                }
            })?;
            writer.write_record(&record)?;
            summary.rows += 1;
        }
        summary.documents += 1;
    }

    writer.flush()?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::Column;
    use std::fs;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>W3Schools Home Page</title>
    <link>https://www.w3schools.com</link>
    <item>
      <title>RSS Tutorial</title>
      <link>https://www.w3schools.com/xml/xml_rss.asp</link>
    </item>
    <item>
      <title>XML Tutorial</title>
      <link>https://www.w3schools.com/xml</link>
    </item>
  </channel>
</rss>"#;

    fn write_fixture(dir: &tempfile::TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn rss_mapping() -> Mapping {
        Mapping::new(
            "//item",
            vec![
                Column::new("title", "/title"),
                Column::new("link", "/link"),
            ],
        )
    }

    #[test]
    fn test_convert_rss_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "rss.xml", RSS);

        let mut out = Vec::new();
        let summary = convert(&[path], &rss_mapping(), &mut out, false).unwrap();

        assert_eq!(summary, ConvertSummary { documents: 1, rows: 2 });
        let expected = "title,link\r\n\
            RSS Tutorial,https://www.w3schools.com/xml/xml_rss.asp\r\n\
            XML Tutorial,https://www.w3schools.com/xml\r\n";
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn test_convert_quotes_and_booleans() {
        let xml = r#"<root>
            <item id="1"><name>name1</name><value>value1</value></item>
            <item id="2"><name>name2</name><value>value2,xx</value></item>
            <item id="3"><name>name3</name></item>
        </root>"#;
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "items.xml", xml);

        let mapping = Mapping::new(
            "//item",
            vec![
                Column::new("id", "/@id"),
                Column::new("name", "/name"),
                Column::new("value", "/value"),
                Column::new("has_value", "boolean(/value)").evaluated(),
            ],
        );

        let mut out = Vec::new();
        convert(&[path], &mapping, &mut out, false).unwrap();

        let expected = "id,name,value,has_value\r\n\
            1,name1,value1,true\r\n\
            2,name2,\"value2,xx\",true\r\n\
            3,name3,,false\r\n";
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn test_convert_keeps_text_padding_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "padded.xml", "<r><item><t>  padded  </t></item></r>");

        let mapping = Mapping::new("//item", vec![Column::new("t", "/t")]);
        let mut out = Vec::new();
        convert(&[path], &mapping, &mut out, false).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "t\r\n  padded  \r\n");
    }

    #[test]
    fn test_convert_without_columns_writes_empty_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            &dir,
            "items.xml",
            "<r><item><t>a</t></item><item><t>b</t></item></r>",
        );

        let mapping = Mapping::new("//item", vec![]);
        let mut out = Vec::new();
        let summary = convert(&[path], &mapping, &mut out, false).unwrap();

        assert_eq!(summary, ConvertSummary { documents: 1, rows: 2 });
        // A record with no fields is written as a single quoted empty field.
        assert_eq!(String::from_utf8(out).unwrap(), "\"\"\r\n\"\"\r\n\"\"\r\n");
    }

    #[test]
    fn test_convert_multiple_documents_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_fixture(&dir, "a.xml", "<r><item><t>a1</t></item></r>");
        let b = write_fixture(&dir, "b.xml", "<r><item><t>b1</t></item><item><t>b2</t></item></r>");

        let mapping = Mapping::new("//item", vec![Column::new("t", "/t")]);
        let mut out = Vec::new();
        let summary = convert(&[a, b], &mapping, &mut out, false).unwrap();

        assert_eq!(summary, ConvertSummary { documents: 2, rows: 3 });
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "t\r\na1\r\nb1\r\nb2\r\n"
        );
    }

    #[test]
    fn test_convert_with_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "a.xml", "<r><item><t>x</t></item></r>");

        let mapping = Mapping::new("//item", vec![Column::new("t", "/t")]);
        let mut out = Vec::new();
        convert(&[path], &mapping, &mut out, true).unwrap();

        assert_eq!(out, b"\xEF\xBB\xBFt\r\nx\r\n");
    }

    #[test]
    fn test_invalid_rows_path_aborts_before_output() {
        let mapping = Mapping::new("item[", vec![Column::new("t", "/t")]);
        let mut out = Vec::new();
        let err = convert(&[], &mapping, &mut out, false).unwrap_err();

        assert!(matches!(err, ConvertError::Expression(_)));
        assert!(err.to_string().contains("item["));
        assert!(out.is_empty(), "nothing may be written on a compile error");
    }

    #[test]
    fn test_malformed_document_aborts_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "bad.xml", "<r><item><t>x</t></item><item>");

        let mapping = Mapping::new("//item", vec![Column::new("t", "/t")]);
        let mut out = Vec::new();
        let err = convert(&[path], &mapping, &mut out, false).unwrap_err();

        assert!(matches!(err, ConvertError::Document(_)));
        assert!(err.to_string().contains("bad.xml"));
    }

    #[test]
    fn test_missing_source_aborts_run() {
        let mapping = rss_mapping();
        let mut out = Vec::new();
        let err = convert(
            &["/nonexistent/input.xml".to_string()],
            &mapping,
            &mut out,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::Source(_)));
    }

    #[test]
    fn test_projection_error_names_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "doc.xml", "<r><item><t>x</t></item></r>");

        // Node-set mode over a scalar-only expression fails per row.
        let mapping = Mapping::new("//item", vec![Column::new("n", "count(/t)")]);
        let mut out = Vec::new();
        let err = convert(&[path], &mapping, &mut out, false).unwrap_err();

        let msg = err.to_string();
        assert!(matches!(err, ConvertError::Projection { .. }));
        assert!(msg.contains("doc.xml"));
        assert!(msg.contains("count(/t)"));
    }
}
