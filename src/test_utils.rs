//! Shared fixtures for unit tests: EPUB archives built in memory.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Zips `entries` in order and returns the archive bytes.
pub fn build_epub(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    let mut zip = ZipWriter::new(&mut buffer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for (name, contents) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(contents).unwrap();
    }

    zip.finish().unwrap();
    buffer.into_inner()
}

pub fn container_xml(root_file: &str) -> Vec<u8> {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="{}" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#,
        root_file
    )
    .into_bytes()
}

pub fn package_opf(title: &str, manifest: &str, spine: &str) -> Vec<u8> {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>{}</dc:title>
    <dc:creator>Jane Doe</dc:creator>
    <dc:language>en</dc:language>
  </metadata>
  <manifest>
{}
  </manifest>
  <spine>
{}
  </spine>
</package>"#,
        title, manifest, spine
    )
    .into_bytes()
}

pub fn chapter(title: &str, body: &str) -> Vec<u8> {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>{title}</title></head>
<body>
<h1>{title}</h1>
{body}
</body>
</html>"#
    )
    .into_bytes()
}

/// Eight bytes of PNG signature are enough for the pipeline, which never
/// decodes images.
pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Two chapters, one stylesheet and one image.
pub fn minimal_book() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("mimetype", b"application/epub+zip".to_vec()),
        ("META-INF/container.xml", container_xml("OEBPS/content.opf")),
        (
            "OEBPS/content.opf",
            package_opf(
                "A Minimal Book",
                r#"    <item id="ch1" href="Text/ch1.xhtml" media-type="application/xhtml+xml"/>
    <item id="ch2" href="Text/ch2.xhtml" media-type="application/xhtml+xml"/>
    <item id="css" href="Styles/book.css" media-type="text/css"/>
    <item id="img" href="Images/cover.png" media-type="image/png"/>"#,
                r#"    <itemref idref="ch1"/>
    <itemref idref="ch2"/>"#,
            ),
        ),
        (
            "OEBPS/Text/ch1.xhtml",
            chapter(
                "Chapter One",
                r#"<p>It begins.</p><img src="../Images/cover.png" alt="cover"/>"#,
            ),
        ),
        (
            "OEBPS/Text/ch2.xhtml",
            chapter("Chapter Two", "<p>It ends.</p>"),
        ),
        ("OEBPS/Styles/book.css", b"h1 { color: navy; }".to_vec()),
        ("OEBPS/Images/cover.png", PNG.to_vec()),
    ]
}
