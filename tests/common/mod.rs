use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const CONTAINER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OPS/package.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

pub const PACKAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="id">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:identifier id="id">urn:uuid:0f3c3b8e-0000-4000-8000-000000000000</dc:identifier>
    <dc:title>The Lighthouse</dc:title>
    <dc:creator>V. Keeper</dc:creator>
    <dc:language>en-GB</dc:language>
  </metadata>
  <manifest>
    <item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>
    <item id="intro" href="xhtml/intro.xhtml" media-type="application/xhtml+xml"/>
    <item id="part1" href="xhtml/part%201.xhtml" media-type="application/xhtml+xml"/>
    <item id="style" href="css/style.css" media-type="text/css"/>
    <item id="light" href="img/light.png" media-type="image/png"/>
    <item id="map" href="img/map.svg" media-type="image/svg+xml"/>
  </manifest>
  <spine>
    <itemref idref="intro"/>
    <itemref idref="part1"/>
    <itemref idref="intro"/>
  </spine>
</package>"#;

pub const INTRO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>Intro</title><link rel="stylesheet" href="../css/style.css"/></head>
<body>
<h1>Introduction</h1>
<p>The light turns.</p>
<img src="../img/light.png" alt="a light"/>
</body>
</html>"#;

pub const PART1: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>Part 1</title></head>
<body>
<h1>Part One</h1>
<p>Waves.</p>
<img src="/OPS/img/map.svg" alt="map"/>
<img src="../img/lost.jpg" alt="gone"/>
</body>
</html>"#;

pub fn lighthouse_epub() -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    let mut zip = ZipWriter::new(&mut buffer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    let entries: [(&str, &[u8]); 8] = [
        ("mimetype", b"application/epub+zip"),
        ("META-INF/container.xml", CONTAINER.as_bytes()),
        ("OPS/package.opf", PACKAGE.as_bytes()),
        ("OPS/nav.xhtml", b"<html><body><nav>toc</nav></body></html>"),
        ("OPS/xhtml/intro.xhtml", INTRO.as_bytes()),
        ("OPS/xhtml/part 1.xhtml", PART1.as_bytes()),
        ("OPS/css/style.css", b"h1 { font-variant: small-caps; }"),
        ("OPS/img/light.png", b"\x89PNG\r\n\x1a\n"),
    ];
    for (name, contents) in entries {
        zip.start_file(name, options).unwrap();
        zip.write_all(contents).unwrap();
    }
    zip.start_file("OPS/img/map.svg", options).unwrap();
    zip.write_all(br#"<svg xmlns="http://www.w3.org/2000/svg"/>"#).unwrap();

    zip.finish().unwrap();
    buffer.into_inner()
}

pub fn write_epub(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}
