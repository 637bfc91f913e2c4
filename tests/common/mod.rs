use quick_xml::events::Event as XmlEvent;
use quick_xml::reader::Reader as XmlReader;

const ENTITIES: [&str; 5] = ["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"];

/// Panics unless `svg` parses as balanced XML whose every `&` starts one of
/// the five predefined entities.
pub fn assert_well_formed(svg: &str) {
    for (idx, _) in svg.match_indices('&') {
        let rest = &svg[idx..];
        assert!(
            ENTITIES.iter().any(|entity| rest.starts_with(entity)),
            "bare ampersand at byte {idx}: {svg}"
        );
    }

    let mut reader = XmlReader::from_str(svg);
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut roots = 0;

    loop {
        match reader.read_event() {
            Ok(XmlEvent::Start(ref e)) => {
                for attr in e.attributes() {
                    attr.unwrap_or_else(|err| panic!("bad attribute: {err}\n{svg}"));
                }
                if stack.is_empty() {
                    roots += 1;
                }
                stack.push(e.name().as_ref().to_vec());
            }
            Ok(XmlEvent::Empty(ref e)) => {
                for attr in e.attributes() {
                    attr.unwrap_or_else(|err| panic!("bad attribute: {err}\n{svg}"));
                }
                assert!(!stack.is_empty(), "element outside the root: {svg}");
            }
            Ok(XmlEvent::End(ref e)) => {
                let open = stack.pop();
                assert_eq!(open.as_deref(), Some(e.name().as_ref()), "mismatched tags: {svg}");
            }
            Ok(XmlEvent::Eof) => break,
            Err(err) => panic!("XML parse error: {err}\n{svg}"),
            _ => {}
        }
    }

    assert!(stack.is_empty(), "unclosed elements {stack:?}");
    assert_eq!(roots, 1, "expected a single root element");
}
