//! XML decoding for BoardGameGeek XML API v2 payloads.
//!
//! Both the `search` and `thing` endpoints answer with an `<items>` root
//! holding zero or more `<item>` children. Only direct children of `<items>`
//! are considered; nested items (e.g. `<versions>`) are skipped.

use quick_xml::escape::resolve_html5_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tracing::debug;

use super::types::{SearchMatch, ThingDetails};
use super::BggError;

/// Name used when a thing has no name flagged primary.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Subtype used when a thing carries no `type` attribute.
pub const UNKNOWN_SUBTYPE: &str = "unknown";

const ITEMS_DEPTH: usize = 1;
const ITEM_DEPTH: usize = 2;
const FIELD_DEPTH: usize = 3;

/// Longest reference body considered by [`decode_entities`].
const MAX_REFERENCE_LEN: usize = 32;

#[derive(Debug, Default)]
struct RawName {
    name_type: Option<String>,
    value: Option<String>,
}

#[derive(Debug, Default)]
struct RawItem {
    id: Option<String>,
    item_type: Option<String>,
    names: Vec<RawName>,
    year_published: Option<String>,
    thumbnail: Option<String>,
    image: Option<String>,
}

impl RawItem {
    fn primary_name(&self) -> Option<&str> {
        self.names
            .iter()
            .find(|n| n.name_type.as_deref() == Some("primary"))
            .and_then(|n| n.value.as_deref())
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, Copy)]
enum TextField {
    Thumbnail,
    Image,
}

/// Decode HTML entities left in a free-text value.
///
/// BGG double-escapes some characters (`&amp;#039;`), so after the XML layer
/// the value may still contain references such as `&#039;` or `&eacute;`.
/// Each reference is resolved on its own; an `&` that does not start a valid
/// reference is kept as-is.
pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut decoded = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find('&') {
        decoded.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let reference = after
            .find(';')
            .filter(|&end| end > 0 && end <= MAX_REFERENCE_LEN)
            .and_then(|end| resolve_reference(&after[..end]).map(|text| (end, text)));

        match reference {
            Some((end, text)) => {
                decoded.push_str(&text);
                rest = &after[end + 1..];
            }
            None => {
                decoded.push('&');
                rest = after;
            }
        }
    }

    decoded.push_str(rest);
    decoded
}

/// Resolve the body of `&...;`: `#N`, `#xH` or an HTML5 entity name.
fn resolve_reference(name: &str) -> Option<String> {
    let Some(number) = name.strip_prefix('#') else {
        return resolve_html5_entity(name).map(str::to_string);
    };

    let code = match number.strip_prefix(['x', 'X']) {
        Some(hex) if !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
            u32::from_str_radix(hex, 16).ok()?
        }
        None if !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit()) => {
            number.parse::<u32>().ok()?
        }
        _ => return None,
    };

    char::from_u32(code)
        .filter(|c| *c != '\0')
        .map(String::from)
}

/// Parse a `search` response into lightweight matches.
///
/// A missing `<items>` root is treated as "no matches".
pub fn parse_search_response(xml: &str) -> Result<Vec<SearchMatch>, BggError> {
    let Some(items) = read_items(xml)? else {
        debug!("BGG search response has no <items> root, treating as no matches");
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .map(|item| {
            let raw_label = item
                .primary_name()
                .map(str::to_string)
                .or_else(|| item.names.into_iter().find_map(|n| n.value));
            SearchMatch {
                id: item.id.filter(|id| !id.is_empty()),
                raw_label,
                subtype_hint: item.item_type,
            }
        })
        .collect())
}

/// Parse a `thing` response into detailed records, in document order.
///
/// Fails when the payload has no `<items>` root or when any item lacks an id.
pub fn parse_thing_response(xml: &str) -> Result<Vec<ThingDetails>, BggError> {
    let items = read_items(xml)?.ok_or_else(|| {
        BggError::ParseError("thing response has no <items> element".to_string())
    })?;

    items.into_iter().map(thing_from_raw).collect()
}

fn thing_from_raw(item: RawItem) -> Result<ThingDetails, BggError> {
    let name = item
        .primary_name()
        .map(decode_entities)
        .unwrap_or_else(|| UNKNOWN_NAME.to_string());

    let id = item
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| BggError::ParseError(format!("thing '{}' has no id", name)))?;

    let subtype = item
        .item_type
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNKNOWN_SUBTYPE.to_string());

    let year_published = item
        .year_published
        .and_then(|year| year.trim().parse::<i32>().ok());

    Ok(ThingDetails {
        id,
        name,
        subtype,
        year_published,
        thumbnail_url: item.thumbnail.filter(|url| !url.is_empty()),
        image_url: item.image.filter(|url| !url.is_empty()),
    })
}

/// Walk the document and collect direct `<item>` children of `<items>`.
///
/// Returns `None` when the root element is not `<items>`.
fn read_items(xml: &str) -> Result<Option<Vec<RawItem>>, BggError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut depth = 0usize;
    let mut saw_items = false;
    let mut items = Vec::new();
    let mut current: Option<RawItem> = None;
    let mut text_target: Option<TextField> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            BggError::ParseError(format!(
                "invalid XML at position {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(ref e) => {
                depth += 1;
                text_target = open_element(e, depth, &mut saw_items, &mut current)?;
            }
            Event::Empty(ref e) => {
                open_element(e, depth + 1, &mut saw_items, &mut current)?;
                if depth + 1 == ITEM_DEPTH {
                    if let Some(item) = current.take() {
                        items.push(item);
                    }
                }
            }
            Event::End(_) => {
                if depth == ITEM_DEPTH {
                    if let Some(item) = current.take() {
                        items.push(item);
                    }
                }
                text_target = None;
                depth = depth.saturating_sub(1);
            }
            Event::Text(ref e) => {
                if let (Some(field), Some(item)) = (text_target, current.as_mut()) {
                    let text = e
                        .unescape()
                        .map_err(|err| BggError::ParseError(err.to_string()))?;
                    set_text(item, field, text.trim().to_string());
                }
            }
            Event::CData(ref e) => {
                if let (Some(field), Some(item)) = (text_target, current.as_mut()) {
                    let text = String::from_utf8_lossy(e.as_ref()).trim().to_string();
                    set_text(item, field, text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(saw_items.then_some(items))
}

/// Handle an opening (or self-closing) element at `depth`.
///
/// Returns the text field the element's content should be captured into.
fn open_element(
    e: &BytesStart<'_>,
    depth: usize,
    saw_items: &mut bool,
    current: &mut Option<RawItem>,
) -> Result<Option<TextField>, BggError> {
    let tag = e.name();
    let tag = tag.as_ref();

    match depth {
        ITEMS_DEPTH => {
            *saw_items = tag == b"items";
            Ok(None)
        }
        ITEM_DEPTH if *saw_items && tag == b"item" => {
            *current = Some(RawItem {
                id: attribute(e, b"id")?,
                item_type: attribute(e, b"type")?,
                ..Default::default()
            });
            Ok(None)
        }
        FIELD_DEPTH => {
            let Some(item) = current.as_mut() else {
                return Ok(None);
            };
            match tag {
                b"name" => {
                    item.names.push(RawName {
                        name_type: attribute(e, b"type")?,
                        value: attribute(e, b"value")?,
                    });
                    Ok(None)
                }
                b"yearpublished" => {
                    item.year_published = attribute(e, b"value")?;
                    Ok(None)
                }
                b"thumbnail" => Ok(Some(TextField::Thumbnail)),
                b"image" => Ok(Some(TextField::Image)),
                _ => Ok(None),
            }
        }
        _ => Ok(None),
    }
}

fn set_text(item: &mut RawItem, field: TextField, text: String) {
    match field {
        TextField::Thumbnail => item.thumbnail = Some(text),
        TextField::Image => item.image = Some(text),
    }
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, BggError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| BggError::ParseError(format!("invalid attribute: {}", err)))?;
        if attr.key.as_ref() == key {
            let value = attr
                .unescape_value()
                .map_err(|err| BggError::ParseError(err.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATAN_THING: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<items termsofuse="https://boardgamegeek.com/xmlapi/termsofuse">
    <item type="boardgame" id="13">
        <thumbnail>https://cf.geekdo-images.com/catan_t.jpg</thumbnail>
        <image>https://cf.geekdo-images.com/catan.jpg</image>
        <name type="primary" sortindex="1" value="CATAN" />
        <name type="alternate" sortindex="1" value="Die Siedler von Catan" />
        <description>Trade &amp; build.</description>
        <yearpublished value="1995" />
        <minplayers value="3" />
    </item>
</items>"#;

    #[test]
    fn test_parse_single_thing() {
        let things = parse_thing_response(CATAN_THING).unwrap();
        assert_eq!(things.len(), 1);

        let catan = &things[0];
        assert_eq!(catan.id, "13");
        assert_eq!(catan.name, "CATAN");
        assert_eq!(catan.subtype, "boardgame");
        assert_eq!(catan.year_published, Some(1995));
        assert_eq!(
            catan.thumbnail_url.as_deref(),
            Some("https://cf.geekdo-images.com/catan_t.jpg")
        );
        assert_eq!(
            catan.image_url.as_deref(),
            Some("https://cf.geekdo-images.com/catan.jpg")
        );
    }

    #[test]
    fn test_single_item_matches_list_shape() {
        let single = r#"<items><item type="boardgame" id="13"><name type="primary" value="Catan"/></item></items>"#;
        let many = r#"<items>
            <item type="boardgame" id="13"><name type="primary" value="Catan"/></item>
            <item type="boardgameexpansion" id="926"><name type="primary" value="Catan: Seafarers"/></item>
        </items>"#;

        let single = parse_thing_response(single).unwrap();
        let many = parse_thing_response(many).unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(many.len(), 2);
        assert_eq!(single[0], many[0]);
        assert_eq!(many[1].subtype, "boardgameexpansion");
    }

    #[test]
    fn test_missing_optional_fields_degrade() {
        let xml = r#"<items><item id="42"><yearpublished value="soon"/></item></items>"#;
        let things = parse_thing_response(xml).unwrap();

        assert_eq!(things[0].name, UNKNOWN_NAME);
        assert_eq!(things[0].subtype, UNKNOWN_SUBTYPE);
        assert_eq!(things[0].year_published, None);
        assert_eq!(things[0].thumbnail_url, None);
        assert_eq!(things[0].image_url, None);
    }

    #[test]
    fn test_no_primary_name_is_unknown() {
        let xml = r#"<items><item type="boardgame" id="7"><name type="alternate" value="Alt"/></item></items>"#;
        let things = parse_thing_response(xml).unwrap();
        assert_eq!(things[0].name, "Unknown");
    }

    #[test]
    fn test_item_without_id_is_malformed() {
        let xml = r#"<items><item type="boardgame"><name type="primary" value="Ghost"/></item></items>"#;
        let result = parse_thing_response(xml);
        assert!(matches!(result, Err(BggError::ParseError(_))));
    }

    #[test]
    fn test_thing_without_items_root_is_malformed() {
        let xml = r#"<error><message>Rate limit exceeded.</message></error>"#;
        assert!(matches!(
            parse_thing_response(xml),
            Err(BggError::ParseError(_))
        ));
    }

    #[test]
    fn test_invalid_xml_is_malformed() {
        assert!(parse_thing_response("<items><item id=\"1\"></items>").is_err());
    }

    #[test]
    fn test_nested_version_items_ignored() {
        let xml = r#"<items><item type="boardgame" id="13">
            <name type="primary" value="Catan"/>
            <versions>
                <item type="boardgameversion" id="9999"><name type="primary" value="Catan (German)"/></item>
            </versions>
        </item></items>"#;
        let things = parse_thing_response(xml).unwrap();
        assert_eq!(things.len(), 1);
        assert_eq!(things[0].id, "13");
        assert_eq!(things[0].name, "Catan");
    }

    #[test]
    fn test_double_escaped_name_decoded() {
        let xml = r#"<items><item type="boardgame" id="5"><name type="primary" value="Gl&amp;#039;dur"/></item></items>"#;
        let things = parse_thing_response(xml).unwrap();
        assert_eq!(things[0].name, "Gl'dur");
    }

    #[test]
    fn test_parse_search_response() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<items total="2" termsofuse="https://boardgamegeek.com/xmlapi/termsofuse">
    <item type="boardgame" id="13">
        <name type="primary" value="CATAN"/>
        <yearpublished value="1995" />
    </item>
    <item type="boardgameexpansion" id="926">
        <name type="primary" value="Catan: Seafarers"/>
    </item>
</items>"#;
        let matches = parse_search_response(xml).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id.as_deref(), Some("13"));
        assert_eq!(matches[0].raw_label.as_deref(), Some("CATAN"));
        assert_eq!(matches[0].subtype_hint.as_deref(), Some("boardgame"));
        assert_eq!(matches[1].subtype_hint.as_deref(), Some("boardgameexpansion"));
    }

    #[test]
    fn test_parse_search_keeps_raw_entities() {
        let xml = r#"<items total="1"><item type="boardgame" id="5"><name type="primary" value="Gl&amp;#039;dur"/></item></items>"#;
        let matches = parse_search_response(xml).unwrap();
        assert_eq!(matches[0].raw_label.as_deref(), Some("Gl&#039;dur"));
    }

    #[test]
    fn test_parse_empty_search() {
        assert!(parse_search_response(r#"<items total="0"></items>"#)
            .unwrap()
            .is_empty());
        assert!(parse_search_response(r#"<items total="0"/>"#)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_search_without_items_root_is_empty() {
        let xml = r#"<errors><error><message>Invalid query</message></error></errors>"#;
        assert!(parse_search_response(xml).unwrap().is_empty());
        assert!(parse_thing_response(xml).is_err());
    }

    #[test]
    fn test_search_item_without_name() {
        let xml = r#"<items total="1"><item type="boardgame" id="77"/></items>"#;
        let matches = parse_search_response(xml).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id.as_deref(), Some("77"));
        assert!(matches[0].raw_label.is_none());
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("Gl&#039;dur"), "Gl'dur");
        assert_eq!(decode_entities("Caf&eacute;"), "Café");
        assert_eq!(decode_entities("Plain"), "Plain");
        assert_eq!(decode_entities("Salt & Pepper"), "Salt & Pepper");
    }

    #[test]
    fn test_decode_entities_mixed_with_bare_ampersand() {
        assert_eq!(
            decode_entities("Tzolk&#039;in & Friends"),
            "Tzolk'in & Friends"
        );
        assert_eq!(decode_entities("Fish & Chips &amp; Co"), "Fish & Chips & Co");
        assert_eq!(decode_entities("R&D&#x27;s &eacute;dition"), "R&D's édition");
    }

    #[test]
    fn test_decode_entities_keeps_invalid_references() {
        assert_eq!(decode_entities("&notanentity; x"), "&notanentity; x");
        assert_eq!(decode_entities("Fish &amp Chips"), "Fish &amp Chips");
        assert_eq!(decode_entities("&#; &#x; &#12a;"), "&#; &#x; &#12a;");
        assert_eq!(decode_entities("trailing &"), "trailing &");
        assert_eq!(decode_entities("A & B; C"), "A & B; C");
    }

    #[test]
    fn test_thing_name_with_entity_and_ampersand() {
        let xml = r#"<items><item type="boardgame" id="5"><name type="primary" value="Gl&amp;#039;dur &amp; Co"/></item></items>"#;
        let things = parse_thing_response(xml).unwrap();
        assert_eq!(things[0].name, "Gl'dur & Co");
    }
}
