use chardetng::EncodingDetector;
use ego_tree::iter::Edge;
use ego_tree::NodeRef;
use encoding_rs::Encoding;
use scraper::node::Node;
use scraper::{Html, Selector};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedPage {
    pub title: Option<String>,
    /// Document text with script/style content removed and whitespace collapsed.
    pub visible_text: String,
    pub anchors: Vec<Anchor>,
    pub meta_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("failed to decode bytes as {encoding}")]
    Decode { encoding: String },
}

pub trait Extractor: Send + Sync {
    fn parse(&self, bytes: &[u8], content_type: Option<&str>) -> Result<ParsedPage, ParseError>;
}

/// Extracts title, visible text, anchors and meta description with `scraper`.
#[derive(Debug, Default, Clone, Copy)]
pub struct VisibleTextExtractor;

impl Extractor for VisibleTextExtractor {
    fn parse(&self, bytes: &[u8], content_type: Option<&str>) -> Result<ParsedPage, ParseError> {
        let html = decode_html(bytes, content_type)?;
        Ok(parse_html(&html))
    }
}

pub fn parse_html(html: &str) -> ParsedPage {
    let doc = Html::parse_document(html);

    let mut text = TextCollector::default();
    text.visit(*doc.root_element());

    ParsedPage {
        title: select_text(&doc, "title"),
        visible_text: text.finish(),
        anchors: select_anchors(&doc),
        meta_description: select_attr(&doc, r#"meta[name="description"]"#, "content"),
    }
}

fn select_text(doc: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel)
        .next()
        .map(|node| node.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

fn select_attr(doc: &Html, selector: &str, attr: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel)
        .next()
        .and_then(|node| node.value().attr(attr))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn select_anchors(doc: &Html) -> Vec<Anchor> {
    let Ok(sel) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    doc.select(&sel)
        .filter_map(|node| node.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(|href| Anchor {
            href: href.to_string(),
        })
        .collect()
}

#[derive(Default)]
struct TextCollector {
    text: String,
    pending_space: bool,
}

impl TextCollector {
    /// Iterative walk; hidden elements mute everything beneath them.
    fn visit(&mut self, root: NodeRef<'_, Node>) {
        let mut hidden_depth = 0usize;
        for edge in root.traverse() {
            match edge {
                Edge::Open(node) => match node.value() {
                    Node::Element(element) if is_hidden_element(element.name()) => {
                        hidden_depth += 1;
                    }
                    Node::Text(text) if hidden_depth == 0 => self.append(text),
                    _ => {}
                },
                Edge::Close(node) => {
                    if let Node::Element(element) = node.value() {
                        if is_hidden_element(element.name()) {
                            hidden_depth -= 1;
                        }
                    }
                }
            }
        }
    }

    fn append(&mut self, text: &str) {
        for ch in text.chars() {
            if ch.is_whitespace() {
                self.pending_space = !self.text.is_empty();
            } else {
                if self.pending_space {
                    self.text.push(' ');
                    self.pending_space = false;
                }
                self.text.push(ch);
            }
        }
    }

    fn finish(self) -> String {
        self.text
    }
}

fn is_hidden_element(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "script" | "style" | "noscript" | "template"
    )
}

/// Decode raw bytes into UTF-8 using: BOM -> Content-Type charset -> chardetng.
pub fn decode_html(bytes: &[u8], content_type: Option<&str>) -> Result<String, ParseError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(enc) = content_type
        .and_then(charset_label)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return decode_with(bytes, enc);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    decode_with(bytes, detector.guess(None, true))
}

fn charset_label(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']).to_string())
    })
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> Result<String, ParseError> {
    let (text, _, had_errors) = enc.decode(bytes);
    if had_errors {
        return Err(ParseError::Decode {
            encoding: enc.name().to_string(),
        });
    }
    Ok(text.into_owned())
}
