//! Position of a link inside an article region

use scraper::{ElementRef, Node};

const BLOCK_ELEMENTS: &[&str] = &["p", "div", "section"];

fn is_block(node: &Node) -> bool {
    node.as_element()
        .map(|e| BLOCK_ELEMENTS.contains(&e.name()))
        .unwrap_or(false)
}

/// Paragraph and word position of a link
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkPosition {
    /// 1-based index of the link's block among the region's blocks, 0 if none
    pub paragraph: u32,
    /// Words of region text before the link
    pub word: u32,
}

/// Computes the position of `link` within `region`
///
/// The paragraph is the document-order index of the link's nearest
/// `p`/`div`/`section` ancestor among all such elements inside the region
/// (the region itself is not counted). If that ancestor is outside the
/// region, or is the region itself, the paragraph is 0.
///
/// The word count covers every text node before the link in document order.
pub fn link_position(region: ElementRef<'_>, link: ElementRef<'_>) -> LinkPosition {
    let block = link
        .ancestors()
        .find(|node| is_block(node.value()))
        .map(|node| node.id());

    let mut paragraph = 0;
    let mut block_index = 0;
    let mut preceding_text = String::new();

    // Ancestors precede the link in document order, so the walk can stop there
    for node in region.descendants().skip(1) {
        if node.id() == link.id() {
            break;
        }

        if is_block(node.value()) {
            block_index += 1;
            if Some(node.id()) == block {
                paragraph = block_index;
            }
        }

        if let Some(text) = node.value().as_text() {
            preceding_text.push_str(text);
            preceding_text.push(' ');
        }
    }

    LinkPosition {
        paragraph,
        word: preceding_text.split_whitespace().count() as u32,
    }
}
