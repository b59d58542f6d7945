//! Tag-name lookups restricted to a subtree.
//!
//! CII reuses element names across contexts: `ram:ID` names the guideline,
//! the invoice, tax registrations and parties; `ram:LineTotalAmount` appears
//! once per line and once in the header summation. Every lookup here takes
//! the scope node to search below, and callers pass the narrowest subtree
//! that can contain the field. Nothing here searches the whole document
//! unless the caller passes the root as scope.

use super::tree::Node;

/// First element named `tag` below `scope`, in document order.
pub fn first_descendant<'a>(scope: Node<'a>, tag: &str) -> Option<Node<'a>> {
    scope.descendants().find(|n| n.name() == tag)
}

/// Every element named `tag` below `scope`, in document order.
pub fn all_descendants<'a>(scope: Node<'a>, tag: &str) -> Vec<Node<'a>> {
    scope.descendants().filter(|n| n.name() == tag).collect()
}

/// First direct child of `scope` named `tag`.
pub fn child<'a>(scope: Node<'a>, tag: &str) -> Option<Node<'a>> {
    scope.children().find(|n| n.name() == tag)
}

/// Follow `path` downward, each step searching below the previous match.
///
/// `first_path(settlement, &["ram:DueDateDateTime", "udt:DateTimeString"])`
/// only finds a date string that sits inside a due-date element.
pub fn first_path<'a>(scope: Node<'a>, path: &[&str]) -> Option<Node<'a>> {
    path.iter()
        .try_fold(scope, |node, tag| first_descendant(node, tag))
}

/// Trimmed text at the end of `path`, or `None` when the element is absent
/// or empty.
pub fn text_at<'a>(scope: Node<'a>, path: &[&str]) -> Option<&'a str> {
    first_path(scope, path)
        .map(|n| n.text())
        .filter(|t| !t.is_empty())
}

/// The first element named `tag` below `scope`, or `scope` itself when the
/// document omits that grouping element.
pub fn narrow<'a>(scope: Node<'a>, tag: &str) -> Node<'a> {
    first_descendant(scope, tag).unwrap_or(scope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cii::Document;

    const XML: &str = r#"<r>
  <ctx><ram:ID>urn:guideline</ram:ID></ctx>
  <line><ram:ID>L1</ram:ID><ram:Amount>10</ram:Amount></line>
  <header>
    <ram:ID>INV-1</ram:ID>
    <due><udt:DateTimeString>20240401</udt:DateTimeString></due>
  </header>
  <line><ram:ID>L2</ram:ID><ram:Amount>20</ram:Amount><ram:Amount>99</ram:Amount></line>
  <ram:Empty></ram:Empty>
</r>"#;

    #[test]
    fn lookups_stay_inside_scope() {
        let doc = Document::parse(XML.as_bytes()).unwrap();
        let root = doc.root();

        let header = first_descendant(root, "header").unwrap();
        assert_eq!(text_at(header, &["ram:ID"]), Some("INV-1"));

        let lines = all_descendants(root, "line");
        assert_eq!(lines.len(), 2);
        assert_eq!(text_at(lines[0], &["ram:ID"]), Some("L1"));
        assert_eq!(text_at(lines[1], &["ram:ID"]), Some("L2"));
        assert_eq!(text_at(lines[1], &["ram:Amount"]), Some("20"));
        assert_eq!(all_descendants(lines[1], "ram:Amount").len(), 2);

        // The root scope sees the first occurrence, which is not the invoice number.
        assert_eq!(text_at(root, &["ram:ID"]), Some("urn:guideline"));
    }

    #[test]
    fn path_requires_each_step() {
        let doc = Document::parse(XML.as_bytes()).unwrap();
        let root = doc.root();
        assert_eq!(
            text_at(root, &["due", "udt:DateTimeString"]),
            Some("20240401")
        );
        assert_eq!(first_path(root, &["missing", "udt:DateTimeString"]), None);
        assert_eq!(first_path(root, &[]), Some(root));
    }

    #[test]
    fn child_only_matches_direct_children() {
        let doc = Document::parse(XML.as_bytes()).unwrap();
        let root = doc.root();
        assert!(child(root, "ram:ID").is_none());
        assert!(child(root, "header").is_some());
    }

    #[test]
    fn empty_text_is_absent() {
        let doc = Document::parse(XML.as_bytes()).unwrap();
        let root = doc.root();
        assert!(first_descendant(root, "ram:Empty").is_some());
        assert_eq!(text_at(root, &["ram:Empty"]), None);
    }

    #[test]
    fn narrow_falls_back_to_scope() {
        let doc = Document::parse(XML.as_bytes()).unwrap();
        let root = doc.root();
        assert_eq!(narrow(root, "header").name(), "header");
        assert_eq!(narrow(root, "settlement"), root);
    }
}
