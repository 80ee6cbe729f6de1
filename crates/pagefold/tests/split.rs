// ABOUTME: Integration tests for the splitter's partition-count and reassembly properties.
// ABOUTME: Covers top-level and nested separators under every placement.

use pagefold::{split, split_on_start, split_with, Placement, Splitter};
use pretty_assertions::assert_eq;

#[test]
fn k_separators_give_k_plus_one_partitions() {
    for k in 0..5 {
        let html: String = (0..k).map(|i| format!("<p>{}</p><hr>", i)).collect::<String>() + "<p>end</p>";
        let parts = split(&html, "hr").unwrap();
        assert_eq!(parts.len(), k + 1, "for {} separators", k);
    }
}

#[test]
fn omitted_separators_reassemble_to_input() {
    let html = "<p>a</p><hr><p>b</p><p>c</p><hr><p>d</p>";
    let parts = split(html, "hr").unwrap();
    assert_eq!(parts.join("<hr>"), html);
}

#[test]
fn after_and_before_keep_every_separator() {
    let html = "<h2>1</h2><p>a</p><h2>2</h2><p>b</p>";
    for placement in [Placement::Before, Placement::After] {
        let parts = split_with(html, "h2", placement).unwrap();
        assert_eq!(parts.concat(), html, "placement {}", placement);
    }
}

#[test]
fn leading_separator_gives_empty_first_partition() {
    let parts = split("<hr><p>A</p>", "hr").unwrap();
    assert_eq!(parts, vec!["", "<p>A</p>"]);
}

#[test]
fn split_on_start_returns_one_partition_per_separator() {
    let html = "<p>preface</p><h2>a</h2><p>1</p><h2>b</h2><h2>c</h2><p>3</p>";
    let parts = split_on_start(html, "h2").unwrap();
    assert_eq!(parts.len(), 3);
    assert!(parts.iter().all(|p| p.starts_with("<h2>")));
}

#[test]
fn nested_separators_under_after_placement() {
    let html = "<article><p>lead</p><h2>One</h2><p>1</p></article><h2>Two</h2><p>2</p>";
    let parts = Splitter::new("h2")
        .placement(Placement::After)
        .split(html)
        .unwrap();
    assert_eq!(
        parts,
        vec![
            "<article><p>lead</p></article>",
            "<h2>One</h2><p>1</p>",
            "<h2>Two</h2><p>2</p>"
        ]
    );
}

#[test]
fn nested_separator_under_before_placement() {
    let html = "<div><p>a</p><hr><p>b</p></div><p>c</p>";
    let parts = split_with(html, "hr", Placement::Before).unwrap();
    assert_eq!(parts, vec!["<div><p>a</p><hr></div>", "<p>b</p><p>c</p>"]);
}

#[test]
fn nested_separator_as_last_child_under_before_placement() {
    let html = "<section><p>a</p><hr></section><p>b</p>";
    let parts = split_with(html, "hr", Placement::Before).unwrap();
    assert_eq!(parts, vec!["<section><p>a</p><hr></section>", "<p>b</p>"]);
}

#[test]
fn separators_in_sibling_containers() {
    let html = "<div><p>a</p><hr><p>b</p></div><div><p>c</p><hr><p>d</p></div>";
    let parts = split(html, "hr").unwrap();
    assert_eq!(
        parts,
        vec!["<div><p>a</p></div>", "<p>b</p><div><p>c</p></div>", "<p>d</p>"]
    );
}

#[test]
fn document_split_ignores_head() {
    let html = "<html><head><title>t</title></head><body><p>a</p><hr><p>b</p></body></html>";
    let parts = Splitter::new("hr").split_document(html).unwrap();
    assert_eq!(parts, vec!["<p>a</p>", "<p>b</p>"]);
}
