//! Demo: the five query variants over a small document.
//!
//! Run with: cargo run --example queries_demo

use jugar_buscar::{
    attribute_queries, query_all_by_attribute, AttributeQuery, Document, Element, MatchOptions,
    OutputMode, SnapshotOptions, TextTarget, WaitOptions,
};

fn main() {
    let mut doc = Document::new("body");
    let toolbar = doc.append_child(doc.root(), Element::new("nav"));
    doc.append_child(
        toolbar,
        Element::new("button")
            .with_attribute("data-testid", "start")
            .with_text("Start"),
    );
    doc.append_child(
        toolbar,
        Element::new("button")
            .with_attribute("data-testid", "stop")
            .with_text("Stop"),
    );
    doc.append_child(
        doc.root(),
        Element::new("span").with_attribute("data-testid", "score"),
    );

    let scope = doc.scope();
    let queries =
        attribute_queries().with_snapshot(SnapshotOptions::new().with_mode(OutputMode::Plain));

    // query_all_by: every button-ish testid, document order
    let all = query_all_by_attribute(
        "data-testid",
        scope,
        &TextTarget::text("st"),
        &MatchOptions::default().with_exact(false),
    );
    println!("fuzzy 'st' matched {} elements", all.len());
    for id in &all {
        println!("  <{}>", doc.element(*id).tag);
    }

    // get_by: exactly one
    let start = AttributeQuery::new("data-testid", "start");
    match queries.get_by(&scope, &start) {
        Ok(id) => println!("get_by found <{}>", doc.element(id).tag),
        Err(err) => println!("get_by failed:\n{err}"),
    }

    // get_by on a missing hook: the error carries a snapshot of the scope
    let missing = AttributeQuery::new("data-testid", "pause");
    if let Err(err) = queries.get_by(&scope, &missing) {
        println!("\nexpected failure:\n{err}");
    }

    // find_by: retrying lookup (resolves immediately here)
    let wait = WaitOptions::new().with_timeout(200).with_poll_interval(20);
    let score = AttributeQuery::new("data-testid", "score");
    match queries.find_by(&scope, &score, &wait) {
        Ok(id) => println!("\nfind_by resolved <{}>", doc.element(id).tag),
        Err(err) => println!("\nfind_by failed:\n{err}"),
    }
}
