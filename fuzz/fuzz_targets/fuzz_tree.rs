#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(doc) = ciicheck::cii::Document::parse(data) {
        // Every element lies inside its parent's subtree range.
        for node in doc.root().descendants() {
            let parent = node.parent().expect("non-root element has a parent");
            assert!(parent.contains(&node));
        }
    }
});
