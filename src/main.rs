//! # Folayout CLI
//!
//! Usage:
//!   folayout input.json -o output.jsonl
//!   echo '{ ... }' | folayout -o output.jsonl
//!   folayout input.json --cache --out-of-order --config engine.json
//!   folayout --example > sample.json
//!
//! The output is the area tree, one JSON record per line. Set `RUST_LOG`
//! to see layout decisions.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process;

use folayout::EngineConfig;

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_document_json());
        return;
    }

    let mut config = match flag_value(&args, "--config") {
        Some(path) => EngineConfig::load(Path::new(&path)).unwrap_or_else(|e| fail(&e.to_string())),
        None => EngineConfig::default(),
    };
    if args.iter().any(|a| a == "--cache") {
        config.cache_pages = true;
    }
    if args.iter().any(|a| a == "--out-of-order") {
        config.out_of_order = true;
    }
    if args.iter().any(|a| a == "--in-order") {
        config.out_of_order = false;
    }

    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1]).unwrap_or_else(|e| fail(&format!("Failed to read {}: {}", args[1], e)))
    } else {
        let mut buf = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut buf) {
            fail(&format!("Failed to read stdin: {}", e));
        }
        buf
    };

    let output_path = flag_value(&args, "-o").unwrap_or_else(|| "output.jsonl".to_string());

    match folayout::render_json(&input, &config) {
        Ok(bytes) => {
            if let Err(e) = fs::write(&output_path, &bytes) {
                fail(&format!("Failed to write {}: {}", output_path, e));
            }
            let pages = bytes
                .split(|b| *b == b'\n')
                .filter(|line| line.starts_with(br#"{"record":"page""#))
                .count();
            eprintln!("✓ Written {} pages ({} bytes) to {}", pages, bytes.len(), output_path);
        }
        Err(e) => fail(&e.to_string()),
    }
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].clone())
}

fn fail(message: &str) -> ! {
    eprintln!("✗ {}", message);
    process::exit(1);
}

fn example_document_json() -> &'static str {
    r##"{
  "metadata": {
    "title": "Field Notes",
    "author": "Folayout"
  },
  "bookmarks": [
    { "title": "Introduction", "refId": "intro" },
    { "title": "Appendix", "refId": "appendix" }
  ],
  "pageSequences": [
    {
      "title": "Main",
      "master": {
        "width": 420,
        "height": 595,
        "margin": { "top": 36, "right": 36, "bottom": 36, "left": 36 },
        "bodyMargin": { "top": 24, "right": 0, "bottom": 24, "left": 0 },
        "regionBeforeExtent": 18,
        "regionAfterExtent": 18
      },
      "style": { "fontFamily": "Times", "fontSize": 11, "lineHeight": 1.3 },
      "staticContent": {
        "before": [
          {
            "kind": { "type": "Block" },
            "style": { "textAlign": "End", "fontSize": 9 },
            "children": [
              { "kind": { "type": "RetrieveMarker", "className": "chapter" } }
            ]
          }
        ],
        "after": [
          {
            "kind": { "type": "Block" },
            "style": { "textAlign": "Center", "fontSize": 9 },
            "children": [
              { "kind": { "type": "Text", "content": "Page " } },
              { "kind": { "type": "PageNumber" } }
            ]
          }
        ]
      },
      "flow": [
        {
          "kind": { "type": "Block" },
          "id": "intro",
          "style": { "fontSize": 16, "fontWeight": 700, "spaceAfter": 8 },
          "children": [
            { "kind": { "type": "Marker", "className": "chapter" }, "children": [
              { "kind": { "type": "Text", "content": "Introduction" } }
            ]},
            { "kind": { "type": "Text", "content": "Introduction" } }
          ]
        },
        {
          "kind": { "type": "Block" },
          "style": { "textAlign": "Justify", "textIndent": 18, "hyphenate": true, "language": "en" },
          "children": [
            { "kind": { "type": "Text", "content": "Each paragraph is filled one line at a time. Words that do not fit move to the next line, long words are hyphenated when the language allows it, and justified lines spread their slack over the spaces between words." } },
            { "kind": { "type": "Footnote", "body": [
              { "kind": { "type": "Block" }, "style": { "fontSize": 8 }, "children": [
                { "kind": { "type": "Text", "content": "1. Footnotes take room from the bottom of the page." } }
              ]}
            ]}, "children": [
              { "kind": { "type": "Text", "content": "1" }, "style": { "verticalAlign": "Super" } }
            ]}
          ]
        },
        {
          "kind": { "type": "Block" },
          "children": [
            { "kind": { "type": "Text", "content": "Appendix" } },
            { "kind": { "type": "Leader" }, "style": { "leaderPattern": "Dots", "leaderLength": { "minimum": 12, "optimum": 200, "maximum": 400 } } },
            { "kind": { "type": "PageNumberCitation", "refId": "appendix" } }
          ]
        },
        { "kind": { "type": "PageBreak" } },
        {
          "kind": { "type": "Block" },
          "id": "appendix",
          "style": { "fontSize": 16, "fontWeight": 700 },
          "children": [
            { "kind": { "type": "Marker", "className": "chapter" }, "children": [
              { "kind": { "type": "Text", "content": "Appendix" } }
            ]},
            { "kind": { "type": "Text", "content": "Appendix" } }
          ]
        }
      ]
    }
  ]
}"##
}
